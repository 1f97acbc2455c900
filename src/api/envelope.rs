// Envelope decoder. Every endpoint answers with
// `{"status": int, "message": string, "data": <payload>}`; this module turns
// those bytes into a typed payload without any knowledge of HTTP.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::DecodeError;

/// The outer response wrapper. `data` stays undecoded until the caller picks
/// a payload shape.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    /// Absent or `null` reads as `None`.
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default)]
    pub data: Value,
}

/// How the embedded `status` of an envelope is treated once the HTTP
/// exchange itself succeeded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusPolicy {
    /// Trust the HTTP status alone and never inspect the envelope status.
    #[default]
    Ignore,
    /// Require a status and reject envelopes whose status is outside 200..=299.
    Enforce,
}

impl StatusPolicy {
    fn check(self, envelope: &Envelope) -> Result<(), DecodeError> {
        if self == Self::Ignore {
            return Ok(());
        }
        match envelope.status {
            None => Err(DecodeError::Envelope(serde_json::Error::missing_field(
                "status",
            ))),
            Some(status) if !(200..=299).contains(&status) => Err(DecodeError::Rejected {
                status,
                message: envelope.message.clone(),
            }),
            Some(_) => Ok(()),
        }
    }
}

/// Field deserializer that reads `null` as the type's default, the way the
/// API uses `null` for "no value".
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// A typed value extracted from a decoded envelope.
pub trait Payload: Sized {
    /// Human-readable name used in decode errors.
    const SHAPE: &'static str;

    fn from_envelope(envelope: Envelope) -> Result<Self, serde_json::Error>;
}

/// Decode `bytes` as an envelope and extract payload `T`.
pub fn decode<T: Payload>(bytes: &[u8], policy: StatusPolicy) -> Result<T, DecodeError> {
    let envelope: Envelope = serde_json::from_slice(bytes).map_err(DecodeError::Envelope)?;
    policy.check(&envelope)?;
    T::from_envelope(envelope).map_err(|source| DecodeError::Payload {
        shape: T::SHAPE,
        source,
    })
}

/// Implements `Payload` for record shapes (decoded from `data`) and list
/// shapes (`data: null` decodes to an empty list).
macro_rules! impl_payload {
    (record $ty:ty => $shape:literal) => {
        impl $crate::api::envelope::Payload for $ty {
            const SHAPE: &'static str = $shape;

            fn from_envelope(
                envelope: $crate::api::envelope::Envelope,
            ) -> Result<Self, serde_json::Error> {
                serde_json::from_value(envelope.data)
            }
        }
    };
    (list $ty:ty => $shape:literal) => {
        impl $crate::api::envelope::Payload for Vec<$ty> {
            const SHAPE: &'static str = $shape;

            fn from_envelope(
                envelope: $crate::api::envelope::Envelope,
            ) -> Result<Self, serde_json::Error> {
                serde_json::from_value::<Option<Vec<$ty>>>(envelope.data)
                    .map(Option::unwrap_or_default)
            }
        }
    };
}

pub(crate) use impl_payload;
