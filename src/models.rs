// Payload shapes returned inside the `data` field of each endpoint.
//
// Fields missing from a response or sent as `null` take their default value;
// fields present with the wrong JSON type fail the decode.

use serde::Deserialize;

use crate::api::envelope::{impl_payload, null_as_default, Envelope, Payload};

/// A provisioned instance as listed by `/Evo/Instance`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Instance {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub uid: String,
    #[serde(deserialize_with = "null_as_default")]
    pub ipv4: String,
    #[serde(deserialize_with = "null_as_default")]
    pub ipv6: String,
    #[serde(deserialize_with = "null_as_default")]
    pub hostname: String,
    #[serde(deserialize_with = "null_as_default")]
    pub cpu: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub cpu_name: String,
    /// MB
    #[serde(deserialize_with = "null_as_default")]
    pub memory: i64,
    /// GB, sent as a string.
    #[serde(deserialize_with = "null_as_default")]
    pub disk: String,
    #[serde(deserialize_with = "null_as_default")]
    pub disk_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub user: String,
    #[serde(deserialize_with = "null_as_default")]
    pub password: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub creation_at: String,
    #[serde(deserialize_with = "null_as_default")]
    pub expiration_at: String,
    #[serde(deserialize_with = "null_as_default")]
    pub plan: String,
    #[serde(deserialize_with = "null_as_default")]
    pub region: String,
    #[serde(deserialize_with = "null_as_default")]
    pub os: String,
    #[serde(deserialize_with = "null_as_default")]
    pub show_speed: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DeployResult {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub password: String,
    #[serde(deserialize_with = "null_as_default")]
    pub ipv4: String,
    #[serde(deserialize_with = "null_as_default")]
    pub ipv6: String,
    #[serde(deserialize_with = "null_as_default")]
    pub hostname: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RebuildResult {
    #[serde(deserialize_with = "null_as_default")]
    pub ipv4: String,
    #[serde(deserialize_with = "null_as_default")]
    pub ipv6: String,
    #[serde(deserialize_with = "null_as_default")]
    pub hostname: String,
    #[serde(deserialize_with = "null_as_default")]
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Plan {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub stock: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub cpu: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub memory: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub disk: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub network_speed: String,
    #[serde(rename = "os", deserialize_with = "null_as_default")]
    pub os_groups: Vec<OsGroup>,
}

/// Operating systems offered for a plan, grouped by distribution.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct OsGroup {
    #[serde(deserialize_with = "null_as_default")]
    pub group_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub os_list: Vec<OperatingSystem>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct OperatingSystem {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Renewal {
    #[serde(deserialize_with = "null_as_default")]
    pub expiration_at: String,
    #[serde(deserialize_with = "null_as_default")]
    pub added_hours: String,
    #[serde(deserialize_with = "null_as_default")]
    pub total_service_hours: i64,
}

/// Live state snapshot from `/Evo/State`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct InstanceState {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub state: RuntimeState,
    #[serde(deserialize_with = "null_as_default")]
    pub system: SystemInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RuntimeState {
    #[serde(deserialize_with = "null_as_default")]
    pub memory: MemoryUsage,
    #[serde(deserialize_with = "null_as_default")]
    pub cpu: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub state: String,
    #[serde(deserialize_with = "null_as_default")]
    pub traffic: Traffic,
}

/// Memory figures in KiB, sent as strings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MemoryUsage {
    #[serde(rename = "memtotal", deserialize_with = "null_as_default")]
    pub total: String,
    #[serde(rename = "memfree", deserialize_with = "null_as_default")]
    pub free: String,
    #[serde(rename = "memavailable", deserialize_with = "null_as_default")]
    pub available: String,
}

/// Traffic counters in bytes.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Traffic {
    #[serde(rename = "in", deserialize_with = "null_as_default")]
    pub inbound: i64,
    #[serde(rename = "out", deserialize_with = "null_as_default")]
    pub outbound: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub total: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SystemInfo {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub group_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SshKey {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "publickey", deserialize_with = "null_as_default")]
    pub public_key: String,
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EvoPermissions {
    #[serde(deserialize_with = "null_as_default")]
    pub user_id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub plan: String,
    /// Hours
    #[serde(deserialize_with = "null_as_default")]
    pub max_time: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub allow_packages: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UserInfo {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(deserialize_with = "null_as_default")]
    pub credit: i64,
}

/// Result of an operation whose only output is the envelope `message`
/// (destroy, power). Whatever is in `data` is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acknowledgement(String);

impl Acknowledgement {
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl Payload for Acknowledgement {
    const SHAPE: &'static str = "acknowledgement";

    fn from_envelope(envelope: Envelope) -> Result<Self, serde_json::Error> {
        Ok(Self(envelope.message))
    }
}

impl_payload!(list Instance => "instance list");
impl_payload!(record DeployResult => "deploy result");
impl_payload!(record RebuildResult => "rebuild result");
impl_payload!(list Plan => "plan list");
impl_payload!(list OsGroup => "OS group list");
impl_payload!(record Renewal => "renewal result");
impl_payload!(record InstanceState => "instance state");
impl_payload!(list SshKey => "SSH key list");
impl_payload!(record EvoPermissions => "EVO permissions");
impl_payload!(record UserInfo => "user info");

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plan_nests_os_groups() {
        let plan: Plan = serde_json::from_value(json!({
            "id": 3,
            "name": "SLC.Evo.Micro",
            "stock": 12,
            "cpu": 2,
            "memory": 4096,
            "disk": 60,
            "network_speed": "1Gbps",
            "os": [{"group_name": "Debian", "os_list": [{"id": 1, "name": "Debian 12"}]}]
        }))
        .unwrap();

        assert_eq!(plan.os_groups.len(), 1);
        assert_eq!(plan.os_groups[0].os_list[0].name, "Debian 12");
    }

    #[test]
    fn state_uses_wire_names() {
        let state: InstanceState = serde_json::from_value(json!({
            "name": "h1",
            "status": "active",
            "state": {
                "memory": {"memtotal": "4194304", "memfree": "1048576", "memavailable": "2097152"},
                "cpu": 3,
                "state": "running",
                "traffic": {"in": 1048576, "out": 2097152, "total": 3145728}
            },
            "system": {"name": "Debian 12", "group_name": "Debian"}
        }))
        .unwrap();

        assert_eq!(state.state.memory.total, "4194304");
        assert_eq!(state.state.traffic.inbound, 1_048_576);
        assert_eq!(state.system.group_name, "Debian");
    }

    #[test]
    fn null_fields_take_defaults() {
        let body = br#"{"status":200,"message":"ok","data":[{"id":1,"ipv4":"1.2.3.4","ipv6":null,"hostname":"h","memory":null}]}"#;
        let instances: Vec<Instance> =
            crate::api::envelope::decode(body, crate::api::envelope::StatusPolicy::Ignore).unwrap();

        assert_eq!(instances[0].ipv4, "1.2.3.4");
        assert_eq!(instances[0].ipv6, "");
        assert_eq!(instances[0].memory, 0);
    }

    #[test]
    fn null_nested_records_and_lists_take_defaults() {
        let plan: Plan = serde_json::from_value(json!({"id": 3, "os": null})).unwrap();
        assert!(plan.os_groups.is_empty());

        let state: InstanceState =
            serde_json::from_value(json!({"name": "h1", "state": {"memory": null, "traffic": null}, "system": null}))
                .unwrap();
        assert_eq!(state.state.memory, MemoryUsage::default());
        assert_eq!(state.system, SystemInfo::default());
    }

    #[test]
    fn missing_fields_default_but_wrong_types_fail() {
        let info: UserInfo = serde_json::from_value(json!({"id": 5})).unwrap();
        assert_eq!(info.id, 5);
        assert!(info.email.is_empty());

        assert!(serde_json::from_value::<UserInfo>(json!({"id": "five"})).is_err());
    }
}
