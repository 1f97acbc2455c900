// Library root
// -----------
// This crate exposes the library surface behind the `alice-cli` binary.
//
// Module responsibilities:
// - `api`: request construction, the HTTP transport, envelope decoding and
//   one method per EVO endpoint.
// - `models`: payload shapes carried in the envelope's `data` field.
// - `render`: plain-text output for each payload.
// - `ui`: the interactive numbered menu.
// - `config` / `error`: session settings and error types.
pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod render;
pub mod ui;

pub use api::envelope::StatusPolicy;
pub use api::{ApiClient, DeployParams, PowerAction, RebuildParams};
pub use config::{Cli, ClientConfig};
pub use error::ClientError;
