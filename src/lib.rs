// Library root
// -----------
// This crate exposes the MLCave client library. The binary (`main.rs`)
// uses these modules to implement the interactive CLI.
//
// Module responsibilities:
// - `api`: the blocking HTTP client (push, get, mark current).
// - `config`: client settings loaded from the environment or a JSON file,
//   and token persistence helpers.
// - `error`: the error kinds a call can fail with.
// - `ui`: terminal menu flows that delegate to `api`.
pub mod api;
pub mod config;
pub mod error;
pub mod ui;

pub use api::{ApiClient, ModelHeaders};
pub use config::ClientConfig;
pub use error::{ClientError, Result};
