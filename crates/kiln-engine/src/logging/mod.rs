//! Logging utilities.
//!
//! The engine only talks to the `log` facade. `env_logger` is installed here,
//! by the runtime, with per-module defaults that keep the backend's per-call
//! tracing off unless asked for.

mod init;

pub use init::{init_logging, LoggingConfig};
