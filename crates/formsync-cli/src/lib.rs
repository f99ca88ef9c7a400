//! formsync CLI
//!
//! Runs the reconciliation functions of `formsync-core` over JSON files.
//!
//! ```text
//! formsync create  --schema schema.yml --kind InfraDevice --form form.json
//! formsync update  --schema schema.yml --kind InfraDevice --form form.json --current device.json
//! formsync filters --schema schema.yml --kind InfraDevice --filters filters.json
//! formsync permission --input access.json
//! formsync object-permission --input records.json
//! ```
//!
//! Global flags: `--config <toml>`, `--strict`, `--log-json`. Output is
//! pretty-printed JSON on stdout; logs go to stderr.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod commands;
mod config;
mod logging;

pub use commands::{command, load_config, load_schema, run};
pub use config::{CliConfig, ConfigError, LogConfig};
pub use logging::{init_tracing, DEFAULT_FILTER};
