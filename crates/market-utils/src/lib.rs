//! Shared utilities for market-update
//!
//! Logging setup and environment-variable helpers used by the domain crate and the CLI.

pub mod config;
pub mod logging;

pub use config::{
    EnvError, env_opt, env_or, env_parse_or, load_dotenv, process_env, var_opt, var_or,
    var_parse_or,
};
pub use logging::init_tracing;
