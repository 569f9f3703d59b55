//! Command-line surface for the Flux diagnostics.

pub mod cli;
pub mod commands;
pub mod logging;

pub use cli::{Cli, Command};
pub use commands::{config_path, dispatch, load_config, load_env};
pub use logging::init_logging;
