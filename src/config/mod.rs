//! JSON runtime configuration for the command-line tool.

pub mod detect;

pub use detect::{load_config, OutputConfig, RuntimeConfig};
