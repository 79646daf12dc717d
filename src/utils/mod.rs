//! Configuration utilities.

/// TOML configuration with defaults, validation and hot reload.
pub mod toml_config;
