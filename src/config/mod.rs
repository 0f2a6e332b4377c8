//! Service Configuration Module
//!
//! Engine tuning, storage location, HTTP bind address and log format, loaded
//! from TOML.
//!
//! ## Loading Order
//!
//! 1. `--config <path>` CLI flag
//! 2. `OEE_CONFIG` environment variable (path to TOML file)
//! 3. `oee_config.toml` in the current working directory
//! 4. Built-in defaults ([`defaults`])

pub mod defaults;
mod oee_config;
pub mod validation;

pub use oee_config::*;
