// Copyright 2026 Modular Cultures Contributors
// SPDX-License-Identifier: Apache-2.0

//! # Modular Cultures Configuration System
//!
//! Type-safe run-configuration loader with support for:
//! - TOML file parsing
//! - Environment variable config-path override
//! - CLI argument overrides
//!
//! A run is fully pinned by one configuration file plus one seed: loading the
//! same file twice yields equal configs, and equal configs with equal seeds
//! produce identical simulations.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use culture_config::load_config;
//!
//! let config = load_config(None, None).expect("failed to load config");
//! println!("dt: {} ms", config.simulation.dt_ms);
//! println!("AMPA strength: {} mV", config.synapse.j_ampa);
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod loader;
pub mod types;
pub mod validation;

pub use loader::{apply_cli_overrides, find_config_file, load_config};
pub use types::*;
pub use validation::{validate_config, ConfigValidationError};

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found. Searched: {0}")]
    FileNotFound(String),

    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("invalid TOML syntax: {0}")]
    ParseError(String),

    #[error("validation failed: {0}")]
    ValidationError(String),

    #[error("unknown override key: {0}")]
    UnknownOverride(String),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Default name of the configuration file, searched upward from the cwd.
pub const CONFIG_FILE_NAME: &str = "culture_configuration.toml";

/// Environment variable that pins the configuration file location.
pub const CONFIG_PATH_ENV: &str = "CULTURE_CONFIG_PATH";
