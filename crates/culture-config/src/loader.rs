// Copyright 2026 Modular Cultures Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Loading is layered:
//! 1. TOML file (base values, every section optional)
//! 2. CLI arguments (explicit user overrides)
//!
//! The file location itself can be pinned via `CULTURE_CONFIG_PATH`.

use crate::{
    validate_config, ConfigError, ConfigResult, CultureConfig, CONFIG_FILE_NAME, CONFIG_PATH_ENV,
};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Find the culture configuration file
///
/// Search order:
/// 1. `CULTURE_CONFIG_PATH` environment variable
/// 2. Current working directory: `./culture_configuration.toml`
/// 3. Ancestor directories (up to 5 levels, for workspace layouts)
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file exists in any
/// searched location.
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "config file specified by {} not found: {}",
            CONFIG_PATH_ENV,
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        let mut current = cwd;
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent.to_path_buf();
                }
                None => break,
            }
        }
    }

    for path in &search_paths {
        if path.exists() {
            return Ok(path.clone());
        }
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet {} to specify a custom location.",
        CONFIG_FILE_NAME, search_list, CONFIG_PATH_ENV
    )))
}

/// Load configuration from a TOML file, apply overrides, and validate.
///
/// # Arguments
///
/// * `config_path` - Optional path. If `None`, searches for the file; a
///   missing file falls back to built-in defaults (every parameter has one).
/// * `cli_args` - Optional CLI overrides, `"section.field" -> value` strings.
///
/// # Errors
///
/// Returns an error for unreadable files, invalid TOML, unknown override
/// keys, or failed validation.
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<CultureConfig> {
    let mut config = match config_path {
        Some(path) => parse_config_file(path)?,
        None => match find_config_file() {
            Ok(path) => parse_config_file(&path)?,
            Err(ConfigError::FileNotFound(_)) => CultureConfig::default(),
            Err(e) => return Err(e),
        },
    };

    if let Some(args) = cli_args {
        apply_cli_overrides(&mut config, args)?;
    }

    validate_config(&config)?;
    Ok(config)
}

fn parse_config_file(path: &Path) -> ConfigResult<CultureConfig> {
    let contents = fs::read_to_string(path)?;
    toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Apply `"section.field" -> value` overrides onto an existing config.
///
/// Only the parameters that are exposed on the `simulate` command line are
/// addressable here; everything else belongs in the TOML file.
pub fn apply_cli_overrides(
    config: &mut CultureConfig,
    args: &HashMap<String, String>,
) -> ConfigResult<()> {
    for (key, value) in args {
        match key.as_str() {
            "simulation.dt_ms" => config.simulation.dt_ms = parse_value(key, value)?,
            "simulation.duration_s" => config.simulation.duration_s = parse_value(key, value)?,
            "simulation.equilibration_s" => {
                config.simulation.equilibration_s = parse_value(key, value)?
            }
            "simulation.seed" => config.simulation.seed = parse_value(key, value)?,
            "synapse.j_ampa" => config.synapse.j_ampa = parse_value(key, value)?,
            "synapse.tau_depression_s" => {
                config.synapse.tau_depression_s = parse_value(key, value)?
            }
            "noise.mini_rate_hz" => config.noise.mini_rate_hz = parse_value(key, value)?,
            "noise.j_mini" => config.noise.j_mini = parse_value(key, value)?,
            "stimulation.mode" => config.stimulation.mode = value.clone(),
            "stimulation.extra_rate_hz" => {
                config.stimulation.extra_rate_hz = parse_value(key, value)?
            }
            _ => return Err(ConfigError::UnknownOverride(key.clone())),
        }
    }
    Ok(())
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> ConfigResult<T> {
    value.parse().map_err(|_| {
        ConfigError::ValidationError(format!("cannot parse override {}={}", key, value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[simulation]\nseed = 25000\n\n[noise]\nmini_rate_hz = 20.0"
        )
        .unwrap();

        let config = load_config(Some(file.path()), None).unwrap();
        assert_eq!(config.simulation.seed, 25000);
        assert_eq!(config.noise.mini_rate_hz, 20.0);
        // untouched section keeps defaults
        assert_eq!(config.synapse.j_ampa, 35.0);
    }

    #[test]
    fn test_load_same_file_twice_is_equal() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[synapse]\nj_ampa = 42.0").unwrap();

        let a = load_config(Some(file.path()), None).unwrap();
        let b = load_config(Some(file.path()), None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_cli_overrides_win() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[synapse]\nj_ampa = 42.0").unwrap();

        let mut args = HashMap::new();
        args.insert("synapse.j_ampa".to_string(), "30.0".to_string());
        let config = load_config(Some(file.path()), Some(&args)).unwrap();
        assert_eq!(config.synapse.j_ampa, 30.0);
    }

    #[test]
    fn test_unknown_override_rejected() {
        let mut args = HashMap::new();
        args.insert("synapse.nope".to_string(), "1".to_string());
        let mut config = CultureConfig::default();
        assert!(matches!(
            apply_cli_overrides(&mut config, &args),
            Err(ConfigError::UnknownOverride(_))
        ));
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[synapse\nj_ampa = ").unwrap();
        assert!(matches!(
            load_config(Some(file.path()), None),
            Err(ConfigError::ParseError(_))
        ));
    }
}
