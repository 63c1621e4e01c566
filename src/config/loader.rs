//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Values supplied on the command line or through environment variables.
/// Each one that is set replaces the corresponding file/default value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
    pub upstream_url: Option<String>,
    pub allowed_origins: Option<Vec<String>>,
    pub fallback_origin: Option<String>,
    pub static_dir: Option<PathBuf>,
}

impl ConfigOverrides {
    pub fn apply(self, config: &mut GatewayConfig) {
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(url) = self.upstream_url {
            config.upstream.url = url;
        }
        if let Some(origins) = self.allowed_origins {
            config.cors.allowed_origins = origins
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(fallback) = self.fallback_origin {
            config.cors.fallback_origin = Some(fallback).filter(|s| !s.is_empty());
        }
        if let Some(dir) = self.static_dir {
            config.site.static_dir = Some(dir);
        }
    }
}

/// Build the effective configuration: defaults, then the optional file,
/// then overrides. Validation runs once on the final result.
pub fn resolve_config(
    path: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_file(path)?,
        None => GatewayConfig::default(),
    };
    overrides.apply(&mut config);

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn read_file(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}
