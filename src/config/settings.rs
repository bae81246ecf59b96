//! TOML-based configuration with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! tables = [
//!     "rhnchannel",
//!     "rhnchannelarch",
//!     "rhnchannelfamily",
//! ]
//!
//! [connection]
//! url = "${DATABASE_URL}"
//! schema = "public"
//! max_connections = 5
//! ```
//!
//! `tables` is a top-level key and has to appear before the `[connection]`
//! table; after that header TOML would assign it to `connection`.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Database connection settings.
    pub connection: ConnectionSettings,

    /// Fixed, ordered list of tables to model.
    pub tables: Vec<String>,
}

/// Database connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Connection URL. Supports `${VAR}` expansion.
    pub url: String,

    /// Schema whose catalog is introspected.
    pub schema: String,

    /// Pool size. The run is sequential, so a small pool suffices.
    pub max_connections: u32,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            schema: "public".to_string(),
            max_connections: 5,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file and expand environment variables in
    /// the connection URL.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse settings from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let mut settings: Settings = toml::from_str(content)?;
        settings.connection.url = expand_env_vars(&settings.connection.url)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.tables.is_empty() {
            return Err(SettingsError::InvalidConfig(
                "no target tables configured".to_string(),
            ));
        }

        let mut seen: HashMap<&str, usize> = HashMap::new();
        for table in &self.tables {
            *seen.entry(table.as_str()).or_default() += 1;
        }
        if let Some((table, _)) = seen.iter().find(|(_, count)| **count > 1) {
            return Err(SettingsError::InvalidConfig(format!(
                "target table listed twice: {table}"
            )));
        }
        Ok(())
    }
}

/// Expand `${VAR}` and `$VAR` environment references in a string.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name = if chars.peek() == Some(&'{') {
            chars.next();
            let mut name = String::new();
            for ch in chars.by_ref() {
                if ch == '}' {
                    break;
                }
                name.push(ch);
            }
            name
        } else {
            let mut name = String::new();
            while let Some(&ch) = chars.peek() {
                if ch.is_alphanumeric() || ch == '_' {
                    name.push(ch);
                    chars.next();
                } else {
                    break;
                }
            }
            name
        };

        if var_name.is_empty() {
            // A lone '$' stays as-is.
            result.push('$');
        } else {
            let value =
                env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name))?;
            result.push_str(&value);
        }
    }

    Ok(result)
}
