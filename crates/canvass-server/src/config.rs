//! Server configuration loading from file and environment variables.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use canvass_voice::GatewayConfig;
use serde::Deserialize;
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Transcription gateway settings. Provider credentials are *not*
    /// configured here — they come from the environment only.
    #[serde(default)]
    pub transcription: TranscriptionConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "canvass_server=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

/// Transcription gateway configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionConfig {
    /// Bound on the primary provider call, in seconds. Expiry triggers
    /// fallback to the secondary provider.
    #[serde(default = "default_primary_timeout_secs")]
    pub primary_timeout_secs: u64,

    /// Default language hint when the request does not carry one.
    #[serde(default = "default_language")]
    pub language: String,

    /// Maximum accepted audio segment size in bytes.
    #[serde(default = "default_max_segment_bytes")]
    pub max_segment_bytes: usize,
}

impl TranscriptionConfig {
    /// Converts into the gateway's runtime configuration.
    pub fn to_gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            primary_timeout: Duration::from_secs(self.primary_timeout_secs),
            language: self.language.clone(),
            max_segment_bytes: self.max_segment_bytes,
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_primary_timeout_secs() -> u64 {
    30
}

fn default_language() -> String {
    "en".to_string()
}

fn default_max_segment_bytes() -> usize {
    10 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            primary_timeout_secs: default_primary_timeout_secs(),
            language: default_language(),
            max_segment_bytes: default_max_segment_bytes(),
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `CANVASS_HOST` overrides `server.host`
/// - `CANVASS_PORT` overrides `server.port`
/// - `CANVASS_LOG_LEVEL` overrides `logging.level`
/// - `CANVASS_LOG_JSON` overrides `logging.json` (set to "true" to enable)
/// - `CANVASS_LANGUAGE` overrides `transcription.language`
/// - `CANVASS_PRIMARY_TIMEOUT_SECS` overrides `transcription.primary_timeout_secs`
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    // Environment variable overrides
    if let Ok(host) = std::env::var("CANVASS_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Ok(port) = std::env::var("CANVASS_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Ok(level) = std::env::var("CANVASS_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Ok(json) = std::env::var("CANVASS_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
    if let Ok(language) = std::env::var("CANVASS_LANGUAGE") {
        if !language.trim().is_empty() {
            config.transcription.language = language;
        }
    }
    if let Ok(timeout) = std::env::var("CANVASS_PRIMARY_TIMEOUT_SECS") {
        if let Ok(parsed) = timeout.parse() {
            config.transcription.primary_timeout_secs = parsed;
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_apply_without_a_file() {
        let config = load_config(None).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.transcription.primary_timeout_secs, 30);
        assert_eq!(config.transcription.language, "en");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = load_config(Some("/nonexistent/canvass.toml")).unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\nport = 8081\n\n[logging]\nlevel = \"debug\"\n\n[transcription]\nprimary_timeout_secs = 5\nlanguage = \"es\"\n"
        )
        .unwrap();

        let config = load_config(Some(file.path().to_str().unwrap())).unwrap();
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.transcription.primary_timeout_secs, 5);
        assert_eq!(config.transcription.language, "es");
        // Unspecified values keep their defaults.
        assert_eq!(
            config.transcription.max_segment_bytes,
            10 * 1024 * 1024
        );
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server\nport = oops").unwrap();

        let err = load_config(Some(file.path().to_str().unwrap())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn gateway_config_carries_the_timeout() {
        let transcription = TranscriptionConfig {
            primary_timeout_secs: 7,
            ..TranscriptionConfig::default()
        };
        let gateway = transcription.to_gateway_config();
        assert_eq!(gateway.primary_timeout, Duration::from_secs(7));
    }
}
