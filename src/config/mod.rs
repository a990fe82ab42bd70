mod file_config;

pub use file_config::FileConfig;

use crate::server::{RequestsLoggingLevel, ServerConfig};
use anyhow::{bail, Result};
use clap::ValueEnum;
use tracing::warn;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_UPSTREAM_URL: &str = "https://github.com";
pub const DEFAULT_FETCH_TIMEOUT_SEC: u64 = 10;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub upstream_url: String,
    pub fetch_timeout_sec: u64,
    pub frontend_dir_path: Option<String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        CliConfig {
            port: DEFAULT_PORT,
            logging_level: RequestsLoggingLevel::default(),
            upstream_url: DEFAULT_UPSTREAM_URL.to_owned(),
            fetch_timeout_sec: DEFAULT_FETCH_TIMEOUT_SEC,
            frontend_dir_path: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub upstream_url: String,
    pub fetch_timeout_sec: u64,
    pub frontend_dir_path: Option<String>,
}

fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    match RequestsLoggingLevel::from_str(s, true) {
        Ok(level) => Some(level),
        Err(_) => {
            warn!("Unknown logging_level {:?} in config file, ignoring it", s);
            None
        }
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let port = file.port.unwrap_or(cli.port);
        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let upstream_url = file
            .upstream_url
            .unwrap_or_else(|| cli.upstream_url.clone());
        if !upstream_url.starts_with("http://") && !upstream_url.starts_with("https://") {
            bail!("upstream_url must be an http(s) URL, got {:?}", upstream_url);
        }

        let fetch_timeout_sec = file.fetch_timeout_sec.unwrap_or(cli.fetch_timeout_sec);
        if fetch_timeout_sec == 0 {
            bail!("fetch_timeout_sec must be greater than 0");
        }

        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());

        Ok(Self {
            port,
            logging_level,
            upstream_url,
            fetch_timeout_sec,
            frontend_dir_path,
        })
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level.clone(),
            port: self.port,
            frontend_dir_path: self.frontend_dir_path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn cli_values_without_file() {
        let cli = CliConfig {
            port: 4000,
            ..CliConfig::default()
        };
        let config = AppConfig::resolve(&cli, None).unwrap();

        assert_eq!(config.port, 4000);
        assert_eq!(config.upstream_url, DEFAULT_UPSTREAM_URL);
        assert_eq!(config.fetch_timeout_sec, DEFAULT_FETCH_TIMEOUT_SEC);
        assert_eq!(config.logging_level, RequestsLoggingLevel::Path);
        assert!(config.frontend_dir_path.is_none());
    }

    #[test]
    fn file_overrides_cli() {
        let file = write_config(
            r#"
port = 8080
logging_level = "headers"
upstream_url = "http://localhost:9999"
frontend_dir_path = "public"
"#,
        );
        let file_config = FileConfig::load(file.path()).unwrap();
        let config = AppConfig::resolve(&CliConfig::default(), Some(file_config)).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.logging_level, RequestsLoggingLevel::Headers);
        assert_eq!(config.upstream_url, "http://localhost:9999");
        assert_eq!(config.frontend_dir_path.as_deref(), Some("public"));
        assert_eq!(config.server_config().port, 8080);
    }

    #[test]
    fn unknown_logging_level_falls_back_to_cli() {
        let file_config = FileConfig {
            logging_level: Some("verbose".to_string()),
            ..FileConfig::default()
        };
        let cli = CliConfig {
            logging_level: RequestsLoggingLevel::Body,
            ..CliConfig::default()
        };
        let config = AppConfig::resolve(&cli, Some(file_config)).unwrap();
        assert_eq!(config.logging_level, RequestsLoggingLevel::Body);
    }

    #[test]
    fn rejects_non_http_upstream() {
        let file_config = FileConfig {
            upstream_url: Some("ftp://example.com".to_string()),
            ..FileConfig::default()
        };
        assert!(AppConfig::resolve(&CliConfig::default(), Some(file_config)).is_err());
    }

    #[test]
    fn rejects_zero_timeout() {
        let cli = CliConfig {
            fetch_timeout_sec: 0,
            ..CliConfig::default()
        };
        assert!(AppConfig::resolve(&cli, None).is_err());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let file = write_config("port = \"not a number\"");
        assert!(FileConfig::load(file.path()).is_err());
    }
}
