//! Configuration management for finreport
//!
//! Loads and validates the service configuration from a YAML file. Every
//! field is optional; missing sections fall back to their defaults.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::Path;

pub use error::{ConfigError, ConfigErrorCode, ConfigResult};

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins (empty allows any origin)
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

/// Report output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Title used when the request has none
    #[serde(default = "default_title")]
    pub default_title: String,
    /// Attachment name of the spreadsheet export
    #[serde(default = "default_excel_filename")]
    pub excel_filename: String,
    /// Attachment name of the PDF export
    #[serde(default = "default_pdf_filename")]
    pub pdf_filename: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            default_title: default_title(),
            excel_filename: default_excel_filename(),
            pdf_filename: default_pdf_filename(),
        }
    }
}

fn default_title() -> String {
    "REPORTE DE MOVIMIENTOS".to_string()
}

fn default_excel_filename() -> String {
    "Reporte_Finanzas.xlsx".to_string()
}

fn default_pdf_filename() -> String {
    "Reporte_Finanzas.pdf".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Report settings
    #[serde(default)]
    pub report: ReportConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::InvalidYaml { message: e.to_string() })?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.report.default_title.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "report.default_title".to_string(),
                reason: "Default title must not be empty".to_string(),
            });
        }

        check_filename("report.excel_filename", &self.report.excel_filename, ".xlsx")?;
        check_filename("report.pdf_filename", &self.report.pdf_filename, ".pdf")?;

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                reason: format!("Log level must be one of: {}", LOG_LEVELS.join(", ")),
            });
        }

        Ok(())
    }

    /// Default configuration file contents
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Address the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn check_filename(field: &str, name: &str, extension: &str) -> ConfigResult<()> {
    let valid = name.len() > extension.len()
        && name.to_lowercase().ends_with(extension)
        && !name.contains(['/', '\\', '"']);
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("Must be a plain file name ending in {}", extension),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.report.default_title, "REPORTE DE MOVIMIENTOS");
        assert_eq!(config.report.excel_filename, "Reporte_Finanzas.xlsx");
        assert_eq!(config.report.pdf_filename, "Reporte_Finanzas.pdf");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_template_parses() {
        let config = Config::from_yaml(Config::generate_default()).unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:5000");
        assert!(config.server.cors_origins.is_empty());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = Config::from_yaml("server:\n  port: 8080\n").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.report.pdf_filename, "Reporte_Finanzas.pdf");
    }

    #[test]
    fn test_invalid_port() {
        let error = Config::from_yaml("server:\n  port: 0\n").unwrap_err();
        assert_eq!(error.code(), ConfigErrorCode::InvalidValue);
        assert_eq!(error.to_details().field, Some("server.port".to_string()));
    }

    #[test]
    fn test_invalid_filename() {
        let error = Config::from_yaml("report:\n  pdf_filename: report.xlsx\n").unwrap_err();
        assert!(error.to_string().contains("report.pdf_filename"));
    }

    #[test]
    fn test_invalid_log_level() {
        let error = Config::from_yaml("logging:\n  level: loud\n").unwrap_err();
        assert_eq!(error.code(), ConfigErrorCode::InvalidValue);
    }

    #[test]
    fn test_invalid_yaml() {
        let error = Config::from_yaml("server: [unclosed").unwrap_err();
        assert_eq!(error.code(), ConfigErrorCode::InvalidYaml);
        assert!(!error.to_details().suggestions.is_empty());
    }

    #[test]
    fn test_missing_file() {
        let error = Config::load("/nonexistent/finreport.yaml").unwrap_err();
        assert_eq!(error.code(), ConfigErrorCode::FileNotFound);
    }
}
