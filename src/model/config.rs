use serde::Deserialize;
use std::fs;
use std::path::Path;
use url::Url;

const ENV_CONFIG_PATH: &str = "RFPFLOW_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

const ENV_SMTP_HOST: &str = "RFPFLOW_SMTP_HOST";
const ENV_SMTP_PORT: &str = "RFPFLOW_SMTP_PORT";
const ENV_SMTP_USERNAME: &str = "RFPFLOW_SMTP_USERNAME";
const ENV_SMTP_PASSWORD: &str = "RFPFLOW_SMTP_PASSWORD";
const ENV_FRONTEND_ORIGIN: &str = "RFPFLOW_FRONTEND_ORIGIN";

/// SMTP transport configuration for the dispatch pipeline.
///
/// Constructed once at startup and handed to the mailer; there is no
/// module-level cached transport.
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    #[serde(default = "default_smtp_host")]
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_from_name")]
    pub from_name: String,
    #[serde(default = "default_from_address")]
    pub from_address: String,
    /// When set, each sent message gets a preview link under this base URL
    /// (test mailboxes such as Ethereal expose one).
    #[serde(default)]
    pub preview_base_url: Option<Url>,
}

fn default_smtp_host() -> String {
    "smtp.ethereal.email".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_from_name() -> String {
    "RFP System".to_string()
}

fn default_from_address() -> String {
    "rfp@procurement.com".to_string()
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: default_smtp_host(),
            port: default_smtp_port(),
            username: None,
            password: None,
            from_name: default_from_name(),
            from_address: default_from_address(),
            preview_base_url: None,
        }
    }
}

impl SmtpConfig {
    /// Apply environment overrides on top of file-provided values.
    fn apply_env(&mut self) {
        if let Ok(host) = std::env::var(ENV_SMTP_HOST) {
            self.host = host;
        }
        if let Some(port) = std::env::var(ENV_SMTP_PORT)
            .ok()
            .and_then(|p| p.parse().ok())
        {
            self.port = port;
        }
        if let Ok(username) = std::env::var(ENV_SMTP_USERNAME) {
            self.username = Some(username);
        }
        if let Ok(password) = std::env::var(ENV_SMTP_PASSWORD) {
            self.password = Some(password);
        }
    }
}

/// YAML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub smtp: SmtpConfig,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Origin allowed to call the API and subscribe to events.
    pub frontend_origin: Option<String>,
    pub smtp: SmtpConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            frontend_origin: None,
            smtp: SmtpConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3001);

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let frontend_origin = std::env::var(ENV_FRONTEND_ORIGIN).ok();

        let config_path =
            std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let mut smtp = Self::load_config_file(&config_path)
            .map(|cf| cf.smtp)
            .unwrap_or_default();
        smtp.apply_env();

        Self {
            host,
            port,
            frontend_origin,
            smtp,
        }
    }

    /// Load configuration from YAML file
    fn load_config_file(path: &str) -> Option<ConfigFile> {
        let path = Path::new(path);

        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return None;
        }

        match fs::read_to_string(path) {
            Ok(contents) => {
                let contents = contents.trim();
                if contents.is_empty() {
                    tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
                    return Some(ConfigFile::default());
                }

                match serde_yaml::from_str(contents) {
                    Ok(config) => {
                        tracing::info!(path = %path.display(), "Loaded configuration from file");
                        Some(config)
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Failed to parse config file, using defaults");
                        None
                    }
                }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read config file, using defaults");
                None
            }
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
