use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::fmt;
use url::Url;

use crate::core::platform::container::ledger::LedgerNetwork;
use crate::infrastructure::adapters::notifications::telegram_notification_adapter::{
    TelegramAdapterConfig, DEFAULT_TELEGRAM_API_URL,
};
use crate::infrastructure::adapters::output::ip_api_geolocation_adapter::DEFAULT_GEOLOCATION_API_URL;

/// Config file looked up when none is given on the command line; optional
pub const DEFAULT_CONFIG_FILE: &str = "config";

/// Separator for nested keys in environment variables, e.g. `SERVER__PORT`
pub const ENV_NESTING_SEPARATOR: &str = "__";

/// A configuration value that must never appear in logs
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
        }
    }
}

/// Process-wide settings, loaded once at start-up and shared read-only.
///
/// Keys match the environment variable names (`TELEGRAM_BOT_TOKEN` is
/// `telegram_bot_token`), so the same settings can come from a config file or the
/// environment.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,

    /// Wallet allowances are granted to
    #[serde(default = "default_target_wallet")]
    pub target_wallet: String,

    /// Wallet that receives transfers
    #[serde(default = "default_receiver_wallet")]
    pub receiver_wallet: String,

    /// Operator key. Loaded and redacted only; nothing signs with it yet.
    #[serde(default)]
    pub private_key: Option<Secret>,

    #[serde(default)]
    pub hedera_network: LedgerNetwork,

    /// Overrides the public mirror node of `hedera_network`
    #[serde(default)]
    pub mirror_node_url: Option<String>,

    #[serde(default)]
    pub telegram_bot_token: Option<Secret>,

    #[serde(default)]
    pub telegram_chat_id: Option<String>,

    #[serde(default = "default_telegram_api_url")]
    pub telegram_api_url: String,

    #[serde(default = "default_geolocation_api_url")]
    pub geolocation_api_url: String,

    /// Timeout applied to every outbound HTTP request
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

fn default_target_wallet() -> String {
    "0.0.9177142".to_string()
}

fn default_receiver_wallet() -> String {
    "0.0.9440367".to_string()
}

fn default_telegram_api_url() -> String {
    DEFAULT_TELEGRAM_API_URL.to_string()
}

fn default_geolocation_api_url() -> String {
    DEFAULT_GEOLOCATION_API_URL.to_string()
}

fn default_request_timeout_seconds() -> u64 {
    10
}

impl Settings {
    /// Load settings from an optional config file, then the process environment.
    ///
    /// An explicit `config_path` must exist; the default file is optional.
    pub fn load(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let file = match config_path {
            Some(path) => File::with_name(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let config = Config::builder()
            .add_source(file)
            .add_source(Environment::default().separator(ENV_NESTING_SEPARATOR))
            .build()?;

        Self::from_config(config)
    }

    /// Deserialize and validate settings from an already-built `Config`
    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut urls = vec![
            ("telegram_api_url", self.telegram_api_url.as_str()),
            ("geolocation_api_url", self.geolocation_api_url.as_str()),
        ];
        if let Some(mirror) = self.mirror_node_url() {
            urls.push(("mirror_node_url", mirror));
        }

        for (key, value) in urls {
            Url::parse(value).map_err(|e| ConfigError::Message(format!("invalid {key} '{value}': {e}")))?;
        }

        if self.request_timeout_seconds == 0 {
            return Err(ConfigError::Message("request_timeout_seconds must be positive".to_string()));
        }

        Ok(())
    }

    pub fn mirror_node_url(&self) -> Option<&str> {
        self.mirror_node_url.as_deref().filter(|url| !url.trim().is_empty())
    }

    /// True when both the bot token and chat id are present and non-empty
    pub fn telegram_configured(&self) -> bool {
        self.telegram_credentials().is_some()
    }

    fn telegram_credentials(&self) -> Option<(&Secret, &str)> {
        let token = self
            .telegram_bot_token
            .as_ref()
            .filter(|token| !token.expose().trim().is_empty())?;
        let chat_id = self
            .telegram_chat_id
            .as_deref()
            .filter(|chat_id| !chat_id.trim().is_empty())?;
        Some((token, chat_id))
    }

    pub fn telegram_adapter_config(&self) -> TelegramAdapterConfig {
        let (bot_token, chat_id) = match self.telegram_credentials() {
            Some((token, chat_id)) => (Some(token.clone()), Some(chat_id.to_string())),
            None => (None, None),
        };
        TelegramAdapterConfig::new(self.telegram_api_url.clone(), bot_token, chat_id)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            target_wallet: default_target_wallet(),
            receiver_wallet: default_receiver_wallet(),
            private_key: None,
            hedera_network: LedgerNetwork::default(),
            mirror_node_url: None,
            telegram_bot_token: None,
            telegram_chat_id: None,
            telegram_api_url: default_telegram_api_url(),
            geolocation_api_url: default_geolocation_api_url(),
            request_timeout_seconds: default_request_timeout_seconds(),
        }
    }
}
