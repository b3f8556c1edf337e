use crate::constants::strip_marker;
use crate::notify::ChannelId;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level service configuration.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfigInner {
    pub server: ServerConfig,
    pub telegram: TelegramConfig,
    pub admins: AdminsConfig,
    pub dispatch: DispatchConfig,
    pub logging: LoggingConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(flatten, default)]
    inner: Arc<ApiConfigInner>,
}

impl Deref for ApiConfig {
    type Target = ApiConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for ApiConfig {
    fn deref_mut(&mut self) -> &mut ApiConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub ssl: Option<SslConfig>,
    /// Answer CORS preflights for any origin.
    pub cors_allow_any: bool,
}

/// TLS certificate/key paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Telegram Bot API access.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Run the update poller and deliver through the Bot API.
    pub enabled: bool,
    pub token: String,
    pub api_url: String,
    /// Long-poll window passed to `getUpdates`.
    pub poll_timeout_secs: u64,
    pub request_timeout_secs: u64,
    /// Pause after a failed poll before retrying.
    pub error_backoff_secs: u64,
}

/// Administrator allow-list and optional pre-registered chats.
///
/// Both fields are comma-separated lists so they can be supplied as a single
/// environment variable.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdminsConfig {
    pub usernames: String,
    pub chat_ids: String,
}

/// Fanout tuning.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Upper bound for a single recipient send.
    pub send_timeout_ms: u64,
    /// Sends in flight at once; `1` delivers strictly in registry order.
    pub concurrency: usize,
}

/// Log output settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub env_filter: Option<String>,
    pub console: bool,
    pub directory: Option<PathBuf>,
    pub json: bool,
    pub max_files: usize,
}

impl AdminsConfig {
    /// Raw allow-list entries, trimmed, blanks dropped; markers kept.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.usernames.split(',').map(str::trim).filter(|entry| !entry.is_empty())
    }

    /// Normalized allow-list: one leading marker stripped, blanks dropped.
    #[must_use]
    pub fn allow_list(&self) -> Vec<String> {
        self.entries()
            .map(|entry| strip_marker(entry).trim())
            .filter(|entry| !entry.is_empty())
            .map(str::to_owned)
            .collect()
    }

    /// Pre-registered chat ids; entries that do not parse are skipped.
    #[must_use]
    pub fn seeded_chat_ids(&self) -> Vec<ChannelId> {
        self.chat_ids
            .split(',')
            .filter_map(|entry| entry.trim().parse::<i64>().ok())
            .map(ChannelId)
            .collect()
    }
}

impl TelegramConfig {
    #[must_use]
    pub fn has_token(&self) -> bool {
        !self.token.trim().is_empty()
    }
}

// --- Default ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            ssl: None,
            cors_allow_any: true,
        }
    }
}

impl Default for SslConfig {
    fn default() -> Self {
        Self { cert: PathBuf::from("server.crt"), key: PathBuf::from("server.key") }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            token: String::new(),
            api_url: "https://api.telegram.org".to_owned(),
            poll_timeout_secs: 10,
            request_timeout_secs: 30,
            error_backoff_secs: 5,
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self { send_timeout_ms: 10_000, concurrency: 1 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            env_filter: None,
            console: true,
            directory: None,
            json: false,
            max_files: 10,
        }
    }
}
