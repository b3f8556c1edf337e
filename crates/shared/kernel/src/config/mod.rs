use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use rsvp_domain::config::ApiConfig;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Flat variables of the original deployment and the keys they override.
const LEGACY_OVERRIDES: [(&str, &str); 3] = [
    ("TELEGRAM_BOT_TOKEN", "telegram.token"),
    ("ALLOWED_USERS", "admins.usernames"),
    ("ADMIN_CHAT_IDS", "admins.chat_ids"),
];

/// Custom error type for config loading.
#[rsvp_derive::rsvp_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },

    #[error("Invalid configuration{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// A reusable configuration loader that combines file-based settings with environment overrides.
///
/// Layers, lowest priority first:
/// 1. **Base File**: `path` (default `server`, any extension `config` understands). Missing is fine.
/// 2. **Environment Overrides**: variables prefixed with `RSVP__`, nested with double
///    underscores (e.g. `RSVP__TELEGRAM__TOKEN` maps to `telegram.token`).
/// 3. **Deployment Variables**: `TELEGRAM_BOT_TOKEN`, `ALLOWED_USERS` and `ADMIN_CHAT_IDS`.
///
/// # Errors
/// Fails when a present file is malformed or the merged values do not match `T`.
///
/// # Example
/// ```rust,no_run
/// use rsvp_kernel::config::load_config;
/// use rsvp_domain::config::ApiConfig;
///
/// let cfg: ApiConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let effective_path = path.map_or_else(|| PathBuf::from("server"), |p| p.as_ref().to_path_buf());

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(false))
        .add_source(
            Environment::with_prefix("RSVP")
                .separator("__")
                .convert_case(config::Case::Snake), // e.g. RSVP__DISPATCH__CONCURRENCY
        );
    let builder = legacy_overrides(builder, |name| std::env::var(name).ok())?;

    info!("Loading config from {}", effective_path.display());

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

fn legacy_overrides(
    mut builder: ConfigBuilder<DefaultState>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    for (variable, key) in LEGACY_OVERRIDES {
        let value = lookup(variable).filter(|value| !value.trim().is_empty());
        if value.is_some() {
            info!(variable, key, "Applying deployment variable override");
        }
        builder = builder.set_override_option(key, value).context("Applying deployment variables")?;
    }
    Ok(builder)
}

/// Startup checks that must pass before any component is built.
///
/// # Errors
/// Returns [`ConfigError::Validation`] when Telegram is enabled without a token
/// or the administrator allow-list is empty.
pub fn validate(config: &ApiConfig) -> Result<(), ConfigError> {
    if config.telegram.enabled && !config.telegram.has_token() {
        return Err(ConfigError::Validation {
            message: "telegram.token is required (set TELEGRAM_BOT_TOKEN)".into(),
            context: None,
        });
    }

    if config.admins.allow_list().is_empty() {
        return Err(ConfigError::Validation {
            message: "admins.usernames is empty (set ALLOWED_USERS)".into(),
            context: None,
        });
    }

    let configured = config.admins.chat_ids.split(',').filter(|id| !id.trim().is_empty()).count();
    let seeded = config.admins.seeded_chat_ids().len();
    if seeded < configured {
        debug!(skipped = configured - seeded, "Ignoring malformed admin chat ids");
    }

    if config.dispatch.concurrency == 0 {
        warn!("dispatch.concurrency is 0; using sequential delivery");
    }

    Ok(())
}
