use crate::dto::{ApiResponse, ChatTarget, GetUpdates, SendMessage, Update};
use crate::error::{TelegramError, TelegramErrorExt};
use reqwest::Client;
use rsvp_domain::config::TelegramConfig;
use rsvp_domain::notify::Recipient;
use rsvp_notify::{Messenger, SendFuture, TransportError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;
use tracing::trace;

/// Thin Bot API client. Cloning shares the connection pool.
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    /// `{api_url}/bot{token}`; never logged.
    base: String,
    request_timeout: Duration,
}

impl fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramClient")
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

impl TelegramClient {
    /// # Errors
    /// Fails when the token is blank or the HTTP client cannot be built.
    pub fn new(config: &TelegramConfig) -> Result<Self, TelegramError> {
        let token = config.token.trim();
        if token.is_empty() {
            return Err("telegram token is empty".into());
        }

        let request_timeout = Duration::from_secs(config.request_timeout_secs.max(1));
        let client = Client::builder()
            .connect_timeout(request_timeout)
            .build()
            .context("Building Telegram HTTP client")?;

        Ok(Self {
            client,
            base: format!("{}/bot{token}", config.api_url.trim_end_matches('/')),
            request_timeout,
        })
    }

    /// Sends plain text to `chat`.
    ///
    /// # Errors
    /// [`TelegramError::Api`] when Telegram refuses the message, otherwise
    /// transport or decode errors.
    pub async fn send_message(&self, chat: ChatTarget, text: &str) -> Result<(), TelegramError> {
        let body = SendMessage { chat_id: chat, text };
        let _: serde_json::Value = self.call("sendMessage", &body, self.request_timeout).await?;
        Ok(())
    }

    /// Long-polls for updates after `offset`, waiting up to `timeout`.
    ///
    /// # Errors
    /// Same as [`TelegramClient::send_message`].
    pub async fn get_updates(&self, offset: i64, timeout: Duration) -> Result<Vec<Update>, TelegramError> {
        let body = GetUpdates { offset, timeout: timeout.as_secs(), allowed_updates: ["message"] };
        self.call("getUpdates", &body, timeout + self.request_timeout).await
    }

    async fn call<B, T>(&self, method: &'static str, body: &B, timeout: Duration) -> Result<T, TelegramError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        trace!(method, "Calling Bot API");
        let response = self
            .client
            .post(format!("{}/{method}", self.base))
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(|err| TelegramError::Http { source: err.without_url(), context: Some(method.into()) })?;

        let bytes = response
            .bytes()
            .await
            .map_err(|err| TelegramError::Http { source: err.without_url(), context: Some(method.into()) })?;
        let envelope = serde_json::from_slice::<ApiResponse<T>>(&bytes).context(method)?;

        match envelope {
            ApiResponse { ok: true, result: Some(result), .. } => Ok(result),
            ApiResponse { error_code, description, .. } => Err(TelegramError::Api {
                code: error_code.unwrap_or_default(),
                message: description.unwrap_or_else(|| "no description".to_owned()).into(),
                context: Some(method.into()),
            }),
        }
    }
}

impl Messenger for TelegramClient {
    fn send<'a>(&'a self, recipient: &'a Recipient, text: &'a str) -> SendFuture<'a> {
        Box::pin(async move {
            self.send_message(ChatTarget::from(recipient), text).await.map_err(TransportError::from)
        })
    }
}
