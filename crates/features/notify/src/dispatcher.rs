use crate::error::NotifyError;
use crate::registry::AdminRegistry;
use crate::transport::{Messenger, TransportError};
use fxhash::FxHashMap;
use rsvp_domain::config::DispatchConfig;
use rsvp_domain::notify::{DispatchOutcome, DispatchReport, Recipient};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Fanout tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSettings {
    /// Upper bound for one recipient send.
    pub send_timeout: Duration,
    /// Sends in flight at once. `1` means strictly sequential, in snapshot order.
    pub concurrency: usize,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self { send_timeout: DEFAULT_SEND_TIMEOUT, concurrency: 1 }
    }
}

impl From<&DispatchConfig> for DispatchSettings {
    fn from(cfg: &DispatchConfig) -> Self {
        Self {
            send_timeout: Duration::from_millis(cfg.send_timeout_ms.max(1)),
            concurrency: cfg.concurrency.max(1),
        }
    }
}

/// Sends one message to every known administrator and tallies the results.
///
/// Recipients come from an [`AdminRegistry`] snapshot; while nobody has
/// registered yet the allow-listed usernames are tried instead. One failed
/// recipient never stops the others.
#[derive(Debug, Clone)]
pub struct FanoutDispatcher {
    registry: AdminRegistry,
    messenger: Arc<dyn Messenger>,
    settings: DispatchSettings,
}

impl FanoutDispatcher {
    #[must_use]
    pub fn new(
        registry: AdminRegistry,
        messenger: Arc<dyn Messenger>,
        settings: DispatchSettings,
    ) -> Self {
        let settings = DispatchSettings { concurrency: settings.concurrency.max(1), ..settings };
        Self { registry, messenger, settings }
    }

    /// Delivers `message` and reports per-recipient results.
    ///
    /// # Errors
    /// Returns [`NotifyError::Configuration`] without sending anything when
    /// neither a registered chat nor an allow-listed username exists.
    pub async fn dispatch(&self, message: &str) -> Result<DispatchReport, NotifyError> {
        let recipients = self.recipients()?;
        debug!(
            recipients = recipients.len(),
            concurrency = self.settings.concurrency,
            "Starting notification fanout"
        );

        let outcomes = if self.settings.concurrency == 1 || recipients.len() == 1 {
            self.send_sequential(recipients, message).await
        } else {
            self.send_bounded(recipients, message).await
        };

        let report: DispatchReport = outcomes.into_iter().collect();
        if report.failure_count > 0 {
            warn!(
                delivered = report.success_count,
                failed = report.failure_count,
                "Notification fanout finished with failures"
            );
        } else {
            info!(delivered = report.success_count, "Notification fanout finished");
        }
        Ok(report)
    }

    fn recipients(&self) -> Result<Vec<Recipient>, NotifyError> {
        let snapshot = self.registry.list();
        if !snapshot.is_empty() {
            return Ok(snapshot.into_iter().map(Recipient::Channel).collect());
        }

        let usernames = self.registry.verifier().usernames();
        if usernames.is_empty() {
            return Err(NotifyError::Configuration {
                message: "no registered chats and no allow-listed usernames".into(),
                context: Some("Resolving notification recipients".into()),
            });
        }

        warn!(
            usernames = usernames.len(),
            "No administrator chat registered yet; falling back to usernames"
        );
        Ok(usernames.iter().cloned().map(Recipient::Username).collect())
    }

    async fn send_sequential(
        &self,
        recipients: Vec<Recipient>,
        message: &str,
    ) -> Vec<DispatchOutcome> {
        let mut outcomes = Vec::with_capacity(recipients.len());
        for recipient in recipients {
            outcomes.push(
                deliver(self.messenger.as_ref(), recipient, message, self.settings.send_timeout)
                    .await,
            );
        }
        outcomes
    }

    /// Runs at most `concurrency` sends at once; outcomes keep snapshot order.
    async fn send_bounded(&self, recipients: Vec<Recipient>, message: &str) -> Vec<DispatchOutcome> {
        let permits = Arc::new(Semaphore::new(self.settings.concurrency));
        let message: Arc<str> = Arc::from(message);
        let mut tasks = JoinSet::new();
        let mut slots: FxHashMap<tokio::task::Id, usize> = FxHashMap::default();
        let mut outcomes: Vec<Option<DispatchOutcome>> = vec![None; recipients.len()];

        for (slot, recipient) in recipients.iter().cloned().enumerate() {
            let permits = Arc::clone(&permits);
            let messenger = Arc::clone(&self.messenger);
            let message = Arc::clone(&message);
            let limit = self.settings.send_timeout;

            let handle = tasks.spawn(async move {
                let Ok(_permit) = permits.acquire_owned().await else {
                    return DispatchOutcome::failed(recipient, "dispatcher shut down");
                };
                deliver(messenger.as_ref(), recipient, &message, limit).await
            });
            slots.insert(handle.id(), slot);
        }

        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((id, outcome)) => {
                    if let Some(&slot) = slots.get(&id) {
                        outcomes[slot] = Some(outcome);
                    }
                },
                Err(err) => {
                    warn!(error = %err, "Notification send task aborted");
                    if let Some(&slot) = slots.get(&err.id()) {
                        outcomes[slot] = Some(DispatchOutcome::failed(
                            recipients[slot].clone(),
                            format!("send task aborted: {err}"),
                        ));
                    }
                },
            }
        }

        outcomes
            .into_iter()
            .zip(recipients)
            .map(|(outcome, recipient)| {
                outcome.unwrap_or_else(|| DispatchOutcome::failed(recipient, "send task lost"))
            })
            .collect()
    }
}

async fn deliver(
    messenger: &dyn Messenger,
    recipient: Recipient,
    message: &str,
    limit: Duration,
) -> DispatchOutcome {
    let result = match tokio::time::timeout(limit, messenger.send(&recipient, message)).await {
        Ok(result) => result,
        Err(_) => Err(TransportError::Timeout { millis: limit.as_millis(), context: None }),
    };

    match result {
        Ok(()) => {
            info!(%recipient, "Notification delivered");
            DispatchOutcome::delivered(recipient)
        },
        Err(err) => {
            warn!(%recipient, error = %err, "Notification delivery failed");
            DispatchOutcome::failed(recipient, err.to_string())
        },
    }
}
