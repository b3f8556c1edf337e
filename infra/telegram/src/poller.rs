use crate::client::TelegramClient;
use crate::dto::{ChatTarget, Update};
use rsvp_domain::config::TelegramConfig;
use rsvp_domain::notify::{ChannelId, SenderIdentity};
use rsvp_notify::{Notifier, parse_command};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// A reply produced for one inbound command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub chat: ChannelId,
    pub text: String,
}

/// Routes one update through the notifier; `None` for anything that is not a bot command.
#[must_use]
pub fn handle_update(notifier: &Notifier, update: &Update) -> Option<Reply> {
    let message = update.message.as_ref()?;
    let trigger = parse_command(message.text.as_deref()?)?;
    let sender = message.from.as_ref().map_or(
        SenderIdentity { id: message.chat.id, username: None },
        SenderIdentity::from,
    );
    let chat = ChannelId(message.chat.id);

    let text = notifier.on_command(trigger, &sender, chat);
    Some(Reply { chat, text })
}

/// Long-polling loop feeding bot commands into the [`Notifier`].
#[derive(Debug)]
pub struct UpdatePoller {
    client: TelegramClient,
    notifier: Notifier,
    poll_timeout: Duration,
    backoff: Duration,
}

impl UpdatePoller {
    #[must_use]
    pub fn new(client: TelegramClient, notifier: Notifier, config: &TelegramConfig) -> Self {
        Self {
            client,
            notifier,
            poll_timeout: Duration::from_secs(config.poll_timeout_secs),
            backoff: Duration::from_secs(config.error_backoff_secs.max(1)),
        }
    }

    /// Polls until `shutdown` flips to `true` or its sender is dropped.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(timeout_secs = self.poll_timeout.as_secs(), "Telegram update poller started");
        let mut offset = 0_i64;

        loop {
            if *shutdown.borrow() {
                break;
            }

            let batch = tokio::select! {
                batch = self.client.get_updates(offset, self.poll_timeout) => batch,
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                },
            };

            match batch {
                Ok(updates) => {
                    for update in &updates {
                        offset = offset.max(update.update_id + 1);
                        self.dispatch(update).await;
                    }
                },
                Err(err) => {
                    warn!(error = %err, backoff_secs = self.backoff.as_secs(), "Polling Telegram failed");
                    tokio::select! {
                        () = tokio::time::sleep(self.backoff) => {},
                        changed = shutdown.changed() => {
                            if changed.is_err() {
                                break;
                            }
                        },
                    }
                },
            }
        }

        info!("Telegram update poller stopped");
    }

    async fn dispatch(&self, update: &Update) {
        let Some(reply) = handle_update(&self.notifier, update) else {
            debug!(update_id = update.update_id, "Ignoring non-command update");
            return;
        };

        if let Err(err) = self.client.send_message(ChatTarget::Id(reply.chat.0), &reply.text).await {
            warn!(chat = %reply.chat, error = %err, "Sending command reply failed");
        }
    }
}
