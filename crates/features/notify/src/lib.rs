//! # Notify
//!
//! Administrator registration and guest-notification fanout.
//!
//! The [`Notifier`] owns one [`AdminRegistry`] and hands it to both inbound
//! paths: bot commands go through [`Notifier::on_command`], guest submissions
//! through [`Notifier::submit`]. Outbound delivery is abstracted by the
//! [`Messenger`] port so transports stay outside this crate.
//!
//! ```ignore
//! let notifier = Notifier::builder()
//!     .allow_list(["alice", "@bob"])
//!     .messenger(Arc::new(telegram))
//!     .build()?;
//!
//! let reply = notifier.on_command(CommandTrigger::Register, &sender, ChannelId(42));
//! let summary = notifier.submit(&submission).await?;
//! ```

mod commands;
mod composer;
mod dispatcher;
mod error;
mod registry;
mod transport;
mod verifier;

pub use commands::{CommandRouter, parse_command};
pub use composer::{compose, compose_at};
pub use dispatcher::{DispatchSettings, FanoutDispatcher};
pub use error::{NotifyError, NotifyErrorExt};
pub use registry::AdminRegistry;
pub use transport::{Messenger, SendFuture, TransportError, TransportErrorExt};
pub use verifier::IdentityVerifier;

use rsvp_domain::config::ApiConfig;
use rsvp_domain::guest::GuestSubmission;
use rsvp_domain::notify::{
    ChannelId, CommandTrigger, DispatchReport, DispatchSummary, SenderIdentity,
};
use rsvp_domain::registry::{FeatureSlice, InitializedSlice};
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

#[derive(Debug)]
pub struct NotifierInner {
    registry: AdminRegistry,
    router: CommandRouter,
    dispatcher: FanoutDispatcher,
}

/// Notification service shared by the HTTP and bot paths.
#[derive(Debug, Clone)]
pub struct Notifier {
    inner: Arc<NotifierInner>,
}

impl std::ops::Deref for Notifier {
    type Target = NotifierInner;
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FeatureSlice for Notifier {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn name(&self) -> &'static str {
        "notify"
    }
}

impl Notifier {
    #[must_use]
    pub fn builder() -> NotifierBuilder {
        NotifierBuilder::default()
    }

    /// Builds the service from the `[admins]` and `[dispatch]` sections.
    ///
    /// # Errors
    /// Returns [`NotifyError::Configuration`] when the allow-list is empty.
    pub fn from_config(
        config: &ApiConfig,
        messenger: Arc<dyn Messenger>,
    ) -> Result<Self, NotifyError> {
        let settings = DispatchSettings::from(&config.dispatch);
        Self::builder()
            .allow_list(config.admins.entries())
            .seed_channels(config.admins.seeded_chat_ids())
            .messenger(messenger)
            .send_timeout(settings.send_timeout)
            .concurrency(settings.concurrency)
            .build()
            .context("Building notifier from configuration")
    }

    /// Composes and fans out the notification for one guest submission.
    ///
    /// Succeeds when at least one administrator received the message.
    ///
    /// # Errors
    /// - [`NotifyError::Configuration`] when there is nobody to notify at all.
    /// - [`NotifyError::NoRecipientsDelivered`] when every attempted send failed.
    pub async fn submit(&self, submission: &GuestSubmission) -> Result<DispatchSummary, NotifyError> {
        info!(transport = ?submission.transport_mode, "Guest submission received");
        debug!(name = %submission.full_name, phone = %submission.phone, "Guest submission details");

        let message = compose(submission);
        let report = self.dispatcher.dispatch(&message).await?;
        summarize(report)
    }

    /// Handles a bot command and returns the reply for the originating chat.
    #[must_use]
    pub fn on_command(
        &self,
        trigger: CommandTrigger,
        sender: &SenderIdentity,
        channel: ChannelId,
    ) -> String {
        debug!(?trigger, sender = sender.id, %channel, "Bot command received");
        self.router.on_command(trigger, sender, channel)
    }

    #[must_use]
    pub fn registry(&self) -> &AdminRegistry {
        &self.registry
    }
}

fn summarize(report: DispatchReport) -> Result<DispatchSummary, NotifyError> {
    if report.success_count == 0 && report.attempted() > 0 {
        error!(
            attempted = report.attempted(),
            errors = ?report.errors,
            "Guest notification reached no administrator"
        );
        return Err(NotifyError::NoRecipientsDelivered {
            attempted: report.attempted(),
            errors: report.errors,
            context: None,
        });
    }
    Ok(DispatchSummary::from(&report))
}

/// Step-by-step construction of a [`Notifier`].
#[derive(Debug, Default)]
pub struct NotifierBuilder {
    allow_list: Vec<String>,
    seed: Vec<ChannelId>,
    messenger: Option<Arc<dyn Messenger>>,
    settings: DispatchSettings,
}

impl NotifierBuilder {
    #[must_use]
    pub fn allow_list<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allow_list.extend(entries.into_iter().map(Into::into));
        self
    }

    /// Chats to register up front, before any `/start`.
    #[must_use]
    pub fn seed_channels(mut self, channels: impl IntoIterator<Item = ChannelId>) -> Self {
        self.seed.extend(channels);
        self
    }

    #[must_use]
    pub fn messenger(mut self, messenger: Arc<dyn Messenger>) -> Self {
        self.messenger = Some(messenger);
        self
    }

    #[must_use]
    pub const fn send_timeout(mut self, timeout: Duration) -> Self {
        self.settings.send_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn concurrency(mut self, concurrency: usize) -> Self {
        self.settings.concurrency = concurrency;
        self
    }

    /// # Errors
    /// Returns [`NotifyError::Configuration`] when the allow-list is empty or
    /// no messenger was supplied.
    pub fn build(self) -> Result<Notifier, NotifyError> {
        let Some(messenger) = self.messenger else {
            return Err(NotifyError::Configuration {
                message: "no messenger configured".into(),
                context: None,
            });
        };

        let verifier = IdentityVerifier::new(&self.allow_list)?;
        let registry = AdminRegistry::with_channels(verifier, self.seed);
        let router = CommandRouter::new(registry.clone());
        let dispatcher = FanoutDispatcher::new(registry.clone(), messenger, self.settings);

        info!(
            admins = registry.verifier().usernames().len(),
            seeded_chats = registry.len(),
            concurrency = self.settings.concurrency.max(1),
            "Notifier ready"
        );
        Ok(Notifier { inner: Arc::new(NotifierInner { registry, router, dispatcher }) })
    }
}

/// Initialize the notify feature slice.
///
/// # Errors
/// Returns an error if the notifier cannot be built from `config`.
pub fn init(config: &ApiConfig, messenger: Arc<dyn Messenger>) -> Result<InitializedSlice, NotifyError> {
    let slice = Notifier::from_config(config, messenger)?;
    info!("Notify slice initialized");
    Ok(InitializedSlice::new(slice))
}
