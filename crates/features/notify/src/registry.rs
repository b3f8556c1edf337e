use crate::verifier::IdentityVerifier;
use parking_lot::RwLock;
use rsvp_domain::notify::{ChannelId, RegistrationResult};
use std::sync::Arc;
use tracing::{info, trace};

/// Runtime set of administrator chats.
///
/// Cloning is cheap and every clone shares the same set. Writes are serialized
/// behind one lock, so a [`AdminRegistry::list`] snapshot never sees a
/// half-applied registration and concurrent registrations of the same chat
/// report [`RegistrationResult::NewlyRegistered`] exactly once. The lock is
/// never held across an `.await`.
#[derive(Debug, Clone)]
pub struct AdminRegistry {
    verifier: Arc<IdentityVerifier>,
    channels: Arc<RwLock<Vec<ChannelId>>>,
}

impl AdminRegistry {
    #[must_use]
    pub fn new(verifier: IdentityVerifier) -> Self {
        Self::with_channels(verifier, [])
    }

    /// Starts pre-populated (e.g. from configuration). Duplicates are dropped,
    /// first occurrence wins.
    #[must_use]
    pub fn with_channels(
        verifier: IdentityVerifier,
        seed: impl IntoIterator<Item = ChannelId>,
    ) -> Self {
        let mut channels = Vec::new();
        for id in seed {
            if !channels.contains(&id) {
                channels.push(id);
            }
        }
        Self { verifier: Arc::new(verifier), channels: Arc::new(RwLock::new(channels)) }
    }

    /// Registers `channel` for `identity` if the identity is an administrator.
    pub fn register(&self, identity: &str, channel: ChannelId) -> RegistrationResult {
        if !self.verifier.is_admin(identity) {
            trace!(%channel, "Registration ignored for non-admin sender");
            return RegistrationResult::RejectedNotAdmin;
        }

        let mut channels = self.channels.write();
        if channels.contains(&channel) {
            return RegistrationResult::AlreadyRegistered;
        }
        channels.push(channel);
        let total = channels.len();
        drop(channels);

        info!(%channel, username = identity, total, "Administrator chat registered");
        RegistrationResult::NewlyRegistered
    }

    /// Consistent copy of the registered chats in insertion order.
    #[must_use]
    pub fn list(&self) -> Vec<ChannelId> {
        self.channels.read().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.read().is_empty()
    }

    #[must_use]
    pub fn verifier(&self) -> &IdentityVerifier {
        &self.verifier
    }
}
