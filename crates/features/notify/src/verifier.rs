use crate::error::NotifyError;
use rsvp_domain::constants::strip_marker;
use tracing::debug;

/// Decides whether a sender belongs to the configured administrator allow-list.
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct IdentityVerifier {
    /// As configured, marker-stripped; used for username fallback delivery.
    usernames: Vec<String>,
    /// Lowercased copies used for comparison.
    folded: Vec<String>,
}

impl IdentityVerifier {
    /// Builds the verifier from raw allow-list entries.
    ///
    /// # Errors
    /// Returns [`NotifyError::Configuration`] when no usable entry remains.
    pub fn new<I, S>(entries: I) -> Result<Self, NotifyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut usernames: Vec<String> = Vec::new();
        let mut folded: Vec<String> = Vec::new();

        for entry in entries {
            let name = normalize(entry.as_ref());
            if name.is_empty() {
                continue;
            }
            let key = name.to_lowercase();
            if !folded.contains(&key) {
                usernames.push(name.to_owned());
                folded.push(key);
            }
        }

        if usernames.is_empty() {
            return Err(NotifyError::Configuration {
                message: "administrator allow-list is empty".into(),
                context: None,
            });
        }

        debug!(admins = usernames.len(), "Identity verifier ready");
        Ok(Self { usernames, folded })
    }

    /// `true` when `identity` names an allow-listed administrator.
    ///
    /// Comparison ignores case and a leading `@`. Blank identities never match.
    #[must_use]
    pub fn is_admin(&self, identity: &str) -> bool {
        let name = normalize(identity);
        if name.is_empty() {
            return false;
        }
        let key = name.to_lowercase();
        self.folded.iter().any(|admin| *admin == key)
    }

    /// Allow-listed usernames in configuration order.
    #[must_use]
    pub fn usernames(&self) -> &[String] {
        &self.usernames
    }
}

fn normalize(raw: &str) -> &str {
    strip_marker(raw.trim()).trim()
}
