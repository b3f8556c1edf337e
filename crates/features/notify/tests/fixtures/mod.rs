use parking_lot::Mutex;
use rsvp_domain::guest::{GuestSubmission, TransportMode};
use rsvp_domain::notify::{ChannelId, Recipient};
use rsvp_notify::{Messenger, SendFuture, TransportError};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Scriptable in-memory messenger that records every delivery attempt.
#[derive(Debug, Default)]
pub struct MockMessenger {
    failing: Vec<Recipient>,
    delays: Vec<(Recipient, Duration)>,
    sent: Mutex<Vec<(Recipient, String)>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl MockMessenger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn failing_for(mut self, recipient: Recipient) -> Self {
        self.failing.push(recipient);
        self
    }

    #[must_use]
    pub fn delayed_for(mut self, recipient: Recipient, delay: Duration) -> Self {
        self.delays.push((recipient, delay));
        self
    }

    #[must_use]
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Recipients in the order their sends started.
    pub fn attempts(&self) -> Vec<Recipient> {
        self.sent.lock().iter().map(|(recipient, _)| recipient.clone()).collect()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent.lock().iter().map(|(_, text)| text.clone()).collect()
    }

    /// Highest number of sends observed running at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

impl Messenger for MockMessenger {
    fn send<'a>(&'a self, recipient: &'a Recipient, text: &'a str) -> SendFuture<'a> {
        Box::pin(async move {
            self.sent.lock().push((recipient.clone(), text.to_owned()));
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            let delay = self
                .delays
                .iter()
                .find(|(target, _)| target == recipient)
                .map_or(Duration::from_millis(5), |(_, delay)| *delay);
            tokio::time::sleep(delay).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            if self.failing.contains(recipient) {
                return Err(TransportError::Rejected {
                    message: "Forbidden: bot was blocked by the user".into(),
                    context: None,
                });
            }
            Ok(())
        })
    }
}

pub fn chat(id: i64) -> Recipient {
    Recipient::Channel(ChannelId(id))
}

pub fn user(name: &str) -> Recipient {
    Recipient::Username(name.to_owned())
}

pub fn car_guest() -> GuestSubmission {
    GuestSubmission {
        full_name: "Ivan Petrov".to_owned(),
        phone: "+7 900 000-00-00".to_owned(),
        transport_mode: TransportMode::Car,
        car_plate: Some("A123BC".to_owned()),
    }
}

pub fn transfer_guest() -> GuestSubmission {
    GuestSubmission {
        full_name: "Maria Ivanova".to_owned(),
        phone: "+7 911 111-11-11".to_owned(),
        transport_mode: TransportMode::Transfer,
        car_plate: Some("IGNORED".to_owned()),
    }
}
