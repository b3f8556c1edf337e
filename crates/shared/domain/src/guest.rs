//! Guest contact submissions.

use serde::{Deserialize, Serialize};

/// How the guest plans to reach the venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    /// Organized shuttle.
    Transfer,
    /// Own vehicle.
    Car,
}

/// A validated guest submission handed to the notification core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestSubmission {
    pub full_name: String,
    pub phone: String,
    pub transport_mode: TransportMode,
    /// Only meaningful when `transport_mode` is [`TransportMode::Car`].
    pub car_plate: Option<String>,
}

impl GuestSubmission {
    /// The plate to print, if the guest arrives by car and gave a non-blank one.
    #[must_use]
    pub fn vehicle_plate(&self) -> Option<&str> {
        match self.transport_mode {
            TransportMode::Car => {
                self.car_plate.as_deref().map(str::trim).filter(|plate| !plate.is_empty())
            },
            TransportMode::Transfer => None,
        }
    }
}
