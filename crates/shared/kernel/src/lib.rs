//! Kernel utilities shared across slices.
//! Keep this crate lightweight: configuration loading and the HTTP state every slice mounts on.
//!
//! ## Config loading
//! ```rust,no_run
//! use rsvp_domain::config::ApiConfig;
//! use rsvp_kernel::config::{load_config, validate};
//!
//! let cfg: ApiConfig = load_config(Some("server")).unwrap();
//! validate(&cfg).unwrap();
//! ```
pub mod config;
#[cfg(feature = "server")]
pub mod server;

pub use rsvp_domain as domain;
