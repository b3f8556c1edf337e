//! HTTP kernel shared by the server binary and the feature slices.

mod health;
mod router;
mod state;

pub use health::mark_started;
pub use router::system_router;
pub use state::{ApiState, ApiStateBuilder, ApiStateError, ApiStateErrorExt, ApiStateInner};
