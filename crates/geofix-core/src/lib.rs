//! geofix-core - Core types for location tracking
//!
//! Data model shared by the provider seam and the session layer:
//! fixes, tracking configuration, session state, the error taxonomy
//! and the displacement math. No async, no I/O.

pub mod config;
pub mod error;
pub mod fix;
pub mod geodesy;
pub mod state;

pub use config::{AccuracyPriority, TrackingConfig};
pub use error::{PermissionOutcome, ProviderError, SessionError, SettingsFailure};
pub use fix::Fix;
pub use state::SessionState;
