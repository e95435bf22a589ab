//! geofix-tracker - Location session layer
//!
//! Owns the session state machine on top of the provider seam:
//! permission gate → settings check → subscription → serialized
//! delivery of fixes to a single registered listener.

pub mod gate;
pub mod session;
pub mod sink;

pub use gate::PermissionGate;
pub use session::LocationSession;
pub use sink::UpdateSink;
