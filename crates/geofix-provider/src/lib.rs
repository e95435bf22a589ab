//! geofix-provider - The platform seam
//!
//! Traits for the two external collaborators of a location session:
//! the platform location provider and the platform permission system.
//! The fused accuracy algorithm itself is out of scope; the shipped
//! implementations are simulated backends for tests and demos.

mod permissions;
mod simulated;

use std::future::Future;

use geofix_core::{Fix, PermissionOutcome, ProviderError, TrackingConfig};

pub use permissions::{ManualPermissions, StaticPermissions};
pub use simulated::{SettingsScript, SimulatedProvider};

/// Outcome of checking whether device settings can satisfy a config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsStatus {
    /// All location settings are satisfied.
    Satisfied,
    /// A platform dialog may fix the settings.
    ResolutionRequired,
    /// The settings cannot be fixed from here.
    Unfixable(String),
}

/// An active feed of fixes from the platform.
///
/// Closes when the provider unregisters the subscription.
#[derive(Debug)]
pub struct Subscription {
    receiver: smol::channel::Receiver<Fix>,
}

impl Subscription {
    pub fn new(receiver: smol::channel::Receiver<Fix>) -> Self {
        Self { receiver }
    }

    /// Next fix from the feed, or `None` once the feed is closed.
    pub async fn next_fix(&self) -> Option<Fix> {
        self.receiver.recv().await.ok()
    }
}

/// The platform's location provider, treated as an opaque capability.
pub trait LocationProvider: Send + Sync {
    /// Check whether the device's location settings can satisfy `config`.
    fn check_settings(
        &self,
        config: &TrackingConfig,
    ) -> impl Future<Output = SettingsStatus> + Send;

    /// Run the settings-resolution flow. Returns whether the user accepted.
    fn resolve_settings(&self, config: &TrackingConfig) -> impl Future<Output = bool> + Send;

    /// Register for periodic fixes matching `config`.
    fn request_updates(
        &self,
        config: &TrackingConfig,
    ) -> impl Future<Output = Result<Subscription, ProviderError>> + Send;

    /// Unregister the active subscription, closing its feed. Idempotent.
    fn remove_updates(&self) -> Result<(), ProviderError>;

    /// Most recent fix cached by the platform. Never blocks.
    fn last_location(&self) -> Option<Fix>;
}

/// The platform's permission system.
pub trait PermissionBackend: Send + Sync {
    /// Whether fine-location permission is currently granted. Pure query.
    fn check(&self) -> bool;

    /// Show the permission prompt and wait for the user's answer.
    fn request(&self) -> impl Future<Output = PermissionOutcome> + Send;
}
