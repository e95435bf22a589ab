//! Error taxonomy for the session layer and the provider seam.

use thiserror::Error;

/// Result of a permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionOutcome {
    Granted,
    Denied,
}

/// Failure reported by a location provider while (un)registering updates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("could not register for location updates: {0}")]
    RegisterFailed(String),

    #[error("could not unregister location updates: {0}")]
    UnregisterFailed(String),
}

/// Why the device's location settings cannot satisfy a tracking config.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsFailure {
    /// A resolution dialog was offered and the user declined it.
    #[error("location settings resolution was declined")]
    ResolutionDeclined,

    /// The settings are inadequate and cannot be fixed here.
    #[error("location settings are inadequate and cannot be fixed here: {0}")]
    Unfixable(String),
}

/// Failure of a `start()` attempt. All variants are retryable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("location permission was denied")]
    PermissionDenied,

    #[error("location settings cannot satisfy the request: {0}")]
    SettingsUnsatisfied(#[from] SettingsFailure),

    #[error("location update delivery failed: {0}")]
    Delivery(#[from] ProviderError),

    /// The session was stopped while permission or settings were pending.
    #[error("the session was stopped before the request completed")]
    Cancelled,
}
