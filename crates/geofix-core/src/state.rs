//! Session state machine values.

/// Lifecycle state of a location session.
///
/// Fixes are delivered to the listener only while `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No subscription; ready to start.
    Idle,
    /// Waiting for the permission prompt outcome.
    AwaitingPermission,
    /// Waiting for the user to resolve location settings.
    AwaitingSettingsResolution,
    /// Subscription registered; fixes are flowing.
    Active,
    /// Explicitly stopped. A stopped session may be restarted.
    Stopped,
}

impl SessionState {
    /// Whether `start()` may begin a new subscription from this state.
    pub fn is_startable(self) -> bool {
        matches!(self, Self::Idle | Self::Stopped)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingPermission => "awaiting-permission",
            Self::AwaitingSettingsResolution => "awaiting-settings-resolution",
            Self::Active => "active",
            Self::Stopped => "stopped",
        }
    }
}
