//! Simulated location provider.
//!
//! Stands in for the platform's fused provider: scriptable settings
//! behavior, scriptable registration failures, and an `emit` hook that
//! feeds the active subscription.

use std::sync::Mutex;

use geofix_core::{Fix, ProviderError, TrackingConfig};
use tracing::debug;

use crate::{LocationProvider, SettingsStatus, Subscription};

/// Capacity of one subscription's fix feed.
const FEED_CAPACITY: usize = 64;

/// Scripted settings behavior for the simulated provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsScript {
    /// Settings always satisfy the request.
    Satisfied,
    /// Settings need a resolution dialog; `user_accepts` scripts the answer.
    RequiresResolution { user_accepts: bool },
    /// Settings are inadequate and cannot be fixed.
    Unfixable(String),
}

/// A location provider driven entirely by the test or demo harness.
#[derive(Debug)]
pub struct SimulatedProvider {
    settings: Mutex<SettingsScript>,
    register_failure: Mutex<Option<String>>,
    unregister_failure: Mutex<Option<String>>,
    last: Mutex<Option<Fix>>,
    feed: Mutex<Option<smol::channel::Sender<Fix>>>,
}

impl SimulatedProvider {
    pub fn new() -> Self {
        Self {
            settings: Mutex::new(SettingsScript::Satisfied),
            register_failure: Mutex::new(None),
            unregister_failure: Mutex::new(None),
            last: Mutex::new(None),
            feed: Mutex::new(None),
        }
    }

    pub fn with_settings(self, script: SettingsScript) -> Self {
        *self.settings.lock().unwrap() = script;
        self
    }

    /// Make the next `request_updates` fail with the given reason.
    pub fn with_register_failure(self, reason: &str) -> Self {
        *self.register_failure.lock().unwrap() = Some(reason.to_string());
        self
    }

    /// Make `remove_updates` fail with the given reason.
    pub fn with_unregister_failure(self, reason: &str) -> Self {
        *self.unregister_failure.lock().unwrap() = Some(reason.to_string());
        self
    }

    /// Produce a fix: refresh the last-location cache and, if a
    /// subscription is active, queue it on the feed.
    ///
    /// Returns whether the fix was queued for delivery.
    pub fn emit(&self, fix: Fix) -> bool {
        *self.last.lock().unwrap() = Some(fix.clone());
        match self.feed.lock().unwrap().as_ref() {
            Some(sender) => sender.try_send(fix).is_ok(),
            None => false,
        }
    }

    /// Whether a subscription is currently registered.
    pub fn has_subscriber(&self) -> bool {
        self.feed.lock().unwrap().is_some()
    }
}

impl Default for SimulatedProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationProvider for SimulatedProvider {
    async fn check_settings(&self, _config: &TrackingConfig) -> SettingsStatus {
        match &*self.settings.lock().unwrap() {
            SettingsScript::Satisfied => SettingsStatus::Satisfied,
            SettingsScript::RequiresResolution { .. } => SettingsStatus::ResolutionRequired,
            SettingsScript::Unfixable(reason) => SettingsStatus::Unfixable(reason.clone()),
        }
    }

    async fn resolve_settings(&self, _config: &TrackingConfig) -> bool {
        let mut settings = self.settings.lock().unwrap();
        match &*settings {
            SettingsScript::RequiresResolution { user_accepts: true } => {
                *settings = SettingsScript::Satisfied;
                true
            }
            _ => false,
        }
    }

    async fn request_updates(
        &self,
        config: &TrackingConfig,
    ) -> Result<Subscription, ProviderError> {
        if let Some(reason) = self.register_failure.lock().unwrap().clone() {
            return Err(ProviderError::RegisterFailed(reason));
        }
        let (sender, receiver) = smol::channel::bounded(FEED_CAPACITY);
        // Replacing the sender closes any previous feed.
        *self.feed.lock().unwrap() = Some(sender);
        debug!(
            priority = config.priority.as_str(),
            interval_ms = config.update_interval.as_millis() as u64,
            "simulated subscription registered"
        );
        Ok(Subscription::new(receiver))
    }

    fn remove_updates(&self) -> Result<(), ProviderError> {
        // Dropping the sender closes the feed and ends the pump.
        self.feed.lock().unwrap().take();
        if let Some(reason) = self.unregister_failure.lock().unwrap().clone() {
            return Err(ProviderError::UnregisterFailed(reason));
        }
        debug!("simulated subscription removed");
        Ok(())
    }

    fn last_location(&self) -> Option<Fix> {
        self.last.lock().unwrap().clone()
    }
}
