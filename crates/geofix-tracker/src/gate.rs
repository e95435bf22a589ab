//! Permission gate in front of the platform backend.

use std::sync::Arc;

use geofix_core::PermissionOutcome;
use geofix_provider::PermissionBackend;
use tracing::{info, warn};

/// Checks and, when needed, requests the fine-location permission.
#[derive(Debug)]
pub struct PermissionGate<B: PermissionBackend> {
    backend: Arc<B>,
}

impl<B: PermissionBackend> Clone for PermissionGate<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B: PermissionBackend> PermissionGate<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Whether the permission is currently granted. Pure query.
    pub fn check(&self) -> bool {
        self.backend.check()
    }

    /// Short-circuits to `Granted` without prompting when already granted,
    /// otherwise shows the prompt and waits for the outcome.
    pub async fn ensure(&self) -> PermissionOutcome {
        if self.backend.check() {
            return PermissionOutcome::Granted;
        }
        info!("requesting fine-location permission");
        let outcome = self.backend.request().await;
        if outcome == PermissionOutcome::Denied {
            warn!("fine-location permission denied");
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use geofix_provider::StaticPermissions;

    use super::*;

    #[test]
    fn test_ensure_short_circuits_when_granted() {
        let backend = Arc::new(StaticPermissions::granted());
        let gate = PermissionGate::new(backend.clone());
        assert!(gate.check());

        let outcome = smol::block_on(gate.ensure());
        assert_eq!(outcome, PermissionOutcome::Granted);
        assert_eq!(backend.prompt_count(), 0);
    }

    #[test]
    fn test_ensure_prompts_when_not_granted() {
        let backend = Arc::new(StaticPermissions::denying());
        let gate = PermissionGate::new(backend.clone());
        assert!(!gate.check());

        let outcome = smol::block_on(gate.ensure());
        assert_eq!(outcome, PermissionOutcome::Denied);
        assert_eq!(backend.prompt_count(), 1);
    }
}
