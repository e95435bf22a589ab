//! Simulated permission backends.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use geofix_core::PermissionOutcome;
use tracing::debug;

use crate::PermissionBackend;

/// Permission backend with a fixed prompt answer.
///
/// Counts prompts so tests can verify the grant short-circuit.
#[derive(Debug)]
pub struct StaticPermissions {
    granted: AtomicBool,
    answer: PermissionOutcome,
    prompts: AtomicUsize,
}

impl StaticPermissions {
    /// Permission already granted; a prompt should never be shown.
    pub fn granted() -> Self {
        Self {
            granted: AtomicBool::new(true),
            answer: PermissionOutcome::Granted,
            prompts: AtomicUsize::new(0),
        }
    }

    /// Permission not granted; the prompt answers `Denied`.
    pub fn denying() -> Self {
        Self {
            granted: AtomicBool::new(false),
            answer: PermissionOutcome::Denied,
            prompts: AtomicUsize::new(0),
        }
    }

    /// Permission not granted; the prompt answers `Granted`.
    pub fn granting_on_prompt() -> Self {
        Self {
            granted: AtomicBool::new(false),
            answer: PermissionOutcome::Granted,
            prompts: AtomicUsize::new(0),
        }
    }

    /// How many prompts have been shown.
    pub fn prompt_count(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }
}

impl PermissionBackend for StaticPermissions {
    fn check(&self) -> bool {
        self.granted.load(Ordering::SeqCst)
    }

    async fn request(&self) -> PermissionOutcome {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        debug!(answer = ?self.answer, "permission prompt shown");
        if self.answer == PermissionOutcome::Granted {
            self.granted.store(true, Ordering::SeqCst);
        }
        self.answer
    }
}

/// Permission backend whose prompt resolves only when told to.
///
/// Lets tests stop a session while the prompt is still pending and
/// deliver the outcome afterwards.
#[derive(Debug)]
pub struct ManualPermissions {
    granted: AtomicBool,
    answers: smol::channel::Sender<PermissionOutcome>,
    pending: smol::channel::Receiver<PermissionOutcome>,
}

impl ManualPermissions {
    pub fn new() -> Self {
        let (answers, pending) = smol::channel::unbounded();
        Self {
            granted: AtomicBool::new(false),
            answers,
            pending,
        }
    }

    /// Answer the pending (or next) prompt.
    pub fn resolve(&self, outcome: PermissionOutcome) {
        // Unbounded channel; try_send only fails when closed.
        let _ = self.answers.try_send(outcome);
    }
}

impl Default for ManualPermissions {
    fn default() -> Self {
        Self::new()
    }
}

impl PermissionBackend for ManualPermissions {
    fn check(&self) -> bool {
        self.granted.load(Ordering::SeqCst)
    }

    async fn request(&self) -> PermissionOutcome {
        let outcome = self
            .pending
            .recv()
            .await
            .unwrap_or(PermissionOutcome::Denied);
        if outcome == PermissionOutcome::Granted {
            self.granted.store(true, Ordering::SeqCst);
        }
        outcome
    }
}
