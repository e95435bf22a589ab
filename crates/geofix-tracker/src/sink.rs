//! Update sink: the single replaceable listener registration.

use std::fmt;
use std::sync::{Arc, Mutex};

use geofix_core::Fix;
use tracing::debug;

/// Callback receiving delivered fixes.
pub type Listener = Box<dyn Fn(&Fix) + Send + 'static>;

/// At-most-one consumer for delivered fixes.
///
/// Delivery without a listener is a silent drop, not an error.
/// Cloning shares the registration.
#[derive(Clone, Default)]
pub struct UpdateSink {
    listener: Arc<Mutex<Option<Listener>>>,
}

impl UpdateSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current registration.
    pub fn set_listener<F>(&self, listener: F)
    where
        F: Fn(&Fix) + Send + 'static,
    {
        *self.listener.lock().unwrap() = Some(Box::new(listener));
    }

    /// Clear the registration. No-op when none is set.
    pub fn clear_listener(&self) {
        self.listener.lock().unwrap().take();
    }

    pub fn has_listener(&self) -> bool {
        self.listener.lock().unwrap().is_some()
    }

    /// Forward a fix to the listener, if any. Returns whether it was consumed.
    pub fn deliver(&self, fix: &Fix) -> bool {
        match self.listener.lock().unwrap().as_ref() {
            Some(listener) => {
                listener(fix);
                true
            }
            None => {
                debug!("no listener registered; fix dropped");
                false
            }
        }
    }
}

impl fmt::Debug for UpdateSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateSink")
            .field("has_listener", &self.has_listener())
            .finish()
    }
}
