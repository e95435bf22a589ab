//! Location session: the state machine owning one subscription.
//!
//! `start` sequences permission → settings → registration, `stop`
//! tears the subscription down. Every transition is guarded by the
//! session epoch: outcomes that arrive after `stop()` are discarded,
//! so no state changes after `Stopped`.

use std::sync::{Arc, Mutex};

use geofix_core::{
    geodesy, Fix, PermissionOutcome, SessionError, SessionState, SettingsFailure, TrackingConfig,
};
use geofix_provider::{LocationProvider, PermissionBackend, SettingsStatus, Subscription};
use tracing::{debug, error, info, warn};

use crate::gate::PermissionGate;
use crate::sink::UpdateSink;

struct Inner {
    state: SessionState,
    epoch: u64,
    last_delivered: Option<Fix>,
}

/// Verdict of the pump for one incoming fix.
enum PumpVerdict {
    Deliver,
    Suppress,
    Stale,
}

/// One location subscription and its state machine.
///
/// Cloning shares the underlying session; there is exactly one state
/// and one listener registration per logical session.
pub struct LocationSession<P: LocationProvider> {
    provider: Arc<P>,
    config: TrackingConfig,
    sink: UpdateSink,
    inner: Arc<Mutex<Inner>>,
}

impl<P: LocationProvider> Clone for LocationSession<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            config: self.config.clone(),
            sink: self.sink.clone(),
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: LocationProvider + 'static> LocationSession<P> {
    pub fn new(provider: Arc<P>, config: TrackingConfig) -> Self {
        Self {
            provider,
            config,
            sink: UpdateSink::new(),
            inner: Arc::new(Mutex::new(Inner {
                state: SessionState::Idle,
                epoch: 0,
                last_delivered: None,
            })),
        }
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock().unwrap().state
    }

    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    /// The listener registration for this session.
    pub fn sink(&self) -> &UpdateSink {
        &self.sink
    }

    /// Most recent fix cached by the provider. Never blocks; `None`
    /// when the provider has nothing (e.g. location switched off).
    pub fn last_known_fix(&self) -> Option<Fix> {
        self.provider.last_location()
    }

    /// Begin delivering fixes to the registered listener.
    ///
    /// Verifies permission through `gate`, then the device's location
    /// settings, then registers the subscription and transitions to
    /// `Active`. A registration failure leaves the session in its
    /// prior state. `start` on an already running session is a no-op.
    pub async fn start<B: PermissionBackend>(
        &self,
        gate: &PermissionGate<B>,
    ) -> Result<(), SessionError> {
        let epoch = {
            let mut inner = self.inner.lock().unwrap();
            if !inner.state.is_startable() {
                debug!(state = inner.state.as_str(), "start ignored");
                return Ok(());
            }
            inner.state = SessionState::AwaitingPermission;
            inner.last_delivered = None;
            inner.epoch
        };

        match gate.ensure().await {
            PermissionOutcome::Granted => {}
            PermissionOutcome::Denied => {
                self.revert(epoch, SessionState::Idle);
                return Err(SessionError::PermissionDenied);
            }
        }
        if !self.still_current(epoch) {
            return Err(SessionError::Cancelled);
        }

        match self.provider.check_settings(&self.config).await {
            SettingsStatus::Satisfied => {}
            SettingsStatus::ResolutionRequired => {
                info!("location settings need resolution");
                if !self.transition(epoch, SessionState::AwaitingSettingsResolution) {
                    return Err(SessionError::Cancelled);
                }
                let accepted = self.provider.resolve_settings(&self.config).await;
                if !self.still_current(epoch) {
                    return Err(SessionError::Cancelled);
                }
                if !accepted {
                    warn!("settings resolution declined");
                    self.revert(epoch, SessionState::Idle);
                    return Err(SettingsFailure::ResolutionDeclined.into());
                }
            }
            SettingsStatus::Unfixable(reason) => {
                error!(%reason, "location settings cannot satisfy the request");
                self.revert(epoch, SessionState::Idle);
                return Err(SettingsFailure::Unfixable(reason).into());
            }
        }

        let subscription = match self.provider.request_updates(&self.config).await {
            Ok(subscription) => subscription,
            Err(err) => {
                error!("could not register for location updates: {err}");
                self.revert(epoch, SessionState::Idle);
                return Err(SessionError::Delivery(err));
            }
        };
        if !self.transition(epoch, SessionState::Active) {
            // Stopped while registering; tear the registration back down.
            if let Err(err) = self.provider.remove_updates() {
                error!("could not unregister location updates: {err}");
            }
            return Err(SessionError::Cancelled);
        }

        info!(
            priority = self.config.priority.as_str(),
            displacement_m = self.config.min_displacement_m,
            "location session active"
        );
        self.spawn_pump(epoch, subscription);
        Ok(())
    }

    /// Stop delivering fixes. Idempotent, returns immediately.
    ///
    /// Bumps the epoch so any pending permission or settings outcome
    /// is discarded, unregisters the subscription and clears the
    /// listener.
    pub fn stop(&self) {
        let was_active = {
            let mut inner = self.inner.lock().unwrap();
            if inner.state == SessionState::Stopped {
                debug!("stop on an already stopped session");
                return;
            }
            let was_active = inner.state == SessionState::Active;
            inner.state = SessionState::Stopped;
            inner.epoch += 1;
            inner.last_delivered = None;
            was_active
        };

        if was_active {
            if let Err(err) = self.provider.remove_updates() {
                // Logged, not propagated: the session is stopped regardless.
                error!("could not unregister location updates: {err}");
            }
        }
        self.sink.clear_listener();
        info!("location session stopped");
    }

    /// Drive the subscription feed, filtering and delivering in order.
    fn spawn_pump(&self, epoch: u64, subscription: Subscription) {
        let session = self.clone();
        smol::spawn(async move {
            while let Some(fix) = subscription.next_fix().await {
                match session.admit(epoch, &fix) {
                    PumpVerdict::Deliver => {
                        session.sink.deliver(&fix);
                    }
                    PumpVerdict::Suppress => {}
                    PumpVerdict::Stale => break,
                }
            }
            debug!("fix feed closed");
        })
        .detach();
    }

    /// Decide whether an incoming fix is delivered, suppressed by the
    /// displacement threshold, or stale (session stopped or restarted).
    fn admit(&self, epoch: u64, fix: &Fix) -> PumpVerdict {
        let mut inner = self.inner.lock().unwrap();
        if inner.epoch != epoch || inner.state != SessionState::Active {
            return PumpVerdict::Stale;
        }
        if let Some(last) = &inner.last_delivered {
            let moved_m = geodesy::displacement_m(last, fix);
            if moved_m < self.config.min_displacement_m {
                debug!(moved_m, "fix below displacement threshold; suppressed");
                return PumpVerdict::Suppress;
            }
        }
        inner.last_delivered = Some(fix.clone());
        PumpVerdict::Deliver
    }

    fn still_current(&self, epoch: u64) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.epoch == epoch && inner.state != SessionState::Stopped
    }

    /// Move to `to` unless the session was stopped or restarted meanwhile.
    fn transition(&self, epoch: u64, to: SessionState) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if inner.epoch != epoch || inner.state == SessionState::Stopped {
            return false;
        }
        debug!(from = inner.state.as_str(), to = to.as_str(), "transition");
        inner.state = to;
        true
    }

    /// Best-effort rollback after a failed start step.
    fn revert(&self, epoch: u64, to: SessionState) {
        let mut inner = self.inner.lock().unwrap();
        if inner.epoch == epoch && inner.state != SessionState::Stopped {
            inner.state = to;
        }
    }
}
