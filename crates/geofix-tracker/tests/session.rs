//! End-to-end session tests against the simulated provider.
//!
//! Covers the full state machine: permission denial, settings
//! resolution, ordered delivery, displacement suppression, stop
//! semantics and cancellation of in-flight starts.

use std::sync::Arc;
use std::time::Duration;

use geofix_core::{
    Fix, PermissionOutcome, ProviderError, SessionError, SessionState, SettingsFailure,
    TrackingConfig,
};
use geofix_provider::{ManualPermissions, SettingsScript, SimulatedProvider, StaticPermissions};
use geofix_tracker::{LocationSession, PermissionGate};

const RECV_TIMEOUT: Duration = Duration::from_secs(2);

/// Wire the session's sink to a channel so tests can observe deliveries.
fn observe(session: &LocationSession<SimulatedProvider>) -> smol::channel::Receiver<Fix> {
    let (tx, rx) = smol::channel::unbounded();
    session.sink().set_listener(move |fix| {
        let _ = tx.try_send(fix.clone());
    });
    rx
}

async fn recv_fix(rx: &smol::channel::Receiver<Fix>) -> Option<Fix> {
    use smol::future::FutureExt;
    let recv = async { rx.recv().await.ok() };
    let timeout = async {
        smol::Timer::after(RECV_TIMEOUT).await;
        None
    };
    recv.or(timeout).await
}

/// Give the pump a moment to process anything already queued.
async fn settle() {
    smol::Timer::after(Duration::from_millis(100)).await;
}

#[test]
fn permission_denied_leaves_session_idle() {
    let provider = Arc::new(SimulatedProvider::new());
    let gate = PermissionGate::new(Arc::new(StaticPermissions::denying()));
    let session = LocationSession::new(provider, TrackingConfig::default());

    let result = smol::block_on(session.start(&gate));
    assert_eq!(result, Err(SessionError::PermissionDenied));
    assert_eq!(session.state(), SessionState::Idle);
}

#[test]
fn denied_start_is_retryable() {
    let provider = Arc::new(SimulatedProvider::new());
    let backend = Arc::new(ManualPermissions::new());
    let gate = PermissionGate::new(backend.clone());
    let session = LocationSession::new(provider, TrackingConfig::default());

    backend.resolve(PermissionOutcome::Denied);
    let result = smol::block_on(session.start(&gate));
    assert_eq!(result, Err(SessionError::PermissionDenied));
    assert_eq!(session.state(), SessionState::Idle);

    backend.resolve(PermissionOutcome::Granted);
    smol::block_on(session.start(&gate)).unwrap();
    assert_eq!(session.state(), SessionState::Active);
}

#[test]
fn fixes_delivered_in_order() {
    let provider = Arc::new(SimulatedProvider::new());
    let gate = PermissionGate::new(Arc::new(StaticPermissions::granted()));
    // These two downtown points are ~62 m apart; a 10 m threshold
    // lets both through.
    let config = TrackingConfig::default().with_min_displacement(10.0);
    let session = LocationSession::new(provider.clone(), config);
    let rx = observe(&session);

    smol::block_on(async {
        session.start(&gate).await.unwrap();
        assert_eq!(session.state(), SessionState::Active);

        assert!(provider.emit(Fix::new(12.9716, 77.5946)));
        assert!(provider.emit(Fix::new(12.9720, 77.5950)));

        let first = recv_fix(&rx).await.expect("first fix");
        assert_eq!((first.latitude, first.longitude), (12.9716, 77.5946));
        let second = recv_fix(&rx).await.expect("second fix");
        assert_eq!((second.latitude, second.longitude), (12.9720, 77.5950));
    });
}

#[test]
fn small_movement_is_suppressed() {
    let provider = Arc::new(SimulatedProvider::new());
    let gate = PermissionGate::new(Arc::new(StaticPermissions::granted()));
    // Default config: 500 m displacement threshold.
    let session = LocationSession::new(provider.clone(), TrackingConfig::default());
    let rx = observe(&session);

    smol::block_on(async {
        session.start(&gate).await.unwrap();

        provider.emit(Fix::new(12.9716, 77.5946));
        // ~1 m away: below the threshold, must be suppressed.
        provider.emit(Fix::new(12.97161, 77.59461));
        // ~6 km away: clears the threshold.
        provider.emit(Fix::new(13.0250, 77.6100));

        let first = recv_fix(&rx).await.expect("first fix");
        assert_eq!(first.latitude, 12.9716);
        let next = recv_fix(&rx).await.expect("fix after the suppressed one");
        assert_eq!(next.latitude, 13.0250);
    });
}

#[test]
fn start_then_stop_ends_delivery() {
    let provider = Arc::new(SimulatedProvider::new());
    let gate = PermissionGate::new(Arc::new(StaticPermissions::granted()));
    let session = LocationSession::new(provider.clone(), TrackingConfig::default());
    let rx = observe(&session);

    smol::block_on(async {
        session.start(&gate).await.unwrap();
        session.stop();
        assert_eq!(session.state(), SessionState::Stopped);

        // The subscription is gone: nothing is queued anymore.
        assert!(!provider.emit(Fix::new(12.9716, 77.5946)));
        // And the listener was cleared on stop.
        assert!(!session.sink().has_listener());

        settle().await;
        assert!(rx.try_recv().is_err());
    });
}

#[test]
fn double_stop_is_noop() {
    let provider = Arc::new(SimulatedProvider::new());
    let gate = PermissionGate::new(Arc::new(StaticPermissions::granted()));
    let session = LocationSession::new(provider, TrackingConfig::default());

    smol::block_on(session.start(&gate)).unwrap();
    session.stop();
    session.stop();
    assert_eq!(session.state(), SessionState::Stopped);
}

#[test]
fn stop_before_start_is_safe() {
    let provider = Arc::new(SimulatedProvider::new());
    let session = LocationSession::new(provider, TrackingConfig::default());

    session.stop();
    assert_eq!(session.state(), SessionState::Stopped);
}

#[test]
fn session_restarts_after_stop() {
    let provider = Arc::new(SimulatedProvider::new());
    let gate = PermissionGate::new(Arc::new(StaticPermissions::granted()));
    let session = LocationSession::new(provider.clone(), TrackingConfig::default());

    smol::block_on(async {
        session.start(&gate).await.unwrap();
        session.stop();

        session.start(&gate).await.unwrap();
        assert_eq!(session.state(), SessionState::Active);

        let rx = observe(&session);
        provider.emit(Fix::new(1.0, 1.0));
        assert!(recv_fix(&rx).await.is_some());
    });
}

#[test]
fn start_while_active_is_noop() {
    let provider = Arc::new(SimulatedProvider::new());
    let gate = PermissionGate::new(Arc::new(StaticPermissions::granted()));
    let session = LocationSession::new(provider.clone(), TrackingConfig::default());

    smol::block_on(async {
        session.start(&gate).await.unwrap();
        // Second start must not tear down or re-register anything.
        session.start(&gate).await.unwrap();
        assert_eq!(session.state(), SessionState::Active);
        assert!(provider.has_subscriber());
    });
}

#[test]
fn stop_suppresses_late_permission_outcome() {
    let provider = Arc::new(SimulatedProvider::new());
    let backend = Arc::new(ManualPermissions::new());
    let gate = PermissionGate::new(backend.clone());
    let session = LocationSession::new(provider, TrackingConfig::default());

    smol::block_on(async {
        let pending = {
            let session = session.clone();
            let gate = gate.clone();
            smol::spawn(async move { session.start(&gate).await })
        };

        // Let the start reach the prompt, then stop with it pending.
        smol::Timer::after(Duration::from_millis(50)).await;
        assert_eq!(session.state(), SessionState::AwaitingPermission);
        session.stop();

        // The late grant must not resurrect the session.
        backend.resolve(PermissionOutcome::Granted);
        let result = pending.await;
        assert_eq!(result, Err(SessionError::Cancelled));
        assert_eq!(session.state(), SessionState::Stopped);
    });
}

#[test]
fn settings_resolution_accepted_activates() {
    let provider = Arc::new(SimulatedProvider::new().with_settings(
        SettingsScript::RequiresResolution { user_accepts: true },
    ));
    let gate = PermissionGate::new(Arc::new(StaticPermissions::granted()));
    let session = LocationSession::new(provider, TrackingConfig::default());

    smol::block_on(session.start(&gate)).unwrap();
    assert_eq!(session.state(), SessionState::Active);
}

#[test]
fn settings_resolution_declined_fails_start() {
    let provider = Arc::new(SimulatedProvider::new().with_settings(
        SettingsScript::RequiresResolution {
            user_accepts: false,
        },
    ));
    let gate = PermissionGate::new(Arc::new(StaticPermissions::granted()));
    let session = LocationSession::new(provider, TrackingConfig::default());

    let result = smol::block_on(session.start(&gate));
    assert_eq!(
        result,
        Err(SessionError::SettingsUnsatisfied(
            SettingsFailure::ResolutionDeclined
        ))
    );
    assert_eq!(session.state(), SessionState::Idle);
}

#[test]
fn unfixable_settings_fail_start() {
    let provider = Arc::new(
        SimulatedProvider::new().with_settings(SettingsScript::Unfixable("gps disabled".into())),
    );
    let gate = PermissionGate::new(Arc::new(StaticPermissions::granted()));
    let session = LocationSession::new(provider, TrackingConfig::default());

    let result = smol::block_on(session.start(&gate));
    assert_eq!(
        result,
        Err(SessionError::SettingsUnsatisfied(SettingsFailure::Unfixable(
            "gps disabled".into()
        )))
    );
    assert_eq!(session.state(), SessionState::Idle);
}

#[test]
fn registration_failure_restores_prior_state() {
    let provider = Arc::new(SimulatedProvider::new().with_register_failure("provider busy"));
    let gate = PermissionGate::new(Arc::new(StaticPermissions::granted()));
    let session = LocationSession::new(provider, TrackingConfig::default());

    let result = smol::block_on(session.start(&gate));
    assert_eq!(
        result,
        Err(SessionError::Delivery(ProviderError::RegisterFailed(
            "provider busy".into()
        )))
    );
    assert_eq!(session.state(), SessionState::Idle);
}

#[test]
fn unregister_failure_still_stops() {
    let provider = Arc::new(SimulatedProvider::new().with_unregister_failure("radio off"));
    let gate = PermissionGate::new(Arc::new(StaticPermissions::granted()));
    let session = LocationSession::new(provider, TrackingConfig::default());

    smol::block_on(session.start(&gate)).unwrap();
    // The failure is logged, not surfaced; the session still stops.
    session.stop();
    assert_eq!(session.state(), SessionState::Stopped);
}

#[test]
fn last_known_fix_reads_provider_cache() {
    let provider = Arc::new(SimulatedProvider::new());
    let session = LocationSession::new(provider.clone(), TrackingConfig::default());

    assert!(session.last_known_fix().is_none());

    // The platform caches fixes even without an active subscription.
    provider.emit(Fix::new(12.9716, 77.5946).with_accuracy(8.0));
    let last = session.last_known_fix().expect("cached fix");
    assert_eq!(last.latitude, 12.9716);
    assert_eq!(last.accuracy_m, Some(8.0));
}
