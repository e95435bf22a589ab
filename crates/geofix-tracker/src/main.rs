//! geofix-tracker - Console demo
//!
//! A two-command stand-in for a start/stop UI: `start` and `stop`
//! drive the session, fixes print as a one-line label, `last` queries
//! the provider cache. The simulated provider is fed by a background
//! walker so there is something to display.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::Result;
use geofix_core::{Fix, SessionError, TrackingConfig};
use geofix_provider::{SimulatedProvider, StaticPermissions};
use geofix_tracker::{LocationSession, PermissionGate};

/// Degrees of latitude walked per tick, roughly 660 m — enough to
/// clear the default 500 m displacement threshold every time.
const WALK_STEP_LAT: f64 = 0.006;
const WALK_STEP_LON: f64 = 0.004;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = TrackingConfig::default();
    let provider = Arc::new(SimulatedProvider::new());
    let gate = PermissionGate::new(Arc::new(StaticPermissions::granting_on_prompt()));
    let session = LocationSession::new(provider.clone(), config.clone());

    spawn_walker(provider, config);

    println!("geofix-tracker demo. Commands: start | stop | last | quit");
    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        match line.trim() {
            "start" => {
                session.sink().set_listener(|fix| {
                    println!("Latitude: {} & Longitude: {}", fix.latitude, fix.longitude);
                });
                match smol::block_on(session.start(&gate)) {
                    Ok(()) => println!("tracking started"),
                    Err(SessionError::PermissionDenied) => {
                        println!(
                            "Permission was denied, but is needed for core functionality. \
                             Enable it in system settings and retry."
                        );
                    }
                    Err(err) => println!("could not start tracking: {err}"),
                }
            }
            "stop" => {
                session.stop();
                println!("tracking stopped");
            }
            "last" => match session.last_known_fix() {
                Some(fix) => println!("{}", serde_json::to_string(&fix)?),
                None => println!("no last known location"),
            },
            "quit" | "exit" => break,
            "" => {}
            other => println!("unknown command: {other}"),
        }
    }

    session.stop();
    Ok(())
}

/// Feed the simulated provider with a steady walk away from the
/// starting point. The provider caches every fix for `last`, and
/// queues them for delivery whenever a subscription is active.
fn spawn_walker(provider: Arc<SimulatedProvider>, config: TrackingConfig) {
    smol::spawn(async move {
        let mut latitude = 12.9716;
        let mut longitude = 77.5946;
        loop {
            provider.emit(Fix::new(latitude, longitude).with_accuracy(12.0));
            latitude += WALK_STEP_LAT;
            longitude += WALK_STEP_LON;
            smol::Timer::after(config.fastest_interval).await;
        }
    })
    .detach();
}
