//! Escalation: every unrecoverable fault ends the session in exactly one
//! `Restarting` entry, one `FatalError` signal and one settle pause.

use core::time::Duration;

use weatherstation::app::controller::fail_boot;
use weatherstation::app::events::{AppEvent, StatusSignal};
use weatherstation::app::upload::UploadOutcome;
use weatherstation::error::{CommsError, Error, SensorError, TransportError};
use weatherstation::fsm::StateId;

use crate::mocks::{Entry, PanickingSensors, Rig, reference_reading};

const SETTLE: Duration = Duration::from_millis(2_000);
const RECONNECT_SPACING: Duration = Duration::from_millis(1_000);

// ── Transport failure ─────────────────────────────────────

#[test]
fn transport_failure_restarts_once_without_retrying_upload() {
    let rig = Rig::new();
    let mut station = rig.build(
        rig.connected(),
        rig.synced(),
        rig.sensors([Ok(reference_reading()), Ok(reference_reading())]),
        rig.uploader([UploadOutcome::TransportFailed(TransportError::ConnectFailed)]),
    );

    let request = station.run();

    assert_eq!(request.reason, Error::Transport(TransportError::ConnectFailed));
    assert_eq!(request.cycles, 0);
    assert_eq!(station.uploader().records.len(), 1, "no upload retry");
    assert_eq!(station.platform().reclaims, 0);
    assert_eq!(station.indicator().count(StatusSignal::FatalError), 1);
    assert_eq!(station.indicator().count(StatusSignal::CycleComplete), 0);
    assert!(!station
        .sink()
        .events
        .iter()
        .any(|e| matches!(e, AppEvent::CycleCompleted { .. })));

    let entries = rig.entries();
    assert_eq!(
        entries[entries.len() - 3..],
        [
            Entry::Signal(StatusSignal::UploadTransportFailed),
            Entry::Signal(StatusSignal::FatalError),
            Entry::Sleep(SETTLE),
        ]
    );
}

// ── Reconnect exhaustion ──────────────────────────────────

#[test]
fn reconnect_exhaustion_restarts_before_reading_sensors() {
    let rig = Rig::new();
    // Up for bootstrap, gone for good afterwards.
    let mut station = rig.build(
        rig.wifi([true], false),
        rig.synced(),
        rig.sensors([Ok(reference_reading())]),
        rig.uploader([]),
    );

    let request = station.run();

    assert_eq!(request.reason, Error::Comms(CommsError::WifiReconnectFailed));
    assert_eq!(station.sensors().reads, 0);
    // bootstrap + link check + ten reconnect attempts
    assert_eq!(station.wifi().polls(), 12);
    assert_eq!(station.wifi().begins, 2);
    assert_eq!(
        station.indicator().signals,
        vec![
            StatusSignal::WifiConnected,
            StatusSignal::WifiReconnectFailed,
            StatusSignal::FatalError,
        ]
    );

    let sleeps = &station.clock().sleeps;
    assert_eq!(sleeps[..9], [RECONNECT_SPACING; 9]);
    assert_eq!(sleeps[9..], [SETTLE]);
}

#[test]
fn reconnect_exhaustion_during_idle_restarts() {
    let rig = Rig::new();
    // bootstrap: up; cycle 1 link check: up; first idle slice: gone for good.
    let mut station = rig.build(
        rig.wifi([true, true, false], false),
        rig.synced(),
        rig.sensors([Ok(reference_reading()), Ok(reference_reading())]),
        rig.uploader([]),
    );

    let request = station.run();

    assert_eq!(request.reason, Error::Comms(CommsError::WifiReconnectFailed));
    assert_eq!(request.cycles, 1);
    assert_eq!(station.sensors().reads, 1, "second cycle never starts");
    assert_eq!(
        station.indicator().signals,
        vec![
            StatusSignal::WifiConnected,
            StatusSignal::UploadOk,
            StatusSignal::CycleComplete,
            StatusSignal::WifiReconnectFailed,
            StatusSignal::FatalError,
        ]
    );

    // No idle slice was slept: nine reconnect gaps, then the settle pause.
    let sleeps = &station.clock().sleeps;
    assert_eq!(sleeps[..9], [RECONNECT_SPACING; 9]);
    assert_eq!(sleeps[9..], [SETTLE]);
}

// ── Sensor failure ────────────────────────────────────────

#[test]
fn sensor_failure_restarts_without_uploading() {
    let rig = Rig::new();
    let mut station = rig.build(
        rig.connected(),
        rig.synced(),
        rig.sensors([Err(SensorError::BusUnavailable)]),
        rig.uploader([]),
    );

    let request = station.run();

    assert_eq!(request.reason, Error::Sensor(SensorError::BusUnavailable));
    assert!(station.uploader().records.is_empty());
    assert_eq!(
        station.indicator().signals,
        vec![StatusSignal::WifiConnected, StatusSignal::FatalError]
    );
    assert_eq!(station.state(), StateId::Restarting);
}

// ── Unanticipated faults ──────────────────────────────────

#[test]
fn panic_in_a_driver_becomes_a_restart() {
    let rig = Rig::new();
    let mut station = rig.build(
        rig.connected(),
        rig.synced(),
        PanickingSensors,
        rig.uploader([]),
    );

    let request = station.run_supervised();

    match &request.reason {
        Error::Unanticipated(msg) => assert!(msg.contains("index out of bounds")),
        other => panic!("expected Unanticipated, got {:?}", other),
    }
    assert_eq!(station.state(), StateId::Restarting);
    assert_eq!(station.indicator().count(StatusSignal::FatalError), 1);
    assert_eq!(station.clock().sleeps.last(), Some(&SETTLE));
    assert_eq!(station.restart_request(), Some(&request));
}

#[test]
fn supervised_run_passes_ordinary_restarts_through() {
    let rig = Rig::new();
    let mut station = rig.build(
        rig.wifi([], false),
        rig.synced(),
        rig.sensors([]),
        rig.uploader([]),
    );

    let request = station.run_supervised();

    assert_eq!(request.reason, Error::Comms(CommsError::WifiConnectFailed));
    assert_eq!(station.indicator().count(StatusSignal::FatalError), 1);
}

// ── Restarting is terminal ────────────────────────────────

#[test]
fn enter_restarting_is_idempotent() {
    let rig = Rig::new();
    let mut station = rig.build(
        rig.connected(),
        rig.synced(),
        rig.sensors([]),
        rig.uploader([]),
    );

    let first = station.enter_restarting(Error::Init("first"));
    let second = station.enter_restarting(Error::Comms(CommsError::WifiReconnectFailed));

    assert_eq!(first, second);
    assert_eq!(first.reason, Error::Init("first"));
    assert_eq!(station.indicator().signals, vec![StatusSignal::FatalError]);
    assert_eq!(station.clock().sleeps, vec![SETTLE]);
    let restarts = station
        .sink()
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::RestartRequested { .. }))
        .count();
    assert_eq!(restarts, 1);
}

#[test]
fn bootstrap_failure_transitions_straight_to_restarting() {
    let rig = Rig::new();
    let mut station = rig.build(
        rig.connected(),
        rig.time(None),
        rig.sensors([]),
        rig.uploader([]),
    );

    station.run();

    let transitions: Vec<_> = station
        .sink()
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::StateChanged { from, to } => Some((*from, *to)),
            _ => None,
        })
        .collect();
    assert_eq!(transitions, vec![(StateId::Bootstrapping, StateId::Restarting)]);
}

#[test]
fn cycle_is_refused_once_restarting() {
    let rig = Rig::new();
    let mut station = rig.build(
        rig.connected(),
        rig.synced(),
        rig.sensors([Ok(reference_reading())]),
        rig.uploader([]),
    );
    station.bootstrap().unwrap();
    station.enter_restarting(Error::Init("operator"));

    assert!(matches!(station.run_cycle(), Err(Error::Init(_))));
    assert_eq!(station.sensors().reads, 0);
}

// ── Boot faults ───────────────────────────────────────────────

#[test]
fn boot_fault_signals_fatal_error_then_settles() {
    let rig = Rig::new();
    let mut indicator = rig.indicator();
    let mut clock = rig.clock();

    let request = fail_boot(
        &mut indicator,
        &mut clock,
        Error::from(TransportError::InvalidRequest),
        2_000,
    );

    assert_eq!(request.reason, Error::Transport(TransportError::InvalidRequest));
    assert_eq!(request.cycles, 0);
    assert_eq!(indicator.signals, vec![StatusSignal::FatalError]);
    assert_eq!(
        rig.entries(),
        vec![Entry::Signal(StatusSignal::FatalError), Entry::Sleep(SETTLE)]
    );
}
