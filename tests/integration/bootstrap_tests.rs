//! Bootstrapping: WiFi association then time synchronisation, each under
//! its own retry budget.

use core::time::Duration;

use weatherstation::app::events::{AppEvent, StatusSignal};
use weatherstation::error::{CommsError, Error};
use weatherstation::fsm::StateId;

use crate::mocks::{Entry, NOW, Rig};

const CONNECT_SPACING: Duration = Duration::from_millis(2_000);
const SETTLE: Duration = Duration::from_millis(2_000);

// ── Association ───────────────────────────────────────────────

#[test]
fn never_associating_spends_thirty_attempts_then_restarts() {
    let rig = Rig::new();
    let mut station = rig.build(
        rig.wifi([], false),
        rig.synced(),
        rig.sensors([]),
        rig.uploader([]),
    );

    let request = station.run();

    assert_eq!(request.reason, Error::Comms(CommsError::WifiConnectFailed));
    assert_eq!(request.cycles, 0);
    assert_eq!(station.state(), StateId::Restarting);
    assert_eq!(station.wifi().polls(), 30);
    assert_eq!(station.wifi().begins, 1, "begin is issued once per budget");
    assert_eq!(station.time_source().calls, 0, "time sync must not start");
    assert_eq!(station.sensors().reads, 0);
    assert_eq!(
        station.indicator().signals,
        vec![StatusSignal::WifiConnectFailed, StatusSignal::FatalError]
    );

    // 29 gaps between 30 attempts, then the settle pause.
    let sleeps = &station.clock().sleeps;
    assert_eq!(sleeps.len(), 30);
    assert!(sleeps[..29].iter().all(|d| *d == CONNECT_SPACING));
    assert_eq!(sleeps[29], SETTLE);

    let entries = rig.entries();
    assert_eq!(
        entries[entries.len() - 3..],
        [
            Entry::Signal(StatusSignal::WifiConnectFailed),
            Entry::Signal(StatusSignal::FatalError),
            Entry::Sleep(SETTLE),
        ]
    );
}

#[test]
fn associating_on_seventh_attempt_proceeds_to_time_sync() {
    let rig = Rig::new();
    let mut station = rig.build(
        rig.wifi([false; 6], true),
        rig.synced(),
        rig.sensors([]),
        rig.uploader([]),
    );

    station.bootstrap().unwrap();

    assert_eq!(station.state(), StateId::Operational);
    assert_eq!(station.wifi().polls(), 7);
    assert_eq!(station.clock().sleeps, vec![CONNECT_SPACING; 6]);
    assert_eq!(station.indicator().signals, vec![StatusSignal::WifiConnected]);
    assert!(station.sink().events.iter().any(|e| matches!(
        e,
        AppEvent::Associated { ip: Some(_), attempts: 7 }
    )));

    // Later checks see the link without re-associating.
    station.ensure_connected().unwrap();
    assert_eq!(station.wifi().polls(), 8);
    assert_eq!(station.wifi().begins, 1);
}

#[test]
fn association_on_the_final_attempt_still_succeeds() {
    let rig = Rig::new();
    let mut station = rig.build(
        rig.wifi([false; 29], true),
        rig.synced(),
        rig.sensors([]),
        rig.uploader([]),
    );

    assert!(station.bootstrap().is_ok());
    assert_eq!(station.wifi().polls(), 30);
    assert_eq!(station.state(), StateId::Operational);
}

#[test]
fn time_sync_waits_for_association() {
    let rig = Rig::new();
    let mut station = rig.build(
        rig.wifi([false, false], true),
        rig.synced(),
        rig.sensors([]),
        rig.uploader([]),
    );

    station.bootstrap().unwrap();

    let entries = rig.entries();
    let associated = entries.iter().position(|e| *e == Entry::Poll(true)).unwrap();
    let first_sync = entries
        .iter()
        .position(|e| matches!(e, Entry::TimeSync(_)))
        .unwrap();
    assert!(associated < first_sync);
}

// ── Time synchronisation ──────────────────────────────────────

#[test]
fn time_sync_exhaustion_after_five_attempts_restarts() {
    let rig = Rig::new();
    let mut station = rig.build(
        rig.connected(),
        rig.time(None),
        rig.sensors([]),
        rig.uploader([]),
    );

    let request = station.run();

    assert_eq!(request.reason, Error::Comms(CommsError::TimeSyncFailed));
    assert_eq!(station.time_source().calls, 5);
    assert_eq!(station.sensors().reads, 0);
    assert_eq!(
        station.indicator().signals,
        vec![
            StatusSignal::WifiConnected,
            StatusSignal::TimeSyncFailed,
            StatusSignal::FatalError,
        ]
    );
    // Four gaps at the time-sync spacing plus the settle pause.
    assert_eq!(station.clock().sleeps.len(), 5);
}

#[test]
fn time_sync_on_third_attempt_enters_operational() {
    let rig = Rig::new();
    let mut station = rig.build(
        rig.connected(),
        rig.time(Some(3)),
        rig.sensors([]),
        rig.uploader([]),
    );

    station.bootstrap().unwrap();

    assert_eq!(station.time_source().calls, 3);
    assert_eq!(station.state(), StateId::Operational);
    let events = &station.sink().events;
    assert!(events.iter().any(|e| matches!(
        e,
        AppEvent::TimeSynced { unix_time: NOW, attempts: 3 }
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        AppEvent::StateChanged {
            from: StateId::Bootstrapping,
            to: StateId::Operational,
        }
    )));
}

// ── Sessions ──────────────────────────────────────────────────

#[test]
fn each_session_starts_with_a_full_connect_budget() {
    let first = Rig::new();
    let mut failed = first.build(
        first.wifi([], false),
        first.synced(),
        first.sensors([]),
        first.uploader([]),
    );
    let request = failed.run();
    assert_eq!(request.reason, Error::Comms(CommsError::WifiConnectFailed));

    // The next boot gets all 30 attempts again.
    let second = Rig::new();
    let mut next = second.build(
        second.wifi([false; 29], true),
        second.synced(),
        second.sensors([]),
        second.uploader([]),
    );
    assert_eq!(next.state(), StateId::Bootstrapping);
    assert_eq!(next.cycles(), 0);
    assert!(next.restart_request().is_none());
    assert!(next.bootstrap().is_ok());
}
