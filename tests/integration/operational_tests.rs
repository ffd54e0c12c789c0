//! Operational: read → encode → upload cycles separated by idle windows
//! that keep an eye on the link.

use core::time::Duration;

use weatherstation::app::events::{AppEvent, StatusSignal};
use weatherstation::app::upload::{InfluxUploader, UploadOutcome};
use weatherstation::error::{Error, SensorError};
use weatherstation::fsm::StateId;

use crate::mocks::{Entry, MockTransport, REFERENCE_LINE, Rig, reference_reading};

const IDLE_SLICE: Duration = Duration::from_millis(2_000);
const RECONNECT_SPACING: Duration = Duration::from_millis(1_000);

// ── Cycles ────────────────────────────────────────────────────

#[test]
fn accepted_upload_completes_the_cycle() {
    let rig = Rig::new();
    let mut station = rig.build(
        rig.connected(),
        rig.synced(),
        rig.sensors([Ok(reference_reading())]),
        rig.uploader([]),
    );

    // Second read finds the script spent and fails, ending the session.
    let request = station.run();

    assert_eq!(request.reason, Error::Sensor(SensorError::NoResponse));
    assert_eq!(request.cycles, 1);
    assert_eq!(station.uploader().records.len(), 1);
    assert_eq!(station.uploader().records[0].as_str(), REFERENCE_LINE);
    assert_eq!(station.platform().reclaims, 1);
    assert_eq!(
        station.indicator().signals,
        vec![
            StatusSignal::WifiConnected,
            StatusSignal::UploadOk,
            StatusSignal::CycleComplete,
            StatusSignal::FatalError,
        ]
    );
    assert!(station
        .sink()
        .events
        .iter()
        .any(|e| matches!(e, AppEvent::CycleCompleted { cycle: 1 })));
}

#[test]
fn cycle_steps_run_in_order() {
    let rig = Rig::new();
    let mut station = rig.build(
        rig.connected(),
        rig.synced(),
        rig.sensors([Ok(reference_reading())]),
        rig.uploader([]),
    );
    station.bootstrap().unwrap();
    rig.journal.borrow_mut().clear();

    station.run_cycle().unwrap();

    assert_eq!(
        rig.entries(),
        vec![
            Entry::Poll(true),
            Entry::Read,
            Entry::Upload,
            Entry::Signal(StatusSignal::UploadOk),
            Entry::Reclaim,
            Entry::Signal(StatusSignal::CycleComplete),
        ]
    );
}

#[test]
fn rejected_upload_does_not_end_the_session() {
    let rig = Rig::new();
    let rejected = UploadOutcome::Rejected {
        status: 500,
        body: "internal error".into(),
    };
    let mut station = rig.build(
        rig.connected(),
        rig.synced(),
        rig.sensors([Ok(reference_reading()), Ok(reference_reading())]),
        rig.uploader([rejected]),
    );

    let request = station.run();

    assert_eq!(request.cycles, 2, "the rejected cycle still counts");
    assert_eq!(request.reason, Error::Sensor(SensorError::NoResponse));
    assert_eq!(station.uploader().records.len(), 2);
    assert_eq!(station.platform().reclaims, 2);
    assert_eq!(
        station.indicator().signals,
        vec![
            StatusSignal::WifiConnected,
            StatusSignal::UploadRejected,
            StatusSignal::CycleComplete,
            StatusSignal::UploadOk,
            StatusSignal::CycleComplete,
            StatusSignal::FatalError,
        ]
    );
    assert!(station.sink().events.iter().any(|e| matches!(
        e,
        AppEvent::UploadRejected { status: 500, body } if body == "internal error"
    )));
}

#[test]
fn run_cycle_reports_running_cycle_count() {
    let rig = Rig::new();
    let mut station = rig.build(
        rig.connected(),
        rig.synced(),
        rig.sensors([Ok(reference_reading()), Ok(reference_reading())]),
        rig.uploader([]),
    );
    station.bootstrap().unwrap();

    let first = station.run_cycle().unwrap();
    let second = station.run_cycle().unwrap();

    assert_eq!(first.cycle, 1);
    assert_eq!(second.cycle, 2);
    assert_eq!(second.upload, UploadOutcome::Accepted);
    assert_eq!(station.cycles(), 2);
}

#[test]
fn run_cycle_before_bootstrap_is_refused() {
    let rig = Rig::new();
    let mut station = rig.build(
        rig.connected(),
        rig.synced(),
        rig.sensors([Ok(reference_reading())]),
        rig.uploader([]),
    );

    assert!(matches!(station.run_cycle(), Err(Error::Init(_))));
    assert_eq!(station.sensors().reads, 0);
    assert_eq!(station.state(), StateId::Bootstrapping);
}

// ── Idle window ───────────────────────────────────────────────

#[test]
fn idle_rechecks_link_at_every_slice() {
    let rig = Rig::new();
    let mut station = rig.build(
        rig.connected(),
        rig.synced(),
        rig.sensors([]),
        rig.uploader([]),
    );
    station.bootstrap().unwrap();
    let polls_before = station.wifi().polls();

    station.idle().unwrap();

    assert_eq!(station.wifi().polls() - polls_before, 30);
    assert_eq!(station.clock().sleeps, vec![IDLE_SLICE; 30]);
    assert_eq!(station.wifi().begins, 1, "healthy link is never re-begun");
}

#[test]
fn dropped_link_is_reassociated_during_idle() {
    let rig = Rig::new();
    // bootstrap: up; slice 1: down; reconnect: down, then up.
    let mut station = rig.build(
        rig.wifi([true, false, false, true], true),
        rig.synced(),
        rig.sensors([]),
        rig.uploader([]),
    );
    station.bootstrap().unwrap();

    station.idle().unwrap();

    assert_eq!(station.state(), StateId::Operational);
    assert_eq!(station.wifi().begins, 2);
    assert_eq!(
        station.indicator().signals,
        vec![StatusSignal::WifiConnected, StatusSignal::WifiReconnected]
    );
    assert!(station
        .sink()
        .events
        .iter()
        .any(|e| matches!(e, AppEvent::Associated { attempts: 2, .. })));

    let sleeps = &station.clock().sleeps;
    assert_eq!(sleeps[0], RECONNECT_SPACING);
    assert_eq!(sleeps[1..], [IDLE_SLICE; 30]);
}

// ── Through the real uploader ─────────────────────────────────

#[test]
fn influx_uploader_posts_the_encoded_record() {
    let rig = Rig::new();
    let uploader = InfluxUploader::new(MockTransport::status(204), &rig.config.influx);
    let mut station = rig.build(
        rig.connected(),
        rig.synced(),
        rig.sensors([Ok(reference_reading())]),
        uploader,
    );
    station.bootstrap().unwrap();

    let report = station.run_cycle().unwrap();

    assert_eq!(report.upload, UploadOutcome::Accepted);
    let requests = &station.uploader().transport().requests;
    assert_eq!(requests.len(), 1);
    let (url, headers, body) = &requests[0];
    assert_eq!(url, &rig.config.influx.url);
    assert_eq!(body, REFERENCE_LINE);
    assert!(headers
        .iter()
        .any(|(k, v)| k == "Authorization" && v == "Token test-token"));
}

#[test]
fn influx_ok_without_no_content_is_rejected() {
    let rig = Rig::new();
    let uploader = InfluxUploader::new(MockTransport::status(200), &rig.config.influx);
    let mut station = rig.build(
        rig.connected(),
        rig.synced(),
        rig.sensors([Ok(reference_reading())]),
        uploader,
    );
    station.bootstrap().unwrap();

    let report = station.run_cycle().unwrap();

    assert!(matches!(report.upload, UploadOutcome::Rejected { status: 200, .. }));
    assert_eq!(
        station.indicator().signals.last(),
        Some(&StatusSignal::CycleComplete)
    );
    assert_eq!(station.indicator().count(StatusSignal::UploadRejected), 1);
}
