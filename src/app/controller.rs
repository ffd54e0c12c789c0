//! Resilience controller: the station's top-level lifecycle.
//!
//! [`ResilienceController`] owns every collaborator and walks the
//! Bootstrapping → Operational → Restarting machine in [`crate::fsm`].
//! All I/O flows through port traits, so the whole lifecycle runs against
//! scripted doubles in tests.
//!
//! ```text
//!   WifiPort ──┐                               ┌──▶ IndicatorPort
//! TimeSource ──┤                               │
//!  SensorPort ─┼──▶ ResilienceController ──────┼──▶ EventSink
//!  UploadPort ─┤     (FSM · budgets)           │
//!       Clock ─┘                               └──▶ PlatformPort
//! ```
//!
//! Escalation policy:
//!
//! | Condition                         | Handling                       |
//! |-----------------------------------|--------------------------------|
//! | connect / time-sync exhausted     | restart                        |
//! | reconnect exhausted               | restart                        |
//! | sensor read failed                | restart                        |
//! | upload transport failure          | restart                        |
//! | upload rejected (non-204)         | signal, continue with next cycle |
//! | panic anywhere in the session     | restart ([`run_supervised`])   |
//!
//! [`run_supervised`]: ResilienceController::run_supervised

use core::time::Duration;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use log::{error, info, warn};

use crate::config::{ResiliencePolicy, SystemConfig};
use crate::error::{CommsError, Error};
use crate::fsm::{Fsm, StateId};

use super::events::{AppEvent, StatusSignal};
use super::network::{ConnectOutcome, NetworkAssociator, ReconnectOutcome};
use super::ports::{Clock, EventSink, IndicatorPort, PlatformPort, SensorPort, TimeSourcePort, WifiPort};
use super::telemetry::TelemetryEncoder;
use super::time_sync::{SyncOutcome, TimeSynchronizer};
use super::upload::{UploadOutcome, UploadPort};

/// Everything the controller drives, handed over at construction.
pub struct StationPorts<W, T, S, U, I, P, C, E> {
    pub wifi: W,
    pub time_source: T,
    pub sensors: S,
    pub uploader: U,
    pub indicator: I,
    pub platform: P,
    pub clock: C,
    pub sink: E,
}

/// The controller's final word: the platform must restart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartRequest {
    pub reason: Error,
    /// Operational cycles completed in this session.
    pub cycles: u64,
}

/// Summary of one successful operational cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub cycle: u64,
    /// `Accepted` or `Rejected`; transport failures never produce a report.
    pub upload: UploadOutcome,
}

pub struct ResilienceController<W, T, S, U, I, P, C, E> {
    fsm: Fsm,
    policy: ResiliencePolicy,
    encoder: TelemetryEncoder,
    network: NetworkAssociator<W>,
    time: TimeSynchronizer<T>,
    sensors: S,
    uploader: U,
    indicator: I,
    platform: P,
    clock: C,
    sink: E,
    cycles: u64,
    restart: Option<RestartRequest>,
}

impl<W, T, S, U, I, P, C, E> ResilienceController<W, T, S, U, I, P, C, E>
where
    W: WifiPort,
    T: TimeSourcePort,
    S: SensorPort,
    U: UploadPort,
    I: IndicatorPort,
    P: PlatformPort,
    C: Clock,
    E: EventSink,
{
    /// Construct a controller in `Bootstrapping`. Budgets and counters are
    /// fresh; nothing carries over from a previous session.
    pub fn new(config: &SystemConfig, ports: StationPorts<W, T, S, U, I, P, C, E>) -> Self {
        Self {
            fsm: Fsm::new(),
            policy: config.policy.clone(),
            encoder: TelemetryEncoder::from_config(&config.influx),
            network: NetworkAssociator::new(ports.wifi, config.wifi.clone()),
            time: TimeSynchronizer::new(ports.time_source),
            sensors: ports.sensors,
            uploader: ports.uploader,
            indicator: ports.indicator,
            platform: ports.platform,
            clock: ports.clock,
            sink: ports.sink,
            cycles: 0,
            restart: None,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Run the whole session and return the restart it ends with.
    pub fn run(&mut self) -> RestartRequest {
        if let Err(reason) = self.bootstrap() {
            return self.enter_restarting(reason);
        }
        loop {
            if let Err(reason) = self.run_cycle() {
                return self.enter_restarting(reason);
            }
            if let Err(reason) = self.idle() {
                return self.enter_restarting(reason);
            }
        }
    }

    /// [`run`](Self::run), with any panic converted into a restart.
    pub fn run_supervised(&mut self) -> RestartRequest {
        match panic::catch_unwind(AssertUnwindSafe(|| self.run())) {
            Ok(request) => request,
            Err(payload) => {
                let msg = panic_message(payload.as_ref());
                error!("Unanticipated fault: {}", msg);
                self.enter_restarting(Error::unanticipated(msg))
            }
        }
    }

    /// Associate, then synchronise the clock. On success the controller is
    /// `Operational`.
    pub fn bootstrap(&mut self) -> Result<(), Error> {
        info!("Bootstrapping weather station");
        match self
            .network
            .connect(self.policy.connect_budget(), &mut self.clock)
        {
            ConnectOutcome::Connected { attempts } => {
                self.indicator.signal(StatusSignal::WifiConnected);
                self.sink.emit(&AppEvent::Associated {
                    ip: self.network.ip_address(),
                    attempts,
                });
            }
            ConnectOutcome::Exhausted { .. } => {
                self.indicator.signal(StatusSignal::WifiConnectFailed);
                return Err(CommsError::WifiConnectFailed.into());
            }
        }

        match self
            .time
            .sync(self.policy.time_sync_budget(), &mut self.clock)
        {
            SyncOutcome::Synced { attempts } => {
                self.sink.emit(&AppEvent::TimeSynced {
                    unix_time: self.clock.unix_time(),
                    attempts,
                });
            }
            SyncOutcome::Exhausted { .. } => {
                self.indicator.signal(StatusSignal::TimeSyncFailed);
                return Err(CommsError::TimeSyncFailed.into());
            }
        }

        self.transition(StateId::Operational);
        Ok(())
    }

    /// One operational cycle: connectivity check, read, encode, upload,
    /// memory reclamation.
    pub fn run_cycle(&mut self) -> Result<CycleReport, Error> {
        if self.fsm.current_state() != StateId::Operational {
            return Err(Error::Init("cycle requested outside Operational"));
        }
        self.ensure_connected()?;

        let timestamp = self.clock.unix_time();
        let reading = self.sensors.read()?;
        let record = self.encoder.encode(&reading, timestamp);
        self.sink.emit(&AppEvent::Telemetry(record.clone()));

        let upload = self.uploader.upload(&record);
        match &upload {
            UploadOutcome::Accepted => {
                self.indicator.signal(StatusSignal::UploadOk);
                self.sink.emit(&AppEvent::UploadAccepted);
            }
            UploadOutcome::Rejected { status, body } => {
                self.indicator.signal(StatusSignal::UploadRejected);
                self.sink.emit(&AppEvent::UploadRejected {
                    status: *status,
                    body: body.clone(),
                });
            }
            UploadOutcome::TransportFailed(e) => {
                self.indicator.signal(StatusSignal::UploadTransportFailed);
                return Err((*e).into());
            }
        }

        self.platform.reclaim_memory();
        self.cycles += 1;
        self.sink.emit(&AppEvent::CycleCompleted { cycle: self.cycles });
        self.indicator.signal(StatusSignal::CycleComplete);
        Ok(CycleReport {
            cycle: self.cycles,
            upload,
        })
    }

    /// Wait out the idle window, re-checking the link at every slice.
    pub fn idle(&mut self) -> Result<(), Error> {
        let slice = Duration::from_millis(u64::from(self.policy.idle_slice_ms));
        for _ in 0..self.policy.idle_slices() {
            self.ensure_connected()?;
            self.clock.sleep(slice);
        }
        Ok(())
    }

    /// No-op while associated; otherwise spend one reconnect budget.
    pub fn ensure_connected(&mut self) -> Result<(), Error> {
        if self.network.is_connected() {
            return Ok(());
        }
        match self
            .network
            .reconnect(self.policy.reconnect_budget(), &mut self.clock)
        {
            ReconnectOutcome::Reconnected { attempts } => {
                self.indicator.signal(StatusSignal::WifiReconnected);
                self.sink.emit(&AppEvent::Associated {
                    ip: self.network.ip_address(),
                    attempts,
                });
                Ok(())
            }
            ReconnectOutcome::Exhausted { .. } => {
                self.indicator.signal(StatusSignal::WifiReconnectFailed);
                Err(CommsError::WifiReconnectFailed.into())
            }
        }
    }

    /// Enter the terminal state. Signals `FatalError` once, waits for the
    /// settle period and hands back the restart. Repeated calls return the
    /// first request without further side effects.
    pub fn enter_restarting(&mut self, reason: Error) -> RestartRequest {
        if let Some(request) = &self.restart {
            warn!("Restart already requested ({})", request.reason);
            return request.clone();
        }
        let request = RestartRequest {
            reason: reason.clone(),
            cycles: self.cycles,
        };
        self.restart = Some(request.clone());

        self.transition(StateId::Restarting);
        error!(
            "Fatal: {} after {} cycle(s). Restarting...",
            reason, self.cycles
        );
        self.sink.emit(&AppEvent::RestartRequested {
            reason,
            cycles: self.cycles,
        });
        self.indicator.signal(StatusSignal::FatalError);
        self.clock
            .sleep(Duration::from_millis(u64::from(self.policy.restart_settle_ms)));
        request
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn restart_request(&self) -> Option<&RestartRequest> {
        self.restart.as_ref()
    }

    pub fn wifi(&self) -> &W {
        self.network.primitive()
    }

    pub fn time_source(&self) -> &T {
        self.time.source()
    }

    pub fn sensors(&self) -> &S {
        &self.sensors
    }

    pub fn uploader(&self) -> &U {
        &self.uploader
    }

    pub fn indicator(&self) -> &I {
        &self.indicator
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn sink(&self) -> &E {
        &self.sink
    }

    // ── Internal ──────────────────────────────────────────────

    fn transition(&mut self, next: StateId) {
        match self.fsm.transition(next) {
            Ok(from) => self.sink.emit(&AppEvent::StateChanged { from, to: next }),
            Err(e) => warn!("{}", e),
        }
    }
}

/// A fault before the controller exists (peripheral or transport setup)
/// still ends the way every session does: one `FatalError`, the settle
/// pause, then a restart.
pub fn fail_boot<I, C>(indicator: &mut I, clock: &mut C, reason: Error, settle_ms: u32) -> RestartRequest
where
    I: IndicatorPort + ?Sized,
    C: Clock + ?Sized,
{
    error!("Fatal during boot: {}. Restarting...", reason);
    indicator.signal(StatusSignal::FatalError);
    clock.sleep(Duration::from_millis(u64::from(settle_ms)));
    RestartRequest { reason, cycles: 0 }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "panic with non-string payload"
    }
}
