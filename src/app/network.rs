//! Network associator: drives the WiFi primitive through bounded
//! association attempts and tracks the link state.

use std::net::Ipv4Addr;

use log::{info, warn};

use crate::config::WifiConfig;

use super::ports::{Clock, WifiPort};
use super::retry::{Attempted, RetryBudget};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Result of [`NetworkAssociator::connect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// Associated after `attempts` polls (0 when already connected).
    Connected { attempts: u32 },
    Exhausted { attempts: u32 },
}

/// Result of [`NetworkAssociator::reconnect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectOutcome {
    Reconnected { attempts: u32 },
    Exhausted { attempts: u32 },
}

pub struct NetworkAssociator<W> {
    wifi: W,
    credentials: WifiConfig,
    state: ConnectionState,
}

impl<W: WifiPort> NetworkAssociator<W> {
    pub fn new(wifi: W, credentials: WifiConfig) -> Self {
        Self {
            wifi,
            credentials,
            state: ConnectionState::Disconnected,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn primitive(&self) -> &W {
        &self.wifi
    }

    pub fn ip_address(&self) -> Option<Ipv4Addr> {
        self.wifi.ip_address()
    }

    /// Live link check. Downgrades the tracked state when the link dropped.
    pub fn is_connected(&mut self) -> bool {
        let up = self.wifi.is_associated();
        if !up && self.state == ConnectionState::Connected {
            warn!("WiFi link lost");
            self.state = ConnectionState::Disconnected;
        }
        up
    }

    /// Associate within `budget`. Returns at once when already connected.
    pub fn connect<C: Clock + ?Sized>(&mut self, budget: RetryBudget, clock: &mut C) -> ConnectOutcome {
        if self.state == ConnectionState::Connected && self.wifi.is_associated() {
            return ConnectOutcome::Connected { attempts: 0 };
        }
        info!("Connecting to WiFi '{}'", self.credentials.ssid);
        match self.associate(budget, clock) {
            Attempted::Succeeded { attempts, .. } => ConnectOutcome::Connected { attempts },
            Attempted::Exhausted { attempts } => ConnectOutcome::Exhausted { attempts },
        }
    }

    /// Re-issue association after a drop, within `budget`.
    pub fn reconnect<C: Clock + ?Sized>(
        &mut self,
        budget: RetryBudget,
        clock: &mut C,
    ) -> ReconnectOutcome {
        warn!("WiFi disconnected. Attempting to reconnect...");
        self.state = ConnectionState::Disconnected;
        match self.associate(budget, clock) {
            Attempted::Succeeded { attempts, .. } => ReconnectOutcome::Reconnected { attempts },
            Attempted::Exhausted { attempts } => ReconnectOutcome::Exhausted { attempts },
        }
    }

    fn associate<C: Clock + ?Sized>(&mut self, budget: RetryBudget, clock: &mut C) -> Attempted<()> {
        self.state = ConnectionState::Connecting;
        let max = budget.max_attempts();
        let mut begun = false;
        let wifi = &mut self.wifi;
        let credentials = &self.credentials;

        let outcome = budget.run(clock, |n| {
            if !begun {
                match wifi.begin(credentials) {
                    Ok(()) => begun = true,
                    Err(e) => {
                        warn!("WiFi attempt {}/{}: begin failed: {}", n, max, e);
                        return None;
                    }
                }
            }
            if wifi.is_associated() {
                Some(())
            } else {
                info!("WiFi attempt {}/{}: not associated yet", n, max);
                None
            }
        });

        match outcome {
            Attempted::Succeeded { attempts, .. } => {
                self.state = ConnectionState::Connected;
                match self.wifi.ip_address() {
                    Some(ip) => info!("WiFi connected after {} attempt(s), IP address: {}", attempts, ip),
                    None => info!("WiFi connected after {} attempt(s)", attempts),
                }
            }
            Attempted::Exhausted { attempts } => {
                self.state = ConnectionState::Disconnected;
                warn!("WiFi association failed after {} attempt(s)", attempts);
            }
        }
        outcome
    }
}
