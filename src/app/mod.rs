//! Application core: pure domain logic, zero direct I/O.
//!
//! This module holds the rules of the weather station: the resilience
//! controller and its state machine, retry budgets, connectivity and time
//! management, telemetry encoding, and upload classification. All
//! interaction with hardware and the network happens through **port
//! traits** defined in [`ports`], keeping this layer fully testable without
//! real peripherals.

pub mod controller;
pub mod events;
pub mod network;
pub mod ports;
pub mod retry;
pub mod telemetry;
pub mod time_sync;
pub mod upload;
