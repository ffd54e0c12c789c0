//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that walks the resilience controller
//! through one phase of its lifecycle against scripted port doubles.  All
//! tests run on the host (x86_64) with no real hardware required.

mod bootstrap_tests;
mod escalation_tests;
mod operational_tests;
