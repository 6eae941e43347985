//! Loan approval simulator: a frozen classifier behind a single-form workflow.

pub mod config;
pub mod error;
pub mod simulator;
pub mod telemetry;
