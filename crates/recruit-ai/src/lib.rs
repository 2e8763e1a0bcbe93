//! Answer evaluation and scoring engine for scripted candidate screening.
//!
//! The `workflows::screening` module holds the engine itself; `config`, `telemetry`, and
//! `error` carry the service plumbing shared with the `recruit-ai-api` binary.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
