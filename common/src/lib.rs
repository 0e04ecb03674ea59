//! Shared model for the `mconnect` workspace.
//!
//! * [`config`]: what a probe run (or a responder) is asked to do.
//! * [`network`]: source address ranges and the random address generator.
//! * [`report`]: per-probe outcomes and the final run report.
//! * [`error`]: configuration errors that abort a run before it starts.

pub mod config;
pub mod error;
pub mod network;
pub mod report;
