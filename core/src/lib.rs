//! Probe engine of `mconnect`.
//!
//! A [`Dispatcher`] starts one [`probe`] task per requested connection. Every
//! task shares one [`deadline::Deadline`] and one [`limiter::AdmissionLimiter`]
//! and reports its outcomes to the single [`aggregator::Aggregator`], which owns
//! all counts until the run is frozen into a report.
//!
//! The [`responder`] is the other side of the wire: it announces an identity
//! on every connection and datagram.

pub mod aggregator;
pub mod deadline;
pub mod dispatcher;
pub mod limiter;
pub mod probe;
pub mod responder;

pub use dispatcher::Dispatcher;
pub use responder::Responder;
