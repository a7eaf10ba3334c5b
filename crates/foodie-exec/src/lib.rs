//! Remote task execution for itinerary generation
//!
//! The execution service is modelled as a narrow submit/get-status contract
//! ([`ExecutionService`]). [`ExecutionPoller`] drives one request through
//! submission, polling, timeout and resubmission; [`JulepClient`] is the HTTP
//! implementation.

mod julep;
mod poller;
mod service;

pub use julep::JulepClient;
pub use poller::{ExecutionPoller, PollPolicy};
pub use service::{ExecutionService, JobHandle, JobResult, JobStatus};
