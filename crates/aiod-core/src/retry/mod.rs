//! Retry and backoff policy.
//!
//! Every external agent invocation that may fail transiently (the download
//! agent, mostly) goes through [`run_with_retry`], so attempts and backoff are
//! decided in one place.

mod policy;
mod run;

pub use policy::RetryPolicy;
pub use run::{run_with_retry, run_with_retry_using, RetryOutcome};
