//! digestcast-core: shared plumbing for digestcast integrations
//!
//! Holds the retry-with-backoff utility that every remote API client in the
//! workspace delegates to.

pub mod retry;

pub use retry::{retry_with_backoff, RetryDecision, RetryPolicy};
