//! Bounded retry for the listing fetch and archive downloads.
//!
//! A [`FetchError`] knows whether it is transient; [`RetryPolicy`] decides how
//! many attempts to make and how long to wait between them.

mod error;
mod policy;
mod run;

pub use error::FetchError;
pub use policy::RetryPolicy;
pub use run::run_with_retry;
