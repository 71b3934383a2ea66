//! Background jobs executed by the job scheduler service.
//!
//! Jobs are idempotent, fault-tolerant and observable: a failing run logs
//! and waits for the next schedule rather than bringing anything down.

pub mod price_refresh_job;
