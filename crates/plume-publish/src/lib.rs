//! Publish orchestration for Plume.
//!
//! Ties the storage boundary, the cron-trigger adapter and the LinkedIn
//! client together:
//! - [`ScheduleController`] — schedule/reschedule/unschedule, one user
//!   action per call
//! - [`CredentialRefresher`] — threshold-based token refresh with keyed
//!   per-(user, platform) exclusion
//! - [`PublishDispatcher`] — payload assembly and the single publish call
//! - [`SweepCoordinator`] — time-windowed batch sweep with per-post failure
//!   isolation
//! - [`SweepRunner`] — fixed-interval loop with graceful shutdown

mod controller;
mod dispatcher;
mod error;
mod refresher;
mod runner;
mod sweep;

pub use controller::ScheduleController;
pub use dispatcher::{PublishDispatcher, PublishReceipt};
pub use error::PublishError;
pub use refresher::{CredentialRefresher, CredentialStatus, DEFAULT_REFRESH_THRESHOLD_MINS};
pub use runner::{DEFAULT_SWEEP_INTERVAL_SECS, SweepRunner};
pub use sweep::{
    DEFAULT_LOOKBACK_MINS, DEFAULT_MAX_IN_FLIGHT, DEFAULT_TICK_TIMEOUT_SECS, SweepConfig,
    SweepCoordinator, SweepStats,
};
