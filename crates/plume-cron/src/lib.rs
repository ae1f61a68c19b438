//! One-shot trigger management for Plume.
//!
//! This crate provides:
//! - A pure codec mapping post ids to trigger job names and instants to
//!   timezone-aware 5-field cron expressions
//! - [`CronJobsClient`], the REST adapter to the external cron-scheduling
//!   service, with idempotent upsert/delete and a tri-state outcome that
//!   keeps post CRUD working when the service is not wired up

pub mod codec;

mod client;
mod error;

pub use client::{CronConfig, CronJobsClient, DeleteOutcome, UpsertOutcome};
pub use codec::{CallbackPayload, JOB_NAME_PREFIX, job_name, to_cron};
pub use error::CronError;
