//! Schedule orchestration.
//!
//! Each method is one user action and propagates its result synchronously
//! to the web caller. Scheduling is idempotent by trigger name: the name is
//! re-derived from the post id on every call.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{info, warn};

use plume_cron::{CallbackPayload, CronJobsClient, DeleteOutcome, UpsertOutcome, codec};
use plume_store::{PostId, Store, UserId};

use crate::PublishError;

/// Schedules, reschedules and unschedules posts against the external
/// cron-scheduling service.
pub struct ScheduleController<S> {
    store: Arc<S>,
    cron: Arc<CronJobsClient>,
}

impl<S: Store> ScheduleController<S> {
    pub fn new(store: Arc<S>, cron: Arc<CronJobsClient>) -> Self {
        Self { store, cron }
    }

    /// Register a one-shot trigger and mark the post scheduled.
    ///
    /// Returns the trigger name, or `None` when the scheduling service
    /// rejected the job (the post is left unchanged). An unavailable
    /// service still marks the post scheduled; post CRUD keeps working and
    /// the sweep's lookback window recovers the publish.
    #[tracing::instrument(skip(self))]
    pub async fn schedule(
        &self,
        user_id: UserId,
        post_id: PostId,
        at: DateTime<Utc>,
        tz: Tz,
    ) -> Result<Option<String>, PublishError> {
        let post = self
            .store
            .post(user_id, post_id)
            .await?
            .ok_or(PublishError::PostNotFound(post_id))?;
        if post.is_posted() {
            return Err(PublishError::AlreadyPosted(post_id));
        }

        let job_name = codec::job_name(post_id);
        self.register(user_id, post_id, &job_name, at, tz, "scheduled post")
            .await
    }

    /// Remove a post's schedule. Succeeds without touching the registry
    /// when no trigger was ever recorded.
    #[tracing::instrument(skip(self))]
    pub async fn unschedule(
        &self,
        user_id: UserId,
        post_id: PostId,
    ) -> Result<bool, PublishError> {
        let post = self
            .store
            .post(user_id, post_id)
            .await?
            .ok_or(PublishError::PostNotFound(post_id))?;
        if post.is_posted() {
            return Err(PublishError::AlreadyPosted(post_id));
        }
        let Some(job_name) = post.scheduler_job_name else {
            return Ok(true);
        };

        match self.cron.delete(&job_name).await {
            DeleteOutcome::Deleted | DeleteOutcome::Unavailable => {
                self.store.clear_schedule(post_id).await?;
                info!(job_name = %job_name, "unscheduled post");
                Ok(true)
            }
            DeleteOutcome::Rejected(source) => Err(PublishError::Registry { job_name, source }),
        }
    }

    /// Move an existing schedule.
    ///
    /// Updates the trigger in place under its existing name, avoiding
    /// delete/recreate churn and orphaned jobs; falls back to a fresh
    /// schedule when no trigger exists yet.
    #[tracing::instrument(skip(self))]
    pub async fn reschedule(
        &self,
        user_id: UserId,
        post_id: PostId,
        new_at: DateTime<Utc>,
        tz: Tz,
    ) -> Result<Option<String>, PublishError> {
        let post = self
            .store
            .post(user_id, post_id)
            .await?
            .ok_or(PublishError::PostNotFound(post_id))?;
        if post.is_posted() {
            return Err(PublishError::AlreadyPosted(post_id));
        }
        let Some(job_name) = post.scheduler_job_name else {
            return self.schedule(user_id, post_id, new_at, tz).await;
        };

        self.register(user_id, post_id, &job_name, new_at, tz, "rescheduled post")
            .await
    }

    async fn register(
        &self,
        user_id: UserId,
        post_id: PostId,
        job_name: &str,
        at: DateTime<Utc>,
        tz: Tz,
        action: &'static str,
    ) -> Result<Option<String>, PublishError> {
        let cron = codec::to_cron(at, tz);
        let payload = CallbackPayload { user_id, post_id };

        match self.cron.upsert(job_name, &cron, tz.name(), &payload).await {
            UpsertOutcome::Applied | UpsertOutcome::Unavailable => {
                self.store.set_schedule(post_id, at, job_name).await?;
                info!(job_name = %job_name, at = %at, "{}", action);
                Ok(Some(job_name.to_string()))
            }
            UpsertOutcome::Rejected(err) => {
                warn!(job_name = %job_name, error = %err, "trigger rejected; post unchanged");
                Ok(None)
            }
        }
    }
}
