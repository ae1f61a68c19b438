//! Time-windowed batch sweep.
//!
//! Discovers posts whose trigger fired (or should have) and drives each one
//! through credential refresh and publish. Posts are independent units of
//! work: one failure never aborts the batch, and each failure is persisted
//! on its own post while the post stays retry-eligible.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use plume_store::{DueWindow, Post, PostStatus, Store, truncate_sharing_error};

use crate::{CredentialRefresher, PublishDispatcher, PublishError};

/// Default lookback window in minutes: absorbs trigger jitter and recovers
/// missed invocations while bounding per-tick work.
pub const DEFAULT_LOOKBACK_MINS: i64 = 10;

/// Default number of posts processed concurrently within a tick.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 4;

/// Default ceiling on one whole tick, in seconds.
pub const DEFAULT_TICK_TIMEOUT_SECS: u64 = 300;

/// Tuning knobs for the sweep.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// How far behind "now" the due query reaches.
    pub lookback: Duration,
    pub max_in_flight: usize,
    /// Ceiling on one tick; posts not reached defer to the next sweep.
    pub tick_timeout: StdDuration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            lookback: Duration::minutes(DEFAULT_LOOKBACK_MINS),
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            tick_timeout: StdDuration::from_secs(DEFAULT_TICK_TIMEOUT_SECS),
        }
    }
}

/// Aggregate counts for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// What happened to a single post inside a sweep.
enum PostOutcome {
    Published,
    /// No longer scheduled by the time the worker reached it.
    Skipped,
}

/// Drives due posts through the publish protocol.
pub struct SweepCoordinator<S> {
    store: Arc<S>,
    refresher: Arc<CredentialRefresher<S>>,
    dispatcher: Arc<PublishDispatcher>,
    config: SweepConfig,
}

impl<S: Store + 'static> SweepCoordinator<S> {
    pub fn new(
        store: Arc<S>,
        refresher: Arc<CredentialRefresher<S>>,
        dispatcher: Arc<PublishDispatcher>,
        config: SweepConfig,
    ) -> Self {
        Self {
            store,
            refresher,
            dispatcher,
            config,
        }
    }

    /// Run one sweep over the lookback window.
    #[tracing::instrument(skip(self))]
    pub async fn tick(&self) -> SweepStats {
        let window = DueWindow::ending_at(Utc::now(), self.config.lookback);
        let due = match self.store.find_due_posts(window).await {
            Ok(due) => due,
            Err(e) => {
                error!(error = %e, "failed to query due posts");
                return SweepStats::default();
            }
        };
        if due.is_empty() {
            debug!("no due posts");
            return SweepStats::default();
        }

        info!(count = due.len(), "driving due posts");

        let attempted = Arc::new(AtomicUsize::new(0));
        let succeeded = Arc::new(AtomicUsize::new(0));
        let failed = Arc::new(AtomicUsize::new(0));

        let drive = self.drive_batch(due, &attempted, &succeeded, &failed);
        if tokio::time::timeout(self.config.tick_timeout, drive)
            .await
            .is_err()
        {
            warn!(
                timeout_secs = self.config.tick_timeout.as_secs(),
                "tick hit its ceiling; remaining posts defer to the next sweep"
            );
        }

        SweepStats {
            attempted: attempted.load(Ordering::Relaxed),
            succeeded: succeeded.load(Ordering::Relaxed),
            failed: failed.load(Ordering::Relaxed),
        }
    }

    async fn drive_batch(
        &self,
        due: Vec<Post>,
        attempted: &Arc<AtomicUsize>,
        succeeded: &Arc<AtomicUsize>,
        failed: &Arc<AtomicUsize>,
    ) {
        let semaphore = Arc::new(Semaphore::new(self.config.max_in_flight));
        let mut workers = JoinSet::new();

        for post in due {
            let semaphore = semaphore.clone();
            let store = self.store.clone();
            let refresher = self.refresher.clone();
            let dispatcher = self.dispatcher.clone();
            let attempted = attempted.clone();
            let succeeded = succeeded.clone();
            let failed = failed.clone();

            workers.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return;
                };

                let post_id = post.id;
                match process_post(
                    store.as_ref(),
                    refresher.as_ref(),
                    dispatcher.as_ref(),
                    post,
                )
                .await
                {
                    Ok(PostOutcome::Published) => {
                        attempted.fetch_add(1, Ordering::Relaxed);
                        succeeded.fetch_add(1, Ordering::Relaxed);
                    }
                    Ok(PostOutcome::Skipped) => {}
                    Err(err) => {
                        attempted.fetch_add(1, Ordering::Relaxed);
                        failed.fetch_add(1, Ordering::Relaxed);
                        warn!(
                            post_id = %post_id,
                            error = %err,
                            "publish attempt failed; post stays retry-eligible"
                        );
                        let persisted = truncate_sharing_error(&err.to_string());
                        if let Err(store_err) = store.set_sharing_error(post_id, &persisted).await
                        {
                            error!(
                                post_id = %post_id,
                                error = %store_err,
                                "failed to persist sharing error"
                            );
                        }
                    }
                }
            });
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(join_err) = joined {
                // A panic in one worker never aborts the batch.
                error!(error = %join_err, "post worker panicked");
                failed.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

/// Drive one post through refresh and publish.
async fn process_post<S: Store>(
    store: &S,
    refresher: &CredentialRefresher<S>,
    dispatcher: &PublishDispatcher,
    post: Post,
) -> Result<PostOutcome, PublishError> {
    // Re-read: an unschedule or a previous sweep may have settled this post
    // after the due query ran.
    let Some(current) = store.post(post.user_id, post.id).await? else {
        return Err(PublishError::PostNotFound(post.id));
    };
    if current.status != PostStatus::Scheduled {
        debug!(post_id = %current.id, status = ?current.status, "post no longer scheduled, skipping");
        return Ok(PostOutcome::Skipped);
    }

    let credential = store
        .credential(current.user_id, current.platform)
        .await?
        .ok_or(PublishError::CredentialMissing {
            user_id: current.user_id,
            platform: current.platform,
        })?;
    let credential = refresher.ensure_fresh(credential).await?;

    let media = store.media_for_post(current.id).await?;

    let receipt = match dispatcher.publish(&current, &credential, &media).await {
        Ok(receipt) => receipt,
        Err(err) if err.is_auth() => return Err(err),
        Err(first) => {
            // One immediate retry caps tick latency; anything beyond waits
            // for the next sweep.
            warn!(post_id = %current.id, error = %first, "publish failed, retrying once");
            dispatcher.publish(&current, &credential, &media).await?
        }
    };

    // Persist-after-success: the status write is the last step, and the
    // post's own status is the sole "already posted" authority.
    store
        .mark_posted(current.id, &receipt.platform_post_id, receipt.published_at)
        .await?;
    Ok(PostOutcome::Published)
}
