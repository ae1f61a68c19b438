//! Storage boundary consumed by the publishing pipeline.
//!
//! The real implementation lives in the host application's persistence
//! layer. Scheduling metadata is columns on the post row itself, so a single
//! read or write settles schedulability.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{MediaAttachment, Platform, PlatformCredential, Post, PostId, StoreError, UserId};

/// Time span a sweep re-scans for due posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueWindow {
    pub from: DateTime<Utc>,
    pub until: DateTime<Utc>,
}

impl DueWindow {
    /// Window ending at `until`, reaching `lookback` into the past.
    pub fn ending_at(until: DateTime<Utc>, lookback: chrono::Duration) -> Self {
        Self {
            from: until - lookback,
            until,
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from <= at && at <= self.until
    }
}

/// Persistence operations the publishing pipeline relies on.
#[async_trait]
pub trait Store: Send + Sync {
    /// Load a post by id, scoped to its owner. `None` when absent or owned
    /// by someone else.
    async fn post(&self, user_id: UserId, post_id: PostId) -> Result<Option<Post>, StoreError>;

    /// Scheduled posts with no `posted_at` whose `scheduled_at` falls inside
    /// the window, oldest first.
    async fn find_due_posts(&self, window: DueWindow) -> Result<Vec<Post>, StoreError>;

    /// Record a registered trigger: status becomes `Scheduled`, with
    /// `scheduled_at` and `scheduler_job_name` set together.
    async fn set_schedule(
        &self,
        post_id: PostId,
        at: DateTime<Utc>,
        job_name: &str,
    ) -> Result<(), StoreError>;

    /// Revert to `Suggested`, clearing `scheduled_at` and
    /// `scheduler_job_name` together.
    async fn clear_schedule(&self, post_id: PostId) -> Result<(), StoreError>;

    /// Terminal success: status `Posted`, `posted_at` and `platform_post_id`
    /// set together, `sharing_error` and `scheduler_job_name` cleared.
    async fn mark_posted(
        &self,
        post_id: PostId,
        platform_post_id: &str,
        posted_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Record a publish failure while leaving the post retry-eligible.
    async fn set_sharing_error(&self, post_id: PostId, error: &str) -> Result<(), StoreError>;

    /// Credential for a (user, platform) pair, if one is connected.
    async fn credential(
        &self,
        user_id: UserId,
        platform: Platform,
    ) -> Result<Option<PlatformCredential>, StoreError>;

    /// Persist a refreshed credential.
    async fn update_credential(&self, credential: &PlatformCredential) -> Result<(), StoreError>;

    /// Media attached to a post, in attachment order.
    async fn media_for_post(&self, post_id: PostId) -> Result<Vec<MediaAttachment>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_contains_bounds() {
        let until = Utc::now();
        let window = DueWindow::ending_at(until, chrono::Duration::minutes(10));

        assert!(window.contains(until));
        assert!(window.contains(window.from));
        assert!(window.contains(until - chrono::Duration::minutes(5)));
        assert!(!window.contains(until + chrono::Duration::seconds(1)));
        assert!(!window.contains(window.from - chrono::Duration::seconds(1)));
    }
}
