//! Core domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a post.
pub type PostId = Uuid;

/// Identifier of the owning user.
pub type UserId = Uuid;

/// Maximum length (in characters) of a persisted sharing error.
pub const MAX_SHARING_ERROR_LEN: usize = 500;

/// External platform a post is published to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Linkedin,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Linkedin => write!(f, "linkedin"),
        }
    }
}

/// Lifecycle status of a post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    /// Drafted by the content pipeline, not yet scheduled.
    #[default]
    Suggested,
    /// Has a registered (or pending) one-shot trigger.
    Scheduled,
    /// Published to the platform. Terminal.
    Posted,
}

/// The schedulable unit.
///
/// Invariants at rest:
/// - `scheduler_job_name.is_some()` exactly when `status == Scheduled`
/// - `posted_at` and `platform_post_id` are set together, exactly when
///   `status == Posted`
/// - a `Posted` post is immutable with respect to scheduling fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub user_id: UserId,
    pub platform: Platform,
    /// Optional headline, used as the article title when sharing a link.
    pub title: Option<String>,
    /// Commentary text of the share.
    pub body: String,
    /// Link to share as an article, when no media is attached.
    pub article_url: Option<String>,
    pub status: PostStatus,
    /// Instant the post should publish at, truncated to the minute.
    pub scheduled_at: Option<DateTime<Utc>>,
    /// Name of the one-shot trigger in the external cron service.
    pub scheduler_job_name: Option<String>,
    pub posted_at: Option<DateTime<Utc>>,
    /// Platform-assigned id of the published share.
    pub platform_post_id: Option<String>,
    /// Last publish failure, kept while the post stays retry-eligible.
    pub sharing_error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Create a freshly suggested post, the way the content pipeline hands
    /// them to this subsystem.
    pub fn suggested(user_id: UserId, platform: Platform, body: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            platform,
            title: None,
            body: body.into(),
            article_url: None,
            status: PostStatus::Suggested,
            scheduled_at: None,
            scheduler_job_name: None,
            posted_at: None,
            platform_post_id: None,
            sharing_error: None,
            created_at: Utc::now(),
        }
    }

    /// Whether the post has reached its terminal state.
    pub fn is_posted(&self) -> bool {
        self.status == PostStatus::Posted
    }
}

/// A platform-ready media asset attached to a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaAttachment {
    pub id: Uuid,
    pub post_id: PostId,
    /// Platform asset reference, e.g. `urn:li:digitalmediaAsset:C5522AQ...`.
    pub asset_ref: String,
}

impl MediaAttachment {
    pub fn new(post_id: PostId, asset_ref: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            post_id,
            asset_ref: asset_ref.into(),
        }
    }
}

/// Persisted OAuth credential, one per (user, platform).
///
/// Shared by all of a user's posts on that platform; mutated only by the
/// credential refresher under per-(user, platform) exclusion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformCredential {
    pub id: Uuid,
    pub user_id: UserId,
    pub platform: Platform,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    /// Platform member id, used to build the author identity on publish.
    pub platform_account_id: String,
}

impl PlatformCredential {
    /// Remaining lifetime of the access token. Negative once expired.
    pub fn remaining_lifetime(&self) -> chrono::Duration {
        self.expires_at - Utc::now()
    }
}

/// Bound an error message to what the post row stores.
///
/// The full error is logged verbatim by the caller; the persisted copy is
/// truncated on a char boundary.
pub fn truncate_sharing_error(message: &str) -> String {
    message.chars().take(MAX_SHARING_ERROR_LEN).collect()
}
