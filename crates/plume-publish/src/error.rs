//! Error taxonomy for publish orchestration.

use thiserror::Error;

use plume_cron::CronError;
use plume_linkedin::LinkedinError;
use plume_store::{Platform, PostId, StoreError, UserId};

/// Errors that can occur while scheduling or publishing a post.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Post absent or owned by someone else. Never retried.
    #[error("post not found: {0}")]
    PostNotFound(PostId),

    /// A published post is immutable with respect to scheduling.
    #[error("post already published: {0}")]
    AlreadyPosted(PostId),

    /// No credential connected for the (user, platform) pair.
    #[error("no {platform} credential for user {user_id}")]
    CredentialMissing { user_id: UserId, platform: Platform },

    /// Credential refresh failed; only re-authentication fixes this.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The platform rejected or failed the publish call.
    #[error("platform error: {0}")]
    Platform(String),

    /// The scheduling service rejected an operation on a trigger.
    #[error("scheduling service rejected job {job_name}: {source}")]
    Registry {
        job_name: String,
        #[source]
        source: CronError,
    },

    /// Storage failure.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl PublishError {
    /// Authentication failures are fatal for the attempt: the immediate
    /// publish retry skips them, since only human re-auth helps.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            PublishError::Auth(_) | PublishError::CredentialMissing { .. }
        )
    }
}

impl From<LinkedinError> for PublishError {
    fn from(err: LinkedinError) -> Self {
        match err {
            LinkedinError::Auth(message) => PublishError::Auth(message),
            other => PublishError::Platform(other.to_string()),
        }
    }
}
