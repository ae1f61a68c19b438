//! Credential freshness management.

use std::sync::Arc;

use chrono::{Duration, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};

use plume_linkedin::LinkedinClient;
use plume_store::{Platform, PlatformCredential, Store, UserId};

use crate::PublishError;

/// Refresh when less than this much access-token lifetime remains.
/// Amortizes refresh cost across publishes and stays clear of token-endpoint
/// rate limits.
pub const DEFAULT_REFRESH_THRESHOLD_MINS: i64 = 60;

/// Freshness of a credential, surfaced for the connection-status UX.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialStatus {
    Fresh,
    NearExpiry,
    Expired,
}

/// Keeps access tokens fresh, one refresh at a time per (user, platform).
pub struct CredentialRefresher<S> {
    store: Arc<S>,
    linkedin: Arc<LinkedinClient>,
    threshold: Duration,
    /// Racing refreshes against the same refresh token can invalidate each
    /// other, so each (user, platform) pair refreshes under its own lock.
    /// Unrelated users stay concurrent.
    locks: DashMap<(UserId, Platform), Arc<Mutex<()>>>,
}

impl<S: Store> CredentialRefresher<S> {
    pub fn new(store: Arc<S>, linkedin: Arc<LinkedinClient>) -> Self {
        Self {
            store,
            linkedin,
            threshold: Duration::minutes(DEFAULT_REFRESH_THRESHOLD_MINS),
            locks: DashMap::new(),
        }
    }

    pub fn with_threshold(mut self, threshold: Duration) -> Self {
        self.threshold = threshold;
        self
    }

    /// Freshness report without any network traffic.
    pub fn status(&self, credential: &PlatformCredential) -> CredentialStatus {
        let remaining = credential.remaining_lifetime();
        if remaining <= Duration::zero() {
            CredentialStatus::Expired
        } else if remaining <= self.threshold {
            CredentialStatus::NearExpiry
        } else {
            CredentialStatus::Fresh
        }
    }

    /// Return a credential with comfortable lifetime left, refreshing it
    /// first when needed.
    ///
    /// The far-from-expiry path makes zero network calls. Failure is an
    /// authentication error: fatal for this attempt, fixed by re-auth, not
    /// by retrying.
    #[tracing::instrument(skip_all, fields(user_id = %credential.user_id))]
    pub async fn ensure_fresh(
        &self,
        credential: PlatformCredential,
    ) -> Result<PlatformCredential, PublishError> {
        if credential.remaining_lifetime() > self.threshold {
            return Ok(credential);
        }

        let key = (credential.user_id, credential.platform);
        let lock = self
            .locks
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        // Re-read after acquiring the lock: the previous holder may have
        // refreshed this credential already.
        let current = self
            .store
            .credential(credential.user_id, credential.platform)
            .await?
            .ok_or(PublishError::CredentialMissing {
                user_id: credential.user_id,
                platform: credential.platform,
            })?;
        if current.remaining_lifetime() > self.threshold {
            debug!("credential already refreshed by a concurrent caller");
            return Ok(current);
        }

        let token = self
            .linkedin
            .refresh_access_token(&current.refresh_token)
            .await
            .map_err(|e| PublishError::Auth(e.to_string()))?;

        let mut updated = current;
        updated.access_token = token.access_token;
        updated.expires_at = Utc::now() + Duration::seconds(token.expires_in);
        // Rotate only when the platform issued a new refresh token.
        if let Some(rotated) = token.refresh_token {
            updated.refresh_token = rotated;
        }
        self.store.update_credential(&updated).await?;

        info!(expires_at = %updated.expires_at, "refreshed platform credential");
        Ok(updated)
    }
}
