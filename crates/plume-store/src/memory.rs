//! In-memory [`Store`] implementation.
//!
//! Backs the test suites of the orchestration crates and lets embedders run
//! the pipeline before a database is wired up. Enforces the same post
//! invariants a real backend is expected to.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::{
    DueWindow, MediaAttachment, Platform, PlatformCredential, Post, PostId, PostStatus, Store,
    StoreError, UserId,
};

/// Thread-safe in-memory store.
#[derive(Default)]
pub struct MemoryStore {
    posts: RwLock<HashMap<PostId, Post>>,
    credentials: RwLock<HashMap<(UserId, Platform), PlatformCredential>>,
    media: RwLock<HashMap<PostId, Vec<MediaAttachment>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a post.
    pub async fn insert_post(&self, post: Post) {
        self.posts.write().await.insert(post.id, post);
    }

    /// Seed a credential, replacing any existing one for the pair.
    pub async fn insert_credential(&self, credential: PlatformCredential) {
        self.credentials
            .write()
            .await
            .insert((credential.user_id, credential.platform), credential);
    }

    /// Seed a media attachment.
    pub async fn insert_media(&self, attachment: MediaAttachment) {
        self.media
            .write()
            .await
            .entry(attachment.post_id)
            .or_default()
            .push(attachment);
    }

    /// Fetch a post without the ownership scope. Test-side convenience.
    pub async fn post_unscoped(&self, post_id: PostId) -> Option<Post> {
        self.posts.read().await.get(&post_id).cloned()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn post(&self, user_id: UserId, post_id: PostId) -> Result<Option<Post>, StoreError> {
        Ok(self
            .posts
            .read()
            .await
            .get(&post_id)
            .filter(|p| p.user_id == user_id)
            .cloned())
    }

    async fn find_due_posts(&self, window: DueWindow) -> Result<Vec<Post>, StoreError> {
        let posts = self.posts.read().await;
        let mut due: Vec<Post> = posts
            .values()
            .filter(|p| {
                p.status == PostStatus::Scheduled
                    && p.posted_at.is_none()
                    && p.scheduled_at.is_some_and(|at| window.contains(at))
            })
            .cloned()
            .collect();
        due.sort_by_key(|p| p.scheduled_at);
        Ok(due)
    }

    async fn set_schedule(
        &self,
        post_id: PostId,
        at: DateTime<Utc>,
        job_name: &str,
    ) -> Result<(), StoreError> {
        let mut posts = self.posts.write().await;
        let post = posts
            .get_mut(&post_id)
            .ok_or(StoreError::PostNotFound(post_id))?;
        if post.status == PostStatus::Posted {
            return Err(StoreError::PostImmutable(post_id));
        }
        post.status = PostStatus::Scheduled;
        post.scheduled_at = Some(at);
        post.scheduler_job_name = Some(job_name.to_string());
        Ok(())
    }

    async fn clear_schedule(&self, post_id: PostId) -> Result<(), StoreError> {
        let mut posts = self.posts.write().await;
        let post = posts
            .get_mut(&post_id)
            .ok_or(StoreError::PostNotFound(post_id))?;
        if post.status == PostStatus::Posted {
            return Err(StoreError::PostImmutable(post_id));
        }
        post.status = PostStatus::Suggested;
        post.scheduled_at = None;
        post.scheduler_job_name = None;
        Ok(())
    }

    async fn mark_posted(
        &self,
        post_id: PostId,
        platform_post_id: &str,
        posted_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut posts = self.posts.write().await;
        let post = posts
            .get_mut(&post_id)
            .ok_or(StoreError::PostNotFound(post_id))?;
        post.status = PostStatus::Posted;
        post.posted_at = Some(posted_at);
        post.platform_post_id = Some(platform_post_id.to_string());
        post.sharing_error = None;
        post.scheduler_job_name = None;
        Ok(())
    }

    async fn set_sharing_error(&self, post_id: PostId, error: &str) -> Result<(), StoreError> {
        let mut posts = self.posts.write().await;
        let post = posts
            .get_mut(&post_id)
            .ok_or(StoreError::PostNotFound(post_id))?;
        post.sharing_error = Some(error.to_string());
        Ok(())
    }

    async fn credential(
        &self,
        user_id: UserId,
        platform: Platform,
    ) -> Result<Option<PlatformCredential>, StoreError> {
        Ok(self
            .credentials
            .read()
            .await
            .get(&(user_id, platform))
            .cloned())
    }

    async fn update_credential(&self, credential: &PlatformCredential) -> Result<(), StoreError> {
        self.credentials
            .write()
            .await
            .insert((credential.user_id, credential.platform), credential.clone());
        Ok(())
    }

    async fn media_for_post(&self, post_id: PostId) -> Result<Vec<MediaAttachment>, StoreError> {
        Ok(self
            .media
            .read()
            .await
            .get(&post_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn scheduled_post(at: DateTime<Utc>) -> Post {
        let mut post = Post::suggested(Uuid::new_v4(), Platform::Linkedin, "body");
        post.status = PostStatus::Scheduled;
        post.scheduled_at = Some(at);
        post.scheduler_job_name = Some(format!("post-share-{}", post.id));
        post
    }

    #[tokio::test]
    async fn test_post_scoped_to_owner() {
        let store = MemoryStore::new();
        let post = Post::suggested(Uuid::new_v4(), Platform::Linkedin, "body");
        let owner = post.user_id;
        let id = post.id;
        store.insert_post(post).await;

        assert!(store.post(owner, id).await.unwrap().is_some());
        assert!(store.post(Uuid::new_v4(), id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_due_posts_filters_and_orders() {
        let store = MemoryStore::new();
        let now = Utc::now();

        let older = scheduled_post(now - chrono::Duration::minutes(8));
        let newer = scheduled_post(now - chrono::Duration::minutes(2));
        let outside = scheduled_post(now - chrono::Duration::minutes(30));
        let unscheduled = Post::suggested(Uuid::new_v4(), Platform::Linkedin, "draft");

        let (older_id, newer_id) = (older.id, newer.id);
        for p in [older, newer, outside, unscheduled] {
            store.insert_post(p).await;
        }

        let window = DueWindow::ending_at(now, chrono::Duration::minutes(10));
        let due = store.find_due_posts(window).await.unwrap();

        assert_eq!(due.len(), 2);
        assert_eq!(due[0].id, older_id);
        assert_eq!(due[1].id, newer_id);
    }

    #[tokio::test]
    async fn test_mark_posted_settles_invariants() {
        let store = MemoryStore::new();
        let post = scheduled_post(Utc::now());
        let id = post.id;
        store.insert_post(post).await;

        let posted_at = Utc::now();
        store.mark_posted(id, "li-123", posted_at).await.unwrap();

        let post = store.post_unscoped(id).await.unwrap();
        assert_eq!(post.status, PostStatus::Posted);
        assert_eq!(post.platform_post_id.as_deref(), Some("li-123"));
        assert_eq!(post.posted_at, Some(posted_at));
        assert!(post.sharing_error.is_none());
        // job_name present exactly when status is Scheduled
        assert!(post.scheduler_job_name.is_none());
    }

    #[tokio::test]
    async fn test_posted_post_is_immutable() {
        let store = MemoryStore::new();
        let post = scheduled_post(Utc::now());
        let id = post.id;
        store.insert_post(post).await;
        store.mark_posted(id, "li-123", Utc::now()).await.unwrap();

        let err = store.set_schedule(id, Utc::now(), "job").await.unwrap_err();
        assert!(matches!(err, StoreError::PostImmutable(_)));
        let err = store.clear_schedule(id).await.unwrap_err();
        assert!(matches!(err, StoreError::PostImmutable(_)));
    }

    #[tokio::test]
    async fn test_schedule_roundtrip() {
        let store = MemoryStore::new();
        let post = Post::suggested(Uuid::new_v4(), Platform::Linkedin, "body");
        let id = post.id;
        store.insert_post(post).await;

        let at = Utc::now() + chrono::Duration::hours(1);
        store.set_schedule(id, at, "post-share-x").await.unwrap();
        let post = store.post_unscoped(id).await.unwrap();
        assert_eq!(post.status, PostStatus::Scheduled);
        assert_eq!(post.scheduled_at, Some(at));
        assert_eq!(post.scheduler_job_name.as_deref(), Some("post-share-x"));

        store.clear_schedule(id).await.unwrap();
        let post = store.post_unscoped(id).await.unwrap();
        assert_eq!(post.status, PostStatus::Suggested);
        assert!(post.scheduled_at.is_none());
        assert!(post.scheduler_job_name.is_none());
    }

    #[tokio::test]
    async fn test_credential_roundtrip() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let mut cred = PlatformCredential {
            id: Uuid::new_v4(),
            user_id: user,
            platform: Platform::Linkedin,
            access_token: "old".to_string(),
            refresh_token: "rt".to_string(),
            expires_at: Utc::now(),
            platform_account_id: "8675309".to_string(),
        };
        store.insert_credential(cred.clone()).await;

        cred.access_token = "new".to_string();
        store.update_credential(&cred).await.unwrap();

        let loaded = store
            .credential(user, Platform::Linkedin)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.access_token, "new");
    }
}
