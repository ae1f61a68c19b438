//! Single-post publish execution.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use plume_linkedin::{LinkedinClient, build_share, person_urn};
use plume_store::{MediaAttachment, PlatformCredential, Post};

use crate::PublishError;

/// Proof of a successful publish.
#[derive(Debug, Clone)]
pub struct PublishReceipt {
    pub platform_post_id: String,
    pub published_at: DateTime<Utc>,
}

/// Assembles the platform payload and makes the publish call.
pub struct PublishDispatcher {
    linkedin: Arc<LinkedinClient>,
}

impl PublishDispatcher {
    pub fn new(linkedin: Arc<LinkedinClient>) -> Self {
        Self { linkedin }
    }

    /// Publish one post. One API call; retry policy belongs to the caller.
    #[tracing::instrument(skip_all, fields(post_id = %post.id))]
    pub async fn publish(
        &self,
        post: &Post,
        credential: &PlatformCredential,
        media: &[MediaAttachment],
    ) -> Result<PublishReceipt, PublishError> {
        let author = person_urn(&credential.platform_account_id);
        let share = build_share(&author, post, media);
        debug!(
            category = ?share.media_category(),
            media_count = media.len(),
            "assembled share payload"
        );

        let platform_post_id = self
            .linkedin
            .create_share(&credential.access_token, &share)
            .await?;

        info!(platform_post_id = %platform_post_id, "published post");
        Ok(PublishReceipt {
            platform_post_id,
            published_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plume_linkedin::LinkedinConfig;
    use plume_store::Platform;
    use uuid::Uuid;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn dispatcher(server: &MockServer) -> PublishDispatcher {
        PublishDispatcher::new(Arc::new(LinkedinClient::new(LinkedinConfig {
            api_base: server.uri(),
            oauth_base: server.uri(),
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
        })))
    }

    fn fixtures() -> (Post, PlatformCredential) {
        let post = Post::suggested(Uuid::new_v4(), Platform::Linkedin, "an update");
        let credential = PlatformCredential {
            id: Uuid::new_v4(),
            user_id: post.user_id,
            platform: Platform::Linkedin,
            access_token: "at-1".to_string(),
            refresh_token: "rt-1".to_string(),
            expires_at: Utc::now() + chrono::Duration::hours(2),
            platform_account_id: "8675309".to_string(),
        };
        (post, credential)
    }

    #[tokio::test]
    async fn test_publish_returns_receipt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/ugcPosts"))
            .and(body_partial_json(serde_json::json!({
                "author": "urn:li:person:8675309"
            })))
            .respond_with(ResponseTemplate::new(201).insert_header("x-restli-id", "li-123"))
            .mount(&server)
            .await;

        let (post, credential) = fixtures();
        let receipt = dispatcher(&server)
            .publish(&post, &credential, &[])
            .await
            .unwrap();

        assert_eq!(receipt.platform_post_id, "li-123");
    }

    #[tokio::test]
    async fn test_publish_attaches_media_category() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/ugcPosts"))
            .and(body_partial_json(serde_json::json!({
                "specificContent": {
                    "com.linkedin.ugc.ShareContent": { "shareMediaCategory": "IMAGE" }
                }
            })))
            .respond_with(ResponseTemplate::new(201).insert_header("x-restli-id", "li-124"))
            .expect(1)
            .mount(&server)
            .await;

        let (post, credential) = fixtures();
        let media = vec![MediaAttachment::new(post.id, "urn:li:digitalmediaAsset:A")];
        dispatcher(&server)
            .publish(&post, &credential, &media)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_publish_failure_carries_platform_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/ugcPosts"))
            .respond_with(
                ResponseTemplate::new(500).set_body_string(r#"{"message":"internal error"}"#),
            )
            .mount(&server)
            .await;

        let (post, credential) = fixtures();
        let err = dispatcher(&server)
            .publish(&post, &credential, &[])
            .await
            .unwrap_err();

        match err {
            PublishError::Platform(message) => assert!(message.contains("internal error")),
            other => panic!("expected platform error, got {:?}", other),
        }
    }
}
