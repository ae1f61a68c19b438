//! UGC share payload assembly.
//!
//! LinkedIn models one content category per share: attached media, an
//! article link, or plain text. The categories are mutually exclusive and
//! resolved in that priority order.

use serde::Serialize;

use plume_store::{MediaAttachment, Post};

/// Content category of a share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaCategory {
    None,
    Article,
    Image,
    Video,
}

/// Author identity for a share.
pub fn person_urn(platform_account_id: &str) -> String {
    format!("urn:li:person:{}", platform_account_id)
}

/// Request body for `POST /v2/ugcPosts`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRequest {
    pub author: String,
    pub lifecycle_state: &'static str,
    pub specific_content: SpecificContent,
    pub visibility: Visibility,
}

impl ShareRequest {
    pub fn media_category(&self) -> MediaCategory {
        self.specific_content.share_content.share_media_category
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SpecificContent {
    #[serde(rename = "com.linkedin.ugc.ShareContent")]
    pub share_content: ShareContent,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareContent {
    pub share_commentary: Text,
    pub share_media_category: MediaCategory,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<ShareMedia>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Text {
    pub text: String,
}

/// One media item in a share: either an uploaded asset or an article link.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareMedia {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Text>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Visibility {
    #[serde(rename = "com.linkedin.ugc.MemberNetworkVisibility")]
    pub network: &'static str,
}

/// Infer IMAGE vs VIDEO from the first asset reference.
fn infer_media_category(media: &[MediaAttachment]) -> MediaCategory {
    match media.first() {
        Some(first) if first.asset_ref.contains("video") => MediaCategory::Video,
        Some(_) => MediaCategory::Image,
        None => MediaCategory::None,
    }
}

/// Assemble the share for a post.
///
/// Priority: attached media beats the article link beats plain text.
pub fn build_share(author: &str, post: &Post, media: &[MediaAttachment]) -> ShareRequest {
    let (category, items) = if !media.is_empty() {
        let items = media
            .iter()
            .map(|m| ShareMedia {
                status: "READY",
                media: Some(m.asset_ref.clone()),
                original_url: None,
                title: None,
            })
            .collect();
        (infer_media_category(media), items)
    } else if let Some(url) = &post.article_url {
        let item = ShareMedia {
            status: "READY",
            media: None,
            original_url: Some(url.clone()),
            title: post.title.clone().map(|text| Text { text }),
        };
        (MediaCategory::Article, vec![item])
    } else {
        (MediaCategory::None, Vec::new())
    };

    ShareRequest {
        author: author.to_string(),
        lifecycle_state: "PUBLISHED",
        specific_content: SpecificContent {
            share_content: ShareContent {
                share_commentary: Text {
                    text: post.body.clone(),
                },
                share_media_category: category,
                media: items,
            },
        },
        visibility: Visibility { network: "PUBLIC" },
    }
}
