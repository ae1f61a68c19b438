//! LinkedIn REST client for Plume.
//!
//! Covers the two calls the publishing pipeline makes:
//! - OAuth refresh-token exchange at the token endpoint
//! - UGC share creation, with the share payload assembled from a post, its
//!   media attachments, and the author's member id

pub mod payload;

mod client;
mod error;

pub use client::{LinkedinClient, LinkedinConfig, TokenResponse};
pub use error::LinkedinError;
pub use payload::{MediaCategory, ShareRequest, build_share, person_urn};
