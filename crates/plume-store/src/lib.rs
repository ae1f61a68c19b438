//! Domain model and storage boundary for Plume's publishing pipeline.
//!
//! This crate defines:
//! - The schedulable unit ([`Post`]) and its lifecycle status
//! - Media attachments and per-(user, platform) OAuth credentials
//! - The [`Store`] trait that the out-of-scope persistence layer implements
//! - [`MemoryStore`], an in-memory [`Store`] for tests and embedders

mod error;
mod memory;
mod store;
mod types;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use store::{DueWindow, Store};
pub use types::{
    MAX_SHARING_ERROR_LEN, MediaAttachment, Platform, PlatformCredential, Post, PostId,
    PostStatus, UserId, truncate_sharing_error,
};
