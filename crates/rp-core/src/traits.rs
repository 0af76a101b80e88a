//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Identity, Post, Privacy, User};

/// Account persistence contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn create_user(&self, user: User) -> anyhow::Result<()>;
    async fn get_user(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;
    async fn set_privacy(&self, id: Uuid, privacy: Privacy) -> anyhow::Result<()>;
}

/// Post persistence contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Stores the post and appends its id to the owner's post list.
    /// Implementations must apply both writes as one unit.
    async fn create_post(&self, post: Post) -> anyhow::Result<()>;
    async fn get_post(&self, id: Uuid) -> anyhow::Result<Option<Post>>;
    /// Resolves post ids, preserving the order of `ids` and skipping dangling ones.
    async fn get_posts(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Post>>;
    /// Overwrites the content field. Returns false if no such post exists.
    async fn update_content(&self, id: Uuid, content: &str) -> anyhow::Result<bool>;
    async fn set_likes(&self, id: Uuid, likes: &[Uuid]) -> anyhow::Result<()>;
}

/// Credential hashing and session token contract.
#[cfg_attr(test, mockall::automock)]
pub trait AuthProvider: Send + Sync {
    /// Produces a salted one-way hash of `password`.
    fn hash_password(&self, password: &str) -> anyhow::Result<String>;

    /// Verifies a password against a stored hash. Malformed hashes never match.
    fn verify_password(&self, password: &str, hash: &str) -> bool;

    /// Signs a token carrying `identity`.
    fn issue_token(&self, identity: &Identity) -> anyhow::Result<String>;

    /// Checks signature and expiry and returns the carried identity.
    fn verify_token(&self, token: &str) -> anyhow::Result<Identity>;
}
