//! # rp-db-memory
//!
//! Process-local implementation of `UserDirectory` and `PostStore`.
//! Nothing survives a restart; used by the test suites and the `db-memory`
//! build of the binary.

use anyhow::bail;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rp_core::error::UniqueViolation;
use rp_core::models::{Post, Privacy, User};
use rp_core::traits::{PostStore, UserDirectory};
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<Uuid, User>,
    posts: DashMap<Uuid, Post>,
    /// Unique indexes, email and username to user id
    emails: DashMap<String, Uuid>,
    usernames: DashMap<String, Uuid>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn create_user(&self, user: User) -> anyhow::Result<()> {
        // Both index slots are claimed before anything is written; entries are
        // always taken email first, then username.
        let email_slot = match self.emails.entry(user.email.clone()) {
            Entry::Occupied(_) => return Err(UniqueViolation::Email(user.email).into()),
            Entry::Vacant(slot) => slot,
        };
        let username_slot = match self.usernames.entry(user.username.clone()) {
            Entry::Occupied(_) => return Err(UniqueViolation::Username(user.username).into()),
            Entry::Vacant(slot) => slot,
        };

        let id = user.id;
        self.users.insert(id, user);
        email_slot.insert(id);
        username_slot.insert(id);
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let id = self.emails.get(email).map(|id| *id);
        Ok(id.and_then(|id| self.users.get(&id).map(|u| u.clone())))
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let id = self.usernames.get(username).map(|id| *id);
        Ok(id.and_then(|id| self.users.get(&id).map(|u| u.clone())))
    }

    async fn set_privacy(&self, id: Uuid, privacy: Privacy) -> anyhow::Result<()> {
        match self.users.get_mut(&id) {
            Some(mut user) => {
                user.privacy = privacy;
                Ok(())
            }
            None => bail!("no user {id}"),
        }
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn create_post(&self, post: Post) -> anyhow::Result<()> {
        // Hold the owner's entry for the whole operation so the post and the
        // list append land together.
        let Some(mut owner) = self.users.get_mut(&post.user_id) else {
            bail!("post owner {} does not exist", post.user_id);
        };
        owner.post_ids.push(post.id);
        self.posts.insert(post.id, post);
        Ok(())
    }

    async fn get_post(&self, id: Uuid) -> anyhow::Result<Option<Post>> {
        Ok(self.posts.get(&id).map(|p| p.clone()))
    }

    async fn get_posts(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Post>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.posts.get(id).map(|p| p.clone()))
            .collect())
    }

    async fn update_content(&self, id: Uuid, content: &str) -> anyhow::Result<bool> {
        Ok(match self.posts.get_mut(&id) {
            Some(mut post) => {
                post.content = content.to_string();
                true
            }
            None => false,
        })
    }

    async fn set_likes(&self, id: Uuid, likes: &[Uuid]) -> anyhow::Result<()> {
        match self.posts.get_mut(&id) {
            Some(mut post) => {
                post.likes = likes.to_vec();
                Ok(())
            }
            None => bail!("no post {id}"),
        }
    }
}
