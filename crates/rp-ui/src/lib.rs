//! # rp-ui
//!
//! Compiled askama views. Handlers build one of these templates and call
//! `render()`; every page shows the pending flash notice through `base.html`.

use askama::Template;
use rp_core::models::{Post, Privacy};
use rp_core::service::{EditablePost, ProfilePage, PublicProfile};
use uuid::Uuid;

/// A one-shot message shown at the top of the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// CSS suffix: `success` or `error`
    pub level: &'static str,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: "success",
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: "error",
            text: text.into(),
        }
    }
}

/// A post as rendered for a particular viewer.
#[derive(Debug, Clone)]
pub struct PostView {
    pub id: String,
    pub content: String,
    pub likes: usize,
    /// Whether the viewer has liked it
    pub liked: bool,
    pub created: String,
}

impl PostView {
    pub fn new(post: &Post, viewer: Uuid) -> Self {
        Self {
            id: post.id.to_string(),
            content: post.content.clone(),
            likes: post.likes.len(),
            liked: post.is_liked_by(viewer),
            created: post.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }

    /// Newest first.
    fn feed(posts: &[Post], viewer: Uuid) -> Vec<Self> {
        posts.iter().rev().map(|p| Self::new(p, viewer)).collect()
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub notice: Option<Notice>,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub notice: Option<Notice>,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub notice: Option<Notice>,
}

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub notice: Option<Notice>,
    pub name: String,
    pub username: String,
    pub age: u32,
    pub email: String,
    pub is_private: bool,
    pub posts: Vec<PostView>,
}

impl ProfileTemplate {
    pub fn new(page: &ProfilePage, notice: Option<Notice>) -> Self {
        let user = &page.user;
        Self {
            notice,
            name: user.name.clone(),
            username: user.username.clone(),
            age: user.age,
            email: user.email.clone(),
            is_private: user.privacy == Privacy::Private,
            posts: PostView::feed(&page.posts, user.id),
        }
    }
}

#[derive(Template)]
#[template(path = "edit.html")]
pub struct EditTemplate {
    pub notice: Option<Notice>,
    pub post_id: String,
    pub content: String,
    pub owner_username: String,
}

impl EditTemplate {
    pub fn new(editable: &EditablePost, notice: Option<Notice>) -> Self {
        Self {
            notice,
            post_id: editable.post.id.to_string(),
            content: editable.post.content.clone(),
            owner_username: editable.owner.username.clone(),
        }
    }
}

/// Another user's profile. Posts are only emitted when `can_view` is set.
#[derive(Template)]
#[template(path = "profile_public.html")]
pub struct PublicProfileTemplate {
    pub notice: Option<Notice>,
    pub name: String,
    pub username: String,
    pub is_owner: bool,
    pub can_view: bool,
    pub posts: Vec<PostView>,
}

impl PublicProfileTemplate {
    pub fn new(profile: &PublicProfile, viewer: Uuid, notice: Option<Notice>) -> Self {
        Self {
            notice,
            name: profile.user.name.clone(),
            username: profile.user.username.clone(),
            is_owner: profile.is_owner,
            can_view: profile.can_view,
            posts: PostView::feed(&profile.posts, viewer),
        }
    }
}
