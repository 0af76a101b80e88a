//! # Domain Models
//!
//! These structs represent the two collections of Rusty-Profile: accounts and
//! the posts they own. UUID v7 keeps identifiers time-ordered.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Visibility of a user's profile page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Privacy {
    #[default]
    Public,
    Private,
}

impl Privacy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Privacy::Public => "public",
            Privacy::Private => "private",
        }
    }
}

impl fmt::Display for Privacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Privacy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Privacy::Public),
            "private" => Ok(Privacy::Private),
            other => Err(format!("unknown privacy setting: {other}")),
        }
    }
}

/// An account record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Handle used in public profile URLs (e.g. /profile/alice)
    pub username: String,
    /// Display name
    pub name: String,
    pub age: u32,
    pub email: String,
    /// Argon2 PHC string, never the raw password
    pub password_hash: String,
    pub privacy: Privacy,
    /// Owned posts in creation order. References only, nothing cascades.
    pub post_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Whether `viewer` may see this profile's posts.
    pub fn is_visible_to(&self, viewer: Uuid) -> bool {
        self.privacy == Privacy::Public || self.id == viewer
    }
}

/// A short text post and the users who liked it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    /// Owning user, must resolve in the directory
    pub user_id: Uuid,
    pub content: String,
    /// Liking users, unique, in the order they liked
    pub likes: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn new(user_id: Uuid, content: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id,
            content,
            likes: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn is_liked_by(&self, user_id: Uuid) -> bool {
        self.likes.contains(&user_id)
    }

    /// Adds or removes `user_id` from the like-set. Returns true if the post is
    /// now liked by that user.
    pub fn toggle_like(&mut self, user_id: Uuid) -> bool {
        if self.is_liked_by(user_id) {
            self.likes.retain(|id| *id != user_id);
            false
        } else {
            self.likes.push(user_id);
            true
        }
    }
}

/// The decoded payload of a session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
        }
    }
}
