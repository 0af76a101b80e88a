//! # SocialService
//!
//! Orchestrates the ports for every user-facing operation: registration,
//! login, profiles, posts and likes. Handlers stay thin and only translate
//! HTTP in and out of these calls.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{AppError, Result, UniqueViolation};
use crate::models::{Identity, Post, Privacy, User};
use crate::traits::{AuthProvider, PostStore, UserDirectory};

const MAX_USERNAME_LEN: usize = 30;

/// Registration form input, as typed.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub username: String,
    pub email: String,
    pub age: String,
    pub password: String,
}

/// A `NewAccount` that passed validation.
struct ValidAccount {
    name: String,
    username: String,
    email: String,
    age: u32,
    password: String,
}

impl NewAccount {
    fn validated(self) -> Result<ValidAccount> {
        let name = self.name.trim().to_string();
        let username = self.username.trim().to_string();
        let email = self.email.trim().to_string();

        if name.is_empty() {
            return Err(AppError::ValidationError("Name is required".into()));
        }
        if !is_valid_username(&username) {
            return Err(AppError::ValidationError(
                "Username must be 1-30 letters, digits, '_', '-' or '.'".into(),
            ));
        }
        if !email.contains('@') {
            return Err(AppError::ValidationError("A valid email is required".into()));
        }
        let age = self
            .age
            .trim()
            .parse::<u32>()
            .map_err(|_| AppError::ValidationError("Age must be a whole number".into()))?;
        if self.password.is_empty() {
            return Err(AppError::ValidationError("Password is required".into()));
        }

        Ok(ValidAccount {
            name,
            username,
            email,
            age,
            password: self.password,
        })
    }
}

/// Names that collide with routes under `/profile/` or with path segments.
const RESERVED_USERNAMES: &[&str] = &["privacy", ".", ".."];

/// Usernames appear in URL paths and redirect targets, so they are restricted
/// to a safe alphabet.
pub fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username.len() <= MAX_USERNAME_LEN
        && !RESERVED_USERNAMES.contains(&username)
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// A user's own profile with its posts resolved.
#[derive(Debug, Clone)]
pub struct ProfilePage {
    pub user: User,
    pub posts: Vec<Post>,
}

/// Another user's profile as seen by a viewer.
///
/// `can_view` is computed here but not applied to `posts`: the view decides
/// what to hide.
#[derive(Debug, Clone)]
pub struct PublicProfile {
    pub user: User,
    pub posts: Vec<Post>,
    pub is_owner: bool,
    pub can_view: bool,
}

/// A post loaded for the edit form, together with its owner.
#[derive(Debug, Clone)]
pub struct EditablePost {
    pub post: Post,
    pub owner: User,
}

pub struct SocialService {
    users: Arc<dyn UserDirectory>,
    posts: Arc<dyn PostStore>,
    auth: Arc<dyn AuthProvider>,
}

impl SocialService {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        posts: Arc<dyn PostStore>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        Self { users, posts, auth }
    }

    /// Creates an account and returns it with a freshly signed token.
    pub async fn register(&self, account: NewAccount) -> Result<(User, String)> {
        let account = account.validated()?;

        if self.users.find_by_email(&account.email).await?.is_some() {
            warn!(email = %account.email, "registration rejected, email in use");
            return Err(AppError::AlreadyRegistered(account.email));
        }
        if self.users.find_by_username(&account.username).await?.is_some() {
            warn!(username = %account.username, "registration rejected, username in use");
            return Err(AppError::UsernameTaken(account.username));
        }

        let password_hash = self.auth.hash_password(&account.password)?;
        let user = User {
            id: Uuid::now_v7(),
            username: account.username,
            name: account.name,
            age: account.age,
            email: account.email,
            password_hash,
            privacy: Privacy::default(),
            post_ids: Vec::new(),
            created_at: Utc::now(),
        };
        // The pre-checks above can race with a concurrent registration; the
        // store has the final say.
        self.users
            .create_user(user.clone())
            .await
            .map_err(|e| match e.downcast::<UniqueViolation>() {
                Ok(clash) => {
                    warn!(%clash, "registration rejected by the store");
                    AppError::from(clash)
                }
                Err(e) => AppError::Internal(e),
            })?;

        let token = self.auth.issue_token(&Identity::from(&user))?;
        info!(user_id = %user.id, username = %user.username, "account registered");
        Ok((user, token))
    }

    /// Checks credentials and returns the account with a freshly signed token.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String)> {
        let email = email.trim();
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::UserNotFound(email.to_string()))?;

        if !self.auth.verify_password(password, &user.password_hash) {
            warn!(user_id = %user.id, "login rejected, wrong password");
            return Err(AppError::InvalidCredentials);
        }

        let token = self.auth.issue_token(&Identity::from(&user))?;
        info!(user_id = %user.id, "logged in");
        Ok((user, token))
    }

    /// Decodes a session token. An empty value is treated as no token.
    pub fn authenticate(&self, token: &str) -> Result<Identity> {
        if token.is_empty() {
            return Err(AppError::Unauthorized("missing token".into()));
        }
        self.auth
            .verify_token(token)
            .map_err(|e| AppError::Unauthorized(e.to_string()))
    }

    pub async fn own_profile(&self, who: &Identity) -> Result<ProfilePage> {
        let user = self.current_user(who).await?;
        let posts = self.posts.get_posts(&user.post_ids).await?;
        Ok(ProfilePage { user, posts })
    }

    pub async fn set_privacy(&self, who: &Identity, privacy: Privacy) -> Result<()> {
        let user = self.current_user(who).await?;
        self.users.set_privacy(user.id, privacy).await?;
        info!(user_id = %user.id, %privacy, "privacy updated");
        Ok(())
    }

    pub async fn create_post(&self, who: &Identity, content: &str) -> Result<Post> {
        let content = non_blank(content)?;
        let user = self.current_user(who).await?;

        let post = Post::new(user.id, content);
        self.posts.create_post(post.clone()).await?;
        info!(user_id = %user.id, post_id = %post.id, "post created");
        Ok(post)
    }

    /// Loads a post for editing. Only the owner may open it.
    pub async fn post_for_edit(&self, who: &Identity, post_id: Uuid) -> Result<EditablePost> {
        let post = self.owned_post(who, post_id).await?;
        let owner = self
            .users
            .get_user(post.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("user".into(), post.user_id.to_string()))?;
        Ok(EditablePost { post, owner })
    }

    pub async fn update_post(&self, who: &Identity, post_id: Uuid, content: &str) -> Result<()> {
        let content = non_blank(content)?;
        self.owned_post(who, post_id).await?;

        if !self.posts.update_content(post_id, &content).await? {
            return Err(AppError::NotFound("post".into(), post_id.to_string()));
        }
        info!(user_id = %who.user_id, %post_id, "post updated");
        Ok(())
    }

    /// Likes or unlikes a post for the acting user. Returns true if the post is
    /// liked afterwards.
    pub async fn toggle_like(&self, who: &Identity, post_id: Uuid) -> Result<bool> {
        let mut post = self.find_post(post_id).await?;
        let owner = self
            .users
            .get_user(post.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("user".into(), post.user_id.to_string()))?;

        if !owner.is_visible_to(who.user_id) {
            warn!(user_id = %who.user_id, %post_id, "like rejected, profile is private");
            return Err(AppError::Forbidden("This profile is private".into()));
        }

        let liked = post.toggle_like(who.user_id);
        self.posts.set_likes(post.id, &post.likes).await?;
        debug!(user_id = %who.user_id, %post_id, liked, "like toggled");
        Ok(liked)
    }

    pub async fn public_profile(&self, who: &Identity, username: &str) -> Result<PublicProfile> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound("user".into(), username.to_string()))?;
        let posts = self.posts.get_posts(&user.post_ids).await?;

        let is_owner = user.id == who.user_id;
        let can_view = user.is_visible_to(who.user_id);
        Ok(PublicProfile {
            user,
            posts,
            is_owner,
            can_view,
        })
    }

    async fn current_user(&self, who: &Identity) -> Result<User> {
        self.users
            .get_user(who.user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("account no longer exists".into()))
    }

    async fn find_post(&self, post_id: Uuid) -> Result<Post> {
        self.posts
            .get_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("post".into(), post_id.to_string()))
    }

    async fn owned_post(&self, who: &Identity, post_id: Uuid) -> Result<Post> {
        let post = self.find_post(post_id).await?;
        if post.user_id != who.user_id {
            warn!(user_id = %who.user_id, %post_id, "edit rejected, not the owner");
            return Err(AppError::Forbidden("You can only edit your own posts".into()));
        }
        Ok(post)
    }
}

fn non_blank(content: &str) -> Result<String> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::ValidationError("Post content cannot be empty".into()));
    }
    Ok(content.to_string())
}
