//! # rp-db-sqlite Implementation
//!
//! This module implements the data mapping between SQLite and the `rp-core`
//! domain models. Rows are document-shaped: list-valued fields (a user's
//! post ids, a post's likes) are stored as JSON text on the owning row.

use std::collections::HashMap;

use anyhow::{bail, Context};
use async_trait::async_trait;
use rp_core::error::UniqueViolation;
use rp_core::models::{Post, Privacy, User};
use rp_core::traits::{PostStore, UserDirectory};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite};
use uuid::Uuid;

const CREATE_USERS: &str = "CREATE TABLE IF NOT EXISTS users (
    id            BLOB PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE,
    name          TEXT NOT NULL,
    age           INTEGER NOT NULL,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    privacy       TEXT NOT NULL DEFAULT 'public',
    post_ids      TEXT NOT NULL DEFAULT '[]',
    created_at    TEXT NOT NULL
)";

const CREATE_POSTS: &str = "CREATE TABLE IF NOT EXISTS posts (
    id         BLOB PRIMARY KEY,
    user_id    BLOB NOT NULL REFERENCES users(id),
    content    TEXT NOT NULL,
    likes      TEXT NOT NULL DEFAULT '[]',
    created_at TEXT NOT NULL
)";

const USER_COLUMNS: &str =
    "id, username, name, age, email, password_hash, privacy, post_ids, created_at";
const POST_COLUMNS: &str = "id, user_id, content, likes, created_at";

pub struct SqliteStore {
    pool: SqlitePool,
}

// Helpers for UUID conversion
fn uuid_to_blob(id: Uuid) -> Vec<u8> {
    id.as_bytes().to_vec()
}

fn blob_to_uuid(blob: &[u8]) -> anyhow::Result<Uuid> {
    Uuid::from_slice(blob).context("corrupt uuid column")
}

impl SqliteStore {
    /// Connects to `url` and creates the schema if it is missing.
    ///
    /// An in-memory database lives and dies with its connection, so those
    /// URLs get a single connection that is never recycled.
    pub async fn new(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let options = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections)
        };
        let pool = options
            .connect(url)
            .await
            .with_context(|| format!("failed to open SQLite store at {url}"))?;

        let store = Self { pool };
        store.migrate().await?;
        tracing::info!("SQLite store ready at {url}");
        Ok(store)
    }

    async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::query(CREATE_USERS).execute(&self.pool).await?;
        sqlx::query(CREATE_POSTS).execute(&self.pool).await?;
        Ok(())
    }

    async fn fetch_user(&self, column: &str, value: &str) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?");
        let row = sqlx::query(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }
}

/// Turns a UNIQUE violation on `users.email` or `users.username` into a
/// `UniqueViolation` the service can recognise.
fn classify_insert_error(err: sqlx::Error, user: &User) -> anyhow::Error {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            let message = db.message();
            if message.contains("users.email") {
                return UniqueViolation::Email(user.email.clone()).into();
            }
            if message.contains("users.username") {
                return UniqueViolation::Username(user.username.clone()).into();
            }
        }
    }
    err.into()
}

fn user_from_row(row: &SqliteRow) -> anyhow::Result<User> {
    let age: i64 = row.try_get("age")?;
    Ok(User {
        id: blob_to_uuid(row.try_get::<Vec<u8>, _>("id")?.as_slice())?,
        username: row.try_get("username")?,
        name: row.try_get("name")?,
        age: u32::try_from(age).context("age out of range")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        privacy: row
            .try_get::<String, _>("privacy")?
            .parse::<Privacy>()
            .map_err(anyhow::Error::msg)?,
        post_ids: serde_json::from_str(&row.try_get::<String, _>("post_ids")?)?,
        created_at: row.try_get("created_at")?,
    })
}

fn post_from_row(row: &SqliteRow) -> anyhow::Result<Post> {
    Ok(Post {
        id: blob_to_uuid(row.try_get::<Vec<u8>, _>("id")?.as_slice())?,
        user_id: blob_to_uuid(row.try_get::<Vec<u8>, _>("user_id")?.as_slice())?,
        content: row.try_get("content")?,
        likes: serde_json::from_str(&row.try_get::<String, _>("likes")?)?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl UserDirectory for SqliteStore {
    async fn create_user(&self, user: User) -> anyhow::Result<()> {
        sqlx::query(&format!(
            "INSERT INTO users ({USER_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(uuid_to_blob(user.id))
        .bind(&user.username)
        .bind(&user.name)
        .bind(i64::from(user.age))
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.privacy.as_str())
        .bind(serde_json::to_string(&user.post_ids)?)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| classify_insert_error(e, &user))?;
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        self.fetch_user("email", email).await
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        self.fetch_user("username", username).await
    }

    async fn set_privacy(&self, id: Uuid, privacy: Privacy) -> anyhow::Result<()> {
        let result = sqlx::query("UPDATE users SET privacy = ? WHERE id = ?")
            .bind(privacy.as_str())
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            bail!("no user {id}");
        }
        Ok(())
    }
}

#[async_trait]
impl PostStore for SqliteStore {
    /// Inserts the post and appends its id to the owner's list in one
    /// transaction, so a failure leaves neither write behind.
    ///
    /// Both statements are writes and nothing is read first: the transaction
    /// takes SQLite's write lock on its first statement and waits out a busy
    /// database instead of failing a read-to-write upgrade.
    async fn create_post(&self, post: Post) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;

        // 1. Insert the post
        sqlx::query(&format!("INSERT INTO posts ({POST_COLUMNS}) VALUES (?, ?, ?, ?, ?)"))
            .bind(uuid_to_blob(post.id))
            .bind(uuid_to_blob(post.user_id))
            .bind(&post.content)
            .bind(serde_json::to_string(&post.likes)?)
            .bind(post.created_at)
            .execute(&mut *tx)
            .await?;

        // 2. Append to the owner's JSON list in place
        let appended = sqlx::query(
            "UPDATE users SET post_ids = json_insert(post_ids, '$[#]', ?) WHERE id = ?",
        )
        .bind(post.id.to_string())
        .bind(uuid_to_blob(post.user_id))
        .execute(&mut *tx)
        .await?;
        if appended.rows_affected() == 0 {
            bail!("post owner {} does not exist", post.user_id);
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get_post(&self, id: Uuid) -> anyhow::Result<Option<Post>> {
        let row = sqlx::query(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?"))
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(post_from_row).transpose()
    }

    async fn get_posts(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Post>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {POST_COLUMNS} FROM posts WHERE id IN ("));
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(uuid_to_blob(*id));
        }
        separated.push_unseparated(")");

        let mut by_id: HashMap<Uuid, Post> = query
            .build()
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(|row| post_from_row(row).map(|post| (post.id, post)))
            .collect::<anyhow::Result<_>>()?;

        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    async fn update_content(&self, id: Uuid, content: &str) -> anyhow::Result<bool> {
        let result = sqlx::query("UPDATE posts SET content = ? WHERE id = ?")
            .bind(content)
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_likes(&self, id: Uuid, likes: &[Uuid]) -> anyhow::Result<()> {
        let result = sqlx::query("UPDATE posts SET likes = ? WHERE id = ?")
            .bind(serde_json::to_string(likes)?)
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            bail!("no post {id}");
        }
        Ok(())
    }
}
