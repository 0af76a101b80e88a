//! rusty-profile/crates/rp-core/src/lib.rs
//!
//! The central domain logic and interface definitions for Rusty-Profile.

pub mod error;
pub mod models;
pub mod service;
pub mod traits;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use service::*;
pub use traits::*;

#[cfg(test)]
mod tests {
    use super::models::*;
    use uuid::Uuid;

    fn account(privacy: Privacy) -> User {
        User {
            id: Uuid::now_v7(),
            username: "alice".into(),
            name: "Alice".into(),
            age: 30,
            email: "a@x.com".into(),
            password_hash: String::new(),
            privacy,
            post_ids: Vec::new(),
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_post_creation_v7() {
        let owner = Uuid::now_v7();
        let post = Post::new(owner, "Hello Rust!".to_string());
        assert_eq!(post.id.get_version_num(), 7);
        assert_eq!(post.user_id, owner);
        assert!(post.likes.is_empty());
    }

    #[test]
    fn test_like_twice_toggles_back() {
        let fan = Uuid::now_v7();
        let mut post = Post::new(Uuid::now_v7(), "hi".into());

        assert!(post.toggle_like(fan));
        assert!(post.is_liked_by(fan));
        assert!(!post.toggle_like(fan));
        assert!(post.likes.is_empty());
    }

    #[test]
    fn test_likes_stay_unique_per_user() {
        let (a, b) = (Uuid::now_v7(), Uuid::now_v7());
        let mut post = Post::new(Uuid::now_v7(), "hi".into());
        post.toggle_like(a);
        post.toggle_like(b);
        post.toggle_like(a);
        post.toggle_like(a);
        assert_eq!(post.likes, vec![b, a]);
    }

    #[test]
    fn test_privacy_parsing() {
        assert_eq!("public".parse::<Privacy>(), Ok(Privacy::Public));
        assert_eq!("private".parse::<Privacy>(), Ok(Privacy::Private));
        assert!("friends".parse::<Privacy>().is_err());
        assert_eq!(Privacy::default(), Privacy::Public);
    }

    #[test]
    fn test_visibility() {
        let public = account(Privacy::Public);
        let private = account(Privacy::Private);
        let stranger = Uuid::now_v7();

        assert!(public.is_visible_to(stranger));
        assert!(!private.is_visible_to(stranger));
        assert!(private.is_visible_to(private.id));
    }
}
