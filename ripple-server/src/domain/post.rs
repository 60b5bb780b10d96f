use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// A repost annotation, owned by the post it is attached to.
/// Appended on repost, removed by reposter id on unrepost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Repost {
    pub(crate) reposter_id: i64,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Post {
    pub(crate) id: i64,
    pub(crate) author_id: i64,
    pub(crate) file_id: i64,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) reposts: Vec<Repost>,
    /// Liker ids. Uniqueness is enforced by the storage layer's
    /// set-add/set-remove primitive.
    pub(crate) likes: Vec<i64>,
}

impl Post {
    pub(crate) fn new(
        id: i64,
        author_id: i64,
        file_id: i64,
        created_at: DateTime<Utc>,
        reposts: Vec<Repost>,
        likes: Vec<i64>,
    ) -> Result<Self, DomainError> {
        validate_positive_i64("id", id)?;
        validate_positive_i64("author_id", author_id)?;
        validate_positive_i64("file_id", file_id)?;
        for repost in &reposts {
            validate_positive_i64("reposter_id", repost.reposter_id)?;
        }

        Ok(Self {
            id,
            author_id,
            file_id,
            created_at,
            reposts,
            likes,
        })
    }

    pub(crate) fn likes_count(&self) -> usize {
        self.likes.len()
    }

    pub(crate) fn liked_by(&self, user_id: i64) -> bool {
        self.likes.contains(&user_id)
    }

    pub(crate) fn reposts_count(&self) -> usize {
        self.reposts.len()
    }

    pub(crate) fn reposted_by(&self, user_id: i64) -> bool {
        self.reposts.iter().any(|r| r.reposter_id == user_id)
    }
}

fn validate_positive_i64(field: &'static str, value: i64) -> Result<(), DomainError> {
    if value <= 0 {
        return Err(DomainError::Validation {
            field,
            message: "must be > 0",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{DomainError, Post, Repost};

    #[test]
    fn post_new_builds_post_with_annotations() {
        let now = Utc::now();
        let post = Post::new(
            1,
            10,
            5,
            now,
            vec![Repost {
                reposter_id: 20,
                created_at: now,
            }],
            vec![20, 30],
        )
        .expect("post should be created");

        assert_eq!(post.id, 1);
        assert_eq!(post.author_id, 10);
        assert_eq!(post.reposts_count(), 1);
        assert_eq!(post.likes_count(), 2);
    }

    #[test]
    fn post_new_rejects_non_positive_author_id() {
        let err = Post::new(1, 0, 5, Utc::now(), Vec::new(), Vec::new())
            .expect_err("author_id must be > 0");
        assert_validation_field(err, "author_id");
    }

    #[test]
    fn post_new_rejects_non_positive_reposter_id() {
        let now = Utc::now();
        let err = Post::new(
            1,
            10,
            5,
            now,
            vec![Repost {
                reposter_id: -1,
                created_at: now,
            }],
            Vec::new(),
        )
        .expect_err("reposter_id must be > 0");
        assert_validation_field(err, "reposter_id");
    }

    #[test]
    fn liked_by_and_reposted_by_check_membership() {
        let now = Utc::now();
        let post = Post::new(
            1,
            10,
            5,
            now,
            vec![Repost {
                reposter_id: 20,
                created_at: now,
            }],
            vec![30],
        )
        .expect("post should be created");

        assert!(post.liked_by(30));
        assert!(!post.liked_by(20));
        assert!(post.reposted_by(20));
        assert!(!post.reposted_by(30));
    }

    fn assert_validation_field(err: DomainError, expected_field: &'static str) {
        match err {
            DomainError::Validation { field, .. } => assert_eq!(field, expected_field),
            _ => panic!("expected DomainError::Validation"),
        }
    }
}
