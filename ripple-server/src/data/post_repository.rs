use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::post::Post;

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) author_id: i64,
    pub(crate) file_id: i64,
}

/// Which candidate posts the feed core needs loaded before expansion.
/// The core does its own event-level filtering; this only bounds the scan.
#[derive(Debug, Clone)]
pub(crate) enum CandidateScope {
    /// Every post (anonymous browsing).
    All,
    /// Posts authored by any of the given users (home timeline).
    Authors(Vec<i64>),
    /// Posts authored by the user or carrying one of their repost
    /// annotations (profile page).
    AuthoredOrRepostedBy(i64),
}

#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError>;
    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError>;
    async fn delete_post(&self, id: i64) -> Result<bool, DomainError>;
    async fn candidate_posts(&self, scope: &CandidateScope) -> Result<Vec<Post>, DomainError>;

    /// Atomic set-add. Returns `false` when the post does not exist;
    /// re-liking an already liked post is a no-op that returns `true`.
    async fn add_like(&self, post_id: i64, user_id: i64) -> Result<bool, DomainError>;
    /// Atomic set-remove. Returns `false` only when the post is absent.
    async fn remove_like(&self, post_id: i64, user_id: i64) -> Result<bool, DomainError>;

    /// Appends a repost annotation and returns the updated post, or `None`
    /// when the post does not exist.
    async fn add_repost(&self, post_id: i64, reposter_id: i64)
    -> Result<Option<Post>, DomainError>;
    /// Removes the reposter's annotation. `false` only when the post is
    /// absent.
    async fn remove_repost(&self, post_id: i64, reposter_id: i64) -> Result<bool, DomainError>;
}
