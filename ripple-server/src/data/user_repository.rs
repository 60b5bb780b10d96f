use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::user::User;

#[async_trait]
pub(crate) trait UserRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;
    /// Batched lookup for page assembly; order of the result is arbitrary
    /// and unknown ids are silently absent.
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<User>, DomainError>;
    /// Ids the user follows. The follow graph is mutated elsewhere; this
    /// engine only reads it.
    async fn following_ids(&self, user_id: i64) -> Result<Vec<i64>, DomainError>;
}
