use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::file::StoredFile;

#[async_trait]
pub(crate) trait FileRepository: Send + Sync {
    /// Batched lookup for page assembly.
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<StoredFile>, DomainError>;
    async fn exists(&self, id: i64) -> Result<bool, DomainError>;
}
