use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::data::file_repository::FileRepository;
use crate::domain::error::DomainError;
use crate::domain::file::StoredFile;

#[derive(Debug, Clone)]
pub(crate) struct PostgresFileRepository {
    pool: PgPool,
}

impl PostgresFileRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct FileRow {
    id: i64,
    path: String,
    mime_type: String,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl FileRepository for PostgresFileRepository {
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<StoredFile>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<FileRow> = sqlx::query_as(
            r#"
            SELECT id, path, mime_type, created_at
            FROM files
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows
            .into_iter()
            .map(|row| StoredFile {
                id: row.id,
                path: row.path,
                mime_type: row.mime_type,
                created_at: row.created_at,
            })
            .collect())
    }

    async fn exists(&self, id: i64) -> Result<bool, DomainError> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS(SELECT 1 FROM files WHERE id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }
}

fn map_db_error(err: sqlx::Error) -> DomainError {
    DomainError::Storage(err.to_string())
}
