use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::data::post_repository::{CandidateScope, NewPost, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::{Post, Repost};

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Loads the repost annotations and liker sets for the given rows and
    /// stitches them into domain posts.
    async fn hydrate(&self, rows: Vec<PostRow>) -> Result<Vec<Post>, DomainError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();

        let repost_rows: Vec<RepostRow> = sqlx::query_as(
            r#"
            SELECT post_id, reposter_id, created_at
            FROM post_reposts
            WHERE post_id = ANY($1)
            ORDER BY created_at
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        let like_rows: Vec<LikeRow> = sqlx::query_as(
            r#"
            SELECT post_id, user_id
            FROM post_likes
            WHERE post_id = ANY($1)
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        let mut reposts: HashMap<i64, Vec<Repost>> = HashMap::new();
        for row in repost_rows {
            reposts.entry(row.post_id).or_default().push(Repost {
                reposter_id: row.reposter_id,
                created_at: row.created_at,
            });
        }

        let mut likes: HashMap<i64, Vec<i64>> = HashMap::new();
        for row in like_rows {
            likes.entry(row.post_id).or_default().push(row.user_id);
        }

        rows.into_iter()
            .map(|row| {
                let post_reposts = reposts.remove(&row.id).unwrap_or_default();
                let post_likes = likes.remove(&row.id).unwrap_or_default();
                Post::new(
                    row.id,
                    row.author_id,
                    row.file_id,
                    row.created_at,
                    post_reposts,
                    post_likes,
                )
                .map_err(|err| DomainError::Storage(err.to_string()))
            })
            .collect()
    }

    async fn post_exists(&self, id: i64) -> Result<bool, DomainError> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS(SELECT 1 FROM posts WHERE id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PostRow {
    id: i64,
    author_id: i64,
    file_id: i64,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct RepostRow {
    post_id: i64,
    reposter_id: i64,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct LikeRow {
    post_id: i64,
    user_id: i64,
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let row: PostRow = sqlx::query_as(
            r#"
            INSERT INTO posts (author_id, file_id)
            VALUES ($1, $2)
            RETURNING id, author_id, file_id, created_at
            "#,
        )
        .bind(input.author_id)
        .bind(input.file_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Post::new(
            row.id,
            row.author_id,
            row.file_id,
            row.created_at,
            Vec::new(),
            Vec::new(),
        )
        .map_err(|err| DomainError::Storage(err.to_string()))
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let row: Option<PostRow> = sqlx::query_as(
            r#"
            SELECT id, author_id, file_id, created_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(self.hydrate(vec![row]).await?.pop())
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            DELETE FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn candidate_posts(&self, scope: &CandidateScope) -> Result<Vec<Post>, DomainError> {
        let rows: Vec<PostRow> = match scope {
            CandidateScope::All => {
                sqlx::query_as(
                    r#"
                    SELECT id, author_id, file_id, created_at
                    FROM posts
                    "#,
                )
                .fetch_all(&self.pool)
                .await
            }
            CandidateScope::Authors(author_ids) => {
                sqlx::query_as(
                    r#"
                    SELECT id, author_id, file_id, created_at
                    FROM posts
                    WHERE author_id = ANY($1)
                    "#,
                )
                .bind(author_ids)
                .fetch_all(&self.pool)
                .await
            }
            CandidateScope::AuthoredOrRepostedBy(user_id) => {
                sqlx::query_as(
                    r#"
                    SELECT id, author_id, file_id, created_at
                    FROM posts
                    WHERE author_id = $1
                       OR id IN (SELECT post_id FROM post_reposts WHERE reposter_id = $1)
                    "#,
                )
                .bind(user_id)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(map_db_error)?;

        self.hydrate(rows).await
    }

    async fn add_like(&self, post_id: i64, user_id: i64) -> Result<bool, DomainError> {
        // Single-statement set-add; ON CONFLICT makes re-liking a no-op.
        let result = sqlx::query(
            r#"
            INSERT INTO post_likes (post_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(true),
            Err(err) if is_foreign_key_violation(&err) => Ok(false),
            Err(err) => Err(map_db_error(err)),
        }
    }

    async fn remove_like(&self, post_id: i64, user_id: i64) -> Result<bool, DomainError> {
        if !self.post_exists(post_id).await? {
            return Ok(false);
        }

        sqlx::query(
            r#"
            DELETE FROM post_likes
            WHERE post_id = $1 AND user_id = $2
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(true)
    }

    async fn add_repost(
        &self,
        post_id: i64,
        reposter_id: i64,
    ) -> Result<Option<Post>, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO post_reposts (post_id, reposter_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(post_id)
        .bind(reposter_id)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => self.get_post(post_id).await,
            Err(err) if is_foreign_key_violation(&err) => Ok(None),
            Err(err) => Err(map_db_error(err)),
        }
    }

    async fn remove_repost(&self, post_id: i64, reposter_id: i64) -> Result<bool, DomainError> {
        if !self.post_exists(post_id).await? {
            return Ok(false);
        }

        sqlx::query(
            r#"
            DELETE FROM post_reposts
            WHERE post_id = $1 AND reposter_id = $2
            "#,
        )
        .bind(post_id)
        .bind(reposter_id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(true)
    }
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        return db_err.code().as_deref() == Some("23503");
    }
    false
}

fn map_db_error(err: sqlx::Error) -> DomainError {
    DomainError::Storage(err.to_string())
}
