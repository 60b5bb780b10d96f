use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::assembly::{AssembledPage, FeedItem};
use crate::application::feed_service::ListFeedRequest;
use crate::domain::error::DomainError;
use crate::domain::file::StoredFile;
use crate::domain::post::Post;
use crate::domain::timeline::EventKind;
use crate::domain::user::User;
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::middleware::auth::{AuthenticatedUser, MaybeAuthenticatedUser};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct FeedQuery {
    /// Opaque cursor from a previous page's `end_cursor`.
    pub(crate) cursor: Option<String>,
    #[validate(range(min = 1, max = 500))]
    pub(crate) limit: Option<u32>,
    /// Switches to the profile view of this user.
    pub(crate) username: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreatePostDto {
    #[validate(range(min = 1))]
    pub(crate) file_id: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct UserDto {
    pub(crate) id: i64,
    pub(crate) username: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct FileDto {
    pub(crate) id: i64,
    pub(crate) path: String,
    pub(crate) mime_type: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub(crate) enum EventKindDto {
    Original,
    Repost,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct FeedEdgeDto {
    pub(crate) post_id: i64,
    pub(crate) kind: EventKindDto,
    /// Timestamp the edge is ordered by: post creation for originals,
    /// repost time for reposts.
    pub(crate) effective_at: DateTime<Utc>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) author: UserDto,
    pub(crate) file: Option<FileDto>,
    pub(crate) reposted_by: Option<UserDto>,
    pub(crate) likes_count: u64,
    pub(crate) is_liked: bool,
    pub(crate) reposts_count: u64,
    pub(crate) is_reposted: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PageInfoDto {
    pub(crate) has_next_page: bool,
    pub(crate) end_cursor: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct FeedPageDto {
    pub(crate) edges: Vec<FeedEdgeDto>,
    pub(crate) page_info: PageInfoDto,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDto {
    pub(crate) id: i64,
    pub(crate) author_id: i64,
    pub(crate) file_id: i64,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) likes_count: u64,
    pub(crate) reposts_count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct DeletedDto {
    pub(crate) deleted: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct OkDto {
    pub(crate) ok: bool,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

impl From<StoredFile> for FileDto {
    fn from(file: StoredFile) -> Self {
        Self {
            id: file.id,
            path: file.path,
            mime_type: file.mime_type,
        }
    }
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            author_id: post.author_id,
            file_id: post.file_id,
            created_at: post.created_at,
            likes_count: post.likes_count() as u64,
            reposts_count: post.reposts_count() as u64,
        }
    }
}

impl From<FeedItem> for FeedEdgeDto {
    fn from(item: FeedItem) -> Self {
        Self {
            post_id: item.event.post.id,
            kind: match item.event.kind {
                EventKind::Original => EventKindDto::Original,
                EventKind::Repost => EventKindDto::Repost,
            },
            effective_at: item.event.effective_at,
            created_at: item.event.post.created_at,
            author: item.author.into(),
            file: item.file.map(FileDto::from),
            reposted_by: item.reposted_by.map(UserDto::from),
            likes_count: item.event.post.likes_count() as u64,
            is_liked: item.liked_by_viewer,
            reposts_count: item.event.post.reposts_count() as u64,
            is_reposted: item.reposted_by_viewer,
        }
    }
}

impl From<AssembledPage> for FeedPageDto {
    fn from(page: AssembledPage) -> Self {
        Self {
            edges: page.items.into_iter().map(FeedEdgeDto::from).collect(),
            page_info: PageInfoDto {
                has_next_page: page.has_next_page,
                end_cursor: page.end_cursor,
            },
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/feed",
    tag = "feed",
    params(
        ("cursor" = Option<String>, Query, description = "Opaque pagination cursor"),
        ("limit" = Option<u32>, Query, description = "Edges per page (1..=500, default 100)"),
        ("username" = Option<String>, Query, description = "Profile view for this user")
    ),
    responses(
        (status = 200, description = "Feed page", body = FeedPageDto),
        (status = 400, description = "Invalid cursor or query"),
        (status = 404, description = "Unknown username"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_feed(
    State(state): State<AppState>,
    MaybeAuthenticatedUser(viewer): MaybeAuthenticatedUser,
    Query(query): Query<FeedQuery>,
) -> AppResult<(StatusCode, Json<FeedPageDto>)> {
    query.validate()?;

    let page = state
        .feed_service
        .list_feed(ListFeedRequest {
            cursor: query.cursor,
            limit: query.limit,
            username: query.username,
            viewer_id: viewer.map(|user| user.user_id),
        })
        .await?;

    Ok((StatusCode::OK, Json(FeedPageDto::from(page))))
}

#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    tag = "posts",
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post found", body = PostDto),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    // The service treats a miss as "absent"; only the transport turns it
    // into a 404.
    let post = state
        .feed_service
        .get_post(id)
        .await?
        .ok_or(DomainError::PostNotFound(id))?;

    Ok((StatusCode::OK, Json(PostDto::from(post))))
}

#[utoipa::path(
    post,
    path = "/api/posts",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CreatePostDto,
    responses(
        (status = 201, description = "Post created", body = PostDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(dto): Json<CreatePostDto>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    dto.validate()?;

    let post = state
        .feed_service
        .create_post(Some(auth.user_id), dto.file_id)
        .await?;
    Ok((StatusCode::CREATED, Json(PostDto::from(post))))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Delete outcome", body = DeletedDto),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<(StatusCode, Json<DeletedDto>)> {
    let deleted = state
        .feed_service
        .delete_post(Some(auth.user_id), id)
        .await?;
    Ok((StatusCode::OK, Json(DeletedDto { deleted })))
}

#[utoipa::path(
    post,
    path = "/api/posts/{id}/like",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Like outcome", body = OkDto),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn like_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<(StatusCode, Json<OkDto>)> {
    let ok = state.feed_service.like(Some(auth.user_id), id).await?;
    Ok((StatusCode::OK, Json(OkDto { ok })))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{id}/like",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Unlike outcome", body = OkDto),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn unlike_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<(StatusCode, Json<OkDto>)> {
    let ok = state.feed_service.unlike(Some(auth.user_id), id).await?;
    Ok((StatusCode::OK, Json(OkDto { ok })))
}

#[utoipa::path(
    post,
    path = "/api/posts/{id}/repost",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Repost outcome", body = OkDto),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn repost_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<(StatusCode, Json<OkDto>)> {
    let ok = state.feed_service.repost(Some(auth.user_id), id).await?;
    Ok((StatusCode::OK, Json(OkDto { ok })))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{id}/repost",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Unrepost outcome", body = OkDto),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn unrepost_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<(StatusCode, Json<OkDto>)> {
    let ok = state.feed_service.unrepost(Some(auth.user_id), id).await?;
    Ok((StatusCode::OK, Json(OkDto { ok })))
}
