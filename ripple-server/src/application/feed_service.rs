use std::collections::HashSet;
use std::sync::Arc;

use tracing::info;

use crate::application::assembly::{AssembledPage, assemble_page};
use crate::data::file_repository::FileRepository;
use crate::data::post_repository::{CandidateScope, NewPost, PostRepository};
use crate::data::user_repository::UserRepository;
use crate::domain::cursor::decode_cursor;
use crate::domain::error::DomainError;
use crate::domain::post::Post;
use crate::domain::timeline::{
    DEFAULT_PAGE_SIZE, FeedView, MAX_PAGE_SIZE, expand_post, paginate,
};
use crate::infrastructure::notifier::{PostCreated, PostNotifier};

#[derive(Debug, Clone, Default)]
pub(crate) struct ListFeedRequest {
    pub(crate) cursor: Option<String>,
    pub(crate) limit: Option<u32>,
    /// Switches the request to the profile view when present.
    pub(crate) username: Option<String>,
    pub(crate) viewer_id: Option<i64>,
}

pub(crate) struct FeedService<P, U, F> {
    posts: P,
    users: U,
    files: F,
    notifier: Arc<dyn PostNotifier>,
}

impl<P, U, F> FeedService<P, U, F>
where
    P: PostRepository,
    U: UserRepository,
    F: FileRepository,
{
    pub(crate) fn new(posts: P, users: U, files: F, notifier: Arc<dyn PostNotifier>) -> Self {
        Self {
            posts,
            users,
            files,
            notifier,
        }
    }

    /// Produces one page of the merged original+repost timeline:
    /// candidate load, event expansion, view/cursor filtering, sort and
    /// limit, then batched assembly.
    pub(crate) async fn list_feed(
        &self,
        req: ListFeedRequest,
    ) -> Result<AssembledPage, DomainError> {
        let before = req.cursor.as_deref().map(decode_cursor).transpose()?;
        let limit = req
            .limit
            .map(|value| value as usize)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);

        let view = self.resolve_view(&req).await?;
        let scope = candidate_scope(&view);

        let candidates = self.posts.candidate_posts(&scope).await?;
        let page = paginate(
            candidates.iter().flat_map(expand_post),
            &view,
            before,
            limit,
        );

        assemble_page(&self.users, &self.files, page, req.viewer_id).await
    }

    pub(crate) async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        self.posts.get_post(id).await
    }

    pub(crate) async fn create_post(
        &self,
        viewer_id: Option<i64>,
        file_id: i64,
    ) -> Result<Post, DomainError> {
        let viewer = require_viewer(viewer_id)?;
        if !self.files.exists(file_id).await? {
            return Err(DomainError::Validation {
                field: "file_id",
                message: "unknown file",
            });
        }

        let post = self
            .posts
            .create_post(NewPost {
                author_id: viewer,
                file_id,
            })
            .await?;
        info!(post_id = post.id, author_id = viewer, "post created");

        self.notifier
            .post_created(PostCreated {
                post_id: post.id,
                author_id: post.author_id,
                reposter_id: None,
            })
            .await;

        Ok(post)
    }

    /// Owner-only delete. An absent post is a `false` no-op rather than an
    /// error; a present post owned by someone else is `Forbidden`.
    pub(crate) async fn delete_post(
        &self,
        viewer_id: Option<i64>,
        post_id: i64,
    ) -> Result<bool, DomainError> {
        let viewer = require_viewer(viewer_id)?;

        let Some(post) = self.posts.get_post(post_id).await? else {
            return Ok(false);
        };
        if post.author_id != viewer {
            return Err(DomainError::Forbidden);
        }

        self.posts.delete_post(post_id).await
    }

    pub(crate) async fn like(
        &self,
        viewer_id: Option<i64>,
        post_id: i64,
    ) -> Result<bool, DomainError> {
        let viewer = require_viewer(viewer_id)?;
        self.posts.add_like(post_id, viewer).await
    }

    pub(crate) async fn unlike(
        &self,
        viewer_id: Option<i64>,
        post_id: i64,
    ) -> Result<bool, DomainError> {
        let viewer = require_viewer(viewer_id)?;
        self.posts.remove_like(post_id, viewer).await
    }

    pub(crate) async fn repost(
        &self,
        viewer_id: Option<i64>,
        post_id: i64,
    ) -> Result<bool, DomainError> {
        let viewer = require_viewer(viewer_id)?;

        let Some(post) = self.posts.add_repost(post_id, viewer).await? else {
            return Ok(false);
        };
        info!(post_id, reposter_id = viewer, "post reposted");

        // A repost surfaces the post on new timelines, so it announces the
        // same way a fresh post does.
        self.notifier
            .post_created(PostCreated {
                post_id: post.id,
                author_id: post.author_id,
                reposter_id: Some(viewer),
            })
            .await;

        Ok(true)
    }

    pub(crate) async fn unrepost(
        &self,
        viewer_id: Option<i64>,
        post_id: i64,
    ) -> Result<bool, DomainError> {
        let viewer = require_viewer(viewer_id)?;
        self.posts.remove_repost(post_id, viewer).await
    }

    async fn resolve_view(&self, req: &ListFeedRequest) -> Result<FeedView, DomainError> {
        if let Some(username) = &req.username {
            let user = self
                .users
                .find_by_username(username)
                .await?
                .ok_or_else(|| DomainError::UserNotFound(username.clone()))?;
            return Ok(FeedView::Profile { user_id: user.id });
        }

        match req.viewer_id {
            Some(viewer_id) => {
                let following: HashSet<i64> =
                    self.users.following_ids(viewer_id).await?.into_iter().collect();
                Ok(FeedView::Home {
                    viewer_id,
                    following,
                })
            }
            None => Ok(FeedView::Public),
        }
    }
}

/// First guard of every mutation: fail before touching storage when the
/// caller carries no identity.
fn require_viewer(viewer_id: Option<i64>) -> Result<i64, DomainError> {
    viewer_id.ok_or(DomainError::Unauthenticated)
}

fn candidate_scope(view: &FeedView) -> CandidateScope {
    match view {
        FeedView::Profile { user_id } => CandidateScope::AuthoredOrRepostedBy(*user_id),
        FeedView::Home {
            viewer_id,
            following,
        } => {
            let mut authors: Vec<i64> = following.iter().copied().collect();
            authors.push(*viewer_id);
            CandidateScope::Authors(authors)
        }
        FeedView::Public => CandidateScope::All,
    }
}
