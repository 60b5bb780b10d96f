use std::collections::{HashMap, HashSet};

use crate::data::file_repository::FileRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::file::StoredFile;
use crate::domain::timeline::{FeedPage, TimelineEvent};
use crate::domain::user::User;

/// One fully resolved feed edge: the timeline event plus everything the
/// calling layer needs to render it.
#[derive(Debug, Clone)]
pub(crate) struct FeedItem {
    pub(crate) event: TimelineEvent,
    pub(crate) author: User,
    pub(crate) file: Option<StoredFile>,
    pub(crate) reposted_by: Option<User>,
    pub(crate) liked_by_viewer: bool,
    pub(crate) reposted_by_viewer: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct AssembledPage {
    pub(crate) items: Vec<FeedItem>,
    pub(crate) has_next_page: bool,
    pub(crate) end_cursor: Option<String>,
}

/// Resolves authors, reposters and files for a page with one repository
/// fetch per entity type. The lookup maps are scoped to this call, which
/// is exactly one request; repeated ids within the page hit the map.
pub(crate) async fn assemble_page<U, F>(
    users: &U,
    files: &F,
    page: FeedPage,
    viewer_id: Option<i64>,
) -> Result<AssembledPage, DomainError>
where
    U: UserRepository + ?Sized,
    F: FileRepository + ?Sized,
{
    let mut user_ids: HashSet<i64> = HashSet::new();
    let mut file_ids: HashSet<i64> = HashSet::new();
    for edge in &page.edges {
        user_ids.insert(edge.post.author_id);
        if let Some(reposter_id) = edge.reposter_id {
            user_ids.insert(reposter_id);
        }
        file_ids.insert(edge.post.file_id);
    }

    let user_ids: Vec<i64> = user_ids.into_iter().collect();
    let file_ids: Vec<i64> = file_ids.into_iter().collect();

    let users_by_id: HashMap<i64, User> = users
        .find_by_ids(&user_ids)
        .await?
        .into_iter()
        .map(|user| (user.id, user))
        .collect();
    let files_by_id: HashMap<i64, StoredFile> = files
        .find_by_ids(&file_ids)
        .await?
        .into_iter()
        .map(|file| (file.id, file))
        .collect();

    let items = page
        .edges
        .into_iter()
        .map(|event| resolve_item(event, viewer_id, &users_by_id, &files_by_id))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(AssembledPage {
        items,
        has_next_page: page.has_next_page,
        end_cursor: page.end_cursor,
    })
}

fn resolve_item(
    event: TimelineEvent,
    viewer_id: Option<i64>,
    users_by_id: &HashMap<i64, User>,
    files_by_id: &HashMap<i64, StoredFile>,
) -> Result<FeedItem, DomainError> {
    // Posts reference their author by foreign key; a missing row here is
    // storage corruption, not a lookup miss.
    let author = users_by_id
        .get(&event.post.author_id)
        .cloned()
        .ok_or_else(|| {
            DomainError::Storage(format!("author {} missing for post {}", event.post.author_id, event.post.id))
        })?;

    let reposted_by = match event.reposter_id {
        Some(reposter_id) => Some(users_by_id.get(&reposter_id).cloned().ok_or_else(|| {
            DomainError::Storage(format!("reposter {reposter_id} missing for post {}", event.post.id))
        })?),
        None => None,
    };

    let file = files_by_id.get(&event.post.file_id).cloned();
    let liked_by_viewer = viewer_id.is_some_and(|viewer| event.post.liked_by(viewer));
    let reposted_by_viewer = viewer_id.is_some_and(|viewer| event.post.reposted_by(viewer));

    Ok(FeedItem {
        event,
        author,
        file,
        reposted_by,
        liked_by_viewer,
        reposted_by_viewer,
    })
}
