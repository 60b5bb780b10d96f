use std::collections::HashSet;

use chrono::{DateTime, Utc};

use super::cursor::encode_cursor;
use super::post::Post;

pub(crate) const DEFAULT_PAGE_SIZE: usize = 100;
pub(crate) const MAX_PAGE_SIZE: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum EventKind {
    Original,
    Repost,
}

/// A point-in-time occurrence of a post on someone's timeline. Derived,
/// never persisted: one Original per post plus one Repost per annotation.
#[derive(Debug, Clone)]
pub(crate) struct TimelineEvent {
    pub(crate) post: Post,
    pub(crate) effective_at: DateTime<Utc>,
    pub(crate) kind: EventKind,
    /// Present iff `kind` is `Repost`.
    pub(crate) reposter_id: Option<i64>,
}

/// Expands a post into its timeline events. A post with no reposts yields
/// exactly one event. Emission order is arbitrary; ordering belongs to
/// [`paginate`].
pub(crate) fn expand_post(post: &Post) -> impl Iterator<Item = TimelineEvent> + '_ {
    let original = TimelineEvent {
        post: post.clone(),
        effective_at: post.created_at,
        kind: EventKind::Original,
        reposter_id: None,
    };

    std::iter::once(original).chain(post.reposts.iter().map(|repost| TimelineEvent {
        post: post.clone(),
        effective_at: repost.created_at,
        kind: EventKind::Repost,
        reposter_id: Some(repost.reposter_id),
    }))
}

/// The three mutually exclusive view modes of a feed request.
#[derive(Debug, Clone)]
pub(crate) enum FeedView {
    /// Profile page: the target's originals plus the target's reposts of
    /// other users' posts. Reposts *of* the target by others are excluded.
    Profile { user_id: i64 },
    /// Home timeline: events on posts authored by followed users or the
    /// viewer. Filtering is by post author, not reposter: a followed
    /// user's repost of an unfollowed author does not appear.
    Home {
        viewer_id: i64,
        following: HashSet<i64>,
    },
    /// Anonymous browsing: no author predicate.
    Public,
}

impl FeedView {
    pub(crate) fn admits(&self, event: &TimelineEvent) -> bool {
        match self {
            FeedView::Profile { user_id } => match event.kind {
                EventKind::Original => event.post.author_id == *user_id,
                EventKind::Repost => event.reposter_id == Some(*user_id),
            },
            FeedView::Home {
                viewer_id,
                following,
            } => event.post.author_id == *viewer_id || following.contains(&event.post.author_id),
            FeedView::Public => true,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct FeedPage {
    pub(crate) edges: Vec<TimelineEvent>,
    pub(crate) has_next_page: bool,
    pub(crate) end_cursor: Option<String>,
}

/// Filters, sorts and limits the expanded event stream.
///
/// Events pass the view predicate and, when `before` is set, a strict
/// `effective_at < before` check so the boundary element never repeats.
/// Ordering is effective timestamp descending with a deterministic
/// tie-break (post id desc, Original before Repost, reposter id) to keep
/// pagination stable under concurrent writes. `has_next_page` is probed by
/// taking `limit + 1` events and discarding the extra one; an empty result
/// carries no `end_cursor`.
pub(crate) fn paginate(
    events: impl Iterator<Item = TimelineEvent>,
    view: &FeedView,
    before: Option<DateTime<Utc>>,
    limit: usize,
) -> FeedPage {
    let mut edges: Vec<TimelineEvent> = events
        .filter(|event| view.admits(event))
        .filter(|event| before.is_none_or(|boundary| event.effective_at < boundary))
        .collect();

    edges.sort_unstable_by(|a, b| {
        b.effective_at
            .cmp(&a.effective_at)
            .then(b.post.id.cmp(&a.post.id))
            .then(a.kind.cmp(&b.kind))
            .then(a.reposter_id.cmp(&b.reposter_id))
    });

    let has_next_page = edges.len() > limit;
    edges.truncate(limit);

    let end_cursor = edges.last().map(|edge| encode_cursor(edge.effective_at));

    FeedPage {
        edges,
        has_next_page,
        end_cursor,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::{DateTime, Duration, Utc};

    use super::{EventKind, FeedView, expand_post, paginate};
    use crate::domain::cursor::decode_cursor;
    use crate::domain::post::{Post, Repost};

    fn at(offset_secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_micros(1_700_000_000_000_000).expect("base timestamp")
            + Duration::seconds(offset_secs)
    }

    fn post(id: i64, author_id: i64, created: DateTime<Utc>, reposts: Vec<Repost>) -> Post {
        Post::new(id, author_id, id, created, reposts, Vec::new()).expect("post must be valid")
    }

    fn repost(reposter_id: i64, created: DateTime<Utc>) -> Repost {
        Repost {
            reposter_id,
            created_at: created,
        }
    }

    #[test]
    fn expansion_yields_one_event_per_annotation_plus_original() {
        let p = post(
            1,
            10,
            at(0),
            vec![repost(20, at(5)), repost(30, at(7))],
        );

        let events: Vec<_> = expand_post(&p).collect();
        assert_eq!(events.len(), 3);
        assert_eq!(
            events
                .iter()
                .filter(|e| e.kind == EventKind::Original)
                .count(),
            1
        );
    }

    #[test]
    fn expansion_of_unreposted_post_is_a_single_original() {
        let p = post(1, 10, at(0), Vec::new());
        let events: Vec<_> = expand_post(&p).collect();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::Original);
        assert_eq!(events[0].effective_at, p.created_at);
        assert_eq!(events[0].reposter_id, None);
    }

    #[test]
    fn profile_view_keeps_own_originals_and_own_reposts_only() {
        let alice = 10;
        let bob = 20;
        // Alice's post, reposted by Bob; Bob's post, reposted by Alice.
        let alices = post(1, alice, at(0), vec![repost(bob, at(5))]);
        let bobs = post(2, bob, at(1), vec![repost(alice, at(6))]);

        let view = FeedView::Profile { user_id: alice };
        let events: Vec<_> = [&alices, &bobs]
            .into_iter()
            .flat_map(expand_post)
            .filter(|e| view.admits(e))
            .collect();

        assert_eq!(events.len(), 2);
        assert!(events.iter().any(|e| {
            e.kind == EventKind::Original && e.post.id == 1
        }));
        assert!(events.iter().any(|e| {
            e.kind == EventKind::Repost && e.post.id == 2 && e.reposter_id == Some(alice)
        }));
        // Bob's repost of Alice's post is not part of Alice's profile.
        assert!(!events.iter().any(|e| e.reposter_id == Some(bob)));
    }

    #[test]
    fn home_view_admits_by_post_author_membership() {
        let viewer = 1;
        let followed = 2;
        let stranger = 3;
        let from_followed = post(1, followed, at(0), Vec::new());
        let own = post(2, viewer, at(1), Vec::new());
        // A followed user's repost of a stranger's post stays hidden.
        let from_stranger = post(3, stranger, at(2), vec![repost(followed, at(3))]);

        let view = FeedView::Home {
            viewer_id: viewer,
            following: HashSet::from([followed]),
        };
        let admitted: Vec<_> = [&from_followed, &own, &from_stranger]
            .into_iter()
            .flat_map(expand_post)
            .filter(|e| view.admits(e))
            .collect();

        let post_ids: Vec<i64> = admitted.iter().map(|e| e.post.id).collect();
        assert!(post_ids.contains(&1));
        assert!(post_ids.contains(&2));
        assert!(!post_ids.contains(&3));
    }

    #[test]
    fn public_view_admits_everything() {
        let p = post(1, 10, at(0), vec![repost(20, at(5))]);
        let view = FeedView::Public;
        assert_eq!(expand_post(&p).filter(|e| view.admits(e)).count(), 2);
    }

    #[test]
    fn paginate_orders_by_effective_timestamp_descending() {
        let older = post(1, 10, at(0), Vec::new());
        let newer = post(2, 10, at(10), vec![repost(20, at(20))]);

        let page = paginate(
            [&older, &newer].into_iter().flat_map(expand_post),
            &FeedView::Public,
            None,
            10,
        );

        let stamps: Vec<_> = page.edges.iter().map(|e| e.effective_at).collect();
        assert_eq!(stamps, vec![at(20), at(10), at(0)]);
        for pair in page.edges.windows(2) {
            assert!(pair[0].effective_at >= pair[1].effective_at);
        }
    }

    #[test]
    fn paginate_probes_has_next_page_with_one_extra_event() {
        let a = post(1, 10, at(0), Vec::new());
        let b = post(2, 10, at(1), Vec::new());

        let page = paginate(
            [&a, &b].into_iter().flat_map(expand_post),
            &FeedView::Public,
            None,
            1,
        );

        assert_eq!(page.edges.len(), 1);
        assert!(page.has_next_page);
        let end = page.end_cursor.expect("cursor must be present");
        assert_eq!(
            decode_cursor(&end).expect("cursor must decode"),
            page.edges[0].effective_at
        );
    }

    #[test]
    fn paginate_on_empty_stream_returns_empty_page_without_cursor() {
        let page = paginate(std::iter::empty(), &FeedView::Public, None, 5);

        assert!(page.edges.is_empty());
        assert!(!page.has_next_page);
        assert!(page.end_cursor.is_none());
    }

    #[test]
    fn paginate_excludes_the_cursor_boundary_element() {
        let a = post(1, 10, at(0), Vec::new());
        let b = post(2, 10, at(1), Vec::new());
        let c = post(3, 10, at(2), Vec::new());

        let page = paginate(
            [&a, &b, &c].into_iter().flat_map(expand_post),
            &FeedView::Public,
            Some(at(1)),
            10,
        );

        // Strict less-than: the post at the boundary timestamp is skipped.
        assert_eq!(page.edges.len(), 1);
        assert_eq!(page.edges[0].post.id, 1);
        for edge in &page.edges {
            assert!(edge.effective_at < at(1));
        }
    }

    #[test]
    fn paginate_breaks_timestamp_ties_deterministically() {
        let a = post(1, 10, at(0), Vec::new());
        let b = post(2, 10, at(0), Vec::new());

        let first = paginate(
            [&a, &b].into_iter().flat_map(expand_post),
            &FeedView::Public,
            None,
            10,
        );
        let second = paginate(
            [&b, &a].into_iter().flat_map(expand_post),
            &FeedView::Public,
            None,
            10,
        );

        let ids = |page: &super::FeedPage| -> Vec<i64> {
            page.edges.iter().map(|e| e.post.id).collect()
        };
        assert_eq!(ids(&first), vec![2, 1]);
        assert_eq!(ids(&first), ids(&second));
    }
}
