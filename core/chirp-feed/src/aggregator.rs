//! Feeds assembled from the follow graph.
//!
//! A feed is built in three steps: collect the author set (the viewer plus
//! everyone they follow), fetch those authors' records, then order newest
//! first and cut out the requested page. Nothing here touches the search
//! index.

use crate::error::FeedResult;
use chirp_store::{ContentStore, GraphStore};
use chirp_types::{ContentRecord, Page, PageRequest, UserId};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Builds timelines and profile listings and edits the follow graph.
#[derive(Clone)]
pub struct FeedAggregator {
    content: Arc<dyn ContentStore>,
    graph: Arc<dyn GraphStore>,
}

impl FeedAggregator {
    pub fn new(content: Arc<dyn ContentStore>, graph: Arc<dyn GraphStore>) -> Self {
        Self { content, graph }
    }

    /// Content by `viewer` and everyone `viewer` follows, newest first.
    ///
    /// Records sharing a timestamp are ordered by descending id so paging
    /// is stable.
    pub fn followed_content(
        &self,
        viewer: UserId,
        page: u32,
        page_size: u32,
    ) -> FeedResult<Page<ContentRecord>> {
        let request = PageRequest::new(page, page_size)?;

        let mut authors = self.graph.followees_of(viewer)?;
        authors.insert(viewer);

        let records = self.content.list_by_authors(&authors)?;
        let feed = request.slice(newest_first(records));
        debug!(
            viewer = %viewer,
            authors = authors.len(),
            page = page,
            total = feed.total,
            "Assembled feed"
        );
        Ok(feed)
    }

    /// Content by `user` alone, newest first.
    ///
    /// An unknown user has no content and yields an empty page.
    pub fn own_content(
        &self,
        user: UserId,
        page: u32,
        page_size: u32,
    ) -> FeedResult<Page<ContentRecord>> {
        let request = PageRequest::new(page, page_size)?;
        let records = self.content.list_by_authors(&BTreeSet::from([user]))?;
        Ok(request.slice(newest_first(records)))
    }

    /// Makes `follower` follow `followee`. Following twice is a no-op.
    pub fn follow(&self, follower: UserId, followee: UserId) -> FeedResult<()> {
        if self.graph.add_edge(follower, followee)? {
            info!(follower = %follower, followee = %followee, "Followed");
        }
        Ok(())
    }

    /// Removes the edge from `follower` to `followee`, if present.
    pub fn unfollow(&self, follower: UserId, followee: UserId) -> FeedResult<()> {
        if self.graph.remove_edge(follower, followee)? {
            info!(follower = %follower, followee = %followee, "Unfollowed");
        }
        Ok(())
    }

    pub fn is_following(&self, follower: UserId, followee: UserId) -> FeedResult<bool> {
        Ok(self.graph.has_edge(follower, followee)?)
    }

    /// Users `user` follows.
    pub fn followees(&self, user: UserId) -> FeedResult<BTreeSet<UserId>> {
        Ok(self.graph.followees_of(user)?)
    }

    /// Users following `user`.
    pub fn followers(&self, user: UserId) -> FeedResult<BTreeSet<UserId>> {
        Ok(self.graph.followers_of(user)?)
    }

    pub fn followee_count(&self, user: UserId) -> FeedResult<usize> {
        Ok(self.followees(user)?.len())
    }

    pub fn follower_count(&self, user: UserId) -> FeedResult<usize> {
        Ok(self.followers(user)?.len())
    }
}

fn newest_first(mut records: Vec<ContentRecord>) -> Vec<ContentRecord> {
    records.sort_unstable_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    records
}
