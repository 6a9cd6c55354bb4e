//! The assembled application core.

use crate::aggregator::FeedAggregator;
use crate::config::ChirpConfig;
use crate::error::FeedResult;
use crate::publisher::Publisher;
use crate::search::SearchService;
use chirp_index::{IndexRegistry, SearchIndex};
use chirp_store::{ContentStore, GraphStore};
use chirp_types::{ContentId, ContentRecord, Page, UserId};
use std::sync::Arc;
use tracing::info;

/// Feeds, search and publishing over one store and one index, paged with
/// the configured page size.
pub struct Chirp<S> {
    config: ChirpConfig,
    store: Arc<S>,
    index: Arc<SearchIndex>,
    feed: FeedAggregator,
    search: SearchService,
    publisher: Publisher,
}

impl<S> Chirp<S>
where
    S: ContentStore + GraphStore + 'static,
{
    /// Opens (or creates) the index at `config.index_dir` and wires it to
    /// `store`.
    pub fn open(config: ChirpConfig, store: Arc<S>) -> FeedResult<Self> {
        config.validate()?;
        let index = Arc::new(SearchIndex::ensure(&config.index_dir)?);
        Ok(Self::assemble(config, store, index))
    }

    /// Like [`open`](Self::open) but takes the index handle from `registry`,
    /// so instances sharing an index directory share its writer.
    pub fn open_in(registry: &IndexRegistry, config: ChirpConfig, store: Arc<S>) -> FeedResult<Self> {
        config.validate()?;
        let index = registry.ensure_index(&config.index_dir)?;
        Ok(Self::assemble(config, store, index))
    }

    fn assemble(config: ChirpConfig, store: Arc<S>, index: Arc<SearchIndex>) -> Self {
        let content: Arc<dyn ContentStore> = store.clone();
        let graph: Arc<dyn GraphStore> = store.clone();
        info!(
            index_dir = %index.location().display(),
            posts_per_page = config.posts_per_page,
            "Chirp core ready"
        );
        Self {
            feed: FeedAggregator::new(Arc::clone(&content), graph),
            search: SearchService::new(Arc::clone(&index), Arc::clone(&content)),
            publisher: Publisher::new(Arc::clone(&index), content),
            config,
            store,
            index,
        }
    }

    // ── Reads ────────────────────────────────────────────────────

    /// `viewer`'s timeline: their own content and that of everyone they follow.
    pub fn timeline(&self, viewer: UserId, page: u32) -> FeedResult<Page<ContentRecord>> {
        self.feed
            .followed_content(viewer, page, self.config.posts_per_page)
    }

    /// Content posted by `user`.
    pub fn profile(&self, user: UserId, page: u32) -> FeedResult<Page<ContentRecord>> {
        self.feed.own_content(user, page, self.config.posts_per_page)
    }

    pub fn search(&self, text: &str, page: u32) -> FeedResult<Page<ContentRecord>> {
        self.search.search(text, page, self.config.posts_per_page)
    }

    // ── Writes ───────────────────────────────────────────────────

    pub fn publish(&self, author: UserId, body: &str) -> FeedResult<ContentRecord> {
        self.publisher.publish(author, body)
    }

    pub fn retract(&self, id: ContentId) -> FeedResult<ContentRecord> {
        self.publisher.retract(id)
    }

    pub fn follow(&self, follower: UserId, followee: UserId) -> FeedResult<()> {
        self.feed.follow(follower, followee)
    }

    pub fn unfollow(&self, follower: UserId, followee: UserId) -> FeedResult<()> {
        self.feed.unfollow(follower, followee)
    }

    // ── Accessors ────────────────────────────────────────────────

    pub fn config(&self) -> &ChirpConfig {
        &self.config
    }

    /// The backing store, for user management and direct reads.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn index(&self) -> &Arc<SearchIndex> {
        &self.index
    }

    pub fn feed(&self) -> &FeedAggregator {
        &self.feed
    }
}
