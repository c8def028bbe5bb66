//! Paginated item resolver
//!
//! Separates "which items exist, in what order" (a collection snapshot) from
//! "what is in each item" (one request per id). Pages are resolved with a
//! bounded, order-preserving fan-out; the first failure rejects the whole
//! page and drops the requests still in flight.

use crate::prelude::*;
use futures::stream::{self, StreamExt, TryStreamExt};
use hnpager_core::item::{decode_ids, decode_item};
use hnpager_core::{
    CollectionSnapshot, CollectionType, CommentNode, Cursor, Item, ItemId, Page, ResolverConfig,
};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Resolver {
    client: reqwest::Client,
    config: Arc<ResolverConfig>,
}

impl Resolver {
    pub fn new(config: ResolverConfig) -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Client(e.to_string()))?;

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    async fn get_body(&self, url: &str, context: &str) -> FetchResult<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::transient(context, e))?;

        if !response.status().is_success() {
            return Err(Error::transient(
                context,
                format!("HTTP {}", response.status()),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::transient(context, e))?;

        Ok(body.to_vec())
    }

    /// Fetch the ranked ids of a collection and capture them as a snapshot
    ///
    /// Every call hits the API again; this is how a refresh picks up a new ranking.
    pub async fn open_collection(
        &self,
        collection: CollectionType,
    ) -> FetchResult<CollectionSnapshot> {
        let url = self.config.collection_url(collection);
        let context = format!("{collection} stories");

        let body = self.get_body(&url, &context).await?;
        let ids = decode_ids(collection.endpoint(), &body)?;

        info!("Opened {} collection with {} items", collection, ids.len());
        Ok(CollectionSnapshot::from_collection(collection, ids))
    }

    /// Fetch a single item
    pub async fn resolve_item(&self, id: ItemId) -> FetchResult<Item> {
        let url = self.config.item_url(id);
        let body = self.get_body(&url, &format!("item {id}")).await?;
        Ok(decode_item(id, &body)?)
    }

    /// Resolve ids concurrently, returning items in the order of `ids`
    pub async fn resolve_items(&self, ids: &[ItemId]) -> FetchResult<Vec<Item>> {
        stream::iter(ids.iter().map(|id| self.resolve_item(*id)))
            .buffered(self.config.max_concurrency)
            .try_collect()
            .await
    }

    /// Resolve the page `[cursor, cursor + page_size)` of a snapshot
    ///
    /// A cursor at or past the end of the snapshot yields an empty page without
    /// touching the network.
    pub async fn next_page(
        &self,
        snapshot: &CollectionSnapshot,
        cursor: Cursor,
        page_size: usize,
    ) -> FetchResult<Page<Item>> {
        let ids = snapshot.slice(cursor, page_size)?;

        if ids.is_empty() {
            debug!(
                "No items left in {} at cursor {cursor}",
                snapshot.source()
            );
            return Ok(Page::empty(cursor));
        }

        debug!(
            "Resolving {} items of {} at cursor {cursor}",
            ids.len(),
            snapshot.source()
        );

        let items = self.resolve_items(ids).await.inspect_err(|e| {
            warn!(
                "Page of {} at cursor {cursor} failed: {e}",
                snapshot.source()
            )
        })?;

        Ok(Page::new(cursor, items))
    }

    /// Resolve an item and its replies down to `max_depth` levels
    ///
    /// Replies are fetched one level at a time, so the whole thread never has
    /// more than `max_concurrency` item requests in flight.
    pub async fn resolve_thread(&self, id: ItemId, max_depth: usize) -> FetchResult<CommentNode> {
        let root = self.resolve_item(id).await?;
        let mut levels: Vec<Vec<Item>> = Vec::new();
        let mut ids: Vec<ItemId> = root.kid_ids().to_vec();

        while levels.len() < max_depth && !ids.is_empty() {
            debug!(
                "Resolving {} replies at depth {} of thread {id}",
                ids.len(),
                levels.len() + 1
            );
            let level = self.resolve_items(&ids).await?;
            ids = level
                .iter()
                .flat_map(|item| item.kid_ids().iter().copied())
                .collect();
            levels.push(level);
        }

        Ok(CommentNode::from_levels(root, levels))
    }
}
