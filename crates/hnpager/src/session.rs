//! One consumer's walk through a collection
//!
//! A [`Session`] owns the snapshot captured when the collection was opened and
//! the cursor into it. Loading a page borrows the session mutably, so two page
//! loads can never overlap on the same session, and the cursor is only written
//! once a page has fully resolved. A page future that is dropped or abandoned
//! halfway leaves the session exactly as it was.

use crate::prelude::*;
use crate::resolver::Resolver;
use hnpager_core::{CollectionSnapshot, CollectionType, Cursor, Item, Page, PaginationError};
use std::future::Future;

#[derive(Debug)]
pub struct Session {
    resolver: Resolver,
    collection: CollectionType,
    snapshot: CollectionSnapshot,
    cursor: Cursor,
    page_size: usize,
}

impl Session {
    /// Open `collection` and position the cursor at its first item
    pub async fn open(
        resolver: Resolver,
        collection: CollectionType,
        page_size: usize,
    ) -> FetchResult<Self> {
        if page_size == 0 {
            return Err(PaginationError::ZeroPageSize.into());
        }

        let snapshot = resolver.open_collection(collection).await?;

        Ok(Self {
            resolver,
            collection,
            snapshot,
            cursor: Cursor::start(),
            page_size,
        })
    }

    pub fn collection(&self) -> CollectionType {
        self.collection
    }

    pub fn snapshot(&self) -> &CollectionSnapshot {
        &self.snapshot
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// No items left to load
    pub fn is_exhausted(&self) -> bool {
        self.snapshot.is_exhausted(self.cursor)
    }

    /// Load the page at the cursor and advance past it
    ///
    /// On error the cursor stays put, so calling this again retries the same page.
    pub async fn next_page(&mut self) -> FetchResult<Page<Item>> {
        let page = self
            .resolver
            .next_page(&self.snapshot, self.cursor, self.page_size)
            .await?;
        self.cursor = page.next;
        Ok(page)
    }

    /// Like [`Session::next_page`], but gives up as soon as `abandon` completes
    ///
    /// Returns `Ok(None)` when abandoned. The in-flight requests are dropped and
    /// the cursor is untouched.
    pub async fn next_page_or_abandon<F>(&mut self, abandon: F) -> FetchResult<Option<Page<Item>>>
    where
        F: Future<Output = ()>,
    {
        let outcome = tokio::select! {
            page = self.resolver.next_page(&self.snapshot, self.cursor, self.page_size) => Some(page),
            _ = abandon => None,
        };

        match outcome {
            Some(page) => {
                let page = page?;
                self.cursor = page.next;
                Ok(Some(page))
            }
            None => {
                info!(
                    "Abandoned page of {} at cursor {}",
                    self.collection, self.cursor
                );
                Ok(None)
            }
        }
    }

    /// Re-open the collection, picking up the current ranking
    ///
    /// The old snapshot and cursor are only replaced once the new snapshot has
    /// been fetched; a failed refresh keeps the session usable as it was.
    pub async fn refresh(&mut self) -> FetchResult<()> {
        let snapshot = self.resolver.open_collection(self.collection).await?;
        info!(
            "Refreshed {} ({} -> {} items)",
            self.collection,
            self.snapshot.len(),
            snapshot.len()
        );
        self.snapshot = snapshot;
        self.cursor = Cursor::start();
        Ok(())
    }
}
