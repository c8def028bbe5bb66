//! Core library for hnpager
//!
//! This crate implements the **Functional Core** of the hnpager application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! The hnpager project uses a two-crate architecture to enforce separation of concerns:
//!
//! - **`hnpager_core`** (this crate): Pure data model, pagination arithmetic and transformations
//! - **`hnpager`**: HTTP resolution, browsing sessions and the command line (the Imperative Shell)
//!
//! Nothing in this crate performs I/O. Payloads arrive as bytes, configuration
//! arrives as strings, and the current time is passed in by the caller, so every
//! function here can be tested with plain fixture data.
//!
//! # Module Organization
//!
//! - [`item`]: Hacker News items, item ids and payload decoding
//! - [`collection`]: Collection types and the snapshot of ids captured when a collection is opened
//! - [`pagination`]: Cursors, page bounds and resolved pages
//! - [`config`]: Resolver configuration and its file/environment overrides
//! - [`hn`]: Transformations from resolved items to list, post and thread outputs
//!
//! # Example Usage
//!
//! ```rust
//! use hnpager_core::collection::{CollectionSnapshot, CollectionType};
//! use hnpager_core::item::ItemId;
//! use hnpager_core::pagination::Cursor;
//!
//! let snapshot = CollectionSnapshot::from_collection(
//!     CollectionType::Top,
//!     vec![ItemId(101), ItemId(102), ItemId(103)],
//! );
//!
//! let slice = snapshot.slice(Cursor::start(), 2).unwrap();
//! assert_eq!(slice, &[ItemId(101), ItemId(102)]);
//! ```

pub mod collection;
pub mod config;
pub mod hn;
pub mod item;
pub mod pagination;

pub use collection::{CollectionSnapshot, CollectionType, SnapshotSource};
pub use config::{ConfigError, ConfigOverrides, ResolverConfig};
pub use item::{CommentNode, DecodeError, Item, ItemId, ItemKind};
pub use pagination::{Cursor, Page, PaginationError};
