//! Collections and the id snapshots captured from them
//!
//! A collection endpoint (e.g. `topstories`) returns the ranked list of item
//! ids at the time of the request. That list is captured once in a
//! [`CollectionSnapshot`] and every later page is a slice of it, so a ranking
//! change on the server never shifts items between pages of one session.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::item::{Item, ItemId};
use crate::pagination::{page_bounds, Cursor, PaginationError};

/// Named, ordered list of item ids exposed by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionType {
    Top,
    New,
    Best,
    Ask,
    Show,
    Job,
}

impl CollectionType {
    pub const ALL: [CollectionType; 6] = [
        CollectionType::Top,
        CollectionType::New,
        CollectionType::Best,
        CollectionType::Ask,
        CollectionType::Show,
        CollectionType::Job,
    ];

    /// Path segment of the collection endpoint, without the `.json` suffix
    pub fn endpoint(self) -> &'static str {
        match self {
            CollectionType::Top => "topstories",
            CollectionType::New => "newstories",
            CollectionType::Best => "beststories",
            CollectionType::Ask => "askstories",
            CollectionType::Show => "showstories",
            CollectionType::Job => "jobstories",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CollectionType::Top => "top",
            CollectionType::New => "new",
            CollectionType::Best => "best",
            CollectionType::Ask => "ask",
            CollectionType::Show => "show",
            CollectionType::Job => "job",
        }
    }
}

impl fmt::Display for CollectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid story type: {0}. Valid types: top, new, best, ask, show, job")]
pub struct UnknownCollection(pub String);

impl FromStr for CollectionType {
    type Err = UnknownCollection;

    /// Accepts the short name (`top`) or the endpoint name (`topstories`), case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        CollectionType::ALL
            .into_iter()
            .find(|c| c.name() == wanted || c.endpoint() == wanted)
            .ok_or_else(|| UnknownCollection(s.to_string()))
    }
}

/// Where the ids of a snapshot came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SnapshotSource {
    /// A collection endpoint such as `topstories`
    Collection(CollectionType),
    /// The `kids` of an item, used to paginate its replies
    Replies(ItemId),
}

impl fmt::Display for SnapshotSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotSource::Collection(collection) => write!(f, "{collection}"),
            SnapshotSource::Replies(parent) => write!(f, "replies to {parent}"),
        }
    }
}

/// Ordered ids captured once, then sliced page by page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionSnapshot {
    source: SnapshotSource,
    ids: Vec<ItemId>,
}

impl CollectionSnapshot {
    pub fn from_collection(collection: CollectionType, ids: Vec<ItemId>) -> Self {
        Self {
            source: SnapshotSource::Collection(collection),
            ids,
        }
    }

    /// Snapshot of an item's direct replies, in the order the API ranks them
    pub fn from_replies(item: &Item) -> Self {
        Self {
            source: SnapshotSource::Replies(item.id),
            ids: item.kid_ids().to_vec(),
        }
    }

    pub fn source(&self) -> SnapshotSource {
        self.source
    }

    pub fn ids(&self) -> &[ItemId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Whether a page starting at `cursor` would be empty
    pub fn is_exhausted(&self, cursor: Cursor) -> bool {
        cursor.offset() >= self.ids.len()
    }

    /// Ids of the page `[cursor, cursor + page_size)`, clamped to the snapshot
    pub fn slice(&self, cursor: Cursor, page_size: usize) -> Result<&[ItemId], PaginationError> {
        let bounds = page_bounds(self.ids.len(), cursor, page_size)?;
        Ok(&self.ids[bounds])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemKind;

    fn ids(raw: &[u64]) -> Vec<ItemId> {
        raw.iter().copied().map(ItemId).collect()
    }

    #[test]
    fn test_collection_endpoints() {
        assert_eq!(CollectionType::Top.endpoint(), "topstories");
        assert_eq!(CollectionType::New.endpoint(), "newstories");
        assert_eq!(CollectionType::Best.endpoint(), "beststories");
        assert_eq!(CollectionType::Ask.endpoint(), "askstories");
        assert_eq!(CollectionType::Show.endpoint(), "showstories");
        assert_eq!(CollectionType::Job.endpoint(), "jobstories");
    }

    #[test]
    fn test_collection_from_str() {
        for collection in CollectionType::ALL {
            assert_eq!(collection.name().parse::<CollectionType>(), Ok(collection));
            assert_eq!(
                collection.endpoint().parse::<CollectionType>(),
                Ok(collection)
            );
        }

        assert_eq!("TOP".parse::<CollectionType>(), Ok(CollectionType::Top));
        assert_eq!(" ask ".parse::<CollectionType>(), Ok(CollectionType::Ask));
    }

    #[test]
    fn test_collection_from_str_invalid() {
        let err = "hot".parse::<CollectionType>().unwrap_err();
        assert!(err.to_string().contains("Invalid story type: hot"));
    }

    #[test]
    fn test_snapshot_slices_in_order() {
        let snapshot =
            CollectionSnapshot::from_collection(CollectionType::Top, ids(&[101, 102, 103, 104, 105]));

        assert_eq!(
            snapshot.slice(Cursor::start(), 2).unwrap(),
            &ids(&[101, 102])[..]
        );
        assert_eq!(
            snapshot.slice(Cursor::new(2), 2).unwrap(),
            &ids(&[103, 104])[..]
        );
        assert_eq!(snapshot.slice(Cursor::new(4), 2).unwrap(), &ids(&[105])[..]);
        assert!(snapshot.slice(Cursor::new(5), 2).unwrap().is_empty());
        assert!(snapshot.slice(Cursor::new(50), 2).unwrap().is_empty());
    }

    #[test]
    fn test_snapshot_zero_page_size() {
        let snapshot = CollectionSnapshot::from_collection(CollectionType::New, ids(&[1, 2]));
        assert_eq!(
            snapshot.slice(Cursor::start(), 0),
            Err(PaginationError::ZeroPageSize)
        );
    }

    #[test]
    fn test_snapshot_exhaustion() {
        let snapshot = CollectionSnapshot::from_collection(CollectionType::Best, ids(&[1, 2, 3]));
        assert!(!snapshot.is_exhausted(Cursor::new(2)));
        assert!(snapshot.is_exhausted(Cursor::new(3)));

        let empty = CollectionSnapshot::from_collection(CollectionType::Best, vec![]);
        assert!(empty.is_exhausted(Cursor::start()));
    }

    #[test]
    fn test_snapshot_from_replies() {
        let item = Item {
            id: ItemId(8863),
            kind: ItemKind::Story,
            by: None,
            time: None,
            text: None,
            dead: None,
            deleted: None,
            parent: None,
            poll: None,
            kids: Some(ids(&[9, 3, 7])),
            parts: None,
            url: None,
            score: None,
            title: None,
            descendants: None,
        };

        let snapshot = CollectionSnapshot::from_replies(&item);

        assert_eq!(snapshot.source(), SnapshotSource::Replies(ItemId(8863)));
        assert_eq!(snapshot.ids(), &ids(&[9, 3, 7])[..]);
        assert_eq!(snapshot.source().to_string(), "replies to 8863");
    }
}
