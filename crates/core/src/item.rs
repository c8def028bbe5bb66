use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one Hacker News item (story, comment, job, poll or poll option)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ItemId {
    fn from(id: u64) -> Self {
        ItemId(id)
    }
}

/// Item variant, serialized as the API's `type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Story,
    Comment,
    Job,
    Poll,
    #[serde(rename = "pollopt")]
    PollOption,
}

impl ItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemKind::Story => "story",
            ItemKind::Comment => "comment",
            ItemKind::Job => "job",
            ItemKind::Poll => "poll",
            ItemKind::PollOption => "pollopt",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HackerNews item from API
///
/// Only `id` and `type` are required. Everything else is absent for some
/// variant: comments have no title, jobs have no descendants, deleted items
/// carry little more than their id.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Item {
    pub id: ItemId,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub by: Option<String>,
    pub time: Option<u64>,
    pub text: Option<String>,
    pub dead: Option<bool>,
    pub deleted: Option<bool>,
    pub parent: Option<ItemId>,
    pub poll: Option<ItemId>,
    pub kids: Option<Vec<ItemId>>,
    pub parts: Option<Vec<ItemId>>,
    pub url: Option<String>,
    pub score: Option<i64>,
    pub title: Option<String>,
    pub descendants: Option<u64>,
}

impl Item {
    /// Child ids in display order, empty when the item has none
    pub fn kid_ids(&self) -> &[ItemId] {
        self.kids.as_deref().unwrap_or_default()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted.unwrap_or(false)
    }

    pub fn is_dead(&self) -> bool {
        self.dead.unwrap_or(false)
    }
}

/// A comment (or story) together with its resolved replies
#[derive(Debug, Clone, PartialEq)]
pub struct CommentNode {
    pub item: Item,
    pub children: Vec<CommentNode>,
}

impl CommentNode {
    pub fn leaf(item: Item) -> Self {
        Self {
            item,
            children: Vec::new(),
        }
    }

    /// Assemble a tree from replies resolved one level at a time
    ///
    /// `levels[0]` holds the root's replies in `kids` order, `levels[1]` the
    /// replies of those replies in the same order, and so on. Items on the last
    /// level become leaves.
    pub fn from_levels(root: Item, levels: Vec<Vec<Item>>) -> Self {
        let mut below: Vec<CommentNode> = Vec::new();

        for level in levels.into_iter().rev() {
            let mut children = below.into_iter();
            below = level
                .into_iter()
                .map(|item| {
                    let own: Vec<CommentNode> =
                        children.by_ref().take(item.kid_ids().len()).collect();
                    CommentNode {
                        item,
                        children: own,
                    }
                })
                .collect();
        }

        Self {
            item: root,
            children: below,
        }
    }

    /// Number of resolved replies below this node, at any depth
    pub fn reply_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| 1 + child.reply_count())
            .sum()
    }

    /// Depth-first walk of the replies, paired with their depth (direct replies are depth 1)
    pub fn flatten_replies(&self) -> Vec<(usize, &Item)> {
        fn walk<'a>(node: &'a CommentNode, depth: usize, out: &mut Vec<(usize, &'a Item)>) {
            for child in &node.children {
                out.push((depth, &child.item));
                walk(child, depth + 1, out);
            }
        }

        let mut out = Vec::new();
        walk(self, 1, &mut out);
        out
    }
}

/// Error raised when a payload does not have the expected shape
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("item {id} is null (deleted or never created)")]
    NullItem { id: ItemId },

    #[error("item {id} is malformed: {reason}")]
    MalformedItem { id: ItemId, reason: String },

    #[error("requested item {requested} but the payload describes item {returned}")]
    IdMismatch { requested: ItemId, returned: ItemId },

    #[error("collection {collection} is not a list of item ids: {reason}")]
    MalformedCollection { collection: String, reason: String },
}

/// Decode the body of `GET /item/{id}.json`
///
/// The API answers `null` for ids it does not know about, which is reported
/// as [`DecodeError::NullItem`] so callers can degrade instead of crash.
pub fn decode_item(id: ItemId, body: &[u8]) -> Result<Item, DecodeError> {
    let item: Option<Item> =
        serde_json::from_slice(body).map_err(|e| DecodeError::MalformedItem {
            id,
            reason: e.to_string(),
        })?;

    let item = item.ok_or(DecodeError::NullItem { id })?;

    if item.id != id {
        return Err(DecodeError::IdMismatch {
            requested: id,
            returned: item.id,
        });
    }

    Ok(item)
}

/// Decode the body of `GET /{collection}.json`
pub fn decode_ids(collection: &str, body: &[u8]) -> Result<Vec<ItemId>, DecodeError> {
    let ids: Option<Vec<ItemId>> =
        serde_json::from_slice(body).map_err(|e| DecodeError::MalformedCollection {
            collection: collection.to_string(),
            reason: e.to_string(),
        })?;

    ids.ok_or_else(|| DecodeError::MalformedCollection {
        collection: collection.to_string(),
        reason: "payload is null".to_string(),
    })
}
