use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use crate::collection::{CollectionSnapshot, SnapshotSource};
use crate::item::{CommentNode, Item, ItemId};
use crate::pagination::{page_number, total_pages, Page};

static ITEM_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"item\?id=(\d+)").expect("item url pattern is valid"));
static PARAGRAPH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<p\s*/?>").expect("paragraph pattern is valid"));
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid item ID or URL: {0}")]
pub struct InvalidItemRef(pub String);

/// Individual list item output
#[derive(Debug, Serialize, Clone)]
pub struct ListItem {
    /// 1-indexed position in the collection snapshot
    pub rank: usize,
    pub id: ItemId,
    pub kind: String,
    pub title: Option<String>,
    pub url: Option<String>,
    pub author: Option<String>,
    pub score: Option<i64>,
    pub time: Option<String>,
    pub age: Option<String>,
    pub comments: Option<u64>,
}

/// Pagination metadata for list output
#[derive(Debug, Serialize, Clone)]
pub struct ListPaginationInfo {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub limit: usize,
    pub cursor: usize,
    pub next_cursor: usize,
    pub has_more: bool,
    pub next_page_command: Option<String>,
    pub prev_page_command: Option<String>,
}

/// Complete list output with items and pagination
#[derive(Debug, Serialize, Clone)]
pub struct ListOutput {
    pub story_type: String,
    pub items: Vec<ListItem>,
    pub pagination: ListPaginationInfo,
}

/// Post output with comments and pagination
#[derive(Debug, Serialize, Clone)]
pub struct PostOutput {
    pub id: ItemId,
    pub kind: String,
    pub title: Option<String>,
    pub url: Option<String>,
    pub author: Option<String>,
    pub score: Option<i64>,
    pub time: Option<String>,
    pub text: Option<String>,
    pub total_comments: Option<u64>,
    pub comments: Vec<CommentOutput>,
    pub pagination: PaginationInfo,
}

/// Individual comment output
#[derive(Debug, Serialize, Clone)]
pub struct CommentOutput {
    pub id: ItemId,
    pub author: Option<String>,
    pub time: Option<String>,
    pub text: Option<String>,
    pub replies_count: usize,
    /// 0 for the comment a thread was requested for, 1 for its replies, and so on
    pub depth: usize,
}

/// Pagination metadata for post reading
#[derive(Debug, Serialize, Clone)]
pub struct PaginationInfo {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_comments: usize,
    pub limit: usize,
    pub next_page_command: Option<String>,
    pub prev_page_command: Option<String>,
}

/// A comment and its resolved replies, flattened depth-first
#[derive(Debug, Serialize, Clone)]
pub struct ThreadOutput {
    pub comment: CommentOutput,
    pub replies: Vec<CommentOutput>,
}

/// Convert Unix timestamp to formatted string
pub fn format_timestamp(timestamp: Option<u64>) -> Option<String> {
    timestamp.and_then(|ts| {
        let dt = DateTime::<Utc>::from_timestamp(i64::try_from(ts).ok()?, 0)?;
        Some(dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
    })
}

/// Render a Unix timestamp relative to `now`, e.g. "3 hours ago"
pub fn format_relative_time(timestamp: u64, now: DateTime<Utc>) -> String {
    let Some(then) = i64::try_from(timestamp)
        .ok()
        .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
    else {
        return "unknown".to_string();
    };

    let seconds = (now - then).num_seconds();
    if seconds < 0 {
        return "just now".to_string();
    }

    let (amount, unit) = match seconds {
        0..=59 => return "just now".to_string(),
        60..=3_599 => (seconds / 60, "minute"),
        3_600..=86_399 => (seconds / 3_600, "hour"),
        86_400..=2_591_999 => (seconds / 86_400, "day"),
        2_592_000..=31_535_999 => (seconds / 2_592_000, "month"),
        _ => (seconds / 31_536_000, "year"),
    };

    if amount == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{amount} {unit}s ago")
    }
}

/// Strip HTML tags and decode HTML entities from text
///
/// Paragraph tags become blank lines before the remaining tags are removed.
pub fn strip_html(text: &str) -> String {
    let with_breaks = PARAGRAPH_RE.replace_all(text, "\n\n");
    let stripped = TAG_RE.replace_all(&with_breaks, "");
    html_escape::decode_html_entities(stripped.trim()).to_string()
}

/// Accept a bare item id or a `news.ycombinator.com/item?id=` URL
pub fn extract_item_id(input: &str) -> Result<ItemId, InvalidItemRef> {
    let input = input.trim();

    if let Ok(id) = input.parse::<u64>() {
        return Ok(ItemId(id));
    }

    ITEM_URL_RE
        .captures(input)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u64>().ok())
        .map(ItemId)
        .ok_or_else(|| InvalidItemRef(input.to_string()))
}

/// Title to show for an item, never empty
pub fn display_title(item: &Item) -> String {
    if item.is_deleted() {
        return "[deleted]".to_string();
    }
    if item.is_dead() {
        return "[dead]".to_string();
    }
    item.title
        .clone()
        .unwrap_or_else(|| "(No title)".to_string())
}

/// Comment body to show, with deleted and dead comments replaced by a marker
pub fn display_text(item: &Item) -> Option<String> {
    if item.is_deleted() {
        return Some("[deleted]".to_string());
    }
    if item.is_dead() {
        return Some("[dead]".to_string());
    }
    item.text.as_deref().map(strip_html)
}

fn list_command(snapshot: &CollectionSnapshot, page: usize) -> String {
    match snapshot.source() {
        SnapshotSource::Collection(collection) => {
            format!("hnpager list {collection} --page {page}")
        }
        SnapshotSource::Replies(parent) => format!("hnpager read {parent} --page {page}"),
    }
}

/// Transform a resolved page into list output with pagination
///
/// Ranks continue across pages: the first item of a page starting at cursor
/// 30 is ranked 31.
pub fn transform_page(
    page: &Page<Item>,
    snapshot: &CollectionSnapshot,
    limit: usize,
    now: DateTime<Utc>,
) -> ListOutput {
    let items: Vec<ListItem> = page
        .items
        .iter()
        .enumerate()
        .map(|(idx, item)| ListItem {
            rank: page.start.offset() + idx + 1,
            id: item.id,
            kind: item.kind.to_string(),
            title: Some(display_title(item)),
            url: item.url.clone(),
            author: item.by.clone(),
            score: item.score,
            time: format_timestamp(item.time),
            age: item.time.map(|ts| format_relative_time(ts, now)),
            comments: item.descendants,
        })
        .collect();

    let total_items = snapshot.len();
    let current_page = page_number(page.start, limit);
    let total_pages = total_pages(total_items, limit);
    let has_more = !snapshot.is_exhausted(page.next);

    ListOutput {
        story_type: snapshot.source().to_string(),
        items,
        pagination: ListPaginationInfo {
            current_page,
            total_pages,
            total_items,
            limit,
            cursor: page.start.offset(),
            next_cursor: page.next.offset(),
            has_more,
            next_page_command: has_more.then(|| list_command(snapshot, current_page + 1)),
            prev_page_command: (current_page > 1)
                .then(|| list_command(snapshot, current_page - 1)),
        },
    }
}

fn comment_output(item: &Item, depth: usize) -> CommentOutput {
    CommentOutput {
        id: item.id,
        author: item.by.clone(),
        time: format_timestamp(item.time),
        text: display_text(item),
        replies_count: item.kid_ids().len(),
        depth,
    }
}

/// Transform HN items to comment outputs
pub fn transform_comments(comments: &[Item]) -> Vec<CommentOutput> {
    comments.iter().map(|c| comment_output(c, 1)).collect()
}

/// Build post output from an item and one page of its top-level comments
pub fn build_post_output(item: &Item, comments: &Page<Item>, limit: usize) -> PostOutput {
    let total_comments = item.kid_ids().len();
    let total_pages = total_pages(total_comments, limit);
    let page = page_number(comments.start, limit);

    let next_page = (comments.next.offset() < total_comments)
        .then(|| format!("hnpager read {} --page {}", item.id, page + 1));
    let prev_page = (page > 1).then(|| format!("hnpager read {} --page {}", item.id, page - 1));

    PostOutput {
        id: item.id,
        kind: item.kind.to_string(),
        title: Some(display_title(item)),
        url: item.url.clone(),
        author: item.by.clone(),
        score: item.score,
        time: format_timestamp(item.time),
        text: item.text.as_deref().map(strip_html),
        total_comments: item.descendants,
        comments: transform_comments(&comments.items),
        pagination: PaginationInfo {
            current_page: page,
            total_pages,
            total_comments,
            limit,
            next_page_command: next_page,
            prev_page_command: prev_page,
        },
    }
}

/// Build thread output from a resolved comment tree
pub fn build_thread_output(tree: &CommentNode) -> ThreadOutput {
    ThreadOutput {
        comment: comment_output(&tree.item, 0),
        replies: tree
            .flatten_replies()
            .into_iter()
            .map(|(depth, item)| comment_output(item, depth))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::CollectionType;
    use crate::item::ItemKind;
    use crate::pagination::Cursor;

    fn story(id: u64) -> Item {
        Item {
            id: ItemId(id),
            kind: ItemKind::Story,
            by: Some("testuser".to_string()),
            time: Some(1609459200),
            text: None,
            dead: None,
            deleted: None,
            parent: None,
            poll: None,
            kids: None,
            parts: None,
            url: Some(format!("https://example.com/{id}")),
            score: Some(100),
            title: Some(format!("Story {id}")),
            descendants: Some(42),
        }
    }

    fn comment(id: u64, kids: &[u64]) -> Item {
        Item {
            id: ItemId(id),
            kind: ItemKind::Comment,
            by: Some(format!("user{id}")),
            time: Some(1609459200),
            text: Some("<p>Great post!</p>".to_string()),
            dead: None,
            deleted: None,
            parent: None,
            poll: None,
            kids: Some(kids.iter().copied().map(ItemId).collect()),
            parts: None,
            url: None,
            score: None,
            title: None,
            descendants: None,
        }
    }

    fn snapshot(ids: &[u64]) -> CollectionSnapshot {
        CollectionSnapshot::from_collection(
            CollectionType::Top,
            ids.iter().copied().map(ItemId).collect(),
        )
    }

    fn now() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1609459200 + 3 * 3600, 0).unwrap()
    }

    #[test]
    fn test_format_timestamp_valid() {
        let formatted = format_timestamp(Some(1609459200));
        assert_eq!(formatted, Some("2021-01-01 00:00:00 UTC".to_string()));
    }

    #[test]
    fn test_format_timestamp_none() {
        assert_eq!(format_timestamp(None), None);
    }

    #[test]
    fn test_format_relative_time() {
        let base = 1609459200;
        let at = |secs: i64| DateTime::<Utc>::from_timestamp(base + secs, 0).unwrap();

        assert_eq!(format_relative_time(base as u64, at(10)), "just now");
        assert_eq!(format_relative_time(base as u64, at(60)), "1 minute ago");
        assert_eq!(format_relative_time(base as u64, at(45 * 60)), "45 minutes ago");
        assert_eq!(format_relative_time(base as u64, at(3 * 3600)), "3 hours ago");
        assert_eq!(format_relative_time(base as u64, at(86_400)), "1 day ago");
        assert_eq!(
            format_relative_time(base as u64, at(400 * 86_400)),
            "1 year ago"
        );
        assert_eq!(format_relative_time(base as u64, at(-100)), "just now");
    }

    #[test]
    fn test_strip_html_tags() {
        assert_eq!(strip_html("<p>Hello <strong>world</strong></p>"), "Hello world");
    }

    #[test]
    fn test_strip_html_entities() {
        let html = "1 &lt; 2 &amp; 3 &gt; 0 &quot;test&quot; &#x27;yes&#x27; &#x2F;path";
        assert_eq!(strip_html(html), "1 < 2 & 3 > 0 \"test\" 'yes' /path");
    }

    #[test]
    fn test_strip_html_paragraphs() {
        let html = "First paragraph &amp; some <i>emphasis</i><p>Second with &lt;code&gt;";
        assert_eq!(
            strip_html(html),
            "First paragraph & some emphasis\n\nSecond with <code>"
        );
    }

    #[test]
    fn test_extract_item_id() {
        assert_eq!(extract_item_id("45440028"), Ok(ItemId(45440028)));
        assert_eq!(
            extract_item_id("https://news.ycombinator.com/item?id=45440028"),
            Ok(ItemId(45440028))
        );
        assert!(extract_item_id("https://example.com").is_err());
        assert!(extract_item_id("-3").is_err());
    }

    #[test]
    fn test_display_title_markers() {
        let mut item = story(1);
        assert_eq!(display_title(&item), "Story 1");

        item.dead = Some(true);
        assert_eq!(display_title(&item), "[dead]");

        item.deleted = Some(true);
        assert_eq!(display_title(&item), "[deleted]");

        let untitled = comment(2, &[]);
        assert_eq!(display_title(&untitled), "(No title)");
    }

    #[test]
    fn test_transform_page_first_page() {
        let snapshot = snapshot(&[1, 2, 3, 4, 5]);
        let page = Page::new(Cursor::start(), vec![story(1), story(2)]);

        let output = transform_page(&page, &snapshot, 2, now());

        assert_eq!(output.story_type, "top");
        assert_eq!(output.items.len(), 2);
        assert_eq!(output.items[0].rank, 1);
        assert_eq!(output.items[1].rank, 2);
        assert_eq!(output.items[0].title.as_deref(), Some("Story 1"));
        assert_eq!(output.items[0].age.as_deref(), Some("3 hours ago"));
        assert_eq!(output.items[0].comments, Some(42));
        assert_eq!(output.pagination.current_page, 1);
        assert_eq!(output.pagination.total_pages, 3);
        assert_eq!(output.pagination.total_items, 5);
        assert_eq!(output.pagination.next_cursor, 2);
        assert!(output.pagination.has_more);
        assert_eq!(
            output.pagination.next_page_command.as_deref(),
            Some("hnpager list top --page 2")
        );
        assert!(output.pagination.prev_page_command.is_none());
    }

    #[test]
    fn test_transform_page_ranks_continue() {
        let snapshot = snapshot(&[1, 2, 3, 4, 5]);
        let page = Page::new(Cursor::new(4), vec![story(5)]);

        let output = transform_page(&page, &snapshot, 2, now());

        assert_eq!(output.items[0].rank, 5);
        assert_eq!(output.pagination.current_page, 3);
        assert!(!output.pagination.has_more);
        assert!(output.pagination.next_page_command.is_none());
        assert_eq!(
            output.pagination.prev_page_command.as_deref(),
            Some("hnpager list top --page 2")
        );
    }

    #[test]
    fn test_transform_page_empty() {
        let snapshot = snapshot(&[]);
        let page: Page<Item> = Page::empty(Cursor::start());

        let output = transform_page(&page, &snapshot, 30, now());

        assert!(output.items.is_empty());
        assert_eq!(output.pagination.total_items, 0);
        assert_eq!(output.pagination.total_pages, 0);
        assert!(!output.pagination.has_more);
    }

    #[test]
    fn test_transform_page_missing_optional_fields() {
        let snapshot = snapshot(&[999]);
        let mut item = story(999);
        item.by = None;
        item.time = None;
        item.url = None;
        item.score = None;
        item.title = None;
        item.descendants = None;
        let page = Page::new(Cursor::start(), vec![item]);

        let output = transform_page(&page, &snapshot, 10, now());

        assert_eq!(output.items[0].title.as_deref(), Some("(No title)"));
        assert_eq!(output.items[0].author, None);
        assert_eq!(output.items[0].time, None);
        assert_eq!(output.items[0].age, None);
        assert_eq!(output.items[0].comments, None);
    }

    #[test]
    fn test_transform_comments() {
        let mut dead = comment(102, &[]);
        dead.dead = Some(true);

        let outputs = transform_comments(&[comment(100, &[101, 103]), dead]);

        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0].text.as_deref(), Some("Great post!"));
        assert_eq!(outputs[0].replies_count, 2);
        assert_eq!(outputs[0].time.as_deref(), Some("2021-01-01 00:00:00 UTC"));
        assert_eq!(outputs[1].text.as_deref(), Some("[dead]"));
        assert_eq!(outputs[1].replies_count, 0);
    }

    #[test]
    fn test_build_post_output_first_page() {
        let mut item = story(12345);
        item.kids = Some((100..105).map(ItemId).collect());
        item.text = Some("<p>Story text</p>".to_string());
        let page = Page::new(Cursor::start(), vec![comment(100, &[]), comment(101, &[])]);

        let output = build_post_output(&item, &page, 2);

        assert_eq!(output.id, ItemId(12345));
        assert_eq!(output.text.as_deref(), Some("Story text"));
        assert_eq!(output.comments.len(), 2);
        assert_eq!(output.pagination.current_page, 1);
        assert_eq!(output.pagination.total_pages, 3);
        assert_eq!(output.pagination.total_comments, 5);
        assert_eq!(
            output.pagination.next_page_command.as_deref(),
            Some("hnpager read 12345 --page 2")
        );
        assert!(output.pagination.prev_page_command.is_none());
    }

    #[test]
    fn test_build_post_output_last_page() {
        let mut item = story(12345);
        item.kids = Some((100..105).map(ItemId).collect());
        let page = Page::new(Cursor::new(4), vec![comment(104, &[])]);

        let output = build_post_output(&item, &page, 2);

        assert_eq!(output.pagination.current_page, 3);
        assert!(output.pagination.next_page_command.is_none());
        assert_eq!(
            output.pagination.prev_page_command.as_deref(),
            Some("hnpager read 12345 --page 2")
        );
    }

    #[test]
    fn test_build_post_output_no_comments() {
        let item = story(7);
        let page: Page<Item> = Page::empty(Cursor::start());

        let output = build_post_output(&item, &page, 10);

        assert!(output.comments.is_empty());
        assert_eq!(output.pagination.total_comments, 0);
        assert_eq!(output.pagination.total_pages, 0);
        assert!(output.pagination.next_page_command.is_none());
        assert!(output.pagination.prev_page_command.is_none());
    }

    #[test]
    fn test_build_thread_output() {
        let tree = CommentNode {
            item: comment(1, &[2, 4]),
            children: vec![
                CommentNode {
                    item: comment(2, &[3]),
                    children: vec![CommentNode::leaf(comment(3, &[]))],
                },
                CommentNode::leaf(comment(4, &[])),
            ],
        };

        let output = build_thread_output(&tree);

        assert_eq!(output.comment.id, ItemId(1));
        assert_eq!(output.comment.depth, 0);
        let replies: Vec<(u64, usize)> = output.replies.iter().map(|r| (r.id.0, r.depth)).collect();
        assert_eq!(replies, vec![(2, 1), (3, 2), (4, 1)]);
    }
}
