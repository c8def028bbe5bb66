use crate::prelude::{println, *};
use crate::resolver::Resolver;
use colored::Colorize;
use hnpager_core::hn::{
    build_post_output, build_thread_output, extract_item_id, CommentOutput, PostOutput,
    ThreadOutput,
};
use hnpager_core::pagination::cursor_for_page;
use hnpager_core::{CollectionSnapshot, ConfigOverrides, ItemId};

#[derive(Debug, clap::Args, Clone)]
pub struct ReadOptions {
    /// HackerNews item ID or full URL (e.g., "45440028" or "https://news.ycombinator.com/item?id=45440028")
    #[clap(env = "HN_ITEM")]
    pub item: String,

    /// Number of top-level comments per page (defaults to the configured page size)
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Page number for comments (1-indexed)
    #[arg(short, long, default_value = "1")]
    pub page: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Read comment thread (provide comment ID or URL)
    #[arg(short, long)]
    pub thread: Option<String>,

    /// How many levels of replies to resolve when reading a thread
    #[arg(short, long)]
    pub depth: Option<usize>,
}

pub async fn run(options: ReadOptions, global: crate::Global) -> Result<()> {
    let item_id = extract_item_id(&options.item)?;

    let resolver = global.resolver_with(ConfigOverrides {
        thread_depth: options.depth,
        ..global.overrides(options.limit)
    })?;

    if let Some(thread) = &options.thread {
        let thread_id = extract_item_id(thread)?;
        if global.verbose {
            println!("Fetching comment thread: {}", thread_id);
        }

        let output = read_thread_data(&resolver, thread_id).await?;
        if options.json {
            println!("{}", to_json(&output)?);
        } else {
            print!("{}", format_thread_text(&output, item_id));
        }
        return Ok(());
    }

    if global.verbose {
        println!("Fetching item ID: {}", item_id);
    }

    let output = read_item_data(&resolver, item_id, options.page).await?;
    if options.json {
        println!("{}", to_json(&output)?);
    } else {
        print!("{}", format_post_text(&output));
    }

    Ok(())
}

/// Resolve an item and one page of its top-level comments
///
/// The item's `kids` are captured as a snapshot and paged exactly like a
/// story collection, so any item kind with replies can be read.
pub async fn read_item_data(resolver: &Resolver, id: ItemId, page: usize) -> Result<PostOutput> {
    let limit = resolver.config().page_size;
    let item = resolver.resolve_item(id).await?;
    let replies = CollectionSnapshot::from_replies(&item);

    let comments = resolver
        .next_page(&replies, cursor_for_page(page, limit), limit)
        .await?;

    Ok(build_post_output(&item, &comments, limit))
}

/// Resolve a comment and its replies down to the configured depth
pub async fn read_thread_data(resolver: &Resolver, id: ItemId) -> Result<ThreadOutput> {
    let depth = resolver.config().thread_depth;
    let tree = resolver.resolve_thread(id, depth).await?;
    Ok(build_thread_output(&tree))
}

fn to_json<T: serde::Serialize>(output: &T) -> Result<String> {
    serde_json::to_string_pretty(output).map_err(|e| eyre!("JSON serialization failed: {}", e))
}

/// Cut `text` to at most `max_chars` characters, marking the cut with "..."
fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}

fn format_comment_header(label: String, comment: &CommentOutput) -> String {
    format!(
        "{} {} {} ({}: {})",
        label.yellow().bold(),
        "by".bright_black(),
        comment.author.as_deref().unwrap_or("(unknown)").bright_white(),
        "ID".bright_black(),
        comment.id.to_string().bright_white()
    )
}

/// Build formatted text output for post with comments
pub fn format_post_text(post: &PostOutput) -> String {
    let mut result = String::new();
    let pagination = &post.pagination;

    // Post header
    result.push_str(&format!("\n{}\n", "=".repeat(80).bright_cyan()));
    result.push_str(&format!(
        "{}: {}\n",
        post.kind.to_uppercase().bright_cyan().bold(),
        post.title.as_deref().unwrap_or("(No title)").white().bold()
    ));
    result.push_str(&format!("{}\n", "=".repeat(80).bright_cyan()));

    if let Some(url) = &post.url {
        result.push_str(&format!("{}: {}\n", "URL".green(), url.cyan().underline()));
    }

    result.push_str(&format!(
        "{}: {}\n",
        "Author".green(),
        post.author.as_deref().unwrap_or("(unknown)").bright_white()
    ));
    if let Some(score) = post.score {
        result.push_str(&format!(
            "{}: {}\n",
            "Score".green(),
            score.to_string().bright_yellow()
        ));
    }
    result.push_str(&format!(
        "{}: {}\n",
        "Time".green(),
        post.time.as_deref().unwrap_or("(unknown)").bright_black()
    ));
    result.push_str(&format!(
        "{}: {}\n",
        "Comments".green(),
        post.total_comments.unwrap_or(0).to_string().bright_magenta()
    ));
    result.push_str(&format!(
        "{}: {}\n",
        "ID".green(),
        post.id.to_string().bright_white()
    ));

    if let Some(text) = &post.text {
        result.push_str(&format!("\n{}\n", text.bright_white()));
    }

    // Comments section
    result.push_str(&format!("\n{}\n", "=".repeat(80).bright_magenta()));
    result.push_str(&format!(
        "{} ({} {} {} {})\n",
        "COMMENTS".bright_magenta().bold(),
        "Page".bright_white(),
        pagination.current_page.to_string().bright_cyan().bold(),
        "of".bright_white(),
        pagination.total_pages.to_string().bright_cyan().bold()
    ));
    result.push_str(&format!("{}\n", "=".repeat(80).bright_magenta()));

    if post.comments.is_empty() {
        result.push_str(&format!("\n{}\n", "No comments on this page.".yellow()));
    } else {
        let first_number = pagination.current_page.saturating_sub(1) * pagination.limit;
        for (idx, comment) in post.comments.iter().enumerate() {
            result.push_str(&format!(
                "\n{}\n",
                format_comment_header(format!("[Comment #{}]", first_number + idx + 1), comment)
            ));
            result.push_str(&format!(
                "{}: {}\n",
                "Time".green(),
                comment.time.as_deref().unwrap_or("(unknown)").bright_black()
            ));

            if let Some(text) = &comment.text {
                result.push_str(&format!("{}\n", truncate_text(text, 500).white()));
            }

            if comment.replies_count > 0 {
                result.push_str(&format!(
                    "{} {}\n",
                    "└─".bright_black(),
                    format!("{} replies", comment.replies_count).bright_magenta()
                ));
            }
        }
    }

    // Navigation section
    result.push_str(&format!("\n{}\n", "=".repeat(80).bright_yellow()));
    result.push_str(&format!("{}\n", "NAVIGATION".bright_yellow().bold()));
    result.push_str(&format!("{}\n", "=".repeat(80).bright_yellow()));
    result.push_str(&format!(
        "\n{} {} {} {} ({} {})\n",
        "Showing page".bright_white(),
        pagination.current_page.to_string().bright_cyan().bold(),
        "of".bright_white(),
        pagination.total_pages.to_string().bright_cyan().bold(),
        pagination.total_comments.to_string().bright_cyan().bold(),
        "total top-level comments".bright_white()
    ));

    result.push_str(&format!(
        "\n{}:\n",
        "To view more comments".bright_white().bold()
    ));
    if let Some(next) = &pagination.next_page_command {
        result.push_str(&format!("  {}: {}\n", "Next page".green(), next.cyan()));
    }
    if let Some(prev) = &pagination.prev_page_command {
        result.push_str(&format!("  {}: {}\n", "Previous page".green(), prev.cyan()));
    }

    result.push_str(&format!(
        "\n{}:\n",
        "To read a comment thread".bright_white().bold()
    ));
    result.push_str(&format!(
        "  {}\n",
        format!("hnpager read {} --thread <comment_id>", post.id).cyan()
    ));
    if let Some(first) = post.comments.first() {
        result.push_str(&format!(
            "  {}: {}\n",
            "Example".green(),
            format!("hnpager read {} --thread {}", post.id, first.id).cyan()
        ));
    }

    result.push_str(&format!(
        "\n{}:\n",
        "To get JSON output".bright_white().bold()
    ));
    result.push_str(&format!(
        "  {}\n",
        format!("hnpager read {} --json", post.id).cyan()
    ));
    result.push('\n');

    result
}

/// Build formatted text output for comment thread
fn format_thread_text(thread: &ThreadOutput, post_id: ItemId) -> String {
    let mut result = String::new();

    result.push_str(&format!("\n{}\n", "=".repeat(80).bright_cyan()));
    result.push_str(&format!("{}\n", "COMMENT THREAD".bright_cyan().bold()));
    result.push_str(&format!("{}\n", "=".repeat(80).bright_cyan()));

    result.push_str(&format!(
        "\n{}\n",
        format_comment_header("[Root Comment]".to_string(), &thread.comment)
    ));
    result.push_str(&format!(
        "{}: {}\n",
        "Time".green(),
        thread
            .comment
            .time
            .as_deref()
            .unwrap_or("(unknown)")
            .bright_black()
    ));

    if let Some(text) = &thread.comment.text {
        result.push_str(&format!("\n{}\n", text.bright_white()));
    }

    if !thread.replies.is_empty() {
        result.push_str(&format!("\n{}\n", "-".repeat(80).bright_magenta()));
        result.push_str(&format!(
            "{} ({} {})\n",
            "REPLIES".bright_magenta().bold(),
            thread.replies.len().to_string().bright_cyan().bold(),
            "total".bright_white()
        ));
        result.push_str(&format!("{}\n", "-".repeat(80).bright_magenta()));

        for (idx, reply) in thread.replies.iter().enumerate() {
            let indent = "  ".repeat(reply.depth);
            result.push_str(&format!(
                "\n{}{}\n",
                indent,
                format_comment_header(format!("[Reply #{}]", idx + 1), reply)
            ));
            result.push_str(&format!(
                "{}{}: {}\n",
                indent,
                "Time".green(),
                reply.time.as_deref().unwrap_or("(unknown)").bright_black()
            ));

            if let Some(text) = &reply.text {
                for line in truncate_text(text, 500).lines() {
                    result.push_str(&format!("{}{}\n", indent, line.white()));
                }
            }
        }
    }

    result.push_str(&format!("\n{}\n", "=".repeat(80).bright_yellow()));
    result.push_str(&format!(
        "{}: {}\n",
        "Back to post".green(),
        format!("hnpager read {post_id}").cyan()
    ));
    result.push('\n');

    result
}
