use crate::prelude::{println, *};
use crate::resolver::Resolver;
use chrono::Utc;
use colored::Colorize;
use hnpager_core::hn::{transform_page, ListItem, ListOutput};
use hnpager_core::pagination::cursor_for_page;
use hnpager_core::CollectionType;

#[derive(Debug, clap::Args, Clone)]
pub struct ListOptions {
    /// Story type: top, new, best, ask, show, job
    #[arg(value_name = "TYPE", default_value = "top")]
    pub story_type: CollectionType,

    /// Number of stories per page (defaults to the configured page size)
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Page number (1-indexed)
    #[arg(short, long, default_value = "1")]
    pub page: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(options: ListOptions, global: crate::Global) -> Result<()> {
    let resolver = global.resolver(options.limit)?;

    if global.verbose {
        println!(
            "Fetching {} stories from {}...",
            options.story_type,
            resolver.config().api_base
        );
    }

    let list_output = list_items_data(&resolver, options.story_type, options.page).await?;

    if options.json {
        output_json(&list_output)?;
    } else {
        print!("{}", format_list_text(&list_output));
    }

    Ok(())
}

/// Open a collection and resolve the requested page of it
///
/// Opening always fetches the current ranking, so two calls for consecutive
/// pages may see a different ordering.
pub async fn list_items_data(
    resolver: &Resolver,
    story_type: CollectionType,
    page: usize,
) -> Result<ListOutput> {
    let limit = resolver.config().page_size;
    let snapshot = resolver.open_collection(story_type).await?;

    let resolved = resolver
        .next_page(&snapshot, cursor_for_page(page, limit), limit)
        .await?;

    Ok(transform_page(&resolved, &snapshot, limit, Utc::now()))
}

/// Convert list output to JSON string
fn format_list_json(output: &ListOutput) -> Result<String> {
    serde_json::to_string_pretty(output).map_err(|e| eyre!("JSON serialization failed: {}", e))
}

fn output_json(output: &ListOutput) -> Result<()> {
    let json = format_list_json(output)?;
    println!("{}", json);
    Ok(())
}

/// Render stories with their rank, metadata and the command to read them
pub fn format_items(items: &[ListItem]) -> String {
    let mut result = String::new();

    for item in items {
        result.push_str(&format!(
            "\n{} {}\n",
            format!("[{}]", item.rank).yellow().bold(),
            item.title
                .as_deref()
                .unwrap_or("(No title)")
                .white()
                .bold()
        ));

        if let Some(url) = &item.url {
            result.push_str(&format!(
                "    {}: {}\n",
                "URL".green(),
                url.cyan().underline()
            ));
        }

        result.push_str(&format!(
            "    {}: {} | {}: {} | {}: {} | {}: {}\n",
            "By".green(),
            item.author.as_deref().unwrap_or("unknown").bright_white(),
            "Score".green(),
            item.score.unwrap_or(0).to_string().bright_yellow(),
            "Comments".green(),
            item.comments.unwrap_or(0).to_string().bright_magenta(),
            "Age".green(),
            item.age.as_deref().unwrap_or("unknown").bright_black()
        ));

        result.push_str(&format!(
            "    {}: {} | {}: {}\n",
            "ID".green(),
            item.id.to_string().bright_white(),
            "Read".green(),
            format!("hnpager read {}", item.id).cyan()
        ));
    }

    result
}

/// Convert list output to formatted text with colors
fn format_list_text(output: &ListOutput) -> String {
    let mut result = String::new();
    let pagination = &output.pagination;

    // Header
    result.push_str(&format!("\n{}\n", "=".repeat(80).bright_cyan()));
    result.push_str(&format!(
        "{}\n",
        format!(
            "HACKERNEWS {} STORIES (Page {} of {})",
            output.story_type.to_uppercase(),
            pagination.current_page,
            pagination.total_pages
        )
        .bright_cyan()
        .bold()
    ));
    result.push_str(&format!("{}\n", "=".repeat(80).bright_cyan()));

    if output.items.is_empty() {
        result.push_str(&format!("\n{}\n", "No stories on this page.".yellow()));
    } else {
        result.push_str(&format_items(&output.items));
    }

    // Navigation section
    result.push_str(&format!("\n{}\n", "=".repeat(80).bright_yellow()));
    result.push_str(&format!("{}\n", "NAVIGATION".bright_yellow().bold()));
    result.push_str(&format!("{}\n", "=".repeat(80).bright_yellow()));

    result.push_str(&format!(
        "\n{} {} {} {} ({} {} {} {})\n",
        "Showing page".bright_white(),
        pagination.current_page.to_string().bright_cyan().bold(),
        "of".bright_white(),
        pagination.total_pages.to_string().bright_cyan().bold(),
        pagination.total_items.to_string().bright_cyan().bold(),
        "total".bright_white(),
        output.story_type.bright_cyan().bold(),
        "stories".bright_white()
    ));

    result.push_str(&format!("\n{}:\n", "To navigate".bright_white().bold()));
    if let Some(next) = &pagination.next_page_command {
        result.push_str(&format!("  {}: {}\n", "Next page".green(), next.cyan()));
    }
    if let Some(prev) = &pagination.prev_page_command {
        result.push_str(&format!("  {}: {}\n", "Previous page".green(), prev.cyan()));
    }
    result.push_str(&format!(
        "  {}: {}\n",
        "Browse interactively".green(),
        format!("hnpager browse {}", output.story_type).cyan()
    ));

    result.push_str(&format!(
        "\n{}:\n",
        "To change page size".bright_white().bold()
    ));
    result.push_str(&format!(
        "  {}\n",
        format!("hnpager list {} --limit <number>", output.story_type).cyan()
    ));

    result.push_str(&format!("\n{}:\n", "To read a story".bright_white().bold()));
    result.push_str(&format!("  {}\n", "hnpager read <id>".cyan()));
    if let Some(first) = output.items.first() {
        result.push_str(&format!(
            "  {}: {}\n",
            "Example".green(),
            format!("hnpager read {}", first.id).cyan()
        ));
    }

    result.push('\n');
    result
}
