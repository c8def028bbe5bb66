//! Interactive paging through a collection
//!
//! Each browse keeps one [`Session`], so every page comes from the snapshot
//! taken when the collection was opened. Pages are appended to what has been
//! shown so far; `r` throws the snapshot away and starts over from the
//! current ranking.

use crate::prelude::{eprintln, println, *};
use crate::read::{format_post_text, read_item_data};
use crate::resolver::Resolver;
use crate::session::Session;
use chrono::Utc;
use colored::Colorize;
use hnpager_core::hn::{transform_page, ListItem};
use hnpager_core::CollectionType;
use std::future::Future;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};

#[derive(Debug, clap::Args, Clone)]
pub struct BrowseOptions {
    /// Story type: top, new, best, ask, show, job
    #[arg(value_name = "TYPE", default_value = "top")]
    pub story_type: CollectionType,

    /// Number of stories per page (defaults to the configured page size)
    #[arg(short, long)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Next,
    Refresh,
    Switch(CollectionType),
    Open(usize),
    Help,
    Quit,
}

/// Parse one line typed at the browse prompt
fn parse_command(input: &str) -> std::result::Result<Command, String> {
    let mut words = input.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(Command::Next);
    };
    let arg = words.next();

    match (head.to_ascii_lowercase().as_str(), arg) {
        ("n" | "next", None) => Ok(Command::Next),
        ("r" | "refresh", None) => Ok(Command::Refresh),
        ("h" | "help" | "?", None) => Ok(Command::Help),
        ("q" | "quit" | "exit", None) => Ok(Command::Quit),
        ("t" | "type", Some(kind)) => kind
            .parse::<CollectionType>()
            .map(Command::Switch)
            .map_err(|e| e.to_string()),
        ("t" | "type", None) => Err("Usage: t <top|new|best|ask|show|job>".to_string()),
        ("o" | "open", Some(rank)) => parse_rank(rank).map(Command::Open),
        ("o" | "open", None) => Err("Usage: o <rank>".to_string()),
        (other, None) if other.chars().all(|c| c.is_ascii_digit()) => {
            parse_rank(other).map(Command::Open)
        }
        _ => Err(format!("Unknown command: {}", input.trim())),
    }
}

fn parse_rank(raw: &str) -> std::result::Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(rank) if rank > 0 => Ok(rank),
        _ => Err(format!("Invalid rank: {raw}")),
    }
}

fn help_text() -> String {
    let mut result = String::new();
    result.push_str(&format!("\n{}\n", "COMMANDS".bright_yellow().bold()));
    for (keys, what) in [
        ("n, <enter>", "load the next page"),
        ("r", "refresh the ranking and start over"),
        ("t <type>", "switch to top, new, best, ask, show or job"),
        ("o <rank>, <rank>", "read a story shown above"),
        ("h", "show this help"),
        ("q", "quit"),
    ] {
        result.push_str(&format!("  {} {}\n", format!("{keys:<18}").cyan(), what));
    }
    result.push_str(&format!(
        "  {}\n",
        "Ctrl-C cancels a running request; at the prompt it quits.".bright_black()
    ));
    result
}

fn page_footer(session: &Session, shown: usize) -> String {
    let total = session.snapshot().len();
    let status = format!("Showing {shown} of {total} {} stories", session.collection());
    if session.is_exhausted() {
        format!("\n{} {}\n", status.bright_white(), "(end)".bright_black())
    } else {
        format!(
            "\n{} {}\n",
            status.bright_white(),
            "(n for more)".bright_black()
        )
    }
}

/// Completes when Ctrl-C is pressed; never completes if the handler cannot be installed
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Unable to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}

/// Run `work` unless `abandon` completes first
///
/// `work` is dropped when abandoned, so it must only change state once it has
/// finished.
async fn or_abandon<T, W, A>(work: W, abandon: A) -> Option<T>
where
    W: Future<Output = T>,
    A: Future<Output = ()>,
{
    tokio::select! {
        out = work => Some(out),
        _ = abandon => None,
    }
}

/// Read one prompt line into `line`
///
/// Returns `Ok(false)` at EOF or when `interrupt` completes before a line arrives.
async fn read_prompt<R, A>(reader: &mut R, line: &mut String, interrupt: A) -> std::io::Result<bool>
where
    R: AsyncBufRead + Unpin,
    A: Future<Output = ()>,
{
    line.clear();
    match or_abandon(reader.read_line(line), interrupt).await {
        Some(read) => Ok(read? > 0),
        None => {
            println!();
            Ok(false)
        }
    }
}

/// Load the page at the session cursor and append it to `shown`
///
/// A failed or cancelled page leaves both the session and `shown` as they
/// were, so `n` retries the same page.
async fn load_next(session: &mut Session, shown: &mut Vec<ListItem>) {
    if session.is_exhausted() {
        println!("{}", "No more stories. Press r to refresh.".yellow());
        return;
    }

    match session.next_page_or_abandon(ctrl_c()).await {
        Ok(Some(page)) => {
            let output = transform_page(&page, session.snapshot(), session.page_size(), Utc::now());
            print!("{}", crate::list::format_items(&output.items));
            shown.extend(output.items);
            print!("{}", page_footer(session, shown.len()));
        }
        Ok(None) => {
            println!("\n{}", "Cancelled. Press n to try again.".yellow());
        }
        Err(e) => {
            eprintln!("\n{} {e}", "Could not load stories:".red().bold());
            if e.is_fetch_failure() {
                eprintln!(
                    "{}",
                    format!("Press n to retry from story {}.", session.cursor().offset() + 1)
                        .yellow()
                );
            }
        }
    }
}

async fn open_rank<A>(resolver: &Resolver, shown: &[ListItem], rank: usize, abandon: A)
where
    A: Future<Output = ()>,
{
    let Some(item) = shown.iter().find(|item| item.rank == rank) else {
        eprintln!("{}", format!("No story with rank {rank} on screen.").yellow());
        return;
    };

    match or_abandon(read_item_data(resolver, item.id, 1), abandon).await {
        Some(Ok(post)) => print!("{}", format_post_text(&post)),
        Some(Err(e)) => eprintln!("{} {e}", "Could not read story:".red().bold()),
        None => println!("\n{}", "Cancelled.".yellow()),
    }
}

pub async fn run(options: BrowseOptions, global: crate::Global) -> Result<()> {
    let resolver = global.resolver(options.limit)?;
    let page_size = resolver.config().page_size;

    if global.verbose {
        println!(
            "Browsing {} stories from {}...",
            options.story_type,
            resolver.config().api_base
        );
    }

    let mut session = Session::open(resolver.clone(), options.story_type, page_size).await?;
    let mut shown: Vec<ListItem> = Vec::new();

    println!(
        "\n{}",
        format!("HACKERNEWS {} STORIES", session.collection().name().to_uppercase())
            .bright_cyan()
            .bold()
    );
    load_next(&mut session, &mut shown).await;

    let mut stdout = tokio::io::stdout();
    let mut reader = BufReader::new(tokio::io::stdin());
    let mut line = String::new();

    loop {
        stdout
            .write_all(format!("{} ", ">".bright_cyan()).as_bytes())
            .await?;
        stdout.flush().await?;

        if !read_prompt(&mut reader, &mut line, ctrl_c()).await? {
            break; // EOF or Ctrl-C
        }

        match parse_command(&line) {
            Ok(Command::Next) => load_next(&mut session, &mut shown).await,
            Ok(Command::Refresh) => match or_abandon(session.refresh(), ctrl_c()).await {
                Some(Ok(())) => {
                    shown.clear();
                    load_next(&mut session, &mut shown).await;
                }
                Some(Err(e)) => eprintln!("{} {e}", "Could not refresh:".red().bold()),
                None => println!("\n{}", "Refresh cancelled.".yellow()),
            },
            Ok(Command::Switch(collection)) => {
                let opening = Session::open(resolver.clone(), collection, page_size);
                match or_abandon(opening, ctrl_c()).await {
                    Some(Ok(opened)) => {
                        session = opened;
                        shown.clear();
                        println!(
                            "\n{}",
                            format!("HACKERNEWS {} STORIES", collection.name().to_uppercase())
                                .bright_cyan()
                                .bold()
                        );
                        load_next(&mut session, &mut shown).await;
                    }
                    Some(Err(e)) => {
                        eprintln!("{} {e}", "Could not open collection:".red().bold())
                    }
                    None => println!("\n{}", "Switch cancelled.".yellow()),
                }
            }
            Ok(Command::Open(rank)) => open_rank(&resolver, &shown, rank, ctrl_c()).await,
            Ok(Command::Help) => print!("{}", help_text()),
            Ok(Command::Quit) => break,
            Err(message) => eprintln!("{} {}", message.yellow(), "(h for help)".bright_black()),
        }
    }

    Ok(())
}
