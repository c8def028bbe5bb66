use crate::prelude::*;
use crate::resolver::Resolver;
use clap::Parser;
use hnpager_core::ConfigOverrides;
use std::path::PathBuf;

mod browse;
mod config;
mod error;
mod list;
mod prelude;
mod read;
mod resolver;
mod session;

#[cfg(test)]
mod testing;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Page through Hacker News stories and comments from the terminal"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Whether to display additional information.
    #[clap(long, env = "HNPAGER_VERBOSE", global = true, default_value = "false")]
    verbose: bool,

    /// Configuration file (defaults to <config dir>/hnpager/config.toml)
    #[clap(long, env = "HNPAGER_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Hacker News API base URL
    #[clap(long, global = true)]
    api_base: Option<String>,

    /// Maximum number of item requests in flight per page
    #[clap(long, global = true)]
    concurrency: Option<usize>,

    /// Per-request timeout in seconds
    #[clap(long, global = true)]
    timeout: Option<u64>,
}

impl Global {
    fn overrides(&self, page_size: Option<usize>) -> ConfigOverrides {
        ConfigOverrides {
            api_base: self.api_base.clone(),
            page_size,
            max_concurrency: self.concurrency,
            timeout_secs: self.timeout,
            ..Default::default()
        }
    }

    /// Build a resolver from the layered configuration
    ///
    /// `page_size` is the subcommand's `--limit`, which wins over every other layer.
    pub fn resolver(&self, page_size: Option<usize>) -> Result<Resolver> {
        self.resolver_with(self.overrides(page_size))
    }

    pub fn resolver_with(&self, overrides: ConfigOverrides) -> Result<Resolver> {
        let config = crate::config::load(self.config.as_deref(), overrides)?;
        debug!("Resolver config: {config:?}");
        Ok(Resolver::new(config)?)
    }
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// List one page of a story collection (top, new, best, ask, show, job)
    List(crate::list::ListOptions),

    /// Read an item and one page of its top-level comments
    Read(crate::read::ReadOptions),

    /// Page through a collection interactively
    Browse(crate::browse::BrowseOptions),
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "hnpager=debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let app = App::parse();
    init_logging(app.global.verbose);

    match app.command {
        SubCommands::List(options) => crate::list::run(options, app.global).await,
        SubCommands::Read(options) => crate::read::run(options, app.global).await,
        SubCommands::Browse(options) => crate::browse::run(options, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
