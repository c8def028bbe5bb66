//! Resolver configuration
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! environment variables, then command line flags. Each layer is a
//! [`ConfigOverrides`] where `None` means "keep what the lower layer said".
//! Reading the file and the environment is left to the shell; this module
//! only parses and merges.

use serde::{Deserialize, Serialize};

use crate::collection::CollectionType;
use crate::item::ItemId;

pub const DEFAULT_API_BASE: &str = "https://hacker-news.firebaseio.com/v0";
pub const DEFAULT_PAGE_SIZE: usize = 30;
pub const DEFAULT_MAX_CONCURRENCY: usize = 16;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_THREAD_DEPTH: usize = 3;

/// Environment variables read by [`ConfigOverrides::from_env_lookup`]
pub const ENV_API_BASE: &str = "HN_API_BASE";
pub const ENV_PAGE_SIZE: &str = "HN_LIMIT";
pub const ENV_MAX_CONCURRENCY: &str = "HN_CONCURRENCY";
pub const ENV_TIMEOUT_SECS: &str = "HN_TIMEOUT";
pub const ENV_USER_AGENT: &str = "HN_USER_AGENT";
pub const ENV_THREAD_DEPTH: &str = "HN_THREAD_DEPTH";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration file: {0}")]
    File(#[from] toml::de::Error),

    #[error("Invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

fn invalid(key: &str, value: impl ToString, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Fully resolved settings used to build a resolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolverConfig {
    /// Base URL of the API, without a trailing slash
    pub api_base: String,
    /// Items per page
    pub page_size: usize,
    /// Upper bound on item requests in flight for one page
    pub max_concurrency: usize,
    /// Per-request timeout
    pub timeout_secs: u64,
    pub user_agent: String,
    /// How many reply levels `read --thread` resolves
    pub thread_depth: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: format!("hnpager/{}", env!("CARGO_PKG_VERSION")),
            thread_depth: DEFAULT_THREAD_DEPTH,
        }
    }
}

impl ResolverConfig {
    /// Apply one override layer on top of this configuration
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(api_base) = overrides.api_base {
            self.api_base = api_base;
        }
        if let Some(page_size) = overrides.page_size {
            self.page_size = page_size;
        }
        if let Some(max_concurrency) = overrides.max_concurrency {
            self.max_concurrency = max_concurrency;
        }
        if let Some(timeout_secs) = overrides.timeout_secs {
            self.timeout_secs = timeout_secs;
        }
        if let Some(user_agent) = overrides.user_agent {
            self.user_agent = user_agent;
        }
        if let Some(thread_depth) = overrides.thread_depth {
            self.thread_depth = thread_depth;
        }
        self
    }

    /// Check invariants and normalize the base URL
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        let trimmed = self.api_base.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(invalid("api_base", &self.api_base, "must not be empty"));
        }
        self.api_base = trimmed.to_string();

        if self.page_size == 0 {
            return Err(invalid("page_size", self.page_size, "must be greater than zero"));
        }
        if self.max_concurrency == 0 {
            return Err(invalid(
                "max_concurrency",
                self.max_concurrency,
                "must be greater than zero",
            ));
        }
        if self.timeout_secs == 0 {
            return Err(invalid("timeout_secs", self.timeout_secs, "must be greater than zero"));
        }

        Ok(self)
    }

    pub fn collection_url(&self, collection: CollectionType) -> String {
        format!("{}/{}.json", self.api_base, collection.endpoint())
    }

    pub fn item_url(&self, id: ItemId) -> String {
        format!("{}/item/{id}.json", self.api_base)
    }
}

/// One layer of optional settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    pub api_base: Option<String>,
    pub page_size: Option<usize>,
    pub max_concurrency: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
    pub thread_depth: Option<usize>,
}

impl ConfigOverrides {
    /// Parse the contents of a `config.toml`
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Read overrides through `lookup`, typically `|key| std::env::var(key).ok()`
    ///
    /// Empty values are treated as unset.
    pub fn from_env_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Ok(Self {
            api_base: get(ENV_API_BASE),
            page_size: parse_number(ENV_PAGE_SIZE, get(ENV_PAGE_SIZE))?,
            max_concurrency: parse_number(ENV_MAX_CONCURRENCY, get(ENV_MAX_CONCURRENCY))?,
            timeout_secs: parse_number(ENV_TIMEOUT_SECS, get(ENV_TIMEOUT_SECS))?,
            user_agent: get(ENV_USER_AGENT),
            thread_depth: parse_number(ENV_THREAD_DEPTH, get(ENV_THREAD_DEPTH))?,
        })
    }
}

fn parse_number<T: std::str::FromStr>(
    key: &str,
    value: Option<String>,
) -> Result<Option<T>, ConfigError> {
    value
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|_| invalid(key, &raw, "expected a non-negative integer"))
        })
        .transpose()
}
