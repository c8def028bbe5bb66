use crate::prelude::*;
use hnpager_core::{ConfigOverrides, ResolverConfig};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Get the default location of the configuration file
fn default_config_path() -> Option<PathBuf> {
    dirs_next::config_dir().map(|dir| dir.join("hnpager").join("config.toml"))
}

/// Read the overrides stored in a configuration file
///
/// A missing file is only an error when the path was asked for explicitly.
fn load_file(path: &Path, required: bool) -> FetchResult<ConfigOverrides> {
    match fs::read_to_string(path) {
        Ok(contents) => {
            debug!("Loaded config from {}", path.display());
            Ok(ConfigOverrides::from_toml(&contents)?)
        }
        Err(e) if e.kind() == ErrorKind::NotFound && !required => {
            debug!("No config file at {}", path.display());
            Ok(ConfigOverrides::default())
        }
        Err(e) => Err(Error::ConfigFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }),
    }
}

/// Merge defaults, the file layer, the environment layer and the command line layer
fn layered(
    file: ConfigOverrides,
    env: ConfigOverrides,
    cli: ConfigOverrides,
) -> FetchResult<ResolverConfig> {
    Ok(ResolverConfig::default()
        .with_overrides(file)
        .with_overrides(env)
        .with_overrides(cli)
        .validate()?)
}

/// Build the resolver configuration for this process
///
/// `explicit_path` comes from `--config` / `HNPAGER_CONFIG`; without it the
/// platform config directory is consulted.
pub fn load(explicit_path: Option<&Path>, cli: ConfigOverrides) -> FetchResult<ResolverConfig> {
    let file = match explicit_path {
        Some(path) => load_file(path, true)?,
        None => match default_config_path() {
            Some(path) => load_file(&path, false)?,
            None => ConfigOverrides::default(),
        },
    };

    let env = ConfigOverrides::from_env_lookup(|key| std::env::var(key).ok())?;

    layered(file, env, cli)
}
