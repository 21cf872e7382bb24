use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{env_subst::substitute_env, schema::DealwatchConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "dealwatch.toml",
    "dealwatch.yaml",
    "dealwatch.yml",
    "dealwatch.json",
];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<DealwatchConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Parse config text, choosing the format from the file extension.
fn parse_config(raw: &str, path: &Path) -> anyhow::Result<DealwatchConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");
    let config = match ext {
        "yaml" | "yml" => serde_yaml::from_str(raw)?,
        "json" => serde_json::from_str(raw)?,
        _ => toml::from_str(raw)?,
    };
    Ok(config)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./dealwatch.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/dealwatch/dealwatch.{toml,yaml,yml,json}` (user-global)
///
/// Returns `DealwatchConfig::default()` if no config file is found. Callers
/// apply [`apply_env_overrides`] on top.
#[must_use]
pub fn discover_and_load() -> DealwatchConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    DealwatchConfig::default()
}

/// Find the first config file in standard locations.
fn find_config_file() -> Option<PathBuf> {
    // Project-local
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    // User-global: ~/.config/dealwatch/
    if let Some(dirs) = directories::ProjectDirs::from("", "", "dealwatch") {
        let config_dir = dirs.config_dir();
        for name in CONFIG_FILENAMES {
            let p = config_dir.join(name);
            if p.exists() {
                return Some(p);
            }
        }
    }

    None
}

/// Apply `DEALWATCH_*` environment overrides on top of a loaded config.
pub fn apply_env_overrides(config: &mut DealwatchConfig) {
    apply_env_overrides_with(config, |name| std::env::var(name).ok());
}

fn apply_env_overrides_with(
    config: &mut DealwatchConfig,
    lookup: impl Fn(&str) -> Option<String>,
) {
    if let Some(token) = lookup("DEALWATCH_TG_TOKEN")
        && !token.is_empty()
    {
        config.telegram.token = token;
    }
    if let Some(channels) = lookup("DEALWATCH_TG_CHANNELS")
        && !channels.is_empty()
    {
        config.telegram.channels = channels;
    }
    if let Some(db) = lookup("DEALWATCH_DB")
        && !db.is_empty()
    {
        config.catalog.database_path = PathBuf::from(db);
    }
}
