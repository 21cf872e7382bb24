//! Configuration loading for dealwatch.
//!
//! Config files: `dealwatch.toml`, `dealwatch.yaml`, or `dealwatch.json`,
//! searched in `./` then `~/.config/dealwatch/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values; `DEALWATCH_*`
//! variables override individual fields after the file is loaded.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{apply_env_overrides, discover_and_load, load_config},
    schema::{CatalogSection, DealwatchConfig, TelegramSection},
};
