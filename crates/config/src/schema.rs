use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DealwatchConfig {
    pub telegram: TelegramSection,
    pub catalog: CatalogSection,
}

/// Telegram transport and channel subscription settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TelegramSection {
    /// Bot token. Usually written as `${DEALWATCH_TG_TOKEN}` in the file and
    /// substituted from the environment at load time.
    pub token: String,

    /// Comma-separated channel allow-list: `@handles` and/or numeric chat
    /// ids, e.g. `"@dealschannel, -1001234567890"`.
    pub channels: String,

    /// Long-poll timeout passed to `getUpdates`, in seconds.
    pub poll_timeout_secs: u32,

    /// Bound on a single photo download, in seconds.
    pub media_timeout_secs: u64,
}

impl Default for TelegramSection {
    fn default() -> Self {
        Self {
            token: String::new(),
            channels: String::new(),
            poll_timeout_secs: 30,
            media_timeout_secs: 20,
        }
    }
}

impl TelegramSection {
    /// The allow-list in normalized form: entries trimmed, lowercased, and
    /// empties dropped. The channel filter compares against this form.
    #[must_use]
    pub fn allowlist(&self) -> Vec<String> {
        self.channels
            .split(',')
            .map(|entry| entry.trim().to_lowercase())
            .filter(|entry| !entry.is_empty())
            .collect()
    }
}

/// Catalog storage settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CatalogSection {
    /// Path of the SQLite database file.
    pub database_path: PathBuf,
}

impl Default for CatalogSection {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("dealwatch.db"),
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let cfg = DealwatchConfig::default();
        assert!(cfg.telegram.token.is_empty());
        assert_eq!(cfg.telegram.poll_timeout_secs, 30);
        assert_eq!(cfg.telegram.media_timeout_secs, 20);
        assert_eq!(cfg.catalog.database_path, PathBuf::from("dealwatch.db"));
        assert!(cfg.telegram.allowlist().is_empty());
    }

    #[test]
    fn allowlist_is_normalized() {
        let section = TelegramSection {
            channels: " @DealsChannel , -1001234567890 ,, @Other ".into(),
            ..Default::default()
        };
        assert_eq!(
            section.allowlist(),
            vec!["@dealschannel", "-1001234567890", "@other"]
        );
    }

    #[test]
    fn deserialize_with_partial_fields() {
        let toml = r#"
            [telegram]
            token = "123:ABC"
            channels = "@deals"
        "#;
        let cfg: DealwatchConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.telegram.token, "123:ABC");
        assert_eq!(cfg.telegram.allowlist(), vec!["@deals"]);
        // defaults for unspecified fields
        assert_eq!(cfg.telegram.poll_timeout_secs, 30);
        assert_eq!(cfg.catalog.database_path, PathBuf::from("dealwatch.db"));
    }
}
