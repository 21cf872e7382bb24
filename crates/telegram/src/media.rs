//! Photo resolution for deal posts.
//!
//! Posts usually carry the product shot as an attached photo. Fetched bytes
//! are inlined as a data URI so catalog records stay displayable without a
//! live Telegram session; any fetch problem falls back to a fixed
//! placeholder and never reaches the caller.

use {
    async_trait::async_trait,
    base64::Engine,
    teloxide::{Bot, prelude::Requester},
    tracing::warn,
};

use crate::error::{Error, Result};

/// Image reference used when a post has no photo or the fetch fails.
pub const PLACEHOLDER_IMAGE: &str = "https://picsum.photos/500";

/// Media-fetch capability supplied by the hosting transport.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Fetch the raw bytes of a file by its transport file id.
    async fn fetch(&self, file_id: &str) -> Result<Vec<u8>>;
}

/// Fetches photos through the Bot API file endpoint.
pub struct TelegramMediaFetcher {
    bot: Bot,
    http: reqwest::Client,
}

impl TelegramMediaFetcher {
    /// `timeout` bounds a single download so a slow fetch cannot stall the
    /// listener's event queue.
    pub fn new(bot: Bot, timeout: std::time::Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { bot, http })
    }
}

#[async_trait]
impl MediaFetcher for TelegramMediaFetcher {
    async fn fetch(&self, file_id: &str) -> Result<Vec<u8>> {
        let file = self.bot.get_file(file_id).await?;

        // File URL format: https://api.telegram.org/file/bot<token>/<file_path>
        let url = format!(
            "https://api.telegram.org/file/bot{}/{}",
            self.bot.token(),
            file.path
        );

        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(Error::message(format!(
                "file download failed: HTTP {}",
                response.status()
            )));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

/// Resolve a post's photo into a displayable image reference.
///
/// Success inlines the bytes as a base64 JPEG data URI (Telegram photos are
/// JPEG). No photo, an empty payload, or any fetch error resolves to
/// [`PLACEHOLDER_IMAGE`].
pub async fn resolve_image(fetcher: &dyn MediaFetcher, file_id: Option<&str>) -> String {
    let Some(file_id) = file_id else {
        return PLACEHOLDER_IMAGE.to_string();
    };
    match fetcher.fetch(file_id).await {
        Ok(bytes) if bytes.is_empty() => {
            warn!(file_id, "photo download returned no data");
            PLACEHOLDER_IMAGE.to_string()
        },
        Ok(bytes) => format!(
            "data:image/jpeg;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&bytes)
        ),
        Err(e) => {
            warn!(file_id, error = %e, "failed to fetch photo, using placeholder");
            PLACEHOLDER_IMAGE.to_string()
        },
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    struct FixedFetcher(Vec<u8>);

    #[async_trait]
    impl MediaFetcher for FixedFetcher {
        async fn fetch(&self, _file_id: &str) -> Result<Vec<u8>> {
            Ok(self.0.clone())
        }
    }

    struct FailingFetcher;

    #[async_trait]
    impl MediaFetcher for FailingFetcher {
        async fn fetch(&self, _file_id: &str) -> Result<Vec<u8>> {
            Err(Error::message("network down"))
        }
    }

    #[tokio::test]
    async fn no_photo_resolves_to_placeholder() {
        let resolved = resolve_image(&FixedFetcher(vec![1, 2, 3]), None).await;
        assert_eq!(resolved, PLACEHOLDER_IMAGE);
    }

    #[tokio::test]
    async fn photo_bytes_become_data_uri() {
        let resolved = resolve_image(&FixedFetcher(vec![0xFF, 0xD8, 0xFF]), Some("file-1")).await;
        assert_eq!(resolved, "data:image/jpeg;base64,/9j/");
    }

    #[tokio::test]
    async fn fetch_failure_is_absorbed() {
        let resolved = resolve_image(&FailingFetcher, Some("file-1")).await;
        assert_eq!(resolved, PLACEHOLDER_IMAGE);
    }

    #[tokio::test]
    async fn empty_payload_resolves_to_placeholder() {
        let resolved = resolve_image(&FixedFetcher(Vec::new()), Some("file-1")).await;
        assert_eq!(resolved, PLACEHOLDER_IMAGE);
    }
}
