//! Channel listener: the ingestion orchestrator.
//!
//! Owns the connection lifecycle and a queue fed by the transport. A
//! polling task pushes reduced [`ChannelPost`] events into an mpsc channel;
//! a single consumer drains it sequentially, so the ordering and suspension
//! points of the pipeline (media fetch, catalog write) are explicit.

use std::sync::Arc;

use {
    secrecy::ExposeSecret,
    teloxide::{
        ApiError, RequestError,
        prelude::*,
        types::{AllowedUpdate, Message, UpdateKind},
    },
    tokio::sync::mpsc,
    tokio_util::sync::CancellationToken,
    tracing::{debug, info, warn},
};

use dealwatch_catalog::{CatalogStore, upsert_batch};

use crate::{
    access,
    config::ChannelFeedConfig,
    error::{Error, Result},
    media::{self, MediaFetcher, TelegramMediaFetcher},
    parser,
};

/// Listener lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Disconnected,
    Connecting,
    Synchronizing,
    Listening,
    Stopped,
}

impl std::fmt::Display for ListenerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Synchronizing => "synchronizing",
            Self::Listening => "listening",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// A channel post reduced to what ingestion needs.
#[derive(Debug, Clone)]
pub struct ChannelPost {
    /// Message text, or the caption for photo posts.
    pub text: String,
    /// Public handle in `@name` form, when the chat has one.
    pub handle: Option<String>,
    /// Numeric chat id as a decimal string.
    pub chat_id: String,
    /// File id of the largest size of the attached photo, if any.
    pub photo_file_id: Option<String>,
}

impl ChannelPost {
    /// Reduce a transport message. Returns `None` for messages carrying
    /// neither text nor a caption — those hold no deal.
    fn from_message(msg: &Message) -> Option<Self> {
        let text = msg.text().or_else(|| msg.caption())?;
        Some(Self {
            text: text.to_string(),
            handle: msg.chat.username().map(|name| format!("@{name}")),
            chat_id: msg.chat.id.0.to_string(),
            photo_file_id: msg
                .photo()
                .and_then(|sizes| sizes.last())
                .map(|size| size.file.id.clone()),
        })
    }
}

/// Listens to the configured channels and drives the ingestion pipeline.
///
/// The catalog store is injected at construction, so tests can substitute
/// an in-memory fake for the SQLite store.
pub struct Listener {
    config: ChannelFeedConfig,
    store: Arc<dyn CatalogStore>,
}

impl Listener {
    #[must_use]
    pub fn new(config: ChannelFeedConfig, store: Arc<dyn CatalogStore>) -> Self {
        Self { config, store }
    }

    /// Run the listener until cancelled.
    ///
    /// Returns `Ok(())` on cancellation. A connection failure or a closed
    /// update feed returns `Err`; restarting is the supervisor's concern,
    /// not this loop's.
    pub async fn run(&self, cancel: CancellationToken) -> Result<()> {
        info!(state = %ListenerState::Connecting, "connecting to Telegram");

        // Client timeout longer than the long-poll timeout so the HTTP
        // request isn't aborted before Telegram responds.
        let client = teloxide::net::default_reqwest_settings()
            .timeout(std::time::Duration::from_secs(
                u64::from(self.config.poll_timeout_secs) + 15,
            ))
            .build()?;
        let bot = Bot::with_client(self.config.token.expose_secret(), client);
        let me = bot.get_me().await?;

        info!(
            state = %ListenerState::Synchronizing,
            username = ?me.username,
            "connected, clearing webhook so long polling receives updates"
        );
        bot.delete_webhook().send().await?;

        let fetcher = TelegramMediaFetcher::new(
            bot.clone(),
            std::time::Duration::from_secs(self.config.media_timeout_secs),
        )?;

        let (tx, mut rx) = mpsc::channel(64);
        tokio::spawn(poll_updates(
            bot,
            tx,
            self.config.poll_timeout_secs,
            cancel.clone(),
        ));

        info!(
            state = %ListenerState::Listening,
            channels = ?self.config.allowlist,
            "waiting for deals"
        );
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    info!(state = %ListenerState::Stopped, "listener cancelled");
                    return Ok(());
                },
                post = rx.recv() => match post {
                    Some(post) => {
                        handle_post(
                            &post,
                            &self.config.allowlist,
                            &fetcher,
                            self.store.as_ref(),
                        )
                        .await;
                    },
                    None => return Err(Error::message("update feed closed")),
                },
            }
        }
    }
}

/// Transport task: long-poll `getUpdates` and feed posts into the queue.
///
/// Ends when cancelled, when the consumer is gone, or when another instance
/// claims the token (`getUpdates` conflict) — ending the task closes the
/// queue, which the consumer surfaces as an error.
async fn poll_updates(
    bot: Bot,
    tx: mpsc::Sender<ChannelPost>,
    poll_timeout_secs: u32,
    cancel: CancellationToken,
) {
    let mut offset: i32 = 0;

    loop {
        if cancel.is_cancelled() {
            debug!("polling stopped");
            return;
        }

        let result = bot
            .get_updates()
            .offset(offset)
            .timeout(poll_timeout_secs)
            .allowed_updates(vec![AllowedUpdate::Message, AllowedUpdate::ChannelPost])
            .await;

        match result {
            Ok(updates) => {
                for update in updates {
                    offset = update.id.as_offset();
                    let msg = match update.kind {
                        UpdateKind::Message(msg) | UpdateKind::ChannelPost(msg) => msg,
                        other => {
                            debug!("ignoring non-post update: {other:?}");
                            continue;
                        },
                    };
                    let Some(post) = ChannelPost::from_message(&msg) else {
                        continue;
                    };
                    if tx.send(post).await.is_err() {
                        return;
                    }
                }
            },
            Err(e) => {
                if matches!(&e, RequestError::Api(ApiError::TerminatedByOtherGetUpdates)) {
                    warn!("another instance is polling with this token, stopping");
                    return;
                }
                warn!(error = %e, "getUpdates failed");
                tokio::time::sleep(std::time::Duration::from_secs(5)).await;
            },
        }
    }
}

/// Run one post through the pipeline: filter, resolve media, parse, persist.
///
/// Failures are absorbed here; a bad post must never take down the
/// listener.
async fn handle_post(
    post: &ChannelPost,
    allowlist: &[String],
    fetcher: &dyn MediaFetcher,
    store: &dyn CatalogStore,
) {
    if !access::is_tracked(post.handle.as_deref(), Some(&post.chat_id), allowlist) {
        debug!(
            handle = ?post.handle,
            chat_id = %post.chat_id,
            "ignoring post from untracked channel"
        );
        return;
    }

    let source = post.handle.clone().unwrap_or_else(|| post.chat_id.clone());
    info!(source = %source, "new deal post");

    let image = media::resolve_image(fetcher, post.photo_file_id.as_deref()).await;

    let mut products = parser::parse_deals(&post.text);
    if products.is_empty() {
        debug!(source = %source, "no deals found in post");
        return;
    }
    for product in &mut products {
        product.image = image.clone();
    }

    let saved = upsert_batch(store, &products).await;
    info!(
        source = %source,
        candidates = products.len(),
        saved,
        "ingested post"
    );
}
