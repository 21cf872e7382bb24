use secrecy::Secret;

/// Configuration for the channel feed listener.
#[derive(Clone)]
pub struct ChannelFeedConfig {
    /// Bot token from @BotFather.
    pub token: Secret<String>,

    /// Normalized (trimmed, lowercased) channel allow-list: handles in the
    /// `@name` form and/or numeric chat ids as decimal strings.
    pub allowlist: Vec<String>,

    /// Long-poll timeout passed to `getUpdates`, in seconds.
    pub poll_timeout_secs: u32,

    /// Bound on a single photo download, in seconds.
    pub media_timeout_secs: u64,
}

impl std::fmt::Debug for ChannelFeedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelFeedConfig")
            .field("token", &"[REDACTED]")
            .field("allowlist", &self.allowlist)
            .finish_non_exhaustive()
    }
}

impl Default for ChannelFeedConfig {
    fn default() -> Self {
        Self {
            token: Secret::new(String::new()),
            allowlist: Vec::new(),
            poll_timeout_secs: 30,
            media_timeout_secs: 20,
        }
    }
}
