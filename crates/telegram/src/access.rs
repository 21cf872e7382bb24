//! Channel allow-list gating.

/// Decide whether a post should be ingested, from its source identity.
///
/// `handle` is the channel's public handle in prefixed form (`@name`);
/// `chat_id` is the numeric chat id rendered as a decimal string. The
/// source is tracked if either identity is on the allow-list. Comparison
/// is case-insensitive; the allow-list must already be lowercased.
///
/// An empty allow-list tracks nothing — this is a subscription list, not
/// an access gate. A post carrying neither identity is out of scope.
#[must_use]
pub fn is_tracked(handle: Option<&str>, chat_id: Option<&str>, allowlist: &[String]) -> bool {
    let listed = |id: &str| {
        let id = id.to_lowercase();
        allowlist.iter().any(|entry| *entry == id)
    };
    handle.is_some_and(&listed) || chat_id.is_some_and(&listed)
}
