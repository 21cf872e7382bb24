use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::expect_used)] // pattern is a compile-time constant
static VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("env var pattern"));

/// Replace `${ENV_VAR}` placeholders in config text.
///
/// Unresolvable variables are left as-is so the failure surfaces where the
/// value is used, not as silently-empty config.
#[must_use]
pub fn substitute_env(input: &str) -> String {
    substitute_env_with(input, |name| std::env::var(name).ok())
}

/// Replace `${ENV_VAR}` placeholders using a custom lookup function.
///
/// This is the implementation behind [`substitute_env`]; the separate
/// signature makes it testable without mutating the process environment.
fn substitute_env_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    VAR_RE
        .replace_all(input, |caps: &regex::Captures<'_>| {
            lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
