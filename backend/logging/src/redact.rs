//! Log Redaction Layer
//!
//! Scrubs API keys, bearer tokens and secret-looking option values from
//! strings prior to logging.

use regex::Regex;
use std::sync::LazyLock;

static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(sk-[a-zA-Z0-9_\-]{16,})|(Bearer\s+[a-zA-Z0-9\-\._~+/]+=*)").unwrap()
});

// `--token abc`, `--password="x y"`, `--api-key=k`
static SECRET_OPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(--(?:token|password|secret|api-key)(?:=|\s+))("[^"]*"|'[^']*'|\S+)"#).unwrap()
});

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = API_KEY_RE.replace_all(input, "[REDACTED_TOKEN]");
    SECRET_OPTION_RE
        .replace_all(&redacted, "${1}[REDACTED]")
        .into_owned()
}
