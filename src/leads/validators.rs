use std::sync::LazyLock;

use gpui::SharedString;
use regex::Regex;

static HANDLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._]{1,30}$").expect("handle pattern must compile"));

/// Accepts absolute http(s) links with a host.
pub fn validate_url(value: &str) -> Option<SharedString> {
    let value = value.trim();
    let host = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"))
        .and_then(|rest| rest.split(['/', '?', '#']).next())
        .filter(|host| host.contains('.') && !host.contains(char::is_whitespace));
    host.is_none().then(|| "leads.error.url".into())
}

/// Instagram-style handle, without the leading `@`.
pub fn validate_handle(value: &str) -> Option<SharedString> {
    (!HANDLE_PATTERN.is_match(value.trim())).then(|| "leads.error.handle".into())
}
