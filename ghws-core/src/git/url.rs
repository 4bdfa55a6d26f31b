//! Remote URL helpers: credential embedding and redaction

use url::Url;

/// Placeholder written over credentials in displayed URLs
const REDACTED: &str = "***";

/// Whether `input` is the scp-like ssh form (`git@host:owner/repo.git`)
fn is_scp_like(input: &str) -> bool {
    !input.contains("://") && input.contains('@') && input.contains(':')
}

fn has_credentials(url: &Url) -> bool {
    !url.username().is_empty() || url.password().is_some()
}

/// Whether the URL is the plain, unauthenticated `https://host/...` form
pub fn is_plain_https(input: &str) -> bool {
    match Url::parse(input) {
        Ok(url) => url.scheme() == "https" && url.has_host() && !has_credentials(&url),
        Err(_) => false,
    }
}

/// Embed `token` as the user segment of a plain `https://` URL
///
/// Any other URL (ssh, file, http, or https that already carries a `user@`
/// segment) is returned unchanged, so applying this twice equals applying it
/// once.
pub fn embed_token(input: &str, token: &str) -> String {
    if !is_plain_https(input) {
        return input.to_string();
    }
    let Ok(mut url) = Url::parse(input) else {
        return input.to_string();
    };
    match url.set_username(token) {
        Ok(()) => url.to_string(),
        Err(()) => input.to_string(),
    }
}

/// Replace any userinfo in the URL with `***` so it can be printed or logged
///
/// URLs without credentials, and anything that does not parse, come back as
/// given.
pub fn redact(input: &str) -> String {
    let Ok(mut url) = Url::parse(input) else {
        return input.to_string();
    };
    if !has_credentials(&url) {
        return input.to_string();
    }
    if url.set_password(None).is_err() || url.set_username(REDACTED).is_err() {
        return REDACTED.to_string();
    }
    url.to_string()
}

/// Validate that a URL parses, returning a configuration-friendly message otherwise
pub fn check_remote_url(input: &str) -> std::result::Result<(), String> {
    // git accepts the scp-like form even though it is not a URL
    if is_scp_like(input) {
        return Ok(());
    }
    Url::parse(input)
        .map(|_| ())
        .map_err(|e| format!("Invalid remote URL {}: {}", redact(input), e))
}
