//! Connection URL redaction.
//!
//! Connection URLs carry credentials; logs only ever see the redacted form.

use url::Url;

const MASK: &str = "***";
const UNPARSEABLE: &str = "<unparseable>";

/// Replaces the password of a connection URL with `***`.
///
/// Both the userinfo password and a `password` query parameter are masked.
/// URLs without a password (`sqlite::memory:`) come back unchanged. Input
/// that does not parse as a URL is reduced to its scheme, so nothing after
/// the scheme ever reaches a log line.
pub fn redact_url(raw: &str) -> String {
    let mut url = match Url::parse(raw) {
        Ok(url) => url,
        Err(_) => return unparseable(raw),
    };

    if url.password().is_some() && url.set_password(Some(MASK)).is_err() {
        return unparseable(raw);
    }

    let has_query_password = url
        .query_pairs()
        .any(|(key, _)| key.eq_ignore_ascii_case("password"));
    if has_query_password {
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(key, value)| {
                let value = if key.eq_ignore_ascii_case("password") {
                    MASK.to_string()
                } else {
                    value.into_owned()
                };
                (key.into_owned(), value)
            })
            .collect();
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }

    url.to_string()
}

fn unparseable(raw: &str) -> String {
    match raw.split_once(':') {
        Some((scheme, _))
            if !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) =>
        {
            format!("{scheme}:{UNPARSEABLE}")
        }
        _ => UNPARSEABLE.to_string(),
    }
}
