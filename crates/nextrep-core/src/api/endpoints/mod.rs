//! Typed wrappers around each backend endpoint, grouped by area.
//!
//! Each wrapper builds one request and decodes one canonical payload; the
//! composite helpers (profile summary, picture lookup, follow status,
//! attachment URLs) only chain these calls.

mod assets;
mod auth;
mod follow;
mod posts;
mod profile;
mod replies;

use std::borrow::Cow;

/// Percent-encode a value used as a single path segment.
fn segment(value: &str) -> Cow<'_, str> {
    urlencoding::encode(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_encoding() {
        assert_eq!(segment("42"), "42");
        assert_eq!(segment("ada lovelace"), "ada%20lovelace");
        assert_eq!(segment("a/b?c"), "a%2Fb%3Fc");
    }
}
