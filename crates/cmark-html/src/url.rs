//! Link and image URL processing.
//!
//! Destinations go through two optional steps before they are emitted:
//!
//! 1. Sanitization ([`UrlSanitizer`]): drop URLs with disallowed protocols.
//! 2. Percent-encoding ([`percent_encode_url`]): encode characters that are not
//!    valid in a URL while leaving existing escapes and URL syntax alone.

use std::borrow::Cow;
use std::collections::HashSet;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters that are percent-encoded.
///
/// Everything except unreserved characters and the reserved characters used
/// in URL syntax. `[` and `]` stay in the set (like `encodeURI` in JS), and so
/// does `%`, which [`percent_encode_url`] handles itself.
const URL_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b':')
    .remove(b'/')
    .remove(b'?')
    .remove(b'#')
    .remove(b'@')
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b';')
    .remove(b'=');

/// Protocols accepted by [`DefaultUrlSanitizer`] unless configured otherwise.
pub const DEFAULT_ALLOWED_PROTOCOLS: [&str; 4] = ["http", "https", "mailto", "data"];

/// Decides whether a link or image destination is safe to emit.
pub trait UrlSanitizer: Send + Sync {
    /// Sanitize a link `href`.
    fn sanitize_link_url<'u>(&self, url: &'u str) -> Cow<'u, str>;

    /// Sanitize an image `src`. Defaults to the link rules.
    fn sanitize_image_url<'u>(&self, url: &'u str) -> Cow<'u, str> {
        self.sanitize_link_url(url)
    }
}

/// Protocol allow-list sanitizer.
///
/// Surrounding HTML whitespace is stripped. A URL whose protocol (the text
/// before the first `:` that precedes any `/`, `?` or `#`) is not in the
/// allow-list is replaced by an empty string; relative URLs pass through.
#[derive(Clone, Debug)]
pub struct DefaultUrlSanitizer {
    protocols: HashSet<String>,
}

impl Default for DefaultUrlSanitizer {
    fn default() -> Self {
        Self::with_protocols(DEFAULT_ALLOWED_PROTOCOLS)
    }
}

impl DefaultUrlSanitizer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sanitizer accepting exactly `protocols` (case-insensitive).
    #[must_use]
    pub fn with_protocols<I, S>(protocols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            protocols: protocols
                .into_iter()
                .map(|p| p.as_ref().to_ascii_lowercase())
                .collect(),
        }
    }

    fn protocol_allowed(&self, url: &str) -> bool {
        for (i, c) in url.char_indices() {
            match c {
                '/' | '?' | '#' => return true,
                ':' => return self.protocols.contains(&url[..i].to_ascii_lowercase()),
                _ => {}
            }
        }
        true
    }
}

impl UrlSanitizer for DefaultUrlSanitizer {
    fn sanitize_link_url<'u>(&self, url: &'u str) -> Cow<'u, str> {
        let trimmed = url.trim_matches(is_html_space);
        if self.protocol_allowed(trimmed) {
            Cow::Borrowed(trimmed)
        } else {
            tracing::debug!(url, "Blocked URL with disallowed protocol");
            Cow::Borrowed("")
        }
    }
}

fn is_html_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0c' | '\r')
}

/// Percent-encode a URL.
///
/// - Existing `%XX` escapes are preserved; a `%` not starting one becomes `%25`
/// - Unreserved characters and URL syntax characters are kept, except `[` and `]`
/// - Everything else is encoded as upper-case hex UTF-8 bytes
///
/// Encoding is idempotent: encoding an encoded URL returns it unchanged.
///
/// # Examples
///
/// ```
/// use cmark_html::percent_encode_url;
///
/// assert_eq!(percent_encode_url("a/b?c=d"), "a/b?c=d");
/// assert_eq!(percent_encode_url("café"), "caf%C3%A9");
/// assert_eq!(percent_encode_url("x[y]"), "x%5By%5D");
/// assert_eq!(percent_encode_url("100%25"), "100%25");
/// ```
#[must_use]
pub fn percent_encode_url(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    let mut rest = url;
    while let Some(pos) = rest.find('%') {
        out.extend(utf8_percent_encode(&rest[..pos], URL_ENCODE_SET));
        let after = &rest[pos + 1..];
        if starts_with_hex_pair(after) {
            out.push_str(&rest[pos..pos + 3]);
            rest = &after[2..];
        } else {
            out.push_str("%25");
            rest = after;
        }
    }
    out.extend(utf8_percent_encode(rest, URL_ENCODE_SET));
    out
}

fn starts_with_hex_pair(s: &str) -> bool {
    s.as_bytes()
        .get(..2)
        .is_some_and(|pair| pair.iter().all(u8::is_ascii_hexdigit))
}

/// Destination kind, selecting the sanitizer rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UrlKind {
    Link,
    Image,
}

/// Sanitize-then-encode pipeline configured for one render call.
#[derive(Clone, Copy)]
pub struct UrlProcessor<'a> {
    sanitizer: Option<&'a dyn UrlSanitizer>,
    percent_encode: bool,
}

impl<'a> UrlProcessor<'a> {
    /// `sanitizer` is `None` when sanitization is disabled.
    #[must_use]
    pub fn new(sanitizer: Option<&'a dyn UrlSanitizer>, percent_encode: bool) -> Self {
        Self {
            sanitizer,
            percent_encode,
        }
    }

    /// Whether destinations are sanitized.
    #[must_use]
    pub fn sanitizes(&self) -> bool {
        self.sanitizer.is_some()
    }

    /// Run `url` through the configured steps.
    #[must_use]
    pub fn process<'u>(&self, kind: UrlKind, url: &'u str) -> Cow<'u, str> {
        let url = match (self.sanitizer, kind) {
            (Some(sanitizer), UrlKind::Link) => sanitizer.sanitize_link_url(url),
            (Some(sanitizer), UrlKind::Image) => sanitizer.sanitize_image_url(url),
            (None, _) => Cow::Borrowed(url),
        };
        self.encode(url)
    }

    /// Percent-encode only, if enabled.
    #[must_use]
    pub fn encode<'u>(&self, url: Cow<'u, str>) -> Cow<'u, str> {
        if self.percent_encode {
            Cow::Owned(percent_encode_url(&url))
        } else {
            url
        }
    }
}
