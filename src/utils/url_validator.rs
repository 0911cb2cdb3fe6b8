//! Destination URL validation.
//!
//! A destination must be an absolute web URL: an `http` or `https` scheme and a
//! non-empty host. The input string is never rewritten, so two destinations
//! that differ only in case or a trailing slash remain distinct. Since the
//! stored string is sent back verbatim as a `Location` header, it must also be
//! a valid header value.

use axum::http::HeaderValue;
use url::Url;

/// Reasons a destination is rejected.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UrlValidationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL must include a host")]
    MissingHost,

    #[error("URL must not contain leading or trailing whitespace")]
    SurroundingWhitespace,

    #[error("URL must contain only printable ASCII; percent-encode other characters")]
    UnencodedCharacters,
}

/// Checks that `input` is a well-formed absolute web URL.
///
/// # Errors
///
/// Returns [`UrlValidationError::InvalidFormat`] for strings the URL parser rejects,
/// [`UrlValidationError::UnsupportedProtocol`] for non-HTTP(S) schemes such as
/// `javascript:` or `mailto:`, and [`UrlValidationError::MissingHost`] when the
/// authority is empty. Returns [`UrlValidationError::UnencodedCharacters`] for
/// control characters (the parser drops tabs and newlines silently) or raw
/// non-ASCII text, neither of which can be sent in a redirect.
///
/// # Examples
///
/// ```ignore
/// assert!(validate_destination("https://example.com/a").is_ok());
/// assert!(validate_destination("not a url").is_err());
/// assert!(validate_destination("ftp://example.com").is_err());
/// ```
pub fn validate_destination(input: &str) -> Result<(), UrlValidationError> {
    // The parser silently strips surrounding whitespace.
    if input.trim() != input {
        return Err(UrlValidationError::SurroundingWhitespace);
    }

    if input.bytes().any(|b| b.is_ascii_control()) || HeaderValue::from_str(input).is_err() {
        return Err(UrlValidationError::UnencodedCharacters);
    }

    let url = Url::parse(input).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlValidationError::UnsupportedProtocol),
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(UrlValidationError::MissingHost),
    }
}
