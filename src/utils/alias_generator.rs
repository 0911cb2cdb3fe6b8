//! Short alias generation and format checks.
//!
//! Aliases are random tokens drawn from the system RNG and encoded as URL-safe
//! base64 without padding, so they can be used verbatim as a path segment.

use base64::Engine as _;
use regex::Regex;
use std::sync::LazyLock;

/// Random bytes per alias before encoding. Six bytes encode to eight characters.
const ALIAS_LENGTH_BYTES: usize = 6;

/// Length of every generated alias.
pub const ALIAS_LENGTH: usize = 8;

/// Longest alias accepted from clients.
pub const MAX_ALIAS_LENGTH: usize = 64;

/// Character set of a valid alias.
pub static ALIAS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("alias regex is valid"));

/// Generates a random alias of [`ALIAS_LENGTH`] characters.
///
/// # Panics
///
/// Panics if the operating system RNG is unavailable.
pub fn generate_alias() -> String {
    let mut buffer = [0u8; ALIAS_LENGTH_BYTES];
    getrandom::fill(&mut buffer).expect("Failed to generate random bytes");

    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buffer)
}

/// Returns true if `alias` has the shape of an alias this service could issue.
pub fn is_well_formed(alias: &str) -> bool {
    !alias.is_empty() && alias.len() <= MAX_ALIAS_LENGTH && ALIAS_REGEX.is_match(alias)
}
