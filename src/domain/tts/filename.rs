use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

/// Hex characters of the digest kept in a filename
const DIGEST_HEX_LEN: usize = 12;

pub const AUDIO_EXTENSION: &str = "mp3";

static WHITESPACE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static UNSAFE_PREFIX_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_.-]").unwrap());

/// Trim and collapse every whitespace run into a single space
pub fn normalize_text(text: &str) -> String {
    WHITESPACE_PATTERN
        .replace_all(text.trim(), " ")
        .into_owned()
}

/// Derive the output filename for a text.
///
/// The name is `prefix + first 12 hex chars of SHA-256(normalized text) + ".mp3"`,
/// so the same text always lands on the same file. Characters in `prefix`
/// that are not filesystem-safe are replaced with `_`. Never touches the
/// filesystem.
pub fn allocate_filename(text: &str, prefix: &str) -> String {
    let normalized = normalize_text(text);
    let digest = hex::encode(Sha256::digest(normalized.as_bytes()));
    let prefix = UNSAFE_PREFIX_PATTERN.replace_all(prefix, "_");

    format!("{}{}.{}", prefix, &digest[..DIGEST_HEX_LEN], AUDIO_EXTENSION)
}
