//! Media reference grammar
//!
//! Centralized validation for externally supplied source URLs. A reference
//! is accepted only when a stable 11-character video ref can be derived
//! from it; invalid references are rejected at the boundary and never
//! stored.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};

/// Primary pattern: watch, short, and embed URL forms
static VIDEO_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:https?://)?(?:www\.|m\.|music\.)?(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([\w-]{11})(?:[\w&#?=]*)?$",
    )
    .expect("video ref pattern")
});

/// Fallback pattern for less common URL shapes; the captured run must be
/// exactly ref-length, checked by the caller
static VIDEO_REF_FALLBACK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:youtu\.be/|/v/|/u/\w/|embed/|watch\?v=|&v=)([^#&?]+)")
        .expect("video ref fallback pattern")
});

/// Derive the stable video ref from a source URL.
///
/// Deterministic: the same URL always yields the same ref. Returns
/// `Error::Validation` when no ref can be derived.
pub fn extract_video_ref(source_url: &str) -> Result<String> {
    if let Some(caps) = VIDEO_REF.captures(source_url.trim()) {
        return Ok(caps[1].to_string());
    }
    if let Some(caps) = VIDEO_REF_FALLBACK.captures(source_url.trim()) {
        if caps[1].len() == 11 {
            return Ok(caps[1].to_string());
        }
    }
    Err(Error::Validation(format!(
        "not a recognizable video URL: {source_url}"
    )))
}

/// Check that a bare playlist ref (path parameter, not a URL) is well
/// formed. Playlist refs vary in length, so only the alphabet is checked.
pub fn validate_playlist_ref(playlist_ref: &str) -> Result<()> {
    if !playlist_ref.is_empty()
        && playlist_ref
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
    {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "malformed playlist ref: {playlist_ref}"
        )))
    }
}

/// Check that a bare ref (path parameter, not a URL) is well formed.
pub fn validate_ref(media_ref: &str) -> Result<()> {
    if media_ref.len() == 11 && media_ref.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
        Ok(())
    } else {
        Err(Error::Validation(format!("malformed media ref: {media_ref}")))
    }
}
