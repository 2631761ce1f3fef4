//! Decoding of downloaded file bytes with UTF-8 fallback logic.
//!
//! Raw file downloads arrive as bytes. This module turns them into text:
//! - BOM detection (UTF-8, UTF-16 LE/BE)
//! - UTF-8 fast-path with strict validation
//! - Fallback encoding detection using chardetng
//! - Lossy UTF-8 with replacement characters as the last resort

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};

const DEFAULT_SAMPLE_SIZE: usize = 8192;

/// Detect the encoding label of a byte buffer.
///
/// Strategy:
/// 1. Check for BOM markers first (most reliable)
/// 2. Try strict UTF-8 decoding of a sample (fast path for most source files)
/// 3. Fall back to chardetng for non-UTF-8 content
pub fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return encoding;
    }

    let sample = &bytes[..bytes.len().min(DEFAULT_SAMPLE_SIZE)];
    if valid_utf8_prefix(sample) {
        return UTF_8;
    }

    let mut detector = EncodingDetector::new();
    detector.feed(sample, sample.len() == bytes.len());
    detector.guess(None, true)
}

/// A sample cut at an arbitrary byte may split a multi-byte character.
fn valid_utf8_prefix(sample: &[u8]) -> bool {
    match std::str::from_utf8(sample) {
        Ok(_) => true,
        Err(err) => err.error_len().is_none(),
    }
}

/// Decode bytes into text, returning the content and the encoding used.
pub fn decode_bytes(bytes: &[u8]) -> (String, String) {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (decoded, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return (decoded.into_owned(), encoding.name().to_lowercase());
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return (text.to_string(), "utf-8".to_string());
    }

    let encoding = detect_encoding(bytes);
    let (decoded, used, had_errors) = encoding.decode(bytes);
    if !had_errors {
        return (decoded.into_owned(), used.name().to_lowercase());
    }

    // Last resort: UTF-8 with replacement
    let (cow, _, _) = UTF_8.decode(bytes);
    (cow.into_owned(), "utf-8".to_string())
}
