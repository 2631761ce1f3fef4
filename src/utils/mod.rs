//! Small shared helpers

pub mod encoding;
pub mod paths;
pub mod tokens;

pub use encoding::decode_bytes;
pub use paths::{normalize_path, parse_github_repo, repository_key, repository_name};
pub use tokens::{estimate_tokens, estimate_tokens_for_chars};

/// Human-readable file size (`512 B`, `1.5 KB`, `2.0 MB`).
pub fn format_file_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

/// Format an integer with thousands separators.
pub fn format_with_commas(value: usize) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
