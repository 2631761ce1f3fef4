//! File name for the saved prompt: `<abbr>[-<query-slug>]-<YYYYMMDD-HHMM>.txt`.

use crate::utils::repository_name;
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

const SLUG_WORDS: usize = 5;
const SLUG_MAX_CHARS: usize = 48;

static QUOTES: Lazy<Regex> = Lazy::new(|| Regex::new(r#"['"`]"#).expect("valid regex"));
static NON_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_\s-]").expect("valid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static HYPHENS: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").expect("valid regex"));

pub fn prompt_file_name(
    repo_url: &str,
    query: &str,
    abbreviations: &BTreeMap<String, String>,
    at: NaiveDateTime,
) -> String {
    let abbr = abbreviate(&repository_name(repo_url), abbreviations);
    let slug = query_slug(query).map(|s| format!("-{s}")).unwrap_or_default();
    format!("{abbr}{slug}-{}.txt", compact_timestamp(at))
}

/// Known names map through `abbreviations`; multi-word names become their
/// initials; anything else is cut to three characters.
pub fn abbreviate(repo_name: &str, abbreviations: &BTreeMap<String, String>) -> String {
    let lower = repo_name.trim_start_matches('.').to_lowercase();
    if lower.is_empty() {
        return "repo".to_string();
    }
    if let Some(abbr) = abbreviations.get(&lower) {
        return abbr.clone();
    }
    let words: Vec<&str> = lower.split(['-', '_']).filter(|w| !w.is_empty()).collect();
    if words.len() > 1 {
        return words.iter().filter_map(|w| w.chars().next()).collect();
    }
    lower.chars().take(3).collect()
}

/// Slug of the first few query words, `None` for a blank query.
pub fn query_slug(query: &str) -> Option<String> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }
    let first: Vec<&str> = query.split_whitespace().take(SLUG_WORDS).collect();
    Some(safe_slug(&first.join(" "), SLUG_MAX_CHARS))
}

/// Lowercase ASCII slug safe for file names; `no-query` when nothing is left.
pub fn safe_slug(text: &str, max_chars: usize) -> String {
    let s = QUOTES.replace_all(text, "");
    let s = NON_WORD.replace_all(&s, " ");
    let s = WHITESPACE.replace_all(s.trim(), "-").to_lowercase();
    let s = HYPHENS.replace_all(&s, "-");
    let mut s = s.trim_matches(['-', '_', '.']).to_string();
    if s.chars().count() > max_chars {
        s = s.chars().take(max_chars).collect::<String>().trim_end_matches('-').to_string();
    }
    if s.is_empty() {
        "no-query".to_string()
    } else {
        s
    }
}

pub fn compact_timestamp(at: NaiveDateTime) -> String {
    at.format("%Y%m%d-%H%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 7)
            .and_then(|d| d.and_hms_opt(9, 5, 0))
            .expect("valid datetime")
    }

    fn known() -> BTreeMap<String, String> {
        BTreeMap::from([("codebase-flattener".to_string(), "cbf".to_string())])
    }

    #[test]
    fn abbreviation_rules() {
        assert_eq!(abbreviate("Codebase-Flattener", &known()), "cbf");
        assert_eq!(abbreviate("my_cool-tool", &known()), "mct");
        assert_eq!(abbreviate("ripgrep", &known()), "rip");
        assert_eq!(abbreviate("go", &known()), "go");
        assert_eq!(abbreviate(".tmpA1b2", &known()), "tmp");
    }

    #[test]
    fn slug_takes_first_five_words() {
        assert_eq!(
            query_slug("  Fix the \"login\" bug in auth.rs please now ").as_deref(),
            Some("fix-the-login-bug-in")
        );
        assert_eq!(query_slug("   "), None);
        assert_eq!(query_slug("?!").as_deref(), Some("no-query"));
    }

    #[test]
    fn slug_collapses_punctuation_and_truncates() {
        assert_eq!(safe_slug("a -- b / c", 48), "a-b-c");
        assert_eq!(safe_slug("don't stop", 48), "dont-stop");
        assert_eq!(safe_slug("abcdef-ghij", 7), "abcdef");
    }

    #[test]
    fn full_file_name() {
        assert_eq!(
            prompt_file_name("https://github.com/acme/codebase-flattener", "Add tests", &known(), at()),
            "cbf-add-tests-20240307-0905.txt"
        );
        assert_eq!(
            prompt_file_name("https://github.com/acme/widget-factory.git", "", &known(), at()),
            "wf-20240307-0905.txt"
        );
    }
}
