//! Automatic pre-fetch planning after a repository load.

use crate::domain::{PREFETCH_MAX_BYTES, PREFETCH_MAX_FILES};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefetchCaps {
    pub max_bytes: u64,
    pub max_files: usize,
}

impl Default for PrefetchCaps {
    fn default() -> Self {
        Self { max_bytes: PREFETCH_MAX_BYTES, max_files: PREFETCH_MAX_FILES }
    }
}

/// Pick the smallest candidates first while both caps hold.
///
/// Candidates are sorted ascending by size (stable, so equal sizes keep
/// their input order) and taken greedily. Planning stops at the first file
/// that would push the byte total past `max_bytes` or once `max_files`
/// files are planned. The plan is returned smallest first.
pub fn plan_prefetch<'a, I>(candidates: I, caps: PrefetchCaps) -> Vec<String>
where
    I: IntoIterator<Item = (&'a str, u64)>,
{
    let mut sorted: Vec<(&str, u64)> = candidates.into_iter().collect();
    sorted.sort_by_key(|(_, size)| *size);

    let mut plan = Vec::new();
    let mut total_bytes: u64 = 0;
    for (path, size) in sorted {
        if plan.len() >= caps.max_files || total_bytes.saturating_add(size) > caps.max_bytes {
            break;
        }
        total_bytes += size;
        plan.push(path.to_string());
    }

    tracing::debug!(
        "Pre-fetch plan: {} files, {} bytes (caps {} files / {} bytes)",
        plan.len(),
        total_bytes,
        caps.max_files,
        caps.max_bytes
    );
    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_file_is_left_out() {
        let candidates = [("big.bin", 3_000_000), ("b.txt", 500), ("a.txt", 100)];
        let plan = plan_prefetch(candidates, PrefetchCaps::default());
        assert_eq!(plan, vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn file_cap_limits_count() {
        let caps = PrefetchCaps { max_bytes: u64::MAX, max_files: 2 };
        let plan = plan_prefetch([("a", 1), ("b", 2), ("c", 3)], caps);
        assert_eq!(plan, vec!["a", "b"]);
    }

    #[test]
    fn equal_sizes_keep_input_order() {
        let plan = plan_prefetch([("z", 10), ("a", 10), ("m", 5)], PrefetchCaps::default());
        assert_eq!(plan, vec!["m", "z", "a"]);
    }

    #[test]
    fn exact_byte_cap_is_allowed() {
        let caps = PrefetchCaps { max_bytes: 600, max_files: 10 };
        assert_eq!(plan_prefetch([("a", 100), ("b", 500), ("c", 1)], caps), vec!["c", "a"]);
        assert_eq!(plan_prefetch([("a", 100), ("b", 500)], caps), vec!["a", "b"]);
    }

    #[test]
    fn empty_candidates_plan_nothing() {
        assert!(plan_prefetch(std::iter::empty(), PrefetchCaps::default()).is_empty());
    }
}
