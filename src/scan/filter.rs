//! Extension-exclusion and ignored-folder filters.

use std::collections::BTreeSet;

/// Extensions to leave out of the selectable tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExtensionFilter {
    /// No extension filtering.
    #[default]
    IncludeAll,
    /// Lower-cased extensions with a leading dot, e.g. `.log`.
    Exclude(BTreeSet<String>),
}

impl ExtensionFilter {
    /// Parse comma-separated user text such as `"log, .TMP"`.
    pub fn parse(raw: &str) -> Self {
        Self::from_tokens(raw.split(','))
    }

    /// An empty set, `*` or `all` switches filtering off.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let raw: Vec<String> = tokens
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();

        if raw.is_empty() || raw.iter().any(|t| t == "*" || t == "all") {
            return ExtensionFilter::IncludeAll;
        }

        let exts = raw
            .into_iter()
            .map(|t| if t.starts_with('.') { t } else { format!(".{t}") })
            .collect();
        ExtensionFilter::Exclude(exts)
    }

    pub fn excludes(&self, file_name: &str) -> bool {
        match self {
            ExtensionFilter::IncludeAll => false,
            ExtensionFilter::Exclude(exts) => exts.contains(&lower_extension(file_name)),
        }
    }

    pub fn is_include_all(&self) -> bool {
        matches!(self, ExtensionFilter::IncludeAll)
    }
}

/// Folder names ignored wherever they appear as a whole path segment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IgnoredFolders {
    names: BTreeSet<String>,
}

impl IgnoredFolders {
    pub fn parse(raw: &str) -> Self {
        Self::from_tokens(raw.split(','))
    }

    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = tokens
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        Self { names }
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn contains_segment(&self, segment: &str) -> bool {
        self.names.contains(&segment.to_lowercase())
    }

    /// Index of the first path segment that is ignored, if any.
    pub fn first_match(&self, path: &str) -> Option<usize> {
        if self.names.is_empty() {
            return None;
        }
        path.split('/').position(|seg| self.contains_segment(seg))
    }

    pub fn matches(&self, path: &str) -> bool {
        self.first_match(path).is_some()
    }
}

/// Both filters, derived from the user's text inputs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterConfig {
    pub extensions: ExtensionFilter,
    pub ignored: IgnoredFolders,
}

impl FilterConfig {
    pub fn parse(exclude_extensions: &str, ignore_dirs: &str) -> Self {
        Self {
            extensions: ExtensionFilter::parse(exclude_extensions),
            ignored: IgnoredFolders::parse(ignore_dirs),
        }
    }

    pub fn from_lists(exclude_extensions: &[String], ignore_dirs: &[String]) -> Self {
        Self {
            extensions: ExtensionFilter::from_tokens(exclude_extensions),
            ignored: IgnoredFolders::from_tokens(ignore_dirs),
        }
    }

    /// Whether a blob path belongs in the selectable tree.
    pub fn includes(&self, path: &str) -> bool {
        if self.ignored.matches(path) {
            return false;
        }
        let file_name = path.rsplit('/').next().unwrap_or(path);
        !self.extensions.excludes(file_name)
    }

    /// The same folder rules with extension filtering switched off.
    pub fn folders_only(&self) -> Self {
        Self { extensions: ExtensionFilter::IncludeAll, ignored: self.ignored.clone() }
    }
}

/// Lower-cased suffix from the last `.`, or empty when there is none.
///
/// A dot in first or last position does not start an extension, so
/// `.gitignore` and `notes.` both yield `""`.
pub fn lower_extension(file_name: &str) -> String {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 && idx < file_name.len() - 1 => file_name[idx..].to_lowercase(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lower_extension_edge_cases() {
        assert_eq!(lower_extension("main.RS"), ".rs");
        assert_eq!(lower_extension("archive.tar.gz"), ".gz");
        assert_eq!(lower_extension(".gitignore"), "");
        assert_eq!(lower_extension("notes."), "");
        assert_eq!(lower_extension("Makefile"), "");
    }

    #[test]
    fn test_extension_filter_normalizes_tokens() {
        let filter = ExtensionFilter::parse(" log, .TMP ,,cache ");
        let ExtensionFilter::Exclude(exts) = &filter else {
            panic!("expected exclusion set");
        };
        let got: Vec<&str> = exts.iter().map(String::as_str).collect();
        assert_eq!(got, vec![".cache", ".log", ".tmp"]);
        assert!(filter.excludes("debug.LOG"));
        assert!(!filter.excludes("main.rs"));
    }

    #[test]
    fn test_extension_filter_include_all_modes() {
        assert!(ExtensionFilter::parse("").is_include_all());
        assert!(ExtensionFilter::parse(" , ").is_include_all());
        assert!(ExtensionFilter::parse(".log,*").is_include_all());
        assert!(ExtensionFilter::parse("ALL").is_include_all());
    }

    #[test]
    fn test_extensionless_file_not_excluded_by_empty_token() {
        let filter = ExtensionFilter::parse(".");
        assert!(!filter.excludes("Makefile"));
    }

    #[test]
    fn test_ignored_folders_match_whole_segments() {
        let ignored = IgnoredFolders::parse("dist, Node_Modules");
        assert!(ignored.matches("dist/app.js"));
        assert!(ignored.matches("packages/web/NODE_MODULES/react/index.js"));
        assert!(!ignored.matches("mydist/x"));
        assert!(!ignored.matches("src/distance.rs"));
        assert_eq!(ignored.first_match("a/b/dist/c.js"), Some(2));
    }

    #[test]
    fn test_filter_config_includes() {
        let filter = FilterConfig::parse(".md", "vendor");
        assert!(filter.includes("src/lib.rs"));
        assert!(!filter.includes("README.md"));
        assert!(!filter.includes("vendor/lib.rs"));
        assert!(filter.folders_only().includes("README.md"));
        assert!(!filter.folders_only().includes("vendor/lib.rs"));
    }
}
