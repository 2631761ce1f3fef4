//! Final prompt text and its token estimate.

use crate::utils::estimate_tokens_for_chars;

/// Characters counted per included file on top of path and content.
const FILE_PADDING_CHARS: usize = 20;

/// Characters counted once for the fixed headings.
const PROMPT_PADDING_CHARS: usize = 100;

/// Inputs for one prompt, borrowed from the session.
#[derive(Debug, Clone)]
pub struct PromptParts<'a> {
    pub query: &'a str,
    pub overview: &'a str,
    /// `(path, content)` in content-map insertion order.
    pub files: Vec<(&'a str, &'a str)>,
    pub instructions: &'a str,
}

impl PromptParts<'_> {
    pub fn render(&self) -> String {
        let mut prompt = format!(
            "User Query:\n{}\n\n{}\n\nRelevant Code Context:\n",
            self.query, self.overview
        );
        for (path, content) in &self.files {
            prompt.push_str(&format!("\nFile: {path}\n```\n{content}\n```\n"));
        }
        prompt.push_str(&format!("\n\nCustom Instructions:\n{}", self.instructions));
        prompt.push_str(&format!("\n\nRepeating User Query:\n{}", self.query));
        prompt
    }

    /// Character count behind the token estimate.
    pub fn estimated_chars(&self) -> usize {
        let files: usize = self
            .files
            .iter()
            .map(|(path, content)| {
                path.chars().count() + content.chars().count() + FILE_PADDING_CHARS
            })
            .sum();
        files
            + self.instructions.chars().count()
            + self.query.chars().count()
            + PROMPT_PADDING_CHARS
            + self.overview.chars().count()
    }

    pub fn estimated_tokens(&self) -> usize {
        estimate_tokens_for_chars(self.estimated_chars())
    }
}

/// An assembled prompt plus the numbers shown next to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptReport {
    pub text: String,
    pub estimated_tokens: usize,
    pub max_tokens: usize,
    pub files_included: usize,
}

impl PromptReport {
    pub fn build(parts: &PromptParts<'_>, max_tokens: usize) -> Self {
        Self {
            text: parts.render(),
            estimated_tokens: parts.estimated_tokens(),
            max_tokens,
            files_included: parts.files.len(),
        }
    }

    pub fn over_budget(&self) -> bool {
        self.estimated_tokens > self.max_tokens
    }

    pub fn budget_warning(&self) -> Option<String> {
        self.over_budget().then(|| {
            format!(
                "Warning: Estimated {} tokens exceeds max {}. Consider deselecting some files.",
                self.estimated_tokens, self.max_tokens
            )
        })
    }
}
