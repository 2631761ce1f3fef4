//! Output rendering (overview, prompt, artifact name)

pub mod filename;
pub mod overview;
pub mod prompt;

pub use filename::prompt_file_name;
pub use overview::render_overview;
pub use prompt::{PromptParts, PromptReport};
