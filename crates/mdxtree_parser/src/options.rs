//! Parser configuration.

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Default maximum heading level.
pub const DEFAULT_MAX_HEADING_LEVEL: u8 = 6;

/// Default cap on recorded syntax errors.
pub const DEFAULT_MAX_ERRORS: usize = 4096;

/// Options controlling a parse.
///
/// # Example
///
/// ```rust,ignore
/// let options = ParseOptions::from_json(r#"{ "maxHeadingLevel": 4, "esm": false }"#)?;
/// let ast = mdxtree_parser::parse_with_options(source, &options)?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ParseOptions {
    /// Deeper headings are kept but reported as a warning.
    pub max_heading_level: u8,

    /// Syntax errors past this count are dropped.
    pub max_errors: usize,

    /// Largest accepted source in bytes. Offsets are `u32`, so larger
    /// values are clamped to `u32::MAX`.
    pub max_input_len: Option<usize>,

    /// Treat a leading `---` block as a metadata preamble.
    pub frontmatter: bool,

    /// Treat line-start `import`/`export` statements as module code.
    pub esm: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_heading_level: DEFAULT_MAX_HEADING_LEVEL,
            max_errors: DEFAULT_MAX_ERRORS,
            max_input_len: None,
            frontmatter: true,
            esm: true,
        }
    }
}

impl ParseOptions {
    /// Creates options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads options from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ParseError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Effective input limit in bytes.
    pub fn input_limit(&self) -> usize {
        let hard = u32::MAX as usize;
        self.max_input_len.map_or(hard, |limit| limit.min(hard))
    }
}
