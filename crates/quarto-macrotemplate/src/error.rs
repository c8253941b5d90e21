/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for template compilation and rendering.

use std::fmt;
use thiserror::Error;

/// Placeholder shown in locations when the caller did not name the template.
pub const ANONYMOUS_TEMPLATE: &str = "<template>";

/// Errors that can occur during template operations.
///
/// Missing data is never an error: a path that resolves to nothing renders as
/// empty text, fails a `has` test, and iterates zero times.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// A `{` was never closed, or a `}` has no matching `{`.
    #[error("Unmatched brace at {location}: {message}")]
    UnmatchedBrace {
        location: SourceLocation,
        message: String,
    },

    /// A node names a macro that is neither user-supplied nor built in.
    #[error("Unknown macro '{name}' at {location}")]
    UnknownMacro {
        name: String,
        location: SourceLocation,
    },

    /// A user macro rejected the node it was given.
    #[error("Macro '{name}' failed: {message}")]
    MacroError { name: String, message: String },

    /// A Rust value could not be converted into template data.
    #[error("Invalid template data: {0}")]
    InvalidData(#[from] serde_json::Error),
}

/// Result type for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// A 1-based line/column position inside a named (or anonymous) template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// The file name supplied through the compile options, if any.
    pub file: Option<String>,
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(file: Option<&str>, line: usize, column: usize) -> Self {
        Self {
            file: file.map(str::to_string),
            line,
            column,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.file.as_deref().unwrap_or(ANONYMOUS_TEMPLATE),
            self.line,
            self.column
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_display_with_file() {
        let loc = SourceLocation::new(Some("page.tpl"), 3, 7);
        assert_eq!(loc.to_string(), "page.tpl:3:7");
    }

    #[test]
    fn test_location_display_anonymous() {
        let loc = SourceLocation::new(None, 1, 1);
        assert_eq!(loc.to_string(), "<template>:1:1");
    }

    #[test]
    fn test_unknown_macro_message_names_macro() {
        let err = TemplateError::UnknownMacro {
            name: "bogus".to_string(),
            location: SourceLocation::new(Some("a.tpl"), 2, 4),
        };
        assert_eq!(err.to_string(), "Unknown macro 'bogus' at a.tpl:2:4");
    }
}
