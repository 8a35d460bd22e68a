//! Error types for named-group translation and matching
//!
//! This module provides error handling using the `thiserror` crate.
//! Errors are categorized by their source: pattern syntax (translation or
//! native compilation), group lookup, session state, or engine runtime.

use thiserror::Error;

/// The main error type for the crate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegexError {
    /// Malformed pattern or replacement syntax, including unknown names
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// A name-based accessor was given a name absent from the pattern
    #[error("No group \"{0}\"")]
    NoSuchGroup(String),

    /// A duplicate-name instance ordinal was out of range
    #[error("Index: {instance}, Size: {count}")]
    InstanceOutOfRange {
        /// The group name that was looked up
        name: String,
        /// The requested instance
        instance: usize,
        /// How many groups carry that name
        count: usize,
    },

    /// An index-based accessor was given an index beyond the group count
    #[error("No group {0}")]
    NoGroupIndex(usize),

    /// An accessor was used without a successful current match
    #[error("No match found")]
    NoMatch,

    /// An argument was missing or unusable
    #[error("{0}")]
    InvalidArgument(String),

    /// A region bound lies outside the input or off a character boundary
    #[error("{bound} index out of bounds: {index} (input length {len})")]
    RegionOutOfBounds {
        /// Which bound was rejected, `start` or `end`
        bound: &'static str,
        /// The rejected offset
        index: usize,
        /// Length of the input in bytes
        len: usize,
    },

    /// The engine gave up while matching (for example a backtrack limit)
    #[error("runtime error: {0}")]
    Runtime(String),
}

/// A syntax error with a caret diagnostic pointing into the offending text
///
/// `index` counts characters, not bytes, so the caret lines up with the
/// rendered text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", render(.description, .index, .pattern))]
pub struct SyntaxError {
    /// Short description of the problem
    pub description: String,
    /// Character offset of the problem, when known
    pub index: Option<usize>,
    /// The text being diagnosed
    pub pattern: String,
}

impl SyntaxError {
    /// Create a syntax error located at `index` within `pattern`
    pub fn new(description: impl Into<String>, index: usize, pattern: impl Into<String>) -> Self {
        SyntaxError {
            description: description.into(),
            index: Some(index),
            pattern: pattern.into(),
        }
    }

    /// Create a syntax error with no position
    pub fn unpositioned(description: impl Into<String>, pattern: impl Into<String>) -> Self {
        SyntaxError {
            description: description.into(),
            index: None,
            pattern: pattern.into(),
        }
    }
}

fn render(description: &str, index: &Option<usize>, pattern: &str) -> String {
    match index {
        Some(index) => format!(
            "{} near index {}\n{}\n{}^",
            description,
            index,
            pattern,
            " ".repeat(*index)
        ),
        None => format!("{}\n{}", description, pattern),
    }
}

impl From<fancy_regex::Error> for RegexError {
    fn from(err: fancy_regex::Error) -> Self {
        RegexError::Runtime(err.to_string())
    }
}

/// Result type alias for regex operations
pub type Result<T> = std::result::Result<T, RegexError>;
