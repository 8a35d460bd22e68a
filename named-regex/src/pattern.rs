//! Compiled named-group patterns

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::engine::NativeRegex;
use crate::error::Result;
use crate::flags::Flags;
use crate::groups::{GroupInfo, NameRegistry};
use crate::matcher::Matcher;
use crate::scanner::{Translation, translate_with_flags};

/// A pattern with named groups, compiled for matching
///
/// Cloning is cheap and the pattern can be shared between threads. Two
/// patterns are equal when they were written the same way with the same
/// flags.
///
/// # Example
/// ```
/// use named_regex::NamedPattern;
///
/// let p = NamedPattern::compile(r"(?<year>\d{4})-(?<month>\d{2})").unwrap();
/// assert_eq!(p.standard_pattern(), r"(\d{4})-(\d{2})");
/// assert_eq!(p.index_of("month"), Some(2));
///
/// let mut m = p.matcher("due 2024-06");
/// assert!(m.find().unwrap());
/// assert_eq!(m.group("year").unwrap(), Some("2024"));
/// ```
#[derive(Clone)]
pub struct NamedPattern {
    inner: Arc<Inner>,
}

struct Inner {
    translation: Translation,
    flags: Flags,
    native: NativeRegex,
}

impl NamedPattern {
    /// Compile a pattern with no flags
    pub fn compile(pattern: &str) -> Result<Self> {
        Self::compile_with_flags(pattern, Flags::empty())
    }

    /// Compile a pattern with the given flags
    pub fn compile_with_flags(pattern: &str, flags: Flags) -> Result<Self> {
        let translation = translate_with_flags(pattern, flags)?;
        let native = NativeRegex::compile(&translation, flags)?;
        Ok(NamedPattern {
            inner: Arc::new(Inner {
                translation,
                flags,
                native,
            }),
        })
    }

    /// The pattern as written
    pub fn named_pattern(&self) -> &str {
        self.inner.translation.named_pattern()
    }

    /// The pattern with numbered groups only
    pub fn standard_pattern(&self) -> &str {
        self.inner.translation.standard_pattern()
    }

    /// Flags the pattern was compiled with
    pub fn flags(&self) -> Flags {
        self.inner.flags
    }

    /// Distinct group names in order of first declaration
    pub fn group_names(&self) -> &[String] {
        self.registry().names()
    }

    /// Every declaration of every name
    pub fn group_info(&self) -> &HashMap<String, Vec<GroupInfo>> {
        self.registry().group_info()
    }

    /// Number of capture groups, named or not
    pub fn group_count(&self) -> usize {
        self.registry().group_count()
    }

    /// Native index of the first group with this name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.registry().index_of(name)
    }

    /// Native index of the `instance`-th group with this name
    pub fn index_of_instance(&self, name: &str, instance: usize) -> Result<Option<usize>> {
        self.registry().index_of_instance(name, instance)
    }

    /// Start a match session over `input`
    pub fn matcher<'t>(&self, input: &'t str) -> Matcher<'t> {
        Matcher::new(self.clone(), input)
    }

    /// Whether the whole of `input` matches
    pub fn is_match(&self, input: &str) -> Result<bool> {
        self.matcher(input).matches()
    }

    /// Split `input` around matches, dropping trailing empty strings
    pub fn split<'t>(&self, input: &'t str) -> Result<Vec<&'t str>> {
        self.splitn(input, 0)
    }

    /// Split `input` around matches into at most `limit` pieces
    ///
    /// The last piece holds the unsplit remainder. A `limit` of zero means
    /// no limit, with trailing empty strings dropped. A zero-width match at
    /// the very start never yields a leading empty string.
    pub fn splitn<'t>(&self, input: &'t str, limit: usize) -> Result<Vec<&'t str>> {
        let mut pieces = Vec::new();
        let mut last = 0;
        let mut matched = false;
        let mut m = self.matcher(input);

        while m.find()? {
            if limit > 0 && pieces.len() + 1 >= limit {
                break;
            }
            let range = m.range()?;
            if range.end == 0 {
                continue;
            }
            matched = true;
            pieces.push(&input[last..range.start]);
            last = range.end;
        }

        if !matched {
            return Ok(vec![input]);
        }

        pieces.push(&input[last..]);
        if limit == 0 {
            while pieces.last().is_some_and(|piece| piece.is_empty()) {
                pieces.pop();
            }
        }
        Ok(pieces)
    }

    pub(crate) fn registry(&self) -> &NameRegistry {
        self.inner.translation.registry()
    }

    pub(crate) fn native(&self) -> &NativeRegex {
        &self.inner.native
    }
}

impl PartialEq for NamedPattern {
    fn eq(&self, other: &Self) -> bool {
        self.named_pattern() == other.named_pattern() && self.flags() == other.flags()
    }
}

impl Eq for NamedPattern {}

impl Hash for NamedPattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.named_pattern().hash(state);
        self.flags().hash(state);
    }
}

impl fmt::Display for NamedPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.named_pattern())
    }
}

impl fmt::Debug for NamedPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedPattern")
            .field("named", &self.named_pattern())
            .field("standard", &self.standard_pattern())
            .field("flags", &self.flags())
            .finish()
    }
}
