//! Match results addressed by index or by name
//!
//! [`Spans`] holds the byte offsets of every group of one match and does the
//! name-to-index bookkeeping shared by the live [`Matcher`](crate::Matcher)
//! and the detached [`MatchResult`] snapshot.

use std::collections::HashMap;
use std::ops::Range;

use crate::error::{RegexError, Result};
use crate::pattern::NamedPattern;

/// A reference to a capture group
///
/// Index 0 is the whole match. Names resolve to their first declaration;
/// use [`Group::Instance`] to address a later group reusing the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group<'a> {
    /// A native group index
    Index(usize),
    /// The first group declared with this name
    Name(&'a str),
    /// The n-th (0-based) group declared with this name
    Instance(&'a str, usize),
}

impl From<usize> for Group<'_> {
    fn from(index: usize) -> Self {
        Group::Index(index)
    }
}

impl<'a> From<&'a str> for Group<'a> {
    fn from(name: &'a str) -> Self {
        Group::Name(name)
    }
}

impl<'a> From<(&'a str, usize)> for Group<'a> {
    fn from((name, instance): (&'a str, usize)) -> Self {
        Group::Instance(name, instance)
    }
}

impl Group<'_> {
    /// Resolve to a native index against `pattern`
    pub(crate) fn resolve(self, pattern: &NamedPattern) -> Result<usize> {
        match self {
            Group::Index(index) if index <= pattern.group_count() => Ok(index),
            Group::Index(index) => Err(RegexError::NoGroupIndex(index)),
            Group::Name(name) => pattern.registry().resolve(name, 0),
            Group::Instance(name, instance) => pattern.registry().resolve(name, instance),
        }
    }
}

/// Byte offsets of every group in one match, group 0 first
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Spans(pub(crate) Vec<Option<(usize, usize)>>);

impl Spans {
    pub(crate) fn get(&self, index: usize) -> Option<(usize, usize)> {
        self.0.get(index).copied().flatten()
    }

    /// Move every span right by `offset` bytes
    pub(crate) fn shifted(mut self, offset: usize) -> Self {
        for (start, end) in self.0.iter_mut().flatten() {
            *start += offset;
            *end += offset;
        }
        self
    }

    /// Span of the whole match
    pub(crate) fn whole(&self) -> (usize, usize) {
        self.get(0).unwrap_or_default()
    }

    pub(crate) fn text<'t>(&self, input: &'t str, index: usize) -> Option<&'t str> {
        self.get(index).map(|(start, end)| &input[start..end])
    }

    /// Text of every capture group, in order of opening parenthesis
    pub(crate) fn ordered<'t>(&self, input: &'t str, pattern: &NamedPattern) -> Vec<Option<&'t str>> {
        (1..=pattern.group_count())
            .map(|index| self.text(input, index))
            .collect()
    }

    /// Name to text for every name with a participating group
    ///
    /// With duplicate names the first declaration that took part in the
    /// match wins.
    pub(crate) fn named<'t>(&self, input: &'t str, pattern: &NamedPattern) -> HashMap<String, &'t str> {
        let registry = pattern.registry();
        registry
            .names()
            .iter()
            .filter_map(|name| {
                registry
                    .get(name)?
                    .iter()
                    .find_map(|info| self.text(input, info.group_index))
                    .map(|text| (name.clone(), text))
            })
            .collect()
    }
}

/// A snapshot of one successful match
///
/// It is detached from the [`Matcher`](crate::Matcher) that produced it and
/// stays valid while the matcher moves on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult<'t> {
    pattern: NamedPattern,
    input: &'t str,
    spans: Spans,
}

impl<'t> MatchResult<'t> {
    pub(crate) fn new(pattern: NamedPattern, input: &'t str, spans: Spans) -> Self {
        MatchResult {
            pattern,
            input,
            spans,
        }
    }

    /// The whole matched text
    pub fn as_str(&self) -> &'t str {
        let (start, end) = self.spans.whole();
        &self.input[start..end]
    }

    /// Byte range of the whole match
    pub fn range(&self) -> Range<usize> {
        let (start, end) = self.spans.whole();
        start..end
    }

    /// Text captured by a group, `None` if it took no part in the match
    pub fn group<'a>(&self, group: impl Into<Group<'a>>) -> Result<Option<&'t str>> {
        let index = group.into().resolve(&self.pattern)?;
        Ok(self.spans.text(self.input, index))
    }

    /// Start offset of a group
    pub fn start<'a>(&self, group: impl Into<Group<'a>>) -> Result<Option<usize>> {
        let index = group.into().resolve(&self.pattern)?;
        Ok(self.spans.get(index).map(|(start, _)| start))
    }

    /// End offset of a group
    pub fn end<'a>(&self, group: impl Into<Group<'a>>) -> Result<Option<usize>> {
        let index = group.into().resolve(&self.pattern)?;
        Ok(self.spans.get(index).map(|(_, end)| end))
    }

    /// Number of capture groups, not counting the whole match
    pub fn group_count(&self) -> usize {
        self.pattern.group_count()
    }

    /// Text of every capture group, in order of opening parenthesis
    pub fn ordered_groups(&self) -> Vec<Option<&'t str>> {
        self.spans.ordered(self.input, &self.pattern)
    }

    /// Name to captured text, omitting groups that took no part
    pub fn named_groups(&self) -> HashMap<String, &'t str> {
        self.spans.named(self.input, &self.pattern)
    }
}
