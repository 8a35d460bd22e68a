//! Match sessions with name-based group access
//!
//! A [`Matcher`] runs a [`NamedPattern`] over one input and remembers the
//! current match, the search region and where replacement output has got
//! to. Groups can be read by index, by name, or by name and instance.
//!
//! Offsets are byte offsets into the input.
//!
//! # Region bounds
//!
//! The engine matches over string slices, so bounds are approximated by
//! choosing which slice of the input is searched:
//!
//! - opaque and anchoring bounds (the default) search exactly the region,
//!   so `^`, `$`, `\b` and look-around treat the region edges as the input
//!   edges;
//! - otherwise the search runs over everything before the region end, so
//!   look-behind and `\b` can see text before the region start and `^` no
//!   longer matches there. Text after the region end stays invisible.

use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

use log::trace;

use crate::engine::MatchKind;
use crate::error::{RegexError, Result};
use crate::pattern::NamedPattern;
use crate::replace::Template;
use crate::result::{Group, MatchResult, Spans};

/// Where a session stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchState {
    /// Nothing attempted since creation or the last reset
    Untried,
    /// The last attempt succeeded; group accessors are usable
    Matched,
    /// `find` ran out of matches after at least one success
    Exhausted,
    /// The last attempt failed
    Failed,
}

/// The current match and how it was found
#[derive(Debug, Clone)]
struct Current {
    spans: Spans,
    kind: MatchKind,
    /// Byte range of the input that was searched
    window: (usize, usize),
}

/// A stateful match session over one input
pub struct Matcher<'t> {
    pattern: NamedPattern,
    input: &'t str,
    region: (usize, usize),
    transparent: bool,
    anchoring: bool,
    state: MatchState,
    /// Where the next `find` starts, `None` once the region is used up
    next: Option<usize>,
    /// End of the input already copied by `append_replacement`
    append_pos: usize,
    current: Option<Current>,
    hit_end: bool,
}

impl<'t> Matcher<'t> {
    pub(crate) fn new(pattern: NamedPattern, input: &'t str) -> Self {
        Matcher {
            pattern,
            input,
            region: (0, input.len()),
            transparent: false,
            anchoring: true,
            state: MatchState::Untried,
            next: Some(0),
            append_pos: 0,
            current: None,
            hit_end: false,
        }
    }

    /// Find the next match in the region
    ///
    /// Searching starts at the region start, or just after the previous
    /// match. Once no match is left every further call returns `false`
    /// without searching again.
    pub fn find(&mut self) -> Result<bool> {
        if self.state == MatchState::Exhausted {
            return Ok(false);
        }
        let Some(from) = self.next else {
            return Ok(self.miss());
        };

        let (lo, hi) = self.window();
        trace!("find {:?} from {} in {}..{}", self.pattern.named_pattern(), from, lo, hi);

        match self.pattern.native().search(&self.input[lo..hi], from - lo)? {
            Some(spans) => {
                self.hit(spans.shifted(lo), MatchKind::Search, (lo, hi));
                Ok(true)
            }
            None => Ok(self.miss()),
        }
    }

    /// Reset, then find the first match at or after byte offset `start`
    pub fn find_at(&mut self, start: usize) -> Result<bool> {
        self.check_bound("start", start)?;
        self.reset();
        self.next = Some(start);
        self.find()
    }

    /// Whether the whole region matches
    pub fn matches(&mut self) -> Result<bool> {
        let (lo, hi) = self.region;
        trace!("match {:?} against {}..{}", self.pattern.named_pattern(), lo, hi);

        match self.pattern.native().match_whole(&self.input[lo..hi])? {
            Some(spans) => {
                self.hit(spans.shifted(lo), MatchKind::Whole, (lo, hi));
                Ok(true)
            }
            None => {
                self.fail(true);
                Ok(false)
            }
        }
    }

    /// Whether a match starts at the region start
    pub fn looking_at(&mut self) -> Result<bool> {
        let (lo, hi) = self.window();
        let start = self.region.0;
        trace!("look at {:?} from {}", self.pattern.named_pattern(), start);

        match self.pattern.native().search(&self.input[lo..hi], start - lo)? {
            Some(spans) if spans.whole().0 + lo == start => {
                self.hit(spans.shifted(lo), MatchKind::Search, (lo, hi));
                Ok(true)
            }
            found => {
                self.fail(found.is_none());
                Ok(false)
            }
        }
    }

    /// Forget all progress and restore the region to the whole input
    ///
    /// Transparent and anchoring bounds are kept.
    pub fn reset(&mut self) -> &mut Self {
        self.region = (0, self.input.len());
        self.state = MatchState::Untried;
        self.next = Some(0);
        self.append_pos = 0;
        self.current = None;
        self.hit_end = false;
        self
    }

    /// Reset onto a new input
    pub fn reset_input(&mut self, input: &'t str) -> &mut Self {
        self.input = input;
        self.reset()
    }

    /// Switch to another pattern
    ///
    /// The search position and region are kept, the current match is not.
    pub fn use_pattern(&mut self, pattern: Option<&NamedPattern>) -> Result<&mut Self> {
        let pattern = pattern
            .ok_or_else(|| RegexError::InvalidArgument("new pattern cannot be None".to_string()))?;
        self.pattern = pattern.clone();
        self.current = None;
        self.state = MatchState::Untried;
        Ok(self)
    }

    /// Reset and limit matching to `start..end`
    pub fn region(&mut self, start: usize, end: usize) -> Result<&mut Self> {
        self.check_bound("start", start)?;
        self.check_bound("end", end)?;
        if end < start {
            return Err(RegexError::RegionOutOfBounds {
                bound: "end",
                index: end,
                len: self.input.len(),
            });
        }
        self.reset();
        self.region = (start, end);
        self.next = Some(start);
        Ok(self)
    }

    /// Start of the region, a byte offset into the input
    pub fn region_start(&self) -> usize {
        self.region.0
    }

    /// End of the region, exclusive
    pub fn region_end(&self) -> usize {
        self.region.1
    }

    /// Let look-around and `\b` see past the region start
    ///
    /// The engine cannot anchor inside a longer haystack, so with
    /// transparent bounds `^` only matches at the start of the input (or of
    /// a line under multiline mode), even when anchoring bounds are on.
    pub fn use_transparent_bounds(&mut self, transparent: bool) -> &mut Self {
        self.transparent = transparent;
        self
    }

    /// Whether look-around may see past the region start
    pub fn has_transparent_bounds(&self) -> bool {
        self.transparent
    }

    /// Make `^` and `$` match at the region edges
    pub fn use_anchoring_bounds(&mut self, anchoring: bool) -> &mut Self {
        self.anchoring = anchoring;
        self
    }

    /// Whether `^` and `$` match at the region edges
    pub fn has_anchoring_bounds(&self) -> bool {
        self.anchoring
    }

    /// Whether the last attempt ran into the end of the searched text
    ///
    /// This is true after a failed attempt and after a match that ends at
    /// the end of the searched text.
    pub fn hit_end(&self) -> bool {
        self.hit_end
    }

    /// Whether more input could turn the current match into a failure
    ///
    /// Only a pattern ending in an end-of-input anchor, matched up to the
    /// region end, requires the end.
    pub fn require_end(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|current| current.spans.whole().1 == self.region.1)
            && self.pattern.native().ends_anchored()
    }

    /// Text captured by a group, `None` if it took no part in the match
    ///
    /// Accepts an index, a name or a `(name, instance)` pair.
    pub fn group<'a>(&self, group: impl Into<Group<'a>>) -> Result<Option<&'t str>> {
        let index = group.into().resolve(&self.pattern)?;
        Ok(self.current()?.spans.text(self.input, index))
    }

    /// Start offset of a group
    pub fn start<'a>(&self, group: impl Into<Group<'a>>) -> Result<Option<usize>> {
        let index = group.into().resolve(&self.pattern)?;
        Ok(self.current()?.spans.get(index).map(|(start, _)| start))
    }

    /// End offset of a group
    pub fn end<'a>(&self, group: impl Into<Group<'a>>) -> Result<Option<usize>> {
        let index = group.into().resolve(&self.pattern)?;
        Ok(self.current()?.spans.get(index).map(|(_, end)| end))
    }

    /// The whole matched text
    pub fn as_str(&self) -> Result<&'t str> {
        let (start, end) = self.current()?.spans.whole();
        Ok(&self.input[start..end])
    }

    /// Byte range of the whole match
    pub fn range(&self) -> Result<Range<usize>> {
        let (start, end) = self.current()?.spans.whole();
        Ok(start..end)
    }

    /// Number of capture groups, not counting the whole match
    pub fn group_count(&self) -> usize {
        self.pattern.group_count()
    }

    /// Text of every capture group, in order of opening parenthesis
    pub fn ordered_groups(&self) -> Result<Vec<Option<&'t str>>> {
        Ok(self.current()?.spans.ordered(self.input, &self.pattern))
    }

    /// Name to captured text for the current match
    ///
    /// Groups that took no part are left out. Without a current match the
    /// next match is searched for first; when there is none the map is
    /// empty.
    pub fn named_groups(&mut self) -> Result<HashMap<String, &'t str>> {
        if self.current.is_none() && !self.find()? {
            return Ok(HashMap::new());
        }
        Ok(self.current()?.spans.named(self.input, &self.pattern))
    }

    /// Snapshot of the current match
    pub fn to_match_result(&self) -> Result<MatchResult<'t>> {
        let current = self.current()?;
        Ok(MatchResult::new(
            self.pattern.clone(),
            self.input,
            current.spans.clone(),
        ))
    }

    /// Copy input up to the current match into `buf`, then the expanded
    /// replacement
    ///
    /// `template` may use `${name}` as well as the engine's `$1`, `${1}`
    /// and `$$`. An unknown name is a syntax error even without a match.
    pub fn append_replacement(&mut self, buf: &mut String, template: &str) -> Result<&mut Self> {
        let expanded = Template::parse(template).expand(|name| self.group(name))?;

        let current = self.current()?;
        let (start, end) = current.spans.whole();
        let (lo, hi) = current.window;
        let at = match current.kind {
            MatchKind::Search => start - lo,
            MatchKind::Whole => 0,
        };

        buf.push_str(self.input.get(self.append_pos..start).unwrap_or_default());
        self.pattern
            .native()
            .expand_into(current.kind, &self.input[lo..hi], at, &expanded, buf)?;
        self.append_pos = end;
        Ok(self)
    }

    /// Copy the input after the last replacement into `buf`
    pub fn append_tail(&self, buf: &mut String) {
        buf.push_str(self.input.get(self.append_pos..).unwrap_or_default());
    }

    /// Replace every match, starting over from the beginning
    pub fn replace_all(&mut self, template: &str) -> Result<String> {
        self.reset();
        let mut out = String::with_capacity(self.input.len());
        while self.find()? {
            self.append_replacement(&mut out, template)?;
        }
        self.append_tail(&mut out);
        Ok(out)
    }

    /// Replace the first match, starting over from the beginning
    pub fn replace_first(&mut self, template: &str) -> Result<String> {
        self.reset();
        let mut out = String::with_capacity(self.input.len());
        if self.find()? {
            self.append_replacement(&mut out, template)?;
        }
        self.append_tail(&mut out);
        Ok(out)
    }

    /// The pattern currently in use
    pub fn pattern(&self) -> &NamedPattern {
        &self.pattern
    }

    /// The numbered-group form of the current pattern
    pub fn standard_pattern(&self) -> &str {
        self.pattern.standard_pattern()
    }

    /// Outcome of the last match attempt
    pub fn state(&self) -> MatchState {
        self.state
    }

    /// The slice of input a search may look at
    fn window(&self) -> (usize, usize) {
        let (start, end) = self.region;
        if self.anchoring && !self.transparent {
            (start, end)
        } else {
            (0, end)
        }
    }

    fn current(&self) -> Result<&Current> {
        self.current.as_ref().ok_or(RegexError::NoMatch)
    }

    fn hit(&mut self, spans: Spans, kind: MatchKind, window: (usize, usize)) {
        let (start, end) = spans.whole();
        self.next = if end > start {
            Some(end)
        } else {
            // step over an empty match so it is not found again
            self.input[end..self.region.1]
                .chars()
                .next()
                .map(|c| end + c.len_utf8())
        };
        self.hit_end = end == window.1;
        self.state = MatchState::Matched;
        self.current = Some(Current {
            spans,
            kind,
            window,
        });
    }

    /// Record a failed `find`
    fn miss(&mut self) -> bool {
        self.state = match self.state {
            MatchState::Matched | MatchState::Exhausted => MatchState::Exhausted,
            MatchState::Untried | MatchState::Failed => MatchState::Failed,
        };
        self.next = None;
        self.current = None;
        self.hit_end = true;
        false
    }

    /// Record a failed `matches` or `looking_at`
    fn fail(&mut self, hit_end: bool) {
        self.state = MatchState::Failed;
        self.current = None;
        self.hit_end = hit_end;
    }

    fn check_bound(&self, bound: &'static str, index: usize) -> Result<()> {
        if self.input.is_char_boundary(index) {
            Ok(())
        } else {
            Err(RegexError::RegionOutOfBounds {
                bound,
                index,
                len: self.input.len(),
            })
        }
    }
}

impl fmt::Display for Matcher<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let last = self.as_str().unwrap_or_default();
        write!(
            f,
            "Matcher[pattern={} region={},{} lastmatch={}]",
            self.pattern.named_pattern(),
            self.region.0,
            self.region.1,
            last
        )
    }
}

impl fmt::Debug for Matcher<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matcher")
            .field("pattern", &self.pattern)
            .field("region", &self.region)
            .field("state", &self.state)
            .field("current", &self.current)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUT: &str = "Lorem abcfoo ipsum abcfoo";
    const PATT: &str = "(a)(b)(?:c)(?<named>foo)";

    fn pattern() -> NamedPattern {
        NamedPattern::compile(PATT).unwrap()
    }

    #[test]
    fn test_state_transitions() {
        let p = pattern();
        let mut m = p.matcher(INPUT);
        assert_eq!(m.state(), MatchState::Untried);
        assert!(m.find().unwrap());
        assert_eq!(m.state(), MatchState::Matched);
        assert!(m.find().unwrap());
        assert!(!m.find().unwrap());
        assert_eq!(m.state(), MatchState::Exhausted);
        assert!(!m.find().unwrap());
        assert_eq!(m.state(), MatchState::Exhausted);
        m.reset();
        assert_eq!(m.state(), MatchState::Untried);

        let mut m = p.matcher("hello");
        assert!(!m.find().unwrap());
        assert_eq!(m.state(), MatchState::Failed);
    }

    #[test]
    fn test_group_before_match_is_an_error() {
        let p = pattern();
        let m = p.matcher(INPUT);
        assert_eq!(m.group("named"), Err(RegexError::NoMatch));
        assert_eq!(
            m.group("nonexistentName"),
            Err(RegexError::NoSuchGroup("nonexistentName".to_string()))
        );
    }

    #[test]
    fn test_empty_matches_advance() {
        let p = NamedPattern::compile("(?<n>x*)").unwrap();
        let mut m = p.matcher("ab");
        let mut starts = Vec::new();
        while m.find().unwrap() {
            starts.push(m.start(Group::Index(0)).unwrap().unwrap());
        }
        assert_eq!(starts, vec![0, 1, 2]);
    }

    #[test]
    fn test_empty_matches_step_over_multibyte_chars() {
        let p = NamedPattern::compile("").unwrap();
        let mut m = p.matcher("é");
        assert!(m.find().unwrap());
        assert!(m.find().unwrap());
        assert_eq!(m.range().unwrap(), 2..2);
        assert!(!m.find().unwrap());
    }

    #[test]
    fn test_find_at() {
        let p = pattern();
        let mut m = p.matcher(INPUT);
        assert!(m.find_at(7).unwrap());
        assert_eq!(m.start(Group::Index(0)).unwrap(), Some(19));
        assert!(matches!(
            m.find_at(100),
            Err(RegexError::RegionOutOfBounds { bound: "start", .. })
        ));
    }

    #[test]
    fn test_matches_and_looking_at() {
        let p = NamedPattern::compile(r"(?<word>\w+)").unwrap();
        let mut m = p.matcher("hello world");
        assert!(!m.matches().unwrap());
        assert_eq!(m.state(), MatchState::Failed);
        assert!(m.looking_at().unwrap());
        assert_eq!(m.group("word").unwrap(), Some("hello"));

        m.region(6, 11).unwrap();
        assert!(m.matches().unwrap());
        assert_eq!(m.group("word").unwrap(), Some("world"));
        assert!(m.hit_end());
    }

    #[test]
    fn test_looking_at_requires_match_at_region_start() {
        let p = NamedPattern::compile("(?<x>b)").unwrap();
        let mut m = p.matcher("ab");
        assert!(!m.looking_at().unwrap());
        assert_eq!(m.group("x"), Err(RegexError::NoMatch));
    }

    #[test]
    fn test_require_end() {
        let p = NamedPattern::compile("(?<x>b)$").unwrap();
        let mut m = p.matcher("ab");
        assert!(!m.require_end());
        assert!(m.find().unwrap());
        assert!(m.require_end());

        let p = pattern();
        let mut m = p.matcher("abcfoo");
        assert!(m.find().unwrap());
        assert!(!m.require_end());
    }

    #[test]
    fn test_use_pattern_keeps_position() {
        let p = pattern();
        let mut m = p.matcher("abcfoo xyz abcfoo");
        assert!(m.find().unwrap());
        let other = NamedPattern::compile("(?<named>abc)").unwrap();
        m.use_pattern(Some(&other)).unwrap();
        assert_eq!(m.state(), MatchState::Untried);
        assert!(m.find().unwrap());
        assert_eq!(m.start("named").unwrap(), Some(11));
    }

    #[test]
    fn test_use_pattern_none() {
        let p = pattern();
        let mut m = p.matcher(INPUT);
        let err = m.use_pattern(None).unwrap_err();
        assert_eq!(err.to_string(), "new pattern cannot be None");
    }

    #[test]
    fn test_region_rejects_bad_bounds() {
        let p = pattern();
        let mut m = p.matcher("aé");
        assert!(matches!(
            m.region(2, 3),
            Err(RegexError::RegionOutOfBounds { bound: "start", .. })
        ));
        assert!(matches!(
            m.region(0, 10),
            Err(RegexError::RegionOutOfBounds { bound: "end", .. })
        ));
        assert!(matches!(
            m.region(1, 0),
            Err(RegexError::RegionOutOfBounds { bound: "end", .. })
        ));
    }

    #[test]
    fn test_replacement_with_numbered_and_named_refs() {
        let p = NamedPattern::compile(r"(?<key>\w+)=(\w+)").unwrap();
        let mut m = p.matcher("a=1, b=2");
        assert_eq!(m.replace_all("$2:${key}").unwrap(), "1:a, 2:b");
        assert_eq!(m.replace_first("$$${key}").unwrap(), "$a, b=2");
    }

    #[test]
    fn test_replacement_after_matches() {
        let p = NamedPattern::compile(r"(?<w>\w+)").unwrap();
        let mut m = p.matcher("xx hello yy");
        m.region(3, 8).unwrap();
        assert!(m.matches().unwrap());
        let mut out = String::new();
        m.append_replacement(&mut out, "<$1>").unwrap();
        m.append_tail(&mut out);
        assert_eq!(out, "xx <hello> yy");
    }

    #[test]
    fn test_display() {
        let p = pattern();
        let mut m = p.matcher("abcfoo");
        assert!(m.find().unwrap());
        assert_eq!(
            m.to_string(),
            "Matcher[pattern=(a)(b)(?:c)(?<named>foo) region=0,6 lastmatch=abcfoo]"
        );
    }
}
