//! Binding to the numbered-group regex engine
//!
//! This module lowers a [`Translation`] into `fancy-regex` syntax and runs
//! searches over it. The engine has no `\Q...\E` spans, so quoted text is
//! escaped here; compilation flags become an inline flag group.
//!
//! Two regexes are compiled per pattern: one for searching and an anchored
//! twin (`\A(?:...)\z`) for whole-region matching.

use fancy_regex::{Expander, Regex};
use log::{debug, warn};

use crate::error::{Result, SyntaxError};
use crate::flags::Flags;
use crate::result::Spans;
use crate::scanner::{Piece, Translation};

/// Which of the two compiled regexes produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MatchKind {
    /// Unanchored search from a position
    Search,
    /// Whole-haystack match
    Whole,
}

/// A translated pattern compiled by the engine
#[derive(Debug)]
pub(crate) struct NativeRegex {
    search: Regex,
    whole: Regex,
    /// The pattern ends in an end-of-input anchor
    ends_anchored: bool,
}

impl NativeRegex {
    /// Compile a translation with the given flags
    pub(crate) fn compile(translation: &Translation, flags: Flags) -> Result<Self> {
        let ignored = flags.without_effect();
        if !ignored.is_empty() {
            warn!("flags {:?} have no effect on this engine", ignored);
        }

        let literal = flags.contains(Flags::LITERAL);
        let (body, letters) = if literal {
            let letters = if flags.contains(Flags::CASE_INSENSITIVE) { "i" } else { "" };
            (regex::escape(translation.named_pattern()), letters.to_string())
        } else {
            (lower(translation.pieces()), flags.inline_letters())
        };
        let pieces = (!literal).then(|| translation.pieces());

        let prefix = if letters.is_empty() {
            String::new()
        } else {
            format!("(?{})", letters)
        };

        let search_text = format!("{}{}", prefix, body);
        let search = build(&search_text, prefix.len(), pieces, translation)?;

        // under comments mode, set by flag or inline `(?x)`, a trailing `#`
        // comment swallows the closing parenthesis; the body alone compiled,
        // so a newline is only ever needed to end such a comment
        let whole_start = prefix.len() + "\\A(?:".len();
        let whole_text = format!("{}\\A(?:{})\\z", prefix, body);
        let whole = build(&whole_text, whole_start, pieces, translation).or_else(|_| {
            let terminated = format!("{}\\A(?:{}\n)\\z", prefix, body);
            build(&terminated, whole_start, pieces, translation)
        })?;

        debug!(
            "compiled {:?} as {:?} with flags {:?}",
            translation.named_pattern(),
            search_text,
            flags
        );

        Ok(NativeRegex {
            search,
            whole,
            ends_anchored: !literal && ends_with_end_anchor(&body),
        })
    }

    /// Search `haystack` starting at byte offset `pos`
    pub(crate) fn search(&self, haystack: &str, pos: usize) -> Result<Option<Spans>> {
        captures(&self.search, haystack, pos)
    }

    /// Match the whole of `haystack`
    pub(crate) fn match_whole(&self, haystack: &str) -> Result<Option<Spans>> {
        captures(&self.whole, haystack, 0)
    }

    /// Expand a native template against the match of `kind` found at `at`
    ///
    /// The match is found again rather than kept, which yields the same
    /// captures because matching is deterministic.
    pub(crate) fn expand_into(
        &self,
        kind: MatchKind,
        haystack: &str,
        at: usize,
        template: &str,
        dst: &mut String,
    ) -> Result<()> {
        let regex = match kind {
            MatchKind::Search => &self.search,
            MatchKind::Whole => &self.whole,
        };
        if let Some(caps) = regex.captures_from_pos(haystack, at)? {
            Expander::default().append_expansion(dst, template, &caps);
        }
        Ok(())
    }

    /// Whether a match must end at the end of input to succeed
    pub(crate) fn ends_anchored(&self) -> bool {
        self.ends_anchored
    }
}

/// Compile `text`, whose translated body starts at byte `body_start`
///
/// Parse errors inside the body are reported against the standard pattern.
fn build(
    text: &str,
    body_start: usize,
    pieces: Option<&[Piece]>,
    translation: &Translation,
) -> Result<Regex> {
    Regex::new(text).map_err(|err| {
        let standard = translation.standard_pattern();
        let located = match &err {
            fancy_regex::Error::ParseError(at, kind) => pieces
                .zip(at.checked_sub(body_start))
                .and_then(|(pieces, at)| standard_offset(pieces, at))
                .and_then(|at| standard.get(..at))
                .map(|before| (before.chars().count(), kind.to_string())),
            _ => None,
        };
        match located {
            Some((index, description)) => SyntaxError::new(description, index, standard).into(),
            None => SyntaxError::unpositioned(err.to_string(), standard).into(),
        }
    })
}

/// Map a byte offset in the lowered body to one in the standard pattern
///
/// Offsets inside a quoted span map to the span's `\Q`.
fn standard_offset(pieces: &[Piece], offset: usize) -> Option<usize> {
    let mut lowered = 0;
    let mut standard = 0;
    for piece in pieces {
        let (lowered_len, standard_len) = match piece {
            Piece::Verbatim(text) => (text.len(), text.len()),
            Piece::Quoted { body, closed } => {
                let delimiters = if *closed { 4 } else { 2 };
                (regex::escape(body).len(), body.len() + delimiters)
            }
            Piece::Backref(site) => {
                let len = site.name.len() + 4;
                (len, len)
            }
        };
        if offset < lowered + lowered_len {
            return Some(match piece {
                Piece::Verbatim(_) => standard + (offset - lowered),
                _ => standard,
            });
        }
        lowered += lowered_len;
        standard += standard_len;
    }
    (offset == lowered).then_some(standard)
}

fn captures(regex: &Regex, haystack: &str, pos: usize) -> Result<Option<Spans>> {
    let found = regex.captures_from_pos(haystack, pos)?;
    Ok(found.map(|caps| {
        Spans(
            (0..caps.len())
                .map(|i| caps.get(i).map(|m| (m.start(), m.end())))
                .collect(),
        )
    }))
}

/// Render pieces in engine syntax
fn lower(pieces: &[Piece]) -> String {
    let mut out = String::new();
    for piece in pieces {
        match piece {
            Piece::Verbatim(text) => out.push_str(text),
            Piece::Quoted { body, .. } => out.push_str(&regex::escape(body)),
            // resolved before a translation is handed out
            Piece::Backref(site) => out.push_str(&format!("\\k<{}>", site.name)),
        }
    }
    out
}

/// Whether `pattern` ends in an unescaped `$`, `\z` or `\Z`
fn ends_with_end_anchor(pattern: &str) -> bool {
    let bytes = pattern.as_bytes();
    let slashes_before = |end: usize| bytes[..end].iter().rev().take_while(|&&b| b == b'\\').count();
    match bytes.last() {
        Some(b'$') => slashes_before(bytes.len() - 1) % 2 == 0,
        Some(b'z' | b'Z') => slashes_before(bytes.len() - 1) % 2 == 1,
        _ => false,
    }
}
