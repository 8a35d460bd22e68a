//! Scanner for translating named-group patterns
//!
//! This module walks an extended pattern once, left to right, and produces
//! the equivalent pattern using only numbered groups. It discovers every
//! capture group (named or not), records named groups in a
//! [`NameRegistry`], and collects `\k<name>` sites for the backreference
//! resolver.
//!
//! The walk is a small state machine over three modes (normal text,
//! character class, quote-literal span) plus the length of the current run
//! of backslashes. A character is escaped only when the run in front of it
//! has odd length, so `\\(` opens a group while `\(` and `\\\(` do not.
//!
//! Under comments mode, from [`Flags::COMMENTS`] or an inline `x` flag, an
//! unescaped `#` starts a comment that runs to the end of the line. Inline
//! flags are scoped to the enclosing group like the engine scopes them.

use log::debug;

use crate::backref::{self, BackrefSite};
use crate::error::{Result, SyntaxError};
use crate::flags::Flags;
use crate::groups::NameRegistry;

/// Lexical mode of the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Ordinary pattern text
    Normal,
    /// Inside `[...]`; parentheses are literal
    CharClass,
    /// Inside `\Q...\E`; everything is literal
    Quote,
    /// Inside a `#` comment under comments mode
    Comment,
}

/// A run of translated output
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Piece {
    /// Pattern text copied (or rewritten) for the engine as is
    Verbatim(String),
    /// The body of a `\Q...\E` span; `closed` is false when the input ended
    /// before the `\E`
    Quoted { body: String, closed: bool },
    /// An unresolved `\k<name>` reference
    Backref(BackrefSite),
}

/// The result of translating a named-group pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    named: String,
    standard: String,
    pieces: Vec<Piece>,
    registry: NameRegistry,
}

impl Translation {
    /// The pattern as written, with named syntax
    pub fn named_pattern(&self) -> &str {
        &self.named
    }

    /// The pattern rewritten with numbered groups only
    pub fn standard_pattern(&self) -> &str {
        &self.standard
    }

    /// The name registry built while scanning
    pub fn registry(&self) -> &NameRegistry {
        &self.registry
    }

    /// Distinct group names in first-occurrence order
    pub fn names(&self) -> &[String] {
        self.registry.names()
    }

    pub(crate) fn pieces(&self) -> &[Piece] {
        &self.pieces
    }
}

/// Translate a named-group pattern into numbered-group syntax
///
/// # Example
/// ```
/// use named_regex::translate;
///
/// let t = translate(r"(a)(?<num>\d+)-\k<num>").unwrap();
/// assert_eq!(t.standard_pattern(), r"(a)(\d+)-\2");
/// assert_eq!(t.registry().index_of("num"), Some(2));
/// ```
pub fn translate(pattern: &str) -> Result<Translation> {
    translate_with_flags(pattern, Flags::empty())
}

/// Translate a pattern that will be compiled with `flags`
///
/// Only [`Flags::COMMENTS`] changes the translation: groups written inside
/// `#` comments are not registered.
pub fn translate_with_flags(pattern: &str, flags: Flags) -> Result<Translation> {
    let (pieces, registry) = Scanner::new(pattern, flags.contains(Flags::COMMENTS)).run()?;
    let pieces = backref::resolve(pieces, &registry, pattern)?;
    let standard = render(&pieces);

    debug!(
        "translated {:?} -> {:?} ({} groups, names {:?})",
        pattern,
        standard,
        registry.group_count(),
        registry.names()
    );

    Ok(Translation {
        named: pattern.to_string(),
        standard,
        pieces,
        registry,
    })
}

/// Render pieces back into pattern text, keeping `\Q...\E` spans
fn render(pieces: &[Piece]) -> String {
    let mut out = String::new();
    for piece in pieces {
        match piece {
            Piece::Verbatim(text) => out.push_str(text),
            Piece::Quoted { body, closed } => {
                out.push_str("\\Q");
                out.push_str(body);
                if *closed {
                    out.push_str("\\E");
                }
            }
            Piece::Backref(site) => {
                out.push_str("\\k<");
                out.push_str(&site.name);
                out.push('>');
            }
        }
    }
    out
}

/// Single-pass scanner over an extended pattern
struct Scanner<'a> {
    pattern: &'a str,
    chars: Vec<char>,
    /// Current character offset
    position: usize,
    mode: Mode,
    /// Length of the run of backslashes directly before `position`
    backslashes: usize,
    /// Comments mode is on
    extended: bool,
    /// Comments mode outside each open group
    scopes: Vec<bool>,
    pieces: Vec<Piece>,
    registry: NameRegistry,
}

impl<'a> Scanner<'a> {
    fn new(pattern: &'a str, extended: bool) -> Self {
        Scanner {
            pattern,
            chars: pattern.chars().collect(),
            position: 0,
            mode: Mode::Normal,
            backslashes: 0,
            extended,
            scopes: Vec::new(),
            pieces: Vec::new(),
            registry: NameRegistry::new(),
        }
    }

    fn run(mut self) -> Result<(Vec<Piece>, NameRegistry)> {
        while let Some(&c) = self.chars.get(self.position) {
            if c == '\\' {
                self.backslashes += 1;
                self.emit(c);
                self.position += 1;
                continue;
            }

            let escaped = self.backslashes % 2 == 1;
            match self.mode {
                Mode::Normal => self.step_normal(c, escaped)?,
                Mode::CharClass => self.step_char_class(c, escaped),
                Mode::Quote => self.step_quote(c, escaped),
                Mode::Comment => self.step_comment(c),
            }
            self.backslashes = 0;
        }
        Ok((self.pieces, self.registry))
    }

    fn step_normal(&mut self, c: char, escaped: bool) -> Result<()> {
        match c {
            'Q' if escaped => {
                self.retract_backslash();
                self.pieces.push(Piece::Quoted {
                    body: String::new(),
                    closed: false,
                });
                self.mode = Mode::Quote;
                self.position += 1;
            }
            'E' if escaped => {
                return Err(self.error("\\E without a preceding \\Q", self.position - 1).into());
            }
            'k' if escaped && self.peek(1) == Some('<') => self.read_backref()?,
            '[' if !escaped => {
                self.mode = Mode::CharClass;
                self.emit(c);
                self.position += 1;
            }
            '(' if !escaped => self.read_group_open()?,
            ')' if !escaped => {
                if let Some(extended) = self.scopes.pop() {
                    self.extended = extended;
                }
                self.emit(c);
                self.position += 1;
            }
            '#' if !escaped && self.extended => {
                self.mode = Mode::Comment;
                self.emit(c);
                self.position += 1;
            }
            _ => {
                self.emit(c);
                self.position += 1;
            }
        }
        Ok(())
    }

    fn step_char_class(&mut self, c: char, escaped: bool) {
        if c == ']' && !escaped {
            self.mode = Mode::Normal;
        }
        self.emit(c);
        self.position += 1;
    }

    fn step_quote(&mut self, c: char, escaped: bool) {
        if c == 'E' && escaped {
            self.retract_backslash();
            if let Some(Piece::Quoted { closed, .. }) = self.pieces.last_mut() {
                *closed = true;
            }
            self.mode = Mode::Normal;
        } else {
            self.emit(c);
        }
        self.position += 1;
    }

    fn step_comment(&mut self, c: char) {
        if c == '\n' {
            self.mode = Mode::Normal;
        }
        self.emit(c);
        self.position += 1;
    }

    /// Classify the `(` at the current position and consume its prefix
    fn read_group_open(&mut self) -> Result<()> {
        let open = self.position;

        if self.peek(1) != Some('?') {
            self.scopes.push(self.extended);
            self.registry.register_unnamed();
            self.emit('(');
            self.position += 1;
            return Ok(());
        }

        let named = self.peek(2) == Some('<') && !matches!(self.peek(3), Some('=' | '!'));
        if !named {
            if self.read_inline_flags() {
                return Ok(());
            }
            // (?= (?! (?<= (?<! capture nothing; the rest of the construct
            // is copied as ordinary text
            self.scopes.push(self.extended);
            self.emit('(');
            self.position += 1;
            return Ok(());
        }

        let name_start = open + 3;
        let name_end = self
            .find_name_end(name_start)
            .ok_or_else(|| self.error("named capturing group is missing trailing '>'", open))?;
        if name_end == name_start {
            return Err(self.error("named capturing group has an empty name", open).into());
        }

        let name: String = self.chars[name_start..name_end].iter().collect();
        self.scopes.push(self.extended);
        self.registry.register_named(&name, open);
        self.emit('(');
        self.position = name_end + 1;
        Ok(())
    }

    /// Copy a `(?flags)` or `(?flags:` prefix, tracking the `x` flag
    ///
    /// Returns false, consuming nothing, when the group is not one of these.
    fn read_inline_flags(&mut self) -> bool {
        let letters_start = self.position + 2;
        let letters_end = self.chars[letters_start..]
            .iter()
            .position(|c| !(c.is_ascii_alphabetic() || *c == '-'))
            .map(|len| letters_start + len);
        let Some(end) = letters_end else {
            return false;
        };

        let scoped = match self.chars[end] {
            ':' => true,
            ')' => false,
            _ => return false,
        };

        let mut extended = self.extended;
        let mut on = true;
        for &c in &self.chars[letters_start..end] {
            match c {
                '-' => on = false,
                'x' => extended = on,
                _ => {}
            }
        }

        if scoped {
            self.scopes.push(self.extended);
        }
        self.extended = extended;
        for i in self.position..=end {
            self.emit(self.chars[i]);
        }
        self.position = end + 1;
        true
    }

    /// Record a `\k<name>` reference; the backslash is already emitted
    fn read_backref(&mut self) -> Result<()> {
        let name_start = self.position + 2;
        let name_end = self
            .find_name_end(name_start)
            .ok_or_else(|| self.error("named backreference is missing trailing '>'", name_start))?;

        self.retract_backslash();
        let name: String = self.chars[name_start..name_end].iter().collect();
        let before_digit = self
            .chars
            .get(name_end + 1)
            .is_some_and(|c| c.is_ascii_digit());
        self.pieces.push(Piece::Backref(BackrefSite {
            name,
            offset: name_start,
            before_digit,
        }));
        self.position = name_end + 1;
        Ok(())
    }

    /// Offset of the first unescaped `>` at or after `from`
    fn find_name_end(&self, from: usize) -> Option<usize> {
        let mut backslashes = 0;
        for (offset, &c) in self.chars.iter().enumerate().skip(from) {
            match c {
                '>' if backslashes % 2 == 0 => return Some(offset),
                '\\' => backslashes += 1,
                _ => backslashes = 0,
            }
        }
        None
    }

    fn peek(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.position + ahead).copied()
    }

    /// Append a character to the current output piece
    fn emit(&mut self, c: char) {
        if self.mode == Mode::Quote
            && let Some(Piece::Quoted { body, .. }) = self.pieces.last_mut()
        {
            body.push(c);
            return;
        }
        match self.pieces.last_mut() {
            Some(Piece::Verbatim(text)) => text.push(c),
            _ => self.pieces.push(Piece::Verbatim(c.to_string())),
        }
    }

    /// Drop the backslash that introduced an escape we are rewriting
    fn retract_backslash(&mut self) {
        match self.pieces.last_mut() {
            Some(Piece::Verbatim(text)) | Some(Piece::Quoted { body: text, .. }) => {
                text.pop();
            }
            _ => {}
        }
    }

    fn error(&self, description: &str, index: usize) -> SyntaxError {
        SyntaxError::new(description, index, self.pattern)
    }
}
