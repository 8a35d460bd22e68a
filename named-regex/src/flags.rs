//! Compilation flags
//!
//! The bit values follow the conventional regex flag numbering so callers
//! can pass masks through unchanged. Only the engine binding looks at them.

use bitflags::bitflags;

bitflags! {
    /// Flags accepted when compiling a pattern
    #[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
    pub struct Flags: u32 {
        /// Only `\n` is a line terminator
        const UNIX_LINES              = 0x01;
        /// Case-insensitive matching
        const CASE_INSENSITIVE        = 0x02;
        /// Whitespace and `#` comments are ignored in the pattern
        const COMMENTS                = 0x04;
        /// `^` and `$` match at line boundaries
        const MULTILINE               = 0x08;
        /// The whole pattern is literal text
        const LITERAL                 = 0x10;
        /// `.` matches line terminators
        const DOTALL                  = 0x20;
        /// Unicode-aware case folding
        const UNICODE_CASE            = 0x40;
        /// Canonical equivalence
        const CANON_EQ                = 0x80;
        /// Unicode character classes
        const UNICODE_CHARACTER_CLASS = 0x100;
    }
}

impl Flags {
    /// Inline flag letters understood by the engine, e.g. `"is"`
    pub(crate) fn inline_letters(self) -> String {
        let mut letters = String::new();
        if self.contains(Flags::CASE_INSENSITIVE) {
            letters.push('i');
        }
        if self.contains(Flags::MULTILINE) {
            letters.push('m');
        }
        if self.contains(Flags::DOTALL) {
            letters.push('s');
        }
        if self.contains(Flags::COMMENTS) {
            letters.push('x');
        }
        letters
    }

    /// Flags that are accepted but change nothing in the bound engine
    pub(crate) fn without_effect(self) -> Flags {
        self & (Flags::UNIX_LINES
            | Flags::UNICODE_CASE
            | Flags::CANON_EQ
            | Flags::UNICODE_CHARACTER_CLASS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_values() {
        assert_eq!(Flags::CASE_INSENSITIVE.bits(), 2);
        assert_eq!((Flags::CASE_INSENSITIVE | Flags::COMMENTS).bits(), 6);
        assert_eq!(Flags::default(), Flags::empty());
    }

    #[test]
    fn test_inline_letters() {
        let flags = Flags::CASE_INSENSITIVE | Flags::DOTALL | Flags::LITERAL;
        assert_eq!(flags.inline_letters(), "is");
        assert_eq!(Flags::empty().inline_letters(), "");
    }

    #[test]
    fn test_without_effect() {
        let flags = Flags::UNICODE_CASE | Flags::MULTILINE;
        assert_eq!(flags.without_effect(), Flags::UNICODE_CASE);
    }
}
