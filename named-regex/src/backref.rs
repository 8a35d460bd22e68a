//! Named backreference resolution
//!
//! The scanner leaves every unescaped `\k<name>` outside quote-literal spans
//! as a [`BackrefSite`]. Once the whole pattern has been scanned (so forward
//! references work too) each site is replaced with the engine's numbered
//! backreference to the first group declared under that name.

use crate::error::{Result, SyntaxError};
use crate::groups::NameRegistry;
use crate::scanner::Piece;

/// A `\k<name>` occurrence awaiting resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BackrefSite {
    /// The referenced name
    pub name: String,
    /// Character offset of the name (just past `\k<`) in the named pattern
    pub offset: usize,
    /// Whether a digit follows the closing `>`
    pub before_digit: bool,
}

/// Replace every backreference site with its numbered form
pub(crate) fn resolve(pieces: Vec<Piece>, registry: &NameRegistry, pattern: &str) -> Result<Vec<Piece>> {
    pieces
        .into_iter()
        .map(|piece| match piece {
            Piece::Backref(site) => {
                let index = registry
                    .index_of(&site.name)
                    .ok_or_else(|| SyntaxError::new("unknown group name", site.offset, pattern))?;
                Ok(Piece::Verbatim(numbered(index, site.before_digit)))
            }
            other => Ok(other),
        })
        .collect()
}

/// Numbered backreference text for `index`
///
/// A following digit would be read as part of the group number, so the
/// reference is fenced in a non-capturing group in that case.
fn numbered(index: usize, before_digit: bool) -> String {
    if before_digit {
        format!("(?:\\{})", index)
    } else {
        format!("\\{}", index)
    }
}
