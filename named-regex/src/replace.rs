//! Replacement template handling
//!
//! This module expands `${name}` references inside replacement templates
//! into the text captured by the named group in the current match. The
//! result is still a native template: everything outside `${name}` spans
//! (including `$1`, `${1}` and the `$$` escape) is left for the engine's own
//! expansion, and substituted text is escaped so the engine copies it
//! literally. Bare `$1` references are rewritten as `${1}`.

use fancy_regex::Expander;

use crate::error::{RegexError, Result, SyntaxError};

/// A part of a replacement template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart {
    /// Native template text
    Literal(String),
    /// A `${name}` reference
    Named {
        /// The referenced name
        name: String,
        /// Character offset of the name (just past `${`) in the template
        offset: usize,
    },
}

/// A parsed replacement template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    parts: Vec<TemplatePart>,
}

impl Template {
    /// Parse a replacement template
    ///
    /// `${` without a closing `}` and purely numeric `${1}` references are
    /// kept as native text.
    pub fn parse(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let mut parts = Vec::new();
        let mut current_literal = String::new();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            if c != '$' {
                current_literal.push(c);
                i += 1;
                continue;
            }

            match chars.get(i + 1) {
                Some('$') => {
                    // escaped dollar, the engine turns it back into `$`
                    current_literal.push_str("$$");
                    i += 2;
                }
                Some('{') => {
                    let name_start = i + 2;
                    let close = chars[name_start..].iter().position(|&c| c == '}');
                    let Some(len) = close else {
                        current_literal.push(c);
                        i += 1;
                        continue;
                    };
                    let name: String = chars[name_start..name_start + len].iter().collect();
                    if !name.is_empty() && name.chars().all(|c| c.is_ascii_digit()) {
                        current_literal.push_str("${");
                        current_literal.push_str(&name);
                        current_literal.push('}');
                    } else {
                        if !current_literal.is_empty() {
                            parts.push(TemplatePart::Literal(std::mem::take(&mut current_literal)));
                        }
                        parts.push(TemplatePart::Named {
                            name,
                            offset: name_start,
                        });
                    }
                    i = name_start + len + 1;
                }
                Some(&next) if is_ref_char(next) => {
                    // braced, so substituted text right after it cannot
                    // extend the reference
                    let len = chars[i + 1..].iter().take_while(|&&c| is_ref_char(c)).count();
                    current_literal.push_str("${");
                    current_literal.extend(&chars[i + 1..i + 1 + len]);
                    current_literal.push('}');
                    i += 1 + len;
                }
                _ => {
                    current_literal.push(c);
                    i += 1;
                }
            }
        }

        if !current_literal.is_empty() {
            parts.push(TemplatePart::Literal(current_literal));
        }

        Template {
            source: input.to_string(),
            parts,
        }
    }

    /// Expand named references, producing a native template
    ///
    /// `resolve` maps a name to the text its group captured, `None` when
    /// the group took no part in the match. A [`RegexError::NoSuchGroup`]
    /// from `resolve` becomes a [`SyntaxError`] pointing at the reference;
    /// any other error is returned unchanged.
    pub fn expand<'a, F>(&self, mut resolve: F) -> Result<String>
    where
        F: FnMut(&str) -> Result<Option<&'a str>>,
    {
        let expander = Expander::default();
        let mut out = String::with_capacity(self.source.len());

        for part in &self.parts {
            match part {
                TemplatePart::Literal(text) => out.push_str(text),
                TemplatePart::Named { name, offset } => match resolve(name) {
                    Ok(Some(value)) => out.push_str(&expander.escape(value)),
                    Ok(None) => {}
                    Err(RegexError::NoSuchGroup(_)) => {
                        return Err(SyntaxError::new("unknown group name", *offset, &self.source).into());
                    }
                    Err(err) => return Err(err),
                },
            }
        }

        Ok(out)
    }

    /// The template as given
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Get the parts of the template
    pub fn parts(&self) -> &[TemplatePart] {
        &self.parts
    }
}

/// Characters the engine accepts in a bare `$ref`
fn is_ref_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Result<Option<&'static str>> {
        match name {
            "named" => Ok(Some("foo")),
            "dollar" => Ok(Some("$5")),
            "absent" => Ok(None),
            _ => Err(RegexError::NoSuchGroup(name.to_string())),
        }
    }

    #[test]
    fn test_parse_literal() {
        let t = Template::parse("hello");
        assert_eq!(t.parts(), [TemplatePart::Literal("hello".to_string())]);
    }

    #[test]
    fn test_parse_named_reference() {
        let t = Template::parse("a${named}b");
        assert_eq!(t.parts().len(), 3);
        assert_eq!(
            t.parts()[1],
            TemplatePart::Named {
                name: "named".to_string(),
                offset: 3
            }
        );
    }

    #[test]
    fn test_native_references_pass_through() {
        let t = Template::parse("$1-${2}-$$");
        assert_eq!(t.parts(), [TemplatePart::Literal("${1}-${2}-$$".to_string())]);
    }

    #[test]
    fn test_bare_reference_is_braced_before_substitution() {
        let t = Template::parse("$1${named}");
        assert_eq!(t.expand(lookup).unwrap(), "${1}foo");
    }

    #[test]
    fn test_escaped_dollar_does_not_open_reference() {
        let t = Template::parse("$${named}");
        assert_eq!(t.parts(), [TemplatePart::Literal("$${named}".to_string())]);
    }

    #[test]
    fn test_unclosed_reference_is_literal() {
        let t = Template::parse("cost ${named");
        assert_eq!(t.parts(), [TemplatePart::Literal("cost ${named".to_string())]);
    }

    #[test]
    fn test_expand_named_references() {
        let t = Template::parse("${named}@${named}#");
        assert_eq!(t.expand(lookup).unwrap(), "foo@foo#");
    }

    #[test]
    fn test_expand_escapes_substituted_text() {
        let t = Template::parse("[${dollar}]");
        assert_eq!(t.expand(lookup).unwrap(), "[$$5]");
    }

    #[test]
    fn test_expand_non_participating_group_is_empty() {
        let t = Template::parse("<${absent}>");
        assert_eq!(t.expand(lookup).unwrap(), "<>");
    }

    #[test]
    fn test_expand_unknown_name() {
        let t = Template::parse("${nonexistentName} foobar!");
        let err = t.expand(lookup).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown group name near index 2\n${nonexistentName} foobar!\n  ^"
        );
    }

    #[test]
    fn test_expand_propagates_other_errors() {
        let t = Template::parse("${named}");
        let err = t.expand(|_| Err(RegexError::NoMatch)).unwrap_err();
        assert_eq!(err, RegexError::NoMatch);
    }
}
