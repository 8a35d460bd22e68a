//! Named Regex Library
//!
//! Named capturing groups (`(?<name>...)`), named backreferences
//! (`\k<name>`) and named replacement references (`${name}`) on top of a
//! regex engine that only knows numbered groups.
//!
//! Patterns are translated once into numbered-group syntax while a registry
//! records which native index each name maps to. Names may be reused; each
//! use is a separate group and can be addressed by instance.
//!
//! # Example
//! ```
//! use named_regex::NamedPattern;
//!
//! let p = NamedPattern::compile(r"(?<user>\w+)@(?<host>[\w.]+)").unwrap();
//! let mut m = p.matcher("mail root@example.org now");
//! assert!(m.find().unwrap());
//! assert_eq!(m.group("host").unwrap(), Some("example.org"));
//! assert_eq!(m.replace_all("${host}/${user}").unwrap(), "mail example.org/root now");
//! ```

mod backref;
mod engine;
pub mod error;
pub mod flags;
pub mod groups;
pub mod matcher;
pub mod pattern;
pub mod replace;
pub mod result;
pub mod scanner;

pub use error::{RegexError, Result, SyntaxError};
pub use flags::Flags;
pub use groups::{GroupInfo, NameRegistry};
pub use matcher::{MatchState, Matcher};
pub use pattern::NamedPattern;
pub use replace::{Template, TemplatePart};
pub use result::{Group, MatchResult};
pub use scanner::{Translation, translate, translate_with_flags};
