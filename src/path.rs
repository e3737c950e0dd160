//! Reference paths: `$`, `$.key`, `$[0]`, `$['odd key']`.
//!
//! A [`Path`] locates a node relative to the root of the document. The
//! serializer records one for the first occurrence of every container and
//! writes it back for later occurrences; the parser resolves it against the
//! part of the document built so far.
//!
//! ```rust
//! use fron::path::{parse_path, Accessor, Path};
//!
//! let (path, consumed) = parse_path("$.abc['x y'][2], rest").unwrap();
//! assert_eq!(consumed, 15);
//! assert_eq!(
//!     path.accessors(),
//!     &[
//!         Accessor::Key("abc".into()),
//!         Accessor::Key("x y".into()),
//!         Accessor::Index(2),
//!     ]
//! );
//! assert_eq!(path.to_string(), "$.abc['x y'][2]");
//! ```

use crate::compound::Instance;
use crate::literal;
use crate::{registry, Error, Result, Value};
use std::fmt;
use std::str::FromStr;
use tracing::trace;

/// One step of a path.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Accessor {
    Key(String),
    Index(usize),
}

/// A sequence of accessors starting at the root.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Path(Vec<Accessor>);

impl Path {
    /// The path of the root itself, written `$`.
    #[must_use]
    pub fn root() -> Self {
        Path(Vec::new())
    }

    #[must_use]
    pub fn accessors(&self) -> &[Accessor] {
        &self.0
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns this path extended by one accessor.
    #[must_use]
    pub fn child(&self, accessor: Accessor) -> Path {
        let mut accessors = Vec::with_capacity(self.0.len() + 1);
        accessors.extend_from_slice(&self.0);
        accessors.push(accessor);
        Path(accessors)
    }

    #[must_use]
    pub fn key(&self, key: &str) -> Path {
        self.child(Accessor::Key(key.to_string()))
    }

    #[must_use]
    pub fn index(&self, index: usize) -> Path {
        self.child(Accessor::Index(index))
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for accessor in &self.0 {
            match accessor {
                Accessor::Key(key) if is_identifier(key) => write!(f, ".{key}")?,
                Accessor::Key(key) => write!(f, "[{}]", literal::string_to_literal(key, '\''))?,
                Accessor::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = Error;

    /// Parses a complete path; unlike [`parse_path`] trailing text is an error.
    fn from_str(s: &str) -> Result<Self> {
        match parse_path(s) {
            Some((path, consumed)) if consumed == s.len() => Ok(path),
            Some((_, consumed)) => Err(Error::syntax(consumed, 1, consumed + 1, "invalid path accessor")),
            None => Err(Error::syntax(0, 1, 1, "path must start with '$'")),
        }
    }
}

/// Returns `true` if `s` can be written as a bare key: `[A-Za-z_$][A-Za-z0-9_$]*`.
///
/// ```rust
/// use fron::path::is_identifier;
///
/// assert!(is_identifier("_private$1"));
/// assert!(!is_identifier("1abc"));
/// assert!(!is_identifier("with space"));
/// assert!(!is_identifier(""));
/// ```
#[must_use]
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if is_identifier_start(c) => chars.all(is_identifier_part),
        _ => false,
    }
}

pub(crate) fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

pub(crate) fn is_identifier_part(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// Parses the longest path at the start of `text`.
///
/// Returns `None` unless `text` starts with `$`. Parsing stops cleanly before
/// the first accessor that is not well formed, so `$.a.` yields `$.a` with
/// three bytes consumed.
#[must_use]
pub fn parse_path(text: &str) -> Option<(Path, usize)> {
    if !text.starts_with('$') {
        return None;
    }
    let mut accessors = Vec::new();
    let mut pos = 1;
    while let Some((accessor, len)) = parse_accessor(&text[pos..]) {
        accessors.push(accessor);
        pos += len;
    }
    Some((Path(accessors), pos))
}

fn parse_accessor(text: &str) -> Option<(Accessor, usize)> {
    let mut chars = text.chars();
    match chars.next()? {
        '.' => {
            let name_len = text[1..]
                .char_indices()
                .find(|&(i, c)| if i == 0 { !is_identifier_start(c) } else { !is_identifier_part(c) })
                .map_or(text.len() - 1, |(i, _)| i);
            if name_len == 0 {
                return None;
            }
            Some((Accessor::Key(text[1..=name_len].to_string()), name_len + 1))
        }
        '[' => {
            let mut pos = 1 + leading_whitespace(&text[1..]);
            let rest = &text[pos..];
            let accessor = match rest.chars().next()? {
                '\'' | '"' | '`' => {
                    let (key, len) = literal::scan_string(rest).ok()?;
                    pos += len;
                    Accessor::Key(key)
                }
                c if c.is_ascii_digit() => {
                    let len = rest.bytes().take_while(u8::is_ascii_digit).count();
                    let index = rest[..len].parse().ok()?;
                    pos += len;
                    Accessor::Index(index)
                }
                _ => return None,
            };
            pos += leading_whitespace(&text[pos..]);
            if text[pos..].starts_with(']') {
                Some((accessor, pos + 1))
            } else {
                None
            }
        }
        _ => None,
    }
}

fn leading_whitespace(text: &str) -> usize {
    text.len() - text.trim_start().len()
}

/// Turns the string argument of `Reference("…")` into a path.
///
/// The string may be a full path (`"$.a"`), a bracketed tail (`"[0].a"`), or
/// a bare key chain as older writers emitted (`"abc.prop2"`).
pub(crate) fn normalize_reference(text: &str) -> String {
    if text.is_empty() {
        "$".to_string()
    } else if text.starts_with('$') {
        text.to_string()
    } else if text.starts_with('[') {
        format!("${text}")
    } else {
        format!("$.{text}")
    }
}

/// Follows `path` from `root`.
///
/// Objects are indexed by key (an index accessor is looked up as its
/// decimal key), arrays by position (a numeric key accessor indexes), and
/// compounds by descending into their encoded body. The error is a
/// human-readable reason.
pub fn resolve(root: &Value, path: &Path) -> std::result::Result<Value, String> {
    let mut current = root.clone();
    for (depth, accessor) in path.accessors().iter().enumerate() {
        current = step(&current, accessor)?.ok_or_else(|| {
            let prefix = Path(path.accessors()[..=depth].to_vec());
            format!("nothing at {prefix}")
        })?;
    }
    trace!(path = %path, "resolved reference");
    Ok(current)
}

fn step(value: &Value, accessor: &Accessor) -> std::result::Result<Option<Value>, String> {
    Ok(match (value, accessor) {
        (Value::Object(members), Accessor::Key(key)) => members.borrow().get(key).cloned(),
        (Value::Object(members), Accessor::Index(index)) => {
            members.borrow().get(&index.to_string()).cloned()
        }
        (Value::Array(items), Accessor::Index(index)) => items.borrow().get(*index).cloned(),
        (Value::Array(items), Accessor::Key(key)) => match key.parse::<usize>() {
            Ok(index) => items.borrow().get(index).cloned(),
            Err(_) => None,
        },
        (Value::Compound(compound), accessor) => {
            let body = {
                let compound = compound.borrow();
                match compound.instance() {
                    // Still being parsed, or an open record: the body is the live node.
                    Instance::Record(body) => Some(body.clone()),
                    _ => registry::resolve_encoder(&compound)
                        .map_err(|e| e.to_string())?
                        .1
                        .body()
                        .cloned(),
                }
            };
            match body {
                Some(body) => step(&body, accessor)?,
                None => None,
            }
        }
        _ => None,
    })
}
