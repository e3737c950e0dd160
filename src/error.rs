//! Error types for FRON serialization and parsing.
//!
//! Every failure aborts the call in progress; there is no partial output.
//!
//! ## Error Categories
//!
//! - **Syntax Errors**: the text does not match the grammar, with byte offset,
//!   line and column
//! - **Reference Errors**: a `$…` path does not resolve against the value
//!   being rebuilt (missing key, index out of range, forward reference)
//! - **Invalid Compounds**: a registered type rejected its body, e.g. `Date("nope")`
//! - **Duplicate Types**: strict registration of a name that already exists
//! - **Depth Limits**: nesting deeper than the configured maximum
//!
//! An unrecognized compound name is *not* an error: `Foo({a:1})` parses into
//! an open record tagged `Foo`.
//!
//! ## Examples
//!
//! ```rust
//! use fron::{parse, Error};
//!
//! let err = parse("{a: [1, 2}").unwrap_err();
//! assert!(matches!(err, Error::Syntax { .. }));
//!
//! let err = parse("{a: $.b, b: 1}").unwrap_err();
//! assert!(matches!(err, Error::Reference { .. }));
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors that can occur while stringifying or parsing FRON.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// The text does not match the grammar at `offset`
    #[error("Syntax error at line {line}, column {col} (offset {offset}): {msg}")]
    Syntax {
        offset: usize,
        line: usize,
        col: usize,
        msg: String,
    },

    /// A reference path could not be resolved against the value under construction
    #[error("Cannot resolve reference {path} at offset {offset}: {msg}")]
    Reference {
        path: String,
        offset: usize,
        msg: String,
    },

    /// A registered type rejected the body it was given
    #[error("Invalid {type_name} at offset {offset}: {msg}")]
    InvalidCompound {
        type_name: String,
        offset: usize,
        msg: String,
    },

    /// Strict registration found an existing entry with the same name
    #[error("Type '{0}' is already registered")]
    DuplicateType(String),

    /// Nesting exceeded the configured maximum depth
    #[error("Maximum nesting depth of {max} exceeded")]
    DepthLimit { max: usize },

    /// Value that has no textual form
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a syntax error at the given position.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fron::Error;
    ///
    /// let err = Error::syntax(12, 2, 5, "expected ':'");
    /// assert!(err.to_string().contains("line 2"));
    /// ```
    pub fn syntax(offset: usize, line: usize, col: usize, msg: &str) -> Self {
        Error::Syntax {
            offset,
            line,
            col,
            msg: msg.to_string(),
        }
    }

    /// Creates a reference-resolution error for `path` found at `offset`.
    pub fn reference(path: &str, offset: usize, msg: &str) -> Self {
        Error::Reference {
            path: path.to_string(),
            offset,
            msg: msg.to_string(),
        }
    }

    /// Creates an error for a known compound type whose body could not be decoded.
    ///
    /// Decode hooks usually return [`Error::custom`]; the parser rewraps that
    /// message with the type name and offset.
    pub fn invalid_compound(type_name: &str, offset: usize, msg: &str) -> Self {
        Error::InvalidCompound {
            type_name: type_name.to_string(),
            offset,
            msg: msg.to_string(),
        }
    }

    /// Creates an unsupported type error for values that have no textual form.
    pub fn unsupported_type(msg: &str) -> Self {
        Error::UnsupportedType(msg.to_string())
    }

    /// Creates a custom error with a display message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fron::Error;
    ///
    /// let err = Error::custom("something went wrong");
    /// assert!(err.to_string().contains("something went wrong"));
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for file reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Byte offset into the source text, for errors raised by the parser.
    #[must_use]
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::Syntax { offset, .. }
            | Error::Reference { offset, .. }
            | Error::InvalidCompound { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_accessor() {
        assert_eq!(Error::syntax(7, 1, 8, "x").offset(), Some(7));
        assert_eq!(Error::reference("$.a", 3, "missing").offset(), Some(3));
        assert_eq!(Error::invalid_compound("Date", 0, "bad").offset(), Some(0));
        assert_eq!(Error::DuplicateType("User".into()).offset(), None);
    }

    #[test]
    fn test_messages() {
        let err = Error::reference("$.abc[3]", 42, "index out of range");
        let msg = err.to_string();
        assert!(msg.contains("$.abc[3]"));
        assert!(msg.contains("42"));

        let err = Error::DepthLimit { max: 8 };
        assert!(err.to_string().contains('8'));
    }
}
