//! Configuration options for FRON serialization and parsing.
//!
//! - [`FronOptions`]: output formatting for [`stringify`](crate::stringify)
//! - [`ParseOptions`]: limits for [`parse_with_options`](crate::parse_with_options)
//!
//! ## Examples
//!
//! ```rust
//! use fron::{fron, stringify, FronOptions};
//!
//! let data = fron!({ "x": 1, "y": 2 });
//!
//! // `false` is compact, `true` indents with two spaces
//! assert_eq!(stringify(&data, false).unwrap(), "{x:1,y:2}");
//! assert_eq!(stringify(&data, true).unwrap(), "{\n  x: 1,\n  y: 2\n}");
//!
//! // Any string is used verbatim as the indent unit
//! let options = FronOptions::new().with_indent("\t");
//! assert_eq!(stringify(&data, options).unwrap(), "{\n\tx: 1,\n\ty: 2\n}");
//! ```

/// Default recursion bound for both directions.
///
/// Low enough that an unoptimized build on a 2 MiB thread returns
/// [`Error::DepthLimit`](crate::Error::DepthLimit) before the stack runs out.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Configuration options for FRON serialization.
///
/// An empty indent means compact output with no inserted whitespace.
///
/// # Examples
///
/// ```rust
/// use fron::FronOptions;
///
/// let options = FronOptions::new();
/// assert!(!options.is_pretty());
///
/// let options = FronOptions::pretty();
/// assert_eq!(options.indent, "  ");
///
/// let options: FronOptions = "    ".into();
/// assert_eq!(options.indent, "    ");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct FronOptions {
    pub indent: String,
    pub max_depth: usize,
}

impl Default for FronOptions {
    fn default() -> Self {
        FronOptions {
            indent: String::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl FronOptions {
    /// Creates default options (compact output).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options for pretty-printed output with a two-space indent.
    #[must_use]
    pub fn pretty() -> Self {
        FronOptions {
            indent: "  ".to_string(),
            ..Default::default()
        }
    }

    /// Sets the indent unit used once per nesting level.
    ///
    /// An empty string switches back to compact output.
    #[must_use]
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    /// Sets the maximum container nesting depth.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fron::{fron, stringify, Error, FronOptions};
    ///
    /// let nested = fron!([[[1]]]);
    /// let err = stringify(&nested, FronOptions::new().with_max_depth(2)).unwrap_err();
    /// assert_eq!(err, Error::DepthLimit { max: 2 });
    /// ```
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Returns `true` when output will contain newlines and indentation.
    #[must_use]
    pub fn is_pretty(&self) -> bool {
        !self.indent.is_empty()
    }
}

impl From<bool> for FronOptions {
    fn from(pretty: bool) -> Self {
        if pretty {
            FronOptions::pretty()
        } else {
            FronOptions::new()
        }
    }
}

impl From<&str> for FronOptions {
    fn from(indent: &str) -> Self {
        FronOptions::new().with_indent(indent)
    }
}

impl From<String> for FronOptions {
    fn from(indent: String) -> Self {
        FronOptions::new().with_indent(indent)
    }
}

/// Limits applied while parsing.
///
/// # Examples
///
/// ```rust
/// use fron::{parse_with_options, Error, ParseOptions};
///
/// let options = ParseOptions::new().with_max_depth(2);
/// assert!(parse_with_options("[[1]]", &options).is_ok());
/// assert_eq!(
///     parse_with_options("[[[1]]]", &options).unwrap_err(),
///     Error::DepthLimit { max: 2 }
/// );
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ParseOptions {
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum container nesting depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bool() {
        assert_eq!(FronOptions::from(false), FronOptions::new());
        assert_eq!(FronOptions::from(true).indent, "  ");
    }

    #[test]
    fn test_empty_indent_is_compact() {
        let options = FronOptions::pretty().with_indent("");
        assert!(!options.is_pretty());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(FronOptions::default().max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(ParseOptions::default().max_depth, DEFAULT_MAX_DEPTH);
    }
}
