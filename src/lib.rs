//! # fron
//!
//! FRON (Function Reference Object Notation): a textual object notation that
//! round-trips shared and circular data, typed literals and user types.
//!
//! ## What is FRON?
//!
//! FRON reads like JavaScript object literals with three additions:
//!
//! - **Typed literals**: `12n` big integers, `NaN`, `Infinity`, `-Infinity`,
//!   `/re/g` regular expressions, `Symbol("tag")`
//! - **Compounds**: `TypeName(body)` for dates, maps, sets, buffers, errors
//!   and any type you register
//! - **References**: `$`, `$.key`, `$[0]`, `$['odd key']` point back at an
//!   already written container, so a graph with shared nodes or cycles is
//!   written once and rebuilt with the same shape
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! fron = "0.1"
//! serde = { version = "1.0", features = ["derive"] }
//! ```
//!
//! ### Values and references
//!
//! ```rust
//! use fron::{fron, parse, stringify};
//!
//! let shared = fron!({ "id": 7 });
//! let doc = fron!({ "a": (shared.clone()), "b": (shared) });
//! doc.insert("self", doc.clone()).unwrap();
//!
//! let text = stringify(&doc, false).unwrap();
//! assert_eq!(text, "{a:{id:7},b:Reference($.a),self:Reference($)}");
//!
//! let back = parse(&text).unwrap();
//! assert!(back.get("a").unwrap().ptr_eq(&back.get("b").unwrap()));
//! assert!(back.get("self").unwrap().ptr_eq(&back));
//! ```
//!
//! ### Serde types
//!
//! ```rust
//! use fron::{from_str, to_string};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct User {
//!     id: u32,
//!     name: String,
//!     active: bool,
//! }
//!
//! let user = User { id: 123, name: "Alice".to_string(), active: true };
//! let text = to_string(&user).unwrap();
//! assert_eq!(text, r#"{id:123,name:"Alice",active:true}"#);
//!
//! let back: User = from_str(&text).unwrap();
//! assert_eq!(user, back);
//! ```
//!
//! ### Registered types
//!
//! ```rust
//! use fron::{parse, register, stringify, TypeOptions, Value};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq)]
//! struct Money { cents: i64 }
//!
//! register(TypeOptions::<Money>::new()).unwrap();
//!
//! let value = Value::custom(Money { cents: 250 });
//! assert_eq!(stringify(&value, false).unwrap(), "Money({cents:250})");
//!
//! let back = parse("Money({cents: 250})").unwrap();
//! let compound = back.as_compound().unwrap().borrow();
//! assert_eq!(compound.downcast_ref::<Money>(), Some(&Money { cents: 250 }));
//! ```
//!
//! ## Grammar
//!
//! ```text
//! value     := literal | array | object | compound | reference
//! array     := '[' (value (',' value)*)? ']'
//! object    := '{' (key ':' value (',' key ':' value)*)? '}'
//! key       := identifier | string | number | '[' (string | number) ']'
//! compound  := Name '(' value ')'
//! reference := path | 'Reference(' (path | string) ')'
//! path      := '$' ('.' identifier | '[' (digits | string) ']')*
//! ```
//!
//! Whitespace may appear between any two tokens. Trailing commas are not
//! accepted.
//!
//! ## Threading
//!
//! [`Value`] is built on `Rc<RefCell<_>>` and stays on the thread that made
//! it. The type registry is process-wide and may be used from any thread.
//! A cyclic value is an `Rc` cycle and is only freed once the cycle is
//! broken, for example by removing the back edge with
//! [`FronMap::remove`].
//!
//! ## Examples
//!
//! See the `demos/` directory:
//!
//! - **`simple.rs`** - stringify and parse plain data
//! - **`references.rs`** - shared nodes and cycles
//! - **`custom_types.rs`** - registering types and encode hooks
//!
//! Run any example with: `cargo run --example <name>`

pub mod compound;
pub mod de;
pub mod error;
pub mod literal;
pub mod macros;
pub mod map;
pub mod options;
pub mod path;
pub mod registry;
pub mod ser;
pub mod value;

pub use compound::{
    Compound, CustomInstance, Encoded, ErrorKind, ErrorValue, Instance, RegExp, TypedArray,
};
pub use de::{Parser, ValueDeserializer};
pub use error::{Error, Result};
pub use map::FronMap;
pub use options::{FronOptions, ParseOptions, DEFAULT_MAX_DEPTH};
pub use path::{parse_path, Accessor, Path};
pub use registry::{
    is_registered, lookup, register, register_entry, resolve_encoder, TypeEntry, TypeOptions,
    TypeRegistry,
};
pub use ser::{to_value, Serializer, ValueSerializer};
pub use value::{ArrayRef, CompoundRef, Number, ObjectRef, Symbol, Value};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io;

/// Writes `value` as FRON text.
///
/// `options` is a [`FronOptions`], or `false` for compact output, `true` for
/// two-space indentation, or a string used verbatim as the indent unit.
///
/// # Examples
///
/// ```rust
/// use fron::{fron, stringify};
///
/// let value = fron!({ "list": [1, 2] });
/// assert_eq!(stringify(&value, false).unwrap(), "{list:[1,2]}");
/// assert_eq!(
///     stringify(&value, "\t").unwrap(),
///     "{\n\tlist: [\n\t\t1,\n\t\t2\n\t]\n}"
/// );
/// ```
///
/// # Errors
///
/// [`Error::UnsupportedType`] for a top-level `Undefined`,
/// [`Error::DepthLimit`] past the configured depth, or whatever an encode
/// hook returns.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn stringify(value: &Value, options: impl Into<FronOptions>) -> Result<String> {
    let mut serializer = Serializer::new(options.into());
    serializer.serialize(value)?;
    Ok(serializer.into_inner())
}

/// Parses FRON text into a [`Value`] graph.
///
/// # Examples
///
/// ```rust
/// use fron::parse;
///
/// let value = parse("[1, 2n, NaN, /a+b/g, Date('2020-01-01T00:00:00.000Z')]").unwrap();
/// assert_eq!(value.index(0).and_then(|v| v.as_i64()), Some(1));
/// assert!(value.index(3).unwrap().is_compound());
/// ```
///
/// # Errors
///
/// [`Error::Syntax`] for malformed text or trailing content,
/// [`Error::Reference`] for a path that does not resolve,
/// [`Error::InvalidCompound`] when a known type rejects its body and
/// [`Error::DepthLimit`] past the default depth.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse(text: &str) -> Result<Value> {
    parse_with_options(text, &ParseOptions::default())
}

/// Parses FRON text with custom [`ParseOptions`].
///
/// # Errors
///
/// See [`parse`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse_with_options(text: &str, options: &ParseOptions) -> Result<Value> {
    let mut parser = Parser::new(text, options.clone());
    let value = parser.parse_value()?;
    parser.end()?;
    Ok(value)
}

/// Parses exactly one value starting at byte `offset` of `text`.
///
/// Leading whitespace is skipped. Returns the value and the number of bytes
/// consumed from `offset`; anything after the value is left alone.
///
/// # Examples
///
/// ```rust
/// use fron::{parse_token, Value};
///
/// let text = "x = [1, $[0]] ; rest";
/// let (value, consumed) = parse_token(text, 3).unwrap();
/// assert_eq!(consumed, 10);
/// assert_eq!(value.index(1), Some(Value::from(1)));
/// ```
///
/// # Errors
///
/// See [`parse`]; an `offset` that is not a character boundary is an
/// [`Error::Custom`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse_token(text: &str, offset: usize) -> Result<(Value, usize)> {
    let mut parser = Parser::at_offset(text, offset, ParseOptions::default())?;
    let value = parser.parse_value()?;
    Ok((value, parser.position() - offset))
}

/// Serialize any `T: Serialize` to a compact FRON string.
///
/// # Examples
///
/// ```rust
/// use fron::to_string;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// assert_eq!(to_string(&Point { x: 1, y: 2 }).unwrap(), "{x:1,y:2}");
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, FronOptions::default())
}

/// Serialize any `T: Serialize` to a FRON string indented by two spaces.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_pretty<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, FronOptions::pretty())
}

/// Serialize any `T: Serialize` to a FRON string with custom options.
///
/// # Examples
///
/// ```rust
/// use fron::{to_string_with_options, FronOptions};
///
/// let text = to_string_with_options(&vec![1, 2], FronOptions::new().with_indent("    ")).unwrap();
/// assert_eq!(text, "[\n    1,\n    2\n]");
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T>(value: &T, options: FronOptions) -> Result<String>
where
    T: ?Sized + Serialize,
{
    stringify(&to_value(value)?, options)
}

/// Serialize any `T: Serialize` to a writer as compact FRON.
///
/// # Examples
///
/// ```rust
/// use fron::to_writer;
///
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &[1, 2, 3]).unwrap();
/// assert_eq!(buffer, b"[1,2,3]");
/// ```
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(mut writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let text = to_string(value)?;
    writer
        .write_all(text.as_bytes())
        .map_err(|e| Error::io(&e.to_string()))?;
    Ok(())
}

/// Converts a [`Value`] into any `T: Deserialize`.
///
/// Boxed primitives become plain primitives, `Buffer` becomes bytes, `Map`
/// becomes a map, `Date` becomes its RFC 3339 string, and other compounds
/// deserialize from their body.
///
/// # Examples
///
/// ```rust
/// use fron::{from_value, parse};
///
/// let value = parse("{xs: Set([1, 2]), when: Date(0)}").unwrap();
/// let xs: Vec<i32> = from_value(&value.get("xs").unwrap()).unwrap();
/// let when: String = from_value(&value.get("when").unwrap()).unwrap();
/// assert_eq!(xs, vec![1, 2]);
/// assert_eq!(when, "1970-01-01T00:00:00.000Z");
/// ```
///
/// # Errors
///
/// Returns an error if the value does not have the shape `T` expects.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_value<T>(value: &Value) -> Result<T>
where
    T: DeserializeOwned,
{
    T::deserialize(ValueDeserializer::new(value.clone()))
}

/// Deserialize an instance of type `T` from FRON text.
///
/// # Examples
///
/// ```rust
/// use fron::from_str;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_str("{x: 1, y: 2}").unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if the input is not valid FRON or cannot be
/// deserialized to type `T`. Syntax errors include line and column.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T>(s: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    from_value(&parse(s)?)
}

/// Deserialize an instance of type `T` from an I/O stream of FRON.
///
/// # Examples
///
/// ```rust
/// use fron::from_reader;
/// use std::io::Cursor;
///
/// let cursor = Cursor::new(b"[true, false]");
/// let flags: Vec<bool> = from_reader(cursor).unwrap();
/// assert_eq!(flags, vec![true, false]);
/// ```
///
/// # Errors
///
/// Returns an error if reading fails, the input is not valid FRON, or the
/// data cannot be deserialized to type `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(mut reader: R) -> Result<T>
where
    R: io::Read,
    T: for<'de> Deserialize<'de>,
{
    let mut string = String::new();
    reader
        .read_to_string(&mut string)
        .map_err(|e| Error::io(&e.to_string()))?;
    from_str(&string)
}

/// Deserialize an instance of type `T` from bytes of FRON text.
///
/// # Errors
///
/// Returns an error if the bytes are not valid UTF-8, not valid FRON, or
/// cannot be deserialized to type `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<T>(v: &[u8]) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let s = std::str::from_utf8(v).map_err(|e| Error::custom(e.to_string()))?;
    from_str(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct User {
        id: u32,
        name: String,
        active: bool,
        tags: Vec<String>,
    }

    fn user() -> User {
        User {
            id: 123,
            name: "Alice".to_string(),
            active: true,
            tags: vec!["admin".to_string(), "user".to_string()],
        }
    }

    #[test]
    fn test_serialize_deserialize_point() {
        let point = Point { x: 1, y: 2 };
        let text = to_string(&point).unwrap();
        let point_back: Point = from_str(&text).unwrap();
        assert_eq!(point, point_back);
    }

    #[test]
    fn test_serialize_deserialize_user() {
        let text = to_string(&user()).unwrap();
        assert_eq!(
            text,
            r#"{id:123,name:"Alice",active:true,tags:["admin","user"]}"#
        );
        let user_back: User = from_str(&text).unwrap();
        assert_eq!(user(), user_back);
    }

    #[test]
    fn test_pretty_printing() {
        let text = to_string_pretty(&user()).unwrap();
        assert!(text.contains("\n  name: \"Alice\",\n"));
        let user_back: User = from_str(&text).unwrap();
        assert_eq!(user(), user_back);
    }

    #[test]
    fn test_to_value() {
        let value = to_value(&Point { x: 1, y: 2 }).unwrap();
        assert_eq!(value.get("x"), Some(Value::Number(Number::Integer(1))));
        assert_eq!(value.get("y"), Some(Value::Number(Number::Integer(2))));
    }

    #[test]
    fn test_arrays() {
        let numbers = vec![1, 2, 3, 4, 5];
        let text = to_string(&numbers).unwrap();
        let numbers_back: Vec<i32> = from_str(&text).unwrap();
        assert_eq!(numbers, numbers_back);
    }

    #[test]
    fn test_from_slice_rejects_bad_utf8() {
        assert!(from_slice::<Vec<i32>>(&[b'[', 0xff, b']']).is_err());
    }

    #[test]
    fn test_parse_token_skips_leading_whitespace() {
        let (value, consumed) = parse_token("   12n tail", 0).unwrap();
        assert!(value.is_bigint());
        assert_eq!(consumed, 6);
    }

    #[test]
    fn test_parse_token_rejects_mid_character_offset() {
        assert!(parse_token("é1", 1).is_err());
    }

    #[test]
    fn test_stringify_top_level_undefined() {
        assert!(matches!(
            stringify(&Value::Undefined, false),
            Err(Error::UnsupportedType(_))
        ));
    }
}
