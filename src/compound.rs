//! Compound instances: the `TypeName(body)` values of FRON.
//!
//! A [`Compound`] pairs a type name with an [`Instance`]. Built-in types get a
//! native representation (a `chrono` timestamp for `Date`, an entry list for
//! `Map`, and so on); user types registered with
//! [`register`](crate::register) are held as [`CustomInstance`]; any other
//! name is kept as an open [`Instance::Record`] around its parsed body.
//!
//! Each instance has a *natural* encoding, the canonical body written when
//! no hook overrides it:
//!
//! | Instance | Text |
//! |----------|------|
//! | `Date` | `Date("2019-01-01T00:00:00.000Z")` |
//! | `RegExp` | `/ab+c/gi` (bare literal) |
//! | `Map` | `Map([[key,value],…])` |
//! | `Set` | `Set([…])` |
//! | `Buffer`, typed arrays | `Buffer([1,2])`, `Int8Array([-1])`, … |
//! | boxed primitives | `String("x")`, `Number(1)`, `Boolean(true)` |
//! | errors | `TypeError({name:"TypeError",message:"…",stack:"…"})` |
//! | custom | the serde structure of the value |
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use fron::{stringify, Value};
//!
//! let date = Value::date(Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap());
//! assert_eq!(stringify(&date, false).unwrap(), r#"Date("2019-01-01T00:00:00.000Z")"#);
//! ```

use crate::literal;
use crate::{registry, Error, FronMap, Number, Result, Value};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::any::{Any, TypeId};
use std::fmt;
use std::rc::Rc;

/// A typed value written as `TypeName(body)`.
#[derive(Debug)]
pub struct Compound {
    type_name: String,
    instance: Instance,
}

impl Compound {
    pub fn new(type_name: impl Into<String>, instance: Instance) -> Self {
        Compound {
            type_name: type_name.into(),
            instance,
        }
    }

    /// An open compound: an unregistered type name around a plain body.
    pub fn record(type_name: impl Into<String>, body: Value) -> Self {
        Compound::new(type_name, Instance::Record(body))
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[must_use]
    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    pub fn instance_mut(&mut self) -> &mut Instance {
        &mut self.instance
    }

    pub fn set_instance(&mut self, instance: Instance) {
        self.instance = instance;
    }

    #[must_use]
    pub fn into_instance(self) -> Instance {
        self.instance
    }

    /// Borrows the user value inside a custom instance.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match &self.instance {
            Instance::Custom(custom) => custom.downcast_ref(),
            _ => None,
        }
    }

    /// The body of an open record.
    #[must_use]
    pub fn record_body(&self) -> Option<&Value> {
        match &self.instance {
            Instance::Record(body) => Some(body),
            _ => None,
        }
    }
}

/// The in-memory form of a compound's payload.
#[derive(Debug)]
pub enum Instance {
    Date(DateTime<Utc>),
    RegExp(RegExp),
    Map(Vec<(Value, Value)>),
    Set(Vec<Value>),
    Buffer(Vec<u8>),
    TypedArray(TypedArray),
    /// Boxed string primitive.
    String(String),
    /// Boxed number primitive.
    Number(Number),
    /// Boxed boolean primitive.
    Boolean(bool),
    Error(ErrorValue),
    Record(Value),
    Custom(CustomInstance),
}

impl Instance {
    /// The type name this instance is written under by default.
    #[must_use]
    pub fn default_type_name(&self) -> String {
        match self {
            Instance::Date(_) => "Date".to_string(),
            Instance::RegExp(_) => "RegExp".to_string(),
            Instance::Map(_) => "Map".to_string(),
            Instance::Set(_) => "Set".to_string(),
            Instance::Buffer(_) => "Buffer".to_string(),
            Instance::TypedArray(array) => array.type_name().to_string(),
            Instance::String(_) => "String".to_string(),
            Instance::Number(_) => "Number".to_string(),
            Instance::Boolean(_) => "Boolean".to_string(),
            Instance::Error(error) => error.kind.as_str().to_string(),
            Instance::Record(_) => "Object".to_string(),
            Instance::Custom(custom) => registry::name_for(custom.type_id, custom.short_name),
        }
    }

    /// Canonical encoding of the instance, used when no hook overrides it.
    ///
    /// Container handles inside the instance (map entries, set members, the
    /// body of a record) are shared with the result, only the wrapping
    /// arrays are fresh.
    pub fn encode_natural(&self) -> Result<Encoded> {
        let body = match self {
            Instance::Date(date) => {
                Value::String(date.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            Instance::RegExp(regexp) => return Ok(Encoded::Literal(regexp.to_string())),
            Instance::Map(entries) => Value::array(
                entries
                    .iter()
                    .map(|(k, v)| Value::array(vec![k.clone(), v.clone()]))
                    .collect(),
            ),
            Instance::Set(items) => Value::array(items.clone()),
            Instance::Buffer(bytes) => Value::array(bytes.iter().map(|b| Value::from(*b)).collect()),
            Instance::TypedArray(array) => Value::array(array.to_values()),
            Instance::String(s) => Value::String(s.clone()),
            Instance::Number(n) => Value::Number(*n),
            Instance::Boolean(b) => Value::Bool(*b),
            Instance::Error(error) => error.to_body(),
            Instance::Record(body) => body.clone(),
            Instance::Custom(custom) => custom.encode_structural()?,
        };
        Ok(Encoded::Body(body))
    }
}

/// The result of encoding a compound.
#[derive(Clone, Debug)]
pub enum Encoded {
    /// Written as `TypeName(body)`.
    Body(Value),
    /// Written verbatim with no wrapper, e.g. a regular expression literal.
    Literal(String),
}

impl Encoded {
    #[must_use]
    pub fn body(&self) -> Option<&Value> {
        match self {
            Encoded::Body(body) => Some(body),
            Encoded::Literal(_) => None,
        }
    }

    pub(crate) fn deep_eq_with(
        &self,
        other: &Encoded,
        eq: &mut dyn FnMut(&Value, &Value) -> bool,
    ) -> bool {
        match (self, other) {
            (Encoded::Literal(a), Encoded::Literal(b)) => a == b,
            (Encoded::Body(a), Encoded::Body(b)) => eq(a, b),
            _ => false,
        }
    }
}

impl From<Value> for Encoded {
    fn from(body: Value) -> Self {
        Encoded::Body(body)
    }
}

/// A regular expression held as source text and flags.
///
/// Patterns are stored, not compiled; the crate only needs to carry them.
///
/// ```rust
/// use fron::RegExp;
///
/// let re = RegExp::new("ab+c", "gi").unwrap();
/// assert_eq!(re.to_string(), "/ab+c/gi");
/// assert!(RegExp::new("a", "gg").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegExp {
    source: String,
    flags: String,
}

const REGEXP_FLAGS: &str = "dgimsuvy";

impl RegExp {
    pub fn new(source: impl Into<String>, flags: impl Into<String>) -> Result<Self> {
        let flags = flags.into();
        for (i, flag) in flags.char_indices() {
            if !REGEXP_FLAGS.contains(flag) {
                return Err(Error::custom(format!("invalid regular expression flag '{flag}'")));
            }
            if flags[..i].contains(flag) {
                return Err(Error::custom(format!("duplicate regular expression flag '{flag}'")));
            }
        }
        Ok(RegExp {
            source: source.into(),
            flags,
        })
    }

    /// Parses `/source/flags` text; the whole string must be the literal.
    pub fn parse_literal(text: &str) -> Result<Self> {
        let (source, flags, consumed) =
            literal::scan_regexp(text).map_err(|e| Error::custom(e.msg))?;
        if consumed != text.len() {
            return Err(Error::custom("trailing characters after regular expression"));
        }
        RegExp::new(source, flags)
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn flags(&self) -> &str {
        &self.flags
    }
}

impl fmt::Display for RegExp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.source.is_empty() {
            return write!(f, "/(?:)/{}", self.flags);
        }
        f.write_str("/")?;
        let mut in_class = false;
        let mut escaped = false;
        for c in self.source.chars() {
            match c {
                '\n' => f.write_str("\\n")?,
                '\r' => f.write_str("\\r")?,
                '/' if !escaped && !in_class => f.write_str("\\/")?,
                _ => write!(f, "{c}")?,
            }
            if escaped {
                escaped = false;
            } else {
                match c {
                    '\\' => escaped = true,
                    '[' => in_class = true,
                    ']' => in_class = false,
                    _ => {}
                }
            }
        }
        write!(f, "/{}", self.flags)
    }
}

/// Fixed-width integer arrays.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypedArray {
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Uint8(Vec<u8>),
    Uint16(Vec<u16>),
    Uint32(Vec<u32>),
}

impl TypedArray {
    pub const NAMES: [&'static str; 6] = [
        "Int8Array",
        "Int16Array",
        "Int32Array",
        "Uint8Array",
        "Uint16Array",
        "Uint32Array",
    ];

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            TypedArray::Int8(_) => "Int8Array",
            TypedArray::Int16(_) => "Int16Array",
            TypedArray::Int32(_) => "Int32Array",
            TypedArray::Uint8(_) => "Uint8Array",
            TypedArray::Uint16(_) => "Uint16Array",
            TypedArray::Uint32(_) => "Uint32Array",
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            TypedArray::Int8(v) => v.len(),
            TypedArray::Int16(v) => v.len(),
            TypedArray::Int32(v) => v.len(),
            TypedArray::Uint8(v) => v.len(),
            TypedArray::Uint16(v) => v.len(),
            TypedArray::Uint32(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn to_values(&self) -> Vec<Value> {
        match self {
            TypedArray::Int8(v) => v.iter().map(|x| Value::from(*x)).collect(),
            TypedArray::Int16(v) => v.iter().map(|x| Value::from(*x)).collect(),
            TypedArray::Int32(v) => v.iter().map(|x| Value::from(*x)).collect(),
            TypedArray::Uint8(v) => v.iter().map(|x| Value::from(*x)).collect(),
            TypedArray::Uint16(v) => v.iter().map(|x| Value::from(*x)).collect(),
            TypedArray::Uint32(v) => v.iter().map(|x| Value::from(*x)).collect(),
        }
    }

    /// Builds the array named `type_name` from integer elements.
    pub fn from_values(type_name: &str, items: &[Value]) -> Result<Self> {
        Ok(match type_name {
            "Int8Array" => TypedArray::Int8(integers(type_name, items)?),
            "Int16Array" => TypedArray::Int16(integers(type_name, items)?),
            "Int32Array" => TypedArray::Int32(integers(type_name, items)?),
            "Uint8Array" => TypedArray::Uint8(integers(type_name, items)?),
            "Uint16Array" => TypedArray::Uint16(integers(type_name, items)?),
            "Uint32Array" => TypedArray::Uint32(integers(type_name, items)?),
            other => return Err(Error::custom(format!("unknown typed array {other}"))),
        })
    }
}

fn integers<T: TryFrom<i64>>(type_name: &str, items: &[Value]) -> Result<Vec<T>> {
    items
        .iter()
        .map(|item| {
            item.as_i64()
                .and_then(|i| T::try_from(i).ok())
                .ok_or_else(|| Error::custom(format!("{item} is not a valid {type_name} element")))
        })
        .collect()
}

/// The built-in error constructors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Error,
    EvalError,
    RangeError,
    ReferenceError,
    SyntaxError,
    TypeError,
    AssertionError,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 7] = [
        ErrorKind::Error,
        ErrorKind::EvalError,
        ErrorKind::RangeError,
        ErrorKind::ReferenceError,
        ErrorKind::SyntaxError,
        ErrorKind::TypeError,
        ErrorKind::AssertionError,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Error => "Error",
            ErrorKind::EvalError => "EvalError",
            ErrorKind::RangeError => "RangeError",
            ErrorKind::ReferenceError => "ReferenceError",
            ErrorKind::SyntaxError => "SyntaxError",
            ErrorKind::TypeError => "TypeError",
            ErrorKind::AssertionError => "AssertionError",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        ErrorKind::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

/// An error object: kind, name, message, optional stack and extra fields.
///
/// ```rust
/// use fron::{stringify, ErrorKind, ErrorValue, Value};
///
/// let err = ErrorValue::new(ErrorKind::TypeError, "bad input");
/// assert_eq!(
///     stringify(&Value::error(err), false).unwrap(),
///     r#"TypeError({name:"TypeError",message:"bad input"})"#
/// );
/// ```
#[derive(Clone, Debug)]
pub struct ErrorValue {
    pub kind: ErrorKind,
    pub name: String,
    pub message: String,
    pub stack: Option<String>,
    pub fields: FronMap,
}

impl ErrorValue {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        ErrorValue {
            kind,
            name: kind.as_str().to_string(),
            message: message.into(),
            stack: None,
            fields: FronMap::new(),
        }
    }

    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    fn to_body(&self) -> Value {
        let mut body = FronMap::with_capacity(self.fields.len() + 3);
        body.insert("name".to_string(), Value::String(self.name.clone()));
        body.insert("message".to_string(), Value::String(self.message.clone()));
        if let Some(stack) = &self.stack {
            body.insert("stack".to_string(), Value::String(stack.clone()));
        }
        for (key, value) in &self.fields {
            body.insert(key.clone(), value.clone());
        }
        Value::object(body)
    }

    /// Rebuilds an error from an object body, or from a bare message string.
    pub fn from_body(kind: ErrorKind, body: &Value) -> Result<Self> {
        let mut error = ErrorValue::new(kind, "");
        match body {
            Value::String(message) => error.message = message.clone(),
            Value::Object(members) => {
                for (key, value) in members.borrow().iter() {
                    match (key.as_str(), value) {
                        ("name", Value::String(s)) => error.name = s.clone(),
                        ("message", Value::String(s)) => error.message = s.clone(),
                        ("stack", Value::String(s)) => error.stack = Some(s.clone()),
                        ("name" | "message" | "stack", other) => {
                            return Err(Error::custom(format!(
                                "{key} must be a string, found {}",
                                other.kind_name()
                            )))
                        }
                        _ => {
                            error.fields.insert(key.clone(), value.clone());
                        }
                    }
                }
            }
            other => {
                return Err(Error::custom(format!(
                    "expected an object or a message string, found {}",
                    other.kind_name()
                )))
            }
        }
        Ok(error)
    }
}

type OwnEncoder = Rc<dyn Fn(&dyn Any) -> Result<Encoded>>;

/// A user value of any registered Rust type.
///
/// The value stays typed: [`downcast_ref`](CustomInstance::downcast_ref)
/// gets it back. Without an encode hook it is written as its serde
/// structure.
///
/// ```rust
/// use fron::{stringify, CustomInstance, Encoded, Value};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Celsius(f64);
///
/// let plain = Value::custom(Celsius(21.5));
/// assert_eq!(stringify(&plain, false).unwrap(), "Celsius(21.5)");
///
/// let hooked = CustomInstance::new(Celsius(21.5))
///     .with_encoder(|c: &Celsius| Ok(Encoded::Body(Value::from(format!("{}C", c.0)))));
/// let hooked = Value::instance(fron::Instance::Custom(hooked));
/// assert_eq!(stringify(&hooked, false).unwrap(), r#"Celsius("21.5C")"#);
/// ```
pub struct CustomInstance {
    value: Box<dyn Any>,
    type_id: TypeId,
    short_name: &'static str,
    structural: fn(&dyn Any) -> Result<Value>,
    encoder: Option<OwnEncoder>,
}

impl CustomInstance {
    pub fn new<T: Serialize + Any>(value: T) -> Self {
        CustomInstance {
            value: Box::new(value),
            type_id: TypeId::of::<T>(),
            short_name: short_type_name::<T>(),
            structural: structural::<T>,
            encoder: None,
        }
    }

    /// Attaches an encode hook that takes precedence over any registry entry.
    #[must_use]
    pub fn with_encoder<T, F>(mut self, encode: F) -> Self
    where
        T: Any,
        F: Fn(&T) -> Result<Encoded> + 'static,
    {
        self.encoder = Some(Rc::new(move |value: &dyn Any| match value.downcast_ref::<T>() {
            Some(value) => encode(value),
            None => Err(Error::custom("encode hook attached to a value of another type")),
        }));
        self
    }

    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref()
    }

    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.value.downcast_mut()
    }

    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    pub(crate) fn encode_own(&self) -> Option<Result<Encoded>> {
        self.encoder.as_ref().map(|encode| encode(&*self.value))
    }

    pub(crate) fn encode_structural(&self) -> Result<Value> {
        (self.structural)(&*self.value)
    }
}

impl fmt::Debug for CustomInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomInstance")
            .field("type", &self.short_name)
            .field("has_encoder", &self.encoder.is_some())
            .finish()
    }
}

fn structural<T: Serialize + Any>(value: &dyn Any) -> Result<Value> {
    match value.downcast_ref::<T>() {
        Some(value) => crate::to_value(value),
        None => Err(Error::custom("custom instance holds an unexpected type")),
    }
}

/// Last path segment of a Rust type name, without generics.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

fn array_items(type_name: &str, body: &Value) -> Result<Vec<Value>> {
    match body {
        Value::Array(items) => Ok(items.borrow().clone()),
        other => Err(Error::custom(format!(
            "{type_name} expects an array body, found {}",
            other.kind_name()
        ))),
    }
}

pub(crate) fn decode_date(body: Value) -> Result<Instance> {
    match &body {
        Value::String(text) => DateTime::parse_from_rfc3339(text)
            .map(|date| Instance::Date(date.with_timezone(&Utc)))
            .map_err(|e| Error::custom(format!("invalid date {text:?}: {e}"))),
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .map(Instance::Date)
            .ok_or_else(|| Error::custom(format!("invalid timestamp {n}"))),
        other => Err(Error::custom(format!(
            "Date expects a string or a timestamp, found {}",
            other.kind_name()
        ))),
    }
}

pub(crate) fn decode_regexp(body: Value) -> Result<Instance> {
    let regexp = match &body {
        Value::String(text) if text.starts_with('/') => RegExp::parse_literal(text)?,
        Value::String(text) => RegExp::new(text.as_str(), "")?,
        Value::Compound(compound) => {
            let compound = compound.borrow();
            match compound.instance() {
                Instance::RegExp(regexp) => regexp.clone(),
                _ => return Err(Error::custom("RegExp expects a pattern")),
            }
        }
        other => {
            return Err(Error::custom(format!(
                "RegExp expects a pattern string, found {}",
                other.kind_name()
            )))
        }
    };
    Ok(Instance::RegExp(regexp))
}

pub(crate) fn decode_map(body: Value) -> Result<Instance> {
    array_items("Map", &body)?
        .iter()
        .map(|entry| match entry {
            Value::Array(pair) if pair.borrow().len() == 2 => {
                let pair = pair.borrow();
                Ok((pair[0].clone(), pair[1].clone()))
            }
            _ => Err(Error::custom("Map entries must be [key, value] pairs")),
        })
        .collect::<Result<Vec<_>>>()
        .map(Instance::Map)
}

pub(crate) fn decode_set(body: Value) -> Result<Instance> {
    array_items("Set", &body).map(Instance::Set)
}

pub(crate) fn decode_buffer(body: Value) -> Result<Instance> {
    // Also accept the `{type:"Buffer",data:[…]}` shape produced by toJSON.
    let data = match &body {
        Value::Object(members) => members.borrow().get("data").cloned().unwrap_or_default(),
        _ => body.clone(),
    };
    integers("Buffer", &array_items("Buffer", &data)?).map(Instance::Buffer)
}

pub(crate) fn decode_typed_array(type_name: &str, body: Value) -> Result<Instance> {
    TypedArray::from_values(type_name, &array_items(type_name, &body)?).map(Instance::TypedArray)
}

pub(crate) fn decode_boxed(type_name: &str, body: Value) -> Result<Instance> {
    match (type_name, body) {
        ("String", Value::String(s)) => Ok(Instance::String(s)),
        ("Number", Value::Number(n)) => Ok(Instance::Number(n)),
        ("Boolean", Value::Bool(b)) => Ok(Instance::Boolean(b)),
        (_, other) => Err(Error::custom(format!(
            "{type_name} cannot wrap a {}",
            other.kind_name()
        ))),
    }
}

pub(crate) fn decode_error(kind: ErrorKind, body: Value) -> Result<Instance> {
    ErrorValue::from_body(kind, &body).map(Instance::Error)
}

impl Value {
    /// Wraps an instance under its default type name.
    #[must_use]
    pub fn instance(instance: Instance) -> Self {
        let name = instance.default_type_name();
        Value::compound(Compound::new(name, instance))
    }

    #[must_use]
    pub fn date(date: DateTime<Utc>) -> Self {
        Value::instance(Instance::Date(date))
    }

    pub fn regexp(source: impl Into<String>, flags: impl Into<String>) -> Result<Self> {
        RegExp::new(source, flags).map(|re| Value::instance(Instance::RegExp(re)))
    }

    #[must_use]
    pub fn map(entries: Vec<(Value, Value)>) -> Self {
        Value::instance(Instance::Map(entries))
    }

    #[must_use]
    pub fn set(items: Vec<Value>) -> Self {
        Value::instance(Instance::Set(items))
    }

    #[must_use]
    pub fn buffer(bytes: Vec<u8>) -> Self {
        Value::instance(Instance::Buffer(bytes))
    }

    #[must_use]
    pub fn typed_array(array: TypedArray) -> Self {
        Value::instance(Instance::TypedArray(array))
    }

    #[must_use]
    pub fn error(error: ErrorValue) -> Self {
        Value::instance(Instance::Error(error))
    }

    /// An open compound that is written back as `type_name(body)`.
    ///
    /// The body shares the compound's path, so a body container that is also
    /// referenced elsewhere reads back as the compound itself.
    pub fn record(type_name: impl Into<String>, body: Value) -> Self {
        Value::compound(Compound::record(type_name, body))
    }

    /// Wraps a user value; its type name is the registered name for `T`, or
    /// the short Rust type name when `T` is not registered.
    pub fn custom<T: Serialize + Any>(value: T) -> Self {
        Value::instance(Instance::Custom(CustomInstance::new(value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name::<String>(), "String");
        assert_eq!(short_type_name::<Vec<u8>>(), "Vec");
        assert_eq!(short_type_name::<Compound>(), "Compound");
    }

    #[test]
    fn test_regexp_display_escapes_slash() {
        let re = RegExp::new("a/b[/]", "").unwrap();
        assert_eq!(re.to_string(), r"/a\/b[/]/");
        assert_eq!(RegExp::new("", "g").unwrap().to_string(), "/(?:)/g");
    }

    #[test]
    fn test_regexp_parse_literal() {
        let re = RegExp::parse_literal("/x\\/y/gi").unwrap();
        assert_eq!(re.source(), "x\\/y");
        assert_eq!(re.flags(), "gi");
        assert!(RegExp::parse_literal("/x/q").is_err());
    }

    #[test]
    fn test_date_body() {
        let date = Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap();
        let encoded = Instance::Date(date).encode_natural().unwrap();
        assert_eq!(
            encoded.body().and_then(Value::as_str),
            Some("2019-01-01T00:00:00.000Z")
        );

        match decode_date(Value::from("2019-01-01T00:00:00.000Z")).unwrap() {
            Instance::Date(decoded) => assert_eq!(decoded, date),
            other => panic!("unexpected {other:?}"),
        }
        assert!(decode_date(Value::from("nope")).is_err());
    }

    #[test]
    fn test_typed_array_range_checks() {
        let ok = TypedArray::from_values("Int8Array", &[Value::from(-128), Value::from(127)]);
        assert_eq!(ok.unwrap(), TypedArray::Int8(vec![-128, 127]));

        assert!(TypedArray::from_values("Int8Array", &[Value::from(999)]).is_err());
        assert!(TypedArray::from_values("Uint16Array", &[Value::from(-1)]).is_err());
    }

    #[test]
    fn test_buffer_accepts_to_json_shape() {
        let body = Value::object_from([
            ("type", Value::from("Buffer")),
            ("data", Value::array(vec![Value::from(1), Value::from(2)])),
        ]);
        match decode_buffer(body).unwrap() {
            Instance::Buffer(bytes) => assert_eq!(bytes, vec![1, 2]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_error_body_round_trip() {
        let error = ErrorValue::new(ErrorKind::RangeError, "too big")
            .with_stack("at main")
            .with_field("code", Value::from(7));
        let body = error.to_body();
        let decoded = ErrorValue::from_body(ErrorKind::RangeError, &body).unwrap();
        assert_eq!(decoded.name, "RangeError");
        assert_eq!(decoded.message, "too big");
        assert_eq!(decoded.stack.as_deref(), Some("at main"));
        assert_eq!(decoded.fields.get("code"), Some(&Value::from(7)));
    }

    #[test]
    fn test_map_entries_share_handles() {
        let key = Value::object_from([("k", Value::from(1))]);
        let map = Instance::Map(vec![(key.clone(), Value::from(2))]);
        let body = map.encode_natural().unwrap();
        let pair = body.body().and_then(|b| b.index(0)).unwrap();
        assert!(pair.index(0).unwrap().ptr_eq(&key));
    }

    #[test]
    fn test_boxed_kind_mismatch() {
        assert!(decode_boxed("Number", Value::from("1")).is_err());
        assert!(matches!(
            decode_boxed("Boolean", Value::from(true)).unwrap(),
            Instance::Boolean(true)
        ));
    }

    #[test]
    fn test_downcast() {
        let value = Value::custom(42u32);
        let compound = value.as_compound().unwrap().borrow();
        assert_eq!(compound.downcast_ref::<u32>(), Some(&42));
        assert_eq!(compound.downcast_ref::<i32>(), None);
    }
}
