//! Dynamic value representation for FRON data.
//!
//! [`Value`] is the in-memory form of every FRON document. Primitives are held
//! inline; containers (arrays, objects and compound instances) are
//! reference-counted handles, so cloning a `Value` clones the *handle*. Two
//! slots holding clones of the same handle are the same node, and that shared
//! identity is exactly what [`stringify`](crate::stringify) writes out as a
//! `Reference(...)` and what [`parse`](crate::parse) rebuilds.
//!
//! ## Creating Values
//!
//! ```rust
//! use fron::{fron, Value};
//!
//! let null = Value::Null;
//! let number = Value::from(42);
//! let text = Value::from("hello");
//! let obj = fron!({ "name": "Alice", "age": 30 });
//! assert!(obj.is_object());
//! ```
//!
//! ## Sharing and Cycles
//!
//! ```rust
//! use fron::{fron, Value};
//!
//! let shared = fron!({ "x": 1 });
//! let doc = Value::object_from([("a", shared.clone()), ("b", shared.clone())]);
//! assert!(doc.get("a").unwrap().ptr_eq(&doc.get("b").unwrap()));
//!
//! let cyclic = fron!({});
//! cyclic.insert("self", cyclic.clone()).unwrap();
//! assert!(cyclic.get("self").unwrap().ptr_eq(&cyclic));
//! ```
//!
//! Values are built on `Rc`, so they are not `Send`; a cyclic graph stays
//! allocated until one of its edges is removed.

use crate::compound::{Compound, Encoded};
use crate::path::{self, Path};
use crate::{Error, FronMap, Result};
use num_bigint::BigInt;
use parking_lot::Mutex;
use serde::{Deserialize, Deserializer};
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;
use std::sync::{Arc, LazyLock};

/// Shared handle to an array node.
pub type ArrayRef = Rc<RefCell<Vec<Value>>>;
/// Shared handle to an object node.
pub type ObjectRef = Rc<RefCell<FronMap>>;
/// Shared handle to a compound node.
pub type CompoundRef = Rc<RefCell<Compound>>;

/// A dynamically-typed FRON value.
///
/// `Undefined` stands in for members that have no textual form. The
/// serializer skips object members and array elements holding it, the same
/// way it skips a compound whose encoder produced it.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Undefined,
    Bool(bool),
    Number(Number),
    BigInt(BigInt),
    String(String),
    Symbol(Symbol),
    Array(ArrayRef),
    Object(ObjectRef),
    Compound(CompoundRef),
}

/// A numeric value: integer, float, or one of the special IEEE values.
///
/// `Float` never holds a non-finite value when built through `From<f64>`;
/// NaN and the infinities get their own variants so equality is total.
///
/// # Examples
///
/// ```rust
/// use fron::Number;
///
/// assert!(Number::Integer(42).is_integer());
/// assert_eq!(Number::from(f64::INFINITY), Number::Infinity);
/// assert_eq!(Number::from(f64::NAN), Number::NaN);
/// assert_eq!(Number::Float(42.0).as_i64(), Some(42));
/// ```
#[derive(Clone, Copy, Debug)]
pub enum Number {
    Integer(i64),
    Float(f64),
    Infinity,
    NegativeInfinity,
    NaN,
}

impl Number {
    #[inline]
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Number::Integer(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Number::Float(_))
    }

    /// Returns `true` if this is a special value (Infinity, -Infinity, or NaN).
    #[inline]
    #[must_use]
    pub const fn is_special(&self) -> bool {
        matches!(
            self,
            Number::Infinity | Number::NegativeInfinity | Number::NaN
        )
    }

    /// Converts this number to an `i64` if it is integral and in range.
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Number::Integer(i) => Some(*i),
            Number::Float(f) => {
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                    Some(*f as i64)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Integer(i) => *i as f64,
            Number::Float(f) => *f,
            Number::Infinity => f64::INFINITY,
            Number::NegativeInfinity => f64::NEG_INFINITY,
            Number::NaN => f64::NAN,
        }
    }

    /// Moves non-finite floats into their special variants.
    #[must_use]
    pub fn normalized(self) -> Self {
        match self {
            Number::Float(f) if f.is_nan() => Number::NaN,
            Number::Float(f) if f == f64::INFINITY => Number::Infinity,
            Number::Float(f) if f == f64::NEG_INFINITY => Number::NegativeInfinity,
            other => other,
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self.normalized(), other.normalized()) {
            (Number::Integer(a), Number::Integer(b)) => a == b,
            (Number::Float(a), Number::Float(b)) => a == b,
            (Number::Infinity, Number::Infinity)
            | (Number::NegativeInfinity, Number::NegativeInfinity)
            | (Number::NaN, Number::NaN) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::literal::number_to_literal(self))
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Number::Integer(i64::from(value))
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Integer(value)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value).normalized()
    }
}

static SYMBOLS: LazyLock<Mutex<HashSet<Arc<str>>>> = LazyLock::new(|| Mutex::new(HashSet::new()));

/// An interned, globally named atom, written `Symbol("name")`.
///
/// Two symbols with the same name are the same symbol.
///
/// # Examples
///
/// ```rust
/// use fron::Symbol;
///
/// let a = Symbol::for_name("example");
/// let b = Symbol::for_name("example");
/// assert_eq!(a, b);
/// assert_eq!(a.name(), "example");
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Symbol(Arc<str>);

impl Symbol {
    /// Returns the symbol registered under `name`, creating it on first use.
    pub fn for_name(name: &str) -> Self {
        let mut symbols = SYMBOLS.lock();
        if let Some(existing) = symbols.get(name) {
            return Symbol(Arc::clone(existing));
        }
        let interned: Arc<str> = Arc::from(name);
        symbols.insert(Arc::clone(&interned));
        Symbol(interned)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?})", &*self.0)
    }
}

impl Value {
    /// Creates a new array node.
    #[must_use]
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    /// Creates a new object node.
    #[must_use]
    pub fn object(map: FronMap) -> Self {
        Value::Object(Rc::new(RefCell::new(map)))
    }

    /// Creates a new object node from `(key, value)` pairs, keeping their order.
    pub fn object_from<K, I>(members: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::object(members.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Wraps a compound instance in a new node.
    #[must_use]
    pub fn compound(compound: Compound) -> Self {
        Value::Compound(Rc::new(RefCell::new(compound)))
    }

    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    #[must_use]
    pub const fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_bigint(&self) -> bool {
        matches!(self, Value::BigInt(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_symbol(&self) -> bool {
        matches!(self, Value::Symbol(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_compound(&self) -> bool {
        matches!(self, Value::Compound(_))
    }

    /// Returns `true` for arrays, objects and compounds, the values that have identity.
    #[inline]
    #[must_use]
    pub const fn is_container(&self) -> bool {
        matches!(
            self,
            Value::Array(_) | Value::Object(_) | Value::Compound(_)
        )
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// If the value is an i64 integer or a whole-number float, returns it.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            Value::BigInt(b) => i64::try_from(b).ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(n.as_f64()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bigint(&self) -> Option<&BigInt> {
        match self {
            Value::BigInt(b) => Some(b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Value::Symbol(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_compound(&self) -> Option<&CompoundRef> {
        match self {
            Value::Compound(c) => Some(c),
            _ => None,
        }
    }

    /// Returns a handle to the member `key` of an object.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.as_object().and_then(|o| o.borrow().get(key).cloned())
    }

    /// Returns a handle to element `index` of an array.
    #[must_use]
    pub fn index(&self, index: usize) -> Option<Value> {
        self.as_array().and_then(|a| a.borrow().get(index).cloned())
    }

    /// Follows a `$…` path from this value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fron::{fron, Path};
    ///
    /// let doc = fron!({ "abc": { "list": [10, 20] } });
    /// let path: Path = "$.abc.list[1]".parse().unwrap();
    /// assert_eq!(doc.pointer(&path).unwrap().as_i64(), Some(20));
    /// ```
    pub fn pointer(&self, path: &Path) -> Result<Value> {
        path::resolve(self, path).map_err(|msg| Error::reference(&path.to_string(), 0, &msg))
    }

    /// Sets member `key` on an object, returning the previous value.
    ///
    /// Fails when `self` is not an object.
    pub fn insert(&self, key: impl Into<String>, value: Value) -> Result<Option<Value>> {
        match self {
            Value::Object(o) => Ok(o.borrow_mut().insert(key.into(), value)),
            other => Err(Error::custom(format!(
                "cannot insert a member into {}",
                other.kind_name()
            ))),
        }
    }

    /// Appends an element to an array.
    ///
    /// Fails when `self` is not an array.
    pub fn push(&self, value: Value) -> Result<()> {
        match self {
            Value::Array(a) => {
                a.borrow_mut().push(value);
                Ok(())
            }
            other => Err(Error::custom(format!(
                "cannot push an element onto {}",
                other.kind_name()
            ))),
        }
    }

    /// Returns `true` when both values are the same container node.
    ///
    /// Primitives never share identity.
    #[must_use]
    pub fn ptr_eq(&self, other: &Value) -> bool {
        match (self.identity(), other.identity()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Address of the container node, used as the identity key.
    pub(crate) fn identity(&self) -> Option<usize> {
        match self {
            Value::Array(a) => Some(Rc::as_ptr(a) as *const () as usize),
            Value::Object(o) => Some(Rc::as_ptr(o) as *const () as usize),
            Value::Compound(c) => Some(Rc::as_ptr(c) as *const () as usize),
            _ => None,
        }
    }

    /// Short name of the value's kind, for messages.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Undefined => "undefined",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::BigInt(_) => "bigint",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Compound(_) => "compound",
        }
    }
}

/// Structural equality that terminates on cycles.
///
/// A pair of containers already being compared further up is assumed equal,
/// which is the coinductive reading of deep equality on graphs.
#[derive(Default)]
struct DeepEq {
    seen: HashSet<(usize, usize)>,
    // Compound bodies built during the comparison; held so their addresses stay unique.
    retained: Vec<Encoded>,
}

impl DeepEq {
    fn eq(&mut self, a: &Value, b: &Value) -> bool {
        if let (Some(ia), Some(ib)) = (a.identity(), b.identity()) {
            if ia == ib || !self.seen.insert((ia, ib)) {
                return true;
            }
        }

        match (a, b) {
            (Value::Null, Value::Null) | (Value::Undefined, Value::Undefined) => true,
            (Value::Bool(x), Value::Bool(y)) => x == y,
            (Value::Number(x), Value::Number(y)) => x == y,
            (Value::BigInt(x), Value::BigInt(y)) => x == y,
            (Value::String(x), Value::String(y)) => x == y,
            (Value::Symbol(x), Value::Symbol(y)) => x == y,
            (Value::Array(x), Value::Array(y)) => {
                let x = x.borrow();
                let y = y.borrow();
                x.len() == y.len() && x.iter().zip(y.iter()).all(|(l, r)| self.eq(l, r))
            }
            (Value::Object(x), Value::Object(y)) => {
                let x = x.borrow();
                let y = y.borrow();
                x.len() == y.len()
                    && x
                        .iter()
                        .all(|(k, l)| y.get(k).is_some_and(|r| self.eq(l, r)))
            }
            (Value::Compound(x), Value::Compound(y)) => {
                let (x, y) = (x.borrow(), y.borrow());
                if x.type_name() != y.type_name() {
                    return false;
                }
                match (x.instance().encode_natural(), y.instance().encode_natural()) {
                    (Ok(l), Ok(r)) => {
                        let equal = l.deep_eq_with(&r, &mut |l, r| self.eq(l, r));
                        self.retained.push(l);
                        self.retained.push(r);
                        equal
                    }
                    _ => false,
                }
            }
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        DeepEq::default().eq(self, other)
    }
}

impl fmt::Display for Value {
    /// Writes the compact FRON text of the value.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_undefined() {
            return f.write_str("undefined");
        }
        match crate::stringify(self, false) {
            Ok(text) => f.write_str(&text),
            Err(_) => write!(f, "<{}>", self.kind_name()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any valid FRON value")
            }

            fn visit_bool<E>(self, value: bool) -> std::result::Result<Value, E> {
                Ok(Value::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> std::result::Result<Value, E> {
                Ok(Value::Number(Number::Integer(value)))
            }

            fn visit_u64<E>(self, value: u64) -> std::result::Result<Value, E> {
                Ok(Value::from(value))
            }

            fn visit_i128<E>(self, value: i128) -> std::result::Result<Value, E> {
                Ok(Value::BigInt(BigInt::from(value)))
            }

            fn visit_u128<E>(self, value: u128) -> std::result::Result<Value, E> {
                Ok(Value::BigInt(BigInt::from(value)))
            }

            fn visit_f64<E>(self, value: f64) -> std::result::Result<Value, E> {
                Ok(Value::Number(Number::from(value)))
            }

            fn visit_str<E>(self, value: &str) -> std::result::Result<Value, E> {
                Ok(Value::String(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> std::result::Result<Value, E> {
                Ok(Value::String(value))
            }

            fn visit_bytes<E>(self, value: &[u8]) -> std::result::Result<Value, E> {
                Ok(Value::buffer(value.to_vec()))
            }

            fn visit_unit<E>(self) -> std::result::Result<Value, E> {
                Ok(Value::Null)
            }

            fn visit_none<E>(self) -> std::result::Result<Value, E> {
                Ok(Value::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> std::result::Result<Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut vec = Vec::new();
                while let Some(elem) = seq.next_element()? {
                    vec.push(elem);
                }
                Ok(Value::array(vec))
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut values = FronMap::new();
                while let Some((key, value)) = map.next_entry::<String, Value>()? {
                    values.insert(key, value);
                }
                Ok(Value::object(values))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

// TryFrom implementations for extracting values from Value
impl TryFrom<Value> for i64 {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        value
            .as_i64()
            .ok_or_else(|| Error::custom(format!("expected integer, found {}", value.kind_name())))
    }
}

impl TryFrom<Value> for f64 {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        value
            .as_f64()
            .ok_or_else(|| Error::custom(format!("expected number, found {}", value.kind_name())))
    }
}

impl TryFrom<Value> for bool {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        value
            .as_bool()
            .ok_or_else(|| Error::custom(format!("expected bool, found {}", value.kind_name())))
    }
}

impl TryFrom<Value> for String {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(Error::custom(format!(
                "expected string, found {}",
                other.kind_name()
            ))),
        }
    }
}

// From implementations for creating Value from primitives
impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i8> for Value {
    fn from(value: i8) -> Self {
        Value::Number(Number::Integer(i64::from(value)))
    }
}

impl From<i16> for Value {
    fn from(value: i16) -> Self {
        Value::Number(Number::Integer(i64::from(value)))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(Number::Integer(i64::from(value)))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(Number::Integer(value))
    }
}

impl From<u8> for Value {
    fn from(value: u8) -> Self {
        Value::Number(Number::Integer(i64::from(value)))
    }
}

impl From<u16> for Value {
    fn from(value: u16) -> Self {
        Value::Number(Number::Integer(i64::from(value)))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Number(Number::Integer(i64::from(value)))
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(i) => Value::Number(Number::Integer(i)),
            Err(_) => Value::BigInt(BigInt::from(value)),
        }
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::from(value as u64)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Number(Number::from(f64::from(value)))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(Number::from(value))
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Value::Number(value.normalized())
    }
}

impl From<BigInt> for Value {
    fn from(value: BigInt) -> Self {
        Value::BigInt(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<Symbol> for Value {
    fn from(value: Symbol) -> Self {
        Value::Symbol(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::array(value)
    }
}

impl From<FronMap> for Value {
    fn from(value: FronMap) -> Self {
        Value::object(value)
    }
}

impl From<Compound> for Value {
    fn from(value: Compound) -> Self {
        Value::compound(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tryfrom_i64() {
        let result: i64 = TryFrom::try_from(Value::from(42)).unwrap();
        assert_eq!(result, 42);

        let result: i64 = TryFrom::try_from(Value::from(42.0)).unwrap();
        assert_eq!(result, 42);

        assert!(i64::try_from(Value::from("test")).is_err());
    }

    #[test]
    fn test_tryfrom_f64() {
        let result: f64 = TryFrom::try_from(Value::from(3.5)).unwrap();
        assert_eq!(result, 3.5);

        let result: f64 = TryFrom::try_from(Value::Number(Number::Infinity)).unwrap();
        assert_eq!(result, f64::INFINITY);
    }

    #[test]
    fn test_from_primitives() {
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(42i32), Value::Number(Number::Integer(42)));
        assert_eq!(Value::from(3.5f64), Value::Number(Number::Float(3.5)));
        assert_eq!(Value::from("test"), Value::String("test".to_string()));
        assert_eq!(Value::from(u64::MAX), Value::BigInt(BigInt::from(u64::MAX)));
        assert_eq!(Value::from(None::<i32>), Value::Null);
    }

    #[test]
    fn test_nan_equals_nan() {
        assert_eq!(Value::from(f64::NAN), Value::from(f64::NAN));
        assert_eq!(Number::Float(f64::INFINITY), Number::Infinity);
        assert_ne!(Number::Integer(1), Number::Float(1.0));
    }

    #[test]
    fn test_clone_shares_identity() {
        let a = Value::array(vec![Value::from(1)]);
        let b = a.clone();
        assert!(a.ptr_eq(&b));

        let c = Value::array(vec![Value::from(1)]);
        assert!(!a.ptr_eq(&c));
        assert_eq!(a, c);

        b.push(Value::from(2)).unwrap();
        assert_eq!(a.as_array().unwrap().borrow().len(), 2);
    }

    #[test]
    fn test_primitives_have_no_identity() {
        assert!(!Value::from(1).ptr_eq(&Value::from(1)));
        assert!(!Value::Null.ptr_eq(&Value::Null));
    }

    #[test]
    fn test_deep_eq_on_cycles() {
        let a = Value::object(FronMap::new());
        a.insert("self", a.clone()).unwrap();
        let b = Value::object(FronMap::new());
        b.insert("self", b.clone()).unwrap();
        assert_eq!(a, b);

        let c = Value::object(FronMap::new());
        c.insert("self", Value::from(1)).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_object_key_order_ignored_by_equality() {
        let a = Value::object_from([("x", Value::from(1)), ("y", Value::from(2))]);
        let b = Value::object_from([("y", Value::from(2)), ("x", Value::from(1))]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_insert_on_non_object_fails() {
        assert!(Value::array(vec![]).insert("a", Value::Null).is_err());
        assert!(Value::object(FronMap::new()).push(Value::Null).is_err());
    }

    #[test]
    fn test_symbols_are_interned() {
        let a = Symbol::for_name("hello");
        let b = Symbol::for_name("hello");
        assert!(Arc::ptr_eq(&a.0, &b.0));
        assert_ne!(a, Symbol::for_name("world"));
    }

    #[test]
    fn test_display_is_compact_text() {
        let value = Value::object_from([("a", Value::from(1))]);
        assert_eq!(value.to_string(), "{a:1}");
        assert_eq!(Value::Undefined.to_string(), "undefined");
    }
}
