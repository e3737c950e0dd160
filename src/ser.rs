//! FRON serialization.
//!
//! Two serializers live here:
//!
//! - [`Serializer`] writes a [`Value`] graph as FRON text. The first time it
//!   meets a container it records the container's path; every later meeting
//!   is written as `Reference($…)`. This is what makes shared and cyclic
//!   data representable.
//! - [`ValueSerializer`] is a serde `Serializer` that turns any `Serialize`
//!   type into a [`Value`]. [`to_value`](crate::to_value) and the
//!   `to_string` family are built on it.
//!
//! ## Usage
//!
//! Most users should use the high-level functions in the crate root:
//!
//! ```rust
//! use fron::{fron, stringify, to_string};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Data { x: i32, y: i32 }
//!
//! assert_eq!(to_string(&Data { x: 1, y: 2 }).unwrap(), "{x:1,y:2}");
//!
//! let shared = fron!([1, 2]);
//! let doc = fron!({ "a": (shared.clone()), "b": (shared) });
//! assert_eq!(stringify(&doc, false).unwrap(), "{a:[1,2],b:Reference($.a)}");
//! ```
//!
//! ## Direct Serializer Usage
//!
//! ```rust
//! use fron::{fron, FronOptions, Serializer};
//!
//! let mut serializer = Serializer::new(FronOptions::pretty());
//! serializer.serialize(&fron!([1, { "k": null }])).unwrap();
//! assert_eq!(serializer.into_inner(), "[\n  1,\n  {\n    k: null\n  }\n]");
//! ```

use crate::compound::Encoded;
use crate::literal::{self, bigint_to_literal, number_to_literal, string_to_literal};
use crate::path::{is_identifier, Path};
use crate::value::{ArrayRef, CompoundRef, ObjectRef};
use crate::{registry, Error, FronMap, FronOptions, Number, Result, Value};
use num_bigint::BigInt;
use serde::{ser, Serialize};
use std::collections::HashMap;

/// Writes a [`Value`] graph as FRON text.
///
/// Created via [`Serializer::new`]; each call to [`serialize`](Self::serialize)
/// starts a fresh reference map.
pub struct Serializer {
    output: String,
    options: FronOptions,
    refs: HashMap<usize, Path>,
    // Keeps encoded bodies alive so their addresses are not reused mid-call.
    retained: Vec<Value>,
    depth: usize,
}

impl Serializer {
    pub fn new(options: FronOptions) -> Self {
        Serializer {
            output: String::with_capacity(256),
            options,
            refs: HashMap::new(),
            retained: Vec::new(),
            depth: 0,
        }
    }

    pub fn into_inner(self) -> String {
        self.output
    }

    /// Appends the text of `value`.
    ///
    /// A value with no textual form (`Undefined`, or a compound whose hook
    /// encodes to it) is an [`Error::UnsupportedType`].
    pub fn serialize(&mut self, value: &Value) -> Result<()> {
        self.refs.clear();
        self.retained.clear();
        self.depth = 0;
        let mark = self.output.len();
        if !self.write_value(value, &Path::root(), 0)? {
            self.output.truncate(mark);
            return Err(Error::unsupported_type("undefined has no textual form"));
        }
        Ok(())
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.options.max_depth {
            return Err(Error::DepthLimit {
                max: self.options.max_depth,
            });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn write_newline(&mut self, level: usize) {
        if self.options.is_pretty() {
            self.output.push('\n');
            for _ in 0..level {
                self.output.push_str(&self.options.indent);
            }
        }
    }

    fn write_separator(&mut self, count: usize, level: usize) {
        if count > 0 {
            self.output.push(',');
        }
        self.write_newline(level);
    }

    fn write_close(&mut self, count: usize, level: usize, close: char) {
        if count > 0 {
            self.write_newline(level);
        }
        self.output.push(close);
    }

    fn write_key(&mut self, key: &str) {
        if is_identifier(key) {
            self.output.push_str(key);
        } else {
            self.output.push_str(&string_to_literal(key, '"'));
        }
        self.output.push(':');
        if self.options.is_pretty() {
            self.output.push(' ');
        }
    }

    /// Writes `Reference(path)` if `value` was already written.
    fn write_reference(&mut self, value: &Value) -> bool {
        let Some(path) = value.identity().and_then(|id| self.refs.get(&id)) else {
            return false;
        };
        let text = format!("Reference({path})");
        self.output.push_str(&text);
        true
    }

    fn remember(&mut self, value: &Value, path: &Path) {
        if let Some(id) = value.identity() {
            self.refs.insert(id, path.clone());
            self.retained.push(value.clone());
        }
    }

    fn forget(&mut self, value: &Value) {
        if let Some(id) = value.identity() {
            self.refs.remove(&id);
        }
    }

    /// Returns `false` when the value is omitted.
    fn write_value(&mut self, value: &Value, path: &Path, level: usize) -> Result<bool> {
        match value {
            Value::Undefined => return Ok(false),
            Value::Null => self.output.push_str("null"),
            Value::Bool(b) => self.output.push_str(if *b { "true" } else { "false" }),
            Value::Number(n) => self.output.push_str(&number_to_literal(n)),
            Value::BigInt(n) => self.output.push_str(&bigint_to_literal(n)),
            Value::String(s) => self.output.push_str(&string_to_literal(s, '"')),
            Value::Symbol(symbol) => {
                self.output.push_str("Symbol(");
                self.output.push_str(&string_to_literal(symbol.name(), '"'));
                self.output.push(')');
            }
            Value::Array(items) => {
                if !self.write_reference(value) {
                    self.remember(value, path);
                    self.write_array(items, path, level)?;
                }
            }
            Value::Object(members) => {
                if !self.write_reference(value) {
                    self.remember(value, path);
                    self.write_object(members, path, level)?;
                }
            }
            Value::Compound(compound) => {
                if !self.write_reference(value) {
                    self.remember(value, path);
                    if !self.write_compound(compound, path, level)? {
                        self.forget(value);
                        return Ok(false);
                    }
                }
            }
        }
        Ok(true)
    }

    fn write_array(&mut self, items: &ArrayRef, path: &Path, level: usize) -> Result<()> {
        self.enter()?;
        let items = items.borrow().clone();
        self.output.push('[');
        let mut count = 0;
        for item in &items {
            let mark = self.output.len();
            self.write_separator(count, level + 1);
            // Indices count written elements so paths match the parsed result.
            if self.write_value(item, &path.index(count), level + 1)? {
                count += 1;
            } else {
                self.output.truncate(mark);
            }
        }
        self.write_close(count, level, ']');
        self.leave();
        Ok(())
    }

    fn write_object(&mut self, members: &ObjectRef, path: &Path, level: usize) -> Result<()> {
        self.enter()?;
        let members: Vec<(String, Value)> = members
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        self.output.push('{');
        let mut count = 0;
        for (key, member) in &members {
            let mark = self.output.len();
            self.write_separator(count, level + 1);
            self.write_key(key);
            if self.write_value(member, &path.key(key), level + 1)? {
                count += 1;
            } else {
                self.output.truncate(mark);
            }
        }
        self.write_close(count, level, '}');
        self.leave();
        Ok(())
    }

    fn write_compound(&mut self, compound: &CompoundRef, path: &Path, level: usize) -> Result<bool> {
        let (name, encoded) = {
            let compound = compound.borrow();
            registry::resolve_encoder(&compound)?
        };
        let body = match encoded {
            Encoded::Literal(text) => {
                self.output.push_str(&text);
                return Ok(true);
            }
            Encoded::Body(Value::Undefined) => return Ok(false),
            Encoded::Body(body) => body,
        };

        self.enter()?;
        let mark = self.output.len();
        self.output.push_str(&name);
        self.output.push('(');
        // The body shares the compound's path and indentation.
        let wrote = self.write_value(&body, path, level)?;
        self.leave();
        if !wrote {
            self.output.truncate(mark);
            return Ok(false);
        }
        self.output.push(')');
        Ok(true)
    }
}

/// A serde `Serializer` producing [`Value`]s.
///
/// Enum variants with data become single-member objects keyed by the
/// variant name; byte slices become `Buffer` compounds.
pub struct ValueSerializer;

pub struct SerializeVec {
    vec: Vec<Value>,
}

pub struct SerializeTupleVariant {
    name: &'static str,
    vec: Vec<Value>,
}

pub struct SerializeMap {
    map: FronMap,
    current_key: Option<String>,
}

pub struct SerializeStructVariant {
    name: &'static str,
    map: FronMap,
}

fn tagged(name: &str, value: Value) -> Value {
    Value::object_from([(name, value)])
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeTupleVariant;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = SerializeStructVariant;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Value> {
        Ok(match i64::try_from(v) {
            Ok(i) => Value::from(i),
            Err(_) => Value::BigInt(BigInt::from(v)),
        })
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u128(self, v: u128) -> Result<Value> {
        Ok(match i64::try_from(v) {
            Ok(i) => Value::from(i),
            Err(_) => Value::BigInt(BigInt::from(v)),
        })
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Ok(Value::Number(Number::from(v)))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        Ok(Value::buffer(v.to_vec()))
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        Ok(tagged(variant, to_value(value)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec {
            vec: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeTupleVariant> {
        Ok(SerializeTupleVariant {
            name: variant,
            vec: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap {
            map: FronMap::with_capacity(len.unwrap_or(0)),
            current_key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<SerializeMap> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeStructVariant> {
        Ok(SerializeStructVariant {
            name: variant,
            map: FronMap::with_capacity(len),
        })
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::array(self.vec))
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleVariant for SerializeTupleVariant {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(tagged(self.name, Value::array(self.vec)))
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = match to_value(key)? {
            Value::String(s) => s,
            Value::Number(n) => literal::number_to_literal(&n),
            Value::BigInt(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            other => {
                return Err(Error::custom(format!(
                    "map keys must be strings or numbers, found {}",
                    other.kind_name()
                )))
            }
        };
        self.current_key = Some(key);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.map.insert(key, to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::object(self.map))
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map.insert(key.to_string(), to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::object(self.map))
    }
}

impl ser::SerializeStructVariant for SerializeStructVariant {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map.insert(key.to_string(), to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(tagged(self.name, Value::object(self.map)))
    }
}

/// Converts any `Serialize` value into a [`Value`].
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    value.serialize(ValueSerializer)
}
