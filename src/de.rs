//! FRON parsing.
//!
//! This module provides the [`Parser`], which turns FRON text into a
//! [`Value`] graph, and [`ValueDeserializer`], a serde `Deserializer` over a
//! [`Value`] that backs [`from_value`](crate::from_value) and the `from_str`
//! family.
//!
//! ## Overview
//!
//! - **Single pass**: recursive descent with no backtracking
//! - **Attach before descend**: every container is linked into its parent
//!   (or becomes the root) before its children are parsed, so a reference
//!   to an enclosing container finds the very node being built
//! - **Error reporting**: syntax errors carry byte offset, line and column
//!
//! ## Usage
//!
//! ```rust
//! use fron::parse;
//!
//! let value = parse("{a: [1, 2], b: Reference($.a), me: $}").unwrap();
//! assert!(value.get("a").unwrap().ptr_eq(&value.get("b").unwrap()));
//! assert!(value.get("me").unwrap().ptr_eq(&value));
//! ```
//!
//! Typed data goes through serde:
//!
//! ```rust
//! use fron::from_str;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Data { x: i32, y: i32 }
//!
//! let data: Data = from_str("{x: 1, y: 2}").unwrap();
//! assert_eq!(data, Data { x: 1, y: 2 });
//! ```

use crate::compound::{Compound, Encoded, Instance, RegExp};
use crate::literal::{self, ScanError};
use crate::options::DEFAULT_MAX_DEPTH;
use crate::path::{self, is_identifier_part, is_identifier_start, Path};
use crate::value::{ArrayRef, CompoundRef, ObjectRef};
use crate::{registry, Error, FronMap, Number, ParseOptions, Result, Symbol, Value};
use chrono::SecondsFormat;
use num_bigint::BigInt;
use serde::de::IntoDeserializer;
use serde::{de, forward_to_deserialize_any};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::trace;

/// Where a freshly parsed value goes.
enum Slot<'s> {
    Root,
    Element(&'s ArrayRef),
    Member(&'s ObjectRef, String),
    Body(&'s CompoundRef),
}

/// The FRON parser.
///
/// Created via [`Parser::new`]; [`parse_value`](Parser::parse_value) reads
/// one complete value and [`end`](Parser::end) checks that nothing but
/// whitespace follows.
pub struct Parser<'a> {
    input: &'a str,
    position: usize,
    line: usize,
    column: usize,
    options: ParseOptions,
    root: Option<Value>,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str, options: ParseOptions) -> Self {
        Parser {
            input,
            position: 0,
            line: 1,
            column: 1,
            options,
            root: None,
            depth: 0,
        }
    }

    /// A parser that starts `offset` bytes into `input`.
    pub fn at_offset(input: &'a str, offset: usize, options: ParseOptions) -> Result<Self> {
        if !input.is_char_boundary(offset) {
            return Err(Error::custom(format!(
                "offset {offset} is not a character boundary of the input"
            )));
        }
        let mut parser = Parser::new(input, options);
        parser.advance(offset);
        Ok(parser)
    }

    /// Byte offset of the next unread character.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Parses one value; it becomes the root that references resolve against.
    pub fn parse_value(&mut self) -> Result<Value> {
        self.root = None;
        self.depth = 0;
        self.parse_slot(Slot::Root)
    }

    /// Fails unless only whitespace remains.
    pub fn end(&mut self) -> Result<()> {
        self.skip_whitespace();
        match self.peek_char() {
            None => Ok(()),
            Some(c) => Err(self.error(&format!("unexpected trailing character '{c}'"))),
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn next_char(&mut self) -> Option<char> {
        if let Some(ch) = self.input[self.position..].chars().next() {
            self.position += ch.len_utf8();
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            Some(ch)
        } else {
            None
        }
    }

    /// Moves forward `len` bytes, keeping line and column current.
    fn advance(&mut self, len: usize) {
        let target = self.position + len;
        while self.position < target && self.next_char().is_some() {}
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() {
                self.next_char();
            } else {
                break;
            }
        }
    }

    fn error(&self, msg: &str) -> Error {
        Error::syntax(self.position, self.line, self.column, msg)
    }

    fn scan_error(&mut self, err: ScanError) -> Error {
        self.advance(err.offset);
        self.error(&err.msg)
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        self.skip_whitespace();
        match self.peek_char() {
            Some(c) if c == expected => {
                self.next_char();
                Ok(())
            }
            Some(c) => Err(self.error(&format!("expected '{expected}', found '{c}'"))),
            None => Err(self.error(&format!("expected '{expected}', found end of input"))),
        }
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

    /// Links `value` into its slot and hands it back.
    fn place(&mut self, slot: Slot<'_>, value: Value) -> Value {
        match slot {
            Slot::Root => self.root = Some(value.clone()),
            Slot::Element(items) => items.borrow_mut().push(value.clone()),
            Slot::Member(members, key) => {
                members.borrow_mut().insert(key, value.clone());
            }
            Slot::Body(compound) => compound
                .borrow_mut()
                .set_instance(Instance::Record(value.clone())),
        }
        value
    }

    fn parse_slot(&mut self, slot: Slot<'_>) -> Result<Value> {
        self.skip_whitespace();
        match self.peek_char() {
            None => Err(self.error("unexpected end of input, expected a value")),
            Some('{') => self.parse_object(slot),
            Some('[') => self.parse_array(slot),
            Some('"' | '\'' | '`') => {
                let s = self.parse_string()?;
                Ok(self.place(slot, Value::String(s)))
            }
            Some('/') => {
                let regexp = self.parse_regexp()?;
                Ok(self.place(slot, Value::instance(Instance::RegExp(regexp))))
            }
            Some('$') => {
                let value = self.parse_bare_reference()?;
                Ok(self.place(slot, value))
            }
            Some(c) if c == '-' || c == '.' || c.is_ascii_digit() => {
                let value = self.parse_number()?;
                Ok(self.place(slot, value))
            }
            Some(c) if is_identifier_start(c) => self.parse_word(slot),
            Some(c) => Err(self.error(&format!("unexpected character '{c}'"))),
        }
    }

    fn parse_string(&mut self) -> Result<String> {
        let input = self.input;
        match literal::scan_string(&input[self.position..]) {
            Ok((s, len)) => {
                self.advance(len);
                Ok(s)
            }
            Err(e) => Err(self.scan_error(e)),
        }
    }

    fn parse_number(&mut self) -> Result<Value> {
        let input = self.input;
        match literal::scan_number(&input[self.position..]) {
            Ok((value, len)) => {
                self.advance(len);
                if self.peek_char().is_some_and(is_identifier_part) {
                    return Err(self.error("unexpected character after number"));
                }
                Ok(value)
            }
            Err(e) => Err(self.scan_error(e)),
        }
    }

    fn parse_regexp(&mut self) -> Result<RegExp> {
        let input = self.input;
        let start = self.position;
        let (source, flags, len) = match literal::scan_regexp(&input[start..]) {
            Ok(scanned) => scanned,
            Err(e) => return Err(self.scan_error(e)),
        };
        self.advance(len);
        RegExp::new(source, flags).map_err(|e| Error::invalid_compound("RegExp", start, &message(e)))
    }

    fn take_identifier(&mut self) -> &'a str {
        let input = self.input;
        let start = self.position;
        while self.peek_char().is_some_and(is_identifier_part) {
            self.next_char();
        }
        &input[start..self.position]
    }

    fn parse_key(&mut self) -> Result<String> {
        self.skip_whitespace();
        match self.peek_char() {
            Some('"' | '\'' | '`') => self.parse_string(),
            Some('[') => {
                self.next_char();
                self.skip_whitespace();
                let key = match self.peek_char() {
                    Some('"' | '\'' | '`') => self.parse_string()?,
                    Some(c) if c == '-' || c == '.' || c.is_ascii_digit() => {
                        number_key(&self.parse_number()?)
                    }
                    _ => return Err(self.error("expected a string or number inside '[ ]'")),
                };
                self.expect(']')?;
                Ok(key)
            }
            Some(c) if c == '-' || c == '.' || c.is_ascii_digit() => {
                Ok(number_key(&self.parse_number()?))
            }
            Some(c) if is_identifier_start(c) => Ok(self.take_identifier().to_string()),
            Some(c) => Err(self.error(&format!("expected a property name, found '{c}'"))),
            None => Err(self.error("expected a property name, found end of input")),
        }
    }

    fn parse_array(&mut self, slot: Slot<'_>) -> Result<Value> {
        self.enter()?;
        let items: ArrayRef = Rc::new(RefCell::new(Vec::new()));
        let value = self.place(slot, Value::Array(Rc::clone(&items)));
        self.next_char(); // '['

        self.skip_whitespace();
        if self.peek_char() == Some(']') {
            self.next_char();
            self.leave();
            return Ok(value);
        }

        loop {
            self.parse_slot(Slot::Element(&items))?;
            self.skip_whitespace();
            match self.peek_char() {
                Some(',') => {
                    self.next_char();
                }
                Some(']') => {
                    self.next_char();
                    break;
                }
                Some(c) => return Err(self.error(&format!("expected ',' or ']', found '{c}'"))),
                None => return Err(self.error("unterminated array")),
            }
        }

        self.leave();
        Ok(value)
    }

    fn parse_object(&mut self, slot: Slot<'_>) -> Result<Value> {
        self.enter()?;
        let members: ObjectRef = Rc::new(RefCell::new(FronMap::new()));
        let value = self.place(slot, Value::Object(Rc::clone(&members)));
        self.next_char(); // '{'

        self.skip_whitespace();
        if self.peek_char() == Some('}') {
            self.next_char();
            self.leave();
            return Ok(value);
        }

        loop {
            let key = self.parse_key()?;
            self.expect(':')?;
            self.parse_slot(Slot::Member(&members, key))?;
            self.skip_whitespace();
            match self.peek_char() {
                Some(',') => {
                    self.next_char();
                }
                Some('}') => {
                    self.next_char();
                    break;
                }
                Some(c) => return Err(self.error(&format!("expected ',' or '}}', found '{c}'"))),
                None => return Err(self.error("unterminated object")),
            }
        }

        self.leave();
        Ok(value)
    }

    /// Keywords, and every `Name(…)` form.
    fn parse_word(&mut self, slot: Slot<'_>) -> Result<Value> {
        let start = self.position;
        let (line, column) = (self.line, self.column);
        let word = self.take_identifier();
        match word {
            "null" => return Ok(self.place(slot, Value::Null)),
            "true" => return Ok(self.place(slot, Value::Bool(true))),
            "false" => return Ok(self.place(slot, Value::Bool(false))),
            "NaN" => return Ok(self.place(slot, Value::Number(Number::NaN))),
            "Infinity" => return Ok(self.place(slot, Value::Number(Number::Infinity))),
            _ => {}
        }

        self.skip_whitespace();
        if self.peek_char() != Some('(') {
            return Err(Error::syntax(
                start,
                line,
                column,
                &format!("unexpected identifier '{word}'"),
            ));
        }
        self.next_char();

        match word {
            "Reference" => {
                let value = self.parse_reference_argument(start)?;
                self.expect(')')?;
                Ok(self.place(slot, value))
            }
            "Symbol" => {
                let symbol = self.parse_symbol_argument()?;
                self.expect(')')?;
                Ok(self.place(slot, Value::Symbol(symbol)))
            }
            // Transparent wrappers: the body is the value.
            "Object" | "Array" => {
                let body = self.parse_slot(slot)?;
                self.expect(')')?;
                Ok(body)
            }
            name => self.parse_compound(name, slot, start),
        }
    }

    fn parse_compound(&mut self, name: &str, slot: Slot<'_>, start: usize) -> Result<Value> {
        self.enter()?;
        let compound: CompoundRef = Rc::new(RefCell::new(Compound::record(name, Value::Undefined)));
        let value = self.place(slot, Value::Compound(Rc::clone(&compound)));
        self.parse_slot(Slot::Body(&compound))?;
        self.expect(')')?;
        self.leave();
        self.decode(&compound, start)?;
        Ok(value)
    }

    /// Replaces the provisional record with the registered type's instance.
    fn decode(&self, compound: &CompoundRef, offset: usize) -> Result<()> {
        let (name, body) = {
            let compound = compound.borrow();
            let body = compound.record_body().cloned().unwrap_or_default();
            (compound.type_name().to_string(), body)
        };
        match registry::lookup(&name).and_then(|entry| entry.decode) {
            Some(decode) => {
                trace!(type_name = %name, offset, "decoding compound");
                let instance =
                    decode(body).map_err(|e| Error::invalid_compound(&name, offset, &message(e)))?;
                compound.borrow_mut().set_instance(instance);
            }
            None => trace!(type_name = %name, offset, "keeping open compound"),
        }
        Ok(())
    }

    fn parse_bare_reference(&mut self) -> Result<Value> {
        let input = self.input;
        let start = self.position;
        let (path, len) = path::parse_path(&input[start..])
            .ok_or_else(|| self.error("expected a reference path"))?;
        self.advance(len);
        self.resolve(&path, start)
    }

    /// The argument of `Reference(…)`: a path, or a string holding one.
    fn parse_reference_argument(&mut self, start: usize) -> Result<Value> {
        self.skip_whitespace();
        match self.peek_char() {
            Some('$') => self.parse_bare_reference(),
            Some('"' | '\'' | '`') => {
                let text = path::normalize_reference(&self.parse_string()?);
                let path = text
                    .parse::<Path>()
                    .map_err(|_| Error::reference(&text, start, "malformed path"))?;
                self.resolve(&path, start)
            }
            _ => Err(self.error("expected a reference path")),
        }
    }

    fn parse_symbol_argument(&mut self) -> Result<Symbol> {
        self.skip_whitespace();
        match self.peek_char() {
            Some('"' | '\'' | '`') => Ok(Symbol::for_name(&self.parse_string()?)),
            Some(c) if c.is_ascii_digit() => {
                let index = self.parse_number()?;
                Ok(Symbol::for_name(&number_key(&index)))
            }
            _ => Err(self.error("expected a symbol name")),
        }
    }

    fn resolve(&self, path: &Path, offset: usize) -> Result<Value> {
        let root = self
            .root
            .as_ref()
            .ok_or_else(|| Error::reference(&path.to_string(), offset, "there is no enclosing value"))?;
        path::resolve(root, path).map_err(|msg| Error::reference(&path.to_string(), offset, &msg))
    }
}

/// The message of a hook error without its category prefix.
fn message(err: Error) -> String {
    match err {
        Error::Custom(msg) => msg,
        other => other.to_string(),
    }
}

/// Property name for a numeric key, as `{1: …}` or `{[1.5]: …}`.
fn number_key(value: &Value) -> String {
    match value {
        Value::Number(Number::Float(f)) if *f == 0.0 => "0".to_string(),
        Value::Number(Number::Float(f)) if f.fract() == 0.0 && f.abs() < 1e21 => {
            format!("{f:.0}")
        }
        Value::Number(Number::Float(f)) => f.to_string(),
        Value::Number(n) => n.to_string(),
        Value::BigInt(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// A serde `Deserializer` reading from a [`Value`].
///
/// Nesting is bounded so that a cyclic value fails with
/// [`Error::DepthLimit`] instead of recursing forever.
pub struct ValueDeserializer {
    value: Value,
    depth: usize,
}

impl ValueDeserializer {
    pub fn new(value: Value) -> Self {
        ValueDeserializer { value, depth: 0 }
    }

    fn nested(value: Value, depth: usize) -> Result<Self> {
        if depth > DEFAULT_MAX_DEPTH {
            return Err(Error::DepthLimit {
                max: DEFAULT_MAX_DEPTH,
            });
        }
        Ok(ValueDeserializer { value, depth })
    }
}

fn visit_number<'de, V: de::Visitor<'de>>(n: Number, visitor: V) -> Result<V::Value> {
    match n {
        Number::Integer(i) => visitor.visit_i64(i),
        Number::Float(f) => visitor.visit_f64(f),
        Number::Infinity => visitor.visit_f64(f64::INFINITY),
        Number::NegativeInfinity => visitor.visit_f64(f64::NEG_INFINITY),
        Number::NaN => visitor.visit_f64(f64::NAN),
    }
}

fn visit_bigint<'de, V: de::Visitor<'de>>(n: &BigInt, visitor: V) -> Result<V::Value> {
    if let Ok(i) = i64::try_from(n) {
        visitor.visit_i64(i)
    } else if let Ok(u) = u64::try_from(n) {
        visitor.visit_u64(u)
    } else if let Ok(i) = i128::try_from(n) {
        visitor.visit_i128(i)
    } else if let Ok(u) = u128::try_from(n) {
        visitor.visit_u128(u)
    } else {
        Err(Error::custom(format!("{n}n does not fit in 128 bits")))
    }
}

impl ValueDeserializer {
    fn deserialize_compound<'de, V>(self, compound: &CompoundRef, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let compound = compound.borrow();
        match compound.instance() {
            Instance::Buffer(bytes) => visitor.visit_byte_buf(bytes.clone()),
            Instance::Map(entries) => {
                visitor.visit_map(EntriesDeserializer::new(entries.clone(), self.depth + 1)?)
            }
            Instance::Date(date) => {
                visitor.visit_string(date.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            Instance::String(s) => visitor.visit_string(s.clone()),
            Instance::Number(n) => visit_number(*n, visitor),
            Instance::Boolean(b) => visitor.visit_bool(*b),
            _ => match registry::resolve_encoder(&compound)?.1 {
                Encoded::Literal(text) => visitor.visit_string(text),
                Encoded::Body(body) => {
                    de::Deserializer::deserialize_any(Self::nested(body, self.depth + 1)?, visitor)
                }
            },
        }
    }
}

impl<'de> de::Deserializer<'de> for ValueDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let depth = self.depth + 1;
        match &self.value {
            Value::Null | Value::Undefined => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(*b),
            Value::Number(n) => visit_number(*n, visitor),
            Value::BigInt(n) => visit_bigint(n, visitor),
            Value::String(s) => visitor.visit_string(s.clone()),
            Value::Symbol(symbol) => visitor.visit_string(symbol.name().to_string()),
            Value::Array(items) => {
                let items = items.borrow().clone();
                visitor.visit_seq(SeqDeserializer::new(items, depth)?)
            }
            Value::Object(members) => {
                let members = members.borrow().clone();
                visitor.visit_map(MapDeserializer::new(members, depth)?)
            }
            Value::Compound(compound) => {
                let compound = Rc::clone(compound);
                self.deserialize_compound(&compound, visitor)
            }
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null | Value::Undefined => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match &self.value {
            Value::String(s) => visitor.visit_enum(s.clone().into_deserializer()),
            Value::Object(members) if members.borrow().len() == 1 => {
                let (variant, value) = members
                    .borrow()
                    .iter()
                    .next()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .ok_or_else(|| Error::custom("expected enum variant"))?;
                visitor.visit_enum(EnumDeserializer {
                    variant,
                    value: Some(value),
                    depth: self.depth + 1,
                })
            }
            other => Err(Error::custom(format!(
                "expected enum, found {}",
                other.kind_name()
            ))),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<Value>,
    depth: usize,
}

impl SeqDeserializer {
    fn new(vec: Vec<Value>, depth: usize) -> Result<Self> {
        if depth > DEFAULT_MAX_DEPTH {
            return Err(Error::DepthLimit {
                max: DEFAULT_MAX_DEPTH,
            });
        }
        Ok(SeqDeserializer {
            iter: vec.into_iter(),
            depth,
        })
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed
                .deserialize(ValueDeserializer::nested(value, self.depth)?)
                .map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct MapDeserializer {
    iter: indexmap::map::IntoIter<String, Value>,
    value: Option<Value>,
    depth: usize,
}

impl MapDeserializer {
    fn new(map: FronMap, depth: usize) -> Result<Self> {
        if depth > DEFAULT_MAX_DEPTH {
            return Err(Error::DepthLimit {
                max: DEFAULT_MAX_DEPTH,
            });
        }
        Ok(MapDeserializer {
            iter: map.into_iter(),
            value: None,
            depth,
        })
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(KeyDeserializer { key }).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(ValueDeserializer::nested(value, self.depth)?),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

/// Entries of a `Map` compound, whose keys may be any value.
struct EntriesDeserializer {
    iter: std::vec::IntoIter<(Value, Value)>,
    value: Option<Value>,
    depth: usize,
}

impl EntriesDeserializer {
    fn new(entries: Vec<(Value, Value)>, depth: usize) -> Result<Self> {
        if depth > DEFAULT_MAX_DEPTH {
            return Err(Error::DepthLimit {
                max: DEFAULT_MAX_DEPTH,
            });
        }
        Ok(EntriesDeserializer {
            iter: entries.into_iter(),
            value: None,
            depth,
        })
    }
}

impl<'de> de::MapAccess<'de> for EntriesDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(ValueDeserializer::nested(key, self.depth)?)
                    .map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(ValueDeserializer::nested(value, self.depth)?),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }
}

/// Object keys; numeric and boolean key types parse the key text.
struct KeyDeserializer {
    key: String,
}

macro_rules! deserialize_parsed_key {
    ($($method:ident => $visit:ident),* $(,)?) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: de::Visitor<'de>,
            {
                match self.key.parse() {
                    Ok(parsed) => visitor.$visit(parsed),
                    Err(_) => visitor.visit_string(self.key),
                }
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for KeyDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_string(self.key)
    }

    deserialize_parsed_key! {
        deserialize_bool => visit_bool,
        deserialize_i8 => visit_i8,
        deserialize_i16 => visit_i16,
        deserialize_i32 => visit_i32,
        deserialize_i64 => visit_i64,
        deserialize_u8 => visit_u8,
        deserialize_u16 => visit_u16,
        deserialize_u32 => visit_u32,
        deserialize_u64 => visit_u64,
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_enum(self.key.into_deserializer())
    }

    forward_to_deserialize_any! {
        i128 u128 f32 f64 char str string bytes byte_buf option unit unit_struct
        seq tuple tuple_struct map struct identifier ignored_any
    }
}

struct EnumDeserializer {
    variant: String,
    value: Option<Value>,
    depth: usize,
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = VariantDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(KeyDeserializer { key: self.variant })?;
        let visitor = VariantDeserializer {
            value: self.value,
            depth: self.depth,
        };
        Ok((variant, visitor))
    }
}

struct VariantDeserializer {
    value: Option<Value>,
    depth: usize,
}

impl<'de> de::VariantAccess<'de> for VariantDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            Some(Value::Null) | None => Ok(()),
            _ => Err(Error::custom("expected unit variant")),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.value {
            Some(value) => seed.deserialize(ValueDeserializer::nested(value, self.depth)?),
            None => Err(Error::custom("expected newtype variant")),
        }
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(Value::Array(items)) => {
                let items = items.borrow().clone();
                visitor.visit_seq(SeqDeserializer::new(items, self.depth + 1)?)
            }
            _ => Err(Error::custom("expected tuple variant")),
        }
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(Value::Object(members)) => {
                let members = members.borrow().clone();
                visitor.visit_map(MapDeserializer::new(members, self.depth + 1)?)
            }
            _ => Err(Error::custom("expected struct variant")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{from_value, parse, parse_with_options};
    use serde::Deserialize;
    use std::collections::HashMap;

    #[test]
    fn test_error_position() {
        let err = parse("{\n  a: 1,\n  b: ?\n}").unwrap_err();
        match err {
            Error::Syntax {
                offset, line, col, ..
            } => {
                assert_eq!(offset, 15);
                assert_eq!(line, 3);
                assert_eq!(col, 6);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_trailing_content() {
        assert!(matches!(parse("1 2").unwrap_err(), Error::Syntax { offset: 2, .. }));
        assert!(parse("  [1]  \n").is_ok());
    }

    #[test]
    fn test_trailing_comma_rejected() {
        assert!(parse("[1,]").is_err());
        assert!(parse("{a:1,}").is_err());
    }

    #[test]
    fn test_key_forms() {
        let value = parse(r#"{plain: 1, "quoted key": 2, 'single': 3, 4: 4, [5]: 5, ["x"]: 6}"#).unwrap();
        let members = value.as_object().unwrap().borrow();
        let keys: Vec<_> = members.keys().cloned().collect();
        assert_eq!(keys, vec!["plain", "quoted key", "single", "4", "5", "x"]);
    }

    #[test]
    fn test_negative_zero() {
        let value = parse("[-0, 0]").unwrap();
        assert_eq!(crate::stringify(&value, false).unwrap(), "[-0.0,0]");

        let keyed = parse("{-0: 1}").unwrap();
        assert_eq!(keyed.get("0"), Some(Value::from(1)));
    }

    #[test]
    fn test_number_then_letters_is_error() {
        assert!(parse("[12abc]").is_err());
    }

    #[test]
    fn test_unknown_identifier() {
        let err = parse("[foo]").unwrap_err();
        assert!(err.to_string().contains("foo"));
    }

    #[test]
    fn test_wrappers_are_transparent() {
        let value = parse("Object({a: Array([1])})").unwrap();
        assert!(value.is_object());
        assert!(value.get("a").unwrap().is_array());
    }

    #[test]
    fn test_reference_string_forms() {
        let value = parse(r#"{abc: {prop2: [1]}, x: Reference("abc.prop2"), y: Reference("$.abc")}"#)
            .unwrap();
        let abc = value.get("abc").unwrap();
        assert!(value.get("x").unwrap().ptr_eq(&abc.get("prop2").unwrap()));
        assert!(value.get("y").unwrap().ptr_eq(&abc));
    }

    #[test]
    fn test_top_level_reference_fails() {
        assert!(matches!(parse("$").unwrap_err(), Error::Reference { .. }));
    }

    #[test]
    fn test_invalid_compound_offset() {
        let err = parse("[1, Date(\"nope\")]").unwrap_err();
        assert_eq!(err.offset(), Some(4));
        assert!(matches!(err, Error::InvalidCompound { ref type_name, .. } if type_name == "Date"));
    }

    #[test]
    fn test_depth_counts_compounds() {
        let options = ParseOptions::new().with_max_depth(2);
        assert!(parse_with_options("Foo([1])", &options).is_ok());
        assert!(parse_with_options("Foo([[1]])", &options).is_err());
    }

    fn nested(open: &str, close: &str, levels: usize) -> String {
        format!("{}1{}", open.repeat(levels), close.repeat(levels))
    }

    #[test]
    fn test_default_depth_on_default_thread() {
        for (open, close) in [("{a:", "}"), ("Foo(", ")"), ("[", "]")] {
            let text = nested(open, close, DEFAULT_MAX_DEPTH);
            assert!(parse(&text).is_ok(), "{open} at the limit");

            let text = nested(open, close, DEFAULT_MAX_DEPTH + 1);
            assert_eq!(
                parse(&text).unwrap_err(),
                Error::DepthLimit {
                    max: DEFAULT_MAX_DEPTH
                }
            );
        }
    }

    #[derive(Deserialize, Debug, PartialEq)]
    enum Shape {
        Dot,
        Circle(f64),
        Rect { w: u32, h: u32 },
    }

    #[test]
    fn test_from_value_enums() {
        let shapes: Vec<Shape> = from_value(&parse(r#"["Dot", {Circle: 1.5}, {Rect: {w: 2, h: 3}}]"#).unwrap()).unwrap();
        assert_eq!(
            shapes,
            vec![Shape::Dot, Shape::Circle(1.5), Shape::Rect { w: 2, h: 3 }]
        );
    }

    #[test]
    fn test_from_value_integer_keys() {
        let map: HashMap<u32, String> = from_value(&parse(r#"{1: "one", 2: "two"}"#).unwrap()).unwrap();
        assert_eq!(map.get(&2).map(String::as_str), Some("two"));
    }

    #[test]
    fn test_from_value_builtin_instances() {
        let bytes: Vec<u8> = from_value(&parse("Buffer([1, 2, 3])").unwrap()).unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);

        let set: Vec<String> = from_value(&parse(r#"Set(["a", "b"])"#).unwrap()).unwrap();
        assert_eq!(set, vec!["a", "b"]);

        let map: HashMap<String, i32> = from_value(&parse(r#"Map([["k", 1]])"#).unwrap()).unwrap();
        assert_eq!(map.get("k"), Some(&1));
    }

    #[test]
    fn test_from_value_cycle_hits_depth_limit() {
        #[derive(Deserialize, Debug)]
        #[allow(dead_code)]
        struct Node {
            next: Box<Node>,
        }
        let value = parse("{next: $}").unwrap();
        let err = from_value::<Node>(&value).unwrap_err();
        assert!(matches!(err, Error::DepthLimit { .. }));
    }
}
