//! Process-wide registry of compound types.
//!
//! The registry maps a type name to optional encode and decode hooks. It is
//! populated with the built-in types on first use and only grows afterwards.
//!
//! Lookups take a shared lock and clone the entry out, so hooks never run
//! while the registry is locked and may themselves call into the crate.
//!
//! ```rust
//! use fron::{parse, register, stringify, TypeOptions, Value};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Serialize, Deserialize, PartialEq)]
//! struct User {
//!     name: String,
//! }
//!
//! register(TypeOptions::<User>::new()).unwrap();
//!
//! let text = stringify(&Value::custom(User { name: "Ann".into() }), false).unwrap();
//! assert_eq!(text, r#"User({name:"Ann"})"#);
//!
//! let back = parse(&text).unwrap();
//! let compound = back.as_compound().unwrap().borrow();
//! assert_eq!(compound.downcast_ref::<User>(), Some(&User { name: "Ann".into() }));
//! ```

use crate::compound::{self, short_type_name, Compound, CustomInstance, Encoded, ErrorKind, Instance, TypedArray};
use crate::path::is_identifier;
use crate::{Error, Result, Value};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, LazyLock};
use tracing::debug;

/// Encode hook: instance to body (or bare literal).
pub type EncodeFn = Arc<dyn Fn(&Instance) -> Result<Encoded> + Send + Sync>;
/// Decode hook: parsed body to instance.
pub type DecodeFn = Arc<dyn Fn(Value) -> Result<Instance> + Send + Sync>;

/// A registered compound type.
#[derive(Clone)]
pub struct TypeEntry {
    pub name: String,
    pub encode: Option<EncodeFn>,
    pub decode: Option<DecodeFn>,
}

impl TypeEntry {
    /// An entry with no hooks: bodies stay open records.
    pub fn new(name: impl Into<String>) -> Self {
        TypeEntry {
            name: name.into(),
            encode: None,
            decode: None,
        }
    }

    #[must_use]
    pub fn with_encoder<F>(mut self, encode: F) -> Self
    where
        F: Fn(&Instance) -> Result<Encoded> + Send + Sync + 'static,
    {
        self.encode = Some(Arc::new(encode));
        self
    }

    #[must_use]
    pub fn with_decoder<F>(mut self, decode: F) -> Self
    where
        F: Fn(Value) -> Result<Instance> + Send + Sync + 'static,
    {
        self.decode = Some(Arc::new(decode));
        self
    }
}

impl fmt::Debug for TypeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeEntry")
            .field("name", &self.name)
            .field("encode", &self.encode.is_some())
            .field("decode", &self.decode.is_some())
            .finish()
    }
}

/// Registration options for a Rust type `T`.
///
/// # Examples
///
/// ```rust
/// use fron::{register, Encoded, Error, TypeOptions, Value};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// let options = TypeOptions::<Point>::new()
///     .name("Pt")
///     .encode(|p: &Point| Ok(Encoded::Body(fron::fron!([(p.x), (p.y)]))))
///     .decode(|body: Value| {
///         let x = body.index(0).and_then(|v| v.as_i64()).ok_or_else(|| Error::custom("x"))?;
///         let y = body.index(1).and_then(|v| v.as_i64()).ok_or_else(|| Error::custom("y"))?;
///         Ok(Point { x: x as i32, y: y as i32 })
///     })
///     .strict();
/// register(options).unwrap();
///
/// let text = fron::stringify(&Value::custom(Point { x: 1, y: 2 }), false).unwrap();
/// assert_eq!(text, "Pt([1,2])");
/// ```
pub struct TypeOptions<T> {
    name: Option<String>,
    encode: Option<EncodeFn>,
    decode: Option<DecodeFn>,
    strict: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Default for TypeOptions<T> {
    fn default() -> Self {
        TypeOptions {
            name: None,
            encode: None,
            decode: None,
            strict: false,
            _marker: PhantomData,
        }
    }
}

impl<T: Serialize + Any> TypeOptions<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers under `name` instead of the short Rust type name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the encode hook for values of `T`.
    #[must_use]
    pub fn encode<F>(mut self, encode: F) -> Self
    where
        F: Fn(&T) -> Result<Encoded> + Send + Sync + 'static,
    {
        self.encode = Some(Arc::new(move |instance: &Instance| {
            match instance {
                Instance::Custom(custom) => match custom.downcast_ref::<T>() {
                    Some(value) => encode(value),
                    None => instance.encode_natural(),
                },
                other => other.encode_natural(),
            }
        }));
        self
    }

    /// Sets the decode hook building `T` from a parsed body.
    #[must_use]
    pub fn decode<F>(mut self, decode: F) -> Self
    where
        F: Fn(Value) -> Result<T> + Send + Sync + 'static,
    {
        self.decode = Some(Arc::new(move |body: Value| {
            decode(body).map(|value| Instance::Custom(CustomInstance::new(value)))
        }));
        self
    }

    /// Makes registration fail with [`Error::DuplicateType`] if the name is taken.
    #[must_use]
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }
}

/// The table behind the process-wide registry.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    entries: HashMap<String, TypeEntry>,
    names: HashMap<TypeId, String>,
}

impl TypeRegistry {
    /// A registry holding only the built-in types.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = TypeRegistry::default();
        let natural = |entry: TypeEntry| entry.with_encoder(|instance| instance.encode_natural());

        registry.put(natural(TypeEntry::new("Date")).with_decoder(compound::decode_date));
        registry.put(natural(TypeEntry::new("RegExp")).with_decoder(compound::decode_regexp));
        registry.put(natural(TypeEntry::new("Map")).with_decoder(compound::decode_map));
        registry.put(natural(TypeEntry::new("Set")).with_decoder(compound::decode_set));
        registry.put(natural(TypeEntry::new("Buffer")).with_decoder(compound::decode_buffer));
        for name in TypedArray::NAMES {
            registry.put(
                natural(TypeEntry::new(name))
                    .with_decoder(move |body| compound::decode_typed_array(name, body)),
            );
        }
        for name in ["String", "Number", "Boolean"] {
            registry.put(
                natural(TypeEntry::new(name)).with_decoder(move |body| compound::decode_boxed(name, body)),
            );
        }
        for kind in ErrorKind::ALL {
            registry.put(
                natural(TypeEntry::new(kind.as_str()))
                    .with_decoder(move |body| compound::decode_error(kind, body)),
            );
        }
        registry
    }

    fn put(&mut self, entry: TypeEntry) {
        self.entries.insert(entry.name.clone(), entry);
    }

    /// Adds or replaces an entry. With `strict`, an existing name is an error.
    pub fn insert(&mut self, entry: TypeEntry, strict: bool) -> Result<()> {
        if !is_identifier(&entry.name) || RESERVED.contains(&entry.name.as_str()) {
            return Err(Error::custom(format!(
                "'{}' cannot be used as a type name",
                entry.name
            )));
        }
        if self.entries.contains_key(&entry.name) {
            if strict {
                return Err(Error::DuplicateType(entry.name));
            }
            debug!(type_name = %entry.name, "replacing registered type");
        } else {
            debug!(type_name = %entry.name, "registered type");
        }
        self.put(entry);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TypeEntry> {
        self.entries.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// Names the grammar itself interprets.
const RESERVED: [&str; 9] = [
    "Reference", "Symbol", "Object", "Array", "Infinity", "NaN", "null", "true", "false",
];

static REGISTRY: LazyLock<RwLock<TypeRegistry>> =
    LazyLock::new(|| RwLock::new(TypeRegistry::with_builtins()));

/// Registers a Rust type as a compound type.
///
/// Without hooks, values are written as their serde structure and rebuilt
/// with `Deserialize`. Re-registering a name replaces the earlier entry
/// unless the options are [`strict`](TypeOptions::strict).
pub fn register<T>(options: TypeOptions<T>) -> Result<()>
where
    T: Serialize + DeserializeOwned + Any,
{
    let TypeOptions {
        name,
        encode,
        decode,
        strict,
        ..
    } = options;
    let name = name.unwrap_or_else(|| short_type_name::<T>().to_string());
    let decode: DecodeFn = match decode {
        Some(decode) => decode,
        None => Arc::new(|body: Value| {
            crate::from_value::<T>(&body).map(|value| Instance::Custom(CustomInstance::new(value)))
        }),
    };
    let entry = TypeEntry {
        name: name.clone(),
        encode,
        decode: Some(decode),
    };

    let mut registry = REGISTRY.write();
    registry.insert(entry, strict)?;
    registry.names.insert(TypeId::of::<T>(), name);
    Ok(())
}

/// Registers an entry that is not tied to a Rust type.
///
/// ```rust
/// use fron::{parse, register_entry, Instance, TypeEntry};
///
/// let entry = TypeEntry::new("Upper").with_decoder(|body| {
///     let text = body.as_str().unwrap_or_default().to_uppercase();
///     Ok(Instance::String(text))
/// });
/// register_entry(entry, false).unwrap();
///
/// let value = parse(r#"Upper("abc")"#).unwrap();
/// let compound = value.as_compound().unwrap().borrow();
/// assert!(matches!(compound.instance(), Instance::String(s) if s == "ABC"));
/// ```
pub fn register_entry(entry: TypeEntry, strict: bool) -> Result<()> {
    REGISTRY.write().insert(entry, strict)
}

/// Returns a copy of the entry registered under `name`.
#[must_use]
pub fn lookup(name: &str) -> Option<TypeEntry> {
    REGISTRY.read().get(name).cloned()
}

#[must_use]
pub fn is_registered(name: &str) -> bool {
    REGISTRY.read().contains(name)
}

/// Name a custom value of type `type_id` is written under.
pub(crate) fn name_for(type_id: TypeId, fallback: &str) -> String {
    REGISTRY
        .read()
        .names
        .get(&type_id)
        .cloned()
        .unwrap_or_else(|| fallback.to_string())
}

/// Chooses how a compound is written: the instance's own hook, then the
/// registry entry for its type name, then the natural encoding.
pub fn resolve_encoder(compound: &Compound) -> Result<(String, Encoded)> {
    let name = compound.type_name().to_string();
    if let Instance::Custom(custom) = compound.instance() {
        if let Some(encoded) = custom.encode_own() {
            return Ok((name, encoded?));
        }
    }
    let encoded = match lookup(&name).and_then(|entry| entry.encode) {
        Some(encode) => encode(compound.instance())?,
        None => compound.instance().encode_natural()?,
    };
    Ok((name, encoded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_builtins_present() {
        let registry = TypeRegistry::with_builtins();
        for name in [
            "Date",
            "RegExp",
            "Map",
            "Set",
            "Buffer",
            "Int8Array",
            "Uint32Array",
            "String",
            "Number",
            "Boolean",
            "Error",
            "AssertionError",
        ] {
            assert!(registry.contains(name), "missing {name}");
        }
        assert_eq!(registry.names().count(), 21);
    }

    #[test]
    fn test_strict_duplicate() {
        let mut registry = TypeRegistry::with_builtins();
        let err = registry.insert(TypeEntry::new("Date"), true).unwrap_err();
        assert_eq!(err, Error::DuplicateType("Date".to_string()));

        registry.insert(TypeEntry::new("Date"), false).unwrap();
        assert!(registry.get("Date").unwrap().decode.is_none());
    }

    #[test]
    fn test_rejects_unwritable_names() {
        let mut registry = TypeRegistry::default();
        assert!(registry.insert(TypeEntry::new("two words"), false).is_err());
        assert!(registry.insert(TypeEntry::new("Reference"), false).is_err());
        assert!(registry.insert(TypeEntry::new("NaN"), false).is_err());
        assert!(registry.insert(TypeEntry::new("$Money"), false).is_ok());
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct RegistryProbe {
        id: u32,
    }

    #[test]
    fn test_register_records_name() {
        register(TypeOptions::<RegistryProbe>::new().name("Probe")).unwrap();
        assert!(is_registered("Probe"));

        let value = Value::custom(RegistryProbe { id: 3 });
        let compound = value.as_compound().unwrap().borrow();
        assert_eq!(compound.type_name(), "Probe");

        let (name, encoded) = resolve_encoder(&compound).unwrap();
        assert_eq!(name, "Probe");
        assert_eq!(encoded.body().and_then(|b| b.get("id")), Some(Value::from(3)));
    }

    #[test]
    fn test_default_decoder_uses_serde() {
        register(TypeOptions::<RegistryProbe>::new().name("Probe")).unwrap();
        let decode = lookup("Probe").and_then(|e| e.decode).unwrap();
        let instance = decode(Value::object_from([("id", Value::from(9))])).unwrap();
        match instance {
            Instance::Custom(custom) => {
                assert_eq!(custom.downcast_ref::<RegistryProbe>(), Some(&RegistryProbe { id: 9 }))
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_own_encoder_wins() {
        let custom = CustomInstance::new(5u8).with_encoder(|_: &u8| Ok(Encoded::Literal("five".into())));
        let compound = Compound::new("Date", Instance::Custom(custom));
        let (_, encoded) = resolve_encoder(&compound).unwrap();
        assert!(matches!(encoded, Encoded::Literal(s) if s == "five"));
    }
}
