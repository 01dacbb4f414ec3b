//! YADIL value representation.

use crate::error::{Error, ErrorKind, Result};
use indexmap::IndexMap;
use std::fmt;

/// An ordered map scope: bindings in declaration order.
pub type Map = IndexMap<String, Value>;

/// The type tag declared by a binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Str,
    UInt,
    SInt,
    Float,
    Bool,
    List,
    Bytes,
    Map,
}

impl TypeTag {
    /// Every tag, in declaration order.
    pub const ALL: [TypeTag; 8] = [
        TypeTag::Str,
        TypeTag::UInt,
        TypeTag::SInt,
        TypeTag::Float,
        TypeTag::Bool,
        TypeTag::List,
        TypeTag::Bytes,
        TypeTag::Map,
    ];

    /// The long keyword, e.g. `uint`.
    pub const fn long_name(self) -> &'static str {
        match self {
            TypeTag::Str => "str",
            TypeTag::UInt => "uint",
            TypeTag::SInt => "sint",
            TypeTag::Float => "float",
            TypeTag::Bool => "bool",
            TypeTag::List => "list",
            TypeTag::Bytes => "bytes",
            TypeTag::Map => "map",
        }
    }

    /// The single-letter acronym, e.g. `u`.
    pub const fn short_name(self) -> &'static str {
        match self {
            TypeTag::Str => "s",
            TypeTag::UInt => "u",
            TypeTag::SInt => "i",
            TypeTag::Float => "f",
            TypeTag::Bool => "b",
            TypeTag::List => "l",
            TypeTag::Bytes => "x",
            TypeTag::Map => "m",
        }
    }

    /// Resolve either spelling of a type keyword.
    pub fn from_keyword(word: &str) -> Option<TypeTag> {
        TypeTag::ALL
            .into_iter()
            .find(|tag| tag.long_name() == word || tag.short_name() == word)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.long_name())
    }
}

/// A YADIL value.
#[derive(Clone)]
pub enum Value {
    /// UTF-8 string.
    Str(String),
    /// Unsigned 64-bit integer.
    UInt(u64),
    /// Signed 64-bit integer.
    SInt(i64),
    /// 64-bit floating-point number.
    Float(f64),
    /// Boolean value.
    Bool(bool),
    /// Sequence of values, typed by literal shape.
    List(Vec<Value>),
    /// Octet sequence.
    Bytes(Vec<u8>),
    /// Nested scope of named bindings.
    Map(Map),
}

impl Value {
    /// The type tag that declares this value.
    pub fn tag(&self) -> TypeTag {
        match self {
            Value::Str(_) => TypeTag::Str,
            Value::UInt(_) => TypeTag::UInt,
            Value::SInt(_) => TypeTag::SInt,
            Value::Float(_) => TypeTag::Float,
            Value::Bool(_) => TypeTag::Bool,
            Value::List(_) => TypeTag::List,
            Value::Bytes(_) => TypeTag::Bytes,
            Value::Map(_) => TypeTag::Map,
        }
    }

    /// Returns a reference to the string if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer if this is a `UInt`.
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Value::UInt(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the integer if this is a `SInt`.
    pub fn as_sint(&self) -> Option<i64> {
        match self {
            Value::SInt(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the float value if this is a `Float`.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the boolean value if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns a reference to the elements if this is a `List`.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns a reference to the octets if this is `Bytes`.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Returns a reference to the scope if this is a `Map`.
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }
}

/// Floats are equal when their bits are; all NaNs are equal to each other.
fn floats_equal(a: f64, b: f64) -> bool {
    (a.is_nan() && b.is_nan()) || a.to_bits() == b.to_bits()
}

/// Maps are equal when they hold the same bindings in the same order.
fn maps_equal(a: &Map, b: &Map) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b.iter())
            .all(|((ka, va), (kb, vb))| ka == kb && va == vb)
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::UInt(a), Value::UInt(b)) => a == b,
            (Value::SInt(a), Value::SInt(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => floats_equal(*a, *b),
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => maps_equal(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{:?}", s),
            Value::UInt(n) => write!(f, "{}u", n),
            Value::SInt(n) => write!(f, "{}i", n),
            Value::Float(n) => {
                if n.is_nan() {
                    write!(f, "NaN")
                } else if n.is_infinite() {
                    if *n > 0.0 {
                        write!(f, "Infinity")
                    } else {
                        write!(f, "-Infinity")
                    }
                } else {
                    write!(f, "{:?}", n)
                }
            }
            Value::Bool(b) => write!(f, "{}", b),
            Value::List(items) => f.debug_list().entries(items).finish(),
            Value::Bytes(b) => {
                write!(f, "<")?;
                for byte in b {
                    write!(f, "{:02x}", byte)?;
                }
                write!(f, ">")
            }
            Value::Map(m) => f.debug_map().entries(m).finish(),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::UInt(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::SInt(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<Map> for Value {
    fn from(m: Map) -> Self {
        Value::Map(m)
    }
}

/// A named value within a document or map scope.
#[derive(Clone, Debug, PartialEq)]
pub struct Binding {
    pub name: String,
    pub value: Value,
}

impl Binding {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The leading `major.minor` version tag of a document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
}

impl Version {
    /// The current format version, assumed when a header is absent.
    pub const CURRENT: Version = Version { major: 1, minor: 0 };

    pub const fn new(major: u64, minor: u64) -> Self {
        Self { major, minor }
    }
}

impl Default for Version {
    fn default() -> Self {
        Version::CURRENT
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// A decoded YADIL document: version plus ordered top-level bindings.
#[derive(Clone, Debug, Default)]
pub struct Document {
    pub version: Version,
    pub bindings: Map,
}

impl Document {
    /// An empty document at the current version.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty document at the given version.
    pub fn with_version(version: Version) -> Self {
        Self {
            version,
            bindings: Map::new(),
        }
    }

    /// Append a top-level binding, rejecting a name that is already bound.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        let name = name.into();
        if self.bindings.contains_key(&name) {
            return Err(Error::new(ErrorKind::DuplicateBinding(name)));
        }
        self.bindings.insert(name, value.into());
        Ok(())
    }

    /// Append a binding; see [`Document::insert`].
    pub fn push(&mut self, binding: Binding) -> Result<()> {
        self.insert(binding.name, binding.value)
    }

    /// Look up a top-level binding by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    /// Number of top-level bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Iterate over top-level bindings in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.bindings.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version && maps_equal(&self.bindings, &other.bindings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_resolve_both_spellings() {
        for tag in TypeTag::ALL {
            assert_eq!(TypeTag::from_keyword(tag.long_name()), Some(tag));
            assert_eq!(TypeTag::from_keyword(tag.short_name()), Some(tag));
        }
        assert_eq!(TypeTag::from_keyword("e"), None);
        assert_eq!(TypeTag::from_keyword("string"), None);
    }

    #[test]
    fn test_nan_equals_nan() {
        assert_eq!(Value::Float(f64::NAN), Value::Float(-f64::NAN));
        assert_ne!(Value::Float(0.0), Value::Float(-0.0));
    }

    #[test]
    fn test_map_equality_is_ordered() {
        let mut a = Map::new();
        a.insert("x".into(), Value::UInt(1));
        a.insert("y".into(), Value::UInt(2));
        let mut b = Map::new();
        b.insert("y".into(), Value::UInt(2));
        b.insert("x".into(), Value::UInt(1));
        assert_ne!(Value::Map(a.clone()), Value::Map(b));
        assert_eq!(Value::Map(a.clone()), Value::Map(a));
    }

    #[test]
    fn test_document_rejects_duplicates() {
        let mut doc = Document::new();
        doc.insert("a", 1u64).unwrap();
        let err = doc.push(Binding::new("a", "again")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateBinding("a".into()));
        assert_eq!(doc.get("a"), Some(&Value::UInt(1)));
    }

    #[test]
    fn test_debug_rendering() {
        let v = Value::List(vec![
            Value::UInt(1),
            Value::SInt(-2),
            Value::Bytes(vec![0x1a, 0x03]),
            Value::Float(f64::NEG_INFINITY),
        ]);
        assert_eq!(format!("{:?}", v), "[1u, -2i, <1a03>, -Infinity]");
    }
}
