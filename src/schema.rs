//! The descriptor model: a record shape declared as data.
//!
//! Rust has no runtime reflection, so the shape every pipeline operation
//! works on is an explicit [`RecordSchema`] — an ordered list of
//! [`FieldDescriptor`]s, each carrying a name, a [`TypeDescriptor`], string
//! [`Tags`], and an embedding flag. Field order is significant: it is the
//! positional correspondence used by the whole pipeline, including value
//! trees ([`Value`](crate::Value) records are positional).

use std::fmt;
use std::sync::Arc;

use crate::value::Value;

/// The type of one field, described structurally.
///
/// `Optional` plays the role of a nilable pointer: its values are either
/// [`Value::Nil`](crate::Value::Nil) or the inner value, never wrapped.
/// `Named` attaches a nominal name to an underlying shape (a `Duration`
/// over `Int`), so that two structurally-equal types can still be told
/// apart. Equality is structural throughout; `Opaque` compares by name.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    Bool,
    Int,
    Uint,
    Float,
    Str,
    /// Nilable wrapper around any type.
    Optional(Box<TypeDescriptor>),
    /// Growable sequence; a nil sequence is distinct from an empty one.
    Seq(Box<TypeDescriptor>),
    /// Fixed-length sequence.
    Array(usize, Box<TypeDescriptor>),
    /// Key/value pairs; a map whose value type is `Unit` acts as a set.
    Map(Box<TypeDescriptor>, Box<TypeDescriptor>),
    Record(RecordSchema),
    /// Buffered value queue; dropped by normalization, supported by the
    /// substitution mangler.
    Channel(Box<TypeDescriptor>),
    /// A nominal wrapper: `Named("Duration", Int)`.
    Named(String, Box<TypeDescriptor>),
    /// A type constructible only from its textual representation.
    Opaque(OpaqueType),
    /// The empty type; used as a set's member marker.
    Unit,
    /// A dynamically-typed slot, specialized by normalization when a
    /// template value reveals the concrete shape.
    Any,
}

impl TypeDescriptor {
    pub fn optional(inner: TypeDescriptor) -> Self {
        TypeDescriptor::Optional(Box::new(inner))
    }

    pub fn seq(elem: TypeDescriptor) -> Self {
        TypeDescriptor::Seq(Box::new(elem))
    }

    pub fn array(len: usize, elem: TypeDescriptor) -> Self {
        TypeDescriptor::Array(len, Box::new(elem))
    }

    pub fn map(key: TypeDescriptor, value: TypeDescriptor) -> Self {
        TypeDescriptor::Map(Box::new(key), Box::new(value))
    }

    pub fn channel(elem: TypeDescriptor) -> Self {
        TypeDescriptor::Channel(Box::new(elem))
    }

    pub fn named(name: &str, underlying: TypeDescriptor) -> Self {
        TypeDescriptor::Named(name.to_string(), Box::new(underlying))
    }

    /// The type with any `Named` wrappers peeled off.
    pub fn resolved(&self) -> &TypeDescriptor {
        let mut ty = self;
        while let TypeDescriptor::Named(_, underlying) = ty {
            ty = underlying;
        }
        ty
    }

    /// Whether values of this type can already represent absence without
    /// an extra optional layer.
    pub fn is_nilable(&self) -> bool {
        matches!(
            self.resolved(),
            TypeDescriptor::Optional(_)
                | TypeDescriptor::Seq(_)
                | TypeDescriptor::Map(_, _)
                | TypeDescriptor::Channel(_)
                | TypeDescriptor::Any
        )
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Bool => write!(f, "bool"),
            TypeDescriptor::Int => write!(f, "int"),
            TypeDescriptor::Uint => write!(f, "uint"),
            TypeDescriptor::Float => write!(f, "float"),
            TypeDescriptor::Str => write!(f, "string"),
            TypeDescriptor::Optional(inner) => write!(f, "option<{inner}>"),
            TypeDescriptor::Seq(elem) => write!(f, "[{elem}]"),
            TypeDescriptor::Array(len, elem) => write!(f, "[{elem}; {len}]"),
            TypeDescriptor::Map(k, v) => write!(f, "map<{k}, {v}>"),
            TypeDescriptor::Record(schema) => write!(f, "record({} fields)", schema.len()),
            TypeDescriptor::Channel(elem) => write!(f, "channel<{elem}>"),
            TypeDescriptor::Named(name, _) => write!(f, "{name}"),
            TypeDescriptor::Opaque(opaque) => write!(f, "{}", opaque.name()),
            TypeDescriptor::Unit => write!(f, "unit"),
            TypeDescriptor::Any => write!(f, "any"),
        }
    }
}

/// A type satisfying the opaque-text contract: constructible purely from a
/// textual representation, treated as a unit by the pipeline (never
/// decomposed into internal fields).
#[derive(Clone)]
pub struct OpaqueType {
    name: String,
    construct: Arc<dyn Fn(&str) -> Result<Value, String> + Send + Sync>,
}

impl OpaqueType {
    pub fn new(
        name: &str,
        construct: impl Fn(&str) -> Result<Value, String> + Send + Sync + 'static,
    ) -> Self {
        OpaqueType {
            name: name.to_string(),
            construct: Arc::new(construct),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Construct a value of this type from its textual representation.
    pub fn construct(&self, text: &str) -> Result<Value, String> {
        (self.construct)(text)
    }
}

impl PartialEq for OpaqueType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl fmt::Debug for OpaqueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OpaqueType").field(&self.name).finish()
    }
}

/// Ordered key/value metadata on a field. Keys are unique; insertion order
/// is preserved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tags(Vec<(String, String)>);

impl Tags {
    pub fn new() -> Self {
        Tags(Vec::new())
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut tags = Tags::new();
        for (key, value) in pairs {
            tags.set(key, value);
        }
        tags
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert or replace the value under `key`, keeping the key's original
    /// position when replacing.
    pub fn set(&mut self, key: &str, value: &str) {
        match self.0.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.0.push((key.to_string(), value.to_string())),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One member of a record shape.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub name: String,
    pub ty: TypeDescriptor,
    pub tags: Tags,
    /// Embedded fields are hoisted by the hoist mangler.
    pub embedded: bool,
    /// Non-public fields are never presented to a mangler and reassemble
    /// as their zero value.
    pub public: bool,
    /// Position in the outermost original schema, kept only by fields of
    /// that schema; every freshly mangled field has it cleared.
    pub(crate) anchor: Option<usize>,
}

impl FieldDescriptor {
    pub fn new(name: &str, ty: TypeDescriptor) -> Self {
        FieldDescriptor {
            name: name.to_string(),
            ty,
            tags: Tags::new(),
            embedded: false,
            public: true,
            anchor: None,
        }
    }

    pub fn with_tag(mut self, key: &str, value: &str) -> Self {
        self.tags.set(key, value);
        self
    }

    pub fn embedded(mut self) -> Self {
        self.embedded = true;
        self
    }

    pub fn private(mut self) -> Self {
        self.public = false;
        self
    }
}

// Anchors are positional bookkeeping, not part of a field's identity.
impl PartialEq for FieldDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.ty == other.ty
            && self.tags == other.tags
            && self.embedded == other.embedded
            && self.public == other.public
    }
}

/// An ordered record shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSchema {
    fields: Vec<FieldDescriptor>,
}

impl RecordSchema {
    pub fn new(fields: Vec<FieldDescriptor>) -> Self {
        RecordSchema { fields }
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// One layer of structure between a field's declared type and a record
/// nested inside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Wrap {
    Opt,
    Seq,
    Array(usize),
}

/// If `ty` is a record — directly, or through any chain of optional,
/// sequence, and array wrappers — return the wrapper chain and the schema.
/// `Named` layers are looked through; opaque types are atomic.
pub(crate) fn record_shape(ty: &TypeDescriptor) -> Option<(Vec<Wrap>, &RecordSchema)> {
    let mut wraps = Vec::new();
    let mut ty = ty.resolved();
    loop {
        match ty {
            TypeDescriptor::Record(schema) => return Some((wraps, schema)),
            TypeDescriptor::Optional(inner) => {
                wraps.push(Wrap::Opt);
                ty = inner.resolved();
            }
            TypeDescriptor::Seq(elem) => {
                wraps.push(Wrap::Seq);
                ty = elem.resolved();
            }
            TypeDescriptor::Array(len, elem) => {
                wraps.push(Wrap::Array(*len));
                ty = elem.resolved();
            }
            _ => return None,
        }
    }
}

/// Rebuild a field type from a wrapper chain around a (reshaped) record.
pub(crate) fn rebuild_shape(wraps: &[Wrap], schema: RecordSchema) -> TypeDescriptor {
    let mut ty = TypeDescriptor::Record(schema);
    for wrap in wraps.iter().rev() {
        ty = match wrap {
            Wrap::Opt => TypeDescriptor::optional(ty),
            Wrap::Seq => TypeDescriptor::seq(ty),
            Wrap::Array(len) => TypeDescriptor::array(*len, ty),
        };
    }
    ty
}
