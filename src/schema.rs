//! Registered field schemas.
//!
//! Runtime struct-tag reflection does not exist in Rust, so destination
//! types are described by an explicit [`Schema`]: an ordered list of field
//! registrations mapping a field key to a leaf target kind or a nested
//! sub-schema, optionally carrying a default literal. Schemas are built
//! once through [`SchemaBuilder`], frozen behind an [`Arc`], and freely
//! shared — the same sub-schema may appear at several positions.

use std::fmt;
use std::sync::Arc;

/// Leaf target descriptor a default literal is converted towards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TargetKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    /// A single Unicode code point.
    Char,
    Text,
    /// A span of time such as `"1h"` or `"250ms"`.
    Duration,
    /// An absolute instant, parsed from one of the chain's layouts.
    Timestamp,
    /// An IPv4 or IPv6 address literal.
    Ip,
    /// A socket address such as `"1.1.1.1:53"`.
    Socket,
    /// A delimiter-separated list whose elements coerce to the inner kind.
    List(Box<TargetKind>),
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::I8 => write!(f, "i8"),
            Self::I16 => write!(f, "i16"),
            Self::I32 => write!(f, "i32"),
            Self::I64 => write!(f, "i64"),
            Self::U8 => write!(f, "u8"),
            Self::U16 => write!(f, "u16"),
            Self::U32 => write!(f, "u32"),
            Self::U64 => write!(f, "u64"),
            Self::F32 => write!(f, "f32"),
            Self::F64 => write!(f, "f64"),
            Self::Char => write!(f, "char"),
            Self::Text => write!(f, "text"),
            Self::Duration => write!(f, "duration"),
            Self::Timestamp => write!(f, "timestamp"),
            Self::Ip => write!(f, "ip address"),
            Self::Socket => write!(f, "socket address"),
            Self::List(inner) => write!(f, "list of {inner}"),
        }
    }
}

/// What a registered field resolves to.
#[derive(Clone, Debug)]
pub enum FieldKind {
    /// A leaf value of the given target kind.
    Leaf(TargetKind),
    /// A nested struct described by its own schema.
    Nested(Arc<Schema>),
}

/// A single field registration.
#[derive(Clone, Debug)]
pub struct FieldSpec {
    key: String,
    kind: FieldKind,
    default: Option<String>,
}

impl FieldSpec {
    /// The field key used to address this field externally.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Leaf kind or nested schema.
    #[must_use]
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// The registered default literal, if any.
    #[must_use]
    pub fn default_literal(&self) -> Option<&str> {
        self.default.as_deref()
    }
}

/// One schema entry, in declaration order.
#[derive(Clone, Debug)]
pub(crate) enum Entry {
    Field(FieldSpec),
    /// An embedded schema whose fields merge into the parent namespace.
    Flatten(Arc<Schema>),
}

/// Immutable description of a destination type's bindable fields.
#[derive(Clone, Debug, Default)]
pub struct Schema {
    entries: Vec<Entry>,
}

impl Schema {
    /// Start building a schema.
    #[must_use]
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    pub(crate) fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Resolve a field key at this level.
    ///
    /// Explicit field registrations always win over fields contributed by
    /// flattened schemas, regardless of declaration order.
    #[must_use]
    pub fn resolve(&self, key: &str) -> Option<&FieldSpec> {
        for entry in &self.entries {
            if let Entry::Field(spec) = entry
                && spec.key == key
            {
                return Some(spec);
            }
        }
        for entry in &self.entries {
            if let Entry::Flatten(sub) = entry
                && let Some(spec) = sub.resolve(key)
            {
                return Some(spec);
            }
        }
        None
    }
}

/// Mutable accumulator for a [`Schema`]. Not safe for concurrent mutation;
/// the built schema is.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    entries: Vec<Entry>,
}

impl SchemaBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a leaf field without a default.
    #[must_use]
    pub fn leaf(mut self, key: impl Into<String>, kind: TargetKind) -> Self {
        self.entries.push(Entry::Field(FieldSpec {
            key: key.into(),
            kind: FieldKind::Leaf(kind),
            default: None,
        }));
        self
    }

    /// Register a leaf field carrying a default literal.
    #[must_use]
    pub fn leaf_default(
        mut self,
        key: impl Into<String>,
        kind: TargetKind,
        literal: impl Into<String>,
    ) -> Self {
        self.entries.push(Entry::Field(FieldSpec {
            key: key.into(),
            kind: FieldKind::Leaf(kind),
            default: Some(literal.into()),
        }));
        self
    }

    /// Register a nested struct field.
    #[must_use]
    pub fn nested(mut self, key: impl Into<String>, schema: Arc<Schema>) -> Self {
        self.entries.push(Entry::Field(FieldSpec {
            key: key.into(),
            kind: FieldKind::Nested(schema),
            default: None,
        }));
        self
    }

    /// Register a nested struct field that also carries a default literal.
    ///
    /// The literal takes precedence over the defaults derived recursively
    /// from the nested schema.
    #[must_use]
    pub fn nested_default(
        mut self,
        key: impl Into<String>,
        schema: Arc<Schema>,
        literal: impl Into<String>,
    ) -> Self {
        self.entries.push(Entry::Field(FieldSpec {
            key: key.into(),
            kind: FieldKind::Nested(schema),
            default: Some(literal.into()),
        }));
        self
    }

    /// Embed another schema's fields directly into this namespace.
    #[must_use]
    pub fn flatten(mut self, schema: Arc<Schema>) -> Self {
        self.entries.push(Entry::Flatten(schema));
        self
    }

    /// Freeze the schema.
    #[must_use]
    pub fn build(self) -> Arc<Schema> {
        Arc::new(Schema {
            entries: self.entries,
        })
    }
}
