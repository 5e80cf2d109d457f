//! Closed value types flowing through the default engine.
//!
//! [`RawValue`] is the node type of the default-value tree the walker
//! produces; [`Decoded`] is what conversion hooks emit. Both replace the
//! open `any` values of dynamically typed implementations with tagged
//! variants, and `Decoded` serializes into the [`serde_json::Value`] space
//! the decode engine consumes.

use std::collections::BTreeMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeSeq, Serializer};

/// A node of the default-value tree: a literal, a sequence, or a nested
/// mapping keyed by field key.
#[derive(Clone, Debug, PartialEq)]
pub enum RawValue {
    /// A literal default taken verbatim from a field registration.
    Text(String),
    /// A sequence of values, usually produced by the list hook.
    Seq(Vec<RawValue>),
    /// Defaults of a nested struct, keyed by field key.
    Map(BTreeMap<String, RawValue>),
}

impl RawValue {
    /// Build a literal node.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Returns the literal if this node is one.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Seq(_) | Self::Map(_) => None,
        }
    }

    /// Returns the nested mapping if this node is one.
    #[must_use]
    pub fn as_map(&self) -> Option<&BTreeMap<String, RawValue>> {
        match self {
            Self::Map(m) => Some(m),
            Self::Text(_) | Self::Seq(_) => None,
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// A typed value produced by a conversion hook.
///
/// Serializes into the natural `serde` representation of its payload:
/// numbers as numbers, characters as one-character strings, timestamps as
/// RFC 3339 strings, durations as `{secs, nanos}` maps, addresses as their
/// display form. That representation is exactly what `serde`-derived
/// destination fields deserialize from.
#[derive(Clone, Debug, PartialEq)]
pub enum Decoded {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Char(char),
    Text(String),
    Duration(Duration),
    Timestamp(DateTime<Utc>),
    Ip(IpAddr),
    Socket(SocketAddr),
    Seq(Vec<Decoded>),
}

impl Serialize for Decoded {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::Int(v) => serializer.serialize_i64(*v),
            Self::Uint(v) => serializer.serialize_u64(*v),
            Self::Float(v) => serializer.serialize_f64(*v),
            Self::Char(v) => serializer.serialize_char(*v),
            Self::Text(v) => serializer.serialize_str(v),
            Self::Duration(v) => v.serialize(serializer),
            Self::Timestamp(v) => v.serialize(serializer),
            Self::Ip(v) => v.serialize(serializer),
            Self::Socket(v) => v.serialize(serializer),
            Self::Seq(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}
