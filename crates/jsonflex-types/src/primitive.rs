//! The tagged scalar domain of histogram bucket values.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::collation::CollationFunction;

/// The value domain of the leaf values along one key path.
///
/// `Int` and `Float` share the `num` key-path marker: a JSON number is one
/// domain to the lookup key even though statistics keep the representations
/// apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketValueType {
    Unknown,
    Int,
    Float,
    Bool,
    String,
}

impl BucketValueType {
    /// The key-path marker appended to a terminal step in a type-certain
    /// context, without its separator. `None` for `Unknown`.
    pub const fn type_marker(self) -> Option<&'static str> {
        match self {
            Self::Int | Self::Float => Some("num"),
            Self::Bool => Some("bool"),
            Self::String => Some("str"),
            Self::Unknown => None,
        }
    }

    /// Readable name for diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::String => "string",
        }
    }
}

impl fmt::Display for BucketValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An owned byte string that carries the collation it compares under.
///
/// The host engine's string primitive is a pointer + length + charset
/// triple; this is the owned equivalent. All comparisons (including the
/// derived-trait ones) go through the stored collation, so two
/// `BucketString`s with a case-insensitive collation compare equal across
/// case differences.
#[derive(Clone)]
pub struct BucketString {
    bytes: Vec<u8>,
    collation: Arc<dyn CollationFunction>,
}

impl BucketString {
    /// Create from raw bytes and a collation.
    pub fn new(bytes: impl Into<Vec<u8>>, collation: Arc<dyn CollationFunction>) -> Self {
        Self {
            bytes: bytes.into(),
            collation,
        }
    }

    /// Create from text under the given collation.
    pub fn from_text(text: &str, collation: Arc<dyn CollationFunction>) -> Self {
        Self::new(text.as_bytes().to_vec(), collation)
    }

    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The collation this string compares under.
    pub fn collation(&self) -> &Arc<dyn CollationFunction> {
        &self.collation
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Lossy UTF-8 view for diagnostics.
    pub fn to_utf8_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

impl PartialEq for BucketString {
    fn eq(&self, other: &Self) -> bool {
        self.collation.compare(&self.bytes, &other.bytes) == Ordering::Equal
    }
}

impl Eq for BucketString {}

impl PartialOrd for BucketString {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BucketString {
    fn cmp(&self, other: &Self) -> Ordering {
        self.collation.compare(&self.bytes, &other.bytes)
    }
}

impl fmt::Debug for BucketString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BucketString({:?} @ {})",
            self.to_utf8_lossy(),
            self.collation.name()
        )
    }
}

impl fmt::Display for BucketString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_utf8_lossy())
    }
}

/// A typed scalar stored in a histogram bucket: a range bound or a
/// sub-histogram value.
#[derive(Debug, Clone)]
pub enum Primitive {
    Int(i64),
    Float(f64),
    Bool(bool),
    String(BucketString),
}

impl Primitive {
    /// The bucket value type this scalar belongs to.
    pub const fn value_type(&self) -> BucketValueType {
        match self {
            Self::Int(_) => BucketValueType::Int,
            Self::Float(_) => BucketValueType::Float,
            Self::Bool(_) => BucketValueType::Bool,
            Self::String(_) => BucketValueType::String,
        }
    }

    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub const fn as_string(&self) -> Option<&BucketString> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl PartialEq for Primitive {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Primitive {
    /// Same-type comparison only; values of different types are unordered.
    /// Numeric cross-type dispatch happens before comparison, in the bucket
    /// lookup.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::String(a), Self::String(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}
