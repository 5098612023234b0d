//! The json-flex histogram root: metadata, bucket store, factory.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use jsonflex_types::{collation_from_id, CollationFunction, CollationId};

use crate::bucket::KeyPathBucket;

/// String identifying this histogram type in the serialized form.
pub const JSON_FLEX_TYPE_STR: &str = "json-flex";

/// Data type of the column the histogram was built over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistogramDataType {
    Json,
    String,
}

impl HistogramDataType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::String => "string",
        }
    }

    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s {
            "json" => Some(Self::Json),
            "string" => Some(Self::String),
            _ => None,
        }
    }
}

/// A JSON-aware column histogram.
///
/// Keyed by canonical key paths (structural JSON location plus terminal
/// type); consulted by the optimizer to estimate the selectivity of
/// predicates over values extracted from a JSON column.
///
/// Instances are created empty by [`JsonFlexHistogram::create`], populated
/// once by [`JsonFlexHistogram::from_json`], and immutable afterwards: every
/// query entry point takes `&self`.
#[derive(Clone)]
pub struct JsonFlexHistogram {
    pub(crate) db_name: String,
    pub(crate) table_name: String,
    pub(crate) column_name: String,
    pub(crate) data_type: HistogramDataType,
    /// Column-wide fraction of SQL NULL rows, as recorded by the builder.
    pub(crate) null_values: f64,
    /// ISO-8601 build timestamp, stored verbatim.
    pub(crate) last_updated: String,
    pub(crate) num_buckets_spec: i64,
    pub(crate) collation_id: CollationId,
    pub(crate) sampling_rate: f64,
    /// Comparator for key paths and string comparands, resolved from
    /// `collation_id`.
    pub(crate) charset: Arc<dyn CollationFunction>,
    /// Smallest bucket frequency seen at deserialization; the fallback
    /// estimate for paths the histogram has never seen. `1.0` when empty.
    pub(crate) min_frequency: f64,
    /// Ordering is serialization order, not semantically significant;
    /// lookups are linear.
    pub(crate) buckets: Vec<KeyPathBucket>,
}

impl JsonFlexHistogram {
    /// Create an empty histogram for the named column.
    ///
    /// This only sets properties; contents arrive via
    /// [`JsonFlexHistogram::from_json`].
    pub fn create(
        db_name: impl Into<String>,
        table_name: impl Into<String>,
        column_name: impl Into<String>,
    ) -> Self {
        Self {
            db_name: db_name.into(),
            table_name: table_name.into(),
            column_name: column_name.into(),
            data_type: HistogramDataType::Json,
            null_values: 0.0,
            last_updated: String::new(),
            num_buckets_spec: 0,
            collation_id: CollationId::BINARY,
            sampling_rate: 1.0,
            charset: collation_from_id(CollationId::BINARY),
            min_frequency: 1.0,
            buckets: Vec::new(),
        }
    }

    pub fn db_name(&self) -> &str {
        &self.db_name
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn column_name(&self) -> &str {
        &self.column_name
    }

    pub const fn data_type(&self) -> HistogramDataType {
        self.data_type
    }

    pub const fn null_values(&self) -> f64 {
        self.null_values
    }

    pub fn last_updated(&self) -> &str {
        &self.last_updated
    }

    /// Bucket budget the histogram was built with.
    pub const fn num_buckets_specified(&self) -> i64 {
        self.num_buckets_spec
    }

    pub const fn collation_id(&self) -> CollationId {
        self.collation_id
    }

    pub const fn sampling_rate(&self) -> f64 {
        self.sampling_rate
    }

    /// The comparator used for key paths and string comparands.
    pub fn charset(&self) -> &Arc<dyn CollationFunction> {
        &self.charset
    }

    /// Smallest bucket frequency observed at deserialization.
    pub const fn min_frequency(&self) -> f64 {
        self.min_frequency
    }

    pub fn buckets(&self) -> &[KeyPathBucket] {
        &self.buckets
    }

    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    /// Estimated number of distinct non-NULL values. For this histogram
    /// type, one bucket per key path makes this the bucket count.
    pub fn num_distinct_values(&self) -> usize {
        self.num_buckets()
    }

    /// Readable histogram type name, as serialized.
    pub const fn histogram_type_to_str(&self) -> &'static str {
        JSON_FLEX_TYPE_STR
    }

    /// Linear scan for the bucket with the given canonical key path,
    /// compared under the histogram's charset.
    pub fn find_bucket(&self, key_path: &[u8]) -> Option<&KeyPathBucket> {
        self.buckets
            .iter()
            .find(|b| self.charset.compare(b.key_path.as_bytes(), key_path) == Ordering::Equal)
    }
}

impl fmt::Debug for JsonFlexHistogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonFlexHistogram")
            .field("db_name", &self.db_name)
            .field("table_name", &self.table_name)
            .field("column_name", &self.column_name)
            .field("data_type", &self.data_type)
            .field("null_values", &self.null_values)
            .field("last_updated", &self.last_updated)
            .field("num_buckets_spec", &self.num_buckets_spec)
            .field("collation_id", &self.collation_id)
            .field("sampling_rate", &self.sampling_rate)
            .field("charset", &self.charset.name())
            .field("min_frequency", &self.min_frequency)
            .field("buckets", &self.buckets)
            .finish()
    }
}

impl PartialEq for JsonFlexHistogram {
    /// Structural equality; the charset is implied by `collation_id`.
    fn eq(&self, other: &Self) -> bool {
        self.db_name == other.db_name
            && self.table_name == other.table_name
            && self.column_name == other.column_name
            && self.data_type == other.data_type
            && self.null_values == other.null_values
            && self.last_updated == other.last_updated
            && self.num_buckets_spec == other.num_buckets_spec
            && self.collation_id == other.collation_id
            && self.sampling_rate == other.sampling_rate
            && self.min_frequency == other.min_frequency
            && self.buckets == other.buckets
    }
}
