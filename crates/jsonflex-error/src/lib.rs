use thiserror::Error;

/// Primary error type for jsonflex histogram operations.
///
/// Deserialization errors carry a `node` string locating the offending JSON
/// node (e.g. `buckets[3][6]`) so the host can point its diagnostics at the
/// right spot in the catalog entry. Estimation errors (unsupported path or
/// function shapes) are recoverable: the caller falls back to a static
/// heuristic instead of aborting the query.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HistogramError {
    // === Deserialization errors ===
    /// A required attribute is absent from the histogram JSON object.
    #[error("histogram JSON is missing attribute '{name}'")]
    MissingAttribute { name: String },

    /// A JSON node has a different type than the schema requires.
    #[error("unexpected JSON type at {node}")]
    WrongJsonType { node: String },

    /// A bucket array has a member count outside the supported arities.
    #[error("histogram bucket at {node} has {len} members, expected 3, 5, 6 or 7")]
    WrongBucketArity { node: String, len: usize },

    /// Allocation failed while loading or cloning histogram contents.
    #[error("out of memory")]
    OutOfMemory,

    /// A frequency value lies outside `[0, 1]`.
    #[error("frequency {value} at {node} is outside [0, 1]")]
    InvalidFrequency { node: String, value: f64 },

    /// Cumulative bucket frequencies violate the histogram's total.
    #[error("invalid cumulative frequency {total} at {node}")]
    InvalidTotalFrequency { node: String, total: f64 },

    /// A value does not match the type established for its bucket.
    #[error("type mismatch at {node}: expected {expected}, got {actual}")]
    TypeMismatch {
        node: String,
        expected: String,
        actual: String,
    },

    /// A structurally valid histogram uses a combination the estimator
    /// rejects (e.g. an equi-height sub-histogram over booleans).
    #[error("unsupported histogram configuration at {node}: {detail}")]
    UnsupportedConfiguration { node: String, detail: String },

    // === Estimation errors ===
    /// A JSON path expression the canonical encoder cannot handle.
    #[error("unsupported JSON path expression: '{path}'")]
    UnsupportedPath { path: String },

    /// A function shape the selectivity engine cannot handle.
    #[error("unsupported function for histogram lookup: {name}")]
    UnsupportedFunction { name: String },
}

impl HistogramError {
    /// Whether this error came from an estimation entry point.
    ///
    /// Estimation failures do not abort the query; the caller substitutes a
    /// static selectivity guess (typically 0.1) and carries on.
    pub const fn is_estimation(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedPath { .. } | Self::UnsupportedFunction { .. }
        )
    }

    /// Create a missing-attribute error.
    pub fn missing(name: impl Into<String>) -> Self {
        Self::MissingAttribute { name: name.into() }
    }

    /// Create a wrong-JSON-type error for the given node.
    pub fn wrong_type(node: impl Into<String>) -> Self {
        Self::WrongJsonType { node: node.into() }
    }

    /// Create a wrong-bucket-arity error.
    pub fn bucket_arity(node: impl Into<String>, len: usize) -> Self {
        Self::WrongBucketArity {
            node: node.into(),
            len,
        }
    }

    /// Create an invalid-frequency error.
    pub fn invalid_frequency(node: impl Into<String>, value: f64) -> Self {
        Self::InvalidFrequency {
            node: node.into(),
            value,
        }
    }

    /// Create an invalid-total-frequency error.
    pub fn invalid_total_frequency(node: impl Into<String>, total: f64) -> Self {
        Self::InvalidTotalFrequency {
            node: node.into(),
            total,
        }
    }

    /// Create a type-mismatch error.
    pub fn type_mismatch(
        node: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            node: node.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create an unsupported-configuration error.
    pub fn unsupported_configuration(node: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::UnsupportedConfiguration {
            node: node.into(),
            detail: detail.into(),
        }
    }

    /// Create an unsupported-path error.
    pub fn unsupported_path(path: impl Into<String>) -> Self {
        Self::UnsupportedPath { path: path.into() }
    }

    /// Create an unsupported-function error.
    pub fn unsupported_function(name: impl Into<String>) -> Self {
        Self::UnsupportedFunction { name: name.into() }
    }
}

/// Result type alias using `HistogramError`.
pub type Result<T> = std::result::Result<T, HistogramError>;
