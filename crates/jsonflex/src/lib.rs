//! JSON-aware column histogram for selectivity estimation.
//!
//! Given a JSON column `j` and predicates of the form `j->"$.path" = v`,
//! `j->>"$.path" BETWEEN a AND b`, `j->"$.path" IS NULL`, …, the histogram
//! returns a fractional estimate in roughly `[0, 1]` of the proportion of
//! rows satisfying the predicate. The optimizer uses the estimate to order
//! joins and pick scan strategies; every answer is best-effort, never exact.
//!
//! Three pieces carry the weight:
//!
//! - A two-level statistical model: a flat array of per-key-path buckets
//!   ([`KeyPathBucket`]), each optionally holding a typed sub-histogram
//!   ([`SubHistogram`]) over the values found at that path.
//! - A canonical key-path encoder ([`path::encode_key_path`]) that turns a
//!   JSON path expression plus the comparand type into the byte string the
//!   bucket array is keyed by, e.g. `$.objs[0]` with an integer comparand
//!   into `objs_arr.0_num`.
//! - A selectivity engine ([`JsonFlexHistogram::selectivity`]) that routes a
//!   `(function, operator, comparands)` triple through the right typed
//!   lookup and combines `(eq, lt, gt)` estimates per the operator algebra.
//!
//! Histograms are ingested prebuilt, as JSON catalog entries
//! ([`JsonFlexHistogram::from_json`]); construction is the only mutating
//! phase, and all query entry points take `&self`.

pub mod bucket;
mod codec;
pub mod histogram;
pub mod path;
pub mod selectivity;
pub mod subhistogram;

pub use bucket::{KeyPathBucket, NO_STATS_EQ_FRACTION, NO_STATS_RANGE_FRACTION};
pub use histogram::{HistogramDataType, JsonFlexHistogram, JSON_FLEX_TYPE_STR};
pub use path::{encode_key_path, JsonFunc, PathEncoding};
pub use selectivity::{Comparand, Operator};
pub use subhistogram::{
    EquiHeightBucket, InnerHistogram, LookupResult, SingletonBucket, SubHistogram,
};
