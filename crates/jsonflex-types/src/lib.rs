//! Value and collation primitives for the jsonflex histogram.
//!
//! The histogram compares two kinds of byte strings: canonical key paths and
//! string-typed bucket values. Both are compared under a collation chosen by
//! the host engine and recorded in the serialized histogram as a numeric id,
//! so this crate provides:
//!
//! - [`CollationFunction`]: the comparator service the host plugs in.
//! - [`CollationId`] + [`collation_from_id`]: the id registry.
//! - [`BucketString`]: an owned byte string that carries its collation.
//! - [`Primitive`] / [`BucketValueType`]: the tagged scalar domain of bucket
//!   values and the per-type key-path markers.

pub mod collation;
pub mod primitive;

pub use collation::{
    collation_from_id, AsciiCaseInsensitiveCollation, BinaryCollation, CollationFunction,
    CollationId, PadSpaceCollation,
};
pub use primitive::{BucketString, BucketValueType, Primitive};
