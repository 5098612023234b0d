//! Collation callback trait and built-in collations.
//!
//! Collations are pure comparators used for key-path equality and for
//! ordering string-typed bucket values. They are open extension points: the
//! host engine may register richer comparators, while the built-ins cover the
//! ids that actually show up in serialized histograms.
//!
//! # Contract
//!
//! Implementations **must** be:
//! - **Deterministic**: same inputs always produce the same output.
//! - **Antisymmetric**: `compare(a, b)` is the reverse of `compare(b, a)`.
//! - **Transitive**: if `a < b` and `b < c`, then `a < c`.

use std::cmp::Ordering;
use std::sync::Arc;

/// A collation comparator.
///
/// Implementations define a total ordering over byte strings.
///
/// Built-in collations: [`BinaryCollation`] (memcmp),
/// [`AsciiCaseInsensitiveCollation`] (ASCII folding, no pad),
/// [`PadSpaceCollation`] (ASCII folding, trailing spaces insignificant).
pub trait CollationFunction: Send + Sync {
    /// Collation name, for diagnostics.
    fn name(&self) -> &str;

    /// Compare two byte slices.
    ///
    /// Must be deterministic, antisymmetric, and transitive.
    fn compare(&self, left: &[u8], right: &[u8]) -> Ordering;
}

/// Numeric collation id as recorded in the serialized histogram
/// (`"collation-id"`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[repr(transparent)]
pub struct CollationId(pub u32);

impl CollationId {
    /// The host engine's raw binary collation.
    pub const BINARY: Self = Self(63);

    /// Case- and accent-insensitive utf8mb4 default collation.
    pub const UTF8_CI: Self = Self(255);

    /// Legacy latin1 case-insensitive collation (PAD SPACE semantics).
    pub const LATIN1_CI: Self = Self(8);

    /// Get the raw numeric id.
    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CollationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resolve a serialized collation id to a comparator.
///
/// Unknown ids fall back to [`BinaryCollation`]: the id is advisory metadata
/// for an estimator, and binary comparison is the host engine's default.
pub fn collation_from_id(id: CollationId) -> Arc<dyn CollationFunction> {
    match id {
        CollationId::UTF8_CI => Arc::new(AsciiCaseInsensitiveCollation),
        CollationId::LATIN1_CI => Arc::new(PadSpaceCollation),
        _ => Arc::new(BinaryCollation),
    }
}

// ── Built-in collations ──────────────────────────────────────────────────

/// Binary collation: raw `memcmp` byte comparison.
pub struct BinaryCollation;

impl CollationFunction for BinaryCollation {
    fn name(&self) -> &str {
        "binary"
    }

    fn compare(&self, left: &[u8], right: &[u8]) -> Ordering {
        left.cmp(right)
    }
}

/// ASCII case-insensitive comparison, NO PAD.
///
/// Only folds ASCII letters (`A-Z` → `a-z`); non-ASCII bytes are compared
/// as-is. An approximation of the host's utf8mb4 `ai_ci` collations that is
/// close enough for selectivity estimation.
pub struct AsciiCaseInsensitiveCollation;

impl CollationFunction for AsciiCaseInsensitiveCollation {
    fn name(&self) -> &str {
        "ascii_ci"
    }

    fn compare(&self, left: &[u8], right: &[u8]) -> Ordering {
        let l = left.iter().map(u8::to_ascii_lowercase);
        let r = right.iter().map(u8::to_ascii_lowercase);
        l.cmp(r)
    }
}

/// ASCII case-insensitive comparison with PAD SPACE semantics.
///
/// Trailing ASCII spaces (`0x20`) are insignificant, matching the host's
/// legacy collations where `'abc'` and `'abc  '` compare equal.
pub struct PadSpaceCollation;

impl CollationFunction for PadSpaceCollation {
    fn name(&self) -> &str {
        "ascii_ci_pad"
    }

    fn compare(&self, left: &[u8], right: &[u8]) -> Ordering {
        let l = strip_trailing_spaces(left).iter().map(u8::to_ascii_lowercase);
        let r = strip_trailing_spaces(right)
            .iter()
            .map(u8::to_ascii_lowercase);
        l.cmp(r)
    }
}

fn strip_trailing_spaces(s: &[u8]) -> &[u8] {
    let mut end = s.len();
    while end > 0 && s[end - 1] == b' ' {
        end -= 1;
    }
    &s[..end]
}
