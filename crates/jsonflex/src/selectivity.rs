//! The selectivity engine: operator algebra over typed bucket lookups.
//!
//! Entry point is [`JsonFlexHistogram::selectivity`]. The engine resolves
//! the function shape, encodes the canonical key path, picks a typed or
//! untyped lookup, and combines the `(eq, lt, gt)` estimates per operator.
//! Unknown paths never estimate zero: the optimizer should merely prefer
//! plans that avoid them, so they fall back to `min_frequency` scaled by an
//! operator-class factor.

use std::cmp::Ordering;
use std::sync::Arc;

use jsonflex_error::Result;
use jsonflex_types::{BucketString, BucketValueType, CollationFunction, Primitive};

use crate::bucket::KeyPathBucket;
use crate::histogram::JsonFlexHistogram;
use crate::path::{encode_key_path, resolve_func, JsonFunc, PathEncoding, ResolvedFunc};
use crate::subhistogram::LookupResult;

/// Predicate operators the engine estimates.
///
/// `Le` collapses to `Lt`'s estimator and `Ge` to `Gt`'s: at histogram
/// granularity the boundary value's own frequency is noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Neq,
    Lt,
    Le,
    Gt,
    Ge,
    Between,
    NotBetween,
    In,
    NotIn,
    IsNull,
    IsNotNull,
}

impl Operator {
    /// Multiplier applied to `min_frequency` when the path has no bucket.
    pub(crate) const fn fallback_fraction(self) -> f64 {
        match self {
            Self::Eq | Self::Neq | Self::In | Self::NotIn => 0.1,
            Self::Lt | Self::Le | Self::Gt | Self::Ge | Self::Between | Self::NotBetween => 0.3,
            Self::IsNull => 0.2,
            Self::IsNotNull => 0.8,
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Neq => "<>",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Between => "between",
            Self::NotBetween => "not between",
            Self::In => "in",
            Self::NotIn => "not in",
            Self::IsNull => "is null",
            Self::IsNotNull => "is not null",
        }
    }
}

/// A predicate comparand as the optimizer hands it over.
#[derive(Debug, Clone, PartialEq)]
pub enum Comparand {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    /// The SQL NULL literal.
    Null,
    /// A non-constant expression; forces untyped estimates.
    NonConst,
}

impl Comparand {
    pub const fn value_type(&self) -> BucketValueType {
        match self {
            Self::Int(_) => BucketValueType::Int,
            Self::Float(_) => BucketValueType::Float,
            Self::Bool(_) => BucketValueType::Bool,
            Self::Str(_) => BucketValueType::String,
            Self::Null | Self::NonConst => BucketValueType::Unknown,
        }
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Convert to a typed value; string comparands pick up the histogram's
    /// charset. `None` for NULL and non-constant comparands.
    fn to_primitive(&self, charset: &Arc<dyn CollationFunction>) -> Option<Primitive> {
        match self {
            Self::Int(i) => Some(Primitive::Int(*i)),
            Self::Float(f) => Some(Primitive::Float(*f)),
            Self::Bool(b) => Some(Primitive::Bool(*b)),
            Self::Str(s) => Some(Primitive::String(BucketString::from_text(
                s,
                charset.clone(),
            ))),
            Self::Null | Self::NonConst => None,
        }
    }
}

impl JsonFlexHistogram {
    /// Estimate the selectivity of `func(col) <op> comparands`.
    ///
    /// Returns a fraction in `[0, 1]`. Errors only for function or path
    /// shapes the histogram cannot key; the caller then substitutes its own
    /// static guess without aborting the query.
    pub fn selectivity(
        &self,
        func: &JsonFunc,
        op: Operator,
        comparands: &[Comparand],
    ) -> Result<f64> {
        let resolved = resolve_func(func)?;
        let span = tracing::debug_span!(
            target: "jsonflex.selectivity",
            "json_selectivity",
            path = resolved.path,
            op = op.as_str(),
        );
        let _guard = span.enter();

        let selectivity = match op {
            Operator::IsNull | Operator::IsNotNull => self.null_selectivity(&resolved, op)?,
            Operator::Between | Operator::NotBetween => {
                self.between_selectivity(&resolved, op, comparands)?
            }
            Operator::In | Operator::NotIn => self.in_selectivity(&resolved, op, comparands)?,
            _ => self.compare_selectivity(&resolved, op, comparands)?,
        };
        Ok(selectivity.clamp(0.0, 1.0))
    }

    /// Sum of the distinct-value counts across the `_num`/`_bool`/`_str`
    /// siblings of the path. `None` when no sibling bucket exists.
    pub fn ndv(&self, func: &JsonFunc) -> Option<i64> {
        let resolved = resolve_func(func).ok()?;
        let encoding = PathEncoding::default();
        let untyped =
            encode_key_path(resolved.path, BucketValueType::Unknown, false, &encoding).ok()?;

        let mut found = false;
        let mut total: i64 = 0;
        for marker in ["num", "bool", "str"] {
            let mut key = untyped.clone();
            key.push(encoding.type_separator);
            key.push_str(marker);
            if let Some(bucket) = self.find_bucket(key.as_bytes()) {
                found = true;
                total = total.saturating_add(bucket.ndv.unwrap_or(0));
            }
        }
        found.then_some(total)
    }

    /// `=`, `<>`, `<`, `<=`, `>`, `>=`.
    fn compare_selectivity(
        &self,
        resolved: &ResolvedFunc<'_>,
        op: Operator,
        comparands: &[Comparand],
    ) -> Result<f64> {
        let comparand = comparands.first().unwrap_or(&Comparand::NonConst);
        if comparand.is_null() {
            // Comparisons with NULL are never true.
            return Ok(0.0);
        }
        match self.lookup(resolved, comparand)? {
            Some((bucket, result)) => {
                let base = bucket.base_frequency();
                Ok(match op {
                    Operator::Eq => result.eq,
                    Operator::Neq => (base - result.eq).max(0.0),
                    Operator::Lt | Operator::Le => result.lt,
                    Operator::Gt | Operator::Ge => result.gt,
                    _ => unreachable!("operator routed elsewhere"),
                })
            }
            None => Ok(self.fallback(op)),
        }
    }

    /// `BETWEEN a AND b` decomposes into `1 − lt(a) − gt(b)`, clipped into
    /// `[0, base]`.
    fn between_selectivity(
        &self,
        resolved: &ResolvedFunc<'_>,
        op: Operator,
        comparands: &[Comparand],
    ) -> Result<f64> {
        let low = comparands.first().unwrap_or(&Comparand::NonConst);
        let high = comparands.get(1).unwrap_or(&Comparand::NonConst);
        if low.is_null() || high.is_null() {
            return Ok(0.0);
        }
        if let (Some(a), Some(b)) = (
            low.to_primitive(&self.charset),
            high.to_primitive(&self.charset),
        ) {
            debug_assert!(
                a.partial_cmp(&b) != Some(Ordering::Greater),
                "BETWEEN bounds reversed"
            );
        }

        match (self.lookup(resolved, low)?, self.lookup(resolved, high)?) {
            (Some((low_bucket, low_result)), Some((high_bucket, high_result))) => {
                let base = low_bucket
                    .base_frequency()
                    .max(high_bucket.base_frequency());
                let between = (1.0 - low_result.lt - high_result.gt).clamp(0.0, base);
                Ok(if matches!(op, Operator::Between) {
                    between
                } else {
                    (base - between).max(0.0)
                })
            }
            _ => Ok(self.fallback(op)),
        }
    }

    /// `IN (x, …)` is the sum of the per-element equality estimates, capped
    /// by the base frequency (the elements are disjoint alternatives within
    /// one bucket's rows).
    fn in_selectivity(
        &self,
        resolved: &ResolvedFunc<'_>,
        op: Operator,
        comparands: &[Comparand],
    ) -> Result<f64> {
        let mut sum = 0.0;
        // Largest base among the buckets hit; elements of different types
        // land in different type-suffixed siblings.
        let mut cap: Option<f64> = None;
        for comparand in comparands {
            if comparand.is_null() {
                continue;
            }
            match self.lookup(resolved, comparand)? {
                Some((bucket, result)) => {
                    sum += result.eq;
                    let base = bucket.base_frequency();
                    cap = Some(cap.map_or(base, |c| c.max(base)));
                }
                None => sum += self.min_frequency * Operator::Eq.fallback_fraction(),
            }
        }
        match cap {
            Some(base) => {
                let in_sel = sum.min(base);
                Ok(if matches!(op, Operator::In) {
                    in_sel
                } else {
                    (base - in_sel).max(0.0)
                })
            }
            None => Ok(self.fallback(op)),
        }
    }

    /// `IS NULL` / `IS NOT NULL` over the untyped path.
    ///
    /// `JSON_VALUE` yields SQL NULL when the path is missing *or* resolves
    /// to JSON null, so its non-null fraction is the base frequency. Plain
    /// extraction yields SQL NULL only when the path is missing (a JSON
    /// null comes back as a JSON literal), so there the non-null fraction
    /// is the full path frequency.
    fn null_selectivity(&self, resolved: &ResolvedFunc<'_>, op: Operator) -> Result<f64> {
        let encoding = PathEncoding::default();
        let key = encode_key_path(resolved.path, BucketValueType::Unknown, false, &encoding)?;
        match self.find_bucket(key.as_bytes()) {
            Some(bucket) => {
                let not_null = if resolved.json_value {
                    bucket.base_frequency()
                } else {
                    bucket.frequency
                };
                Ok(if matches!(op, Operator::IsNotNull) {
                    not_null
                } else {
                    (1.0 - not_null).max(0.0)
                })
            }
            None => Ok(self.fallback(op)),
        }
    }

    /// One typed or untyped bucket probe for a comparand.
    ///
    /// Typed (suffix-keyed) lookups need both a type-certain context and a
    /// constant comparand; anything else degrades to the untyped path and
    /// its value-free estimate.
    fn lookup(
        &self,
        resolved: &ResolvedFunc<'_>,
        comparand: &Comparand,
    ) -> Result<Option<(&KeyPathBucket, LookupResult)>> {
        let encoding = PathEncoding::default();
        let comparand_type = comparand.value_type();
        if resolved.type_certain && comparand_type != BucketValueType::Unknown {
            let key = encode_key_path(resolved.path, comparand_type, true, &encoding)?;
            let Some(bucket) = self.find_bucket(key.as_bytes()) else {
                return Ok(None);
            };
            let Some(value) = comparand.to_primitive(&self.charset) else {
                return Ok(Some((bucket, bucket.lookup_untyped())));
            };
            Ok(Some((bucket, bucket.lookup_value(&value))))
        } else {
            let key = encode_key_path(resolved.path, BucketValueType::Unknown, false, &encoding)?;
            let Some(bucket) = self.find_bucket(key.as_bytes()) else {
                return Ok(None);
            };
            Ok(Some((bucket, bucket.lookup_untyped())))
        }
    }

    fn fallback(&self, op: Operator) -> f64 {
        tracing::trace!(
            target: "jsonflex.selectivity",
            op = op.as_str(),
            min_frequency = self.min_frequency,
            "path has no bucket, using min-frequency fallback"
        );
        self.min_frequency * op.fallback_fraction()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subhistogram::{InnerHistogram, SingletonBucket, SubHistogram};

    const TOL: f64 = 1e-9;

    fn push_bucket(hist: &mut JsonFlexHistogram, bucket: KeyPathBucket) {
        hist.min_frequency = hist.min_frequency.min(bucket.frequency);
        hist.buckets.push(bucket);
    }

    /// A histogram with one path of every flavor the engine dispatches on.
    fn test_histogram() -> JsonFlexHistogram {
        let mut hist = JsonFlexHistogram::create("db1", "tbl1", "doc");
        let charset = hist.charset().clone();
        let key = |s: &str| BucketString::from_text(s, charset.clone());

        // $.objs[0] as a number: singleton stats.
        push_bucket(
            &mut hist,
            KeyPathBucket {
                key_path: key("objs_arr.0_num"),
                frequency: 0.4,
                null_values: 0.0,
                value_type: BucketValueType::Int,
                min_val: Some(Primitive::Int(0)),
                max_val: Some(Primitive::Int(3)),
                ndv: Some(4),
                sub: Some(SubHistogram::Int(InnerHistogram::Singleton {
                    buckets: vec![
                        SingletonBucket {
                            value: 0,
                            frequency: 0.1,
                        },
                        SingletonBucket {
                            value: 1,
                            frequency: 0.1,
                        },
                    ],
                    rest_frequency: None,
                })),
            },
        );

        // $.objs[0] untyped sibling, for type-uncertain contexts and the
        // IS NULL family.
        push_bucket(
            &mut hist,
            KeyPathBucket {
                key_path: key("objs_arr.0"),
                frequency: 0.5,
                null_values: 0.2,
                value_type: BucketValueType::Unknown,
                min_val: None,
                max_val: None,
                ndv: Some(5),
                sub: None,
            },
        );

        // $.aakey as a single-valued string.
        push_bucket(
            &mut hist,
            KeyPathBucket {
                key_path: key("aakey_str"),
                frequency: 0.131,
                null_values: 0.0,
                value_type: BucketValueType::String,
                min_val: Some(Primitive::String(key("bb"))),
                max_val: Some(Primitive::String(key("bb"))),
                ndv: Some(1),
                sub: None,
            },
        );

        // $.qty as a number with range stats but no sub-histogram.
        push_bucket(
            &mut hist,
            KeyPathBucket {
                key_path: key("qty_num"),
                frequency: 0.4,
                null_values: 0.0,
                value_type: BucketValueType::Int,
                min_val: Some(Primitive::Int(0)),
                max_val: Some(Primitive::Int(3)),
                ndv: Some(4),
                sub: None,
            },
        );

        hist
    }

    fn objs0() -> JsonFunc {
        JsonFunc::unquote(JsonFunc::extract("$.objs[0]"))
    }

    #[test]
    fn test_singleton_hit_eq_lt_gt() {
        let hist = test_histogram();
        let eq = hist
            .selectivity(&objs0(), Operator::Eq, &[Comparand::Int(1)])
            .unwrap();
        assert!((eq - 0.04).abs() < TOL);

        let lt = hist
            .selectivity(&objs0(), Operator::Lt, &[Comparand::Int(1)])
            .unwrap();
        assert!((lt - 0.04).abs() < TOL);

        let gt = hist
            .selectivity(&objs0(), Operator::Gt, &[Comparand::Int(1)])
            .unwrap();
        assert!((gt - 0.32).abs() < TOL);
    }

    #[test]
    fn test_le_and_ge_collapse() {
        let hist = test_histogram();
        let lt = hist
            .selectivity(&objs0(), Operator::Lt, &[Comparand::Int(1)])
            .unwrap();
        let le = hist
            .selectivity(&objs0(), Operator::Le, &[Comparand::Int(1)])
            .unwrap();
        assert_eq!(lt, le);

        let gt = hist
            .selectivity(&objs0(), Operator::Gt, &[Comparand::Int(1)])
            .unwrap();
        let ge = hist
            .selectivity(&objs0(), Operator::Ge, &[Comparand::Int(1)])
            .unwrap();
        assert_eq!(gt, ge);
    }

    #[test]
    fn test_out_of_range_comparand() {
        let hist = test_histogram();
        let eq = hist
            .selectivity(&objs0(), Operator::Eq, &[Comparand::Int(-1)])
            .unwrap();
        assert_eq!(eq, 0.0);

        let gt = hist
            .selectivity(&objs0(), Operator::Gt, &[Comparand::Int(-1)])
            .unwrap();
        assert!((gt - 0.4).abs() < TOL);

        let lt = hist
            .selectivity(&objs0(), Operator::Lt, &[Comparand::Int(-1)])
            .unwrap();
        assert_eq!(lt, 0.0);
    }

    #[test]
    fn test_string_singleton() {
        let hist = test_histogram();
        let func = JsonFunc::unquote(JsonFunc::extract("$.aakey"));
        let hit = hist
            .selectivity(&func, Operator::Eq, &[Comparand::Str("bb".to_owned())])
            .unwrap();
        assert!((hit - 0.131).abs() < TOL);

        let miss = hist
            .selectivity(&func, Operator::Eq, &[Comparand::Str("ccc".to_owned())])
            .unwrap();
        assert_eq!(miss, 0.0);
    }

    #[test]
    fn test_between_clipped_against_base() {
        let hist = test_histogram();
        let func = JsonFunc::unquote(JsonFunc::extract("$.qty"));
        let sel = hist
            .selectivity(
                &func,
                Operator::Between,
                &[Comparand::Int(0), Comparand::Int(5)],
            )
            .unwrap();
        // 1 - lt(0) - gt(5) = 1, clipped to the bucket's base frequency.
        assert!((sel - 0.4).abs() < TOL);
    }

    #[test]
    fn test_between_equals_lt_gt_decomposition() {
        let hist = test_histogram();
        let between = hist
            .selectivity(
                &objs0(),
                Operator::Between,
                &[Comparand::Int(0), Comparand::Int(1)],
            )
            .unwrap();
        let lt = hist
            .selectivity(&objs0(), Operator::Lt, &[Comparand::Int(0)])
            .unwrap();
        let gt = hist
            .selectivity(&objs0(), Operator::Gt, &[Comparand::Int(1)])
            .unwrap();
        let expected = (1.0 - lt - gt).clamp(0.0, 0.4);
        assert!((between - expected).abs() < TOL);
    }

    #[test]
    fn test_not_between_complements_within_base() {
        let hist = test_histogram();
        let args = [Comparand::Int(0), Comparand::Int(1)];
        let between = hist
            .selectivity(&objs0(), Operator::Between, &args)
            .unwrap();
        let not_between = hist
            .selectivity(&objs0(), Operator::NotBetween, &args)
            .unwrap();
        assert!((between + not_between - 0.4).abs() < TOL);
    }

    #[test]
    fn test_eq_plus_neq_is_base() {
        let hist = test_histogram();
        for value in [0, 1, 2, 3] {
            let eq = hist
                .selectivity(&objs0(), Operator::Eq, &[Comparand::Int(value)])
                .unwrap();
            let neq = hist
                .selectivity(&objs0(), Operator::Neq, &[Comparand::Int(value)])
                .unwrap();
            assert!((eq + neq - 0.4).abs() < TOL, "value {value}");
        }
    }

    #[test]
    fn test_in_single_element_equals_eq() {
        let hist = test_histogram();
        let eq = hist
            .selectivity(&objs0(), Operator::Eq, &[Comparand::Int(1)])
            .unwrap();
        let in_one = hist
            .selectivity(&objs0(), Operator::In, &[Comparand::Int(1)])
            .unwrap();
        assert_eq!(eq, in_one);
    }

    #[test]
    fn test_in_sums_and_caps() {
        let hist = test_histogram();
        let sel = hist
            .selectivity(
                &objs0(),
                Operator::In,
                &[Comparand::Int(0), Comparand::Int(1)],
            )
            .unwrap();
        assert!((sel - 0.08).abs() < TOL);

        let not_in = hist
            .selectivity(
                &objs0(),
                Operator::NotIn,
                &[Comparand::Int(0), Comparand::Int(1)],
            )
            .unwrap();
        assert!((not_in - 0.32).abs() < TOL);
    }

    #[test]
    fn test_null_comparand_never_matches() {
        let hist = test_histogram();
        for op in [Operator::Eq, Operator::Lt, Operator::Gt, Operator::Between] {
            let sel = hist
                .selectivity(&objs0(), op, &[Comparand::Null, Comparand::Null])
                .unwrap();
            assert_eq!(sel, 0.0, "{op:?}");
        }
    }

    #[test]
    fn test_is_null_plain_extraction_uses_path_existence() {
        let hist = test_histogram();
        let func = JsonFunc::extract("$.objs[0]");
        // Untyped bucket: frequency 0.5.
        let is_null = hist.selectivity(&func, Operator::IsNull, &[]).unwrap();
        assert!((is_null - 0.5).abs() < TOL);
        let is_not_null = hist.selectivity(&func, Operator::IsNotNull, &[]).unwrap();
        assert!((is_not_null - 0.5).abs() < TOL);
    }

    #[test]
    fn test_is_null_json_value_counts_json_nulls() {
        let hist = test_histogram();
        let func = JsonFunc::value("$.objs[0]");
        // base = 0.5 * (1 - 0.2) = 0.4.
        let is_null = hist.selectivity(&func, Operator::IsNull, &[]).unwrap();
        assert!((is_null - 0.6).abs() < TOL);
        let is_not_null = hist.selectivity(&func, Operator::IsNotNull, &[]).unwrap();
        assert!((is_not_null - 0.4).abs() < TOL);
    }

    #[test]
    fn test_is_null_pair_bounded_by_one() {
        let hist = test_histogram();
        for func in [JsonFunc::extract("$.objs[0]"), JsonFunc::value("$.objs[0]")] {
            let a = hist.selectivity(&func, Operator::IsNull, &[]).unwrap();
            let b = hist.selectivity(&func, Operator::IsNotNull, &[]).unwrap();
            assert!(a + b <= 1.0 + TOL);
        }
    }

    #[test]
    fn test_type_uncertain_context_uses_untyped_bucket() {
        let hist = test_histogram();
        // Plain extraction: no type marker even with a typed comparand.
        let func = JsonFunc::extract("$.objs[0]");
        let sel = hist
            .selectivity(&func, Operator::Eq, &[Comparand::Int(1)])
            .unwrap();
        // Untyped bucket: base 0.4, ndv 5.
        assert!((sel - 0.4 / 5.0).abs() < TOL);
    }

    #[test]
    fn test_missing_path_fallbacks() {
        let mut hist = test_histogram();
        hist.min_frequency = 0.13;
        let func = JsonFunc::unquote(JsonFunc::extract("$.nothing"));

        let eq = hist
            .selectivity(&func, Operator::Eq, &[Comparand::Int(1)])
            .unwrap();
        assert!((eq - 0.013).abs() < TOL);

        let lt = hist
            .selectivity(&func, Operator::Lt, &[Comparand::Int(1)])
            .unwrap();
        assert!((lt - 0.039).abs() < TOL);

        let is_null = hist.selectivity(&func, Operator::IsNull, &[]).unwrap();
        assert!((is_null - 0.026).abs() < TOL);

        let is_not_null = hist.selectivity(&func, Operator::IsNotNull, &[]).unwrap();
        assert!((is_not_null - 0.104).abs() < TOL);
    }

    #[test]
    fn test_empty_histogram_uses_unit_min_frequency() {
        let hist = JsonFlexHistogram::create("db1", "tbl1", "doc");
        let func = JsonFunc::unquote(JsonFunc::extract("$.a"));
        let eq = hist
            .selectivity(&func, Operator::Eq, &[Comparand::Int(1)])
            .unwrap();
        assert!((eq - 0.1).abs() < TOL);
        let gt = hist
            .selectivity(&func, Operator::Gt, &[Comparand::Int(1)])
            .unwrap();
        assert!((gt - 0.3).abs() < TOL);
    }

    #[test]
    fn test_estimates_stay_in_unit_interval() {
        let hist = test_histogram();
        let ops = [
            Operator::Eq,
            Operator::Neq,
            Operator::Lt,
            Operator::Gt,
            Operator::In,
            Operator::NotIn,
        ];
        for op in ops {
            for v in -2..6 {
                let sel = hist
                    .selectivity(&objs0(), op, &[Comparand::Int(v)])
                    .unwrap();
                assert!((0.0..=1.0).contains(&sel), "{op:?} {v}: {sel}");
            }
        }
    }

    #[test]
    fn test_unsupported_function_is_rejected() {
        let hist = test_histogram();
        let err = hist
            .selectivity(
                &JsonFunc::other("JSON_CONTAINS"),
                Operator::Eq,
                &[Comparand::Int(1)],
            )
            .unwrap_err();
        assert!(err.is_estimation());
    }

    #[test]
    fn test_unsupported_path_is_rejected() {
        let hist = test_histogram();
        let err = hist
            .selectivity(
                &JsonFunc::unquote(JsonFunc::extract("$.a[*]")),
                Operator::Eq,
                &[Comparand::Int(1)],
            )
            .unwrap_err();
        assert!(err.is_estimation());
    }

    #[test]
    fn test_ndv_sums_typed_siblings() {
        let mut hist = test_histogram();
        let charset = hist.charset().clone();
        push_bucket(
            &mut hist,
            KeyPathBucket {
                key_path: BucketString::from_text("objs_arr.0_str", charset),
                frequency: 0.1,
                null_values: 0.0,
                value_type: BucketValueType::String,
                min_val: None,
                max_val: None,
                ndv: Some(7),
                sub: None,
            },
        );

        let func = JsonFunc::unquote(JsonFunc::extract("$.objs[0]"));
        // _num has ndv 4, _str has ndv 7, no _bool bucket.
        assert_eq!(hist.ndv(&func), Some(11));

        let missing = JsonFunc::unquote(JsonFunc::extract("$.nothing"));
        assert_eq!(hist.ndv(&missing), None);
    }
}
