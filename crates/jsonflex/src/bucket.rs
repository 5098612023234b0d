//! Per-key-path statistics and the typed value lookup.

use std::cmp::Ordering;

use jsonflex_error::{HistogramError, Result};
use jsonflex_types::{BucketString, BucketValueType, Primitive};

use crate::subhistogram::{LookupResult, SubHistogram};

/// Equality estimate as a fraction of the base frequency when a bucket has
/// no distinct-value count.
pub const NO_STATS_EQ_FRACTION: f64 = 0.1;

/// Range estimate as a fraction of the base frequency when a bucket has no
/// sub-histogram.
pub const NO_STATS_RANGE_FRACTION: f64 = 0.3;

/// Tolerance when checking cumulative frequencies against their budget.
const TOTAL_FREQUENCY_TOLERANCE: f64 = 1e-6;

/// Statistics for one canonical key path.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyPathBucket {
    /// Canonical encoded path, e.g. `docs_arr.0_obj.datetime_num`.
    pub key_path: BucketString,
    /// Fraction of rows where this path resolves.
    pub frequency: f64,
    /// Of those rows, the fraction where it resolves to JSON null.
    pub null_values: f64,
    /// Domain of the leaf values at this path.
    pub value_type: BucketValueType,
    /// Inclusive lower range bound; present iff `max_val` is.
    pub min_val: Option<Primitive>,
    /// Inclusive upper range bound; present iff `min_val` is.
    pub max_val: Option<Primitive>,
    /// Number of distinct non-null values along this path.
    pub ndv: Option<i64>,
    /// Nested histogram over the leaf values.
    pub sub: Option<SubHistogram>,
}

impl KeyPathBucket {
    /// The maximum contribution this bucket makes to any predicate: the
    /// fraction of rows where the path resolves to a non-null value.
    pub fn base_frequency(&self) -> f64 {
        self.frequency * (1.0 - self.null_values)
    }

    /// Estimate for a predicate whose comparand value or type is unknown.
    pub fn lookup_untyped(&self) -> LookupResult {
        let base = self.base_frequency();
        LookupResult::new(
            self.eq_without_value(base),
            base * NO_STATS_RANGE_FRACTION,
            base * NO_STATS_RANGE_FRACTION,
        )
    }

    /// Estimate `(eq, lt, gt)` for a typed comparand.
    pub fn lookup_value(&self, value: &Primitive) -> LookupResult {
        let base = self.base_frequency();

        // Cross-domain numeric dispatch: a JSON number bucket stores either
        // representation, and `_num` keys both.
        match (self.value_type, value) {
            (BucketValueType::Float, Primitive::Int(i)) => {
                return self.lookup_value(&Primitive::Float(*i as f64));
            }
            (BucketValueType::Int, Primitive::Float(f)) => {
                if *f < i64::MIN as f64 {
                    return LookupResult::new(0.0, 0.0, base);
                }
                if *f > i64::MAX as f64 {
                    return LookupResult::new(0.0, base, 0.0);
                }
                if f.fract() == 0.0 {
                    return self.lookup_value(&Primitive::Int(*f as i64));
                }
                // No integer equals a non-integral float; everything at or
                // below floor(f) is strictly less than it.
                let floored = self.lookup_value(&Primitive::Int(f.floor() as i64));
                return LookupResult::new(
                    0.0,
                    (floored.lt + floored.eq).min(base),
                    floored.gt,
                );
            }
            _ => {}
        }

        if self.value_type == BucketValueType::Bool {
            return self.lookup_bool(value, base);
        }

        // Range pre-filter.
        if let (Some(min), Some(max)) = (&self.min_val, &self.max_val) {
            if value.partial_cmp(min) == Some(Ordering::Less) {
                return LookupResult::new(0.0, 0.0, base);
            }
            if value.partial_cmp(max) == Some(Ordering::Greater) {
                return LookupResult::new(0.0, base, 0.0);
            }
        }

        if let Some(sub) = &self.sub {
            if let Some(result) = sub.lookup(value, base) {
                return result;
            }
        }

        self.lookup_without_sub(value, base)
    }

    /// Boolean buckets: only the matched value's frequency is meaningful;
    /// ordering estimates are always zero, including out of range.
    fn lookup_bool(&self, value: &Primitive, base: f64) -> LookupResult {
        if let (Some(min), Some(max)) = (&self.min_val, &self.max_val) {
            let below = value.partial_cmp(min) == Some(Ordering::Less);
            let above = value.partial_cmp(max) == Some(Ordering::Greater);
            if below || above {
                return LookupResult::new(0.0, 0.0, 0.0);
            }
        }
        let eq = match &self.sub {
            Some(sub) => sub.lookup(value, base).map_or(0.0, |r| r.eq),
            None => match (&self.min_val, &self.max_val) {
                // Single-valued domain; the range check above rejected the
                // other constant.
                (Some(min), Some(max)) if min == max => base,
                _ => self.eq_without_value(base),
            },
        };
        LookupResult::new(eq, 0.0, 0.0)
    }

    fn lookup_without_sub(&self, value: &Primitive, base: f64) -> LookupResult {
        let eq = self.eq_without_value(base);
        let at_min = self.min_val.as_ref().is_some_and(|m| value == m);
        let at_max = self.max_val.as_ref().is_some_and(|m| value == m);
        let lt = if at_min {
            0.0
        } else if at_max {
            (base - eq).max(0.0)
        } else {
            base * NO_STATS_RANGE_FRACTION
        };
        let gt = if at_max {
            0.0
        } else if at_min {
            (base - eq).max(0.0)
        } else {
            base * NO_STATS_RANGE_FRACTION
        };
        LookupResult::new(eq, lt, gt)
    }

    fn eq_without_value(&self, base: f64) -> f64 {
        match self.ndv {
            Some(ndv) if ndv > 0 => base / ndv as f64,
            _ => base * NO_STATS_EQ_FRACTION,
        }
    }

    /// Check the structural invariants, reporting violations against `node`.
    ///
    /// Called on every bucket the deserializer produces; hosts constructing
    /// buckets programmatically can call it too.
    pub fn validate(&self, node: &str) -> Result<()> {
        if self.min_val.is_some() != self.max_val.is_some() {
            return Err(HistogramError::unsupported_configuration(
                node,
                "min_val and max_val must be present together",
            ));
        }
        if !(0.0..=1.0).contains(&self.frequency) {
            return Err(HistogramError::invalid_frequency(node, self.frequency));
        }
        if !(0.0..=1.0).contains(&self.null_values) {
            return Err(HistogramError::invalid_frequency(node, self.null_values));
        }
        let total = self.frequency + self.null_values;
        if total > 1.0 + TOTAL_FREQUENCY_TOLERANCE {
            return Err(HistogramError::invalid_total_frequency(node, total));
        }

        if let (Some(min), Some(max)) = (&self.min_val, &self.max_val) {
            if min.value_type() != self.value_type {
                return Err(HistogramError::type_mismatch(
                    node,
                    self.value_type.as_str(),
                    min.value_type().as_str(),
                ));
            }
            if max.value_type() != self.value_type {
                return Err(HistogramError::type_mismatch(
                    node,
                    self.value_type.as_str(),
                    max.value_type().as_str(),
                ));
            }
            if min.partial_cmp(max) == Some(Ordering::Greater) {
                return Err(HistogramError::unsupported_configuration(
                    node,
                    "min_val greater than max_val",
                ));
            }
            if self.ndv == Some(1) && min != max {
                return Err(HistogramError::unsupported_configuration(
                    node,
                    "single distinct value but min_val differs from max_val",
                ));
            }
        }

        if let Some(ndv) = self.ndv {
            if ndv < 1 {
                return Err(HistogramError::unsupported_configuration(
                    node,
                    "ndv must be positive",
                ));
            }
        }

        if let Some(sub) = &self.sub {
            let Some(ndv) = self.ndv else {
                return Err(HistogramError::unsupported_configuration(
                    node,
                    "sub-histogram requires ndv",
                ));
            };
            if (ndv as usize) < sub.num_buckets() {
                return Err(HistogramError::unsupported_configuration(
                    node,
                    "ndv smaller than the sub-histogram bucket count",
                ));
            }
            if sub.value_type() != self.value_type {
                return Err(HistogramError::type_mismatch(
                    node,
                    self.value_type.as_str(),
                    sub.value_type().as_str(),
                ));
            }
            if sub.is_equi_height() && self.value_type == BucketValueType::Bool {
                return Err(HistogramError::unsupported_configuration(
                    node,
                    "equi-height sub-histogram over booleans",
                ));
            }
            if !sub.is_sorted_ascending() {
                return Err(HistogramError::unsupported_configuration(
                    node,
                    "sub-histogram values not sorted ascending",
                ));
            }
            let total = sub.total_frequency();
            if sub.is_equi_height() {
                if (total - 1.0).abs() > TOTAL_FREQUENCY_TOLERANCE {
                    return Err(HistogramError::invalid_total_frequency(node, total));
                }
            } else {
                if total > 1.0 + TOTAL_FREQUENCY_TOLERANCE {
                    return Err(HistogramError::invalid_total_frequency(node, total));
                }
                if sub.rest_frequency().is_some() && total >= 1.0 - TOTAL_FREQUENCY_TOLERANCE {
                    // The listed values already cover everything; a tail
                    // frequency would double-count.
                    return Err(HistogramError::invalid_total_frequency(node, total));
                }
            }
        }

        Ok(())
    }
}
