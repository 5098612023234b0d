//! JSON (de)serialization of the histogram: the catalog round-trip.
//!
//! The serialized form is the catalog entry the optimizer trades with the
//! statistics builder. Buckets are positional arrays of arity 3, 5, 6 or 7
//! (the optional tail is cumulative: range bounds, then ndv, then the
//! sub-histogram); key paths and string values travel as opaque
//! base64-encoded byte strings. Deserialization is the histogram's only
//! mutating phase and validates every structural invariant, reporting
//! failures against a JSON-pointer-style node string.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::{Map, Number, Value};

use jsonflex_error::{HistogramError, Result};
use jsonflex_types::{
    collation_from_id, BucketString, BucketValueType, CollationFunction, CollationId, Primitive,
};

use crate::bucket::KeyPathBucket;
use crate::histogram::{HistogramDataType, JsonFlexHistogram, JSON_FLEX_TYPE_STR};
use crate::subhistogram::{EquiHeightBucket, InnerHistogram, SingletonBucket, SubHistogram};

const HISTOGRAM_TYPE_KEY: &str = "histogram-type";
const DATA_TYPE_KEY: &str = "data-type";
const NULL_VALUES_KEY: &str = "null-values";
const LAST_UPDATED_KEY: &str = "last-updated";
const NUM_BUCKETS_SPECIFIED_KEY: &str = "number-of-buckets-specified";
const COLLATION_ID_KEY: &str = "collation-id";
const SAMPLING_RATE_KEY: &str = "sampling-rate";
const BUCKETS_KEY: &str = "buckets";

const SUB_TYPE_KEY: &str = "type";
const SUB_BUCKETS_KEY: &str = "buckets";
const SUB_REST_FREQUENCY_KEY: &str = "rest_frequency";
const SINGLETON_STR: &str = "singleton";
const EQUI_HEIGHT_STR: &str = "equi-height";

impl JsonFlexHistogram {
    /// Populate this histogram from its serialized JSON form.
    ///
    /// Everything is parsed and validated before any field is committed, so
    /// a failed load leaves the histogram unchanged.
    pub fn from_json(&mut self, json_object: &Value) -> Result<()> {
        let obj = json_object
            .as_object()
            .ok_or_else(|| HistogramError::wrong_type("$"))?;

        let histogram_type = get_str(obj, HISTOGRAM_TYPE_KEY)?;
        if histogram_type != JSON_FLEX_TYPE_STR {
            return Err(HistogramError::wrong_type(HISTOGRAM_TYPE_KEY));
        }
        let data_type = HistogramDataType::parse(get_str(obj, DATA_TYPE_KEY)?)
            .ok_or_else(|| HistogramError::wrong_type(DATA_TYPE_KEY))?;
        let null_values = get_fraction(obj, NULL_VALUES_KEY)?;
        let last_updated = get_str(obj, LAST_UPDATED_KEY)?.to_owned();
        let num_buckets_spec = get_i64(obj, NUM_BUCKETS_SPECIFIED_KEY)?;
        let collation_id = CollationId(
            u32::try_from(get_i64(obj, COLLATION_ID_KEY)?)
                .map_err(|_| HistogramError::wrong_type(COLLATION_ID_KEY))?,
        );
        let sampling_rate = get_fraction(obj, SAMPLING_RATE_KEY)?;

        let charset = collation_from_id(collation_id);

        let buckets_value = get_attr(obj, BUCKETS_KEY)?;
        let buckets_arr = buckets_value
            .as_array()
            .ok_or_else(|| HistogramError::wrong_type(BUCKETS_KEY))?;

        let mut buckets = Vec::with_capacity(buckets_arr.len());
        let mut min_frequency = 1.0f64;
        for (index, bucket_value) in buckets_arr.iter().enumerate() {
            let bucket = parse_bucket(bucket_value, index, &charset)?;
            min_frequency = min_frequency.min(bucket.frequency);
            buckets.push(bucket);
        }

        self.data_type = data_type;
        self.null_values = null_values;
        self.last_updated = last_updated;
        self.num_buckets_spec = num_buckets_spec;
        self.collation_id = collation_id;
        self.sampling_rate = sampling_rate;
        self.charset = charset;
        self.min_frequency = min_frequency;
        self.buckets = buckets;
        Ok(())
    }

    /// Serialize this histogram to its JSON catalog form.
    pub fn to_json(&self) -> Result<Value> {
        let mut obj = Map::new();
        obj.insert(
            HISTOGRAM_TYPE_KEY.to_owned(),
            Value::String(JSON_FLEX_TYPE_STR.to_owned()),
        );
        obj.insert(
            DATA_TYPE_KEY.to_owned(),
            Value::String(self.data_type.as_str().to_owned()),
        );
        obj.insert(
            NULL_VALUES_KEY.to_owned(),
            number_value(self.null_values, NULL_VALUES_KEY)?,
        );
        obj.insert(
            LAST_UPDATED_KEY.to_owned(),
            Value::String(self.last_updated.clone()),
        );
        obj.insert(
            NUM_BUCKETS_SPECIFIED_KEY.to_owned(),
            Value::Number(self.num_buckets_spec.into()),
        );
        obj.insert(
            COLLATION_ID_KEY.to_owned(),
            Value::Number(u64::from(self.collation_id.get()).into()),
        );
        obj.insert(
            SAMPLING_RATE_KEY.to_owned(),
            number_value(self.sampling_rate, SAMPLING_RATE_KEY)?,
        );

        let mut buckets = Vec::with_capacity(self.buckets.len());
        for (index, bucket) in self.buckets.iter().enumerate() {
            buckets.push(bucket_to_json(bucket, index)?);
        }
        obj.insert(BUCKETS_KEY.to_owned(), Value::Array(buckets));
        Ok(Value::Object(obj))
    }
}

// ── Envelope helpers ─────────────────────────────────────────────────────

fn get_attr<'a>(obj: &'a Map<String, Value>, key: &str) -> Result<&'a Value> {
    obj.get(key).ok_or_else(|| HistogramError::missing(key))
}

fn get_str<'a>(obj: &'a Map<String, Value>, key: &str) -> Result<&'a str> {
    get_attr(obj, key)?
        .as_str()
        .ok_or_else(|| HistogramError::wrong_type(key))
}

fn get_i64(obj: &Map<String, Value>, key: &str) -> Result<i64> {
    get_attr(obj, key)?
        .as_i64()
        .ok_or_else(|| HistogramError::wrong_type(key))
}

fn get_fraction(obj: &Map<String, Value>, key: &str) -> Result<f64> {
    fraction_at(get_attr(obj, key)?, key)
}

fn fraction_at(value: &Value, node: &str) -> Result<f64> {
    let v = value
        .as_f64()
        .ok_or_else(|| HistogramError::wrong_type(node))?;
    if !(0.0..=1.0).contains(&v) {
        return Err(HistogramError::invalid_frequency(node, v));
    }
    Ok(v)
}

fn number_value(v: f64, node: &str) -> Result<Value> {
    Number::from_f64(v)
        .map(Value::Number)
        .ok_or_else(|| HistogramError::unsupported_configuration(node, "non-finite number"))
}

// ── Bucket deserialization ───────────────────────────────────────────────

fn parse_bucket(
    value: &Value,
    index: usize,
    charset: &Arc<dyn CollationFunction>,
) -> Result<KeyPathBucket> {
    let node = format!("buckets[{index}]");
    let arr = value
        .as_array()
        .ok_or_else(|| HistogramError::wrong_type(&node))?;
    if !matches!(arr.len(), 3 | 5 | 6 | 7) {
        return Err(HistogramError::bucket_arity(&node, arr.len()));
    }

    let key_path_node = format!("{node}[0]");
    let key_path_b64 = arr[0]
        .as_str()
        .ok_or_else(|| HistogramError::wrong_type(&key_path_node))?;
    let key_path_bytes = BASE64
        .decode(key_path_b64)
        .map_err(|_| HistogramError::wrong_type(&key_path_node))?;
    let key_path = BucketString::new(key_path_bytes, charset.clone());

    let frequency = fraction_at(&arr[1], &format!("{node}[1]"))?;
    let null_values = fraction_at(&arr[2], &format!("{node}[2]"))?;

    let (value_type, min_val, max_val) = if arr.len() >= 5 {
        let min = parse_primitive(&arr[3], &format!("{node}[3]"), charset)?;
        let max = parse_primitive(&arr[4], &format!("{node}[4]"), charset)?;
        (min.value_type(), Some(min), Some(max))
    } else {
        (BucketValueType::Unknown, None, None)
    };

    let ndv = if arr.len() >= 6 {
        Some(
            arr[5]
                .as_i64()
                .ok_or_else(|| HistogramError::wrong_type(format!("{node}[5]")))?,
        )
    } else {
        None
    };

    let sub = if arr.len() == 7 {
        Some(parse_sub_histogram(
            &arr[6],
            &format!("{node}[6]"),
            value_type,
            charset,
        )?)
    } else {
        None
    };

    let bucket = KeyPathBucket {
        key_path,
        frequency,
        null_values,
        value_type,
        min_val,
        max_val,
        ndv,
        sub,
    };
    bucket.validate(&node)?;
    Ok(bucket)
}

fn parse_primitive(
    value: &Value,
    node: &str,
    charset: &Arc<dyn CollationFunction>,
) -> Result<Primitive> {
    match value {
        Value::Bool(b) => Ok(Primitive::Bool(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Primitive::Int(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Primitive::Float(f))
            } else {
                Err(HistogramError::wrong_type(node))
            }
        }
        Value::String(b64) => {
            let bytes = BASE64
                .decode(b64)
                .map_err(|_| HistogramError::wrong_type(node))?;
            Ok(Primitive::String(BucketString::new(bytes, charset.clone())))
        }
        _ => Err(HistogramError::wrong_type(node)),
    }
}

fn parse_sub_histogram(
    value: &Value,
    node: &str,
    value_type: BucketValueType,
    charset: &Arc<dyn CollationFunction>,
) -> Result<SubHistogram> {
    let obj = value
        .as_object()
        .ok_or_else(|| HistogramError::wrong_type(node))?;

    let type_node = format!("{node}.{SUB_TYPE_KEY}");
    let sub_type = obj
        .get(SUB_TYPE_KEY)
        .ok_or_else(|| HistogramError::missing(SUB_TYPE_KEY))?
        .as_str()
        .ok_or_else(|| HistogramError::wrong_type(&type_node))?;
    let singleton = match sub_type {
        SINGLETON_STR => true,
        EQUI_HEIGHT_STR => false,
        _ => return Err(HistogramError::wrong_type(&type_node)),
    };

    let entries = obj
        .get(SUB_BUCKETS_KEY)
        .ok_or_else(|| HistogramError::missing(SUB_BUCKETS_KEY))?
        .as_array()
        .ok_or_else(|| HistogramError::wrong_type(format!("{node}.{SUB_BUCKETS_KEY}")))?;

    let rest_frequency = match obj.get(SUB_REST_FREQUENCY_KEY) {
        Some(v) => Some(fraction_at(v, &format!("{node}.{SUB_REST_FREQUENCY_KEY}"))?),
        None => None,
    };
    if !singleton && rest_frequency.is_some() {
        return Err(HistogramError::unsupported_configuration(
            node,
            "rest_frequency on an equi-height sub-histogram",
        ));
    }

    match value_type {
        BucketValueType::Int => Ok(SubHistogram::Int(parse_inner(
            entries,
            node,
            singleton,
            rest_frequency,
            |v, n| {
                v.as_i64()
                    .ok_or_else(|| HistogramError::type_mismatch(n, "int", json_type_name(v)))
            },
        )?)),
        BucketValueType::Float => Ok(SubHistogram::Float(parse_inner(
            entries,
            node,
            singleton,
            rest_frequency,
            |v, n| {
                v.as_f64()
                    .ok_or_else(|| HistogramError::type_mismatch(n, "float", json_type_name(v)))
            },
        )?)),
        BucketValueType::Bool => Ok(SubHistogram::Bool(parse_inner(
            entries,
            node,
            singleton,
            rest_frequency,
            |v, n| {
                v.as_bool()
                    .ok_or_else(|| HistogramError::type_mismatch(n, "bool", json_type_name(v)))
            },
        )?)),
        BucketValueType::String => Ok(SubHistogram::String(parse_inner(
            entries,
            node,
            singleton,
            rest_frequency,
            |v, n| {
                let b64 = v
                    .as_str()
                    .ok_or_else(|| HistogramError::type_mismatch(n, "string", json_type_name(v)))?;
                let bytes = BASE64
                    .decode(b64)
                    .map_err(|_| HistogramError::wrong_type(n))?;
                Ok(BucketString::new(bytes, charset.clone()))
            },
        )?)),
        BucketValueType::Unknown => Err(HistogramError::unsupported_configuration(
            node,
            "sub-histogram requires typed range bounds",
        )),
    }
}

fn parse_inner<T>(
    entries: &[Value],
    node: &str,
    singleton: bool,
    rest_frequency: Option<f64>,
    mut parse_value: impl FnMut(&Value, &str) -> Result<T>,
) -> Result<InnerHistogram<T>> {
    if singleton {
        let mut buckets = Vec::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            let entry_node = format!("{node}.{SUB_BUCKETS_KEY}[{i}]");
            let arr = entry
                .as_array()
                .ok_or_else(|| HistogramError::wrong_type(&entry_node))?;
            if arr.len() != 2 {
                return Err(HistogramError::bucket_arity(&entry_node, arr.len()));
            }
            let value = parse_value(&arr[0], &format!("{entry_node}[0]"))?;
            let frequency = fraction_at(&arr[1], &format!("{entry_node}[1]"))?;
            buckets.push(SingletonBucket { value, frequency });
        }
        Ok(InnerHistogram::Singleton {
            buckets,
            rest_frequency,
        })
    } else {
        let mut buckets = Vec::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            let entry_node = format!("{node}.{SUB_BUCKETS_KEY}[{i}]");
            let arr = entry
                .as_array()
                .ok_or_else(|| HistogramError::wrong_type(&entry_node))?;
            if arr.len() != 3 {
                return Err(HistogramError::bucket_arity(&entry_node, arr.len()));
            }
            let upper_bound = parse_value(&arr[0], &format!("{entry_node}[0]"))?;
            let frequency = fraction_at(&arr[1], &format!("{entry_node}[1]"))?;
            let ndv = arr[2]
                .as_i64()
                .ok_or_else(|| HistogramError::wrong_type(format!("{entry_node}[2]")))?;
            buckets.push(EquiHeightBucket {
                upper_bound,
                frequency,
                ndv,
            });
        }
        Ok(InnerHistogram::EquiHeight { buckets })
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ── Bucket serialization ─────────────────────────────────────────────────

fn bucket_to_json(bucket: &KeyPathBucket, index: usize) -> Result<Value> {
    let node = format!("buckets[{index}]");
    let mut arr = vec![
        Value::String(BASE64.encode(bucket.key_path.as_bytes())),
        number_value(bucket.frequency, &node)?,
        number_value(bucket.null_values, &node)?,
    ];
    if let (Some(min), Some(max)) = (&bucket.min_val, &bucket.max_val) {
        arr.push(primitive_to_json(min, &node)?);
        arr.push(primitive_to_json(max, &node)?);
        if let Some(ndv) = bucket.ndv {
            arr.push(Value::Number(ndv.into()));
            if let Some(sub) = &bucket.sub {
                arr.push(sub_to_json(sub, &node)?);
            }
        }
    }
    Ok(Value::Array(arr))
}

fn primitive_to_json(value: &Primitive, node: &str) -> Result<Value> {
    match value {
        Primitive::Int(i) => Ok(Value::Number((*i).into())),
        Primitive::Float(f) => number_value(*f, node),
        Primitive::Bool(b) => Ok(Value::Bool(*b)),
        Primitive::String(s) => Ok(Value::String(BASE64.encode(s.as_bytes()))),
    }
}

fn sub_to_json(sub: &SubHistogram, node: &str) -> Result<Value> {
    match sub {
        SubHistogram::Int(h) => inner_to_json(h, node, |v, _| Ok(Value::Number((*v).into()))),
        SubHistogram::Float(h) => inner_to_json(h, node, |v, n| number_value(*v, n)),
        SubHistogram::Bool(h) => inner_to_json(h, node, |v, _| Ok(Value::Bool(*v))),
        SubHistogram::String(h) => inner_to_json(h, node, |v, _| {
            Ok(Value::String(BASE64.encode(v.as_bytes())))
        }),
    }
}

fn inner_to_json<T>(
    hist: &InnerHistogram<T>,
    node: &str,
    mut value_to_json: impl FnMut(&T, &str) -> Result<Value>,
) -> Result<Value> {
    let mut obj = Map::new();
    match hist {
        InnerHistogram::Singleton {
            buckets,
            rest_frequency,
        } => {
            obj.insert(
                SUB_TYPE_KEY.to_owned(),
                Value::String(SINGLETON_STR.to_owned()),
            );
            let mut entries = Vec::with_capacity(buckets.len());
            for b in buckets {
                entries.push(Value::Array(vec![
                    value_to_json(&b.value, node)?,
                    number_value(b.frequency, node)?,
                ]));
            }
            obj.insert(SUB_BUCKETS_KEY.to_owned(), Value::Array(entries));
            if let Some(rest) = rest_frequency {
                obj.insert(
                    SUB_REST_FREQUENCY_KEY.to_owned(),
                    number_value(*rest, node)?,
                );
            }
        }
        InnerHistogram::EquiHeight { buckets } => {
            obj.insert(
                SUB_TYPE_KEY.to_owned(),
                Value::String(EQUI_HEIGHT_STR.to_owned()),
            );
            let mut entries = Vec::with_capacity(buckets.len());
            for b in buckets {
                entries.push(Value::Array(vec![
                    value_to_json(&b.upper_bound, node)?,
                    number_value(b.frequency, node)?,
                    Value::Number(b.ndv.into()),
                ]));
            }
            obj.insert(SUB_BUCKETS_KEY.to_owned(), Value::Array(entries));
        }
    }
    Ok(Value::Object(obj))
}
