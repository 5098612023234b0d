//! End-to-end catalog flow: load a serialized histogram, query it, and
//! round-trip it back through JSON.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::{json, Value};

use jsonflex::{Comparand, JsonFlexHistogram, JsonFunc, Operator};

const TOL: f64 = 1e-9;

fn b64(s: &str) -> String {
    BASE64.encode(s.as_bytes())
}

/// A catalog entry the statistics builder could plausibly emit for a column
/// of order documents: numbers with singleton and equi-height statistics,
/// a long-tail string enum, a boolean flag, and an untyped parent path.
fn catalog_entry() -> Value {
    json!({
        "histogram-type": "json-flex",
        "data-type": "json",
        "null-values": 0.02,
        "last-updated": "2024-03-15 10:30:00.000000",
        "number-of-buckets-specified": 128,
        "collation-id": 63,
        "sampling-rate": 1.0,
        "buckets": [
            [b64("objs_arr.0_num"), 0.4, 0.0, 0, 3, 4,
                {"type": "singleton", "buckets": [[0, 0.1], [1, 0.1]]}],
            [b64("objs_arr.0"), 0.5, 0.2, 0, 3, 5],
            [b64("aakey_str"), 0.131, 0.0, b64("bb"), b64("bb"), 1],
            [b64("qty_num"), 0.4, 0.0, 0, 3, 4],
            [b64("price_num"), 0.8, 0.1, 0.5, 99.5, 50,
                {"type": "equi-height",
                 "buckets": [[10.0, 0.25, 13], [45.0, 0.25, 12],
                             [70.0, 0.25, 13], [99.5, 0.25, 12]]}],
            [b64("status_str"), 0.9, 0.0, b64("active"), b64("retired"), 40,
                {"type": "singleton",
                 "buckets": [[b64("active"), 0.6], [b64("retired"), 0.2]],
                 "rest_frequency": 0.005}],
            [b64("flag_bool"), 0.3, 0.0, false, true, 2,
                {"type": "singleton", "buckets": [[false, 0.7], [true, 0.3]]}],
        ],
    })
}

fn load() -> JsonFlexHistogram {
    let mut hist = JsonFlexHistogram::create("shop", "orders", "doc");
    hist.from_json(&catalog_entry()).expect("valid catalog entry");
    hist
}

#[test]
fn round_trip_is_structurally_identical() {
    let hist = load();
    let serialized = hist.to_json().unwrap();
    let mut reloaded = JsonFlexHistogram::create("shop", "orders", "doc");
    reloaded.from_json(&serialized).unwrap();
    assert_eq!(reloaded, hist);

    // And a second generation is byte-identical JSON.
    assert_eq!(reloaded.to_json().unwrap(), serialized);
}

#[test]
fn singleton_statistics_drive_comparisons() {
    let hist = load();
    let func = JsonFunc::unquote(JsonFunc::extract("$.objs[0]"));

    let eq = hist
        .selectivity(&func, Operator::Eq, &[Comparand::Int(1)])
        .unwrap();
    assert!((eq - 0.04).abs() < TOL);

    let lt = hist
        .selectivity(&func, Operator::Lt, &[Comparand::Int(1)])
        .unwrap();
    assert!((lt - 0.04).abs() < TOL);

    let gt = hist
        .selectivity(&func, Operator::Gt, &[Comparand::Int(1)])
        .unwrap();
    assert!((gt - 0.32).abs() < TOL);
}

#[test]
fn out_of_range_comparands_short_circuit() {
    let hist = load();
    let func = JsonFunc::unquote(JsonFunc::extract("$.objs[0]"));

    let eq = hist
        .selectivity(&func, Operator::Eq, &[Comparand::Int(-1)])
        .unwrap();
    assert_eq!(eq, 0.0);
    let gt = hist
        .selectivity(&func, Operator::Gt, &[Comparand::Int(-1)])
        .unwrap();
    assert!((gt - 0.4).abs() < TOL);
    let lt = hist
        .selectivity(&func, Operator::Lt, &[Comparand::Int(-1)])
        .unwrap();
    assert_eq!(lt, 0.0);
}

#[test]
fn string_enum_estimates() {
    let hist = load();
    let func = JsonFunc::unquote(JsonFunc::extract("$.status"));

    let active = hist
        .selectivity(&func, Operator::Eq, &[Comparand::Str("active".to_owned())])
        .unwrap();
    assert!((active - 0.9 * 0.6).abs() < TOL);

    // A value inside the range but not listed takes the long-tail mean.
    let other = hist
        .selectivity(&func, Operator::Eq, &[Comparand::Str("closed".to_owned())])
        .unwrap();
    assert!((other - 0.9 * 0.005).abs() < TOL);

    // Outside the [min, max] range entirely.
    let nothing = hist
        .selectivity(&func, Operator::Eq, &[Comparand::Str("zzz".to_owned())])
        .unwrap();
    assert_eq!(nothing, 0.0);
}

#[test]
fn single_valued_string_bucket() {
    let hist = load();
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
fn equi_height_ranges() {
    let hist = load();
    let func = JsonFunc::unquote(JsonFunc::extract("$.price"));
    let base = 0.8 * 0.9;

    // 50.0 lands in the third range: two full ranges below.
    let lt = hist
        .selectivity(&func, Operator::Lt, &[Comparand::Float(50.0)])
        .unwrap();
    assert!((lt - base * 0.5).abs() < TOL);

    // At the maximum the greater-than side vanishes.
    let gt = hist
        .selectivity(&func, Operator::Gt, &[Comparand::Float(99.5)])
        .unwrap();
    assert!(gt.abs() < 1e-9);

    // Equality inside a range divides the range's mass by its ndv.
    let eq = hist
        .selectivity(&func, Operator::Eq, &[Comparand::Float(50.0)])
        .unwrap();
    assert!((eq - base * 0.25 / 13.0).abs() < TOL);
}

#[test]
fn between_is_clipped_against_base() {
    let hist = load();
    let func = JsonFunc::unquote(JsonFunc::extract("$.qty"));
    let sel = hist
        .selectivity(
            &func,
            Operator::Between,
            &[Comparand::Int(0), Comparand::Int(5)],
        )
        .unwrap();
    assert!((sel - 0.4).abs() < TOL);
}

#[test]
fn boolean_flag_estimates() {
    let hist = load();
    let func = JsonFunc::unquote(JsonFunc::extract("$.flag"));

    let yes = hist
        .selectivity(&func, Operator::Eq, &[Comparand::Bool(true)])
        .unwrap();
    assert!((yes - 0.3 * 0.3).abs() < TOL);

    // Ordering over booleans carries no information.
    let lt = hist
        .selectivity(&func, Operator::Lt, &[Comparand::Bool(true)])
        .unwrap();
    assert_eq!(lt, 0.0);
}

#[test]
fn is_null_depends_on_function_shape() {
    let hist = load();

    // Plain extraction: SQL NULL only when the path is missing.
    let extract = JsonFunc::extract("$.objs[0]");
    let is_null = hist.selectivity(&extract, Operator::IsNull, &[]).unwrap();
    assert!((is_null - 0.5).abs() < TOL);

    // JSON_VALUE: SQL NULL when missing or JSON null.
    let value = JsonFunc::value("$.objs[0]");
    let is_null = hist.selectivity(&value, Operator::IsNull, &[]).unwrap();
    assert!((is_null - (1.0 - 0.5 * 0.8)).abs() < TOL);
}

#[test]
fn unknown_paths_fall_back_to_min_frequency() {
    let hist = load();
    let func = JsonFunc::unquote(JsonFunc::extract("$.not.here"));
    let min_frequency = hist.min_frequency();
    assert!((min_frequency - 0.131).abs() < TOL);

    let eq = hist
        .selectivity(&func, Operator::Eq, &[Comparand::Int(1)])
        .unwrap();
    assert!((eq - min_frequency * 0.1).abs() < TOL);

    let between = hist
        .selectivity(
            &func,
            Operator::Between,
            &[Comparand::Int(0), Comparand::Int(1)],
        )
        .unwrap();
    assert!((between - min_frequency * 0.3).abs() < TOL);

    let is_not_null = hist.selectivity(&func, Operator::IsNotNull, &[]).unwrap();
    assert!((is_not_null - min_frequency * 0.8).abs() < TOL);
}

#[test]
fn ndv_aggregates_typed_siblings() {
    let hist = load();
    let func = JsonFunc::unquote(JsonFunc::extract("$.objs[0]"));
    assert_eq!(hist.ndv(&func), Some(4));

    let missing = JsonFunc::unquote(JsonFunc::extract("$.not.here"));
    assert_eq!(hist.ndv(&missing), None);
}

#[test]
fn num_buckets_matches_catalog() {
    let hist = load();
    assert_eq!(hist.num_buckets(), 7);
    assert_eq!(hist.num_distinct_values(), 7);
    assert_eq!(hist.histogram_type_to_str(), "json-flex");
}
