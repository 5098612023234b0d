//! Canonical key-path encoding and function-shape resolution.
//!
//! The histogram is keyed by structural shape: the sequence of object-key /
//! array-index steps plus the terminal JSON type (one path can resolve to
//! different types across documents, and statistics are kept per terminal
//! type). The encoder is a single left-to-right scan, not a JSON-path
//! parser: wildcards, filters and quoted members have no canonical shape and
//! are rejected, which keeps the encoding deterministic and stable.

use jsonflex_error::{HistogramError, Result};
use jsonflex_types::BucketValueType;

/// Separators used by the canonical encoding. Parameters rather than
/// globals; the defaults match what histogram builders write.
#[derive(Debug, Clone)]
pub struct PathEncoding {
    /// Separator between encoded steps (`.`).
    pub key_separator: char,
    /// Separator before a step's `obj`/`arr`/type marker (`_`).
    pub type_separator: char,
}

impl Default for PathEncoding {
    fn default() -> Self {
        Self {
            key_separator: '.',
            type_separator: '_',
        }
    }
}

/// An optimizer-level JSON extraction function, as seen in a predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonFunc {
    /// `JSON_EXTRACT(col, path)` / `col->path`. The result keeps JSON
    /// quoting, so the leaf type is not certain.
    Extract { path: String },
    /// `JSON_UNQUOTE(...)` / the `->>` operator. Strips JSON quoting; only
    /// meaningful around an extraction.
    Unquote { arg: Box<JsonFunc> },
    /// `JSON_VALUE(col, path)`. Type-certain, and SQL-NULL when the path is
    /// missing, which flips the IS NULL semantics.
    Value { path: String },
    /// Any other function; rejected by the engine.
    Other { name: String },
}

impl JsonFunc {
    pub fn extract(path: impl Into<String>) -> Self {
        Self::Extract { path: path.into() }
    }

    pub fn unquote(arg: JsonFunc) -> Self {
        Self::Unquote { arg: Box::new(arg) }
    }

    pub fn value(path: impl Into<String>) -> Self {
        Self::Value { path: path.into() }
    }

    pub fn other(name: impl Into<String>) -> Self {
        Self::Other { name: name.into() }
    }
}

/// A recognized function shape: the path literal plus the lookup semantics
/// it implies.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ResolvedFunc<'a> {
    pub(crate) path: &'a str,
    /// Whether the context strips JSON quoting, guaranteeing the leaf type
    /// matches the comparand.
    pub(crate) type_certain: bool,
    /// Whether the outer function is `JSON_VALUE` (changes IS NULL).
    pub(crate) json_value: bool,
}

/// Recognize the nested function shapes the histogram understands.
pub(crate) fn resolve_func(func: &JsonFunc) -> Result<ResolvedFunc<'_>> {
    match func {
        JsonFunc::Extract { path } => Ok(ResolvedFunc {
            path,
            type_certain: false,
            json_value: false,
        }),
        JsonFunc::Unquote { arg } => match arg.as_ref() {
            JsonFunc::Extract { path } => Ok(ResolvedFunc {
                path,
                type_certain: true,
                json_value: false,
            }),
            _ => Err(HistogramError::unsupported_function("JSON_UNQUOTE")),
        },
        JsonFunc::Value { path } => Ok(ResolvedFunc {
            path,
            type_certain: true,
            json_value: true,
        }),
        JsonFunc::Other { name } => Err(HistogramError::unsupported_function(name.clone())),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathStep<'a> {
    Key(&'a str),
    Index(u64),
}

fn parse_steps(path: &str) -> Result<Vec<PathStep<'_>>> {
    let bytes = path.as_bytes();
    if bytes.len() < 2 || bytes[0] != b'$' {
        return Err(HistogramError::unsupported_path(path));
    }

    let mut idx = 1;
    let mut steps = Vec::new();
    while idx < bytes.len() {
        match bytes[idx] {
            b'.' => {
                idx += 1;
                let start = idx;
                while idx < bytes.len() && bytes[idx] != b'.' && bytes[idx] != b'[' {
                    idx += 1;
                }
                let key = &path[start..idx];
                if key.is_empty() || key.contains(['*', '"', '\'']) {
                    return Err(HistogramError::unsupported_path(path));
                }
                steps.push(PathStep::Key(key));
            }
            b'[' => {
                idx += 1;
                let start = idx;
                while idx < bytes.len() && bytes[idx] != b']' {
                    idx += 1;
                }
                if idx >= bytes.len() {
                    return Err(HistogramError::unsupported_path(path));
                }
                let index = path[start..idx]
                    .parse::<u64>()
                    .map_err(|_| HistogramError::unsupported_path(path))?;
                idx += 1;
                steps.push(PathStep::Index(index));
            }
            _ => return Err(HistogramError::unsupported_path(path)),
        }
    }

    Ok(steps)
}

/// Encode a JSON path expression into the canonical lookup string.
///
/// Each step is emitted in order. A non-terminal step is tagged with the
/// kind of its successor (`_obj` for an object member, `_arr` for an array
/// index). When the function context is type-certain and the comparand type
/// is known, the terminal step is tagged with the comparand's type marker
/// (`_num`, `_bool` or `_str`); otherwise the terminal step stays bare and
/// the caller uses the untyped path.
///
/// `$.docs[0].history.edits[5].datetime` with a string comparand in a
/// type-certain context becomes
/// `docs_arr.0_obj.history_obj.edits_arr.5_obj.datetime_str`.
pub fn encode_key_path(
    path_expr: &str,
    comparand_type: BucketValueType,
    type_certain: bool,
    encoding: &PathEncoding,
) -> Result<String> {
    let steps = parse_steps(path_expr)?;

    let mut out = String::with_capacity(path_expr.len() * 2);
    for (i, step) in steps.iter().enumerate() {
        match step {
            PathStep::Key(key) => out.push_str(key),
            PathStep::Index(n) => out.push_str(&n.to_string()),
        }
        if let Some(next) = steps.get(i + 1) {
            out.push(encoding.type_separator);
            out.push_str(match next {
                PathStep::Index(_) => "arr",
                PathStep::Key(_) => "obj",
            });
            out.push(encoding.key_separator);
        } else if type_certain {
            if let Some(marker) = comparand_type.type_marker() {
                out.push(encoding.type_separator);
                out.push_str(marker);
            }
        }
    }
    Ok(out)
}
