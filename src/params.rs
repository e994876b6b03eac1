//! Query parameter assembly for upstream provider requests
//!
//! Providers distinguish "parameter absent" from "parameter present with a
//! zero-ish value", and the distinction differs per field. The builder makes
//! the elision policy explicit instead of hard-coding it per call site.

use serde_json::{Map, Value};

/// When an optional parameter is dropped from the outgoing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Elide {
    /// Drop the field when its value is falsy: null, `false`, `0`, an empty
    /// string, or an empty array/object. The default policy.
    IfFalsy,
    /// Drop the field only when its value is null. Fields where `0` or
    /// `false` are meaningful (child counts, boolean toggles the provider
    /// defaults differently) use this policy.
    IfNone,
}

/// True for values the default policy elides.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Merge required and optional parameters into one request map.
///
/// Required entries are always kept, whatever their value. Optional entries
/// are kept or dropped according to their policy: fields named in
/// `none_check_fields` use [`Elide::IfNone`], all others [`Elide::IfFalsy`].
/// The inputs are not mutated.
#[must_use]
pub fn build_optional_params(
    required: &Map<String, Value>,
    optional: &Map<String, Value>,
    none_check_fields: &[&str],
) -> Map<String, Value> {
    let mut params = required.clone();
    for (name, value) in optional {
        let policy = if none_check_fields.contains(&name.as_str()) {
            Elide::IfNone
        } else {
            Elide::IfFalsy
        };
        let keep = match policy {
            Elide::IfFalsy => !is_falsy(value),
            Elide::IfNone => !value.is_null(),
        };
        if keep {
            params.insert(name.clone(), value.clone());
        }
    }
    params
}
