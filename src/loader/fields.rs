// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-multipath-synth project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Field extraction helpers for the JSON documents
//!
//! Numeric sequences may appear as arrays, bare scalars (broadcast to a
//! length-1 sequence), numeric strings, or be omitted / `null` (empty).

use serde_json::Value;

use crate::error::{Result, SynthError};

/// Look up a required key on a JSON object
pub fn required<'a>(document: &str, object: &'a Value, key: &str, context: &str) -> Result<&'a Value> {
    match object {
        Value::Object(map) => map
            .get(key)
            .ok_or_else(|| SynthError::malformed(document, format!("{context}: missing field `{key}`"))),
        other => Err(SynthError::malformed(
            document,
            format!("{context}: expected an object, found {}", kind(other)),
        )),
    }
}

/// Look up an optional key; absent and `null` both yield `None`
pub fn optional<'a>(document: &str, object: &'a Value, key: &str, context: &str) -> Result<Option<&'a Value>> {
    match object {
        Value::Object(map) => Ok(map.get(key).filter(|v| !v.is_null())),
        other => Err(SynthError::malformed(
            document,
            format!("{context}: expected an object, found {}", kind(other)),
        )),
    }
}

/// Parse a numeric sequence, broadcasting scalars and mapping `null` to empty
pub fn numeric_sequence(document: &str, value: Option<&Value>, context: &str) -> Result<Vec<f64>> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| number(document, item, &format!("{context}[{i}]")))
            .collect(),
        Some(single) => Ok(vec![number(document, single, context)?]),
    }
}

/// Parse a scalar numeric field; a one-element array is accepted as well
pub fn scalar(document: &str, value: &Value, context: &str) -> Result<f64> {
    match value {
        Value::Array(items) if items.len() == 1 => number(document, &items[0], context),
        other => number(document, other, context),
    }
}

fn number(document: &str, value: &Value, context: &str) -> Result<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| {
        SynthError::malformed(
            document,
            format!("{context}: expected a number, found {}", kind(value)),
        )
    })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a non-numeric string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
