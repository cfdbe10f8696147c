// SPDX-License-Identifier: MIT

//! Normalization of numeric-looking applicant fields
//!
//! Parsed fields arrive from an LLM and may be numbers, strings with
//! thousands separators ("12,500"), or lists (family members). The
//! eligibility stage needs plain numbers.

use serde_json::Value;

/// Coerce a field value into a number.
///
/// Numbers pass through unchanged; strings are reduced to their first
/// run of digits after stripping separators; lists count their elements;
/// anything unparsable is 0.
pub fn to_f64(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => parse_numeric_text(s),
        Value::Array(items) => items.len() as f64,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}

/// Parse a free-form numeric string: strip separator characters, take
/// the first contiguous run of digits. Unparsable input yields 0.
pub fn parse_numeric_text(text: &str) -> f64 {
    let stripped: String = text.chars().filter(|c| *c != ',' && *c != '_').collect();

    let mut digits = String::new();
    for c in stripped.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
        } else if !digits.is_empty() {
            break;
        }
    }

    digits.parse().unwrap_or(0.0)
}
