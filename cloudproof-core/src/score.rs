//! Coercion of untrusted score values.

use serde_json::Value;

/// Coerce a raw JSON score into a non-negative integer.
///
/// Numbers and numeric strings are accepted; booleans count as 1 or 0.
/// Anything else, or any non-finite result, becomes 0. Fractions truncate
/// toward zero and negative values clamp to 0.
pub fn normalize_score(raw: &Value) -> u64 {
    let number = match raw {
        Value::Number(number) => {
            if let Some(value) = number.as_u64() {
                return value;
            }
            number.as_f64().unwrap_or(0.0)
        }
        Value::String(text) => parse_numeric_text(text),
        Value::Bool(flag) => f64::from(u8::from(*flag)),
        Value::Null | Value::Array(_) | Value::Object(_) => 0.0,
    };
    clamp_to_u64(number)
}

fn parse_numeric_text(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse::<f64>().unwrap_or(0.0)
}

fn clamp_to_u64(number: f64) -> u64 {
    if !number.is_finite() || number <= 0.0 {
        return 0;
    }
    // Float-to-int `as` truncates and saturates at u64::MAX.
    number as u64
}
