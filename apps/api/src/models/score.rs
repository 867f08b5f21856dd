//! 0–100 score parsing shared by every model-produced scorecard.
//!
//! Models return scores as integers, floats, numeric strings ("85", "85%")
//! or occasionally out of range. Every score is rounded and clamped here.

use serde::{de, Deserialize, Deserializer};
use serde_json::Value;

pub const MAX_SCORE: u8 = 100;

/// Rounds and clamps a raw score into 0..=100. NaN maps to 0.
pub fn clamp_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, MAX_SCORE as f64) as u8
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Required score: rejects null and non-numeric values.
pub fn deserialize_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    numeric(&value)
        .map(clamp_score)
        .ok_or_else(|| de::Error::custom(format!("expected a numeric score, got {value}")))
}

/// Lenient score: null or non-numeric values become 0.
pub fn deserialize_score_or_zero<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(numeric(&value).map(clamp_score).unwrap_or(0))
}
