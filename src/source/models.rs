use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Sensor label keys, highest precedence first.
const SENSOR_NAME_KEYS: [&str; 3] = ["sensorName", "sensor_name", "sensor"];

/// One reading as returned by the readings API (wire format).
///
/// Mirrors the JSON payload loosely: metric fields are collected into
/// `fields` and only interpreted at ingestion, so a missing or mistyped
/// metric never rejects the whole reading.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RawReading {
    pub sensor_name: Option<String>,

    /// `"DD/MM/YYYY, HH:MM:SS"`, formatted upstream.
    pub timestamp: Option<String>,

    #[serde(flatten)]
    pub fields: HashMap<String, Value>,
}

impl RawReading {
    /// Build from one JSON object. The first non-blank sensor label in
    /// `sensorName`, `sensor_name`, `sensor` order wins.
    #[must_use]
    pub fn from_object(mut object: Map<String, Value>) -> Self {
        let sensor_name = SENSOR_NAME_KEYS
            .iter()
            .filter_map(|key| object.remove(*key))
            .fold(None, |found, value| {
                found.or_else(|| lenient_string(value).filter(|s| !s.trim().is_empty()))
            });
        let timestamp = object.remove("timestamp").and_then(lenient_string);

        Self {
            sensor_name,
            timestamp,
            fields: object.into_iter().collect(),
        }
    }

    /// Numeric value of a field; numeric strings are accepted.
    #[must_use]
    pub fn number(&self, key: &str) -> Option<f64> {
        match self.fields.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().replace(',', ".").parse().ok(),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for RawReading {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Map::deserialize(deserializer).map(Self::from_object)
    }
}

/// Decode a readings array element by element.
///
/// Only a body that is not a JSON array fails. Elements that are not
/// objects are dropped with a warning so the rest of the batch survives.
///
/// # Errors
///
/// Returns the parse error when `text` is not a JSON array.
pub fn decode_batch(text: &str) -> Result<Vec<RawReading>, serde_json::Error> {
    let elements: Vec<Value> = serde_json::from_str(text)?;
    let total = elements.len();

    let batch: Vec<RawReading> = elements
        .into_iter()
        .enumerate()
        .filter_map(|(position, element)| match element {
            Value::Object(object) => Some(RawReading::from_object(object)),
            other => {
                tracing::warn!(
                    position,
                    kind = json_kind(&other),
                    "Dropping non-object reading"
                );
                None
            }
        })
        .collect();

    if batch.len() < total {
        tracing::warn!(kept = batch.len(), total, "Readings batch partially decoded");
    }
    Ok(batch)
}

/// Strings pass through, numbers are rendered, anything else is absent.
fn lenient_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
