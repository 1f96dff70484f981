use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A dated record as handed over by the caller.
///
/// Dates stay raw until clipping so that a malformed record is skipped
/// instead of failing the whole load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Interval {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,

    #[serde(default, alias = "start_date", deserialize_with = "deserialize_raw_date")]
    pub start_date: Option<String>,

    #[serde(default, alias = "end_date", deserialize_with = "deserialize_raw_date")]
    pub end_date: Option<String>,

    #[serde(default, alias = "is_deleted")]
    pub is_deleted: bool,

    #[serde(default)]
    pub payload: Value,
}

impl Interval {
    pub fn new(id: impl Into<String>, start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            start_date: Some(start.into()),
            end_date: Some(end.into()),
            is_deleted: false,
            payload: Value::Null,
        }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    pub fn deleted(mut self) -> Self {
        self.is_deleted = true;
        self
    }

    /// String field of an object payload, if present and non-blank.
    pub fn payload_str(&self, field: &str) -> Option<&str> {
        self.payload
            .get(field)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "interval id must be a string or number, got {other}"
        ))),
    }
}

// Non-string dates are kept as their JSON text so they fail to parse later
// and get skipped like any other unparsable value.
fn deserialize_raw_date<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}
