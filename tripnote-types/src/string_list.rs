use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A list of strings that tolerates loosely typed input.
///
/// Clients send accommodation names and transport methods either as a JSON
/// array, as one comma-separated string, or as a single scalar. All of those
/// shapes deserialize into the same `Vec<String>`:
///
/// * array: every element becomes a string (non-string elements use their JSON text)
/// * string: split on `,`, trimmed, empty pieces dropped
/// * `null`: empty list
/// * any other scalar or object: a single-element list with its JSON text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StringList(pub Vec<String>);

impl StringList {
    pub fn from_value(value: Value) -> Self {
        let items = match value {
            Value::Null => Vec::new(),
            Value::Array(items) => items.into_iter().map(scalar_to_string).collect(),
            Value::String(s) => s
                .split(',')
                .map(str::trim)
                .filter(|piece| !piece.is_empty())
                .map(str::to_string)
                .collect(),
            other => vec![scalar_to_string(other)],
        };
        StringList(items)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

fn scalar_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

impl<'de> Deserialize<'de> for StringList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(StringList::from_value(value))
    }
}
