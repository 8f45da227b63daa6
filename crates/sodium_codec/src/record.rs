//! Schemaless record type.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single document in a collection.
///
/// Records are JSON objects with no enforced schema beyond the convention
/// that an `id` field identifies the record within its collection. Field
/// sets vary freely per collection; uniqueness of `id` is a caller contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Wraps a JSON object map as a record.
    #[must_use]
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Converts a JSON value into a record.
    ///
    /// Returns `None` if the value is not an object; non-object entries in
    /// decoded data are treated as corrupt and dropped by callers.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Returns the record's identifier, if it has a string `id` field.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    /// Returns a field value.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Sets a field value, replacing any existing value.
    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.0.insert(field.into(), value);
    }

    /// Shallow-merges `updates` into this record.
    ///
    /// Fields present in `updates` overwrite the existing value wholesale
    /// (no recursive merge); fields absent from `updates` are preserved.
    pub fn merge(&mut self, updates: Map<String, Value>) {
        for (key, value) in updates {
            self.0.insert(key, value);
        }
    }

    /// Splits the record into `(id, payload)` for relational storage.
    ///
    /// The payload is the record serialized *without* its `id` field; the
    /// identifier lives in the table's primary-key column and is re-merged
    /// on read. Returns `None` if the record has no string `id`.
    #[must_use]
    pub fn split_for_row(&self) -> Option<(String, String)> {
        let id = self.id()?.to_string();
        let mut payload = self.0.clone();
        payload.remove("id");
        // Map<String, Value> serialization cannot fail.
        let json = serde_json::to_string(&Value::Object(payload)).ok()?;
        Some((id, json))
    }

    /// Rebuilds a record from a relational row's `(id, payload)` pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not a JSON object.
    pub fn from_row(id: &str, payload: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(payload)?;
        let mut map = match value {
            Value::Object(map) => map,
            _ => {
                return Err(serde::de::Error::custom("row payload is not a JSON object"));
            }
        };
        map.insert("id".to_string(), Value::String(id.to_string()));
        Ok(Self(map))
    }

    /// Borrows the underlying field map.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consumes the record, returning the underlying field map.
    #[must_use]
    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Object(record.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        Record::from_value(value).unwrap()
    }

    #[test]
    fn from_value_rejects_non_objects() {
        assert!(Record::from_value(json!("a string")).is_none());
        assert!(Record::from_value(json!([1, 2, 3])).is_none());
        assert!(Record::from_value(json!(null)).is_none());
    }

    #[test]
    fn id_requires_string() {
        assert_eq!(record(json!({"id": "abc"})).id(), Some("abc"));
        assert_eq!(record(json!({"id": 7})).id(), None);
        assert_eq!(record(json!({"name": "x"})).id(), None);
    }

    #[test]
    fn merge_is_shallow() {
        let mut r = record(json!({"id": "a", "limits": {"memory": 512}, "name": "old"}));
        let updates = match json!({"name": "new", "limits": {"cpu": 100}}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        r.merge(updates);

        assert_eq!(r.get("name"), Some(&json!("new")));
        assert_eq!(r.id(), Some("a"));
        // The nested object is replaced, not deep-merged.
        assert_eq!(r.get("limits"), Some(&json!({"cpu": 100})));
    }

    #[test]
    fn row_split_and_rejoin() {
        let r = record(json!({"id": "n1", "fqdn": "node.example.com", "memory": 4096}));
        let (id, payload) = r.split_for_row().unwrap();
        assert_eq!(id, "n1");

        let payload_value: Value = serde_json::from_str(&payload).unwrap();
        assert!(payload_value.get("id").is_none());

        let rebuilt = Record::from_row(&id, &payload).unwrap();
        assert_eq!(rebuilt, r);
    }

    #[test]
    fn split_without_id_fails() {
        assert!(record(json!({"name": "anonymous"})).split_for_row().is_none());
    }

    #[test]
    fn from_row_rejects_non_object_payload() {
        assert!(Record::from_row("x", "[1,2]").is_err());
        assert!(Record::from_row("x", "not json").is_err());
    }
}
