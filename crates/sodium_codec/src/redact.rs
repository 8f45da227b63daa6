//! Redaction policy for data leaving the live backend.

use crate::collection::Collection;
use crate::database::Database;
use crate::record::Record;
use serde_json::Value;

/// The marker written in place of a sensitive value.
pub const REDACTED: &str = "[REDACTED]";

/// Redacts sensitive fields across a database, in place.
///
/// Currently this means users' `password` fields; every export and backup
/// path applies this before serializing.
pub fn redact_database(db: &mut Database) {
    for record in db.records_mut(Collection::Users) {
        if record.get("password").is_some() {
            record.set("password", Value::String(REDACTED.to_string()));
        }
    }
}

/// Redacts secrets inside the panel configuration document, in place.
///
/// Covers the secret-bearing sub-objects the panel writes: `jwt.secret`,
/// `database.password`, and `redis.password`.
pub fn redact_config(config: &mut Value) {
    for (section, field) in [("jwt", "secret"), ("database", "password"), ("redis", "password")] {
        if let Some(Value::Object(sub)) = config.get_mut(section) {
            if sub.contains_key(field) {
                sub.insert(field.to_string(), Value::String(REDACTED.to_string()));
            }
        }
    }
}

/// Whether a `users` record is safe to import.
///
/// A user whose password is missing or redacted carries known-broken
/// credentials; import tooling refuses such records.
#[must_use]
pub fn is_importable_user(record: &Record) -> bool {
    matches!(record.get("password"), Some(Value::String(p)) if p != REDACTED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        Record::from_value(value).unwrap()
    }

    #[test]
    fn user_passwords_are_redacted() {
        let mut db = Database::new();
        db.records_mut(Collection::Users)
            .push(record(json!({"id": "u1", "password": "secret"})));
        db.records_mut(Collection::Users)
            .push(record(json!({"id": "u2"})));

        redact_database(&mut db);

        let users = db.records(Collection::Users);
        assert_eq!(users[0].get("password"), Some(&json!(REDACTED)));
        assert!(users[1].get("password").is_none());
    }

    #[test]
    fn config_secrets_are_redacted() {
        let mut config = json!({
            "panel": {"name": "Sodium"},
            "jwt": {"secret": "abc", "expiry": "7d"},
            "database": {"password": "hunter2", "host": "db"},
            "redis": {"password": "r"},
        });
        redact_config(&mut config);

        assert_eq!(config["jwt"]["secret"], json!(REDACTED));
        assert_eq!(config["jwt"]["expiry"], json!("7d"));
        assert_eq!(config["database"]["password"], json!(REDACTED));
        assert_eq!(config["database"]["host"], json!("db"));
        assert_eq!(config["redis"]["password"], json!(REDACTED));
        assert_eq!(config["panel"]["name"], json!("Sodium"));
    }

    #[test]
    fn importable_user_requires_real_password() {
        assert!(is_importable_user(&record(json!({"id": "a", "password": "hash"}))));
        assert!(!is_importable_user(&record(json!({"id": "b", "password": REDACTED}))));
        assert!(!is_importable_user(&record(json!({"id": "c"}))));
        assert!(!is_importable_user(&record(json!({"id": "d", "password": 42}))));
    }
}
