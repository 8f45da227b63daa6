//! SQL export targeting a Pterodactyl schema.
//!
//! Pterodactyl uses auto-increment integer primary keys, so every record is
//! remapped from its string id to its 1-based position within its
//! collection. Foreign keys (node locations, egg nests, server owners) are
//! resolved through the same position maps, falling back to `1` when the
//! referenced record is missing.

use chrono::Utc;
use rand::RngCore;
use serde_json::Value;
use sodium_codec::{decode_database, Collection, Database, Record};
use sodium_store::DB_FILE_NAME;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Emits INSERT statements for an empty Pterodactyl database.
pub fn run(data_dir: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Sodium to Pterodactyl Export");

    let db = read_strict(data_dir)?;
    let sql = generate_sql(&db);

    match output {
        Some(path) => {
            fs::write(path, &sql)?;
            eprintln!("✓ Exported to {}", path.display());
        }
        None => {
            println!("{sql}");
            eprintln!("✓ SQL generated (stdout)");
        }
    }

    for collection in [
        Collection::Users,
        Collection::Nodes,
        Collection::Servers,
        Collection::Nests,
        Collection::Eggs,
    ] {
        eprintln!("  {collection}: {}", db.records(collection).len());
    }

    Ok(())
}

/// Reads the container, treating a missing or unrecognized file as fatal.
///
/// An export against an absent dataset would silently produce an empty SQL
/// script, so unlike the other commands this one refuses to run.
fn read_strict(data_dir: &Path) -> Result<Database, Box<dyn std::error::Error>> {
    let path = data_dir.join(DB_FILE_NAME);
    let bytes =
        fs::read(&path).map_err(|err| format!("no Sodium database at {}: {err}", path.display()))?;
    let report = decode_database(&bytes)?;
    Ok(report.database)
}

fn generate_sql(db: &Database) -> String {
    let locations = db.records(Collection::Locations);
    let nodes = db.records(Collection::Nodes);
    let nests = db.records(Collection::Nests);
    let eggs = db.records(Collection::Eggs);
    let users = db.records(Collection::Users);
    let servers = db.records(Collection::Servers);

    let location_ids = position_map(locations);
    let node_ids = position_map(nodes);
    let nest_ids = position_map(nests);
    let egg_ids = position_map(eggs);
    let user_ids = position_map(users);

    let mut sql = String::new();
    let _ = writeln!(sql, "-- Sodium to Pterodactyl Export");
    let _ = writeln!(sql, "-- Generated: {}", Utc::now().to_rfc3339());
    let _ = writeln!(sql, "-- WARNING: Run this on an empty Pterodactyl database");
    sql.push('\n');
    sql.push_str("SET FOREIGN_KEY_CHECKS=0;\n\n");

    sql.push_str("-- Locations\n");
    for (i, l) in locations.iter().enumerate() {
        let short = text(l, "short");
        let long = text_or_field(l, "long", "short");
        let _ = writeln!(
            sql,
            "INSERT INTO locations (id, short, long, created_at, updated_at) VALUES \
             ({}, {short}, {long}, NOW(), NOW());",
            i + 1
        );
    }

    sql.push_str("\n-- Nodes\n");
    for (i, n) in nodes.iter().enumerate() {
        let location_id = resolve(n, "location_id", &location_ids);
        let token_id = text_or(n, "daemon_token_id", &hex_token(8));
        let token = text_or(n, "daemon_token", &hex_token(32));
        let _ = writeln!(
            sql,
            "INSERT INTO nodes (id, uuid, public, name, description, location_id, fqdn, \
             scheme, behind_proxy, maintenance_mode, memory, memory_overallocate, disk, \
             disk_overallocate, daemon_token_id, daemon_token, daemon_listen, daemon_sftp, \
             daemon_base, created_at, updated_at) VALUES \
             ({}, {}, 1, {}, {}, {location_id}, {}, {}, 0, {}, {}, 0, {}, 0, {token_id}, \
             {token}, {}, {}, '/var/lib/pterodactyl/volumes', NOW(), NOW());",
            i + 1,
            quote(n.id().unwrap_or_default()),
            text(n, "name"),
            text(n, "description"),
            text(n, "fqdn"),
            text_or(n, "scheme", "https"),
            flag(n, "maintenance_mode"),
            int_or(n, "memory", 1024),
            int_or(n, "disk", 10240),
            int_or(n, "daemon_port", 8080),
            int_or(n, "daemon_sftp_port", 2022),
        );
    }

    sql.push_str("\n-- Nests\n");
    for (i, n) in nests.iter().enumerate() {
        let _ = writeln!(
            sql,
            "INSERT INTO nests (id, uuid, author, name, description, created_at, updated_at) \
             VALUES ({}, {}, 'support@pterodactyl.io', {}, {}, NOW(), NOW());",
            i + 1,
            quote(n.id().unwrap_or_default()),
            text(n, "name"),
            text(n, "description"),
        );
    }

    sql.push_str("\n-- Eggs\n");
    for (i, e) in eggs.iter().enumerate() {
        let nest_id = resolve(e, "nest_id", &nest_ids);
        let docker_images = json_field(e, "docker_images");
        let config_startup = json_config(e, "startup");
        let config_files = json_config(e, "files");
        let config_stop = e
            .get("config")
            .and_then(|c| c.get("stop"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or("stop");
        let _ = writeln!(
            sql,
            "INSERT INTO eggs (id, uuid, nest_id, author, name, description, docker_images, \
             startup, config_from, config_stop, config_startup, config_files, config_logs, \
             script_container, script_entry, script_install, created_at, updated_at) VALUES \
             ({}, {}, {nest_id}, 'support@pterodactyl.io', {}, {}, {docker_images}, {}, NULL, \
             {}, {config_startup}, {config_files}, '{{}}', {}, {}, {}, NOW(), NOW());",
            i + 1,
            quote(e.id().unwrap_or_default()),
            text(e, "name"),
            text(e, "description"),
            text(e, "startup"),
            quote(config_stop),
            text_or(e, "install_container", "alpine:3.4"),
            text_or(e, "install_entrypoint", "ash"),
            text(e, "install_script"),
        );

        let Some(variables) = e.get("variables").and_then(Value::as_array) else {
            continue;
        };
        for v in variables {
            let _ = writeln!(
                sql,
                "INSERT INTO egg_variables (egg_id, name, description, env_variable, \
                 default_value, user_viewable, user_editable, rules, created_at, updated_at) \
                 VALUES ({}, {}, {}, {}, {}, {}, {}, {}, NOW(), NOW());",
                i + 1,
                value_str(v.get("name")),
                value_str(v.get("description")),
                value_str(v.get("env_variable")),
                value_str(v.get("default_value")),
                u8::from(v.get("user_viewable").and_then(Value::as_bool).unwrap_or(false)),
                u8::from(v.get("user_editable").and_then(Value::as_bool).unwrap_or(false)),
                quote(
                    v.get("rules")
                        .and_then(Value::as_str)
                        .filter(|s| !s.is_empty())
                        .unwrap_or("nullable|string")
                ),
            );
        }
    }

    sql.push_str("\n-- Users\n");
    for (i, u) in users.iter().enumerate() {
        let _ = writeln!(
            sql,
            "INSERT INTO users (id, uuid, username, email, password, root_admin, use_totp, \
             created_at, updated_at) VALUES ({}, {}, {}, {}, {}, {}, 0, NOW(), NOW());",
            i + 1,
            quote(u.id().unwrap_or_default()),
            text(u, "username"),
            text(u, "email"),
            text(u, "password"),
            flag(u, "isAdmin"),
        );
    }

    sql.push_str("\n-- Servers\n");
    for (i, s) in servers.iter().enumerate() {
        let id = s.id().unwrap_or_default();
        let uuid_short = id.get(..8).unwrap_or(id);
        let owner_id = resolve(s, "user_id", &user_ids);
        let node_id = resolve(s, "node_id", &node_ids);
        let egg_id = resolve(s, "egg_id", &egg_ids);
        let limits = s.get("limits");
        let _ = writeln!(
            sql,
            "INSERT INTO servers (id, uuid, uuidShort, node_id, name, description, status, \
             owner_id, memory, swap, disk, io, cpu, oom_disabled, allocation_id, nest_id, \
             egg_id, startup, image, created_at, updated_at) VALUES \
             ({}, {}, {}, {node_id}, {}, {}, {}, {owner_id}, {}, 0, {}, {}, {}, 0, NULL, 1, \
             {egg_id}, {}, {}, NOW(), NOW());",
            i + 1,
            quote(id),
            quote(uuid_short),
            text(s, "name"),
            text(s, "description"),
            text_or(s, "status", "offline"),
            limit_or(limits, "memory", 1024),
            limit_or(limits, "disk", 5120),
            limit_or(limits, "io", 500),
            limit_or(limits, "cpu", 100),
            text(s, "startup"),
            text(s, "docker_image"),
        );
    }

    sql.push_str("\nSET FOREIGN_KEY_CHECKS=1;\n");
    sql
}

/// String id to 1-based position for each record in the slice.
fn position_map(records: &[Record]) -> HashMap<&str, usize> {
    records
        .iter()
        .enumerate()
        .filter_map(|(i, r)| r.id().map(|id| (id, i + 1)))
        .collect()
}

/// Looks up the record the `key` field points at, defaulting to 1.
fn resolve(record: &Record, key: &str, map: &HashMap<&str, usize>) -> usize {
    record
        .get(key)
        .and_then(Value::as_str)
        .and_then(|id| map.get(id).copied())
        .unwrap_or(1)
}

fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''").replace('\\', "\\\\"))
}

fn text(record: &Record, key: &str) -> String {
    quote(record.get(key).and_then(Value::as_str).unwrap_or(""))
}

fn text_or(record: &Record, key: &str, default: &str) -> String {
    quote(
        record
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(default),
    )
}

/// Like [`text_or`], but the fallback is another field of the same record.
fn text_or_field(record: &Record, key: &str, fallback_key: &str) -> String {
    match record.get(key).and_then(Value::as_str).filter(|s| !s.is_empty()) {
        Some(s) => quote(s),
        None => text(record, fallback_key),
    }
}

fn value_str(value: Option<&Value>) -> String {
    quote(value.and_then(Value::as_str).unwrap_or(""))
}

fn int_or(record: &Record, key: &str, default: i64) -> i64 {
    record
        .get(key)
        .and_then(Value::as_i64)
        .filter(|v| *v != 0)
        .unwrap_or(default)
}

fn limit_or(limits: Option<&Value>, key: &str, default: i64) -> i64 {
    limits
        .and_then(|l| l.get(key))
        .and_then(Value::as_i64)
        .filter(|v| *v != 0)
        .unwrap_or(default)
}

fn flag(record: &Record, key: &str) -> u8 {
    u8::from(record.get(key).and_then(Value::as_bool).unwrap_or(false))
}

/// Serializes an object-valued field to a quoted JSON literal, `{}` when
/// absent.
fn json_field(record: &Record, key: &str) -> String {
    let value = record
        .get(key)
        .cloned()
        .unwrap_or_else(|| Value::Object(serde_json::Map::new()));
    quote(&value.to_string())
}

fn json_config(record: &Record, key: &str) -> String {
    let value = record
        .get("config")
        .and_then(|c| c.get(key))
        .cloned()
        .unwrap_or_else(|| Value::Object(serde_json::Map::new()));
    quote(&value.to_string())
}

fn hex_token(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::thread_rng().fill_bytes(&mut buf);
    buf.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sodium_codec::encode_database;
    use tempfile::tempdir;

    fn record(value: serde_json::Value) -> Record {
        Record::from_value(value).unwrap()
    }

    fn sample_db() -> Database {
        let mut db = Database::new();
        db.records_mut(Collection::Locations).push(record(serde_json::json!({
            "id": "loc-a", "short": "eu",
        })));
        db.records_mut(Collection::Locations).push(record(serde_json::json!({
            "id": "loc-b", "short": "us", "long": "US East",
        })));
        db.records_mut(Collection::Nodes).push(record(serde_json::json!({
            "id": "node-1", "name": "n1", "fqdn": "n1.example.com",
            "location_id": "loc-b", "daemon_token_id": "tid", "daemon_token": "tok",
        })));
        db.records_mut(Collection::Users).push(record(serde_json::json!({
            "id": "user-1", "username": "bob's", "email": "bob@example.com",
            "password": "$2b$hash", "isAdmin": true,
        })));
        db.records_mut(Collection::Servers).push(record(serde_json::json!({
            "id": "abcdef0123456789", "name": "game", "user_id": "user-1",
            "node_id": "node-1", "egg_id": "missing",
            "limits": {"memory": 2048},
        })));
        db
    }

    #[test]
    fn foreign_keys_remap_to_positions() {
        let sql = generate_sql(&sample_db());

        // loc-b is the second location, so the node points at 2.
        assert!(sql.contains("'n1.example.com', 'https', 0, 0, 1024, 0, 10240"));
        let node_line = sql.lines().find(|l| l.contains("INSERT INTO nodes")).unwrap();
        assert!(node_line.contains(", 2, 'n1.example.com'"));

        // Missing egg reference falls back to 1; owner remaps to user 1.
        let server_line = sql.lines().find(|l| l.contains("INSERT INTO servers")).unwrap();
        assert!(server_line.contains("'abcdef01'"));
        assert!(server_line.contains("2048, 0, 5120, 500, 100"));
    }

    #[test]
    fn quoting_doubles_single_quotes() {
        let sql = generate_sql(&sample_db());
        assert!(sql.contains("'bob''s'"));
    }

    #[test]
    fn wraps_statements_in_fk_guard() {
        let sql = generate_sql(&sample_db());
        assert!(sql.starts_with("-- Sodium to Pterodactyl Export"));
        assert!(sql.contains("SET FOREIGN_KEY_CHECKS=0;"));
        assert!(sql.trim_end().ends_with("SET FOREIGN_KEY_CHECKS=1;"));
    }

    #[test]
    fn refuses_to_run_without_a_container() {
        let dir = tempdir().unwrap();
        assert!(run(dir.path(), None).is_err());
    }

    #[test]
    fn writes_sql_to_file() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(DB_FILE_NAME),
            encode_database(&sample_db()).unwrap(),
        )
        .unwrap();

        let out = dir.path().join("ptero.sql");
        run(dir.path(), Some(&out)).unwrap();
        let sql = fs::read_to_string(&out).unwrap();
        assert!(sql.contains("INSERT INTO locations"));
        assert!(sql.contains("INSERT INTO users"));
    }
}
