//! App-settings commands
//!
//! Settings live in the single-row JSON blob that the pipeline reads its
//! configuration from. `set` parses the value as JSON first so lists and
//! numbers round-trip; anything unparsable is stored as a plain string.

use anyhow::Result;
use serde_json::Value;
use smsledger_core::db::Database;

/// Keys whose values are redacted in listings
const SECRET_KEYS: [&str; 1] = ["openaiApiKey"];

pub fn cmd_settings_list(db: &Database) -> Result<()> {
    let settings = db.get_settings()?;
    let Some(map) = settings.as_object() else {
        println!("Settings blob is not an object");
        return Ok(());
    };

    if map.is_empty() {
        println!("No settings. Set one: smsledger settings set openaiApiKey sk-...");
        return Ok(());
    }

    println!("Settings:");
    for (key, value) in map {
        if SECRET_KEYS.contains(&key.as_str()) {
            println!("  {} = <redacted>", key);
        } else {
            println!("  {} = {}", key, value);
        }
    }
    Ok(())
}

pub fn cmd_settings_get(db: &Database, key: &str) -> Result<()> {
    match db.get_setting(key)? {
        Some(value) => println!("{}", value),
        None => println!("(not set)"),
    }
    Ok(())
}

pub fn cmd_settings_set(db: &Database, key: &str, value: &str) -> Result<()> {
    // JSON values (lists, numbers, objects) pass through; fall back to string
    let parsed: Value = serde_json::from_str(value).unwrap_or(Value::String(value.to_string()));
    db.set_setting(key, parsed)?;
    println!("✅ Set {}", key);
    Ok(())
}
