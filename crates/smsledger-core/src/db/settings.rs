//! App-settings blob operations
//!
//! Settings live in a single JSON row, matching the shape the mobile app
//! stores them in: `{"openaiApiKey": "...", "smsSenderKeywords": [...], ...}`.

use rusqlite::params;
use serde_json::Value;

use super::Database;
use crate::error::{Error, Result};

impl Database {
    /// Read the settings blob
    pub fn get_settings(&self) -> Result<Value> {
        let conn = self.conn()?;
        let raw: String = conn.query_row("SELECT data FROM app_settings WHERE id = 1", [], |row| {
            row.get(0)
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Replace the settings blob
    pub fn set_settings(&self, settings: &Value) -> Result<()> {
        if !settings.is_object() {
            return Err(Error::InvalidData(
                "Settings blob must be a JSON object".into(),
            ));
        }
        let conn = self.conn()?;
        conn.execute(
            "UPDATE app_settings SET data = ? WHERE id = 1",
            params![settings.to_string()],
        )?;
        Ok(())
    }

    /// Set one settings key, keeping the rest of the blob intact
    pub fn set_setting(&self, key: &str, value: Value) -> Result<()> {
        let mut settings = self.get_settings()?;
        let Some(map) = settings.as_object_mut() else {
            return Err(Error::InvalidData("Settings blob is not an object".into()));
        };
        map.insert(key.to_string(), value);
        self.set_settings(&settings)
    }

    /// Read one settings key
    pub fn get_setting(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.get_settings()?.get(key).cloned())
    }
}
