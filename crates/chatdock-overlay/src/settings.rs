use std::collections::HashMap;

use serde_json::Value;

/// Setting key holding the dark theme flag
pub const DARK_MODE_KEY: &str = "darkMode";

/// Read-only access to application settings.
pub trait SettingsSource: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;

    /// Missing or non-boolean values count as light mode.
    fn dark_mode(&self) -> bool {
        self.get(DARK_MODE_KEY)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }
}

impl SettingsSource for HashMap<String, Value> {
    fn get(&self, key: &str) -> Option<Value> {
        HashMap::get(self, key).cloned()
    }
}

impl SettingsSource for serde_json::Map<String, Value> {
    fn get(&self, key: &str) -> Option<Value> {
        serde_json::Map::get(self, key).cloned()
    }
}
