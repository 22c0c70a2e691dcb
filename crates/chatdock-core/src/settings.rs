use serde_json::Value;
use tauri::AppHandle;
use tauri_plugin_store::StoreExt;
use tracing::warn;

use chatdock_overlay::SettingsSource;

/// Application settings backed by a `tauri-plugin-store` JSON store
pub struct StoreSettings {
    app: AppHandle,
    path: String,
}

impl StoreSettings {
    pub fn new(app: AppHandle, path: impl Into<String>) -> Self {
        Self {
            app,
            path: path.into(),
        }
    }
}

impl SettingsSource for StoreSettings {
    fn get(&self, key: &str) -> Option<Value> {
        match self.app.store(&self.path) {
            Ok(store) => store.get(key),
            Err(e) => {
                warn!(store = %self.path, "Failed to open settings store: {}", e);
                None
            }
        }
    }
}
