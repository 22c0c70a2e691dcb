pub mod commands;
pub mod error;
pub mod logging;
pub mod overlay;
pub mod settings;

pub use commands::*;
pub use error::*;
pub use overlay::*;
pub use settings::*;

use std::sync::Arc;

use chatdock_overlay::{OverlayConfig, OverlayManager};
use tauri::{
    Manager, Wry,
    plugin::{Builder, TauriPlugin},
};
use tracing::{info, warn};

pub const PLUGIN_NAME: &str = "chatdock";

/// Event every relayed message is emitted on. The relay channel travels in
/// the payload (`{ channel, payload }`), so channel names are not bound by
/// Tauri's event name rules.
pub const RELAY_EVENT: &str = "chatdock://relay";

/// Label of the application's main window
pub const MAIN_WINDOW_LABEL: &str = "main";

/// `tauri-plugin-store` file holding the application settings
pub const SETTINGS_STORE: &str = "settings.json";

/// Overlay config file, looked up in the app config directory
pub const CONFIG_FILE: &str = "overlay.json";

/// Plugin with the overlay config read from the app config directory.
///
/// Requires `tauri-plugin-store` to be registered for the `darkMode` setting.
pub fn init() -> TauriPlugin<Wry> {
    build(None)
}

pub fn init_with_config(config: OverlayConfig) -> TauriPlugin<Wry> {
    build(Some(config))
}

fn build(config: Option<OverlayConfig>) -> TauriPlugin<Wry> {
    Builder::<Wry, ()>::new(PLUGIN_NAME)
        .invoke_handler(tauri::generate_handler![
            commands::open_overlay,
            commands::relay_message,
            commands::list_overlay_routes
        ])
        .setup(move |app, _api| {
            let config = match config {
                Some(config) => config,
                None => load_config(app.app_handle()),
            }
            .with_env_overrides();

            info!(
                document = %config.document,
                dev_mode = config.dev_mode,
                relay_policy = ?config.relay_policy,
                "Overlay support ready"
            );

            let host = TauriHost::new(app.app_handle().clone(), MAIN_WINDOW_LABEL);
            let settings = Arc::new(StoreSettings::new(
                app.app_handle().clone(),
                SETTINGS_STORE,
            ));
            let manager = OverlayManager::new(host, settings, config);
            app.manage(OverlayState(manager));

            Ok(())
        })
        .build()
}

fn load_config(app: &tauri::AppHandle) -> OverlayConfig {
    let path = match app.path().app_config_dir() {
        Ok(dir) => dir.join(CONFIG_FILE),
        Err(e) => {
            warn!("No app config directory, using default overlay config: {}", e);
            return OverlayConfig::default();
        }
    };

    OverlayConfig::load(&path).unwrap_or_else(|e| {
        warn!(path = %path.display(), "Failed to load overlay config: {}", e);
        OverlayConfig::default()
    })
}
