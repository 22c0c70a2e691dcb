use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chatdock_overlay::{ContentId, Error, OverlayWindow, WindowHost, WindowSpec};
use tauri::{
    AppHandle, Manager, Url, WebviewUrl, WebviewWindow, WebviewWindowBuilder, WindowEvent,
    ipc::CapabilityBuilder, webview::PageLoadEvent, window::Color,
};
use tracing::{debug, warn};

use crate::PLUGIN_NAME;
use crate::error::host_error;
use crate::overlay::{ReadySignal, TauriWindow, apply_chrome};

/// Numeric content ids for webview labels, assigned on first sight
struct ContentIds {
    next: AtomicU32,
    by_label: Mutex<HashMap<String, ContentId>>,
}

impl ContentIds {
    fn lock(&self) -> MutexGuard<'_, HashMap<String, ContentId>> {
        self.by_label.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn id_for(&self, label: &str) -> ContentId {
        *self
            .lock()
            .entry(label.to_string())
            .or_insert_with(|| ContentId(self.next.fetch_add(1, Ordering::Relaxed)))
    }

    fn label_for(&self, content: ContentId) -> Option<String> {
        self.lock()
            .iter()
            .find(|(_, id)| **id == content)
            .map(|(label, _)| label.clone())
    }

    fn forget(&self, label: &str) {
        self.lock().remove(label);
    }
}

/// [`WindowHost`] over a running Tauri application
pub struct TauriHost {
    app: AppHandle,
    main_label: String,
    ids: Arc<ContentIds>,
    next_overlay: AtomicU32,
}

impl TauriHost {
    pub fn new(app: AppHandle, main_label: impl Into<String>) -> Self {
        Self {
            app,
            main_label: main_label.into(),
            ids: Arc::new(ContentIds {
                next: AtomicU32::new(1),
                by_label: Mutex::new(HashMap::new()),
            }),
            next_overlay: AtomicU32::new(1),
        }
    }

    pub fn content_id_of(&self, label: &str) -> ContentId {
        self.ids.id_for(label)
    }

    pub fn main_window(&self) -> Result<TauriWindow, crate::Error> {
        self.app
            .get_webview_window(&self.main_label)
            .map(|window| self.wrap(window))
            .ok_or_else(|| crate::Error::MainWindowMissing(self.main_label.clone()))
    }

    fn wrap(&self, window: WebviewWindow) -> TauriWindow {
        let content = self.ids.id_for(window.label());
        TauriWindow {
            window,
            content,
            base: None,
            ready: None,
        }
    }

    fn next_label(&self) -> String {
        format!("overlay-{}", self.next_overlay.fetch_add(1, Ordering::Relaxed))
    }
}

impl WindowHost for TauriHost {
    type Window = TauriWindow;

    fn windows(&self) -> Vec<TauriWindow> {
        self.app
            .webview_windows()
            .into_values()
            .map(|window| self.wrap(window))
            .collect()
    }

    fn window_for_content(&self, content: ContentId) -> Option<TauriWindow> {
        let label = self.ids.label_for(content)?;
        self.app
            .get_webview_window(&label)
            .map(|window| self.wrap(window))
    }

    fn create_window(&self, spec: &WindowSpec<TauriWindow>) -> Result<TauriWindow, Error> {
        let label = self.next_label();
        let blank = Url::parse("about:blank").map_err(|e| Error::WindowCreation(e.to_string()))?;

        // The overlay document is loaded later, once the webview has its capabilities
        let ready = Arc::new(ReadySignal::default());
        let signal = Arc::clone(&ready);
        let background = spec.background;

        let builder = WebviewWindowBuilder::new(&self.app, &label, WebviewUrl::External(blank))
            .title("")
            .inner_size(f64::from(spec.width), f64::from(spec.height))
            .transparent(spec.transparent)
            .background_color(Color(background.0, background.1, background.2, background.3))
            .visible(false)
            .on_page_load(move |_window, payload| {
                if matches!(payload.event(), PageLoadEvent::Finished) {
                    signal.page_loaded(payload.url());
                }
            });

        let mut builder = apply_chrome(builder, spec.chrome);
        if let Some(parent) = &spec.parent {
            builder = builder.parent(&parent.window).map_err(host_error)?;
        }

        let window = builder
            .build()
            .map_err(|e| Error::WindowCreation(e.to_string()))?;
        debug!(label = %label, permissions = ?spec.permissions, "Built overlay webview");

        if spec.modal {
            if let Some(parent) = &spec.parent {
                parent.window.set_enabled(false).map_err(host_error)?;

                let parent = parent.window.clone();
                window.on_window_event(move |event| {
                    if let WindowEvent::Destroyed = event {
                        if let Err(e) = parent.set_enabled(true) {
                            warn!(parent = %parent.label(), "Failed to re-enable parent: {}", e);
                        }
                    }
                });
            }
        }

        let ids = Arc::clone(&self.ids);
        let closed_label = label.clone();
        window.on_window_event(move |event| {
            if let WindowEvent::Destroyed = event {
                ids.forget(&closed_label);
            }
        });

        let base = self
            .main_window()
            .ok()
            .and_then(|main| main.window.url().ok());

        let mut overlay = self.wrap(window);
        overlay.base = base;
        overlay.ready = Some(ready);
        Ok(overlay)
    }

    fn enable_remote(&self, window: &TauriWindow) -> Result<(), Error> {
        let label = window.window.label();
        let capability = CapabilityBuilder::new(format!("{}-remote", label))
            .window(label)
            .permission("core:default")
            .permission(format!("{}:default", PLUGIN_NAME));

        self.app.add_capability(capability).map_err(host_error)?;
        debug!(window = %window.id(), "Enabled remote access for overlay");
        Ok(())
    }
}
