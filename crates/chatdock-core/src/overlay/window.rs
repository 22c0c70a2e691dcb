use std::sync::{Arc, Mutex};

use chatdock_overlay::{
    Bounds, ContentId, Error, LoadTarget, OverlayWindow, RelayMessage, WindowCallback, WindowId,
};
use serde_json::Value;
use tauri::{Emitter, EventTarget, Url, WebviewWindow, WindowEvent};

use crate::RELAY_EVENT;
use crate::error::host_error;

/// A Tauri webview window driven by the overlay manager
#[derive(Clone)]
pub struct TauriWindow {
    pub(crate) window: WebviewWindow,
    pub(crate) content: ContentId,
    /// Base the overlay document is resolved against
    pub(crate) base: Option<Url>,
    /// Present only on windows created for an overlay
    pub(crate) ready: Option<Arc<ReadySignal>>,
}

impl TauriWindow {
    pub fn webview_window(&self) -> &WebviewWindow {
        &self.window
    }
}

#[derive(Default)]
struct ReadyState {
    expected_fragment: Option<String>,
    fired: bool,
    callback: Option<WindowCallback>,
}

/// First page load of the overlay document, fired at most once.
///
/// Loads of anything but the armed document (the blank page the webview is
/// built with) are ignored.
#[derive(Default)]
pub(crate) struct ReadySignal {
    state: Mutex<ReadyState>,
}

impl ReadySignal {
    fn lock(&self) -> std::sync::MutexGuard<'_, ReadyState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn arm(&self, fragment: String) {
        self.lock().expected_fragment = Some(fragment);
    }

    fn register(&self, callback: WindowCallback) {
        let mut state = self.lock();
        if state.fired {
            drop(state);
            callback();
        } else {
            state.callback = Some(callback);
        }
    }

    pub(crate) fn page_loaded(&self, url: &Url) {
        let callback = {
            let mut state = self.lock();
            if state.fired {
                return;
            }
            match &state.expected_fragment {
                Some(expected) if url.fragment() == Some(expected.as_str()) => {}
                _ => return,
            }
            state.fired = true;
            state.callback.take()
        };

        if let Some(callback) = callback {
            callback();
        }
    }
}

impl OverlayWindow for TauriWindow {
    fn id(&self) -> WindowId {
        WindowId(u64::from(self.content.0))
    }

    fn content_id(&self) -> ContentId {
        self.content
    }

    fn url(&self) -> Result<String, Error> {
        self.window
            .url()
            .map(|url| url.to_string())
            .map_err(host_error)
    }

    fn bounds(&self) -> Result<Bounds, Error> {
        let scale = self.window.scale_factor().map_err(host_error)?;
        let position = self
            .window
            .outer_position()
            .map_err(host_error)?
            .to_logical::<i32>(scale);
        let size = self
            .window
            .outer_size()
            .map_err(host_error)?
            .to_logical::<u32>(scale);

        Ok(Bounds {
            x: position.x,
            y: position.y,
            width: size.width,
            height: size.height,
        })
    }

    fn show(&self) -> Result<(), Error> {
        self.window.show().map_err(host_error)
    }

    fn focus(&self) -> Result<(), Error> {
        self.window.set_focus().map_err(host_error)
    }

    fn focus_content(&self) -> Result<(), Error> {
        // A webview window has exactly one webview, which takes the focus with it
        self.window.set_focus().map_err(host_error)
    }

    fn open_devtools(&self) {
        self.window.open_devtools();
    }

    fn close(&self) -> Result<(), Error> {
        self.window.close().map_err(host_error)
    }

    fn load(&self, target: &LoadTarget) -> Result<(), Error> {
        let base = match &self.base {
            Some(base) => base.clone(),
            None => self.window.url().map_err(host_error)?,
        };

        let mut url = base
            .join(&target.document)
            .map_err(|e| Error::Navigation(e.to_string()))?;
        url.set_query(target.query_string().as_deref());
        url.set_fragment(Some(&target.fragment));

        if let Some(ready) = &self.ready {
            ready.arm(url.fragment().unwrap_or_default().to_string());
        }

        self.window
            .navigate(url)
            .map_err(|e| Error::Navigation(e.to_string()))
    }

    fn send(&self, channel: &str, payload: &[Value]) -> Result<(), Error> {
        self.window
            .emit_to(
                EventTarget::webview_window(self.window.label()),
                RELAY_EVENT,
                RelayMessage::new(channel, payload.to_vec()),
            )
            .map_err(|e| Error::Relay {
                channel: channel.to_string(),
                reason: e.to_string(),
            })
    }

    fn once_ready_to_show(&self, callback: WindowCallback) {
        match &self.ready {
            Some(ready) => ready.register(callback),
            // Windows not built for an overlay are already loaded
            None => callback(),
        }
    }

    fn on_closed(&self, callback: WindowCallback) {
        let callback = Mutex::new(Some(callback));
        self.window.on_window_event(move |event| {
            if let WindowEvent::Destroyed = event {
                let callback = callback.lock().ok().and_then(|mut c| c.take());
                if let Some(callback) = callback {
                    callback();
                }
            }
        });
    }
}
