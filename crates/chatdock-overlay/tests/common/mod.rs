//! In-memory window host used by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::thread;
use std::time::Duration;

use chatdock_overlay::{
    Bounds, ContentId, Error, LoadTarget, OverlayConfig, OverlayManager, OverlayWindow, Platform,
    Rgba, WindowCallback, WindowChrome, WindowHost, WindowId, WindowSpec,
};
use serde_json::Value;

pub const MAIN_BOUNDS: Bounds = Bounds {
    x: 0,
    y: 0,
    width: 1200,
    height: 800,
};

#[derive(Debug, Clone, PartialEq)]
pub struct CreatedWindow {
    pub id: WindowId,
    pub width: u32,
    pub height: u32,
    pub chrome: WindowChrome,
    pub transparent: bool,
    pub modal: bool,
    pub parent: Option<WindowId>,
    pub background: Rgba,
}

#[derive(Default)]
struct HostState {
    next_id: u64,
    windows: Vec<FakeWindow>,
    created: Vec<CreatedWindow>,
    events: Vec<String>,
    fail_create: bool,
    fail_remote: bool,
    fail_load: bool,
    close_during_load: bool,
    create_delay: Option<Duration>,
}

#[derive(Clone, Default)]
pub struct FakeHost {
    state: Arc<Mutex<HostState>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the application's main window
    pub fn main_window(&self) -> FakeWindow {
        self.add_window("file:///app/index.html", MAIN_BOUNDS)
    }

    /// Add a window that was not opened through the overlay manager
    pub fn add_window(&self, url: &str, bounds: Bounds) -> FakeWindow {
        let window = self.new_window(bounds);
        window.state().url = url.to_string();
        window
    }

    pub fn open_windows(&self) -> Vec<FakeWindow> {
        self.lock().windows.clone()
    }

    pub fn created(&self) -> Vec<CreatedWindow> {
        self.lock().created.clone()
    }

    pub fn events(&self) -> Vec<String> {
        self.lock().events.clone()
    }

    pub fn fail_create(&self) {
        self.lock().fail_create = true;
    }

    pub fn fail_remote(&self) {
        self.lock().fail_remote = true;
    }

    pub fn fail_load(&self) {
        self.lock().fail_load = true;
    }

    /// Make every overlay window close itself while its document loads
    pub fn close_during_load(&self) {
        self.lock().close_during_load = true;
    }

    /// Make `create_window` block for `delay` before building the window
    pub fn slow_create(&self, delay: Duration) {
        self.lock().create_delay = Some(delay);
    }

    /// Clear every injected failure
    pub fn recover(&self) {
        let mut state = self.lock();
        state.fail_create = false;
        state.fail_remote = false;
        state.fail_load = false;
        state.close_during_load = false;
    }

    fn new_window(&self, bounds: Bounds) -> FakeWindow {
        let mut state = self.lock();
        state.next_id += 1;
        let id = state.next_id;
        let window = FakeWindow {
            inner: Arc::new(WindowInner {
                id: WindowId(id),
                content: ContentId(100 + id as u32),
                host: Arc::downgrade(&self.state),
                state: Mutex::new(WindowState {
                    bounds,
                    ..WindowState::default()
                }),
            }),
        };
        state.windows.push(window.clone());
        window
    }

    fn lock(&self) -> MutexGuard<'_, HostState> {
        self.state.lock().unwrap()
    }
}

impl WindowHost for FakeHost {
    type Window = FakeWindow;

    fn windows(&self) -> Vec<FakeWindow> {
        self.open_windows()
    }

    fn window_for_content(&self, content: ContentId) -> Option<FakeWindow> {
        self.lock()
            .windows
            .iter()
            .find(|w| w.content_id() == content)
            .cloned()
    }

    fn create_window(&self, spec: &WindowSpec<FakeWindow>) -> Result<FakeWindow, Error> {
        let delay = {
            let state = self.lock();
            if state.fail_create {
                return Err(Error::WindowCreation("refused by fake host".into()));
            }
            state.create_delay
        };
        if let Some(delay) = delay {
            thread::sleep(delay);
        }

        let window = self.new_window(Bounds {
            x: 0,
            y: 0,
            width: spec.width,
            height: spec.height,
        });

        let mut state = self.lock();
        state.events.push(format!("create {}", window.id()));
        state.created.push(CreatedWindow {
            id: window.id(),
            width: spec.width,
            height: spec.height,
            chrome: spec.chrome,
            transparent: spec.transparent,
            modal: spec.modal,
            parent: spec.parent.as_ref().map(|p| p.id()),
            background: spec.background,
        });
        Ok(window)
    }

    fn enable_remote(&self, window: &FakeWindow) -> Result<(), Error> {
        let mut state = self.lock();
        if state.fail_remote {
            return Err(Error::Host("remote refused".into()));
        }
        state.events.push(format!("remote {}", window.id()));
        Ok(())
    }
}

#[derive(Default)]
struct WindowState {
    url: String,
    bounds: Bounds,
    show_calls: usize,
    focus_calls: usize,
    content_focused: bool,
    devtools_opened: usize,
    closed: bool,
    sent: Vec<(String, Vec<Value>)>,
    ready: Option<WindowCallback>,
    on_closed: Vec<WindowCallback>,
}

struct WindowInner {
    id: WindowId,
    content: ContentId,
    host: Weak<Mutex<HostState>>,
    state: Mutex<WindowState>,
}

#[derive(Clone)]
pub struct FakeWindow {
    inner: Arc<WindowInner>,
}

impl FakeWindow {
    fn state(&self) -> MutexGuard<'_, WindowState> {
        self.inner.state.lock().unwrap()
    }

    /// Signal that the first frame is ready to paint
    pub fn fire_ready(&self) {
        let callback = self.state().ready.take();
        if let Some(callback) = callback {
            callback();
        }
    }

    /// Close the window the way a user would
    pub fn user_close(&self) {
        let callbacks = {
            let mut state = self.state();
            if state.closed {
                return;
            }
            state.closed = true;
            std::mem::take(&mut state.on_closed)
        };

        if let Some(host) = self.inner.host.upgrade() {
            host.lock().unwrap().windows.retain(|w| w.id() != self.id());
        }

        for callback in callbacks {
            callback();
        }
    }

    pub fn url_now(&self) -> String {
        self.state().url.clone()
    }

    pub fn show_calls(&self) -> usize {
        self.state().show_calls
    }

    pub fn focus_calls(&self) -> usize {
        self.state().focus_calls
    }

    pub fn content_focused(&self) -> bool {
        self.state().content_focused
    }

    pub fn devtools_opened(&self) -> usize {
        self.state().devtools_opened
    }

    pub fn is_closed(&self) -> bool {
        self.state().closed
    }

    pub fn sent(&self) -> Vec<(String, Vec<Value>)> {
        self.state().sent.clone()
    }
}

impl OverlayWindow for FakeWindow {
    fn id(&self) -> WindowId {
        self.inner.id
    }

    fn content_id(&self) -> ContentId {
        self.inner.content
    }

    fn url(&self) -> Result<String, Error> {
        Ok(self.url_now())
    }

    fn bounds(&self) -> Result<Bounds, Error> {
        Ok(self.state().bounds)
    }

    fn show(&self) -> Result<(), Error> {
        self.state().show_calls += 1;
        Ok(())
    }

    fn focus(&self) -> Result<(), Error> {
        self.state().focus_calls += 1;
        Ok(())
    }

    fn focus_content(&self) -> Result<(), Error> {
        self.state().content_focused = true;
        Ok(())
    }

    fn open_devtools(&self) {
        self.state().devtools_opened += 1;
    }

    fn close(&self) -> Result<(), Error> {
        self.user_close();
        Ok(())
    }

    fn load(&self, target: &LoadTarget) -> Result<(), Error> {
        let mut close = false;
        if let Some(host) = self.inner.host.upgrade() {
            let mut host = host.lock().unwrap();
            if host.fail_load {
                return Err(Error::Navigation("document missing".into()));
            }
            host.events.push(format!("load {}", self.id()));
            close = host.close_during_load;
        }

        self.state().url = format!("file:///app/{}", target.to_url_suffix());
        if close {
            self.user_close();
        }
        Ok(())
    }

    fn send(&self, channel: &str, payload: &[Value]) -> Result<(), Error> {
        let mut state = self.state();
        if state.closed {
            return Err(Error::WindowNotFound(self.id().to_string()));
        }
        state.sent.push((channel.to_string(), payload.to_vec()));
        Ok(())
    }

    fn once_ready_to_show(&self, callback: WindowCallback) {
        self.state().ready = Some(callback);
    }

    fn on_closed(&self, callback: WindowCallback) {
        self.state().on_closed.push(callback);
    }
}

pub fn settings(dark_mode: bool) -> Arc<HashMap<String, Value>> {
    let mut settings = HashMap::new();
    settings.insert("darkMode".to_string(), Value::Bool(dark_mode));
    Arc::new(settings)
}

pub fn manager(host: &FakeHost, config: OverlayConfig) -> OverlayManager<FakeHost> {
    OverlayManager::new(host.clone(), settings(false), config).with_platform(Platform::Linux)
}

pub fn dev_config() -> OverlayConfig {
    OverlayConfig {
        dev_mode: true,
        ..OverlayConfig::default()
    }
}

pub fn release_config() -> OverlayConfig {
    OverlayConfig {
        dev_mode: false,
        ..OverlayConfig::default()
    }
}

/// The overlay windows created so far that are still open, in creation order
pub fn open_overlays(host: &FakeHost) -> Vec<FakeWindow> {
    let created: Vec<WindowId> = host.created().iter().map(|c| c.id).collect();
    host.open_windows()
        .into_iter()
        .filter(|w| created.contains(&w.id()))
        .collect()
}
