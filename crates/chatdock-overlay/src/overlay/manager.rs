use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, error, info, warn};

use crate::{
    ContentId, ContentPermissions, Delivery, Error, LoadTarget, OpenOverlayRequest,
    OverlayConfig, OverlayRelay, OverlayState, OverlayWindow, PendingOutcome, Platform,
    RelayHub, RelayMessage, RequestLifecycle, ReservationId, RouteRegistry, RouteState,
    SettingsSource, WindowHost, WindowSpec, background_for,
};

pub struct OverlayManager<H: WindowHost> {
    host: Arc<H>,
    settings: Arc<dyn SettingsSource>,
    config: OverlayConfig,
    platform: Platform,
    registry: Arc<Mutex<RouteRegistry<H::Window>>>,
    relays: Arc<RelayHub<H::Window>>,
    next_reservation: AtomicU64,
}

impl<H: WindowHost> OverlayManager<H> {
    pub fn new(host: H, settings: Arc<dyn SettingsSource>, config: OverlayConfig) -> Self {
        let relays = Arc::new(RelayHub::new(config.relay_policy));
        Self {
            host: Arc::new(host),
            settings,
            config,
            platform: Platform::current(),
            registry: Arc::new(Mutex::new(RouteRegistry::new())),
            relays,
            next_reservation: AtomicU64::new(1),
        }
    }

    /// Style windows as if running on `platform`
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn relays(&self) -> &RelayHub<H::Window> {
        &self.relays
    }

    /// Routes of the overlays opened by this manager that are still open
    pub fn list_routes(&self) -> Vec<String> {
        lock(&self.registry).routes()
    }

    /// Open the overlay for `request`, or bring it forward if already open.
    ///
    /// Never fails: setup errors are logged and reported as
    /// [`OverlayOutcome::Error`](crate::OverlayOutcome::Error). The returned
    /// future resolves when the request reaches a terminal state.
    pub fn open_overlay(
        &self,
        main: &H::Window,
        request: OpenOverlayRequest,
        sender: Option<ContentId>,
    ) -> PendingOutcome {
        debug!(?request, ?sender, "Got overlay window open request");

        let route = request.resolve_route(sender);
        let (lifecycle, pending) = RequestLifecycle::new(route.clone());
        let mut attempt = Attempt {
            reservation: None,
            window: None,
        };

        if let Err(e) = self.try_open(main, &request, &lifecycle, &mut attempt) {
            error!(route = %route, "Failed to open overlay: {}", e);
            lifecycle.advance(OverlayState::Error);

            if let Some(reservation) = attempt.reservation {
                lock(&self.registry).release(&route, reservation, None);
            }

            if let Some(window) = attempt.window {
                if let Err(e) = window.close() {
                    warn!(route = %route, "Failed to close half-built overlay: {}", e);
                }
            }
        }

        pending
    }

    /// Forward a relay message from `sender` through the attached relays
    pub fn relay(&self, sender: ContentId, message: &RelayMessage) -> Vec<Delivery> {
        self.relays.dispatch(sender, message)
    }

    fn try_open(
        &self,
        main: &H::Window,
        request: &OpenOverlayRequest,
        lifecycle: &Arc<RequestLifecycle>,
        attempt: &mut Attempt<H::Window>,
    ) -> Result<(), Error> {
        let route = lifecycle.route().to_string();

        let reservation = match self.claim(&route) {
            Claim::Existing(existing) => {
                existing.show()?;
                existing.focus()?;
                info!(route = %route, window = %existing.id(), "Reusing open overlay");
                lifecycle.advance(OverlayState::ShownExisting);
                return Ok(());
            }
            Claim::InFlight => {
                // The window being built shows itself once ready
                info!(route = %route, "Overlay is already opening");
                lifecycle.advance(OverlayState::ShownExisting);
                return Ok(());
            }
            Claim::Reserved(reservation) => reservation,
        };
        attempt.reservation = Some(reservation);

        lifecycle.advance(OverlayState::Creating);

        let parent = self.resolve_parent(main, request)?;
        let bounds = main.bounds()?;
        let (default_width, default_height) = bounds.shrunk_by(self.config.size_margin);

        let spec = WindowSpec {
            width: request.width.unwrap_or(default_width),
            height: request.height.unwrap_or(default_height),
            chrome: self.config.chrome.chrome_for(self.platform),
            transparent: request.transparent,
            modal: request.modal,
            parent,
            background: background_for(self.settings.dark_mode()),
            permissions: ContentPermissions::OVERLAY,
        };

        let window = self.host.create_window(&spec)?;
        attempt.window = Some(window.clone());
        info!(
            route = %route,
            window = %window.id(),
            width = spec.width,
            height = spec.height,
            "Created overlay window"
        );

        let window_id = window.id();
        let registry = Arc::clone(&self.registry);
        let relays = Arc::clone(&self.relays);
        let closed_lifecycle = Arc::clone(lifecycle);
        let closed_route = route.clone();
        window.on_closed(Box::new(move || {
            let mut registry = lock(&registry);
            registry.release(&closed_route, reservation, Some(window_id));
            relays.detach(window_id);
            info!(window = %window_id, "Overlay closed");
            closed_lifecycle.advance(OverlayState::Closed);
        }));

        lifecycle.advance(OverlayState::Configuring);
        self.host.enable_remote(&window)?;

        let ready_window = window.clone();
        let ready_lifecycle = Arc::clone(lifecycle);
        let dev_mode = self.config.dev_mode;
        window.once_ready_to_show(Box::new(move || {
            if !ready_lifecycle.advance(OverlayState::Visible) {
                return;
            }

            if let Err(e) = ready_window.show() {
                warn!(window = %ready_window.id(), "Failed to show overlay: {}", e);
            }
            if let Err(e) = ready_window.focus_content() {
                warn!(window = %ready_window.id(), "Failed to focus overlay content: {}", e);
            }
            if dev_mode {
                ready_window.open_devtools();
            }

            ready_lifecycle.advance(OverlayState::AwaitingClose);
        }));

        lifecycle.advance(OverlayState::AwaitingShow);

        let target = LoadTarget {
            document: self.config.document.clone(),
            fragment: route.clone(),
            query: request.query.clone().unwrap_or_default(),
        };
        window.load(&target)?;

        // Same lock as the close hook: a window closed during setup is never published
        let mut registry = lock(&self.registry);
        if lifecycle.state().is_terminal() {
            debug!(route = %route, "Overlay closed during setup");
            return Ok(());
        }
        if registry.fill(&route, reservation, window.clone()) {
            self.relays.attach(OverlayRelay::new(main.clone(), window));
        }

        Ok(())
    }

    /// Claim `route`: an open window for it, a request already building it,
    /// or a fresh reservation for this request.
    fn claim(&self, route: &str) -> Claim<H::Window> {
        match lock(&self.registry).lookup(route) {
            RouteState::Open(window) => return Claim::Existing(window),
            RouteState::Reserved => return Claim::InFlight,
            RouteState::Free => {}
        }

        // Window queries may wait on the UI thread, which takes the registry
        // lock in close hooks, so scan without holding it
        let external = self.host.windows().into_iter().find(|window| {
            window
                .url()
                .map(|url| url.ends_with(route))
                .unwrap_or(false)
        });
        if let Some(window) = external {
            return Claim::Existing(window);
        }

        let reservation = self.next_reservation.fetch_add(1, Ordering::Relaxed);
        let mut registry = lock(&self.registry);
        if registry.reserve(route, reservation) {
            return Claim::Reserved(reservation);
        }
        match registry.lookup(route) {
            RouteState::Open(window) => Claim::Existing(window),
            _ => Claim::InFlight,
        }
    }

    /// An explicit parent wins over the modal default of parenting to `main`.
    fn resolve_parent(
        &self,
        main: &H::Window,
        request: &OpenOverlayRequest,
    ) -> Result<Option<H::Window>, Error> {
        if let Some(content) = request.override_parent {
            return self
                .host
                .window_for_content(content)
                .map(Some)
                .ok_or(Error::ParentNotFound(content));
        }

        Ok(request.modal.then(|| main.clone()))
    }
}

struct Attempt<W> {
    reservation: Option<ReservationId>,
    window: Option<W>,
}

enum Claim<W> {
    Existing(W),
    InFlight,
    Reserved(ReservationId),
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
