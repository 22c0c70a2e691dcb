use std::collections::HashMap;

use crate::{OverlayWindow, WindowId};

/// Identifies the open request holding a route reservation
pub type ReservationId = u64;

enum Entry<W> {
    /// A request is building the window for this route
    Reserved(ReservationId),
    Open(W),
}

/// What a lookup found for a route
pub enum RouteState<W> {
    Open(W),
    /// Another request is still building the window
    Reserved,
    Free,
}

/// Overlays keyed by their resolved route.
///
/// A route is reserved before its window is built, so concurrent requests for
/// the same route see it taken and never build a second window.
pub struct RouteRegistry<W> {
    entries: HashMap<String, Entry<W>>,
}

impl<W: OverlayWindow> RouteRegistry<W> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn lookup(&self, route: &str) -> RouteState<W> {
        match self.entries.get(route) {
            Some(Entry::Open(window)) => RouteState::Open(window.clone()),
            Some(Entry::Reserved(_)) => RouteState::Reserved,
            None => RouteState::Free,
        }
    }

    /// Reserve a free route; false if it is reserved or open already
    pub fn reserve(&mut self, route: &str, reservation: ReservationId) -> bool {
        if self.entries.contains_key(route) {
            return false;
        }
        self.entries
            .insert(route.to_string(), Entry::Reserved(reservation));
        true
    }

    /// Turn a reservation into an open window; false if it was released meanwhile
    pub fn fill(&mut self, route: &str, reservation: ReservationId, window: W) -> bool {
        let Some(entry) = self.entries.get_mut(route) else {
            return false;
        };
        match *entry {
            Entry::Reserved(r) if r == reservation => {}
            _ => return false,
        }
        *entry = Entry::Open(window);
        true
    }

    /// Drop `route` if it is still held by `reservation` or by `window`
    pub fn release(
        &mut self,
        route: &str,
        reservation: ReservationId,
        window: Option<WindowId>,
    ) -> bool {
        let owned = match self.entries.get(route) {
            Some(Entry::Reserved(r)) => *r == reservation,
            Some(Entry::Open(w)) => Some(w.id()) == window,
            None => false,
        };
        if owned {
            self.entries.remove(route);
        }
        owned
    }

    /// Routes with an open window
    pub fn routes(&self) -> Vec<String> {
        let mut routes: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| matches!(entry, Entry::Open(_)))
            .map(|(route, _)| route.clone())
            .collect();
        routes.sort();
        routes
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<W: OverlayWindow> Default for RouteRegistry<W> {
    fn default() -> Self {
        Self::new()
    }
}
