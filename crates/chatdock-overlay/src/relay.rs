//! Message relay between the main window and overlays
//!
//! Every overlay gets one [`OverlayRelay`] pairing it with the main window.
//! The [`RelayHub`] owns the live relays and routes each incoming relay
//! message:
//! - from the main window's content: to every attached overlay, unchanged
//! - from anyone else: to the main window, with the sender id prepended so
//!   the main window can answer the right origin

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{ContentId, Error, OverlayWindow, RelayPolicy, WindowId};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RelayMessage {
    /// Channel the receiving content listens on
    pub channel: String,
    #[serde(default)]
    pub payload: Vec<Value>,
}

impl RelayMessage {
    pub fn new(channel: impl Into<String>, payload: Vec<Value>) -> Self {
        Self {
            channel: channel.into(),
            payload,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    ToOverlay(WindowId),
    ToMain,
}

/// Relay between the main window and one overlay
#[derive(Clone)]
pub struct OverlayRelay<W> {
    main: W,
    overlay: W,
}

impl<W: OverlayWindow> OverlayRelay<W> {
    pub fn new(main: W, overlay: W) -> Self {
        Self { main, overlay }
    }

    pub fn overlay_id(&self) -> WindowId {
        self.overlay.id()
    }

    fn is_from_main(&self, sender: ContentId) -> bool {
        sender == self.main.content_id()
    }

    pub fn forward(&self, sender: ContentId, message: &RelayMessage) -> Result<Delivery, Error> {
        if self.is_from_main(sender) {
            self.overlay.send(&message.channel, &message.payload)?;
            return Ok(Delivery::ToOverlay(self.overlay.id()));
        }

        let mut payload = Vec::with_capacity(message.payload.len() + 1);
        payload.push(Value::from(sender.0));
        payload.extend(message.payload.iter().cloned());
        self.main.send(&message.channel, &payload)?;
        Ok(Delivery::ToMain)
    }
}

pub struct RelayHub<W> {
    policy: RelayPolicy,
    relays: Mutex<Vec<OverlayRelay<W>>>,
}

impl<W: OverlayWindow> RelayHub<W> {
    pub fn new(policy: RelayPolicy) -> Self {
        Self {
            policy,
            relays: Mutex::new(Vec::new()),
        }
    }

    pub fn policy(&self) -> RelayPolicy {
        self.policy
    }

    pub fn attach(&self, relay: OverlayRelay<W>) {
        debug!(overlay = %relay.overlay_id(), "Attaching overlay relay");
        self.lock().push(relay);
    }

    /// Drop the relay of a closed overlay. Kept under [`RelayPolicy::Accumulating`].
    pub fn detach(&self, overlay: WindowId) -> bool {
        if self.policy == RelayPolicy::Accumulating {
            return false;
        }

        let mut relays = self.lock();
        let before = relays.len();
        relays.retain(|r| r.overlay_id() != overlay);
        before != relays.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Route one relay message; returns the deliveries that succeeded.
    pub fn dispatch(&self, sender: ContentId, message: &RelayMessage) -> Vec<Delivery> {
        // Sending may re-enter the hub through window callbacks, so work on a snapshot
        let relays: Vec<OverlayRelay<W>> = self.lock().clone();

        let Some(first) = relays.first() else {
            debug!(channel = %message.channel, "No overlay relay attached, dropping message");
            return Vec::new();
        };

        let targets: &[OverlayRelay<W>] =
            if self.policy == RelayPolicy::Accumulating || first.is_from_main(sender) {
                &relays
            } else {
                &relays[..1]
            };

        targets
            .iter()
            .filter_map(|relay| match relay.forward(sender, message) {
                Ok(delivery) => Some(delivery),
                Err(e) => {
                    warn!(
                        channel = %message.channel,
                        overlay = %relay.overlay_id(),
                        "Relay delivery failed: {}",
                        e
                    );
                    None
                }
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<OverlayRelay<W>>> {
        self.relays.lock().unwrap_or_else(|e| e.into_inner())
    }
}
