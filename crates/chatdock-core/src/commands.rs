use chatdock_overlay::{OpenOverlayRequest, OverlayManager, OverlayOutcome, RelayMessage};
use serde_json::Value;
use tauri::{State, WebviewWindow, command};
use tracing::{debug, error};

use crate::Error;
use crate::overlay::TauriHost;

pub struct OverlayState(pub OverlayManager<TauriHost>);

/// Open an overlay for the invoking webview; resolves once the request
/// reaches `shown`, `closed` or `error`. Failures, a missing main window
/// included, are logged and reported as `error`.
#[command]
pub async fn open_overlay(
    state: State<'_, OverlayState>,
    webview_window: WebviewWindow,
    request: OpenOverlayRequest,
) -> Result<OverlayOutcome, String> {
    let manager = &state.0;
    let main = match main_or_error(manager.host().main_window(), &request.route) {
        Ok(main) => main,
        Err(outcome) => return Ok(outcome),
    };
    let sender = manager.host().content_id_of(webview_window.label());

    Ok(manager.open_overlay(&main, request, Some(sender)).await)
}

/// A missing main window is an overlay failure, not a command failure
fn main_or_error<W>(main: Result<W, Error>, route: &str) -> Result<W, OverlayOutcome> {
    main.map_err(|e| {
        error!(route = %route, "Failed to open overlay: {}", e);
        OverlayOutcome::Error
    })
}

#[command]
pub fn relay_message(
    state: State<'_, OverlayState>,
    webview_window: WebviewWindow,
    channel: String,
    payload: Vec<Value>,
) -> Result<(), String> {
    let manager = &state.0;
    let sender = manager.host().content_id_of(webview_window.label());
    let deliveries = manager.relay(sender, &RelayMessage::new(channel, payload));
    debug!(sender = %sender, ?deliveries, "Relayed message");
    Ok(())
}

#[command]
pub fn list_overlay_routes(state: State<'_, OverlayState>) -> Result<Vec<String>, String> {
    Ok(state.0.list_routes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_main_window_resolves_error() {
        let main: Result<(), Error> = Err(Error::MainWindowMissing("main".to_string()));

        let outcome = main_or_error(main, "/settings").unwrap_err();

        assert_eq!(outcome, OverlayOutcome::Error);
        assert_eq!(serde_json::to_value(outcome).unwrap(), "error");
    }

    #[test]
    fn present_main_window_passes_through() {
        assert_eq!(main_or_error(Ok::<_, Error>(7), "/settings"), Ok(7));
    }
}
