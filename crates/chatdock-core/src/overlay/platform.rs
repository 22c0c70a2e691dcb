//! Platform-specific window chrome for overlays

use chatdock_overlay::WindowChrome;
use tauri::{AppHandle, WebviewWindowBuilder};

type Builder<'a> = WebviewWindowBuilder<'a, tauri::Wry, AppHandle>;

/// Apply the resolved title bar and frame policy to a window builder
pub fn apply_chrome(builder: Builder<'_>, chrome: WindowChrome) -> Builder<'_> {
    let builder = builder.decorations(!chrome.frameless);

    #[cfg(target_os = "macos")]
    let builder = match chrome.title_bar {
        chatdock_overlay::TitleBarStyle::Hidden => builder
            .title_bar_style(tauri::TitleBarStyle::Overlay)
            .hidden_title(true),
        chatdock_overlay::TitleBarStyle::Default => builder,
    };

    // Only macOS has a separately styleable title bar
    #[cfg(not(target_os = "macos"))]
    let _ = chrome.title_bar;

    builder
}
