const COMMANDS: &[&str] = &["open_overlay", "relay_message", "list_overlay_routes"];

fn main() {
    tauri_plugin::Builder::new(COMMANDS).build();
}
