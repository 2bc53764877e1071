mod config;
mod display;
mod events;
mod keyboard;
mod keys;
mod layout;
mod spawn;
mod state;
mod workspace;

use config::Config;
use display::X11Display;
use keyboard::Keymap;
use keys::KeyTable;
use simplelog::{
    ColorChoice, CombinedLogger, Config as LogConfig, LevelFilter, TermLogger, TerminalMode,
    WriteLogger,
};
use spawn::ProcessLauncher;
use state::WindowManager;
use std::fs::File;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{self, ConnectionExt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            LogConfig::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(
            LevelFilter::Info,
            LogConfig::default(),
            File::create("/tmp/pwm.log")?,
        ),
    ])?;

    if let Err(e) = run() {
        log::error!("{}", e);
        return Err(e);
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load();

    log::info!("Connecting to X server...");
    let (conn, screen_num) = x11rb::connect(None)
        .map_err(|e| format!("Failed to connect to X server ({})", e))?;

    log::info!("Collecting setup information...");
    let setup = conn.setup();
    log::info!(
        "Protocol version {}.{}",
        setup.protocol_major_version,
        setup.protocol_minor_version
    );
    let screen = setup
        .roots
        .get(screen_num)
        .ok_or("Failed to get the default screen")?;
    log::info!(
        "Screen: {}x{} mm, {}x{} px",
        screen.width_in_millimeters,
        screen.height_in_millimeters,
        screen.width_in_pixels,
        screen.height_in_pixels
    );
    let root = screen.root;

    let change = xproto::ChangeWindowAttributesAux::new().event_mask(
        xproto::EventMask::SUBSTRUCTURE_REDIRECT
            | xproto::EventMask::SUBSTRUCTURE_NOTIFY
            | xproto::EventMask::KEY_PRESS
            | xproto::EventMask::KEY_RELEASE
            | xproto::EventMask::FOCUS_CHANGE,
    );
    conn.change_window_attributes(root, &change)?
        .check()
        .map_err(|e| {
            format!(
                "Failed to change event mask of root window {} ({}), is another window manager running?",
                root, e
            )
        })?;

    let keymap = Keymap::load(&conn)?;
    let keys = KeyTable::from_config(&config.bindings);
    let configured = keys.len();

    let mut wm = WindowManager::new(
        X11Display::new(&conn, root),
        ProcessLauncher::default(),
        keymap,
        keys,
        config.border,
        screen.width_in_pixels,
        screen.height_in_pixels,
    );
    let grabbed = wm.grab_keys();
    log::info!(
        "Starting event loop ({} keys grabbed for {} keybinds)...",
        grabbed,
        configured
    );

    while wm.is_running() {
        let raw = conn.wait_for_raw_event()?;
        wm.dispatch(&raw);
    }

    log::info!("Cleaning up...");
    Ok(())
}
