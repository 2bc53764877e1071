use crate::config::BorderConfig;
use crate::display::{ConfigField, Display};
use crate::events::{EventKind, WmEvent};
use crate::keyboard::Keymap;
use crate::keys::{self, Action, KeyTable};
use crate::layout;
use crate::spawn::Launcher;
use crate::workspace::Workspace;
use x11rb::protocol::xproto::{Keycode, Window};

/// Everything the event handlers touch. Owned by the event loop.
pub struct WindowManager<D: Display, L: Launcher> {
    display: D,
    launcher: L,
    workspace: Workspace,
    keymap: Keymap,
    keys: KeyTable,
    border: BorderConfig,
    screen_width: u16,
    screen_height: u16,
    running: bool,
}

impl<D: Display, L: Launcher> WindowManager<D, L> {
    pub fn new(
        display: D,
        launcher: L,
        keymap: Keymap,
        keys: KeyTable,
        border: BorderConfig,
        screen_width: u16,
        screen_height: u16,
    ) -> Self {
        Self {
            display,
            launcher,
            workspace: Workspace::new(),
            keymap,
            keys,
            border,
            screen_width,
            screen_height,
            running: true,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Grabs every binding's key codes on the root window. Bindings whose
    /// keysym is missing from the keymap are skipped.
    pub fn grab_keys(&self) -> usize {
        let mut grabbed = 0;
        for binding in self.keys.bindings() {
            log::info!(
                "Grabbing combination {}",
                keys::describe(binding.modifiers, binding.keysym)
            );
            let codes = self.keymap.keycodes_for(binding.keysym);
            if codes.is_empty() {
                log::warn!(
                    "Couldn't find keysym {}",
                    keys::keysym_name(binding.keysym)
                );
                continue;
            }
            for code in codes {
                match self.display.grab_key(binding.modifiers, code) {
                    Ok(()) => grabbed += 1,
                    Err(e) => log::error!("Failed to grab key {} ({})", code, e),
                }
            }
        }
        if let Err(e) = self.display.flush() {
            log::error!("Failed to flush key grabs: {}", e);
        }
        grabbed
    }

    /// Routes one raw event record to its handler. Unknown or malformed
    /// events are dropped.
    pub fn dispatch(&mut self, raw: &[u8]) {
        let Some(&response_type) = raw.first() else {
            return;
        };
        let Some(kind) = EventKind::from_response_type(response_type) else {
            return;
        };
        match WmEvent::decode(kind, raw) {
            Ok(event) => self.handle(event),
            Err(e) => log::warn!("Dropping malformed {:?} event: {}", kind, e),
        }
    }

    pub fn handle(&mut self, event: WmEvent) {
        match event {
            WmEvent::CreateNotify(window) => self.handle_create_notify(window),
            WmEvent::DestroyNotify(window) => self.handle_destroy_notify(window),
            WmEvent::MapRequest(window) => self.handle_map_request(window),
            WmEvent::ConfigureRequest { window, fields } => {
                self.handle_configure_request(window, &fields)
            }
            WmEvent::KeyPress { keycode, state } => self.handle_key_press(keycode, state),
            WmEvent::Ignored(kind) => log::trace!("Ignoring {:?}", kind),
        }
    }

    fn handle_create_notify(&mut self, window: Window) {
        log::info!("Processing create notify for {}...", window);
        if self.workspace.contains(window) {
            log::warn!("Window {} is already managed", window);
            return;
        }
        if self.workspace.main().is_none() {
            self.workspace.adopt_as_main(window);
        } else {
            self.workspace.append_side(window);
        }
        self.reflow();
        self.apply_border(window);
    }

    fn handle_destroy_notify(&mut self, window: Window) {
        log::info!("Processing destroy notify for {}...", window);
        if self.workspace.main() == Some(window) {
            self.workspace.clear_main();
            if let Some(promoted) = self.workspace.promote_first_side_to_main() {
                log::debug!("Promoted {} to main window", promoted);
            }
        } else if let Some(index) = self.workspace.position_of_side(window) {
            self.workspace.remove_side_at(index);
        }
        self.reflow();
    }

    fn handle_map_request(&mut self, window: Window) {
        log::info!("Processing map request for {}...", window);
        if let Err(e) = self.display.map_window(window) {
            log::error!("Failed to map window {} ({})", window, e);
        }
        self.flush();
    }

    fn handle_configure_request(&mut self, window: Window, fields: &[ConfigField]) {
        log::info!("Processing configure request for {}...", window);
        if let Err(e) = self.display.configure_window(window, fields) {
            log::error!("Failed to configure window {} ({})", window, e);
        }
        self.flush();
    }

    fn handle_key_press(&mut self, keycode: Keycode, state: u16) {
        let Some(keysym) = self.keymap.keysym_for(keycode) else {
            return;
        };
        let Some(binding) = self.keys.lookup(state, keysym) else {
            return;
        };
        log::info!("Executing: {:?}", binding.action);
        match &binding.action {
            Action::Quit => self.running = false,
            Action::Spawn(argv) => self.launcher.launch(argv),
        }
    }

    fn reflow(&self) {
        debug_assert!(self.workspace.is_consistent());
        layout::reflow(
            &self.display,
            &self.workspace,
            self.screen_width,
            self.screen_height,
        );
    }

    fn apply_border(&self, window: Window) {
        if let Err(e) = self.display.set_border_color(window, self.border.color) {
            log::error!("Failed to set border colour of window {} ({})", window, e);
        }
        let width = [ConfigField::BorderWidth(self.border.width)];
        if let Err(e) = self.display.configure_window(window, &width) {
            log::error!("Failed to set border width of window {} ({})", window, e);
        }
    }

    fn flush(&self) {
        if let Err(e) = self.display.flush() {
            log::error!("Failed to flush: {}", e);
        }
    }
}
