use crate::display::{ConfigField, Display};
use crate::workspace::Workspace;
use x11rb::protocol::xproto::Window;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    fn fields(self) -> [ConfigField; 4] {
        [
            ConfigField::X(self.x as i32),
            ConfigField::Y(self.y as i32),
            ConfigField::Width(self.width),
            ConfigField::Height(self.height),
        ]
    }
}

/// Main window on the left half, side windows split the right half evenly.
///
/// Integer division throughout: when the height does not divide by the
/// number of side windows, the leftover rows stay empty below the last one.
pub fn tile(workspace: &Workspace, screen_width: u16, screen_height: u16) -> Vec<(Window, Rect)> {
    let Some(main) = workspace.main() else {
        return Vec::new();
    };
    let width = u32::from(screen_width);
    let height = u32::from(screen_height);
    let sides = workspace.side_windows();

    if sides.is_empty() {
        return vec![(main, Rect::new(0, 0, width, height))];
    }

    let half = width / 2;
    let height_per_window = height / sides.len() as u32;

    let mut rects = Vec::with_capacity(sides.len() + 1);
    rects.push((main, Rect::new(0, 0, half, height)));
    for (i, &window) in sides.iter().enumerate() {
        let y = i as u32 * height_per_window;
        rects.push((window, Rect::new(half, y, half, height_per_window)));
    }
    rects
}

/// Applies `tile` to the display. A failing window is logged and skipped.
pub fn reflow<D: Display>(
    display: &D,
    workspace: &Workspace,
    screen_width: u16,
    screen_height: u16,
) {
    for (window, rect) in tile(workspace, screen_width, screen_height) {
        if let Err(e) = display.configure_window(window, &rect.fields()) {
            log::error!("Failed to configure window {} ({})", window, e);
        }
    }
    if let Err(e) = display.flush() {
        log::error!("Failed to flush after reflow: {}", e);
    }
}
