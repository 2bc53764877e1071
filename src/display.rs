//! The protocol requests the window manager issues, behind a trait so the
//! handlers can run against a recording double in tests.

use thiserror::Error;
use x11rb::connection::Connection;
use x11rb::errors::{ConnectionError, ReplyError};
use x11rb::protocol::xproto::{
    ChangeWindowAttributesAux, ConfigureWindowAux, ConnectionExt, GrabMode, ModMask, StackMode,
    Window,
};

#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("X11 error (code {code})")]
    Protocol { code: u8 },
    #[error("connection error: {0}")]
    Connection(#[from] ConnectionError),
}

impl From<ReplyError> for DisplayError {
    fn from(err: ReplyError) -> Self {
        match err {
            ReplyError::X11Error(e) => DisplayError::Protocol {
                code: e.error_code,
            },
            ReplyError::ConnectionError(e) => DisplayError::Connection(e),
        }
    }
}

/// One value of a ConfigureWindow request. Lists of these are kept in the
/// protocol's bit order: X, Y, Width, Height, BorderWidth, Sibling, StackMode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigField {
    X(i32),
    Y(i32),
    Width(u32),
    Height(u32),
    BorderWidth(u32),
    Sibling(Window),
    StackMode(StackMode),
}

impl ConfigField {
    fn apply(self, aux: ConfigureWindowAux) -> ConfigureWindowAux {
        match self {
            ConfigField::X(x) => aux.x(x),
            ConfigField::Y(y) => aux.y(y),
            ConfigField::Width(w) => aux.width(w),
            ConfigField::Height(h) => aux.height(h),
            ConfigField::BorderWidth(b) => aux.border_width(b),
            ConfigField::Sibling(s) => aux.sibling(s),
            ConfigField::StackMode(m) => aux.stack_mode(m),
        }
    }
}

pub trait Display {
    fn configure_window(&self, window: Window, fields: &[ConfigField])
    -> Result<(), DisplayError>;

    fn map_window(&self, window: Window) -> Result<(), DisplayError>;

    fn set_border_color(&self, window: Window, color: u32) -> Result<(), DisplayError>;

    /// Grabs `keycode` with exactly `modifiers` on the root window.
    fn grab_key(&self, modifiers: u16, keycode: u8) -> Result<(), DisplayError>;

    fn flush(&self) -> Result<(), DisplayError>;
}

/// Grabbed keys are always reported to the root window, never to the
/// client that has focus.
const GRAB_OWNER_EVENTS: bool = false;

/// Every request is checked synchronously so failures can be reported
/// against the window that caused them.
pub struct X11Display<'a, C: Connection> {
    conn: &'a C,
    root: Window,
}

impl<'a, C: Connection> X11Display<'a, C> {
    pub fn new(conn: &'a C, root: Window) -> Self {
        Self { conn, root }
    }
}

impl<C: Connection> Display for X11Display<'_, C> {
    fn configure_window(
        &self,
        window: Window,
        fields: &[ConfigField],
    ) -> Result<(), DisplayError> {
        let changes = fields
            .iter()
            .fold(ConfigureWindowAux::new(), |aux, &field| field.apply(aux));
        self.conn.configure_window(window, &changes)?.check()?;
        Ok(())
    }

    fn map_window(&self, window: Window) -> Result<(), DisplayError> {
        self.conn.map_window(window)?.check()?;
        Ok(())
    }

    fn set_border_color(&self, window: Window, color: u32) -> Result<(), DisplayError> {
        let change = ChangeWindowAttributesAux::new().border_pixel(color);
        self.conn.change_window_attributes(window, &change)?.check()?;
        Ok(())
    }

    fn grab_key(&self, modifiers: u16, keycode: u8) -> Result<(), DisplayError> {
        self.conn
            .grab_key(
                GRAB_OWNER_EVENTS,
                self.root,
                ModMask::from(modifiers),
                keycode,
                GrabMode::ASYNC,
                GrabMode::ASYNC,
            )?
            .check()?;
        Ok(())
    }

    fn flush(&self) -> Result<(), DisplayError> {
        self.conn.flush()?;
        Ok(())
    }
}
