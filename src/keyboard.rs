use x11rb::connection::Connection;
use x11rb::protocol::xproto::{ConnectionExt, Keycode, Keysym};

/// Snapshot of the server's keycode to keysym table.
///
/// Only the base level of each key is consulted, both when grabbing and when
/// resolving presses, so a binding always names the unshifted symbol.
#[derive(Debug, Clone)]
pub struct Keymap {
    min_keycode: Keycode,
    keysyms_per_keycode: usize,
    keysyms: Vec<Keysym>,
}

impl Keymap {
    pub fn new(min_keycode: Keycode, keysyms_per_keycode: u8, keysyms: Vec<Keysym>) -> Self {
        Self {
            min_keycode,
            keysyms_per_keycode: usize::from(keysyms_per_keycode),
            keysyms,
        }
    }

    /// Fetches the full mapping between the setup's min and max keycodes.
    pub fn load<C: Connection>(conn: &C) -> Result<Self, Box<dyn std::error::Error>> {
        let min_keycode = conn.setup().min_keycode;
        let max_keycode = conn.setup().max_keycode;
        let mapping = conn
            .get_keyboard_mapping(min_keycode, max_keycode - min_keycode + 1)?
            .reply()?;
        Ok(Self::new(
            min_keycode,
            mapping.keysyms_per_keycode,
            mapping.keysyms,
        ))
    }

    fn keycodes(&self) -> impl Iterator<Item = Keycode> + '_ {
        let count = self
            .keysyms
            .len()
            .checked_div(self.keysyms_per_keycode)
            .unwrap_or(0);
        (0..count).filter_map(move |i| {
            u8::try_from(i)
                .ok()
                .and_then(|i| self.min_keycode.checked_add(i))
        })
    }

    /// Every keycode whose base level produces `keysym`.
    pub fn keycodes_for(&self, keysym: Keysym) -> Vec<Keycode> {
        if keysym == 0 {
            return Vec::new();
        }
        self.keycodes()
            .filter(|&code| self.keysym_for(code) == Some(keysym))
            .collect()
    }

    /// Base-level keysym for `keycode`, or `None` outside the mapping.
    pub fn keysym_for(&self, keycode: Keycode) -> Option<Keysym> {
        if self.keysyms_per_keycode == 0 {
            return None;
        }
        let offset = usize::from(keycode.checked_sub(self.min_keycode)?);
        let sym = *self.keysyms.get(offset * self.keysyms_per_keycode)?;
        (sym != 0).then_some(sym)
    }
}
