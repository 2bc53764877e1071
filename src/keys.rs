use crate::config::BindingConfig;
use x11rb::protocol::xproto::{Keysym, ModMask};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    /// Program followed by its arguments.
    Spawn(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Keybinding {
    pub modifiers: u16,
    pub keysym: Keysym,
    pub action: Action,
}

pub fn parse_action(cmd: &str) -> Option<Action> {
    let parts: Vec<&str> = cmd.split_whitespace().collect();
    let (&name, args) = parts.split_first()?;

    match name {
        "Quit" => Some(Action::Quit),
        "Spawn" if !args.is_empty() => Some(Action::Spawn(
            args.iter().map(|s| s.to_string()).collect(),
        )),
        _ => {
            log::warn!("Unknown action: {}", cmd);
            None
        }
    }
}

const NAMED_KEYSYMS: &[(&str, Keysym)] = &[
    ("Return", 0xff0d),
    ("space", 0x0020),
    ("BackSpace", 0xff08),
    ("Tab", 0xff09),
    ("Escape", 0xff1b),
    ("Delete", 0xffff),
    ("Home", 0xff50),
    ("Left", 0xff51),
    ("Up", 0xff52),
    ("Right", 0xff53),
    ("Down", 0xff54),
    ("End", 0xff57),
    ("Print", 0xff61),
    ("minus", 0x002d),
    ("equal", 0x003d),
    ("comma", 0x002c),
    ("period", 0x002e),
    ("slash", 0x002f),
    ("backslash", 0x005c),
    ("semicolon", 0x003b),
];

const F1: Keysym = 0xffbe;

pub fn keysym_from_name(name: &str) -> Option<Keysym> {
    if let Some(&(_, sym)) = NAMED_KEYSYMS.iter().find(|(n, _)| *n == name) {
        return Some(sym);
    }
    if let Some(n) = name.strip_prefix('F').and_then(|n| n.parse::<u32>().ok()) {
        return (1..=12).contains(&n).then(|| F1 + n - 1);
    }
    // Latin-1 keysyms share their codepoint
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) if ch.is_ascii_graphic() => Some(u32::from(ch)),
        _ => None,
    }
}

pub fn keysym_name(keysym: Keysym) -> String {
    if let Some(&(name, _)) = NAMED_KEYSYMS.iter().find(|(_, s)| *s == keysym) {
        return name.to_string();
    }
    if (F1..F1 + 12).contains(&keysym) {
        return format!("F{}", keysym - F1 + 1);
    }
    match char::from_u32(keysym) {
        Some(ch) if ch.is_ascii_graphic() => ch.to_string(),
        _ => format!("{:#x}", keysym),
    }
}

fn modifier_from_name(name: &str) -> Option<u16> {
    let mask = match name {
        "Shift" => ModMask::SHIFT,
        "Lock" | "Capslock" => ModMask::LOCK,
        "Control" | "Ctrl" => ModMask::CONTROL,
        "Alt" | "Mod1" => ModMask::M1,
        "Numlock" | "Mod2" => ModMask::M2,
        "Mod3" => ModMask::M3,
        "Super" | "Mod4" => ModMask::M4,
        "AltGr" | "Mod5" => ModMask::M5,
        _ => return None,
    };
    Some(u16::from(mask))
}

/// Parses a combination such as `Alt+Shift+c` into `(modifiers, keysym)`.
pub fn parse_keybind(bind: &str) -> Option<(u16, Keysym)> {
    let mut parts: Vec<&str> = bind.split('+').collect();
    let key = parts.pop()?;
    let mut mask = 0u16;
    for part in parts {
        match modifier_from_name(part) {
            Some(m) => mask |= m,
            None => {
                log::warn!("Unknown modifier {:?} in {:?}", part, bind);
                return None;
            }
        }
    }
    match keysym_from_name(key) {
        Some(sym) => Some((mask, sym)),
        None => {
            log::warn!("Unknown key {:?} in {:?}", key, bind);
            None
        }
    }
}

/// Human-readable form used in grab logs, e.g. `Shift+Alt+c`.
pub fn describe(modifiers: u16, keysym: Keysym) -> String {
    const NAMES: [(ModMask, &str); 8] = [
        (ModMask::SHIFT, "Shift+"),
        (ModMask::LOCK, "Capslock+"),
        (ModMask::CONTROL, "Ctrl+"),
        (ModMask::M1, "Alt+"),
        (ModMask::M2, "Numlock+"),
        (ModMask::M3, "Mod3+"),
        (ModMask::M4, "Super+"),
        (ModMask::M5, "AltGr+"),
    ];
    let mut out = String::new();
    for (mask, name) in NAMES {
        if modifiers & u16::from(mask) != 0 {
            out.push_str(name);
        }
    }
    out.push_str(&keysym_name(keysym));
    out
}

/// The keybindings in configuration order. Order breaks ties between
/// overlapping entries.
#[derive(Debug, Clone, Default)]
pub struct KeyTable {
    bindings: Vec<Keybinding>,
}

impl KeyTable {
    pub fn new(bindings: Vec<Keybinding>) -> Self {
        for (i, b) in bindings.iter().enumerate() {
            if bindings[..i]
                .iter()
                .any(|o| o.modifiers == b.modifiers && o.keysym == b.keysym)
            {
                log::warn!(
                    "Binding {} is shadowed by an earlier entry",
                    describe(b.modifiers, b.keysym)
                );
            }
        }
        Self { bindings }
    }

    /// Builds the table from config entries, skipping any that fail to parse.
    pub fn from_config(entries: &[BindingConfig]) -> Self {
        let bindings = entries
            .iter()
            .filter_map(|entry| {
                let (modifiers, keysym) = parse_keybind(&entry.keys)?;
                let action = parse_action(&entry.action)?;
                Some(Keybinding {
                    modifiers,
                    keysym,
                    action,
                })
            })
            .collect();
        Self::new(bindings)
    }

    pub fn bindings(&self) -> &[Keybinding] {
        &self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// First entry whose modifiers equal `state` exactly and whose keysym matches.
    pub fn lookup(&self, state: u16, keysym: Keysym) -> Option<&Keybinding> {
        self.bindings
            .iter()
            .find(|b| b.modifiers == state && b.keysym == keysym)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    const ALT: u16 = 1 << 3;
    const SHIFT: u16 = 1;

    #[test]
    fn parses_modifiers_and_key() {
        assert_eq!(parse_keybind("Alt+Shift+c"), Some((ALT | SHIFT, 0x63)));
        assert_eq!(parse_keybind("Super+Return"), Some((1 << 6, 0xff0d)));
        assert_eq!(parse_keybind("F5"), Some((0, 0xffc2)));
    }

    #[test]
    fn rejects_unknown_names() {
        assert_eq!(parse_keybind("Hyper+c"), None);
        assert_eq!(parse_keybind("Alt+NoSuchKey"), None);
        assert_eq!(parse_keybind("Alt+F13"), None);
    }

    #[test]
    fn parses_actions() {
        assert_eq!(parse_action("Quit"), Some(Action::Quit));
        assert_eq!(
            parse_action("Spawn st -e htop"),
            Some(Action::Spawn(vec!["st".into(), "-e".into(), "htop".into()]))
        );
        assert_eq!(parse_action("Spawn"), None);
        assert_eq!(parse_action(""), None);
        assert_eq!(parse_action("Dance"), None);
    }

    #[test]
    fn describes_combinations() {
        assert_eq!(describe(ALT | SHIFT, 0x63), "Shift+Alt+c");
        assert_eq!(describe(ALT, 0xff0d), "Alt+Return");
        assert_eq!(describe(0, 0xffbe), "F1");
    }

    #[test]
    fn default_table_matches_defaults() {
        let table = KeyTable::from_config(&Config::default().bindings);
        assert_eq!(
            table.bindings(),
            &[
                Keybinding {
                    modifiers: ALT | SHIFT,
                    keysym: 0x63,
                    action: Action::Quit,
                },
                Keybinding {
                    modifiers: ALT,
                    keysym: 0xff0d,
                    action: Action::Spawn(vec!["st".into()]),
                },
            ]
        );
    }

    #[test]
    fn lookup_requires_exact_modifiers() {
        let table = KeyTable::from_config(&Config::default().bindings);
        assert_eq!(
            table.lookup(ALT | SHIFT, 0x63).map(|b| &b.action),
            Some(&Action::Quit)
        );
        assert!(table.lookup(ALT, 0x63).is_none());
        assert!(table.lookup(ALT | SHIFT | (1 << 2), 0x63).is_none());
    }

    #[test]
    fn first_entry_wins_on_overlap() {
        let table = KeyTable::new(vec![
            Keybinding {
                modifiers: ALT,
                keysym: 0x71,
                action: Action::Quit,
            },
            Keybinding {
                modifiers: ALT,
                keysym: 0x71,
                action: Action::Spawn(vec!["st".into()]),
            },
        ]);
        assert_eq!(table.lookup(ALT, 0x71).unwrap().action, Action::Quit);
    }
}
