//! Event-type lookup and decoding of the raw event records the server sends.

use crate::display::ConfigField;
use x11rb::errors::ParseError;
use x11rb::protocol::xproto::{
    self, ConfigWindow, ConfigureRequestEvent, CreateNotifyEvent, DestroyNotifyEvent,
    KeyPressEvent, Keycode, MapRequestEvent, StackMode, Window,
};
use x11rb::x11_utils::TryParse;

/// Set on events delivered through SendEvent.
const SYNTHETIC_BIT: u8 = 0x80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    KeyPress,
    KeyRelease,
    FocusIn,
    FocusOut,
    CreateNotify,
    DestroyNotify,
    UnmapNotify,
    MapNotify,
    MapRequest,
    ReparentNotify,
    ConfigureNotify,
    ConfigureRequest,
    GravityNotify,
    CirculateRequest,
}

impl EventKind {
    pub const ALL: [EventKind; 14] = [
        EventKind::KeyPress,
        EventKind::KeyRelease,
        EventKind::FocusIn,
        EventKind::FocusOut,
        EventKind::CreateNotify,
        EventKind::DestroyNotify,
        EventKind::UnmapNotify,
        EventKind::MapNotify,
        EventKind::MapRequest,
        EventKind::ReparentNotify,
        EventKind::ConfigureNotify,
        EventKind::ConfigureRequest,
        EventKind::GravityNotify,
        EventKind::CirculateRequest,
    ];

    pub const fn code(self) -> u8 {
        match self {
            EventKind::KeyPress => xproto::KEY_PRESS_EVENT,
            EventKind::KeyRelease => xproto::KEY_RELEASE_EVENT,
            EventKind::FocusIn => xproto::FOCUS_IN_EVENT,
            EventKind::FocusOut => xproto::FOCUS_OUT_EVENT,
            EventKind::CreateNotify => xproto::CREATE_NOTIFY_EVENT,
            EventKind::DestroyNotify => xproto::DESTROY_NOTIFY_EVENT,
            EventKind::UnmapNotify => xproto::UNMAP_NOTIFY_EVENT,
            EventKind::MapNotify => xproto::MAP_NOTIFY_EVENT,
            EventKind::MapRequest => xproto::MAP_REQUEST_EVENT,
            EventKind::ReparentNotify => xproto::REPARENT_NOTIFY_EVENT,
            EventKind::ConfigureNotify => xproto::CONFIGURE_NOTIFY_EVENT,
            EventKind::ConfigureRequest => xproto::CONFIGURE_REQUEST_EVENT,
            EventKind::GravityNotify => xproto::GRAVITY_NOTIFY_EVENT,
            EventKind::CirculateRequest => xproto::CIRCULATE_REQUEST_EVENT,
        }
    }

    /// Looks up the kind for a response type, ignoring the synthetic bit.
    /// Codes past the table (extension events) and unregistered codes give `None`.
    pub fn from_response_type(response_type: u8) -> Option<EventKind> {
        let code = response_type & !SYNTHETIC_BIT;
        DISPATCH.get(usize::from(code)).copied().flatten()
    }
}

const TABLE_LEN: usize = xproto::CIRCULATE_REQUEST_EVENT as usize + 1;

static DISPATCH: [Option<EventKind>; TABLE_LEN] = {
    let mut table = [None; TABLE_LEN];
    let mut i = 0;
    while i < EventKind::ALL.len() {
        let kind = EventKind::ALL[i];
        table[kind.code() as usize] = Some(kind);
        i += 1;
    }
    table
};

/// The parts of an event the handlers act on.
#[derive(Debug, Clone, PartialEq)]
pub enum WmEvent {
    CreateNotify(Window),
    DestroyNotify(Window),
    MapRequest(Window),
    ConfigureRequest {
        window: Window,
        fields: Vec<ConfigField>,
    },
    KeyPress {
        keycode: Keycode,
        state: u16,
    },
    Ignored(EventKind),
}

impl WmEvent {
    pub fn decode(kind: EventKind, raw: &[u8]) -> Result<Self, ParseError> {
        let event = match kind {
            EventKind::CreateNotify => {
                let (event, _) = CreateNotifyEvent::try_parse(raw)?;
                WmEvent::CreateNotify(event.window)
            }
            EventKind::DestroyNotify => {
                let (event, _) = DestroyNotifyEvent::try_parse(raw)?;
                WmEvent::DestroyNotify(event.window)
            }
            EventKind::MapRequest => {
                let (event, _) = MapRequestEvent::try_parse(raw)?;
                WmEvent::MapRequest(event.window)
            }
            EventKind::ConfigureRequest => {
                let (event, _) = ConfigureRequestEvent::try_parse(raw)?;
                WmEvent::ConfigureRequest {
                    window: event.window,
                    fields: requested_fields(&event),
                }
            }
            EventKind::KeyPress => {
                let (event, _) = KeyPressEvent::try_parse(raw)?;
                WmEvent::KeyPress {
                    keycode: event.detail,
                    state: u16::from(event.state),
                }
            }
            other => WmEvent::Ignored(other),
        };
        Ok(event)
    }
}

/// The values a client asked for, restricted to the bits set in its mask.
pub fn requested_fields(event: &ConfigureRequestEvent) -> Vec<ConfigField> {
    let mask = u16::from(event.value_mask);
    let has = |bit: ConfigWindow| mask & u16::from(bit) != 0;

    let mut fields = Vec::with_capacity(7);
    if has(ConfigWindow::X) {
        fields.push(ConfigField::X(i32::from(event.x)));
    }
    if has(ConfigWindow::Y) {
        fields.push(ConfigField::Y(i32::from(event.y)));
    }
    if has(ConfigWindow::WIDTH) {
        fields.push(ConfigField::Width(u32::from(event.width)));
    }
    if has(ConfigWindow::HEIGHT) {
        fields.push(ConfigField::Height(u32::from(event.height)));
    }
    if has(ConfigWindow::BORDER_WIDTH) {
        fields.push(ConfigField::BorderWidth(u32::from(event.border_width)));
    }
    if has(ConfigWindow::SIBLING) {
        fields.push(ConfigField::Sibling(event.sibling));
    }
    if has(ConfigWindow::STACK_MODE) {
        fields.push(ConfigField::StackMode(StackMode::from(event.stack_mode)));
    }
    fields
}


#[cfg(test)]
mod tests {
    use super::wire::{self, ConfigureRequest};
    use super::*;

    fn request(value_mask: u16) -> [u8; 32] {
        wire::configure_request(&ConfigureRequest {
            window: 42,
            stack_mode: 1,
            sibling: 7,
            x: -5,
            y: 10,
            width: 640,
            height: 480,
            border_width: 2,
            value_mask,
        })
    }

    fn decode(raw: &[u8]) -> WmEvent {
        let kind = EventKind::from_response_type(raw[0]).unwrap();
        WmEvent::decode(kind, raw).unwrap()
    }

    #[test]
    fn every_kind_round_trips_through_its_code() {
        for kind in EventKind::ALL {
            assert_eq!(EventKind::from_response_type(kind.code()), Some(kind));
        }
    }

    #[test]
    fn synthetic_bit_is_masked() {
        assert_eq!(
            EventKind::from_response_type(xproto::MAP_REQUEST_EVENT | 0x80),
            Some(EventKind::MapRequest)
        );
    }

    #[test]
    fn unregistered_and_out_of_range_codes_have_no_kind() {
        assert_eq!(EventKind::from_response_type(0), None);
        assert_eq!(EventKind::from_response_type(xproto::EXPOSE_EVENT), None);
        assert_eq!(EventKind::from_response_type(xproto::CLIENT_MESSAGE_EVENT), None);
        assert_eq!(EventKind::from_response_type(100), None);
        assert_eq!(EventKind::from_response_type(0x7f), None);
    }

    #[test]
    fn decodes_structural_events() {
        assert_eq!(decode(&wire::create_notify(5)), WmEvent::CreateNotify(5));
        assert_eq!(decode(&wire::destroy_notify(6)), WmEvent::DestroyNotify(6));
        assert_eq!(decode(&wire::map_request(7)), WmEvent::MapRequest(7));
        assert_eq!(
            decode(&wire::key_press(38, 0x9)),
            WmEvent::KeyPress {
                keycode: 38,
                state: 0x9
            }
        );
    }

    #[test]
    fn width_and_stack_mode_only() {
        let mask = u16::from(ConfigWindow::WIDTH) | u16::from(ConfigWindow::STACK_MODE);
        assert_eq!(
            decode(&request(mask)),
            WmEvent::ConfigureRequest {
                window: 42,
                fields: vec![
                    ConfigField::Width(640),
                    ConfigField::StackMode(StackMode::BELOW),
                ],
            }
        );
    }

    #[test]
    fn full_mask_keeps_bit_order() {
        let WmEvent::ConfigureRequest { fields, .. } = decode(&request(0x7f)) else {
            panic!("expected a configure request");
        };
        assert_eq!(
            fields,
            vec![
                ConfigField::X(-5),
                ConfigField::Y(10),
                ConfigField::Width(640),
                ConfigField::Height(480),
                ConfigField::BorderWidth(2),
                ConfigField::Sibling(7),
                ConfigField::StackMode(StackMode::BELOW),
            ]
        );
    }

    #[test]
    fn empty_mask_forwards_nothing() {
        let WmEvent::ConfigureRequest { fields, .. } = decode(&request(0)) else {
            panic!("expected a configure request");
        };
        assert!(fields.is_empty());
    }

    #[test]
    fn truncated_record_fails_to_decode() {
        let raw = wire::create_notify(5);
        assert!(WmEvent::decode(EventKind::CreateNotify, &raw[..12]).is_err());
    }
}
