use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use bitflags::bitflags;
use winit::keyboard::KeyCode;

bitflags! {
    /// Modifier keys held while a key event fired.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const CTRL = 1;
        const SHIFT = 1 << 1;
    }
}

impl Modifiers {
    #[inline(always)]
    pub fn from_flags(ctrl: bool, shift: bool) -> Self {
        let mut m = Self::empty();
        m.set(Self::CTRL, ctrl);
        m.set(Self::SHIFT, shift);
        m
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiEvent {
    KeyPressed { key: KeyCode, modifiers: Modifiers },
    KeyReleased { key: KeyCode, modifiers: Modifiers },
    Closed,
}

impl UiEvent {
    #[inline(always)]
    pub const fn is_exit_request(&self) -> bool {
        matches!(
            self,
            Self::Closed
                | Self::KeyPressed {
                    key: KeyCode::Escape,
                    ..
                }
        )
    }
}

/// Ordered UI events, drained once per tick.
pub trait UiEventSource {
    fn poll_event(&mut self) -> Option<UiEvent>;
}

/// Loopback event queue. Clones share the same queue, so a caller can keep
/// a handle and push events into a source owned by the game.
#[derive(Clone, Debug, Default)]
pub struct EventQueue(Rc<RefCell<VecDeque<UiEvent>>>);

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: UiEvent) {
        self.0.borrow_mut().push_back(event);
    }

    pub fn press(&self, key: KeyCode, modifiers: Modifiers) {
        self.push(UiEvent::KeyPressed { key, modifiers });
    }

    pub fn release(&self, key: KeyCode, modifiers: Modifiers) {
        self.push(UiEvent::KeyReleased { key, modifiers });
    }
}

impl UiEventSource for EventQueue {
    fn poll_event(&mut self) -> Option<UiEvent> {
        self.0.borrow_mut().pop_front()
    }
}

/// A physical key plus the modifiers that must accompany it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub key: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyBinding {
    #[inline(always)]
    pub const fn plain(key: KeyCode) -> Self {
        Self {
            key,
            modifiers: Modifiers::empty(),
        }
    }
}

/// Physical keys handed out to instrument keys, in binding order: the three
/// letter rows bottom-up, the digit row, function keys, then the numpad.
pub const QWERTY_KEYS: [KeyCode; 64] = [
    KeyCode::KeyZ,
    KeyCode::KeyX,
    KeyCode::KeyC,
    KeyCode::KeyV,
    KeyCode::KeyB,
    KeyCode::KeyN,
    KeyCode::KeyM,
    KeyCode::Comma,
    KeyCode::Period,
    KeyCode::Slash,
    KeyCode::KeyA,
    KeyCode::KeyS,
    KeyCode::KeyD,
    KeyCode::KeyF,
    KeyCode::KeyG,
    KeyCode::KeyH,
    KeyCode::KeyJ,
    KeyCode::KeyK,
    KeyCode::KeyL,
    KeyCode::Semicolon,
    KeyCode::Quote,
    KeyCode::KeyQ,
    KeyCode::KeyW,
    KeyCode::KeyE,
    KeyCode::KeyR,
    KeyCode::KeyT,
    KeyCode::KeyY,
    KeyCode::KeyU,
    KeyCode::KeyI,
    KeyCode::KeyO,
    KeyCode::KeyP,
    KeyCode::BracketLeft,
    KeyCode::BracketRight,
    KeyCode::Backslash,
    KeyCode::Backquote,
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
    KeyCode::Digit9,
    KeyCode::Digit0,
    KeyCode::Minus,
    KeyCode::Equal,
    KeyCode::F1,
    KeyCode::F2,
    KeyCode::F3,
    KeyCode::F4,
    KeyCode::F5,
    KeyCode::F6,
    KeyCode::F7,
    KeyCode::F8,
    KeyCode::F9,
    KeyCode::F10,
    KeyCode::F11,
    KeyCode::F12,
    KeyCode::Numpad1,
    KeyCode::Numpad2,
    KeyCode::Numpad3,
    KeyCode::Numpad4,
    KeyCode::Numpad5,
];

/// Parses a `KeyCode::Name` token as written in the config file.
pub fn parse_key_token(tok: &str) -> Option<KeyCode> {
    let t = tok.trim();
    let name = t.strip_prefix("KeyCode::").unwrap_or(t);
    let code = match name {
        "Escape" => KeyCode::Escape,
        "Enter" => KeyCode::Enter,
        "Space" => KeyCode::Space,
        "Comma" => KeyCode::Comma,
        "Period" => KeyCode::Period,
        "Slash" => KeyCode::Slash,
        "Semicolon" => KeyCode::Semicolon,
        "Quote" => KeyCode::Quote,
        "BracketLeft" => KeyCode::BracketLeft,
        "BracketRight" => KeyCode::BracketRight,
        "Backslash" => KeyCode::Backslash,
        "Backquote" => KeyCode::Backquote,
        "Minus" => KeyCode::Minus,
        "Equal" => KeyCode::Equal,
        "ArrowUp" => KeyCode::ArrowUp,
        "ArrowDown" => KeyCode::ArrowDown,
        "ArrowLeft" => KeyCode::ArrowLeft,
        "ArrowRight" => KeyCode::ArrowRight,
        _ => return QWERTY_KEYS.iter().copied().find(|k| format!("{k:?}") == name),
    };
    Some(code)
}
