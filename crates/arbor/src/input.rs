//! Backend-agnostic raw input events
//!
//! Platform shells translate their native events into [`RawEvent`]s and feed
//! them to the runtime together with the time they arrived.

use crate::primitives::{Point, Size};
use crate::timer::{TimerHandle, TimerOwner};
use bitflags::bitflags;

/// Backend-agnostic mouse button representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Middle mouse button (scroll wheel click)
    Middle,
    /// Right mouse button
    Right,
    /// Additional mouse buttons (back, forward, etc.)
    Other(u8),
}

impl MouseButton {
    /// Index used by the click detector (left=0, middle=1, right=2).
    ///
    /// Extra buttons are not tracked.
    pub const fn index(self) -> Option<usize> {
        match self {
            MouseButton::Left => Some(0),
            MouseButton::Middle => Some(1),
            MouseButton::Right => Some(2),
            MouseButton::Other(_) => None,
        }
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(MouseButton::Left),
            1 => Some(MouseButton::Middle),
            2 => Some(MouseButton::Right),
            _ => None,
        }
    }
}

/// Backend-agnostic named key representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Enter,
    Escape,
    Backspace,
    Delete,
    Tab,
    Space,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    PageUp,
    PageDown,
    Shift,
    Control,
    Alt,
    Super,
    /// Function keys F1-F24
    F(u8),
}

/// Backend-agnostic key representation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A named key (Enter, Escape, arrows, etc.)
    Named(NamedKey),
    /// A character key (letters, numbers, symbols)
    Character(String),
    /// Unknown/unhandled key
    Unknown,
}

impl Key {
    pub fn is_named(&self, named: NamedKey) -> bool {
        matches!(self, Key::Named(n) if *n == named)
    }
}

bitflags! {
    /// Modifier keys held while an event happened
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const CONTROL = 1 << 1;
        const ALT = 1 << 2;
        const SUPER = 1 << 3;
    }
}

/// Key press or release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
    /// Auto-repeat from a held key
    pub repeat: bool,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::empty(),
            repeat: false,
        }
    }

    pub fn named(named: NamedKey) -> Self {
        Self::new(Key::Named(named))
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// What happened to the mouse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEventKind {
    Move,
    Down(MouseButton),
    Up(MouseButton),
    /// Double click reported by the platform itself
    DoubleClick(MouseButton),
    /// Wheel scrolled by (dx, dy) pixels
    Wheel { dx: i32, dy: i32 },
    /// Pointer left the client area
    Leave,
}

/// Mouse input in window coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    pub position: Point,
    pub modifiers: Modifiers,
}

impl MouseEvent {
    pub fn new(kind: MouseEventKind, position: Point) -> Self {
        Self {
            kind,
            position,
            modifiers: Modifiers::empty(),
        }
    }

    pub fn moved(position: Point) -> Self {
        Self::new(MouseEventKind::Move, position)
    }

    pub fn down(button: MouseButton, position: Point) -> Self {
        Self::new(MouseEventKind::Down(button), position)
    }

    pub fn up(button: MouseButton, position: Point) -> Self {
        Self::new(MouseEventKind::Up(button), position)
    }

    pub fn double_click(button: MouseButton, position: Point) -> Self {
        Self::new(MouseEventKind::DoubleClick(button), position)
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Everything a platform shell can feed into the runtime
#[derive(Debug, Clone, PartialEq)]
pub enum RawEvent {
    Mouse(MouseEvent),
    /// Text input, already composed by the platform
    Char(char),
    KeyDown(KeyEvent),
    KeyUp(KeyEvent),
    /// Window gained (true) or lost (false) activation
    Activate(bool),
    /// Client area changed size
    Resize(Size),
    /// DPI scale factor changed
    ScaleFactor(f32),
    /// A timer came due; produced by the runtime's timer service
    Timer(TimerHandle, TimerOwner),
    /// Nothing happened; lets the every-message hook run
    Wake,
}

impl From<MouseEvent> for RawEvent {
    fn from(event: MouseEvent) -> Self {
        RawEvent::Mouse(event)
    }
}
