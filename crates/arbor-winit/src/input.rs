//! Winit input adapter
//!
//! Converts winit window events into arbor's backend-agnostic [`RawEvent`]s.
//! winit reports mouse buttons and wheel motion without a position, so the
//! translator remembers the last cursor position and modifier state.

use arbor::{
    Key, KeyEvent, Modifiers, MouseButton, MouseEvent, MouseEventKind, NamedKey, Point, RawEvent,
    Size,
};
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::keyboard::{Key as WinitKey, ModifiersState};

/// Pixels scrolled per wheel line
const PIXELS_PER_LINE: f32 = 20.0;

/// Stateful winit → [`RawEvent`] translator, one per window
#[derive(Debug, Default)]
pub struct InputTranslator {
    cursor: Point,
    modifiers: Modifiers,
}

impl InputTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last known cursor position in physical pixels
    pub fn cursor(&self) -> Point {
        self.cursor
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Translate one window event. Most produce one raw event, a key press
    /// with text produces the key followed by its characters, and events the
    /// engine has no use for produce none.
    pub fn translate(&mut self, event: &WindowEvent) -> Vec<RawEvent> {
        match event {
            WindowEvent::CursorMoved { position, .. } => vec![self.cursor_moved(*position)],
            WindowEvent::CursorLeft { .. } => vec![self.mouse(MouseEventKind::Leave)],
            WindowEvent::MouseInput { state, button, .. } => {
                vec![self.mouse_input(*state, *button)]
            }
            WindowEvent::MouseWheel { delta, .. } => vec![self.wheel(*delta)],
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = convert_modifiers(modifiers.state());
                Vec::new()
            }
            WindowEvent::KeyboardInput { event, .. } => self.key_input(
                &event.logical_key,
                event.text.as_deref(),
                event.state,
                event.repeat,
            ),
            WindowEvent::Focused(active) => vec![RawEvent::Activate(*active)],
            WindowEvent::Resized(size) => vec![RawEvent::Resize(convert_size(*size))],
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                vec![RawEvent::ScaleFactor(*scale_factor as f32)]
            }
            _ => Vec::new(),
        }
    }

    fn mouse(&self, kind: MouseEventKind) -> RawEvent {
        RawEvent::Mouse(MouseEvent::new(kind, self.cursor).with_modifiers(self.modifiers))
    }

    pub fn cursor_moved(&mut self, position: PhysicalPosition<f64>) -> RawEvent {
        self.cursor = Point::new(position.x.round() as i32, position.y.round() as i32);
        self.mouse(MouseEventKind::Move)
    }

    pub fn mouse_input(&self, state: ElementState, button: winit::event::MouseButton) -> RawEvent {
        let button = convert_mouse_button(button);
        self.mouse(match state {
            ElementState::Pressed => MouseEventKind::Down(button),
            ElementState::Released => MouseEventKind::Up(button),
        })
    }

    pub fn wheel(&self, delta: MouseScrollDelta) -> RawEvent {
        let (dx, dy) = match delta {
            MouseScrollDelta::LineDelta(x, y) => (x * PIXELS_PER_LINE, y * PIXELS_PER_LINE),
            MouseScrollDelta::PixelDelta(pos) => (pos.x as f32, pos.y as f32),
        };
        self.mouse(MouseEventKind::Wheel {
            dx: dx.round() as i32,
            dy: dy.round() as i32,
        })
    }

    /// Key down/up, plus the typed characters on press
    pub fn key_input(
        &self,
        logical_key: &WinitKey,
        text: Option<&str>,
        state: ElementState,
        repeat: bool,
    ) -> Vec<RawEvent> {
        let key = KeyEvent {
            key: convert_key(logical_key),
            modifiers: self.modifiers,
            repeat,
        };
        match state {
            ElementState::Released => vec![RawEvent::KeyUp(key)],
            ElementState::Pressed => {
                let mut events = vec![RawEvent::KeyDown(key)];
                // Ctrl+letter is a shortcut, not text
                let shortcut = self.modifiers.contains(Modifiers::CONTROL)
                    && !self.modifiers.contains(Modifiers::ALT);
                if let Some(text) = text.filter(|_| !shortcut) {
                    events.extend(text.chars().filter(|c| !c.is_control()).map(RawEvent::Char));
                }
                events
            }
        }
    }
}

pub fn convert_size(size: PhysicalSize<u32>) -> Size {
    Size::new(size.width as i32, size.height as i32)
}

pub fn convert_modifiers(state: ModifiersState) -> Modifiers {
    let mut modifiers = Modifiers::empty();
    modifiers.set(Modifiers::SHIFT, state.shift_key());
    modifiers.set(Modifiers::CONTROL, state.control_key());
    modifiers.set(Modifiers::ALT, state.alt_key());
    modifiers.set(Modifiers::SUPER, state.super_key());
    modifiers
}

/// Convert winit MouseButton to arbor MouseButton
pub fn convert_mouse_button(button: winit::event::MouseButton) -> MouseButton {
    match button {
        winit::event::MouseButton::Left => MouseButton::Left,
        winit::event::MouseButton::Right => MouseButton::Right,
        winit::event::MouseButton::Middle => MouseButton::Middle,
        winit::event::MouseButton::Back => MouseButton::Other(3),
        winit::event::MouseButton::Forward => MouseButton::Other(4),
        winit::event::MouseButton::Other(n) => MouseButton::Other(n.min(u8::MAX as u16) as u8),
    }
}

/// Convert winit Key to arbor Key
pub fn convert_key(key: &WinitKey) -> Key {
    match key {
        WinitKey::Named(named) => convert_named_key(named).map_or(Key::Unknown, Key::Named),
        WinitKey::Character(s) => Key::Character(s.to_string()),
        _ => Key::Unknown,
    }
}

/// Convert winit NamedKey to arbor NamedKey; `None` for keys arbor has no name for
pub fn convert_named_key(key: &winit::keyboard::NamedKey) -> Option<NamedKey> {
    use winit::keyboard::NamedKey as WN;

    let named = match key {
        WN::Enter => NamedKey::Enter,
        WN::Escape => NamedKey::Escape,
        WN::Backspace => NamedKey::Backspace,
        WN::Delete => NamedKey::Delete,
        WN::Tab => NamedKey::Tab,
        WN::Space => NamedKey::Space,
        WN::ArrowLeft => NamedKey::ArrowLeft,
        WN::ArrowRight => NamedKey::ArrowRight,
        WN::ArrowUp => NamedKey::ArrowUp,
        WN::ArrowDown => NamedKey::ArrowDown,
        WN::Home => NamedKey::Home,
        WN::End => NamedKey::End,
        WN::PageUp => NamedKey::PageUp,
        WN::PageDown => NamedKey::PageDown,
        WN::Shift => NamedKey::Shift,
        WN::Control => NamedKey::Control,
        WN::Alt => NamedKey::Alt,
        WN::Super => NamedKey::Super,
        WN::F1 => NamedKey::F(1),
        WN::F2 => NamedKey::F(2),
        WN::F3 => NamedKey::F(3),
        WN::F4 => NamedKey::F(4),
        WN::F5 => NamedKey::F(5),
        WN::F6 => NamedKey::F(6),
        WN::F7 => NamedKey::F(7),
        WN::F8 => NamedKey::F(8),
        WN::F9 => NamedKey::F(9),
        WN::F10 => NamedKey::F(10),
        WN::F11 => NamedKey::F(11),
        WN::F12 => NamedKey::F(12),
        _ => return None,
    };
    Some(named)
}
