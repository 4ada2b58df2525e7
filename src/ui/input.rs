/// Terminal input collector.
///
/// Drains every pending crossterm event once per frame and sorts it into
/// key presses (Press and Repeat; Release is ignored so auto-repeat moves
/// the cursor) and left-button mouse presses/drags in terminal cells.

use std::time::Duration;

use crossterm::event::{
    self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton,
    MouseEventKind,
};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct MousePress {
    pub column: u16,
    pub row: u16,
    /// Part of a drag that started earlier.
    pub drag: bool,
}

pub struct InputState {
    /// Key events received during the last `drain_events`, in order.
    pub keys: Vec<KeyEvent>,
    pub mouse: Vec<MousePress>,
    /// Terminal was resized since the last drain.
    pub resized: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            keys: Vec::with_capacity(8),
            mouse: Vec::with_capacity(8),
            resized: false,
        }
    }

    /// Read all pending events, waiting at most `wait` for the first one.
    /// Read errors end the drain early; the next frame tries again.
    pub fn drain_events(&mut self, wait: Duration) {
        self.keys.clear();
        self.mouse.clear();
        self.resized = false;

        let mut timeout = wait;
        while poll(timeout).unwrap_or(false) {
            timeout = Duration::ZERO;
            match event::read() {
                Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                    self.keys.push(key);
                }
                Ok(Event::Mouse(m)) => match m.kind {
                    MouseEventKind::Down(MouseButton::Left) => {
                        self.mouse.push(MousePress { column: m.column, row: m.row, drag: false });
                    }
                    MouseEventKind::Drag(MouseButton::Left) => {
                        self.mouse.push(MousePress { column: m.column, row: m.row, drag: true });
                    }
                    _ => {}
                },
                Ok(Event::Resize(..)) => self.resized = true,
                Ok(_) => {}
                Err(_) => break,
            }
        }
    }

    /// Was this key pressed this frame (any modifiers except Ctrl)?
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.keys
            .iter()
            .any(|k| k.code == code && !k.modifiers.contains(KeyModifiers::CONTROL))
    }

    /// Convenience: was any of these keys pressed?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Was Ctrl+`ch` pressed this frame? Case-insensitive.
    pub fn ctrl_pressed(&self, ch: char) -> bool {
        self.keys.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && matches!(k.code, KeyCode::Char(c) if c.eq_ignore_ascii_case(&ch))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty() && self.mouse.is_empty() && !self.resized
    }
}
