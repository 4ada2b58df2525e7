/// Presentation state that is not part of the level: cursor, camera,
/// message bar, open overlay, and the file the level came from.

use std::path::PathBuf;

use crate::ui::prompt::Prompt;
use crate::ui::viewport::Camera;

/// Frames a normal message stays on the bar (~2.5s at 60 fps).
pub const MESSAGE_TICKS: u32 = 150;

pub enum Overlay {
    None,
    Help,
    Prompt(Prompt),
}

pub struct Screen {
    /// (row, col) of the keyboard cursor.
    pub cursor: (usize, usize),
    pub camera: Camera,
    pub message: String,
    pub message_timer: u32,
    pub message_is_error: bool,
    pub overlay: Overlay,
    /// Last file exported to or imported from.
    pub level_path: Option<PathBuf>,
    /// First quit request on a dirty session arms this; the second quits.
    pub quit_armed: bool,
}

impl Screen {
    pub fn new() -> Self {
        Screen {
            cursor: (0, 0),
            camera: Camera::new(),
            message: String::new(),
            message_timer: 0,
            message_is_error: false,
            overlay: Overlay::None,
            level_path: None,
            quit_armed: false,
        }
    }

    pub fn set_message(&mut self, msg: &str) {
        self.message = msg.to_string();
        self.message_timer = MESSAGE_TICKS;
        self.message_is_error = false;
    }

    /// Errors stay twice as long.
    pub fn set_error(&mut self, msg: &str) {
        self.message = msg.to_string();
        self.message_timer = MESSAGE_TICKS * 2;
        self.message_is_error = true;
    }

    /// Count down the message timer; clears the bar when it runs out.
    pub fn tick(&mut self) {
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message.clear();
            }
        }
    }

    /// Move the cursor, clamped to the level.
    pub fn move_cursor(&mut self, d_row: i32, d_col: i32, rows: usize, cols: usize) {
        let step = |pos: usize, d: i32, len: usize| -> usize {
            let max = len.saturating_sub(1) as i64;
            (pos as i64 + d as i64).clamp(0, max) as usize
        };
        self.cursor = (step(self.cursor.0, d_row, rows), step(self.cursor.1, d_col, cols));
    }

    /// Pull the cursor back inside after the level shrank.
    pub fn clamp_cursor(&mut self, rows: usize, cols: usize) {
        self.move_cursor(0, 0, rows, cols);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_expires() {
        let mut s = Screen::new();
        s.set_message("hello");
        for _ in 0..MESSAGE_TICKS - 1 {
            s.tick();
        }
        assert_eq!(s.message, "hello");
        s.tick();
        assert!(s.message.is_empty());
    }

    #[test]
    fn errors_last_longer() {
        let mut s = Screen::new();
        s.set_error("boom");
        assert!(s.message_is_error);
        for _ in 0..MESSAGE_TICKS {
            s.tick();
        }
        assert_eq!(s.message, "boom");
        s.set_message("fine");
        assert!(!s.message_is_error);
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let mut s = Screen::new();
        s.move_cursor(-1, -1, 10, 100);
        assert_eq!(s.cursor, (0, 0));
        s.move_cursor(50, 500, 10, 100);
        assert_eq!(s.cursor, (9, 99));
        s.clamp_cursor(3, 4);
        assert_eq!(s.cursor, (2, 3));
    }
}
