/// One-line text prompt shown above the help bar.
///
/// Stands in for the open/save dialogs: export and import ask for a path,
/// resize asks for `rows cols`. Keys are fed in one at a time; the prompt
/// reports when the user submits or cancels.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PromptKind {
    Export,
    Import,
    Resize,
}

impl PromptKind {
    pub fn label(self) -> &'static str {
        match self {
            PromptKind::Export => "Export to",
            PromptKind::Import => "Import from",
            PromptKind::Resize => "New size (rows cols)",
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum PromptOutcome {
    Pending,
    Submit(String),
    Cancel,
}

#[derive(Clone, Debug)]
pub struct Prompt {
    pub kind: PromptKind,
    text: Vec<char>,
    /// Insertion point, in chars.
    cursor: usize,
}

impl Prompt {
    pub fn new(kind: PromptKind, initial: &str) -> Self {
        let text: Vec<char> = initial.chars().collect();
        let cursor = text.len();
        Prompt { kind, text, cursor }
    }

    pub fn text(&self) -> String {
        self.text.iter().collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PromptOutcome {
        match key.code {
            KeyCode::Enter => return PromptOutcome::Submit(self.text().trim().to_string()),
            KeyCode::Esc => return PromptOutcome::Cancel,
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.text.drain(..self.cursor);
                self.cursor = 0;
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.text.insert(self.cursor, c);
                self.cursor += 1;
            }
            KeyCode::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                self.text.remove(self.cursor);
            }
            KeyCode::Delete if self.cursor < self.text.len() => {
                self.text.remove(self.cursor);
            }
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.text.len()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.text.len(),
            _ => {}
        }
        PromptOutcome::Pending
    }
}

/// Parse a resize answer: two positive integers separated by space, `x`
/// or `,` (`"16 120"`, `"16x120"`).
pub fn parse_dimensions(s: &str) -> Option<(usize, usize)> {
    let parts: Vec<&str> = s
        .split(|c: char| c.is_whitespace() || c == 'x' || c == 'X' || c == ',')
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() != 2 {
        return None;
    }
    let rows = parts[0].parse::<usize>().ok()?;
    let cols = parts[1].parse::<usize>().ok()?;
    if rows == 0 || cols == 0 {
        return None;
    }
    Some((rows, cols))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(p: &mut Prompt, s: &str) {
        for c in s.chars() {
            assert_eq!(p.handle_key(key(KeyCode::Char(c))), PromptOutcome::Pending);
        }
    }

    #[test]
    fn typing_and_submit() {
        let mut p = Prompt::new(PromptKind::Export, "levels/");
        type_str(&mut p, "cave.rll");
        assert_eq!(p.handle_key(key(KeyCode::Enter)), PromptOutcome::Submit("levels/cave.rll".into()));
    }

    #[test]
    fn editing_in_the_middle() {
        let mut p = Prompt::new(PromptKind::Import, "abd");
        p.handle_key(key(KeyCode::Left));
        type_str(&mut p, "c");
        assert_eq!(p.text(), "abcd");
        p.handle_key(key(KeyCode::Home));
        p.handle_key(key(KeyCode::Delete));
        assert_eq!(p.text(), "bcd");
        p.handle_key(key(KeyCode::End));
        p.handle_key(key(KeyCode::Backspace));
        assert_eq!(p.text(), "bc");
        assert_eq!(p.cursor(), 2);
    }

    #[test]
    fn backspace_at_start_does_nothing() {
        let mut p = Prompt::new(PromptKind::Import, "x");
        p.handle_key(key(KeyCode::Home));
        p.handle_key(key(KeyCode::Backspace));
        assert_eq!(p.text(), "x");
    }

    #[test]
    fn ctrl_u_kills_to_start() {
        let mut p = Prompt::new(PromptKind::Export, "/tmp/old.rll");
        p.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert_eq!(p.text(), "");
        type_str(&mut p, "new");
        assert_eq!(p.text(), "new");
    }

    #[test]
    fn esc_cancels() {
        let mut p = Prompt::new(PromptKind::Resize, "");
        assert_eq!(p.handle_key(key(KeyCode::Esc)), PromptOutcome::Cancel);
    }

    #[test]
    fn dimensions() {
        assert_eq!(parse_dimensions("16 120"), Some((16, 120)));
        assert_eq!(parse_dimensions(" 8x40 "), Some((8, 40)));
        assert_eq!(parse_dimensions("8,40"), Some((8, 40)));
        assert_eq!(parse_dimensions("0 40"), None);
        assert_eq!(parse_dimensions("8"), None);
        assert_eq!(parse_dimensions("8 40 2"), None);
        assert_eq!(parse_dimensions("a b"), None);
    }
}
