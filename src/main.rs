/// Entry point and editor loop.

mod config;
mod domain;
mod edit;
mod error;
mod logging;
mod ui;

use std::path::Path;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyModifiers};

use config::EditorConfig;
use domain::tile::PALETTE;
use edit::codec::LevelCodec;
use edit::level_io;
use edit::session::{EditEvent, EditSession};
use error::Result;
use ui::gamepad::GamepadState;
use ui::input::{InputState, MousePress};
use ui::prompt::{parse_dimensions, Prompt, PromptKind, PromptOutcome};
use ui::renderer::{screen_to_cell, Renderer};
use ui::screen::{Overlay, Screen};
use ui::sound::{self, SoundEngine};

/// Longest wait for input per frame (~60 fps).
const FRAME_WAIT: Duration = Duration::from_millis(16);

fn main() {
    let config = EditorConfig::load();
    let log_path = logging::init(&level_io::data_dir(), config.log_level);
    log::info!(
        "starting with a {}x{} grid, exports to {}",
        config.grid.rows,
        config.grid.cols,
        config.export.dir.display()
    );
    for warning in &config.warnings {
        log::warn!("{warning}");
    }

    let codec = LevelCodec::new(&config.export.key);
    let session = match EditSession::new(config.grid.rows, config.grid.cols, codec) {
        Ok(session) => session,
        Err(e) => {
            log::error!("cannot start: {e}");
            eprintln!("Cannot start editor: {e}");
            return;
        }
    };

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();
    let mut editor = Editor {
        session,
        screen: Screen::new(),
        sound: sound.as_ref(),
        config: &config,
        last_drag: None,
    };
    match config.warnings.first() {
        Some(warning) => editor.screen.set_error(warning),
        None => editor.screen.set_message("F1 for help"),
    }

    let result = editor.run(&mut renderer);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        log::error!("editor stopped: {e}");
        eprintln!("Editor error: {e}");
    }
    if let Some(path) = log_path {
        println!("Log written to {}", path.display());
    }
}

struct Editor<'a> {
    session: EditSession,
    screen: Screen,
    sound: Option<&'a SoundEngine>,
    config: &'a EditorConfig,
    /// Cell last painted by a mouse drag, so holding still doesn't repaint.
    last_drag: Option<(usize, usize)>,
}

impl Editor<'_> {
    fn run(&mut self, renderer: &mut Renderer) -> std::io::Result<()> {
        let mut kb = InputState::new();
        let mut gp = GamepadState::new();
        gp.load_button_config(&self.config.gamepad);
        if gp.connected {
            log::info!("gamepad connected");
        }

        loop {
            kb.drain_events(FRAME_WAIT);
            gp.update();

            if self.handle_input(&kb, &gp) {
                break;
            }

            self.screen.tick();
            renderer.render(&self.session, &mut self.screen)?;
        }

        Ok(())
    }

    /// Route this frame's input. Returns true to quit.
    fn handle_input(&mut self, kb: &InputState, gp: &GamepadState) -> bool {
        match self.screen.overlay {
            Overlay::Prompt(_) => {
                self.handle_prompt_keys(kb);
                return false;
            }
            Overlay::Help => {
                if kb.any_pressed(&[KeyCode::Esc, KeyCode::F(1), KeyCode::Char('?')]) {
                    self.screen.overlay = Overlay::None;
                }
                return false;
            }
            Overlay::None => {}
        }

        if kb.ctrl_pressed('q') || kb.ctrl_pressed('c') {
            return self.request_quit();
        }
        if !kb.is_empty() {
            self.screen.quit_armed = false;
        }

        self.handle_keys(kb);
        for press in &kb.mouse {
            self.handle_mouse(*press);
        }
        self.handle_gamepad(gp);
        false
    }

    /// Quit straight away on a clean session; a dirty one needs a second
    /// request.
    fn request_quit(&mut self) -> bool {
        if !self.session.is_dirty() || self.screen.quit_armed {
            log::info!("quitting");
            return true;
        }
        self.screen.quit_armed = true;
        self.screen.set_error("Unsaved changes. Press Ctrl+Q again to quit");
        false
    }

    // ── Keyboard ──

    fn handle_keys(&mut self, kb: &InputState) {
        let (rows, cols) = (self.session.grid().rows(), self.session.grid().cols());

        for key in &kb.keys {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                continue;
            }
            let step = match key.code {
                KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some((-1, 0)),
                KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some((1, 0)),
                KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some((0, -1)),
                KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some((0, 1)),
                _ => None,
            };
            if let Some((dr, dc)) = step {
                self.screen.move_cursor(dr, dc, rows, cols);
            }
        }

        if kb.any_pressed(&[KeyCode::Enter, KeyCode::Char(' ')]) {
            self.activate_at_cursor();
        }

        for (i, &tile) in PALETTE.iter().enumerate() {
            let digit = char::from(b'1' + i as u8);
            if kb.was_pressed(KeyCode::Char(digit)) {
                let event = self.session.select_tile(tile);
                self.report(Ok(event));
            }
        }
        if kb.was_pressed(KeyCode::Tab) {
            let event = self.session.cycle_palette(true);
            self.report(Ok(event));
        }
        if kb.was_pressed(KeyCode::BackTab) {
            let event = self.session.cycle_palette(false);
            self.report(Ok(event));
        }

        if kb.any_pressed(&[KeyCode::Char('x'), KeyCode::Char('X')]) {
            let event = self.session.toggle_erase();
            self.report(Ok(event));
        }
        if kb.any_pressed(&[KeyCode::Char('u'), KeyCode::Char('U')]) || kb.ctrl_pressed('z') {
            let result = self.session.undo();
            self.report(result);
        }
        if kb.was_pressed(KeyCode::Delete) {
            let event = self.session.clear();
            self.report(Ok(event));
        }

        if kb.ctrl_pressed('s') || kb.was_pressed(KeyCode::F(2)) {
            self.open_export_prompt();
        } else if kb.ctrl_pressed('o') || kb.was_pressed(KeyCode::F(3)) {
            self.open_import_prompt();
        } else if kb.ctrl_pressed('r') || kb.was_pressed(KeyCode::F(4)) {
            let grid = self.session.grid();
            let initial = format!("{} {}", grid.rows(), grid.cols());
            self.screen.overlay = Overlay::Prompt(Prompt::new(PromptKind::Resize, &initial));
        } else if kb.any_pressed(&[KeyCode::F(1), KeyCode::Char('?')]) {
            self.screen.overlay = Overlay::Help;
        }
    }

    fn activate_at_cursor(&mut self) {
        let (row, col) = self.screen.cursor;
        let result = self.session.activate_cell(row, col);
        self.report(result);
    }

    // ── Mouse ──

    fn handle_mouse(&mut self, press: MousePress) {
        let grid = self.session.grid();
        let Some(cell) = screen_to_cell(&self.screen.camera, press.column, press.row, grid.rows(), grid.cols())
        else {
            return;
        };
        if press.drag && self.last_drag == Some(cell) {
            return;
        }
        self.last_drag = Some(cell);
        self.screen.cursor = cell;
        self.activate_at_cursor();
    }

    // ── Gamepad ──

    fn handle_gamepad(&mut self, gp: &GamepadState) {
        if let Some((dr, dc)) = gp.cursor_step() {
            let grid = self.session.grid();
            let (rows, cols) = (grid.rows(), grid.cols());
            self.screen.move_cursor(dr, dc, rows, cols);
        }
        if gp.place_pressed() {
            self.activate_at_cursor();
        }
        if gp.erase_pressed() {
            let event = self.session.toggle_erase();
            self.report(Ok(event));
        }
        if gp.undo_pressed() {
            let result = self.session.undo();
            self.report(result);
        }
        if gp.palette_prev_pressed() {
            let event = self.session.cycle_palette(false);
            self.report(Ok(event));
        }
        if gp.palette_next_pressed() {
            let event = self.session.cycle_palette(true);
            self.report(Ok(event));
        }
    }

    // ── Prompts ──

    fn open_export_prompt(&mut self) {
        let suggested = match &self.screen.level_path {
            Some(p) => p.clone(),
            None => level_io::next_free_path(&self.config.export.dir, &self.config.export.extension),
        };
        let initial = suggested.display().to_string();
        self.screen.overlay = Overlay::Prompt(Prompt::new(PromptKind::Export, &initial));
    }

    fn open_import_prompt(&mut self) {
        let initial = match &self.screen.level_path {
            Some(p) => p.display().to_string(),
            None => format!("{}/", self.config.export.dir.display()),
        };
        self.screen.overlay = Overlay::Prompt(Prompt::new(PromptKind::Import, &initial));
    }

    fn handle_prompt_keys(&mut self, kb: &InputState) {
        for key in &kb.keys {
            let Overlay::Prompt(prompt) = &mut self.screen.overlay else {
                return;
            };
            match prompt.handle_key(*key) {
                PromptOutcome::Pending => {}
                PromptOutcome::Cancel => self.screen.overlay = Overlay::None,
                PromptOutcome::Submit(text) => {
                    let kind = prompt.kind;
                    self.screen.overlay = Overlay::None;
                    if !text.is_empty() {
                        self.submit_prompt(kind, &text);
                    }
                }
            }
        }
    }

    fn submit_prompt(&mut self, kind: PromptKind, text: &str) {
        match kind {
            PromptKind::Export => {
                let path = level_io::with_extension(Path::new(text), &self.config.export.extension);
                let result = self.session.export_to(&path);
                if result.is_ok() {
                    self.screen.level_path = Some(path);
                }
                self.report(result);
            }
            PromptKind::Import => {
                let path = Path::new(text);
                let result = self.session.import_from(path);
                if result.is_ok() {
                    self.screen.level_path = Some(path.to_path_buf());
                }
                self.report(result);
            }
            PromptKind::Resize => match parse_dimensions(text) {
                Some((rows, cols)) => {
                    let result = self.session.resize(rows, cols);
                    self.report(result);
                }
                None => {
                    self.screen.set_error(&format!("'{text}' is not a size, expected `rows cols`"));
                    sound::play_error(self.sound);
                }
            },
        }
    }

    // ── Feedback ──

    /// Message bar, sound and log for the outcome of an edit.
    fn report(&mut self, result: Result<EditEvent>) {
        match result {
            Ok(event) => {
                sound::play_event(self.sound, &event);
                if matches!(event, EditEvent::Imported { .. } | EditEvent::Resized { .. }) {
                    let grid = self.session.grid();
                    let (rows, cols) = (grid.rows(), grid.cols());
                    self.screen.clamp_cursor(rows, cols);
                    let (r, c) = self.screen.cursor;
                    self.screen.camera.center_on(c, r, cols, rows);
                }
                if let Some(msg) = describe(&event) {
                    self.screen.set_message(&msg);
                }
            }
            Err(e) => {
                log::warn!("{e}");
                self.screen.set_error(&e.to_string());
                sound::play_error(self.sound);
            }
        }
    }
}

/// Message-bar text for an event. Painting is silent.
fn describe(event: &EditEvent) -> Option<String> {
    let msg = match event {
        EditEvent::Placed { .. } | EditEvent::Erased { .. } | EditEvent::Unchanged { .. } => return None,
        EditEvent::TileSelected(tile) => format!("Tile: {}", tile.name()),
        EditEvent::EraseToggled(true) => "Erase mode ON".to_string(),
        EditEvent::EraseToggled(false) => "Erase mode OFF".to_string(),
        EditEvent::Cleared => "Level cleared".to_string(),
        EditEvent::Undone { row, col, restored } => {
            format!("Undo: ({row},{col}) is {} again", restored.name())
        }
        EditEvent::NothingToUndo => "Nothing to undo".to_string(),
        EditEvent::Exported { path } => format!("Exported to {}", path.display()),
        EditEvent::Imported { path, rows, cols } => {
            format!("Imported {rows}x{cols} level from {}", path.display())
        }
        EditEvent::Resized { rows, cols } => format!("Resized to {rows}x{cols}"),
    };
    Some(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tile::Tile;

    #[test]
    fn painting_is_silent() {
        assert_eq!(describe(&EditEvent::Placed { row: 0, col: 0, tile: Tile::Wall }), None);
        assert_eq!(describe(&EditEvent::Erased { row: 1, col: 1 }), None);
    }

    #[test]
    fn messages_name_the_tile_and_size() {
        assert_eq!(describe(&EditEvent::TileSelected(Tile::Coin)).as_deref(), Some("Tile: Coin"));
        assert_eq!(describe(&EditEvent::Resized { rows: 4, cols: 9 }).as_deref(), Some("Resized to 4x9"));
    }
}
