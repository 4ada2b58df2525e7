/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Screen layout, top to bottom: status bar, palette bar, gap, the level
/// viewport, gap, message bar, and a last line that is either the open
/// prompt or the key hints.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::tile::{Tile, PALETTE};
use crate::edit::session::EditSession;
use crate::ui::screen::{Overlay, Screen};
use crate::ui::viewport::Camera;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells. Using the
    /// same RGB for `Clear` and every cell keeps VTE row gaps invisible.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel used to invalidate the back buffer so every cell is diff'd.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y), one column per char. Returns the column
    /// after the last char written.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) -> usize {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width {
                break;
            }
            self.set(cx, y, Cell::new(ch, fg, bg));
            cx += 1;
        }
        cx
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }
}

// ── Layout ──

/// Terminal columns per level cell.
pub const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
const PALETTE_ROW: usize = 1;
pub const MAP_ROW: usize = 3;
/// Rows not available to the viewport: everything above MAP_ROW plus the
/// gap, message bar and hint/prompt line below it.
const RESERVED_ROWS: usize = MAP_ROW + 3;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const ERR_BG: Color = Color::Rgb { r: 170, g: 40, b: 40 };
const SELECT_BG: Color = Color::Rgb { r: 30, g: 70, b: 30 };
const CURSOR_BG: Color = Color::Rgb { r: 90, g: 90, b: 160 };

/// Terminal cell -> level (row, col), `None` outside the viewport or in
/// the void around a small level.
pub fn screen_to_cell(camera: &Camera, column: u16, row: u16, rows: usize, cols: usize) -> Option<(usize, usize)> {
    let row = row as usize;
    if row < MAP_ROW {
        return None;
    }
    let vx = column as usize / CELL_W;
    let vy = row - MAP_ROW;
    camera.view_to_level(vx, vy, cols, rows).map(|(c, r)| (r, c))
}

/// Glyph pair and colours for a placed tile.
fn tile_look(tile: Tile) -> (char, char, Color, Color) {
    match tile {
        Tile::Air => (' ', ' ', Color::Reset, Color::Reset),
        Tile::Wall => ('▓', '▓', Color::Rgb { r: 180, g: 120, b: 60 }, Color::Rgb { r: 100, g: 65, b: 30 }),
        Tile::DarkWall => ('█', '█', Color::Rgb { r: 120, g: 120, b: 120 }, Color::Rgb { r: 70, g: 70, b: 70 }),
        Tile::Coin => ('(', ')', Color::Rgb { r: 255, g: 215, b: 0 }, Color::Reset),
        Tile::Enemy => ('&', '&', Color::Rgb { r: 255, g: 70, b: 70 }, Color::Reset),
        Tile::Exit => ('[', ']', Color::Rgb { r: 80, g: 255, b: 80 }, Color::Rgb { r: 0, g: 60, b: 20 }),
        Tile::Player => ('@', '@', Color::Rgb { r: 100, g: 200, b: 255 }, Color::Reset),
        Tile::Spikes => ('^', '^', Color::White, Color::Rgb { r: 90, g: 20, b: 20 }),
    }
}

const HELP_LINES: &[&str] = &[
    " Mouse click/drag   Paint or erase cell",
    " Arrows / WASD      Move cursor",
    " Enter / Space      Paint at cursor",
    " 1-7, Tab/S-Tab     Pick tile",
    " X                  Toggle erase",
    " U / Ctrl+Z         Undo",
    " Delete             Clear level",
    " Ctrl+S / F2        Export",
    " Ctrl+O / F3        Import",
    " Ctrl+R / F4        Resize",
    " Ctrl+Q             Quit",
    "",
    " Esc / F1           Close this help",
];

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, session: &EditSession, screen: &mut Screen) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        let grid = session.grid();
        screen.camera.view_w = (self.term_w / CELL_W).max(1);
        screen.camera.view_h = self.term_h.saturating_sub(RESERVED_ROWS).max(1);
        screen.camera.follow(screen.cursor.1, screen.cursor.0, grid.cols(), grid.rows());

        self.front.clear();
        self.compose_status(session, screen);
        self.compose_palette(session);
        self.compose_map(session, screen);
        self.compose_footer(screen);
        if let Overlay::Help = screen.overlay {
            self.compose_help(&screen.camera);
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;

        // Explicit base colours; ResetColor would fall back to the
        // terminal's own default.
        queue!(self.writer, SetForegroundColor(Color::White), SetBackgroundColor(Cell::BASE_BG))?;

        for y in 0..self.front.height {
            let mut need_move = true;
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }
                if need_move {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_status(&mut self, session: &EditSession, screen: &Screen) {
        let grid = session.grid();
        let name = screen
            .level_path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "untitled".to_string());
        let dirty = if session.is_dirty() { "*" } else { "" };
        let (r, c) = screen.cursor;
        let under = match grid.is_set(r, c) {
            Ok(true) => grid.get(r, c).map(Tile::name).unwrap_or("-"),
            _ => "unset",
        };

        let undo = match session.history().peek() {
            Some(last) => format!("{} (last {},{})", session.history().len(), last.row, last.col),
            None => "0".to_string(),
        };

        self.front.fill_row(HUD_ROW, HUD_BG);
        let hud = format!(
            " levelforge │ {}{} │ {}x{} │ ({},{}) {} │ filled {} │ undo {} ",
            name,
            dirty,
            grid.rows(),
            grid.cols(),
            r,
            c,
            under,
            grid.count_filled(),
            undo,
        );
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);
    }

    fn compose_palette(&mut self, session: &EditSession) {
        let mut x = 1;
        for (i, &tile) in PALETTE.iter().enumerate() {
            let selected = !session.erase_mode() && session.selected() == tile;
            let bg = if selected { SELECT_BG } else { Color::Reset };
            let label_fg = if selected { Color::Rgb { r: 80, g: 255, b: 80 } } else { Color::DarkGrey };

            x = self.front.put_str(x, PALETTE_ROW, &format!("{}:", i + 1), label_fg, bg);
            let (c0, c1, fg, tbg) = tile_look(tile);
            self.front.set(x, PALETTE_ROW, Cell::new(c0, fg, tbg));
            self.front.set(x + 1, PALETTE_ROW, Cell::new(c1, fg, tbg));
            x = self.front.put_str(x + 2, PALETTE_ROW, &format!(" {} ", tile.name()), Color::White, bg);
            x += 1;
        }

        let (label, fg, bg) = if session.erase_mode() {
            (" X:ERASE ", Color::Black, MSG_BG)
        } else {
            (" X:erase ", Color::DarkGrey, Color::Reset)
        };
        self.front.put_str(x, PALETTE_ROW, label, fg, bg);
    }

    fn compose_map(&mut self, session: &EditSession, screen: &Screen) {
        let grid = session.grid();
        let cam = &screen.camera;

        for vy in 0..cam.view_h {
            let row = MAP_ROW + vy;
            if row >= self.front.height {
                break;
            }
            for vx in 0..cam.view_w {
                let col = vx * CELL_W;
                if col + 1 >= self.front.width {
                    break;
                }
                let Some((gc, gr)) = cam.view_to_level(vx, vy, grid.cols(), grid.rows()) else {
                    continue;
                };

                let (c0, c1, fg, mut bg) = match grid.is_set(gr, gc) {
                    Ok(true) => tile_look(grid.get(gr, gc).unwrap_or_default()),
                    _ => ('·', ' ', Color::Rgb { r: 70, g: 70, b: 90 }, Color::Rgb { r: 28, g: 28, b: 44 }),
                };
                if (gr, gc) == screen.cursor {
                    bg = CURSOR_BG;
                }
                self.front.set(col, row, Cell::new(c0, fg, bg));
                self.front.set(col + 1, row, Cell::new(c1, fg, bg));
            }
        }
    }

    fn compose_footer(&mut self, screen: &Screen) {
        let msg_row = MAP_ROW + screen.camera.view_h + 1;
        let last_row = msg_row + 1;

        if msg_row < self.front.height && !screen.message.is_empty() {
            let (fg, bg) = if screen.message_is_error { (Color::White, ERR_BG) } else { (Color::Black, MSG_BG) };
            self.front.fill_row(msg_row, bg);
            self.front.put_str(0, msg_row, &format!(" ◈ {} ", screen.message), fg, bg);
        }

        if last_row >= self.front.height {
            return;
        }
        match &screen.overlay {
            Overlay::Prompt(prompt) => {
                let label = format!(" {}: ", prompt.kind.label());
                let start = self.front.put_str(0, last_row, &label, Color::Rgb { r: 255, g: 220, b: 50 }, Color::Reset);
                let text: Vec<char> = prompt.text().chars().collect();
                // Scroll so the insertion point stays on screen.
                let room = self.front.width.saturating_sub(start + 1);
                let skip = prompt.cursor().saturating_sub(room);
                for (i, &ch) in text.iter().enumerate().skip(skip) {
                    self.front.set(start + i - skip, last_row, Cell::new(ch, Color::White, Color::Reset));
                }
                let cx = start + prompt.cursor() - skip;
                let under = text.get(prompt.cursor()).copied().unwrap_or(' ');
                self.front.set(cx, last_row, Cell::new(under, Color::Black, Color::White));
            }
            _ => {
                let help = " Click/Enter:Paint  1-7:Tile  X:Erase  U:Undo  Del:Clear  ^S:Export  ^O:Import  ^R:Resize  F1:Help  ^Q:Quit";
                self.front.put_str(0, last_row, help, Color::DarkGrey, Color::Reset);
            }
        }
    }

    fn compose_help(&mut self, cam: &Camera) {
        let bg = Color::Rgb { r: 40, g: 40, b: 40 };
        let hdr = Color::Rgb { r: 255, g: 220, b: 50 };
        let key_c = Color::Rgb { r: 100, g: 200, b: 255 };

        let view_cols = (cam.view_w * CELL_W).min(self.front.width);
        let box_w = 44_usize.min(view_cols);
        let box_h = (HELP_LINES.len() + 3).min(cam.view_h);
        let box_x = view_cols.saturating_sub(box_w) / 2;
        let box_y = MAP_ROW + cam.view_h.saturating_sub(box_h) / 2;

        for y in box_y..box_y + box_h {
            for x in box_x..box_x + box_w {
                self.front.set(x, y, Cell::new(' ', Color::White, bg));
            }
        }
        self.front.put_str(box_x + 2, box_y, "levelforge keys", hdr, bg);
        for (i, line) in HELP_LINES.iter().enumerate() {
            let y = box_y + 2 + i;
            if y >= box_y + box_h {
                break;
            }
            self.front.put_str(box_x + 1, y, line, key_c, bg);
        }
    }
}
