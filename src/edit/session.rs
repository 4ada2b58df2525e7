/// EditSession: everything the presentation layer can do to a level.
///
/// Owns the grid, its undo history and the selection state (selected
/// tile, erase mode). The UI holds one session and calls these methods in
/// response to input; each call reports what happened as an `EditEvent`
/// so the UI can pick a message and a sound without peeking at the grid.

use std::path::{Path, PathBuf};

use crate::domain::grid::TileGrid;
use crate::domain::history::{TileAction, UndoHistory};
use crate::domain::tile::{Tile, PALETTE};
use crate::edit::codec::LevelCodec;
use crate::edit::level_io;
use crate::error::{EditorError, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditEvent {
    Placed { row: usize, col: usize, tile: Tile },
    Erased { row: usize, col: usize },
    /// The cell already held the tile; nothing recorded.
    Unchanged { row: usize, col: usize },
    TileSelected(Tile),
    EraseToggled(bool),
    Cleared,
    Undone { row: usize, col: usize, restored: Tile },
    NothingToUndo,
    Exported { path: PathBuf },
    Imported { path: PathBuf, rows: usize, cols: usize },
    Resized { rows: usize, cols: usize },
}

pub struct EditSession {
    grid: TileGrid,
    history: UndoHistory,
    codec: LevelCodec,
    selected: Tile,
    erase_mode: bool,
    dirty: bool,
}

impl EditSession {
    pub fn new(rows: usize, cols: usize, codec: LevelCodec) -> Result<Self> {
        Ok(EditSession {
            grid: TileGrid::new(rows, cols)?,
            history: UndoHistory::new(),
            codec,
            selected: Tile::Air,
            erase_mode: false,
            dirty: false,
        })
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn history(&self) -> &UndoHistory {
        &self.history
    }

    pub fn selected(&self) -> Tile {
        self.selected
    }

    pub fn erase_mode(&self) -> bool {
        self.erase_mode
    }

    /// Unsaved changes since the last export or import.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// A cell was clicked: erase it in erase mode, otherwise place the
    /// selected tile. The change is recorded for undo.
    pub fn activate_cell(&mut self, row: usize, col: usize) -> Result<EditEvent> {
        let tile = if self.erase_mode { Tile::Air } else { self.selected };
        let was_unset = !self.grid.is_set(row, col)?;
        if !was_unset && self.grid.get(row, col)? == tile {
            return Ok(EditEvent::Unchanged { row, col });
        }

        let previous = self.grid.set(row, col, tile)?;
        self.history.record(TileAction { row, col, previous, new: tile, was_unset });
        self.dirty = true;
        log::debug!("({}, {}) {:?} -> {:?}", row, col, previous, tile);

        Ok(if self.erase_mode {
            EditEvent::Erased { row, col }
        } else {
            EditEvent::Placed { row, col, tile }
        })
    }

    /// Pick a tile for subsequent placements. Leaves erase mode.
    pub fn select_tile(&mut self, tile: Tile) -> EditEvent {
        self.selected = tile;
        self.erase_mode = false;
        EditEvent::TileSelected(tile)
    }

    /// Step through `PALETTE`. From a tile without a palette slot (Air),
    /// forward starts at the first entry and backward at the last.
    pub fn cycle_palette(&mut self, forward: bool) -> EditEvent {
        let len = PALETTE.len();
        let next = match (self.selected.palette_index(), forward) {
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
            (None, true) => 0,
            (None, false) => len - 1,
        };
        self.select_tile(PALETTE[next])
    }

    pub fn toggle_erase(&mut self) -> EditEvent {
        self.erase_mode = !self.erase_mode;
        EditEvent::EraseToggled(self.erase_mode)
    }

    /// Blank the whole level. Not undoable; existing history is kept.
    pub fn clear(&mut self) -> EditEvent {
        self.grid.clear();
        self.dirty = true;
        log::info!("level cleared ({} undo entries kept)", self.history.len());
        EditEvent::Cleared
    }

    pub fn undo(&mut self) -> Result<EditEvent> {
        let action = match self.history.undo() {
            Some(a) => a,
            None => return Ok(EditEvent::NothingToUndo),
        };
        if let Err(e) = self.grid.revert(&action) {
            // keep the entry so the history still matches the grid
            self.history.record(action);
            return Err(e);
        }
        self.dirty = true;
        Ok(EditEvent::Undone { row: action.row, col: action.col, restored: action.previous })
    }

    /// Encoded form of the current grid.
    pub fn export_text(&self) -> Result<String> {
        let text = self.codec.encode_grid(&self.grid);
        if text.is_empty() {
            return Err(EditorError::EncodeFailed {
                rows: self.grid.rows(),
                cols: self.grid.cols(),
                len: self.grid.len(),
            });
        }
        Ok(text)
    }

    /// Encode and write the level. On failure the file may be missing but
    /// the session is unchanged.
    pub fn export_to(&mut self, path: &Path) -> Result<EditEvent> {
        let text = self.export_text()?;
        level_io::write_level(path, &text)?;
        self.dirty = false;
        log::info!("exported {}x{} level to {}", self.grid.rows(), self.grid.cols(), path.display());
        Ok(EditEvent::Exported { path: path.to_path_buf() })
    }

    /// Replace the grid with a level file. History is dropped since its
    /// coordinates belong to the old grid.
    pub fn import_from(&mut self, path: &Path) -> Result<EditEvent> {
        let text = level_io::read_level(path)?;
        let grid = self.codec.decode(&text)?.into_grid()?;
        let (rows, cols) = (grid.rows(), grid.cols());

        self.grid = grid;
        self.history.clear();
        self.dirty = false;
        log::info!("imported {}x{} level from {}", rows, cols, path.display());
        Ok(EditEvent::Imported { path: path.to_path_buf(), rows, cols })
    }

    /// Change grid dimensions. The top-left overlap is kept and undo
    /// history is cleared. Zero or oversized dimensions are refused and
    /// leave the session unchanged.
    pub fn resize(&mut self, rows: usize, cols: usize) -> Result<EditEvent> {
        self.grid.resize(rows, cols)?;
        self.history.clear();
        self.dirty = true;
        log::info!("resized level to {}x{}", rows, cols);
        Ok(EditEvent::Resized { rows, cols })
    }
}
