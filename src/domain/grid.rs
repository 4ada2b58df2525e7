/// TileGrid: the level being edited.
///
/// Cells are stored row-major. A cell is either unset (never placed since
/// the grid was created, resized or loaded) or holds a placed tile. Reads of
/// an unset cell return `Tile::Air`; the distinction only shows up in the
/// export buffer, where unset cells are written as `FILLER`.

use crate::domain::history::TileAction;
use crate::domain::tile::{Tile, FILLER};
use crate::error::{EditorError, Result};

pub const DEFAULT_ROWS: usize = 10;
pub const DEFAULT_COLS: usize = 100;

/// Largest grid the editor will allocate, in cells.
pub const MAX_CELLS: usize = 1_000_000;

/// `rows * cols` when both are non-zero and the product fits under
/// `MAX_CELLS`.
pub fn cell_count(rows: usize, cols: usize) -> Option<usize> {
    if rows == 0 || cols == 0 {
        return None;
    }
    rows.checked_mul(cols).filter(|&n| n <= MAX_CELLS)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileGrid {
    rows: usize,
    cols: usize,
    cells: Vec<Option<Tile>>,
}

impl TileGrid {
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        let n = cell_count(rows, cols).ok_or(EditorError::InvalidDimensions { rows, cols })?;
        Ok(TileGrid { rows, cols, cells: vec![None; n] })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn get(&self, row: usize, col: usize) -> Result<Tile> {
        let idx = self.index(row, col)?;
        Ok(self.cells[idx].unwrap_or(Tile::Air))
    }

    /// Was this cell ever placed?
    pub fn is_set(&self, row: usize, col: usize) -> Result<bool> {
        let idx = self.index(row, col)?;
        Ok(self.cells[idx].is_some())
    }

    /// Overwrite a cell and return what it held before.
    pub fn set(&mut self, row: usize, col: usize, tile: Tile) -> Result<Tile> {
        let idx = self.index(row, col)?;
        let previous = self.cells[idx].replace(tile);
        Ok(previous.unwrap_or(Tile::Air))
    }

    /// Blank every placed cell to Air. Unset cells stay unset.
    pub fn clear(&mut self) {
        for cell in self.cells.iter_mut().filter(|c| c.is_some()) {
            *cell = Some(Tile::Air);
        }
    }

    /// Apply the inverse of a recorded action.
    pub fn revert(&mut self, action: &TileAction) -> Result<()> {
        let idx = self.index(action.row, action.col)?;
        self.cells[idx] = if action.was_unset { None } else { Some(action.previous) };
        Ok(())
    }

    /// Change dimensions, keeping the overlapping top-left region.
    /// New cells start unset; cells outside the new bounds are dropped.
    /// An unusable size leaves the grid as it was.
    pub fn resize(&mut self, rows: usize, cols: usize) -> Result<()> {
        let n = cell_count(rows, cols).ok_or(EditorError::InvalidDimensions { rows, cols })?;
        let mut cells = vec![None; n];
        for r in 0..rows.min(self.rows) {
            for c in 0..cols.min(self.cols) {
                cells[r * cols + c] = self.cells[r * self.cols + c];
            }
        }
        self.rows = rows;
        self.cols = cols;
        self.cells = cells;
        Ok(())
    }

    /// Row-major character buffer, the codec's input.
    pub fn to_buffer(&self) -> Vec<char> {
        self.cells
            .iter()
            .map(|c| c.map_or(FILLER, Tile::to_char))
            .collect()
    }

    /// Rebuild a grid from a row-major character buffer.
    pub fn from_buffer(rows: usize, cols: usize, buf: &[char]) -> Result<Self> {
        let expected = cell_count(rows, cols)
            .ok_or_else(|| EditorError::malformed(format!("unusable level size {}x{}", rows, cols)))?;
        if buf.len() != expected {
            return Err(EditorError::malformed(format!(
                "expected {} cells for {}x{}, got {}",
                expected, rows, cols, buf.len()
            )));
        }
        let mut cells = Vec::with_capacity(buf.len());
        for (i, &ch) in buf.iter().enumerate() {
            if ch == FILLER {
                cells.push(None);
                continue;
            }
            match Tile::from_char(ch) {
                Some(t) => cells.push(Some(t)),
                None => {
                    return Err(EditorError::malformed(format!(
                        "unknown tile {:?} at row {}, col {}",
                        ch, i / cols.max(1), i % cols.max(1)
                    )))
                }
            }
        }
        Ok(TileGrid { rows, cols, cells })
    }

    /// Number of cells holding something other than Air.
    pub fn count_filled(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| matches!(c, Some(t) if *t != Tile::Air))
            .count()
    }

    fn index(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.rows || col >= self.cols {
            return Err(EditorError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(row * self.cols + col)
    }
}

impl Default for TileGrid {
    fn default() -> Self {
        TileGrid {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            cells: vec![None; DEFAULT_ROWS * DEFAULT_COLS],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tile::TILE_CHARS;

    /// Build a grid from a diagram. `-` is an unset cell, anything else
    /// goes through the tile table.
    fn grid_from(rows: &[&str]) -> TileGrid {
        let cols = rows[0].chars().count();
        let buf: Vec<char> = rows.iter().flat_map(|r| r.chars()).collect();
        TileGrid::from_buffer(rows.len(), cols, &buf).unwrap()
    }

    #[test]
    fn new_grid_reads_air_everywhere() {
        let g = TileGrid::new(3, 4).unwrap();
        for r in 0..3 {
            for c in 0..4 {
                assert_eq!(g.get(r, c).unwrap(), Tile::Air);
                assert!(!g.is_set(r, c).unwrap());
            }
        }
        assert_eq!(g.to_buffer(), vec!['-'; 12]);
    }

    #[test]
    fn default_is_ten_by_hundred() {
        let g = TileGrid::default();
        assert_eq!((g.rows(), g.cols(), g.len()), (10, 100, 1000));
    }

    #[test]
    fn set_then_get_for_every_tile() {
        let mut g = TileGrid::new(2, 5).unwrap();
        for (i, (tile, _)) in TILE_CHARS.iter().enumerate() {
            let (r, c) = (i / 5, i % 5);
            g.set(r, c, *tile).unwrap();
            assert_eq!(g.get(r, c).unwrap(), *tile);
        }
    }

    #[test]
    fn set_returns_previous() {
        let mut g = TileGrid::new(1, 1).unwrap();
        assert_eq!(g.set(0, 0, Tile::Coin).unwrap(), Tile::Air);
        assert_eq!(g.set(0, 0, Tile::Enemy).unwrap(), Tile::Coin);
        assert_eq!(g.set(0, 0, Tile::Air).unwrap(), Tile::Enemy);
    }

    #[test]
    fn out_of_bounds_is_an_error() {
        let mut g = TileGrid::new(2, 3).unwrap();
        assert!(matches!(
            g.get(2, 0),
            Err(EditorError::OutOfBounds { row: 2, col: 0, rows: 2, cols: 3 })
        ));
        assert!(matches!(g.set(0, 3, Tile::Wall), Err(EditorError::OutOfBounds { .. })));
        assert!(g.is_set(5, 5).is_err());
        // failed set leaves the grid alone
        assert_eq!(g.to_buffer(), vec!['-'; 6]);
    }

    #[test]
    fn clear_blanks_everything_but_keeps_unset_cells() {
        let mut g = grid_from(&["*&-", "-#="]);
        g.clear();
        for r in 0..2 {
            for c in 0..3 {
                assert_eq!(g.get(r, c).unwrap(), Tile::Air);
            }
        }
        assert_eq!(g.to_buffer().iter().collect::<String>(), "  --  ");
    }

    #[test]
    fn revert_restores_unset_state() {
        let mut g = TileGrid::new(1, 2).unwrap();
        let prev = g.set(0, 1, Tile::Exit).unwrap();
        g.revert(&TileAction { row: 0, col: 1, previous: prev, new: Tile::Exit, was_unset: true })
            .unwrap();
        assert_eq!(g.to_buffer(), vec!['-', '-']);

        g.set(0, 0, Tile::Wall).unwrap();
        let prev = g.set(0, 0, Tile::Coin).unwrap();
        g.revert(&TileAction { row: 0, col: 0, previous: prev, new: Tile::Coin, was_unset: false })
            .unwrap();
        assert_eq!(g.get(0, 0).unwrap(), Tile::Wall);
    }

    #[test]
    fn resize_clips_and_pads() {
        let mut g = grid_from(&["*&E", "@^#"]);
        g.resize(3, 2).unwrap();
        assert_eq!((g.rows(), g.cols()), (3, 2));
        assert_eq!(g.to_buffer().iter().collect::<String>(), "*&@^--");

        g.resize(1, 4).unwrap();
        assert_eq!(g.to_buffer().iter().collect::<String>(), "*&--");
    }

    #[test]
    fn buffer_round_trip() {
        let g = grid_from(&["# *-", "=@ E"]);
        let buf = g.to_buffer();
        assert_eq!(TileGrid::from_buffer(2, 4, &buf).unwrap(), g);
    }

    #[test]
    fn from_buffer_rejects_bad_input() {
        assert!(matches!(
            TileGrid::from_buffer(2, 2, &['#', '#', '#']),
            Err(EditorError::MalformedInput(_))
        ));
        assert!(matches!(
            TileGrid::from_buffer(1, 2, &['#', 'x']),
            Err(EditorError::MalformedInput(_))
        ));
    }

    #[test]
    fn unusable_sizes_are_rejected() {
        assert_eq!(cell_count(1000, 1000), Some(MAX_CELLS));
        assert_eq!(cell_count(1001, 1000), None);
        assert_eq!(cell_count(usize::MAX, 2), None);
        assert_eq!(cell_count(0, 5), None);

        assert!(matches!(
            TileGrid::new(99_999, 99_999),
            Err(EditorError::InvalidDimensions { rows: 99_999, cols: 99_999 })
        ));
        assert!(matches!(
            TileGrid::from_buffer(usize::MAX, 2, &[]),
            Err(EditorError::MalformedInput(_))
        ));
    }

    #[test]
    fn failed_resize_keeps_the_grid() {
        let mut g = grid_from(&["*&", "E#"]);
        let before = g.clone();
        assert!(matches!(g.resize(usize::MAX, 2), Err(EditorError::InvalidDimensions { .. })));
        assert!(matches!(g.resize(0, 2), Err(EditorError::InvalidDimensions { .. })));
        assert!(g.resize(MAX_CELLS, 2).is_err());
        assert_eq!(g, before);
    }

    #[test]
    fn count_filled_ignores_air_and_unset() {
        let g = grid_from(&["* -", "--#"]);
        assert_eq!(g.count_filled(), 2);
    }
}
