/// Undo history: a LIFO of single-cell mutations.
///
/// Only cell placements and erases are recorded. A full-grid clear is not.
/// There is no depth cap.

use crate::domain::tile::Tile;

/// One recorded cell change.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TileAction {
    pub row: usize,
    pub col: usize,
    pub previous: Tile,
    pub new: Tile,
    /// The cell had never been placed before this change.
    /// Undo puts it back to the unset (filler) state.
    pub was_unset: bool,
}

#[derive(Debug, Default)]
pub struct UndoHistory {
    actions: Vec<TileAction>,
}

impl UndoHistory {
    pub fn new() -> Self {
        UndoHistory { actions: Vec::new() }
    }

    pub fn record(&mut self, action: TileAction) {
        self.actions.push(action);
    }

    /// Pop the most recent action. `None` when there is nothing to undo.
    /// The caller applies `previous` back onto the grid.
    pub fn undo(&mut self) -> Option<TileAction> {
        self.actions.pop()
    }

    pub fn peek(&self) -> Option<&TileAction> {
        self.actions.last()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(row: usize, col: usize, previous: Tile, new: Tile) -> TileAction {
        TileAction { row, col, previous, new, was_unset: false }
    }

    #[test]
    fn undo_is_lifo() {
        let mut h = UndoHistory::new();
        h.record(action(0, 0, Tile::Air, Tile::Coin));
        h.record(action(1, 2, Tile::Air, Tile::Wall));
        assert_eq!(h.len(), 2);

        assert_eq!(h.undo().map(|a| a.new), Some(Tile::Wall));
        assert_eq!(h.undo().map(|a| a.new), Some(Tile::Coin));
        assert!(h.is_empty());
    }

    #[test]
    fn undo_on_empty_is_none() {
        let mut h = UndoHistory::new();
        assert_eq!(h.undo(), None);
        assert_eq!(h.undo(), None);
        assert!(h.is_empty());
    }

    #[test]
    fn grows_without_cap() {
        let mut h = UndoHistory::new();
        for i in 0..10_000 {
            h.record(action(i % 10, i % 100, Tile::Air, Tile::Spikes));
        }
        assert_eq!(h.len(), 10_000);
        assert_eq!(h.peek().map(|a| (a.row, a.col)), Some((9999 % 10, 9999 % 100)));
    }
}
