/// Tile types and their level-file characters.
///
/// The character mapping lives in one table (`TILE_CHARS`) so the codec,
/// the grid buffer and the renderer legend never disagree.

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Tile {
    Coin,
    Enemy,
    Exit,
    Player,
    Spikes,
    Wall,
    DarkWall,
    #[default]
    Air,
}

/// Character written for a cell that was never placed.
/// Distinct from `Air`, which is an explicitly placed empty cell.
pub const FILLER: char = '-';

/// Bidirectional tile <-> character table.
pub const TILE_CHARS: [(Tile, char); 8] = [
    (Tile::Coin, '*'),
    (Tile::Enemy, '&'),
    (Tile::Exit, 'E'),
    (Tile::Player, '@'),
    (Tile::Spikes, '^'),
    (Tile::Wall, '#'),
    (Tile::DarkWall, '='),
    (Tile::Air, ' '),
];

/// Palette order, as shown in the tile bar (keys 1-7).
pub const PALETTE: [Tile; 7] = [
    Tile::Wall,
    Tile::Exit,
    Tile::Coin,
    Tile::Enemy,
    Tile::Player,
    Tile::Spikes,
    Tile::DarkWall,
];

impl Tile {
    pub fn to_char(self) -> char {
        TILE_CHARS
            .iter()
            .find(|(t, _)| *t == self)
            .map(|(_, c)| *c)
            .unwrap_or(' ')
    }

    pub fn from_char(c: char) -> Option<Tile> {
        TILE_CHARS.iter().find(|(_, ch)| *ch == c).map(|(t, _)| *t)
    }

    pub fn name(self) -> &'static str {
        match self {
            Tile::Coin => "Coin",
            Tile::Enemy => "Enemy",
            Tile::Exit => "Exit",
            Tile::Player => "Player",
            Tile::Spikes => "Spikes",
            Tile::Wall => "Wall",
            Tile::DarkWall => "Dark Wall",
            Tile::Air => "Air",
        }
    }

    /// Position in `PALETTE`, if the tile has a palette slot.
    pub fn palette_index(self) -> Option<usize> {
        PALETTE.iter().position(|t| *t == self)
    }
}

/// Is `c` a character that may appear in a level buffer?
pub fn is_level_char(c: char) -> bool {
    c == FILLER || Tile::from_char(c).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_bijective() {
        for (tile, ch) in TILE_CHARS {
            assert_eq!(tile.to_char(), ch);
            assert_eq!(Tile::from_char(ch), Some(tile));
        }
        let mut chars: Vec<char> = TILE_CHARS.iter().map(|(_, c)| *c).collect();
        chars.sort();
        chars.dedup();
        assert_eq!(chars.len(), TILE_CHARS.len());
    }

    #[test]
    fn filler_is_not_a_tile() {
        assert_eq!(Tile::from_char(FILLER), None);
        assert!(is_level_char(FILLER));
        assert!(!is_level_char('x'));
        assert!(!is_level_char('\n'));
    }

    #[test]
    fn air_is_default_and_off_palette() {
        assert_eq!(Tile::default(), Tile::Air);
        assert_eq!(Tile::Air.palette_index(), None);
        assert_eq!(Tile::Wall.palette_index(), Some(0));
        assert_eq!(Tile::DarkWall.palette_index(), Some(6));
    }
}
