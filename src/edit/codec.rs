/// Level codec: grid buffer <-> `.rll` text.
///
/// ## Plain layout
///   ```
///   <rows> <cols>
///   <rows lines of exactly cols characters>
///   ```
///   Characters are tile characters (see `TILE_CHARS`) or `-` for cells that
///   were never placed. Every line, including the last, ends with `\n`.
///
/// ## Cipher
///   The plain text is scrambled with a keyed running substitution over the
///   95 printable ASCII characters. The n-th non-newline character `c`
///   (n counted over the whole text) becomes
///   `ALPHABET[(idx(c) + key[n % key.len()] + n) % 95]`.
///   Newlines pass through, so the line structure survives.
///
/// Encoding failure is reported as an empty string.

use crate::domain::grid::{cell_count, TileGrid, MAX_CELLS};
use crate::domain::tile::is_level_char;
use crate::error::{EditorError, Result};

/// Key used when none is configured.
pub const DEFAULT_KEY: &[u8] = b"rll-platformer";

const ALPHABET_START: u8 = 0x20;
const ALPHABET_LEN: usize = 95;

/// Decoded level: dimensions plus the row-major cell buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelData {
    pub rows: usize,
    pub cols: usize,
    pub cells: Vec<char>,
}

impl LevelData {
    pub fn into_grid(self) -> Result<TileGrid> {
        TileGrid::from_buffer(self.rows, self.cols, &self.cells)
    }
}

#[derive(Clone, Debug)]
pub struct LevelCodec {
    key: Vec<u8>,
}

impl Default for LevelCodec {
    fn default() -> Self {
        LevelCodec { key: DEFAULT_KEY.to_vec() }
    }
}

impl LevelCodec {
    /// Codec with a custom key. An empty key falls back to `DEFAULT_KEY`.
    pub fn new(key: &str) -> Self {
        if key.is_empty() {
            log::warn!("empty codec key, using the built-in key");
            return LevelCodec::default();
        }
        LevelCodec { key: key.as_bytes().to_vec() }
    }

    /// Encode a row-major buffer. Returns an empty string when the
    /// dimensions are zero or above `MAX_CELLS`, the buffer length is not
    /// `rows * cols`, or a cell holds a character that is not a tile or
    /// filler.
    pub fn encode(&self, rows: usize, cols: usize, buf: &[char]) -> String {
        if cell_count(rows, cols) != Some(buf.len()) {
            log::warn!("refusing to encode {}x{} grid with {} cells", rows, cols, buf.len());
            return String::new();
        }
        if let Some(bad) = buf.iter().find(|c| !is_level_char(**c)) {
            log::warn!("refusing to encode unknown cell character {:?}", bad);
            return String::new();
        }

        let mut plain = String::with_capacity((cols + 1) * (rows + 1));
        plain.push_str(&format!("{} {}\n", rows, cols));
        for row in buf.chunks(cols) {
            plain.extend(row.iter());
            plain.push('\n');
        }

        self.encipher(&plain)
    }

    pub fn encode_grid(&self, grid: &TileGrid) -> String {
        self.encode(grid.rows(), grid.cols(), &grid.to_buffer())
    }

    pub fn decode(&self, text: &str) -> Result<LevelData> {
        let plain = self.reveal(text)?;
        let mut lines = plain.lines();

        let header = lines
            .next()
            .ok_or_else(|| EditorError::malformed("empty level file"))?;
        let (rows, cols) = parse_header(header)?;
        let total = cell_count(rows, cols).ok_or_else(|| {
            EditorError::malformed(format!("level size {}x{} is over {} cells", rows, cols, MAX_CELLS))
        })?;

        let mut cells = Vec::with_capacity(total);
        let mut seen = 0;
        for line in lines {
            seen += 1;
            if seen > rows {
                return Err(EditorError::malformed(format!(
                    "more than the {} rows announced in the header", rows
                )));
            }
            let width = line.chars().count();
            if width != cols {
                return Err(EditorError::malformed(format!(
                    "row {} has {} cells, expected {}", seen - 1, width, cols
                )));
            }
            for ch in line.chars() {
                if !is_level_char(ch) {
                    return Err(EditorError::malformed(format!(
                        "unknown tile {:?} in row {}", ch, seen - 1
                    )));
                }
                cells.push(ch);
            }
        }
        if seen != rows {
            return Err(EditorError::malformed(format!(
                "expected {} rows, found {}", rows, seen
            )));
        }

        Ok(LevelData { rows, cols, cells })
    }

    /// Undo the cipher, returning the plain text.
    pub fn reveal(&self, text: &str) -> Result<String> {
        if text.is_empty() {
            return Err(EditorError::malformed("empty level file"));
        }
        let mut out = String::with_capacity(text.len());
        let mut n = 0usize;
        for line in text.lines() {
            for ch in line.chars() {
                let idx = alphabet_index(ch).ok_or_else(|| {
                    EditorError::malformed(format!("character {:?} cannot appear in a level file", ch))
                })?;
                let shift = self.shift(n);
                out.push(alphabet_char((idx + ALPHABET_LEN - shift) % ALPHABET_LEN));
                n += 1;
            }
            out.push('\n');
        }
        Ok(out)
    }

    fn encipher(&self, plain: &str) -> String {
        let mut out = String::with_capacity(plain.len());
        let mut n = 0usize;
        for ch in plain.chars() {
            if ch == '\n' {
                out.push('\n');
                continue;
            }
            // callers only pass printable ASCII here
            let idx = alphabet_index(ch).unwrap_or(0);
            out.push(alphabet_char((idx + self.shift(n)) % ALPHABET_LEN));
            n += 1;
        }
        out
    }

    /// Shift applied at text position `n`, reduced mod the alphabet size.
    fn shift(&self, n: usize) -> usize {
        (self.key[n % self.key.len()] as usize + n) % ALPHABET_LEN
    }
}

fn alphabet_index(c: char) -> Option<usize> {
    let b = u32::from(c);
    let start = u32::from(ALPHABET_START);
    if b >= start && b < start + ALPHABET_LEN as u32 {
        Some((b - start) as usize)
    } else {
        None
    }
}

fn alphabet_char(idx: usize) -> char {
    char::from(ALPHABET_START + idx as u8)
}

/// Header is `<rows> <cols>`: two decimal counts without sign or leading
/// zeros, separated by a single space.
fn parse_header(line: &str) -> Result<(usize, usize)> {
    let parts: Vec<&str> = line.split(' ').collect();
    if parts.len() != 2 {
        return Err(EditorError::malformed(format!("bad header {:?}", line)));
    }
    let rows = parse_count(parts[0])
        .ok_or_else(|| EditorError::malformed(format!("bad row count {:?}", parts[0])))?;
    let cols = parse_count(parts[1])
        .ok_or_else(|| EditorError::malformed(format!("bad column count {:?}", parts[1])))?;
    if rows == 0 || cols == 0 {
        return Err(EditorError::malformed(format!("zero-sized level {}x{}", rows, cols)));
    }
    Ok((rows, cols))
}

fn parse_count(s: &str) -> Option<usize> {
    let digits_only = !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !digits_only || (s.len() > 1 && s.starts_with('0')) {
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tile::{Tile, FILLER, TILE_CHARS};

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn round_trip_small_level() {
        let codec = LevelCodec::default();
        let buf = chars("#*&E@^= -#-=");
        let text = codec.encode(3, 4, &buf);
        assert!(!text.is_empty());

        let data = codec.decode(&text).unwrap();
        assert_eq!(data, LevelData { rows: 3, cols: 4, cells: buf });
    }

    #[test]
    fn round_trip_default_size_all_filler() {
        let codec = LevelCodec::default();
        let buf = vec!['-'; 1000];
        let data = codec.decode(&codec.encode(10, 100, &buf)).unwrap();
        assert_eq!((data.rows, data.cols), (10, 100));
        assert_eq!(data.cells, buf);
    }

    #[test]
    fn round_trip_row_of_air_keeps_spaces() {
        let codec = LevelCodec::default();
        let buf = chars("    ");
        let data = codec.decode(&codec.encode(1, 4, &buf)).unwrap();
        assert_eq!(data.cells, buf);
    }

    #[test]
    fn output_is_scrambled_but_keeps_lines() {
        let codec = LevelCodec::default();
        let text = codec.encode(2, 3, &chars("*----#"));
        assert_eq!(text.lines().count(), 3);
        assert!(text.ends_with('\n'));
        assert_ne!(text.lines().next(), Some("2 3"));
        assert!(text.chars().all(|c| c == '\n' || (' '..='~').contains(&c)));
    }

    #[test]
    fn encode_is_deterministic() {
        let codec = LevelCodec::default();
        let buf = chars("=#=#");
        assert_eq!(codec.encode(2, 2, &buf), codec.encode(2, 2, &buf));
    }

    #[test]
    fn encode_failure_is_empty() {
        let codec = LevelCodec::default();
        assert_eq!(codec.encode(0, 3, &[]), "");
        assert_eq!(codec.encode(3, 0, &[]), "");
        assert_eq!(codec.encode(2, 2, &chars("###")), "");
        assert_eq!(codec.encode(1, 2, &chars("#x")), "");
    }

    #[test]
    fn two_by_three_scenario() {
        let mut grid = TileGrid::new(2, 3).unwrap();
        grid.set(0, 0, Tile::Coin).unwrap();
        grid.set(1, 2, Tile::Wall).unwrap();

        let codec = LevelCodec::default();
        let text = codec.encode_grid(&grid);
        assert_eq!(codec.reveal(&text).unwrap(), "2 3\n*--\n--#\n");

        let data = codec.decode(&text).unwrap();
        assert_eq!(data.cells, vec!['*', '-', '-', '-', '-', '#']);
        assert_eq!(data.cells.len(), 6);
        assert_eq!(data.into_grid().unwrap(), grid);
    }

    #[test]
    fn key_matters() {
        let a = LevelCodec::new("alpha");
        let b = LevelCodec::new("bravo");
        let text = a.encode(1, 3, &chars("@ E"));
        assert_ne!(text, b.encode(1, 3, &chars("@ E")));
        assert_eq!(a.decode(&text).unwrap().cells, chars("@ E"));
        // decoding with the wrong key garbles the header or cells
        assert!(b.decode(&text).map(|d| d.cells != chars("@ E")).unwrap_or(true));
    }

    #[test]
    fn empty_key_uses_default() {
        let text = LevelCodec::new("").encode(1, 1, &['#']);
        assert_eq!(text, LevelCodec::default().encode(1, 1, &['#']));
    }

    #[test]
    fn crlf_input_decodes() {
        let codec = LevelCodec::default();
        let text = codec.encode(2, 2, &chars("#--*"));
        let crlf = text.replace('\n', "\r\n");
        assert_eq!(codec.decode(&crlf).unwrap().cells, chars("#--*"));
    }

    /// Encipher arbitrary plain text so structural errors can be tested.
    fn scrambled(plain: &str) -> String {
        LevelCodec::default().encipher(plain)
    }

    #[test]
    fn decode_rejects_structural_errors() {
        let codec = LevelCodec::default();
        let cases = [
            "",
            "2\n##\n##\n",
            "2 x\n##\n##\n",
            "0 2\n",
            "2 2\n##\n",
            "2 2\n##\n##\n##\n",
            "2 2\n##\n#\n",
            "2 2\n##\n#Q\n",
            "+2 2\n##\n##\n",
            "2 +2\n##\n##\n",
            "02 2\n##\n##\n",
            "2 02\n##\n##\n",
            "2  2\n##\n##\n",
            " 2 2\n##\n##\n",
        ];
        for plain in cases {
            let res = codec.decode(&scrambled(plain));
            assert!(
                matches!(res, Err(EditorError::MalformedInput(_))),
                "accepted {:?}", plain
            );
        }
    }

    #[test]
    fn decode_rejects_non_ascii() {
        let codec = LevelCodec::default();
        assert!(matches!(codec.decode("1 1\n\u{e9}\n"), Err(EditorError::MalformedInput(_))));
        assert!(matches!(codec.decode("\t\n"), Err(EditorError::MalformedInput(_))));
    }

    #[test]
    fn decode_refuses_huge_header_before_reading_cells() {
        let codec = LevelCodec::default();
        for plain in [
            "1000000 1000000\n#\n",
            "100000000000 100000000000\n#\n",
            "99999999999999999999999 1\n#\n",
        ] {
            let res = codec.decode(&scrambled(plain));
            assert!(
                matches!(res, Err(EditorError::MalformedInput(_))),
                "accepted {:?}", plain
            );
        }
    }

    #[test]
    fn encode_refuses_overflowing_size() {
        let codec = LevelCodec::default();
        assert_eq!(codec.encode(usize::MAX, 2, &[]), "");
        assert_eq!(codec.encode(2, usize::MAX, &['#', '#']), "");
        assert_eq!(codec.encode(MAX_CELLS, 2, &[]), "");
    }

    /// Every level character, placed by a small LCG so each size gets a
    /// different mix. Long levels run the key index around many times.
    #[test]
    fn round_trip_every_char_across_sizes() {
        let alphabet: Vec<char> = TILE_CHARS
            .iter()
            .map(|&(_, c)| c)
            .chain(std::iter::once(FILLER))
            .collect();
        let codecs = [LevelCodec::default(), LevelCodec::new("k"), LevelCodec::new("a longer key!")];
        let mut seed: u32 = 0x2545_f491;

        for &(rows, cols) in &[(1, 1), (1, 17), (3, 5), (7, 2), (10, 100), (31, 3)] {
            let mut buf: Vec<char> = (0..rows * cols)
                .map(|_| {
                    seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                    alphabet[(seed >> 16) as usize % alphabet.len()]
                })
                .collect();
            // make sure every char shows up at least once when there is room
            for (i, &c) in alphabet.iter().enumerate().take(buf.len()) {
                buf[i] = c;
            }

            for codec in &codecs {
                let text = codec.encode(rows, cols, &buf);
                assert!(!text.is_empty(), "{}x{} failed to encode", rows, cols);
                let data = codec.decode(&text).unwrap();
                assert_eq!((data.rows, data.cols), (rows, cols));
                assert_eq!(data.cells, buf, "{}x{} changed in transit", rows, cols);
            }
        }
    }
}
