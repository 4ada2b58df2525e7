/// Crate-wide error type.
///
/// Every fallible editor operation returns `error::Result<T>`. Errors are
/// never fatal: the editor loop turns them into a message-bar notice and
/// leaves the grid as it was.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// Grid coordinate outside the grid. The UI clamps its cursor and mouse
    /// mapping, so seeing this means a caller bug.
    #[error("cell ({row}, {col}) is outside the {rows}x{cols} grid")]
    OutOfBounds { row: usize, col: usize, rows: usize, cols: usize },

    /// A level file that does not match the `.rll` layout.
    #[error("malformed level data: {0}")]
    MalformedInput(String),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The codec refused the grid buffer (empty output).
    #[error("encoding failed for a {rows}x{cols} grid with {len} cells")]
    EncodeFailed { rows: usize, cols: usize, len: usize },

    #[error("invalid grid size {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },
}

impl EditorError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        EditorError::MalformedInput(msg.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EditorError::Io { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, EditorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_problem() {
        let e = EditorError::OutOfBounds { row: 3, col: 120, rows: 10, cols: 100 };
        assert_eq!(e.to_string(), "cell (3, 120) is outside the 10x100 grid");

        let e = EditorError::malformed("missing header");
        assert_eq!(e.to_string(), "malformed level data: missing header");
    }

    #[test]
    fn io_error_keeps_source() {
        use std::error::Error;
        let inner = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let e = EditorError::io("levels/a.rll", inner);
        assert!(e.to_string().starts_with("levels/a.rll: "));
        assert!(e.source().is_some());
    }
}
