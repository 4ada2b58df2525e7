/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to defaults if the file is missing or incomplete.
///
/// ```toml
/// [grid]
/// rows = 10
/// cols = 100
///
/// [export]
/// dir = "levels"
/// extension = "rll"
/// key = "rll-platformer"
///
/// [general]
/// log_level = "info"
///
/// [gamepad]
/// place = ["A"]
/// erase = ["B"]
/// undo = ["Y"]
/// palette_prev = ["L1"]
/// palette_next = ["R1"]
/// ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::domain::grid::{cell_count, DEFAULT_COLS, DEFAULT_ROWS, MAX_CELLS};
use crate::edit::codec::DEFAULT_KEY;
use crate::edit::level_io::LEVEL_EXTENSION;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct EditorConfig {
    pub grid: GridConfig,
    pub export: ExportConfig,
    pub gamepad: GamepadConfig,
    pub log_level: log::LevelFilter,
    /// Problems met while loading. The logger is not up yet at that point,
    /// so `main` replays these once it is.
    pub warnings: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridConfig {
    pub rows: usize,
    pub cols: usize,
}

#[derive(Clone, Debug)]
pub struct ExportConfig {
    /// Where the export prompt suggests new files.
    pub dir: PathBuf,
    pub extension: String,
    pub key: String,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub place: Vec<String>,
    pub erase: Vec<String>,
    pub undo: Vec<String>,
    pub palette_prev: Vec<String>,
    pub palette_next: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    grid: TomlGrid,
    #[serde(default)]
    export: TomlExport,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlGrid {
    #[serde(default = "default_rows")]
    rows: usize,
    #[serde(default = "default_cols")]
    cols: usize,
}

#[derive(Deserialize, Debug)]
struct TomlExport {
    #[serde(default = "default_export_dir")]
    dir: String,
    #[serde(default = "default_extension")]
    extension: String,
    #[serde(default = "default_key")]
    key: String,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_place")]
    place: Vec<String>,
    #[serde(default = "default_erase")]
    erase: Vec<String>,
    #[serde(default = "default_undo")]
    undo: Vec<String>,
    #[serde(default = "default_palette_prev")]
    palette_prev: Vec<String>,
    #[serde(default = "default_palette_next")]
    palette_next: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_log_level")]
    log_level: String,
}

// ── Defaults ──

fn default_rows() -> usize { DEFAULT_ROWS }
fn default_cols() -> usize { DEFAULT_COLS }
fn default_export_dir() -> String { "levels".into() }
fn default_extension() -> String { LEVEL_EXTENSION.into() }
fn default_key() -> String { String::from_utf8_lossy(DEFAULT_KEY).into_owned() }
fn default_log_level() -> String { "info".into() }

fn default_place() -> Vec<String> { vec!["A".into()] }
fn default_erase() -> Vec<String> { vec!["B".into()] }
fn default_undo() -> Vec<String> { vec!["Y".into()] }
fn default_palette_prev() -> Vec<String> { vec!["L1".into()] }
fn default_palette_next() -> Vec<String> { vec!["R1".into()] }

impl Default for TomlGrid {
    fn default() -> Self {
        TomlGrid { rows: default_rows(), cols: default_cols() }
    }
}

impl Default for TomlExport {
    fn default() -> Self {
        TomlExport {
            dir: default_export_dir(),
            extension: default_extension(),
            key: default_key(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            place: default_place(),
            erase: default_erase(),
            undo: default_undo(),
            palette_prev: default_palette_prev(),
            palette_next: default_palette_next(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { log_level: default_log_level() }
    }
}

// ── Loading ──

impl EditorConfig {
    /// Load config from `config.toml`.
    /// Search order: exe directory, current directory, XDG data home,
    /// system data directory.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let mut warnings = Vec::new();
        let toml_cfg = load_toml(&search_dirs, &mut warnings);
        Self::resolve(toml_cfg, &search_dirs, warnings)
    }

    /// Build a config from TOML text. Used by tests; relative paths
    /// resolve against `base`.
    #[cfg(test)]
    fn from_toml_str(text: &str, base: &Path) -> Result<Self, toml::de::Error> {
        let toml_cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(Self::resolve(toml_cfg, &[base.to_path_buf()], Vec::new()))
    }

    fn resolve(toml_cfg: TomlConfig, search_dirs: &[PathBuf], mut warnings: Vec<String>) -> Self {
        let (rows, cols) = (toml_cfg.grid.rows, toml_cfg.grid.cols);
        let grid = if cell_count(rows, cols).is_none() {
            warnings.push(format!(
                "config.toml: grid {}x{} is empty or over {} cells, using {}x{}",
                rows, cols, MAX_CELLS, DEFAULT_ROWS, DEFAULT_COLS
            ));
            GridConfig { rows: DEFAULT_ROWS, cols: DEFAULT_COLS }
        } else {
            GridConfig { rows, cols }
        };

        let dir = resolve_export_dir(&toml_cfg.export.dir, search_dirs);
        let extension = toml_cfg.export.extension.trim_start_matches('.').to_string();

        let log_level = toml_cfg.general.log_level.parse().unwrap_or_else(|_| {
            warnings.push(format!("config.toml: unknown log_level {:?}", toml_cfg.general.log_level));
            log::LevelFilter::Info
        });

        EditorConfig {
            grid,
            export: ExportConfig { dir, extension, key: toml_cfg.export.key },
            gamepad: GamepadConfig {
                place: toml_cfg.gamepad.place,
                erase: toml_cfg.gamepad.erase,
                undo: toml_cfg.gamepad.undo,
                palette_prev: toml_cfg.gamepad.palette_prev,
                palette_next: toml_cfg.gamepad.palette_next,
            },
            log_level,
            warnings,
        }
    }
}

/// Absolute paths are taken as-is; relative ones prefer an existing
/// directory under a search dir, else stay relative to the CWD.
fn resolve_export_dir(dir: &str, search_dirs: &[PathBuf]) -> PathBuf {
    let path = PathBuf::from(dir);
    if path.is_absolute() {
        return path;
    }
    search_dirs
        .iter()
        .map(|d| d.join(dir))
        .find(|p| p.is_dir())
        .unwrap_or(path)
}

/// Candidate directories to search: exe dir + CWD + data paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = vec![];
    let mut push = |p: PathBuf| {
        if !dirs.contains(&p) {
            dirs.push(p);
        }
    };

    if let Ok(exe) = std::env::current_exe() {
        // follow symlinks so /usr/bin/levelforge finds files next to the real binary
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        push(cwd);
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/levelforge");
        if xdg.is_dir() {
            push(xdg);
        }
    }

    let sys = PathBuf::from("/usr/share/levelforge");
    if sys.is_dir() {
        push(sys);
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }
    dirs
}

/// First readable `config.toml` wins. A parse error means defaults.
fn load_toml(search_dirs: &[PathBuf], warnings: &mut Vec<String>) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() {
            continue;
        }
        match read_toml(&path) {
            Ok(cfg) => return cfg,
            Err(msg) => {
                warnings.push(format!("{msg}; using default settings"));
                return TomlConfig::default();
            }
        }
    }
    TomlConfig::default()
}

fn read_toml(path: &Path) -> Result<TomlConfig, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("could not read {}: {e}", path.display()))?;
    toml::from_str::<TomlConfig>(&text)
        .map_err(|e| format!("{} parse error: {e}", path.display()))
}
