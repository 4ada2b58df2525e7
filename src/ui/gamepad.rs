/// Gamepad input tracker using gilrs.
///
/// Button mapping comes from the `[gamepad]` section of config.toml via
/// `load_button_config()`. Defaults:
///   D-pad / Left Stick    →  Move cursor (one cell per press)
///   A                     →  Place / erase at cursor
///   B                     →  Toggle erase mode
///   Y                     →  Undo
///   L1 / R1               →  Previous / next palette tile
///
/// Without the `gamepad` feature every query returns false.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.5;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,      // LeftTrigger
    R1,      // RightTrigger
    L2,      // LeftTrigger2
    R2,      // RightTrigger2
    Start,
    Select,
}

const BTN_COUNT: usize = 10;

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH" => Some(Btn::A),
            "B" | "EAST" => Some(Btn::B),
            "X" | "WEST" => Some(Btn::X),
            "Y" | "NORTH" => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER" => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "L2" | "LT" | "LEFTTRIGGER2" => Some(Btn::L2),
            "R2" | "RT" | "RIGHTTRIGGER2" => Some(Btn::R2),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South => Some(Btn::A),
            Button::East => Some(Btn::B),
            Button::West => Some(Btn::X),
            Button::North => Some(Btn::Y),
            Button::LeftTrigger => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::LeftTrigger2 => Some(Btn::L2),
            Button::RightTrigger2 => Some(Btn::R2),
            Button::Start => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Editor action -> buttons, from config.
#[derive(Debug, PartialEq, Eq)]
struct ActionMap {
    place: Vec<Btn>,
    erase: Vec<Btn>,
    undo: Vec<Btn>,
    palette_prev: Vec<Btn>,
    palette_next: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            place: vec![Btn::A],
            erase: vec![Btn::B],
            undo: vec![Btn::Y],
            palette_prev: vec![Btn::L1],
            palette_next: vec![Btn::R1],
        }
    }
}

impl ActionMap {
    /// Overlay config names on the defaults. Lists with no recognised
    /// button keep the default binding.
    fn from_config(cfg: &GamepadConfig) -> Self {
        fn parse_into(names: &[String], slot: &mut Vec<Btn>) {
            let parsed: Vec<Btn> = names.iter().filter_map(|s| Btn::from_name(s)).collect();
            if parsed.is_empty() {
                log::warn!("gamepad: no known buttons in {:?}, keeping default", names);
            } else {
                *slot = parsed;
            }
        }
        let mut map = ActionMap::default();
        parse_into(&cfg.place, &mut map.place);
        parse_into(&cfg.erase, &mut map.erase);
        parse_into(&cfg.undo, &mut map.undo);
        parse_into(&cfg.palette_prev, &mut map.palette_prev);
        parse_into(&cfg.palette_next, &mut map.palette_next);
        map
    }
}

/// Direction pad, as four edge-triggered flags.
#[derive(Clone, Copy, Debug, Default)]
struct Dirs {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    /// Buttons pressed since the last `update`, indexed by `Btn as usize`.
    pressed: [bool; BTN_COUNT],
    dpad: Dirs,

    // stick position and which direction it was already counted for
    stick_x: f32,
    stick_y: f32,
    stick_latched: Dirs,
    stick: Dirs,

    action_map: ActionMap,

    pub connected: bool,
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = match Gilrs::new() {
            Ok(g) => {
                let has_pad = g.gamepads().next().is_some();
                (Some(g), has_pad)
            }
            Err(e) => {
                log::info!("gamepad support unavailable: {e}");
                (None, false)
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            pressed: [false; BTN_COUNT],
            dpad: Dirs::default(),
            stick_x: 0.0,
            stick_y: 0.0,
            stick_latched: Dirs::default(),
            stick: Dirs::default(),
            action_map: ActionMap::default(),
            connected,
        }
    }

    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        self.action_map = ActionMap::from_config(cfg);
    }

    /// Poll the pad. Call once per frame, before the queries.
    pub fn update(&mut self) {
        self.pressed = [false; BTN_COUNT];
        self.dpad = Dirs::default();
        self.stick = Dirs::default();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.press(btn);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    match axis {
                        Axis::LeftStickX => self.stick_x = value,
                        Axis::LeftStickY => self.stick_y = value,
                        _ => {}
                    }
                }
                EventType::Connected => self.connected = true,
                EventType::Disconnected => {
                    self.connected = false;
                    self.stick_x = 0.0;
                    self.stick_y = 0.0;
                }
                _ => {}
            }
        }

        self.update_stick();
    }

    #[cfg(feature = "gamepad")]
    fn press(&mut self, btn: Button) {
        match btn {
            Button::DPadUp => self.dpad.up = true,
            Button::DPadDown => self.dpad.down = true,
            Button::DPadLeft => self.dpad.left = true,
            Button::DPadRight => self.dpad.right = true,
            other => {
                if let Some(b) = Btn::from_gilrs(other) {
                    self.pressed[b as usize] = true;
                }
            }
        }
    }

    /// Turn the analog stick into one step per push past the deadzone.
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn update_stick(&mut self) {
        let now = Dirs {
            up: self.stick_y > STICK_DEADZONE,
            down: self.stick_y < -STICK_DEADZONE,
            left: self.stick_x < -STICK_DEADZONE,
            right: self.stick_x > STICK_DEADZONE,
        };
        self.stick = Dirs {
            up: now.up && !self.stick_latched.up,
            down: now.down && !self.stick_latched.down,
            left: now.left && !self.stick_latched.left,
            right: now.right && !self.stick_latched.right,
        };
        self.stick_latched = now;
    }

    // ── Action queries (config-driven) ──

    fn any_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.pressed[b as usize])
    }

    pub fn place_pressed(&self) -> bool {
        self.any_pressed(&self.action_map.place)
    }
    pub fn erase_pressed(&self) -> bool {
        self.any_pressed(&self.action_map.erase)
    }
    pub fn undo_pressed(&self) -> bool {
        self.any_pressed(&self.action_map.undo)
    }
    pub fn palette_prev_pressed(&self) -> bool {
        self.any_pressed(&self.action_map.palette_prev)
    }
    pub fn palette_next_pressed(&self) -> bool {
        self.any_pressed(&self.action_map.palette_next)
    }

    /// Cursor step requested this frame as (d_row, d_col).
    pub fn cursor_step(&self) -> Option<(i32, i32)> {
        let d = Dirs {
            up: self.dpad.up || self.stick.up,
            down: self.dpad.down || self.stick.down,
            left: self.dpad.left || self.stick.left,
            right: self.dpad.right || self.stick.right,
        };
        let dr = d.down as i32 - d.up as i32;
        let dc = d.right as i32 - d.left as i32;
        if dr == 0 && dc == 0 { None } else { Some((dr, dc)) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn button_names_are_case_insensitive() {
        assert_eq!(Btn::from_name("a"), Some(Btn::A));
        assert_eq!(Btn::from_name("rb"), Some(Btn::R1));
        assert_eq!(Btn::from_name("Back"), Some(Btn::Select));
        assert_eq!(Btn::from_name("Z"), None);
    }

    #[test]
    fn config_overrides_and_falls_back() {
        let cfg = GamepadConfig {
            place: names(&["X", "a"]),
            erase: names(&["nonsense"]),
            undo: names(&[]),
            palette_prev: names(&["LT"]),
            palette_next: names(&["RT"]),
        };
        let map = ActionMap::from_config(&cfg);
        assert_eq!(map.place, vec![Btn::X, Btn::A]);
        assert_eq!(map.erase, vec![Btn::B]);
        assert_eq!(map.undo, vec![Btn::Y]);
        assert_eq!(map.palette_prev, vec![Btn::L2]);
        assert_eq!(map.palette_next, vec![Btn::R2]);
    }
}
