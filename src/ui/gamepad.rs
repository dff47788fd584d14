/// Gamepad input tracker using gilrs.
///
/// Quit buttons come from `[gamepad] quit` in config.toml.
/// Default mapping:
///   D-pad / Left Stick    →  Movement
///   Select                →  Quit
///   Start / A             →  Dismiss screen

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use crate::sim::frontend::FrameInput;

const STICK_DEADZONE: f32 = 0.25;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,      // LeftTrigger
    R1,      // RightTrigger
    Start,
    Select,
}

const BTN_COUNT: usize = 8;

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER"  => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South => Some(Btn::A),
            Button::East  => Some(Btn::B),
            Button::West  => Some(Btn::X),
            Button::North => Some(Btn::Y),
            Button::LeftTrigger  => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::Start  => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Parse configured button names, skipping (and logging) unknown ones.
/// An empty result keeps the default.
fn parse_buttons(names: &[String], default: &[Btn]) -> Vec<Btn> {
    let parsed: Vec<Btn> = names
        .iter()
        .filter_map(|s| {
            let btn = Btn::from_name(s);
            if btn.is_none() {
                tracing::warn!(button = %s, "unknown gamepad button name");
            }
            btn
        })
        .collect();
    if parsed.is_empty() { default.to_vec() } else { parsed }
}

#[derive(Clone, Copy, Debug, Default)]
struct Dpad {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    held: [bool; BTN_COUNT],
    just_pressed: [bool; BTN_COUNT],

    dpad: Dpad,
    stick_x: f32,
    stick_y: f32,

    quit: Vec<Btn>,
    confirm: Vec<Btn>,

    pub connected: bool,
}

impl GamepadState {
    pub fn new(cfg: &GamepadConfig) -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = match Gilrs::new() {
            Ok(g) => {
                let has_pad = g.gamepads().next().is_some();
                (Some(g), has_pad)
            }
            Err(e) => {
                tracing::warn!(error = %e, "gamepad support unavailable");
                (None, false)
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        let mut state = Self::detached(cfg);
        #[cfg(feature = "gamepad")]
        {
            state.gilrs = gilrs_opt;
        }
        state.connected = connected;
        state
    }

    /// State with no backend attached; nothing is ever polled.
    fn detached(cfg: &GamepadConfig) -> Self {
        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: None,
            held: [false; BTN_COUNT],
            just_pressed: [false; BTN_COUNT],
            dpad: Dpad::default(),
            stick_x: 0.0,
            stick_y: 0.0,
            quit: parse_buttons(&cfg.quit, &[Btn::Select]),
            confirm: vec![Btn::Start, Btn::A],
            connected: false,
        }
    }

    pub fn update(&mut self) {
        self.just_pressed = [false; BTN_COUNT];

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
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, false);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    match axis {
                        Axis::LeftStickX => self.stick_x = value,
                        Axis::LeftStickY => self.stick_y = value,
                        _ => {}
                    }
                }
                EventType::Connected => {
                    tracing::info!(id = %event.id, "gamepad connected");
                    self.connected = true;
                }
                EventType::Disconnected => {
                    tracing::info!(id = %event.id, "gamepad disconnected");
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, gilrs_btn: Button, held: bool) {
        match gilrs_btn {
            Button::DPadUp    => self.dpad.up = held,
            Button::DPadDown  => self.dpad.down = held,
            Button::DPadLeft  => self.dpad.left = held,
            Button::DPadRight => self.dpad.right = held,
            other => {
                if let Some(btn) = Btn::from_gilrs(other) {
                    let idx = btn as usize;
                    if held && !self.held[idx] {
                        self.just_pressed[idx] = true;
                    }
                    self.held[idx] = held;
                }
            }
        }
    }

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.just_pressed[b as usize])
    }

    /// Movement (held) and quit (edge) for this frame.
    pub fn frame_input(&self) -> FrameInput {
        FrameInput {
            up: self.dpad.up || self.stick_y > STICK_DEADZONE,
            down: self.dpad.down || self.stick_y < -STICK_DEADZONE,
            left: self.dpad.left || self.stick_x < -STICK_DEADZONE,
            right: self.dpad.right || self.stick_x > STICK_DEADZONE,
            quit: self.any_just_pressed(&self.quit),
            dump_positions: false,
        }
    }

    pub fn confirm_pressed(&self) -> bool {
        self.any_just_pressed(&self.confirm) || self.any_just_pressed(&self.quit)
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        self.held = [false; BTN_COUNT];
        self.dpad = Dpad::default();
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }
}
