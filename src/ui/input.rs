/// Keyboard state tracker.
///
/// Directions are level-triggered: a key counts as held from its Press until
/// its Release. Terminals that never report Release fall back to a timeout
/// after the last Press/Repeat.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::sim::frontend::FrameInput;

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];
const KEYS_DUMP: &[KeyCode] = &[KeyCode::Char('p'), KeyCode::Char('P')];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys pressed (not repeated) during the latest drain.
    fresh_presses: Vec<KeyCode>,

    ctrl_c: bool,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            ctrl_c: false,
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.ctrl_c = false;

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.apply(key, Instant::now());
            }
        }

        let now = Instant::now();
        self.expire(now);
    }

    fn apply(&mut self, key: KeyEvent, now: Instant) {
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&key.code);
            }
            KeyEventKind::Release => {}
            _ => {
                if key.modifiers.contains(KeyModifiers::CONTROL)
                    && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
                {
                    self.ctrl_c = true;
                }
                let was_held = self.is_held_at(key.code, now);
                self.last_active.insert(key.code, now);
                if !was_held {
                    self.fresh_presses.push(key.code);
                }
            }
        }
    }

    fn expire(&mut self, now: Instant) {
        if !self.honor_release {
            self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
        }
    }

    /// Forget every held key and pending press. A key still physically down
    /// counts again only after its next Press/Repeat event.
    pub fn release_all(&mut self) {
        self.last_active.clear();
        self.fresh_presses.clear();
        self.ctrl_c = false;
    }

    /// Movement and quit as of the latest drain.
    pub fn frame_input(&self) -> FrameInput {
        let now = Instant::now();
        let held = |codes: &[KeyCode]| codes.iter().any(|c| self.is_held_at(*c, now));
        FrameInput {
            up: held(KEYS_UP),
            down: held(KEYS_DOWN),
            left: held(KEYS_LEFT),
            right: held(KEYS_RIGHT),
            quit: self.ctrl_c || self.any_pressed(KEYS_QUIT),
            dump_positions: self.any_pressed(KEYS_DUMP),
        }
    }

    /// Was any confirm key freshly pressed this frame?
    pub fn confirm_pressed(&self) -> bool {
        self.any_pressed(KEYS_CONFIRM) || self.any_pressed(KEYS_QUIT)
    }

    fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.fresh_presses.contains(c))
    }

    fn is_held_at(&self, code: KeyCode, now: Instant) -> bool {
        match self.last_active.get(&code) {
            Some(t) if self.honor_release => *t <= now,
            Some(t) => now.duration_since(*t) < HOLD_TIMEOUT,
            None => false,
        }
    }
}
