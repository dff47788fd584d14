/// Terminal frontend: crossterm rendering, keyboard and optional gamepad
/// input, fixed-delay frame pacing.

use std::io::{self, Write};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags};
use crossterm::{execute, terminal};

use crate::config::GameConfig;
use crate::sim::frontend::{FrameInput, Frontend};
use crate::sim::view::FrameView;
use super::gamepad::GamepadState;
use super::input::InputState;
use super::renderer::{Renderer, Screen};

/// Screens dismiss themselves after this long.
const SCREEN_TIMEOUT: Duration = Duration::from_secs(3);
const SCREEN_POLL: Duration = Duration::from_millis(16);

pub struct TerminalFrontend {
    renderer: Renderer,
    kb: InputState,
    gp: GamepadState,
    frame_delay: Duration,
    frame_start: Instant,
    enhanced_keys: bool,
}

impl TerminalFrontend {
    pub fn new(config: &GameConfig) -> Self {
        TerminalFrontend {
            renderer: Renderer::new(),
            kb: InputState::new(),
            gp: GamepadState::new(&config.gamepad),
            frame_delay: Duration::from_millis(config.frame_delay_ms),
            frame_start: Instant::now(),
            enhanced_keys: false,
        }
    }

    /// Enter raw mode and the alternate screen. Release events are honored
    /// only when the terminal reports them.
    pub fn init(&mut self) -> io::Result<()> {
        self.renderer.init()?;

        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                io::stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.enhanced_keys = true;
            self.kb.honor_release = true;
        }
        tracing::info!(
            release_events = self.enhanced_keys,
            gamepad = self.gp.connected,
            "terminal ready"
        );
        self.frame_start = Instant::now();
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.enhanced_keys {
            execute!(io::stdout(), PopKeyboardEnhancementFlags)?;
            self.enhanced_keys = false;
        }
        self.renderer.cleanup()?;
        io::stdout().flush()
    }

    /// Show a screen until it is dismissed or times out.
    fn hold_screen(&mut self, screen: Screen<'_>) -> io::Result<()> {
        self.renderer.render_screen(screen)?;

        let shown = Instant::now();
        while shown.elapsed() < SCREEN_TIMEOUT {
            self.kb.drain_events();
            self.gp.update();
            if self.kb.confirm_pressed() || self.gp.confirm_pressed() {
                break;
            }
            thread::sleep(SCREEN_POLL);
        }

        // Keys held through the screen must not leak into the next level.
        self.kb.drain_events();
        self.kb.release_all();
        self.frame_start = Instant::now();
        Ok(())
    }
}

impl Frontend for TerminalFrontend {
    fn poll_input(&mut self) -> io::Result<FrameInput> {
        self.kb.drain_events();
        self.gp.update();

        let kb = self.kb.frame_input();
        let gp = self.gp.frame_input();
        Ok(FrameInput {
            up: kb.up || gp.up,
            down: kb.down || gp.down,
            left: kb.left || gp.left,
            right: kb.right || gp.right,
            quit: kb.quit || gp.quit,
            dump_positions: kb.dump_positions,
        })
    }

    fn render(&mut self, view: &FrameView) -> io::Result<()> {
        self.renderer.render(view)
    }

    fn show_level_cleared(&mut self, view: &FrameView) -> io::Result<()> {
        self.hold_screen(Screen::LevelCleared(view))
    }

    fn show_game_over(&mut self, view: &FrameView) -> io::Result<()> {
        self.hold_screen(Screen::GameOver(view))
    }

    fn show_victory(&mut self, score: i64) -> io::Result<()> {
        self.hold_screen(Screen::Victory { score })
    }

    fn pace(&mut self) {
        let elapsed = self.frame_start.elapsed();
        if elapsed < self.frame_delay {
            thread::sleep(self.frame_delay - elapsed);
        }
        self.frame_start = Instant::now();
    }
}
