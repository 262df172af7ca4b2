/// Terminal preview of the surface viewer, redrawn on every key press
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use paramesh_core::Scene;
use std::io::{self, stdout, Write};

pub mod renderer;

pub use renderer::AsciiRenderer;

/// Rows taken by the status line
const HEADER_ROWS: u16 = 1;
const KEY_HELP: &str =
    "O/F/P=Projection C=Orbit H=Height D=Distance V=Fov B=Window (Shift reverses) Q=Quit";

/// What a key event means to the app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    /// Character plus shift state, for the camera keymap
    Camera(char, bool),
    Ignore,
}

pub fn key_action(key: &KeyEvent) -> KeyAction {
    if key.kind == KeyEventKind::Release {
        return KeyAction::Ignore;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => KeyAction::Quit,
        KeyCode::Char(c) => {
            let shift = key.modifiers.contains(KeyModifiers::SHIFT) || c.is_ascii_uppercase();
            KeyAction::Camera(c, shift)
        }
        _ => KeyAction::Ignore,
    }
}

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    scene: Scene,
    renderer: AsciiRenderer,
    running: bool,
}

impl TerminalApp {
    pub fn new(scene: Scene) -> io::Result<Self> {
        let (width, height) = terminal::size()?;

        let mut app = Self {
            scene,
            renderer: AsciiRenderer::new(0, 0),
            running: true,
        };
        app.resize(width, height);
        Ok(app)
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        self.render()?;

        // No animation: block until the next event and redraw only then
        while self.running {
            match event::read()? {
                Event::Key(key) => {
                    self.handle_input(key);
                    if self.running {
                        self.render()?;
                    }
                }
                Event::Resize(width, height) => {
                    self.resize(width, height);
                    self.render()?;
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn handle_input(&mut self, key: KeyEvent) {
        match key_action(&key) {
            KeyAction::Quit => self.running = false,
            KeyAction::Camera(c, shift) => {
                self.scene.camera.handle_key(c, shift);
            }
            KeyAction::Ignore => {}
        }
    }

    fn resize(&mut self, width: u16, height: u16) {
        let rows = height.saturating_sub(HEADER_ROWS);
        self.renderer.resize(width as usize, rows as usize);
        // Terminal cells are about twice as tall as they are wide
        self.scene
            .camera
            .set_viewport(width as u32, rows as u32 * 2);
        log::debug!("viewport resized to {}x{} cells", width, rows);
    }

    fn render(&mut self) -> io::Result<()> {
        match self.scene.render(&mut self.renderer) {
            Ok(()) => {}
            Err(never) => match never {},
        }

        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, HEADER_ROWS))?;

        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(terminal::ClearType::CurrentLine),
            SetForegroundColor(Color::Yellow),
            Print(format!("Paramesh | {:?} | {}", self.scene.camera.mode, KEY_HELP)),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}
