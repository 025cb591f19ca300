use std::{
    io::{self, Stdout},
    sync::Once,
};

use color_eyre::eyre::{Result, WrapErr};
use crossterm::{
    cursor::Show,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Frame, Terminal, backend::CrosstermBackend, layout::Rect};

static PANIC_HOOK: Once = Once::new();

/// Puts the terminal back on drop. Created right after raw mode is enabled,
/// so a failure in any later setup step still restores the screen.
struct ScreenMode;

impl ScreenMode {
    fn enter() -> Result<Self> {
        enable_raw_mode().wrap_err("failed to enable raw mode")?;
        let mode = ScreenMode;
        execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture)
            .wrap_err("failed to enter alternate screen")?;
        Ok(mode)
    }
}

impl Drop for ScreenMode {
    fn drop(&mut self) {
        restore_terminal();
    }
}

/// The form's terminal session: raw mode, alternate screen and mouse capture
/// for as long as it lives.
pub struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    _mode: ScreenMode,
}

impl TerminalGuard {
    pub fn new() -> Result<Self> {
        install_panic_hook();
        let mode = ScreenMode::enter()?;
        let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))
            .wrap_err("failed to initialize terminal")?;
        Ok(Self {
            terminal,
            _mode: mode,
        })
    }

    pub fn draw(&mut self, render: impl FnOnce(&mut Frame<'_>)) -> Result<()> {
        self.terminal
            .draw(render)
            .wrap_err("failed to draw the order form")?;
        Ok(())
    }

    pub fn resize(&mut self, width: u16, height: u16) -> Result<()> {
        self.terminal
            .resize(Rect::new(0, 0, width, height))
            .wrap_err("failed to resize terminal")
    }
}

fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            restore_terminal();
            previous(panic_info);
        }));
    });
}

fn restore_terminal() {
    let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen, Show);
    let _ = disable_raw_mode();
}
