//! Terminal dashboard: ratatui terminal ownership plus keyboard input.
//!
//! [`TerminalDashboard`] implements the core [`Renderer`] trait, so the
//! aggregator draws a full frame on every detected change. Keyboard and
//! resize events are read on a separate thread by [`spawn_input_listener`]
//! and forwarded to the aggregator as `Shutdown` / `Redraw` events.

use std::io;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::cursor;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::Terminal;

use svcwatch_core::monitor::aggregator::{AggregatorHandle, Renderer, StatusTable};
use svcwatch_core::types::service::ServiceDescriptor;

use crate::dashboard;
use crate::theme::Theme;

/// How often the input thread wakes up when no key is pressed.
const INPUT_POLL: Duration = Duration::from_millis(250);


/// What a terminal event asks the monitor to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Quit,
    Redraw,
}


/// Renders the service table to a ratatui terminal.
///
/// Built with [`TerminalDashboard::stdout`], it owns raw mode and the
/// alternate screen and restores both when dropped.
pub struct TerminalDashboard<B: Backend> {
    terminal: Terminal<B>,
    theme: Theme,
    owns_screen: bool,
}


impl TerminalDashboard<CrosstermBackend<io::Stdout>> {
    /// Enter raw mode and the alternate screen on stdout.
    pub fn stdout() -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen, cursor::Hide) {
            let _ = terminal::disable_raw_mode();
            return Err(e);
        }
        match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => Ok(TerminalDashboard {
                terminal,
                theme: Theme::default(),
                owns_screen: true,
            }),
            Err(e) => {
                let _ = terminal::disable_raw_mode();
                let _ = execute!(io::stdout(), LeaveAlternateScreen, cursor::Show);
                Err(e)
            }
        }
    }
}


impl<B: Backend> TerminalDashboard<B> {
    /// Wrap an existing terminal without touching raw mode or screens.
    pub fn with_terminal(terminal: Terminal<B>, theme: Theme) -> Self {
        TerminalDashboard {
            terminal,
            theme,
            owns_screen: false,
        }
    }

    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    fn draw(&mut self, services: &[ServiceDescriptor], table: &StatusTable) -> io::Result<()> {
        let theme = &self.theme;
        self.terminal.draw(|frame| {
            let area = frame.area();
            dashboard::render_dashboard(frame, area, services, table, theme);
        })?;
        Ok(())
    }
}


impl<B: Backend> Renderer for TerminalDashboard<B> {
    fn render(&mut self, services: &[ServiceDescriptor], table: &StatusTable) {
        if let Err(e) = self.draw(services, table) {
            tracing::warn!(error = %e, "failed to draw dashboard");
        }
    }
}


impl<B: Backend> Drop for TerminalDashboard<B> {
    fn drop(&mut self) {
        if self.owns_screen {
            let _ = terminal::disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, cursor::Show);
        }
    }
}


/// Map a terminal event to a monitor action.
pub fn classify_event(event: &Event) -> Option<InputAction> {
    match event {
        Event::Key(key) => classify_key(key),
        Event::Resize(_, _) => Some(InputAction::Redraw),
        _ => None,
    }
}


fn classify_key(key: &KeyEvent) -> Option<InputAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(InputAction::Quit)
        }
        KeyCode::Char('q') | KeyCode::Esc => Some(InputAction::Quit),
        KeyCode::Char('r') => Some(InputAction::Redraw),
        _ => None,
    }
}


/// Read terminal events on a background thread and forward them.
///
/// The thread ends after forwarding a quit, or once the aggregator stops
/// accepting events.
pub fn spawn_input_listener(handle: AggregatorHandle) -> Result<JoinHandle<()>, io::Error> {
    thread::Builder::new()
        .name("input".into())
        .spawn(move || loop {
            let event = match event::poll(INPUT_POLL) {
                Ok(true) => match event::read() {
                    Ok(ev) => ev,
                    Err(e) => {
                        tracing::warn!(error = %e, "terminal read failed");
                        continue;
                    }
                },
                Ok(false) => continue,
                Err(e) => {
                    tracing::warn!(error = %e, "terminal poll failed");
                    thread::sleep(INPUT_POLL);
                    continue;
                }
            };
            let sent = match classify_event(&event) {
                Some(InputAction::Quit) => {
                    let _ = handle.shutdown();
                    return;
                }
                Some(InputAction::Redraw) => handle.redraw(),
                None => Ok(()),
            };
            if sent.is_err() {
                return;
            }
        })
}
