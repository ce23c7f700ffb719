//! Terminal driver for the TUI.
//!
//! Implements the [`Driver`] trait for terminal I/O using crossterm for
//! keyboard events and ratatui for rendering.

use std::io::{self, Stdout, stdout};

use authgate_app::{Driver, NavigationController, RouteHistory, Shell, UserInput};
use authgate_core::{AuthError, CredentialStoreError, Route};
use crossterm::{
    ExecutableCommand,
    event::{Event, EventStream, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use thiserror::Error;

use crate::{
    input::{InputState, KeyInput, KeyOutcome},
    ui,
};

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Credential store could not be opened or seeded.
    #[error("credential store error: {0}")]
    Store(#[from] CredentialStoreError),

    /// Seed credential was rejected.
    #[error("{0}")]
    Credential(#[from] AuthError),
}

/// Terminal driver implementing the [`Driver`] trait.
///
/// Handles terminal I/O (crossterm) and rendering (ratatui). Owns the input
/// state for the credential buffer, and keeps the last shell it drew so
/// buffer edits can be redrawn without a round trip through the runtime.
pub struct TerminalDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_stream: EventStream,
    input_state: InputState,
    history: RouteHistory,
    last_shell: Shell,
}

impl TerminalDriver {
    /// Take over the terminal.
    pub fn new() -> Result<Self, TerminalError> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;
        let event_stream = EventStream::new();

        Ok(Self {
            terminal,
            event_stream,
            input_state: InputState::new(),
            history: RouteHistory::new(),
            last_shell: Shell::new(),
        })
    }

    /// Convert crossterm `KeyCode` to `KeyInput`.
    fn convert_key(code: KeyCode) -> Option<KeyInput> {
        match code {
            KeyCode::Char(c) => Some(KeyInput::Char(c)),
            KeyCode::Enter => Some(KeyInput::Enter),
            KeyCode::Backspace => Some(KeyInput::Backspace),
            KeyCode::Delete => Some(KeyInput::Delete),
            KeyCode::Tab => Some(KeyInput::Tab),
            KeyCode::Esc => Some(KeyInput::Esc),
            KeyCode::Left => Some(KeyInput::Left),
            KeyCode::Right => Some(KeyInput::Right),
            KeyCode::Home => Some(KeyInput::Home),
            KeyCode::End => Some(KeyInput::End),
            _ => None,
        }
    }

    fn draw(&mut self) -> Result<(), TerminalError> {
        let Self { terminal, input_state, last_shell, .. } = self;
        terminal.draw(|frame| ui::render(frame, last_shell, input_state))?;
        Ok(())
    }

    fn handle_key(&mut self, key: KeyInput) -> Result<Option<UserInput>, TerminalError> {
        let screen = self.last_shell.visible_screen();
        match self.input_state.handle_key(key, screen) {
            KeyOutcome::Input(input) => Ok(Some(input)),
            KeyOutcome::Redraw => {
                self.draw()?;
                Ok(None)
            },
            KeyOutcome::Ignored => Ok(None),
        }
    }
}

impl NavigationController for TerminalDriver {
    fn redirect(&mut self, route: Route) {
        self.history.redirect(route);
    }
}

impl Driver for TerminalDriver {
    type Error = TerminalError;

    async fn poll_input(&mut self) -> Result<Option<UserInput>, Self::Error> {
        let timeout = tokio::time::Duration::from_millis(100);

        tokio::select! {
            biased;

            // Terminal events
            maybe_event = self.event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) if key_event.kind == KeyEventKind::Press => {
                        match Self::convert_key(key_event.code) {
                            Some(key_input) => self.handle_key(key_input),
                            None => Ok(None),
                        }
                    },
                    Some(Ok(Event::Resize(..))) => {
                        self.draw()?;
                        Ok(None)
                    },
                    Some(Err(e)) => Err(TerminalError::Io(e)),
                    _ => Ok(None),
                }
            }

            // Tick timeout
            () = tokio::time::sleep(timeout) => Ok(None),
        }
    }

    fn render(&mut self, shell: &Shell) -> Result<(), Self::Error> {
        self.last_shell.clone_from(shell);
        self.draw()
    }

    fn stop(&mut self) {
        tracing::debug!(redirects = self.history.redirects().len(), "terminal driver stopped");
    }
}

impl Drop for TerminalDriver {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}
