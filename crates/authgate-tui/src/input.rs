//! Input state and key handling for the TUI.
//!
//! This module owns the credential buffer on the sign-in screen and maps
//! every other key to a [`UserInput`] for the shell. Which keys mean what
//! depends on the screen being drawn.

use authgate_app::UserInput;
use authgate_core::Route;

/// Key input events from the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Character input.
    Char(char),
    /// Enter/Return key.
    Enter,
    /// Backspace key.
    Backspace,
    /// Delete key.
    Delete,
    /// Tab key.
    Tab,
    /// Escape key.
    Esc,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Home key.
    Home,
    /// End key.
    End,
}

/// What a key press amounts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Hand this intent to the shell.
    Input(UserInput),
    /// Only the credential buffer changed; redraw.
    Redraw,
    /// Nothing to do.
    Ignored,
}

/// Input state for the TUI.
///
/// Manages the credential buffer and cursor position on the sign-in screen.
/// The cursor counts characters, not bytes.
#[derive(Debug, Default)]
pub struct InputState {
    /// Credential typed so far.
    buffer: String,
    /// Cursor position within the buffer.
    cursor: usize,
}

impl InputState {
    /// Create a new empty input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current text in the input buffer.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Current cursor position.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Handle a key press while `screen` is drawn.
    ///
    /// `screen` is `None` while the splash is shown; only quitting is
    /// possible then.
    pub fn handle_key(&mut self, key: KeyInput, screen: Option<Route>) -> KeyOutcome {
        match (key, screen) {
            (KeyInput::Esc, _) => KeyOutcome::Input(UserInput::Quit),
            (_, None) => KeyOutcome::Ignored,
            (KeyInput::Tab, Some(route)) => {
                KeyOutcome::Input(UserInput::Navigate(route.next_in_stack()))
            },
            (key, Some(Route::Login)) => self.edit(key),
            (KeyInput::Char(c), Some(_)) => Self::command(c),
            _ => KeyOutcome::Ignored,
        }
    }

    /// Keys on the sign-in screen edit the credential buffer.
    fn edit(&mut self, key: KeyInput) -> KeyOutcome {
        match key {
            KeyInput::Char(c) => {
                let at = self.byte_index(self.cursor);
                self.buffer.insert(at, c);
                self.cursor = self.cursor.saturating_add(1);
            },
            KeyInput::Backspace => {
                if self.cursor > 0 {
                    self.cursor = self.cursor.saturating_sub(1);
                    let at = self.byte_index(self.cursor);
                    self.buffer.remove(at);
                }
            },
            KeyInput::Delete => {
                if self.cursor < self.len() {
                    let at = self.byte_index(self.cursor);
                    self.buffer.remove(at);
                }
            },
            KeyInput::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyInput::Right => self.cursor = self.cursor.saturating_add(1).min(self.len()),
            KeyInput::Home => self.cursor = 0,
            KeyInput::End => self.cursor = self.len(),
            KeyInput::Enter => return KeyOutcome::Input(self.submit()),
            KeyInput::Tab | KeyInput::Esc => return KeyOutcome::Ignored,
        }
        KeyOutcome::Redraw
    }

    /// Submit the buffer. An empty buffer resumes the stored credential.
    fn submit(&mut self) -> UserInput {
        let text = std::mem::take(&mut self.buffer);
        self.cursor = 0;

        let credential = if text.trim().is_empty() { None } else { Some(text) };
        UserInput::Login { credential }
    }

    /// Single-key commands outside the sign-in screen.
    fn command(c: char) -> KeyOutcome {
        let input = match c {
            'l' => UserInput::Logout,
            'f' => UserInput::ForceLogout,
            'r' => UserInput::Refetch,
            'q' => UserInput::Quit,
            '1'..='5' => {
                let index = c as usize - '1' as usize;
                match Route::ALL.get(index) {
                    Some(route) => UserInput::Navigate(*route),
                    None => return KeyOutcome::Ignored,
                }
            },
            _ => return KeyOutcome::Ignored,
        };
        KeyOutcome::Input(input)
    }

    fn len(&self) -> usize {
        self.buffer.chars().count()
    }

    fn byte_index(&self, cursor: usize) -> usize {
        self.buffer.char_indices().nth(cursor).map_or(self.buffer.len(), |(i, _)| i)
    }
}
