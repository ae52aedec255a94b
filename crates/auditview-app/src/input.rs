//! Terminal-agnostic keyboard input.

/// Keyboard input abstraction.
///
/// Decouples application logic from terminal libraries so the state machine
/// can be driven from tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Printable character.
    Char(char),
    /// Escape key (quit).
    Esc,
    /// Ctrl-C pressed while the terminal is in raw mode (quit).
    CtrlC,
}

impl KeyInput {
    /// Whether this key asks the display to quit.
    pub fn is_quit(self) -> bool {
        matches!(self, Self::Char('q' | 'Q') | Self::Esc | Self::CtrlC)
    }
}
