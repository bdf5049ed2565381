//! Edit / command mode switch.
//!
//! The editor is modal in the smallest possible way: Escape toggles
//! between typing text and issuing single-character commands. There is
//! no pending-operator state; each command is one keypress.

/// Which set of keybindings is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Keys insert text; Escape switches to [`Mode::Command`].
    #[default]
    Edit,
    /// Keys run single-character commands; Escape switches back.
    Command,
}

impl Mode {
    /// Toggle between the two modes.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Edit => Self::Command,
            Self::Command => Self::Edit,
        }
    }
}
