//! Ticket lifecycle status vocabulary and transition rules.

use super::ParseTicketStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ticket lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TicketStatus {
    /// Ticket has been opened and no engineer has claimed it.
    Waiting,
    /// An engineer has claimed the ticket and is working on it.
    InProgress,
    /// The engineer believes the problem is fixed and awaits customer
    /// confirmation.
    AwaitingConfirmation,
    /// The customer confirmed the fix.
    Completed,
    /// The confirmation window lapsed and the ticket closed itself.
    AutoCompleted,
}

impl TicketStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::InProgress => "in-progress",
            Self::AwaitingConfirmation => "awaiting-confirmation",
            Self::Completed => "completed",
            Self::AutoCompleted => "auto-completed",
        }
    }

    /// Returns true when no further transitions are permitted.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::AutoCompleted)
    }

    /// Returns true when the lifecycle permits moving to `target`.
    ///
    /// Self-transitions are never permitted; terminal statuses admit
    /// nothing.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Waiting, Self::InProgress)
                | (Self::InProgress, Self::AwaitingConfirmation | Self::Waiting)
                | (
                    Self::AwaitingConfirmation,
                    Self::Completed | Self::InProgress | Self::AutoCompleted
                )
        )
    }
}

impl TryFrom<&str> for TicketStatus {
    type Error = ParseTicketStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "waiting" => Ok(Self::Waiting),
            "in-progress" => Ok(Self::InProgress),
            "awaiting-confirmation" => Ok(Self::AwaitingConfirmation),
            "completed" => Ok(Self::Completed),
            "auto-completed" => Ok(Self::AutoCompleted),
            _ => Err(ParseTicketStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
