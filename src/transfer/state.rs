//! Transfer State Definitions
//!
//! States are stored as text in `transfers_tb.state`.

use std::fmt;

/// Transfer lifecycle states
///
/// `Confirmed` and `Cancelled` are terminal: no transition leaves them.
/// Cancellation is modelled as `confirmed -> cancelled` with compensating
/// balance movement; a transfer still in `created` has moved no funds and
/// cannot be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferState {
    /// Pending OTP confirmation; no funds moved yet
    Created,

    /// Terminal: funds debited/credited
    Confirmed,

    /// Terminal: a confirmed transfer reversed
    Cancelled,
}

impl TransferState {
    /// Check if this is a terminal state (no more transitions possible)
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferState::Confirmed | TransferState::Cancelled)
    }

    /// Storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferState::Created => "created",
            TransferState::Confirmed => "confirmed",
            TransferState::Cancelled => "cancelled",
        }
    }

    /// Parse the storage representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "created" => Some(TransferState::Created),
            "confirmed" => Some(TransferState::Confirmed),
            "cancelled" => Some(TransferState::Cancelled),
            _ => None,
        }
    }

    /// Whether a transition from `self` to `to` is defined
    pub fn can_transition_to(&self, to: TransferState) -> bool {
        matches!(
            (self, to),
            (TransferState::Created, TransferState::Confirmed)
                | (TransferState::Confirmed, TransferState::Cancelled)
        )
    }
}

impl fmt::Display for TransferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(TransferState::Confirmed.is_terminal());
        assert!(TransferState::Cancelled.is_terminal());
        assert!(!TransferState::Created.is_terminal());
    }

    #[test]
    fn test_roundtrip() {
        for s in [
            TransferState::Created,
            TransferState::Confirmed,
            TransferState::Cancelled,
        ] {
            assert_eq!(TransferState::parse(s.as_str()), Some(s));
        }
        assert_eq!(TransferState::parse("CONFIRMED"), None);
        assert_eq!(TransferState::parse(""), None);
    }

    #[test]
    fn test_defined_transitions() {
        use TransferState::*;
        assert!(Created.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(Cancelled));

        assert!(!Created.can_transition_to(Cancelled));
        assert!(!Confirmed.can_transition_to(Created));
        assert!(!Cancelled.can_transition_to(Created));
        assert!(!Cancelled.can_transition_to(Confirmed));

        // No self-loops: a second confirm or cancel must not re-fire.
        assert!(!Created.can_transition_to(Created));
        assert!(!Confirmed.can_transition_to(Confirmed));
        assert!(!Cancelled.can_transition_to(Cancelled));
    }

    #[test]
    fn test_display() {
        assert_eq!(TransferState::Created.to_string(), "created");
        assert_eq!(TransferState::Confirmed.to_string(), "confirmed");
        assert_eq!(TransferState::Cancelled.to_string(), "cancelled");
    }
}
