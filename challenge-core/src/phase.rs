use serde::{Deserialize, Serialize};

/// Coarse lifecycle shared by every challenge. Each game keeps a richer
/// tagged state internally and projects it onto one of these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Nothing entered yet.
    Idle,
    /// Accepting input.
    Interacting,
    /// Input locked while a verdict is shown or a transition is pending.
    Submitted,
    /// Terminal.
    Result,
}

impl Phase {
    pub fn is_interactive(self) -> bool {
        matches!(self, Phase::Idle | Phase::Interacting)
    }
}
