//! Shell-wide timing constants.
//! Values are expressed in milliseconds unless noted otherwise.

/// Delay between a terminal verdict and the completion report.
pub const FEEDBACK_DELAY_MS: u64 = 1500;
/// Pause after a per-round answer before the next round is shown.
pub const ROUND_ADVANCE_MS: u64 = 1000;
/// Upper bound on how many due timers a single `tick` may drain.
pub const MAX_TIMERS_PER_TICK: usize = 4096;
