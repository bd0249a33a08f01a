use serde::{Deserialize, Serialize};

/// What the host receives when a challenge ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResult {
    pub success: bool,
    /// Whole seconds between mount and report.
    pub time_spent: u32,
    pub score: u32,
}

/// Host-supplied settings. Both fields are pass-throughs for the shell and
/// never influence game rules.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeConfig {
    #[serde(default)]
    pub challenge_id: String,
    /// Seconds; `None` disables the countdown.
    #[serde(default)]
    pub time_limit: Option<u32>,
}

/// Verdict a game produces when it reaches its terminal state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub success: bool,
    pub score: u32,
}

pub type OnComplete = Box<dyn FnOnce(ChallengeResult)>;

/// Holds the host callback and releases it at most once.
pub struct CompletionGate {
    callback: Option<OnComplete>,
    fired: Option<ChallengeResult>,
}

impl CompletionGate {
    pub fn new(callback: OnComplete) -> Self {
        CompletionGate {
            callback: Some(callback),
            fired: None,
        }
    }

    /// Gate that records the result without notifying anyone.
    pub fn silent() -> Self {
        CompletionGate {
            callback: None,
            fired: None,
        }
    }

    /// Invoke the callback. Returns `false` when a result was already
    /// reported, in which case nothing happens.
    pub fn fire(&mut self, result: ChallengeResult) -> bool {
        if self.fired.is_some() {
            return false;
        }
        self.fired = Some(result);
        if let Some(cb) = self.callback.take() {
            cb(result);
        }
        true
    }

    /// Drop the callback without reporting (unmount).
    pub fn disarm(&mut self) {
        self.callback = None;
    }

    pub fn result(&self) -> Option<ChallengeResult> {
        self.fired
    }
}

impl std::fmt::Debug for CompletionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionGate")
            .field("armed", &self.callback.is_some())
            .field("fired", &self.fired)
            .finish()
    }
}

/// Score as the integer percentage `part / whole`, 0 when `whole` is 0.
pub fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part * 100) / whole) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn gate_fires_once() {
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        let mut gate = CompletionGate::new(Box::new(move |_| c.set(c.get() + 1)));
        let r = ChallengeResult {
            success: true,
            time_spent: 3,
            score: 90,
        };
        assert!(gate.fire(r));
        assert!(!gate.fire(ChallengeResult { score: 10, ..r }));
        assert_eq!(calls.get(), 1);
        assert_eq!(gate.result(), Some(r));
    }

    #[test]
    fn disarmed_gate_stays_quiet() {
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        let mut gate = CompletionGate::new(Box::new(move |_| c.set(c.get() + 1)));
        gate.disarm();
        gate.fire(ChallengeResult {
            success: false,
            time_spent: 0,
            score: 0,
        });
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn result_serializes_camel_case() {
        let r = ChallengeResult {
            success: true,
            time_spent: 12,
            score: 75,
        };
        let v = serde_json::to_value(r).unwrap();
        assert_eq!(v["timeSpent"], 12);
    }

    #[test]
    fn percent_handles_empty() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(3, 4), 75);
    }
}
