//! Recorded input sessions and deterministic replay.
//!
//! A session names the challenge, the seed its board was generated from and
//! the host config, followed by timestamped input events. Replaying mounts
//! at t = 0, drains due timers before each event and finally runs the clock
//! to `end_ms` so feedback delays and time limits play out.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::arithmetic::Arithmetic;
use crate::captcha::Captcha;
use crate::chess::ChessChallenge;
use crate::circle::CircleDrawing;
use crate::click_precision::ClickPrecision;
use crate::contract::{ChallengeConfig, ChallengeResult, CompletionGate};
use crate::error::{ChallengeError, Result};
use crate::flags::FlagMatch;
use crate::kind::ChallengeKind;
use crate::math_sort::MathSort;
use crate::memory_match::MemoryMatch;
use crate::odd_one_out::OddOneOut;
use crate::pixel_memory::PixelMemory;
use crate::quiz::Quiz;
use crate::reflex::Reflex;
use crate::shell::{Shell, Spawn};
use crate::simon_says::SimonSays;
use crate::sliding::SlidingPuzzle;
use crate::tetris::Tetris;

/// How long the clock keeps running after the last event when the session
/// does not say.
pub const DEFAULT_TAIL_MS: u64 = 5000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent<E> {
    pub at_ms: u64,
    pub event: E,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session<E> {
    pub kind: ChallengeKind,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub config: ChallengeConfig,
    #[serde(default = "Vec::new")]
    pub events: Vec<TimedEvent<E>>,
    #[serde(default)]
    pub end_ms: Option<u64>,
}

impl<E> Session<E> {
    pub fn end_ms(&self) -> u64 {
        self.end_ms.unwrap_or_else(|| {
            self.events.iter().map(|e| e.at_ms).max().unwrap_or(0) + DEFAULT_TAIL_MS
        })
    }
}

#[derive(Deserialize)]
struct Header {
    kind: ChallengeKind,
}

/// Read only the `kind` field of a session document.
pub fn peek_kind(text: &str) -> Result<ChallengeKind> {
    let header: Header = serde_json::from_str(text)?;
    Ok(header.kind)
}

/// Replay `session` against a freshly spawned `G`. Events are applied in
/// timestamp order; ties keep file order.
pub fn replay<G: Spawn>(session: &Session<G::Event>) -> Result<Shell<G>> {
    let mut shell: Shell<G> =
        Shell::spawn(session.config.clone(), session.seed, CompletionGate::silent());
    let kind = shell.game().kind();
    if kind != session.kind {
        return Err(ChallengeError::KindMismatch {
            expected: kind.to_string(),
            found: session.kind.to_string(),
        });
    }
    let mut events: Vec<&TimedEvent<G::Event>> = session.events.iter().collect();
    events.sort_by_key(|e| e.at_ms);

    shell.mount(0);
    for timed in events {
        shell.tick(timed.at_ms);
        if !shell.dispatch(timed.event.clone(), timed.at_ms) {
            log::debug!("{kind}: event at {}ms ignored", timed.at_ms);
        }
    }
    shell.tick(session.end_ms());
    Ok(shell)
}

/// Parse a session for `G` and replay it.
pub fn replay_str<G>(text: &str) -> Result<Shell<G>>
where
    G: Spawn,
    G::Event: DeserializeOwned,
{
    let session: Session<G::Event> = serde_json::from_str(text)?;
    replay(&session)
}

/// Replay any session document, choosing the challenge from its `kind`.
pub fn replay_json(text: &str) -> Result<Option<ChallengeResult>> {
    fn run<G>(text: &str) -> Result<Option<ChallengeResult>>
    where
        G: Spawn,
        G::Event: DeserializeOwned,
    {
        Ok(replay_str::<G>(text)?.result())
    }

    match peek_kind(text)? {
        ChallengeKind::Captcha => run::<Captcha>(text),
        ChallengeKind::Quiz => run::<Quiz>(text),
        ChallengeKind::Arithmetic => run::<Arithmetic>(text),
        ChallengeKind::CircleDrawing => run::<CircleDrawing>(text),
        ChallengeKind::FlagMatch => run::<FlagMatch>(text),
        ChallengeKind::SlidingPuzzle => run::<SlidingPuzzle>(text),
        ChallengeKind::PixelMemory => run::<PixelMemory>(text),
        ChallengeKind::ChessPuzzle => run::<ChessChallenge>(text),
        ChallengeKind::Tetris => run::<Tetris>(text),
        ChallengeKind::MathSort => run::<MathSort>(text),
        ChallengeKind::OddOneOut => run::<OddOneOut>(text),
        ChallengeKind::FallingBalls => run::<Reflex>(text),
        ChallengeKind::ClickPrecision => run::<ClickPrecision>(text),
        ChallengeKind::SimonSays => run::<SimonSays>(text),
        ChallengeKind::MemoryMatch => run::<MemoryMatch>(text),
    }
}
