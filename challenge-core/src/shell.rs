//! The shared challenge shell: title, description, optional countdown and
//! the one-shot completion report wrapped around any [`Game`].

use std::fmt;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::constants::{FEEDBACK_DELAY_MS, MAX_TIMERS_PER_TICK};
use crate::contract::{ChallengeConfig, ChallengeResult, CompletionGate, Outcome};
use crate::kind::ChallengeKind;
use crate::phase::Phase;
use crate::scheduler::{Scheduler, TimerId};

/// A single challenge's rules as an explicit `(state, event) -> state`
/// machine. Rendering lives elsewhere.
pub trait Game {
    type Event: Clone + fmt::Debug;

    fn kind(&self) -> ChallengeKind;

    fn phase(&self) -> Phase;

    /// Called once on mount; games with a clock arm their timers here.
    fn start(&mut self, _ctx: &mut Context<'_, Self::Event>) {}

    fn handle(&mut self, event: Self::Event, ctx: &mut Context<'_, Self::Event>);

    /// Score reported when the countdown runs out first.
    fn partial_score(&self) -> u32 {
        0
    }
}

/// Games that can lay out a fresh round from a seeded generator.
pub trait Spawn: Game + Sized {
    fn spawn(rng: &mut StdRng) -> Self;
}

#[derive(Clone, Debug)]
enum Signal<E> {
    Game(E),
    Report,
    TimeUp,
}

/// What a game may do while handling an event.
pub struct Context<'a, E> {
    now_ms: u64,
    timers: &'a mut Scheduler<Signal<E>>,
    rng: &'a mut StdRng,
    outcome: &'a mut Option<Outcome>,
}

impl<E: Clone> Context<'_, E> {
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn after(&mut self, delay_ms: u64, event: E) -> TimerId {
        self.timers.after(self.now_ms, delay_ms, Signal::Game(event))
    }

    pub fn every(&mut self, interval_ms: u64, event: E) -> TimerId {
        self.timers.every(self.now_ms, interval_ms, Signal::Game(event))
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.timers.cancel(id)
    }

    pub fn rng(&mut self) -> &mut StdRng {
        self.rng
    }

    /// Record the terminal verdict. Only the first call counts.
    pub fn finish(&mut self, success: bool, score: u32) {
        if self.outcome.is_none() {
            *self.outcome = Some(Outcome {
                success,
                score: score.min(100_000),
            });
        }
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }
}

/// Mixed into the seed used for board generation so the layout and the
/// in-game generator do not share a stream.
const LAYOUT_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

pub struct Shell<G: Game> {
    game: G,
    config: ChallengeConfig,
    timers: Scheduler<Signal<G::Event>>,
    rng: StdRng,
    gate: CompletionGate,
    outcome: Option<Outcome>,
    mounted_at: Option<u64>,
    unmounted: bool,
}

impl<G: Game> Shell<G> {
    pub fn new(game: G, config: ChallengeConfig, seed: u64, gate: CompletionGate) -> Self {
        Shell {
            game,
            config,
            timers: Scheduler::new(),
            rng: StdRng::seed_from_u64(seed),
            gate,
            outcome: None,
            mounted_at: None,
            unmounted: false,
        }
    }

    pub fn with_callback(
        game: G,
        config: ChallengeConfig,
        seed: u64,
        on_complete: impl FnOnce(ChallengeResult) + 'static,
    ) -> Self {
        Self::new(game, config, seed, CompletionGate::new(Box::new(on_complete)))
    }

    pub fn mount(&mut self, now_ms: u64) {
        if self.mounted_at.is_some() || self.unmounted {
            return;
        }
        self.mounted_at = Some(now_ms);
        if let Some(limit) = self.config.time_limit {
            self.timers
                .after(now_ms, u64::from(limit) * 1000, Signal::TimeUp);
        }
        log::debug!(
            "mounted {} ({}) at {now_ms}ms",
            self.game.kind(),
            self.config.challenge_id
        );
        self.run(now_ms, |game, ctx| game.start(ctx));
    }

    /// Deliver one input event. Returns `false` when the shell is not
    /// accepting input (not mounted, unmounted, or already decided).
    pub fn dispatch(&mut self, event: G::Event, now_ms: u64) -> bool {
        if !self.accepting() {
            return false;
        }
        self.run(now_ms, |game, ctx| game.handle(event, ctx));
        true
    }

    /// Drain every timer due at `now_ms`, in due order.
    pub fn tick(&mut self, now_ms: u64) {
        if self.mounted_at.is_none() || self.unmounted {
            return;
        }
        for _ in 0..MAX_TIMERS_PER_TICK {
            let Some((due, signal)) = self.timers.pop_due(now_ms) else {
                return;
            };
            match signal {
                Signal::Game(event) => {
                    if self.outcome.is_none() {
                        self.run(due, |game, ctx| game.handle(event, ctx));
                    }
                }
                Signal::Report => self.report(due),
                Signal::TimeUp => {
                    if self.outcome.is_none() {
                        log::info!("{} ran out of time", self.game.kind());
                        self.outcome = Some(Outcome {
                            success: false,
                            score: self.game.partial_score(),
                        });
                        self.timers.clear();
                        self.report(due);
                    }
                }
            }
        }
        log::warn!("{} timer queue did not drain in one tick", self.game.kind());
    }

    pub fn unmount(&mut self) {
        self.unmounted = true;
        self.timers.clear();
        self.gate.disarm();
    }

    fn accepting(&self) -> bool {
        self.mounted_at.is_some() && !self.unmounted && self.outcome.is_none()
    }

    fn run(&mut self, now_ms: u64, f: impl FnOnce(&mut G, &mut Context<'_, G::Event>)) {
        let mut outcome = None;
        {
            let mut ctx = Context {
                now_ms,
                timers: &mut self.timers,
                rng: &mut self.rng,
                outcome: &mut outcome,
            };
            f(&mut self.game, &mut ctx);
        }
        if let Some(outcome) = outcome {
            self.outcome = Some(outcome);
            self.timers.clear();
            self.timers.after(now_ms, FEEDBACK_DELAY_MS, Signal::Report);
        }
    }

    fn report(&mut self, at_ms: u64) {
        let Some(outcome) = self.outcome else {
            return;
        };
        let result = ChallengeResult {
            success: outcome.success,
            time_spent: self.elapsed_secs(at_ms),
            score: outcome.score,
        };
        if self.gate.fire(result) {
            log::info!(
                "{} complete: success={} score={} time={}s",
                self.game.kind(),
                result.success,
                result.score,
                result.time_spent
            );
        }
    }

    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        self.mounted_at
            .map(|t| now_ms.saturating_sub(t))
            .unwrap_or(0)
    }

    pub fn elapsed_secs(&self, now_ms: u64) -> u32 {
        ((self.elapsed_ms(now_ms) + 500) / 1000) as u32
    }

    /// Seconds left on the countdown, rounded up; `None` without a limit.
    pub fn remaining_secs(&self, now_ms: u64) -> Option<u32> {
        let limit_ms = u64::from(self.config.time_limit?) * 1000;
        let left = limit_ms.saturating_sub(self.elapsed_ms(now_ms));
        Some(left.div_ceil(1000) as u32)
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn config(&self) -> &ChallengeConfig {
        &self.config
    }

    pub fn title(&self) -> &'static str {
        self.game.kind().title()
    }

    pub fn description(&self) -> &'static str {
        self.game.kind().description()
    }

    pub fn phase(&self) -> Phase {
        if self.outcome.is_some() {
            Phase::Result
        } else {
            self.game.phase()
        }
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// The reported result, once the feedback delay has passed.
    pub fn result(&self) -> Option<ChallengeResult> {
        self.gate.result()
    }

    pub fn next_due(&self) -> Option<u64> {
        self.timers.next_due()
    }
}

impl<G: Game> Shell<G> {
    /// Build the game with a layout generator derived from `seed`.
    pub fn spawn_with(
        config: ChallengeConfig,
        seed: u64,
        gate: CompletionGate,
        build: impl FnOnce(&mut StdRng) -> G,
    ) -> Self {
        let mut layout = StdRng::seed_from_u64(seed ^ LAYOUT_SALT);
        Shell::new(build(&mut layout), config, seed, gate)
    }
}

impl<G: Spawn> Shell<G> {
    /// Generate a fresh game from `seed` and wrap it.
    pub fn spawn(config: ChallengeConfig, seed: u64, gate: CompletionGate) -> Self {
        Self::spawn_with(config, seed, gate, G::spawn)
    }
}
