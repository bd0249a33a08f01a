//! Simon says: watch a growing color sequence, then repeat it.

use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::constants::ROUND_ADVANCE_MS;
use crate::kind::ChallengeKind;
use crate::palette::color_name;
use crate::phase::Phase;
use crate::shell::{Context, Game, Spawn};

pub const PADS: usize = 4;
pub const WIN_ROUNDS: usize = 5;
pub const FLASH_MS: u64 = 500;
pub const GAP_MS: u64 = 250;
pub const POINTS_PER_ROUND: u32 = 20;
/// Palette slots for the pads: red, gold, green, blue.
pub const PAD_COLORS: [usize; PADS] = [0, 2, 3, 5];

pub fn pad_color(pad: usize) -> usize {
    PAD_COLORS[pad % PADS]
}

pub fn pad_name(pad: usize) -> &'static str {
    color_name(pad_color(pad))
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SimonEvent {
    Light(usize),
    Dark,
    Listen,
    Press(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimonState {
    Playback { lit: Option<usize> },
    Listening { pos: usize },
    Failed,
    Won,
}

#[derive(Clone, Debug)]
pub struct SimonSays {
    /// Full sequence; round `n` (0-based) plays the first `n + 1` pads.
    sequence: Vec<usize>,
    completed: usize,
    state: SimonState,
}

impl SimonSays {
    pub fn new(sequence: Vec<usize>) -> Self {
        SimonSays {
            sequence,
            completed: 0,
            state: SimonState::Playback { lit: None },
        }
    }

    pub fn rounds(&self) -> usize {
        self.sequence.len().min(WIN_ROUNDS)
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn state(&self) -> SimonState {
        self.state
    }

    /// Pad currently highlighted during playback.
    pub fn lit(&self) -> Option<usize> {
        match self.state {
            SimonState::Playback { lit } => lit,
            _ => None,
        }
    }

    fn current(&self) -> &[usize] {
        &self.sequence[..(self.completed + 1).min(self.sequence.len())]
    }

    fn play(&mut self, ctx: &mut Context<'_, SimonEvent>, lead_ms: u64) {
        self.state = SimonState::Playback { lit: None };
        let mut at = lead_ms;
        for &pad in self.current() {
            ctx.after(at, SimonEvent::Light(pad));
            ctx.after(at + FLASH_MS, SimonEvent::Dark);
            at += FLASH_MS + GAP_MS;
        }
        ctx.after(at, SimonEvent::Listen);
    }
}

impl Spawn for SimonSays {
    fn spawn(rng: &mut StdRng) -> Self {
        Self::new((0..WIN_ROUNDS).map(|_| rng.random_range(0..PADS)).collect())
    }
}

impl Game for SimonSays {
    type Event = SimonEvent;

    fn kind(&self) -> ChallengeKind {
        ChallengeKind::SimonSays
    }

    fn phase(&self) -> Phase {
        match self.state {
            SimonState::Playback { .. } => Phase::Idle,
            SimonState::Listening { .. } => Phase::Interacting,
            SimonState::Failed | SimonState::Won => Phase::Result,
        }
    }

    fn start(&mut self, ctx: &mut Context<'_, SimonEvent>) {
        if self.sequence.is_empty() {
            self.state = SimonState::Won;
            ctx.finish(true, 0);
            return;
        }
        self.play(ctx, GAP_MS);
    }

    fn handle(&mut self, event: SimonEvent, ctx: &mut Context<'_, SimonEvent>) {
        match (self.state, event) {
            (SimonState::Playback { .. }, SimonEvent::Light(pad)) => {
                self.state = SimonState::Playback { lit: Some(pad) };
            }
            (SimonState::Playback { .. }, SimonEvent::Dark) => {
                self.state = SimonState::Playback { lit: None };
            }
            (SimonState::Playback { .. }, SimonEvent::Listen) => {
                self.state = SimonState::Listening { pos: 0 };
            }
            (SimonState::Listening { pos }, SimonEvent::Press(pad)) if pad < PADS => {
                if self.current()[pos] != pad {
                    self.state = SimonState::Failed;
                    ctx.finish(false, self.partial_score());
                    return;
                }
                let pos = pos + 1;
                if pos < self.current().len() {
                    self.state = SimonState::Listening { pos };
                    return;
                }
                self.completed += 1;
                if self.completed >= self.rounds() {
                    self.state = SimonState::Won;
                    ctx.finish(true, self.partial_score());
                } else {
                    self.play(ctx, ROUND_ADVANCE_MS);
                }
            }
            _ => {}
        }
    }

    fn partial_score(&self) -> u32 {
        self.completed as u32 * POINTS_PER_ROUND
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn spawned_sequence_uses_valid_pads() {
        let mut rng = StdRng::seed_from_u64(4);
        let game = SimonSays::spawn(&mut rng);
        assert_eq!(game.rounds(), WIN_ROUNDS);
        assert!(game.sequence.iter().all(|&p| p < PADS));
        assert_eq!(game.current().len(), 1);
    }

    #[test]
    fn pads_are_named_after_their_colors() {
        let names: Vec<&str> = (0..PADS).map(pad_name).collect();
        assert_eq!(names, ["red", "gold", "green", "blue"]);
        assert_eq!(pad_color(PADS), pad_color(0));
    }
}
