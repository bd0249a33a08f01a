//! Pixel memory: memorize a lit pattern, then reproduce it from memory.

use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::index;
use serde::{Deserialize, Serialize};

use crate::contract::percent;
use crate::kind::ChallengeKind;
use crate::phase::Phase;
use crate::shell::{Context, Game, Spawn};

pub const SIDE: usize = 5;
pub const CELLS: usize = SIDE * SIDE;
pub const LIT: usize = 8;
pub const MEMORIZE_MS: u64 = 3000;
pub const PASS_PERCENT: u32 = 80;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern(#[serde(with = "cells")] [bool; CELLS]);

mod cells {
    use super::CELLS;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(v: &[bool; CELLS], s: S) -> Result<S::Ok, S::Error> {
        s.collect_seq(v.iter())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[bool; CELLS], D::Error> {
        let v = Vec::<bool>::deserialize(d)?;
        let len = v.len();
        v.try_into()
            .map_err(|_| D::Error::invalid_length(len, &"25 cells"))
    }
}

impl Pattern {
    pub fn blank() -> Self {
        Pattern([false; CELLS])
    }

    pub fn random(rng: &mut impl Rng, lit: usize) -> Self {
        let mut cells = [false; CELLS];
        for i in index::sample(rng, CELLS, lit.min(CELLS)) {
            cells[i] = true;
        }
        Pattern(cells)
    }

    pub fn get(&self, row: usize, col: usize) -> bool {
        row < SIDE && col < SIDE && self.0[row * SIDE + col]
    }

    pub fn toggle(&mut self, row: usize, col: usize) {
        if row < SIDE && col < SIDE {
            self.0[row * SIDE + col] ^= true;
        }
    }

    pub fn lit(&self) -> usize {
        self.0.iter().filter(|&&c| c).count()
    }

    /// Share of cells (lit or not) on which both patterns agree.
    pub fn accuracy(&self, other: &Pattern) -> u32 {
        let same = self.0.iter().zip(other.0.iter()).filter(|(a, b)| a == b).count();
        percent(same, CELLS)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PixelEvent {
    Hide,
    Toggle { row: usize, col: usize },
    Submit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelState {
    Memorize,
    Recall,
    Checked { accuracy: u32 },
}

#[derive(Clone, Debug)]
pub struct PixelMemory {
    target: Pattern,
    guess: Pattern,
    state: PixelState,
}

impl PixelMemory {
    pub fn new(target: Pattern) -> Self {
        PixelMemory {
            target,
            guess: Pattern::blank(),
            state: PixelState::Memorize,
        }
    }

    pub fn target(&self) -> &Pattern {
        &self.target
    }

    pub fn guess(&self) -> &Pattern {
        &self.guess
    }

    pub fn state(&self) -> PixelState {
        self.state
    }

    /// The pattern the player should currently see.
    pub fn visible(&self) -> &Pattern {
        match self.state {
            PixelState::Memorize => &self.target,
            _ => &self.guess,
        }
    }
}

impl Spawn for PixelMemory {
    fn spawn(rng: &mut StdRng) -> Self {
        Self::new(Pattern::random(rng, LIT))
    }
}

impl Game for PixelMemory {
    type Event = PixelEvent;

    fn kind(&self) -> ChallengeKind {
        ChallengeKind::PixelMemory
    }

    fn phase(&self) -> Phase {
        match self.state {
            PixelState::Memorize => Phase::Idle,
            PixelState::Recall => Phase::Interacting,
            PixelState::Checked { .. } => Phase::Result,
        }
    }

    fn start(&mut self, ctx: &mut Context<'_, PixelEvent>) {
        ctx.after(MEMORIZE_MS, PixelEvent::Hide);
    }

    fn handle(&mut self, event: PixelEvent, ctx: &mut Context<'_, PixelEvent>) {
        match (self.state, event) {
            (PixelState::Memorize, PixelEvent::Hide) => self.state = PixelState::Recall,
            (PixelState::Recall, PixelEvent::Toggle { row, col }) => self.guess.toggle(row, col),
            (PixelState::Recall, PixelEvent::Submit) => {
                let accuracy = self.target.accuracy(&self.guess);
                self.state = PixelState::Checked { accuracy };
                ctx.finish(accuracy >= PASS_PERCENT, accuracy);
            }
            _ => {}
        }
    }

    fn partial_score(&self) -> u32 {
        match self.state {
            PixelState::Memorize => 0,
            _ => self.target.accuracy(&self.guess),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn random_pattern_lights_exactly_n_cells() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(Pattern::random(&mut rng, LIT).lit(), LIT);
    }

    #[test]
    fn accuracy_counts_dark_cells_too() {
        let mut target = Pattern::blank();
        target.toggle(0, 0);
        let guess = Pattern::blank();
        // 24 of 25 agree.
        assert_eq!(target.accuracy(&guess), 96);
        assert_eq!(target.accuracy(&target), 100);
    }

    #[test]
    fn toggle_outside_grid_is_ignored() {
        let mut p = Pattern::blank();
        p.toggle(SIDE, 0);
        p.toggle(0, 9);
        assert_eq!(p, Pattern::blank());
    }
}
