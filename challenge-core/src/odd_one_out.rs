//! Odd one out: spot the item that does not belong with the other three.

use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::{Deserialize, Serialize};

use crate::constants::ROUND_ADVANCE_MS;
use crate::contract::percent;
use crate::kind::ChallengeKind;
use crate::phase::Phase;
use crate::shell::{Context, Game, Spawn};

pub const ROUNDS: usize = 3;
pub const ITEMS: usize = 4;
pub const PASS_CORRECT: usize = 2;

struct Category {
    name: &'static str,
    members: &'static [&'static str],
}

static CATEGORIES: [Category; 6] = [
    Category { name: "fruit", members: &["apple", "banana", "cherry", "grape", "mango", "pear"] },
    Category { name: "animal", members: &["tiger", "horse", "rabbit", "eagle", "shark", "otter"] },
    Category { name: "vehicle", members: &["bus", "tram", "bicycle", "truck", "ferry", "scooter"] },
    Category { name: "instrument", members: &["violin", "drum", "flute", "piano", "trumpet", "harp"] },
    Category { name: "color", members: &["crimson", "teal", "amber", "indigo", "ivory", "olive"] },
    Category { name: "planet", members: &["Mercury", "Venus", "Mars", "Jupiter", "Saturn", "Neptune"] },
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Round {
    pub theme: &'static str,
    pub items: Vec<&'static str>,
    pub outlier: usize,
}

impl Round {
    pub fn generate(rng: &mut impl Rng) -> Self {
        let picked: Vec<&Category> = CATEGORIES.choose_multiple(rng, 2).collect();
        let (home, away) = (picked[0], picked[1]);
        let mut items: Vec<&'static str> =
            home.members.choose_multiple(rng, ITEMS - 1).copied().collect();
        let odd = away.members.choose(rng).copied().unwrap_or("?");
        items.push(odd);
        items.shuffle(rng);
        let outlier = items.iter().position(|&i| i == odd).unwrap_or(ITEMS - 1);
        Round {
            theme: home.name,
            items,
            outlier,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum OddEvent {
    Pick(usize),
    Advance,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OddState {
    Choosing,
    Revealed { picked: usize, correct: bool },
    Done,
}

#[derive(Clone, Debug)]
pub struct OddOneOut {
    rounds: Vec<Round>,
    index: usize,
    correct: usize,
    state: OddState,
}

impl OddOneOut {
    pub fn new(rounds: Vec<Round>) -> Self {
        OddOneOut {
            rounds,
            index: 0,
            correct: 0,
            state: OddState::Choosing,
        }
    }

    pub fn current(&self) -> Option<&Round> {
        self.rounds.get(self.index)
    }

    pub fn round(&self) -> usize {
        self.index
    }

    pub fn correct(&self) -> usize {
        self.correct
    }

    pub fn state(&self) -> OddState {
        self.state
    }
}

impl Spawn for OddOneOut {
    fn spawn(rng: &mut StdRng) -> Self {
        Self::new((0..ROUNDS).map(|_| Round::generate(rng)).collect())
    }
}

impl Game for OddOneOut {
    type Event = OddEvent;

    fn kind(&self) -> ChallengeKind {
        ChallengeKind::OddOneOut
    }

    fn phase(&self) -> Phase {
        match self.state {
            OddState::Choosing if self.index == 0 => Phase::Idle,
            OddState::Choosing => Phase::Interacting,
            OddState::Revealed { .. } => Phase::Submitted,
            OddState::Done => Phase::Result,
        }
    }

    fn handle(&mut self, event: OddEvent, ctx: &mut Context<'_, OddEvent>) {
        match (self.state, event) {
            (OddState::Choosing, OddEvent::Pick(picked)) => {
                let Some(round) = self.current() else {
                    return;
                };
                if picked >= round.items.len() {
                    return;
                }
                let correct = picked == round.outlier;
                if correct {
                    self.correct += 1;
                }
                self.state = OddState::Revealed { picked, correct };
                ctx.after(ROUND_ADVANCE_MS, OddEvent::Advance);
            }
            (OddState::Revealed { .. }, OddEvent::Advance) => {
                self.index += 1;
                if self.index < self.rounds.len() {
                    self.state = OddState::Choosing;
                } else {
                    self.state = OddState::Done;
                    ctx.finish(self.correct >= PASS_CORRECT, self.partial_score());
                }
            }
            _ => {}
        }
    }

    fn partial_score(&self) -> u32 {
        percent(self.correct, self.rounds.len())
    }
}
