//! Memory match: flip two cards at a time and find every pair.

use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::{Deserialize, Serialize};

use crate::contract::percent;
use crate::kind::ChallengeKind;
use crate::phase::Phase;
use crate::shell::{Context, Game, Spawn};

pub const PAIRS: usize = 6;
pub const COLS: usize = 4;
/// How long a mismatched pair stays face up.
pub const MISMATCH_MS: u64 = 800;
/// Score lost per move beyond the perfect `PAIRS` moves.
pub const MOVE_PENALTY: u32 = 5;
pub const MIN_SCORE: u32 = 30;

static FACES: [&str; 10] = ["🍎", "🐶", "🚀", "🎈", "🌵", "🐙", "🎲", "🍩", "⚽", "🦋"];

/// Star rating for a finished board: three for at most four wasted moves,
/// two for up to twice the pair count plus two, one otherwise.
pub fn rating(moves: u32, pairs: usize) -> u8 {
    let pairs = pairs as u32;
    if moves <= pairs + 4 {
        3
    } else if moves <= pairs * 2 + 2 {
        2
    } else {
        1
    }
}

pub fn score_for_moves(moves: u32, pairs: usize) -> u32 {
    let wasted = moves.saturating_sub(pairs as u32);
    100u32
        .saturating_sub(wasted.saturating_mul(MOVE_PENALTY))
        .max(MIN_SCORE)
}

/// Face labels for `pairs` pairs, each appearing twice, shuffled.
pub fn deal(rng: &mut impl Rng, pairs: usize) -> Vec<&'static str> {
    let mut cards: Vec<&'static str> = FACES
        .choose_multiple(rng, pairs.min(FACES.len()))
        .flat_map(|&f| [f, f])
        .collect();
    cards.shuffle(rng);
    cards
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum MatchEvent {
    Flip(usize),
    /// Scheduled after a mismatch to turn both cards back over.
    Hide,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchState {
    Open { first: Option<usize> },
    Mismatch { a: usize, b: usize },
    Done,
}

#[derive(Clone, Debug)]
pub struct MemoryMatch {
    cards: Vec<&'static str>,
    matched: Vec<bool>,
    moves: u32,
    state: MatchState,
}

impl MemoryMatch {
    pub fn new(cards: Vec<&'static str>) -> Self {
        let n = cards.len();
        MemoryMatch {
            cards,
            matched: vec![false; n],
            moves: 0,
            state: MatchState::Open { first: None },
        }
    }

    pub fn cards(&self) -> &[&'static str] {
        &self.cards
    }

    pub fn pairs(&self) -> usize {
        self.cards.len() / 2
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn state(&self) -> MatchState {
        self.state
    }

    pub fn is_matched(&self, i: usize) -> bool {
        self.matched.get(i).copied().unwrap_or(false)
    }

    pub fn matched_pairs(&self) -> usize {
        self.matched.iter().filter(|m| **m).count() / 2
    }

    pub fn is_face_up(&self, i: usize) -> bool {
        self.is_matched(i)
            || match self.state {
                MatchState::Open { first } => first == Some(i),
                MatchState::Mismatch { a, b } => a == i || b == i,
                MatchState::Done => true,
            }
    }
}

impl Spawn for MemoryMatch {
    fn spawn(rng: &mut StdRng) -> Self {
        Self::new(deal(rng, PAIRS))
    }
}

impl Game for MemoryMatch {
    type Event = MatchEvent;

    fn kind(&self) -> ChallengeKind {
        ChallengeKind::MemoryMatch
    }

    fn phase(&self) -> Phase {
        match self.state {
            MatchState::Open { first: None } if self.moves == 0 => Phase::Idle,
            MatchState::Open { .. } => Phase::Interacting,
            MatchState::Mismatch { .. } => Phase::Submitted,
            MatchState::Done => Phase::Result,
        }
    }

    fn start(&mut self, ctx: &mut Context<'_, MatchEvent>) {
        if self.cards.is_empty() {
            self.state = MatchState::Done;
            ctx.finish(false, 0);
        }
    }

    fn handle(&mut self, event: MatchEvent, ctx: &mut Context<'_, MatchEvent>) {
        match (self.state, event) {
            (MatchState::Open { first }, MatchEvent::Flip(i)) => {
                if i >= self.cards.len() || self.matched[i] {
                    return;
                }
                let Some(a) = first else {
                    self.state = MatchState::Open { first: Some(i) };
                    return;
                };
                if a == i {
                    return;
                }
                self.moves += 1;
                if self.cards[a] != self.cards[i] {
                    self.state = MatchState::Mismatch { a, b: i };
                    ctx.after(MISMATCH_MS, MatchEvent::Hide);
                    return;
                }
                self.matched[a] = true;
                self.matched[i] = true;
                if self.matched.iter().all(|m| *m) {
                    self.state = MatchState::Done;
                    let pairs = self.pairs();
                    log::debug!(
                        "memory board cleared in {} moves ({} stars)",
                        self.moves,
                        rating(self.moves, pairs)
                    );
                    ctx.finish(true, score_for_moves(self.moves, pairs));
                } else {
                    self.state = MatchState::Open { first: None };
                }
            }
            (MatchState::Mismatch { .. }, MatchEvent::Hide) => {
                self.state = MatchState::Open { first: None };
            }
            _ => {}
        }
    }

    fn partial_score(&self) -> u32 {
        percent(self.matched_pairs(), self.pairs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn deal_places_every_face_twice() {
        let mut rng = StdRng::seed_from_u64(8);
        let cards = deal(&mut rng, PAIRS);
        assert_eq!(cards.len(), PAIRS * 2);
        for face in &cards {
            assert_eq!(cards.iter().filter(|c| *c == face).count(), 2);
        }
    }

    #[test]
    fn score_and_rating_fall_with_moves() {
        assert_eq!(score_for_moves(6, 6), 100);
        assert_eq!(score_for_moves(10, 6), 80);
        assert_eq!(score_for_moves(60, 6), MIN_SCORE);
        assert_eq!(rating(10, 6), 3);
        assert_eq!(rating(14, 6), 2);
        assert_eq!(rating(15, 6), 1);
    }

    #[test]
    fn face_up_cards_follow_the_state() {
        let mut game = MemoryMatch::new(vec!["a", "b", "a", "b"]);
        game.state = MatchState::Mismatch { a: 0, b: 1 };
        assert!(game.is_face_up(0) && game.is_face_up(1));
        assert!(!game.is_face_up(2));
        game.matched[2] = true;
        assert!(game.is_face_up(2));
    }
}
