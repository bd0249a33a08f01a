//! Flag matching: pair each drawn flag with its country name.

use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::{Deserialize, Serialize};

use crate::contract::percent;
use crate::kind::ChallengeKind;
use crate::phase::Phase;
use crate::shell::{Context, Game, Spawn};

pub const PAIRS: usize = 4;
pub const PASS_RATIO: f64 = 0.75;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stripes {
    Horizontal,
    Vertical,
}

/// A flag simple enough to draw as equal stripes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Flag {
    pub country: &'static str,
    pub stripes: Stripes,
    pub colors: &'static [[u8; 3]],
}

const RED: [u8; 3] = [0xce, 0x11, 0x26];
const WHITE: [u8; 3] = [0xff, 0xff, 0xff];
const BLUE: [u8; 3] = [0x00, 0x23, 0x95];
const GREEN: [u8; 3] = [0x00, 0x92, 0x46];
const BLACK: [u8; 3] = [0x00, 0x00, 0x00];
const GOLD: [u8; 3] = [0xff, 0xce, 0x00];
const ORANGE: [u8; 3] = [0xff, 0x88, 0x3e];

pub static FLAGS: [Flag; 10] = [
    Flag { country: "France", stripes: Stripes::Vertical, colors: &[BLUE, WHITE, RED] },
    Flag { country: "Italy", stripes: Stripes::Vertical, colors: &[GREEN, WHITE, RED] },
    Flag { country: "Ireland", stripes: Stripes::Vertical, colors: &[GREEN, WHITE, ORANGE] },
    Flag { country: "Belgium", stripes: Stripes::Vertical, colors: &[BLACK, GOLD, RED] },
    Flag { country: "Germany", stripes: Stripes::Horizontal, colors: &[BLACK, RED, GOLD] },
    Flag { country: "Netherlands", stripes: Stripes::Horizontal, colors: &[RED, WHITE, BLUE] },
    Flag { country: "Russia", stripes: Stripes::Horizontal, colors: &[WHITE, BLUE, RED] },
    Flag { country: "Austria", stripes: Stripes::Horizontal, colors: &[RED, WHITE, RED] },
    Flag { country: "Poland", stripes: Stripes::Horizontal, colors: &[WHITE, RED] },
    Flag { country: "Ukraine", stripes: Stripes::Horizontal, colors: &[BLUE, GOLD] },
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FlagEvent {
    SelectFlag(usize),
    SelectName(usize),
    Submit,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FlagState {
    Pairing { selected: Option<usize> },
    Checked { correct: usize },
}

#[derive(Clone, Debug)]
pub struct FlagMatch {
    flags: Vec<Flag>,
    /// Country names in display order; a permutation of the flags' countries.
    names: Vec<&'static str>,
    /// `pairs[flag] = Some(name index)`.
    pairs: Vec<Option<usize>>,
    state: FlagState,
}

impl FlagMatch {
    pub fn new(flags: Vec<Flag>, rng: &mut impl Rng) -> Self {
        let mut names: Vec<&'static str> = flags.iter().map(|f| f.country).collect();
        names.shuffle(rng);
        let pairs = vec![None; flags.len()];
        FlagMatch {
            flags,
            names,
            pairs,
            state: FlagState::Pairing { selected: None },
        }
    }

    pub fn flags(&self) -> &[Flag] {
        &self.flags
    }

    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    pub fn pair_of(&self, flag: usize) -> Option<usize> {
        self.pairs.get(flag).copied().flatten()
    }

    pub fn selected(&self) -> Option<usize> {
        match self.state {
            FlagState::Pairing { selected } => selected,
            FlagState::Checked { .. } => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.pairs.iter().all(Option::is_some)
    }

    pub fn correct_pairs(&self) -> usize {
        self.pairs
            .iter()
            .zip(&self.flags)
            .filter(|(p, f)| p.and_then(|n| self.names.get(n)) == Some(&f.country))
            .count()
    }

    pub fn state(&self) -> &FlagState {
        &self.state
    }
}

impl Spawn for FlagMatch {
    fn spawn(rng: &mut StdRng) -> Self {
        let flags = FLAGS.choose_multiple(rng, PAIRS).copied().collect();
        Self::new(flags, rng)
    }
}

impl Game for FlagMatch {
    type Event = FlagEvent;

    fn kind(&self) -> ChallengeKind {
        ChallengeKind::FlagMatch
    }

    fn phase(&self) -> Phase {
        match self.state {
            FlagState::Pairing { .. } if self.pairs.iter().all(Option::is_none) => Phase::Idle,
            FlagState::Pairing { .. } => Phase::Interacting,
            FlagState::Checked { .. } => Phase::Result,
        }
    }

    fn handle(&mut self, event: FlagEvent, ctx: &mut Context<'_, FlagEvent>) {
        let FlagState::Pairing { selected } = self.state else {
            return;
        };
        match event {
            FlagEvent::SelectFlag(i) if i < self.flags.len() => {
                let selected = if selected == Some(i) { None } else { Some(i) };
                self.state = FlagState::Pairing { selected };
            }
            FlagEvent::SelectName(n) if n < self.names.len() => {
                let Some(flag) = selected else {
                    return;
                };
                // A name belongs to at most one flag.
                for p in self.pairs.iter_mut() {
                    if *p == Some(n) {
                        *p = None;
                    }
                }
                self.pairs[flag] = Some(n);
                self.state = FlagState::Pairing { selected: None };
            }
            FlagEvent::Submit if self.is_complete() => {
                let correct = self.correct_pairs();
                self.state = FlagState::Checked { correct };
                let ratio = correct as f64 / self.flags.len().max(1) as f64;
                ctx.finish(ratio >= PASS_RATIO, percent(correct, self.flags.len()));
            }
            _ => {}
        }
    }

    fn partial_score(&self) -> u32 {
        percent(self.correct_pairs(), self.flags.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn bank_countries_are_unique() {
        for (i, a) in FLAGS.iter().enumerate() {
            assert!(FLAGS[i + 1..].iter().all(|b| b.country != a.country));
            assert!(a.colors.len() >= 2);
        }
    }

    #[test]
    fn names_are_a_permutation_of_the_flags() {
        let mut rng = StdRng::seed_from_u64(9);
        let game = FlagMatch::spawn(&mut rng);
        let mut countries: Vec<_> = game.flags().iter().map(|f| f.country).collect();
        let mut names = game.names().to_vec();
        countries.sort();
        names.sort();
        assert_eq!(countries, names);
    }
}
