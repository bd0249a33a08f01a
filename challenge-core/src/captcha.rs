//! Image-grid CAPTCHA simulation.

use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::{Deserialize, Serialize};

use crate::constants::ROUND_ADVANCE_MS;
use crate::kind::ChallengeKind;
use crate::phase::Phase;
use crate::shell::{Context, Game, Spawn};

pub const TILES: usize = 9;
pub const MAX_ROUNDS: u32 = 3;

struct Theme {
    prompt: &'static str,
    target: &'static str,
    decoys: &'static [&'static str],
}

static THEMES: [Theme; 4] = [
    Theme {
        prompt: "Select all tiles with a traffic light",
        target: "🚦",
        decoys: &["🚗", "🌳", "🏠", "🚲", "🐕"],
    },
    Theme {
        prompt: "Select all tiles with a bicycle",
        target: "🚲",
        decoys: &["🚌", "🚦", "🌳", "🛴", "🏢"],
    },
    Theme {
        prompt: "Select all tiles with a bus",
        target: "🚌",
        decoys: &["🚕", "🚲", "🚦", "🌲", "🚧"],
    },
    Theme {
        prompt: "Select all tiles with a fire hydrant",
        target: "🧯",
        decoys: &["🚒", "🚗", "🌳", "🚦", "🏪"],
    },
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub label: String,
    pub is_target: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptchaGrid {
    pub prompt: String,
    pub tiles: Vec<Tile>,
}

impl CaptchaGrid {
    /// Three to four target tiles scattered among decoys.
    pub fn generate(rng: &mut impl Rng) -> Self {
        let theme = &THEMES[rng.random_range(0..THEMES.len())];
        let targets = rng.random_range(3..=4);
        let mut tiles: Vec<Tile> = (0..TILES)
            .map(|i| Tile {
                label: if i < targets {
                    theme.target.to_string()
                } else {
                    theme
                        .decoys
                        .choose(rng)
                        .copied()
                        .unwrap_or("⬜")
                        .to_string()
                },
                is_target: i < targets,
            })
            .collect();
        tiles.shuffle(rng);
        CaptchaGrid {
            prompt: theme.prompt.to_string(),
            tiles,
        }
    }

    pub fn matches(&self, selected: &[bool]) -> bool {
        self.tiles.len() == selected.len()
            && self
                .tiles
                .iter()
                .zip(selected)
                .all(|(t, &s)| t.is_target == s)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CaptchaEvent {
    Toggle(usize),
    Verify,
    NextRound,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CaptchaState {
    Selecting { selected: Vec<bool> },
    Rejected,
    Accepted,
}

#[derive(Clone, Debug)]
pub struct Captcha {
    grid: CaptchaGrid,
    state: CaptchaState,
    failures: u32,
}

impl Captcha {
    pub fn new(grid: CaptchaGrid) -> Self {
        let n = grid.tiles.len();
        Captcha {
            grid,
            state: CaptchaState::Selecting {
                selected: vec![false; n],
            },
            failures: 0,
        }
    }

    pub fn grid(&self) -> &CaptchaGrid {
        &self.grid
    }

    pub fn state(&self) -> &CaptchaState {
        &self.state
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }
}

impl Spawn for Captcha {
    fn spawn(rng: &mut StdRng) -> Self {
        Self::new(CaptchaGrid::generate(rng))
    }
}

impl Game for Captcha {
    type Event = CaptchaEvent;

    fn kind(&self) -> ChallengeKind {
        ChallengeKind::Captcha
    }

    fn phase(&self) -> Phase {
        match &self.state {
            CaptchaState::Selecting { selected } if selected.iter().any(|s| *s) => {
                Phase::Interacting
            }
            CaptchaState::Selecting { .. } => Phase::Idle,
            CaptchaState::Rejected => Phase::Submitted,
            CaptchaState::Accepted => Phase::Result,
        }
    }

    fn handle(&mut self, event: CaptchaEvent, ctx: &mut Context<'_, CaptchaEvent>) {
        match event {
            CaptchaEvent::Toggle(i) => {
                if let CaptchaState::Selecting { selected } = &mut self.state
                    && let Some(s) = selected.get_mut(i)
                {
                    *s = !*s;
                }
            }
            CaptchaEvent::Verify => {
                let CaptchaState::Selecting { selected } = &self.state else {
                    return;
                };
                if self.grid.matches(selected) {
                    self.state = CaptchaState::Accepted;
                    ctx.finish(true, 100 - 25 * self.failures);
                    return;
                }
                self.failures += 1;
                self.state = CaptchaState::Rejected;
                if self.failures >= MAX_ROUNDS {
                    ctx.finish(false, 0);
                } else {
                    ctx.after(ROUND_ADVANCE_MS, CaptchaEvent::NextRound);
                }
            }
            CaptchaEvent::NextRound => {
                if self.state == CaptchaState::Rejected {
                    let failures = self.failures;
                    *self = Captcha::new(CaptchaGrid::generate(ctx.rng()));
                    self.failures = failures;
                }
            }
        }
    }
}
