//! 3x3 sliding tile puzzle: generation, solvability and move rules.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::{ChallengeError, Result};
use crate::kind::ChallengeKind;
use crate::phase::Phase;
use crate::shell::{Context, Game, Spawn};

pub const SIZE: usize = 3;
pub const BLANK: u8 = 0;
/// Tiles 1..=8 in row-major order with the blank last.
pub const GOAL: [u8; SIZE * SIZE] = [1, 2, 3, 4, 5, 6, 7, 8, BLANK];
/// Moves allowed before the score starts dropping.
pub const PAR_MOVES: u32 = 30;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct Tiles([u8; SIZE * SIZE]);

impl TryFrom<Vec<u8>> for Tiles {
    type Error = ChallengeError;

    fn try_from(v: Vec<u8>) -> Result<Self> {
        Tiles::new(&v)
    }
}

impl From<Tiles> for Vec<u8> {
    fn from(t: Tiles) -> Self {
        t.0.to_vec()
    }
}

/// Number of tile pairs out of relative order, ignoring the blank.
pub fn inversion_count(cells: &[u8]) -> usize {
    let tiles: Vec<u8> = cells.iter().copied().filter(|&v| v != BLANK).collect();
    let mut count = 0;
    for i in 0..tiles.len() {
        for j in (i + 1)..tiles.len() {
            if tiles[i] > tiles[j] {
                count += 1;
            }
        }
    }
    count
}

/// On an odd-width board a layout is reachable from the goal iff its
/// inversion count is even.
pub fn is_solvable(cells: &[u8]) -> bool {
    inversion_count(cells) % 2 == 0
}

impl Tiles {
    pub fn new(cells: &[u8]) -> Result<Self> {
        let mut seen = [false; SIZE * SIZE];
        if cells.len() != SIZE * SIZE {
            return Err(ChallengeError::InvalidTiles(cells.to_vec()));
        }
        for &v in cells {
            let slot = seen
                .get_mut(v as usize)
                .ok_or_else(|| ChallengeError::InvalidTiles(cells.to_vec()))?;
            if *slot {
                return Err(ChallengeError::InvalidTiles(cells.to_vec()));
            }
            *slot = true;
        }
        let mut out = [0u8; SIZE * SIZE];
        out.copy_from_slice(cells);
        Ok(Tiles(out))
    }

    pub fn goal() -> Self {
        Tiles(GOAL)
    }

    /// Random solvable arrangement that is not already solved.
    pub fn generate(rng: &mut impl Rng) -> Self {
        loop {
            let mut cells = GOAL;
            cells.shuffle(rng);
            if !is_solvable(&cells) {
                // Swapping two numbered tiles flips the inversion parity.
                let numbered: Vec<usize> = (0..cells.len()).filter(|&i| cells[i] != BLANK).collect();
                cells.swap(numbered[0], numbered[1]);
            }
            if cells != GOAL {
                log::debug!(
                    "sliding puzzle generated with {} inversions",
                    inversion_count(&cells)
                );
                return Tiles(cells);
            }
        }
    }

    pub fn cells(&self) -> &[u8; SIZE * SIZE] {
        &self.0
    }

    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.0[row * SIZE + col]
    }

    pub fn blank(&self) -> (usize, usize) {
        let idx = self.0.iter().position(|&v| v == BLANK).unwrap_or(0);
        (idx / SIZE, idx % SIZE)
    }

    pub fn inversions(&self) -> usize {
        inversion_count(&self.0)
    }

    pub fn is_solvable(&self) -> bool {
        is_solvable(&self.0)
    }

    /// Slide the tile at `(row, col)` into the blank. Accepted only when
    /// the tile is orthogonally adjacent to the blank; otherwise the grid
    /// is left untouched.
    pub fn try_move(&mut self, row: usize, col: usize) -> bool {
        if row >= SIZE || col >= SIZE {
            return false;
        }
        let (br, bc) = self.blank();
        if row.abs_diff(br) + col.abs_diff(bc) != 1 {
            return false;
        }
        self.0.swap(row * SIZE + col, br * SIZE + bc);
        true
    }

    /// Move by tile value instead of position.
    pub fn try_move_value(&mut self, value: u8) -> bool {
        match self.0.iter().position(|&v| v == value && v != BLANK) {
            Some(idx) => self.try_move(idx / SIZE, idx % SIZE),
            None => false,
        }
    }

    pub fn is_solved(&self) -> bool {
        self.0 == GOAL
    }
}

pub fn score_for_moves(moves: u32) -> u32 {
    100 - moves.saturating_sub(PAR_MOVES).min(90)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SlidingEvent {
    Click { row: usize, col: usize },
    /// Move the tile showing this number.
    Tile(u8),
}

#[derive(Clone, Debug)]
pub struct SlidingPuzzle {
    tiles: Tiles,
    moves: u32,
    solved: bool,
}

impl SlidingPuzzle {
    pub fn new(tiles: Tiles) -> Self {
        SlidingPuzzle {
            tiles,
            moves: 0,
            solved: false,
        }
    }

    pub fn random(rng: &mut impl Rng) -> Self {
        Self::new(Tiles::generate(rng))
    }

    pub fn tiles(&self) -> &Tiles {
        &self.tiles
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }
}

impl Game for SlidingPuzzle {
    type Event = SlidingEvent;

    fn kind(&self) -> ChallengeKind {
        ChallengeKind::SlidingPuzzle
    }

    fn phase(&self) -> Phase {
        if self.solved {
            Phase::Result
        } else if self.moves == 0 {
            Phase::Idle
        } else {
            Phase::Interacting
        }
    }

    fn handle(&mut self, event: SlidingEvent, ctx: &mut Context<'_, SlidingEvent>) {
        if self.solved {
            return;
        }
        let moved = match event {
            SlidingEvent::Click { row, col } => self.tiles.try_move(row, col),
            SlidingEvent::Tile(value) => self.tiles.try_move_value(value),
        };
        if !moved {
            return;
        }
        self.moves += 1;
        if self.tiles.is_solved() {
            self.solved = true;
            ctx.finish(true, score_for_moves(self.moves));
        }
    }
}

impl Spawn for SlidingPuzzle {
    fn spawn(rng: &mut rand::rngs::StdRng) -> Self {
        Self::random(rng)
    }
}
