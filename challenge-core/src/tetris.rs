//! Falling-block step function on a 10x20 grid.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::kind::ChallengeKind;
use crate::phase::Phase;
use crate::scheduler::TimerId;
use crate::shell::{Context, Game, Spawn};

pub const WIDTH: usize = 10;
pub const HEIGHT: usize = 20;
pub const LINE_SCORE: u32 = 100;
pub const WIN_SCORE: u32 = 5000;
pub const WIN_LINES: u32 = 10;
/// Gravity period before the player asks for speed (ms).
pub const FALL_MS: u64 = 500;
/// Gravity period after the first down press; never restored (ms).
pub const FAST_FALL_MS: u64 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tetromino {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

pub type Shape = Vec<Vec<bool>>;

impl Tetromino {
    pub const ALL: [Tetromino; 7] = [
        Tetromino::I,
        Tetromino::O,
        Tetromino::T,
        Tetromino::S,
        Tetromino::Z,
        Tetromino::J,
        Tetromino::L,
    ];

    /// Spawn orientation as rows of filled flags.
    pub fn base_shape(self) -> Shape {
        let rows: &[&[u8]] = match self {
            Tetromino::I => &[&[1, 1, 1, 1]],
            Tetromino::O => &[&[1, 1], &[1, 1]],
            Tetromino::T => &[&[0, 1, 0], &[1, 1, 1]],
            Tetromino::S => &[&[0, 1, 1], &[1, 1, 0]],
            Tetromino::Z => &[&[1, 1, 0], &[0, 1, 1]],
            Tetromino::J => &[&[1, 0, 0], &[1, 1, 1]],
            Tetromino::L => &[&[0, 0, 1], &[1, 1, 1]],
        };
        rows.iter()
            .map(|r| r.iter().map(|&v| v == 1).collect())
            .collect()
    }

    /// All four orientations, each a quarter turn clockwise of the last.
    pub fn rotations(self) -> [Shape; 4] {
        let r0 = self.base_shape();
        let r1 = rotate_cw(&r0);
        let r2 = rotate_cw(&r1);
        let r3 = rotate_cw(&r2);
        [r0, r1, r2, r3]
    }

    pub fn color_index(self) -> usize {
        match self {
            Tetromino::I => 4,
            Tetromino::O => 2,
            Tetromino::T => 6,
            Tetromino::S => 3,
            Tetromino::Z => 0,
            Tetromino::J => 5,
            Tetromino::L => 1,
        }
    }

    pub fn random(rng: &mut impl Rng) -> Self {
        Tetromino::ALL[rng.random_range(0..Tetromino::ALL.len())]
    }
}

/// Quarter turn clockwise: transpose, then mirror each row.
pub fn rotate_cw(shape: &Shape) -> Shape {
    let rows = shape.len();
    let cols = shape.first().map_or(0, |r| r.len());
    (0..cols)
        .map(|c| (0..rows).rev().map(|r| shape[r][c]).collect())
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    cells: [[Option<Tetromino>; WIDTH]; HEIGHT],
}

impl Default for Grid {
    fn default() -> Self {
        Grid {
            cells: [[None; WIDTH]; HEIGHT],
        }
    }
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Tetromino> {
        self.cells.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    pub fn set(&mut self, row: usize, col: usize, cell: Option<Tetromino>) {
        if row < HEIGHT && col < WIDTH {
            self.cells[row][col] = cell;
        }
    }

    pub fn rows(&self) -> &[[Option<Tetromino>; WIDTH]; HEIGHT] {
        &self.cells
    }

    fn filled(shape: &Shape, x: i32, y: i32) -> impl Iterator<Item = (i32, i32)> + '_ {
        shape.iter().enumerate().flat_map(move |(r, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, on)| **on)
                .map(move |(c, _)| (y + r as i32, x + c as i32))
        })
    }

    /// Whether every filled cell of `shape` at `(x, y)` lands on an
    /// in-bounds, empty cell.
    pub fn fits(&self, shape: &Shape, x: i32, y: i32) -> bool {
        Self::filled(shape, x, y).all(|(r, c)| {
            (0..HEIGHT as i32).contains(&r)
                && (0..WIDTH as i32).contains(&c)
                && self.cells[r as usize][c as usize].is_none()
        })
    }

    pub fn stamp(&mut self, shape: &Shape, x: i32, y: i32, kind: Tetromino) {
        for (r, c) in Self::filled(shape, x, y) {
            if r >= 0 && c >= 0 {
                self.set(r as usize, c as usize, Some(kind));
            }
        }
    }

    /// Drop every full row, shifting the rows above it down. Returns how
    /// many rows were removed.
    pub fn clear_lines(&mut self) -> u32 {
        let kept: Vec<[Option<Tetromino>; WIDTH]> = self
            .cells
            .iter()
            .filter(|row| row.iter().any(Option::is_none))
            .copied()
            .collect();
        let cleared = HEIGHT - kept.len();
        let mut cells = [[None; WIDTH]; HEIGHT];
        cells[cleared..].copy_from_slice(&kept);
        self.cells = cells;
        cleared as u32
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePiece {
    pub kind: Tetromino,
    pub rotation: usize,
    pub x: i32,
    pub y: i32,
}

impl ActivePiece {
    pub fn shape(&self) -> Shape {
        let mut shape = self.kind.base_shape();
        for _ in 0..self.rotation % 4 {
            shape = rotate_cw(&shape);
        }
        shape
    }

    fn spawn(kind: Tetromino) -> Self {
        let width = kind.base_shape()[0].len() as i32;
        ActivePiece {
            kind,
            rotation: 0,
            x: (WIDTH as i32 - width) / 2,
            y: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepResult {
    Fell,
    Locked { lines: u32 },
    /// The lock reached the win threshold; no further piece spawns.
    Won { lines: u32 },
    GameOver,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TetrisState {
    grid: Grid,
    active: Option<ActivePiece>,
    score: u32,
    lines: u32,
    over: bool,
}

impl TetrisState {
    pub fn new(first: Tetromino) -> Self {
        Self::with_grid(Grid::new(), first)
    }

    pub fn with_grid(grid: Grid, first: Tetromino) -> Self {
        let mut state = TetrisState {
            grid,
            active: None,
            score: 0,
            lines: 0,
            over: false,
        };
        state.spawn(first);
        state
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn active(&self) -> Option<&ActivePiece> {
        self.active.as_ref()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    pub fn has_won(&self) -> bool {
        self.score >= WIN_SCORE || self.lines >= WIN_LINES
    }

    fn spawn(&mut self, kind: Tetromino) -> bool {
        let piece = ActivePiece::spawn(kind);
        if self.grid.fits(&piece.shape(), piece.x, piece.y) {
            self.active = Some(piece);
            true
        } else {
            self.active = None;
            self.over = true;
            false
        }
    }

    fn try_place(&mut self, candidate: ActivePiece) -> bool {
        if self.over || !self.grid.fits(&candidate.shape(), candidate.x, candidate.y) {
            return false;
        }
        self.active = Some(candidate);
        true
    }

    pub fn shift(&mut self, dx: i32) -> bool {
        match self.active {
            Some(p) => self.try_place(ActivePiece { x: p.x + dx, ..p }),
            None => false,
        }
    }

    pub fn rotate(&mut self) -> bool {
        match self.active {
            Some(p) => self.try_place(ActivePiece {
                rotation: (p.rotation + 1) % 4,
                ..p
            }),
            None => false,
        }
    }

    /// Stamp the active piece and clear lines, crediting the score.
    fn settle(&mut self) -> u32 {
        if let Some(p) = self.active.take() {
            self.grid.stamp(&p.shape(), p.x, p.y, p.kind);
        }
        let cleared = self.clear_full_rows();
        log::debug!("piece locked, {cleared} lines cleared, score {}", self.score);
        cleared
    }

    /// Remove completed rows and add `LINE_SCORE` per row.
    pub fn clear_full_rows(&mut self) -> u32 {
        let cleared = self.grid.clear_lines();
        self.lines += cleared;
        self.score += cleared * LINE_SCORE;
        cleared
    }

    /// One gravity tick: fall a row, or lock, clear and spawn `next`.
    pub fn step(&mut self, next: Tetromino) -> StepResult {
        if self.over {
            return StepResult::GameOver;
        }
        let Some(p) = self.active else {
            return if self.spawn(next) {
                StepResult::Fell
            } else {
                StepResult::GameOver
            };
        };
        if self.try_place(ActivePiece { y: p.y + 1, ..p }) {
            return StepResult::Fell;
        }
        let lines = self.settle();
        if self.has_won() {
            self.active = None;
            self.over = true;
            return StepResult::Won { lines };
        }
        if self.spawn(next) {
            StepResult::Locked { lines }
        } else {
            StepResult::GameOver
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TetrisEvent {
    Tick,
    Left,
    Right,
    Rotate,
    Down,
}

#[derive(Clone, Debug)]
pub struct Tetris {
    state: TetrisState,
    gravity: Option<TimerId>,
    fast: bool,
}

impl Tetris {
    pub fn new(first: Tetromino) -> Self {
        Tetris {
            state: TetrisState::new(first),
            gravity: None,
            fast: false,
        }
    }

    pub fn random(rng: &mut impl Rng) -> Self {
        Self::new(Tetromino::random(rng))
    }

    pub fn state(&self) -> &TetrisState {
        &self.state
    }

    pub fn is_fast(&self) -> bool {
        self.fast
    }

    fn fall(&mut self, ctx: &mut Context<'_, TetrisEvent>) {
        let next = Tetromino::random(ctx.rng());
        match self.state.step(next) {
            StepResult::Won { .. } => ctx.finish(true, self.state.score()),
            StepResult::GameOver => ctx.finish(false, self.state.score()),
            StepResult::Fell | StepResult::Locked { .. } => {}
        }
    }
}

impl Game for Tetris {
    type Event = TetrisEvent;

    fn kind(&self) -> ChallengeKind {
        ChallengeKind::Tetris
    }

    fn phase(&self) -> Phase {
        if self.state.is_over() {
            Phase::Result
        } else if self.gravity.is_some() {
            Phase::Interacting
        } else {
            Phase::Idle
        }
    }

    fn start(&mut self, ctx: &mut Context<'_, TetrisEvent>) {
        self.gravity = Some(ctx.every(FALL_MS, TetrisEvent::Tick));
    }

    fn handle(&mut self, event: TetrisEvent, ctx: &mut Context<'_, TetrisEvent>) {
        if self.state.is_over() {
            return;
        }
        match event {
            TetrisEvent::Tick => self.fall(ctx),
            TetrisEvent::Left => {
                self.state.shift(-1);
            }
            TetrisEvent::Right => {
                self.state.shift(1);
            }
            TetrisEvent::Rotate => {
                self.state.rotate();
            }
            TetrisEvent::Down => {
                if !self.fast {
                    self.fast = true;
                    if let Some(id) = self.gravity.take() {
                        ctx.cancel(id);
                    }
                    self.gravity = Some(ctx.every(FAST_FALL_MS, TetrisEvent::Tick));
                }
                self.fall(ctx);
            }
        }
    }

    fn partial_score(&self) -> u32 {
        self.state.score()
    }
}

impl Spawn for Tetris {
    fn spawn(rng: &mut rand::rngs::StdRng) -> Self {
        Self::random(rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_row(grid: &mut Grid, row: usize) {
        for c in 0..WIDTH {
            grid.set(row, c, Some(Tetromino::O));
        }
    }

    #[test]
    fn rotations_cycle_back() {
        for kind in Tetromino::ALL {
            let [r0, r1, _, r3] = kind.rotations();
            assert_eq!(rotate_cw(&r3), r0, "{kind:?}");
            let cells = |s: &Shape| s.iter().flatten().filter(|v| **v).count();
            assert_eq!(cells(&r1), 4);
        }
        let i = Tetromino::I.rotations();
        assert_eq!(i[1].len(), 4);
        assert_eq!(i[1][0].len(), 1);
    }

    #[test]
    fn t_rotates_clockwise() {
        let r1 = rotate_cw(&Tetromino::T.base_shape());
        let expect: Shape = vec![vec![true, false], vec![true, true], vec![true, false]];
        assert_eq!(r1, expect);
    }

    #[test]
    fn single_full_row_is_cleared() {
        let mut grid = Grid::new();
        full_row(&mut grid, 19);
        grid.set(18, 3, Some(Tetromino::T));
        grid.set(17, 0, Some(Tetromino::L));
        let mut state = TetrisState::with_grid(grid, Tetromino::I);
        assert_eq!(state.clear_full_rows(), 1);
        assert_eq!(state.score(), 100);
        assert_eq!(state.lines(), 1);
        let g = state.grid();
        assert_eq!(g.get(19, 3), Some(Tetromino::T));
        assert_eq!(g.get(18, 0), Some(Tetromino::L));
        assert_eq!(g.get(19, 0), None);
        assert!((0..18).all(|r| (0..WIDTH).all(|c| g.get(r, c).is_none())));
    }

    #[test]
    fn walls_block_shifts() {
        let mut s = TetrisState::new(Tetromino::O);
        while s.shift(-1) {}
        assert_eq!(s.active().map(|p| p.x), Some(0));
        while s.shift(1) {}
        assert_eq!(s.active().map(|p| p.x), Some(WIDTH as i32 - 2));
    }

    #[test]
    fn piece_locks_at_floor_and_next_spawns() {
        let mut s = TetrisState::new(Tetromino::O);
        let mut locked = None;
        for _ in 0..HEIGHT + 2 {
            if let StepResult::Locked { lines } = s.step(Tetromino::I) {
                locked = Some(lines);
                break;
            }
        }
        assert_eq!(locked, Some(0));
        assert_eq!(s.grid().get(HEIGHT - 1, 4), Some(Tetromino::O));
        assert_eq!(s.active().map(|p| p.kind), Some(Tetromino::I));
    }

    #[test]
    fn blocked_spawn_ends_game() {
        let mut grid = Grid::new();
        for c in 0..WIDTH - 1 {
            grid.set(0, c, Some(Tetromino::Z));
        }
        let s = TetrisState::with_grid(grid, Tetromino::O);
        assert!(s.is_over());
        assert!(s.active().is_none());
    }

    /// An O piece whose lock fills row 1 and leaves its top half where the
    /// next piece spawns.
    fn winning_lock_with_blocked_spawn() -> TetrisState {
        let mut grid = Grid::new();
        for c in (0..WIDTH).filter(|c| !(4..=5).contains(c)) {
            grid.set(1, c, Some(Tetromino::Z));
        }
        grid.set(2, 4, Some(Tetromino::I));
        grid.set(2, 5, Some(Tetromino::I));
        let mut state = TetrisState::with_grid(grid, Tetromino::O);
        state.lines = WIN_LINES - 1;
        state
    }

    #[test]
    fn winning_lock_beats_blocked_spawn() {
        let mut s = winning_lock_with_blocked_spawn();
        assert_eq!(s.step(Tetromino::O), StepResult::Won { lines: 1 });
        assert_eq!(s.lines(), WIN_LINES);
        assert!(s.is_over());
        assert!(s.active().is_none());
    }

    #[test]
    fn winning_lock_reports_success() {
        use std::cell::Cell;
        use std::rc::Rc;

        use crate::contract::{ChallengeConfig, ChallengeResult};
        use crate::shell::Shell;

        let game = Tetris {
            state: winning_lock_with_blocked_spawn(),
            gravity: None,
            fast: false,
        };
        let seen: Rc<Cell<Option<ChallengeResult>>> = Rc::new(Cell::new(None));
        let sink = seen.clone();
        let mut shell =
            Shell::with_callback(game, ChallengeConfig::default(), 3, move |r| sink.set(Some(r)));
        shell.mount(0);
        shell.tick(FALL_MS);
        assert!(shell.is_finished());
        shell.tick(FALL_MS + crate::constants::FEEDBACK_DELAY_MS);
        let result = seen.get().expect("reported");
        assert!(result.success);
        assert_eq!(result.score, LINE_SCORE);
        assert_eq!(result.time_spent, 2);
    }

    #[test]
    fn win_threshold() {
        let mut s = TetrisState::new(Tetromino::T);
        assert!(!s.has_won());
        s.lines = WIN_LINES;
        assert!(s.has_won());
    }
}
