//! Mate-in-one puzzles on a bare 8x8 board with kings and sliders only.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::FEEDBACK_DELAY_MS;
use crate::error::{ChallengeError, Result};
use crate::kind::ChallengeKind;
use crate::phase::Phase;
use crate::shell::{Context, Game, Spawn};

use Color::{Black, White};
use PieceKind::{Bishop, King, Queen, Rook};

pub const BOARD: u8 = 8;
pub const MAX_WRONG: u32 = 3;

/// Row 0 is the eighth rank (top of the board as drawn), column 0 the a-file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Square {
    pub row: u8,
    pub col: u8,
}

impl Square {
    pub const fn new(row: u8, col: u8) -> Self {
        Square { row, col }
    }

    fn offset(self, dr: i8, dc: i8) -> Option<Square> {
        let r = self.row as i8 + dr;
        let c = self.col as i8 + dc;
        ((0..BOARD as i8).contains(&r) && (0..BOARD as i8).contains(&c))
            .then(|| Square::new(r as u8, c as u8))
    }

    /// Algebraic name such as `e4`.
    pub fn name(self) -> String {
        format!("{}{}", (b'a' + self.col) as char, BOARD - self.row)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    King,
    Queen,
    Rook,
    Bishop,
}

impl PieceKind {
    pub fn symbol(self, color: Color) -> char {
        match (color, self) {
            (Color::White, PieceKind::King) => '♔',
            (Color::White, PieceKind::Queen) => '♕',
            (Color::White, PieceKind::Rook) => '♖',
            (Color::White, PieceKind::Bishop) => '♗',
            (Color::Black, PieceKind::King) => '♚',
            (Color::Black, PieceKind::Queen) => '♛',
            (Color::Black, PieceKind::Rook) => '♜',
            (Color::Black, PieceKind::Bishop) => '♝',
        }
    }
}

const ORTHOGONAL: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const DIAGONAL: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
const ALL_DIRECTIONS: [(i8, i8); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
    pub at: Square,
}

/// How sliding pieces treat occupied squares along a ray.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlideRule {
    /// Stop at the first occupied square, capturing it if it is an enemy.
    #[default]
    Blocking,
    /// Sweep the whole line to the edge, ignoring occupants except that a
    /// friendly piece's square is never a destination.
    PassThrough,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Piece>", into = "Vec<Piece>")]
pub struct Board {
    pieces: Vec<Piece>,
}

impl TryFrom<Vec<Piece>> for Board {
    type Error = ChallengeError;

    fn try_from(v: Vec<Piece>) -> Result<Self> {
        Board::new(v)
    }
}

impl From<Board> for Vec<Piece> {
    fn from(b: Board) -> Self {
        b.pieces
    }
}

impl Board {
    pub fn new(pieces: Vec<Piece>) -> Result<Self> {
        for (i, p) in pieces.iter().enumerate() {
            if p.at.row >= BOARD || p.at.col >= BOARD {
                return Err(ChallengeError::OffBoard {
                    row: p.at.row,
                    col: p.at.col,
                });
            }
            if pieces[..i].iter().any(|q| q.at == p.at) {
                return Err(ChallengeError::OverlappingPieces {
                    row: p.at.row,
                    col: p.at.col,
                });
            }
        }
        Ok(Board { pieces })
    }

    pub fn empty() -> Self {
        Board { pieces: Vec::new() }
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn at(&self, sq: Square) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.at == sq)
    }

    /// Relocate the piece on `from`, removing whatever stood on `to`.
    /// Returns the captured piece, if any. No-op when `from` is empty.
    pub fn apply(&mut self, from: Square, to: Square) -> Option<Piece> {
        if from == to || self.at(from).is_none() {
            return None;
        }
        let captured = self
            .pieces
            .iter()
            .position(|p| p.at == to)
            .map(|idx| self.pieces.remove(idx));
        if let Some(p) = self.pieces.iter_mut().find(|p| p.at == from) {
            p.at = to;
        }
        captured
    }
}

fn directions(kind: PieceKind) -> &'static [(i8, i8)] {
    match kind {
        PieceKind::Rook => &ORTHOGONAL,
        PieceKind::Bishop => &DIAGONAL,
        PieceKind::Queen | PieceKind::King => &ALL_DIRECTIONS,
    }
}

/// Destination squares for the piece on `from`. Empty when `from` has no
/// piece. Check is not considered.
pub fn legal_moves(board: &Board, from: Square, rule: SlideRule) -> Vec<Square> {
    let Some(piece) = board.at(from).copied() else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for &(dr, dc) in directions(piece.kind) {
        let mut cur = from;
        while let Some(next) = cur.offset(dr, dc) {
            cur = next;
            let occupant = board.at(next);
            match occupant {
                None => out.push(next),
                Some(o) if o.color != piece.color => {
                    out.push(next);
                    if rule == SlideRule::Blocking {
                        break;
                    }
                }
                Some(_) => {
                    if rule == SlideRule::Blocking {
                        break;
                    }
                }
            }
            if piece.kind == PieceKind::King {
                break;
            }
        }
    }
    out
}

/// Authored position with its single winning move.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChessPuzzle {
    pub name: String,
    pub pieces: Board,
    pub to_move: Color,
    pub solution: (Square, Square),
}

const fn pc(kind: PieceKind, color: Color, row: u8, col: u8) -> Piece {
    Piece {
        kind,
        color,
        at: Square::new(row, col),
    }
}

struct PuzzleSpec {
    name: &'static str,
    pieces: &'static [Piece],
    solution: (Square, Square),
}

static PUZZLES: [PuzzleSpec; 5] = [
    PuzzleSpec {
        name: "Back rank rook",
        pieces: &[
            pc(King, Black, 0, 7),
            pc(King, White, 2, 6),
            pc(Rook, White, 7, 0),
        ],
        solution: (Square::new(7, 0), Square::new(0, 0)),
    },
    PuzzleSpec {
        name: "Queen to the eighth",
        pieces: &[
            pc(King, Black, 0, 0),
            pc(King, White, 2, 1),
            pc(Queen, White, 7, 3),
        ],
        solution: (Square::new(7, 3), Square::new(0, 3)),
    },
    PuzzleSpec {
        name: "Opposition mate",
        pieces: &[
            pc(King, Black, 0, 4),
            pc(King, White, 2, 4),
            pc(Rook, White, 7, 7),
        ],
        solution: (Square::new(7, 7), Square::new(0, 7)),
    },
    PuzzleSpec {
        name: "Corner box",
        pieces: &[
            pc(King, Black, 7, 0),
            pc(King, White, 5, 1),
            pc(Rook, White, 0, 7),
        ],
        solution: (Square::new(0, 7), Square::new(7, 7)),
    },
    PuzzleSpec {
        name: "Bishop-backed queen",
        pieces: &[
            pc(King, Black, 0, 6),
            pc(Rook, Black, 0, 5),
            pc(King, White, 7, 6),
            pc(Queen, White, 3, 7),
            pc(Bishop, White, 5, 3),
        ],
        solution: (Square::new(3, 7), Square::new(1, 7)),
    },
];

pub fn puzzle_count() -> usize {
    PUZZLES.len()
}

pub fn puzzle(index: usize) -> ChessPuzzle {
    let entry = &PUZZLES[index % PUZZLES.len()];
    ChessPuzzle {
        name: entry.name.to_string(),
        pieces: Board {
            pieces: entry.pieces.to_vec(),
        },
        to_move: White,
        solution: entry.solution,
    }
}

pub fn pick_puzzle(rng: &mut impl Rng) -> ChessPuzzle {
    puzzle(rng.random_range(0..PUZZLES.len()))
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ChessEvent {
    Click(Square),
    /// Scheduled after a wrong move to put the pieces back.
    Reset,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ChessState {
    Selecting,
    Selected { from: Square, targets: Vec<Square> },
    Wrong { from: Square, to: Square },
    Solved,
}

#[derive(Clone, Debug)]
pub struct ChessChallenge {
    puzzle: ChessPuzzle,
    board: Board,
    rule: SlideRule,
    state: ChessState,
    wrong: u32,
}

impl ChessChallenge {
    pub fn new(puzzle: ChessPuzzle, rule: SlideRule) -> Self {
        ChessChallenge {
            board: puzzle.pieces.clone(),
            puzzle,
            rule,
            state: ChessState::Selecting,
            wrong: 0,
        }
    }

    pub fn random(rng: &mut impl Rng) -> Self {
        Self::new(pick_puzzle(rng), SlideRule::default())
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn puzzle(&self) -> &ChessPuzzle {
        &self.puzzle
    }

    pub fn state(&self) -> &ChessState {
        &self.state
    }

    pub fn wrong_moves(&self) -> u32 {
        self.wrong
    }

    fn select(&self, sq: Square) -> ChessState {
        match self.board.at(sq) {
            Some(p) if p.color == self.puzzle.to_move => ChessState::Selected {
                from: sq,
                targets: legal_moves(&self.board, sq, self.rule),
            },
            _ => ChessState::Selecting,
        }
    }
}

impl Game for ChessChallenge {
    type Event = ChessEvent;

    fn kind(&self) -> ChallengeKind {
        ChallengeKind::ChessPuzzle
    }

    fn phase(&self) -> Phase {
        match self.state {
            ChessState::Selecting => Phase::Idle,
            ChessState::Selected { .. } => Phase::Interacting,
            ChessState::Wrong { .. } => Phase::Submitted,
            ChessState::Solved => Phase::Result,
        }
    }

    fn handle(&mut self, event: ChessEvent, ctx: &mut Context<'_, ChessEvent>) {
        let state = std::mem::replace(&mut self.state, ChessState::Selecting);
        self.state = match (state, event) {
            (ChessState::Selecting, ChessEvent::Click(sq)) => self.select(sq),
            (ChessState::Selected { from, targets }, ChessEvent::Click(to)) => {
                if targets.contains(&to) {
                    self.board.apply(from, to);
                    if (from, to) == self.puzzle.solution {
                        ctx.finish(true, 100 - 30 * self.wrong.min(3));
                        ChessState::Solved
                    } else {
                        self.wrong += 1;
                        log::debug!("wrong move {} -> {}", from.name(), to.name());
                        if self.wrong >= MAX_WRONG {
                            ctx.finish(false, 0);
                        } else {
                            ctx.after(FEEDBACK_DELAY_MS, ChessEvent::Reset);
                        }
                        ChessState::Wrong { from, to }
                    }
                } else if to == from {
                    ChessState::Selecting
                } else {
                    self.select(to)
                }
            }
            (ChessState::Wrong { .. }, ChessEvent::Reset) => {
                self.board = self.puzzle.pieces.clone();
                ChessState::Selecting
            }
            (state, _) => state,
        };
    }
}

impl Spawn for ChessChallenge {
    fn spawn(rng: &mut rand::rngs::StdRng) -> Self {
        Self::random(rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lone(kind: PieceKind, row: u8, col: u8) -> Board {
        Board::new(vec![pc(kind, White, row, col)]).unwrap()
    }

    #[test]
    fn corner_queen_on_empty_board() {
        let b = lone(Queen, 0, 0);
        assert_eq!(legal_moves(&b, Square::new(0, 0), SlideRule::Blocking).len(), 21);
    }

    #[test]
    fn central_king_has_eight_moves() {
        let b = lone(King, 3, 3);
        assert_eq!(legal_moves(&b, Square::new(3, 3), SlideRule::Blocking).len(), 8);
    }

    #[test]
    fn rook_and_bishop_counts() {
        let b = lone(Rook, 4, 4);
        assert_eq!(legal_moves(&b, Square::new(4, 4), SlideRule::Blocking).len(), 14);
        let b = lone(Bishop, 4, 4);
        assert_eq!(legal_moves(&b, Square::new(4, 4), SlideRule::Blocking).len(), 13);
    }

    #[test]
    fn blocking_stops_rays_and_captures_enemies() {
        let b = Board::new(vec![
            pc(Rook, White, 7, 0),
            pc(Bishop, White, 7, 3),
            pc(Rook, Black, 3, 0),
        ])
        .unwrap();
        let moves = legal_moves(&b, Square::new(7, 0), SlideRule::Blocking);
        assert!(moves.contains(&Square::new(3, 0)));
        assert!(!moves.contains(&Square::new(2, 0)));
        assert!(moves.contains(&Square::new(7, 2)));
        assert!(!moves.contains(&Square::new(7, 3)));
        assert_eq!(moves.len(), 6);
    }

    #[test]
    fn pass_through_sweeps_to_the_edge() {
        let b = Board::new(vec![
            pc(Rook, White, 7, 0),
            pc(Bishop, White, 7, 3),
            pc(Rook, Black, 3, 0),
        ])
        .unwrap();
        let moves = legal_moves(&b, Square::new(7, 0), SlideRule::PassThrough);
        assert!(moves.contains(&Square::new(0, 0)));
        assert!(moves.contains(&Square::new(7, 7)));
        assert!(!moves.contains(&Square::new(7, 3)));
        assert_eq!(moves.len(), 13);
    }

    #[test]
    fn king_cannot_step_on_friends() {
        let b = Board::new(vec![pc(King, White, 0, 0), pc(Rook, White, 0, 1)]).unwrap();
        let moves = legal_moves(&b, Square::new(0, 0), SlideRule::Blocking);
        assert_eq!(moves, vec![Square::new(1, 0), Square::new(1, 1)]);
    }

    #[test]
    fn apply_captures() {
        let mut b = Board::new(vec![pc(Rook, White, 7, 0), pc(Rook, Black, 3, 0)]).unwrap();
        let taken = b.apply(Square::new(7, 0), Square::new(3, 0));
        assert_eq!(taken.map(|p| p.color), Some(Black));
        assert_eq!(b.pieces().len(), 1);
        assert_eq!(b.at(Square::new(3, 0)).map(|p| p.color), Some(White));
    }

    #[test]
    fn rejects_stacked_pieces() {
        assert!(Board::new(vec![pc(King, White, 1, 1), pc(Rook, Black, 1, 1)]).is_err());
        assert!(Board::new(vec![pc(King, White, 8, 1)]).is_err());
    }

    #[test]
    fn every_authored_solution_is_reachable() {
        for i in 0..puzzle_count() {
            let p = puzzle(i);
            let (from, to) = p.solution;
            let mover = p.pieces.at(from).expect("solution starts on a piece");
            assert_eq!(mover.color, p.to_move, "{}", p.name);
            assert!(
                legal_moves(&p.pieces, from, SlideRule::Blocking).contains(&to),
                "{}",
                p.name
            );
        }
    }

    #[test]
    fn square_names() {
        assert_eq!(Square::new(7, 0).name(), "a1");
        assert_eq!(Square::new(0, 7).name(), "h8");
    }
}
