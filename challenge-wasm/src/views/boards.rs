//! Grid-based challenges: sliding puzzle, pixel memory, chess, tetris and
//! memory match.

use challenge_core::chess::{BOARD, ChessChallenge, ChessEvent, ChessState, Square};
use challenge_core::circle::Point;
use challenge_core::memory_match::{self, MatchEvent, MatchState, MemoryMatch};
use challenge_core::palette::{EMPTY_RGB, color_hex};
use challenge_core::pixel_memory::{self, PixelEvent, PixelMemory, PixelState};
use challenge_core::sliding::{BLANK, SIZE, SlidingEvent, SlidingPuzzle};
use challenge_core::tetris::{self, Tetris, TetrisEvent};

use super::{Pointer, View};
use crate::canvas::{CellGrid, Pen, Rect};
use crate::constants::{ACCENT, BAD, BUTTON, EMPTY_CELL, GOOD, INK, MUTED, PANEL, SELECTED};

const SLIDING_GRID: CellGrid = CellGrid {
    origin: (10.0, 10.0),
    cell: 92.0,
    gap: 6.0,
    rows: SIZE,
    cols: SIZE,
};

impl View for SlidingPuzzle {
    const SIZE: (f64, f64) = (300.0, 350.0);

    fn pointer(&self, kind: Pointer, at: Point) -> Option<SlidingEvent> {
        if kind != Pointer::Down {
            return None;
        }
        let (row, col) = SLIDING_GRID.hit(at.x, at.y)?;
        Some(SlidingEvent::Click { row, col })
    }

    /// Arrow keys slide the tile on that side of the blank into it; digit
    /// keys move the tile with that number.
    fn key(&self, key: &str) -> Option<SlidingEvent> {
        if let Ok(value) = key.parse::<u8>() {
            return (1..=8).contains(&value).then_some(SlidingEvent::Tile(value));
        }
        let (br, bc) = self.tiles().blank();
        let (row, col) = match key {
            "ArrowUp" => (br + 1, bc),
            "ArrowDown" => (br.checked_sub(1)?, bc),
            "ArrowLeft" => (br, bc + 1),
            "ArrowRight" => (br, bc.checked_sub(1)?),
            _ => return None,
        };
        (row < SIZE && col < SIZE).then_some(SlidingEvent::Click { row, col })
    }

    fn draw(&self, pen: &Pen, _now_ms: u64) {
        for row in 0..SIZE {
            for col in 0..SIZE {
                let r = SLIDING_GRID.rect(row, col);
                let v = self.tiles().get(row, col);
                if v == BLANK {
                    pen.fill_rect(r.x, r.y, r.w, r.h, EMPTY_CELL);
                    continue;
                }
                pen.fill_rect(r.x, r.y, r.w, r.h, &color_hex(v as usize - 1));
                pen.stroke_rect(r.x, r.y, r.w, r.h, "#333", 1.6);
                pen.bold_text(r.x + r.w / 2.0, r.y + r.h / 2.0, &v.to_string(), 34.0, INK);
            }
        }
        pen.text(150.0, 318.0, &format!("Moves: {}", self.moves()), 16.0, INK);
    }
}

const PIXEL_GRID: CellGrid = CellGrid {
    origin: (12.0, 40.0),
    cell: 52.0,
    gap: 3.0,
    rows: pixel_memory::SIDE,
    cols: pixel_memory::SIDE,
};

const PIXEL_SUBMIT: Rect = Rect::new(75.0, 326.0, 150.0, 34.0);

impl View for PixelMemory {
    const SIZE: (f64, f64) = (300.0, 380.0);

    fn pointer(&self, kind: Pointer, at: Point) -> Option<PixelEvent> {
        if kind != Pointer::Down {
            return None;
        }
        if PIXEL_SUBMIT.contains(at.x, at.y) {
            return Some(PixelEvent::Submit);
        }
        let (row, col) = PIXEL_GRID.hit(at.x, at.y)?;
        Some(PixelEvent::Toggle { row, col })
    }

    fn key(&self, key: &str) -> Option<PixelEvent> {
        (key == "Enter").then_some(PixelEvent::Submit)
    }

    fn draw(&self, pen: &Pen, _now_ms: u64) {
        let [r, g, b] = EMPTY_RGB;
        let dark = format!("#{r:02x}{g:02x}{b:02x}");
        let caption = match self.state() {
            PixelState::Memorize => "Memorize the pattern",
            PixelState::Recall => "Now recreate it",
            PixelState::Checked { .. } => "Checking…",
        };
        pen.text(150.0, 20.0, caption, 16.0, INK);
        let shown = self.visible();
        for row in 0..pixel_memory::SIDE {
            for col in 0..pixel_memory::SIDE {
                let rect = PIXEL_GRID.rect(row, col);
                let fill = if shown.get(row, col) { ACCENT } else { EMPTY_CELL };
                pen.fill_rect(rect.x, rect.y, rect.w, rect.h, fill);
                pen.stroke_rect(rect.x, rect.y, rect.w, rect.h, &dark, 0.8);
            }
        }
        if self.state() == PixelState::Recall {
            pen.button(PIXEL_SUBMIT, "Submit", BUTTON);
        }
    }
}

const CHESS_CELL: f64 = 48.0;
const CHESS_ORIGIN: (f64, f64) = (8.0, 40.0);

fn chess_square(at: Point) -> Option<Square> {
    let col = ((at.x - CHESS_ORIGIN.0) / CHESS_CELL).floor();
    let row = ((at.y - CHESS_ORIGIN.1) / CHESS_CELL).floor();
    let n = BOARD as f64;
    ((0.0..n).contains(&col) && (0.0..n).contains(&row)).then(|| Square::new(row as u8, col as u8))
}

fn chess_rect(sq: Square) -> Rect {
    Rect::new(
        CHESS_ORIGIN.0 + sq.col as f64 * CHESS_CELL,
        CHESS_ORIGIN.1 + sq.row as f64 * CHESS_CELL,
        CHESS_CELL,
        CHESS_CELL,
    )
}

impl View for ChessChallenge {
    const SIZE: (f64, f64) = (400.0, 460.0);

    fn pointer(&self, kind: Pointer, at: Point) -> Option<ChessEvent> {
        if kind != Pointer::Down {
            return None;
        }
        chess_square(at).map(ChessEvent::Click)
    }

    fn draw(&self, pen: &Pen, _now_ms: u64) {
        pen.text(200.0, 20.0, "White to move and mate in one", 16.0, INK);
        for row in 0..BOARD {
            for col in 0..BOARD {
                let r = chess_rect(Square::new(row, col));
                let light = (row + col) % 2 == 0;
                pen.fill_rect(r.x, r.y, r.w, r.h, if light { "#f0d9b5" } else { "#b58863" });
            }
        }
        match self.state() {
            ChessState::Selected { from, targets } => {
                let r = chess_rect(*from);
                pen.fill_rect(r.x, r.y, r.w, r.h, SELECTED);
                for t in targets {
                    let r = chess_rect(*t);
                    pen.circle(r.x + r.w / 2.0, r.y + r.h / 2.0, 7.0, "rgba(0,0,0,0.3)");
                }
            }
            ChessState::Wrong { from, to } => {
                for sq in [from, to] {
                    let r = chess_rect(*sq);
                    pen.stroke_rect(r.x + 2.0, r.y + 2.0, r.w - 4.0, r.h - 4.0, BAD, 3.0);
                }
            }
            ChessState::Solved => {
                let (_, to) = self.puzzle().solution;
                let r = chess_rect(to);
                pen.stroke_rect(r.x + 2.0, r.y + 2.0, r.w - 4.0, r.h - 4.0, GOOD, 3.0);
            }
            ChessState::Selecting => {}
        }
        for p in self.board().pieces() {
            let r = chess_rect(p.at);
            let glyph = p.kind.symbol(p.color).to_string();
            pen.text(r.x + r.w / 2.0, r.y + r.h / 2.0 + 2.0, &glyph, 38.0, INK);
        }
        let footer = format!(
            "{}  ·  wrong moves {}/{}",
            self.puzzle().name,
            self.wrong_moves(),
            challenge_core::chess::MAX_WRONG
        );
        pen.text(200.0, 445.0, &footer, 13.0, MUTED);
    }
}

const TETRIS_CELL: f64 = 20.0;
const TETRIS_ORIGIN: (f64, f64) = (10.0, 40.0);

impl View for Tetris {
    const SIZE: (f64, f64) = (220.0, 450.0);

    fn key(&self, key: &str) -> Option<TetrisEvent> {
        match key {
            "ArrowLeft" | "a" => Some(TetrisEvent::Left),
            "ArrowRight" | "d" => Some(TetrisEvent::Right),
            "ArrowUp" | "w" => Some(TetrisEvent::Rotate),
            "ArrowDown" | "s" => Some(TetrisEvent::Down),
            _ => None,
        }
    }

    fn draw(&self, pen: &Pen, _now_ms: u64) {
        let state = self.state();
        let (ox, oy) = TETRIS_ORIGIN;
        let speed = if self.is_fast() { "  ⏬" } else { "" };
        let header = format!("Score {}  Lines {}{speed}", state.score(), state.lines());
        pen.text(110.0, 20.0, &header, 15.0, INK);
        pen.fill_rect(ox, oy, tetris::WIDTH as f64 * TETRIS_CELL, tetris::HEIGHT as f64 * TETRIS_CELL, PANEL);
        let cell = |row: i32, col: i32, color: &str| {
            pen.fill_rect(
                ox + col as f64 * TETRIS_CELL + 1.0,
                oy + row as f64 * TETRIS_CELL + 1.0,
                TETRIS_CELL - 2.0,
                TETRIS_CELL - 2.0,
                color,
            );
        };
        for (r, row) in state.grid().rows().iter().enumerate() {
            for (c, slot) in row.iter().enumerate() {
                if let Some(t) = slot {
                    cell(r as i32, c as i32, &color_hex(t.color_index()));
                }
            }
        }
        if let Some(p) = state.active() {
            let color = color_hex(p.kind.color_index());
            for (r, line) in p.shape().iter().enumerate() {
                for (c, on) in line.iter().enumerate() {
                    if *on {
                        cell(p.y + r as i32, p.x + c as i32, &color);
                    }
                }
            }
        }
        pen.stroke_rect(ox, oy, tetris::WIDTH as f64 * TETRIS_CELL, tetris::HEIGHT as f64 * TETRIS_CELL, "#333", 1.6);
    }
}

const MEMORY_GRID: CellGrid = CellGrid {
    origin: (10.0, 40.0),
    cell: 80.0,
    gap: 8.0,
    rows: memory_match::PAIRS * 2 / memory_match::COLS,
    cols: memory_match::COLS,
};

impl View for MemoryMatch {
    const SIZE: (f64, f64) = (360.0, 330.0);

    fn pointer(&self, kind: Pointer, at: Point) -> Option<MatchEvent> {
        if kind != Pointer::Down {
            return None;
        }
        let (row, col) = MEMORY_GRID.hit(at.x, at.y)?;
        Some(MatchEvent::Flip(row * memory_match::COLS + col))
    }

    fn draw(&self, pen: &Pen, _now_ms: u64) {
        let stars = memory_match::rating(self.moves(), self.pairs());
        let header = format!(
            "Moves: {}   {}{}",
            self.moves(),
            "★".repeat(stars as usize),
            "☆".repeat(3 - stars as usize)
        );
        pen.text(180.0, 22.0, &header, 16.0, INK);
        let wrong = matches!(self.state(), MatchState::Mismatch { .. });
        for (i, face) in self.cards().iter().enumerate() {
            let r = MEMORY_GRID.rect(i / memory_match::COLS, i % memory_match::COLS);
            if !self.is_face_up(i) {
                pen.fill_rect(r.x, r.y, r.w, r.h, BUTTON);
                continue;
            }
            let (fill, edge) = if self.is_matched(i) {
                (PANEL, GOOD)
            } else if wrong {
                (PANEL, BAD)
            } else {
                (PANEL, SELECTED)
            };
            pen.fill_rect(r.x, r.y, r.w, r.h, fill);
            pen.stroke_rect(r.x, r.y, r.w, r.h, edge, 3.0);
            pen.text(r.x + r.w / 2.0, r.y + r.h / 2.0, face, 36.0, INK);
        }
    }
}
