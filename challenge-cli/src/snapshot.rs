//! Deterministic PNG snapshots of grid-based boards.

use anyhow::{Result, bail};
use challenge_core::chess::{BOARD, ChessChallenge, Color, PieceKind};
use challenge_core::palette::{EMPTY_RGB, color_rgb};
use challenge_core::pixel_memory::{Pattern, PixelMemory, SIDE};
use challenge_core::session::{peek_kind, replay_str};
use challenge_core::sliding::{BLANK, SIZE, SlidingPuzzle};
use challenge_core::tetris::{self, Tetris};
use challenge_core::ChallengeKind;
use png::{BitDepth, ColorType, Encoder};

const LIGHT_SQUARE: [u8; 3] = [0xf0, 0xd9, 0xb5];
const DARK_SQUARE: [u8; 3] = [0xb5, 0x88, 0x63];
const GAP_RGB: [u8; 3] = [0xff, 0xff, 0xff];

/// Bounds for the `--cell` size in pixels.
pub const MIN_CELL: u32 = 4;
pub const MAX_CELL: u32 = 256;

/// RGBA8 image buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Raster {
    pub fn new(width: u32, height: u32, fill: [u8; 3]) -> Self {
        let pixels = width as usize * height as usize;
        let mut rgba = Vec::with_capacity(pixels * 4);
        for _ in 0..pixels {
            rgba.extend_from_slice(&[fill[0], fill[1], fill[2], 0xff]);
        }
        Raster { width, height, rgba }
    }

    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, rgb: [u8; 3]) {
        for py in y..y.saturating_add(h).min(self.height) {
            for px in x..x.saturating_add(w).min(self.width) {
                let i = (py as usize * self.width as usize + px as usize) * 4;
                self.rgba[i..i + 3].copy_from_slice(&rgb);
            }
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [self.rgba[i], self.rgba[i + 1], self.rgba[i + 2]]
    }

    /// Fill cell `(row, col)` of a `cell`-pixel grid, leaving a one pixel
    /// gutter so adjacent cells stay distinguishable.
    fn cell(&mut self, row: usize, col: usize, cell: u32, rgb: [u8; 3]) {
        let (x, y) = (col as u32 * cell, row as u32 * cell);
        self.fill_rect(x + 1, y + 1, cell.saturating_sub(2), cell.saturating_sub(2), rgb);
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, png::EncodingError> {
        encode_rgba_to_png_bytes(self.width, self.height, &self.rgba)
    }
}

pub fn encode_rgba_to_png_bytes(
    width: u32,
    height: u32,
    rgba: &[u8],
) -> Result<Vec<u8>, png::EncodingError> {
    let mut buf = Vec::new();
    {
        let mut enc = Encoder::new(&mut buf, width, height);
        enc.set_color(ColorType::Rgba);
        enc.set_depth(BitDepth::Eight);
        let mut writer = enc.write_header()?;
        writer.write_image_data(rgba)?;
    }
    Ok(buf)
}

fn tetris_raster(game: &Tetris, cell: u32) -> Raster {
    let state = game.state();
    let mut img = Raster::new(tetris::WIDTH as u32 * cell, tetris::HEIGHT as u32 * cell, EMPTY_RGB);
    for (r, row) in state.grid().rows().iter().enumerate() {
        for (c, slot) in row.iter().enumerate() {
            if let Some(t) = slot {
                img.cell(r, c, cell, color_rgb(t.color_index()));
            }
        }
    }
    if let Some(p) = state.active() {
        for (r, line) in p.shape().iter().enumerate() {
            for (c, on) in line.iter().enumerate() {
                let (row, col) = (p.y + r as i32, p.x + c as i32);
                if *on && row >= 0 && col >= 0 {
                    img.cell(row as usize, col as usize, cell, color_rgb(p.kind.color_index()));
                }
            }
        }
    }
    img
}

fn sliding_raster(game: &SlidingPuzzle, cell: u32) -> Raster {
    let side = SIZE as u32 * cell;
    let mut img = Raster::new(side, side, EMPTY_RGB);
    for row in 0..SIZE {
        for col in 0..SIZE {
            let v = game.tiles().get(row, col);
            if v != BLANK {
                img.cell(row, col, cell, color_rgb(v as usize - 1));
            }
        }
    }
    img
}

/// Target on the left, the player's recall on the right.
fn pixel_raster(game: &PixelMemory, cell: u32) -> Raster {
    let side = SIDE as u32 * cell;
    let mut img = Raster::new(side * 2 + cell, side, GAP_RGB);
    let mut paint = |pattern: &Pattern, x0: u32| {
        img.fill_rect(x0, 0, side, side, EMPTY_RGB);
        for row in 0..SIDE {
            for col in 0..SIDE {
                if pattern.get(row, col) {
                    let (x, y) = (x0 + col as u32 * cell, row as u32 * cell);
                    img.fill_rect(x + 1, y + 1, cell.saturating_sub(2), cell.saturating_sub(2), color_rgb(5));
                }
            }
        }
    };
    paint(game.target(), 0);
    paint(game.guess(), side + cell);
    img
}

fn piece_rgb(kind: PieceKind) -> [u8; 3] {
    match kind {
        PieceKind::King => color_rgb(2),
        PieceKind::Queen => color_rgb(6),
        PieceKind::Rook => color_rgb(0),
        PieceKind::Bishop => color_rgb(4),
    }
}

fn chess_raster(game: &ChessChallenge, cell: u32) -> Raster {
    let side = BOARD as u32 * cell;
    let mut img = Raster::new(side, side, LIGHT_SQUARE);
    for row in 0..BOARD as u32 {
        for col in 0..BOARD as u32 {
            if (row + col) % 2 == 1 {
                img.fill_rect(col * cell, row * cell, cell, cell, DARK_SQUARE);
            }
        }
    }
    let inset = cell / 5;
    for p in game.board().pieces() {
        let (x, y) = (p.at.col as u32 * cell, p.at.row as u32 * cell);
        // Black pieces get a dark rim.
        if p.color == Color::Black {
            img.fill_rect(x + inset / 2, y + inset / 2, cell - inset, cell - inset, EMPTY_RGB);
        }
        img.fill_rect(x + inset, y + inset, cell - 2 * inset, cell - 2 * inset, piece_rgb(p.kind));
    }
    img
}

/// Replay `session` and draw the final board. `cell` is clamped to
/// `MIN_CELL..=MAX_CELL`.
pub fn render_session(session: &str, cell: u32) -> Result<Raster> {
    let cell = cell.clamp(MIN_CELL, MAX_CELL);
    let raster = match peek_kind(session)? {
        ChallengeKind::Tetris => tetris_raster(replay_str::<Tetris>(session)?.game(), cell),
        ChallengeKind::SlidingPuzzle => {
            sliding_raster(replay_str::<SlidingPuzzle>(session)?.game(), cell)
        }
        ChallengeKind::PixelMemory => pixel_raster(replay_str::<PixelMemory>(session)?.game(), cell),
        ChallengeKind::ChessPuzzle => {
            chess_raster(replay_str::<ChessChallenge>(session)?.game(), cell)
        }
        other => bail!("{other} has no grid board to snapshot"),
    };
    Ok(raster)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_header_is_written() {
        let img = Raster::new(3, 2, [1, 2, 3]);
        let bytes = img.encode_png().unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn fill_rect_clips_to_the_image() {
        let mut img = Raster::new(4, 4, [0, 0, 0]);
        img.fill_rect(2, 2, 10, 10, [9, 9, 9]);
        assert_eq!(img.pixel(3, 3), [9, 9, 9]);
        assert_eq!(img.pixel(1, 1), [0, 0, 0]);
        img.fill_rect(3, 0, u32::MAX, 1, [7, 7, 7]);
        assert_eq!(img.pixel(3, 0), [7, 7, 7]);
    }
}
