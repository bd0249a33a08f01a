//! Canvas presentation for each challenge.
//!
//! A [`View`] maps pointer/key input in widget space to game events and
//! draws the game. [`Widget`] erases the game type so the front-end can hold
//! whichever challenge the host asked for.

use challenge_core::circle::Point;
use challenge_core::quiz::{Quiz, QuizBank};
use challenge_core::{ChallengeConfig, ChallengeKind, CompletionGate, Game, Phase, Shell};
use web_sys::CanvasRenderingContext2d;

use crate::canvas::Pen;
use crate::constants::{BACKGROUND, BAD, GOOD, INK, MARGIN, MUTED};

mod boards;
mod choices;
mod motion;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pointer {
    Down,
    Move,
    Up,
}

pub trait View: Game {
    /// Widget-space extent; the canvas is letterboxed to this aspect.
    const SIZE: (f64, f64);

    fn pointer(&self, _kind: Pointer, _at: Point) -> Option<Self::Event> {
        None
    }

    fn key(&self, _key: &str) -> Option<Self::Event> {
        None
    }

    fn draw(&self, pen: &Pen, now_ms: u64);
}

/// Maps widget space onto the canvas, preserving aspect ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Layout {
    pub scale: f64,
    pub offset: (f64, f64),
}

impl Layout {
    pub fn fit(canvas_w: f64, canvas_h: f64, size: (f64, f64)) -> Self {
        let avail_w = canvas_w * (1.0 - 2.0 * MARGIN);
        let avail_h = canvas_h * (1.0 - 2.0 * MARGIN);
        let scale = (avail_w / size.0).min(avail_h / size.1).max(0.01);
        Layout {
            scale,
            offset: (
                (canvas_w - size.0 * scale) / 2.0,
                (canvas_h - size.1 * scale) / 2.0,
            ),
        }
    }

    pub fn from_screen(&self, x: f64, y: f64) -> Point {
        Point {
            x: (x - self.offset.0) / self.scale,
            y: (y - self.offset.1) / self.scale,
        }
    }
}

/// Type-erased mounted challenge.
pub trait Widget {
    fn mount(&mut self, now_ms: u64);
    fn unmount(&mut self);
    fn tick(&mut self, now_ms: u64);
    /// `x`, `y` are canvas pixels.
    fn pointer(&mut self, kind: Pointer, x: f64, y: f64, canvas: (f64, f64), now_ms: u64);
    /// Returns whether the key was consumed.
    fn key(&mut self, key: &str, now_ms: u64) -> bool;
    fn draw(&self, ctx: &CanvasRenderingContext2d, canvas: (f64, f64), now_ms: u64);
    fn title(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn remaining_secs(&self, now_ms: u64) -> Option<u32>;
}

impl<G: View> Widget for Shell<G> {
    fn mount(&mut self, now_ms: u64) {
        Shell::mount(self, now_ms);
    }

    fn unmount(&mut self) {
        Shell::unmount(self);
    }

    fn tick(&mut self, now_ms: u64) {
        Shell::tick(self, now_ms);
    }

    fn pointer(&mut self, kind: Pointer, x: f64, y: f64, canvas: (f64, f64), now_ms: u64) {
        let layout = Layout::fit(canvas.0, canvas.1, G::SIZE);
        let at = layout.from_screen(x, y);
        if let Some(event) = View::pointer(self.game(), kind, at) {
            self.dispatch(event, now_ms);
        }
    }

    fn key(&mut self, key: &str, now_ms: u64) -> bool {
        // Leave keys to the page while a verdict or transition is showing.
        if !self.phase().is_interactive() {
            return false;
        }
        match View::key(self.game(), key) {
            Some(event) => self.dispatch(event, now_ms),
            None => false,
        }
    }

    fn draw(&self, ctx: &CanvasRenderingContext2d, canvas: (f64, f64), now_ms: u64) {
        let layout = Layout::fit(canvas.0, canvas.1, G::SIZE);
        let _ = ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        ctx.clear_rect(0.0, 0.0, canvas.0, canvas.1);
        let _ = ctx.set_transform(
            layout.scale,
            0.0,
            0.0,
            layout.scale,
            layout.offset.0,
            layout.offset.1,
        );
        let pen = Pen::new(ctx);
        pen.fill_rect(0.0, 0.0, G::SIZE.0, G::SIZE.1, BACKGROUND);
        View::draw(self.game(), &pen, now_ms);
        if let Some(outcome) = self.outcome() {
            draw_verdict(&pen, G::SIZE, outcome.success, outcome.score);
        } else if self.phase() == Phase::Idle {
            pen.text(G::SIZE.0 / 2.0, G::SIZE.1 - 10.0, self.description(), 11.0, MUTED);
        }
        let _ = ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
    }

    fn title(&self) -> &'static str {
        Shell::title(self)
    }

    fn description(&self) -> &'static str {
        Shell::description(self)
    }

    fn remaining_secs(&self, now_ms: u64) -> Option<u32> {
        Shell::remaining_secs(self, now_ms)
    }
}

fn draw_verdict(pen: &Pen, size: (f64, f64), success: bool, score: u32) {
    let (w, h) = size;
    pen.ctx.set_global_alpha(0.85);
    pen.fill_rect(0.0, h / 2.0 - 40.0, w, 80.0, "#fff");
    pen.ctx.set_global_alpha(1.0);
    let (label, color) = if success {
        ("Passed!", GOOD)
    } else {
        ("Not this time", BAD)
    };
    pen.bold_text(w / 2.0, h / 2.0 - 12.0, label, 26.0, color);
    pen.text(w / 2.0, h / 2.0 + 20.0, &format!("Score {score}"), 16.0, INK);
}

/// Build the widget for `kind`. A quiz uses `bank` when one was loaded.
pub fn build(
    kind: ChallengeKind,
    config: ChallengeConfig,
    seed: u64,
    bank: Option<&QuizBank>,
    gate: CompletionGate,
) -> Box<dyn Widget> {
    use challenge_core::arithmetic::Arithmetic;
    use challenge_core::captcha::Captcha;
    use challenge_core::chess::ChessChallenge;
    use challenge_core::circle::CircleDrawing;
    use challenge_core::click_precision::ClickPrecision;
    use challenge_core::flags::FlagMatch;
    use challenge_core::math_sort::MathSort;
    use challenge_core::memory_match::MemoryMatch;
    use challenge_core::odd_one_out::OddOneOut;
    use challenge_core::pixel_memory::PixelMemory;
    use challenge_core::reflex::Reflex;
    use challenge_core::simon_says::SimonSays;
    use challenge_core::sliding::SlidingPuzzle;
    use challenge_core::tetris::Tetris;

    match kind {
        ChallengeKind::Captcha => Box::new(Shell::<Captcha>::spawn(config, seed, gate)),
        ChallengeKind::Quiz => match bank {
            Some(bank) => Box::new(Shell::spawn_with(config, seed, gate, |rng| {
                Quiz::from_bank(bank, rng)
            })),
            None => Box::new(Shell::<Quiz>::spawn(config, seed, gate)),
        },
        ChallengeKind::Arithmetic => Box::new(Shell::<Arithmetic>::spawn(config, seed, gate)),
        ChallengeKind::CircleDrawing => Box::new(Shell::<CircleDrawing>::spawn(config, seed, gate)),
        ChallengeKind::FlagMatch => Box::new(Shell::<FlagMatch>::spawn(config, seed, gate)),
        ChallengeKind::SlidingPuzzle => Box::new(Shell::<SlidingPuzzle>::spawn(config, seed, gate)),
        ChallengeKind::PixelMemory => Box::new(Shell::<PixelMemory>::spawn(config, seed, gate)),
        ChallengeKind::ChessPuzzle => Box::new(Shell::<ChessChallenge>::spawn(config, seed, gate)),
        ChallengeKind::Tetris => Box::new(Shell::<Tetris>::spawn(config, seed, gate)),
        ChallengeKind::MathSort => Box::new(Shell::<MathSort>::spawn(config, seed, gate)),
        ChallengeKind::OddOneOut => Box::new(Shell::<OddOneOut>::spawn(config, seed, gate)),
        ChallengeKind::FallingBalls => Box::new(Shell::<Reflex>::spawn(config, seed, gate)),
        ChallengeKind::ClickPrecision => {
            Box::new(Shell::<ClickPrecision>::spawn(config, seed, gate))
        }
        ChallengeKind::SimonSays => Box::new(Shell::<SimonSays>::spawn(config, seed, gate)),
        ChallengeKind::MemoryMatch => Box::new(Shell::<MemoryMatch>::spawn(config, seed, gate)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_round_trips_the_center() {
        let layout = Layout::fit(800.0, 600.0, (400.0, 400.0));
        let p = layout.from_screen(400.0, 300.0);
        assert!((p.x - 200.0).abs() < 1e-9);
        assert!((p.y - 200.0).abs() < 1e-9);
    }
}
