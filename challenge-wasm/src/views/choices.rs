//! Click-to-answer challenges: captcha, quiz, arithmetic, flags, math sort,
//! odd one out.

use challenge_core::arithmetic::{Arithmetic, ArithmeticEvent, ArithmeticState};
use challenge_core::captcha::{Captcha, CaptchaEvent, CaptchaState};
use challenge_core::circle::Point;
use challenge_core::flags::{FlagEvent, FlagMatch, FlagState, Stripes};
use challenge_core::math_sort::{MathSort, SortEvent};
use challenge_core::odd_one_out::{OddEvent, OddOneOut, OddState};
use challenge_core::quiz::{Quiz, QuizEvent, QuizState};

use super::{Pointer, View};
use crate::canvas::{CellGrid, Pen, Rect};
use crate::constants::{ACCENT, BAD, BUTTON, GOOD, INK, MUTED, PANEL, SELECTED};

fn down(kind: Pointer) -> bool {
    kind == Pointer::Down
}

/// Index of the first rect containing `at`.
fn hit(rects: impl IntoIterator<Item = Rect>, at: Point) -> Option<usize> {
    rects.into_iter().position(|r| r.contains(at.x, at.y))
}

/// Digit keys `1..=n` select option `0..n`.
fn numbered_key(key: &str, n: usize) -> Option<usize> {
    let d: usize = key.parse().ok()?;
    (1..=n).contains(&d).then(|| d - 1)
}

const CAPTCHA_GRID: CellGrid = CellGrid {
    origin: (20.0, 60.0),
    cell: 100.0,
    gap: 10.0,
    rows: 3,
    cols: 3,
};
const CAPTCHA_VERIFY: Rect = Rect::new(20.0, 392.0, 320.0, 38.0);

impl View for Captcha {
    const SIZE: (f64, f64) = (360.0, 450.0);

    fn pointer(&self, kind: Pointer, at: Point) -> Option<CaptchaEvent> {
        if !down(kind) {
            return None;
        }
        if CAPTCHA_VERIFY.contains(at.x, at.y) {
            return Some(CaptchaEvent::Verify);
        }
        let (row, col) = CAPTCHA_GRID.hit(at.x, at.y)?;
        Some(CaptchaEvent::Toggle(row * 3 + col))
    }

    fn key(&self, key: &str) -> Option<CaptchaEvent> {
        if key == "Enter" {
            return Some(CaptchaEvent::Verify);
        }
        numbered_key(key, self.grid().tiles.len()).map(CaptchaEvent::Toggle)
    }

    fn draw(&self, pen: &Pen, _now_ms: u64) {
        let grid = self.grid();
        pen.fill_rect(0.0, 0.0, 360.0, 48.0, ACCENT);
        pen.text(180.0, 24.0, &grid.prompt, 15.0, "#fff");
        let selected: &[bool] = match self.state() {
            CaptchaState::Selecting { selected } => selected,
            _ => &[],
        };
        for (i, tile) in grid.tiles.iter().enumerate() {
            let r = CAPTCHA_GRID.rect(i / 3, i % 3);
            pen.fill_rect(r.x, r.y, r.w, r.h, PANEL);
            pen.text(r.x + r.w / 2.0, r.y + r.h / 2.0, &tile.label, 48.0, INK);
            if selected.get(i).copied().unwrap_or(false) {
                pen.stroke_rect(r.x + 2.0, r.y + 2.0, r.w - 4.0, r.h - 4.0, ACCENT, 4.0);
                pen.circle(r.x + 14.0, r.y + 14.0, 9.0, ACCENT);
            } else {
                pen.stroke_rect(r.x, r.y, r.w, r.h, "#ccc", 1.0);
            }
        }
        match self.state() {
            CaptchaState::Rejected => pen.text(180.0, 411.0, "Please try again.", 16.0, BAD),
            CaptchaState::Accepted => pen.text(180.0, 411.0, "Verified", 16.0, GOOD),
            CaptchaState::Selecting { .. } => pen.button(CAPTCHA_VERIFY, "Verify", BUTTON),
        }
    }
}

fn option_rects(n: usize) -> impl Iterator<Item = Rect> {
    (0..n).map(|i| Rect::new(20.0, 110.0 + i as f64 * 58.0, 360.0, 48.0))
}

impl View for Quiz {
    const SIZE: (f64, f64) = (400.0, 380.0);

    fn pointer(&self, kind: Pointer, at: Point) -> Option<QuizEvent> {
        if !down(kind) {
            return None;
        }
        let q = self.current()?;
        hit(option_rects(q.options.len()), at).map(QuizEvent::Choose)
    }

    fn key(&self, key: &str) -> Option<QuizEvent> {
        numbered_key(key, self.current()?.options.len()).map(QuizEvent::Choose)
    }

    fn draw(&self, pen: &Pen, _now_ms: u64) {
        let Some(q) = self.current() else {
            return;
        };
        pen.text(200.0, 22.0, &format!("Question {} of {}", self.index() + 1, self.len()), 13.0, MUTED);
        pen.bold_text(200.0, 62.0, &q.prompt, 17.0, INK);
        for (i, r) in option_rects(q.options.len()).enumerate() {
            let fill = match self.state() {
                QuizState::Answered { .. } if i == q.answer => GOOD,
                QuizState::Answered { choice, correct: false } if *choice == i => BAD,
                _ => BUTTON,
            };
            pen.button(r, &format!("{}. {}", i + 1, q.options[i]), fill);
        }
    }
}

const KEYPAD: CellGrid = CellGrid {
    origin: (60.0, 130.0),
    cell: 72.0,
    gap: 8.0,
    rows: 4,
    cols: 3,
};
/// Row-major keypad labels; `⌫` deletes, `OK` submits.
const KEYS: [&str; 12] = ["7", "8", "9", "4", "5", "6", "1", "2", "3", "⌫", "0", "OK"];

fn keypad_event(label: &str) -> Option<ArithmeticEvent> {
    match label {
        "⌫" | "Backspace" => Some(ArithmeticEvent::Backspace),
        "OK" | "Enter" => Some(ArithmeticEvent::Submit),
        d => d.parse::<u8>().ok().filter(|d| *d <= 9).map(ArithmeticEvent::Digit),
    }
}

impl View for Arithmetic {
    const SIZE: (f64, f64) = (360.0, 460.0);

    fn pointer(&self, kind: Pointer, at: Point) -> Option<ArithmeticEvent> {
        if !down(kind) {
            return None;
        }
        let (row, col) = KEYPAD.hit(at.x, at.y)?;
        keypad_event(KEYS[row * 3 + col])
    }

    fn key(&self, key: &str) -> Option<ArithmeticEvent> {
        keypad_event(key)
    }

    fn draw(&self, pen: &Pen, _now_ms: u64) {
        let Some(problem) = self.current() else {
            return;
        };
        pen.text(180.0, 20.0, &format!("Round {} of {}", self.round() + 1, self.rounds()), 13.0, MUTED);
        pen.bold_text(180.0, 60.0, &problem.to_string(), 30.0, INK);
        let color = match self.state() {
            ArithmeticState::Checked { correct: true } => GOOD,
            ArithmeticState::Checked { correct: false } => BAD,
            _ => INK,
        };
        let shown = if self.input().is_empty() { "_" } else { self.input() };
        pen.fill_rect(110.0, 88.0, 140.0, 34.0, PANEL);
        pen.text(180.0, 105.0, shown, 24.0, color);
        for (i, label) in KEYS.iter().enumerate() {
            pen.button(KEYPAD.rect(i / 3, i % 3), label, BUTTON);
        }
    }
}

fn flag_rect(i: usize) -> Rect {
    Rect::new(20.0, 50.0 + i as f64 * 80.0, 120.0, 64.0)
}

fn name_rect(i: usize) -> Rect {
    Rect::new(240.0, 62.0 + i as f64 * 80.0, 160.0, 40.0)
}

const FLAG_SUBMIT: Rect = Rect::new(130.0, 380.0, 160.0, 36.0);

impl View for FlagMatch {
    const SIZE: (f64, f64) = (420.0, 430.0);

    fn pointer(&self, kind: Pointer, at: Point) -> Option<FlagEvent> {
        if !down(kind) {
            return None;
        }
        if FLAG_SUBMIT.contains(at.x, at.y) {
            return Some(FlagEvent::Submit);
        }
        if let Some(i) = hit((0..self.flags().len()).map(flag_rect), at) {
            return Some(FlagEvent::SelectFlag(i));
        }
        hit((0..self.names().len()).map(name_rect), at).map(FlagEvent::SelectName)
    }

    fn draw(&self, pen: &Pen, _now_ms: u64) {
        pen.text(210.0, 22.0, "Match each flag to its country", 15.0, INK);
        for (i, flag) in self.flags().iter().enumerate() {
            let r = flag_rect(i);
            let n = flag.colors.len() as f64;
            for (k, [red, green, blue]) in flag.colors.iter().enumerate() {
                let color = format!("rgb({red},{green},{blue})");
                match flag.stripes {
                    Stripes::Vertical => {
                        pen.fill_rect(r.x + k as f64 * r.w / n, r.y, r.w / n, r.h, &color)
                    }
                    Stripes::Horizontal => {
                        pen.fill_rect(r.x, r.y + k as f64 * r.h / n, r.w, r.h / n, &color)
                    }
                }
            }
            let outline = if self.selected() == Some(i) { ACCENT } else { "#333" };
            pen.stroke_rect(r.x, r.y, r.w, r.h, outline, if outline == ACCENT { 4.0 } else { 1.0 });
            if let Some(n) = self.pair_of(i) {
                let to = name_rect(n);
                pen.polyline(
                    &[(r.x + r.w, r.y + r.h / 2.0), (to.x, to.y + to.h / 2.0)],
                    ACCENT,
                    2.0,
                );
            }
        }
        for (i, name) in self.names().iter().enumerate() {
            pen.button(name_rect(i), name, BUTTON);
        }
        if let FlagState::Pairing { .. } = self.state()
            && self.is_complete()
        {
            pen.button(FLAG_SUBMIT, "Submit", SELECTED);
        }
    }
}

fn sort_rect(i: usize) -> Rect {
    Rect::new(60.0, 50.0 + i as f64 * 56.0, 240.0, 46.0)
}

const SORT_SUBMIT: Rect = Rect::new(100.0, 340.0, 160.0, 36.0);

impl View for MathSort {
    const SIZE: (f64, f64) = (360.0, 400.0);

    fn pointer(&self, kind: Pointer, at: Point) -> Option<SortEvent> {
        if !down(kind) {
            return None;
        }
        if SORT_SUBMIT.contains(at.x, at.y) {
            return Some(SortEvent::Submit);
        }
        hit((0..self.items().len()).map(sort_rect), at).map(SortEvent::Pick)
    }

    fn key(&self, key: &str) -> Option<SortEvent> {
        if key == "Enter" {
            return Some(SortEvent::Submit);
        }
        numbered_key(key, self.items().len()).map(SortEvent::Pick)
    }

    fn draw(&self, pen: &Pen, _now_ms: u64) {
        pen.text(180.0, 22.0, "Smallest at the top. Click two to swap.", 14.0, INK);
        for (i, e) in self.items().iter().enumerate() {
            let fill = if self.held() == Some(i) { SELECTED } else { BUTTON };
            pen.button(sort_rect(i), &e.to_string(), fill);
        }
        pen.button(SORT_SUBMIT, "Submit", PANEL);
    }
}

const ODD_GRID: CellGrid = CellGrid {
    origin: (30.0, 60.0),
    cell: 140.0,
    gap: 20.0,
    rows: 2,
    cols: 2,
};

impl View for OddOneOut {
    const SIZE: (f64, f64) = (360.0, 380.0);

    fn pointer(&self, kind: Pointer, at: Point) -> Option<OddEvent> {
        if !down(kind) {
            return None;
        }
        let (row, col) = ODD_GRID.hit(at.x, at.y)?;
        Some(OddEvent::Pick(row * 2 + col))
    }

    fn key(&self, key: &str) -> Option<OddEvent> {
        numbered_key(key, self.current()?.items.len()).map(OddEvent::Pick)
    }

    fn draw(&self, pen: &Pen, _now_ms: u64) {
        let Some(round) = self.current() else {
            return;
        };
        pen.text(180.0, 24.0, &format!("Which one does not belong?  ({}/3)", self.round() + 1), 15.0, INK);
        for (i, item) in round.items.iter().enumerate() {
            let r = ODD_GRID.rect(i / 2, i % 2);
            let fill = match self.state() {
                OddState::Revealed { .. } if i == round.outlier => GOOD,
                OddState::Revealed { picked, correct: false } if picked == i => BAD,
                _ => BUTTON,
            };
            pen.button(r, item, fill);
        }
        if let OddState::Revealed { .. } = self.state() {
            pen.text(180.0, 360.0, &format!("The others are all {}s", round.theme), 14.0, MUTED);
        }
    }
}
