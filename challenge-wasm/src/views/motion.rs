//! Pointer-driven challenges: circle drawing, falling balls, click precision
//! and Simon says.

use challenge_core::circle::{CircleDrawing, CircleEvent, DrawState, PASS_SCORE, Point};
use challenge_core::click_precision::{self, ClickPrecision, PrecisionEvent};
use challenge_core::palette::color_hex;
use challenge_core::reflex::{self, Reflex, ReflexEvent};
use challenge_core::simon_says::{PADS, SimonEvent, SimonSays, SimonState, pad_color, pad_name};

use super::{Pointer, View};
use crate::canvas::{CellGrid, Pen};
use crate::constants::{ACCENT, BAD, GOOD, INK, MUTED, PANEL};

impl View for CircleDrawing {
    const SIZE: (f64, f64) = (400.0, 440.0);

    fn pointer(&self, kind: Pointer, at: Point) -> Option<CircleEvent> {
        match (self.state(), kind) {
            (DrawState::Idle, Pointer::Down) => Some(CircleEvent::PointerDown(at)),
            (DrawState::Drawing(_), Pointer::Move) => Some(CircleEvent::PointerMove(at)),
            (DrawState::Drawing(_), Pointer::Up) => Some(CircleEvent::PointerUp),
            (DrawState::Scored { .. }, Pointer::Down) => Some(CircleEvent::Retry(at)),
            _ => None,
        }
    }

    fn draw(&self, pen: &Pen, _now_ms: u64) {
        pen.fill_rect(0.0, 0.0, 400.0, 400.0, PANEL);
        let (points, color) = match self.state() {
            DrawState::Idle => {
                pen.text(200.0, 200.0, "Draw a circle in one stroke", 16.0, MUTED);
                return;
            }
            DrawState::Drawing(points) => (points, ACCENT),
            DrawState::Scored { points, breakdown } => {
                let color = if breakdown.total >= PASS_SCORE { GOOD } else { BAD };
                pen.bold_text(200.0, 200.0, &format!("{}%", breakdown.total), 44.0, color);
                pen.text(200.0, 420.0, "Click to try again", 13.0, MUTED);
                (points, color)
            }
        };
        let pts: Vec<(f64, f64)> = points.iter().map(|p| (p.x, p.y)).collect();
        pen.polyline(&pts, color, 4.0);
        let attempts = format!("Attempt {} · best {}", self.attempts(), self.best());
        pen.text(200.0, 16.0, &attempts, 12.0, MUTED);
    }
}

impl View for Reflex {
    const SIZE: (f64, f64) = (reflex::FIELD_WIDTH, reflex::FIELD_HEIGHT);

    fn pointer(&self, kind: Pointer, at: Point) -> Option<ReflexEvent> {
        (kind == Pointer::Down).then_some(ReflexEvent::Click(at))
    }

    fn draw(&self, pen: &Pen, _now_ms: u64) {
        pen.fill_rect(0.0, 0.0, reflex::FIELD_WIDTH, reflex::FIELD_HEIGHT, PANEL);
        pen.fill_rect(0.0, reflex::FIELD_HEIGHT - 4.0, reflex::FIELD_WIDTH, 4.0, INK);
        for ball in self.balls() {
            pen.circle(ball.center.x, ball.center.y, reflex::BALL_RADIUS, &color_hex(ball.color));
        }
        let status = format!(
            "Caught {}  Missed {}  Left {}",
            self.caught(),
            self.missed(),
            reflex::TOTAL_BALLS - self.spawned()
        );
        pen.text(reflex::FIELD_WIDTH / 2.0, 16.0, &status, 14.0, INK);
    }
}

impl View for ClickPrecision {
    const SIZE: (f64, f64) = (click_precision::FIELD_SIZE, click_precision::FIELD_SIZE + 30.0);

    fn pointer(&self, kind: Pointer, at: Point) -> Option<PrecisionEvent> {
        (kind == Pointer::Down && at.y <= click_precision::FIELD_SIZE)
            .then_some(PrecisionEvent::Click(at))
    }

    fn draw(&self, pen: &Pen, _now_ms: u64) {
        let size = click_precision::FIELD_SIZE;
        pen.fill_rect(0.0, 0.0, size, size, PANEL);
        if let Some(t) = self.current() {
            let r = click_precision::TARGET_RADIUS;
            pen.circle(t.x, t.y, r, BAD);
            pen.circle(t.x, t.y, r * 0.66, "#fff");
            pen.circle(t.x, t.y, r * 0.33, BAD);
        }
        let scores: Vec<String> = self.scores().iter().map(u32::to_string).collect();
        let line = format!("Hits: {}  ({} left)", scores.join(" · "), self.remaining());
        pen.text(size / 2.0, size + 15.0, &line, 13.0, INK);
    }
}

const SIMON_PADS: CellGrid = CellGrid {
    origin: (20.0, 50.0),
    cell: 150.0,
    gap: 20.0,
    rows: 2,
    cols: 2,
};

impl View for SimonSays {
    const SIZE: (f64, f64) = (360.0, 400.0);

    fn pointer(&self, kind: Pointer, at: Point) -> Option<SimonEvent> {
        if kind != Pointer::Down || !matches!(self.state(), SimonState::Listening { .. }) {
            return None;
        }
        let (row, col) = SIMON_PADS.hit(at.x, at.y)?;
        Some(SimonEvent::Press(row * 2 + col))
    }

    fn key(&self, key: &str) -> Option<SimonEvent> {
        let d: usize = key.parse().ok()?;
        (1..=PADS).contains(&d).then(|| SimonEvent::Press(d - 1))
    }

    fn draw(&self, pen: &Pen, _now_ms: u64) {
        let caption = match self.state() {
            SimonState::Playback { .. } => "Watch…",
            SimonState::Listening { .. } => "Your turn",
            SimonState::Failed => "Wrong pad",
            SimonState::Won => "Well remembered",
        };
        let header = format!("{caption}   round {}/{}", self.completed() + 1, self.rounds());
        pen.text(180.0, 24.0, &header, 15.0, INK);
        for pad in 0..PADS {
            let r = SIMON_PADS.rect(pad / 2, pad % 2);
            let color = color_hex(pad_color(pad));
            pen.fill_rect(r.x, r.y, r.w, r.h, &color);
            if self.lit() != Some(pad) {
                pen.ctx.set_global_alpha(0.55);
                pen.fill_rect(r.x, r.y, r.w, r.h, "#fff");
                pen.ctx.set_global_alpha(1.0);
            }
            let label = format!("{} {}", pad + 1, pad_name(pad));
            pen.text(r.x + r.w / 2.0, r.y + r.h - 14.0, &label, 12.0, INK);
        }
    }
}
