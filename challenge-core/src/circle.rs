//! Freehand circularity scoring and the draw-a-circle challenge.

use serde::{Deserialize, Serialize};

use crate::kind::ChallengeKind;
use crate::phase::Phase;
use crate::shell::{Context, Game, Spawn};

/// One pointer sample in drawing-surface coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl From<(f64, f64)> for Point {
    fn from(v: (f64, f64)) -> Self {
        Point { x: v.0, y: v.1 }
    }
}

impl Point {
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Relative weight of each sub-score. Weights are percentages and should
/// sum to 100; `smoothness == 0` skips the smoothness pass entirely.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub radius: f64,
    pub closure: f64,
    pub aspect: f64,
    pub smoothness: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoringProfile {
    pub min_points: usize,
    /// Penalty multiplier on the radius coefficient of variation.
    pub radius_k: f64,
    /// Penalty multiplier on the start/end gap relative to the mean radius.
    pub closure_k: f64,
    /// Direction change (degrees) counted as a sharp turn.
    pub sharp_turn_deg: f64,
    pub weights: Weights,
}

impl ScoringProfile {
    pub const CLASSIC: ScoringProfile = ScoringProfile {
        min_points: 20,
        radius_k: 100.0,
        closure_k: 100.0,
        sharp_turn_deg: 45.0,
        weights: Weights {
            radius: 50.0,
            closure: 25.0,
            aspect: 25.0,
            smoothness: 0.0,
        },
    };

    pub const SMOOTH: ScoringProfile = ScoringProfile {
        min_points: 20,
        radius_k: 120.0,
        closure_k: 100.0,
        sharp_turn_deg: 45.0,
        weights: Weights {
            radius: 50.0,
            closure: 20.0,
            aspect: 20.0,
            smoothness: 10.0,
        },
    };

    pub fn by_name(name: &str) -> Option<ScoringProfile> {
        match name.to_lowercase().as_str() {
            "classic" => Some(Self::CLASSIC),
            "smooth" => Some(Self::SMOOTH),
            _ => None,
        }
    }
}

impl Default for ScoringProfile {
    fn default() -> Self {
        Self::CLASSIC
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub radius: f64,
    pub closure: f64,
    pub aspect: f64,
    pub smoothness: Option<f64>,
    pub total: u32,
}

fn mean(values: impl Iterator<Item = f64>, n: usize) -> f64 {
    values.sum::<f64>() / n as f64
}

/// Share of consecutive segment pairs whose heading changes by more than
/// `threshold_deg`.
fn sharp_turn_ratio(points: &[Point], threshold_deg: f64) -> f64 {
    let headings: Vec<f64> = points
        .windows(2)
        .filter(|w| w[0] != w[1])
        .map(|w| (w[1].y - w[0].y).atan2(w[1].x - w[0].x))
        .collect();
    if headings.len() < 2 {
        return 0.0;
    }
    let threshold = threshold_deg.to_radians();
    let sharp = headings
        .windows(2)
        .filter(|h| {
            let mut d = (h[1] - h[0]).abs();
            if d > std::f64::consts::PI {
                d = 2.0 * std::f64::consts::PI - d;
            }
            d > threshold
        })
        .count();
    sharp as f64 / (headings.len() - 1) as f64
}

/// Score one continuous stroke. Pure: the same points always give the
/// same breakdown.
pub fn score_stroke(points: &[Point], profile: &ScoringProfile) -> Breakdown {
    if points.len() < profile.min_points.max(1) {
        return Breakdown::default();
    }
    let n = points.len();
    let cx = mean(points.iter().map(|p| p.x), n);
    let cy = mean(points.iter().map(|p| p.y), n);
    let center = Point { x: cx, y: cy };

    let radii: Vec<f64> = points.iter().map(|p| p.distance(center)).collect();
    let mean_r = mean(radii.iter().copied(), n);
    if !mean_r.is_finite() || mean_r <= f64::EPSILON {
        return Breakdown::default();
    }
    let variance = mean(radii.iter().map(|r| (r - mean_r).powi(2)), n);
    let std_dev = variance.sqrt();

    let radius = (100.0 - (std_dev / mean_r) * profile.radius_k).max(0.0);

    let gap = points[0].distance(points[n - 1]);
    let closure = (100.0 - (gap / mean_r) * profile.closure_k).max(0.0);

    let max_dx = points.iter().map(|p| (p.x - cx).abs()).fold(0.0, f64::max);
    let max_dy = points.iter().map(|p| (p.y - cy).abs()).fold(0.0, f64::max);
    let aspect = if max_dx.max(max_dy) > 0.0 {
        max_dx.min(max_dy) / max_dx.max(max_dy) * 100.0
    } else {
        0.0
    };

    let w = profile.weights;
    let smoothness = (w.smoothness > 0.0).then(|| {
        (100.0 - sharp_turn_ratio(points, profile.sharp_turn_deg) * 200.0).max(0.0)
    });

    let weighted = radius * w.radius
        + closure * w.closure
        + aspect * w.aspect
        + smoothness.unwrap_or(0.0) * w.smoothness;
    let total = (weighted / 100.0).clamp(0.0, 100.0).round() as u32;

    Breakdown {
        radius,
        closure,
        aspect,
        smoothness,
        total,
    }
}

pub fn circularity(points: &[Point], profile: &ScoringProfile) -> u32 {
    score_stroke(points, profile).total
}

pub const PASS_SCORE: u32 = 70;
pub const MAX_ATTEMPTS: u32 = 3;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CircleEvent {
    PointerDown(Point),
    PointerMove(Point),
    PointerUp,
    /// Discard the scored attempt and start a new stroke at the point.
    Retry(Point),
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawState {
    Idle,
    Drawing(Vec<Point>),
    Scored { points: Vec<Point>, breakdown: Breakdown },
}

#[derive(Clone, Debug)]
pub struct CircleDrawing {
    profile: ScoringProfile,
    state: DrawState,
    attempts: u32,
    best: u32,
}

impl CircleDrawing {
    pub fn new(profile: ScoringProfile) -> Self {
        CircleDrawing {
            profile,
            state: DrawState::Idle,
            attempts: 0,
            best: 0,
        }
    }

    pub fn state(&self) -> &DrawState {
        &self.state
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    pub fn profile(&self) -> &ScoringProfile {
        &self.profile
    }
}

impl Default for CircleDrawing {
    fn default() -> Self {
        Self::new(ScoringProfile::default())
    }
}

impl Game for CircleDrawing {
    type Event = CircleEvent;

    fn kind(&self) -> ChallengeKind {
        ChallengeKind::CircleDrawing
    }

    fn phase(&self) -> Phase {
        match self.state {
            DrawState::Idle => Phase::Idle,
            DrawState::Drawing(_) => Phase::Interacting,
            DrawState::Scored { .. } => Phase::Submitted,
        }
    }

    fn handle(&mut self, event: CircleEvent, ctx: &mut Context<'_, CircleEvent>) {
        let state = std::mem::replace(&mut self.state, DrawState::Idle);
        self.state = match (state, event) {
            (DrawState::Idle, CircleEvent::PointerDown(p)) => DrawState::Drawing(vec![p]),
            (DrawState::Drawing(mut pts), CircleEvent::PointerMove(p)) => {
                pts.push(p);
                DrawState::Drawing(pts)
            }
            (DrawState::Drawing(points), CircleEvent::PointerUp) => {
                let breakdown = score_stroke(&points, &self.profile);
                self.attempts += 1;
                self.best = self.best.max(breakdown.total);
                log::debug!(
                    "circle attempt {} scored {} from {} points",
                    self.attempts,
                    breakdown.total,
                    points.len()
                );
                if breakdown.total >= PASS_SCORE {
                    ctx.finish(true, breakdown.total);
                } else if self.attempts >= MAX_ATTEMPTS {
                    ctx.finish(false, self.best);
                }
                DrawState::Scored { points, breakdown }
            }
            (DrawState::Scored { .. }, CircleEvent::Retry(p)) => DrawState::Drawing(vec![p]),
            (state, _) => state,
        };
    }

    fn partial_score(&self) -> u32 {
        self.best
    }
}

impl Spawn for CircleDrawing {
    fn spawn(_rng: &mut rand::rngs::StdRng) -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(n: usize, r: f64, turns: f64) -> Vec<Point> {
        (0..n)
            .map(|i| {
                let a = turns * 2.0 * std::f64::consts::PI * i as f64 / n as f64;
                Point {
                    x: 200.0 + r * a.cos(),
                    y: 150.0 + r * a.sin(),
                }
            })
            .collect()
    }

    #[test]
    fn too_few_points_score_zero() {
        let pts = ring(19, 50.0, 1.0);
        assert_eq!(circularity(&pts, &ScoringProfile::CLASSIC), 0);
        assert_eq!(circularity(&[], &ScoringProfile::SMOOTH), 0);
    }

    #[test]
    fn identical_points_score_zero() {
        let pts = vec![Point { x: 5.0, y: 5.0 }; 40];
        assert_eq!(circularity(&pts, &ScoringProfile::CLASSIC), 0);
    }

    #[test]
    fn true_circle_scores_high_under_both_profiles() {
        let pts = ring(100, 80.0, 1.0);
        assert!(circularity(&pts, &ScoringProfile::CLASSIC) >= 95);
        let b = score_stroke(&pts, &ScoringProfile::SMOOTH);
        assert!(b.total >= 95);
        assert_eq!(b.smoothness, Some(100.0));
    }

    #[test]
    fn open_arc_loses_closure() {
        let half = ring(60, 80.0, 0.5);
        let b = score_stroke(&half, &ScoringProfile::CLASSIC);
        assert_eq!(b.closure, 0.0);
        assert!(b.total < PASS_SCORE);
    }

    #[test]
    fn flat_ellipse_loses_aspect() {
        let pts: Vec<Point> = ring(100, 80.0, 1.0)
            .into_iter()
            .map(|p| Point {
                x: p.x,
                y: 150.0 + (p.y - 150.0) * 0.25,
            })
            .collect();
        let b = score_stroke(&pts, &ScoringProfile::CLASSIC);
        assert!(b.aspect < 30.0);
    }

    #[test]
    fn zigzag_is_not_smooth() {
        let pts: Vec<Point> = (0..40)
            .map(|i| Point {
                x: i as f64 * 5.0,
                y: if i % 2 == 0 { 0.0 } else { 10.0 },
            })
            .collect();
        let b = score_stroke(&pts, &ScoringProfile::SMOOTH);
        assert_eq!(b.smoothness, Some(0.0));
    }

    #[test]
    fn scoring_is_deterministic() {
        let pts = ring(57, 33.0, 0.9);
        let a = score_stroke(&pts, &ScoringProfile::SMOOTH);
        let b = score_stroke(&pts, &ScoringProfile::SMOOTH);
        assert_eq!(a, b);
    }
}
