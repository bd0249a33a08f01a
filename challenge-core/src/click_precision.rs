//! Click precision: hit five targets as close to their centers as possible.

use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::circle::Point;
use crate::kind::ChallengeKind;
use crate::phase::Phase;
use crate::shell::{Context, Game, Spawn};

pub const FIELD_SIZE: f64 = 400.0;
pub const TARGETS: usize = 5;
pub const TARGET_RADIUS: f64 = 40.0;
pub const PASS_AVERAGE: u32 = 60;

/// 100 at the center, falling linearly to 0 at the rim.
pub fn click_score(target: Point, click: Point) -> u32 {
    let d = target.distance(click);
    (100.0 - d / TARGET_RADIUS * 100.0).max(0.0).round() as u32
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PrecisionEvent {
    Click(Point),
}

#[derive(Clone, Debug)]
pub struct ClickPrecision {
    targets: Vec<Point>,
    scores: Vec<u32>,
}

impl ClickPrecision {
    pub fn new(targets: Vec<Point>) -> Self {
        ClickPrecision {
            targets,
            scores: Vec::new(),
        }
    }

    pub fn random_targets(rng: &mut impl Rng, n: usize) -> Vec<Point> {
        let lo = TARGET_RADIUS;
        let hi = FIELD_SIZE - TARGET_RADIUS;
        (0..n)
            .map(|_| Point {
                x: rng.random_range(lo..=hi),
                y: rng.random_range(lo..=hi),
            })
            .collect()
    }

    /// The target currently on screen, if any remain.
    pub fn current(&self) -> Option<Point> {
        self.targets.get(self.scores.len()).copied()
    }

    pub fn scores(&self) -> &[u32] {
        &self.scores
    }

    pub fn remaining(&self) -> usize {
        self.targets.len() - self.scores.len()
    }

    pub fn average(&self) -> u32 {
        if self.scores.is_empty() {
            return 0;
        }
        self.scores.iter().sum::<u32>() / self.scores.len() as u32
    }
}

impl Spawn for ClickPrecision {
    fn spawn(rng: &mut StdRng) -> Self {
        Self::new(Self::random_targets(rng, TARGETS))
    }
}

impl Game for ClickPrecision {
    type Event = PrecisionEvent;

    fn kind(&self) -> ChallengeKind {
        ChallengeKind::ClickPrecision
    }

    fn phase(&self) -> Phase {
        if self.current().is_none() {
            Phase::Result
        } else if self.scores.is_empty() {
            Phase::Idle
        } else {
            Phase::Interacting
        }
    }

    fn handle(&mut self, event: PrecisionEvent, ctx: &mut Context<'_, PrecisionEvent>) {
        let PrecisionEvent::Click(p) = event;
        let Some(target) = self.current() else {
            return;
        };
        self.scores.push(click_score(target, p));
        if self.current().is_none() {
            let avg = self.average();
            ctx.finish(avg >= PASS_AVERAGE, avg);
        }
    }

    /// Missing clicks count as zero.
    fn partial_score(&self) -> u32 {
        if self.targets.is_empty() {
            return 0;
        }
        self.scores.iter().sum::<u32>() / self.targets.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_falls_off_with_distance() {
        let c = Point { x: 100.0, y: 100.0 };
        assert_eq!(click_score(c, c), 100);
        assert_eq!(click_score(c, Point { x: 120.0, y: 100.0 }), 50);
        assert_eq!(click_score(c, Point { x: 300.0, y: 100.0 }), 0);
    }

    #[test]
    fn targets_stay_inside_the_field() {
        use rand::SeedableRng;
        let mut rng = StdRng::seed_from_u64(8);
        for t in ClickPrecision::random_targets(&mut rng, 50) {
            assert!(t.x >= TARGET_RADIUS && t.x <= FIELD_SIZE - TARGET_RADIUS);
            assert!(t.y >= TARGET_RADIUS && t.y <= FIELD_SIZE - TARGET_RADIUS);
        }
    }
}
