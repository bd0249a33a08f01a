//! Falling-ball reflex test: click the balls before they reach the floor.

use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::circle::Point;
use crate::kind::ChallengeKind;
use crate::phase::Phase;
use crate::shell::{Context, Game, Spawn};

pub const FIELD_WIDTH: f64 = 400.0;
pub const FIELD_HEIGHT: f64 = 600.0;
pub const FRAME_MS: u64 = 16;
pub const SPAWN_MS: u64 = 900;
pub const TOTAL_BALLS: u32 = 10;
pub const BALL_RADIUS: f64 = 24.0;
/// Fall speed range in px/s.
pub const MIN_SPEED: f64 = 150.0;
pub const MAX_SPEED: f64 = 250.0;
pub const PASS_CAUGHT: u32 = 7;
pub const POINTS_PER_CATCH: u32 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub center: Point,
    pub speed: f64,
    pub color: usize,
}

impl Ball {
    pub fn contains(&self, p: Point) -> bool {
        self.center.distance(p) <= BALL_RADIUS
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ReflexEvent {
    Frame,
    Drop,
    Click(Point),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReflexState {
    Waiting,
    Running,
    Over,
}

#[derive(Clone, Debug)]
pub struct Reflex {
    balls: Vec<Ball>,
    spawned: u32,
    caught: u32,
    missed: u32,
    last_frame_ms: u64,
    state: ReflexState,
}

impl Default for Reflex {
    fn default() -> Self {
        Self::new()
    }
}

impl Reflex {
    pub fn new() -> Self {
        Reflex {
            balls: Vec::new(),
            spawned: 0,
            caught: 0,
            missed: 0,
            last_frame_ms: 0,
            state: ReflexState::Waiting,
        }
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn caught(&self) -> u32 {
        self.caught
    }

    pub fn missed(&self) -> u32 {
        self.missed
    }

    pub fn spawned(&self) -> u32 {
        self.spawned
    }

    pub fn state(&self) -> ReflexState {
        self.state
    }

    fn drop_ball(&mut self, ctx: &mut Context<'_, ReflexEvent>) {
        if self.spawned >= TOTAL_BALLS {
            return;
        }
        let rng = ctx.rng();
        let x = rng.random_range(BALL_RADIUS..=FIELD_WIDTH - BALL_RADIUS);
        let speed = rng.random_range(MIN_SPEED..=MAX_SPEED);
        self.balls.push(Ball {
            center: Point { x, y: -BALL_RADIUS },
            speed,
            color: self.spawned as usize,
        });
        self.spawned += 1;
    }

    fn advance(&mut self, now_ms: u64) {
        let dt = now_ms.saturating_sub(self.last_frame_ms) as f64 / 1000.0;
        self.last_frame_ms = now_ms;
        for ball in &mut self.balls {
            ball.center.y += ball.speed * dt;
        }
        let before = self.balls.len();
        self.balls.retain(|b| b.center.y + BALL_RADIUS < FIELD_HEIGHT);
        self.missed += (before - self.balls.len()) as u32;
    }

    fn settle(&mut self, ctx: &mut Context<'_, ReflexEvent>) {
        if self.spawned >= TOTAL_BALLS && self.balls.is_empty() {
            self.state = ReflexState::Over;
            ctx.finish(self.caught >= PASS_CAUGHT, self.partial_score());
        }
    }
}

impl Spawn for Reflex {
    fn spawn(_rng: &mut StdRng) -> Self {
        Self::new()
    }
}

impl Game for Reflex {
    type Event = ReflexEvent;

    fn kind(&self) -> ChallengeKind {
        ChallengeKind::FallingBalls
    }

    fn phase(&self) -> Phase {
        match self.state {
            ReflexState::Waiting => Phase::Idle,
            ReflexState::Running => Phase::Interacting,
            ReflexState::Over => Phase::Result,
        }
    }

    fn start(&mut self, ctx: &mut Context<'_, ReflexEvent>) {
        self.state = ReflexState::Running;
        self.last_frame_ms = ctx.now_ms();
        ctx.every(FRAME_MS, ReflexEvent::Frame);
        ctx.every(SPAWN_MS, ReflexEvent::Drop);
        self.drop_ball(ctx);
    }

    fn handle(&mut self, event: ReflexEvent, ctx: &mut Context<'_, ReflexEvent>) {
        if self.state != ReflexState::Running {
            return;
        }
        match event {
            ReflexEvent::Frame => {
                self.advance(ctx.now_ms());
                self.settle(ctx);
            }
            ReflexEvent::Drop => self.drop_ball(ctx),
            ReflexEvent::Click(p) => {
                // Topmost (latest) ball wins when they overlap.
                if let Some(i) = self.balls.iter().rposition(|b| b.contains(p)) {
                    self.balls.remove(i);
                    self.caught += 1;
                    self.settle(ctx);
                }
            }
        }
    }

    fn partial_score(&self) -> u32 {
        self.caught * POINTS_PER_CATCH
    }
}
