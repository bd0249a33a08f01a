//! Simple mental arithmetic: five generated `a op b` questions, typed answers.

use std::fmt;

use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::constants::ROUND_ADVANCE_MS;
use crate::contract::percent;
use crate::kind::ChallengeKind;
use crate::phase::Phase;
use crate::shell::{Context, Game, Spawn};

pub const ROUNDS: usize = 5;
pub const PASS_PERCENT: u32 = 80;
pub const MAX_DIGITS: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    Add,
    Sub,
    Mul,
}

impl Op {
    pub fn symbol(self) -> char {
        match self {
            Op::Add => '+',
            Op::Sub => '−',
            Op::Mul => '×',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub a: u32,
    pub b: u32,
    pub op: Op,
}

impl Problem {
    pub fn answer(&self) -> u32 {
        match self.op {
            Op::Add => self.a + self.b,
            Op::Sub => self.a - self.b,
            Op::Mul => self.a * self.b,
        }
    }

    /// Subtraction never goes negative; products stay within the times table.
    pub fn generate(rng: &mut impl Rng) -> Self {
        match rng.random_range(0..3) {
            0 => Problem {
                a: rng.random_range(2..=50),
                b: rng.random_range(2..=50),
                op: Op::Add,
            },
            1 => {
                let a = rng.random_range(10..=60);
                Problem {
                    a,
                    b: rng.random_range(1..=a),
                    op: Op::Sub,
                }
            }
            _ => Problem {
                a: rng.random_range(2..=12),
                b: rng.random_range(2..=12),
                op: Op::Mul,
            },
        }
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} = ?", self.a, self.op.symbol(), self.b)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ArithmeticEvent {
    Digit(u8),
    Backspace,
    Submit,
    Advance,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ArithmeticState {
    Typing,
    Checked { correct: bool },
    Done,
}

#[derive(Clone, Debug)]
pub struct Arithmetic {
    problems: Vec<Problem>,
    index: usize,
    input: String,
    correct: usize,
    state: ArithmeticState,
}

impl Arithmetic {
    pub fn new(problems: Vec<Problem>) -> Self {
        Arithmetic {
            problems,
            index: 0,
            input: String::new(),
            correct: 0,
            state: ArithmeticState::Typing,
        }
    }

    pub fn current(&self) -> Option<&Problem> {
        self.problems.get(self.index)
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn round(&self) -> usize {
        self.index
    }

    pub fn rounds(&self) -> usize {
        self.problems.len()
    }

    pub fn state(&self) -> &ArithmeticState {
        &self.state
    }

    fn score(&self) -> u32 {
        percent(self.correct, self.problems.len())
    }
}

impl Spawn for Arithmetic {
    fn spawn(rng: &mut StdRng) -> Self {
        Self::new((0..ROUNDS).map(|_| Problem::generate(rng)).collect())
    }
}

impl Game for Arithmetic {
    type Event = ArithmeticEvent;

    fn kind(&self) -> ChallengeKind {
        ChallengeKind::Arithmetic
    }

    fn phase(&self) -> Phase {
        match self.state {
            ArithmeticState::Typing if self.index == 0 && self.input.is_empty() => Phase::Idle,
            ArithmeticState::Typing => Phase::Interacting,
            ArithmeticState::Checked { .. } => Phase::Submitted,
            ArithmeticState::Done => Phase::Result,
        }
    }

    fn handle(&mut self, event: ArithmeticEvent, ctx: &mut Context<'_, ArithmeticEvent>) {
        match (&self.state, event) {
            (ArithmeticState::Typing, ArithmeticEvent::Digit(d)) => {
                if d <= 9 && self.input.len() < MAX_DIGITS {
                    self.input.push(char::from(b'0' + d));
                }
            }
            (ArithmeticState::Typing, ArithmeticEvent::Backspace) => {
                self.input.pop();
            }
            (ArithmeticState::Typing, ArithmeticEvent::Submit) => {
                let Some(problem) = self.current() else {
                    return;
                };
                // Empty input is not an answer yet.
                let Ok(value) = self.input.parse::<u32>() else {
                    return;
                };
                let correct = value == problem.answer();
                if correct {
                    self.correct += 1;
                }
                self.state = ArithmeticState::Checked { correct };
                ctx.after(ROUND_ADVANCE_MS, ArithmeticEvent::Advance);
            }
            (ArithmeticState::Checked { .. }, ArithmeticEvent::Advance) => {
                self.index += 1;
                self.input.clear();
                if self.index >= self.problems.len() {
                    self.state = ArithmeticState::Done;
                    let score = self.score();
                    ctx.finish(score >= PASS_PERCENT, score);
                } else {
                    self.state = ArithmeticState::Typing;
                }
            }
            _ => {}
        }
    }

    fn partial_score(&self) -> u32 {
        self.score()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn generated_problems_have_natural_answers() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let p = Problem::generate(&mut rng);
            if p.op == Op::Sub {
                assert!(p.a >= p.b);
            }
            if p.op == Op::Mul {
                assert!(p.answer() <= 144);
            }
        }
    }

    #[test]
    fn display_reads_like_a_question() {
        let p = Problem { a: 7, b: 6, op: Op::Mul };
        assert_eq!(p.to_string(), "7 × 6 = ?");
        assert_eq!(p.answer(), 42);
    }
}
