//! Math sort: order five arithmetic expressions by value, smallest first.

use std::fmt;

use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::arithmetic::Problem;
use crate::contract::percent;
use crate::kind::ChallengeKind;
use crate::phase::Phase;
use crate::shell::{Context, Game, Spawn};

pub const EXPRESSIONS: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expression(pub Problem);

impl Expression {
    pub fn value(&self) -> u32 {
        self.0.answer()
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.0.a, self.0.op.symbol(), self.0.b)
    }
}

/// `n` expressions with pairwise distinct values, unordered.
pub fn generate(rng: &mut impl Rng, n: usize) -> Vec<Expression> {
    let mut out: Vec<Expression> = Vec::with_capacity(n);
    while out.len() < n {
        let e = Expression(Problem::generate(rng));
        if out.iter().all(|o| o.value() != e.value()) {
            out.push(e);
        }
    }
    // Generation may already be sorted; the player must have work to do.
    while n > 1 && is_sorted(&out) {
        out.shuffle(rng);
    }
    out
}

pub fn is_sorted(items: &[Expression]) -> bool {
    items.windows(2).all(|w| w[0].value() <= w[1].value())
}

/// Number of items already at their sorted position.
pub fn in_place(items: &[Expression]) -> usize {
    let mut sorted: Vec<u32> = items.iter().map(Expression::value).collect();
    sorted.sort_unstable();
    items.iter().zip(sorted).filter(|(e, v)| e.value() == *v).count()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SortEvent {
    Pick(usize),
    Submit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortState {
    Arranging { held: Option<usize> },
    Checked { sorted: bool },
}

#[derive(Clone, Debug)]
pub struct MathSort {
    items: Vec<Expression>,
    swaps: u32,
    state: SortState,
}

impl MathSort {
    pub fn new(items: Vec<Expression>) -> Self {
        MathSort {
            items,
            swaps: 0,
            state: SortState::Arranging { held: None },
        }
    }

    pub fn items(&self) -> &[Expression] {
        &self.items
    }

    pub fn held(&self) -> Option<usize> {
        match self.state {
            SortState::Arranging { held } => held,
            SortState::Checked { .. } => None,
        }
    }

    pub fn swaps(&self) -> u32 {
        self.swaps
    }

    pub fn state(&self) -> SortState {
        self.state
    }
}

impl Spawn for MathSort {
    fn spawn(rng: &mut StdRng) -> Self {
        Self::new(generate(rng, EXPRESSIONS))
    }
}

impl Game for MathSort {
    type Event = SortEvent;

    fn kind(&self) -> ChallengeKind {
        ChallengeKind::MathSort
    }

    fn phase(&self) -> Phase {
        match self.state {
            SortState::Arranging { held: None } if self.swaps == 0 => Phase::Idle,
            SortState::Arranging { .. } => Phase::Interacting,
            SortState::Checked { .. } => Phase::Result,
        }
    }

    fn handle(&mut self, event: SortEvent, ctx: &mut Context<'_, SortEvent>) {
        let SortState::Arranging { held } = self.state else {
            return;
        };
        match event {
            SortEvent::Pick(i) if i < self.items.len() => {
                let held = match held {
                    None => Some(i),
                    Some(j) if j == i => None,
                    Some(j) => {
                        self.items.swap(i, j);
                        self.swaps += 1;
                        None
                    }
                };
                self.state = SortState::Arranging { held };
            }
            SortEvent::Submit => {
                let sorted = is_sorted(&self.items);
                self.state = SortState::Checked { sorted };
                ctx.finish(sorted, self.partial_score());
            }
            _ => {}
        }
    }

    fn partial_score(&self) -> u32 {
        percent(in_place(&self.items), self.items.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arithmetic::Op;
    use rand::SeedableRng;

    fn lit(a: u32, op: Op, b: u32) -> Expression {
        Expression(Problem { a, b, op })
    }

    #[test]
    fn generated_values_are_distinct_and_unsorted() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let items = generate(&mut rng, EXPRESSIONS);
            assert!(!is_sorted(&items));
            for (i, a) in items.iter().enumerate() {
                assert!(items[i + 1..].iter().all(|b| b.value() != a.value()));
            }
        }
    }

    #[test]
    fn in_place_counts_settled_items() {
        let items = vec![lit(1, Op::Add, 1), lit(9, Op::Mul, 9), lit(3, Op::Add, 1)];
        // Values 2, 81, 4: only the first is where it belongs.
        assert_eq!(in_place(&items), 1);
        assert_eq!(lit(10, Op::Sub, 4).to_string(), "10 − 4");
    }
}
