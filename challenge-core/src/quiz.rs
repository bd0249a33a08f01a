//! Multiple-choice quiz over a static or fetched question bank.

use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::constants::ROUND_ADVANCE_MS;
use crate::contract::percent;
use crate::error::{ChallengeError, Result};
use crate::kind::ChallengeKind;
use crate::phase::Phase;
use crate::shell::{Context, Game, Spawn};

pub const QUESTIONS_PER_QUIZ: usize = 5;
pub const PASS_PERCENT: u32 = 60;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub prompt: String,
    pub options: Vec<String>,
    /// Index into `options`.
    pub answer: usize,
}

impl Question {
    fn is_valid(&self) -> bool {
        self.options.len() >= 2 && self.answer < self.options.len()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizBank {
    #[serde(default)]
    pub name: String,
    /// Overrides the default pass mark for quizzes drawn from this bank.
    #[serde(default, rename = "passPercent")]
    pub pass_percent: Option<u32>,
    pub questions: Vec<Question>,
}

const BUILTIN: [(&str, [&str; 4], usize); 10] = [
    ("Which planet is known as the Red Planet?", ["Venus", "Mars", "Jupiter", "Saturn"], 1),
    ("How many legs does a spider have?", ["6", "8", "10", "12"], 1),
    ("What is the boiling point of water at sea level?", ["90°C", "100°C", "110°C", "120°C"], 1),
    ("Which ocean is the largest?", ["Atlantic", "Indian", "Arctic", "Pacific"], 3),
    ("What gas do plants absorb from the air?", ["Oxygen", "Nitrogen", "Carbon dioxide", "Helium"], 2),
    ("How many continents are there?", ["5", "6", "7", "8"], 2),
    ("Which animal is the largest mammal?", ["Elephant", "Blue whale", "Giraffe", "Orca"], 1),
    ("What is 12 × 12?", ["124", "144", "132", "154"], 1),
    ("Which language has the most native speakers?", ["English", "Spanish", "Mandarin", "Hindi"], 2),
    ("How many sides does a hexagon have?", ["5", "6", "7", "8"], 1),
];

impl QuizBank {
    pub fn builtin() -> Self {
        QuizBank {
            name: "general".to_string(),
            pass_percent: None,
            questions: BUILTIN
                .iter()
                .map(|(prompt, options, answer)| Question {
                    prompt: prompt.to_string(),
                    options: options.iter().map(|o| o.to_string()).collect(),
                    answer: *answer,
                })
                .collect(),
        }
    }

    /// Parse a bank, dropping malformed questions. Fails when nothing
    /// usable remains.
    pub fn from_json(text: &str) -> Result<Self> {
        let mut bank: QuizBank = serde_json::from_str(text)?;
        let before = bank.questions.len();
        bank.questions.retain(Question::is_valid);
        if bank.questions.len() != before {
            log::warn!(
                "quiz bank '{}': dropped {} malformed questions",
                bank.name,
                before - bank.questions.len()
            );
        }
        if bank.questions.is_empty() {
            return Err(ChallengeError::EmptyBank(bank.name));
        }
        Ok(bank)
    }

    /// Up to `n` distinct questions in random order.
    pub fn pick(&self, n: usize, rng: &mut impl Rng) -> Vec<Question> {
        self.questions.choose_multiple(rng, n).cloned().collect()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum QuizEvent {
    Choose(usize),
    Advance,
}

#[derive(Clone, Debug, PartialEq)]
pub enum QuizState {
    Asking,
    Answered { choice: usize, correct: bool },
    Done,
}

#[derive(Clone, Debug)]
pub struct Quiz {
    questions: Vec<Question>,
    index: usize,
    correct: usize,
    state: QuizState,
    pass_percent: u32,
}

impl Quiz {
    pub fn new(questions: Vec<Question>) -> Self {
        Quiz {
            questions,
            index: 0,
            correct: 0,
            state: QuizState::Asking,
            pass_percent: PASS_PERCENT,
        }
    }

    pub fn from_bank(bank: &QuizBank, rng: &mut impl Rng) -> Self {
        let quiz = Self::new(bank.pick(QUESTIONS_PER_QUIZ, rng));
        match bank.pass_percent {
            Some(pass) => quiz.with_pass_percent(pass),
            None => quiz,
        }
    }

    pub fn with_pass_percent(mut self, pass_percent: u32) -> Self {
        self.pass_percent = pass_percent.min(100);
        self
    }

    pub fn current(&self) -> Option<&Question> {
        self.questions.get(self.index)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn correct(&self) -> usize {
        self.correct
    }

    pub fn state(&self) -> &QuizState {
        &self.state
    }

    fn score(&self) -> u32 {
        percent(self.correct, self.questions.len())
    }
}

impl Spawn for Quiz {
    fn spawn(rng: &mut StdRng) -> Self {
        Self::from_bank(&QuizBank::builtin(), rng)
    }
}

impl Game for Quiz {
    type Event = QuizEvent;

    fn kind(&self) -> ChallengeKind {
        ChallengeKind::Quiz
    }

    fn phase(&self) -> Phase {
        match self.state {
            QuizState::Asking if self.index == 0 => Phase::Idle,
            QuizState::Asking => Phase::Interacting,
            QuizState::Answered { .. } => Phase::Submitted,
            QuizState::Done => Phase::Result,
        }
    }

    fn start(&mut self, ctx: &mut Context<'_, QuizEvent>) {
        if self.questions.is_empty() {
            self.state = QuizState::Done;
            ctx.finish(false, 0);
        }
    }

    fn handle(&mut self, event: QuizEvent, ctx: &mut Context<'_, QuizEvent>) {
        match (&self.state, event) {
            (QuizState::Asking, QuizEvent::Choose(choice)) => {
                let Some(q) = self.current() else {
                    return;
                };
                if choice >= q.options.len() {
                    return;
                }
                let correct = choice == q.answer;
                if correct {
                    self.correct += 1;
                }
                self.state = QuizState::Answered { choice, correct };
                ctx.after(ROUND_ADVANCE_MS, QuizEvent::Advance);
            }
            (QuizState::Answered { .. }, QuizEvent::Advance) => {
                self.index += 1;
                if self.index >= self.questions.len() {
                    self.state = QuizState::Done;
                    let score = self.score();
                    ctx.finish(score >= self.pass_percent, score);
                } else {
                    self.state = QuizState::Asking;
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
    fn builtin_bank_is_well_formed() {
        let bank = QuizBank::builtin();
        assert!(bank.questions.iter().all(Question::is_valid));
        let mut rng = StdRng::seed_from_u64(1);
        let picked = bank.pick(QUESTIONS_PER_QUIZ, &mut rng);
        assert_eq!(picked.len(), QUESTIONS_PER_QUIZ);
        for (i, a) in picked.iter().enumerate() {
            assert!(picked[i + 1..].iter().all(|b| b.prompt != a.prompt));
        }
    }

    #[test]
    fn json_bank_drops_bad_questions() {
        let text = r#"{
            "name": "tiny",
            "questions": [
                {"prompt": "ok?", "options": ["yes", "no"], "answer": 0},
                {"prompt": "broken", "options": ["a", "b"], "answer": 5}
            ]
        }"#;
        let bank = QuizBank::from_json(text).unwrap();
        assert_eq!(bank.questions.len(), 1);
    }

    #[test]
    fn empty_bank_is_an_error() {
        let err = QuizBank::from_json(r#"{"name":"none","questions":[]}"#).unwrap_err();
        assert!(matches!(err, ChallengeError::EmptyBank(name) if name == "none"));
        assert!(QuizBank::from_json("not json").is_err());
    }
}
