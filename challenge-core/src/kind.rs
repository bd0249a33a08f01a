use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ChallengeError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChallengeKind {
    Captcha,
    Quiz,
    Arithmetic,
    CircleDrawing,
    FlagMatch,
    SlidingPuzzle,
    PixelMemory,
    ChessPuzzle,
    Tetris,
    MathSort,
    OddOneOut,
    FallingBalls,
    ClickPrecision,
    SimonSays,
    MemoryMatch,
}

impl ChallengeKind {
    pub const ALL: [ChallengeKind; 15] = [
        ChallengeKind::Captcha,
        ChallengeKind::Quiz,
        ChallengeKind::Arithmetic,
        ChallengeKind::CircleDrawing,
        ChallengeKind::FlagMatch,
        ChallengeKind::SlidingPuzzle,
        ChallengeKind::PixelMemory,
        ChallengeKind::ChessPuzzle,
        ChallengeKind::Tetris,
        ChallengeKind::MathSort,
        ChallengeKind::OddOneOut,
        ChallengeKind::FallingBalls,
        ChallengeKind::ClickPrecision,
        ChallengeKind::SimonSays,
        ChallengeKind::MemoryMatch,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            ChallengeKind::Captcha => "captcha",
            ChallengeKind::Quiz => "quiz",
            ChallengeKind::Arithmetic => "arithmetic",
            ChallengeKind::CircleDrawing => "circle-drawing",
            ChallengeKind::FlagMatch => "flag-match",
            ChallengeKind::SlidingPuzzle => "sliding-puzzle",
            ChallengeKind::PixelMemory => "pixel-memory",
            ChallengeKind::ChessPuzzle => "chess-puzzle",
            ChallengeKind::Tetris => "tetris",
            ChallengeKind::MathSort => "math-sort",
            ChallengeKind::OddOneOut => "odd-one-out",
            ChallengeKind::FallingBalls => "falling-balls",
            ChallengeKind::ClickPrecision => "click-precision",
            ChallengeKind::SimonSays => "simon-says",
            ChallengeKind::MemoryMatch => "memory-match",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ChallengeKind::Captcha => "Prove You're Human",
            ChallengeKind::Quiz => "Quick Quiz",
            ChallengeKind::Arithmetic => "Simple Math",
            ChallengeKind::CircleDrawing => "Draw a Perfect Circle",
            ChallengeKind::FlagMatch => "Flag Match",
            ChallengeKind::SlidingPuzzle => "Sliding Puzzle",
            ChallengeKind::PixelMemory => "Pixel Memory",
            ChallengeKind::ChessPuzzle => "Mate in One",
            ChallengeKind::Tetris => "Tetris",
            ChallengeKind::MathSort => "Sort the Sums",
            ChallengeKind::OddOneOut => "Odd One Out",
            ChallengeKind::FallingBalls => "Catch the Balls",
            ChallengeKind::ClickPrecision => "Click Precision",
            ChallengeKind::SimonSays => "Simon Says",
            ChallengeKind::MemoryMatch => "Memory Match",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ChallengeKind::Captcha => "Select every tile that matches the prompt, then verify.",
            ChallengeKind::Quiz => "Answer the multiple-choice questions.",
            ChallengeKind::Arithmetic => "Type the answer and press Enter.",
            ChallengeKind::CircleDrawing => "Draw a circle in one stroke. Score 70 or more to pass.",
            ChallengeKind::FlagMatch => "Pair each flag with its country, then submit.",
            ChallengeKind::SlidingPuzzle => "Slide the tiles into order 1 to 8.",
            ChallengeKind::PixelMemory => "Memorize the pattern, then paint it from memory.",
            ChallengeKind::ChessPuzzle => "Find the single move that delivers checkmate.",
            ChallengeKind::Tetris => "Clear 10 lines or reach 5000 points.",
            ChallengeKind::MathSort => "Order the expressions from smallest to largest value.",
            ChallengeKind::OddOneOut => "Pick the item that does not belong.",
            ChallengeKind::FallingBalls => "Click the balls before they hit the floor.",
            ChallengeKind::ClickPrecision => "Click as close to the center of each target as you can.",
            ChallengeKind::SimonSays => "Repeat the color sequence.",
            ChallengeKind::MemoryMatch => "Flip two cards at a time and find every pair.",
        }
    }
}

impl fmt::Display for ChallengeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ChallengeKind {
    type Err = ChallengeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase().replace('_', "-");
        ChallengeKind::ALL
            .into_iter()
            .find(|k| k.slug() == needle)
            .ok_or_else(|| ChallengeError::UnknownKind(s.to_string()))
    }
}
