//! Game logic for the browser mini-challenges.
//!
//! Every challenge is a [`Game`](shell::Game): a small state machine driven
//! by input events and by timers it schedules through its
//! [`Context`](shell::Context). The [`Shell`](shell::Shell) owns the timer
//! queue, the optional countdown and the host completion callback, which it
//! fires exactly once. Nothing here touches the DOM; the wasm front-end and
//! the native tool both drive the same code.
//!
//! The algorithmic cores live in [`circle`] (stroke circularity),
//! [`sliding`] (8-puzzle solvability), [`chess`] (move generation) and
//! [`tetris`] (the step function).

pub mod arithmetic;
pub mod captcha;
pub mod chess;
pub mod circle;
pub mod click_precision;
pub mod constants;
pub mod contract;
pub mod error;
pub mod flags;
pub mod kind;
pub mod math_sort;
pub mod memory_match;
pub mod odd_one_out;
pub mod palette;
pub mod phase;
pub mod pixel_memory;
pub mod quiz;
pub mod reflex;
pub mod scheduler;
pub mod session;
pub mod shell;
pub mod simon_says;
pub mod sliding;
pub mod tetris;

pub use contract::{ChallengeConfig, ChallengeResult, CompletionGate, Outcome};
pub use error::{ChallengeError, Result};
pub use kind::ChallengeKind;
pub use phase::Phase;
pub use shell::{Context, Game, Shell, Spawn};
