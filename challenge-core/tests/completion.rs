use std::cell::RefCell;
use std::rc::Rc;

use challenge_core::arithmetic::{Arithmetic, ArithmeticEvent, Op, Problem};
use challenge_core::captcha::{Captcha, CaptchaEvent, CaptchaGrid, CaptchaState};
use challenge_core::chess::{
    ChessChallenge, ChessEvent, ChessState, SlideRule, Square, legal_moves, puzzle, puzzle_count,
};
use challenge_core::circle::{CircleDrawing, CircleEvent, DrawState, Point};
use challenge_core::click_precision::ClickPrecision;
use challenge_core::constants::{FEEDBACK_DELAY_MS, ROUND_ADVANCE_MS};
use challenge_core::flags::{FlagEvent, FlagMatch};
use challenge_core::math_sort::{Expression, MathSort, SortEvent};
use challenge_core::memory_match::{MISMATCH_MS, MatchEvent, MatchState, MemoryMatch};
use challenge_core::odd_one_out::{OddEvent, OddOneOut};
use challenge_core::pixel_memory::{MEMORIZE_MS, PixelEvent, PixelMemory};
use challenge_core::quiz::{Quiz, QuizBank, QuizEvent};
use challenge_core::reflex::{Reflex, ReflexEvent, TOTAL_BALLS};
use challenge_core::simon_says::{GAP_MS, SimonEvent, SimonSays, SimonState};
use challenge_core::sliding::{SlidingEvent, SlidingPuzzle, Tiles};
use challenge_core::tetris::{FAST_FALL_MS, Tetris, TetrisEvent, Tetromino};
use challenge_core::{ChallengeConfig, ChallengeResult, CompletionGate, Game, Shell, Spawn};
use rand::SeedableRng;
use rand::rngs::StdRng;

type Log = Rc<RefCell<Vec<ChallengeResult>>>;

fn config(limit: Option<u32>) -> ChallengeConfig {
    ChallengeConfig {
        challenge_id: "test".into(),
        time_limit: limit,
    }
}

fn gate() -> (CompletionGate, Log) {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    let gate = CompletionGate::new(Box::new(move |r| sink.borrow_mut().push(r)));
    (gate, log)
}

fn wrap<G: Game>(game: G) -> (Shell<G>, Log) {
    let (gate, log) = gate();
    let mut shell = Shell::new(game, config(None), 7, gate);
    shell.mount(0);
    (shell, log)
}

/// Let the countdown expire on an untouched challenge, then keep the clock
/// running; the host must hear about it exactly once.
fn times_out_once<G: Spawn>(seed: u64) {
    let (gate, log) = gate();
    let mut shell: Shell<G> = Shell::spawn(config(Some(2)), seed, gate);
    shell.mount(0);
    shell.tick(1999);
    assert!(log.borrow().is_empty());
    shell.tick(2000);
    shell.tick(60_000);
    shell.tick(600_000);
    let results = log.borrow();
    assert_eq!(results.len(), 1, "{}", shell.title());
    assert!(!results[0].success);
    assert_eq!(results[0].time_spent, 2);
}

#[test]
fn every_challenge_times_out_once() {
    for seed in [1, 2, 3] {
        times_out_once::<Captcha>(seed);
        times_out_once::<Quiz>(seed);
        times_out_once::<Arithmetic>(seed);
        times_out_once::<CircleDrawing>(seed);
        times_out_once::<FlagMatch>(seed);
        times_out_once::<SlidingPuzzle>(seed);
        times_out_once::<PixelMemory>(seed);
        times_out_once::<ChessChallenge>(seed);
        times_out_once::<Tetris>(seed);
        times_out_once::<MathSort>(seed);
        times_out_once::<OddOneOut>(seed);
        times_out_once::<Reflex>(seed);
        times_out_once::<ClickPrecision>(seed);
        times_out_once::<SimonSays>(seed);
        times_out_once::<MemoryMatch>(seed);
    }
}

#[test]
fn chess_solution_reports_once() {
    let p = puzzle(0);
    let (from, to) = p.solution;
    let (mut shell, log) = wrap(ChessChallenge::new(p, SlideRule::Blocking));

    shell.dispatch(ChessEvent::Click(from), 100);
    shell.dispatch(ChessEvent::Click(to), 200);
    assert!(shell.is_finished());
    assert!(log.borrow().is_empty());

    // Input after the verdict is ignored.
    assert!(!shell.dispatch(ChessEvent::Click(Square::new(0, 0)), 300));
    shell.tick(200 + FEEDBACK_DELAY_MS);
    shell.tick(99_999);

    let results = log.borrow();
    assert_eq!(results.len(), 1);
    assert!(results[0].success);
    assert_eq!(results[0].score, 100);
    assert_eq!(results[0].time_spent, 2);
}

#[test]
fn quiz_walks_through_every_question() {
    let bank = QuizBank::builtin();
    let questions = bank.questions[..3].to_vec();
    let answers: Vec<usize> = questions.iter().map(|q| q.answer).collect();
    let (mut shell, log) = wrap(Quiz::new(questions));

    let mut now = 0;
    for (i, answer) in answers.into_iter().enumerate() {
        now += 500;
        // Miss the last one on purpose.
        let choice = if i == 2 { (answer + 1) % 4 } else { answer };
        assert!(shell.dispatch(QuizEvent::Choose(choice), now));
        // A second click during feedback changes nothing.
        shell.dispatch(QuizEvent::Choose(answer), now + 1);
        now += ROUND_ADVANCE_MS;
        shell.tick(now);
    }
    assert!(shell.is_finished());
    shell.tick(now + FEEDBACK_DELAY_MS);
    let results = log.borrow();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].score, 66);
    assert!(results[0].success);
}

#[test]
fn arithmetic_accepts_typed_answers() {
    let mut rng = StdRng::seed_from_u64(99);
    let game = Arithmetic::spawn(&mut rng);
    let (mut shell, log) = wrap(game);

    let mut now = 0;
    for _ in 0..shell.game().rounds() {
        let answer = shell.game().current().unwrap().answer();
        for d in answer.to_string().bytes() {
            now += 50;
            shell.dispatch(ArithmeticEvent::Digit(d - b'0'), now);
        }
        now += 50;
        shell.dispatch(ArithmeticEvent::Submit, now);
        now += ROUND_ADVANCE_MS;
        shell.tick(now);
    }
    shell.tick(now + FEEDBACK_DELAY_MS);
    let results = log.borrow();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].score, 100);
    assert!(results[0].success);
}

#[test]
fn pixel_memory_reports_partial_recall() {
    let mut rng = StdRng::seed_from_u64(5);
    let (mut shell, log) = wrap(PixelMemory::spawn(&mut rng));

    // Still memorizing: toggles are ignored.
    shell.dispatch(PixelEvent::Toggle { row: 0, col: 0 }, 10);
    shell.tick(MEMORIZE_MS);
    shell.dispatch(PixelEvent::Submit, MEMORIZE_MS + 10);
    shell.tick(MEMORIZE_MS + 10 + FEEDBACK_DELAY_MS);

    let results = log.borrow();
    assert_eq!(results.len(), 1);
    assert!(!results[0].success);
    // 8 lit cells missed out of 25.
    assert_eq!(results[0].score, 68);
}

#[test]
fn flag_match_reports_a_wrong_pairing() {
    let mut rng = StdRng::seed_from_u64(12);
    let game = FlagMatch::spawn(&mut rng);
    let n = game.flags().len();
    let (mut shell, log) = wrap(game);

    // Pair flag i with name i regardless of what it says.
    for i in 0..n {
        shell.dispatch(FlagEvent::SelectFlag(i), 100 + i as u64);
        shell.dispatch(FlagEvent::SelectName(i), 200 + i as u64);
    }
    let correct = shell.game().correct_pairs();
    shell.dispatch(FlagEvent::Submit, 1000);
    shell.tick(1000 + FEEDBACK_DELAY_MS);

    let results = log.borrow();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].score, (correct * 100 / n) as u32);
    assert_eq!(results[0].success, correct * 4 >= n * 3);
}

#[test]
fn circle_fails_after_three_scribbles() {
    let (mut shell, log) = wrap(CircleDrawing::default());
    let mut now = 0;
    for attempt in 0..3 {
        let start = Point { x: 0.0, y: 0.0 };
        let begin = if attempt == 0 {
            CircleEvent::PointerDown(start)
        } else {
            CircleEvent::Retry(start)
        };
        shell.dispatch(begin, now);
        for i in 1..30 {
            let p = Point { x: i as f64 * 10.0, y: 0.0 };
            shell.dispatch(CircleEvent::PointerMove(p), now + i);
        }
        shell.dispatch(CircleEvent::PointerUp, now + 40);
        now += 100;
    }
    assert!(shell.is_finished());
    shell.tick(now + FEEDBACK_DELAY_MS);
    let results = log.borrow();
    assert_eq!(results.len(), 1);
    assert!(!results[0].success);
}

#[test]
fn circle_retry_starts_the_next_stroke() {
    let (mut shell, _log) = wrap(CircleDrawing::default());
    shell.dispatch(CircleEvent::PointerDown(Point { x: 5.0, y: 5.0 }), 0);
    shell.dispatch(CircleEvent::PointerUp, 10);
    assert!(matches!(shell.game().state(), DrawState::Scored { .. }));

    let at = Point { x: 42.0, y: 7.0 };
    shell.dispatch(CircleEvent::Retry(at), 20);
    assert_eq!(shell.game().state(), &DrawState::Drawing(vec![at]));
    assert_eq!(shell.game().attempts(), 1);
}

#[test]
fn unmount_before_report_stays_silent() {
    let p = puzzle(1);
    let (from, to) = p.solution;
    let (mut shell, log) = wrap(ChessChallenge::new(p, SlideRule::Blocking));
    shell.dispatch(ChessEvent::Click(from), 10);
    shell.dispatch(ChessEvent::Click(to), 20);
    shell.unmount();
    shell.tick(10_000);
    assert!(log.borrow().is_empty());
}

#[test]
fn tetris_down_switches_to_fast_fall_for_good() {
    let (mut shell, _log) = wrap(Tetris::new(Tetromino::O));
    let y = |shell: &Shell<Tetris>| shell.game().state().active().map(|p| p.y);
    assert_eq!(y(&shell), Some(0));

    shell.dispatch(TetrisEvent::Down, 10);
    assert!(shell.game().is_fast());
    assert_eq!(y(&shell), Some(1));
    // Gravity now runs every FAST_FALL_MS from the key press.
    shell.tick(10 + 5 * FAST_FALL_MS);
    assert_eq!(y(&shell), Some(6));

    // A second press drops once more but keeps the same cadence.
    shell.dispatch(TetrisEvent::Down, 520);
    assert_eq!(y(&shell), Some(7));
    shell.tick(610);
    assert_eq!(y(&shell), Some(8));
    assert!(shell.game().is_fast());
}

/// A puzzle with a legal move for the solving piece that is not the
/// solution.
fn wrong_move() -> (usize, Square, Square) {
    (0..puzzle_count())
        .find_map(|i| {
            let p = puzzle(i);
            let (from, to) = p.solution;
            legal_moves(&p.pieces, from, SlideRule::Blocking)
                .into_iter()
                .find(|&t| t != to)
                .map(|t| (i, from, t))
        })
        .expect("some puzzle has a wrong move")
}

#[test]
fn chess_wrong_moves_reset_then_fail() {
    let (index, from, wrong) = wrong_move();
    let start = puzzle(index).pieces;
    let (mut shell, log) = wrap(ChessChallenge::new(puzzle(index), SlideRule::Blocking));

    let mut now = 0;
    for attempt in 1..=3 {
        now += 100;
        shell.dispatch(ChessEvent::Click(from), now);
        shell.dispatch(ChessEvent::Click(wrong), now + 10);
        assert_eq!(shell.game().state(), &ChessState::Wrong { from, to: wrong });
        assert_eq!(shell.game().wrong_moves(), attempt);
        assert!(shell.game().board().at(from).is_none());
        now += 10 + FEEDBACK_DELAY_MS;
        shell.tick(now);
        if attempt < 3 {
            assert_eq!(shell.game().state(), &ChessState::Selecting);
            assert_eq!(shell.game().board(), &start);
        }
    }
    assert!(shell.is_finished());
    let results = log.borrow();
    assert_eq!(results.len(), 1);
    assert!(!results[0].success);
    assert_eq!(results[0].score, 0);
}

#[test]
fn captcha_passes_on_the_second_round() {
    let mut rng = StdRng::seed_from_u64(21);
    let (mut shell, log) = wrap(Captcha::new(CaptchaGrid::generate(&mut rng)));

    // An empty selection never matches.
    shell.dispatch(CaptchaEvent::Verify, 100);
    assert_eq!(shell.game().state(), &CaptchaState::Rejected);
    assert_eq!(shell.game().failures(), 1);
    shell.dispatch(CaptchaEvent::Toggle(0), 150);
    shell.tick(100 + ROUND_ADVANCE_MS);
    assert!(matches!(shell.game().state(), CaptchaState::Selecting { .. }));

    let targets: Vec<usize> = shell
        .game()
        .grid()
        .tiles
        .iter()
        .enumerate()
        .filter(|(_, t)| t.is_target)
        .map(|(i, _)| i)
        .collect();
    let mut now = 100 + ROUND_ADVANCE_MS;
    for i in targets {
        now += 10;
        shell.dispatch(CaptchaEvent::Toggle(i), now);
    }
    shell.dispatch(CaptchaEvent::Verify, now + 10);
    assert_eq!(shell.game().state(), &CaptchaState::Accepted);
    shell.tick(now + 10 + FEEDBACK_DELAY_MS);

    let results = log.borrow();
    assert_eq!(results.len(), 1);
    assert!(results[0].success);
    assert_eq!(results[0].score, 75);
}

#[test]
fn simon_plays_back_then_listens() {
    let (mut shell, log) = wrap(SimonSays::new(vec![0, 1]));
    assert_eq!(shell.game().state(), SimonState::Playback { lit: None });
    shell.tick(GAP_MS);
    assert_eq!(shell.game().lit(), Some(0));
    // Presses during playback are ignored.
    shell.dispatch(SimonEvent::Press(3), GAP_MS + 1);
    shell.tick(1000);
    assert_eq!(shell.game().state(), SimonState::Listening { pos: 0 });

    shell.dispatch(SimonEvent::Press(0), 1100);
    assert_eq!(shell.game().completed(), 1);
    assert!(matches!(shell.game().state(), SimonState::Playback { .. }));
    // Round two replays 0 then 1 before listening again.
    shell.tick(1100 + ROUND_ADVANCE_MS);
    assert_eq!(shell.game().lit(), Some(0));
    shell.tick(3600);
    assert_eq!(shell.game().state(), SimonState::Listening { pos: 0 });

    shell.dispatch(SimonEvent::Press(0), 3700);
    shell.dispatch(SimonEvent::Press(1), 3800);
    assert_eq!(shell.game().state(), SimonState::Won);
    shell.tick(3800 + FEEDBACK_DELAY_MS);
    let results = log.borrow();
    assert_eq!(results.len(), 1);
    assert!(results[0].success);
    assert_eq!(results[0].score, 40);
}

#[test]
fn simon_wrong_pad_fails() {
    let (mut shell, log) = wrap(SimonSays::new(vec![2, 2, 2]));
    shell.tick(1000);
    shell.dispatch(SimonEvent::Press(3), 1100);
    assert_eq!(shell.game().state(), SimonState::Failed);
    shell.tick(1100 + FEEDBACK_DELAY_MS);
    let results = log.borrow();
    assert_eq!(results.len(), 1);
    assert!(!results[0].success);
    assert_eq!(results[0].score, 0);
}

#[test]
fn falling_balls_settle_after_the_last_ball() {
    let (mut shell, log) = wrap(Reflex::new());
    let first = shell.game().balls()[0];
    shell.dispatch(ReflexEvent::Click(first.center), 0);
    assert_eq!(shell.game().caught(), 1);
    // A click on empty space catches nothing.
    shell.dispatch(ReflexEvent::Click(Point { x: -100.0, y: -100.0 }), 1);
    assert_eq!(shell.game().caught(), 1);

    let mut now = 0;
    while !shell.is_finished() && now < 30_000 {
        now += 1000;
        shell.tick(now);
    }
    assert!(shell.is_finished());
    assert_eq!(shell.game().spawned(), TOTAL_BALLS);
    assert_eq!(shell.game().missed(), TOTAL_BALLS - 1);
    shell.tick(now + FEEDBACK_DELAY_MS);
    let results = log.borrow();
    assert_eq!(results.len(), 1);
    assert!(!results[0].success);
    assert_eq!(results[0].score, 10);
}

fn sums(values: &[u32]) -> Vec<Expression> {
    values
        .iter()
        .map(|&v| Expression(Problem { a: v - 1, b: 1, op: Op::Add }))
        .collect()
}

#[test]
fn math_sort_scores_items_in_place() {
    let (mut shell, log) = wrap(MathSort::new(sums(&[4, 2, 3])));
    shell.dispatch(SortEvent::Pick(0), 10);
    shell.dispatch(SortEvent::Pick(1), 20);
    assert_eq!(shell.game().swaps(), 1);
    shell.dispatch(SortEvent::Submit, 30);
    shell.tick(30 + FEEDBACK_DELAY_MS);
    // 2, 4, 3: only the first is in place.
    assert_eq!(log.borrow()[0].score, 33);
    assert!(!log.borrow()[0].success);

    let (mut shell, log) = wrap(MathSort::new(sums(&[4, 2, 3])));
    for (i, pick) in [0, 1, 1, 2].into_iter().enumerate() {
        shell.dispatch(SortEvent::Pick(pick), 10 * i as u64);
    }
    shell.dispatch(SortEvent::Submit, 100);
    shell.tick(100 + FEEDBACK_DELAY_MS);
    assert_eq!(log.borrow()[0].score, 100);
    assert!(log.borrow()[0].success);
}

#[test]
fn odd_one_out_passes_with_two_of_three() {
    let mut rng = StdRng::seed_from_u64(3);
    let (mut shell, log) = wrap(OddOneOut::spawn(&mut rng));
    let mut now = 0;
    for round in 0..3 {
        let outlier = shell.game().current().map(|r| r.outlier).unwrap_or(0);
        let pick = if round == 2 { (outlier + 1) % 4 } else { outlier };
        now += 100;
        shell.dispatch(OddEvent::Pick(pick), now);
        now += ROUND_ADVANCE_MS;
        shell.tick(now);
    }
    assert_eq!(shell.game().correct(), 2);
    shell.tick(now + FEEDBACK_DELAY_MS);
    let results = log.borrow();
    assert_eq!(results.len(), 1);
    assert!(results[0].success);
    assert_eq!(results[0].score, 66);
}

#[test]
fn memory_match_counts_moves() {
    let (mut shell, log) = wrap(MemoryMatch::new(vec!["a", "b", "a", "b"]));
    shell.dispatch(MatchEvent::Flip(0), 10);
    shell.dispatch(MatchEvent::Flip(1), 20);
    assert_eq!(shell.game().state(), MatchState::Mismatch { a: 0, b: 1 });
    // Flips while the mismatch is showing are ignored.
    shell.dispatch(MatchEvent::Flip(2), 30);
    shell.tick(20 + MISMATCH_MS);
    assert_eq!(shell.game().state(), MatchState::Open { first: None });
    assert!(!shell.game().is_face_up(0));

    let mut now = 1000;
    for (a, b) in [(0, 2), (1, 3)] {
        shell.dispatch(MatchEvent::Flip(a), now);
        shell.dispatch(MatchEvent::Flip(b), now + 10);
        now += 100;
    }
    assert_eq!(shell.game().moves(), 3);
    assert_eq!(shell.game().state(), MatchState::Done);
    shell.tick(now + FEEDBACK_DELAY_MS);
    let results = log.borrow();
    assert_eq!(results.len(), 1);
    assert!(results[0].success);
    assert_eq!(results[0].score, 95);
}

#[test]
fn bank_pass_mark_overrides_the_default() {
    let text = r#"{
        "name": "pair",
        "passPercent": 50,
        "questions": [
            {"prompt": "one?", "options": ["a", "b"], "answer": 0},
            {"prompt": "two?", "options": ["a", "b"], "answer": 1}
        ]
    }"#;
    let bank = QuizBank::from_json(text).unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    let (mut shell, log) = wrap(Quiz::from_bank(&bank, &mut rng));

    let mut now = 0;
    for i in 0..2 {
        let answer = shell.game().current().map(|q| q.answer).unwrap_or(0);
        let choice = if i == 0 { answer } else { 1 - answer };
        now += 100;
        shell.dispatch(QuizEvent::Choose(choice), now);
        now += ROUND_ADVANCE_MS;
        shell.tick(now);
    }
    shell.tick(now + FEEDBACK_DELAY_MS);
    let results = log.borrow();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].score, 50);
    assert!(results[0].success);
}

#[test]
fn sliding_moves_by_tile_number() {
    let tiles = Tiles::new(&[1, 2, 3, 4, 5, 6, 7, 0, 8]).unwrap();
    let (mut shell, log) = wrap(SlidingPuzzle::new(tiles));
    // Tile 3 is not next to the blank.
    shell.dispatch(SlidingEvent::Tile(3), 10);
    assert_eq!(shell.game().moves(), 0);
    shell.dispatch(SlidingEvent::Tile(8), 20);
    assert!(shell.is_finished());
    shell.tick(20 + FEEDBACK_DELAY_MS);
    let results = log.borrow();
    assert_eq!(results.len(), 1);
    assert!(results[0].success);
    assert_eq!(results[0].score, 100);
}
