use std::f64::consts::TAU;
use std::fs;

use challenge_cli::snapshot::MAX_CELL;
use challenge_cli::{parse_stroke, replay_file, score_file, snapshot_file};
use challenge_core::chess::{ChessChallenge, ChessEvent};
use challenge_core::session::{Session, TimedEvent};
use challenge_core::{ChallengeConfig, ChallengeKind, CompletionGate, Shell};
use tempfile::tempdir;

fn chess_solution_json(seed: u64) -> String {
    let probe: Shell<ChessChallenge> =
        Shell::spawn(ChallengeConfig::default(), seed, CompletionGate::silent());
    let (from, to) = probe.game().puzzle().solution;
    let session = Session {
        kind: ChallengeKind::ChessPuzzle,
        seed,
        config: ChallengeConfig::default(),
        events: vec![
            TimedEvent { at_ms: 300, event: ChessEvent::Click(from) },
            TimedEvent { at_ms: 700, event: ChessEvent::Click(to) },
        ],
        end_ms: None,
    };
    serde_json::to_string(&session).unwrap()
}

#[test]
fn replay_reads_a_session_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("chess.json");
    fs::write(&path, chess_solution_json(5)).unwrap();

    let result = replay_file(&path).unwrap().expect("finished");
    assert!(result.success);
    assert_eq!(result.score, 100);
}

#[test]
fn replay_reports_missing_files() {
    let dir = tempdir().unwrap();
    let err = replay_file(&dir.path().join("nope.json")).unwrap_err();
    assert!(err.to_string().contains("failed to read"));
}

#[test]
fn stroke_accepts_pairs_and_objects() {
    let pairs = parse_stroke("[[1, 2], [3, 4]]").unwrap();
    let objects = parse_stroke(r#"[{"x": 1, "y": 2}, {"x": 3, "y": 4}]"#).unwrap();
    assert_eq!(pairs, objects);
    assert!(parse_stroke(r#"{"x": 1}"#).is_err());
}

#[test]
fn ring_scores_high_under_both_profiles() {
    let ring: Vec<[f64; 2]> = (0..100)
        .map(|i| {
            let a = TAU * i as f64 / 100.0;
            [200.0 + 120.0 * a.cos(), 200.0 + 120.0 * a.sin()]
        })
        .collect();
    let dir = tempdir().unwrap();
    let path = dir.path().join("ring.json");
    fs::write(&path, serde_json::to_string(&ring).unwrap()).unwrap();

    assert!(score_file(&path, "classic").unwrap().total >= 95);
    assert!(score_file(&path, "smooth").unwrap().total >= 95);
    assert!(score_file(&path, "wobbly").is_err());
}

#[test]
fn snapshot_writes_a_board_sized_png() {
    let dir = tempdir().unwrap();
    let session = dir.path().join("chess.json");
    let out = dir.path().join("board.png");
    fs::write(&session, chess_solution_json(1)).unwrap();

    let raster = snapshot_file(&session, &out, 16).unwrap();
    assert_eq!((raster.width, raster.height), (128, 128));
    let bytes = fs::read(&out).unwrap();
    assert_eq!(&bytes[..4], b"\x89PNG");
}

#[test]
fn snapshot_rejects_boardless_challenges() {
    let dir = tempdir().unwrap();
    let session = dir.path().join("quiz.json");
    fs::write(&session, r#"{"kind": "quiz", "seed": 1}"#).unwrap();
    let err = snapshot_file(&session, &dir.path().join("x.png"), 16).unwrap_err();
    assert!(err.to_string().contains("no grid board"));
}

#[test]
fn oversized_cells_are_clamped() {
    let dir = tempdir().unwrap();
    let session = dir.path().join("chess.json");
    let out = dir.path().join("big.png");
    fs::write(&session, chess_solution_json(2)).unwrap();

    let raster = snapshot_file(&session, &out, u32::MAX).unwrap();
    assert_eq!(raster.width, 8 * MAX_CELL);
    assert_eq!(raster.rgba.len(), (raster.width * raster.height * 4) as usize);
}
