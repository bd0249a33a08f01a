use challenge_core::chess::{Board, Color, Piece, PieceKind, SlideRule, Square, legal_moves};
use challenge_core::circle::{Point, ScoringProfile, circularity, score_stroke};
use challenge_core::sliding::{GOAL, Tiles, inversion_count, is_solvable};
use challenge_core::tetris::{Grid, HEIGHT, LINE_SCORE, Tetromino, TetrisState, WIDTH};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn ring(n: usize, r: f64) -> Vec<Point> {
    (0..n)
        .map(|i| {
            let t = i as f64 / n as f64 * std::f64::consts::TAU;
            Point {
                x: 200.0 + r * t.cos(),
                y: 200.0 + r * t.sin(),
            }
        })
        .collect()
}

#[test]
fn circularity_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(77);
    let wobbly: Vec<Point> = ring(64, 80.0)
        .into_iter()
        .map(|p| {
            use rand::Rng;
            Point {
                x: p.x + rng.random_range(-6.0..6.0),
                y: p.y + rng.random_range(-6.0..6.0),
            }
        })
        .collect();
    for profile in [ScoringProfile::CLASSIC, ScoringProfile::SMOOTH] {
        let first = score_stroke(&wobbly, &profile);
        for _ in 0..5 {
            assert_eq!(score_stroke(&wobbly, &profile), first);
        }
    }
}

#[test]
fn circularity_stays_in_bounds() {
    let mut rng = StdRng::seed_from_u64(1234);
    for _ in 0..200 {
        use rand::Rng;
        let n = rng.random_range(0..80);
        let points: Vec<Point> = (0..n)
            .map(|_| Point {
                x: rng.random_range(-500.0..500.0),
                y: rng.random_range(-500.0..500.0),
            })
            .collect();
        for profile in [ScoringProfile::CLASSIC, ScoringProfile::SMOOTH] {
            let score = circularity(&points, &profile);
            assert!(score <= 100);
            if n < 20 {
                assert_eq!(score, 0);
            }
        }
    }
}

#[test]
fn short_or_degenerate_strokes_score_zero() {
    let profile = ScoringProfile::CLASSIC;
    assert_eq!(circularity(&ring(19, 100.0), &profile), 0);
    assert_eq!(circularity(&[], &profile), 0);
    let dot = vec![Point { x: 5.0, y: 5.0 }; 40];
    assert_eq!(circularity(&dot, &profile), 0);
}

#[test]
fn true_circle_scores_at_least_95() {
    for profile in [ScoringProfile::CLASSIC, ScoringProfile::SMOOTH] {
        assert!(circularity(&ring(100, 120.0), &profile) >= 95);
    }
}

#[test]
fn generated_puzzles_are_solvable() {
    let mut rng = StdRng::seed_from_u64(2024);
    for _ in 0..1000 {
        let tiles = Tiles::generate(&mut rng);
        assert!(is_solvable(tiles.cells()));
        assert!(!tiles.is_solved());
    }
    assert_eq!(inversion_count(&GOAL), 0);
    assert!(is_solvable(&GOAL));
}

#[test]
fn only_tiles_next_to_the_blank_move() {
    // Blank in the center.
    let start = Tiles::new(&[1, 2, 3, 4, 0, 5, 6, 7, 8]).unwrap();
    for row in 0..3usize {
        for col in 0..3usize {
            let mut tiles = start;
            let adjacent = row.abs_diff(1) + col.abs_diff(1) == 1;
            assert_eq!(tiles.try_move(row, col), adjacent, "({row}, {col})");
            if adjacent {
                assert_eq!(tiles.blank(), (row, col));
                assert_eq!(tiles.get(1, 1), start.get(row, col));
            } else {
                assert_eq!(tiles, start);
            }
        }
    }
}

#[test]
fn corner_queen_and_center_king_on_empty_board() {
    let queen = Piece {
        kind: PieceKind::Queen,
        color: Color::White,
        at: Square::new(0, 0),
    };
    let board = Board::new(vec![queen]).unwrap();
    assert_eq!(legal_moves(&board, queen.at, SlideRule::Blocking).len(), 21);

    let king = Piece {
        kind: PieceKind::King,
        color: Color::Black,
        at: Square::new(4, 4),
    };
    let board = Board::new(vec![king]).unwrap();
    assert_eq!(legal_moves(&board, king.at, SlideRule::Blocking).len(), 8);
}

#[test]
fn one_full_row_is_cleared_and_scored() {
    let mut grid = Grid::new();
    let bottom = HEIGHT - 1;
    for col in 0..WIDTH {
        grid.set(bottom, col, Some(Tetromino::I));
    }
    // Loose blocks above the full row.
    grid.set(bottom - 1, 0, Some(Tetromino::T));
    grid.set(bottom - 3, 4, Some(Tetromino::S));
    let mut state = TetrisState::with_grid(grid, Tetromino::O);

    assert_eq!(state.clear_full_rows(), 1);
    assert_eq!(state.score(), LINE_SCORE);
    assert_eq!(state.lines(), 1);
    let after = state.grid();
    assert_eq!(after.get(bottom, 0), Some(Tetromino::T));
    assert_eq!(after.get(bottom - 2, 4), Some(Tetromino::S));
    assert_eq!(after.get(bottom - 1, 0), None);
    assert!((1..WIDTH).all(|c| after.get(bottom, c).is_none()));
}
