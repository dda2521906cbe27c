//! Board tests - geometry, vanish zone, compaction

use tetris_sim::core::{ActivePiece, Board};
use tetris_sim::types::{BoardConfig, PieceKind, EMPTY_CELL, GARBAGE_CELL};

#[test]
fn test_board_new_empty() {
    let board = Board::standard();
    assert_eq!(board.width(), 10);
    assert_eq!(board.visible_height(), 20);
    assert_eq!(board.vanish_rows(), 2);
    assert_eq!(board.cells().len(), 10 * 22);

    for y in -2..20 {
        for x in 0..10 {
            assert_eq!(board.get(x, y), Some(EMPTY_CELL), "cell ({}, {})", x, y);
        }
    }
}

#[test]
fn test_board_get_out_of_bounds() {
    let board = Board::standard();

    assert_eq!(board.get(-1, 0), None);
    assert_eq!(board.get(10, 0), None);
    assert_eq!(board.get(0, 20), None);
    // Above the vanish zone.
    assert_eq!(board.get(0, -3), None);
}

#[test]
fn test_board_blocked_edges() {
    let board = Board::standard();

    assert!(board.is_blocked(-1, 5));
    assert!(board.is_blocked(10, 5));
    assert!(board.is_blocked(3, 20));
    assert!(board.is_blocked(3, -3));
    // Empty vanish cells are free.
    assert!(!board.is_blocked(3, -2));
}

#[test]
fn test_board_set_and_get() {
    let mut board = Board::standard();

    assert!(board.set(5, 10, PieceKind::T.cell_value()));
    assert_eq!(board.get(5, 10), Some(PieceKind::T.cell_value()));
    assert!(board.set(0, -1, GARBAGE_CELL));
    assert_eq!(board.get(0, -1), Some(GARBAGE_CELL));

    assert!(board.set(5, 10, EMPTY_CELL));
    assert_eq!(board.get(5, 10), Some(EMPTY_CELL));

    assert!(!board.set(-1, 0, GARBAGE_CELL));
    assert!(!board.set(0, 20, GARBAGE_CELL));
}

#[test]
fn test_completed_rows_ignore_vanish_zone() {
    let mut board = Board::standard();
    for x in 0..10 {
        board.set(x, -1, GARBAGE_CELL);
        board.set(x, 19, GARBAGE_CELL);
    }
    assert_eq!(board.completed_rows(), vec![19]);
    assert!(!board.is_row_full(-1));
}

#[test]
fn test_compact_shifts_vanish_rows_down() {
    let mut board = Board::from_rows(
        BoardConfig::default(),
        &["....T.....", "XXXXXXXXXX", "J.........", "XXXXXXXXXX"],
    );
    board.set(7, -2, GARBAGE_CELL);

    let compacted = board.compact(&[17, 19]);

    assert_eq!(compacted.get(4, 18), Some(PieceKind::T.cell_value()));
    assert_eq!(compacted.get(0, 19), Some(PieceKind::J.cell_value()));
    assert_eq!(compacted.get(7, 0), Some(GARBAGE_CELL));
    assert_eq!(compacted.get(7, -2), Some(EMPTY_CELL));
    assert_eq!(compacted.cell_count(), 3);
    // The input board is untouched.
    assert_eq!(board.get(0, 17), Some(GARBAGE_CELL));
}

#[test]
fn test_compact_ignores_invalid_rows() {
    let board = Board::from_rows(BoardConfig::default(), &["XXXXXXXXXX"]);
    assert_eq!(board.compact(&[-1, 25]), board);
    assert!(board.compact(&[19, 19]).is_empty());
}

#[test]
fn test_place_writes_piece_cells() {
    let board = Board::standard();
    let piece = ActivePiece {
        kind: PieceKind::O,
        rotation: tetris_sim::types::Rotation::North,
        x: 3,
        y: 18,
    };
    let placed = board.place(&piece);

    assert_eq!(placed.cell_count(), 4);
    assert_eq!(placed.get(4, 18), Some(PieceKind::O.cell_value()));
    assert_eq!(placed.get(5, 19), Some(PieceKind::O.cell_value()));
    assert!(board.is_empty());
}

#[test]
fn test_custom_geometry() {
    let config = BoardConfig {
        width: 6,
        visible_height: 8,
        vanish_rows: 0,
    };
    let board = Board::new(config);
    assert_eq!(board.total_height(), 8);
    assert_eq!(board.config(), config);
    assert_eq!(ActivePiece::spawn(PieceKind::T, &board).x, 1);
    assert_eq!(ActivePiece::spawn(PieceKind::T, &board).y, 0);
}

#[test]
fn test_stack_height() {
    let board = Board::from_rows(BoardConfig::default(), &["...X......", "XXXX......"]);
    assert_eq!(board.stack_height(), 2);
    assert_eq!(Board::standard().stack_height(), 0);
}
