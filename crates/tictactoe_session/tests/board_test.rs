//! Tests for the 3x3 board.

use tictactoe_session::{
    Board, BoardError, CellValue, Coord, Mark, SymbolAssignment, render_grid,
};

#[test]
fn test_first_set_succeeds_second_is_occupied() {
    for coord in Coord::all() {
        let mut board = Board::new();
        assert!(board.set(coord, CellValue::Human).is_ok());
        assert_eq!(board.get(coord), CellValue::Human);

        let again = board.set(coord, CellValue::Computer);
        assert_eq!(again, Err(BoardError::CellOccupied(coord)));
        assert_eq!(board.get(coord), CellValue::Human); // Unchanged
    }
}

#[test]
fn test_coordinates_outside_grid_rejected() {
    assert_eq!(
        Coord::new(3, 0),
        Err(BoardError::InvalidCoordinate { row: 3, col: 0 })
    );
    assert!(Coord::new(0, 3).is_err());
    assert!(Coord::from_wire(-1, 0).is_err());
    assert!(Coord::from_wire(2, 3).is_err());
    assert!(Coord::from_wire(2, 2).is_ok());
}

#[test]
fn test_linear_cell_numbers() {
    assert_eq!(Coord::from_linear(1), Coord::new(0, 0));
    assert_eq!(Coord::from_linear(5), Coord::new(1, 1));
    assert_eq!(Coord::from_linear(9), Coord::new(2, 2));
    assert_eq!(Coord::from_linear(0), Err(BoardError::InvalidCellNumber(0)));
    assert_eq!(Coord::from_linear(10), Err(BoardError::InvalidCellNumber(10)));

    let numbered: Vec<Coord> = (1..=9).map(|n| Coord::from_linear(n).unwrap()).collect();
    assert_eq!(numbered, Coord::all().collect::<Vec<_>>());
}

#[test]
fn test_clear_empties_every_cell() {
    let mut board = Board::new();
    board.set(Coord::new(0, 0).unwrap(), CellValue::Human).unwrap();
    board.set(Coord::new(2, 1).unwrap(), CellValue::Computer).unwrap();
    assert_eq!(board.mark_count(), 2);

    board.clear();

    assert_eq!(board.mark_count(), 0);
    assert!(Coord::all().all(|c| board.is_empty(c)));
    // Cleared cells accept marks again
    assert!(board.set(Coord::new(0, 0).unwrap(), CellValue::Computer).is_ok());
}

#[test]
fn test_occupied_lists_every_mark() {
    let mut board = Board::new();
    for (i, coord) in Coord::all().enumerate() {
        let value = if i % 2 == 0 { CellValue::Human } else { CellValue::Computer };
        board.set(coord, value).unwrap();
    }
    assert_eq!(board.mark_count(), 9);
    assert_eq!(board.occupied(), Coord::all().collect::<Vec<_>>());
}

#[test]
fn test_to_wire_uses_assignment() {
    let mut board = Board::new();
    board.set(Coord::new(0, 0).unwrap(), CellValue::Human).unwrap();
    board.set(Coord::new(1, 1).unwrap(), CellValue::Computer).unwrap();

    let wire = board.to_wire(&SymbolAssignment::default());
    assert_eq!(wire[0][0], Some(Mark::O));
    assert_eq!(wire[1][1], Some(Mark::X));
    assert_eq!(wire[2][2], None);

    let swapped = board.to_wire(&SymbolAssignment::with_human(Mark::X));
    assert_eq!(swapped[0][0], Some(Mark::X));
    assert_eq!(swapped[1][1], Some(Mark::O));
}

#[test]
fn test_render() {
    let mut board = Board::new();
    board.set(Coord::new(0, 0).unwrap(), CellValue::Human).unwrap();
    board.set(Coord::new(1, 1).unwrap(), CellValue::Computer).unwrap();

    let rendered = render_grid(&board.to_wire(&SymbolAssignment::default()));
    assert_eq!(rendered, "O|2|3\n-+-+-\n4|X|6\n-+-+-\n7|8|9");
}
