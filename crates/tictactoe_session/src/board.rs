//! The 3x3 grid of cell marks.

use crate::types::{CellValue, Coord, SymbolAssignment};
use crate::wire::WireBoard;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Errors raised by board access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum BoardError {
    /// Row or column outside `0..=2`.
    #[display("Coordinate ({row}, {col}) is outside the 3x3 grid")]
    InvalidCoordinate {
        /// Requested row.
        row: i64,
        /// Requested column.
        col: i64,
    },

    /// Cell number outside `1..=9`.
    #[display("Cell number {_0} is outside 1..=9")]
    InvalidCellNumber(usize),

    /// The cell already holds a mark.
    #[display("Cell {_0} is already occupied")]
    CellOccupied(Coord),
}

impl std::error::Error for BoardError {}

/// 3x3 tic-tac-toe board.
///
/// A marked cell is never overwritten; only [`Board::clear`] empties it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    cells: [[CellValue; Coord::SIZE]; Coord::SIZE],
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the value at `coord`.
    pub fn get(&self, coord: Coord) -> CellValue {
        self.cells[coord.row()][coord.col()]
    }

    /// Places `value` at `coord`.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::CellOccupied`] if the cell is not empty.
    #[instrument(skip(self))]
    pub fn set(&mut self, coord: Coord, value: CellValue) -> Result<(), BoardError> {
        let cell = &mut self.cells[coord.row()][coord.col()];
        if *cell != CellValue::Empty {
            debug!(%coord, current = ?cell, "Refusing to overwrite cell");
            return Err(BoardError::CellOccupied(coord));
        }
        *cell = value;
        Ok(())
    }

    /// Empties every cell.
    #[instrument(skip(self))]
    pub fn clear(&mut self) {
        self.cells = Default::default();
    }

    /// Checks if a cell is empty.
    pub fn is_empty(&self, coord: Coord) -> bool {
        self.get(coord) == CellValue::Empty
    }

    /// Number of marked cells.
    pub fn mark_count(&self) -> usize {
        Coord::all().filter(|c| !self.is_empty(*c)).count()
    }

    /// Coordinates of every marked cell, row-major.
    pub fn occupied(&self) -> Vec<Coord> {
        Coord::all().filter(|c| !self.is_empty(*c)).collect()
    }

    /// Converts to the wire grid using the session's symbols.
    pub fn to_wire(&self, assignment: &SymbolAssignment) -> WireBoard {
        self.cells.map(|row| row.map(|value| assignment.mark_for(value)))
    }
}
