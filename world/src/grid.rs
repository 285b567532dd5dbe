//! Static board model storing occupancy and the start/end designation.

use grid_defence_core::{BoardError, CellCoord, CellKind, MAX_BOARD_SIZE};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Cell {
    occupied: bool,
    kind: CellKind,
}

/// Dense square grid of cells stored in row-major order.
#[derive(Clone, Debug)]
pub(crate) struct Grid {
    size: u32,
    cells: Vec<Cell>,
    start: CellCoord,
    end: CellCoord,
}

impl Grid {
    /// Creates an empty grid with the provided start and end cells.
    pub(crate) fn new(size: u32, start: CellCoord, end: CellCoord) -> Result<Self, BoardError> {
        if size == 0 {
            return Err(BoardError::Empty);
        }
        if size > MAX_BOARD_SIZE {
            return Err(BoardError::TooLarge(size));
        }
        if start.column() >= size || start.row() >= size {
            return Err(BoardError::StartOutOfBounds);
        }
        if end.column() >= size || end.row() >= size {
            return Err(BoardError::EndOutOfBounds);
        }
        if start == end {
            return Err(BoardError::StartEqualsEnd);
        }

        let side = size as usize;
        let mut grid = Self {
            size,
            cells: vec![
                Cell {
                    occupied: false,
                    kind: CellKind::Empty,
                };
                side * side
            ],
            start,
            end,
        };

        if let Some(index) = grid.index(start) {
            grid.cells[index].kind = CellKind::Start;
        }
        if let Some(index) = grid.index(end) {
            grid.cells[index].kind = CellKind::End;
        }

        Ok(grid)
    }

    pub(crate) fn size(&self) -> u32 {
        self.size
    }

    pub(crate) fn start(&self) -> CellCoord {
        self.start
    }

    pub(crate) fn end(&self) -> CellCoord {
        self.end
    }

    /// Designation of the cell, `None` outside the grid.
    pub(crate) fn kind(&self, cell: CellCoord) -> Option<CellKind> {
        self.index(cell).map(|index| self.cells[index].kind)
    }

    /// Reports whether a tower stands on the cell. Cells outside the grid are never occupied.
    pub(crate) fn is_occupied(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .map(|index| self.cells[index].occupied)
            .unwrap_or(false)
    }

    /// Marks the cell occupied. Start, end and out-of-bounds cells are left untouched.
    pub(crate) fn occupy(&mut self, cell: CellCoord) -> bool {
        let Some(index) = self.index(cell) else {
            return false;
        };
        let slot = &mut self.cells[index];
        if slot.kind != CellKind::Empty || slot.occupied {
            return false;
        }
        slot.occupied = true;
        true
    }

    pub(crate) fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() >= self.size || cell.row() >= self.size {
            return None;
        }
        let side = self.size as usize;
        Some(cell.row() as usize * side + cell.column() as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_rejects_degenerate_layouts() {
        let corner = CellCoord::new(0, 0);

        assert_eq!(
            Grid::new(0, corner, corner).unwrap_err(),
            BoardError::Empty
        );
        assert_eq!(
            Grid::new(4_000_000_000, corner, CellCoord::new(1, 1)).unwrap_err(),
            BoardError::TooLarge(4_000_000_000)
        );
        assert!(Grid::new(MAX_BOARD_SIZE, corner, CellCoord::new(1, 1)).is_ok());
        assert_eq!(
            Grid::new(3, corner, corner).unwrap_err(),
            BoardError::StartEqualsEnd
        );
        assert_eq!(
            Grid::new(3, CellCoord::new(3, 0), corner).unwrap_err(),
            BoardError::StartOutOfBounds
        );
        assert_eq!(
            Grid::new(3, corner, CellCoord::new(0, 5)).unwrap_err(),
            BoardError::EndOutOfBounds
        );
    }

    #[test]
    fn start_and_end_are_designated_and_never_occupied() {
        let mut grid = Grid::new(4, CellCoord::new(0, 0), CellCoord::new(3, 3)).expect("valid");

        assert_eq!(grid.kind(CellCoord::new(0, 0)), Some(CellKind::Start));
        assert_eq!(grid.kind(CellCoord::new(3, 3)), Some(CellKind::End));
        assert_eq!(grid.kind(CellCoord::new(1, 2)), Some(CellKind::Empty));
        assert_eq!(grid.kind(CellCoord::new(4, 0)), None);

        assert!(!grid.occupy(CellCoord::new(0, 0)));
        assert!(!grid.occupy(CellCoord::new(3, 3)));
        assert!(grid.occupy(CellCoord::new(2, 1)));
        assert!(!grid.occupy(CellCoord::new(2, 1)));
        assert!(grid.is_occupied(CellCoord::new(2, 1)));
        assert!(!grid.is_occupied(CellCoord::new(9, 9)));
    }

    #[test]
    fn index_is_row_major() {
        let grid = Grid::new(5, CellCoord::new(0, 0), CellCoord::new(4, 4)).expect("valid");

        assert_eq!(grid.index(CellCoord::new(3, 2)), Some(13));
        assert_eq!(grid.index(CellCoord::new(5, 0)), None);
    }
}
