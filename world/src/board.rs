//! Board topology: grid ownership, placement validation and path queries.

use grid_defence_core::{
    BoardConfig, BoardError, BoardGeometry, CellCoord, CellKind, Path, PlacementError,
};

use crate::{grid::Grid, pathfinding::find_path};

/// Owns the grid and answers pathing questions about it.
#[derive(Clone, Debug)]
pub(crate) struct Board {
    grid: Grid,
    geometry: BoardGeometry,
    allow_diagonal: bool,
}

impl Board {
    pub(crate) fn new(config: &BoardConfig) -> Result<Self, BoardError> {
        if !config.cell_length.is_finite() || config.cell_length <= 0.0 {
            return Err(BoardError::InvalidCellLength);
        }

        let grid = Grid::new(config.size, config.start_cell(), config.end_cell())?;
        Ok(Self {
            grid,
            geometry: BoardGeometry::new(config.size, config.cell_length),
            allow_diagonal: config.allow_diagonal,
        })
    }

    pub(crate) fn geometry(&self) -> BoardGeometry {
        self.geometry
    }

    pub(crate) fn start(&self) -> CellCoord {
        self.grid.start()
    }

    pub(crate) fn end(&self) -> CellCoord {
        self.grid.end()
    }

    pub(crate) fn cell_kind(&self, cell: CellCoord) -> Option<CellKind> {
        self.grid.kind(cell)
    }

    pub(crate) fn is_occupied(&self, cell: CellCoord) -> bool {
        self.grid.is_occupied(cell)
    }

    /// Checks whether a tower could stand on the cell without mutating the grid.
    ///
    /// The connectivity test treats the candidate as occupied in addition to
    /// every occupied cell, so the grid itself is never touched.
    pub(crate) fn check_placement(&self, cell: CellCoord) -> Result<(), PlacementError> {
        match self.grid.kind(cell) {
            None => return Err(PlacementError::OutOfBounds),
            Some(CellKind::Start | CellKind::End) => return Err(PlacementError::Reserved),
            Some(CellKind::Empty) => {}
        }

        if self.grid.is_occupied(cell) {
            return Err(PlacementError::Occupied);
        }

        let reachable = find_path(
            self.grid.size(),
            self.grid.start(),
            self.grid.end(),
            self.allow_diagonal,
            |candidate| candidate == cell || self.grid.is_occupied(candidate),
        )
        .is_some();

        if reachable {
            Ok(())
        } else {
            Err(PlacementError::BlocksPath)
        }
    }

    /// Occupies the cell after validating it and returns the recomputed path.
    pub(crate) fn place(&mut self, cell: CellCoord) -> Result<Option<Path>, PlacementError> {
        self.check_placement(cell)?;
        if !self.grid.occupy(cell) {
            return Err(PlacementError::Occupied);
        }
        Ok(self.path())
    }

    /// Computes the current path from start to end.
    pub(crate) fn path(&self) -> Option<Path> {
        find_path(
            self.grid.size(),
            self.grid.start(),
            self.grid.end(),
            self.allow_diagonal,
            |cell| self.grid.is_occupied(cell),
        )
    }

    /// Row-major occupancy flags, used to compare board states.
    pub(crate) fn occupancy(&self) -> Vec<bool> {
        let size = self.grid.size();
        (0..size)
            .flat_map(|row| (0..size).map(move |column| CellCoord::new(column, row)))
            .map(|cell| self.grid.is_occupied(cell))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(size: u32) -> Board {
        Board::new(&BoardConfig {
            size,
            ..BoardConfig::default()
        })
        .expect("valid board")
    }

    #[test]
    fn rejects_reserved_and_out_of_bounds_cells() {
        let board = board(5);

        assert_eq!(
            board.check_placement(CellCoord::new(0, 0)),
            Err(PlacementError::Reserved)
        );
        assert_eq!(
            board.check_placement(CellCoord::new(4, 4)),
            Err(PlacementError::Reserved)
        );
        assert_eq!(
            board.check_placement(CellCoord::new(5, 1)),
            Err(PlacementError::OutOfBounds)
        );
        assert_eq!(board.check_placement(CellCoord::new(2, 2)), Ok(()));
    }

    #[test]
    fn placing_twice_reports_occupied() {
        let mut board = board(5);

        let path = board
            .place(CellCoord::new(2, 2))
            .expect("first placement succeeds")
            .expect("path survives");
        assert!(!path.cells().contains(&CellCoord::new(2, 2)));
        assert_eq!(
            board.place(CellCoord::new(2, 2)),
            Err(PlacementError::Occupied)
        );
    }

    #[test]
    fn sealing_the_end_is_rejected_without_side_effects() {
        let mut board = board(15);
        assert!(board.place(CellCoord::new(13, 14)).is_ok());
        let before = board.occupancy();

        assert_eq!(
            board.check_placement(CellCoord::new(14, 13)),
            Err(PlacementError::BlocksPath)
        );
        assert_eq!(
            board.place(CellCoord::new(14, 13)),
            Err(PlacementError::BlocksPath)
        );
        assert_eq!(board.occupancy(), before);
        assert!(board.path().is_some());
    }

    #[test]
    fn invalid_cell_length_is_rejected() {
        let result = Board::new(&BoardConfig {
            cell_length: 0.0,
            ..BoardConfig::default()
        });

        assert_eq!(result.unwrap_err(), BoardError::InvalidCellLength);
    }
}
