//! A* shortest-path search over the board grid.
//!
//! The open set is a binary heap keyed on `f = g + h`. Entries with equal
//! `f` are popped in insertion order, so among equally promising cells the one
//! discovered first wins. Neighbors are discovered in a fixed order (up, right,
//! down, left, then up-right, down-right, down-left, up-left), which makes the
//! returned path deterministic for symmetric layouts.

use std::{cmp::Ordering, collections::BinaryHeap, f64::consts::SQRT_2};

use grid_defence_core::{CellCoord, Path};

const CARDINAL_STEPS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];
const DIAGONAL_STEPS: [(i32, i32); 4] = [(1, -1), (1, 1), (-1, 1), (-1, -1)];
const CARDINAL_COST: f64 = 1.0;
const DIAGONAL_COST: f64 = SQRT_2;

/// Finds the cheapest path from `start` to `end` on a `size × size` grid.
///
/// `is_blocked` reports occupied cells. The start and end cells are always
/// traversable. Returns `None` when the end is unreachable.
pub(crate) fn find_path<F>(
    size: u32,
    start: CellCoord,
    end: CellCoord,
    allow_diagonal: bool,
    mut is_blocked: F,
) -> Option<Path>
where
    F: FnMut(CellCoord) -> bool,
{
    let side = size as usize;
    let in_bounds = |cell: CellCoord| cell.column() < size && cell.row() < size;
    if !in_bounds(start) || !in_bounds(end) {
        return None;
    }

    let mut is_open = |cell: CellCoord| {
        in_bounds(cell) && (cell == start || cell == end || !is_blocked(cell))
    };

    let heuristic = |cell: CellCoord| {
        if allow_diagonal {
            euclidean(cell, end)
        } else {
            f64::from(cell.manhattan_distance(end))
        }
    };

    let cell_count = side * side;
    let mut best_cost = vec![f64::INFINITY; cell_count];
    let mut came_from: Vec<Option<usize>> = vec![None; cell_count];
    let mut closed = vec![false; cell_count];
    let mut open = BinaryHeap::new();
    let mut sequence = 0u64;

    let start_index = index(side, start);
    best_cost[start_index] = 0.0;
    open.push(OpenEntry {
        estimate: heuristic(start),
        sequence,
        index: start_index,
    });

    while let Some(entry) = open.pop() {
        if closed[entry.index] {
            continue;
        }
        closed[entry.index] = true;

        let cell = coord(side, entry.index);
        if cell == end {
            return Some(reconstruct(side, &came_from, entry.index));
        }

        let cost_so_far = best_cost[entry.index];
        for (neighbor, step_cost) in neighbors(cell, allow_diagonal, &mut is_open) {
            let neighbor_index = index(side, neighbor);
            if closed[neighbor_index] {
                continue;
            }

            let tentative = cost_so_far + step_cost;
            if tentative >= best_cost[neighbor_index] {
                continue;
            }

            best_cost[neighbor_index] = tentative;
            came_from[neighbor_index] = Some(entry.index);
            sequence += 1;
            open.push(OpenEntry {
                estimate: tentative + heuristic(neighbor),
                sequence,
                index: neighbor_index,
            });
        }
    }

    None
}

/// Lists the legal moves out of `cell`.
///
/// Cardinal moves need an open destination. Diagonal moves additionally need
/// at least one of the two orthogonally adjacent cells to be open, which
/// forbids squeezing between two occupied cells.
fn neighbors<F>(
    cell: CellCoord,
    allow_diagonal: bool,
    is_open: &mut F,
) -> impl Iterator<Item = (CellCoord, f64)>
where
    F: FnMut(CellCoord) -> bool,
{
    let mut candidates = [None; 8];
    let mut count = 0;

    for (columns, rows) in CARDINAL_STEPS {
        if let Some(next) = cell.offset(columns, rows) {
            if is_open(next) {
                candidates[count] = Some((next, CARDINAL_COST));
                count += 1;
            }
        }
    }

    if allow_diagonal {
        for (columns, rows) in DIAGONAL_STEPS {
            let Some(next) = cell.offset(columns, rows) else {
                continue;
            };
            if !is_open(next) {
                continue;
            }

            let horizontal = cell.offset(columns, 0).map_or(false, |side| is_open(side));
            let vertical = cell.offset(0, rows).map_or(false, |side| is_open(side));
            if horizontal || vertical {
                candidates[count] = Some((next, DIAGONAL_COST));
                count += 1;
            }
        }
    }

    candidates.into_iter().flatten()
}

fn reconstruct(side: usize, came_from: &[Option<usize>], goal: usize) -> Path {
    let mut cells = vec![coord(side, goal)];
    let mut current = goal;
    while let Some(previous) = came_from[current] {
        cells.push(coord(side, previous));
        current = previous;
    }
    cells.reverse();
    Path::new(cells)
}

fn euclidean(from: CellCoord, to: CellCoord) -> f64 {
    let columns = f64::from(from.column().abs_diff(to.column()));
    let rows = f64::from(from.row().abs_diff(to.row()));
    columns.hypot(rows)
}

fn index(side: usize, cell: CellCoord) -> usize {
    cell.row() as usize * side + cell.column() as usize
}

fn coord(side: usize, index: usize) -> CellCoord {
    CellCoord::new((index % side) as u32, (index / side) as u32)
}

/// Heap entry ordered so the lowest estimate, then the earliest insertion, pops first.
#[derive(Clone, Copy, Debug)]
struct OpenEntry {
    estimate: f64,
    sequence: u64,
    index: usize,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .estimate
            .total_cmp(&self.estimate)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}
