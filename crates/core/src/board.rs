//! Board module - one participant's sliding-tile grid
//!
//! The board is a 5x5 grid of colored tiles with exactly one empty slot.
//! A tile may slide into the empty slot when it is an orthogonal neighbor of it.
//! Coordinates: (x, y) where x ranges 0..=4 (left to right), y ranges 0..=4 (top to bottom).
//!
//! The race is won when the inner 3x3 window, cells (1,1)..=(3,3), equals the
//! shared [`GoalPattern`].

use thiserror::Error;

use crate::types::{
    is_color, Cell, Goal, Layout, Pos, BOARD_SIDE, COLOR_CAP, COLOR_COUNT, EMPTY_CELL,
    GOAL_OFFSET, GOAL_SIDE,
};

/// Rejected board or goal contents.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("expected exactly one empty slot, found {0}")]
    EmptyCount(usize),
    #[error("empty slot is not at {0}")]
    EmptyMismatch(Pos),
    #[error("invalid color {value} at ({x}, {y})")]
    InvalidColor { x: usize, y: usize, value: Cell },
    #[error("color {color} appears {count} times, over the per-color cap")]
    ColorOverCap { color: Cell, count: u8 },
}

/// The 3x3 target every participant races to reproduce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GoalPattern {
    cells: Goal,
}

impl GoalPattern {
    /// Validate colors and the per-color cap.
    pub fn new(cells: Goal) -> Result<Self, BoardError> {
        let mut counts = [0u8; COLOR_COUNT as usize];
        for (y, row) in cells.iter().enumerate() {
            for (x, &value) in row.iter().enumerate() {
                if !is_color(value) {
                    return Err(BoardError::InvalidColor { x, y, value });
                }
                counts[value as usize] += 1;
            }
        }
        check_cap(&counts)?;
        Ok(Self { cells })
    }

    /// Skips validation; callers only ever place capped colors.
    pub(crate) fn from_parts(cells: Goal) -> Self {
        debug_assert!(Self::new(cells).is_ok());
        Self { cells }
    }

    pub fn cells(&self) -> &Goal {
        &self.cells
    }
}

/// A participant's private board.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PuzzleBoard {
    cells: Layout,
    empty: Pos,
}

impl PuzzleBoard {
    /// Build a board from a full layout and the position of its empty slot.
    ///
    /// The layout must contain exactly one `EMPTY_CELL`, at `empty`; every
    /// other cell must be a color.
    pub fn from_layout(cells: Layout, empty: Pos) -> Result<Self, BoardError> {
        let mut empties = 0usize;
        for (y, row) in cells.iter().enumerate() {
            for (x, &value) in row.iter().enumerate() {
                if value == EMPTY_CELL {
                    empties += 1;
                } else if !is_color(value) {
                    return Err(BoardError::InvalidColor { x, y, value });
                }
            }
        }
        if empties != 1 {
            return Err(BoardError::EmptyCount(empties));
        }
        if cell_at(&cells, empty) != EMPTY_CELL {
            return Err(BoardError::EmptyMismatch(empty));
        }
        Ok(Self { cells, empty })
    }

    /// Skips validation; callers uphold the single-empty-slot invariant.
    pub(crate) fn from_parts(cells: Layout, empty: Pos) -> Self {
        debug_assert!(Self::from_layout(cells, empty).is_ok());
        Self { cells, empty }
    }

    pub fn cells(&self) -> &Layout {
        &self.cells
    }

    /// Position of the empty slot
    pub fn empty(&self) -> Pos {
        self.empty
    }

    pub fn get(&self, pos: Pos) -> Cell {
        cell_at(&self.cells, pos)
    }

    /// True iff the empty slot is an orthogonal neighbor of `pos`.
    pub fn can_move(&self, pos: Pos) -> bool {
        pos.is_adjacent(self.empty)
    }

    /// Slide the tile at `pos` into the empty slot.
    ///
    /// Returns false and leaves the board untouched if the tile is not
    /// next to the empty slot.
    pub fn move_tile(&mut self, pos: Pos) -> bool {
        if !self.can_move(pos) {
            return false;
        }
        let old = self.empty;
        *cell_at_mut(&mut self.cells, old) = self.get(pos);
        *cell_at_mut(&mut self.cells, pos) = EMPTY_CELL;
        self.empty = pos;
        true
    }

    /// True iff the centered 3x3 window equals `goal` cell by cell.
    pub fn matches_pattern(&self, goal: &GoalPattern) -> bool {
        (0..GOAL_SIDE).all(|y| {
            (0..GOAL_SIDE).all(|x| {
                self.cells[y + GOAL_OFFSET][x + GOAL_OFFSET] == goal.cells[y][x]
            })
        })
    }

    /// Per-color tile counts (the empty slot is not counted).
    pub fn color_counts(&self) -> [u8; COLOR_COUNT as usize] {
        let mut counts = [0u8; COLOR_COUNT as usize];
        for &value in self.cells.iter().flatten() {
            if is_color(value) {
                counts[value as usize] += 1;
            }
        }
        counts
    }
}

fn cell_at(cells: &Layout, pos: Pos) -> Cell {
    cells[pos.y() as usize][pos.x() as usize]
}

fn cell_at_mut(cells: &mut Layout, pos: Pos) -> &mut Cell {
    &mut cells[pos.y() as usize][pos.x() as usize]
}

fn check_cap(counts: &[u8; COLOR_COUNT as usize]) -> Result<(), BoardError> {
    match counts.iter().enumerate().find(|&(_, &c)| c > COLOR_CAP) {
        Some((color, &count)) => Err(BoardError::ColorOverCap {
            color: color as Cell,
            count,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(x: i64, y: i64) -> Pos {
        Pos::new(x, y).unwrap()
    }

    /// Colors 0..6 repeating in reading order around the given empty slot.
    fn striped(empty: Pos) -> PuzzleBoard {
        let mut cells = [[0 as Cell; BOARD_SIDE]; BOARD_SIDE];
        let mut next = 0u8;
        for pos in Pos::all() {
            *cell_at_mut(&mut cells, pos) = if pos == empty {
                EMPTY_CELL
            } else {
                next += 1;
                ((next - 1) % COLOR_COUNT) as Cell
            };
        }
        PuzzleBoard::from_layout(cells, empty).unwrap()
    }

    #[test]
    fn test_can_move_only_orthogonal_neighbors() {
        let board = striped(pos(2, 2));
        let side = BOARD_SIDE as i64;
        for y in 0..side {
            for x in 0..side {
                let expected = matches!((x, y), (1, 2) | (3, 2) | (2, 1) | (2, 3));
                assert_eq!(board.can_move(pos(x, y)), expected, "at ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_can_move_at_corner() {
        let board = striped(pos(0, 0));
        assert!(board.can_move(pos(1, 0)));
        assert!(board.can_move(pos(0, 1)));
        assert!(!board.can_move(pos(1, 1)));
        assert!(!board.can_move(pos(0, 0)));
    }

    #[test]
    fn test_every_position_is_safe_to_query() {
        for empty in [pos(4, 4), pos(0, 0), pos(2, 2)] {
            let board = striped(empty);
            let movable = Pos::all().filter(|&p| board.can_move(p)).count();
            assert_eq!(movable, empty.neighbors().count());
            for p in Pos::all() {
                let mut copy = board.clone();
                assert_eq!(copy.move_tile(p), board.can_move(p), "at {}", p);
            }
        }
    }

    #[test]
    fn test_move_swaps_tile_into_empty_slot() {
        let mut board = striped(pos(2, 2));
        let moved = board.get(pos(2, 3));

        assert!(board.move_tile(pos(2, 3)));
        assert_eq!(board.empty(), pos(2, 3));
        assert_eq!(board.get(pos(2, 3)), EMPTY_CELL);
        assert_eq!(board.get(pos(2, 2)), moved);
    }

    #[test]
    fn test_invalid_move_is_a_no_op() {
        let mut board = striped(pos(2, 2));
        let before = board.clone();

        assert!(!board.move_tile(pos(4, 4)));
        assert!(!board.move_tile(pos(3, 3)));
        assert!(!board.move_tile(pos(2, 2)));
        assert_eq!(board, before);
    }

    #[test]
    fn test_from_layout_rejects_bad_layouts() {
        let good = striped(pos(0, 0));
        let mut cells = *good.cells();

        assert_eq!(
            PuzzleBoard::from_layout(cells, pos(1, 0)),
            Err(BoardError::EmptyMismatch(pos(1, 0)))
        );

        cells[4][4] = EMPTY_CELL;
        assert_eq!(
            PuzzleBoard::from_layout(cells, pos(0, 0)),
            Err(BoardError::EmptyCount(2))
        );

        cells[4][4] = 9;
        assert!(matches!(
            PuzzleBoard::from_layout(cells, pos(0, 0)),
            Err(BoardError::InvalidColor { value: 9, .. })
        ));
    }

    #[test]
    fn test_goal_pattern_enforces_cap() {
        assert!(GoalPattern::new([[0, 0, 0], [0, 1, 1], [1, 1, 2]]).is_ok());
        assert_eq!(
            GoalPattern::new([[0, 0, 0], [0, 0, 1], [1, 1, 2]]),
            Err(BoardError::ColorOverCap { color: 0, count: 5 })
        );
        assert!(matches!(
            GoalPattern::new([[0, 0, 0], [0, 1, 1], [1, 1, EMPTY_CELL]]),
            Err(BoardError::InvalidColor { .. })
        ));
    }

    #[test]
    fn test_matches_pattern_reads_center_window() {
        let board = striped(pos(0, 0));
        let mut goal = [[0 as Cell; GOAL_SIDE]; GOAL_SIDE];
        for y in 0..GOAL_SIDE {
            for x in 0..GOAL_SIDE {
                goal[y][x] = board.cells()[y + 1][x + 1];
            }
        }
        let goal = GoalPattern::new(goal).unwrap();
        assert!(board.matches_pattern(&goal));
    }
}
