//! Shared fixtures for the integration tests

use slide_duel::core::{Dealer, GoalPattern, PuzzleBoard};
use slide_duel::types::{Cell, Pos, BOARD_SIDE, EMPTY_CELL};

/// Always deals a board that is one slide away from its goal.
pub struct OneMoveDealer;

impl OneMoveDealer {
    /// Empty slot of every dealt board.
    pub fn empty_slot() -> Pos {
        Pos::new(2, 1).unwrap()
    }

    /// Sliding the tile at this position completes the goal.
    pub fn winning_move() -> Pos {
        Pos::new(2, 0).unwrap()
    }
}

impl Dealer for OneMoveDealer {
    fn deal(&mut self) -> (PuzzleBoard, GoalPattern) {
        let goal = GoalPattern::new([[0, 1, 2], [3, 4, 5], [0, 1, 2]]).unwrap();
        let ring: [Cell; 16] = [3, 3, 1, 4, 4, 4, 5, 5, 5, 3, 0, 0, 1, 1, 2, 2];
        let mut rest = ring.iter();
        let mut cells = [[0 as Cell; BOARD_SIDE]; BOARD_SIDE];
        for y in 0..BOARD_SIDE {
            for x in 0..BOARD_SIDE {
                let inner = (1..=3).contains(&x) && (1..=3).contains(&y);
                cells[y][x] = if inner {
                    goal.cells()[y - 1][x - 1]
                } else {
                    *rest.next().unwrap()
                };
            }
        }
        cells[1][2] = EMPTY_CELL;
        let board = PuzzleBoard::from_layout(cells, Self::empty_slot()).unwrap();
        (board, goal)
    }
}
