//! Pattern module - random boards and goals
//!
//! Both the starting layout and the goal are filled cell by cell with colors
//! drawn uniformly from `0..6`. A draw is rejected and retried when its color
//! has already been used `COLOR_CAP` times.
//!
//! For the 24 tiles of a board this always ends with exactly four tiles of each
//! color. For the 9 cells of a goal the cap only bounds the spread.
//!
//! The layout and the goal are drawn independently; nothing guarantees that
//! a given goal is reachable from a given layout.

use crate::board::{GoalPattern, PuzzleBoard};
use crate::rng::SimpleRng;
use crate::types::{
    Cell, Goal, Layout, Pos, BOARD_SIDE, COLOR_CAP, COLOR_COUNT, EMPTY_CELL, GOAL_SIDE,
};

/// Source of the starting board and goal for a new session.
pub trait Dealer {
    fn deal(&mut self) -> (PuzzleBoard, GoalPattern);
}

/// Rejection sampler over the six colors.
#[derive(Debug, Clone, Default)]
struct ColorBudget {
    used: [u8; COLOR_COUNT as usize],
}

impl ColorBudget {
    fn draw(&mut self, rng: &mut SimpleRng) -> Cell {
        debug_assert!(self.used.iter().any(|&n| n < COLOR_CAP));
        loop {
            let color = rng.next_range(COLOR_COUNT as u32) as usize;
            if self.used[color] < COLOR_CAP {
                self.used[color] += 1;
                return color as Cell;
            }
        }
    }
}

/// Random board and goal generator.
#[derive(Debug, Clone)]
pub struct PatternGenerator {
    rng: SimpleRng,
}

impl PatternGenerator {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: SimpleRng::new(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: SimpleRng::from_entropy(),
        }
    }

    /// A full board: random empty slot, 24 tiles with four of each color.
    pub fn initial_layout(&mut self) -> PuzzleBoard {
        let slot = self.rng.next_range((BOARD_SIDE * BOARD_SIDE) as u32) as usize;
        let empty = Pos::all().nth(slot).unwrap_or_default();

        let mut budget = ColorBudget::default();
        let mut cells: Layout = [[EMPTY_CELL; BOARD_SIDE]; BOARD_SIDE];
        for pos in Pos::all().filter(|&p| p != empty) {
            cells[pos.y() as usize][pos.x() as usize] = budget.draw(&mut self.rng);
        }

        PuzzleBoard::from_parts(cells, empty)
    }

    /// A 3x3 goal with no color used more than four times.
    pub fn goal_pattern(&mut self) -> GoalPattern {
        let mut budget = ColorBudget::default();
        let mut cells: Goal = [[0; GOAL_SIDE]; GOAL_SIDE];
        for cell in cells.iter_mut().flatten() {
            *cell = budget.draw(&mut self.rng);
        }

        GoalPattern::from_parts(cells)
    }
}

impl Dealer for PatternGenerator {
    fn deal(&mut self) -> (PuzzleBoard, GoalPattern) {
        let goal = self.goal_pattern();
        let board = self.initial_layout();
        (board, goal)
    }
}
