//! Game session - two private boards racing toward one shared goal
//!
//! Both boards start from the same layout but are independent copies, so
//! each participant's moves only ever touch their own board.

use std::fmt;

use tracing::debug;

use crate::board::{GoalPattern, PuzzleBoard};
use crate::pattern::Dealer;
use crate::types::{Goal, Layout, ParticipantId, Pos};

/// Identifier the coordinator assigns to each session it creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a participant needs to draw their own board at game start.
///
/// Never contains the opponent's board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitData {
    pub table: Layout,
    pub empty: Pos,
    pub goal: Goal,
}

/// One running race between two participants.
#[derive(Debug, Clone)]
pub struct GameSession {
    id: SessionId,
    participant_a: ParticipantId,
    participant_b: ParticipantId,
    board_a: PuzzleBoard,
    board_b: PuzzleBoard,
    goal: GoalPattern,
}

impl GameSession {
    /// Start a session where both participants get a copy of `initial`.
    pub fn new(
        id: SessionId,
        participant_a: ParticipantId,
        participant_b: ParticipantId,
        initial: PuzzleBoard,
        goal: GoalPattern,
    ) -> Self {
        debug_assert_ne!(participant_a, participant_b);
        Self {
            id,
            participant_a,
            participant_b,
            board_a: initial.clone(),
            board_b: initial,
            goal,
        }
    }

    /// Start a session with a freshly dealt board and goal.
    pub fn deal(
        id: SessionId,
        participant_a: ParticipantId,
        participant_b: ParticipantId,
        dealer: &mut dyn Dealer,
    ) -> Self {
        let (initial, goal) = dealer.deal();
        Self::new(id, participant_a, participant_b, initial, goal)
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Both participants, in registration order.
    pub fn participants(&self) -> [ParticipantId; 2] {
        [self.participant_a, self.participant_b]
    }

    pub fn goal(&self) -> &GoalPattern {
        &self.goal
    }

    pub fn contains(&self, participant: ParticipantId) -> bool {
        participant == self.participant_a || participant == self.participant_b
    }

    pub fn opponent_of(&self, participant: ParticipantId) -> Option<ParticipantId> {
        if participant == self.participant_a {
            Some(self.participant_b)
        } else if participant == self.participant_b {
            Some(self.participant_a)
        } else {
            None
        }
    }

    pub fn board_of(&self, participant: ParticipantId) -> Option<&PuzzleBoard> {
        if participant == self.participant_a {
            Some(&self.board_a)
        } else if participant == self.participant_b {
            Some(&self.board_b)
        } else {
            None
        }
    }

    fn board_of_mut(&mut self, participant: ParticipantId) -> Option<&mut PuzzleBoard> {
        if participant == self.participant_a {
            Some(&mut self.board_a)
        } else if participant == self.participant_b {
            Some(&mut self.board_b)
        } else {
            None
        }
    }

    /// Move a tile on `participant`'s own board.
    ///
    /// Returns whether the board changed. Strangers and non-adjacent tiles are ignored.
    /// Does not check for a win; call [`GameSession::winner`] separately.
    pub fn apply_move(&mut self, participant: ParticipantId, pos: Pos) -> bool {
        let session = self.id;
        let Some(board) = self.board_of_mut(participant) else {
            debug!(%session, %participant, "move from non-participant ignored");
            return false;
        };
        let moved = board.move_tile(pos);
        if !moved {
            debug!(%session, %participant, %pos, "tile not adjacent to empty slot");
        }
        moved
    }

    /// The participant whose board shows the goal, if any.
    ///
    /// If both boards match, participant A wins.
    pub fn winner(&self) -> Option<ParticipantId> {
        if self.board_a.matches_pattern(&self.goal) {
            Some(self.participant_a)
        } else if self.board_b.matches_pattern(&self.goal) {
            Some(self.participant_b)
        } else {
            None
        }
    }

    /// Snapshot of `participant`'s board plus the shared goal.
    pub fn init_data(&self, participant: ParticipantId) -> Option<InitData> {
        let board = self.board_of(participant)?;
        Some(InitData {
            table: *board.cells(),
            empty: board.empty(),
            goal: *self.goal.cells(),
        })
    }
}
