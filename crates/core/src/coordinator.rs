//! Session coordinator - process-wide registry of participants and races
//!
//! The coordinator owns every piece of shared state:
//!
//! - `connections`: participant code -> connection handle
//! - `active_sessions`: participant code -> the session they play in
//! - `all_sessions`: session id -> session (membership mirrors `active_sessions`)
//!
//! All operations take `&mut self`; the transport wraps the coordinator in a
//! single lock so each call runs as one critical section. Every operation is
//! fire-and-forget for the caller: results reach participants as [`Notice`]s
//! delivered through their [`Connection`].
//!
//! # Participant lifecycle
//!
//! ```text
//! register_connection ──► Idle ──request_pairing──► InSession
//!                          ▲                           │
//!                          └──── win check / disconnect┘
//! ```
//!
//! Pairing is atomic: both participants enter `InSession` in the same call.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::pattern::{Dealer, PatternGenerator};
use crate::rng::SimpleRng;
use crate::session::{GameSession, InitData, SessionId};
use crate::types::{ParticipantId, Pos, ID_MAX, ID_MIN};

/// Outbound event addressed to one participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The code assigned to this connection.
    SelfId(ParticipantId),
    /// Pairing succeeded; carries the recipient's own board and the shared goal.
    StartGame(InitData),
    /// The race is over.
    GameEnd { win: bool },
    /// The opponent left; the session is gone.
    OpponentDisconnected,
    AlreadyPlaying,
    NotSelf,
    NotExistId,
}

/// Transport-side handle used to reach one participant.
pub trait Connection {
    /// Queue `notice` for delivery. Returns false if the peer is already gone.
    fn deliver(&self, notice: Notice) -> bool;
}

/// Why a pairing request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PairingError {
    #[error("cannot pair with yourself")]
    SelfPairing,
    #[error("no connected participant has code {0}")]
    UnknownTarget(ParticipantId),
    #[error("participant {0} is already playing")]
    TargetBusy(ParticipantId),
    #[error("requester is already playing")]
    RequesterBusy,
}

impl PairingError {
    /// The notice sent back to the requester.
    pub fn notice(&self) -> Notice {
        match self {
            PairingError::SelfPairing => Notice::NotSelf,
            PairingError::UnknownTarget(_) => Notice::NotExistId,
            PairingError::TargetBusy(_) | PairingError::RequesterBusy => Notice::AlreadyPlaying,
        }
    }
}

/// Registry of connections and running sessions.
pub struct SessionCoordinator<C> {
    connections: HashMap<ParticipantId, C>,
    active_sessions: HashMap<ParticipantId, SessionId>,
    all_sessions: HashMap<SessionId, GameSession>,
    id_rng: SimpleRng,
    dealer: Box<dyn Dealer + Send>,
    next_session_id: u64,
}

impl<C: Connection> SessionCoordinator<C> {
    /// Coordinator with independently seeded code and board streams.
    pub fn new() -> Self {
        Self::with_dealer(
            SimpleRng::from_entropy(),
            Box::new(PatternGenerator::from_entropy()),
        )
    }

    /// Fully deterministic coordinator: same seed, same codes and boards.
    ///
    /// The code and board streams get their own seeds, expanded from `seed`.
    pub fn with_seed(seed: u32) -> Self {
        let mut seeder = StdRng::seed_from_u64(u64::from(seed));
        Self::with_dealer(
            SimpleRng::new(seeder.random()),
            Box::new(PatternGenerator::new(seeder.random())),
        )
    }

    pub fn with_dealer(id_rng: SimpleRng, dealer: Box<dyn Dealer + Send>) -> Self {
        Self {
            connections: HashMap::new(),
            active_sessions: HashMap::new(),
            all_sessions: HashMap::new(),
            id_rng,
            dealer,
            next_session_id: 1,
        }
    }

    /// Store a new connection under a fresh code and send it `SelfId`.
    ///
    /// Codes are drawn from `ID_MIN..=ID_MAX` and redrawn until unused.
    pub fn register_connection(&mut self, handle: C) -> ParticipantId {
        let id = loop {
            let code = self.id_rng.range_inclusive(ID_MIN, ID_MAX);
            let Some(candidate) = ParticipantId::new(code) else {
                continue;
            };
            if !self.connections.contains_key(&candidate) {
                break candidate;
            }
            debug!(participant = %candidate, "participant code collision, redrawing");
        };

        if !handle.deliver(Notice::SelfId(id)) {
            debug!(participant = %id, "connection closed before receiving its code");
        }
        self.connections.insert(id, handle);
        info!(participant = %id, connected = self.connections.len(), "participant connected");
        id
    }

    /// Pair `requester` with the participant holding `target`.
    ///
    /// On success both participants receive `StartGame` with their own board.
    /// On failure only the requester is notified and nothing changes.
    pub fn request_pairing(
        &mut self,
        requester: ParticipantId,
        target: ParticipantId,
    ) -> Result<SessionId, PairingError> {
        let result = self.check_pairing(requester, target);
        if let Err(err) = result {
            info!(%requester, %target, reason = %err, "pairing refused");
            self.send(requester, err.notice());
            return Err(err);
        }

        let id = SessionId(self.next_session_id);
        self.next_session_id += 1;
        let session = GameSession::deal(id, requester, target, self.dealer.as_mut());

        for participant in session.participants() {
            if let Some(init) = session.init_data(participant) {
                self.send(participant, Notice::StartGame(init));
            }
            self.active_sessions.insert(participant, id);
        }
        self.all_sessions.insert(id, session);

        info!(session = %id, %requester, %target, "session started");
        Ok(id)
    }

    fn check_pairing(
        &self,
        requester: ParticipantId,
        target: ParticipantId,
    ) -> Result<(), PairingError> {
        if requester == target {
            return Err(PairingError::SelfPairing);
        }
        if !self.connections.contains_key(&target) {
            return Err(PairingError::UnknownTarget(target));
        }
        if self.active_sessions.contains_key(&target) {
            return Err(PairingError::TargetBusy(target));
        }
        if self.active_sessions.contains_key(&requester) {
            return Err(PairingError::RequesterBusy);
        }
        Ok(())
    }

    /// Move a tile on `participant`'s board. Ignored without an active session.
    pub fn handle_move(&mut self, participant: ParticipantId, pos: Pos) -> bool {
        let Some(session) = self.session_mut(participant) else {
            debug!(%participant, %pos, "move outside of a session ignored");
            return false;
        };
        session.apply_move(participant, pos)
    }

    /// Check whether either board in `participant`'s session shows the goal.
    ///
    /// On a win the session is torn down and both sides get `GameEnd`.
    /// Returns the winner, if any.
    pub fn handle_win_probe(&mut self, participant: ParticipantId) -> Option<ParticipantId> {
        let found = self
            .session_of(participant)
            .and_then(|id| self.all_sessions.get(&id));
        let Some(session) = found else {
            debug!(%participant, "win check outside of a session ignored");
            return None;
        };
        let session_id = session.id();
        let winner = session.winner()?;

        let session = self.teardown(session_id)?;
        for p in session.participants() {
            let win = p == winner;
            if !self.connections.contains_key(&p) {
                warn!(session = %session_id, participant = %p, "session outlived its connection");
                continue;
            }
            self.send(p, Notice::GameEnd { win });
        }
        info!(session = %session_id, %winner, "session won");
        Some(winner)
    }

    /// Drop `participant`'s connection and end their session, if any.
    ///
    /// Returns the opponent that was told about the disconnect. The notice is
    /// dropped if the opponent has already disconnected too.
    pub fn handle_disconnect(&mut self, participant: ParticipantId) -> Option<ParticipantId> {
        if self.connections.remove(&participant).is_none() {
            debug!(%participant, "disconnect for unknown participant");
        }
        info!(%participant, connected = self.connections.len(), "participant disconnected");

        let session_id = self.session_of(participant)?;
        let session = self.teardown(session_id)?;
        let opponent = session.opponent_of(participant)?;
        info!(session = %session_id, %participant, "session abandoned");

        if self.connections.contains_key(&opponent) {
            self.send(opponent, Notice::OpponentDisconnected);
            Some(opponent)
        } else {
            debug!(session = %session_id, %opponent, "opponent already gone");
            None
        }
    }

    /// Remove a session from every map at once.
    fn teardown(&mut self, session_id: SessionId) -> Option<GameSession> {
        let session = self.all_sessions.remove(&session_id);
        // Sweep by value so a lost session can never leave a half-paired entry.
        self.active_sessions.retain(|_, id| *id != session_id);
        if session.is_none() {
            warn!(session = %session_id, "participants referenced a missing session");
        }
        session
    }

    fn session_mut(&mut self, participant: ParticipantId) -> Option<&mut GameSession> {
        let id = self.active_sessions.get(&participant)?;
        self.all_sessions.get_mut(id)
    }

    fn send(&self, participant: ParticipantId, notice: Notice) {
        match self.connections.get(&participant) {
            Some(conn) => {
                if !conn.deliver(notice) {
                    debug!(%participant, "delivery to closing connection dropped");
                }
            }
            None => debug!(%participant, "no connection for notice"),
        }
    }

    pub fn is_connected(&self, participant: ParticipantId) -> bool {
        self.connections.contains_key(&participant)
    }

    pub fn session_of(&self, participant: ParticipantId) -> Option<SessionId> {
        self.active_sessions.get(&participant).copied()
    }

    pub fn session(&self, id: SessionId) -> Option<&GameSession> {
        self.all_sessions.get(&id)
    }

    pub fn connected_count(&self) -> usize {
        self.connections.len()
    }

    pub fn active_session_count(&self) -> usize {
        self.all_sessions.len()
    }
}

impl<C: Connection> Default for SessionCoordinator<C> {
    fn default() -> Self {
        Self::new()
    }
}
