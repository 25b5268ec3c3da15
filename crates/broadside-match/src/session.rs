//! Match session state: seats, turns, outcome.
//!
//! Everything here is synchronous and free of I/O. The actor queries the
//! board service and feeds the answers in; this module decides what they
//! mean.

use std::collections::VecDeque;

use broadside_liveness::Liveness;
use broadside_protocol::{
    ChatMessage, ConnectionId, MatchId, MatchView, PlayerId, Turn,
};

use crate::{MatchError, MatchPhase};

/// Most connections a session ever registers: one per seat.
const MAX_CONNECTIONS: usize = 2;

/// A player's transport endpoint as the match sees it: an id for
/// addressing and a liveness signal to watch.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    pub id: ConnectionId,
    pub liveness: Liveness,
}

impl ConnectionHandle {
    pub fn new(id: ConnectionId, liveness: Liveness) -> Self {
        Self { id, liveness }
    }
}

/// The two seats at a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seat {
    Attacker,
    Defender,
}

/// What a join request amounts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The player is already seated; nothing changes.
    Rejoin,
    /// The player takes this seat.
    Seat(Seat),
}

/// The state of one match. Owned and mutated only by its actor.
#[derive(Debug)]
pub struct MatchSession {
    id: MatchId,
    attacker: Option<PlayerId>,
    defender: Option<PlayerId>,
    connections: Vec<ConnectionHandle>,
    /// Most recent first.
    turns: VecDeque<Turn>,
    messages: Vec<ChatMessage>,
    over: bool,
    winner: Option<PlayerId>,
    terminated: bool,
}

impl MatchSession {
    /// Creates an empty session.
    pub fn new(id: MatchId) -> Self {
        Self {
            id,
            attacker: None,
            defender: None,
            connections: Vec::with_capacity(MAX_CONNECTIONS),
            turns: VecDeque::new(),
            messages: Vec::new(),
            over: false,
            winner: None,
            terminated: false,
        }
    }

    pub fn id(&self) -> MatchId {
        self.id
    }

    pub fn attacker(&self) -> Option<PlayerId> {
        self.attacker
    }

    pub fn defender(&self) -> Option<PlayerId> {
        self.defender
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    /// Registered connections, in join order.
    pub fn connections(&self) -> &[ConnectionHandle] {
        &self.connections
    }

    /// Both seated players, attacker first. Empty seats are skipped.
    pub fn players(&self) -> impl Iterator<Item = PlayerId> {
        [self.attacker, self.defender].into_iter().flatten()
    }

    pub fn is_seated(&self, player_id: PlayerId) -> bool {
        self.attacker == Some(player_id) || self.defender == Some(player_id)
    }

    pub fn phase(&self) -> MatchPhase {
        if self.terminated {
            MatchPhase::Terminated
        } else if self.over {
            MatchPhase::Over
        } else {
            match (self.attacker, self.defender) {
                (None, _) => MatchPhase::Empty,
                (Some(_), None) => MatchPhase::OnePlayer,
                (Some(_), Some(_)) => MatchPhase::Active,
            }
        }
    }

    /// Decides what a join by `player_id` does, without changing anything.
    ///
    /// A seated player may always rejoin. Anyone else gets the next free
    /// seat, attacker first, or [`MatchError::NoMorePlayers`].
    pub fn admit(&self, player_id: PlayerId) -> Result<Admission, MatchError> {
        if self.is_seated(player_id) {
            return Ok(Admission::Rejoin);
        }
        match (self.attacker, self.defender) {
            (None, _) => Ok(Admission::Seat(Seat::Attacker)),
            (Some(_), None) => Ok(Admission::Seat(Seat::Defender)),
            (Some(_), Some(_)) => Err(MatchError::NoMorePlayers),
        }
    }

    /// Puts `player_id` in `seat` and registers its connection.
    ///
    /// Callers get `seat` from [`admit`](Self::admit); an occupied seat is
    /// never overwritten.
    pub fn seat(
        &mut self,
        seat: Seat,
        player_id: PlayerId,
        connection: ConnectionHandle,
    ) -> Result<(), MatchError> {
        let slot = match seat {
            Seat::Attacker => &mut self.attacker,
            Seat::Defender => &mut self.defender,
        };
        if slot.is_some() || self.connections.len() >= MAX_CONNECTIONS {
            return Err(MatchError::NoMorePlayers);
        }
        *slot = Some(player_id);
        self.connections.push(connection);
        Ok(())
    }

    /// The other seated player, if there is one.
    ///
    /// The attacker comparison is checked first. A player holding neither
    /// seat is rejected rather than mapped to anything.
    pub fn opponent_of(
        &self,
        player_id: PlayerId,
    ) -> Result<Option<PlayerId>, MatchError> {
        if self.attacker == Some(player_id) {
            Ok(self.defender)
        } else if self.defender == Some(player_id) {
            Ok(self.attacker)
        } else {
            Err(MatchError::UnknownPlayer(player_id))
        }
    }

    /// Records a resolved shot.
    pub fn record_turn(&mut self, turn: Turn) {
        self.turns.push_front(turn);
    }

    /// Applies the win rule to the remaining hit points of both boards and
    /// returns the winner, if this call decided one.
    ///
    /// The attacker's board is checked first, so if both fleets are gone
    /// at once the defender wins. That ordering is a fixed convention.
    /// Once a winner is recorded later evaluations change nothing.
    pub fn evaluate_win(
        &mut self,
        attacker_hit_points: u32,
        defender_hit_points: u32,
    ) -> Option<PlayerId> {
        if self.winner.is_some() {
            return None;
        }
        let winner = match (attacker_hit_points, defender_hit_points) {
            (0, _) => self.defender?,
            (_, 0) => self.attacker?,
            _ => return None,
        };
        self.over = true;
        self.winner = Some(winner);
        Some(winner)
    }

    /// Marks the match over because `player_id` left. The opponent, if
    /// any, becomes the winner unless one is already recorded.
    pub fn leave(&mut self, player_id: PlayerId) -> Result<(), MatchError> {
        let opponent = self.opponent_of(player_id)?;
        self.over = true;
        if self.winner.is_none() {
            self.winner = opponent;
        }
        Ok(())
    }

    /// Appends a chat line from a seated player.
    pub fn add_message(
        &mut self,
        player_id: PlayerId,
        text: String,
    ) -> Result<(), MatchError> {
        if !self.is_seated(player_id) {
            return Err(MatchError::UnknownPlayer(player_id));
        }
        self.messages.push(ChatMessage { player_id, text });
        Ok(())
    }

    pub(crate) fn mark_terminated(&mut self) {
        self.terminated = true;
    }

    /// A snapshot for callers. Connections are left out.
    pub fn view(&self) -> MatchView {
        MatchView {
            id: self.id,
            attacker: self.attacker,
            defender: self.defender,
            turns: self.turns.iter().cloned().collect(),
            messages: self.messages.clone(),
            over: self.over,
            winner: self.winner,
        }
    }
}

#[cfg(test)]
mod tests {
    use broadside_liveness::Lifeline;
    use broadside_protocol::ShotResult;

    use super::*;

    const A: PlayerId = PlayerId(1);
    const B: PlayerId = PlayerId(2);
    const C: PlayerId = PlayerId(3);

    fn conn(id: u64) -> ConnectionHandle {
        // Sessions never look at liveness; the lifeline can go.
        let (_, liveness) = Lifeline::new();
        ConnectionHandle::new(ConnectionId::new(id), liveness)
    }

    fn join(session: &mut MatchSession, player_id: PlayerId) -> Result<Admission, MatchError> {
        let admission = session.admit(player_id)?;
        if let Admission::Seat(seat) = admission {
            session.seat(seat, player_id, conn(player_id.0))?;
        }
        Ok(admission)
    }

    fn two_player_session() -> MatchSession {
        let mut session = MatchSession::new(MatchId(1));
        join(&mut session, A).unwrap();
        join(&mut session, B).unwrap();
        session
    }

    fn turn(player_id: PlayerId, x: u8) -> Turn {
        Turn { player_id, x, y: 0, result: ShotResult::Miss }
    }

    #[test]
    fn test_seats_fill_attacker_then_defender_then_refuse() {
        let mut session = MatchSession::new(MatchId(1));
        assert_eq!(session.phase(), MatchPhase::Empty);

        assert_eq!(join(&mut session, A).unwrap(), Admission::Seat(Seat::Attacker));
        assert_eq!(session.phase(), MatchPhase::OnePlayer);
        assert_eq!(join(&mut session, B).unwrap(), Admission::Seat(Seat::Defender));
        assert_eq!(session.phase(), MatchPhase::Active);

        assert!(matches!(join(&mut session, C), Err(MatchError::NoMorePlayers)));
        assert_eq!(session.attacker(), Some(A));
        assert_eq!(session.defender(), Some(B));
        assert_eq!(session.connections().len(), 2);
    }

    #[test]
    fn test_rejoin_changes_nothing() {
        let mut session = two_player_session();
        session.record_turn(turn(A, 1));

        assert_eq!(join(&mut session, A).unwrap(), Admission::Rejoin);
        assert_eq!(join(&mut session, B).unwrap(), Admission::Rejoin);

        assert_eq!(session.attacker(), Some(A));
        assert_eq!(session.defender(), Some(B));
        assert_eq!(session.connections().len(), 2);
        assert_eq!(session.view().turns.len(), 1);
    }

    #[test]
    fn test_seat_refuses_occupied_slot() {
        let mut session = two_player_session();
        let result = session.seat(Seat::Attacker, C, conn(3));
        assert!(matches!(result, Err(MatchError::NoMorePlayers)));
        assert_eq!(session.attacker(), Some(A));
    }

    #[test]
    fn test_opponent_resolution() {
        let mut session = MatchSession::new(MatchId(1));
        join(&mut session, A).unwrap();
        assert_eq!(session.opponent_of(A).unwrap(), None);

        join(&mut session, B).unwrap();
        assert_eq!(session.opponent_of(A).unwrap(), Some(B));
        assert_eq!(session.opponent_of(B).unwrap(), Some(A));
        assert!(matches!(session.opponent_of(C), Err(MatchError::UnknownPlayer(p)) if p == C));
    }

    #[test]
    fn test_turns_are_most_recent_first() {
        let mut session = two_player_session();
        session.record_turn(turn(A, 1));
        session.record_turn(turn(B, 2));
        session.record_turn(turn(A, 3));

        let xs: Vec<u8> = session.view().turns.iter().map(|t| t.x).collect();
        assert_eq!(xs, vec![3, 2, 1]);
    }

    #[test]
    fn test_evaluate_win_defender_fleet_gone_attacker_wins() {
        let mut session = two_player_session();
        assert_eq!(session.evaluate_win(5, 0), Some(A));
        assert!(session.is_over());
        assert_eq!(session.winner(), Some(A));
        assert_eq!(session.phase(), MatchPhase::Over);
    }

    #[test]
    fn test_evaluate_win_checks_attacker_board_first() {
        let mut session = two_player_session();
        assert_eq!(session.evaluate_win(0, 0), Some(B));
        assert_eq!(session.winner(), Some(B));
    }

    #[test]
    fn test_evaluate_win_no_change_while_both_afloat() {
        let mut session = two_player_session();
        assert_eq!(session.evaluate_win(3, 4), None);
        assert!(!session.is_over());
        assert_eq!(session.winner(), None);
    }

    #[test]
    fn test_winner_is_recorded_once() {
        let mut session = two_player_session();
        session.evaluate_win(4, 0);
        assert_eq!(session.evaluate_win(0, 0), None);
        session.leave(A).unwrap();
        assert_eq!(session.winner(), Some(A));
    }

    #[test]
    fn test_leave_awards_opponent() {
        let mut session = two_player_session();
        session.leave(A).unwrap();
        assert!(session.is_over());
        assert_eq!(session.winner(), Some(B));
    }

    #[test]
    fn test_leave_without_opponent_has_no_winner() {
        let mut session = MatchSession::new(MatchId(1));
        join(&mut session, A).unwrap();
        session.leave(A).unwrap();
        assert!(session.is_over());
        assert_eq!(session.winner(), None);
    }

    #[test]
    fn test_leave_by_stranger_is_rejected() {
        let mut session = two_player_session();
        assert!(matches!(session.leave(C), Err(MatchError::UnknownPlayer(_))));
        assert!(!session.is_over());
    }

    #[test]
    fn test_messages_only_from_seated_players() {
        let mut session = two_player_session();
        session.add_message(A, "gl hf".into()).unwrap();
        assert!(session.add_message(C, "hi".into()).is_err());

        let view = session.view();
        assert_eq!(view.messages.len(), 1);
        assert_eq!(view.messages[0].player_id, A);
    }

    #[test]
    fn test_terminated_overrides_other_phases() {
        let mut session = two_player_session();
        session.leave(B).unwrap();
        session.mark_terminated();
        assert_eq!(session.phase(), MatchPhase::Terminated);
    }
}
