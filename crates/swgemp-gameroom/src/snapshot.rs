//! Admin read access to the board (spec §5 "Admin read access ... sees a
//! consistent snapshot at the boundary between events").
//!
//! A plain, fully-owned clone of the queryable parts of [`BoardState`],
//! produced once per applied batch and handed to observers over an
//! `mpsc` channel — never a shared reference into the worker's live
//! state, so an observer can never witness a half-applied event.

use crate::state::WorkerState;
use swgemp_core::ChannelNumber;
use swgemp_gameplay::BoardState;

#[derive(Debug, Clone)]
pub struct AdminSnapshot {
    pub channel_number: ChannelNumber,
    pub worker_state: WorkerState,
    pub current_phase: String,
    pub turn_number: u32,
    pub is_my_turn: bool,
    pub hand_size: usize,
    pub total_my_power: i32,
    pub total_their_power: i32,
    pub power_advantage: i32,
    pub force_advantage: i32,
    pub location_titles: Vec<String>,
}

impl AdminSnapshot {
    pub fn capture(channel_number: ChannelNumber, worker_state: WorkerState, board: &BoardState) -> Self {
        Self {
            channel_number,
            worker_state,
            current_phase: board.current_phase.clone(),
            turn_number: board.turn_number,
            is_my_turn: board.is_my_turn(),
            hand_size: board.hand_size(),
            total_my_power: board.total_my_power(),
            total_their_power: board.total_their_power(),
            power_advantage: board.power_advantage(),
            force_advantage: board.force_advantage(),
            location_titles: board.locations.iter().map(|l| l.title.clone()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_is_a_fully_owned_copy() {
        let mut board = BoardState::default();
        board.current_phase = "Deploy".to_string();
        board.ensure_location(0).resolve("Tatooine", false, false, true);
        let snapshot = AdminSnapshot::capture(3, WorkerState::Playing, &board);
        board.current_phase = "Battle".to_string();
        assert_eq!(snapshot.current_phase, "Deploy");
        assert_eq!(snapshot.channel_number, 3);
        assert_eq!(snapshot.location_titles, vec!["Tatooine".to_string()]);
    }
}
