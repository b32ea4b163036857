//! The worker's top-level state machine (spec §2, §5).
//!
//! `Stopped -> Connecting -> InLobby -> WaitingForOpponent -> Joining ->
//! Playing -> GameEnded -> (InLobby|Stopped)`, plus the `Reconnecting`
//! substate implied by §4.2/§5/§7 and made explicit here, and `Error` for
//! the fatal path that always terminates in `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Stopped,
    Connecting,
    InLobby,
    WaitingForOpponent,
    Joining,
    Playing,
    GameEnded,
    /// Re-authenticating after too many consecutive transport timeouts
    /// (spec §5, §7). A successful re-login resumes `Playing` directly from
    /// the last known channel number rather than re-entering the lobby.
    Reconnecting,
    /// Transport-fatal or authentication failure; the only states that can
    /// reach here are `Connecting`, `Joining`, and `Playing` (spec §7).
    Error,
}

impl WorkerState {
    /// Whether `self -> next` is a transition the state machine allows.
    /// Used defensively in tests and by the worker loop's own assertions;
    /// the loop itself only ever requests transitions it knows are legal.
    pub fn can_transition_to(self, next: WorkerState) -> bool {
        use WorkerState::*;
        matches!(
            (self, next),
            (Stopped, Connecting)
                | (Connecting, InLobby)
                | (Connecting, Error)
                | (InLobby, WaitingForOpponent)
                | (InLobby, Stopped)
                | (WaitingForOpponent, Joining)
                | (WaitingForOpponent, InLobby)
                | (WaitingForOpponent, Stopped)
                | (Joining, Playing)
                | (Joining, Error)
                | (Joining, InLobby)
                | (Playing, GameEnded)
                | (Playing, Reconnecting)
                | (Playing, Error)
                | (GameEnded, InLobby)
                | (GameEnded, Stopped)
                | (Reconnecting, Playing)
                | (Reconnecting, Error)
                | (Error, Stopped)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use WorkerState::*;

    #[test]
    fn stop_is_reachable_from_every_lobby_adjacent_state() {
        assert!(InLobby.can_transition_to(Stopped));
        assert!(WaitingForOpponent.can_transition_to(Stopped));
        assert!(GameEnded.can_transition_to(Stopped));
        assert!(Error.can_transition_to(Stopped));
    }

    #[test]
    fn playing_cannot_jump_directly_to_lobby() {
        assert!(!Playing.can_transition_to(InLobby));
    }

    #[test]
    fn reconnecting_resumes_playing_directly_or_fails_to_error() {
        assert!(Reconnecting.can_transition_to(Playing));
        assert!(Reconnecting.can_transition_to(Error));
        assert!(!Reconnecting.can_transition_to(InLobby));
    }
}
