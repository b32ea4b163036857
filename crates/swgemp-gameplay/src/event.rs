//! Parsed XML events (spec §4.3 tag table) — the input to the fold.

use crate::board_state::CurrentPlayer;
use crate::zone::Zone;
use std::collections::HashMap;
use swgemp_core::{BlueprintId, CardId, DecisionId, LocationIndex, Owner, Side};

#[derive(Debug, Clone)]
pub struct PutCardInPlay {
    pub card_id: CardId,
    pub blueprint_id: BlueprintId,
    pub owner: Owner,
    pub zone: Zone,
    pub location_index: Option<LocationIndex>,
    pub attached_to: Option<CardId>,
    /// Present only when this `PUT_CARD_IN_PLAY` is a location reveal.
    pub location_title: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MoveCardInPlay {
    pub card_id: CardId,
    pub new_zone: Zone,
    pub new_location_index: Option<LocationIndex>,
    pub attached_to: Option<CardId>,
}

#[derive(Debug, Clone, Default)]
pub struct GameStateSnapshot {
    pub my_power: HashMap<LocationIndex, i32>,
    pub their_power: HashMap<LocationIndex, i32>,
    pub my_force_pile: Option<u32>,
    pub my_used_pile: Option<u32>,
    pub my_lost_pile: Option<u32>,
    pub my_reserve_deck: Option<u32>,
    pub my_out_of_play: Option<u32>,
    pub their_force_pile: Option<u32>,
    pub their_used_pile: Option<u32>,
    pub their_lost_pile: Option<u32>,
    pub their_reserve_deck: Option<u32>,
    pub their_out_of_play: Option<u32>,
    pub current_phase: Option<String>,
    pub turn_number: Option<u32>,
    pub current_player: Option<CurrentPlayer>,
    pub my_player_name: Option<String>,
    pub opponent_name: Option<String>,
    pub my_side: Option<Side>,
}

/// A decision option as the wire format presents it, before C5 enriches
/// it with a resolved `CardInPlay` reference (spec §4.4.1).
#[derive(Debug, Clone)]
pub struct RawDecisionOption {
    pub option_id: String,
    pub display_text: String,
    pub card_id: Option<CardId>,
    pub target_location: Option<LocationIndex>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionType {
    MultipleChoice,
    ActionChoice,
    CardSelection,
    CardAction,
    ArbitraryCards,
    Integer,
}

impl DecisionType {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_uppercase().as_str() {
            "MULTIPLE_CHOICE" => Some(Self::MultipleChoice),
            "ACTION_CHOICE" => Some(Self::ActionChoice),
            "CARD_SELECTION" => Some(Self::CardSelection),
            "CARD_ACTION" => Some(Self::CardAction),
            "ARBITRARY_CARDS" => Some(Self::ArbitraryCards),
            "INTEGER" => Some(Self::Integer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DecisionEvent {
    pub decision_id: DecisionId,
    pub decision_type: Option<DecisionType>,
    pub raw_decision_type: String,
    pub prompt: String,
    pub no_pass: bool,
    pub default_value: Option<String>,
    pub options: Vec<RawDecisionOption>,
    /// Parallel bitmap; `None` means every option is selectable.
    pub selectable: Option<Vec<bool>>,
}

#[derive(Debug, Clone)]
pub enum Event {
    PutCardInPlay(PutCardInPlay),
    RemoveCardInPlay { card_id: CardId },
    MoveCardInPlay(MoveCardInPlay),
    GameState(GameStateSnapshot),
    Phase { phase: String, turn_number: Option<u32> },
    TurnChange { current_player: CurrentPlayer, is_starting_side: bool },
    GameProgress(String),
    Decision(DecisionEvent),
    Chat(String),
    GameEnd,
    /// Recognized-but-unhandled or genuinely unknown tag (spec §4.3
    /// "unknown event tags are logged and ignored").
    Unknown(String),
}
