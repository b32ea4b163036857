//! Canonical in-memory game state and its derived queries (spec §3.4).

use crate::card_in_play::CardInPlay;
use crate::location::LocationInPlay;
use crate::zone::Zone;
use std::collections::HashMap;
use swgemp_core::{CardId, LocationIndex, Side};

/// Per-side zone bookkeeping. `hand` is the only ordered, card-level list;
/// the piles/decks are sizes only, matching what `GAME_STATE` actually
/// reports (spec §3.4).
#[derive(Debug, Clone, Default)]
pub struct ZoneState {
    pub hand: Vec<CardId>,
    pub force_pile: u32,
    pub used_pile: u32,
    pub lost_pile: u32,
    pub reserve_deck: u32,
    pub out_of_play: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrentPlayer {
    Me,
    Opponent,
}

/// Canonical in-memory game state (spec §3.4).
#[derive(Debug, Clone)]
pub struct BoardState {
    pub locations: Vec<LocationInPlay>,
    pub cards: HashMap<CardId, CardInPlay>,
    pub my_zones: ZoneState,
    pub their_zones: ZoneState,
    /// Authoritative per-location power sums from the last `GAME_STATE`
    /// event, keyed by location index. Overwritten wholesale, never
    /// accumulated (spec §4.3 "Power arrays").
    pub my_power: HashMap<LocationIndex, i32>,
    pub their_power: HashMap<LocationIndex, i32>,
    pub current_phase: String,
    pub turn_number: u32,
    pub current_player: CurrentPlayer,
    pub my_player_name: String,
    pub opponent_name: String,
    pub my_side: Option<Side>,
}

impl Default for BoardState {
    fn default() -> Self {
        Self {
            locations: Vec::new(),
            cards: HashMap::new(),
            my_zones: ZoneState::default(),
            their_zones: ZoneState::default(),
            my_power: HashMap::new(),
            their_power: HashMap::new(),
            current_phase: String::new(),
            turn_number: 0,
            current_player: CurrentPlayer::Me,
            my_player_name: String::new(),
            opponent_name: String::new(),
            my_side: None,
        }
    }
}

impl BoardState {
    /// Ensures a `LocationInPlay` exists at `index`, creating a placeholder
    /// if needed (spec §3.3 "placeholder rule"). Returns its index into
    /// `self.locations` (always `index` once this returns, since the
    /// vector grows to cover every referenced index).
    pub fn ensure_location(&mut self, index: LocationIndex) -> &mut LocationInPlay {
        while self.locations.len() <= index {
            let next = self.locations.len();
            self.locations.push(LocationInPlay::placeholder(next));
        }
        &mut self.locations[index]
    }

    pub fn location(&self, index: LocationIndex) -> Option<&LocationInPlay> {
        self.locations.get(index)
    }

    // ------------------------------------------------------------------
    // Derived queries (spec §3.4) — read-only, never stored.
    // ------------------------------------------------------------------

    /// Clamped to 0 for negative readings, which encode force icons, not
    /// power (spec §3.4, §8 property 4).
    pub fn my_power_at(&self, index: LocationIndex) -> i32 {
        self.my_power.get(&index).copied().unwrap_or(0).max(0)
    }

    pub fn their_power_at(&self, index: LocationIndex) -> i32 {
        self.their_power.get(&index).copied().unwrap_or(0).max(0)
    }

    /// Sum over locations of positive contributions only.
    pub fn total_my_power(&self) -> i32 {
        self.my_power.values().filter(|v| **v > 0).sum()
    }

    pub fn total_their_power(&self) -> i32 {
        self.their_power.values().filter(|v| **v > 0).sum()
    }

    pub fn power_advantage(&self) -> i32 {
        self.total_my_power() - self.total_their_power()
    }

    pub fn force_advantage(&self) -> i32 {
        self.my_zones.force_pile as i32 - self.their_zones.force_pile as i32
    }

    pub fn is_my_turn(&self) -> bool {
        self.current_player == CurrentPlayer::Me
    }

    pub fn hand_size(&self) -> usize {
        self.my_zones.hand.len()
    }

    pub fn card(&self, card_id: &str) -> Option<&CardInPlay> {
        self.cards.get(card_id)
    }

    /// Zone conservation check (spec §8 property 2): every known card_id
    /// occupies exactly one zone bucket. True by construction if callers
    /// only mutate state through the event processor, but exposed so
    /// tests can assert it directly.
    pub fn zone_of(&self, card_id: &str) -> Option<Zone> {
        self.cards.get(card_id).map(|c| c.zone)
    }
}
