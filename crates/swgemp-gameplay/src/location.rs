//! A location card in play (spec §3.3), including the placeholder rule.

use crate::card_in_play::CardInPlay;
use swgemp_core::LocationIndex;

/// A location card in play, with the two ordered side lists the fold
/// maintains directly (not re-derived from card zone scans).
#[derive(Debug, Clone)]
pub struct LocationInPlay {
    pub location_index: LocationIndex,
    pub title: String,
    pub system_name: String,
    pub site_name: Option<String>,
    pub is_site: bool,
    pub is_space: bool,
    pub is_ground: bool,
    pub my_cards: Vec<String>,
    pub their_cards: Vec<String>,
    /// True until the authoritative location event fills this slot in
    /// (spec §3.3 "placeholder rule").
    pub is_placeholder: bool,
}

impl LocationInPlay {
    /// Creates the placeholder used when a card-at-location event for
    /// index `i` arrives before the location itself has been named.
    pub fn placeholder(location_index: LocationIndex) -> Self {
        Self {
            location_index,
            title: format!("Location {location_index}"),
            system_name: format!("Location {location_index}"),
            site_name: None,
            is_site: false,
            is_space: false,
            is_ground: false,
            my_cards: Vec::new(),
            their_cards: Vec::new(),
            is_placeholder: true,
        }
    }

    /// Fills in the placeholder (or re-confirms an already-named location)
    /// from an authoritative title + flags, deriving `system_name` by
    /// splitting on the first ':' (spec §3.3, §4.3).
    pub fn resolve(&mut self, title: &str, is_site: bool, is_space: bool, is_ground: bool) {
        self.title = title.to_string();
        self.system_name = match title.split_once(':') {
            Some((system, _site)) => system.trim().to_string(),
            None => title.trim().to_string(),
        };
        self.site_name = title.contains(':').then(|| title.trim().to_string());
        self.is_site = is_site;
        self.is_space = is_space;
        // A site defaults to ground when metadata is ambiguous (spec §3.3).
        self.is_ground = if is_space { false } else { is_ground || is_site };
        self.is_placeholder = false;
    }

    pub fn add_card(&mut self, card: &CardInPlay, card_id: &str) {
        let list = match card.owner {
            swgemp_core::Owner::Me => &mut self.my_cards,
            swgemp_core::Owner::Opponent => &mut self.their_cards,
        };
        if !list.iter().any(|id| id == card_id) {
            list.push(card_id.to_string());
        }
    }

    pub fn remove_card(&mut self, card_id: &str) {
        self.my_cards.retain(|id| id != card_id);
        self.their_cards.retain(|id| id != card_id);
    }
}
