//! Event Processor (C3, spec §4.3): the pure fold `(BoardState, Event) ->
//! BoardState`.
//!
//! Every event handler returns an [`Outcome`] instead of panicking or
//! propagating an error across the fold boundary (spec §9 redesign note
//! "exception-as-control-flow"): a bad event is logged and skipped, never
//! crashes the worker.

use crate::board_state::{BoardState, CurrentPlayer};
use crate::card_in_play::{CardInPlay, CardSnapshot};
use crate::event::{Event, GameStateSnapshot, MoveCardInPlay, PutCardInPlay};
use crate::zone::Zone;
use swgemp_cards::CardRegistry;
use swgemp_core::{CardId, Owner};

/// Result of applying a single event to the board. The fold never partially
/// mutates state: `Skipped` means the event had no effect at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Skipped(String),
}

/// Notified when a card owned by the bot enters play, so an in-flight
/// deployment plan can bind a previously-unknown ship's `card_id` (spec
/// §4.3 "Deployment-plan coupling", §4.4.5). Implemented by the brain
/// crate; kept as a trait here to avoid a dependency cycle.
pub trait DeploymentPlanObserver {
    fn on_my_card_entered_play(&mut self, blueprint_id: &str, card_id: &str);
}

/// No-op observer used when no deployment plan is in flight.
pub struct NullObserver;
impl DeploymentPlanObserver for NullObserver {
    fn on_my_card_entered_play(&mut self, _blueprint_id: &str, _card_id: &str) {}
}

/// Applies one event to `board`, consulting `registry` for card metadata
/// and notifying `observer` of new bot-owned arrivals.
pub fn apply_event(
    board: &mut BoardState,
    event: &Event,
    registry: &CardRegistry,
    observer: &mut dyn DeploymentPlanObserver,
) -> Outcome {
    match event {
        Event::PutCardInPlay(put) => apply_put(board, put, registry, observer),
        Event::RemoveCardInPlay { card_id } => apply_remove(board, card_id),
        Event::MoveCardInPlay(mv) => apply_move(board, mv),
        Event::GameState(snapshot) => apply_game_state(board, snapshot),
        Event::Phase { phase, turn_number } => {
            board.current_phase = phase.clone();
            if let Some(n) = turn_number {
                board.turn_number = *n;
            }
            Outcome::Applied
        }
        Event::TurnChange { current_player, is_starting_side } => {
            board.current_player = *current_player;
            if *is_starting_side {
                board.turn_number += 1;
            }
            Outcome::Applied
        }
        Event::GameProgress(msg) => {
            log::debug!("[processor] game progress: {msg}");
            Outcome::Applied
        }
        // Decisions never mutate board state directly (spec §4.3); routing
        // to the brain is the worker's job.
        Event::Decision(_) => Outcome::Applied,
        Event::Chat(line) => {
            log::trace!("[processor] chat: {line}");
            Outcome::Applied
        }
        Event::GameEnd => Outcome::Applied,
        Event::Unknown(tag) => {
            log::warn!("[processor] unknown event tag: {tag}");
            Outcome::Skipped(format!("unknown tag: {tag}"))
        }
    }
}

fn detach(board: &mut BoardState, card_id: &str) {
    let parent = board.cards.get(card_id).and_then(|c| c.attached_to.clone());
    if let Some(parent_id) = parent {
        if let Some(parent) = board.cards.get_mut(&parent_id) {
            parent.attachments.retain(|id| id != card_id);
        }
    }
    if let Some(card) = board.cards.get_mut(card_id) {
        card.attached_to = None;
    }
}

fn remove_from_zone_lists(board: &mut BoardState, card_id: &str) {
    let (owner, location_index) = match board.cards.get(card_id) {
        Some(c) => (c.owner, c.location_index),
        None => return,
    };
    let zones = match owner {
        Owner::Me => &mut board.my_zones,
        Owner::Opponent => &mut board.their_zones,
    };
    zones.hand.retain(|id| id != card_id);
    if let Some(index) = location_index {
        if let Some(loc) = board.locations.get_mut(index) {
            loc.remove_card(card_id);
        }
    }
}

/// Would attaching `child` to `new_parent` close a cycle? Walks the
/// attachment chain upward from `new_parent` (spec §3.2 "shallow, no
/// cycles").
fn would_cycle(board: &BoardState, child: &str, new_parent: &str) -> bool {
    if child == new_parent {
        return true;
    }
    let mut current = new_parent.to_string();
    let mut seen = std::collections::HashSet::new();
    loop {
        if current == child {
            return true;
        }
        if !seen.insert(current.clone()) {
            return true; // pre-existing cycle; refuse to extend it further.
        }
        match board.cards.get(&current).and_then(|c| c.attached_to.clone()) {
            Some(next) => current = next,
            None => return false,
        }
    }
}

fn attach(board: &mut BoardState, card_id: &str, parent_id: &str) -> Outcome {
    if would_cycle(board, card_id, parent_id) {
        log::warn!("[processor] rejected attach {card_id} -> {parent_id}: would create a cycle");
        return Outcome::Skipped(format!("attach cycle: {card_id} -> {parent_id}"));
    }
    detach(board, card_id);
    if let Some(card) = board.cards.get_mut(card_id) {
        card.attached_to = Some(parent_id.to_string());
    }
    if let Some(parent) = board.cards.get_mut(parent_id) {
        if !parent.attachments.iter().any(|id| id == card_id) {
            parent.attachments.push(card_id.to_string());
        }
    }
    Outcome::Applied
}

fn apply_put(
    board: &mut BoardState,
    put: &PutCardInPlay,
    registry: &CardRegistry,
    observer: &mut dyn DeploymentPlanObserver,
) -> Outcome {
    let card = registry.get(&put.blueprint_id);
    let is_location = card
        .map(|c| matches!(c.card_type, swgemp_cards::CardType::Location))
        .unwrap_or(false)
        || put.location_title.is_some();

    // Remove any stale zone-list membership before re-placing (PUT can
    // legitimately update a card already known, e.g. a reorder replay).
    remove_from_zone_lists(board, &put.card_id);

    let entry = board
        .cards
        .entry(put.card_id.clone())
        .or_insert_with(|| CardInPlay::new(put.card_id.clone(), put.blueprint_id.clone(), put.owner, put.zone));
    entry.blueprint_id = put.blueprint_id.clone();
    entry.owner = put.owner;
    entry.zone = put.zone;
    entry.location_index = put.location_index;
    entry.snapshot = CardSnapshot::from_card(card, &put.blueprint_id);

    if is_location {
        if let Some(index) = put.location_index {
            let card_meta = card;
            let is_site = card_meta.map(|c| c.is_site()).unwrap_or(false);
            let is_space = card_meta.map(|c| c.is_space()).unwrap_or(false);
            let is_ground = card_meta.map(|c| c.is_ground()).unwrap_or(false);
            let title = put
                .location_title
                .clone()
                .or_else(|| card_meta.map(|c| c.title.clone()))
                .unwrap_or_else(|| format!("Location {index}"));
            board.ensure_location(index).resolve(&title, is_site, is_space, is_ground);
        }
    } else if put.zone == Zone::AtLocation {
        if let Some(index) = put.location_index {
            board.ensure_location(index);
            let card_ref = board.cards.get(&put.card_id).cloned();
            if let (Some(loc), Some(card_ref)) = (board.locations.get_mut(index), card_ref) {
                loc.add_card(&card_ref, &put.card_id);
            }
        }
    } else if put.zone == Zone::Hand {
        let zones = match put.owner {
            Owner::Me => &mut board.my_zones,
            Owner::Opponent => &mut board.their_zones,
        };
        if !zones.hand.iter().any(|id| id == &put.card_id) {
            zones.hand.push(put.card_id.clone());
        }
    }

    if let Some(parent_id) = &put.attached_to {
        attach(board, &put.card_id, parent_id);
    }

    if put.owner == Owner::Me && put.zone == Zone::AtLocation {
        observer.on_my_card_entered_play(&put.blueprint_id, &put.card_id);
    }

    Outcome::Applied
}

fn apply_remove(board: &mut BoardState, card_id: &CardId) -> Outcome {
    if !board.cards.contains_key(card_id) {
        // Unknown card_id in a remove event: nothing to diverge from, a no-op
        // is the safe choice (spec §7 treats unknown ids on move/remove as
        // first-sighting only where there is a blueprint to create from).
        return Outcome::Skipped(format!("remove of unknown card_id: {card_id}"));
    }
    detach(board, card_id);
    for other_id in board
        .cards
        .get(card_id)
        .map(|c| c.attachments.clone())
        .unwrap_or_default()
    {
        detach(board, &other_id);
    }
    remove_from_zone_lists(board, card_id);
    board.cards.remove(card_id);
    Outcome::Applied
}

fn apply_move(board: &mut BoardState, mv: &MoveCardInPlay) -> Outcome {
    if !board.cards.contains_key(&mv.card_id) {
        // Unknown card_id on move: treat as first sighting to avoid
        // divergence (spec §7).
        board.cards.insert(
            mv.card_id.clone(),
            CardInPlay::new(mv.card_id.clone(), String::new(), Owner::Opponent, mv.new_zone),
        );
        log::warn!("[processor] move of unknown card_id {}, synthesizing record", mv.card_id);
    }
    remove_from_zone_lists(board, &mv.card_id);
    let owner = board.cards.get(&mv.card_id).map(|c| c.owner).unwrap_or(Owner::Opponent);
    if let Some(card) = board.cards.get_mut(&mv.card_id) {
        card.zone = mv.new_zone;
        card.location_index = mv.new_location_index;
    }
    if mv.new_zone == Zone::AtLocation {
        if let Some(index) = mv.new_location_index {
            board.ensure_location(index);
            let card_ref = board.cards.get(&mv.card_id).cloned();
            if let (Some(loc), Some(card_ref)) = (board.locations.get_mut(index), card_ref) {
                loc.add_card(&card_ref, &mv.card_id);
            }
        }
    } else if mv.new_zone == Zone::Hand {
        let zones = match owner {
            Owner::Me => &mut board.my_zones,
            Owner::Opponent => &mut board.their_zones,
        };
        if !zones.hand.iter().any(|id| id == &mv.card_id) {
            zones.hand.push(mv.card_id.clone());
        }
    }
    match &mv.attached_to {
        Some(parent_id) => {
            attach(board, &mv.card_id, parent_id);
        }
        None => detach(board, &mv.card_id),
    }
    Outcome::Applied
}

fn apply_game_state(board: &mut BoardState, snapshot: &GameStateSnapshot) -> Outcome {
    board.my_power = snapshot.my_power.clone();
    board.their_power = snapshot.their_power.clone();
    if let Some(v) = snapshot.my_force_pile {
        board.my_zones.force_pile = v;
    }
    if let Some(v) = snapshot.my_used_pile {
        board.my_zones.used_pile = v;
    }
    if let Some(v) = snapshot.my_lost_pile {
        board.my_zones.lost_pile = v;
    }
    if let Some(v) = snapshot.my_reserve_deck {
        board.my_zones.reserve_deck = v;
    }
    if let Some(v) = snapshot.my_out_of_play {
        board.my_zones.out_of_play = v;
    }
    if let Some(v) = snapshot.their_force_pile {
        board.their_zones.force_pile = v;
    }
    if let Some(v) = snapshot.their_used_pile {
        board.their_zones.used_pile = v;
    }
    if let Some(v) = snapshot.their_lost_pile {
        board.their_zones.lost_pile = v;
    }
    if let Some(v) = snapshot.their_reserve_deck {
        board.their_zones.reserve_deck = v;
    }
    if let Some(v) = snapshot.their_out_of_play {
        board.their_zones.out_of_play = v;
    }
    if let Some(phase) = &snapshot.current_phase {
        board.current_phase = phase.clone();
    }
    if let Some(turn) = snapshot.turn_number {
        board.turn_number = turn;
    }
    if let Some(player) = snapshot.current_player {
        board.current_player = player;
    }
    if let Some(name) = &snapshot.my_player_name {
        board.my_player_name = name.clone();
    }
    if let Some(name) = &snapshot.opponent_name {
        board.opponent_name = name.clone();
    }
    if let Some(side) = snapshot.my_side {
        board.my_side = Some(side);
    }
    Outcome::Applied
}
