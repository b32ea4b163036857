//! Runtime instance of a card the server has shown the bot (spec §3.2).

use crate::zone::Zone;
use swgemp_cards::Card;
use swgemp_core::{BlueprintId, CardId, LocationIndex, Owner};

/// Denormalized copy of key metadata, kept alongside the runtime instance
/// for fast read and logging without a registry lookup on every query
/// (spec §3.2).
#[derive(Debug, Clone, Default)]
pub struct CardSnapshot {
    pub title: String,
    pub card_type: Option<String>,
    pub power: Option<i32>,
    pub ability: Option<i32>,
    pub deploy: Option<i32>,
}

impl CardSnapshot {
    pub fn from_card(card: Option<&Card>, fallback_blueprint: &str) -> Self {
        match card {
            Some(c) => Self {
                title: c.title.clone(),
                card_type: Some(format!("{:?}", c.card_type)),
                power: c.power,
                ability: c.ability,
                deploy: c.deploy,
            },
            None => Self {
                title: fallback_blueprint.to_string(),
                ..Default::default()
            },
        }
    }
}

/// A physical card instance the server has assigned a `card_id` to.
#[derive(Debug, Clone)]
pub struct CardInPlay {
    pub card_id: CardId,
    pub blueprint_id: BlueprintId,
    pub owner: Owner,
    pub zone: Zone,
    pub location_index: Option<LocationIndex>,
    pub attached_to: Option<CardId>,
    pub attachments: Vec<CardId>,
    pub snapshot: CardSnapshot,
}

impl CardInPlay {
    pub fn new(card_id: CardId, blueprint_id: BlueprintId, owner: Owner, zone: Zone) -> Self {
        Self {
            card_id,
            blueprint_id,
            owner,
            zone,
            location_index: None,
            attached_to: None,
            attachments: Vec::new(),
            snapshot: CardSnapshot::default(),
        }
    }
}
