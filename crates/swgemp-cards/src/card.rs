//! Immutable card metadata (spec §3.1).
//!
//! `Card` is a closed record type: every field has a well-defined absence
//! (an `Option` or an empty `HashSet`), never a dynamic/duck-typed bag of
//! attributes. Predicates are plain methods over the raw fields.

use std::collections::HashSet;
use swgemp_core::Side;

/// A card type, as printed. `Other` carries through any string the JSON
/// corpus uses that this registry doesn't special-case; predicates never
/// need to enumerate every type, only the ones with distinct behavior.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CardType {
    Character,
    Starship,
    Vehicle,
    Weapon,
    Device,
    Location,
    Effect,
    Interrupt,
    Objective,
    Other(String),
}

impl From<&str> for CardType {
    fn from(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "character" => CardType::Character,
            "starship" => CardType::Starship,
            "vehicle" => CardType::Vehicle,
            "weapon" => CardType::Weapon,
            "device" => CardType::Device,
            "location" => CardType::Location,
            "effect" => CardType::Effect,
            "interrupt" => CardType::Interrupt,
            "objective" => CardType::Objective,
            _ => CardType::Other(s.to_string()),
        }
    }
}

/// Immutable descriptor for a card template, identified by blueprint id.
/// Loaded once at process start and never mutated (spec §3.1 lifecycle).
#[derive(Debug, Clone)]
pub struct Card {
    pub blueprint_id: String,
    pub title: String,
    pub side: Side,
    pub card_type: CardType,
    pub sub_type: Option<String>,
    pub power: Option<i32>,
    pub ability: Option<i32>,
    pub deploy: Option<i32>,
    pub forfeit: Option<i32>,
    pub destiny: Option<i32>,
    pub icons: HashSet<String>,
    pub characteristics: HashSet<String>,
    pub gametext: String,
    pub is_unique: bool,
    pub is_defensive_shield: bool,
    /// Systems this card is restricted to deploying at (empty = unrestricted).
    pub deploy_restrictions: HashSet<String>,
}

/// Case-insensitive substring containment over a small fixed vocabulary
/// (spec §3.1 "icons carry free-form strings").
fn has_icon(icons: &HashSet<String>, needle: &str) -> bool {
    let needle = needle.to_ascii_lowercase();
    icons.iter().any(|icon| icon.to_ascii_lowercase().contains(&needle))
}

impl Card {
    pub fn is_pilot(&self) -> bool {
        has_icon(&self.icons, "pilot")
    }
    pub fn is_warrior(&self) -> bool {
        has_icon(&self.icons, "warrior")
    }
    pub fn has_permanent_pilot(&self) -> bool {
        has_icon(&self.icons, "permanent pilot")
    }
    pub fn is_interior(&self) -> bool {
        has_icon(&self.icons, "interior")
    }
    pub fn is_exterior(&self) -> bool {
        has_icon(&self.icons, "exterior")
    }
    pub fn is_site(&self) -> bool {
        matches!(self.card_type, CardType::Location)
            && self
                .sub_type
                .as_deref()
                .map(|s| s.eq_ignore_ascii_case("site"))
                .unwrap_or(false)
    }
    pub fn is_space(&self) -> bool {
        matches!(self.card_type, CardType::Location)
            && (self
                .sub_type
                .as_deref()
                .map(|s| s.eq_ignore_ascii_case("space"))
                .unwrap_or(false)
                || has_icon(&self.icons, "space"))
    }
    /// A site defaults to ground when metadata is ambiguous (spec §3.3).
    pub fn is_ground(&self) -> bool {
        if self.is_space() {
            return false;
        }
        matches!(self.card_type, CardType::Location)
    }
    /// Systems (before the ':') this card may be deployed at; empty means
    /// unrestricted (spec §4.4.5 "deploy restrictions").
    pub fn allowed_systems(&self) -> &HashSet<String> {
        &self.deploy_restrictions
    }
    /// Display fallback used when a blueprint id misses the registry
    /// (spec §4.1 "a miss returns a nil descriptor").
    pub fn display_or(blueprint_id: &str, card: Option<&Card>) -> String {
        card.map(|c| c.title.clone())
            .unwrap_or_else(|| blueprint_id.to_string())
    }
}
