//! Coarse bucket a card currently occupies (spec §3.2, GLOSSARY "Zone").

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    Hand,
    AtLocation,
    ForcePile,
    UsedPile,
    LostPile,
    ReserveDeck,
    OutOfPlay,
}

impl Zone {
    pub fn from_tag(tag: &str) -> Option<Zone> {
        match tag.to_ascii_uppercase().as_str() {
            "HAND" => Some(Zone::Hand),
            "AT_LOCATION" => Some(Zone::AtLocation),
            "FORCE_PILE" => Some(Zone::ForcePile),
            "USED_PILE" => Some(Zone::UsedPile),
            "LOST_PILE" => Some(Zone::LostPile),
            "RESERVE_DECK" => Some(Zone::ReserveDeck),
            "OUT_OF_PLAY" => Some(Zone::OutOfPlay),
            _ => None,
        }
    }
}
