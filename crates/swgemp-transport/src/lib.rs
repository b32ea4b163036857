//! Transport Client (C2): stateful HTTP/XML session against the remote
//! game server (spec §4.2, §6.1).

mod client;
mod types;
mod xml;

pub use client::TransportClient;
pub use types::{DeckInfo, TableInfo};
