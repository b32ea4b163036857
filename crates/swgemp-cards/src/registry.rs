//! Card Metadata Registry (C1, spec §4.1).
//!
//! Process-wide, lazily initialized map from blueprint identifier to
//! [`Card`]. Loaded once from two JSON corpora (one per side); never
//! written to after that. Lookup is O(1); a miss returns `None` and the
//! caller falls back to the blueprint identifier as display string
//! ([`Card::display_or`]).

use crate::card::{Card, CardType};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use swgemp_core::{CoreError, Side};

/// Raw on-disk shape of one corpus entry. Optional fields are absent,
/// not null-as-zero, mirroring the server's own sparse JSON.
#[derive(Debug, serde::Deserialize)]
struct RawCard {
    #[serde(alias = "blueprintId")]
    blueprint_id: String,
    title: String,
    #[serde(rename = "type")]
    card_type: String,
    #[serde(default, rename = "subType")]
    sub_type: Option<String>,
    #[serde(default)]
    power: Option<i32>,
    #[serde(default)]
    ability: Option<i32>,
    #[serde(default)]
    deploy: Option<i32>,
    #[serde(default)]
    forfeit: Option<i32>,
    #[serde(default)]
    destiny: Option<i32>,
    #[serde(default)]
    icons: Vec<String>,
    #[serde(default)]
    characteristics: Vec<String>,
    #[serde(default)]
    gametext: String,
    #[serde(default, rename = "uniqueness")]
    unique_marker: Option<String>,
    #[serde(default, rename = "destinyWhileDefensiveShield")]
    defensive_shield_marker: Option<String>,
}

/// A corpus file is a JSON array of raw card entries.
#[derive(Debug, serde::Deserialize)]
struct RawCorpus(Vec<RawCard>);

/// Extracts the set of systems from a card's own gametext when it reads
/// "Deploys only on <System>" (spec §4.4.5). Best-effort: cards without
/// this exact phrasing are treated as unrestricted.
fn parse_deploy_restriction(gametext: &str) -> HashSet<String> {
    const MARKER: &str = "deploys only on";
    let lower = gametext.to_ascii_lowercase();
    let Some(pos) = lower.find(MARKER) else {
        return HashSet::new();
    };
    let rest = &gametext[pos + MARKER.len()..];
    let clause = rest.split(['.', ';']).next().unwrap_or("").trim();
    clause
        .split(" or ")
        .map(|s| s.trim().trim_matches(|c: char| !c.is_alphanumeric() && c != ' '))
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

impl RawCard {
    fn into_card(self, side: Side) -> Card {
        Card {
            blueprint_id: self.blueprint_id,
            title: self.title,
            side,
            card_type: CardType::from(self.card_type.as_str()),
            sub_type: self.sub_type,
            power: self.power,
            ability: self.ability,
            deploy: self.deploy,
            forfeit: self.forfeit,
            destiny: self.destiny,
            icons: self.icons.into_iter().collect(),
            characteristics: self.characteristics.into_iter().collect(),
            deploy_restrictions: parse_deploy_restriction(&self.gametext),
            is_unique: self.unique_marker.is_some(),
            is_defensive_shield: self.defensive_shield_marker.is_some(),
            gametext: self.gametext,
        }
    }
}

/// Immutable, read-only lookup from blueprint identifier to [`Card`].
#[derive(Debug, Default)]
pub struct CardRegistry {
    cards: HashMap<String, Card>,
}

impl CardRegistry {
    /// Loads the two JSON corpora (one per side) from `dir`. Expected file
    /// names are `light.json` and `dark.json`; either missing file yields
    /// an empty side, not a fatal error, so a bot can run test scenarios
    /// with a partial corpus.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, CoreError> {
        let dir = dir.as_ref();
        let mut cards = HashMap::new();
        for (file_name, side) in [("light.json", Side::Light), ("dark.json", Side::Dark)] {
            let path = dir.join(file_name);
            if !path.exists() {
                log::warn!("card corpus missing: {}", path.display());
                continue;
            }
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| CoreError::Fatal(format!("read {}: {e}", path.display())))?;
            let corpus: RawCorpus = serde_json::from_str(&contents)
                .map_err(|e| CoreError::Fatal(format!("parse {}: {e}", path.display())))?;
            for raw in corpus.0 {
                let card = raw.into_card(side);
                cards.insert(card.blueprint_id.clone(), card);
            }
        }
        log::info!("loaded {} cards into registry", cards.len());
        Ok(Self { cards })
    }

    /// O(1) lookup; a miss returns `None`.
    pub fn get(&self, blueprint_id: &str) -> Option<&Card> {
        self.cards.get(blueprint_id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_corpus(dir: &Path, name: &str, json: &str) {
        let mut f = std::fs::File::create(dir.join(name)).unwrap();
        f.write_all(json.as_bytes()).unwrap();
    }

    #[test]
    fn load_indexes_both_corpora() {
        let dir = tempdir();
        write_corpus(
            dir.path(),
            "light.json",
            r#"[{"blueprintId":"1_1","title":"Luke","type":"Character","power":3}]"#,
        );
        write_corpus(
            dir.path(),
            "dark.json",
            r#"[{"blueprintId":"2_1","title":"Vader","type":"Character","power":6}]"#,
        );
        let registry = CardRegistry::load(dir.path()).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("1_1").unwrap().side, Side::Light);
        assert_eq!(registry.get("2_1").unwrap().side, Side::Dark);
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn missing_corpus_file_is_not_fatal() {
        let dir = tempdir();
        write_corpus(
            dir.path(),
            "light.json",
            r#"[{"blueprintId":"1_1","title":"Luke","type":"Character"}]"#,
        );
        let registry = CardRegistry::load(dir.path()).unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn deploy_restriction_parsed_from_gametext() {
        let dir = tempdir();
        write_corpus(
            dir.path(),
            "light.json",
            r#"[{"blueprintId":"1_2","title":"Moisture Farmer","type":"Character","gametext":"Deploys only on Tatooine. May not move."}]"#,
        );
        let registry = CardRegistry::load(dir.path()).unwrap();
        let card = registry.get("1_2").unwrap();
        assert!(card.allowed_systems().contains("Tatooine"));
    }

    /// Minimal temp-dir helper; avoids pulling in `tempfile` for one crate.
    fn tempdir() -> TempDir {
        let mut path = std::env::temp_dir();
        path.push(format!(
            "swgemp-cards-test-{:?}",
            std::thread::current().id()
        ));
        std::fs::create_dir_all(&path).unwrap();
        TempDir(path)
    }

    struct TempDir(std::path::PathBuf);
    impl TempDir {
        fn path(&self) -> &Path {
            &self.0
        }
    }
    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }
}
