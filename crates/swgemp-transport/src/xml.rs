//! Defensive XML parsing for the server's hall, deck, and game-state feeds
//! (spec §6.1). Never a DOM/schema crate: a single forward pass over
//! `quick_xml`'s pull events, matching on element names the core already
//! expects and skipping everything it doesn't recognize.

use crate::types::{DeckInfo, TableInfo};
use quick_xml::events::{BytesEnd, BytesStart, Event as XmlEvent};
use quick_xml::Reader;
use std::collections::HashMap;
use swgemp_core::{CoreError, Owner, Side};
use swgemp_gameplay::{
    CurrentPlayer, DecisionEvent, DecisionType, Event, GameStateSnapshot, MoveCardInPlay,
    PutCardInPlay, RawDecisionOption, Zone,
};

fn attrs_map(tag: &BytesStart) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for attr in tag.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr.unescape_value().map(|v| v.to_string()).unwrap_or_default();
        map.insert(key, value);
    }
    map
}

fn tag_name(tag: &BytesStart) -> String {
    String::from_utf8_lossy(tag.name().as_ref()).to_string()
}

fn tag_name_end(tag: &BytesEnd) -> String {
    String::from_utf8_lossy(tag.name().as_ref()).to_string()
}

/// Parses the hall listing (`GET hall`). Malformed XML is logged and
/// downgraded to an empty list, per spec §4.2.
pub fn parse_hall(xml: &str) -> Vec<TableInfo> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut tables = Vec::new();
    let mut current: Option<TableInfo> = None;
    loop {
        match reader.read_event() {
            Ok(XmlEvent::Start(tag)) => {
                let name = tag_name(&tag);
                let attrs = attrs_map(&tag);
                if name == "table" {
                    current = Some(TableInfo {
                        table_id: attrs.get("id").cloned().unwrap_or_default(),
                        name: attrs.get("name").cloned().unwrap_or_default(),
                        status: attrs.get("status").cloned().unwrap_or_default(),
                        format: attrs.get("format").cloned().unwrap_or_default(),
                        players: Vec::new(),
                    });
                } else if name == "player" {
                    if let Some(table) = current.as_mut() {
                        if let Some(player_name) = attrs.get("name") {
                            table.players.push(player_name.clone());
                        }
                    }
                }
            }
            Ok(XmlEvent::Empty(tag)) => {
                let name = tag_name(&tag);
                let attrs = attrs_map(&tag);
                if name == "table" {
                    tables.push(TableInfo {
                        table_id: attrs.get("id").cloned().unwrap_or_default(),
                        name: attrs.get("name").cloned().unwrap_or_default(),
                        status: attrs.get("status").cloned().unwrap_or_default(),
                        format: attrs.get("format").cloned().unwrap_or_default(),
                        players: Vec::new(),
                    });
                } else if name == "player" {
                    if let Some(table) = current.as_mut() {
                        if let Some(player_name) = attrs.get("name") {
                            table.players.push(player_name.clone());
                        }
                    }
                }
            }
            Ok(XmlEvent::End(tag)) => {
                if tag_name_end(&tag) == "table" {
                    if let Some(table) = current.take() {
                        tables.push(table);
                    }
                }
            }
            Ok(XmlEvent::Eof) => break,
            Ok(_) => continue,
            Err(e) => {
                log::warn!("[transport] malformed hall XML, returning partial list: {e}");
                break;
            }
        }
    }
    tables
}

/// Parses a deck-descriptor listing (`deck/libraryList` or equivalent).
pub fn parse_deck_list(xml: &str) -> Vec<DeckInfo> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut decks = Vec::new();
    loop {
        match reader.read_event() {
            Ok(XmlEvent::Start(tag)) | Ok(XmlEvent::Empty(tag)) => {
                let name = tag_name(&tag);
                if name == "deck" {
                    let attrs = attrs_map(&tag);
                    if let Some(deck_name) = attrs.get("name") {
                        decks.push(DeckInfo { name: deck_name.clone() });
                    }
                }
            }
            Ok(XmlEvent::Eof) => break,
            Ok(_) => continue,
            Err(e) => {
                log::warn!("[transport] malformed deck-list XML, returning partial list: {e}");
                break;
            }
        }
    }
    decks
}

fn parse_owner(s: &str) -> Owner {
    if s.eq_ignore_ascii_case("me") {
        Owner::Me
    } else {
        Owner::Opponent
    }
}

fn parse_current_player(s: &str) -> CurrentPlayer {
    if s.eq_ignore_ascii_case("me") {
        CurrentPlayer::Me
    } else {
        CurrentPlayer::Opponent
    }
}

fn parse_game_state_element(attrs: &HashMap<String, String>) -> GameStateSnapshot {
    let mut my_power = HashMap::new();
    let mut their_power = HashMap::new();
    for (key, value) in attrs {
        let Ok(parsed) = value.parse::<i32>() else { continue };
        if let Some(index) = key.strip_prefix("my_").and_then(|s| s.parse::<usize>().ok()) {
            my_power.insert(index, parsed);
        } else if let Some(index) = key.strip_prefix("their_").and_then(|s| s.parse::<usize>().ok()) {
            their_power.insert(index, parsed);
        }
    }
    GameStateSnapshot {
        my_power,
        their_power,
        my_force_pile: attrs.get("myForcePile").and_then(|v| v.parse().ok()),
        my_used_pile: attrs.get("myUsedPile").and_then(|v| v.parse().ok()),
        my_lost_pile: attrs.get("myLostPile").and_then(|v| v.parse().ok()),
        my_reserve_deck: attrs.get("myReserveDeck").and_then(|v| v.parse().ok()),
        my_out_of_play: attrs.get("myOutOfPlay").and_then(|v| v.parse().ok()),
        their_force_pile: attrs.get("theirForcePile").and_then(|v| v.parse().ok()),
        their_used_pile: attrs.get("theirUsedPile").and_then(|v| v.parse().ok()),
        their_lost_pile: attrs.get("theirLostPile").and_then(|v| v.parse().ok()),
        their_reserve_deck: attrs.get("theirReserveDeck").and_then(|v| v.parse().ok()),
        their_out_of_play: attrs.get("theirOutOfPlay").and_then(|v| v.parse().ok()),
        current_phase: attrs.get("phase").cloned(),
        turn_number: attrs.get("turnNumber").and_then(|v| v.parse().ok()),
        current_player: attrs.get("currentPlayer").map(|v| parse_current_player(v)),
        my_player_name: attrs.get("myName").cloned(),
        opponent_name: attrs.get("opponentName").cloned(),
        my_side: attrs.get("mySide").and_then(|v| v.parse::<Side>().ok()),
    }
}

fn parse_event_element(name: &str, attrs: &HashMap<String, String>) -> Event {
    match name {
        "PUT_CARD_IN_PLAY" => Event::PutCardInPlay(PutCardInPlay {
            card_id: attrs.get("cardId").cloned().unwrap_or_default(),
            blueprint_id: attrs.get("blueprintId").cloned().unwrap_or_default(),
            owner: attrs.get("owner").map(|v| parse_owner(v)).unwrap_or(Owner::Opponent),
            zone: attrs
                .get("zone")
                .and_then(|v| Zone::from_tag(v))
                .unwrap_or(Zone::AtLocation),
            location_index: attrs.get("locationIndex").and_then(|v| v.parse().ok()),
            attached_to: attrs.get("attachedTo").filter(|v| !v.is_empty()).cloned(),
            location_title: attrs.get("locationTitle").filter(|v| !v.is_empty()).cloned(),
        }),
        "REMOVE_CARD_IN_PLAY" => Event::RemoveCardInPlay {
            card_id: attrs.get("cardId").cloned().unwrap_or_default(),
        },
        "MOVE_CARD_IN_PLAY" => Event::MoveCardInPlay(MoveCardInPlay {
            card_id: attrs.get("cardId").cloned().unwrap_or_default(),
            new_zone: attrs
                .get("zone")
                .and_then(|v| Zone::from_tag(v))
                .unwrap_or(Zone::OutOfPlay),
            new_location_index: attrs.get("locationIndex").and_then(|v| v.parse().ok()),
            attached_to: attrs.get("attachedTo").filter(|v| !v.is_empty()).cloned(),
        }),
        "GAME_STATE" => Event::GameState(parse_game_state_element(attrs)),
        "PHASE" => Event::Phase {
            phase: attrs.get("phase").cloned().unwrap_or_default(),
            turn_number: attrs.get("turnNumber").and_then(|v| v.parse().ok()),
        },
        "TURN_CHANGE" => Event::TurnChange {
            current_player: attrs.get("currentPlayer").map(|v| parse_current_player(v)).unwrap_or(CurrentPlayer::Opponent),
            is_starting_side: attrs.get("startingSide").map(|v| v == "true").unwrap_or(false),
        },
        "GAME_PROGRESS" | "GAME_PROCESS_CHANGE" => {
            Event::GameProgress(attrs.get("text").cloned().unwrap_or_default())
        }
        "CHAT" => Event::Chat(attrs.get("text").cloned().unwrap_or_default()),
        "GAME_END" => Event::GameEnd,
        other => Event::Unknown(other.to_string()),
    }
}

/// Parses one `gameState` batch response into its channel number and
/// ordered event list. Malformed events are logged and dropped without
/// aborting the rest of the batch (spec §4.3 "failure handling").
pub fn parse_game_state_batch(xml: &str) -> Result<(u64, Vec<Event>), CoreError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut channel_number = None;
    let mut events = Vec::new();
    let mut pending_decision: Option<(String, HashMap<String, String>, Vec<RawDecisionOption>)> = None;

    loop {
        match reader.read_event() {
            Ok(XmlEvent::Start(tag)) => {
                let name = tag_name(&tag);
                let attrs = attrs_map(&tag);
                if name == "gameState" {
                    channel_number = attrs.get("channelNumber").and_then(|v| v.parse().ok());
                } else if name == "ge" {
                    pending_decision = Some((name, attrs, Vec::new()));
                } else if name == "parameter" {
                    if let Some((_, _, options)) = pending_decision.as_mut() {
                        options.push(RawDecisionOption {
                            option_id: attrs.get("optionId").cloned().unwrap_or_default(),
                            display_text: attrs.get("value").cloned().unwrap_or_default(),
                            card_id: attrs.get("cardId").cloned(),
                            target_location: attrs.get("targetLocation").and_then(|v| v.parse().ok()),
                        });
                    }
                }
            }
            Ok(XmlEvent::Empty(tag)) => {
                let name = tag_name(&tag);
                let attrs = attrs_map(&tag);
                if name == "gameState" {
                    channel_number = attrs.get("channelNumber").and_then(|v| v.parse().ok());
                } else if name == "ge" {
                    events.push(Event::Decision(decision_from_attrs(&attrs, Vec::new())));
                } else {
                    events.push(parse_event_element(&name, &attrs));
                }
            }
            Ok(XmlEvent::End(tag)) => {
                if tag_name_end(&tag) == "ge" {
                    if let Some((_, attrs, options)) = pending_decision.take() {
                        events.push(Event::Decision(decision_from_attrs(&attrs, options)));
                    }
                }
            }
            Ok(XmlEvent::Eof) => break,
            Ok(_) => continue,
            Err(e) => {
                log::warn!("[transport] malformed event in gameState batch, dropping rest: {e}");
                break;
            }
        }
    }

    let channel_number = channel_number.ok_or_else(|| {
        CoreError::Parse("gameState response missing channelNumber".to_string())
    })?;
    Ok((channel_number, events))
}

fn decision_from_attrs(attrs: &HashMap<String, String>, options: Vec<RawDecisionOption>) -> DecisionEvent {
    let raw_type = attrs.get("decisionType").cloned().unwrap_or_default();
    let selectable = attrs.get("selectable").map(|v| {
        v.split(',').map(|s| s.trim() == "true").collect()
    });
    DecisionEvent {
        decision_id: attrs.get("id").cloned().unwrap_or_default(),
        decision_type: DecisionType::from_tag(&raw_type),
        raw_decision_type: raw_type,
        prompt: attrs.get("text").cloned().unwrap_or_default(),
        no_pass: attrs.get("noPass").map(|v| v == "true").unwrap_or(false),
        default_value: attrs.get("defaultValue").filter(|v| !v.is_empty()).cloned(),
        options,
        selectable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hall_parses_tables_and_nested_players() {
        let xml = r#"<hall><tables>
            <table id="7" name="Bob's Table" status="WAITING" format="Premiere">
                <player name="Bob"/>
            </table>
        </tables></hall>"#;
        let tables = parse_hall(xml);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].table_id, "7");
        assert_eq!(tables[0].players, vec!["Bob".to_string()]);
    }

    #[test]
    fn hall_malformed_xml_yields_empty_list_not_panic() {
        let tables = parse_hall("<hall><tables><table id=\"1\"");
        assert!(tables.is_empty());
    }

    #[test]
    fn game_state_batch_extracts_channel_number_and_events() {
        let xml = r#"<gameState channelNumber="6">
            <PUT_CARD_IN_PLAY cardId="c1" blueprintId="1_249" owner="ME" zone="AT_LOCATION" locationIndex="2"/>
            <PHASE phase="DEPLOY" turnNumber="3"/>
        </gameState>"#;
        let (channel, events) = parse_game_state_batch(xml).unwrap();
        assert_eq!(channel, 6);
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], Event::PutCardInPlay(_)));
        assert!(matches!(events[1], Event::Phase { .. }));
    }

    #[test]
    fn decision_element_collects_parameter_options() {
        let xml = r#"<gameState channelNumber="1">
            <ge decisionType="MULTIPLE_CHOICE" id="d1" text="Choose" noPass="true">
                <parameter name="option" optionId="0" value="Deploy Luke"/>
                <parameter name="option" optionId="1" value="Pass"/>
            </ge>
        </gameState>"#;
        let (_, events) = parse_game_state_batch(xml).unwrap();
        assert_eq!(events.len(), 1);
        let Event::Decision(decision) = &events[0] else { panic!("expected decision") };
        assert_eq!(decision.options.len(), 2);
        assert_eq!(decision.decision_type, Some(DecisionType::MultipleChoice));
    }

    #[test]
    fn missing_channel_number_is_a_parse_error() {
        let result = parse_game_state_batch("<gameState></gameState>");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_tag_becomes_unknown_event() {
        let xml = r#"<gameState channelNumber="1"><SOMETHING_NEW foo="bar"/></gameState>"#;
        let (_, events) = parse_game_state_batch(xml).unwrap();
        assert!(matches!(events[0], Event::Unknown(_)));
    }
}
