//! Stateful HTTP session against the remote game server (C2, spec §4.2).
//!
//! One authenticated session per worker: a single `reqwest::blocking::Client`
//! with a cookie jar carries the session cookie across every call after
//! [`TransportClient::login`]. No retry loop lives here — the worker decides
//! what to do with a `Transient` error; this layer only classifies it.

use crate::types::{DeckInfo, TableInfo};
use crate::xml;
use std::time::Duration;
use swgemp_core::{CoreError, WorkerConfig};
use swgemp_gameplay::Event;

pub struct TransportClient {
    http: reqwest::blocking::Client,
    base_url: String,
    game_state_timeout: Duration,
    participant_id: String,
}

/// Every network-level failure (connect refused, read timeout, broken
/// socket) is transient: the worker decides whether to retry, reconnect,
/// or give up after enough of them accumulate (spec §7).
fn classify_reqwest_error(e: reqwest::Error) -> CoreError {
    CoreError::Transient(format!("transport: {e}"))
}

impl TransportClient {
    /// Builds the client with connect/request timeouts from config and a
    /// dedicated longer read timeout used only by [`Self::game_state`].
    pub fn new(config: &WorkerConfig) -> Result<Self, CoreError> {
        let http = reqwest::blocking::ClientBuilder::new()
            .cookie_store(true)
            .connect_timeout(config.request_timeout)
            .timeout(config.game_state_timeout.max(config.request_timeout))
            .build()
            .map_err(|e| CoreError::Fatal(format!("build http client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.server_url.trim_end_matches('/').to_string(),
            game_state_timeout: config.game_state_timeout,
            participant_id: config.username.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Authenticates the session. Network errors are transient (retryable
    /// by the caller); any non-2xx response is a fatal credential error
    /// (spec §4.2).
    pub fn login(&self, username: &str, password: &str) -> Result<(), CoreError> {
        let response = self
            .http
            .post(self.url("login"))
            .form(&[("login", username), ("password", password)])
            .send()
            .map_err(classify_reqwest_error)?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(CoreError::Fatal(format!(
                "login rejected with status {}",
                response.status()
            )))
        }
    }

    /// Ordered hall listing. Malformed XML downgrades to an empty list
    /// rather than surfacing a parse error (spec §4.2).
    pub fn hall_list(&self) -> Result<Vec<TableInfo>, CoreError> {
        let response = self
            .http
            .get(self.url("hall"))
            .query(&[("participantId", "null")])
            .send()
            .map_err(classify_reqwest_error)?;
        let body = response.text().map_err(classify_reqwest_error)?;
        Ok(xml::parse_hall(&body))
    }

    /// Creates a table, then looks its id up by name in a fresh hall
    /// listing (the server only confirms creation implicitly, spec §4.2).
    /// Returns `None` on any failure rather than propagating an error.
    pub fn create_table(
        &self,
        deck_name: &str,
        is_library: bool,
        table_name: &str,
        format: &str,
    ) -> Option<String> {
        let result = self
            .http
            .post(self.url("hall"))
            .form(&[
                ("deckName", deck_name),
                ("sampleDeck", if is_library { "true" } else { "false" }),
                ("tableName", table_name),
                ("format", format),
            ])
            .send();
        if let Err(e) = result {
            log::warn!("[transport] create_table request failed: {e}");
            return None;
        }
        match self.hall_list() {
            Ok(tables) => tables.into_iter().find(|t| t.name == table_name).map(|t| t.table_id),
            Err(e) => {
                log::warn!("[transport] create_table lookup failed: {e}");
                None
            }
        }
    }

    /// Best-effort: failures are logged, never propagated (spec §4.2).
    pub fn leave_table(&self, table_id: &str) {
        if let Err(e) = self
            .http
            .post(self.url("hall"))
            .form(&[("action", "leave"), ("tableId", table_id)])
            .send()
        {
            log::warn!("[transport] leave_table({table_id}) failed: {e}");
        }
    }

    /// Best-effort listing; failures log and yield an empty vector.
    pub fn list_library_decks(&self) -> Vec<DeckInfo> {
        self.fetch_deck_list("deck/libraryList")
    }

    /// Best-effort listing; failures log and yield an empty vector.
    pub fn list_user_decks(&self) -> Vec<DeckInfo> {
        self.fetch_deck_list("deck/list")
    }

    fn fetch_deck_list(&self, path: &str) -> Vec<DeckInfo> {
        match self.http.get(self.url(path)).send() {
            Ok(response) => match response.text() {
                Ok(body) => xml::parse_deck_list(&body),
                Err(e) => {
                    log::warn!("[transport] deck list body read failed: {e}");
                    Vec::new()
                }
            },
            Err(e) => {
                log::warn!("[transport] deck list request failed: {e}");
                Vec::new()
            }
        }
    }

    /// Long-polls for the next batch of events past `channel_number`. A
    /// read timeout is reported as `Transient` so the worker's
    /// consecutive-timeout counter can re-issue with the same channel
    /// number (spec §4.2, §5 "Cancellation and timeouts").
    pub fn game_state(&self, channel_number: u64) -> Result<(u64, Vec<Event>), CoreError> {
        let response = self
            .http
            .get(self.url("gameState"))
            .query(&[
                ("channelNumber", channel_number.to_string()),
                ("participantId", self.participant_id.clone()),
            ])
            .timeout(self.game_state_timeout)
            .send()
            .map_err(classify_reqwest_error)?;
        if !response.status().is_success() {
            return Err(CoreError::Transient(format!(
                "gameState returned status {}",
                response.status()
            )));
        }
        let body = response.text().map_err(classify_reqwest_error)?;
        xml::parse_game_state_batch(&body)
    }

    /// Posts a decision response. Idempotent on the server side, so a
    /// transient network error can be retried by the caller without risk
    /// of double-submission semantics beyond what the server already
    /// tolerates (spec §4.2).
    pub fn respond(&self, decision_id: &str, payload: &str) -> Result<(), CoreError> {
        let response = self
            .http
            .post(self.url("gameDecision"))
            .form(&[
                ("decisionId", decision_id),
                ("decisionValue", payload),
                ("participantId", self.participant_id.as_str()),
            ])
            .send()
            .map_err(classify_reqwest_error)?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(CoreError::Transient(format!(
                "gameDecision returned status {}",
                response.status()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> WorkerConfig {
        WorkerConfig {
            server_url: "http://localhost:8080".to_string(),
            username: "bot".to_string(),
            password: "secret".to_string(),
            card_json_dir: "/tmp".to_string(),
            poll_interval: Duration::from_secs(3),
            request_timeout: Duration::from_secs(10),
            game_state_timeout: Duration::from_secs(15),
            deploy_threshold: 0,
            max_hand_size: 7,
            hand_soft_cap: 5,
            force_gen_target: 4,
            battle_favorable_threshold: 3,
            battle_danger_threshold: -3,
            brain_name: "Static".to_string(),
            max_consecutive_timeouts: 3,
        }
    }

    #[test]
    fn url_joins_base_and_path_without_double_slash() {
        let client = TransportClient::new(&config()).unwrap();
        assert_eq!(client.url("hall"), "http://localhost:8080/hall");
        assert_eq!(client.url("/hall"), "http://localhost:8080/hall");
    }

    #[test]
    fn trailing_slash_in_base_url_is_trimmed() {
        let mut cfg = config();
        cfg.server_url = "http://localhost:8080/".to_string();
        let client = TransportClient::new(&cfg).unwrap();
        assert_eq!(client.url("hall"), "http://localhost:8080/hall");
    }
}
