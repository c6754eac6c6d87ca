use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::RwLock;
use reqwest::StatusCode;
use tracing::{debug, error, info};
use url::Url;

use crate::{
    catalog::decode::{decode_game_list, ListBody},
    error::CatalogError,
    models::Game,
    notify::{MutationKind, Notifier},
};

const LOAD_FAILURE_MESSAGE: &str = "Failed to load games. Please try again later.";
const FIND_FAILURE_MESSAGE: &str = "Failed to find game with that ID.";
const DELETE_CONFIRM_PROMPT: &str = "Are you sure you want to delete this game?";

/// HTTP client for the backlog API holding the shared record list.
///
/// The list is a cache of the last successful fetch/mutation sequence, not
/// an authoritative store. Every operation catches its own failures: reads
/// set an observable error flag, mutations surface a blocking alert through
/// the [`Notifier`] and report whether they were applied.
#[derive(Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: Url,
    notifier: Arc<dyn Notifier>,
    state: Arc<RwLock<CatalogState>>,
}

#[derive(Default)]
struct CatalogState {
    games: Vec<Game>,
    loading: bool,
    error: Option<String>,
}

impl CatalogClient {
    /// Build a client against the configured API base URL.
    pub fn new(base_url: &str, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .with_context(|| format!("invalid API base URL: {base_url}"))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("API base URL {base_url} cannot hold path segments");
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            notifier,
            state: Arc::new(RwLock::new(CatalogState::default())),
        })
    }

    /// Records from the last successful fetch/mutation sequence.
    pub fn games(&self) -> Vec<Game> {
        self.state.read().games.clone()
    }

    /// A read operation is currently in flight.
    pub fn is_loading(&self) -> bool {
        self.state.read().loading
    }

    /// User-facing text for the last failed read, cleared when one starts.
    pub fn last_error(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    /// Fetch the backlog, optionally scoped to an exact title.
    ///
    /// A 404 replaces the list with an empty one without raising the error
    /// flag; any other failure raises the flag and leaves the list as it
    /// was. An empty filter string counts as no filter.
    pub async fn fetch_games(&self, title: Option<&str>) {
        let title = title.filter(|title| !title.is_empty());
        self.begin_read();
        match self.try_fetch_games(title).await {
            Ok(games) => {
                debug!("list fetch returned {} record(s)", games.len());
                let mut state = self.state.write();
                state.loading = false;
                state.games = games;
            }
            Err(err) => {
                error!("list fetch failed: {err}");
                let mut state = self.state.write();
                state.loading = false;
                state.error = Some(LOAD_FAILURE_MESSAGE.to_string());
            }
        }
    }

    /// Fetch a single record by id, replacing the list with the result.
    ///
    /// An empty id falls back to an unfiltered fetch. A 404 clears the list
    /// without raising the error flag; any other failure raises the flag and
    /// clears the list.
    pub async fn fetch_game_by_id(&self, id: &str) {
        if id.is_empty() {
            self.fetch_games(None).await;
            return;
        }
        self.begin_read();
        match self.try_fetch_game_by_id(id).await {
            Ok(games) => {
                let mut state = self.state.write();
                state.loading = false;
                state.games = games;
            }
            Err(err) => {
                error!("fetch by id {id} failed: {err}");
                let mut state = self.state.write();
                state.loading = false;
                state.error = Some(FIND_FAILURE_MESSAGE.to_string());
                state.games.clear();
            }
        }
    }

    /// Create a record upstream. On success the server's representation is
    /// prepended to the list. Returns whether the create was applied.
    pub async fn create_game(&self, game: &Game) -> bool {
        match self.try_create_game(game).await {
            Ok(created) => {
                info!("created game {}", created.steam_app_id);
                self.state.write().games.insert(0, created);
                true
            }
            Err(err) => {
                error!("create of {} failed: {err}", game.steam_app_id);
                self.notifier.alert(MutationKind::Create, &err).await;
                false
            }
        }
    }

    /// Replace a record upstream. The outgoing payload never carries
    /// `ValidatedOn`.
    ///
    /// On success the matching list entry is replaced with the server's
    /// returned representation, falling back to `game` itself when the
    /// response has no parseable body. An id absent from the list leaves it
    /// untouched even though the remote update went through.
    pub async fn update_game(&self, game: &Game) -> bool {
        match self.try_update_game(game).await {
            Ok(stored) => {
                info!("updated game {}", game.steam_app_id);
                let mut state = self.state.write();
                if let Some(entry) = state
                    .games
                    .iter_mut()
                    .find(|entry| entry.steam_app_id == game.steam_app_id)
                {
                    *entry = stored.unwrap_or_else(|| game.clone());
                }
                true
            }
            Err(err) => {
                error!("update of {} failed: {err}", game.steam_app_id);
                self.notifier.alert(MutationKind::Update, &err).await;
                false
            }
        }
    }

    /// Delete a record after interactive confirmation. A declined
    /// confirmation performs no network call. Returns whether the record
    /// was removed.
    pub async fn delete_game(&self, id: u32) -> bool {
        if !self.notifier.confirm(DELETE_CONFIRM_PROMPT).await {
            debug!("delete of {id} declined");
            return false;
        }
        match self.try_delete_game(id).await {
            Ok(()) => {
                info!("deleted game {id}");
                self.state.write().games.retain(|game| game.steam_app_id != id);
                true
            }
            Err(err) => {
                error!("delete of {id} failed: {err}");
                self.notifier.alert(MutationKind::Delete, &err).await;
                false
            }
        }
    }

    fn begin_read(&self) {
        let mut state = self.state.write();
        state.loading = true;
        state.error = None;
    }

    fn games_url(&self, segment: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        if let Some(segment) = segment {
            if let Ok(mut path) = url.path_segments_mut() {
                path.pop_if_empty().push(segment);
            }
        }
        url
    }

    async fn try_fetch_games(&self, title: Option<&str>) -> Result<Vec<Game>, CatalogError> {
        let response = self.http.get(self.games_url(title)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(CatalogError::Upstream {
                status: response.status(),
            });
        }

        let body = response.bytes().await?;
        match decode_game_list(&body, title.is_some()) {
            ListBody::Games(games) => Ok(games),
            ListBody::Empty => Ok(Vec::new()),
            ListBody::Malformed => {
                error!(
                    "non-JSON list response: {}",
                    String::from_utf8_lossy(&body)
                );
                Err(CatalogError::MalformedResponse)
            }
        }
    }

    async fn try_fetch_game_by_id(&self, id: &str) -> Result<Vec<Game>, CatalogError> {
        let response = self.http.get(self.games_url(Some(id))).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(CatalogError::Upstream {
                status: response.status(),
            });
        }

        let body = response.bytes().await?;
        match serde_json::from_slice::<Game>(&body) {
            Ok(game) => Ok(vec![game]),
            Err(_) => {
                error!(
                    "unparseable single-record response: {}",
                    String::from_utf8_lossy(&body)
                );
                Err(CatalogError::MalformedResponse)
            }
        }
    }

    async fn try_create_game(&self, game: &Game) -> Result<Game, CatalogError> {
        let response = self
            .http
            .post(self.games_url(None))
            .json(game)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CatalogError::Upstream {
                status: response.status(),
            });
        }

        let body = response.bytes().await?;
        match serde_json::from_slice::<Game>(&body) {
            Ok(created) => Ok(created),
            Err(_) => {
                error!(
                    "unparseable create response: {}",
                    String::from_utf8_lossy(&body)
                );
                Err(CatalogError::MalformedResponse)
            }
        }
    }

    async fn try_update_game(&self, game: &Game) -> Result<Option<Game>, CatalogError> {
        let url = self.games_url(Some(&game.steam_app_id.to_string()));
        let response = self
            .http
            .put(url)
            .json(&game.without_validation_stamp())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CatalogError::Upstream {
                status: response.status(),
            });
        }

        // A body that does not parse is fine here; the local record stands in.
        let body = response.bytes().await?;
        Ok(serde_json::from_slice::<Game>(&body).ok())
    }

    async fn try_delete_game(&self, id: u32) -> Result<(), CatalogError> {
        let response = self
            .http
            .delete(self.games_url(Some(&id.to_string())))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CatalogError::Upstream {
                status: response.status(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct SilentNotifier;

    #[async_trait]
    impl Notifier for SilentNotifier {
        async fn alert(&self, _kind: MutationKind, _error: &CatalogError) {}
        async fn confirm(&self, _prompt: &str) -> bool {
            true
        }
    }

    fn client(base: &str) -> CatalogClient {
        CatalogClient::new(base, Arc::new(SilentNotifier)).expect("valid base URL")
    }

    #[test]
    fn games_url_appends_percent_encoded_segment() {
        let client = client("http://127.0.0.1:3000/api/games");
        assert_eq!(
            client.games_url(Some("Dark Souls")).as_str(),
            "http://127.0.0.1:3000/api/games/Dark%20Souls"
        );
        assert_eq!(
            client.games_url(None).as_str(),
            "http://127.0.0.1:3000/api/games"
        );
    }

    #[test]
    fn games_url_tolerates_trailing_slash() {
        let client = client("http://localhost/api/games/");
        assert_eq!(
            client.games_url(Some("42")).as_str(),
            "http://localhost/api/games/42"
        );
    }

    #[test]
    fn rejects_unusable_base_urls() {
        let notifier: Arc<dyn Notifier> = Arc::new(SilentNotifier);
        assert!(CatalogClient::new("not a url", notifier.clone()).is_err());
        assert!(CatalogClient::new("data:text/plain,nope", notifier).is_err());
    }
}
