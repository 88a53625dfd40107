use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use futures_util::lock::Mutex as AsyncMutex;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use url::Url;

use crate::core::config::Config;
use crate::core::model::PageEnvelope;
use crate::services::query::{GraphqlRequest, GraphqlResponse, QueryKey, QueryVariables};

#[cfg(target_arch = "wasm32")]
pub trait SourceBounds {}
#[cfg(target_arch = "wasm32")]
impl<T> SourceBounds for T {}

#[cfg(not(target_arch = "wasm32"))]
pub trait SourceBounds: Send + Sync {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: Send + Sync> SourceBounds for T {}

/// Anything that can answer the characters query.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait CharacterSource: SourceBounds {
    async fn fetch(&self, variables: &QueryVariables) -> Result<PageEnvelope>;
}

pub fn create_source(config: &Config) -> Result<Box<dyn CharacterSource>> {
    let client = GraphqlClient::new(config.endpoint_url()?);
    info!("Using catalog endpoint {} (cache: {})", client.endpoint, config.cache);
    if config.cache {
        Ok(Box::new(CachedSource::new(client)))
    } else {
        Ok(Box::new(client))
    }
}

// --- GraphQL over HTTP ---

#[derive(Debug)]
pub struct GraphqlClient {
    endpoint: Url,
    client: reqwest::Client,
}

impl GraphqlClient {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            client: reqwest::Client::new(),
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl CharacterSource for GraphqlClient {
    async fn fetch(&self, variables: &QueryVariables) -> Result<PageEnvelope> {
        debug!("Querying characters: {:?}", variables);

        let resp = self
            .client
            .post(self.endpoint.clone())
            .json(&GraphqlRequest::characters(variables))
            .send()
            .await
            .context("Failed to send characters query")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_default();
            warn!("Catalog API returned {}: {}", status, error_text);
            return Err(anyhow!("Catalog API error: {}", status));
        }

        let response: GraphqlResponse = resp
            .json()
            .await
            .context("Failed to parse characters response")?;

        response.into_envelope().inspect_err(|e| warn!("{:#}", e))
    }
}

// --- Request cache ---

/// Memoises successful envelopes by request identity.
///
/// Identical requests already in flight wait on the same per-key gate and are
/// answered from the cache once the first one lands. Entries are never
/// evicted; the cache lives as long as the page view.
pub struct CachedSource<S> {
    inner: S,
    entries: Mutex<HashMap<QueryKey, PageEnvelope>>,
    in_flight: Mutex<HashMap<QueryKey, Arc<AsyncMutex<()>>>>,
}

impl<S: CharacterSource> CachedSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            entries: Mutex::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    fn gate(&self, key: &QueryKey) -> Arc<AsyncMutex<()>> {
        self.in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(key.clone())
            .or_default()
            .clone()
    }

    fn lookup(&self, key: &QueryKey) -> Option<PageEnvelope> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl<S: CharacterSource> CharacterSource for CachedSource<S> {
    async fn fetch(&self, variables: &QueryVariables) -> Result<PageEnvelope> {
        let key = variables.key();
        if let Some(hit) = self.lookup(&key) {
            debug!("Cache hit for {:?}", key);
            return Ok(hit);
        }

        let gate = self.gate(&key);
        let _turn = gate.lock().await;
        if let Some(hit) = self.lookup(&key) {
            debug!("Joined in-flight request for {:?}", key);
            return Ok(hit);
        }

        // Failures propagate without being stored, so the next attempt goes out again.
        let envelope = self.inner.fetch(variables).await?;
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, envelope.clone());
        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{CharacterRecord, Origin, Status};
    use crate::core::state::ViewState;

    struct MockSource {
        calls: Arc<Mutex<Vec<QueryVariables>>>,
        should_fail: bool,
        delay: Option<std::time::Duration>,
    }

    impl MockSource {
        fn new(should_fail: bool) -> Self {
            Self {
                calls: Arc::new(Mutex::new(Vec::new())),
                should_fail,
                delay: None,
            }
        }
    }

    #[async_trait]
    impl CharacterSource for MockSource {
        async fn fetch(&self, variables: &QueryVariables) -> Result<PageEnvelope> {
            self.calls.lock().unwrap().push(variables.clone());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.should_fail {
                return Err(anyhow!("Mock fetch error"));
            }
            Ok(PageEnvelope {
                count: 1,
                pages: 1,
                next: None,
                prev: None,
                results: vec![CharacterRecord {
                    id: variables.page.to_string(),
                    name: "Morty Smith".to_string(),
                    status: Status::Alive,
                    species: "Human".to_string(),
                    gender: "Male".to_string(),
                    origin: Origin { name: "unknown".to_string() },
                }],
            })
        }
    }

    fn vars(page: u32, species: &str) -> QueryVariables {
        QueryVariables::from_view(&ViewState {
            page,
            species_filter: species.to_string(),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_identical_requests_hit_cache() -> Result<()> {
        let mock = MockSource::new(false);
        let calls = mock.calls.clone();
        let cached = CachedSource::new(mock);

        let first = cached.fetch(&vars(1, "")).await?;
        let second = cached.fetch(&vars(1, "")).await?;
        assert_eq!(first, second);
        assert_eq!(calls.lock().unwrap().len(), 1);

        cached.fetch(&vars(2, "")).await?;
        cached.fetch(&vars(1, "Human")).await?;
        assert_eq!(calls.lock().unwrap().len(), 3);
        assert_eq!(cached.len(), 3);

        cached.clear();
        cached.fetch(&vars(1, "")).await?;
        assert_eq!(calls.lock().unwrap().len(), 4);
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_duplicates_share_one_request() -> Result<()> {
        let mock = MockSource {
            delay: Some(std::time::Duration::from_millis(50)),
            ..MockSource::new(false)
        };
        let calls = mock.calls.clone();
        let cached = CachedSource::new(mock);

        let page_one = vars(1, "Human");
        let page_two = vars(2, "Human");
        let (a, b, c) = tokio::join!(
            cached.fetch(&page_one),
            cached.fetch(&page_one),
            cached.fetch(&page_two)
        );
        assert_eq!(a?, b?);
        assert_eq!(c?.results[0].id, "2");

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls.iter().filter(|v| v.page == 1).count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let mock = MockSource::new(true);
        let calls = mock.calls.clone();
        let cached = CachedSource::new(mock);

        assert!(cached.fetch(&vars(1, "")).await.is_err());
        assert!(cached.fetch(&vars(1, "")).await.is_err());
        assert_eq!(calls.lock().unwrap().len(), 2);
        assert!(cached.is_empty());
    }

    mod http {
        use super::*;
        use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
        use serde_json::{json, Value};
        use tokio::net::TcpListener;
        use tokio::sync::oneshot;

        #[derive(Clone)]
        struct ServerState {
            tx: Arc<tokio::sync::Mutex<Option<oneshot::Sender<Value>>>>,
        }

        async fn handle_graphql(State(state): State<ServerState>, Json(body): Json<Value>) -> Json<Value> {
            if let Some(tx) = state.tx.lock().await.take() {
                let _ = tx.send(body);
            }
            Json(json!({
                "data": {
                    "characters": {
                        "info": { "count": 2, "pages": 1, "next": null, "prev": null },
                        "results": [
                            {
                                "id": "2",
                                "name": "Morty Smith",
                                "status": "Alive",
                                "species": "Human",
                                "gender": "Male",
                                "origin": { "name": "unknown" }
                            },
                            {
                                "id": "1",
                                "name": "Rick Sanchez",
                                "status": "Alive",
                                "species": "Human",
                                "gender": "Male",
                                "origin": { "name": "Earth (C-137)" }
                            }
                        ]
                    }
                }
            }))
        }

        async fn handle_failure() -> StatusCode {
            StatusCode::INTERNAL_SERVER_ERROR
        }

        async fn spawn_server() -> Result<(Url, oneshot::Receiver<Value>)> {
            std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
            let listener = TcpListener::bind("127.0.0.1:0").await?;
            let addr = listener.local_addr()?;
            let (tx, rx) = oneshot::channel();
            let state = ServerState {
                tx: Arc::new(tokio::sync::Mutex::new(Some(tx))),
            };
            let app = Router::new()
                .route("/graphql", post(handle_graphql))
                .route("/broken", post(handle_failure))
                .with_state(state);
            tokio::spawn(async move {
                let _ = axum::serve(listener, app).await;
            });
            Ok((Url::parse(&format!("http://{addr}/graphql"))?, rx))
        }

        #[tokio::test]
        async fn test_client_posts_query_without_unset_filters() -> Result<()> {
            let (endpoint, body_rx) = spawn_server().await?;
            let client = GraphqlClient::new(endpoint);

            let envelope = client.fetch(&vars(1, "")).await?;
            assert_eq!(envelope.count, 2);
            assert_eq!(envelope.results.len(), 2);
            assert_eq!(envelope.results[1].name, "Rick Sanchez");

            let body = body_rx.await?;
            assert_eq!(body["operationName"], "GetCharacters");
            assert_eq!(body["variables"], json!({ "page": 1, "filter": {} }));
            assert!(body["query"].as_str().unwrap_or_default().contains("characters(page: $page, filter: $filter)"));
            Ok(())
        }

        #[tokio::test]
        async fn test_server_error_is_fetch_failure() -> Result<()> {
            let (endpoint, _body_rx) = spawn_server().await?;
            let client = GraphqlClient::new(endpoint.join("/broken")?);

            assert!(client.fetch(&vars(1, "")).await.is_err());
            Ok(())
        }
    }
}
