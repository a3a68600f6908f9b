//! Firestore REST API client.
//!
//! Each public method describes its request as a `Call` and hands it to
//! `FirestoreClient::dispatch`. Dispatch owns authentication (one token
//! refresh on `ACCESS_TOKEN_EXPIRED`), the tracing span and request metrics.
//! A 404 comes back as `Ok(None)` so callers decide whether absence is an
//! error.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use gcp_auth::{CustomServiceAccount, TokenProvider};
use reqwest::{Client, Method, Response, StatusCode};
use tracing::{debug, info_span, Instrument};

use crate::error::{FirestoreError, FirestoreResult};
use crate::metrics::{record_query_documents, record_request};
use crate::retry::RetryConfig;
use crate::token_cache::TokenCache;
use crate::types::{Document, RunQueryRequest, RunQueryResponse, StructuredQuery, Value};

const DEFAULT_DATABASE: &str = "(default)";

/// Connection settings for the score database.
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    pub project_id: String,
    pub database_id: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub retry: RetryConfig,
}

impl FirestoreConfig {
    /// Read `GCP_PROJECT_ID` (or `FIREBASE_PROJECT_ID`), `FIRESTORE_DATABASE_ID`
    /// and `FIRESTORE_CONNECT_TIMEOUT_SECS`.
    pub fn from_env() -> FirestoreResult<Self> {
        let project_id = ["GCP_PROJECT_ID", "FIREBASE_PROJECT_ID"]
            .iter()
            .find_map(|var| {
                std::env::var(var)
                    .ok()
                    .map(|p| p.trim().to_string())
                    .filter(|p| !p.is_empty())
            })
            .ok_or_else(|| {
                FirestoreError::auth_error("no project configured: set GCP_PROJECT_ID")
            })?;

        let database_id = std::env::var("FIRESTORE_DATABASE_ID")
            .ok()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        let connect_secs = std::env::var("FIRESTORE_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        Ok(Self {
            project_id,
            database_id,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(connect_secs),
            retry: RetryConfig::from_env(),
        })
    }

    pub fn documents_url(&self) -> String {
        format!(
            "https://firestore.googleapis.com/v1/projects/{}/databases/{}/documents",
            self.project_id, self.database_id
        )
    }
}

/// A single REST request.
struct Call<'a> {
    operation: &'static str,
    collection: &'a str,
    doc_id: Option<&'a str>,
    method: Method,
    url: String,
    body: Option<serde_json::Value>,
}

/// Firestore REST API client.
#[derive(Clone)]
pub struct FirestoreClient {
    http: Client,
    config: FirestoreConfig,
    base_url: String,
    tokens: Arc<TokenCache>,
}

impl FirestoreClient {
    /// Authenticate with the service account named by
    /// `GOOGLE_APPLICATION_CREDENTIALS`.
    pub async fn new(config: FirestoreConfig) -> FirestoreResult<Self> {
        let account = CustomServiceAccount::from_env()
            .map_err(|e| FirestoreError::auth_error(format!("service account: {}", e)))?
            .ok_or_else(|| {
                FirestoreError::auth_error("GOOGLE_APPLICATION_CREDENTIALS is not set")
            })?;

        Self::with_provider(config, Arc::new(account))
    }

    pub fn with_provider(
        config: FirestoreConfig,
        provider: Arc<dyn TokenProvider>,
    ) -> FirestoreResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(concat!("vscore-firestore/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FirestoreError::Network)?;

        Ok(Self {
            http,
            base_url: config.documents_url(),
            config,
            tokens: Arc::new(TokenCache::new(provider)),
        })
    }

    pub async fn from_env() -> FirestoreResult<Self> {
        Self::new(FirestoreConfig::from_env()?).await
    }

    pub fn config(&self) -> &FirestoreConfig {
        &self.config
    }

    fn document_url(&self, collection: &str, doc_id: &str) -> String {
        format!("{}/{}/{}", self.base_url, collection, urlencoding::encode(doc_id))
    }

    /// Fetch a document by ID.
    pub async fn get_document(
        &self,
        collection: &str,
        doc_id: &str,
    ) -> FirestoreResult<Option<Document>> {
        let call = Call {
            operation: "get_document",
            collection,
            doc_id: Some(doc_id),
            method: Method::GET,
            url: self.document_url(collection, doc_id),
            body: None,
        };
        match self.dispatch(call).await? {
            Some(response) => Ok(Some(response.json().await?)),
            None => Ok(None),
        }
    }

    /// Create a document under a caller-chosen ID. An existing ID yields
    /// [`FirestoreError::AlreadyExists`]; documents are never overwritten.
    pub async fn create_document(
        &self,
        collection: &str,
        doc_id: &str,
        fields: HashMap<String, Value>,
    ) -> FirestoreResult<Document> {
        let call = Call {
            operation: "create_document",
            collection,
            doc_id: Some(doc_id),
            method: Method::POST,
            url: format!(
                "{}/{}?documentId={}",
                self.base_url,
                collection,
                urlencoding::encode(doc_id)
            ),
            body: Some(serde_json::to_value(Document::new(fields))?),
        };
        self.dispatch(call)
            .await?
            .ok_or_else(|| FirestoreError::not_found(collection.to_string()))?
            .json()
            .await
            .map_err(FirestoreError::from)
    }

    /// Run a structured query against a root collection.
    pub async fn run_query(&self, query: StructuredQuery) -> FirestoreResult<Vec<Document>> {
        let collection = query
            .from
            .first()
            .map(|c| c.collection_id.clone())
            .unwrap_or_default();

        let call = Call {
            operation: "run_query",
            collection: &collection,
            doc_id: None,
            method: Method::POST,
            url: format!("{}:runQuery", self.base_url),
            body: Some(serde_json::to_value(RunQueryRequest {
                structured_query: query,
            })?),
        };

        let Some(response) = self.dispatch(call).await? else {
            return Ok(Vec::new());
        };
        let body = response.text().await?;
        let docs = parse_run_query_body(&body)?;
        record_query_documents(&collection, docs.len());
        Ok(docs)
    }

    /// Run `op` under the configured retry policy.
    pub async fn with_retry<T, F, Fut>(&self, operation: &str, op: F) -> FirestoreResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = FirestoreResult<T>>,
    {
        crate::retry::with_retry(&self.config.retry, operation, op).await
    }

    async fn dispatch(&self, call: Call<'_>) -> FirestoreResult<Option<Response>> {
        let span = info_span!(
            "firestore_request",
            operation = call.operation,
            collection = %call.collection,
            doc_id = call.doc_id.unwrap_or("")
        );
        let started = Instant::now();
        let result = self.send(&call).instrument(span).await;

        let status = match &result {
            Ok(Some(_)) => 200,
            Ok(None) => 404,
            Err(e) => e.http_status().unwrap_or(500),
        };
        record_request(call.operation, status, started.elapsed().as_secs_f64());
        result
    }

    async fn send(&self, call: &Call<'_>) -> FirestoreResult<Option<Response>> {
        let mut refreshed = false;
        loop {
            let token = self.tokens.get_token().await?;
            let mut request = self
                .http
                .request(call.method.clone(), &call.url)
                .bearer_auth(&token);
            if let Some(body) = &call.body {
                request = request.json(body);
            }

            let response = request.send().await?;
            let status = response.status();
            if status.is_success() {
                return Ok(Some(response));
            }
            if status == StatusCode::NOT_FOUND {
                return Ok(None);
            }

            let body = response.text().await.unwrap_or_default();
            if status == StatusCode::UNAUTHORIZED && !refreshed && token_expired(&body) {
                debug!("Firestore access token expired, refreshing");
                self.tokens.invalidate().await;
                refreshed = true;
                continue;
            }

            let target = match call.doc_id {
                Some(id) => format!("{}/{}", call.collection, id),
                None => call.collection.to_string(),
            };
            return Err(FirestoreError::from_http_status(
                status.as_u16(),
                format!("{} {}: {}", call.operation, target, body),
            ));
        }
    }
}

fn token_expired(body: &str) -> bool {
    body.contains("ACCESS_TOKEN_EXPIRED") || body.contains("\"UNAUTHENTICATED\"")
}

/// Collect the documents from a runQuery response. Entries carrying only a
/// `readTime` are skipped.
pub(crate) fn parse_run_query_body(body: &str) -> FirestoreResult<Vec<Document>> {
    let entries: Vec<RunQueryResponse> = serde_json::from_str(body).map_err(|e| {
        let head: String = body.chars().take(200).collect();
        FirestoreError::invalid_response(format!("runQuery body: {} ({})", e, head))
    })?;
    Ok(entries.into_iter().filter_map(|r| r.document).collect())
}
