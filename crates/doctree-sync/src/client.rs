//! HTTP client for the explorer service.

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use uuid::Uuid;

use doctree_core::{ClientConfig, DocRef, DocRefInfo};
use doctree_store::{BulkActionResult, DocOperation, ExplorerAction};

use crate::event::{SyncEvent, optimistic_marker};
use crate::request::{BulkRequest, RenameRequest, stripped_refs};
use crate::{SYNC_CHANNEL_SIZE, SyncError};

/// Client for the explorer service.
///
/// Cloning is cheap; clones share the connection pool and the event
/// channel.
#[derive(Debug, Clone)]
pub struct SyncClient {
    http: reqwest::Client,
    base: Url,
    events: mpsc::Sender<SyncEvent>,
}

impl SyncClient {
    /// Create a client and the receiver its events are delivered on.
    pub fn new(config: &ClientConfig) -> Result<(Self, mpsc::Receiver<SyncEvent>), SyncError> {
        let base = parse_base(&config.explorer_service_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout())
            .build()?;

        let (events, rx) = mpsc::channel(SYNC_CHANNEL_SIZE);
        Ok((Self { http, base, events }, rx))
    }

    /// Base URL every request path is appended to.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Start an operation in the background.
    ///
    /// Returns the id carried by the resulting events.
    pub fn submit(&self, operation: DocOperation) -> Uuid {
        let request_id = Uuid::new_v4();
        let client = self.clone();

        tokio::spawn(async move {
            client.run(request_id, operation).await;
        });

        request_id
    }

    async fn run(self, request_id: Uuid, operation: DocOperation) {
        let label = operation.label();
        let marker = optimistic_marker(&operation);

        let started = SyncEvent::Started {
            request_id,
            label,
            marker,
        };
        if self.events.send(started).await.is_err() {
            return;
        }

        let event = match self.execute(operation).await {
            Ok(action) => {
                tracing::info!(%request_id, label, "request confirmed");
                SyncEvent::Confirmed {
                    request_id,
                    label,
                    action,
                }
            }
            Err(error) => {
                tracing::warn!(%request_id, label, %error, "request failed");
                SyncEvent::Failed {
                    request_id,
                    label,
                    error,
                }
            }
        };

        let _ = self.events.send(event).await;
    }

    /// Perform an operation and translate the response into the action that
    /// confirms it.
    pub async fn execute(&self, operation: DocOperation) -> Result<ExplorerAction, SyncError> {
        match operation {
            DocOperation::FetchDocTree => {
                let document_tree: DocRef = self.get(&["all"]).await?;
                Ok(ExplorerAction::DocTreeReceived { document_tree })
            }
            DocOperation::FetchDocRefTypes => {
                let doc_ref_types: Vec<String> = self.get(&["docRefTypes"]).await?;
                Ok(ExplorerAction::DocRefTypesReceived { doc_ref_types })
            }
            DocOperation::FetchDocInfo { doc_ref } => {
                let info: DocRefInfo = self
                    .get(&["info", doc_ref.doc_type.as_str(), doc_ref.uuid.as_str()])
                    .await?;
                Ok(ExplorerAction::DocRefInfoReceived { info })
            }
            DocOperation::Rename { doc_ref, name } => {
                let body = RenameRequest::new(&doc_ref, name.clone());
                let result: DocRef = self.send(Method::PUT, &["rename"], &body).await?;
                Ok(ExplorerAction::DocRefRenamed {
                    doc_ref,
                    name,
                    result,
                })
            }
            DocOperation::Copy {
                doc_refs,
                destination,
                permission_inheritance,
            } => {
                let body = BulkRequest::new(&doc_refs, &destination, permission_inheritance);
                let result: BulkActionResult = self.send(Method::POST, &["copy"], &body).await?;
                Ok(ExplorerAction::DocRefsCopied {
                    doc_refs,
                    destination,
                    result,
                })
            }
            DocOperation::Move {
                doc_refs,
                destination,
                permission_inheritance,
            } => {
                let body = BulkRequest::new(&doc_refs, &destination, permission_inheritance);
                let result: BulkActionResult = self.send(Method::PUT, &["move"], &body).await?;
                Ok(ExplorerAction::DocRefsMoved {
                    doc_refs,
                    destination,
                    result,
                })
            }
            DocOperation::Delete { doc_refs } => {
                let body = stripped_refs(&doc_refs);
                let result: BulkActionResult =
                    self.send(Method::DELETE, &["delete"], &body).await?;
                Ok(ExplorerAction::DocRefsDeleted { doc_refs, result })
            }
        }
    }

    /// Build the URL for a path below the base, encoding each segment.
    pub fn url(&self, segments: &[&str]) -> Result<Url, SyncError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| SyncError::InvalidUrl {
                url: self.base.to_string(),
                reason: "cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<R: DeserializeOwned>(&self, segments: &[&str]) -> Result<R, SyncError> {
        let url = self.url(segments)?;
        tracing::debug!(%url, "GET");
        self.read(self.http.get(url.clone()), &url).await
    }

    async fn send<B, R>(&self, method: Method, segments: &[&str], body: &B) -> Result<R, SyncError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.url(segments)?;
        tracing::debug!(%url, %method, "sending");
        self.read(self.http.request(method, url.clone()).json(body), &url)
            .await
    }

    async fn read<R: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &Url,
    ) -> Result<R, SyncError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Status {
                status,
                url: url.to_string(),
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|source| SyncError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

fn parse_base(raw: &str) -> Result<Url, SyncError> {
    let url = Url::parse(raw).map_err(|e| SyncError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(SyncError::InvalidUrl {
            url: raw.to_string(),
            reason: "cannot be a base".to_string(),
        });
    }
    Ok(url)
}
