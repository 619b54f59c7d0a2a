//! HTTP client for the document store's REST API.
//!
//! Only the `listDocuments` call is implemented. Each call makes exactly one
//! request; retrying is left to whoever decides to fetch again.

use std::time::Duration;

use dealdesk_core::DocumentList;
use reqwest::{Client, StatusCode, Url};

use crate::error::DocStoreError;

const PROJECT_HEADER: &str = "X-Appwrite-Project";
const KEY_HEADER: &str = "X-Appwrite-Key";

/// Client for a project on an Appwrite-compatible document store.
pub struct DocumentStoreClient {
    client: Client,
    base_url: Url,
    project_id: String,
    api_key: Option<String>,
}

impl DocumentStoreClient {
    /// Creates a client for `endpoint` (e.g. `https://cloud.appwrite.io/v1`).
    ///
    /// # Errors
    ///
    /// Returns [`DocStoreError::InvalidEndpoint`] if `endpoint` is not an
    /// absolute http(s) URL, or [`DocStoreError::Http`] if the underlying
    /// `reqwest::Client` cannot be constructed.
    pub fn new(
        endpoint: &str,
        project_id: &str,
        api_key: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, DocStoreError> {
        let invalid = |reason: String| DocStoreError::InvalidEndpoint {
            endpoint: endpoint.to_owned(),
            reason,
        };

        // Exactly one trailing slash so relative segments append to the path.
        let normalised = format!("{}/", endpoint.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| invalid(e.to_string()))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", base_url.scheme())));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url,
            project_id: project_id.to_owned(),
            api_key: api_key.map(str::to_owned),
        })
    }

    /// Lists the documents of `collection_id` in `database_id`.
    ///
    /// # Errors
    ///
    /// - [`DocStoreError::Unauthorized`] on 401/403.
    /// - [`DocStoreError::NotFound`] on 404.
    /// - [`DocStoreError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`DocStoreError::Http`] on network or TLS failure.
    /// - [`DocStoreError::Deserialize`] if the body is not a document list.
    pub async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
    ) -> Result<DocumentList, DocStoreError> {
        let url = self.documents_url(database_id, collection_id)?;
        tracing::debug!(%url, "listing documents");

        let mut request = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .header(PROJECT_HEADER, &self.project_id);
        if let Some(key) = &self.api_key {
            request = request.header(KEY_HEADER, key);
        }

        let response = request.send().await?;
        let status = response.status();
        let url = url.to_string();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(DocStoreError::Unauthorized {
                status: status.as_u16(),
                url,
            });
        }
        if status == StatusCode::NOT_FOUND {
            return Err(DocStoreError::NotFound { url });
        }
        if !status.is_success() {
            return Err(DocStoreError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        let list: DocumentList =
            serde_json::from_str(&body).map_err(|e| DocStoreError::Deserialize {
                context: format!("listDocuments({database_id}/{collection_id})"),
                source: e,
            })?;

        tracing::debug!(
            documents = list.documents.len(),
            total = list.total(),
            "documents listed"
        );
        Ok(list)
    }

    fn documents_url(&self, database_id: &str, collection_id: &str) -> Result<Url, DocStoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| DocStoreError::InvalidEndpoint {
                endpoint: self.base_url.to_string(),
                reason: "endpoint cannot be used as a base URL".to_owned(),
            })?
            .pop_if_empty()
            .extend(&[
                "databases",
                database_id,
                "collections",
                collection_id,
                "documents",
            ]);
        Ok(url)
    }
}
