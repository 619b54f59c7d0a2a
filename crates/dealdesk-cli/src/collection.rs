//! Observers over document-store collections.

use std::fmt::Display;
use std::sync::Arc;

use dealdesk_core::{AppConfig, DocumentList};
use dealdesk_docstore::DocumentStoreClient;
use dealdesk_query::{QueryCache, QueryObserver};

/// Cache key addressing one collection in one database.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct CollectionKey {
    pub database_id: String,
    pub collection_id: String,
}

impl CollectionKey {
    pub(crate) fn new(database_id: &str, collection_id: &str) -> Self {
        Self {
            database_id: database_id.to_owned(),
            collection_id: collection_id.to_owned(),
        }
    }
}

pub(crate) fn docstore_client(config: &AppConfig) -> anyhow::Result<Arc<DocumentStoreClient>> {
    Ok(Arc::new(DocumentStoreClient::new(
        &config.docstore_endpoint,
        &config.docstore_project,
        config.docstore_api_key.as_deref(),
        config.request_timeout_secs,
        &config.user_agent,
    )?))
}

/// Observer that lists `key`'s documents through `client` and shapes them
/// with `select`.
pub(crate) fn collection_observer<V, S, SE>(
    cache: QueryCache<CollectionKey, DocumentList>,
    client: Arc<DocumentStoreClient>,
    key: CollectionKey,
    select: S,
) -> QueryObserver<CollectionKey, DocumentList, V>
where
    S: Fn(&DocumentList) -> Result<V, SE> + Send + Sync + 'static,
    SE: Display + 'static,
{
    QueryObserver::new(
        cache,
        key,
        move |key: &CollectionKey| {
            let client = Arc::clone(&client);
            let key = key.clone();
            async move {
                client
                    .list_documents(&key.database_id, &key.collection_id)
                    .await
            }
        },
        select,
    )
}
