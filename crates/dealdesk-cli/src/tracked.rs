//! `tracked` command: the products collection listed through the query cache.

use dealdesk_core::AppConfig;
use dealdesk_query::{tracked_select, QueryCache};

use crate::collection::{collection_observer, docstore_client, CollectionKey};
use crate::print_json;

pub(crate) async fn run_tracked(config: &AppConfig, compact: bool) -> anyhow::Result<()> {
    let key = CollectionKey::new(&config.database_id, &config.products_collection);
    let observer = collection_observer(
        QueryCache::new(),
        docstore_client(config)?,
        key,
        tracked_select(),
    );

    let result = observer.fetch().await;
    match (&result.data, &result.error) {
        (Some(products), _) => {
            tracing::info!(count = products.len(), "tracked products loaded");
            print_json(products.as_slice(), compact)
        }
        (None, Some(e)) => anyhow::bail!("could not load tracked products: {e}"),
        (None, None) => {
            anyhow::bail!("tracked products query finished with status {}", result.status)
        }
    }
}
