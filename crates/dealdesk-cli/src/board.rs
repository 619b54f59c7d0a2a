//! `board` command: deals from the document store, grouped into the
//! configured columns through the query cache.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use dealdesk_core::{AppConfig, Column, DocumentList};
use dealdesk_query::{board_select, QueryCache, QueryObserver, QueryResult};

use crate::collection::{collection_observer, docstore_client, CollectionKey};
use crate::print_json;

pub(crate) type BoardObserver = QueryObserver<CollectionKey, DocumentList, Vec<Column>>;

pub(crate) async fn run_board(
    config: &AppConfig,
    columns_override: Option<&Path>,
    refresh_secs: Option<u64>,
    compact: bool,
) -> anyhow::Result<()> {
    let columns_path = columns_override.unwrap_or(&config.columns_path);
    let layout = dealdesk_core::load_columns(columns_path)
        .with_context(|| format!("loading columns from {}", columns_path.display()))?;
    tracing::info!(
        columns = layout.columns().len(),
        path = %columns_path.display(),
        "board columns loaded"
    );

    let key = CollectionKey::new(&config.database_id, &config.deals_collection);
    let observer = collection_observer(
        QueryCache::new(),
        docstore_client(config)?,
        key,
        board_select(layout),
    );

    let first = observer.fetch().await;
    let Some(interval_secs) = refresh_secs else {
        return emit(&first, compact);
    };
    emit_or_warn(&first, compact)?;

    refresh_loop(&observer, Duration::from_secs(interval_secs.max(1)), compact).await
}

async fn refresh_loop(
    observer: &BoardObserver,
    every: Duration,
    compact: bool,
) -> anyhow::Result<()> {
    let mut ticker = tokio::time::interval(every);
    // The first tick completes immediately; the initial fetch already ran.
    ticker.tick().await;

    // Armed once so a ctrl-c during a refetch is still seen.
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let result = tokio::select! {
                    result = observer.refetch() => result,
                    signal = &mut ctrl_c => {
                        signal?;
                        tracing::info!("received ctrl-c during refresh, stopping");
                        return Ok(());
                    }
                };
                emit_or_warn(&result, compact)?;
            }
            signal = &mut ctrl_c => {
                signal?;
                tracing::info!("received ctrl-c, stopping board refresh");
                return Ok(());
            }
        }
    }
}

/// One-shot output: fail the command when there is nothing to show.
fn emit(result: &QueryResult<Vec<Column>>, compact: bool) -> anyhow::Result<()> {
    match (&result.data, &result.error) {
        (Some(columns), _) => {
            report_stale(result);
            print_json(columns.as_slice(), compact)
        }
        (None, Some(e)) => anyhow::bail!("could not load the board: {e}"),
        (None, None) => anyhow::bail!("board query finished with status {}", result.status),
    }
}

/// Refresh output: a failed refresh is logged and the loop keeps going.
fn emit_or_warn(result: &QueryResult<Vec<Column>>, compact: bool) -> anyhow::Result<()> {
    match &result.data {
        Some(columns) => {
            report_stale(result);
            print_json(columns.as_slice(), compact)
        }
        None => {
            tracing::warn!(
                status = %result.status,
                error = ?result.error,
                "board unavailable; will retry on next refresh"
            );
            Ok(())
        }
    }
}

fn report_stale(result: &QueryResult<Vec<Column>>) {
    if result.is_success() {
        return;
    }
    if let Some(e) = &result.error {
        tracing::warn!(
            error = %e,
            last_updated = ?result.updated_at,
            "showing last known board"
        );
    }
}
