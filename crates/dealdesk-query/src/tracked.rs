//! View over the tracked-products collection.

use std::convert::Infallible;

use dealdesk_core::{DocumentList, TrackedProduct};

/// `select` transform reading every tracked product in document order.
/// Records without an id are skipped.
pub fn tracked_select(
) -> impl Fn(&DocumentList) -> Result<Vec<TrackedProduct>, Infallible> + Send + Sync + 'static {
    |list| {
        let mut skipped = 0_usize;
        let products: Vec<TrackedProduct> = list
            .documents
            .iter()
            .filter_map(|raw| {
                TrackedProduct::from_record(raw)
                    .map_err(|e| {
                        tracing::debug!(error = %e, "skipping malformed tracked product");
                        skipped += 1;
                    })
                    .ok()
            })
            .collect();
        if skipped > 0 {
            tracing::warn!(
                skipped,
                kept = products.len(),
                "some tracked products could not be read"
            );
        }
        Ok(products)
    }
}
