//! Groups deal documents into the configured board columns.

use std::convert::Infallible;

use dealdesk_core::{BoardItem, BoardLayout, Column, Deal, DocumentList};
use serde_json::Value;

/// Result of distributing deals over the board columns.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardPartition {
    /// Columns in configuration order. Items keep input order.
    pub columns: Vec<Column>,
    /// Ids of deals whose status matched no column.
    pub unmatched: Vec<String>,
    /// Records that could not be read as a deal at all.
    pub malformed: usize,
}

impl BoardPartition {
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.columns.iter().map(|c| c.items.len()).sum()
    }
}

/// Distribute `documents` over the columns of `layout`.
///
/// A deal lands in the column whose id equals its status, with the item's
/// status replaced by the column's display name. Deals with an unknown
/// status and unreadable records are left out; they never abort the rest.
#[must_use]
pub fn partition(layout: &BoardLayout, documents: &[Value]) -> BoardPartition {
    let mut columns = layout.empty_board();
    let mut unmatched = Vec::new();
    let mut malformed = 0;

    for raw in documents {
        let deal = match Deal::from_record(raw) {
            Ok(deal) => deal,
            Err(e) => {
                tracing::debug!(error = %e, "skipping malformed deal record");
                malformed += 1;
                continue;
            }
        };

        match layout.position(&deal.status) {
            Some(position) => {
                let column = &mut columns[position];
                let item = BoardItem::project(deal, &column.name);
                column.items.push(item);
            }
            None => {
                tracing::debug!(deal_id = %deal.id, status = %deal.status, "deal status matches no column");
                unmatched.push(deal.id);
            }
        }
    }

    BoardPartition {
        columns,
        unmatched,
        malformed,
    }
}

/// `select` transform turning a deals collection into board columns.
pub fn board_select(
    layout: BoardLayout,
) -> impl Fn(&DocumentList) -> Result<Vec<Column>, Infallible> + Send + Sync + 'static {
    move |list| {
        let board = partition(&layout, &list.documents);
        if !board.unmatched.is_empty() || board.malformed > 0 {
            tracing::warn!(
                unmatched = board.unmatched.len(),
                malformed = board.malformed,
                placed = board.item_count(),
                "some deals were left off the board"
            );
        }
        Ok(board.columns)
    }
}
