//! Keyed fetch-and-cache layer over remote document collections, plus the
//! deal-board and tracked-products transforms built on top of it.

pub mod board;
pub mod cache;
pub mod error;
pub mod observer;
pub mod state;
pub mod tracked;

pub use board::{board_select, partition, BoardPartition};
pub use cache::QueryCache;
pub use error::QueryError;
pub use observer::{QueryObserver, QueryResult};
pub use state::{QueryState, QueryStatus};
pub use tracked::tracked_select;
