pub mod client;
pub mod error;

pub use client::DocumentStoreClient;
pub use error::DocStoreError;
