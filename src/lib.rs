pub mod core;
pub mod analysis;
pub mod schema;
pub mod index;
pub mod scoring;
pub mod query;
pub mod search;
pub mod storage;
pub mod writer;
pub mod reader;

pub use crate::core::config::IndexConfig;
pub use crate::core::error::{Error, ErrorKind, Result};
pub use crate::core::service::{DocumentMeta, DocumentStore, IndexService};
pub use crate::core::types::DocId;
pub use crate::query::builder::SearchOptions;
pub use crate::search::aggregate::SearchResultEntry;
