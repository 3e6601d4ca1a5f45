mod cache;
pub mod handlers;

pub use cache::{CacheError, HistoryCache, HistoryEntry, Snapshot};
