//! The embedding index.
//!
//! - [`store`] - in-memory entries, sync state and provider tag
//! - [`cache`] - the JSON snapshot on disk
//! - [`service`] - rebuild, sync, upsert and query over both

pub mod cache;
pub mod service;
pub mod store;


pub use cache::{CacheLoad, CacheMiss, IndexCache};
pub use service::{
    DEFAULT_PAGE_SIZE, IndexService, IndexStats, ReindexOutcome, ScoredEntry, SyncReport,
    UpsertOutcome,
};
pub use store::{Entry, IndexStore};
