mod cache;
mod failover;
mod file_source;
mod in_memory;

pub use cache::CachedCatalogProvider;
pub use failover::FailoverCatalogSource;
pub use file_source::{FileAliasSource, FileCatalogSource};
pub use in_memory::InMemoryCatalogSource;
