#![forbid(unsafe_code)]

pub mod cache;
pub mod repository;
pub mod seed;
pub mod sqlite;

pub use cache::FileCache;
pub use repository::{
    CatalogRepository, InMemoryRepository, NewProgressRecord, ProgressRepository,
    ResultRepository, Storage, StorageError,
};
