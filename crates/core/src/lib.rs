#![forbid(unsafe_code)]

pub mod cache;
pub mod error;
pub mod games;
pub mod model;
pub mod pagination;
pub mod reconcile;
pub mod scoring;
pub mod time;

pub use error::Error;
pub use time::Clock;
