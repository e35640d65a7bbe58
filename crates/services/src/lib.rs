#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog_service;
pub mod config;
pub mod error;
pub mod games_service;
pub mod progress_service;
pub mod reader_session;
pub mod recommendation_service;
pub mod results_service;
pub mod retry;

pub use lit_core::Clock;

pub use app_services::AppServices;
pub use catalog_service::CatalogService;
pub use config::LitConfig;
pub use error::{
    AppServicesError, CatalogServiceError, ConfigError, GamesError, ProgressServiceError,
    ReaderError, RecommendationError, ResultServiceError,
};
pub use games_service::GamesService;
pub use progress_service::{ProgressListItem, ProgressService, RECENTLY_READ_LIMIT, RecentWork};
pub use reader_session::{BoxedMeasure, ReaderService, ReaderSession};
pub use recommendation_service::{RecommendationConfig, RecommendationService};
pub use results_service::{DEFAULT_QUIZ_MAX_SCORE, ResultService};
pub use retry::RetryPolicy;
