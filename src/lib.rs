pub mod aggregator;
pub mod config;
pub mod error;
pub mod fallback;
pub mod model;
pub mod normalization;
pub mod providers;
pub mod session;

pub mod util {
    pub mod env;
    pub mod logging;
}

pub use aggregator::AggregationController;
pub use error::{ProviderError, ProviderResult};
pub use fallback::FallbackCatalog;
pub use model::{Actor, Aggregation, ProviderStatus, StatusMap};
pub use session::SearchSession;
