pub mod client;
pub mod config;
pub mod error;
pub mod model;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::{ApiError, Result};
pub use model::{SearchResponse, SearchResult, SearchSources, Statistics};
