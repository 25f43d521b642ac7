//! NewsHub Common Library
//!
//! Shared code for the NewsHub site including:
//! - Database models and repository patterns
//! - Error types and handling
//! - Configuration management
//! - Session storage and authentication utilities
//! - Metrics and observability

pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod session;

// Re-export commonly used types
pub use config::AppConfig;
pub use db::Repository;
pub use errors::{AppError, Result};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The fixed set of article categories shown on the home page.
/// The `news.category` column is free-form text; these are the ones
/// the site curates sections for.
pub const CATEGORIES: &[&str] = &["World", "Technology", "Sports", "Entertainment", "Business"];

/// Number of related articles shown under an article
pub const RELATED_ARTICLES_LIMIT: u64 = 3;

/// Number of featured articles on the home page
pub const FEATURED_LIMIT: u64 = 3;

/// Number of cards per category section on the home page
pub const CATEGORY_PREVIEW_LIMIT: u64 = 4;

/// Maximum search results returned per query
pub const SEARCH_RESULTS_LIMIT: u64 = 12;
