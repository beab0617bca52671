//! Foundational utilities shared across Scout crates.
//!
//! Provides configuration loading, the project catalog, time helpers used by
//! token-expiry checks, and char-budget text truncation for prompt excerpts.

pub mod catalog;
pub mod config;
pub mod text;
pub mod time_utils;

pub use catalog::{CatalogProject, ExperienceLevel, ProjectCatalog};
pub use config::{ConfigError, LarkConfig, ScoutConfig};
pub use text::truncate_chars;
pub use time_utils::{current_unix_timestamp, is_expired_unix};
