//! docqa-core
//!
//! Configuration, error type, domain types and the traits that the store,
//! embedder and language-model client implement.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;
