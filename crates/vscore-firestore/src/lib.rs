//! Firestore REST API client.
//!
//! This crate provides:
//! - An append-only repository for score records (`script_scores`)
//! - A brand catalog repository (`approved_brands`, `partners`)
//! - Service account authentication via gcp_auth with token caching
//! - Retry with exponential backoff and full jitter

pub mod brand_repo;
pub mod client;
pub mod error;
pub mod metrics;
pub mod retry;
pub mod score_repo;
pub mod token_cache;
pub mod types;

#[cfg(test)]
mod client_tests;

pub use brand_repo::BrandRepository;
pub use client::{FirestoreClient, FirestoreConfig};
pub use error::{FirestoreError, FirestoreResult};
pub use retry::RetryConfig;
pub use score_repo::ScoreRecordRepository;
pub use types::{Document, FromFirestoreValue, ToFirestoreValue, Value};
