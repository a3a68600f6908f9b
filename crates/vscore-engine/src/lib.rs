//! Script scoring engine.
//!
//! This crate provides:
//! - Gate checks (brand, SEO title, partner safety, coherence, funnel, facts)
//! - Quality dimension scoring through one structured model call
//! - The deterministic context multiplier
//! - Rizz scoring from vocal emotion data and transcript copy
//! - The orchestrating pipeline and the collaborator traits it depends on

pub mod collaborators;
pub mod config;
pub mod error;
pub mod gates;
pub mod logging;
pub mod metrics;
pub mod multiplier;
pub mod orchestrator;
pub mod prompts;
pub mod quality;
pub mod rizz;
pub mod stats;
pub mod store;
pub mod text;

pub use collaborators::{BrandCatalog, ScoreStore, VideoFacts};
pub use config::ScoringConfig;
pub use error::{ScoringError, ScoringResult};
pub use gates::{BrandLookup, GateChecker};
pub use logging::ScoringLogger;
pub use multiplier::MultiplierInputs;
pub use orchestrator::ScoringPipeline;
pub use quality::QualityScorer;
pub use rizz::RizzScorer;
pub use store::InMemoryScoreStore;
