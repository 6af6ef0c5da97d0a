//! Core library modules for butterfly-rail
//!
//! Geometry, connection building and navigability resolution over an
//! in-memory railway topology graph.

pub mod config;
pub mod connection;
pub mod document;
pub mod error;
pub mod geometry;
pub mod navigability;
pub mod network;
pub mod report;

// Re-export main types for internal use
pub use config::{CrossingMode, FailurePolicy, InferenceConfig, ProgressCallback};
pub use connection::{build_connections, ConnectionStats, ConnectionStrategy};
pub use navigability::{resolve_navigabilities, NavigabilityStats};
