//! Error types for butterfly-rail
//!
//! Structural violations and unsupported topologies are typed so that batch
//! runs can collect them per port instead of stopping at the first one.

use thiserror::Error;

/// Main error type for butterfly-rail operations
#[derive(Debug, Error)]
pub enum Error {
    /// A port must belong to exactly one element
    #[error("Port '{port}' belongs to {} elements, expected exactly 1{}", .owners.len(), format_owners(.owners))]
    OwnerCount { port: String, owners: Vec<String> },

    /// A linear element must carry exactly two ports
    #[error("Linear element '{element}' has {} ports, expected exactly 2{}", .ports.len(), format_owners(.ports))]
    LinearElementPortCount { element: String, ports: Vec<String> },

    /// More than 3 ports converge on a single port
    #[error("Unsupported topology: {degree} ports connected to port '{port}' (at most 3 supported)")]
    UnsupportedDegree { port: String, degree: usize },

    /// A port references an element that is not in the network
    #[error("Port '{port}' references unknown element '{element}'")]
    UnknownElement { port: String, element: String },

    /// A relation references a port that is not in the network
    #[error("Unknown port '{0}'")]
    UnknownPort(String),

    /// Two elements or two ports share the same identifier
    #[error("Duplicate identifier '{0}'")]
    DuplicateName(String),

    /// Invalid configuration or parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Malformed interop document
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Structural violations abort a single port's resolution, never the run
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Error::OwnerCount { .. } | Error::LinearElementPortCount { .. }
        )
    }
}

fn format_owners(names: &[String]) -> String {
    if names.is_empty() {
        String::new()
    } else {
        format!(" ({})", names.join(", "))
    }
}

/// Convenience result type for butterfly-rail operations
pub type Result<T> = std::result::Result<T, Error>;
