//! # Butterfly-rail Library
//!
//! Topology inference for railway networks described as linear track
//! elements and their endpoint ports.
//!
//! ## Features
//!
//! - **Connections**: ports at exactly the same location are connected
//! - **Navigability**: connected ports are classified (dead end, switch,
//!   crossing) and every possible movement is marked navigable or not from
//!   the port azimuths
//! - **Crossing modes**: 4-way junctions read as double slip or diamond
//!   crossings
//! - **Diagnostics**: malformed topology is reported per port instead of
//!   stopping the run
//!
//! ## Basic Usage
//!
//! ```rust
//! use butterfly_rail::{infer, ElementKind, InferenceConfig, Location, Navigability, Network};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // A switch at (1, 0): `main` continues straight into `east`,
//!     // `branch` diverges by 15°
//!     let mut network = Network::new();
//!     let main = network.add_element("main", ElementKind::Linear)?;
//!     let east = network.add_element("east", ElementKind::Linear)?;
//!     let branch = network.add_element("branch", ElementKind::Linear)?;
//!
//!     network.add_port("main_0", &[main], Location::point(0.0, 0.0), 270.0)?;
//!     let toe = network.add_port("main_1", &[main], Location::point(1.0, 0.0), 90.0)?;
//!     network.add_port("east_0", &[east], Location::point(1.0, 0.0), 270.0)?;
//!     let east_end = network.add_port("east_1", &[east], Location::point(2.0, 0.0), 90.0)?;
//!     network.add_port("branch_0", &[branch], Location::point(1.0, 0.0), 255.0)?;
//!     network.add_port("branch_1", &[branch], Location::point(2.0, 0.3), 75.0)?;
//!
//!     let summary = infer(&mut network, &InferenceConfig::default())?;
//!     assert_eq!(summary.connections_made, 3);
//!     assert_eq!(network.navigability(toe, east_end), Some(Navigability::Navigable));
//!     Ok(())
//! }
//! ```

use log::info;

// Internal modules
pub mod core;

// Re-export core types that users might need
pub use crate::core::config::{CrossingMode, FailurePolicy, InferenceConfig, ProgressCallback};
pub use crate::core::connection::ConnectionStrategy;
pub use crate::core::document::NetworkDocument;
pub use crate::core::error::{Error, Result};
pub use crate::core::geometry::{deviation_angle, possible_navigability, NAVIGABILITY_THRESHOLD_DEG};
pub use crate::core::network::{
    Element, ElementId, ElementKind, Location, Navigability, Network, Port, PortId,
};
pub use crate::core::report::{Diagnostic, DiagnosticKind, RunSummary, Severity};

/// Connect coincident ports, then resolve navigabilities
///
/// Returns the run summary. Fails without writing any navigability when an
/// unsupported topology is met under [`FailurePolicy::FailFast`].
pub fn infer(network: &mut Network, config: &InferenceConfig) -> Result<RunSummary> {
    config.validate()?;

    let connections = crate::core::build_connections(network, config.connection_strategy);
    let navigability = crate::core::resolve_navigabilities(network, config)?;

    let summary = RunSummary {
        ports_found: connections.ports_found,
        connections_made: connections.connections_made,
        dead_ends: navigability.dead_ends,
        switches: navigability.switches,
        crossings: navigability.crossings,
        navigable_edges: navigability.navigable_edges,
        non_navigable_edges: navigability.non_navigable_edges,
        diagnostics: navigability.diagnostics,
    };
    info!(
        "Inference finished: {} warnings, {} errors",
        summary.warnings(),
        summary.errors()
    );
    Ok(summary)
}

/// Only connect coincident ports
pub fn connect(network: &mut Network, config: &InferenceConfig) -> Result<RunSummary> {
    config.validate()?;

    let connections = crate::core::build_connections(network, config.connection_strategy);
    Ok(RunSummary {
        ports_found: connections.ports_found,
        connections_made: connections.connections_made,
        ..Default::default()
    })
}

/// Run [`infer`] on an interop document and return the augmented document
pub fn infer_document(
    document: &NetworkDocument,
    config: &InferenceConfig,
) -> Result<(NetworkDocument, RunSummary)> {
    let mut network = Network::from_document(document)?;
    let summary = infer(&mut network, config)?;
    Ok((NetworkDocument::from_network(&network), summary))
}
