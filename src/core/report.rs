//! Run summary and diagnostics
//!
//! Every diagnostic names the port and/or element it is about so operators
//! can locate the problem in the source data.

use log::{error, warn};
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::core::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Exactly one other port at the same location
    SingleConnection,
    /// A connected port has no opposite port to navigate to
    MissingOpposite,
    /// Opposite port requested on a non-linear element
    NonLinearOwner,
    /// Port owned by zero or several elements
    OwnerCount,
    /// Linear element without exactly two ports
    LinearElementPortCount,
    /// More than 3 connected ports
    UnsupportedDegree,
    /// Two resolutions disagreed on the same directed edge
    ConflictingNavigability,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
            port: None,
            element: None,
            message: message.into(),
        }
    }

    pub fn error(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            port: None,
            element: None,
            message: message.into(),
        }
    }

    pub fn with_port(mut self, port: impl Into<String>) -> Self {
        self.port = Some(port.into());
        self
    }

    pub fn with_element(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }

    /// Diagnostic for an error that stopped a single port's resolution.
    /// Returns `None` for errors that are not about the topology itself.
    pub fn from_error(err: &Error) -> Option<Self> {
        let message = err.to_string();
        let diag = match err {
            Error::OwnerCount { port, .. } => {
                Self::error(DiagnosticKind::OwnerCount, message).with_port(port.clone())
            }
            Error::LinearElementPortCount { element, .. } => {
                Self::error(DiagnosticKind::LinearElementPortCount, message)
                    .with_element(element.clone())
            }
            Error::UnsupportedDegree { port, .. } => {
                Self::error(DiagnosticKind::UnsupportedDegree, message).with_port(port.clone())
            }
            _ => return None,
        };
        Some(diag)
    }

    /// Emit through the `log` facade at the matching level
    pub fn log(&self) {
        match self.severity {
            Severity::Warning => warn!("{}", self.message),
            Severity::Error => error!("{}", self.message),
        }
    }
}

/// Drop repeated diagnostics, keeping the first occurrence of each
/// `(kind, port, element, message)`
pub fn dedup_diagnostics(diagnostics: &mut Vec<Diagnostic>) {
    let mut seen = FxHashSet::default();
    diagnostics.retain(|d| {
        seen.insert((d.kind, d.port.clone(), d.element.clone(), d.message.clone()))
    });
}

/// Counts gathered over one inference run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub ports_found: usize,
    pub connections_made: usize,
    pub dead_ends: usize,
    pub switches: usize,
    pub crossings: usize,
    pub navigable_edges: usize,
    pub non_navigable_edges: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl RunSummary {
    pub fn warnings(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn errors(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn diagnostics_of(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.kind == kind)
    }

    fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}
