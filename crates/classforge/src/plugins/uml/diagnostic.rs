//! Non-fatal findings recorded while parsing
//!
//! A shape that cannot be understood is skipped or defaulted, never an error.
//! Each such decision leaves a [`Diagnostic`] behind so callers can report it.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Class shape with an empty title; kept under a placeholder name
    UnnamedClass,
    /// Member shape whose parent is not a class
    OrphanMember,
    /// Member line that is neither an attribute nor a method
    UnrecognizedMember,
    /// Edge with an endpoint that is not a class on the same page
    DanglingRelation,
}

impl DiagnosticKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticKind::UnnamedClass => "unnamed class",
            DiagnosticKind::OrphanMember => "orphan member",
            DiagnosticKind::UnrecognizedMember => "unrecognized member",
            DiagnosticKind::DanglingRelation => "dangling relation",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub shape_id: String,
    pub kind: DiagnosticKind,
    pub detail: String,
}

impl Diagnostic {
    pub fn new(
        shape_id: impl Into<String>,
        kind: DiagnosticKind,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            shape_id: shape_id.into(),
            kind,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (shape '{}'): {}", self.kind.as_str(), self.shape_id, self.detail)
    }
}
