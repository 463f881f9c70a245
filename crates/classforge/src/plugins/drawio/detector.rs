//! draw.io document detector
//!
//! Identifies draw.io / mxGraph XML from input text.

use crate::core::Detector;

/// Detector for draw.io documents
pub struct DrawioDetector;

impl DrawioDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DrawioDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for DrawioDetector {
    fn detect(&self, input: &str) -> bool {
        self.confidence(input) > 0.5
    }

    fn confidence(&self, input: &str) -> f64 {
        let trimmed = input.trim_start();

        if trimmed.starts_with("<mxfile") {
            return 1.0;
        }

        // XML prolog followed by an mxfile root
        if trimmed.starts_with("<?xml") && trimmed.contains("<mxfile") {
            return 1.0;
        }

        // Bare graph model, as copied from the editor's "Edit Diagram" dialog
        if trimmed.contains("<mxGraphModel") {
            return 0.9;
        }

        0.0
    }

    fn diagram_type(&self) -> &'static str {
        "drawio"
    }

    fn patterns(&self) -> Vec<&'static str> {
        vec!["<mxfile", "<mxGraphModel"]
    }
}
