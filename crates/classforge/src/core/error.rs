//! Core error types for diagram processing
//!
//! These cover the failures that abort a whole run: unreadable documents,
//! undecodable pages and sink I/O. Problems with individual shapes are never
//! errors; they end up as diagnostics on the class database instead.

use std::path::PathBuf;
use thiserror::Error;

/// Core error types for diagram processing
#[derive(Error, Debug)]
pub enum DiagramError {
    #[error("XML error: {message} at byte {position}")]
    XmlError { message: String, position: u64 },

    #[error("Structure error: {message}")]
    StructureError { message: String },

    #[error("Payload error: {message}")]
    PayloadError { message: String },

    #[error("Render error: {message}")]
    RenderError { message: String },

    #[error("Detection error: {message}")]
    DetectionError { message: String },

    #[error("Sink error: failed to write '{}': {source}", .path.display())]
    SinkError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("Unknown diagram format: {format}")]
    UnknownFormat { format: String },
}

impl DiagramError {
    /// Create a new XML error
    pub fn xml_error(message: String, position: u64) -> Self {
        Self::XmlError { message, position }
    }

    /// Create a new structure error
    pub fn structure_error(message: String) -> Self {
        Self::StructureError { message }
    }

    /// Create a new payload error (compressed page could not be decoded)
    pub fn payload_error(message: String) -> Self {
        Self::PayloadError { message }
    }

    /// Create a new render error
    pub fn render_error(message: String) -> Self {
        Self::RenderError { message }
    }

    /// Create a new detection error
    pub fn detection_error(message: String) -> Self {
        Self::DetectionError { message }
    }

    /// Create a new sink error for the given destination
    pub fn sink_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::SinkError {
            path: path.into(),
            source,
        }
    }
}
