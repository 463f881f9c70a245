//! draw.io plugin
//!
//! Reads UML class diagrams drawn in draw.io (diagrams.net) into the class
//! model.

mod detector;
pub mod document;
pub mod labels;
mod parser;
mod style;

pub use detector::DrawioDetector;
pub use document::{read_document, Document, Page, Shape};
pub use parser::{DrawioParser, UNNAMED_CLASS};
pub use style::Style;
