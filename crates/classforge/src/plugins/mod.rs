//! Plugin implementations for the generation pipeline
//!
//! `uml` holds the class model shared by all plugins, `drawio` reads
//! diagrams into it and `java` renders it as source code.

pub mod drawio;
pub mod java;
pub mod orchestrator;
pub mod uml;

pub use drawio::*;
pub use java::*;
pub use orchestrator::*;
pub use uml::*;
