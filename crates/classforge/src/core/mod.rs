//! Core abstractions for diagram processing
//!
//! The pipeline traits every format plugin implements, plus the pieces shared
//! across plugins: errors, logging and output sinks.

pub mod chumsky_utils;
mod database;
mod detector;
mod error;
pub mod logging;
mod parser;
mod renderer;
mod sink;

pub use database::*;
pub use detector::*;
pub use error::*;
pub use logging::*;
pub use parser::*;
pub use renderer::*;
pub use sink::*;
