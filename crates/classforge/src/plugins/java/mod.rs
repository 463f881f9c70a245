//! Java plugin
//!
//! Generates Java class and interface skeletons from the class model.

mod generator;
pub mod syntax;

pub use generator::{GeneratorConfig, JavaGenerator, SourceUnit};
