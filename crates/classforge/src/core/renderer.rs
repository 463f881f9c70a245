//! Core renderer trait for diagram output
//!
//! A renderer turns a populated database into some output artifact. For this
//! crate that is source code, one unit per class.

use anyhow::Result;

use super::Database;

/// Core trait for diagram renderers
///
/// # Example
/// ```
/// use classforge::core::Renderer;
/// use classforge::plugins::java::JavaGenerator;
/// use classforge::plugins::uml::ClassDatabase;
///
/// let db = ClassDatabase::new();
/// let generator = JavaGenerator::new();
/// let units = generator.render(&db).unwrap();
/// assert!(units.is_empty());
/// ```
pub trait Renderer<D: Database>: Send + Sync {
    /// The output type of this renderer
    type Output;

    /// Render the diagram database into the output format
    fn render(&self, database: &D) -> Result<Self::Output>;

    /// Get the name of this renderer
    fn name(&self) -> &'static str;

    /// Get the version of this renderer
    fn version(&self) -> &'static str;

    /// Get the supported output format
    fn format(&self) -> &'static str;
}
