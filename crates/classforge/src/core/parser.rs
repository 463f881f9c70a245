//! Core parser trait for diagram markup
//!
//! This trait defines the interface for parsing diagram markup
//! into structured data stored in a database.

use anyhow::Result;

use super::Database;

/// Core trait for diagram parsers
///
/// # Example
/// ```
/// use classforge::core::{Database, Parser};
/// use classforge::plugins::drawio::DrawioParser;
/// use classforge::plugins::uml::ClassDatabase;
///
/// let xml = r#"<mxGraphModel><root>
///   <mxCell id="0"/><mxCell id="1" parent="0"/>
///   <mxCell id="c" value="Person" style="swimlane;" vertex="1" parent="1"/>
/// </root></mxGraphModel>"#;
///
/// let parser = DrawioParser::new();
/// let mut db = ClassDatabase::new();
/// parser.parse(xml, &mut db).unwrap();
/// assert_eq!(db.node_count(), 1);
/// ```
pub trait Parser<D: Database>: Send + Sync {
    /// Parse diagram markup into the provided database
    fn parse(&self, input: &str, database: &mut D) -> Result<()>;

    /// Get the name of this parser
    fn name(&self) -> &'static str;

    /// Get the version of this parser
    fn version(&self) -> &'static str;

    /// Check if the input can be parsed by this parser
    fn can_parse(&self, input: &str) -> bool;
}
