//! Classforge - Generate Java skeletons from draw.io class diagrams
//!
//! Reads a UML class diagram drawn in draw.io (plain or compressed `.drawio`
//! XML), recovers the classes, members and relations encoded in its labels and
//! arrow styles, and renders one Java source file per class.
//!
//! # Quick Start
//!
//! ```rust
//! use classforge::generate;
//!
//! let diagram = r#"<mxGraphModel><root>
//!   <mxCell id="0"/><mxCell id="1" parent="0"/>
//!   <mxCell id="2" value="Person" style="swimlane;" vertex="1" parent="1"/>
//!   <mxCell id="3" value="-name: String" style="text;" vertex="1" parent="2"/>
//!   <mxCell id="4" value="+greet()" style="text;" vertex="1" parent="2"/>
//! </root></mxGraphModel>"#;
//!
//! let units = generate(diagram).unwrap();
//! assert_eq!(units[0].file_name, "Person.java");
//! assert!(units[0].contents.contains("public void setName(String name) {"));
//! ```
//!
//! # Advanced Usage
//!
//! For more control, use the individual components:
//!
//! ```rust
//! use classforge::prelude::*;
//!
//! let diagram = r#"<mxGraphModel><root>
//!   <mxCell id="2" value="Animal" style="swimlane;" vertex="1" parent="1"/>
//!   <mxCell id="3" value="Dog" style="swimlane;" vertex="1" parent="1"/>
//!   <mxCell id="4" style="endArrow=block;" edge="1" parent="1" source="3" target="2"/>
//! </root></mxGraphModel>"#;
//!
//! // Parse into a database
//! let parser = DrawioParser::new();
//! let mut database = ClassDatabase::new();
//! parser.parse(diagram, &mut database).unwrap();
//! assert_eq!(database.get_class("Dog").unwrap().superclasses, vec!["Animal"]);
//!
//! // Render with a package header
//! let generator = JavaGenerator::with_config(GeneratorConfig::new().with_package("zoo"));
//! let units = generator.render(&database).unwrap();
//! assert!(units[1].contents.contains("public class Dog extends Animal {"));
//! ```

pub mod core;
pub mod plugins;

pub use core::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        Database, Detector, DiagramError, DirectorySink, MemorySink, OutputSink, Parser,
        Renderer,
    };
    pub use crate::plugins::drawio::{DrawioDetector, DrawioParser};
    pub use crate::plugins::java::{GeneratorConfig, JavaGenerator, SourceUnit};
    pub use crate::plugins::orchestrator::Orchestrator;
    pub use crate::plugins::uml::{
        Attribute, ClassDatabase, ClassModel, ClassRelation, Diagnostic, DiagnosticKind, Method,
        Multiplicity, Parameter, Relation, RelationKind, Visibility,
    };
}

/// Parse a draw.io document into class models, in diagram order
///
/// # Example
/// ```rust
/// let classes = classforge::parse(
///     r#"<mxGraphModel><root>
///          <mxCell id="2" value="Shape&#xa;&lt;&lt;interface&gt;&gt;" style="swimlane;" vertex="1" parent="1"/>
///        </root></mxGraphModel>"#,
/// )
/// .unwrap();
/// assert_eq!(classes[0].name, "Shape");
/// assert!(classes[0].is_interface);
/// ```
pub fn parse(input: &str) -> anyhow::Result<Vec<plugins::uml::ClassModel>> {
    use crate::core::Parser as _;
    use crate::plugins::drawio::DrawioParser;
    use crate::plugins::uml::ClassDatabase;

    let mut database = ClassDatabase::new();
    DrawioParser::new().parse(input, &mut database)?;
    Ok(database.into_classes())
}

/// Parse a draw.io document and render one Java source unit per class
pub fn generate(input: &str) -> anyhow::Result<Vec<plugins::java::SourceUnit>> {
    use crate::plugins::orchestrator::Orchestrator;

    let mut orchestrator = Orchestrator::with_all_plugins();
    orchestrator.register_default_detectors();
    orchestrator.process(input)
}

/// Parse a draw.io document and write the Java sources to `sink`
///
/// Returns the number of units written.
pub fn generate_into(input: &str, sink: &mut dyn OutputSink) -> anyhow::Result<usize> {
    use crate::plugins::orchestrator::Orchestrator;

    let mut orchestrator = Orchestrator::with_all_plugins();
    orchestrator.register_default_detectors();
    orchestrator.process_into(input, sink)
}
