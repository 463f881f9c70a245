//! Plugin orchestrator for coordinating the generation pipeline
//!
//! The orchestrator manages the flow of data through all plugins:
//! Detector → Parser → ClassDatabase → Generator → OutputSink

use anyhow::Result;
use std::collections::HashMap;
use tracing::{debug, info, span, trace, warn, Level};

use crate::core::{Database, Detector, DiagramError, MemorySink, OutputSink, Parser, Renderer};
use crate::plugins::drawio::{DrawioDetector, DrawioParser};
use crate::plugins::java::{GeneratorConfig, JavaGenerator, SourceUnit};
use crate::plugins::uml::ClassDatabase;

/// Plugin orchestrator that coordinates the entire pipeline
///
/// Wires detectors, the diagram parser and the code generator together so
/// callers can run the full pipeline without handling each trait manually.
pub struct Orchestrator {
    detectors: HashMap<String, Box<dyn Detector>>,
    parser: Option<DrawioParser>,
    generator: Option<JavaGenerator>,
}

impl Orchestrator {
    /// Create a new empty orchestrator
    pub fn new() -> Self {
        Self {
            detectors: HashMap::new(),
            parser: None,
            generator: None,
        }
    }

    /// Create an orchestrator with the draw.io parser and Java generator
    pub fn with_all_plugins() -> Self {
        Self::with_generator_config(GeneratorConfig::default())
    }

    /// Same as [`Orchestrator::with_all_plugins`] with generator options
    pub fn with_generator_config(config: GeneratorConfig) -> Self {
        Self {
            detectors: HashMap::new(),
            parser: Some(DrawioParser::new()),
            generator: Some(JavaGenerator::with_config(config)),
        }
    }

    /// Register a detector plugin
    pub fn register_detector(&mut self, name: String, detector: Box<dyn Detector>) {
        self.detectors.insert(name, detector);
    }

    /// Register every built-in detector
    pub fn register_default_detectors(&mut self) {
        self.register_detector("drawio".to_string(), Box::new(DrawioDetector::new()));
    }

    /// Get available detector names, sorted
    pub fn get_detectors(&self) -> Vec<String> {
        let mut names: Vec<String> = self.detectors.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if parser and generator are available
    pub fn has_plugins(&self) -> bool {
        self.parser.is_some() && self.generator.is_some()
    }

    /// Detect the input format, preferring the most confident detector
    pub fn detect_format(&self, input: &str) -> Result<String> {
        let detect_span = span!(Level::INFO, "detect_format", input_len = input.len());
        let _enter = detect_span.enter();

        trace!("Starting format detection");

        let mut best: Option<(&str, f64)> = None;
        for (name, detector) in &self.detectors {
            let confidence = detector.confidence(input);
            trace!(detector = name.as_str(), confidence, "Checking detector");
            if detector.detect(input) && best.map_or(true, |(_, c)| confidence > c) {
                best = Some((name.as_str(), confidence));
            }
        }

        match best {
            Some((name, confidence)) => {
                info!(detector = name, confidence, "Detected input format");
                Ok(name.to_string())
            }
            None => {
                warn!("No suitable detector found for input");
                Err(DiagramError::detection_error(
                    "no suitable detector found for input".to_string(),
                )
                .into())
            }
        }
    }

    /// Parse the input into a class database (skips detection)
    pub fn parse(&self, input: &str) -> Result<ClassDatabase> {
        let parse_span = span!(Level::DEBUG, "pipeline_parse");
        let _enter = parse_span.enter();

        let parser = self
            .parser
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("No diagram parser available"))?;

        let mut database = ClassDatabase::new();
        parser.parse(input, &mut database)?;
        debug!(
            class_count = database.node_count(),
            relation_count = database.edge_count(),
            diagnostics = database.diagnostics().len(),
            "Parsing completed"
        );
        Ok(database)
    }

    /// Process input through the complete pipeline
    ///
    /// Runs detector → parser → generator using registered plugins.
    pub fn process(&self, input: &str) -> Result<Vec<SourceUnit>> {
        let process_span = span!(Level::INFO, "process_diagram", input_len = input.len());
        let _enter = process_span.enter();

        info!("Starting generation pipeline");

        let database = self.detect_and_parse(input)?;

        let render_span = span!(Level::DEBUG, "pipeline_render");
        let _render_enter = render_span.enter();
        let units = self.generator()?.render(&database)?;
        debug!(unit_count = units.len(), "Rendering completed");

        info!("Pipeline completed successfully");
        Ok(units)
    }

    /// Process input and write every unit to `sink`, returning the unit count
    pub fn process_into(&self, input: &str, sink: &mut dyn OutputSink) -> Result<usize> {
        let process_span = span!(Level::INFO, "process_into", input_len = input.len());
        let _enter = process_span.enter();

        let database = self.detect_and_parse(input)?;
        let classes: Vec<_> = database.nodes().cloned().collect();
        self.generator()?.generate(&classes, sink)
    }

    /// Process input and collect the units by file name
    pub fn process_to_memory(&self, input: &str) -> Result<MemorySink> {
        let mut sink = MemorySink::new();
        self.process_into(input, &mut sink)?;
        Ok(sink)
    }

    fn detect_and_parse(&self, input: &str) -> Result<ClassDatabase> {
        let detect_span = span!(Level::DEBUG, "pipeline_detect");
        let detect_enter = detect_span.enter();
        let format = self.detect_format(input)?;
        debug!(format, "Input format detected");
        drop(detect_enter);

        if format != "drawio" {
            warn!(format, "Unsupported input format");
            return Err(DiagramError::UnknownFormat { format }.into());
        }

        self.parse(input)
    }

    fn generator(&self) -> Result<&JavaGenerator> {
        self.generator
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("No code generator available"))
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERSON: &str = r#"<mxGraphModel><root>
        <mxCell id="0"/><mxCell id="1" parent="0"/>
        <mxCell id="2" value="Person" style="swimlane;" vertex="1" parent="1"/>
        <mxCell id="3" value="-name: String" style="text;" vertex="1" parent="2"/>
    </root></mxGraphModel>"#;

    /// Claims everything, for checking how detectors are ranked
    struct GreedyDetector(f64);

    impl Detector for GreedyDetector {
        fn detect(&self, _input: &str) -> bool {
            true
        }

        fn confidence(&self, _input: &str) -> f64 {
            self.0
        }

        fn diagram_type(&self) -> &'static str {
            "greedy"
        }

        fn patterns(&self) -> Vec<&'static str> {
            Vec::new()
        }
    }

    fn orchestrator() -> Orchestrator {
        let mut orchestrator = Orchestrator::with_all_plugins();
        orchestrator.register_default_detectors();
        orchestrator
    }

    #[test]
    fn test_orchestrator_creation() {
        let orchestrator = Orchestrator::new();
        assert!(orchestrator.get_detectors().is_empty());
        assert!(!orchestrator.has_plugins());
        assert!(Orchestrator::with_all_plugins().has_plugins());
    }

    #[test]
    fn test_detect_with_no_detectors() {
        let result = Orchestrator::new().detect_format(PERSON);
        assert_eq!(
            result.unwrap_err().to_string(),
            "Detection error: no suitable detector found for input"
        );
    }

    #[test]
    fn test_detect_prefers_higher_confidence() {
        let mut orchestrator = orchestrator();
        orchestrator.register_detector("greedy".to_string(), Box::new(GreedyDetector(0.6)));
        assert_eq!(orchestrator.detect_format(PERSON).unwrap(), "drawio");
        assert_eq!(orchestrator.get_detectors(), vec!["drawio", "greedy"]);
    }

    #[test]
    fn test_unsupported_format() {
        let mut orchestrator = Orchestrator::with_all_plugins();
        orchestrator.register_detector("greedy".to_string(), Box::new(GreedyDetector(1.0)));
        let err = orchestrator.process(PERSON).unwrap_err();
        assert_eq!(err.to_string(), "Unknown diagram format: greedy");
    }

    #[test]
    fn test_process_with_missing_plugins() {
        let mut orchestrator = Orchestrator::new();
        orchestrator.register_default_detectors();
        let err = orchestrator.process(PERSON).unwrap_err();
        assert_eq!(err.to_string(), "No diagram parser available");
    }

    #[test]
    fn test_process() {
        let units = orchestrator().process(PERSON).unwrap();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].file_name, "Person.java");
        assert!(units[0].contents.contains("public String getName()"));
    }

    #[test]
    fn test_process_into_memory() {
        let sink = orchestrator().process_to_memory(PERSON).unwrap();
        assert_eq!(sink.len(), 1);
        assert!(sink.get("Person.java").is_some());
    }

    #[test]
    fn test_process_with_package() {
        let mut orchestrator =
            Orchestrator::with_generator_config(GeneratorConfig::new().with_package("app.model"));
        orchestrator.register_default_detectors();
        let units = orchestrator.process(PERSON).unwrap();
        assert!(units[0].contents.starts_with("package app.model;"));
    }

    #[test]
    fn test_process_plain_text() {
        let err = orchestrator().process("just some text").unwrap_err();
        assert!(err.to_string().contains("no suitable detector"));
    }
}
