//! Command-line interface for the classforge utility
//!
//! Provides a CLI to turn draw.io class diagrams into Java source skeletons.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing::{debug, info};

use classforge::core::logging::init_logging;
use classforge::core::{DirectorySink, MemorySink};
use classforge::plugins::java::GeneratorConfig;
use classforge::plugins::uml::{ClassEntry, ClassModel, Diagnostic, Relation};
use classforge::plugins::Orchestrator;

/// Classforge - Generate Java skeletons from draw.io class diagrams
#[derive(Parser)]
#[command(name = "classforge")]
#[command(about = "A Rust utility to generate Java class skeletons from draw.io UML diagrams")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Log level options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate one Java source file per class
    Generate {
        /// Input draw.io file (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Directory the Java files are written to
        #[arg(short, long, default_value = "generated")]
        output: PathBuf,

        /// Package declared at the top of every file
        #[arg(short, long)]
        package: Option<String>,

        /// Print the sources to stdout instead of writing files
        #[arg(long)]
        stdout: bool,
    },

    /// Show the classes, relations and diagnostics recovered from a diagram
    Inspect {
        /// Input draw.io file (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Show in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Detect the input format
    Detect {
        /// Input file to analyze (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Check that a diagram parses and report skipped shapes
    Validate {
        /// Input draw.io file (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Show supported output targets
    Targets {
        /// Show in JSON format
        #[arg(long)]
        json: bool,
    },
}

/// JSON shape of `inspect --json`
#[derive(Serialize)]
struct InspectReport<'a> {
    classes: Vec<InspectedClass<'a>>,
    relations: &'a [Relation],
    diagnostics: &'a [Diagnostic],
}

#[derive(Serialize)]
struct InspectedClass<'a> {
    shape_id: &'a str,
    page: usize,
    #[serde(flatten)]
    model: &'a ClassModel,
}

/// Main CLI application
pub struct ClassforgeApp {
    orchestrator: Orchestrator,
}

impl ClassforgeApp {
    /// Create a new application instance with default settings
    pub fn new() -> Self {
        Self::with_config(GeneratorConfig::default())
    }

    /// Create a new application instance with generator options
    pub fn with_config(config: GeneratorConfig) -> Self {
        let mut orchestrator = Orchestrator::with_generator_config(config);
        orchestrator.register_default_detectors();
        Self { orchestrator }
    }

    /// Run the application with the given CLI arguments
    pub fn run(&mut self, cli: Cli) -> Result<()> {
        // Environment variables take precedence over flags
        let log_level_str = std::env::var("CLASSFORGE_LOG_LEVEL")
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .or_else(|| Some(cli.log_level.as_str().to_string()));

        let log_format_str = std::env::var("CLASSFORGE_LOG_FORMAT")
            .ok()
            .or_else(|| Some(cli.log_format.as_str().to_string()));

        if let Err(e) = init_logging(log_level_str.as_deref(), log_format_str.as_deref()) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("Classforge v{}", env!("CARGO_PKG_VERSION"));
        }

        match cli.command {
            Commands::Generate {
                input,
                output,
                package,
                stdout,
            } => self.generate_command(input, output, package, stdout, cli.verbose),
            Commands::Inspect { input, json } => self.inspect_command(input, json, cli.verbose),
            Commands::Detect { input } => self.detect_command(input, cli.verbose),
            Commands::Validate { input } => self.validate_command(input, cli.verbose),
            Commands::Targets { json } => self.targets_command(json, cli.verbose),
        }
    }

    /// Handle the generate command
    fn generate_command(
        &mut self,
        input: Option<PathBuf>,
        output: PathBuf,
        package: Option<String>,
        stdout: bool,
        verbose: bool,
    ) -> Result<()> {
        let content = self.read_input(input)?;

        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }

        if let Some(package) = package {
            *self = Self::with_config(GeneratorConfig::new().with_package(package));
        }

        if stdout {
            let sink = self.orchestrator.process_to_memory(&content)?;
            self.write_output(&render_listing(&sink))?;
            return Ok(());
        }

        // Don't leave an empty output directory behind for unreadable input
        self.orchestrator.detect_format(&content)?;
        let mut sink = DirectorySink::create(&output)?;
        let count = self.orchestrator.process_into(&content, &mut sink)?;
        info!(count, output = %output.display(), "Wrote Java sources");

        if verbose {
            eprintln!("Wrote {} file(s) to {}", count, output.display());
        }
        Ok(())
    }

    /// Handle the inspect command
    fn inspect_command(&self, input: Option<PathBuf>, json: bool, verbose: bool) -> Result<()> {
        let content = self.read_input(input)?;

        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }

        self.orchestrator.detect_format(&content)?;
        let database = self.orchestrator.parse(&content)?;

        if json {
            let report = InspectReport {
                classes: database
                    .entries()
                    .iter()
                    .map(|entry| InspectedClass {
                        shape_id: &entry.shape_id,
                        page: entry.page,
                        model: &entry.model,
                    })
                    .collect(),
                relations: database.relations(),
                diagnostics: database.diagnostics(),
            };
            self.write_output(&serde_json::to_string_pretty(&report)?)?;
        } else {
            let listing: Vec<String> = database.entries().iter().map(describe_class).collect();
            self.write_output(&listing.join("\n"))?;
            for diagnostic in database.diagnostics() {
                eprintln!("warning: {}", diagnostic);
            }
        }

        Ok(())
    }

    /// Handle the detect command
    fn detect_command(&self, input: Option<PathBuf>, verbose: bool) -> Result<()> {
        let content = self.read_input(input)?;

        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }

        match self.orchestrator.detect_format(&content) {
            Ok(format) => {
                println!("{}", format);
                Ok(())
            }
            Err(e) => {
                eprintln!("Could not detect input format: {}", e);
                Err(e)
            }
        }
    }

    /// Handle the validate command
    fn validate_command(&self, input: Option<PathBuf>, verbose: bool) -> Result<()> {
        let content = self.read_input(input)?;

        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }

        let format = match self.orchestrator.detect_format(&content) {
            Ok(format) => format,
            Err(_) => {
                println!("✗ Could not detect input format");
                return Err(anyhow!("Unknown input format"));
            }
        };

        if verbose {
            eprintln!("Detected input format: {}", format);
        }

        match self.orchestrator.parse(&content) {
            Ok(database) => {
                println!(
                    "✓ Valid {} diagram: {} class(es), {} relation(s)",
                    format,
                    database.class_count(),
                    database.relation_count()
                );
                for diagnostic in database.diagnostics() {
                    println!("  ⚠ {}", diagnostic);
                }
                debug!(
                    diagnostics = database.diagnostics().len(),
                    "Validation completed"
                );
                Ok(())
            }
            Err(e) => {
                println!("✗ Invalid {} diagram: {}", format, e);
                Err(e)
            }
        }
    }

    /// Handle the targets command
    fn targets_command(&self, json: bool, verbose: bool) -> Result<()> {
        if verbose {
            eprintln!("Listing supported output targets");
        }

        if json {
            let targets = serde_json::json!({
                "supported_targets": [
                    {
                        "name": "java",
                        "description": "Java classes and interfaces with fields, accessors and method stubs",
                        "status": "supported"
                    }
                ],
                "inputs": self.orchestrator.get_detectors(),
                "total": 1
            });
            println!("{}", serde_json::to_string_pretty(&targets)?);
        } else {
            println!("Supported output targets:");
            println!("  java  - Java classes and interfaces with fields, accessors and method stubs");
            println!();
            println!("Total: 1 output target supported");
        }

        Ok(())
    }

    /// Read input from file or stdin
    pub fn read_input(&self, input: Option<PathBuf>) -> Result<String> {
        match input {
            Some(path) if path.to_string_lossy() != "-" => fs::read_to_string(&path)
                .map_err(|e| anyhow!("Failed to read input file '{}': {}", path.display(), e)),
            _ => {
                let mut content = String::new();
                io::stdin().read_to_string(&mut content)?;
                Ok(content)
            }
        }
    }

    /// Write output to stdout, ending with a newline
    pub fn write_output(&self, content: &str) -> Result<()> {
        print!("{}", newline_terminated(content));
        io::stdout().flush()?;
        Ok(())
    }

    /// Get a reference to the orchestrator (for testing)
    #[cfg(test)]
    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }
}

impl Default for ClassforgeApp {
    fn default() -> Self {
        Self::new()
    }
}

fn newline_terminated(content: &str) -> String {
    if content.is_empty() || content.ends_with('\n') {
        content.to_string()
    } else {
        format!("{}\n", content)
    }
}

/// Every unit in the sink, each preceded by a `// File:` banner
fn render_listing(sink: &MemorySink) -> String {
    let files: Vec<String> = sink
        .units()
        .map(|(file_name, contents)| format!("// File: {}\n{}", file_name, contents))
        .collect();
    files.join("\n")
}

/// One-paragraph summary of a class for `inspect`
fn describe_class(entry: &ClassEntry) -> String {
    let model = &entry.model;
    let kind = if model.is_interface {
        "interface"
    } else if model.is_abstract {
        "abstract class"
    } else {
        "class"
    };

    let mut out = format!(
        "{} {} (page {}, shape {})\n",
        kind,
        model.name,
        entry.page + 1,
        entry.shape_id
    );
    if !model.generics.is_empty() {
        let _ = writeln!(out, "  generics: {}", model.generics.join(", "));
    }
    if !model.superclasses.is_empty() {
        let _ = writeln!(out, "  extends: {}", model.superclasses.join(", "));
    }
    if !model.interfaces.is_empty() {
        let _ = writeln!(out, "  implements: {}", model.interfaces.join(", "));
    }
    for attribute in &model.attributes {
        let _ = writeln!(
            out,
            "  {}{}: {}",
            attribute.visibility.sigil(),
            attribute.name,
            attribute.ty
        );
    }
    for method in &model.methods {
        let _ = writeln!(
            out,
            "  {}{}(): {}",
            method.visibility.sigil(),
            method.name,
            method.return_type
        );
    }
    for relation in &model.relations {
        let _ = writeln!(out, "  {} {}", relation.kind, relation.target);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::tempdir;

    const PERSON: &str = r#"<mxfile><diagram name="Model"><mxGraphModel><root>
        <mxCell id="0"/><mxCell id="1" parent="0"/>
        <mxCell id="2" value="Person" style="swimlane;" vertex="1" parent="1"/>
        <mxCell id="3" value="-name: String" style="text;" vertex="1" parent="2"/>
        <mxCell id="4" value="+greet(): void" style="text;" vertex="1" parent="2"/>
        <mxCell id="5" value="Student" style="swimlane;" vertex="1" parent="1"/>
        <mxCell id="6" style="endArrow=block;" edge="1" parent="1" source="5" target="2"/>
    </root></mxGraphModel></diagram></mxfile>"#;

    fn write_fixture(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("model.drawio");
        fs::write(&path, PERSON).unwrap();
        path
    }

    #[test]
    fn test_cli_parsing_generate_command() {
        let args = vec![
            "classforge",
            "generate",
            "--input",
            "model.drawio",
            "--output",
            "src/main/java",
            "--package",
            "com.example",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Generate {
                input,
                output,
                package,
                stdout,
            } => {
                assert_eq!(input.unwrap().to_string_lossy(), "model.drawio");
                assert_eq!(output.to_string_lossy(), "src/main/java");
                assert_eq!(package.as_deref(), Some("com.example"));
                assert!(!stdout);
            }
            _ => panic!("Expected Generate command"),
        }
    }

    #[test]
    fn test_cli_parsing_generate_defaults() {
        let cli = Cli::try_parse_from(vec!["classforge", "generate", "--stdout"]).unwrap();

        match cli.command {
            Commands::Generate {
                input,
                output,
                package,
                stdout,
            } => {
                assert!(input.is_none());
                assert_eq!(output.to_string_lossy(), "generated");
                assert!(package.is_none());
                assert!(stdout);
            }
            _ => panic!("Expected Generate command"),
        }
        assert_eq!(cli.log_level, LogLevel::Warn);
        assert_eq!(cli.log_format, LogFormat::Compact);
    }

    #[test]
    fn test_cli_parsing_inspect_command() {
        let args = vec!["classforge", "inspect", "-i", "model.drawio", "--json"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Inspect { input, json } => {
                assert_eq!(input.unwrap().to_string_lossy(), "model.drawio");
                assert!(json);
            }
            _ => panic!("Expected Inspect command"),
        }
    }

    #[test]
    fn test_cli_parsing_detect_command() {
        let cli = Cli::try_parse_from(vec!["classforge", "detect", "-i", "-"]).unwrap();

        match cli.command {
            Commands::Detect { input } => {
                assert_eq!(input.unwrap().to_string_lossy(), "-");
            }
            _ => panic!("Expected Detect command"),
        }
    }

    #[test]
    fn test_cli_parsing_validate_command() {
        let cli = Cli::try_parse_from(vec!["classforge", "validate"]).unwrap();

        match cli.command {
            Commands::Validate { input } => assert!(input.is_none()),
            _ => panic!("Expected Validate command"),
        }
    }

    #[test]
    fn test_cli_parsing_targets_command() {
        let cli = Cli::try_parse_from(vec!["classforge", "targets", "--json"]).unwrap();

        match cli.command {
            Commands::Targets { json } => assert!(json),
            _ => panic!("Expected Targets command"),
        }
    }

    #[test]
    fn test_cli_parsing_log_flags() {
        let args = vec![
            "classforge",
            "--log-level",
            "debug",
            "--log-format",
            "json",
            "targets",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.log_level.as_str(), "debug");
        assert_eq!(cli.log_format.as_str(), "json");
    }

    #[test]
    fn test_cli_rejects_unknown_command() {
        assert!(Cli::try_parse_from(vec!["classforge", "convert"]).is_err());
    }

    #[test]
    fn test_verbose_flag() {
        let cli = Cli::try_parse_from(vec!["classforge", "--verbose", "targets"]).unwrap();
        assert!(cli.verbose);

        let cli = Cli::try_parse_from(vec!["classforge", "targets", "-v"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn test_classforge_app_creation() {
        let app = ClassforgeApp::new();
        assert!(app.orchestrator().has_plugins());
        assert_eq!(app.orchestrator().get_detectors(), vec!["drawio"]);

        let _app = ClassforgeApp::default();
    }

    #[test]
    fn test_read_input_from_file() {
        let app = ClassforgeApp::new();
        let dir = tempdir().unwrap();
        let path = write_fixture(&dir);

        assert_eq!(app.read_input(Some(path)).unwrap(), PERSON);
    }

    #[test]
    fn test_read_input_missing_file() {
        let app = ClassforgeApp::new();
        let err = app
            .read_input(Some(PathBuf::from("/nonexistent/model.drawio")))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read input file"));
    }

    #[test]
    fn test_output_ends_with_newline() {
        assert_eq!(newline_terminated("Test output"), "Test output\n");
        assert_eq!(newline_terminated("done\n"), "done\n");
        assert_eq!(newline_terminated(""), "");
    }

    #[test]
    fn test_generate_command_writes_files() {
        let mut app = ClassforgeApp::new();
        let dir = tempdir().unwrap();
        let input = write_fixture(&dir);
        let output = dir.path().join("java");

        app.generate_command(Some(input), output.clone(), None, false, false)
            .unwrap();

        let person = fs::read_to_string(output.join("Person.java")).unwrap();
        assert!(person.starts_with("public class Person {"));
        let student = fs::read_to_string(output.join("Student.java")).unwrap();
        assert!(student.starts_with("public class Student extends Person {"));
    }

    #[test]
    fn test_generate_command_with_package() {
        let mut app = ClassforgeApp::new();
        let dir = tempdir().unwrap();
        let input = write_fixture(&dir);
        let output = dir.path().join("java");

        app.generate_command(
            Some(input),
            output.clone(),
            Some("com.example.school".to_string()),
            false,
            false,
        )
        .unwrap();

        let person = fs::read_to_string(output.join("Person.java")).unwrap();
        assert!(person.starts_with("package com.example.school;\n\npublic class Person {"));
    }

    #[test]
    fn test_generate_command_rejects_non_diagram() {
        let mut app = ClassforgeApp::new();
        let dir = tempdir().unwrap();
        let input = dir.path().join("notes.txt");
        fs::write(&input, "just some notes").unwrap();

        let result = app.generate_command(Some(input), dir.path().join("java"), None, false, false);
        assert!(result.is_err());
        assert!(!dir.path().join("java").exists());
    }

    #[test]
    fn test_render_listing() {
        let sink = ClassforgeApp::new()
            .orchestrator()
            .process_to_memory(PERSON)
            .unwrap();
        let listing = render_listing(&sink);

        assert!(listing.starts_with("// File: Person.java\npublic class Person {"));
        assert!(listing.contains("\n// File: Student.java\npublic class Student extends Person {"));
    }

    #[test]
    fn test_describe_class() {
        let database = ClassforgeApp::new().orchestrator().parse(PERSON).unwrap();
        let description = describe_class(&database.entries()[0]);

        assert_eq!(
            description,
            "class Person (page 1, shape 2)\n  -name: String\n  +greet(): void\n"
        );
        assert!(describe_class(&database.entries()[1]).contains("  extends: Person\n"));
    }

    #[test]
    fn test_inspect_report_json() {
        let database = ClassforgeApp::new().orchestrator().parse(PERSON).unwrap();
        let report = InspectReport {
            classes: database
                .entries()
                .iter()
                .map(|entry| InspectedClass {
                    shape_id: &entry.shape_id,
                    page: entry.page,
                    model: &entry.model,
                })
                .collect(),
            relations: database.relations(),
            diagnostics: database.diagnostics(),
        };
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["classes"][0]["name"], "Person");
        assert_eq!(value["classes"][0]["shape_id"], "2");
        assert_eq!(value["classes"][0]["attributes"][0]["type"], "String");
        assert_eq!(value["classes"][1]["superclasses"][0], "Person");
        assert_eq!(value["relations"][0]["kind"], "inheritance");
        assert!(value["diagnostics"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_inspect_command_from_file() {
        let app = ClassforgeApp::new();
        let dir = tempdir().unwrap();
        let input = write_fixture(&dir);

        assert!(app.inspect_command(Some(input.clone()), true, false).is_ok());
        assert!(app.inspect_command(Some(input), false, false).is_ok());
    }

    #[test]
    fn test_validate_command() {
        let app = ClassforgeApp::new();
        let dir = tempdir().unwrap();
        let input = write_fixture(&dir);
        assert!(app.validate_command(Some(input), false).is_ok());

        let broken = dir.path().join("broken.drawio");
        fs::write(&broken, "<mxfile><diagram><mxGraphModel><root></diagram></mxfile>").unwrap();
        assert!(app.validate_command(Some(broken), false).is_err());
    }

    #[test]
    fn test_detect_command() {
        let app = ClassforgeApp::new();
        assert_eq!(app.orchestrator().detect_format(PERSON).unwrap(), "drawio");
        assert!(app.orchestrator().detect_format("This is not a diagram").is_err());

        let dir = tempdir().unwrap();
        let input = write_fixture(&dir);
        assert!(app.detect_command(Some(input), false).is_ok());
    }

    #[test]
    fn test_targets_command() {
        let app = ClassforgeApp::new();
        assert!(app.targets_command(true, false).is_ok());
        assert!(app.targets_command(false, false).is_ok());
    }
}
