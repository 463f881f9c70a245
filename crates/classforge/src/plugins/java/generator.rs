//! Java source generator
//!
//! Renders each [`ClassModel`] as one Java compilation unit. Output order
//! inside a class is fixed: declaration, fields, constructor, accessor pairs,
//! methods, relation comments. Blocks are separated by one blank line.
//!
//! The generator renders what the model says without checking it, so an
//! interface with fields still gets fields.

use std::fmt::Write as _;

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info, span, trace, Level};

use super::syntax::{boxed, capitalize, default_value, type_parameter};
use crate::core::{Database, DiagramError, OutputSink, Renderer};
use crate::plugins::uml::{Attribute, ClassDatabase, ClassModel, ClassRelation, Method, Multiplicity};

const INDENT: &str = "    ";

/// Options applied to every generated unit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Emits `package <name>;` when set
    pub package: Option<String>,
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }
}

/// One generated source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceUnit {
    pub class_name: String,
    /// `<ClassName>.java`
    pub file_name: String,
    pub contents: String,
}

/// Java skeleton generator
#[derive(Debug, Clone, Default)]
pub struct JavaGenerator {
    config: GeneratorConfig,
}

impl JavaGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Render every class and hand it to `sink`, returning the number written.
    ///
    /// Classes sharing a name produce the same file name; the sink decides
    /// what a repeated name means.
    pub fn generate(&self, classes: &[ClassModel], sink: &mut dyn OutputSink) -> Result<usize> {
        let generate_span = span!(Level::INFO, "generate_java", class_count = classes.len());
        let _enter = generate_span.enter();

        for class in classes {
            let unit = self.render_unit(class)?;
            sink.write_unit(&unit.file_name, &unit.contents)?;
        }

        info!(units = classes.len(), "Generated Java sources");
        Ok(classes.len())
    }

    /// Render one class into a source unit
    pub fn render_unit(&self, class: &ClassModel) -> Result<SourceUnit> {
        if class.name.trim().is_empty() {
            return Err(DiagramError::render_error("class has no name".to_string()).into());
        }
        if class.name.contains(['/', '\\']) || class.name.starts_with('.') {
            return Err(DiagramError::render_error(format!(
                "class name '{}' cannot be used as a file name",
                class.name
            ))
            .into());
        }
        let contents = self.render_class(class);
        trace!(class = %class.name, bytes = contents.len(), "Rendered class");
        Ok(SourceUnit {
            class_name: class.name.clone(),
            file_name: format!("{}.java", class.name),
            contents,
        })
    }

    /// Full source text of one class, ending with a newline
    pub fn render_class(&self, class: &ClassModel) -> String {
        let mut preamble = Vec::new();
        if let Some(package) = self.config.package.as_deref() {
            preamble.push(format!("package {};", package));
        }
        if class.methods.iter().any(has_collection_parameter) {
            preamble.push("import java.util.List;".to_string());
        }

        let mut blocks = Vec::new();
        let fields: Vec<String> = class.attributes.iter().map(render_field).collect();
        if !fields.is_empty() {
            blocks.push(fields.join("\n"));
        }
        blocks.push(format!("{INDENT}public {}() {{\n{INDENT}}}", class.name));
        for attribute in &class.attributes {
            blocks.push(render_getter(attribute));
            // A final field is assigned once, at its declaration
            if !attribute.is_final {
                blocks.push(render_setter(attribute));
            }
        }
        blocks.extend(class.methods.iter().map(render_method));
        if !class.relations.is_empty() {
            let comments: Vec<String> = class.relations.iter().map(render_relation).collect();
            blocks.push(comments.join("\n"));
        }

        let mut out = String::new();
        for line in &preamble {
            let _ = writeln!(out, "{}\n", line);
        }
        let _ = writeln!(out, "{} {{", render_declaration(class));
        out.push_str(&blocks.join("\n\n"));
        out.push_str("\n}\n");
        out
    }
}

impl Renderer<ClassDatabase> for JavaGenerator {
    type Output = Vec<SourceUnit>;

    fn render(&self, database: &ClassDatabase) -> Result<Self::Output> {
        let render_span = span!(Level::INFO, "render_java", class_count = database.node_count());
        let _enter = render_span.enter();

        let units = database
            .nodes()
            .map(|class| self.render_unit(class))
            .collect::<Result<Vec<_>>>()?;

        debug!(units = units.len(), "Rendered source units");
        Ok(units)
    }

    fn name(&self) -> &'static str {
        "java"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn format(&self) -> &'static str {
        "java"
    }
}

fn render_declaration(class: &ClassModel) -> String {
    let mut parts = vec!["public"];
    if class.is_abstract {
        parts.push("abstract");
    }
    parts.push(if class.is_interface { "interface" } else { "class" });

    let mut declaration = parts.join(" ");
    let _ = write!(declaration, " {}", class.name);
    if !class.generics.is_empty() {
        let _ = write!(declaration, "<{}>", class.generics.join(", "));
    }
    if !class.is_interface && !class.superclasses.is_empty() {
        let _ = write!(declaration, " extends {}", class.superclasses.join(", "));
    }
    if !class.interfaces.is_empty() {
        let _ = write!(declaration, " implements {}", class.interfaces.join(", "));
    }
    declaration
}

fn render_field(attribute: &Attribute) -> String {
    let mut field = format!("{INDENT}private ");
    if attribute.is_static {
        field.push_str("static ");
    }
    if attribute.is_final {
        field.push_str("final ");
    }
    let _ = write!(field, "{} {}", attribute.ty, attribute.name);
    if attribute.is_final {
        let _ = write!(field, " = {}", default_value(&attribute.ty).unwrap_or("null"));
    }
    field.push(';');
    field
}

fn render_getter(attribute: &Attribute) -> String {
    format!(
        "{INDENT}public {ty} get{cap}() {{\n{INDENT}{INDENT}return {name};\n{INDENT}}}",
        ty = attribute.ty,
        cap = capitalize(&attribute.name),
        name = attribute.name,
    )
}

fn render_setter(attribute: &Attribute) -> String {
    format!(
        "{INDENT}public void set{cap}({ty} {name}) {{\n{INDENT}{INDENT}this.{name} = {name};\n{INDENT}}}",
        ty = attribute.ty,
        cap = capitalize(&attribute.name),
        name = attribute.name,
    )
}

fn has_collection_parameter(method: &Method) -> bool {
    method.parameters.iter().any(|p| p.multiplicity.is_collection())
}

fn render_method(method: &Method) -> String {
    let mut signature = format!("{INDENT}{}", method.visibility.keyword());
    if method.is_static {
        signature.push_str(" static");
    }
    if method.is_final {
        signature.push_str(" final");
    }
    if method.is_abstract {
        signature.push_str(" abstract");
    }

    // One type parameter per collection-valued parameter
    let type_parameters: Vec<String> = method
        .parameters
        .iter()
        .filter(|p| p.multiplicity.is_collection())
        .map(|p| format!("{} extends {}", type_parameter(&p.name), boxed(&p.ty)))
        .collect();
    if !type_parameters.is_empty() {
        let _ = write!(signature, " <{}>", type_parameters.join(", "));
    }

    let parameters: Vec<String> = method
        .parameters
        .iter()
        .map(|p| {
            if p.multiplicity.is_collection() {
                format!("List<{}> {}", type_parameter(&p.name), p.name)
            } else {
                format!("{} {}", p.ty, p.name)
            }
        })
        .collect();
    let _ = write!(
        signature,
        " {} {}({})",
        method.return_type,
        method.name,
        parameters.join(", ")
    );
    if !method.throws.is_empty() {
        let _ = write!(signature, " throws {}", method.throws.join(", "));
    }

    if method.is_abstract {
        signature.push(';');
        return signature;
    }

    match default_value(&method.return_type) {
        Some(value) => {
            format!("{signature} {{\n{INDENT}{INDENT}return {value};\n{INDENT}}}")
        }
        None => format!("{signature} {{\n{INDENT}}}"),
    }
}

fn render_relation(relation: &ClassRelation) -> String {
    let mut comment = format!(
        "{INDENT}// Relation: {} with {}",
        relation.kind, relation.target
    );

    let mut details = Vec::new();
    if let Some(role) = relation.target_role.as_deref() {
        details.push(role.to_string());
    }
    if relation.target_multiplicity != Multiplicity::ONE {
        details.push(relation.target_multiplicity.to_string());
    }
    if !details.is_empty() {
        let _ = write!(comment, " ({})", details.join(", "));
    }
    comment
}
