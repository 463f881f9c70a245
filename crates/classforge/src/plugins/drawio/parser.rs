//! draw.io class diagram parser
//!
//! Recovers classes from a draw.io document in three passes per page:
//!
//! 1. swimlane vertices become classes
//! 2. labelled child vertices become attributes and methods of their parent
//! 3. edges between two classes become relations
//!
//! Pages are independent: a shape id only resolves against its own page.
//! Nothing in a single shape can fail the parse; unusable shapes are skipped
//! or defaulted and recorded as diagnostics on the database.

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use tracing::{debug, info, span, trace, Level};

use super::document::{read_document, Document, Page, Shape};
use super::labels::{class_header, decode_member, end_labels, plain_text, DecodedMember, EndLabel};
use super::style::Style;
use super::DrawioDetector;
use crate::core::{Database, Detector, Parser};
use crate::plugins::uml::{
    ClassDatabase, ClassModel, Diagnostic, DiagnosticKind, Relation, RelationKind,
};

/// Name given to class shapes with an empty title
pub const UNNAMED_CLASS: &str = "Unnamed";

/// draw.io class diagram parser
pub struct DrawioParser;

impl DrawioParser {
    pub fn new() -> Self {
        Self
    }

    /// Add every page of an already-read document to the database
    pub fn parse_document(&self, document: &Document, database: &mut ClassDatabase) {
        for (index, page) in document.pages.iter().enumerate() {
            let page_span = span!(
                Level::DEBUG,
                "parse_page",
                page = index,
                shapes = page.shapes.len()
            );
            let _enter = page_span.enter();
            PageParser::new(index, page).run(database);
        }
    }
}

impl Default for DrawioParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser<ClassDatabase> for DrawioParser {
    fn parse(&self, input: &str, database: &mut ClassDatabase) -> Result<()> {
        let parse_span = span!(Level::INFO, "parse_drawio", input_len = input.len());
        let _enter = parse_span.enter();

        let document = read_document(input)?;
        debug!(
            pages = document.pages.len(),
            shapes = document.shape_count(),
            "Read document"
        );

        let diagnostics_before = database.diagnostics().len();
        self.parse_document(&document, database);

        info!(
            classes = database.node_count(),
            relations = database.edge_count(),
            diagnostics = database.diagnostics().len() - diagnostics_before,
            "Parsed class diagram"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "drawio"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn can_parse(&self, input: &str) -> bool {
        DrawioDetector::new().detect(input)
    }
}

/// Parsing state for a single page
struct PageParser<'a> {
    index: usize,
    page: &'a Page,
    /// shape id -> position in the database, for classes of this page
    classes: HashMap<&'a str, usize>,
    edges: HashSet<&'a str>,
}

impl<'a> PageParser<'a> {
    fn new(index: usize, page: &'a Page) -> Self {
        Self {
            index,
            page,
            classes: HashMap::new(),
            edges: page
                .shapes
                .iter()
                .filter(|s| s.edge)
                .map(|s| s.id.as_str())
                .collect(),
        }
    }

    fn run(mut self, database: &mut ClassDatabase) {
        self.discover_classes(database);
        self.attach_members(database);
        self.resolve_relations(database);
    }

    fn discover_classes(&mut self, database: &mut ClassDatabase) {
        let page = self.page;
        for shape in &page.shapes {
            let style = Style::parse(&shape.style);
            if !shape.vertex || !style.is_swimlane() {
                continue;
            }

            let header = class_header(&plain_text(&shape.value, style.is_html()));
            let name = if header.name.is_empty() {
                database.add_diagnostic(Diagnostic::new(
                    &shape.id,
                    DiagnosticKind::UnnamedClass,
                    format!("class shape has no title, using '{}'", UNNAMED_CLASS),
                ));
                UNNAMED_CLASS.to_string()
            } else {
                header.name
            };

            let mut model = ClassModel::new(name).with_generics(header.generics);
            for stereotype in header.stereotypes {
                model.add_stereotype(stereotype);
            }
            if style.is_italic() {
                model.is_abstract = true;
            }

            trace!(id = %shape.id, name = %model.name, "Discovered class");
            let position = database.add_class(&shape.id, self.index, model);
            self.classes.insert(shape.id.as_str(), position);
        }
        debug!(classes = self.classes.len(), "Class discovery complete");
    }

    fn attach_members(&self, database: &mut ClassDatabase) {
        let mut members = 0usize;
        for shape in &self.page.shapes {
            let style = Style::parse(&shape.style);
            if !shape.vertex || style.is_swimlane() || style.is_edge_label() {
                continue;
            }

            let label = plain_text(&shape.value, style.is_html());
            let label = label.trim();
            if label.is_empty() {
                continue;
            }

            let Some(&position) = shape
                .parent
                .as_deref()
                .and_then(|parent| self.classes.get(parent))
            else {
                if !self.is_edge(shape.parent.as_deref()) {
                    database.add_diagnostic(Diagnostic::new(
                        &shape.id,
                        DiagnosticKind::OrphanMember,
                        label,
                    ));
                }
                continue;
            };

            for line in label.lines().map(str::trim).filter(|l| !l.is_empty()) {
                let Some(member) = decode_member(line) else {
                    database.add_diagnostic(Diagnostic::new(
                        &shape.id,
                        DiagnosticKind::UnrecognizedMember,
                        line,
                    ));
                    continue;
                };
                let Some(class) = database.class_at_mut(position) else {
                    continue;
                };
                match member {
                    DecodedMember::Attribute(attribute) => {
                        trace!(class = %class.name, attribute = %attribute.name, "Attached attribute");
                        class.add_attribute(attribute);
                    }
                    DecodedMember::Method(method) => {
                        trace!(class = %class.name, method = %method.name, "Attached method");
                        class.add_method(method);
                    }
                }
                members += 1;
            }
        }
        debug!(members, "Member attachment complete");
    }

    fn resolve_relations(&self, database: &mut ClassDatabase) {
        // Label cells sit on their edge as children
        let mut labels: HashMap<&str, Vec<&Shape>> = HashMap::new();
        for shape in &self.page.shapes {
            if let Some(parent) = shape.parent.as_deref() {
                if shape.vertex && self.is_edge(Some(parent)) {
                    labels.entry(parent).or_default().push(shape);
                }
            }
        }

        let mut resolved = 0usize;
        for shape in self.page.shapes.iter().filter(|s| s.edge) {
            let style = Style::parse(&shape.style);
            let mut relation = Relation::new(
                shape.source.clone().unwrap_or_default(),
                shape.target.clone().unwrap_or_default(),
                relation_kind(&style),
            );
            relation.is_navigable = style.get("endArrow") != Some("none");

            for label in end_labels(&plain_text(&shape.value, style.is_html())) {
                apply_end_label(&mut relation, label, false);
            }
            for cell in labels.get(shape.id.as_str()).into_iter().flatten() {
                let text = plain_text(&cell.value, Style::parse(&cell.style).is_html());
                let at_source = cell.geometry_x.is_some_and(|x| x < 0.0);
                for label in end_labels(&text) {
                    apply_end_label(&mut relation, label, at_source);
                }
            }

            let source = self.classes.get(relation.source_id.as_str()).copied();
            let target = self.classes.get(relation.target_id.as_str()).copied();
            let (Some(source), Some(target)) = (source, target) else {
                database.add_diagnostic(Diagnostic::new(
                    &shape.id,
                    DiagnosticKind::DanglingRelation,
                    format!(
                        "{} edge '{}' -> '{}' does not connect two classes",
                        relation.kind, relation.source_id, relation.target_id
                    ),
                ));
                continue;
            };

            let Some(target_name) = database.class_at(target).map(|c| c.name.clone()) else {
                continue;
            };
            if let Some(class) = database.class_at_mut(source) {
                trace!(
                    class = %class.name,
                    target = %target_name,
                    kind = %relation.kind,
                    "Resolved relation"
                );
                class.fold_relation(relation.clone().into_class_relation(target_name));
            }
            database.add_relation(relation);
            resolved += 1;
        }
        debug!(relations = resolved, "Relation resolution complete");
    }

    fn is_edge(&self, id: Option<&str>) -> bool {
        id.is_some_and(|id| self.edges.contains(id))
    }
}

/// Relation kind from the arrow style of an edge
fn relation_kind(style: &Style) -> RelationKind {
    for (arrow, fill) in [("endArrow", "endFill"), ("startArrow", "startFill")] {
        let Some(arrow) = style.get(arrow) else {
            continue;
        };
        if arrow.starts_with("diamond") {
            let filled = match style.get(fill) {
                Some(value) => value == "1",
                None => arrow == "diamond",
            };
            return if filled {
                RelationKind::Composition
            } else {
                RelationKind::Aggregation
            };
        }
    }

    match style.get("endArrow") {
        Some("block" | "blockThin" | "triangle") if style.flag("dashed") => {
            RelationKind::Realization
        }
        Some("block" | "blockThin" | "triangle") => RelationKind::Inheritance,
        _ => RelationKind::Association,
    }
}

fn apply_end_label(relation: &mut Relation, label: EndLabel, at_source: bool) {
    match (label, at_source) {
        (EndLabel::Multiplicity(m), true) => relation.source_multiplicity = m,
        (EndLabel::Multiplicity(m), false) => relation.target_multiplicity = m,
        (EndLabel::Role(role), true) => relation.source_role = Some(role),
        (EndLabel::Role(role), false) => relation.target_role = Some(role),
    }
}
