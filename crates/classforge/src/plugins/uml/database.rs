//! Class diagram database
//!
//! Stores discovered classes keyed by the shape that declared them, the raw
//! relations between those shapes, and any diagnostics raised on the way.

use anyhow::Result;

use super::diagnostic::Diagnostic;
use super::model::{ClassModel, Relation};
use crate::core::Database;

/// A class together with the shape it came from
#[derive(Debug, Clone, PartialEq)]
pub struct ClassEntry {
    pub shape_id: String,
    /// Zero-based page the shape lives on
    pub page: usize,
    pub model: ClassModel,
}

/// Class diagram database
#[derive(Debug, Clone)]
pub struct ClassDatabase {
    entries: Vec<ClassEntry>,
    relations: Vec<Relation>,
    diagnostics: Vec<Diagnostic>,
}

impl ClassDatabase {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            relations: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Add a class discovered on `page`, returning its position
    pub fn add_class(&mut self, shape_id: &str, page: usize, model: ClassModel) -> usize {
        self.entries.push(ClassEntry {
            shape_id: shape_id.to_string(),
            page,
            model,
        });
        self.entries.len() - 1
    }

    /// Position of the class declared by `shape_id` on `page`
    pub fn class_index(&self, page: usize, shape_id: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.page == page && e.shape_id == shape_id)
    }

    pub fn class_at(&self, index: usize) -> Option<&ClassModel> {
        self.entries.get(index).map(|e| &e.model)
    }

    pub fn class_at_mut(&mut self, index: usize) -> Option<&mut ClassModel> {
        self.entries.get_mut(index).map(|e| &mut e.model)
    }

    /// First class with the given name
    pub fn get_class(&self, name: &str) -> Option<&ClassModel> {
        self.classes().find(|c| c.name == name)
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassModel> {
        self.entries.iter().map(|e| &e.model)
    }

    pub fn entries(&self) -> &[ClassEntry] {
        &self.entries
    }

    pub fn add_relation(&mut self, relation: Relation) {
        self.relations.push(relation);
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn class_count(&self) -> usize {
        self.entries.len()
    }

    pub fn relation_count(&self) -> usize {
        self.relations.len()
    }

    /// Consume the database, keeping only the class models in order
    pub fn into_classes(self) -> Vec<ClassModel> {
        self.entries.into_iter().map(|e| e.model).collect()
    }
}

impl Default for ClassDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl Database for ClassDatabase {
    type Node = ClassModel;
    type Edge = Relation;

    /// Nodes added without a shape are keyed by their class name
    fn add_node(&mut self, node: Self::Node) -> Result<()> {
        let id = node.name.clone();
        self.add_class(&id, 0, node);
        Ok(())
    }

    fn add_edge(&mut self, edge: Self::Edge) -> Result<()> {
        self.add_relation(edge);
        Ok(())
    }

    fn get_node(&self, id: &str) -> Option<&Self::Node> {
        self.entries
            .iter()
            .find(|e| e.shape_id == id)
            .map(|e| &e.model)
    }

    fn nodes(&self) -> impl Iterator<Item = &Self::Node> {
        self.classes()
    }

    fn edges(&self) -> impl Iterator<Item = &Self::Edge> {
        self.relations.iter()
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.relations.clear();
        self.diagnostics.clear();
    }

    fn node_count(&self) -> usize {
        self.entries.len()
    }

    fn edge_count(&self) -> usize {
        self.relations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::uml::{DiagnosticKind, RelationKind};

    #[test]
    fn test_add_class_and_lookup() {
        let mut db = ClassDatabase::new();
        let animal = db.add_class("2", 0, ClassModel::new("Animal"));
        let dog = db.add_class("5", 0, ClassModel::new("Dog"));

        assert_eq!(db.class_count(), 2);
        assert_eq!(db.class_index(0, "5"), Some(dog));
        assert_eq!(db.class_at(animal).unwrap().name, "Animal");
        assert!(db.get_class("Dog").is_some());
        assert!(db.get_class("Cat").is_none());
    }

    #[test]
    fn test_ids_are_scoped_per_page() {
        let mut db = ClassDatabase::new();
        db.add_class("2", 0, ClassModel::new("Order"));
        let second = db.add_class("2", 1, ClassModel::new("Invoice"));

        assert_eq!(db.class_index(1, "2"), Some(second));
        assert_eq!(db.class_index(2, "2"), None);
    }

    #[test]
    fn test_duplicate_names_are_kept() {
        let mut db = ClassDatabase::new();
        db.add_class("a", 0, ClassModel::new("Node"));
        db.add_class("b", 0, ClassModel::new("Node"));
        assert_eq!(db.into_classes().len(), 2);
    }

    #[test]
    fn test_database_trait_nodes() {
        let mut db = ClassDatabase::new();
        db.add_node(ClassModel::new("Person")).unwrap();
        db.add_edge(Relation::new("Person", "Person", RelationKind::Association))
            .unwrap();

        let nodes: Vec<_> = db.nodes().collect();
        assert_eq!(nodes.len(), 1);
        assert_eq!(db.get_node("Person").unwrap().name, "Person");
        assert_eq!(db.edge_count(), 1);
    }

    #[test]
    fn test_clear_drops_diagnostics() {
        let mut db = ClassDatabase::new();
        db.add_class("1", 0, ClassModel::new("A"));
        db.add_diagnostic(Diagnostic::new("9", DiagnosticKind::OrphanMember, "x: int"));
        db.clear();

        assert_eq!(db.node_count(), 0);
        assert!(db.diagnostics().is_empty());
    }
}
