//! UML class model plugin
//!
//! The intermediate representation shared by the diagram parser and the code
//! generator.

mod database;
mod diagnostic;
mod model;

pub use database::{ClassDatabase, ClassEntry};
pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use model::{
    Attribute, ClassModel, ClassRelation, Method, Multiplicity, Parameter, Relation,
    RelationKind, Visibility, VOID,
};
