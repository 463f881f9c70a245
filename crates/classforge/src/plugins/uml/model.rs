//! UML class model
//!
//! Plain data recovered from a diagram: classes, their members and the
//! relations between them. Everything here is built during parsing and only
//! read afterwards.

use std::fmt;

use serde::Serialize;

/// Return type used when a method label declares none
pub const VOID: &str = "void";

/// Visibility modifier for class members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,    // +
    Private,   // -
    Protected, // #
}

impl Visibility {
    pub fn from_sigil(c: char) -> Option<Self> {
        match c {
            '+' => Some(Visibility::Public),
            '-' => Some(Visibility::Private),
            '#' => Some(Visibility::Protected),
            _ => None,
        }
    }

    pub fn sigil(self) -> char {
        match self {
            Visibility::Public => '+',
            Visibility::Private => '-',
            Visibility::Protected => '#',
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
            Visibility::Protected => "protected",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Cardinality of an attribute, parameter or relation end
///
/// `max == None` means unbounded (`*`). A bounded `max` is never below `min`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Multiplicity {
    pub min: u32,
    pub max: Option<u32>,
    pub is_optional: bool,
}

impl Multiplicity {
    /// Exactly one
    pub const ONE: Multiplicity = Multiplicity {
        min: 1,
        max: Some(1),
        is_optional: false,
    };

    /// Zero or more
    pub const MANY: Multiplicity = Multiplicity {
        min: 0,
        max: None,
        is_optional: true,
    };

    /// Build a multiplicity, rejecting `max < min`
    pub fn new(min: u32, max: Option<u32>) -> Option<Self> {
        if matches!(max, Some(max) if max < min) {
            return None;
        }
        Some(Self {
            min,
            max,
            is_optional: min == 0,
        })
    }

    /// Exactly `n`
    pub fn exactly(n: u32) -> Self {
        Self {
            min: n,
            max: Some(n),
            is_optional: n == 0,
        }
    }

    pub fn is_single(&self) -> bool {
        self.max == Some(1)
    }

    /// Anything whose upper bound is not exactly one
    pub fn is_collection(&self) -> bool {
        !self.is_single()
    }

    pub fn is_unbounded(&self) -> bool {
        self.max.is_none()
    }
}

impl Default for Multiplicity {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "{}", max),
            Some(max) => write!(f, "{}..{}", self.min, max),
            None => write!(f, "{}..*", self.min),
        }
    }
}

/// A field of a class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_final: bool,
    pub is_derived: bool,
    pub multiplicity: Multiplicity,
}

impl Attribute {
    /// A private, single-valued attribute
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            visibility: Visibility::Private,
            is_static: false,
            is_final: false,
            is_derived: false,
            multiplicity: Multiplicity::ONE,
        }
    }

    pub fn with_visibility(mut self, v: Visibility) -> Self {
        self.visibility = v;
        self
    }

    pub fn with_multiplicity(mut self, m: Multiplicity) -> Self {
        self.multiplicity = m;
        self
    }

    pub fn derived(mut self) -> Self {
        self.is_derived = true;
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn with_final(mut self, is_final: bool) -> Self {
        self.is_final = is_final;
        self
    }
}

/// A method parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub multiplicity: Multiplicity,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            multiplicity: Multiplicity::ONE,
        }
    }

    pub fn with_multiplicity(mut self, m: Multiplicity) -> Self {
        self.multiplicity = m;
        self
    }
}

/// An operation of a class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Method {
    pub name: String,
    pub return_type: String,
    pub parameters: Vec<Parameter>,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_final: bool,
    pub throws: Vec<String>,
}

impl Method {
    /// A public method returning `void`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            return_type: VOID.to_string(),
            parameters: Vec::new(),
            visibility: Visibility::Public,
            is_static: false,
            is_abstract: false,
            is_final: false,
            throws: Vec::new(),
        }
    }

    pub fn with_visibility(mut self, v: Visibility) -> Self {
        self.visibility = v;
        self
    }

    pub fn with_return_type(mut self, ty: impl Into<String>) -> Self {
        self.return_type = ty.into();
        self
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn with_final(mut self, is_final: bool) -> Self {
        self.is_final = is_final;
        self
    }

    /// Add an exception type; duplicates are ignored
    pub fn add_throws(&mut self, exception: impl Into<String>) {
        let exception = exception.into();
        if !self.throws.contains(&exception) {
            self.throws.push(exception);
        }
    }

    pub fn returns_void(&self) -> bool {
        self.return_type == VOID
    }
}

/// Relationship type between classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    Inheritance,
    Realization,
    Composition,
    Aggregation,
    Association,
}

impl RelationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RelationKind::Inheritance => "inheritance",
            RelationKind::Realization => "realization",
            RelationKind::Composition => "composition",
            RelationKind::Aggregation => "aggregation",
            RelationKind::Association => "association",
        }
    }

    /// Kinds that become part of the class declaration instead of a relation
    pub fn is_generalization(self) -> bool {
        matches!(self, RelationKind::Inheritance | RelationKind::Realization)
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An edge between two shapes, still keyed by diagram identifiers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relation {
    pub source_id: String,
    pub target_id: String,
    pub kind: RelationKind,
    pub source_multiplicity: Multiplicity,
    pub target_multiplicity: Multiplicity,
    pub source_role: Option<String>,
    pub target_role: Option<String>,
    pub is_navigable: bool,
}

impl Relation {
    pub fn new(
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        kind: RelationKind,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            kind,
            source_multiplicity: Multiplicity::ONE,
            target_multiplicity: Multiplicity::ONE,
            source_role: None,
            target_role: None,
            is_navigable: true,
        }
    }

    /// Turn into a back-reference to the target class by name
    pub fn into_class_relation(self, target: impl Into<String>) -> ClassRelation {
        ClassRelation {
            kind: self.kind,
            target: target.into(),
            source_multiplicity: self.source_multiplicity,
            target_multiplicity: self.target_multiplicity,
            source_role: self.source_role,
            target_role: self.target_role,
            is_navigable: self.is_navigable,
        }
    }
}

/// A resolved relation stored on its source class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassRelation {
    pub kind: RelationKind,
    /// Name of the target class
    pub target: String,
    pub source_multiplicity: Multiplicity,
    pub target_multiplicity: Multiplicity,
    pub source_role: Option<String>,
    pub target_role: Option<String>,
    pub is_navigable: bool,
}

impl ClassRelation {
    pub fn new(kind: RelationKind, target: impl Into<String>) -> Self {
        Relation::new("", "", kind).into_class_relation(target)
    }

    pub fn with_target_role(mut self, role: impl Into<String>) -> Self {
        self.target_role = Some(role.into());
        self
    }

    pub fn with_target_multiplicity(mut self, m: Multiplicity) -> Self {
        self.target_multiplicity = m;
        self
    }
}

/// A class or interface in the diagram
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ClassModel {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub methods: Vec<Method>,
    pub superclasses: Vec<String>,
    pub interfaces: Vec<String>,
    pub relations: Vec<ClassRelation>,
    pub is_abstract: bool,
    pub is_interface: bool,
    pub generics: Vec<String>,
    pub stereotypes: Vec<String>,
}

impl ClassModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_generics<I, S>(mut self, generics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.generics = generics.into_iter().map(Into::into).collect();
        self
    }

    pub fn add_attribute(&mut self, attribute: Attribute) {
        self.attributes.push(attribute);
    }

    pub fn add_method(&mut self, method: Method) {
        self.methods.push(method);
    }

    pub fn add_superclass(&mut self, name: impl Into<String>) {
        push_unique(&mut self.superclasses, name.into());
    }

    pub fn add_interface(&mut self, name: impl Into<String>) {
        push_unique(&mut self.interfaces, name.into());
    }

    /// Record a stereotype, updating the interface/abstract flags it implies
    pub fn add_stereotype(&mut self, stereotype: impl Into<String>) {
        let stereotype = stereotype.into();
        if stereotype.eq_ignore_ascii_case("interface") {
            self.is_interface = true;
        } else if stereotype.eq_ignore_ascii_case("abstract") {
            self.is_abstract = true;
        }
        push_unique(&mut self.stereotypes, stereotype);
    }

    pub fn has_stereotype(&self, stereotype: &str) -> bool {
        self.stereotypes
            .iter()
            .any(|s| s.eq_ignore_ascii_case(stereotype))
    }

    /// Attach a resolved relation.
    ///
    /// Inheritance goes to `superclasses` and realization to `interfaces`;
    /// only the remaining kinds are kept in `relations`.
    pub fn fold_relation(&mut self, relation: ClassRelation) {
        match relation.kind {
            RelationKind::Inheritance => self.add_superclass(relation.target),
            RelationKind::Realization => self.add_interface(relation.target),
            _ => self.relations.push(relation),
        }
    }
}

fn push_unique(set: &mut Vec<String>, value: String) {
    if !set.contains(&value) {
        set.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplicity_bounds() {
        assert_eq!(Multiplicity::new(2, Some(5)).unwrap().to_string(), "2..5");
        assert!(Multiplicity::new(5, Some(2)).is_none());
        assert_eq!(Multiplicity::new(0, None), Some(Multiplicity::MANY));
        assert_eq!(Multiplicity::default(), Multiplicity::ONE);
        assert_eq!(Multiplicity::exactly(3).to_string(), "3");
        assert_eq!(Multiplicity::MANY.to_string(), "0..*");
    }

    #[test]
    fn test_multiplicity_collection() {
        assert!(!Multiplicity::ONE.is_collection());
        assert!(Multiplicity::MANY.is_collection());
        assert!(Multiplicity::new(0, Some(1)).unwrap().is_single());
        assert!(Multiplicity::new(0, Some(1)).unwrap().is_optional);
        assert!(Multiplicity::exactly(2).is_collection());
    }

    #[test]
    fn test_visibility_conversion() {
        assert_eq!(Visibility::from_sigil('+'), Some(Visibility::Public));
        assert_eq!(Visibility::from_sigil('-'), Some(Visibility::Private));
        assert_eq!(Visibility::from_sigil('#'), Some(Visibility::Protected));
        assert_eq!(Visibility::from_sigil('~'), None);
        assert_eq!(Visibility::Protected.sigil(), '#');
        assert_eq!(Visibility::Public.to_string(), "public");
    }

    #[test]
    fn test_member_defaults() {
        let attr = Attribute::new("name", "String");
        assert_eq!(attr.visibility, Visibility::Private);
        assert_eq!(attr.multiplicity, Multiplicity::ONE);

        let method = Method::new("greet");
        assert_eq!(method.visibility, Visibility::Public);
        assert!(method.returns_void());
    }

    #[test]
    fn test_throws_is_a_set() {
        let mut method = Method::new("read");
        method.add_throws("IOException");
        method.add_throws("IOException");
        method.add_throws("TimeoutException");
        assert_eq!(method.throws, vec!["IOException", "TimeoutException"]);
    }

    #[test]
    fn test_fold_relation_lifts_generalizations() {
        let mut dog = ClassModel::new("Dog");
        dog.fold_relation(ClassRelation::new(RelationKind::Inheritance, "Animal"));
        dog.fold_relation(ClassRelation::new(RelationKind::Inheritance, "Animal"));
        dog.fold_relation(ClassRelation::new(RelationKind::Realization, "Pet"));
        dog.fold_relation(ClassRelation::new(RelationKind::Association, "Owner"));

        assert_eq!(dog.superclasses, vec!["Animal"]);
        assert_eq!(dog.interfaces, vec!["Pet"]);
        assert_eq!(dog.relations.len(), 1);
        assert!(dog.relations.iter().all(|r| !r.kind.is_generalization()));
    }

    #[test]
    fn test_stereotypes_set_flags() {
        let mut shape = ClassModel::new("Shape");
        shape.add_stereotype("Interface");
        shape.add_stereotype("interface");
        assert!(shape.is_interface);
        assert_eq!(shape.stereotypes.len(), 2);
        assert!(shape.has_stereotype("INTERFACE"));

        let mut base = ClassModel::new("Base");
        base.add_stereotype("abstract");
        assert!(base.is_abstract);
        assert!(!base.is_interface);
    }
}
