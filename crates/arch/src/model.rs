//! Structural model of an analyzed program
//!
//! Plain data built by the collector and read by the renderers. Nothing here
//! knows about either output format.

use serde::Serialize;

/// Namespace-like grouping of declarations: a source file or a namespace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Module {
    pub name: String,
    pub modules: Vec<Module>,
    pub classes: Vec<Class>,
    pub interfaces: Vec<Interface>,
    pub enums: Vec<Enum>,
    /// Raw references to other modules, duplicates allowed
    pub dependencies: Vec<Dependency>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Classes, then interfaces, then enums
    pub fn declarations(&self) -> impl Iterator<Item = &dyn TypeDeclaration> {
        self.classes
            .iter()
            .map(|c| c as &dyn TypeDeclaration)
            .chain(self.interfaces.iter().map(|i| i as &dyn TypeDeclaration))
            .chain(self.enums.iter().map(|e| e as &dyn TypeDeclaration))
    }

    pub fn has_declarations(&self) -> bool {
        !self.classes.is_empty() || !self.interfaces.is_empty() || !self.enums.is_empty()
    }

    /// True when this module or any nested module declares a type
    pub fn has_declarations_in_tree(&self) -> bool {
        self.has_declarations() || self.modules.iter().any(Module::has_declarations_in_tree)
    }

    pub fn find_module(&self, name: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.name == name)
    }

    /// Get or create the nested module with the given name
    pub(crate) fn child_mut(&mut self, name: &str) -> &mut Module {
        let index = match self.modules.iter().position(|m| m.name == name) {
            Some(index) => index,
            None => {
                self.modules.push(Module::new(name));
                self.modules.len() - 1
            }
        };
        &mut self.modules[index]
    }

    /// Depth-first walk over this module and its descendants, parents first
    pub fn walk(&self) -> Vec<&Module> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(module) = stack.pop() {
            out.push(module);
            stack.extend(module.modules.iter().rev());
        }
        out
    }
}

/// Declaration kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Class,
    AbstractClass,
    Interface,
    Enum,
}

/// Capability shared by classes, interfaces and enums
pub trait TypeDeclaration {
    fn name(&self) -> &str;
    fn members(&self) -> &[Member];
    fn kind(&self) -> DeclarationKind;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Class {
    pub name: String,
    pub type_parameters: Vec<String>,
    pub is_abstract: bool,
    pub extends: Option<TypeRef>,
    pub implements: Vec<TypeRef>,
    pub members: Vec<Member>,
}

impl TypeDeclaration for Class {
    fn name(&self) -> &str {
        &self.name
    }

    fn members(&self) -> &[Member] {
        &self.members
    }

    fn kind(&self) -> DeclarationKind {
        if self.is_abstract {
            DeclarationKind::AbstractClass
        } else {
            DeclarationKind::Class
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Interface {
    pub name: String,
    pub type_parameters: Vec<String>,
    pub extends: Vec<TypeRef>,
    pub members: Vec<Member>,
}

impl TypeDeclaration for Interface {
    fn name(&self) -> &str {
        &self.name
    }

    fn members(&self) -> &[Member] {
        &self.members
    }

    fn kind(&self) -> DeclarationKind {
        DeclarationKind::Interface
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Enum {
    pub name: String,
    pub members: Vec<Member>,
}

impl TypeDeclaration for Enum {
    fn name(&self) -> &str {
        &self.name
    }

    fn members(&self) -> &[Member] {
        &self.members
    }

    fn kind(&self) -> DeclarationKind {
        DeclarationKind::Enum
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MemberKind {
    #[default]
    Property,
    Method,
    EnumValue,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

impl Visibility {
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "private" => Visibility::Private,
            "protected" => Visibility::Protected,
            _ => Visibility::Public,
        }
    }

    /// UML marker: `+`, `#` or `-`
    pub fn marker(self) -> char {
        match self {
            Visibility::Public => '+',
            Visibility::Protected => '#',
            Visibility::Private => '-',
        }
    }
}

/// Method or property of a type declaration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Member {
    pub name: String,
    pub kind: MemberKind,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_readonly: bool,
    pub is_optional: bool,
    pub parameters: Vec<Parameter>,
    /// Property type or method return type
    pub type_annotation: Option<String>,
}

impl Member {
    pub fn property(name: impl Into<String>, type_annotation: Option<&str>) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Property,
            type_annotation: type_annotation.map(str::to_string),
            ..Default::default()
        }
    }

    pub fn method(name: impl Into<String>, return_type: Option<&str>) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Method,
            type_annotation: return_type.map(str::to_string),
            ..Default::default()
        }
    }

    pub fn is_method(&self) -> bool {
        self.kind == MemberKind::Method
    }

    /// `name?: T`, `name(a: A, b?: B): R`, or the bare value name for enum values.
    /// Types are left out when `with_types` is false.
    pub fn signature(&self, with_types: bool) -> String {
        let mut out = self.name.clone();
        match self.kind {
            MemberKind::EnumValue => return out,
            MemberKind::Property => {
                if self.is_optional {
                    out.push('?');
                }
            }
            MemberKind::Method => {
                let params: Vec<String> = self
                    .parameters
                    .iter()
                    .map(|p| match (&p.type_annotation, with_types) {
                        (Some(ty), true) => format!("{}: {}", p.name, ty),
                        _ => p.name.clone(),
                    })
                    .collect();
                out.push('(');
                out.push_str(&params.join(", "));
                out.push(')');
            }
        }
        if let (Some(ty), true) = (&self.type_annotation, with_types) {
            out.push_str(": ");
            out.push_str(ty);
        }
        out
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub type_annotation: Option<String>,
}

/// Reference to a named type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub name: String,
    /// Owning module, `None` when the reference could not be resolved
    pub module: Option<String>,
}

impl TypeRef {
    pub fn new(name: impl Into<String>, module: Option<&str>) -> Self {
        Self {
            name: name.into(),
            module: module.map(str::to_string),
        }
    }
}

/// How a dependency was introduced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyKind {
    /// Import statement or re-export
    Import,
    /// Base class, implemented or extended interface
    Heritage,
    /// Property, parameter, return or type-argument type
    Reference,
}

/// Name-based pointer to another module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Target module
    pub name: String,
    /// Type in the target module, when known
    pub target: Option<String>,
    /// Declaring type in this module, when the reference comes from one
    pub origin: Option<String>,
    pub kind: DependencyKind,
}

impl Dependency {
    pub fn new(name: impl Into<String>, kind: DependencyKind) -> Self {
        Self {
            name: name.into(),
            target: None,
            origin: None,
            kind,
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }
}

/// Result row of the dependency query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputModule {
    pub name: String,
    pub dependencies: Vec<String>,
}
