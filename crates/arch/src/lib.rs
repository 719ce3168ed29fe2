//! arch - structural model and diagrams for TypeScript programs
//!
//! Collects modules, types and inter-module dependencies from parsed source
//! units and renders them as Graphviz dependency graphs or PlantUML class
//! diagrams.

mod assembler;
mod backend;
mod collector;
mod config;
mod dot;
mod error;
mod graph;
mod model;
mod pipeline;
mod plantuml;
mod resolver;
mod symbols;
mod syntax;

pub use assembler::{assemble, flatten};
pub use backend::{BackendError, GraphvizBackend, ImageBackend};
pub use collector::{collect_program, Collector};
pub use config::GraphOptions;
pub use error::{Diagnostic, GraphError, Result};
pub use graph::{DotOptions, Targets, WriteOutcome};
pub use model::{
    Class, DeclarationKind, Dependency, DependencyKind, Enum, Interface, Member, MemberKind, Module,
    OutputModule, Parameter, TypeDeclaration, TypeRef, Visibility,
};
pub use pipeline::{
    create_graph, create_graph_with, get_modules_dependencies, get_modules_dependencies_with,
    GraphReport,
};
pub use plantuml::UmlOptions;
pub use resolver::{output_modules, resolve, resolve_tree, DependencyScope};
pub use symbols::ProgramIndex;

pub use graph::render as render_dot;
pub use graph::write as write_dot;
pub use plantuml::render as render_plantuml;
pub use plantuml::write as write_plantuml;
