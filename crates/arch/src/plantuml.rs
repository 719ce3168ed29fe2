//! PlantUML class diagrams

use crate::dot::sanitize_id;
use crate::error::{GraphError, Result};
use crate::model::{
    Class, DeclarationKind, DependencyKind, Member, MemberKind, Module, TypeDeclaration, TypeRef,
};
use std::collections::{HashMap, HashSet};
use std::fmt::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default)]
pub struct UmlOptions {
    pub no_methods: bool,
    pub no_properties: bool,
    pub no_types: bool,
}

/// Element aliases keyed by (module name, type name); the first declaration wins
#[derive(Default)]
struct Aliases {
    by_type: HashMap<(String, String), String>,
    used: HashSet<String>,
}

impl Aliases {
    fn assign(&mut self, module_path: &[&str], module: &str, name: &str) -> String {
        let base = format!(
            "{}__{}",
            module_path.iter().map(|p| sanitize_id(p)).collect::<Vec<_>>().join("_"),
            sanitize_id(name)
        );
        let mut alias = base.clone();
        let mut n = 2;
        while !self.used.insert(alias.clone()) {
            alias = format!("{base}_{n}");
            n += 1;
        }
        self.by_type
            .entry((module.to_string(), name.to_string()))
            .or_insert_with(|| alias.clone());
        alias
    }

    fn get(&self, module: &str, name: &str) -> Option<&str> {
        self.by_type
            .get(&(module.to_string(), name.to_string()))
            .map(String::as_str)
    }

    fn resolve(&self, type_ref: &TypeRef) -> Option<&str> {
        self.get(type_ref.module.as_deref()?, &type_ref.name)
    }
}

/// Render modules as a PlantUML class diagram.
pub fn render(modules: &[Module], options: &UmlOptions) -> String {
    let mut out = String::from("@startuml\nset separator none\n");
    let mut aliases = Aliases::default();

    for module in modules {
        let mut path = Vec::new();
        emit_package(&mut out, module, &mut path, 0, options, &mut aliases);
    }

    let mut edges: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut push = |edge: String| {
        if seen.insert(edge.clone()) {
            edges.push(edge);
        }
    };

    for module in modules.iter().flat_map(Module::walk) {
        for class in &module.classes {
            let Some(from) = aliases.get(&module.name, &class.name) else {
                continue;
            };
            heritage_edges(class, from, &aliases, &mut push);
        }
        for interface in &module.interfaces {
            let Some(from) = aliases.get(&module.name, &interface.name) else {
                continue;
            };
            for base in &interface.extends {
                if let Some(to) = aliases.resolve(base) {
                    push(format!("{to} <|-- {from}"));
                }
            }
        }
        for dep in &module.dependencies {
            if dep.kind != DependencyKind::Reference {
                continue;
            }
            let (Some(origin), Some(target)) = (&dep.origin, &dep.target) else {
                continue;
            };
            let from = aliases.get(&module.name, origin);
            if let (Some(from), Some(to)) = (from, aliases.get(&dep.name, target)) {
                if from != to {
                    push(format!("{from} ..> {to}"));
                }
            }
        }
    }

    for edge in edges {
        out.push_str(&edge);
        out.push('\n');
    }
    out.push_str("@enduml\n");
    out
}

fn heritage_edges(class: &Class, from: &str, aliases: &Aliases, push: &mut impl FnMut(String)) {
    if let Some(to) = class.extends.as_ref().and_then(|base| aliases.resolve(base)) {
        push(format!("{to} <|-- {from}"));
    }
    for iface in &class.implements {
        if let Some(to) = aliases.resolve(iface) {
            push(format!("{to} <|.. {from}"));
        }
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn emit_package<'m>(
    out: &mut String,
    module: &'m Module,
    path: &mut Vec<&'m str>,
    depth: usize,
    options: &UmlOptions,
    aliases: &mut Aliases,
) {
    if !module.has_declarations_in_tree() {
        return;
    }
    path.push(&module.name);

    indent(out, depth);
    let _ = writeln!(out, "package \"{}\" {{", module.name.replace('"', "'"));
    for decl in module.declarations() {
        let alias = aliases.assign(path, &module.name, decl.name());
        emit_type(out, decl, &type_title(module, decl), &alias, depth + 1, options);
    }
    for child in &module.modules {
        emit_package(out, child, path, depth + 1, options, aliases);
    }
    indent(out, depth);
    out.push_str("}\n");

    path.pop();
}

/// Display name, with type parameters for generic classes and interfaces
fn type_title(module: &Module, decl: &dyn TypeDeclaration) -> String {
    let params = match decl.kind() {
        DeclarationKind::Class | DeclarationKind::AbstractClass => module
            .classes
            .iter()
            .find(|c| c.name == decl.name())
            .map(|c| c.type_parameters.clone()),
        DeclarationKind::Interface => module
            .interfaces
            .iter()
            .find(|i| i.name == decl.name())
            .map(|i| i.type_parameters.clone()),
        DeclarationKind::Enum => None,
    }
    .unwrap_or_default();

    if params.is_empty() {
        decl.name().to_string()
    } else {
        format!("{}<{}>", decl.name(), params.join(", "))
    }
}

fn emit_type(
    out: &mut String,
    decl: &dyn TypeDeclaration,
    title: &str,
    alias: &str,
    depth: usize,
    options: &UmlOptions,
) {
    let keyword = match decl.kind() {
        DeclarationKind::Class => "class",
        DeclarationKind::AbstractClass => "abstract class",
        DeclarationKind::Interface => "interface",
        DeclarationKind::Enum => "enum",
    };

    let lines: Vec<String> = decl
        .members()
        .iter()
        .filter(|m| match m.kind {
            MemberKind::Method => !options.no_methods,
            MemberKind::Property | MemberKind::EnumValue => !options.no_properties,
        })
        .map(|m| member_line(m, options))
        .collect();

    indent(out, depth);
    if lines.is_empty() {
        let _ = writeln!(out, "{} \"{}\" as {}", keyword, title, alias);
        return;
    }
    let _ = writeln!(out, "{} \"{}\" as {} {{", keyword, title, alias);
    for line in lines {
        indent(out, depth + 1);
        out.push_str(&line);
        out.push('\n');
    }
    indent(out, depth);
    out.push_str("}\n");
}

fn member_line(member: &Member, options: &UmlOptions) -> String {
    if member.kind == MemberKind::EnumValue {
        return member.name.clone();
    }
    let mut line = String::new();
    if member.is_static {
        line.push_str("{static} ");
    }
    if member.is_abstract {
        line.push_str("{abstract} ");
    }
    line.push(member.visibility.marker());
    line.push_str(&member.signature(!options.no_types));
    line
}

/// Render and write the diagram to `output`.
pub fn write(modules: &[Module], output: &Path, options: &UmlOptions) -> Result<PathBuf> {
    let text = render(modules, options);
    std::fs::write(output, text).map_err(|e| GraphError::io(output, e))?;
    tracing::info!("Wrote {}", output.display());
    Ok(output.to_path_buf())
}
