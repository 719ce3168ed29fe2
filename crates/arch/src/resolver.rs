//! Module dependency resolution

use crate::model::{Dependency, DependencyKind, Module, OutputModule};
use std::collections::HashSet;
use std::str::FromStr;

/// Which raw dependencies count
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DependencyScope {
    /// Imports, heritage and member-level type references
    #[default]
    All,
    /// Imports and heritage only
    Declarations,
}

impl DependencyScope {
    pub fn includes(self, kind: DependencyKind) -> bool {
        match self {
            DependencyScope::All => true,
            DependencyScope::Declarations => kind != DependencyKind::Reference,
        }
    }
}

impl FromStr for DependencyScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(DependencyScope::All),
            "declarations" | "decl" => Ok(DependencyScope::Declarations),
            other => Err(format!("unknown dependency scope: {other}")),
        }
    }
}

/// Sorted unique names of the modules `module` depends on, itself excluded.
pub fn resolve(module: &Module, scope: DependencyScope) -> Vec<String> {
    unique_sorted(module.dependencies.iter(), scope, |name| name == module.name)
}

/// Like [`resolve`], also folding in every nested module's dependencies.
///
/// Names of modules inside the same tree are excluded.
pub fn resolve_tree(module: &Module, scope: DependencyScope) -> Vec<String> {
    let tree = module.walk();
    let inside: HashSet<&str> = tree.iter().map(|m| m.name.as_str()).collect();
    let deps = tree.iter().flat_map(|m| m.dependencies.iter());
    unique_sorted(deps, scope, |name| inside.contains(name))
}

fn unique_sorted<'a>(
    deps: impl Iterator<Item = &'a Dependency>,
    scope: DependencyScope,
    excluded: impl Fn(&str) -> bool,
) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names: Vec<String> = deps
        .filter(|d| scope.includes(d.kind))
        .filter(|d| !excluded(&d.name))
        .filter(|d| seen.insert(d.name.as_str()))
        .map(|d| d.name.clone())
        .collect();
    names.sort();
    names
}

/// Dependency query rows, sorted by module name.
pub fn output_modules(modules: &[Module], scope: DependencyScope) -> Vec<OutputModule> {
    let mut rows: Vec<OutputModule> = modules
        .iter()
        .map(|m| OutputModule {
            name: m.name.clone(),
            dependencies: resolve_tree(m, scope),
        })
        .collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name));
    rows
}
