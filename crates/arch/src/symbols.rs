//! Name resolution tables
//!
//! Without a type checker, a type reference is resolved by looking it up in
//! the declarations of its own unit, then in the unit's imports, then in the
//! program-wide table of global declarations (script files and `.d.ts`).

use crate::syntax::{self, Statement};
use frontend::{Node, Program, SourceUnit};
use std::collections::HashMap;

/// Global library types that never count as dependencies unless imported or declared locally
const BUILTIN_TYPES: &[&str] = &[
    "Array", "ArrayBuffer", "ArrayLike", "AsyncGenerator", "AsyncIterable", "AsyncIterator",
    "Awaited", "BigInt", "Boolean", "ConstructorParameters", "DataView", "Date", "Error",
    "Exclude", "Extract", "Float32Array", "Float64Array", "Function", "Generator",
    "InstanceType", "Int8Array", "Int16Array", "Int32Array", "Iterable", "IterableIterator",
    "Iterator", "JSON", "Map", "Math", "NonNullable", "Number", "Object", "Omit", "Parameters",
    "Partial", "Pick", "Promise", "PromiseLike", "Readonly", "ReadonlyArray", "ReadonlyMap",
    "ReadonlySet", "Record", "RegExp", "Required", "ReturnType", "Set", "String", "Symbol",
    "TemplateStringsArray", "ThisType", "Uint8Array", "Uint16Array", "Uint32Array",
    "Uint8ClampedArray", "WeakMap", "WeakRef", "WeakSet",
];

pub fn is_builtin_type(name: &str) -> bool {
    BUILTIN_TYPES.contains(&name)
}

/// Module name for an import specifier.
///
/// Relative specifiers map to their last path segment without script
/// extension (`../lib/user.service.ts` -> `user.service`); package
/// specifiers keep their full name (`@scope/pkg`).
pub fn module_name_from_specifier(specifier: &str) -> String {
    let relative = specifier.starts_with('.') || specifier.starts_with('/');
    if !relative {
        return specifier.to_string();
    }
    let last = specifier
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(specifier);
    const EXTENSIONS: &[&str] = &[
        ".d.ts", ".ts", ".tsx", ".mts", ".cts", ".js", ".jsx", ".mjs", ".cjs",
    ];
    EXTENSIONS
        .iter()
        .find_map(|ext| last.strip_suffix(ext))
        .unwrap_or(last)
        .to_string()
}

/// Declarations keyed by (enclosing namespace path, name), mapped to the owning module name
#[derive(Debug, Default, Clone)]
pub struct DeclarationTable {
    entries: HashMap<(Vec<String>, String), String>,
}

impl DeclarationTable {
    /// Record a declaration; the first declaration of a name wins.
    pub fn insert(&mut self, scope: &[String], name: &str, module: &str) {
        self.entries
            .entry((scope.to_vec(), name.to_string()))
            .or_insert_with(|| module.to_string());
    }

    /// Resolve `segments` (e.g. `[Shapes, Circle]`) as seen from `scope`,
    /// trying the innermost enclosing namespace first.
    pub fn lookup(&self, scope: &[String], segments: &[String]) -> Option<&str> {
        let (name, qualifier) = segments.split_last()?;
        for depth in (0..=scope.len()).rev() {
            let mut path = scope[..depth].to_vec();
            path.extend(qualifier.iter().cloned());
            if let Some(module) = self.entries.get(&(path, name.clone())) {
                return Some(module);
            }
        }
        None
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Register every type declared in `unit`, owned by `root_module` at file level.
    pub fn add_unit(&mut self, unit: &SourceUnit, root_module: &str) {
        let mut scope = Vec::new();
        self.add_block(unit, unit.root(), &mut scope, root_module);
    }

    fn add_block(
        &mut self,
        unit: &SourceUnit,
        block: Node<'_>,
        scope: &mut Vec<String>,
        module: &str,
    ) {
        for statement in syntax::statements(unit, block) {
            match statement {
                Statement::Class(node)
                | Statement::Interface(node)
                | Statement::Enum(node)
                | Statement::TypeAlias(node) => {
                    if let Some(name) = syntax::field_text(unit, node, "name") {
                        self.insert(scope, name, module);
                    }
                }
                Statement::Namespace { path, body } => {
                    let Some(inner) = path.last().cloned() else {
                        continue;
                    };
                    let depth = scope.len();
                    scope.extend(path);
                    if let Some(body) = body {
                        self.add_block(unit, body, scope, &inner);
                    }
                    scope.truncate(depth);
                }
                Statement::Global(body) => self.add_block(unit, body, scope, module),
                Statement::Import(_) | Statement::ImportAlias(_) | Statement::ReExport(_) => {}
            }
        }
    }
}

/// What an imported local name stands for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportBinding {
    /// `import { X as Y } from "m"` or `import X from "m"`
    Symbol { module: String, name: String },
    /// `import * as m from "m"` or `import m = require("m")`
    Module { module: String },
    /// `import A = N.M`
    Alias { segments: Vec<String> },
}

/// One import statement as written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    pub module: String,
    /// Imported symbol names, empty for side-effect and namespace imports
    pub symbols: Vec<String>,
}

/// Local names bound by the imports of one unit
#[derive(Debug, Default, Clone)]
pub struct ImportTable {
    bindings: HashMap<String, ImportBinding>,
}

impl ImportTable {
    pub fn get(&self, local: &str) -> Option<&ImportBinding> {
        self.bindings.get(local)
    }

    pub fn bind(&mut self, local: impl Into<String>, binding: ImportBinding) {
        self.bindings.entry(local.into()).or_insert(binding);
    }

    /// Collect the bindings of every import in `unit`, namespaces included.
    pub fn from_unit(unit: &SourceUnit) -> Self {
        let mut table = Self::default();
        table.add_block(unit, unit.root());
        table
    }

    fn add_block(&mut self, unit: &SourceUnit, block: Node<'_>) {
        for statement in syntax::statements(unit, block) {
            match statement {
                Statement::Import(node) => {
                    read_import(unit, node, Some(self));
                }
                Statement::ImportAlias(node) => {
                    if let Some((local, segments)) = read_import_alias(unit, node) {
                        self.bind(local, ImportBinding::Alias { segments });
                    }
                }
                Statement::Namespace { body: Some(body), .. } | Statement::Global(body) => {
                    self.add_block(unit, body)
                }
                _ => {}
            }
        }
    }
}

/// Read an `import_statement`, optionally binding its local names.
pub(crate) fn read_import(
    unit: &SourceUnit,
    node: Node<'_>,
    mut table: Option<&mut ImportTable>,
) -> Option<ImportDecl> {
    let mut source = node.child_by_field_name("source");
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();

    let require = children.iter().find(|c| c.kind() == "import_require_clause").copied();
    if source.is_none() {
        source = require.and_then(|r| r.child_by_field_name("source"));
    }
    let specifier = syntax::strip_quotes(unit.text(source?)).to_string();
    let module = module_name_from_specifier(&specifier);
    let mut symbols = Vec::new();

    if let Some(require) = require {
        let mut rc = require.walk();
        let local = require
            .named_children(&mut rc)
            .find(|c| c.kind() == "identifier")
            .map(|c| unit.text(c).to_string());
        if let (Some(local), Some(table)) = (local, table.as_deref_mut()) {
            table.bind(local, ImportBinding::Module { module: module.clone() });
        }
    }

    if let Some(clause) = children.iter().find(|c| c.kind() == "import_clause") {
        let mut cc = clause.walk();
        for part in clause.named_children(&mut cc) {
            match part.kind() {
                "identifier" => {
                    let local = unit.text(part).to_string();
                    symbols.push(local.clone());
                    if let Some(table) = table.as_deref_mut() {
                        table.bind(
                            local.clone(),
                            ImportBinding::Symbol {
                                module: module.clone(),
                                name: local,
                            },
                        );
                    }
                }
                "namespace_import" => {
                    let mut nc = part.walk();
                    let local = part
                        .named_children(&mut nc)
                        .find(|c| c.kind() == "identifier")
                        .map(|c| unit.text(c).to_string());
                    if let (Some(local), Some(table)) = (local, table.as_deref_mut()) {
                        table.bind(local, ImportBinding::Module { module: module.clone() });
                    }
                }
                "named_imports" => {
                    let mut nc = part.walk();
                    for spec in part.named_children(&mut nc) {
                        if spec.kind() != "import_specifier" {
                            continue;
                        }
                        let Some(name) = syntax::field_text(unit, spec, "name") else {
                            continue;
                        };
                        let name = syntax::strip_quotes(name).to_string();
                        let local = syntax::field_text(unit, spec, "alias")
                            .map(str::to_string)
                            .unwrap_or_else(|| name.clone());
                        symbols.push(name.clone());
                        if let Some(table) = table.as_deref_mut() {
                            table.bind(
                                local,
                                ImportBinding::Symbol {
                                    module: module.clone(),
                                    name,
                                },
                            );
                        }
                    }
                }
                _ => {}
            }
        }
    }

    Some(ImportDecl { module, symbols })
}

/// Read a re-export (`export { X } from "./m"`, `export * from "./m"`).
pub(crate) fn read_reexport(unit: &SourceUnit, node: Node<'_>) -> Option<ImportDecl> {
    let source = node.child_by_field_name("source")?;
    let module = module_name_from_specifier(syntax::strip_quotes(unit.text(source)));
    let mut symbols = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() != "export_clause" {
            continue;
        }
        let mut sc = child.walk();
        for spec in child.named_children(&mut sc) {
            if spec.kind() == "export_specifier" {
                if let Some(name) = syntax::field_text(unit, spec, "name") {
                    symbols.push(syntax::strip_quotes(name).to_string());
                }
            }
        }
    }
    Some(ImportDecl { module, symbols })
}

/// `import A = N.M;` -> `(A, [N, M])`
fn read_import_alias(unit: &SourceUnit, node: Node<'_>) -> Option<(String, Vec<String>)> {
    let mut cursor = node.walk();
    let mut parts = node
        .named_children(&mut cursor)
        .filter(|c| matches!(c.kind(), "identifier" | "nested_identifier" | "member_expression"));
    let local = unit.text(parts.next()?).to_string();
    let target = syntax::split_path(unit.text(parts.next()?));
    Some((local, target))
}

/// Program-wide table of global declarations
#[derive(Debug, Default)]
pub struct ProgramIndex {
    globals: DeclarationTable,
}

impl ProgramIndex {
    /// Index the top-level declarations of script units and declaration files.
    ///
    /// Units with top-level imports or exports are ES modules whose
    /// declarations are only visible through imports, so they are skipped.
    pub fn build(program: &Program) -> Self {
        let mut globals = DeclarationTable::default();
        for unit in program.units() {
            if unit.is_es_module() {
                continue;
            }
            globals.add_unit(unit, &unit.module_name());
        }
        tracing::debug!("Indexed {} global declaration(s)", globals.len());
        Self { globals }
    }

    pub fn lookup(&self, scope: &[String], segments: &[String]) -> Option<&str> {
        self.globals.lookup(scope, segments)
    }
}
