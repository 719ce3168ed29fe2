//! Statement classification over tree-sitter-typescript syntax trees

use frontend::{Node, SourceUnit};

/// Top-level or namespace-level statement the collector cares about
#[derive(Debug, Clone)]
pub(crate) enum Statement<'t> {
    /// `namespace A.B { ... }`, `module Foo { ... }`, `declare module "x" { ... }`
    Namespace {
        path: Vec<String>,
        body: Option<Node<'t>>,
    },
    /// `declare global { ... }`: statements that stay in the enclosing scope
    Global(Node<'t>),
    Class(Node<'t>),
    Interface(Node<'t>),
    Enum(Node<'t>),
    TypeAlias(Node<'t>),
    Import(Node<'t>),
    ImportAlias(Node<'t>),
    /// `export { X } from "./m"`, `export * from "./m"`
    ReExport(Node<'t>),
}

/// Classify the statements directly inside `container` (a program or statement block).
pub(crate) fn statements<'t>(unit: &SourceUnit, container: Node<'t>) -> Vec<Statement<'t>> {
    let mut out = Vec::new();
    let mut cursor = container.walk();
    for child in container.named_children(&mut cursor) {
        classify(unit, child, &mut out);
    }
    out
}

fn classify<'t>(unit: &SourceUnit, node: Node<'t>, out: &mut Vec<Statement<'t>>) {
    match node.kind() {
        "class_declaration" | "abstract_class_declaration" | "class" => {
            out.push(Statement::Class(node))
        }
        "interface_declaration" => out.push(Statement::Interface(node)),
        "enum_declaration" => out.push(Statement::Enum(node)),
        "type_alias_declaration" => out.push(Statement::TypeAlias(node)),
        "import_statement" => out.push(Statement::Import(node)),
        "import_alias" => out.push(Statement::ImportAlias(node)),
        "internal_module" | "module" => out.push(Statement::Namespace {
            path: namespace_path(unit, node),
            body: node.child_by_field_name("body"),
        }),
        "export_statement" => {
            if node.child_by_field_name("source").is_some() {
                out.push(Statement::ReExport(node));
            }
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                if child.kind() != "string" {
                    classify(unit, child, out);
                }
            }
        }
        "ambient_declaration" => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                if child.kind() == "statement_block" {
                    out.push(Statement::Global(child));
                } else {
                    classify(unit, child, out);
                }
            }
        }
        "expression_statement" => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                if child.kind() == "internal_module" {
                    classify(unit, child, out);
                }
            }
        }
        _ => {}
    }
}

/// Name segments of a namespace declaration: `A.B.C` -> `[A, B, C]`, `"x"` -> `[x]`
fn namespace_path(unit: &SourceUnit, node: Node<'_>) -> Vec<String> {
    match node.child_by_field_name("name") {
        Some(name) if name.kind() == "string" => vec![strip_quotes(unit.text(name)).to_string()],
        Some(name) => split_path(unit.text(name)),
        None => Vec::new(),
    }
}

/// `a . b.c` -> `[a, b, c]`
pub(crate) fn split_path(text: &str) -> Vec<String> {
    text.split('.')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

pub(crate) fn strip_quotes(text: &str) -> &str {
    text.trim_matches(|c| c == '"' || c == '\'' || c == '`')
}

/// Collapse runs of whitespace into single spaces
pub(crate) fn normalize_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn field_text<'u>(unit: &'u SourceUnit, node: Node<'_>, field: &str) -> Option<&'u str> {
    node.child_by_field_name(field).map(|n| unit.text(n))
}

/// Text of the type inside a `type_annotation` node (`: Foo` -> `Foo`)
pub(crate) fn annotation_text(unit: &SourceUnit, annotation: Node<'_>) -> Option<String> {
    if annotation.kind() == "type_annotation" || annotation.kind() == "opting_type_annotation" {
        let inner = annotation.named_child(0)?;
        Some(normalize_ws(unit.text(inner)))
    } else {
        let text = unit.text(annotation).trim_start_matches(':').trim();
        Some(normalize_ws(text))
    }
}

/// Anonymous keyword tokens (`static`, `readonly`, `get`, `?`, ...) directly under `node`
pub(crate) fn keywords(node: Node<'_>) -> Vec<&'static str> {
    const KNOWN: &[&str] = &[
        "static", "readonly", "abstract", "get", "set", "?", "declare", "async", "*",
    ];
    let mut found = Vec::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.is_named() {
            continue;
        }
        // `static get` is lexed as a single token
        for word in child.kind().split_whitespace() {
            if let Some(k) = KNOWN.iter().find(|k| **k == word) {
                found.push(*k);
            }
        }
    }
    found
}

/// Text of the `accessibility_modifier` child, if any
pub(crate) fn accessibility<'u>(unit: &'u SourceUnit, node: Node<'_>) -> Option<&'u str> {
    let mut cursor = node.walk();
    let found = node
        .named_children(&mut cursor)
        .find(|c| c.kind() == "accessibility_modifier")
        .map(|c| unit.text(c));
    found
}

/// Names declared by a `type_parameters` node
pub(crate) fn type_parameter_names(unit: &SourceUnit, node: Option<Node<'_>>) -> Vec<String> {
    let Some(node) = node else {
        return Vec::new();
    };
    let mut cursor = node.walk();
    let names = node
        .named_children(&mut cursor)
        .filter(|c| c.kind() == "type_parameter")
        .filter_map(|c| field_text(unit, c, "name"))
        .map(str::to_string)
        .collect();
    names
}
