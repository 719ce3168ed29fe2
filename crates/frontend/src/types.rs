use std::path::{Path, PathBuf};
use tree_sitter::{Node, Tree};

/// Grammar used for a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    TypeScript,
    Tsx,
}

impl Dialect {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("tsx") => Dialect::Tsx,
            _ => Dialect::TypeScript,
        }
    }
}

/// Returns true for ambient declaration files (`.d.ts`, `.d.mts`, `.d.cts`).
pub fn is_declaration_file(path: &Path) -> bool {
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    file_name.ends_with(".d.ts") || file_name.ends_with(".d.mts") || file_name.ends_with(".d.cts")
}

/// Module name for a source file: its file stem, with the `.d` of declaration files removed.
pub fn module_name_for(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    if is_declaration_file(path) {
        stem.strip_suffix(".d").map(str::to_string).unwrap_or(stem)
    } else {
        stem
    }
}

/// One parsed source file
pub struct SourceUnit {
    path: PathBuf,
    source: String,
    tree: Tree,
    dialect: Dialect,
}

impl SourceUnit {
    pub fn new(path: PathBuf, source: String, tree: Tree, dialect: Dialect) -> Self {
        Self {
            path,
            source,
            tree,
            dialect,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Source text covered by a node of this unit's tree
    pub fn text(&self, node: Node<'_>) -> &str {
        self.source.get(node.byte_range()).unwrap_or("")
    }

    pub fn is_declaration_file(&self) -> bool {
        is_declaration_file(&self.path)
    }

    pub fn module_name(&self) -> String {
        module_name_for(&self.path)
    }

    /// A unit is an ES module when it has a top-level import or export;
    /// otherwise its top-level declarations are global.
    pub fn is_es_module(&self) -> bool {
        let root = self.root();
        let mut cursor = root.walk();
        let found = root
            .named_children(&mut cursor)
            .any(|n| matches!(n.kind(), "import_statement" | "export_statement" | "import_alias"));
        found
    }
}

impl std::fmt::Debug for SourceUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceUnit")
            .field("path", &self.path)
            .field("dialect", &self.dialect)
            .finish()
    }
}

/// All parsed units of one analysis run, in discovery order
#[derive(Debug, Default)]
pub struct Program {
    units: Vec<SourceUnit>,
}

impl Program {
    pub fn new(units: Vec<SourceUnit>) -> Self {
        Self { units }
    }

    pub fn units(&self) -> &[SourceUnit] {
        &self.units
    }

    /// Units that carry renderable structure (declaration files excluded)
    pub fn source_units(&self) -> impl Iterator<Item = &SourceUnit> {
        self.units.iter().filter(|u| !u.is_declaration_file())
    }
}
