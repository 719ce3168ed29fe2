use super::LanguageFrontEnd;
use crate::error::{FrontEndError, Result};
use crate::types::{Dialect, Program, SourceUnit};
use std::fs;
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Parser};

/// TypeScript front-end (tree-sitter-typescript)
pub struct TypeScriptFrontEnd {
    ts_parser: Parser,
    tsx_parser: Parser,
}

impl TypeScriptFrontEnd {
    pub fn new() -> Result<Self> {
        let mut ts_parser = Parser::new();
        ts_parser.set_language(&tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())?;

        let mut tsx_parser = Parser::new();
        tsx_parser.set_language(&tree_sitter_typescript::LANGUAGE_TSX.into())?;

        Ok(Self {
            ts_parser,
            tsx_parser,
        })
    }

    /// Open a parse session that resolves relative paths against `base`.
    ///
    /// Parser state is reset when the session ends, on success and on error.
    pub fn session(&mut self, base: impl Into<PathBuf>) -> ParseSession<'_> {
        ParseSession {
            front_end: self,
            base: base.into(),
            parsed: 0,
        }
    }

    fn parser_for(&mut self, dialect: Dialect) -> &mut Parser {
        match dialect {
            Dialect::TypeScript => &mut self.ts_parser,
            Dialect::Tsx => &mut self.tsx_parser,
        }
    }

    fn reset(&mut self) {
        self.ts_parser.reset();
        self.tsx_parser.reset();
    }

    /// Parse source text that did not come from disk
    pub fn parse_source(&mut self, path: &Path, source: String) -> Result<SourceUnit> {
        let dialect = Dialect::from_path(path);
        let tree = self
            .parser_for(dialect)
            .parse(&source, None)
            .ok_or_else(|| FrontEndError::Parse(path.to_path_buf()))?;

        if let Some(bad) = first_error(tree.root_node()) {
            let pos = bad.start_position();
            return Err(FrontEndError::Syntax {
                path: path.to_path_buf(),
                line: pos.row + 1,
                column: pos.column + 1,
            });
        }

        Ok(SourceUnit::new(path.to_path_buf(), source, tree, dialect))
    }
}

impl LanguageFrontEnd for TypeScriptFrontEnd {
    fn parse_file(&mut self, path: &Path) -> Result<SourceUnit> {
        let source = fs::read_to_string(path).map_err(|e| FrontEndError::io(path, e))?;
        tracing::debug!("Parsing {}", path.display());
        self.parse_source(path, source)
    }
}

/// Scoped file-resolution context for one analysis run
pub struct ParseSession<'a> {
    front_end: &'a mut TypeScriptFrontEnd,
    base: PathBuf,
    parsed: usize,
}

impl ParseSession<'_> {
    /// Number of files parsed so far in this session
    pub fn parsed(&self) -> usize {
        self.parsed
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base.join(path)
        }
    }
}

impl LanguageFrontEnd for ParseSession<'_> {
    fn parse_file(&mut self, path: &Path) -> Result<SourceUnit> {
        let resolved = self.resolve(path);
        let unit = self.front_end.parse_file(&resolved)?;
        self.parsed += 1;
        Ok(unit)
    }

    fn parse_program(&mut self, files: &[PathBuf]) -> Result<Program> {
        let mut units = Vec::with_capacity(files.len());
        for path in files {
            units.push(self.parse_file(path)?);
        }
        Ok(Program::new(units))
    }
}

impl Drop for ParseSession<'_> {
    fn drop(&mut self) {
        self.front_end.reset();
        tracing::debug!(
            "Parse session in {} closed after {} file(s)",
            self.base.display(),
            self.parsed
        );
    }
}

/// First ERROR or MISSING node in document order
fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if !node.has_error() {
        return None;
    }
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}
