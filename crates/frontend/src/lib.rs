//! frontend - TypeScript parsing for tsgraph
//!
//! File discovery, tree-sitter parsing and syntax rejection.

mod adapters;
mod discovery;
mod error;
mod types;

pub use adapters::{LanguageFrontEnd, ParseSession, TypeScriptFrontEnd};
pub use discovery::{discover, is_source_file, Discovery};
pub use error::{FrontEndError, Result};
pub use types::{is_declaration_file, module_name_for, Dialect, Program, SourceUnit};

pub use tree_sitter::Node;
