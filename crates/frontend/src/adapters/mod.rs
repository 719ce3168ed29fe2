mod typescript;

pub use typescript::{ParseSession, TypeScriptFrontEnd};

use crate::error::Result;
use crate::types::{Program, SourceUnit};
use std::path::{Path, PathBuf};

/// Language front-end trait
pub trait LanguageFrontEnd {
    /// Parse one file into a syntax tree, rejecting invalid source
    fn parse_file(&mut self, path: &Path) -> Result<SourceUnit>;

    /// Parse every file, keeping the given order
    fn parse_program(&mut self, files: &[PathBuf]) -> Result<Program> {
        let mut units = Vec::with_capacity(files.len());
        for path in files {
            units.push(self.parse_file(path)?);
        }
        Ok(Program::new(units))
    }
}
