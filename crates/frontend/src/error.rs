use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontEndError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Grammar error: {0}")]
    Language(#[from] tree_sitter::LanguageError),
    #[error("Parser produced no tree for {0}")]
    Parse(PathBuf),
    #[error("Syntax error in {path} at {line}:{column}")]
    Syntax {
        path: PathBuf,
        line: usize,
        column: usize,
    },
}

impl FrontEndError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, FrontEndError>;
