//! Image rendering through an external Graphviz process

use std::io::Write;
use std::process::{Command, Stdio};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} failed ({status}): {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
    #[error("IO error talking to {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Turns DOT text into an SVG document
pub trait ImageBackend {
    fn render_svg(&self, dot: &str) -> Result<Vec<u8>, BackendError>;
}

/// Runs `<program> -Tsvg`, feeding DOT on stdin
#[derive(Debug, Clone)]
pub struct GraphvizBackend {
    program: String,
}

impl GraphvizBackend {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn io_error(&self, source: std::io::Error) -> BackendError {
        BackendError::Io {
            program: self.program.clone(),
            source,
        }
    }
}

impl Default for GraphvizBackend {
    fn default() -> Self {
        Self::new("dot")
    }
}

impl ImageBackend for GraphvizBackend {
    fn render_svg(&self, dot: &str) -> Result<Vec<u8>, BackendError> {
        tracing::debug!("Running {} -Tsvg", self.program);
        let mut child = Command::new(&self.program)
            .arg("-Tsvg")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| BackendError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| self.io_error(std::io::Error::other("stdin not captured")))?;

        // feed stdin from another thread so a full stdout pipe cannot block us
        let input = dot.to_owned();
        let writer = std::thread::spawn(move || stdin.write_all(input.as_bytes()));

        let output = child.wait_with_output().map_err(|e| self.io_error(e))?;
        let written = writer
            .join()
            .unwrap_or_else(|_| Err(std::io::Error::other("stdin writer panicked")));

        // a failing process closes stdin early; report its status, not the broken pipe
        if !output.status.success() {
            return Err(BackendError::Failed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        written.map_err(|e| self.io_error(e))?;
        Ok(output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_is_spawn_error() {
        let backend = GraphvizBackend::new("tsgraph-no-such-graphviz-binary");
        let err = backend.render_svg("digraph g {}").unwrap_err();
        assert!(matches!(err, BackendError::Spawn { .. }));
        assert!(err.to_string().contains("tsgraph-no-such-graphviz-binary"));
    }

    #[test]
    fn test_default_program_is_dot() {
        assert_eq!(GraphvizBackend::default().program, "dot");
    }
}
