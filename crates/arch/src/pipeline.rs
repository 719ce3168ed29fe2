//! End-to-end entry points

use crate::assembler::assemble;
use crate::backend::{GraphvizBackend, ImageBackend};
use crate::collector::collect_program;
use crate::config::GraphOptions;
use crate::error::{Diagnostic, Result};
use crate::graph;
use crate::model::{Module, OutputModule};
use crate::plantuml;
use crate::resolver::{output_modules, DependencyScope};
use frontend::{discover, Discovery, LanguageFrontEnd, TypeScriptFrontEnd};
use std::path::{Path, PathBuf};

/// What a `create_graph` run produced
#[derive(Debug, Default)]
pub struct GraphReport {
    /// Number of modules rendered, after merging
    pub modules: usize,
    pub written: Vec<PathBuf>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Analyze `target` and render it to `output`.
///
/// Runs the PlantUML renderer when `plant_output` is set and the DOT
/// renderer otherwise. A missing target still produces an empty diagram.
pub fn create_graph(target: &Path, output: &Path, options: &GraphOptions) -> Result<GraphReport> {
    let backend = GraphvizBackend::new(options.dot_program.clone());
    create_graph_with(target, output, options, &backend)
}

/// [`create_graph`] with an explicit image backend
pub fn create_graph_with(
    target: &Path,
    output: &Path,
    options: &GraphOptions,
    backend: &dyn ImageBackend,
) -> Result<GraphReport> {
    let mut diagnostics = Vec::new();
    let modules = load_modules(target, options.recursive, &mut diagnostics)?;
    let modules = assemble(modules, options.merge);

    let written = if options.plant_output {
        vec![plantuml::write(&modules, output, &options.uml_options())?]
    } else {
        let outcome = graph::write(
            &modules,
            output,
            &options.dot_options(),
            options.targets(),
            backend,
        )?;
        diagnostics.extend(outcome.diagnostics);
        outcome.written
    };

    Ok(GraphReport {
        modules: modules.len(),
        written,
        diagnostics,
    })
}

/// Module dependency table for `target`, sorted by module name. Writes nothing.
pub fn get_modules_dependencies(target: &Path, recursive: bool) -> Result<Vec<OutputModule>> {
    get_modules_dependencies_with(target, recursive, DependencyScope::default())
}

pub fn get_modules_dependencies_with(
    target: &Path,
    recursive: bool,
    scope: DependencyScope,
) -> Result<Vec<OutputModule>> {
    let mut diagnostics = Vec::new();
    let modules = load_modules(target, recursive, &mut diagnostics)?;
    Ok(output_modules(&modules, scope))
}

/// Discover, parse and collect; one module per non-declaration file.
fn load_modules(
    target: &Path,
    recursive: bool,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Vec<Module>> {
    let discovery = discover(target, recursive)?;
    if let Discovery::Missing(path) = &discovery {
        let diagnostic = Diagnostic::MissingTarget(path.clone());
        tracing::warn!("{}", diagnostic);
        diagnostics.push(diagnostic);
    }

    let base = std::env::current_dir().unwrap_or_default();
    let mut front_end = TypeScriptFrontEnd::new()?;
    let program = {
        let mut session = front_end.session(base);
        session.parse_program(discovery.files())?
    };

    let modules = collect_program(&program);
    tracing::info!("Found {} module(s)", modules.len());
    Ok(modules)
}
