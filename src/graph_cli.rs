//! graph / deps subcommands

use arch::{create_graph, get_modules_dependencies_with, DependencyScope, GraphOptions};
use clap::Args;
use std::path::PathBuf;

fn parse_scope(s: &str) -> Result<DependencyScope, String> {
    s.parse()
}

#[derive(Args)]
pub struct GraphArgs {
    /// File or directory to analyze
    pub target: PathBuf,
    /// Output file
    pub output: PathBuf,
    /// Only draw modules and the dependencies between them
    #[arg(short, long)]
    pub dependencies_only: bool,
    /// Descend into subdirectories
    #[arg(short, long)]
    pub recursive: bool,
    /// Flatten nested namespaces into top-level modules
    #[arg(short, long)]
    pub merge: bool,
    /// Leave methods out of type nodes
    #[arg(long)]
    pub no_methods: bool,
    /// Leave properties out of type nodes
    #[arg(long)]
    pub no_properties: bool,
    /// Leave type annotations out (PlantUML)
    #[arg(long)]
    pub no_types: bool,
    /// Render SVG through Graphviz
    #[arg(long)]
    pub svg: bool,
    /// Keep the DOT text
    #[arg(long)]
    pub dot: bool,
    /// Write a PlantUML class diagram instead of a dependency graph
    #[arg(long)]
    pub plantuml: bool,
    /// Dependencies to draw (all, declarations); overrides TSGRAPH_DEPENDENCY_SCOPE
    #[arg(long, value_parser = parse_scope)]
    pub scope: Option<DependencyScope>,
    /// Graphviz executable; overrides TSGRAPH_DOT_PROGRAM
    #[arg(long)]
    pub dot_program: Option<String>,
}

#[derive(Args)]
pub struct DepsArgs {
    /// File or directory to analyze
    pub target: PathBuf,
    /// Descend into subdirectories
    #[arg(short, long)]
    pub recursive: bool,
    /// Dependencies to count (all, declarations); overrides TSGRAPH_DEPENDENCY_SCOPE
    #[arg(long, value_parser = parse_scope)]
    pub scope: Option<DependencyScope>,
    /// JSON output
    #[arg(long)]
    pub json: bool,
}

impl GraphArgs {
    fn options(&self) -> GraphOptions {
        let mut options = GraphOptions::from_env()
            .with_dependencies_only(self.dependencies_only)
            .with_recursive(self.recursive)
            .with_merge(self.merge)
            .with_no_methods(self.no_methods)
            .with_no_properties(self.no_properties)
            .with_no_types(self.no_types)
            .with_svg_output(self.svg)
            .with_dot_output(self.dot)
            .with_plant_output(self.plantuml);
        if let Some(scope) = self.scope {
            options = options.with_scope(scope);
        }
        if let Some(program) = &self.dot_program {
            options = options.with_dot_program(program.clone());
        }
        options
    }
}

pub fn run_graph(args: GraphArgs) -> anyhow::Result<()> {
    let options = args.options();
    let report = create_graph(&args.target, &args.output, &options)?;

    for diagnostic in &report.diagnostics {
        eprintln!("warning: {}", diagnostic);
    }
    for path in &report.written {
        println!("Saved to: {}", path.display());
    }
    Ok(())
}

pub fn run_deps(args: DepsArgs) -> anyhow::Result<()> {
    let scope = args.scope.unwrap_or(GraphOptions::from_env().scope);
    let modules = get_modules_dependencies_with(&args.target, args.recursive, scope)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&modules)?);
        return Ok(());
    }

    for module in &modules {
        if module.dependencies.is_empty() {
            println!("{}", module.name);
        } else {
            println!("{} -> {}", module.name, module.dependencies.join(", "));
        }
    }
    Ok(())
}
