//! tsgraph - TypeScript dependency graphs and UML class diagrams

mod graph_cli;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tsgraph")]
#[command(about = "Dependency graphs and UML class diagrams for TypeScript", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a dependency graph (DOT/SVG) or a PlantUML class diagram
    Graph(graph_cli::GraphArgs),
    /// Print module dependencies
    Deps(graph_cli::DepsArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Graph(args) => graph_cli::run_graph(args)?,
        Commands::Deps(args) => graph_cli::run_deps(args)?,
    }

    Ok(())
}
