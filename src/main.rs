//! Deployment graph snapshot CLI.

use clap::{Parser, Subcommand, ValueEnum};
use graph_snapshot::Result;
use graph_snapshot::config::Config;
use graph_snapshot::graph::Graph;
use graph_snapshot::{export, live, reconcile, spec};

#[derive(Parser)]
#[command(name = "graph-snapshot")]
#[command(about = "Reconcile a declared deployment graph against a live capture", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile a workspace spec with a live capture and export the model.
    Reconcile {
        /// Workspace spec file (JSON or YAML).
        #[arg(long)]
        spec: String,

        /// Live discovery capture file (JSON).
        #[arg(long)]
        live: String,

        /// Output directory for exported banks.
        #[arg(short = 'o', long)]
        out: String,

        /// Base name for exported files.
        #[arg(long, default_value = "snapshot")]
        base_name: String,

        /// Model export format.
        #[arg(long, value_enum, default_value = "yaml")]
        format: FormatArg,

        /// Also write the derived graph as a DOT file.
        #[arg(long)]
        dot: bool,

        /// Tuning config file (YAML).
        #[arg(long)]
        config: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Yaml,
    Json,
    Text,
    All,
}

impl FormatArg {
    fn formats(self) -> Vec<export::Format> {
        match self {
            FormatArg::Yaml => vec![export::Format::Yaml],
            FormatArg::Json => vec![export::Format::Json],
            FormatArg::Text => vec![export::Format::Text],
            FormatArg::All => vec![
                export::Format::Yaml,
                export::Format::Json,
                export::Format::Text,
            ],
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Reconcile {
            spec: spec_path,
            live: live_path,
            out,
            base_name,
            format,
            dot,
            config,
        } => {
            let cfg = match config {
                Some(path) => Config::load(&path)?,
                None => Config::default(),
            };

            // 1) Load both input collections.
            let static_spec = spec::load(&spec_path)?;
            let capture = live::load(&live_path)?;

            // 2) Reconcile into one model, then derive the graph view.
            let model = reconcile::reconcile(&static_spec, &capture, &cfg)?;
            let graph = Graph::build(&model);

            // 3) Export.
            let written = export::write_model(&model, &out, &base_name, &format.formats())?;
            for path in &written {
                println!("Wrote {}", path.display());
            }
            if dot {
                let path = export::write_graph_dot(&graph, &out, &base_name)?;
                println!("Wrote {}", path.display());
            }
        }
    }

    Ok(())
}
