use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use folio::{
    read_documents, write_documents, DocumentSummary, Engine, Metadata, Module, PipelineConfig,
};

#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version, about = "Document pipeline with composable metadata stages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a pipeline over a set of documents
    Run {
        /// Input documents (JSON array)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for the resulting documents (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Pipeline definition (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Attach a constant `key=value` to every document (value parsed as JSON, else a string)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        assignments: Vec<String>,

        /// Output file for a human-readable summary (text)
        #[arg(long)]
        summary: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print documents and their metadata
    Inspect {
        /// Input documents (JSON array)
        #[arg(short, long)]
        input: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            output,
            config,
            assignments,
            summary,
            verbose,
        } => {
            setup_logging(verbose);
            run_pipeline(input, output, config, assignments, summary).await
        }
        Commands::Inspect { input, verbose } => {
            setup_logging(verbose);
            inspect_documents(input)
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

async fn run_pipeline(
    input: PathBuf,
    output: PathBuf,
    config: Option<PathBuf>,
    assignments: Vec<String>,
    summary: Option<PathBuf>,
) -> Result<()> {
    let mut modules: Vec<Arc<dyn Module>> = match &config {
        Some(path) => {
            info!("Loading pipeline from {:?}", path);
            PipelineConfig::from_file(path)
                .with_context(|| format!("Failed to load pipeline: {:?}", path))?
                .build()
                .context("Failed to build pipeline")?
        }
        None => Vec::new(),
    };

    for assignment in &assignments {
        let (key, value) = parse_assignment(assignment)?;
        modules.push(Arc::new(Metadata::constant(key, value)?));
    }

    info!("Loading documents from {:?}", input);
    let documents = read_documents(&input).context("Failed to read input documents")?;
    info!(
        "Running {} modules over {} documents",
        modules.len(),
        documents.len()
    );

    let results = tokio::task::spawn_blocking(move || Engine::new().run(&modules, documents))
        .await
        .context("Pipeline task failed")??;

    write_documents(&output, &results)?;
    info!("Output written to {:?}", output);

    if let Some(path) = summary {
        DocumentSummary::new(&results).write_file(&path)?;
        info!("Summary written to {:?}", path);
    }

    let keys: usize = results.iter().map(|d| d.metadata().len()).sum();
    info!(
        "Complete: {} documents, {} metadata entries",
        results.len(),
        keys
    );

    Ok(())
}

fn inspect_documents(input: PathBuf) -> Result<()> {
    info!("Inspecting documents from {:?}", input);
    let documents = read_documents(&input).context("Failed to read input documents")?;

    println!("Documents: {}", documents.len());
    println!();
    print!("{}", DocumentSummary::new(&documents).format());

    Ok(())
}

/// Split `key=value`, reading the value as JSON when it parses and as a string otherwise
fn parse_assignment(assignment: &str) -> Result<(String, Value)> {
    let (key, raw) = assignment
        .split_once('=')
        .with_context(|| format!("Expected KEY=VALUE, got {:?}", assignment))?;
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}
