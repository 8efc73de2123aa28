//! CLI binary for esrun.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use esrun::config::CONFIG_ENV;
use esrun::{EsrunConfig, RunFormat};
use tracing_subscriber::EnvFilter;

/// esrun: retrieve ranked results for a batch of topics from Elasticsearch.
#[derive(Parser)]
#[command(name = "esrun", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long, env = CONFIG_ENV)]
    config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Retrieve every topic and write a ranked run.
    Run {
        /// Topics file (`.jsonl` for JSON lines, otherwise `qid<TAB>query`).
        #[arg(short, long)]
        topics: PathBuf,

        /// Output file. Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = RunFormat::Trec)]
        format: RunFormat,

        /// Run tag written in TREC output.
        #[arg(long, default_value = "esrun")]
        tag: String,

        /// Skip failing queries instead of aborting the run.
        #[arg(long)]
        isolate: bool,
    },

    /// Print the configuration fingerprint of the configured retriever.
    Fingerprint,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("esrun=info,es_retrieve=info")),
        )
        .init();

    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(EsrunConfig::default_config_path);
    let config = EsrunConfig::from_file(&config_path)?;
    let retriever = esrun::build_retriever(&config).await?;

    match cli.command {
        Command::Run {
            topics,
            output,
            format,
            tag,
            isolate,
        } => {
            let batch = esrun::topics::read_topics(&topics)?;
            let mut out: Box<dyn Write> = match output {
                Some(path) => Box::new(BufWriter::new(File::create(&path)?)),
                None => Box::new(BufWriter::new(std::io::stdout().lock())),
            };
            esrun::run_topics(&retriever, &batch, &mut out, format, &tag, isolate).await?;
        }
        Command::Fingerprint => {
            println!("{}", retriever.fingerprint());
        }
    }

    Ok(())
}
