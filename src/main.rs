// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use bill_search::utils::logging::{format_success, format_warning};
use bill_search::{
    Config, DemoOrchestrator, Document, ResponseExporter, TrieveClient, Validator, WordChunker,
};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "bill_search")]
#[command(author = "cipher")]
#[command(version = "0.1.0")]
#[command(about = "Upload bills to a hosted search service and query them", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Strategy {
    /// Upload each bill whole and let the service average its vectors
    SplitAvg,
    /// Split each bill locally and upload the chunks into a group
    Chunked,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full upload, search, delete and re-upload walkthrough
    Run {
        /// Directory to save every service response as json
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        pretty: bool,

        /// Do not sleep while the service ingests uploads
        #[arg(long)]
        skip_waits: bool,
    },

    /// Preview local word chunking of a file without calling the service
    Chunk {
        file: PathBuf,

        #[arg(short, long, value_name = "NUM")]
        max_words: Option<usize>,

        /// Print a preview of every chunk
        #[arg(long)]
        show: bool,
    },

    /// Upload the configured bills with one strategy
    Upload {
        #[arg(short, long, value_enum, default_value_t = Strategy::SplitAvg)]
        strategy: Strategy,
    },

    /// Filtered hybrid search over chunks or groups
    Search {
        #[arg(short, long)]
        groups: bool,

        #[arg(short, long)]
        query: Option<String>,
    },

    /// Recommendations based on the configured tracking ids
    Recommend {
        #[arg(short, long)]
        groups: bool,
    },

    /// Delete the whole-bill chunks by tracking id
    Delete,

    /// Show the dataset's ingestion events
    Events {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    bill_search::utils::logging::init_logger(cli.color, cli.verbose);
    colored::control::set_override(cli.color);

    info!("Bill Search Demo");
    info!("Loading configuration from: {}", cli.config.display());

    let mut config = if cli.config.exists() {
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?
    } else {
        warn!(
            "Config file {} not found, using default configuration",
            cli.config.display()
        );
        Config::load(None).unwrap_or_else(|e| {
            warn!("Falling back to built-in defaults: {}", e);
            Config::default_config()
        })
    };

    match cli.command {
        Commands::Run {
            output,
            pretty,
            skip_waits,
        } => {
            cmd_run(&config, cli.color, output, pretty, skip_waits).await?;
        }
        Commands::Chunk {
            file,
            max_words,
            show,
        } => {
            cmd_chunk(&config, &file, max_words, show)?;
        }
        Commands::Upload { strategy } => {
            cmd_upload(&config, cli.color, strategy).await?;
        }
        Commands::Search { groups, query } => {
            if let Some(query) = query {
                config.search.query = query;
            }
            build_orchestrator(&config, cli.color)?
                .search(groups)
                .await
                .context("Search failed")?;
        }
        Commands::Recommend { groups } => {
            build_orchestrator(&config, cli.color)?
                .recommend(groups)
                .await
                .context("Recommendation failed")?;
        }
        Commands::Delete => {
            cmd_delete(&config, cli.color).await?;
        }
        Commands::Events { page } => {
            cmd_events(&config, page).await?;
        }
    }

    Ok(())
}

fn build_client(config: &Config) -> Result<TrieveClient> {
    let credentials = config
        .require_credentials()
        .context("Search service credentials missing")?;
    TrieveClient::new(&credentials).context("Failed to create search service client")
}

fn build_orchestrator(config: &Config, colored: bool) -> Result<DemoOrchestrator> {
    let client = build_client(config)?;
    Ok(DemoOrchestrator::new(config.clone(), client).colored(colored))
}

fn load_documents(config: &Config) -> Result<Vec<Document>> {
    let documents =
        Document::load_all(&config.documents.paths).context("Failed to read bill documents")?;
    info!("Loaded {} documents", documents.len());
    Ok(documents)
}

async fn cmd_run(
    config: &Config,
    colored: bool,
    output: Option<PathBuf>,
    pretty: bool,
    skip_waits: bool,
) -> Result<()> {
    info!("Starting demo walkthrough");

    let documents = load_documents(config)?;
    let mut orchestrator = build_orchestrator(config, colored)?.skip_waits(skip_waits);

    if let Some(output) = output {
        let exporter =
            ResponseExporter::new(output, pretty).context("Failed to create output directory")?;
        info!("Recording responses to {}", exporter.output_dir().display());
        orchestrator = orchestrator.with_exporter(exporter);
    }

    let stats = orchestrator.run(&documents).await.context("Demo run failed")?;

    if stats.chunks_failed == 0 {
        println!("{}", format_success("Walkthrough complete"));
    } else {
        println!(
            "{}",
            format_warning(&format!(
                "Walkthrough complete with {} failed chunk uploads",
                stats.chunks_failed
            ))
        );
    }

    Ok(())
}

fn cmd_chunk(config: &Config, file: &Path, max_words: Option<usize>, show: bool) -> Result<()> {
    let max_words = max_words.unwrap_or(config.ingestion.max_words);
    let chunker = WordChunker::new(max_words).context("Invalid --max-words")?;

    let document = Document::from_file(0, file).context("Failed to read document")?;

    println!(
        "{}: {} words -> {} chunks of at most {} words",
        file.display(),
        document.word_count(),
        chunker.count(&document.content),
        max_words
    );

    if show {
        for (idx, chunk) in chunker.chunk(&document.content).iter().enumerate() {
            println!(
                "  {:>4}. ({} words) {}",
                idx + 1,
                chunk.split(' ').count(),
                Validator::truncate_text(chunk, 80)
            );
        }
    }

    Ok(())
}

async fn cmd_upload(config: &Config, colored: bool, strategy: Strategy) -> Result<()> {
    let start_time = Instant::now();
    let documents = load_documents(config)?;
    let orchestrator = build_orchestrator(config, colored)?;

    match strategy {
        Strategy::SplitAvg => {
            let uploaded = orchestrator
                .upload_split_avg(&documents)
                .await
                .context("split_avg upload failed")?;
            info!("Uploaded {} documents", uploaded);
        }
        Strategy::Chunked => {
            let stats = orchestrator
                .upload_chunked(&documents)
                .await
                .context("Chunked upload failed")?;
            info!(
                "Uploaded {} chunks ({} failed) into {} groups",
                stats.chunks_uploaded,
                stats.chunks_failed,
                documents.len()
            );
        }
    }

    info!("Upload complete in {:.2}s", start_time.elapsed().as_secs_f64());
    Ok(())
}

async fn cmd_delete(config: &Config, colored: bool) -> Result<()> {
    let documents = load_documents(config)?;
    let deleted = build_orchestrator(config, colored)?
        .delete_documents(&documents)
        .await
        .context("Delete failed")?;

    println!(
        "{}",
        format_success(&format!("Deleted {} of {} bills", deleted, documents.len()))
    );
    Ok(())
}

async fn cmd_events(config: &Config, page: u32) -> Result<()> {
    let client = build_client(config)?;
    let events = client
        .get_events(page)
        .await
        .context("Failed to fetch events")?;

    println!("{}", serde_json::to_string_pretty(&events)?);
    Ok(())
}
