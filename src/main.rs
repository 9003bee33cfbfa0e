mod discover;
mod error;
mod extract;
mod fetch;
mod pipeline;
mod settings;
mod sink;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use tracing::info;

use discover::CardLink;
use pipeline::{Pipeline, RunStats};
use settings::{OutputFormat, Settings, TrimKind};
use sink::{FileSink, JsonSink, Sink};

const PROBE_URL: &str = "https://www.shenpowang.com/taluopai/jieshi/d23044.html";
const PROBE_TITLE: &str = "塔罗牌愚人（The Fool）";
const PROBE_PREFIX: &str = "_test_output_";

#[derive(Parser)]
#[command(name = "tarot_scraper", about = "Harvest tarot card interpretations into text files or a JSON knowledge base")]
struct Cli {
    /// Settings file (toml/json/yaml); TAROT_* environment variables override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the card links found on the index page
    Links,
    /// Discover every card and save its interpretation
    Run {
        #[command(flatten)]
        overrides: Overrides,
        /// Max cards to harvest (default: all)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Scrape a single detail page into `_test_output_<title>.txt`
    Probe {
        #[arg(long, default_value = PROBE_URL)]
        url: String,
        #[arg(long, default_value = PROBE_TITLE)]
        title: String,
        #[command(flatten)]
        overrides: Overrides,
    },
}

#[derive(Args)]
struct Overrides {
    /// Output format
    #[arg(long, value_enum)]
    output: Option<OutputFormat>,
    /// Boilerplate trim strategy
    #[arg(long, value_enum)]
    trim: Option<TrimKind>,
    /// Pause between detail pages, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,
    /// Folder for per-card text files
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Path of the aggregated JSON file
    #[arg(long)]
    out_file: Option<PathBuf>,
}

impl Overrides {
    fn apply(self, settings: &mut Settings) {
        if let Some(output) = self.output {
            settings.output = output;
        }
        if let Some(trim) = self.trim {
            settings.trim = trim;
        }
        if let Some(ms) = self.delay_ms {
            settings.delay_ms = ms;
        }
        if let Some(dir) = self.out_dir {
            settings.output_dir = dir;
        }
        if let Some(file) = self.out_file {
            settings.output_file = file;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Links => {
            let pipeline = Pipeline::from_settings(&settings)?;
            let links = pipeline.discover().await;
            if links.is_empty() {
                println!("No card links found, exiting.");
                return Ok(());
            }
            for (i, link) in links.iter().enumerate() {
                println!("{:>3} | {:<36} | {}", i + 1, link.title, link.url);
            }
            println!("\n{} cards", links.len());
        }
        Commands::Run { overrides, limit } => {
            overrides.apply(&mut settings);
            info!(?settings, "Starting harvest");

            let pipeline = Pipeline::from_settings(&settings)?.with_progress(!cli.quiet);
            let mut sink = open_sink(&settings, &settings.file_prefix)?;
            let stats = pipeline.run(&mut *sink, limit).await?;

            if stats.discovered == 0 {
                println!("No card links found, exiting.");
                return Ok(());
            }
            print_summary(&stats, &*sink);
        }
        Commands::Probe {
            url,
            title,
            overrides,
        } => {
            overrides.apply(&mut settings);
            let pipeline = Pipeline::from_settings(&settings)?.with_progress(false);
            let mut sink = open_sink(&settings, PROBE_PREFIX)?;

            println!("Probing single page: {}", title);
            let stats = pipeline
                .harvest(vec![CardLink { url, title }], &mut *sink)
                .await?;

            if stats.saved == 1 {
                println!("Probe succeeded, output in {}", sink.location().display());
            } else {
                println!("Probe failed: {}", stats.failures.join("; "));
            }
        }
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }
    Ok(())
}

fn open_sink(settings: &Settings, prefix: &str) -> anyhow::Result<Box<dyn Sink>> {
    let sink: Box<dyn Sink> = match settings.output {
        OutputFormat::Files => Box::new(FileSink::create(&settings.output_dir, prefix)?),
        OutputFormat::Json => Box::new(JsonSink::new(&settings.output_file)),
    };
    Ok(sink)
}

fn print_summary(stats: &RunStats, sink: &dyn Sink) {
    println!(
        "Done: {} cards found ({} saved, {} skipped, {} failed) -> {}",
        stats.discovered,
        stats.saved,
        stats.skipped,
        stats.failed,
        sink.location().display()
    );
    if !stats.failures.is_empty() {
        println!("\n--- Missing ---");
        for f in &stats.failures {
            println!("  {}", f);
        }
    }
}
