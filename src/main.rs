use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{ArgAction, Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use postcap::batch::{read_batch_file, run_concurrent, run_sequential, BatchRun};
use postcap::config::load_config_or_default;
use postcap::extract::DEFAULT_LABEL;
use postcap::output::{
    exit_code_for, print_batch_summary, print_post, write_combined_json, write_combined_text,
    write_failures_file, write_post_to, write_single_post, SaveFormat,
};
use postcap::{Config, PostExtractor};

#[derive(Parser)]
#[command(
    name = "postcap",
    version,
    about = "Extract captions and metadata from social post links"
)]
struct Cli {
    /// Post URL to extract
    url: Option<String>,

    /// Also print the metadata block, not just the caption
    #[arg(short, long, conflicts_with = "batch_file")]
    metadata: bool,

    /// Save the extracted post to a file
    #[arg(long, value_enum, conflicts_with = "batch_file")]
    save: Option<OutputFormat>,

    /// Explicit output path for --save
    #[arg(short, long, requires = "save", conflicts_with = "batch_file")]
    output: Option<PathBuf>,

    /// Process URLs from a batch file instead of a single URL
    #[arg(short, long = "batch-file", conflicts_with = "url")]
    batch_file: Option<PathBuf>,

    /// Seconds to wait between sequential batch requests
    #[arg(short, long, requires = "batch_file")]
    delay: Option<u64>,

    /// Write a combined batch report in this format
    #[arg(short, long = "combined-output", value_enum, requires = "batch_file")]
    combined_output: Option<OutputFormat>,

    /// Use headless-browser workers for the batch
    #[arg(long, requires = "batch_file")]
    browser: bool,

    /// Number of browser workers
    #[arg(long, requires = "browser")]
    workers: Option<usize>,

    /// Run the HTTP extraction API
    #[arg(long, conflicts_with_all = ["url", "batch_file"])]
    serve: bool,

    /// Listen address for --serve
    #[arg(long, requires = "serve")]
    bind: Option<String>,

    /// Path to the configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only print the caption (and errors)
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Txt,
    Json,
}

impl From<OutputFormat> for SaveFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Txt => SaveFormat::Text,
            OutputFormat::Json => SaveFormat::Json,
        }
    }
}

fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("postcap=info,warn"),
            1 => EnvFilter::new("postcap=debug,info"),
            2 => EnvFilter::new("postcap=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            1
        }
    };
    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    debug!("Loading configuration from: {}", cli.config.display());
    let config = load_config_or_default(&cli.config)?;

    if cli.serve {
        return handle_serve(&cli, config).await;
    }
    if cli.batch_file.is_some() {
        return handle_batch(&cli, config).await;
    }
    if let Some(url) = cli.url.clone() {
        return handle_single(&cli, &config, &url).await;
    }

    anyhow::bail!("nothing to do: pass a URL, --batch-file, or --serve (see --help)")
}

async fn handle_single(cli: &Cli, config: &Config, url: &str) -> anyhow::Result<i32> {
    let extractor = PostExtractor::new(config)?;

    let record = match extractor.extract(DEFAULT_LABEL, url).await {
        Ok(record) => record,
        Err(e) => {
            error!("Extraction failed: {}", e);
            return Ok(1);
        }
    };

    if cli.metadata && !cli.quiet {
        print_post(&record);
    } else {
        println!("{}", record.caption_text);
    }

    if let Some(format) = cli.save {
        let saved = match &cli.output {
            Some(path) => {
                write_post_to(&record, path, format.into())?;
                path.clone()
            }
            None => {
                write_single_post(&record, Path::new(&config.output.directory), format.into())?
            }
        };
        info!("Saved to {}", saved.display());
    }

    Ok(0)
}

async fn handle_batch(cli: &Cli, config: Config) -> anyhow::Result<i32> {
    let batch_file = cli
        .batch_file
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("batch mode requires --batch-file"))?;

    let items = read_batch_file(batch_file)?;
    info!("Loaded {} inputs from {}", items.len(), batch_file.display());

    let output_dir = PathBuf::from(&config.output.directory);
    let delay = Duration::from_secs(cli.delay.unwrap_or(config.batch.delay_secs));

    let run = if cli.browser {
        let mut config = config;
        if let Some(workers) = cli.workers {
            config.batch.max_workers = workers;
        }
        run_browser_batch(Arc::new(config), items).await
    } else {
        let extractor = PostExtractor::new(&config)?;
        let extractor_ref = &extractor;
        run_sequential(&items, delay, |item| async move {
            extractor_ref.extract(&item.label, &item.url).await
        })
        .await
    };

    write_batch_artifacts(cli, &run, &output_dir)?;

    if !cli.quiet {
        print_batch_summary(&run);
    }
    Ok(exit_code_for(&run))
}

async fn run_browser_batch(
    config: Arc<Config>,
    items: Vec<postcap::BatchItem>,
) -> BatchRun {
    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, letting in-flight work finish");
            interrupt.cancel();
        }
    });

    run_concurrent(config, items, cancel).await
}

fn write_batch_artifacts(cli: &Cli, run: &BatchRun, output_dir: &Path) -> anyhow::Result<()> {
    if let Some(format) = cli.combined_output {
        let path = match format {
            OutputFormat::Txt => write_combined_text(run, output_dir)?,
            OutputFormat::Json => write_combined_json(run, output_dir)?,
        };
        info!("Combined report written to {}", path.display());
    }

    if let Some(path) = write_failures_file(&run.failures, output_dir)? {
        info!("Failure list written to {}", path.display());
    }

    Ok(())
}

async fn handle_serve(cli: &Cli, mut config: Config) -> anyhow::Result<i32> {
    if let Some(bind) = &cli.bind {
        config.api.bind_address = bind.clone();
    }
    postcap::api::serve(&config).await?;
    Ok(0)
}
