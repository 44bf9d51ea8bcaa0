use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gitlab_fingerprint::{
    config::Config,
    extractor::extract_css_filenames,
    output::{format_result_to_string, print_result, OutputFormat},
    Fingerprinter, HttpFetcher, ScanResult, VersionKnowledgeBase, VersionMatcher,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Exit codes for CI integration
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const ERROR: u8 = 1;
    pub const NOT_IDENTIFIED: u8 = 2;
}

#[derive(Parser)]
#[command(name = "gitlab-fingerprint")]
#[command(
    author,
    version,
    about = "GitLab version detector via CSS hash enumeration"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fingerprint one or more GitLab instances
    Scan {
        /// GitLab URL(s) (e.g. https://gitlab.example.com/users/sign_in)
        #[arg(required = true)]
        urls: Vec<String>,

        /// CSS-to-version knowledge base (JSON file or directory)
        #[arg(long)]
        versions: Option<PathBuf>,

        /// Output format (table, json)
        #[arg(short, long)]
        format: Option<String>,

        /// Request timeout in seconds
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Write output to file in the chosen format
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Fingerprint targets one at a time
        #[arg(long)]
        no_parallel: bool,

        /// Maximum number of targets fetched at once
        #[arg(short, long)]
        concurrency: Option<usize>,

        /// Exit with code 2 if any target could not be identified
        #[arg(long)]
        fail_on_miss: bool,
    },

    /// List CSS candidates found in a local HTML file ("-" for stdin)
    Extract {
        file: PathBuf,
    },

    /// Show or create config file
    Config {
        /// Generate default config file
        #[arg(long)]
        init: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<u8> {
    match cli.command {
        Commands::Scan {
            urls,
            versions,
            format,
            timeout,
            output,
            no_parallel,
            concurrency,
            fail_on_miss,
        } => {
            let mut config = Config::load().context("Failed to load config")?;
            if no_parallel {
                config.parallel = false;
            }
            if let Some(limit) = concurrency {
                config.concurrency = limit;
            }
            let options = ScanOptions {
                knowledge_base: versions.unwrap_or_else(|| config.knowledge_base.clone()),
                format: OutputFormat::from_str(format.as_deref().unwrap_or(&config.default_format))
                    .map_err(|e| anyhow::anyhow!(e))?,
                timeout: Duration::from_secs(timeout.unwrap_or(config.timeout_secs)),
                output,
                concurrency: config.effective_concurrency(),
                fail_on_miss,
            };
            run_scan(&urls, options, &config).await
        }
        Commands::Extract { file } => {
            run_extract(&file)?;
            Ok(exit_codes::SUCCESS)
        }
        Commands::Config { init, path } => {
            handle_config(init, path)?;
            Ok(exit_codes::SUCCESS)
        }
    }
}

struct ScanOptions {
    knowledge_base: PathBuf,
    format: OutputFormat,
    timeout: Duration,
    output: Option<PathBuf>,
    concurrency: usize,
    fail_on_miss: bool,
}

async fn run_scan(urls: &[String], options: ScanOptions, config: &Config) -> Result<u8> {
    let is_interactive = options.format == OutputFormat::Table;

    let kb = VersionKnowledgeBase::load(&options.knowledge_base).with_context(|| {
        format!(
            "Could not load knowledge base (pass --versions or set knowledge_base in {})",
            Config::config_path().display()
        )
    })?;
    info!(entries = kb.len(), "Knowledge base ready");

    let fetcher = HttpFetcher::with_options(options.timeout, &config.user_agent)?;
    let matcher = VersionMatcher::new(&kb).with_linker(config.reference.linker());
    let fingerprinter = Fingerprinter::new(fetcher, matcher);

    let progress = if is_interactive {
        let pb = ProgressBar::new(urls.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} Fingerprinting...")?
                .progress_chars("#>-"),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let reports = fingerprinter
        .fingerprint_all(urls, options.concurrency, |report| {
            debug!(target_url = %report.target, outcome = ?report.outcome(), "Target done");
            if let Some(ref pb) = progress {
                pb.inc(1);
            }
        })
        .await;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let result = ScanResult::new(reports);

    if let Some(path) = options.output {
        let content = format_result_to_string(&result, options.format)?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        if is_interactive {
            println!("Results written to: {}", path.display());
        }
    } else {
        print_result(&result, options.format)?;
    }

    if options.fail_on_miss && !result.all_matched() {
        Ok(exit_codes::NOT_IDENTIFIED)
    } else {
        Ok(exit_codes::SUCCESS)
    }
}

fn run_extract(file: &Path) -> Result<()> {
    let markup = if file.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        buf
    } else {
        std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?
    };

    let filenames = extract_css_filenames(&markup);
    if filenames.is_empty() {
        println!("No target CSS files found.");
        return Ok(());
    }

    for filename in filenames {
        println!("{}", filename);
    }
    Ok(())
}

fn handle_config(init: bool, show_path: bool) -> Result<()> {
    let config_path = Config::config_path();

    if show_path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if init {
        if config_path.exists() {
            println!("Config file already exists at: {}", config_path.display());
            return Ok(());
        }

        let config = Config::default();
        config.save()?;
        println!("Created config file at: {}", config_path.display());
        println!();
        println!("Default configuration:");
        println!("{}", Config::generate_default_config());
        return Ok(());
    }

    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        println!("Config file: {}", config_path.display());
        println!();
        println!("{}", content);
    } else {
        println!("No config file found.");
        println!("Run 'gitlab-fingerprint config --init' to create one.");
        println!();
        println!("Config path: {}", config_path.display());
    }

    Ok(())
}
