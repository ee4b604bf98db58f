use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use depinspect::{
    config::Config,
    discovery::{find_lock_files, DiscoveryOptions},
    inspect::{analyze_files, collect_remotes, BatchOptions},
    model::Ecosystem,
    output::{print_analyze_result, print_remotes_result, OutputFormat, ReportWriter},
    registry::Registry,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Exit codes for CI integration
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const ERROR: u8 = 1;
    pub const MISMATCHES_FOUND: u8 = 2;
}

#[derive(Parser)]
#[command(name = "depinspect")]
#[command(
    author,
    version,
    about = "Analyze .lock files for dependencies resolved from the wrong remote"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze lock files for dependencies that should come from the registry
    Analyze {
        #[command(flatten)]
        scan: ScanArgs,

        /// Registry file in JSON format (default: registry.json)
        #[arg(long)]
        registry: Option<PathBuf>,

        /// Exit with code 2 if any mismatch is found
        #[arg(long)]
        fail_on_mismatch: bool,
    },

    /// List every remote found in lock files
    Remotes {
        #[command(flatten)]
        scan: ScanArgs,

        /// Only list remotes whose URL contains this text (case-insensitive)
        #[arg(short, long, default_value = "")]
        grep: String,
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

#[derive(Args)]
struct ScanArgs {
    /// A .lock file, or a directory containing .lock files
    #[arg(short, long)]
    path: PathBuf,

    #[command(flatten)]
    ecosystem: EcosystemFlags,

    /// Output format (table, json)
    #[arg(short, long)]
    format: Option<String>,

    /// Directory the report folders are written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Search directories recursively
    #[arg(short, long)]
    recursive: bool,

    /// Print the dependencies parsed from each lock file
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct EcosystemFlags {
    /// Read Ruby Gemfile.lock files
    #[arg(long)]
    ruby: bool,

    /// Read yarn.lock files
    #[arg(long)]
    js: bool,
}

impl EcosystemFlags {
    fn ecosystem(&self) -> Ecosystem {
        if self.ruby {
            Ecosystem::Ruby
        } else {
            Ecosystem::Js
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

fn init_tracing(cli: &Cli) {
    let verbose = match &cli.command {
        Commands::Analyze { scan, .. } | Commands::Remotes { scan, .. } => scan.verbose,
        Commands::Config { .. } => false,
    };
    let default_level = if verbose { "debug" } else { "warn" };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> Result<u8> {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "ignoring unreadable config file");
            Config::default()
        }
    };

    match cli.command {
        Commands::Analyze {
            scan,
            registry,
            fail_on_mismatch,
        } => {
            let registry_path = registry.unwrap_or_else(|| config.registry.clone());
            let fail_on_mismatch = fail_on_mismatch || config.fail_on_mismatch;
            run_analyze(&scan, &registry_path, fail_on_mismatch, &config)
        }
        Commands::Remotes { scan, grep } => run_remotes(&scan, &grep, &config),
        Commands::Config { init, path } => {
            handle_config(init, path)?;
            Ok(exit_codes::SUCCESS)
        }
    }
}

/// Settings resolved from command-line flags and the config file.
struct Resolved {
    files: Vec<PathBuf>,
    format: OutputFormat,
    output_dir: PathBuf,
    batch: BatchOptions,
}

fn resolve(scan: &ScanArgs, config: &Config) -> Result<Resolved> {
    let format_str = scan
        .format
        .clone()
        .unwrap_or_else(|| config.default_format.clone());
    let format = OutputFormat::from_str(&format_str).map_err(|e| anyhow::anyhow!(e))?;

    let discovery = DiscoveryOptions {
        recursive: scan.recursive || config.recursive,
        ignore: config.ignore.clone(),
    };
    let files = find_lock_files(&scan.path, &discovery)
        .with_context(|| format!("Error fetching lock files from {}", scan.path.display()))?;

    if files.is_empty() {
        bail!("No .lock files found in {}", scan.path.display());
    }

    Ok(Resolved {
        files,
        format,
        output_dir: scan
            .output_dir
            .clone()
            .unwrap_or_else(|| config.output_dir.clone()),
        batch: BatchOptions {
            ecosystem: scan.ecosystem.ecosystem(),
            verbose: scan.verbose,
        },
    })
}

fn run_analyze(
    scan: &ScanArgs,
    registry_path: &Path,
    fail_on_mismatch: bool,
    config: &Config,
) -> Result<u8> {
    let resolved = resolve(scan, config)?;

    let registry = Registry::load(registry_path).context("Error building registry")?;
    tracing::info!(registry = %registry, "loaded registry");

    let mut writer = ReportWriter::for_analyze(&resolved.output_dir)?;

    let progress = file_progress(&resolved);
    let result = analyze_files(
        &resolved.files,
        &registry,
        &config.ignore,
        &mut writer,
        resolved.batch,
        |path| advance(&progress, path),
    )?;
    if let Some(pb) = progress {
        pb.finish_with_message(format!("Parsed {} lock files", result.files_scanned));
    }

    print_analyze_result(&result, resolved.format)?;

    if fail_on_mismatch && result.has_mismatches() {
        Ok(exit_codes::MISMATCHES_FOUND)
    } else {
        Ok(exit_codes::SUCCESS)
    }
}

fn run_remotes(scan: &ScanArgs, grep: &str, config: &Config) -> Result<u8> {
    let resolved = resolve(scan, config)?;
    let mut writer = ReportWriter::for_remotes(&resolved.output_dir)?;

    let progress = file_progress(&resolved);
    let mut result = collect_remotes(&resolved.files, grep, resolved.batch, |path| {
        advance(&progress, path)
    });
    if let Some(pb) = progress {
        pb.finish_with_message(format!("Parsed {} lock files", result.files_scanned));
    }

    result.report_path = Some(writer.write_remotes(&result.remotes)?);

    print_remotes_result(&result, resolved.format)?;
    Ok(exit_codes::SUCCESS)
}

/// Progress bar over the lock files, only shown for interactive output.
fn file_progress(resolved: &Resolved) -> Option<ProgressBar> {
    if resolved.format != OutputFormat::Table || resolved.batch.verbose {
        return None;
    }

    let pb = ProgressBar::new(resolved.files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

fn advance(progress: &Option<ProgressBar>, path: &Path) {
    if let Some(pb) = progress {
        pb.set_message(format!("Parsing {}...", path.display()));
        pb.inc(1);
    }
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
        println!("Run 'depinspect config --init' to create one.");
        println!();
        println!("Config path: {}", config_path.display());
    }

    Ok(())
}
