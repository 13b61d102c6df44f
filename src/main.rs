//! ESLint Muter CLI - Command-line interface for bulk ESLint suppression
//!
//! CDD Principle: Application Layer - CLI coordinates user interactions with domain services
//! - Translates flags and the options file into one MuterConfig
//! - Handles external concerns like process exit codes and terminal output
//! - Leaves discovery, linting and annotation to the library

use clap::{Parser, ValueEnum};
use eslint_muter::{
    BatchReport, Muter, MuterConfig, MuterResult, OptionsFile, OutputFormat, ReportOptions,
    SummaryFormatter,
};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// ESLint Muter - disable every failing ESLint rule per file
#[derive(Parser)]
#[command(name = "eslint-muter")]
#[command(version)]
#[command(about = "Prepend eslint-disable comments for every rule a file currently violates")]
#[command(long_about = "ESLint Muter lints each matching file with the project's own ESLint and prepends a comment header disabling every violated rule, so a codebase can adopt a stricter configuration and fix violations later.")]
struct Cli {
    /// Directory to search for files
    directory: PathBuf,

    /// Glob pattern for files to lint, relative to the directory [default: **/*.js]
    #[arg(short, long)]
    pattern: Option<String>,

    /// Maximum number of files processed at once [default: 10]
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Text of the comment placed above the suppressions [default: "TODO: Fix later."]
    #[arg(short = 'x', long)]
    prefix: Option<String>,

    /// Options file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Lint and report without modifying any file
    #[arg(long)]
    dry_run: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    format: OutputFormatArg,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

#[derive(Copy, Clone, ValueEnum, PartialEq)]
enum OutputFormatArg {
    Human,
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Human => OutputFormat::Human,
            OutputFormatArg::Json => OutputFormat::Json,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let formatter = SummaryFormatter::new(ReportOptions {
        use_colors: !cli.no_color,
        dry_run: cli.dry_run,
        project_root: std::env::current_dir().ok(),
    });
    let format = cli.format.into();

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", formatter.format_error(&e));
            process::exit(1);
        }
    };

    // Initialize logging once the options file has been merged in
    init_logging(LogSettings::new(&config, format));

    match run(config).await {
        Ok(report) => process::exit(print_report(&formatter, &report, format)),
        Err(e) => {
            eprintln!("{}", formatter.format_error(&e));
            process::exit(1);
        }
    }
}

/// Locate ESLint and run one batch
async fn run(config: MuterConfig) -> MuterResult<BatchReport> {
    tracing::debug!("Configuration: {:?}", config);

    let muter = Muter::from_config(config).await?;
    muter.run().await
}

fn build_config(cli: &Cli) -> MuterResult<MuterConfig> {
    let mut builder = MuterConfig::builder(&cli.directory);

    // Options file first so explicit flags win
    if let Some(path) = &cli.config {
        builder = builder.options_file(OptionsFile::load_from_file(path)?);
    } else if let Some((path, options)) = OptionsFile::discover(std::env::current_dir()?)? {
        tracing::debug!("Using options file {}", path.display());
        builder = builder.options_file(options);
    }

    if let Some(pattern) = &cli.pattern {
        builder = builder.pattern(pattern);
    }
    if let Some(concurrency) = cli.concurrency {
        builder = builder.concurrency(concurrency);
    }
    if let Some(prefix) = &cli.prefix {
        builder = builder.comment_prefix(prefix);
    }
    if cli.verbose {
        builder = builder.verbose(true);
    }

    builder.dry_run(cli.dry_run).build()
}

/// Print the report and return the process exit code
fn print_report(formatter: &SummaryFormatter, report: &BatchReport, format: OutputFormat) -> i32 {
    for line in formatter.format_failures(report) {
        eprintln!("{}", line);
    }

    match formatter.format_report(report, format) {
        Ok(formatted) => println!("{}", formatted),
        Err(e) => {
            eprintln!("{}", formatter.format_error(&e));
            return 1;
        }
    }

    tracing::debug!("Finished in {:.2}s", report.elapsed.as_secs_f64());

    if report.has_failures() {
        1
    } else {
        0
    }
}

/// Where and how much the subscriber logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LogSettings {
    level: tracing::Level,
    /// JSON reports own stdout, so logs go to stderr
    to_stderr: bool,
}

impl LogSettings {
    fn new(config: &MuterConfig, format: OutputFormat) -> Self {
        let level = if config.verbose() {
            tracing::Level::DEBUG
        } else if config.dry_run() {
            tracing::Level::INFO
        } else {
            tracing::Level::WARN
        };

        Self {
            level,
            to_stderr: format == OutputFormat::Json,
        }
    }
}

fn init_logging(settings: LogSettings) {
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(settings.level.into())
        .from_env_lossy();

    let writer = if settings.to_stderr {
        BoxMakeWriter::new(std::io::stderr)
    } else {
        BoxMakeWriter::new(std::io::stdout)
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(writer)
        .init();
}
