mod config;
mod report;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tracing_subscriber::{fmt, EnvFilter};

use hls_core::{
    BuildError, ClassificationMode, Locator, SourceLoader, Summary, TreeBuilder, ValidationReport,
    Validator, ValidatorConfig,
};

use config::AppConfig;
use report::ReportFormat;

const EXIT_FATAL: i32 = 1;
const EXIT_FINDINGS: i32 = 2;

/// HLS playlist compliance validator.
#[derive(Parser)]
#[command(name = "hls-validator", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate one playlist (local path or http(s) URL).
    Check {
        locator: String,

        /// After the first report, keep prompting for locators until `end`.
        #[arg(short, long, default_value_t = false)]
        interactive: bool,

        #[command(flatten)]
        options: CommonArgs,
    },
    /// Validate a playlist file, or every locator listed in a text file.
    Batch {
        file: PathBuf,

        /// Report fetch failures and continue with the next document.
        #[arg(long, default_value_t = false)]
        keep_going: bool,

        /// Write one JSON report per document into this directory.
        #[arg(long)]
        out_dir: Option<PathBuf>,

        #[command(flatten)]
        options: CommonArgs,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Path to TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Report format. Overrides config file.
    #[arg(short, long, value_enum)]
    format: Option<ReportFormat>,

    /// Only URI lines ending in .m3u8 mark a master playlist.
    #[arg(long, default_value_t = false)]
    strict_classification: bool,

    /// Variant playlists fetched concurrently. Overrides config file.
    #[arg(long)]
    concurrency: Option<usize>,

    /// Exit with status 2 when any finding is an error.
    #[arg(long, default_value_t = false)]
    fail_on_error: bool,
}

struct Settings {
    validator: ValidatorConfig,
    format: ReportFormat,
    fail_on_error: bool,
}

impl CommonArgs {
    /// Load the config file (if any), start logging, and apply flag overrides.
    fn into_settings(self) -> Result<Settings, String> {
        let app_config = match self.config {
            Some(ref path) => {
                let c = AppConfig::load(path);
                init_tracing(c.as_ref().map(|c| c.output.log_format.as_str()).unwrap_or("pretty"));
                let c = c?;
                tracing::info!(path = %path.display(), "Loaded config file");
                c
            }
            None => {
                init_tracing("pretty");
                AppConfig::default()
            }
        };

        let mut validator = app_config.to_validator_config();
        if self.strict_classification {
            validator = validator.with_classification(ClassificationMode::Strict);
        }
        if let Some(n) = self.concurrency {
            validator = validator.with_max_concurrent_fetches(n);
        }

        Ok(Settings {
            validator,
            format: self.format.unwrap_or(app_config.output.format),
            fail_on_error: self.fail_on_error,
        })
    }
}

/// Builder and validator shared by every document of one invocation.
struct Session {
    builder: TreeBuilder,
    validator: Validator,
    format: ReportFormat,
}

impl Session {
    fn new(settings: &Settings) -> Result<Self, String> {
        let loader = SourceLoader::from_config(&settings.validator)
            .map_err(|e| format!("Failed to initialise loader: {e}"))?;
        Ok(Self {
            builder: TreeBuilder::new(Arc::new(loader), settings.validator.clone()),
            validator: Validator::default(),
            format: settings.format,
        })
    }

    async fn validate(&self, locator: Locator) -> Result<ValidationReport, BuildError> {
        let spinner = spinner(format!("Fetching {locator}"));
        let result = self.builder.build(locator).await;
        spinner.finish_and_clear();
        let mut node = result?;
        Ok(self.validator.validate(&mut node))
    }

    fn print(&self, report: &ValidationReport) -> Result<(), String> {
        let rendered = report::render(report, self.format)?;
        println!("{rendered}");
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let code = match cli.command {
        Commands::Check {
            locator,
            interactive,
            options,
        } => run_check(locator, interactive, options).await,
        Commands::Batch {
            file,
            keep_going,
            out_dir,
            options,
        } => run_batch(file, keep_going, out_dir, options).await,
    };

    std::process::exit(code);
}

async fn run_check(locator: String, interactive: bool, options: CommonArgs) -> i32 {
    let settings = match options.into_settings() {
        Ok(s) => s,
        Err(e) => return fatal(&e),
    };
    let session = match Session::new(&settings) {
        Ok(s) => s,
        Err(e) => return fatal(&e),
    };

    let mut input = interactive.then(|| BufReader::new(tokio::io::stdin()).lines());
    let mut any_errors = false;
    let mut next = Some(locator);

    while let Some(reference) = next.take() {
        let locator = match Locator::parse(reference.trim()) {
            Ok(l) => l,
            Err(e) => return fatal(&format!("Invalid locator '{reference}': {e}")),
        };
        let report = match session.validate(locator).await {
            Ok(r) => r,
            Err(e) => return fatal(&e.to_string()),
        };
        if let Err(e) = session.print(&report) {
            return fatal(&e);
        }
        any_errors |= report.has_errors();

        if let Some(ref mut input) = input {
            next = match prompt_next(input).await {
                Ok(n) => n,
                Err(e) => return fatal(&format!("Failed to read input: {e}")),
            };
        }
    }

    exit_code(any_errors, settings.fail_on_error)
}

/// Ask for the next locator. `None` once the user types `end` or input closes.
async fn prompt_next(lines: &mut Lines<BufReader<Stdin>>) -> std::io::Result<Option<String>> {
    let mut stdout = tokio::io::stdout();
    loop {
        stdout
            .write_all(b"Enter the next valid URL -or- end: ")
            .await?;
        stdout.flush().await?;
        match lines.next_line().await? {
            None => return Ok(None),
            Some(line) => match line.trim() {
                "" => continue,
                "end" => return Ok(None),
                reference => return Ok(Some(reference.to_string())),
            },
        }
    }
}

async fn run_batch(
    file: PathBuf,
    keep_going: bool,
    out_dir: Option<PathBuf>,
    options: CommonArgs,
) -> i32 {
    let settings = match options.into_settings() {
        Ok(s) => s,
        Err(e) => return fatal(&e),
    };
    let session = match Session::new(&settings) {
        Ok(s) => s,
        Err(e) => return fatal(&e),
    };

    let Some(file_str) = file.to_str() else {
        return fatal(&format!("Batch file path is not valid UTF-8: {}", file.display()));
    };
    let batch_locator = match Locator::parse(file_str) {
        Ok(l) => l,
        Err(e) => return fatal(&e.to_string()),
    };

    let references = if batch_locator.has_playlist_extension() {
        vec![file_str.to_string()]
    } else {
        match tokio::fs::read_to_string(&file).await {
            Ok(content) => batch_entries(&content),
            Err(e) => return fatal(&format!("Failed to read {}: {e}", file.display())),
        }
    };
    tracing::info!(file = %file.display(), documents = references.len(), "Starting batch");

    if let Some(ref dir) = out_dir {
        if let Err(e) = tokio::fs::create_dir_all(dir).await {
            return fatal(&format!("Failed to create {}: {e}", dir.display()));
        }
    }

    let mut total = Summary::default();
    let mut failed = 0usize;
    let mut used_names = HashSet::new();

    for reference in &references {
        let outcome = match Locator::parse(reference) {
            Ok(locator) => session
                .validate(locator.clone())
                .await
                .map(|report| (locator, report))
                .map_err(|e| e.to_string()),
            Err(e) => Err(format!("Invalid locator '{reference}': {e}")),
        };

        let (locator, report) = match outcome {
            Ok(pair) => pair,
            Err(e) if keep_going => {
                eprintln!("{} {e}", style("error:").red().bold());
                failed += 1;
                continue;
            }
            Err(e) => return fatal(&e),
        };

        if let Err(e) = session.print(&report) {
            return fatal(&e);
        }
        if let Some(ref dir) = out_dir {
            let name = unique_report_name(&locator, &mut used_names);
            if let Err(e) = write_report(dir, &name, &report).await {
                return fatal(&e);
            }
        }
        total.merge(report.summary());
    }

    if session.format == ReportFormat::Text {
        println!(
            "{} {} documents, {} failed to load: {}",
            style("batch:").bold(),
            references.len(),
            failed,
            report::format_summary(&total)
        );
    }

    if failed > 0 {
        return EXIT_FATAL;
    }
    exit_code(total.errors > 0, settings.fail_on_error)
}

/// Locators listed one per line. Blank lines and `#` comments are skipped.
fn batch_entries(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// `<stem>.json`, suffixed with a counter when the stem was already used.
fn unique_report_name(locator: &Locator, used: &mut HashSet<String>) -> String {
    let stem = locator.file_stem().unwrap_or_else(|| "report".to_string());
    let mut name = format!("{stem}.json");
    let mut n = 2;
    while !used.insert(name.clone()) {
        name = format!("{stem}-{n}.json");
        n += 1;
    }
    name
}

async fn write_report(dir: &Path, name: &str, report: &ValidationReport) -> Result<(), String> {
    let json = report
        .to_json_pretty()
        .map_err(|e| format!("Failed to serialize report: {e}"))?;
    let path = dir.join(name);
    tokio::fs::write(&path, json)
        .await
        .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
    tracing::info!(path = %path.display(), "Wrote report");
    Ok(())
}

fn spinner(message: String) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

fn exit_code(any_errors: bool, fail_on_error: bool) -> i32 {
    if any_errors && fail_on_error {
        EXIT_FINDINGS
    } else {
        0
    }
}

fn fatal(message: &str) -> i32 {
    eprintln!("{} {message}", style("error:").red().bold());
    EXIT_FATAL
}

fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    match log_format {
        "json" => {
            fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .json()
                .init();
        }
        _ => {
            fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
