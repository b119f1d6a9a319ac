use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use colored::*;
use locsync::detect::DEFAULT_MAX_BATCH_SIZE;
use locsync::po::DEFAULT_WRAP_WIDTH;
use locsync::{
    apply_translations, delete_keys_from_translation_file, run_missing, ApplyRequest, FileFormat,
    MissingQuery, MissingReport, OsFileSystem, SyncConfig, TracingLogger, TranslationPayload,
};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

/// locsync - Find missing translations and write them back without reformatting files
#[derive(Parser, Debug)]
#[command(name = "locsync")]
#[command(author, version, about, long_about = None)]
#[command(help_template = "{name} {version}\n{about}\n\nUSAGE:\n    {usage}\n\n{all-args}")]
struct Cli {
    /// Show debug logging on stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report source keys that target locales lack
    Missing {
        /// Project directory to scan
        #[arg(long, default_value = ".")]
        dir: PathBuf,

        /// Locale of the source files
        #[arg(long, default_value = "en", value_parser = validate_locale_arg)]
        source_locale: String,

        /// Target locales (e.g., "fr,de,pt-BR"); defaults to every locale found
        #[arg(long, value_delimiter = ',', value_parser = validate_locale_arg)]
        locales: Vec<String>,

        /// Globs selecting translation files (replaces the defaults)
        #[arg(long = "include")]
        include: Vec<String>,

        /// Extra globs to skip
        #[arg(long = "exclude")]
        exclude: Vec<String>,

        /// Regex with a `locale` capture group for unusual layouts
        #[arg(long)]
        locale_pattern: Option<String>,

        /// Maximum keys per translation batch
        #[arg(long, default_value_t = DEFAULT_MAX_BATCH_SIZE, value_parser = validate_batch_size)]
        batch_size: usize,

        /// Print the report as JSON, with base64 payloads per batch
        #[arg(long)]
        json: bool,
    },

    /// Write translations from a payload file into a JSON, YAML or PO file
    Apply {
        /// Target translation file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// `{"key": "value"}` or `[{"key", "value", "old_values"}]`; `-` reads stdin
        #[arg(long, value_name = "PAYLOAD")]
        payload: PathBuf,

        /// Locale of the target file
        #[arg(long, value_parser = validate_locale_arg)]
        locale: Option<String>,

        /// Source file giving the shape of a new target (or the PO template)
        #[arg(long)]
        source: Option<PathBuf>,

        #[arg(long, default_value = "en", value_parser = validate_locale_arg)]
        source_locale: String,

        /// Column at which new PO strings wrap
        #[arg(long, default_value_t = DEFAULT_WRAP_WIDTH)]
        wrap_width: usize,
    },

    /// Remove keys from a JSON or YAML file
    Delete {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Dotted keys to remove
        #[arg(required = true, value_name = "KEY")]
        keys: Vec<String>,

        /// Locale wrapping the file content, if any
        #[arg(long, value_parser = validate_locale_arg)]
        locale: Option<String>,
    },
}

/// Accept `xx` or `xx-XX` locale codes
fn validate_locale_arg(s: &str) -> Result<String, String> {
    locsync::config::validate_locale(s)
        .map(|_| s.to_string())
        .map_err(|e| e.to_string())
}

/// Validate that the batch size is between 1 and 10000
fn validate_batch_size(s: &str) -> Result<usize, String> {
    let size: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if !(1..=10_000).contains(&size) {
        return Err(format!("batch size must be between 1 and 10000, got {}", size));
    }

    Ok(size)
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let fs = OsFileSystem;
    let logger = TracingLogger;

    match cli.command {
        Command::Missing {
            dir,
            source_locale,
            locales,
            include,
            exclude,
            locale_pattern,
            batch_size,
            json,
        } => {
            let mut config = SyncConfig::new(source_locale)
                .with_output_locales(locales)
                .with_exclusions(exclude)
                .with_max_batch_size(batch_size);
            if !include.is_empty() {
                config = config.with_includes(include);
            }
            if let Some(pattern) = locale_pattern {
                config = config.with_locale_pattern(pattern);
            }

            let query = MissingQuery::new(&dir, config.clone()).with_verbose(cli.verbose);
            let report = run_missing(&fs, &query, &logger)
                .with_context(|| format!("Failed to scan {}", dir.display()))?;

            if json {
                let rendered = missing_report_json(&report, &config.source_locale)?;
                println!("{}", serde_json::to_string_pretty(&rendered)?);
            } else {
                print_missing_report(&report, &dir);
            }
        }

        Command::Apply {
            file,
            payload,
            locale,
            source,
            source_locale,
            wrap_width,
        } => {
            let payload = read_payload(&payload)?;
            let config = SyncConfig::new(source_locale).with_wrap_width(wrap_width);
            let mut request = ApplyRequest::from_config(&file, &config);
            if let Some(source) = source {
                request = request.with_source(source, config.source_locale.as_str());
            }
            if let Some(locale) = locale {
                request = request.with_locale(locale);
            }

            let outcome = apply_translations(&fs, &request, &payload, &logger)
                .with_context(|| format!("Failed to update {}", file.display()))?;
            let verb = if outcome.created { "Created" } else { "Updated" };
            println!(
                "{} {} ({} keys)",
                verb.green().bold(),
                file.display(),
                outcome.updated_keys.len()
            );
        }

        Command::Delete { file, keys, locale } => {
            if FileFormat::from_path(&file).map(FileFormat::is_gettext).unwrap_or(false) {
                bail!("Deleting keys from PO files is not supported: {}", file.display());
            }
            let deleted = delete_keys_from_translation_file(&fs, &file, &keys, locale.as_deref(), &logger)
                .with_context(|| format!("Failed to delete keys from {}", file.display()))?;

            if deleted.is_empty() {
                println!("No matching keys in {}", file.display());
            } else {
                println!(
                    "{} {} keys from {}",
                    "Deleted".green().bold(),
                    deleted.len(),
                    file.display()
                );
                for key in &deleted {
                    println!("  {}", key.dimmed());
                }
            }
        }
    }

    Ok(())
}

/// Parse a payload file, or stdin for `-`
fn read_payload(path: &Path) -> anyhow::Result<TranslationPayload> {
    let content = if path == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read payload from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read payload {}", path.display()))?
    };
    serde_json::from_str(&content).context("Payload must be a JSON object of key/value pairs or a list of records")
}

fn missing_report_json(report: &MissingReport, source_locale: &str) -> anyhow::Result<serde_json::Value> {
    let mut batches = Vec::new();
    for batch in &report.batches.batches {
        batches.push(serde_json::json!({
            "source_path": batch.source_path,
            "locales": batch.locales,
            "key_count": batch.keys.len(),
            "payload": batch.encode(source_locale)?,
        }));
    }
    Ok(serde_json::json!({
        "source_files": report.source_files,
        "records": report.records,
        "batches": batches,
        "batch_errors": report.batches.errors,
        "discovery_errors": report.discovery_errors,
    }))
}

fn print_missing_report(report: &MissingReport, base_dir: &Path) {
    let display = |path: &Path| locsync::locate::relative_path(base_dir, path);

    if report.source_files.is_empty() {
        println!("No source translation files found in {}", base_dir.display());
        return;
    }

    if report.records.is_empty() {
        println!("{}", "All translations are up to date".green());
    }

    for record in report.records.values() {
        let target = if record.target_exists {
            display(&record.target_path).normal()
        } else {
            format!("{} (new)", display(&record.target_path)).yellow()
        };
        println!(
            "{} {} → {}: {} missing",
            record.locale.bold(),
            display(&record.source_path),
            target,
            record.keys.len()
        );
        for key in record.keys.keys() {
            println!("  {}", key.dimmed());
        }
    }

    for error in &report.discovery_errors {
        println!("{} {}", "Skipped:".red(), display(error.path()));
    }
    for error in &report.batches.errors {
        let locsync::detect::BatchError::MissingSourceFile { path } = error;
        println!("{} no source file {}", "Batch error:".red(), display(path));
    }

    if !report.records.is_empty() {
        println!(
            "\n{} missing across {} file pairs, {} batches",
            report.missing_count().to_string().bold(),
            report.records.len(),
            report.batches.batches.len()
        );
    }
}
