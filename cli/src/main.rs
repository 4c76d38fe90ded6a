//! folio CLI - textbook page extraction tool
//!
//! A command-line tool for turning per-page textbook text into structured records.

use clap::{Parser, Subcommand};
use colored::*;
use folio::batch::{self, MANIFEST_FILE, PAGES_DIR};
use folio::{normalize_identifier, BookConfig, PipelineOptions};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Structured page records from noisy textbook page text
#[derive(Parser)]
#[command(
    name = "folio",
    version,
    about = "Extract structured records from per-page textbook text",
    long_about = "folio - Structured page records from noisy textbook text.\n\n\
                  Reads page-NNNN.txt files and writes one JSON record per page plus a manifest.\n\n\
                  Usage:\n  \
                  folio build <pages-dir>            Process a directory of pages\n  \
                  folio page <page-file>             Print the record of one page\n  \
                  folio name \"H EAP -E XTRACT-M AX\"  Recover a small-caps algorithm name"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Book configuration file (default: bundled CLRS configuration)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use an empty book configuration (no overrides, vocabulary or page ranges)
    #[arg(long, global = true, conflicts_with = "config")]
    plain: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a directory of page files
    Build {
        /// Directory containing page-NNNN.txt files
        input: PathBuf,

        /// Output directory (default: <input>_records)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit empty records for missing pages instead of skipping them
        #[arg(long)]
        emit_missing: bool,

        /// Process pages one at a time
        #[arg(long)]
        sequential: bool,

        /// Limit small-caps recovery to this many passes
        #[arg(long)]
        passes: Option<usize>,
    },

    /// Extract the record of a single page file
    Page {
        /// Page file path
        input: PathBuf,

        /// Page number (default: taken from a page-NNNN.txt file name)
        #[arg(short = 'n', long)]
        number: Option<u32>,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output compact JSON (no indentation)
        #[arg(long)]
        compact: bool,
    },

    /// Recover canonical algorithm names from corrupted text
    Name {
        /// Corrupted names, e.g. "H EAP -E XTRACT-M AX"
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Show book configuration information
    Info,

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into()))
        .with_writer(io::stderr)
        .init();
}

fn load_config(path: Option<&Path>, plain: bool) -> folio::Result<BookConfig> {
    let config = match (path, plain) {
        (_, true) => BookConfig::default(),
        (Some(path), false) => BookConfig::from_path(path)?,
        (None, false) => BookConfig::builtin()?,
    };
    tracing::debug!(
        title = config.title(),
        overrides = config.overrides().len(),
        vocabulary = config.vocabulary().len(),
        "book configuration loaded"
    );
    Ok(config)
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Build {
            input,
            output,
            emit_missing,
            sequential,
            passes,
        } => {
            let config = load_config(cli.config.as_deref(), cli.plain)?;

            let mut options = PipelineOptions::default();
            if emit_missing {
                options = options.emit_missing();
            }
            if sequential {
                options = options.sequential();
            }
            if let Some(passes) = passes {
                options = options.with_identifier_passes(passes);
            }

            run_build(&input, output.as_ref(), &config, &options)?;
        }

        Commands::Page {
            input,
            number,
            output,
            compact,
        } => {
            let config = load_config(cli.config.as_deref(), cli.plain)?;
            let page = match number.or_else(|| page_number_from_path(&input)) {
                Some(page) => page,
                None => {
                    return Err(format!(
                        "cannot infer page number from {}; pass --number",
                        input.display()
                    )
                    .into())
                }
            };

            let record =
                batch::process_page_file(&input, page, &config, &PipelineOptions::default())?
                    .ok_or_else(|| format!("page file not found: {}", input.display()))?;

            let json = if compact {
                serde_json::to_string(&record)?
            } else {
                serde_json::to_string_pretty(&record)?
            };
            write_output(output.as_ref(), &json)?;

            if let Some(path) = output {
                println!(
                    "{} Page {} ({}): {}",
                    "✓".green().bold(),
                    page,
                    record.page_type(),
                    path.display()
                );
            }
        }

        Commands::Name { names } => {
            let config = load_config(cli.config.as_deref(), cli.plain)?;
            for raw in &names {
                match normalize_identifier(raw) {
                    Some(id) => {
                        let description = config
                            .vocabulary()
                            .describe(&id)
                            .map(|d| format!("  {}", d.dimmed()))
                            .unwrap_or_default();
                        println!("{} {}{}", "✓".green().bold(), id.as_str().bold(), description);
                    }
                    None => {
                        println!("{} {:?} is not an identifier", "✗".red().bold(), raw);
                    }
                }
            }
        }

        Commands::Info => {
            let config = load_config(cli.config.as_deref(), cli.plain)?;
            let layout = config.layout();

            println!("{}", "Book Configuration".cyan().bold());
            println!("{}", "─".repeat(40));
            if !config.title().is_empty() {
                println!("{}: {}", "Title".bold(), config.title());
            }
            if !config.authors().is_empty() {
                println!("{}: {}", "Authors".bold(), config.authors().join(", "));
            }
            if let Some(total) = config.total_pages() {
                println!("{}: {}", "Pages".bold(), total);
            }
            if let Some(range) = layout.front_matter {
                println!("{}: {}-{}", "Front matter".bold(), range.first, range.last);
            }
            if let Some(start) = layout.back_matter_start {
                println!("{}: from page {}", "Back matter".bold(), start);
            }

            println!("\n{}", "Tables".cyan().bold());
            println!("{}", "─".repeat(40));
            println!("{}: {}", "Chapters".bold(), config.chapter_count());
            println!("{}: {}", "Override pages".bold(), config.overrides().len());
            println!("{}: {}", "Known algorithms".bold(), config.vocabulary().len());
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

/// Run the build command - processes a page directory into records and a manifest
fn run_build(
    input: &Path,
    output: Option<&PathBuf>,
    config: &BookConfig,
    options: &PipelineOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = match output {
        Some(p) => p.clone(),
        None => {
            let name = input
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string();
            let parent = input.parent().unwrap_or(Path::new("."));
            parent.join(format!("{}_records", name))
        }
    };

    tracing::debug!(input = %input.display(), output = %output_dir.display(), "starting build");

    let spinner = create_spinner("Scanning pages...");
    let pages = batch::planned_pages(input, config)?;
    spinner.finish_and_clear();
    tracing::info!(pages = pages.len(), "planned pages");

    let pb = create_progress_bar(pages.len() as u64);
    let report = batch::run_batch_with_progress(input, &pages, config, options, &|| pb.inc(1));
    pb.finish_and_clear();

    let spinner = create_spinner("Writing records...");
    let manifest = batch::write_outputs(&report, config, &output_dir)?;
    spinner.finish_and_clear();

    // Print summary
    println!("{}", "Build Complete".green().bold());
    println!("{}", "─".repeat(40));
    println!("{}: {}", "Output".bold(), output_dir.display());
    println!("  {} {}/ ({} files)", "✓".green(), PAGES_DIR, report.records.len());
    println!("  {} {}", "✓".green(), MANIFEST_FILE);

    // Print statistics
    let algorithms: usize = report.records.iter().map(|r| r.algorithms().len()).sum();
    let claims: usize = report.records.iter().map(|r| r.claims().len()).sum();
    let sections = report.records.iter().filter(|r| r.section().is_some()).count();
    println!("\n{}", "Statistics".cyan().bold());
    println!("{}", "─".repeat(40));
    println!("{}: {}", "Pages".bold(), manifest.pages.len());
    println!("{}: {}", "Labeled".bold(), sections);
    println!("{}: {}", "Algorithms".bold(), algorithms);
    println!("{}: {}", "Claims".bold(), claims);
    if !report.skipped.is_empty() {
        println!("{}: {}", "Missing".bold(), report.skipped.len());
    }

    if !report.failures.is_empty() {
        println!("\n{}", "Failures".yellow().bold());
        println!("{}", "─".repeat(40));
        for failure in &report.failures {
            println!("  {} {}", "!".yellow().bold(), failure.message);
        }
    }

    Ok(())
}

/// Parses the page number out of a `page-NNNN.txt` file name.
fn page_number_from_path(path: &Path) -> Option<u32> {
    let stem = path.file_stem()?.to_str()?;
    stem.strip_prefix("page-")?.parse().ok().filter(|page| *page > 0)
}

fn print_version() {
    println!("{} {}", "folio".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Structured page records from noisy textbook text");
    println!();
    println!("Extracts: sections, pseudocode, theorems, asymptotic bounds");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn create_progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.blue} [{bar:40.cyan/blue}] {pos}/{len} pages ({eta})")
            .unwrap()
            .progress_chars("=>-"),
    );
    pb
}

fn write_output(path: Option<&PathBuf>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", content)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_build_args() {
        let cli = Cli::parse_from(["folio", "build", "pages", "--sequential", "--passes", "2", "-vv"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Some(Commands::Build {
                input,
                sequential,
                passes,
                ..
            }) => {
                assert_eq!(input, PathBuf::from("pages"));
                assert!(sequential);
                assert_eq!(passes, Some(2));
            }
            _ => panic!("expected build command"),
        }
    }

    #[test]
    fn test_page_number_from_path() {
        assert_eq!(page_number_from_path(Path::new("in/page-0595.txt")), Some(595));
        assert_eq!(page_number_from_path(Path::new("page-0000.txt")), None);
        assert_eq!(page_number_from_path(Path::new("notes.txt")), None);
    }

    #[test]
    fn test_load_config_plain() {
        let config = load_config(None, true).unwrap();
        assert!(config.overrides().is_empty());
        let builtin = load_config(None, false).unwrap();
        assert!(!builtin.overrides().is_empty());
    }
}
