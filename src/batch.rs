//! Batch processing over a directory of page files.
//!
//! Input pages are named `page-NNNN.txt` (1-based, zero-padded to four digits).
//! Pages are processed independently, in parallel when enabled, and collected in
//! page order. A page that cannot be read is recorded as a [`PageFailure`] and
//! never aborts the batch.

use crate::classify::PageType;
use crate::config::BookConfig;
use crate::error::{Error, Result};
use crate::options::{MissingPagePolicy, PipelineOptions};
use crate::record::{assemble, PageRecord};
use rayon::prelude::*;
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::LazyLock;

static RE_PAGE_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^page-(\d{4,})\.txt$").unwrap());

/// Subdirectory of the output directory that holds per-page records.
pub const PAGES_DIR: &str = "pages";

/// File name of the manifest in the output directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Input file name of a page.
pub fn page_file_name(page: u32) -> String {
    format!("page-{page:04}.txt")
}

/// Output file name of a page record.
pub fn record_file_name(page: u32) -> String {
    format!("page-{page:04}.json")
}

/// A page whose input could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageFailure {
    pub page: u32,
    pub message: String,
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Records in ascending page order.
    pub records: Vec<PageRecord>,
    /// Pages whose input failed to load.
    pub failures: Vec<PageFailure>,
    /// Missing pages left out under [`MissingPagePolicy::Skip`].
    pub skipped: Vec<u32>,
}

impl BatchReport {
    /// Returns true if every page was read.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Lists the page numbers present in `input_dir`, ascending.
pub fn discover_pages(input_dir: impl AsRef<Path>) -> Result<Vec<u32>> {
    let mut pages = Vec::new();

    for entry in fs::read_dir(input_dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let Some(caps) = RE_PAGE_FILE.captures(name) else {
            continue;
        };
        // Over-padded names would not be found again by `page_file_name`
        match caps[1].parse::<u32>() {
            Ok(page) if page > 0 && page_file_name(page) == name => pages.push(page),
            _ => tracing::debug!(file = name, "ignoring non-canonical page file name"),
        }
    }

    pages.sort_unstable();
    pages.dedup();
    Ok(pages)
}

/// Pages to process: `1..=totalPages` when the book declares a page count,
/// otherwise whatever is present in `input_dir`.
pub fn planned_pages(input_dir: impl AsRef<Path>, config: &BookConfig) -> Result<Vec<u32>> {
    match config.total_pages() {
        Some(total) => Ok((1..=total).collect()),
        None => discover_pages(input_dir),
    }
}

/// Reads and assembles a single page file.
///
/// Returns `Ok(None)` when the file does not exist. Invalid UTF-8 is replaced
/// and then dropped by the text normalizer.
pub fn process_page_file(
    path: impl AsRef<Path>,
    page: u32,
    config: &BookConfig,
    options: &PipelineOptions,
) -> Result<Option<PageRecord>> {
    let bytes = match fs::read(path.as_ref()) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => return Err(Error::PageRead { page, source }),
    };
    let raw = String::from_utf8_lossy(&bytes);
    Ok(Some(assemble(page, &raw, config, options)))
}

/// Outcome of one page inside a batch.
enum PageOutcome {
    Record(PageRecord),
    Missing(u32),
    Failed(PageFailure),
}

fn process_one(
    input_dir: &Path,
    page: u32,
    config: &BookConfig,
    options: &PipelineOptions,
) -> PageOutcome {
    let path = input_dir.join(page_file_name(page));
    match process_page_file(&path, page, config, options) {
        Ok(Some(record)) => PageOutcome::Record(record),
        Ok(None) => match options.missing_pages {
            MissingPagePolicy::Skip => PageOutcome::Missing(page),
            MissingPagePolicy::EmitEmpty => PageOutcome::Record(PageRecord::missing(page)),
        },
        Err(err) => {
            tracing::warn!(page, path = %path.display(), error = %err, "page failed");
            PageOutcome::Failed(PageFailure {
                page,
                message: err.to_string(),
            })
        }
    }
}

/// Processes `pages` from `input_dir`.
pub fn run_batch(
    input_dir: impl AsRef<Path>,
    pages: &[u32],
    config: &BookConfig,
    options: &PipelineOptions,
) -> BatchReport {
    run_batch_with_progress(input_dir, pages, config, options, &|| {})
}

/// Processes `pages` from `input_dir`, calling `on_page` after each page.
pub fn run_batch_with_progress(
    input_dir: impl AsRef<Path>,
    pages: &[u32],
    config: &BookConfig,
    options: &PipelineOptions,
    on_page: &(dyn Fn() + Sync),
) -> BatchReport {
    let input_dir = input_dir.as_ref();
    let work = |page: &u32| {
        let outcome = process_one(input_dir, *page, config, options);
        on_page();
        outcome
    };

    // Both iterators preserve input order
    let outcomes: Vec<PageOutcome> = if options.parallel {
        pages.par_iter().map(work).collect()
    } else {
        pages.iter().map(work).collect()
    };

    let mut report = BatchReport::default();
    for outcome in outcomes {
        match outcome {
            PageOutcome::Record(record) => report.records.push(record),
            PageOutcome::Missing(page) => report.skipped.push(page),
            PageOutcome::Failed(failure) => report.failures.push(failure),
        }
    }
    report.records.sort_by_key(PageRecord::page_number);

    tracing::info!(
        records = report.records.len(),
        skipped = report.skipped.len(),
        failures = report.failures.len(),
        "batch finished"
    );
    report
}

/// One manifest entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub page: u32,
    pub title: String,
    #[serde(rename = "type")]
    pub page_type: PageType,
    pub has_content: bool,
}

/// Index of every emitted page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub title: String,
    pub authors: Vec<String>,
    pub total_pages: u32,
    pub pages: Vec<ManifestEntry>,
}

impl Manifest {
    /// Builds the manifest for `records` (expected in page order).
    pub fn new(records: &[PageRecord], config: &BookConfig) -> Self {
        let highest = records.last().map_or(0, PageRecord::page_number);
        Self {
            title: config.title().to_string(),
            authors: config.authors().to_vec(),
            total_pages: config.total_pages().unwrap_or(highest),
            pages: records
                .iter()
                .map(|record| ManifestEntry {
                    page: record.page_number(),
                    title: record.title().to_string(),
                    page_type: record.page_type(),
                    has_content: record.has_content(),
                })
                .collect(),
        }
    }
}

/// Writes `pages/page-NNNN.json` per record and `manifest.json` into `out_dir`.
///
/// Output is pretty JSON with a trailing newline; writing the same report twice
/// produces identical files.
pub fn write_outputs(
    report: &BatchReport,
    config: &BookConfig,
    out_dir: impl AsRef<Path>,
) -> Result<Manifest> {
    let out_dir = out_dir.as_ref();
    let pages_dir = out_dir.join(PAGES_DIR);
    fs::create_dir_all(&pages_dir)?;

    for record in &report.records {
        let path = pages_dir.join(record_file_name(record.page_number()));
        write_json(&path, record)?;
    }

    let manifest = Manifest::new(&report.records, config);
    write_json(&out_dir.join(MANIFEST_FILE), &manifest)?;

    tracing::info!(
        dir = %out_dir.display(),
        pages = report.records.len(),
        "wrote page records"
    );
    Ok(manifest)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    fs::write(path, json)?;
    Ok(())
}
