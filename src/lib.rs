//! # folio
//!
//! Structured page records from noisy per-page textbook text.
//!
//! Each page goes through a text normalizer and a set of independent extractors:
//!
//! - **Structure**: chapter markers, `22.2 Breadth-first search` section headings,
//!   exercise numbering
//! - **Algorithms**: `NAME(params)` headers followed by numbered pseudocode, with
//!   small-caps names such as `H EAP -E XTRACT-M AX` recovered to `HEAP-EXTRACT-MAX`
//! - **Claims**: theorems, lemmas, corollaries and propositions
//! - **Complexity**: deduplicated `O(..)`, `Θ(..)` and `Ω(..)` tokens
//!
//! A fixed-priority classifier assigns the page type, and the record assembler
//! merges everything with the book configuration (override table, vocabulary,
//! chapter titles).
//!
//! ## Quick Start
//!
//! ```
//! use folio::{BookConfig, PageType, PipelineOptions};
//!
//! let text = "22.2 Breadth-first search\nBFS(G, s)\n1 for each vertex u\n2 ...\n";
//! let record = folio::assemble(595, text, &BookConfig::default(), &PipelineOptions::default());
//!
//! assert_eq!(record.section(), Some("22.2"));
//! assert_eq!(record.page_type(), PageType::Content);
//! assert_eq!(record.algorithms()[0].block.name.as_str(), "BFS");
//! ```
//!
//! ## Features
//!
//! - `async`: Async I/O support with Tokio

pub mod algorithm;
pub mod batch;
pub mod claim;
pub mod classify;
pub mod cleanup;
pub mod complexity;
pub mod config;
pub mod error;
pub mod identifier;
pub mod options;
pub mod record;
pub mod structure;

#[cfg(feature = "async")]
pub mod async_api;

// Re-exports
pub use algorithm::{extract_algorithms, AlgorithmBlock, BodyLine};
pub use batch::{BatchReport, Manifest, ManifestEntry, PageFailure};
pub use claim::{extract_claims, Claim, ClaimKind};
pub use classify::{classify, PageType};
pub use cleanup::{normalize_page, PageText};
pub use complexity::{extract_complexity, Bound, ComplexityToken};
pub use config::{BookConfig, BookLayout, PageRange};
pub use error::{Error, Result};
pub use identifier::{normalize_identifier, Identifier, IdentifierOptions};
pub use options::{MissingPagePolicy, PipelineOptions};
pub use record::{assemble, AlgorithmEntry, LabelSource, PageRecord};
pub use structure::{locate, SectionHeading, StructureSignals};

use std::path::Path;

/// Processes every planned page of a directory with default options.
///
/// # Example
///
/// ```no_run
/// use folio::{process_dir, BookConfig};
///
/// let config = BookConfig::builtin()?;
/// let report = process_dir("pages", &config)?;
/// println!("{} records, {} failures", report.records.len(), report.failures.len());
/// # Ok::<(), folio::Error>(())
/// ```
pub fn process_dir(input_dir: impl AsRef<Path>, config: &BookConfig) -> Result<BatchReport> {
    Folio::new().with_config(config.clone()).process(input_dir)
}

/// Builder for whole-book runs.
///
/// Provides a fluent API for configuring the pipeline.
///
/// # Example
///
/// ```no_run
/// use folio::{BookConfig, Folio};
///
/// let manifest = Folio::new()
///     .with_config(BookConfig::builtin()?)
///     .with_identifier_passes(2)
///     .build("pages", "out")?;
/// println!("{} pages", manifest.pages.len());
/// # Ok::<(), folio::Error>(())
/// ```
pub struct Folio {
    config: BookConfig,
    options: PipelineOptions,
}

impl Default for Folio {
    fn default() -> Self {
        Self::new()
    }
}

impl Folio {
    /// Creates a new builder with an empty book configuration.
    pub fn new() -> Self {
        Self {
            config: BookConfig::default(),
            options: PipelineOptions::default(),
        }
    }

    /// Sets the book configuration.
    pub fn with_config(mut self, config: BookConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the pipeline options.
    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Limits identifier recovery to `passes` gap-collapse passes.
    pub fn with_identifier_passes(mut self, passes: usize) -> Self {
        self.options = self.options.with_identifier_passes(passes);
        self
    }

    /// Emits empty records for missing pages.
    pub fn emit_missing(mut self) -> Self {
        self.options = self.options.emit_missing();
        self
    }

    /// Disables parallel processing.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    pub fn config(&self) -> &BookConfig {
        &self.config
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Assembles one page from raw text.
    pub fn page(&self, page_number: u32, raw: &str) -> PageRecord {
        assemble(page_number, raw, &self.config, &self.options)
    }

    /// Processes every planned page of `input_dir`.
    pub fn process(&self, input_dir: impl AsRef<Path>) -> Result<BatchReport> {
        let input_dir = input_dir.as_ref();
        let pages = batch::planned_pages(input_dir, &self.config)?;
        Ok(batch::run_batch(input_dir, &pages, &self.config, &self.options))
    }

    /// Processes `input_dir` and writes records and manifest to `out_dir`.
    pub fn build(&self, input_dir: impl AsRef<Path>, out_dir: impl AsRef<Path>) -> Result<Manifest> {
        let report = self.process(input_dir)?;
        batch::write_outputs(&report, &self.config, out_dir)
    }
}
