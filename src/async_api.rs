//! Async API for non-blocking page processing.
//!
//! Enable the `async` feature to use these APIs:
//!
//! ```toml
//! [dependencies]
//! folio = { version = "0.1", features = ["async"] }
//! ```

use crate::batch::{self, BatchReport, Manifest};
use crate::config::BookConfig;
use crate::error::{Error, Result};
use crate::options::PipelineOptions;
use crate::record::{assemble, PageRecord};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

fn join_error(e: tokio::task::JoinError) -> Error {
    Error::Io(io::Error::other(e.to_string()))
}

/// Asynchronously reads and assembles one page file.
///
/// Returns `Ok(None)` when the file does not exist.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> folio::Result<()> {
/// use folio::{BookConfig, PipelineOptions};
///
/// let config = BookConfig::builtin()?;
/// let record = folio::async_api::process_page_file(
///     "pages/page-0595.txt",
///     595,
///     &config,
///     &PipelineOptions::default(),
/// )
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn process_page_file(
    path: impl AsRef<Path>,
    page: u32,
    config: &BookConfig,
    options: &PipelineOptions,
) -> Result<Option<PageRecord>> {
    let bytes = match fs::read(path.as_ref()).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => return Err(Error::PageRead { page, source }),
    };

    // Extraction is CPU-bound, so it runs on the blocking pool
    let config = config.clone();
    let options = options.clone();
    let record = tokio::task::spawn_blocking(move || {
        let raw = String::from_utf8_lossy(&bytes);
        assemble(page, &raw, &config, &options)
    })
    .await
    .map_err(join_error)?;

    Ok(Some(record))
}

/// Asynchronously processes `pages` from `input_dir`.
pub async fn run_batch(
    input_dir: impl Into<PathBuf>,
    pages: Vec<u32>,
    config: &BookConfig,
    options: &PipelineOptions,
) -> Result<BatchReport> {
    let input_dir = input_dir.into();
    let config = config.clone();
    let options = options.clone();
    tokio::task::spawn_blocking(move || batch::run_batch(&input_dir, &pages, &config, &options))
        .await
        .map_err(join_error)
}

/// Async builder for whole-book runs.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> folio::Result<()> {
/// use folio::async_api::AsyncFolio;
///
/// let manifest = AsyncFolio::new()
///     .sequential()
///     .build("pages", "out")
///     .await?;
/// println!("{} pages", manifest.pages.len());
/// # Ok(())
/// # }
/// ```
pub struct AsyncFolio {
    config: BookConfig,
    options: PipelineOptions,
}

impl Default for AsyncFolio {
    fn default() -> Self {
        Self::new()
    }
}

impl AsyncFolio {
    /// Creates a new async builder with an empty book configuration.
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

    /// Disables parallel processing.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    /// Processes a single page file.
    pub async fn page(&self, path: impl AsRef<Path>, page: u32) -> Result<Option<PageRecord>> {
        process_page_file(path, page, &self.config, &self.options).await
    }

    /// Processes every planned page of `input_dir` and writes the outputs.
    pub async fn build(
        self,
        input_dir: impl Into<PathBuf>,
        out_dir: impl Into<PathBuf>,
    ) -> Result<Manifest> {
        let input_dir = input_dir.into();
        let out_dir = out_dir.into();

        tokio::task::spawn_blocking(move || {
            let pages = batch::planned_pages(&input_dir, &self.config)?;
            let report = batch::run_batch(&input_dir, &pages, &self.config, &self.options);
            batch::write_outputs(&report, &self.config, &out_dir)
        })
        .await
        .map_err(join_error)?
    }
}
