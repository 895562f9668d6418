//! Directory batch processing.
//!
//! Every `*.pdf` in an input directory is extracted independently and saved
//! as `<stem>.json` in the output directory. A failing file is logged and
//! reported; it never stops the run.

use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::options::ExtractOptions;
use crate::render::{write_json, JsonFormat};

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Replace existing output files
    pub overwrite: bool,

    /// Process files on the rayon thread pool
    pub parallel: bool,

    /// Layout of the written JSON
    pub json_format: JsonFormat,

    /// Options passed to every extraction
    pub extract: ExtractOptions,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            overwrite: true,
            parallel: true,
            json_format: JsonFormat::Pretty,
            extract: ExtractOptions::default(),
        }
    }
}

/// What happened to one input file.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    /// Output written to the given path
    Written(PathBuf),
    /// Output already existed and overwriting was disabled
    Skipped(PathBuf),
    /// Extraction or writing failed
    Failed(String),
}

/// One input file and its outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchEntry {
    pub input: PathBuf,
    pub outcome: BatchOutcome,
}

/// Summary of a batch run, entries in input order.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn written(&self) -> usize {
        self.count(|o| matches!(o, BatchOutcome::Written(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, BatchOutcome::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, BatchOutcome::Failed(_)))
    }

    pub fn total(&self) -> usize {
        self.entries.len()
    }

    fn count(&self, pred: impl Fn(&BatchOutcome) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.outcome)).count()
    }
}

/// Process every PDF in `input_dir`, writing JSON into `output_dir`.
pub fn run(input_dir: &Path, output_dir: &Path, options: &BatchOptions) -> Result<BatchReport> {
    run_with_progress(input_dir, output_dir, options, |_| {})
}

/// Like [`run`], calling `on_done` as each file finishes.
///
/// With parallel processing the callback may run on worker threads and in
/// completion order; the returned report is always in input order.
pub fn run_with_progress<F>(
    input_dir: &Path,
    output_dir: &Path,
    options: &BatchOptions,
    on_done: F,
) -> Result<BatchReport>
where
    F: Fn(&BatchEntry) + Sync,
{
    let start = Instant::now();
    options.extract.validate()?;

    let files = collect_pdfs(input_dir)?;
    fs::create_dir_all(output_dir)?;

    if files.is_empty() {
        log::warn!("No PDFs found in {}", input_dir.display());
    } else {
        log::info!("Found {} PDF(s) in {}", files.len(), input_dir.display());
    }

    let process = |input: &PathBuf| {
        let entry = BatchEntry {
            input: input.clone(),
            outcome: process_file(input, output_dir, options),
        };
        on_done(&entry);
        entry
    };

    let entries: Vec<BatchEntry> = if options.parallel {
        files.par_iter().map(process).collect()
    } else {
        files.iter().map(process).collect()
    };

    let report = BatchReport {
        entries,
        elapsed: start.elapsed(),
    };
    log::info!(
        "Batch finished in {:.2}s: {} written, {} skipped, {} failed",
        report.elapsed.as_secs_f64(),
        report.written(),
        report.skipped(),
        report.failed()
    );
    Ok(report)
}

/// PDF files directly inside `dir`, sorted by file name.
pub fn collect_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("input folder not found: {}", dir.display()),
        )));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && has_pdf_extension(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case("pdf"))
}

/// JSON output path for an input file.
pub fn output_path(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    output_dir.join(format!("{}.json", stem))
}

fn process_file(input: &Path, output_dir: &Path, options: &BatchOptions) -> BatchOutcome {
    let out_file = output_path(input, output_dir);
    if out_file.exists() && !options.overwrite {
        log::warn!("Skipping {} (output already exists)", out_file.display());
        return BatchOutcome::Skipped(out_file);
    }

    log::info!("Processing: {}", input.display());
    match write_result(input, &out_file, options) {
        Ok(()) => {
            log::info!("Saved: {}", out_file.display());
            BatchOutcome::Written(out_file)
        }
        Err(e) => {
            log::error!("Failed to process {}: {}", input.display(), e);
            BatchOutcome::Failed(e.to_string())
        }
    }
}

fn write_result(input: &Path, out_file: &Path, options: &BatchOptions) -> Result<()> {
    let result = crate::extract_file(input, &options.extract)?;
    let file = fs::File::create(out_file)
        .map_err(|e| Error::extraction(format!("writing {}", out_file.display()), e))?;
    write_json(&result, BufWriter::new(file), options.json_format)
}
