//! Submission conversion pipeline.
//!
//! Extraction, HTML normalization, flattening and reflow, followed by writing
//! the text and (optionally) the extracted tables and images.
//!
//! # Example
//!
//! ```no_run
//! use unedgar::convert::{convert_file, ConvertOptions};
//! use unedgar::render::RawAssetWriter;
//!
//! fn main() -> unedgar::Result<()> {
//!     let options = ConvertOptions::new().with_assets(true);
//!     let outcome = convert_file(
//!         "example.form10k_0001558370-23-003469.txt",
//!         "example.form10k.parsed_0001558370-23-003469.txt",
//!         &options,
//!         &RawAssetWriter,
//!     )?;
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;

use crate::detect::read_submission;
use crate::error::{Error, Result};
use crate::model::Submission;
use crate::output::write_content;
use crate::parser::{normalize_html, prepare_html, DocumentExtractor, ParseOptions, TextFlattener};
use crate::render::{
    render_assets, AssetRenderOptions, AssetRenderer, ExtractionStats, ParsedFiling, ReflowOptions,
    ReflowPipeline,
};

/// Options for converting submissions.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Extraction and normalization options
    pub parse: ParseOptions,

    /// Reflow options
    pub reflow: ReflowOptions,

    /// Replace existing outputs instead of skipping them
    pub overwrite: bool,

    /// Write extracted tables and images next to the text
    pub render_assets: bool,

    /// Asset directory; defaults to the input path without its extension
    pub asset_dir: Option<PathBuf>,

    /// Options passed to the asset renderer
    pub asset_options: AssetRenderOptions,

    /// Process batches in parallel
    pub parallel: bool,
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set parse options.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse = options;
        self
    }

    /// Set reflow options.
    pub fn with_reflow_options(mut self, options: ReflowOptions) -> Self {
        self.reflow = options;
        self
    }

    /// Replace existing outputs.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Enable or disable asset rendering.
    pub fn with_assets(mut self, render: bool) -> Self {
        self.render_assets = render;
        self
    }

    /// Set the asset directory.
    pub fn with_asset_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.asset_dir = Some(dir.into());
        self
    }

    /// Set asset renderer options.
    pub fn with_asset_options(mut self, options: AssetRenderOptions) -> Self {
        self.asset_options = options;
        self
    }

    /// Disable parallel batch processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            parse: ParseOptions::default(),
            reflow: ReflowOptions::default(),
            overwrite: false,
            render_assets: false,
            asset_dir: None,
            asset_options: AssetRenderOptions::default(),
            parallel: true,
        }
    }
}

/// What [`convert_file`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertOutcome {
    /// Text written to `path`, plus any rendered assets
    Written {
        /// Output text file
        path: PathBuf,
        /// Asset files written
        assets: Vec<PathBuf>,
        /// Extraction statistics
        stats: ExtractionStats,
    },
    /// The output already existed and overwrite was off
    Skipped(PathBuf),
}

impl ConvertOutcome {
    /// Whether the conversion was skipped.
    pub fn is_skipped(&self) -> bool {
        matches!(self, ConvertOutcome::Skipped(_))
    }

    /// The output path.
    pub fn path(&self) -> &Path {
        match self {
            ConvertOutcome::Written { path, .. } | ConvertOutcome::Skipped(path) => path,
        }
    }
}

/// Convert raw submission text into a [`ParsedFiling`].
pub fn parse_str(raw: &str, parse: &ParseOptions, reflow: &ReflowOptions) -> Result<ParsedFiling> {
    let submission = Submission::new(raw);
    let metadata = submission.metadata();
    let mut stats = ExtractionStats::new();

    let content = DocumentExtractor::new(submission.raw())
        .extract(&parse.target, false)?
        .into_text()
        .ok_or_else(|| Error::Other(format!("{} is not a text document", parse.target)))?;
    let html = prepare_html(&content, parse.fold_ascii);

    let t = Instant::now();
    let normalized = normalize_html(&html, submission.raw(), parse)?;
    stats.record_normalized(&normalized);
    log::info!("HTML normalize: {:.3}s", t.elapsed().as_secs_f64());

    let t = Instant::now();
    let stream = TextFlattener::new()
        .with_ascii_folding(parse.fold_ascii)
        .flatten_html(&normalized.html);
    stats.record_lines(&stream);
    log::info!("HTML flatten: {:.3}s ({} lines)", t.elapsed().as_secs_f64(), stream.len());

    let t = Instant::now();
    let text = ReflowPipeline::new(reflow.clone()).process(&stream.to_text());
    stats.count_text(&text);
    log::info!("Text reflow: {:.3}s", t.elapsed().as_secs_f64());

    Ok(ParsedFiling::new(
        text,
        metadata,
        normalized.tables,
        normalized.images,
        stats,
    ))
}

/// Read and convert a submission file.
pub fn parse_file<P: AsRef<Path>>(path: P, parse: &ParseOptions, reflow: &ReflowOptions) -> Result<ParsedFiling> {
    let path = path.as_ref();
    log::info!("Parsing submission {}", path.display());
    let raw = read_submission(path)?;
    parse_str(&raw, parse, reflow)
}

/// Convert `input` and write the text to `output`.
///
/// Skips the whole conversion when `output` exists and overwrite is off.
pub fn convert_file<P, Q>(input: P, output: Q, options: &ConvertOptions, renderer: &dyn AssetRenderer) -> Result<ConvertOutcome>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let input = input.as_ref();
    let output = output.as_ref();

    if !options.overwrite && output.exists() {
        log::warn!("{} already exists. Skipping", output.display());
        return Ok(ConvertOutcome::Skipped(output.to_path_buf()));
    }

    let filing = parse_file(input, &options.parse, &options.reflow)?;
    write_content(&filing.text, output)?;

    let assets = if options.render_assets {
        let t = Instant::now();
        let dir = options
            .asset_dir
            .clone()
            .unwrap_or_else(|| default_asset_dir(input));
        let written = render_assets(
            &filing.tables,
            &filing.images,
            &dir,
            renderer,
            &options.asset_options,
        )?;
        log::info!("Render tables and images: {:.3}s", t.elapsed().as_secs_f64());
        written
    } else {
        Vec::new()
    };

    Ok(ConvertOutcome::Written {
        path: output.to_path_buf(),
        assets,
        stats: filing.stats,
    })
}

/// Result of one submission in a batch.
#[derive(Debug)]
pub struct BatchItem {
    /// The input submission
    pub input: PathBuf,
    /// Its conversion outcome
    pub result: Result<ConvertOutcome>,
}

/// Convert many submissions. Failures are recorded per submission and the
/// batch carries on.
///
/// Outputs go to `output_dir` when given, otherwise next to each input.
/// An input whose output path was already claimed by an earlier input is
/// reported as an error and not converted.
pub fn convert_batch(
    inputs: &[PathBuf],
    output_dir: Option<&Path>,
    options: &ConvertOptions,
    renderer: &dyn AssetRenderer,
) -> Vec<BatchItem> {
    let mut claimed = HashSet::new();
    let planned: Vec<(PathBuf, Option<PathBuf>)> = inputs
        .iter()
        .map(|input| {
            let output = batch_output_path(input, output_dir);
            if claimed.insert(output.clone()) {
                (input.clone(), Some(output))
            } else {
                (input.clone(), None)
            }
        })
        .collect();

    let convert_one = |(input, output): &(PathBuf, Option<PathBuf>)| {
        let result = match output {
            Some(output) => convert_file(input, output, options, renderer),
            None => Err(Error::Other(format!(
                "output {} collides with another input",
                batch_output_path(input, output_dir).display()
            ))),
        };
        if let Err(e) = &result {
            log::error!("Failed to convert {}: {}", input.display(), e);
        }
        BatchItem {
            input: input.clone(),
            result,
        }
    };

    let items: Vec<BatchItem> = if options.parallel {
        planned.par_iter().map(convert_one).collect()
    } else {
        planned.iter().map(convert_one).collect()
    };

    let failed = items.iter().filter(|item| item.result.is_err()).count();
    let totals = batch_stats(&items);
    log::info!(
        "Batch finished: {} converted, {} failed ({} words, {} tables, {} images)",
        items.len() - failed,
        failed,
        totals.word_count,
        totals.table_count,
        totals.image_count
    );
    items
}

/// Combined statistics of every submission written in a batch.
pub fn batch_stats(items: &[BatchItem]) -> ExtractionStats {
    let mut totals = ExtractionStats::new();
    for item in items {
        if let Ok(ConvertOutcome::Written { stats, .. }) = &item.result {
            totals.merge(stats);
        }
    }
    totals
}

/// Default output path for a submission.
///
/// `form10k` in the file name becomes `form10k.parsed`; other names get a
/// `.parsed.txt` suffix in place of their extension.
pub fn default_output_path<P: AsRef<Path>>(input: P) -> PathBuf {
    let input = input.as_ref();
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if name.contains("form10k") {
        return input.with_file_name(name.replacen("form10k", "form10k.parsed", 1));
    }

    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{}.parsed.txt", stem))
}

/// Default asset directory: the input path without its extension.
pub fn default_asset_dir<P: AsRef<Path>>(input: P) -> PathBuf {
    input.as_ref().with_extension("")
}

fn batch_output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let output = default_output_path(input);
    match (output_dir, output.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => output,
    }
}
