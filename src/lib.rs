//! # unedgar
//!
//! Clean-text extraction from EDGAR 10-K submission files.
//!
//! A full submission is an SGML container of embedded documents. This library
//! picks out the primary 10-K form, moves tables and images into side tables
//! behind placeholders, flattens the HTML into classified lines and reflows
//! them into readable plain text.
//!
//! ## Quick Start
//!
//! ```no_run
//! use unedgar::parse_file;
//!
//! fn main() -> unedgar::Result<()> {
//!     let filing = parse_file("example.form10k_0001558370-23-003469.txt")?;
//!     println!("{}", filing.text);
//!     println!("{} tables extracted", filing.tables.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Document extraction**: primary form or any named attachment, with
//!   uuencoded payloads decoded
//! - **Side tables**: numeric tables and images replaced by stable placeholders
//! - **Reflow**: page breaks, bold headers, broken lines and section headers
//!   repaired into paragraphs
//! - **Asset output**: tables and images written next to the text
//! - **Parallel processing**: Uses Rayon for batch conversion

pub mod convert;
pub mod detect;
pub mod error;
pub mod mda;
pub mod model;
pub mod output;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use convert::{
    batch_stats, convert_batch, convert_file, default_output_path, BatchItem, ConvertOptions,
    ConvertOutcome,
};
pub use detect::{detect_format_from_path, detect_format_from_str, is_submission, SubmissionFormat};
pub use error::{Error, Result};
pub use mda::{extract_mda, parse_mda, MdaLocator, MdaMatch, MdaOutcome};
pub use model::{
    ExtractedDocument, FlatLine, FlatStream, ImageEntry, Metadata, NormalizedDocument,
    PlaceholderId, Submission, TableEntry,
};
pub use output::write_content;
pub use parser::{DocumentTarget, ErrorMode, NoiseRegion, ParseOptions, TableFilter};
pub use render::{
    normalize_text, AssetRenderOptions, AssetRenderer, ExtractionStats, JsonFormat, ParsedFiling,
    RawAssetWriter, ReflowOptions, ReflowStage, WkhtmlRenderer,
};

#[cfg(feature = "async")]
pub use detect::read_submission_async;

use std::path::Path;

/// Parse a submission file into reflowed text and side tables.
///
/// # Arguments
///
/// * `path` - Path to the full submission text file
///
/// # Example
///
/// ```no_run
/// use unedgar::parse_file;
///
/// let filing = parse_file("example.form10k_0001558370-23-003469.txt").unwrap();
/// println!("Words: {}", filing.stats.word_count);
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<ParsedFiling> {
    convert::parse_file(path, &ParseOptions::default(), &ReflowOptions::default())
}

/// Parse a submission file with custom options.
///
/// # Example
///
/// ```no_run
/// use unedgar::{parse_file_with_options, ParseOptions, ReflowOptions};
///
/// let options = ParseOptions::new().lenient().with_images(false);
/// let filing = parse_file_with_options("submission.txt", &options, &ReflowOptions::default()).unwrap();
/// ```
pub fn parse_file_with_options<P: AsRef<Path>>(
    path: P,
    parse: &ParseOptions,
    reflow: &ReflowOptions,
) -> Result<ParsedFiling> {
    convert::parse_file(path, parse, reflow)
}

/// Parse raw submission text.
///
/// # Example
///
/// ```no_run
/// use unedgar::parse_str;
///
/// let raw = std::fs::read_to_string("submission.txt").unwrap();
/// let filing = parse_str(&raw).unwrap();
/// ```
pub fn parse_str(raw: &str) -> Result<ParsedFiling> {
    convert::parse_str(raw, &ParseOptions::default(), &ReflowOptions::default())
}

/// Parse raw submission text with custom options.
pub fn parse_str_with_options(
    raw: &str,
    parse: &ParseOptions,
    reflow: &ReflowOptions,
) -> Result<ParsedFiling> {
    convert::parse_str(raw, parse, reflow)
}

/// Extract one embedded document from a submission file.
///
/// `"10-K"` selects the primary form; any other name selects an attachment
/// by its declared file name.
///
/// # Example
///
/// ```no_run
/// use unedgar::extract_document;
///
/// let logo = extract_document("submission.txt", "logo.jpg", true).unwrap();
/// std::fs::write("logo.jpg", logo.into_bytes()).unwrap();
/// ```
pub fn extract_document<P: AsRef<Path>>(
    path: P,
    name: &str,
    decode_binary: bool,
) -> Result<ExtractedDocument> {
    let raw = detect::read_submission(path)?;
    parser::extract_document(&raw, name, decode_binary)
}

/// Convert a submission file to reflowed plain text.
///
/// # Example
///
/// ```no_run
/// use unedgar::to_text;
///
/// let text = to_text("submission.txt").unwrap();
/// std::fs::write("submission.parsed.txt", text).unwrap();
/// ```
pub fn to_text<P: AsRef<Path>>(path: P) -> Result<String> {
    Ok(parse_file(path)?.text)
}

/// Convert a submission file to JSON (text, metadata, side tables and stats).
///
/// # Example
///
/// ```no_run
/// use unedgar::{to_json, JsonFormat};
///
/// let json = to_json("submission.txt", JsonFormat::Pretty).unwrap();
/// std::fs::write("submission.json", json).unwrap();
/// ```
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let filing = parse_file(path)?;
    render::to_json(&filing, format)
}

/// Builder for parsing submissions.
///
/// # Example
///
/// ```no_run
/// use unedgar::Unedgar;
///
/// let text = Unedgar::new()
///     .lenient()
///     .with_images(false)
///     .parse("submission.txt")?
///     .to_text();
/// # Ok::<(), unedgar::Error>(())
/// ```
pub struct Unedgar {
    parse_options: ParseOptions,
    reflow_options: ReflowOptions,
}

impl Unedgar {
    /// Create a new Unedgar builder.
    pub fn new() -> Self {
        Self {
            parse_options: ParseOptions::default(),
            reflow_options: ReflowOptions::default(),
        }
    }

    /// Enable lenient parsing mode.
    pub fn lenient(mut self) -> Self {
        self.parse_options = self.parse_options.lenient();
        self
    }

    /// Enable image resolution.
    pub fn with_images(mut self, extract: bool) -> Self {
        self.parse_options = self.parse_options.with_images(extract);
        self
    }

    /// Set the table filter.
    pub fn with_table_filter(mut self, filter: TableFilter) -> Self {
        self.parse_options = self.parse_options.with_table_filter(filter);
        self
    }

    /// Add a noise region.
    pub fn with_noise_region(mut self, region: NoiseRegion) -> Self {
        self.parse_options = self.parse_options.with_noise_region(region);
        self
    }

    /// Select the embedded document to convert.
    pub fn with_target(mut self, target: DocumentTarget) -> Self {
        self.parse_options = self.parse_options.with_target(target);
        self
    }

    /// Enable or disable ASCII folding.
    pub fn with_ascii_folding(mut self, fold: bool) -> Self {
        self.parse_options = self.parse_options.with_ascii_folding(fold);
        self
    }

    /// Set reflow options.
    pub fn with_reflow_options(mut self, options: ReflowOptions) -> Self {
        self.reflow_options = options;
        self
    }

    /// Enable or disable a single reflow stage.
    pub fn with_reflow_stage(mut self, stage: ReflowStage, enabled: bool) -> Self {
        self.reflow_options = self.reflow_options.with_stage(stage, enabled);
        self
    }

    /// Parse a submission file and return a result wrapper.
    pub fn parse<P: AsRef<Path>>(self, path: P) -> Result<UnedgarResult> {
        let filing = convert::parse_file(path, &self.parse_options, &self.reflow_options)?;
        Ok(UnedgarResult { filing })
    }

    /// Parse raw submission text.
    pub fn parse_str(self, raw: &str) -> Result<UnedgarResult> {
        let filing = convert::parse_str(raw, &self.parse_options, &self.reflow_options)?;
        Ok(UnedgarResult { filing })
    }
}

impl Default for Unedgar {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of parsing a submission.
pub struct UnedgarResult {
    /// The parsed filing
    pub filing: ParsedFiling,
}

impl UnedgarResult {
    /// Reflowed plain text.
    pub fn to_text(&self) -> String {
        self.filing.text.clone()
    }

    /// Convert to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.filing, format)
    }

    /// Get the filing.
    pub fn filing(&self) -> &ParsedFiling {
        &self.filing
    }

    /// Write tables and images to `dir`.
    pub fn render_assets<P: AsRef<Path>>(
        &self,
        dir: P,
        renderer: &dyn AssetRenderer,
        options: &AssetRenderOptions,
    ) -> Result<Vec<std::path::PathBuf>> {
        render::render_assets(
            &self.filing.tables,
            &self.filing.images,
            dir.as_ref(),
            renderer,
            options,
        )
    }
}
