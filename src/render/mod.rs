//! Rendering module: reflow, text normalization, results and asset output.

mod assets;
mod json;
pub mod normalize;
mod reflow;
mod result;

pub use assets::{asset_file_name, render_assets, AssetRenderOptions, AssetRenderer, RawAssetWriter, WkhtmlRenderer};
pub use json::{to_json, JsonFormat};
pub use normalize::{fold_ascii, normalize_text, TextNormalizer};
pub use reflow::{reflow, ReflowOptions, ReflowPipeline, ReflowStage};
pub use result::{ExtractionStats, ParsedFiling};
