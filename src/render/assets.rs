//! Writing extracted tables and images to disk.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{Error, Result};
use crate::model::{ImageEntry, TableEntry};

/// Options passed to an [`AssetRenderer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRenderOptions {
    /// Raster quality (0-100)
    pub quality: u8,

    /// Suppress renderer output
    pub quiet: bool,
}

impl AssetRenderOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set raster quality.
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality.min(100);
        self
    }

    /// Enable or disable quiet mode.
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }
}

impl Default for AssetRenderOptions {
    fn default() -> Self {
        Self {
            quality: 90,
            quiet: true,
        }
    }
}

/// Destination for extracted tables and images.
pub trait AssetRenderer: Send + Sync {
    /// File extension of rendered tables.
    fn table_extension(&self) -> &str;

    /// Render raw table markup to `dest`.
    fn render_table(&self, markup: &str, dest: &Path, options: &AssetRenderOptions) -> Result<()>;

    /// Write decoded image bytes to `dest`.
    fn render_image(&self, data: &[u8], dest: &Path, _options: &AssetRenderOptions) -> Result<()> {
        fs::write(dest, data)?;
        Ok(())
    }
}

/// Writes tables as standalone HTML files and images as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawAssetWriter;

impl AssetRenderer for RawAssetWriter {
    fn table_extension(&self) -> &str {
        "html"
    }

    fn render_table(&self, markup: &str, dest: &Path, _options: &AssetRenderOptions) -> Result<()> {
        let page = format!(
            "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"></head><body>\n{}\n</body></html>\n",
            markup
        );
        fs::write(dest, page)?;
        Ok(())
    }
}

/// Rasterises tables with an external `wkhtmltoimage` executable.
#[derive(Debug, Clone)]
pub struct WkhtmlRenderer {
    executable: PathBuf,
}

impl WkhtmlRenderer {
    /// Use `wkhtmltoimage` from `PATH`.
    pub fn new() -> Self {
        Self {
            executable: PathBuf::from("wkhtmltoimage"),
        }
    }

    /// Use a specific executable.
    pub fn with_executable(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }
}

impl Default for WkhtmlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetRenderer for WkhtmlRenderer {
    fn table_extension(&self) -> &str {
        "jpg"
    }

    fn render_table(&self, markup: &str, dest: &Path, options: &AssetRenderOptions) -> Result<()> {
        let mut command = Command::new(&self.executable);
        command.arg("--quality").arg(options.quality.to_string());
        if options.quiet {
            command.arg("--quiet");
        }

        // Markup is fed on stdin
        let mut child = command
            .arg("-")
            .arg(dest)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                Error::Render(format!(
                    "Failed to execute {}: {}",
                    self.executable.display(),
                    e
                ))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(markup.as_bytes()) {
                drop(stdin);
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::Render(format!(
                    "Failed to feed markup to {}: {}",
                    self.executable.display(),
                    e
                )));
            }
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Render(format!(
                "{} failed for {}: {}",
                self.executable.display(),
                dest.display(),
                stderr.trim()
            )));
        }

        Ok(())
    }
}

/// File name for an asset identifier, with path separators flattened.
pub fn asset_file_name(id: &str) -> String {
    id.replace(['/', '\\'], "_")
}

/// Render every table and image into `dir`, sequentially.
///
/// Tables are named `<id>.<ext>`, images by their identifier. The first
/// failure aborts the run.
pub fn render_assets(
    tables: &[TableEntry],
    images: &[ImageEntry],
    dir: &Path,
    renderer: &dyn AssetRenderer,
    options: &AssetRenderOptions,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(tables.len() + images.len());

    for table in tables {
        let dest = dir.join(format!(
            "{}.{}",
            asset_file_name(table.id.as_str()),
            renderer.table_extension()
        ));
        renderer.render_table(&table.markup, &dest, options)?;
        log::debug!("Rendered {} to {}", table.id, dest.display());
        written.push(dest);
    }

    for image in images {
        let dest = dir.join(asset_file_name(image.id.as_str()));
        renderer.render_image(&image.data, &dest, options)?;
        log::debug!("Wrote {} ({} bytes)", dest.display(), image.size());
        written.push(dest);
    }

    log::info!(
        "Rendered {} tables and {} images to {}",
        tables.len(),
        images.len(),
        dir.display()
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PlaceholderId;
    use tempfile::tempdir;

    fn table() -> TableEntry {
        TableEntry {
            id: PlaceholderId::table(1),
            markup: "<table><tr><td>1</td></tr></table>".to_string(),
            row_count: 1,
        }
    }

    fn image(src: &str) -> ImageEntry {
        ImageEntry {
            id: PlaceholderId::image(src),
            src: src.to_string(),
            data: b"Cat".to_vec(),
        }
    }

    #[test]
    fn test_raw_writer() {
        let dir = tempdir().unwrap();
        let written = render_assets(
            &[table()],
            &[image("chart.jpg")],
            dir.path(),
            &RawAssetWriter,
            &AssetRenderOptions::default(),
        )
        .unwrap();

        assert_eq!(written.len(), 2);
        let html = fs::read_to_string(dir.path().join("table_1.html")).unwrap();
        assert!(html.contains("<td>1</td>"));
        assert_eq!(fs::read(dir.path().join("image_chart.jpg")).unwrap(), b"Cat");
    }

    #[test]
    fn test_asset_file_name_flattens_paths() {
        assert_eq!(asset_file_name("image_graphics/logo.jpg"), "image_graphics_logo.jpg");
    }

    #[test]
    fn test_wkhtml_missing_executable() {
        let dir = tempdir().unwrap();
        let renderer = WkhtmlRenderer::with_executable("/nonexistent/wkhtmltoimage");
        let result = render_assets(
            &[table()],
            &[],
            dir.path(),
            &renderer,
            &AssetRenderOptions::default(),
        );
        assert!(matches!(result, Err(Error::Render(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_wkhtml_exits_before_reading_markup() {
        let executable = Path::new("/bin/true");
        if !executable.exists() {
            return;
        }
        let dir = tempdir().unwrap();
        let renderer = WkhtmlRenderer::with_executable(executable);
        let markup = format!("<table>{}</table>", "<tr><td>1</td></tr>".repeat(500_000));

        let result = renderer.render_table(
            &markup,
            &dir.path().join("table_1.jpg"),
            &AssetRenderOptions::default(),
        );
        match result {
            Err(Error::Render(message)) => assert!(message.contains("/bin/true")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_options_builder() {
        let options = AssetRenderOptions::new().with_quality(120).with_quiet(false);
        assert_eq!(options.quality, 100);
        assert!(!options.quiet);
    }
}
