//! Content writer.

use std::fs;
use std::path::Path;

use crate::error::Result;

/// Write text to `path`, creating parent directories as needed.
pub fn write_content<P: AsRef<Path>>(text: &str, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, text)?;
    log::info!("Wrote {} ({} bytes)", path.display(), text.len());
    Ok(())
}
