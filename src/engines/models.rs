//! Model file cache shared by the engines

use crate::error::PlateError;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Cache directory used when no explicit location is configured
pub fn cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("license-plate-server")
}

/// Ensure `filename` exists in `dir`, downloading it from `url` if needed
pub fn ensure_downloaded(url: &str, dir: &Path, filename: &str) -> Result<PathBuf, PlateError> {
    std::fs::create_dir_all(dir).map_err(|e| {
        PlateError::InitializationError(format!("Failed to create cache directory: {}", e))
    })?;

    let path = dir.join(filename);

    if !path.exists() {
        tracing::info!("Downloading {} (this may take a moment)...", filename);
        download_file(url, &path)?;
        tracing::info!("Downloaded {} to {:?}", filename, path);
    } else {
        tracing::info!("Using cached {} from {:?}", filename, path);
    }

    Ok(path)
}

/// Download a file from URL to path using ureq
fn download_file(url: &str, path: &Path) -> Result<(), PlateError> {
    let response = ureq::get(url)
        .call()
        .map_err(|e| PlateError::InitializationError(format!("Failed to download {}: {}", url, e)))?;

    let buffer = response.into_body().read_to_vec().map_err(|e| {
        PlateError::InitializationError(format!("Failed to read response body: {}", e))
    })?;

    // Write next to the target first so an interrupted download never looks cached
    let partial = path.with_extension("part");
    let mut file = File::create(&partial).map_err(|e| {
        PlateError::InitializationError(format!("Failed to create model file: {}", e))
    })?;

    file.write_all(&buffer)
        .map_err(|e| PlateError::InitializationError(format!("Failed to write model file: {}", e)))?;

    std::fs::rename(&partial, path)
        .map_err(|e| PlateError::InitializationError(format!("Failed to move model file: {}", e)))?;

    Ok(())
}
