use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("failed to create cache directory: {0}")]
    CacheDir(#[source] std::io::Error),
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to write model to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not determine cache directory")]
    NoCacheDir,
}

/// Progress callback: `(bytes_downloaded, total_bytes)`.
/// `total_bytes` is 0 if the server didn't provide Content-Length.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send>;

/// Resolve the pose model file by name, checking cache locations before
/// downloading.
///
/// Resolution order:
/// 1. User cache directory (platform-specific)
/// 2. Bundled path (for development / pre-packaged installs)
/// 3. Download from URL to cache
pub fn resolve(
    name: &str,
    url: &str,
    bundled_dir: Option<&Path>,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    let cache_dir = model_cache_dir()?;
    let cached_path = cache_dir.join(name);
    if cached_path.exists() {
        return Ok(cached_path);
    }

    if let Some(dir) = bundled_dir {
        let bundled_path = dir.join(name);
        if bundled_path.exists() {
            return Ok(bundled_path);
        }
    }

    fs::create_dir_all(&cache_dir).map_err(ModelResolveError::CacheDir)?;
    download(url, &cached_path, progress)?;
    Ok(cached_path)
}

/// Platform-specific model cache directory.
pub fn model_cache_dir() -> Result<PathBuf, ModelResolveError> {
    dirs::cache_dir()
        .map(|d| d.join("SlouchGuard").join("models"))
        .ok_or(ModelResolveError::NoCacheDir)
}

fn download(url: &str, dest: &Path, progress: Option<ProgressFn>) -> Result<(), ModelResolveError> {
    let mut response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(|source| ModelResolveError::Download {
            url: url.to_string(),
            source,
        })?;

    let total = response.content_length().unwrap_or(0);

    // Download to a temporary name first so an interrupted transfer never
    // leaves a partial file at the cached path.
    let partial = dest.with_extension("partial");
    let mut file = fs::File::create(&partial).map_err(|source| ModelResolveError::Write {
        path: partial.clone(),
        source,
    })?;

    let mut downloaded = 0u64;
    let mut buf = [0u8; 64 * 1024];
    loop {
        let read = std::io::Read::read(&mut response, &mut buf).map_err(|source| {
            ModelResolveError::Write {
                path: partial.clone(),
                source,
            }
        })?;
        if read == 0 {
            break;
        }
        file.write_all(&buf[..read])
            .map_err(|source| ModelResolveError::Write {
                path: partial.clone(),
                source,
            })?;
        downloaded += read as u64;
        if let Some(cb) = &progress {
            cb(downloaded, total);
        }
    }
    drop(file);

    fs::rename(&partial, dest).map_err(|source| ModelResolveError::Write {
        path: dest.to_path_buf(),
        source,
    })?;
    Ok(())
}
