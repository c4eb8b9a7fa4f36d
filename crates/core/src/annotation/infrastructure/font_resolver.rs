use std::fs;
use std::path::{Path, PathBuf};

use ab_glyph::FontArc;
use thiserror::Error;

use crate::shared::constants::OVERLAY_FONT_NAME;

#[derive(Error, Debug)]
pub enum FontResolveError {
    #[error("failed to read font at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is not a parseable font")]
    Parse { path: PathBuf },
    #[error("no overlay font found; pass an explicit font path")]
    NotFound,
}

/// Well-known TTF locations probed when no explicit path is given.
#[cfg(target_os = "macos")]
const SYSTEM_FONT_DIRS: &[&str] = &["/Library/Fonts", "/System/Library/Fonts/Supplemental"];

#[cfg(target_os = "windows")]
const SYSTEM_FONT_DIRS: &[&str] = &["C:\\Windows\\Fonts"];

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const SYSTEM_FONT_DIRS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu",
    "/usr/share/fonts/TTF",
    "/usr/share/fonts",
];

/// Resolves and loads the overlay font.
///
/// Resolution order:
/// 1. Explicit path, when given (an unreadable explicit path is an error,
///    not a fallthrough)
/// 2. User cache directory
/// 3. Well-known system font directories
pub fn resolve(explicit: Option<&Path>) -> Result<FontArc, FontResolveError> {
    if let Some(path) = explicit {
        return load(path);
    }

    if let Some(cached) = font_cache_dir().map(|d| d.join(OVERLAY_FONT_NAME)) {
        if cached.exists() {
            return load(&cached);
        }
    }

    for dir in SYSTEM_FONT_DIRS {
        let candidate = Path::new(dir).join(OVERLAY_FONT_NAME);
        if candidate.exists() {
            return load(&candidate);
        }
    }

    Err(FontResolveError::NotFound)
}

/// User cache location for a manually dropped-in font.
pub fn font_cache_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|d| d.join("SlouchGuard").join("fonts"))
}

fn load(path: &Path) -> Result<FontArc, FontResolveError> {
    let bytes = fs::read(path).map_err(|source| FontResolveError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    FontArc::try_from_vec(bytes).map_err(|_| FontResolveError::Parse {
        path: path.to_path_buf(),
    })
}
