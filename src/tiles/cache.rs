use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::Context as _;
use sha2::Digest as _;

use crate::foundation::error::{AnimatorError, AnimatorResult};
use crate::tiles::fetch::TileFetcher;

/// Map tiles with an optional on-disk cache in front of a [`TileFetcher`].
///
/// Cache entries are named after the SHA-256 of the tile URL. Cache problems (unreadable or stale
/// entries, an unwritable directory) are logged and never fail a lookup. A failed fetch is
/// returned as is, without retrying; fetched bytes are only stored once they decode.
#[derive(Debug)]
pub struct TileCache<F> {
    fetcher: F,
    dir: Option<PathBuf>,
    ttl: Option<Duration>,
}

impl<F: TileFetcher> TileCache<F> {
    pub fn new(fetcher: F, dir: Option<PathBuf>, ttl: Option<Duration>) -> Self {
        Self { fetcher, dir, ttl }
    }

    /// Cache file used for `url` (whether or not it exists yet).
    pub fn entry_path(&self, url: &str) -> Option<PathBuf> {
        self.dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.png", sha256_hex(url.as_bytes()))))
    }

    pub fn get_tile(&self, url: &str) -> AnimatorResult<image::RgbaImage> {
        let path = self.entry_path(url);
        if let Some(path) = &path
            && let Some(tile) = self.lookup(url, path)
        {
            return Ok(tile);
        }

        // Fetch failures are final; only cache problems are healed.
        let bytes = self.fetch_bytes(url)?;
        let tile = decode(url, &bytes)?;
        if let Some(path) = &path {
            store(path, &bytes);
        }
        Ok(tile)
    }

    /// Cached tile for `url`, dropping expired or unreadable entries on the way.
    fn lookup(&self, url: &str, path: &Path) -> Option<image::RgbaImage> {
        if let Some(ttl) = self.ttl
            && is_older_than(path, ttl)
        {
            tracing::debug!(path = %path.display(), "tile cache entry expired");
            remove_entry(path);
        }

        if !path.exists() {
            tracing::debug!(url, "tile cache miss");
            return None;
        }
        match read_entry(path) {
            Ok(tile) => {
                tracing::debug!(url, "tile cache hit");
                Some(tile)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "dropping unreadable tile");
                remove_entry(path);
                None
            }
        }
    }

    fn fetch_bytes(&self, url: &str) -> AnimatorResult<Vec<u8>> {
        let bytes = self.fetcher.fetch(url)?;
        if bytes.is_empty() {
            return Err(AnimatorError::tile_fetch(url, "empty response"));
        }
        Ok(bytes)
    }
}

fn decode(url: &str, bytes: &[u8]) -> AnimatorResult<image::RgbaImage> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgba8())
        .map_err(|e| AnimatorError::tile_fetch(url, format!("undecodable tile: {e}")))
}

fn store(path: &Path, bytes: &[u8]) {
    let written = match path.parent() {
        Some(dir) => std::fs::create_dir_all(dir)
            .with_context(|| format!("create tile cache dir '{}'", dir.display())),
        None => Ok(()),
    }
    .and_then(|()| {
        std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))
    });
    if let Err(e) = written {
        tracing::warn!(path = %path.display(), error = %e, "failed to store tile in cache");
    }
}

fn read_entry(path: &Path) -> anyhow::Result<image::RgbaImage> {
    let bytes = std::fs::read(path).with_context(|| format!("read '{}'", path.display()))?;
    let img = image::load_from_memory(&bytes)
        .with_context(|| format!("decode '{}'", path.display()))?;
    Ok(img.to_rgba8())
}

fn is_older_than(path: &Path, ttl: Duration) -> bool {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|mtime| SystemTime::now().duration_since(mtime).ok())
        .is_some_and(|age| age > ttl)
}

fn remove_entry(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        tracing::warn!(path = %path.display(), error = %e, "failed to delete tile cache entry");
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/tiles/cache.rs"]
mod tests;
