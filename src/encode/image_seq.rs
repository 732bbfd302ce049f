use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::encode::sink::{FrameSink, SinkConfig, ensure_parent_dir};
use crate::foundation::error::{AnimatorError, AnimatorResult};
use crate::foundation::math::demultiply_rgba8_in_place;
use crate::render::surface::FrameRGBA;

/// Writes every frame as a PNG named after a printf-style pattern such as `frames/%05d.png`.
///
/// Frames are numbered from 1.
#[derive(Debug)]
pub struct ImageSequenceSink {
    pattern: PathBuf,
    next: u64,
    cfg: Option<SinkConfig>,
}

impl ImageSequenceSink {
    pub fn new(pattern: impl Into<PathBuf>) -> Self {
        Self {
            pattern: pattern.into(),
            next: 1,
            cfg: None,
        }
    }

    pub fn frames_written(&self) -> u64 {
        self.next - 1
    }
}

/// Substitute the first `%d` / `%0Nd` in `pattern` with `n`.
pub fn frame_path(pattern: &Path, n: u64) -> AnimatorResult<PathBuf> {
    let s = pattern.to_string_lossy();
    let start = s
        .find('%')
        .ok_or_else(|| AnimatorError::validation(format!("no frame number placeholder in '{s}'")))?;
    let rest = &s[start + 1..];
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    if !rest[digits.len()..].starts_with('d') {
        return Err(AnimatorError::validation(format!(
            "unsupported frame number placeholder in '{s}' (use %d or %05d)"
        )));
    }
    let width: usize = if digits.is_empty() {
        0
    } else {
        digits
            .parse()
            .map_err(|_| AnimatorError::validation(format!("bad placeholder width in '{s}'")))?
    };
    let number = format!("{n:0width$}");
    let end = start + 1 + digits.len() + 1;
    Ok(PathBuf::from(format!("{}{}{}", &s[..start], number, &s[end..])))
}

impl FrameSink for ImageSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> AnimatorResult<()> {
        let first = frame_path(&self.pattern, 1)?;
        ensure_parent_dir(&first)?;
        self.next = 1;
        self.cfg = Some(cfg);
        Ok(())
    }

    fn add_frame(&mut self, frame: &FrameRGBA) -> AnimatorResult<()> {
        if self.cfg.is_none() {
            return Err(AnimatorError::encode("image sequence sink not started"));
        }
        let path = frame_path(&self.pattern, self.next)?;
        let mut data = frame.data.clone();
        if frame.premultiplied {
            demultiply_rgba8_in_place(&mut data);
        }
        image::save_buffer(
            &path,
            &data,
            frame.width,
            frame.height,
            image::ExtendedColorType::Rgba8,
        )
        .with_context(|| format!("write frame '{}'", path.display()))?;
        self.next += 1;
        Ok(())
    }

    fn close(&mut self) -> AnimatorResult<()> {
        if self.cfg.take().is_some() {
            tracing::info!(frames = self.frames_written(), "image sequence written");
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/image_seq.rs"]
mod tests;
