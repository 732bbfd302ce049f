use std::path::Path;

use crate::foundation::core::Fps;
use crate::foundation::error::AnimatorResult;
use crate::render::surface::FrameRGBA;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    pub fps: Fps,
}

/// Consumer of composed frames.
///
/// `begin` is called once, then `add_frame` for every output frame in order, then `close`.
/// A cancelled render still closes its sink so that partial output is flushed.
pub trait FrameSink {
    fn begin(&mut self, cfg: SinkConfig) -> AnimatorResult<()>;
    fn add_frame(&mut self, frame: &FrameRGBA) -> AnimatorResult<()>;
    fn close(&mut self) -> AnimatorResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<FrameRGBA>,
    closed: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    pub fn frames(&self) -> &[FrameRGBA] {
        &self.frames
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> AnimatorResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.closed = false;
        Ok(())
    }

    fn add_frame(&mut self, frame: &FrameRGBA) -> AnimatorResult<()> {
        self.frames.push(frame.clone());
        Ok(())
    }

    fn close(&mut self) -> AnimatorResult<()> {
        self.closed = true;
        Ok(())
    }
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> AnimatorResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}
