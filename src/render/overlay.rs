use crate::foundation::core::{FrameIndex, Fps};
use crate::foundation::error::AnimatorResult;
use crate::render::paint::Marker;
use crate::render::surface::Surface;

/// Immutable facts about one render, handed to every overlay before the first frame.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Metadata {
    pub zoom: Option<u32>,
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub min_time: i64,
    pub max_time: i64,
    pub speedup: f64,
    pub frame_count: u64,
    pub fps: Fps,
    /// Canvas size in pixels.
    pub width: u32,
    pub height: u32,
    /// Pixels per planar unit.
    pub scale: f64,
}

/// Collaborator that draws on the canvas at fixed points of a render.
///
/// Overlays run sorted by [`Overlay::order`]; ties keep registration order.
pub trait Overlay {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Negative orders run before the tracks are drawn (backgrounds), positive ones after.
    fn order(&self) -> i32;

    fn on_metadata(&mut self, _metadata: &Metadata) -> AnimatorResult<()> {
        Ok(())
    }

    /// Draw once into the base canvas before frame 1.
    fn render_background(&mut self, _canvas: &mut Surface) -> AnimatorResult<()> {
        Ok(())
    }

    /// Draw onto the composed frame right before it is handed to the sink.
    fn render_frame(
        &mut self,
        _frame: FrameIndex,
        _time: i64,
        _marker: Option<&Marker>,
        _canvas: &mut Surface,
    ) -> AnimatorResult<()> {
        Ok(())
    }

    /// Frames this overlay appends after the held last frame (reserved in duration mode).
    ///
    /// Appended frames start from the last composed picture and reach
    /// [`Overlay::render_frame`] with indices following the timeline frames.
    fn additional_frame_count(&self) -> u64 {
        0
    }

    fn on_render_finished(&mut self) {}

    fn on_render_cancelled(&mut self) {}
}

/// Ordered list of overlays for one render.
#[derive(Default)]
pub struct OverlayRegistry {
    overlays: Vec<Box<dyn Overlay>>,
}

impl std::fmt::Debug for OverlayRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.overlays.iter().map(|o| (o.name(), o.order())))
            .finish()
    }
}

impl OverlayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert keeping the list sorted by order; equal orders stay in registration order.
    pub fn register(&mut self, overlay: Box<dyn Overlay>) {
        let order = overlay.order();
        let at = self.overlays.partition_point(|o| o.order() <= order);
        self.overlays.insert(at, overlay);
    }

    pub fn with(mut self, overlay: Box<dyn Overlay>) -> Self {
        self.register(overlay);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.overlays.iter().map(|o| o.name()).collect()
    }

    pub fn additional_frame_count(&self) -> u64 {
        self.overlays.iter().map(|o| o.additional_frame_count()).sum()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Overlay>> {
        self.overlays.iter_mut()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/overlay.rs"]
mod tests;
