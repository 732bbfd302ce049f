use crate::foundation::core::{FrameIndex, Point, Rgba8};
use crate::foundation::error::AnimatorResult;
use crate::render::overlay::Overlay;
use crate::render::paint::Marker;
use crate::render::surface::Surface;
use crate::render::text::{Anchor, TextRenderer};

pub const ATTRIBUTION_ORDER: i32 = 100;

/// Default credit line, shown when a background map is used and no attribution is configured.
pub const DEFAULT_MAP_ATTRIBUTION: &str = "Map data \u{a9} OpenStreetMap contributors";

/// Credit text in the bottom-left corner of every frame.
#[derive(Debug)]
pub struct AttributionOverlay {
    text: String,
    renderer: TextRenderer,
}

impl AttributionOverlay {
    pub fn new(text: impl Into<String>, renderer: TextRenderer) -> Self {
        Self {
            text: text.into(),
            renderer,
        }
    }

    /// Baseline of the first line so that the last line sits `margin` above the bottom edge.
    pub(crate) fn anchor(&self, height: u32, margin: f64) -> Point {
        let extra_lines = self.text.lines().count().saturating_sub(1) as f64;
        Point::new(
            margin,
            f64::from(height) - margin - extra_lines * self.renderer.line_height(),
        )
    }
}

impl Overlay for AttributionOverlay {
    fn name(&self) -> &'static str {
        "attribution"
    }

    fn order(&self) -> i32 {
        ATTRIBUTION_ORDER
    }

    fn render_frame(
        &mut self,
        _frame: FrameIndex,
        _time: i64,
        _marker: Option<&Marker>,
        canvas: &mut Surface,
    ) -> AnimatorResult<()> {
        let at = self.anchor(canvas.height(), 5.0);
        self.renderer.draw(
            canvas,
            &self.text,
            at,
            Anchor::Start,
            Rgba8::BLACK,
            Some(Rgba8::WHITE),
        )
    }
}
