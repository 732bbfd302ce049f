use chrono::DateTime;

use crate::foundation::core::{FrameIndex, Point, Rgba8};
use crate::foundation::error::AnimatorResult;
use crate::render::overlay::Overlay;
use crate::render::paint::Marker;
use crate::render::surface::Surface;
use crate::render::text::{Anchor, TextRenderer};

pub const INFORMATION_ORDER: i32 = 120;

/// Current date/time and marker speed in the bottom-right corner.
#[derive(Debug)]
pub struct InformationOverlay {
    renderer: TextRenderer,
}

impl InformationOverlay {
    pub fn new(renderer: TextRenderer) -> Self {
        Self { renderer }
    }
}

/// `2024-05-01 10:00:00` (UTC), followed by the speed of `marker` when it is known.
pub fn information_text(time: i64, marker: Option<&Marker>) -> String {
    let mut text = DateTime::from_timestamp_millis(time)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default();
    if let Some(speed) = marker.and_then(|m| m.speed) {
        text.push_str(&format!("\n{speed:.1} km/h"));
    }
    text
}

impl Overlay for InformationOverlay {
    fn name(&self) -> &'static str {
        "information"
    }

    fn order(&self) -> i32 {
        INFORMATION_ORDER
    }

    fn render_frame(
        &mut self,
        _frame: FrameIndex,
        time: i64,
        marker: Option<&Marker>,
        canvas: &mut Surface,
    ) -> AnimatorResult<()> {
        let text = information_text(time, marker);
        let extra_lines = text.lines().count().saturating_sub(1) as f64;
        let at = Point::new(
            f64::from(canvas.width()) - 5.0,
            f64::from(canvas.height()) - 5.0 - extra_lines * self.renderer.line_height(),
        );
        self.renderer.draw(
            canvas,
            &text,
            at,
            Anchor::End,
            Rgba8::BLACK,
            Some(Rgba8::WHITE),
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlays/information.rs"]
mod tests;
