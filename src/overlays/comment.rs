use crate::foundation::core::{FrameIndex, Point, Rgba8};
use crate::foundation::error::AnimatorResult;
use crate::render::overlay::Overlay;
use crate::render::paint::Marker;
use crate::render::surface::Surface;
use crate::render::text::{Anchor, TextRenderer};

pub const COMMENT_ORDER: i32 = 110;

/// Free text in the top-left corner.
#[derive(Debug)]
pub struct CommentOverlay {
    text: String,
    renderer: TextRenderer,
}

impl CommentOverlay {
    pub fn new(text: impl Into<String>, renderer: TextRenderer) -> Self {
        Self {
            text: text.into(),
            renderer,
        }
    }
}

impl Overlay for CommentOverlay {
    fn name(&self) -> &'static str {
        "comment"
    }

    fn order(&self) -> i32 {
        COMMENT_ORDER
    }

    fn render_frame(
        &mut self,
        _frame: FrameIndex,
        _time: i64,
        _marker: Option<&Marker>,
        canvas: &mut Surface,
    ) -> AnimatorResult<()> {
        let at = Point::new(5.0, 5.0 + f64::from(self.renderer.font_size()));
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
