use resvg::tiny_skia::{
    self, FillRule, IntRect, IntSize, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint,
    Stroke, Transform,
};

use crate::foundation::core::{Point, Rect, Rgba8};
use crate::foundation::error::{AnimatorError, AnimatorResult};
use crate::foundation::math::{demultiply_rgba8_in_place, premultiply_rgba8_in_place};

/// A rendered frame as RGBA8 pixels.
///
/// Frames produced by [`Surface::to_frame`] are **premultiplied alpha**; the flag makes this
/// explicit at sink boundaries.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Straight-alpha pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        let px = self.data.get(i..i + 4)?;
        let mut px = [px[0], px[1], px[2], px[3]];
        if self.premultiplied {
            demultiply_rgba8_in_place(&mut px);
        }
        Some(Rgba8::new(px[0], px[1], px[2], px[3]))
    }
}

/// RGBA raster all drawing goes through.
#[derive(Clone, Debug, PartialEq)]
pub struct Surface {
    pixmap: Pixmap,
}

fn paint(color: Rgba8) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

impl Surface {
    pub fn new(width: u32, height: u32) -> AnimatorResult<Self> {
        let pixmap = Pixmap::new(width, height).ok_or_else(|| AnimatorError::CanvasTooLarge {
            width: u64::from(width),
            height: u64::from(height),
            zoom: None,
        })?;
        Ok(Self { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Replace every pixel with `color`.
    pub fn clear(&mut self, color: Rgba8) {
        self.pixmap.fill(tiny_skia::Color::from_rgba8(
            color.r, color.g, color.b, color.a,
        ));
    }

    /// Composite `color` over the whole surface.
    pub fn fill(&mut self, color: Rgba8) {
        if color.a == 0 {
            return;
        }
        let Some(rect) =
            tiny_skia::Rect::from_xywh(0.0, 0.0, self.width() as f32, self.height() as f32)
        else {
            return;
        };
        self.pixmap
            .fill_rect(rect, &paint(color), Transform::identity(), None);
    }

    /// Round-capped polyline through `points`.
    pub fn stroke_polyline(&mut self, points: &[Point], color: Rgba8, width: f32) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        if color.a == 0 {
            return;
        }
        let mut pb = PathBuilder::new();
        pb.move_to(first.x as f32, first.y as f32);
        if rest.is_empty() {
            // A lone point still leaves a round dot.
            pb.line_to(first.x as f32, first.y as f32);
        }
        for p in rest {
            pb.line_to(p.x as f32, p.y as f32);
        }
        let Some(path) = pb.finish() else {
            return;
        };
        let stroke = Stroke {
            width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &paint(color), &stroke, Transform::identity(), None);
    }

    pub fn stroke_line(&mut self, from: Point, to: Point, color: Rgba8, width: f32) {
        self.stroke_polyline(&[from, to], color, width);
    }

    pub fn fill_circle(&mut self, center: Point, radius: f32, color: Rgba8) {
        if radius <= 0.0 || color.a == 0 {
            return;
        }
        let Some(path) = PathBuilder::from_circle(center.x as f32, center.y as f32, radius) else {
            return;
        };
        self.pixmap.fill_path(
            &path,
            &paint(color),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }

    /// Draw a straight-alpha image with its top-left corner at `(x, y)`.
    pub fn draw_image(&mut self, x: i32, y: i32, image: &image::RgbaImage) -> AnimatorResult<()> {
        let (w, h) = image.dimensions();
        let size = IntSize::from_wh(w, h)
            .ok_or_else(|| AnimatorError::validation("cannot draw an empty image"))?;
        let mut data = image.as_raw().clone();
        premultiply_rgba8_in_place(&mut data);
        let src = Pixmap::from_vec(data, size)
            .ok_or_else(|| AnimatorError::validation("image buffer does not match its size"))?;
        self.pixmap.draw_pixmap(
            x,
            y,
            src.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
        Ok(())
    }

    /// Copy of the pixels inside `rect` (rounded to whole pixels, clipped to the surface).
    pub fn crop(&self, rect: Rect) -> AnimatorResult<Surface> {
        let x = rect.x0.round() as i32;
        let y = rect.y0.round() as i32;
        let w = rect.width().round().max(1.0) as u32;
        let h = rect.height().round().max(1.0) as u32;
        let area = IntRect::from_xywh(x, y, w, h)
            .ok_or_else(|| AnimatorError::validation(format!("invalid crop rectangle {rect:?}")))?;
        let pixmap = self.pixmap.clone_rect(area).ok_or_else(|| {
            AnimatorError::validation(format!("crop rectangle {rect:?} is outside the canvas"))
        })?;
        Ok(Self { pixmap })
    }

    pub(crate) fn pixmap_mut(&mut self) -> &mut Pixmap {
        &mut self.pixmap
    }

    pub fn to_frame(&self) -> FrameRGBA {
        FrameRGBA {
            width: self.width(),
            height: self.height(),
            data: self.pixmap.data().to_vec(),
            premultiplied: true,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
