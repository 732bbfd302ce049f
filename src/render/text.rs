use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::Context as _;
use resvg::tiny_skia::Transform;

use crate::foundation::core::{Point, Rgba8};
use crate::foundation::error::AnimatorResult;
use crate::render::surface::Surface;

/// Horizontal anchoring of a label relative to its position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anchor {
    Start,
    End,
}

impl Anchor {
    fn as_svg(self) -> &'static str {
        match self {
            Anchor::Start => "start",
            Anchor::End => "end",
        }
    }
}

/// Draws text labels by rendering a tiny SVG document onto a [`Surface`].
///
/// The font database is loaded once and shared by every overlay that draws text.
#[derive(Clone)]
pub struct TextRenderer {
    fontdb: Arc<usvg::fontdb::Database>,
    font_size: f32,
}

impl std::fmt::Debug for TextRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextRenderer")
            .field("faces", &self.fontdb.len())
            .field("font_size", &self.font_size)
            .finish()
    }
}

impl TextRenderer {
    /// Renderer backed by the system fonts.
    pub fn with_system_fonts(font_size: f32) -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        tracing::debug!(faces = db.len(), "loaded system fonts");
        Self::with_fontdb(Arc::new(db), font_size)
    }

    pub fn with_fontdb(fontdb: Arc<usvg::fontdb::Database>, font_size: f32) -> Self {
        Self { fontdb, font_size }
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    /// Height of one text line in pixels.
    pub fn line_height(&self) -> f64 {
        f64::from(self.font_size) * 1.2
    }

    /// Draw `text` with its first baseline at `pos`. Lines are split on `\n`.
    ///
    /// A one pixel halo in `halo` keeps labels readable on busy maps.
    pub fn draw(
        &self,
        surface: &mut Surface,
        text: &str,
        pos: Point,
        anchor: Anchor,
        color: Rgba8,
        halo: Option<Rgba8>,
    ) -> AnimatorResult<()> {
        if text.trim().is_empty() || self.font_size <= 0.0 || color.a == 0 {
            return Ok(());
        }
        let svg = self.svg_document(
            surface.width(),
            surface.height(),
            text,
            pos,
            anchor,
            color,
            halo,
        );
        let opts = usvg::Options {
            fontdb: self.fontdb.clone(),
            ..Default::default()
        };
        let tree = usvg::Tree::from_str(&svg, &opts).context("build label svg")?;
        resvg::render(&tree, Transform::identity(), &mut surface.pixmap_mut().as_mut());
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn svg_document(
        &self,
        width: u32,
        height: u32,
        text: &str,
        pos: Point,
        anchor: Anchor,
        color: Rgba8,
        halo: Option<Rgba8>,
    ) -> String {
        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
        );
        let _ = write!(
            svg,
            r#"<text x="{x:.2}" y="{y:.2}" font-family="sans-serif" font-size="{size}" text-anchor="{anchor}" fill="{fill}" fill-opacity="{fill_opacity:.3}""#,
            x = pos.x,
            y = pos.y,
            size = self.font_size,
            anchor = anchor.as_svg(),
            fill = css_rgb(color),
            fill_opacity = f64::from(color.a) / 255.0,
        );
        if let Some(halo) = halo.filter(|h| h.a > 0) {
            let _ = write!(
                svg,
                r#" stroke="{}" stroke-opacity="{:.3}" stroke-width="2" paint-order="stroke""#,
                css_rgb(halo),
                f64::from(halo.a) / 255.0,
            );
        }
        svg.push('>');
        for (i, line) in text.lines().enumerate() {
            let dy = if i == 0 { 0.0 } else { self.line_height() };
            let _ = write!(
                svg,
                r#"<tspan x="{:.2}" dy="{:.2}">{}</tspan>"#,
                pos.x,
                dy,
                escape_xml(line)
            );
        }
        svg.push_str("</text></svg>");
        svg
    }
}

fn css_rgb(c: Rgba8) -> String {
    format!("#{:02x}{:02x}{:02x}", c.r, c.g, c.b)
}

pub(crate) fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
