use std::f64::consts::PI;

use crate::config::{Configuration, DEFAULT_WIDTH, OutputKind};
use crate::foundation::core::Point;
use crate::foundation::error::{AnimatorError, AnimatorResult};
use crate::geo::projection::MAX_ZOOM;
use crate::timeline::store::Extents;

/// Largest edge length accepted for the canvas.
pub const MAX_CANVAS_DIM: u64 = 32_768;
/// Largest RGBA8 buffer accepted for the canvas.
pub const MAX_CANVAS_BYTES: u64 = i32::MAX as u64;

/// Size-related inputs for [`resolve_geometry`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GeometryRequest {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub zoom: Option<u32>,
    pub margin: u32,
    /// A tile server is configured, so the scale must snap to a map zoom level.
    pub snap_to_zoom: bool,
    pub output_kind: OutputKind,
}

impl GeometryRequest {
    pub fn from_config(cfg: &Configuration) -> Self {
        Self {
            width: cfg.width,
            height: cfg.height,
            zoom: cfg.zoom,
            margin: cfg.margin,
            snap_to_zoom: cfg.map.is_some(),
            output_kind: cfg.output_kind,
        }
    }
}

/// Resolved canvas size, scale and planar bounds.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct CanvasGeometry {
    pub width: u32,
    pub height: u32,
    pub zoom: Option<u32>,
    /// Pixels per planar unit.
    pub scale: f64,
    /// Planar bounds covered by the canvas (margins included).
    pub bounds: Extents,
}

impl CanvasGeometry {
    /// Planar → canvas pixels; canvas `y` grows downwards.
    pub fn to_canvas(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.bounds.min_x) * self.scale,
            (self.bounds.max_y - p.y) * self.scale,
        )
    }
}

fn zoom_for(pixels: f64, margin: f64, extent: f64) -> f64 {
    (PI / 128.0 * (pixels - 2.0 * margin) / extent).log2().floor()
}

/// Resolve zoom, scale, bounds and pixel size from the track extents and user overrides.
pub fn resolve_geometry(
    req: &GeometryRequest,
    extents: Extents,
) -> AnimatorResult<CanvasGeometry> {
    let margin = f64::from(req.margin);
    let width = f64::from(req.width.unwrap_or(DEFAULT_WIDTH));
    let dx = extents.max_x - extents.min_x;
    let dy = extents.max_y - extents.min_y;

    if req.zoom.is_none() && width <= 2.0 * margin {
        return Err(AnimatorError::validation(format!(
            "width {width} must be larger than twice the margin {margin}"
        )));
    }

    let mut zoom = req.zoom;
    if req.snap_to_zoom && zoom.is_none() {
        if !(dx > 0.0) {
            return Err(AnimatorError::validation(
                "tracks have no horizontal extent; set a zoom level explicitly",
            ));
        }
        let mut z = zoom_for(width, margin, dx);
        if let Some(h) = req.height
            && dy > 0.0
        {
            z = z.min(zoom_for(f64::from(h), margin, dy));
        }
        zoom = Some(z.clamp(0.0, f64::from(MAX_ZOOM)) as u32);
    }

    let scale = match zoom {
        Some(z) => 128.0 * f64::from(1u32 << z) / PI,
        None => {
            if !(dx > 0.0) {
                return Err(AnimatorError::validation(
                    "tracks have no horizontal extent; set a zoom level or a longitude range",
                ));
            }
            (width - 2.0 * margin) / dx
        }
    };

    let pad = margin / scale;
    let mut bounds = Extents {
        min_x: extents.min_x - pad,
        max_x: extents.max_x + pad,
        min_y: extents.min_y - pad,
        max_y: extents.max_y + pad,
    };

    if let Some(w) = req.width {
        let extra = (f64::from(w) - (bounds.max_x - bounds.min_x) * scale) / scale / 2.0;
        bounds.min_x -= extra;
        bounds.max_x += extra;
    }
    if let Some(h) = req.height {
        let extra = (f64::from(h) - (bounds.max_y - bounds.min_y) * scale) / scale / 2.0;
        bounds.min_y -= extra;
        bounds.max_y += extra;
    }

    let real_w = ((bounds.max_x - bounds.min_x) * scale).round();
    let real_h = ((bounds.max_y - bounds.min_y) * scale).round();
    let too_large = || AnimatorError::CanvasTooLarge {
        width: if real_w.is_finite() { real_w as u64 } else { u64::MAX },
        height: if real_h.is_finite() { real_h as u64 } else { u64::MAX },
        zoom,
    };
    if !real_w.is_finite() || !real_h.is_finite() {
        return Err(too_large());
    }
    let (mut w, mut h) = ((real_w.max(1.0)) as u64, (real_h.max(1.0)) as u64);
    if w > MAX_CANVAS_DIM
        || h > MAX_CANVAS_DIM
        || w.saturating_mul(h).saturating_mul(4) > MAX_CANVAS_BYTES
    {
        return Err(too_large());
    }

    if req.output_kind == OutputKind::Video {
        if req.width.is_none() && w % 2 == 1 {
            w += 1;
            bounds.max_x += 1.0 / scale;
        }
        if req.height.is_none() && h % 2 == 1 {
            h += 1;
            bounds.min_y -= 1.0 / scale;
        }
    }

    tracing::debug!(width = w, height = h, ?zoom, scale, "canvas geometry resolved");
    Ok(CanvasGeometry {
        width: w as u32,
        height: h as u32,
        zoom,
        scale,
        bounds,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/resolver.rs"]
mod tests;
