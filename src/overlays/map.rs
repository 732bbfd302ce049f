use crate::foundation::core::Rgba8;
use crate::foundation::error::{AnimatorError, AnimatorResult};
use crate::geo::projection::{tile_x_to_x, tile_y_to_y, x_to_tile_x, y_to_tile_y};
use crate::render::overlay::{Metadata, Overlay};
use crate::render::surface::Surface;
use crate::tiles::cache::TileCache;
use crate::tiles::fetch::TileFetcher;
use crate::tiles::url::TileUrlTemplate;

pub const MAP_ORDER: i32 = -1000;

/// Tiled background map, drawn once into the base canvas and veiled with the background color.
pub struct MapOverlay<F> {
    cache: TileCache<F>,
    template: TileUrlTemplate,
    visibility: f64,
    background: Rgba8,
    metadata: Option<Metadata>,
}

impl<F: TileFetcher> MapOverlay<F> {
    pub fn new(
        cache: TileCache<F>,
        template: TileUrlTemplate,
        visibility: f64,
        background: Rgba8,
    ) -> Self {
        Self {
            cache,
            template,
            visibility: visibility.clamp(0.0, 1.0),
            background,
            metadata: None,
        }
    }
}

impl<F: TileFetcher> Overlay for MapOverlay<F> {
    fn name(&self) -> &'static str {
        "map"
    }

    fn order(&self) -> i32 {
        MAP_ORDER
    }

    fn on_metadata(&mut self, metadata: &Metadata) -> AnimatorResult<()> {
        self.metadata = Some(*metadata);
        Ok(())
    }

    #[tracing::instrument(skip_all, fields(template = self.template.as_str()))]
    fn render_background(&mut self, canvas: &mut Surface) -> AnimatorResult<()> {
        let md = self
            .metadata
            .ok_or_else(|| AnimatorError::validation("map overlay used before metadata"))?;
        let zoom = md
            .zoom
            .ok_or_else(|| AnimatorError::validation("background map requires a zoom level"))?;
        let tiles_per_axis = 1i64 << zoom;

        let (tx0, tx1) = (x_to_tile_x(md.min_x, zoom), x_to_tile_x(md.max_x, zoom));
        let (ty0, ty1) = (y_to_tile_y(md.max_y, zoom), y_to_tile_y(md.min_y, zoom));
        let mut drawn = 0u32;
        for ty in ty0..=ty1 {
            if !(0..tiles_per_axis).contains(&ty) {
                continue;
            }
            for tx in tx0..=tx1 {
                let url = self.template.expand(
                    zoom,
                    tx.rem_euclid(tiles_per_axis) as u32,
                    ty as u32,
                );
                let tile = self.cache.get_tile(&url)?;
                let px = ((tile_x_to_x(tx, zoom) - md.min_x) * md.scale).round() as i32;
                let py = ((md.max_y - tile_y_to_y(ty, zoom)) * md.scale).round() as i32;
                canvas.draw_image(px, py, &tile)?;
                drawn += 1;
            }
        }

        let veil = ((1.0 - self.visibility) * 255.0).round() as u8;
        canvas.fill(self.background.with_alpha(veil));
        tracing::info!(tiles = drawn, zoom, "background map drawn");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlays/map.rs"]
mod tests;
