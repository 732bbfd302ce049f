//! Built-in overlays.

pub(crate) mod attribution;
pub(crate) mod comment;
pub(crate) mod information;
pub(crate) mod map;

use std::time::Duration;

use crate::config::Configuration;
use crate::foundation::error::AnimatorResult;
use crate::render::overlay::OverlayRegistry;
use crate::render::text::TextRenderer;
use crate::tiles::cache::TileCache;
use crate::tiles::fetch::{HttpTileFetcher, TileFetcher};
use crate::tiles::url::TileUrlTemplate;

use self::attribution::{AttributionOverlay, DEFAULT_MAP_ATTRIBUTION};
use self::comment::CommentOverlay;
use self::information::InformationOverlay;
use self::map::MapOverlay;

/// Overlays requested by `cfg`, fetching map tiles over HTTP.
pub fn default_overlays(
    cfg: &Configuration,
    text: &TextRenderer,
) -> AnimatorResult<OverlayRegistry> {
    let fetcher: Option<Box<dyn TileFetcher>> = match &cfg.map {
        Some(map) => Some(Box::new(HttpTileFetcher::new(&map.user_agent)?)),
        None => None,
    };
    Ok(overlays_with_fetcher(cfg, text, fetcher))
}

/// Overlays requested by `cfg` with a caller-provided tile source.
pub fn overlays_with_fetcher(
    cfg: &Configuration,
    text: &TextRenderer,
    fetcher: Option<Box<dyn TileFetcher>>,
) -> OverlayRegistry {
    let mut registry = OverlayRegistry::new();

    if let (Some(map), Some(fetcher)) = (&cfg.map, fetcher) {
        let cache = TileCache::new(
            fetcher,
            map.cache_dir.clone(),
            map.cache_ttl_ms.map(Duration::from_millis),
        );
        registry.register(Box::new(MapOverlay::new(
            cache,
            TileUrlTemplate::new(map.tms_url_template.clone()),
            map.visibility,
            cfg.background_color,
        )));
    }

    let attribution = cfg
        .attribution
        .clone()
        .or_else(|| cfg.map.as_ref().map(|_| DEFAULT_MAP_ATTRIBUTION.to_owned()));
    if let Some(attribution) = attribution.filter(|a| !a.trim().is_empty()) {
        registry.register(Box::new(AttributionOverlay::new(attribution, text.clone())));
    }
    if let Some(comment) = cfg.comment.clone().filter(|c| !c.trim().is_empty()) {
        registry.register(Box::new(CommentOverlay::new(comment, text.clone())));
    }
    if cfg.information {
        registry.register(Box::new(InformationOverlay::new(text.clone())));
    }
    registry
}
