//! Render GPS track logs into animated videos.
//!
//! A render goes through a fixed set of stages:
//!
//! - Read GPX inputs and merge them into one [`Timeline`]
//! - Resolve canvas size, zoom and frame timing from a [`Configuration`]
//! - Draw frames with a [`RenderPipeline`] into a [`FrameSink`] (ffmpeg, PNG files or memory)
//!
//! Background maps, attribution, comments and the information box are [`Overlay`]s.
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod config;
/// Frame sinks.
pub mod encode;
pub(crate) mod geo;
pub(crate) mod geometry;
pub(crate) mod input;
pub(crate) mod overlays;
pub(crate) mod render;
pub(crate) mod schedule;
pub(crate) mod tiles;
pub(crate) mod timeline;

pub use crate::foundation::core::{FrameIndex, Fps, Point, Rect, Rgba8, Vec2};
pub use crate::foundation::error::{AnimatorError, AnimatorResult};

pub use crate::config::{
    BoundsOverride, Configuration, DEFAULT_WIDTH, MapConfiguration, OutputKind,
    TrackConfiguration, ViewportConfiguration,
};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::image_seq::ImageSequenceSink;
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::geo::projection::{
    MAX_ZOOM, TILE_SIZE, haversine_distance_m, lat_to_tile_y, lat_to_y, lon_to_tile_x, lon_to_x,
    tile_x_to_x, tile_y_to_y, x_to_lon, x_to_tile_x, y_to_lat, y_to_tile_y,
};
pub use crate::geometry::resolver::{
    CanvasGeometry, GeometryRequest, MAX_CANVAS_BYTES, MAX_CANVAS_DIM, resolve_geometry,
};
pub use crate::input::gpx::{RawPoint, RawTrack, RawWaypoint, parse_gpx, read_gpx_file};
pub use crate::overlays::{default_overlays, overlays_with_fetcher};
pub use crate::render::overlay::{Metadata, Overlay, OverlayRegistry};
pub use crate::render::paint::Marker;
pub use crate::render::pipeline::{
    FrameDecision, NoProgress, RenderOutcome, RenderPipeline, RenderProgress, RenderStats,
    read_inputs,
};
pub use crate::render::surface::{FrameRGBA, Surface};
pub use crate::render::text::{Anchor, TextRenderer};
pub use crate::schedule::scheduler::{FrameSchedule, ScheduleRequest, time_for_frame};
pub use crate::tiles::cache::TileCache;
pub use crate::tiles::fetch::{HttpTileFetcher, TileFetcher};
pub use crate::tiles::url::TileUrlTemplate;
pub use crate::timeline::spans::{Span, SpanList, active_runs};
pub use crate::timeline::store::{
    Extents, IdleSettings, NamedPoint, Segment, Timeline, TimelineBuilder, TrackPoint,
    TrackTimeline,
};
