//! Render configuration.
//!
//! All durations are milliseconds. Colors are straight-alpha [`Rgba8`].

use std::path::{Path, PathBuf};

use crate::foundation::core::{Fps, Rgba8};
use crate::foundation::error::{AnimatorError, AnimatorResult};

/// Default canvas width when neither a width nor a zoom is configured.
pub const DEFAULT_WIDTH: u32 = 800;

/// Per-track settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TrackConfiguration {
    /// GPX file this track is read from. Also used to name the track in diagnostics.
    pub input: PathBuf,
    /// Text drawn next to the marker.
    pub label: Option<String>,
    pub color: Rgba8,
    pub line_width: f32,
    /// Added to every timestamp of the track (may be negative).
    pub time_offset_ms: i64,
    /// Replace timestamps with `interval, 2*interval, ...` (for logs without time).
    pub forced_point_interval_ms: Option<u64>,
    pub trim_start_ms: u64,
    pub trim_end_ms: u64,
}

impl TrackConfiguration {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            label: None,
            color: Rgba8::new(255, 0, 0, 255),
            line_width: 2.0,
            time_offset_ms: 0,
            forced_point_interval_ms: None,
            trim_start_ms: 0,
            trim_end_ms: 0,
        }
    }

    /// Name used in error messages and logs.
    pub fn display_name(&self) -> String {
        self.input.display().to_string()
    }
}

/// Optional geographic bounds; each side is independent.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BoundsOverride {
    pub min_lat: Option<f64>,
    pub max_lat: Option<f64>,
    pub min_lon: Option<f64>,
    pub max_lon: Option<f64>,
}

/// Moving camera window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ViewportConfiguration {
    pub width: u32,
    pub height: u32,
    /// Number of past marker positions averaged into the camera center.
    pub inertia: u32,
}

/// Tiled background map.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MapConfiguration {
    /// URL template with `{zoom}`, `{x}`, `{y}` and optionally `{switch:a,b,c}`.
    pub tms_url_template: String,
    pub user_agent: String,
    pub cache_dir: Option<PathBuf>,
    pub cache_ttl_ms: Option<u64>,
    /// Opacity of the map in `[0, 1]`; the rest is veiled with the background color.
    pub visibility: f64,
}

impl MapConfiguration {
    pub fn new(tms_url_template: impl Into<String>) -> Self {
        Self {
            tms_url_template: tms_url_template.into(),
            user_agent: concat!("gpx-animator/", env!("CARGO_PKG_VERSION")).to_owned(),
            cache_dir: None,
            cache_ttl_ms: None,
            visibility: 0.5,
        }
    }
}

/// Kind of output the frames go to. Only affects canvas size rounding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum OutputKind {
    #[default]
    Video,
    ImageSequence,
}

impl OutputKind {
    /// Paths with a `%` frame-number placeholder are image sequences, everything else is video.
    pub fn from_path(path: &Path) -> Self {
        if path.to_string_lossy().contains('%') {
            OutputKind::ImageSequence
        } else {
            OutputKind::Video
        }
    }
}

/// Complete render configuration.
///
/// Missing fields fall back to [`Configuration::default`] when deserialized.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub tracks: Vec<TrackConfiguration>,

    pub width: Option<u32>,
    pub height: Option<u32>,
    pub zoom: Option<u32>,
    pub margin: u32,
    pub bounds: BoundsOverride,

    pub fps: Fps,
    /// Real milliseconds per video millisecond. Ignored when `total_time_ms` is set.
    pub speedup: f64,
    /// Target length of the whole output including held frames.
    pub total_time_ms: Option<u64>,
    pub keep_first_frame_ms: u64,
    pub keep_last_frame_ms: u64,

    pub tail_duration_ms: u64,
    pub tail_color: Rgba8,
    /// Keep rendering after the last point until the tail has faded out.
    pub tail_fadeout: bool,

    pub marker_size: f32,
    pub waypoint_size: f32,
    pub font_size: f32,
    pub pre_draw_track: bool,
    pub pre_draw_track_color: Rgba8,
    pub background_color: Rgba8,

    pub skip_idle: bool,
    /// Gaps between consecutive points longer than this count as idle.
    pub idle_gap_ms: u64,
    pub flashback_color: Rgba8,
    pub flashback_duration_ms: Option<u64>,

    pub viewport: Option<ViewportConfiguration>,
    pub map: Option<MapConfiguration>,

    pub attribution: Option<String>,
    pub comment: Option<String>,
    /// Show current date/time and marker speed.
    pub information: bool,

    pub output_kind: OutputKind,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            tracks: Vec::new(),
            width: None,
            height: None,
            zoom: None,
            margin: 20,
            bounds: BoundsOverride::default(),
            fps: Fps::default(),
            speedup: 1000.0,
            total_time_ms: None,
            keep_first_frame_ms: 0,
            keep_last_frame_ms: 0,
            tail_duration_ms: 3_600_000,
            tail_color: Rgba8::new(0, 0, 0, 0),
            tail_fadeout: false,
            marker_size: 8.0,
            waypoint_size: 6.0,
            font_size: 12.0,
            pre_draw_track: false,
            pre_draw_track_color: Rgba8::new(128, 128, 128, 128),
            background_color: Rgba8::WHITE,
            skip_idle: false,
            idle_gap_ms: 60_000,
            flashback_color: Rgba8::WHITE,
            flashback_duration_ms: Some(250),
            viewport: None,
            map: None,
            attribution: None,
            comment: None,
            information: false,
            output_kind: OutputKind::Video,
        }
    }
}

impl Configuration {
    /// Reject values that would make the render meaningless or divide by zero.
    pub fn validate(&self) -> AnimatorResult<()> {
        if self.tracks.is_empty() {
            return Err(AnimatorError::validation("at least one track is required"));
        }
        for track in &self.tracks {
            if !(track.line_width.is_finite() && track.line_width > 0.0) {
                return Err(AnimatorError::validation(format!(
                    "line width of '{}' must be finite and > 0",
                    track.display_name()
                )));
            }
            if track.forced_point_interval_ms == Some(0) {
                return Err(AnimatorError::validation(format!(
                    "forced point interval of '{}' must be > 0",
                    track.display_name()
                )));
            }
        }
        if self.width == Some(0) || self.height == Some(0) {
            return Err(AnimatorError::validation("width and height must be > 0"));
        }
        // Without a zoom the scale is derived from the (default) width.
        let width = match (self.width, self.zoom) {
            (Some(w), _) => Some(w),
            (None, None) => Some(DEFAULT_WIDTH),
            (None, Some(_)) => None,
        };
        if let Some(w) = width
            && u64::from(w) <= 2 * u64::from(self.margin)
        {
            return Err(AnimatorError::validation(format!(
                "width {w} must be larger than twice the margin {}",
                self.margin
            )));
        }
        if let Some(h) = self.height
            && u64::from(h) <= 2 * u64::from(self.margin)
        {
            return Err(AnimatorError::validation(
                "height must be larger than twice the margin",
            ));
        }
        if self.fps.num == 0 || self.fps.den == 0 {
            return Err(AnimatorError::validation("fps must be non-zero"));
        }
        if self.total_time_ms.is_none() && !(self.speedup.is_finite() && self.speedup > 0.0) {
            return Err(AnimatorError::validation("speedup must be finite and > 0"));
        }
        if self.total_time_ms == Some(0) {
            return Err(AnimatorError::validation("total time must be > 0"));
        }
        for (name, size) in [
            ("marker size", self.marker_size),
            ("waypoint size", self.waypoint_size),
            ("font size", self.font_size),
        ] {
            if !(size.is_finite() && size >= 0.0) {
                return Err(AnimatorError::validation(format!(
                    "{name} must be finite and >= 0"
                )));
            }
        }
        if let Some(vp) = self.viewport
            && (vp.width == 0 || vp.height == 0)
        {
            return Err(AnimatorError::validation(
                "viewport width and height must be > 0",
            ));
        }
        if let Some(map) = &self.map {
            if !(0.0..=1.0).contains(&map.visibility) {
                return Err(AnimatorError::validation(
                    "background map visibility must be within [0, 1]",
                ));
            }
            if map.tms_url_template.trim().is_empty() {
                return Err(AnimatorError::validation(
                    "tile server URL template must not be empty",
                ));
            }
        }
        if let Some(zoom) = self.zoom
            && zoom > crate::geo::projection::MAX_ZOOM
        {
            return Err(AnimatorError::validation(format!(
                "zoom must be <= {}",
                crate::geo::projection::MAX_ZOOM
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/mod.rs"]
mod tests;
