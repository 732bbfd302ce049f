use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::Context as _;
use chrono::DateTime;

use crate::foundation::error::{AnimatorError, AnimatorResult};

/// Geographic track point as read from the log, before projection.
#[derive(Clone, Debug, PartialEq)]
pub struct RawPoint {
    pub lat: f64,
    pub lon: f64,
    /// Epoch milliseconds.
    pub time_ms: Option<i64>,
    /// Speed in km/h when the log records it.
    pub speed_kmh: Option<f64>,
}

impl RawPoint {
    pub fn new(lat: f64, lon: f64, time_ms: Option<i64>) -> Self {
        Self {
            lat,
            lon,
            time_ms,
            speed_kmh: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RawWaypoint {
    pub lat: f64,
    pub lon: f64,
    pub time_ms: Option<i64>,
    pub name: String,
}

/// All segments and waypoints read from one input.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawTrack {
    /// Human-readable origin (usually the file path).
    pub source: String,
    pub segments: Vec<Vec<RawPoint>>,
    pub waypoints: Vec<RawWaypoint>,
}

/// Read a GPX file from disk.
#[tracing::instrument]
pub fn read_gpx_file(path: &Path) -> AnimatorResult<RawTrack> {
    let f = File::open(path).with_context(|| format!("open gpx '{}'", path.display()))?;
    parse_gpx(BufReader::new(f), &path.display().to_string())
}

/// Parse GPX from any reader. Segments of all `<trk>` elements are flattened in document order.
pub fn parse_gpx(reader: impl BufRead, source: &str) -> AnimatorResult<RawTrack> {
    let doc = gpx::read(reader)
        .map_err(|e| AnimatorError::input(format!("failed to parse '{source}': {e}")))?;

    let mut out = RawTrack {
        source: source.to_owned(),
        ..RawTrack::default()
    };

    for track in doc.tracks {
        for segment in track.segments {
            let mut points = Vec::with_capacity(segment.points.len());
            for wpt in segment.points {
                let geo = wpt.point();
                points.push(RawPoint {
                    lat: geo.y(),
                    lon: geo.x(),
                    time_ms: time_to_epoch_ms(wpt.time, source)?,
                    // GPX 1.0 stores m/s.
                    speed_kmh: wpt.speed.map(|mps| mps * 3.6),
                });
            }
            if !points.is_empty() {
                out.segments.push(points);
            }
        }
    }

    for wpt in doc.waypoints {
        let geo = wpt.point();
        out.waypoints.push(RawWaypoint {
            lat: geo.y(),
            lon: geo.x(),
            time_ms: time_to_epoch_ms(wpt.time, source)?,
            name: wpt.name.unwrap_or_default(),
        });
    }

    tracing::debug!(
        source,
        segments = out.segments.len(),
        waypoints = out.waypoints.len(),
        "parsed gpx"
    );
    Ok(out)
}

fn time_to_epoch_ms(time: Option<gpx::Time>, source: &str) -> AnimatorResult<Option<i64>> {
    let Some(time) = time else {
        return Ok(None);
    };
    let iso = time
        .format()
        .map_err(|e| AnimatorError::input(format!("bad timestamp in '{source}': {e}")))?;
    let parsed = DateTime::parse_from_rfc3339(&iso)
        .map_err(|e| AnimatorError::input(format!("bad timestamp '{iso}' in '{source}': {e}")))?;
    Ok(Some(parsed.timestamp_millis()))
}

#[cfg(test)]
#[path = "../../tests/unit/input/gpx.rs"]
mod tests;
