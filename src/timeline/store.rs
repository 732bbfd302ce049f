use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use crate::config::{BoundsOverride, TrackConfiguration};
use crate::foundation::core::Point;
use crate::foundation::error::{AnimatorError, AnimatorResult};
use crate::geo::projection::{haversine_distance_m, lat_to_y, lon_to_x};
use crate::input::gpx::RawTrack;
use crate::timeline::spans::{SpanList, active_runs};

/// Projected track point.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackPoint {
    pub pos: Point,
    /// Epoch milliseconds (after offset).
    pub time: i64,
    /// km/h, recorded or derived from the previous point.
    pub speed: Option<f64>,
}

/// Projected waypoint.
#[derive(Clone, Debug, PartialEq)]
pub struct NamedPoint {
    pub pos: Point,
    pub time: i64,
    pub name: String,
}

/// Ordered time → point mapping of one track segment.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Segment {
    points: BTreeMap<i64, TrackPoint>,
}

impl Segment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert without overwriting; colliding timestamps are moved forward by 1 ms steps.
    pub fn insert(&mut self, mut point: TrackPoint) -> i64 {
        while self.points.contains_key(&point.time) {
            point.time += 1;
        }
        let time = point.time;
        self.points.insert(time, point);
        time
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_time(&self) -> Option<i64> {
        self.points.keys().next().copied()
    }

    pub fn last_time(&self) -> Option<i64> {
        self.points.keys().next_back().copied()
    }

    pub fn get(&self, time: i64) -> Option<&TrackPoint> {
        self.points.get(&time)
    }

    /// Latest point at or before `time`.
    pub fn floor(&self, time: i64) -> Option<&TrackPoint> {
        self.points.range(..=time).next_back().map(|(_, p)| p)
    }

    /// Earliest point at or after `time`.
    pub fn ceiling(&self, time: i64) -> Option<&TrackPoint> {
        self.points.range(time..).next().map(|(_, p)| p)
    }

    /// Earliest point strictly after `time`.
    pub fn after(&self, time: i64) -> Option<&TrackPoint> {
        self.points
            .range((std::ops::Bound::Excluded(time), std::ops::Bound::Unbounded))
            .next()
            .map(|(_, p)| p)
    }

    pub fn range(&self, times: RangeInclusive<i64>) -> impl Iterator<Item = &TrackPoint> {
        self.points.range(times).map(|(_, p)| p)
    }

    pub fn points(&self) -> impl Iterator<Item = &TrackPoint> {
        self.points.values()
    }

    fn points_mut(&mut self) -> impl Iterator<Item = &mut TrackPoint> {
        self.points.values_mut()
    }

    /// Keep only `[first + trim_start, last - trim_end]`, measured on the untrimmed keys.
    fn trim(&mut self, trim_start: u64, trim_end: u64) {
        let (Some(first), Some(last)) = (self.first_time(), self.last_time()) else {
            return;
        };
        let lo = first.saturating_add(trim_start as i64);
        let hi = last.saturating_sub(trim_end as i64);
        self.points.retain(|&t, _| lo <= t && t <= hi);
    }
}

/// All segments of one track, most recently inserted first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrackTimeline {
    segments: Vec<Segment>,
}

impl TrackTimeline {
    /// Segments in lookup order (last inserted first).
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    fn push_segment(&mut self, segment: Segment) {
        self.segments.insert(0, segment);
    }
}

/// Planar bounding box.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Extents {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

/// Accumulates observed extents; user-forced sides are never moved.
#[derive(Clone, Copy, Debug)]
struct ExtentsBuilder {
    forced: Extents,
    forced_mask: [bool; 4],
    observed: Option<Extents>,
}

impl ExtentsBuilder {
    fn new(bounds: &BoundsOverride) -> Self {
        let forced = Extents {
            min_x: bounds.min_lon.map(lon_to_x).unwrap_or(0.0),
            max_x: bounds.max_lon.map(lon_to_x).unwrap_or(0.0),
            min_y: bounds.min_lat.map(lat_to_y).unwrap_or(0.0),
            max_y: bounds.max_lat.map(lat_to_y).unwrap_or(0.0),
        };
        Self {
            forced,
            forced_mask: [
                bounds.min_lon.is_some(),
                bounds.max_lon.is_some(),
                bounds.min_lat.is_some(),
                bounds.max_lat.is_some(),
            ],
            observed: None,
        }
    }

    fn include(&mut self, p: Point) {
        self.observed = Some(match self.observed {
            None => Extents {
                min_x: p.x,
                max_x: p.x,
                min_y: p.y,
                max_y: p.y,
            },
            Some(e) => Extents {
                min_x: e.min_x.min(p.x),
                max_x: e.max_x.max(p.x),
                min_y: e.min_y.min(p.y),
                max_y: e.max_y.max(p.y),
            },
        });
    }

    fn finish(&self) -> Option<Extents> {
        let observed = self.observed?;
        let pick = |i: usize, forced: f64, seen: f64| {
            if self.forced_mask[i] { forced } else { seen }
        };
        Some(Extents {
            min_x: pick(0, self.forced.min_x, observed.min_x),
            max_x: pick(1, self.forced.max_x, observed.max_x),
            min_y: pick(2, self.forced.min_y, observed.min_y),
            max_y: pick(3, self.forced.max_y, observed.max_y),
        })
    }
}

/// Idle detection settings for [`TimelineBuilder`].
#[derive(Clone, Copy, Debug)]
pub struct IdleSettings {
    pub idle_gap_ms: u64,
    /// Added to the end of every active run (tail fade-out time).
    pub span_extension_ms: u64,
}

/// Multi-track dataset for one render.
#[derive(Clone, Debug)]
pub struct Timeline {
    tracks: Vec<TrackTimeline>,
    waypoints: BTreeMap<i64, NamedPoint>,
    extents: Extents,
    min_time: i64,
    max_time: i64,
    spans: Option<SpanList>,
}

impl Timeline {
    /// Tracks in configuration order.
    pub fn tracks(&self) -> &[TrackTimeline] {
        &self.tracks
    }

    pub fn waypoints(&self) -> &BTreeMap<i64, NamedPoint> {
        &self.waypoints
    }

    /// Waypoints with a time at or before `time`.
    pub fn waypoints_until(&self, time: i64) -> impl Iterator<Item = &NamedPoint> {
        self.waypoints.range(..=time).map(|(_, p)| p)
    }

    pub fn extents(&self) -> Extents {
        self.extents
    }

    pub fn min_time(&self) -> i64 {
        self.min_time
    }

    pub fn max_time(&self) -> i64 {
        self.max_time
    }

    /// Active spans, present when idle skipping was requested.
    pub fn spans(&self) -> Option<&SpanList> {
        self.spans.as_ref()
    }

    /// Map every stored point through `f` (planar → canvas).
    pub fn translate(&mut self, f: impl Fn(Point) -> Point) {
        for track in &mut self.tracks {
            for segment in &mut track.segments {
                for p in segment.points_mut() {
                    p.pos = f(p.pos);
                }
            }
        }
        for wp in self.waypoints.values_mut() {
            wp.pos = f(wp.pos);
        }
    }
}

/// Builds a [`Timeline`] track by track.
pub struct TimelineBuilder {
    tracks: Vec<TrackTimeline>,
    waypoints: BTreeMap<i64, NamedPoint>,
    extents: ExtentsBuilder,
    time_range: Option<(i64, i64)>,
    idle: Option<IdleSettings>,
    spans: SpanList,
}

impl TimelineBuilder {
    pub fn new(bounds: &BoundsOverride, idle: Option<IdleSettings>) -> Self {
        Self {
            tracks: Vec::new(),
            waypoints: BTreeMap::new(),
            extents: ExtentsBuilder::new(bounds),
            time_range: None,
            idle,
            spans: SpanList::new(),
        }
    }

    /// Resolve timestamps, trim and project one input, then add it as the next track.
    pub fn add_track(&mut self, cfg: &TrackConfiguration, raw: &RawTrack) -> AnimatorResult<()> {
        let mut track = TrackTimeline::default();
        let mut forced_counter: i64 = 0;
        let mut track_first_time: Option<i64> = None;

        for raw_segment in &raw.segments {
            let mut segment = Segment::new();
            let mut prev: Option<(f64, f64, i64)> = None;

            for raw_point in raw_segment {
                let base_time = match cfg.forced_point_interval_ms {
                    Some(interval) => {
                        forced_counter += 1;
                        forced_counter * interval as i64
                    }
                    None => raw_point.time_ms.ok_or_else(|| AnimatorError::MissingTime {
                        input: raw.source.clone(),
                    })?,
                };
                let time = base_time + cfg.time_offset_ms;

                let speed = raw_point.speed_kmh.or_else(|| {
                    let (plat, plon, ptime) = prev?;
                    let dt_ms = time - ptime;
                    if dt_ms <= 0 {
                        return None;
                    }
                    let meters = haversine_distance_m(plat, plon, raw_point.lat, raw_point.lon);
                    Some(meters / (dt_ms as f64 / 1000.0) * 3.6)
                });
                prev = Some((raw_point.lat, raw_point.lon, time));

                segment.insert(TrackPoint {
                    pos: Point::new(lon_to_x(raw_point.lon), lat_to_y(raw_point.lat)),
                    time,
                    speed,
                });
            }

            segment.trim(cfg.trim_start_ms, cfg.trim_end_ms);
            if segment.is_empty() {
                continue;
            }

            for p in segment.points() {
                self.extents.include(p.pos);
            }
            if let (Some(first), Some(last)) = (segment.first_time(), segment.last_time()) {
                self.time_range = Some(match self.time_range {
                    None => (first, last),
                    Some((lo, hi)) => (lo.min(first), hi.max(last)),
                });
                track_first_time = Some(track_first_time.map_or(first, |t| t.min(first)));
            }
            if let Some(idle) = self.idle {
                for run in active_runs(segment.points().map(|p| p.time), idle.idle_gap_ms as i64)
                {
                    self.spans
                        .merge(run.start, run.end + idle.span_extension_ms as i64);
                }
            }

            track.push_segment(segment);
        }

        for wp in &raw.waypoints {
            let Some(mut time) = wp
                .time_ms
                .map(|t| t + cfg.time_offset_ms)
                .or(track_first_time)
            else {
                continue;
            };
            let pos = Point::new(lon_to_x(wp.lon), lat_to_y(wp.lat));
            self.extents.include(pos);
            while self.waypoints.contains_key(&time) {
                time += 1;
            }
            self.waypoints.insert(
                time,
                NamedPoint {
                    pos,
                    time,
                    name: wp.name.clone(),
                },
            );
        }

        tracing::debug!(
            input = %cfg.display_name(),
            segments = track.segments.len(),
            "track added to timeline"
        );
        self.tracks.push(track);
        Ok(())
    }

    pub fn build(self) -> AnimatorResult<Timeline> {
        let Some((min_time, max_time)) = self.time_range else {
            return Err(AnimatorError::validation(
                "no track points left to animate (empty inputs or everything trimmed)",
            ));
        };
        let extents = self
            .extents
            .finish()
            .ok_or_else(|| AnimatorError::validation("no points to compute bounds from"))?;
        Ok(Timeline {
            tracks: self.tracks,
            waypoints: self.waypoints,
            extents,
            min_time,
            max_time,
            spans: self.idle.map(|_| self.spans),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/store.rs"]
mod tests;
