use crate::config::Configuration;
use crate::foundation::core::{Point, Rgba8, Vec2};
use crate::foundation::error::AnimatorResult;
use crate::render::surface::Surface;
use crate::render::text::{Anchor, TextRenderer};
use crate::timeline::store::{Segment, Timeline, TrackPoint};

/// Fill color of waypoint dots.
pub const WAYPOINT_COLOR: Rgba8 = Rgba8::new(32, 32, 32, 255);

/// Per-track drawing style.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackStyle {
    pub color: Rgba8,
    pub line_width: f32,
    pub label: Option<String>,
}

/// Current position of one track at the frame time.
#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    /// Index of the track in configuration order.
    pub track: usize,
    pub pos: Point,
    /// Time of the point the marker sits on.
    pub time: i64,
    pub speed: Option<f64>,
    /// White once the track has run out of points, the track color otherwise.
    pub color: Rgba8,
}

/// Draws track lines, tails, markers and waypoints.
#[derive(Clone, Debug)]
pub struct Painter {
    styles: Vec<TrackStyle>,
    tail_duration_ms: u64,
    tail_color: Rgba8,
    tail_fadeout: bool,
    max_time: i64,
    marker_size: f32,
    waypoint_size: f32,
    pre_draw_color: Option<Rgba8>,
    text: TextRenderer,
}

impl Painter {
    pub fn new(cfg: &Configuration, max_time: i64, text: TextRenderer) -> Self {
        Self {
            styles: cfg
                .tracks
                .iter()
                .map(|t| TrackStyle {
                    color: t.color,
                    line_width: t.line_width,
                    label: t.label.clone(),
                })
                .collect(),
            tail_duration_ms: cfg.tail_duration_ms,
            tail_color: cfg.tail_color,
            tail_fadeout: cfg.tail_fadeout,
            max_time,
            marker_size: cfg.marker_size,
            waypoint_size: cfg.waypoint_size,
            pre_draw_color: cfg.pre_draw_track.then_some(cfg.pre_draw_track_color),
            text,
        }
    }

    pub fn styles(&self) -> &[TrackStyle] {
        &self.styles
    }

    /// Full tracks in the pre-draw color, drawn once into the base before the first frame.
    pub fn pre_draw(&self, base: &mut Surface, timeline: &Timeline) {
        let Some(color) = self.pre_draw_color else {
            return;
        };
        for (track, style) in timeline.tracks().iter().zip(&self.styles) {
            for segment in track.segments() {
                let points: Vec<Point> = segment.points().map(|p| p.pos).collect();
                base.stroke_polyline(&points, color, style.line_width);
            }
        }
    }

    /// Extend the persistent track lines from `from` to `to` in the track colors.
    pub fn draw_incremental(&self, base: &mut Surface, timeline: &Timeline, from: i64, to: i64) {
        if to <= from {
            return;
        }
        for (track, style) in timeline.tracks().iter().zip(&self.styles) {
            for segment in track.segments() {
                let points = window_points(segment, from, to);
                let anchored = usize::from(segment.floor(from).is_some());
                if points.len() > anchored {
                    let line: Vec<Point> = points.iter().map(|p| p.pos).collect();
                    base.stroke_polyline(&line, style.color, style.line_width);
                }
            }
        }
    }

    /// Draw the fading tail ending at `to`.
    pub fn draw_tail(&self, scratch: &mut Surface, timeline: &Timeline, to: i64) {
        let tail = self.tail_duration_ms as i64;
        if tail == 0 || (!self.tail_fadeout && to >= self.max_time) {
            return;
        }
        for (track, style) in timeline.tracks().iter().zip(&self.styles) {
            for segment in track.segments() {
                let points = window_points(segment, to - tail, to);
                for pair in points.windows(2) {
                    let (prev, cur) = (pair[0], pair[1]);
                    let ratio = (tail - to + cur.time) as f64 / tail as f64;
                    if ratio <= 0.0 {
                        continue;
                    }
                    let color = style.color.blend(self.tail_color, ratio);
                    scratch.stroke_line(prev.pos, cur.pos, color, style.line_width);
                }
            }
        }
    }

    /// Marker of every track at `to`, in configuration order.
    pub fn markers(&self, timeline: &Timeline, to: i64) -> Vec<Option<Marker>> {
        timeline
            .tracks()
            .iter()
            .zip(&self.styles)
            .enumerate()
            .map(|(idx, (track, style))| {
                track.segments().iter().find_map(|segment| {
                    let p = segment.floor(to)?;
                    let color = if segment.after(to).is_none() {
                        Rgba8::WHITE
                    } else {
                        style.color
                    };
                    Some(Marker {
                        track: idx,
                        pos: p.pos,
                        time: p.time,
                        speed: p.speed,
                        color,
                    })
                })
            })
            .collect()
    }

    pub fn draw_markers(
        &self,
        scratch: &mut Surface,
        markers: &[Option<Marker>],
    ) -> AnimatorResult<()> {
        let radius = self.marker_size / 2.0;
        for marker in markers.iter().flatten() {
            scratch.fill_circle(marker.pos, radius + 1.0, Rgba8::BLACK);
            scratch.fill_circle(marker.pos, radius, marker.color);
            let label = self
                .styles
                .get(marker.track)
                .and_then(|s| s.label.as_deref());
            if let Some(label) = label {
                let at = marker.pos + Vec2::new(f64::from(radius) + 4.0, f64::from(radius));
                self.text.draw(
                    scratch,
                    label,
                    at,
                    Anchor::Start,
                    Rgba8::BLACK,
                    Some(Rgba8::WHITE),
                )?;
            }
        }
        Ok(())
    }

    /// Waypoints reached at `to`, with their names.
    pub fn draw_waypoints(
        &self,
        scratch: &mut Surface,
        timeline: &Timeline,
        to: i64,
    ) -> AnimatorResult<()> {
        if self.waypoint_size <= 0.0 {
            return Ok(());
        }
        let radius = self.waypoint_size / 2.0;
        for wp in timeline.waypoints_until(to) {
            scratch.fill_circle(wp.pos, radius, WAYPOINT_COLOR);
            if !wp.name.is_empty() {
                let at = wp.pos + Vec2::new(f64::from(radius) + 3.0, -f64::from(radius));
                self.text.draw(
                    scratch,
                    &wp.name,
                    at,
                    Anchor::Start,
                    WAYPOINT_COLOR,
                    Some(Rgba8::WHITE),
                )?;
            }
        }
        Ok(())
    }
}

/// Floor point at `from` (when there is one) followed by every point in `(from, to]`.
fn window_points(segment: &Segment, from: i64, to: i64) -> Vec<&TrackPoint> {
    let mut points: Vec<&TrackPoint> = segment.floor(from).into_iter().collect();
    if from < to {
        points.extend(segment.range(from + 1..=to));
    }
    points
}

/// Full-canvas color wash shown right after skipped idle frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Flashback {
    color: Rgba8,
    /// Intensity lost per frame; zero disables the effect.
    decay: f64,
    intensity: f64,
}

impl Flashback {
    pub fn new(color: Rgba8, duration_ms: Option<u64>, fps: f64) -> Self {
        let decay = match duration_ms {
            Some(ms) if ms > 0 && fps > 0.0 => 1000.0 / (ms as f64 * fps),
            _ => 0.0,
        };
        Self {
            color,
            decay,
            intensity: 0.0,
        }
    }

    /// Call once when rendering resumes after one or more skipped frames.
    pub fn trigger(&mut self) {
        if self.decay > 0.0 {
            self.intensity = 1.0;
        }
    }

    pub fn intensity(&self) -> f64 {
        self.intensity
    }

    /// Paint the current intensity and advance one frame.
    pub fn apply(&mut self, scratch: &mut Surface) {
        if self.intensity <= 0.0 {
            return;
        }
        scratch.fill(self.color.fade(self.intensity));
        self.intensity = (self.intensity - self.decay).max(0.0);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/paint.rs"]
mod tests;
