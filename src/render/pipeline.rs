use crate::config::Configuration;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{FrameIndex, Rgba8};
use crate::foundation::error::{AnimatorError, AnimatorResult};
use crate::geometry::resolver::{CanvasGeometry, GeometryRequest, resolve_geometry};
use crate::input::gpx::{RawTrack, read_gpx_file};
use crate::render::overlay::{Metadata, OverlayRegistry};
use crate::render::paint::{Flashback, Marker, Painter};
use crate::render::surface::{FrameRGBA, Surface};
use crate::render::text::TextRenderer;
use crate::render::viewport::ViewportSmoother;
use crate::schedule::scheduler::{FrameSchedule, ScheduleRequest};
use crate::timeline::store::{IdleSettings, Timeline, TimelineBuilder};

/// Receives progress updates and answers cancellation polls.
pub trait RenderProgress {
    /// `percent` in `0..=100`.
    fn set_progress(&mut self, percent: u8, message: &str);

    /// Polled once before every frame.
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Progress sink that ignores everything and never cancels.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl RenderProgress for NoProgress {
    fn set_progress(&mut self, _percent: u8, _message: &str) {}
}

/// What to do with one timeline frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameDecision {
    Render,
    /// Frame time falls outside every active span.
    SkipIdle,
    Cancelled,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct RenderStats {
    /// Frames handed to the sink, held frames included.
    pub frames_emitted: u64,
    pub frames_rendered: u64,
    pub frames_skipped: u64,
    pub frames_held: u64,
    /// Frames appended after the hold on behalf of overlays.
    pub frames_extra: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderOutcome {
    Finished(RenderStats),
    /// Stopped on request; the sink was closed with the frames emitted so far.
    Cancelled,
}

/// Read every configured GPX input, in configuration order.
pub fn read_inputs(cfg: &Configuration) -> AnimatorResult<Vec<RawTrack>> {
    cfg.tracks
        .iter()
        .map(|track| read_gpx_file(&track.input))
        .collect()
}

/// One fully resolved render: timeline in canvas space, geometry, schedule and overlays.
pub struct RenderPipeline {
    timeline: Timeline,
    geometry: CanvasGeometry,
    schedule: FrameSchedule,
    metadata: Metadata,
    painter: Painter,
    overlays: OverlayRegistry,
    viewport: Option<ViewportSmoother>,
    flashback: Flashback,
    background: Rgba8,
    skip_idle: bool,
}

impl std::fmt::Debug for RenderPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderPipeline")
            .field("metadata", &self.metadata)
            .field("overlays", &self.overlays)
            .finish_non_exhaustive()
    }
}

impl RenderPipeline {
    /// Build the timeline from `inputs` (one per configured track) and resolve geometry and timing.
    #[tracing::instrument(skip_all, fields(tracks = inputs.len()))]
    pub fn prepare(
        cfg: &Configuration,
        inputs: &[RawTrack],
        text: TextRenderer,
        overlays: OverlayRegistry,
    ) -> AnimatorResult<Self> {
        cfg.validate()?;
        if inputs.len() != cfg.tracks.len() {
            return Err(AnimatorError::validation(format!(
                "expected {} track inputs, got {}",
                cfg.tracks.len(),
                inputs.len()
            )));
        }

        let idle = cfg.skip_idle.then(|| IdleSettings {
            idle_gap_ms: cfg.idle_gap_ms,
            span_extension_ms: if cfg.tail_fadeout {
                cfg.tail_duration_ms
            } else {
                0
            },
        });
        let mut builder = TimelineBuilder::new(&cfg.bounds, idle);
        for (track, raw) in cfg.tracks.iter().zip(inputs) {
            builder.add_track(track, raw)?;
        }
        let mut timeline = builder.build()?;

        let geometry = resolve_geometry(&GeometryRequest::from_config(cfg), timeline.extents())?;
        timeline.translate(|p| geometry.to_canvas(p));

        let schedule = FrameSchedule::resolve(
            &ScheduleRequest::from_config(cfg, overlays.additional_frame_count()),
            timeline.min_time(),
            timeline.max_time(),
        )?;

        let metadata = Metadata {
            zoom: geometry.zoom,
            min_x: geometry.bounds.min_x,
            max_x: geometry.bounds.max_x,
            min_y: geometry.bounds.min_y,
            max_y: geometry.bounds.max_y,
            min_time: timeline.min_time(),
            max_time: timeline.max_time(),
            speedup: schedule.speedup,
            frame_count: schedule.frame_count,
            fps: schedule.fps,
            width: geometry.width,
            height: geometry.height,
            scale: geometry.scale,
        };

        tracing::info!(
            width = geometry.width,
            height = geometry.height,
            zoom = ?geometry.zoom,
            frames = schedule.frame_count,
            speedup = schedule.speedup,
            "render prepared"
        );

        Ok(Self {
            painter: Painter::new(cfg, timeline.max_time(), text),
            viewport: cfg
                .viewport
                .map(|vp| ViewportSmoother::new(vp, geometry.width, geometry.height)),
            flashback: Flashback::new(
                cfg.flashback_color,
                cfg.flashback_duration_ms,
                cfg.fps.as_f64(),
            ),
            background: cfg.background_color,
            skip_idle: cfg.skip_idle,
            timeline,
            geometry,
            schedule,
            metadata,
            overlays,
        })
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn schedule(&self) -> &FrameSchedule {
        &self.schedule
    }

    pub fn geometry(&self) -> &CanvasGeometry {
        &self.geometry
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Size of the frames handed to the sink.
    pub fn output_size(&self) -> (u32, u32) {
        self.viewport
            .as_ref()
            .map_or((self.geometry.width, self.geometry.height), |v| {
                v.output_size()
            })
    }

    fn decide(&self, time: i64, progress: &dyn RenderProgress) -> FrameDecision {
        if progress.is_cancelled() {
            return FrameDecision::Cancelled;
        }
        if self.skip_idle
            && let Some(spans) = self.timeline.spans()
            && !spans.contains(time)
        {
            return FrameDecision::SkipIdle;
        }
        FrameDecision::Render
    }

    /// Render every frame into `sink`.
    ///
    /// The sink is closed on every exit path that reaches it, cancellation included.
    #[tracing::instrument(skip_all, fields(frames = self.schedule.frame_count))]
    pub fn run(
        mut self,
        sink: &mut dyn FrameSink,
        progress: &mut dyn RenderProgress,
    ) -> AnimatorResult<RenderOutcome> {
        let (width, height) = self.output_size();
        sink.begin(SinkConfig {
            width,
            height,
            fps: self.schedule.fps,
        })?;

        match self.render_frames(sink, progress) {
            Ok(outcome) => {
                sink.close()?;
                match outcome {
                    RenderOutcome::Finished(stats) => {
                        for overlay in self.overlays.iter_mut() {
                            overlay.on_render_finished();
                        }
                        progress.set_progress(100, "done");
                        tracing::info!(?stats, "render finished");
                    }
                    RenderOutcome::Cancelled => {
                        for overlay in self.overlays.iter_mut() {
                            overlay.on_render_cancelled();
                        }
                        tracing::info!("render cancelled");
                    }
                }
                Ok(outcome)
            }
            Err(e) => {
                if let Err(close_err) = sink.close() {
                    tracing::warn!(error = %close_err, "failed to close sink after render error");
                }
                Err(e)
            }
        }
    }

    fn render_frames(
        &mut self,
        sink: &mut dyn FrameSink,
        progress: &mut dyn RenderProgress,
    ) -> AnimatorResult<RenderOutcome> {
        for overlay in self.overlays.iter_mut() {
            overlay.on_metadata(&self.metadata)?;
        }

        let mut base = Surface::new(self.geometry.width, self.geometry.height)?;
        base.clear(self.background);
        for overlay in self.overlays.iter_mut() {
            overlay.render_background(&mut base)?;
        }
        self.painter.pre_draw(&mut base, &self.timeline);

        let mut stats = RenderStats::default();
        let mut prev_time = self.schedule.time_for_frame(FrameIndex(0));
        let mut resumed_after_skip = false;
        let mut last: Option<LastFrame> = None;
        let frame_count = self.schedule.frame_count;
        let extra = self.overlays.additional_frame_count();

        for f in 1..=frame_count {
            let time = self.schedule.time_for_frame(FrameIndex(f));
            match self.decide(time, &*progress) {
                FrameDecision::Cancelled => return Ok(RenderOutcome::Cancelled),
                FrameDecision::SkipIdle => {
                    self.painter
                        .draw_incremental(&mut base, &self.timeline, prev_time, time);
                    prev_time = time;
                    resumed_after_skip = true;
                    stats.frames_skipped += 1;
                    continue;
                }
                FrameDecision::Render => {}
            }

            self.painter
                .draw_incremental(&mut base, &self.timeline, prev_time, time);
            prev_time = time;

            let scratch = snapshot_base(&base);
            if resumed_after_skip {
                self.flashback.trigger();
                resumed_after_skip = false;
            }
            let (surface, camera) = self.compose(time, scratch)?;
            let kept = (extra > 0).then(|| surface.clone());
            let frame = self.finish_frame(FrameIndex(f), time, camera.as_ref(), surface)?;

            sink.add_frame(&frame)?;
            stats.frames_emitted += 1;
            if last.is_none() {
                for _ in 0..self.schedule.keep_first_frames {
                    if progress.is_cancelled() {
                        return Ok(RenderOutcome::Cancelled);
                    }
                    sink.add_frame(&frame)?;
                    stats.frames_emitted += 1;
                    stats.frames_held += 1;
                }
            }
            stats.frames_rendered += 1;
            last = Some(LastFrame {
                frame,
                surface: kept,
                time,
                camera,
            });

            let percent = (f * 100 / frame_count.max(1)).min(99) as u8;
            progress.set_progress(percent, &format!("frame {f}/{frame_count}"));
        }

        let Some(last) = last else {
            return Ok(RenderOutcome::Finished(stats));
        };
        for _ in 0..self.schedule.keep_last_frames {
            if progress.is_cancelled() {
                return Ok(RenderOutcome::Cancelled);
            }
            sink.add_frame(&last.frame)?;
            stats.frames_emitted += 1;
            stats.frames_held += 1;
        }

        // Overlay frames continue the numbering after the timeline and start from the last
        // composed picture without its overlays.
        if let Some(surface) = &last.surface {
            for k in 1..=extra {
                if progress.is_cancelled() {
                    return Ok(RenderOutcome::Cancelled);
                }
                let frame = self.finish_frame(
                    FrameIndex(frame_count + k),
                    last.time,
                    last.camera.as_ref(),
                    surface.clone(),
                )?;
                sink.add_frame(&frame)?;
                stats.frames_emitted += 1;
                stats.frames_extra += 1;
            }
        }
        Ok(RenderOutcome::Finished(stats))
    }

    /// Tail, waypoints, markers, flashback and camera crop on top of the base snapshot.
    fn compose(
        &mut self,
        time: i64,
        mut scratch: Surface,
    ) -> AnimatorResult<(Surface, Option<Marker>)> {
        self.painter.draw_tail(&mut scratch, &self.timeline, time);
        self.painter
            .draw_waypoints(&mut scratch, &self.timeline, time)?;
        let markers = self.painter.markers(&self.timeline, time);
        self.painter.draw_markers(&mut scratch, &markers)?;
        self.flashback.apply(&mut scratch);

        let camera: Option<Marker> = markers.into_iter().flatten().next();
        let window = self.viewport.as_mut().and_then(|vp| {
            vp.push(camera.as_ref().map(|m| m.pos))
                .or_else(|| vp.fallback())
        });
        let out = match window {
            Some(rect) => scratch.crop(rect)?,
            None => scratch,
        };
        Ok((out, camera))
    }

    /// Run every overlay on `surface` and hand out the finished frame.
    fn finish_frame(
        &mut self,
        frame: FrameIndex,
        time: i64,
        camera: Option<&Marker>,
        mut surface: Surface,
    ) -> AnimatorResult<FrameRGBA> {
        for overlay in self.overlays.iter_mut() {
            overlay.render_frame(frame, time, camera, &mut surface)?;
        }
        Ok(surface.to_frame())
    }
}

/// Last rendered timeline frame, kept for the hold and for overlay frames.
struct LastFrame {
    frame: FrameRGBA,
    /// Composed picture before overlays ran; only kept when overlays append frames.
    surface: Option<Surface>,
    time: i64,
    camera: Option<Marker>,
}

/// Deep copy of the persistent base so per-frame drawing never leaks into later frames.
fn snapshot_base(base: &Surface) -> Surface {
    base.clone()
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
