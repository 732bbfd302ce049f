use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use super::*;
use crate::config::{TrackConfiguration, ViewportConfiguration};
use crate::encode::sink::InMemorySink;
use crate::input::gpx::RawPoint;
use crate::render::paint::Marker;

fn text() -> TextRenderer {
    TextRenderer::with_fontdb(Arc::new(usvg::fontdb::Database::new()), 12.0)
}

/// One track along the equator; `times` in seconds.
fn input(times: &[i64]) -> RawTrack {
    RawTrack {
        source: "mem.gpx".to_owned(),
        segments: vec![
            times
                .iter()
                .enumerate()
                .map(|(i, t)| RawPoint::new(0.0, i as f64 * 0.01, Some(t * 1000)))
                .collect(),
        ],
        waypoints: Vec::new(),
    }
}

fn config() -> Configuration {
    Configuration {
        tracks: vec![TrackConfiguration::new("mem.gpx")],
        width: Some(200),
        height: Some(100),
        fps: crate::foundation::core::Fps::new(10, 1).unwrap(),
        speedup: 1.0,
        tail_duration_ms: 0,
        ..Configuration::default()
    }
}

struct CancelAfter {
    polls: std::cell::Cell<u32>,
    limit: u32,
}

impl RenderProgress for CancelAfter {
    fn set_progress(&mut self, _percent: u8, _message: &str) {}

    fn is_cancelled(&self) -> bool {
        self.polls.set(self.polls.get() + 1);
        self.polls.get() > self.limit
    }
}

#[test]
fn held_frames_surround_the_animation() {
    let cfg = Configuration {
        keep_first_frame_ms: 200,
        keep_last_frame_ms: 300,
        ..config()
    };
    let p = RenderPipeline::prepare(&cfg, &[input(&[0, 1, 2])], text(), OverlayRegistry::new())
        .unwrap();
    assert_eq!(p.schedule().frame_count, 20);
    let mut sink = InMemorySink::new();
    let outcome = p.run(&mut sink, &mut NoProgress).unwrap();
    assert_eq!(
        outcome,
        RenderOutcome::Finished(RenderStats {
            frames_emitted: 25,
            frames_rendered: 20,
            frames_skipped: 0,
            frames_held: 5,
            frames_extra: 0,
        })
    );
    let frames = sink.frames();
    assert_eq!(frames.len(), 25);
    assert_eq!(frames[0], frames[2]);
    assert_eq!(frames[24], frames[21]);
    assert!(sink.is_closed());
}

#[test]
fn idle_gaps_are_skipped() {
    let cfg = Configuration {
        skip_idle: true,
        idle_gap_ms: 5_000,
        ..config()
    };
    // 2 s of activity, 60 s idle, 2 s of activity.
    let p = RenderPipeline::prepare(
        &cfg,
        &[input(&[0, 1, 2, 62, 63, 64])],
        text(),
        OverlayRegistry::new(),
    )
    .unwrap();
    let total = p.schedule().frame_count;
    let mut sink = InMemorySink::new();
    let RenderOutcome::Finished(stats) = p.run(&mut sink, &mut NoProgress).unwrap() else {
        panic!("render was cancelled");
    };
    assert_eq!(stats.frames_rendered + stats.frames_skipped, total);
    // Frames at 2.1 s .. 61.9 s fall into the gap.
    assert_eq!(stats.frames_skipped, 599);
    assert_eq!(sink.frames().len() as u64, stats.frames_rendered);
}

#[test]
fn cancellation_closes_the_sink_early() {
    let p = RenderPipeline::prepare(&config(), &[input(&[0, 1, 2])], text(), OverlayRegistry::new())
        .unwrap();
    let mut sink = InMemorySink::new();
    let mut progress = CancelAfter {
        polls: std::cell::Cell::new(0),
        limit: 3,
    };
    assert_eq!(
        p.run(&mut sink, &mut progress).unwrap(),
        RenderOutcome::Cancelled
    );
    assert_eq!(sink.frames().len(), 3);
    assert!(sink.is_closed());
}

#[test]
fn viewport_frames_keep_a_constant_size() {
    let cfg = Configuration {
        viewport: Some(ViewportConfiguration {
            width: 50,
            height: 40,
            inertia: 3,
        }),
        ..config()
    };
    let p = RenderPipeline::prepare(&cfg, &[input(&[0, 1, 2])], text(), OverlayRegistry::new())
        .unwrap();
    assert_eq!(p.output_size(), (50, 40));
    let mut sink = InMemorySink::new();
    p.run(&mut sink, &mut NoProgress).unwrap();
    assert!(
        sink.frames()
            .iter()
            .all(|f| (f.width, f.height) == (50, 40))
    );
    assert_eq!(sink.config().map(|c| (c.width, c.height)), Some((50, 40)));
}

#[test]
fn mismatched_inputs_are_rejected() {
    let err = RenderPipeline::prepare(&config(), &[], text(), OverlayRegistry::new()).unwrap_err();
    assert!(matches!(err, AnimatorError::Validation(_)));
}

/// Appends `extra` frames and records every frame index it is asked to draw.
struct Trailer {
    extra: u64,
    seen: Rc<RefCell<Vec<u64>>>,
}

impl crate::render::overlay::Overlay for Trailer {
    fn name(&self) -> &'static str {
        "trailer"
    }

    fn order(&self) -> i32 {
        500
    }

    fn render_frame(
        &mut self,
        frame: FrameIndex,
        _time: i64,
        _marker: Option<&Marker>,
        _canvas: &mut Surface,
    ) -> AnimatorResult<()> {
        self.seen.borrow_mut().push(frame.0);
        Ok(())
    }

    fn additional_frame_count(&self) -> u64 {
        self.extra
    }
}

#[test]
fn overlay_frames_fill_the_requested_duration() {
    let cfg = Configuration {
        total_time_ms: Some(2000),
        ..config()
    };
    let seen = Rc::new(RefCell::new(Vec::new()));
    let overlays = OverlayRegistry::new().with(Box::new(Trailer {
        extra: 5,
        seen: Rc::clone(&seen),
    }));
    let p = RenderPipeline::prepare(&cfg, &[input(&[0, 1, 2])], text(), overlays).unwrap();
    assert_eq!(p.schedule().frame_count, 15);

    let mut sink = InMemorySink::new();
    let RenderOutcome::Finished(stats) = p.run(&mut sink, &mut NoProgress).unwrap() else {
        panic!("render was cancelled");
    };
    assert_eq!(stats.frames_extra, 5);
    assert_eq!(stats.frames_emitted, 20);
    assert_eq!(sink.frames().len(), 20);
    assert_eq!(seen.borrow().len(), 20);
    assert_eq!(seen.borrow()[15..], [16, 17, 18, 19, 20]);
}

#[test]
fn held_last_frames_can_be_cancelled() {
    let cfg = Configuration {
        keep_last_frame_ms: 1000,
        ..config()
    };
    let p = RenderPipeline::prepare(&cfg, &[input(&[0, 1, 2])], text(), OverlayRegistry::new())
        .unwrap();
    assert_eq!(p.schedule().frame_count, 20);
    let mut sink = InMemorySink::new();
    // 20 polls for the timeline frames, then two held frames go out.
    let mut progress = CancelAfter {
        polls: std::cell::Cell::new(0),
        limit: 22,
    };
    assert_eq!(
        p.run(&mut sink, &mut progress).unwrap(),
        RenderOutcome::Cancelled
    );
    assert_eq!(sink.frames().len(), 22);
    assert!(sink.is_closed());
}
