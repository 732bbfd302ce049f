use std::sync::Arc;

use super::*;
use crate::config::{BoundsOverride, TrackConfiguration};
use crate::input::gpx::{RawPoint, RawTrack};
use crate::timeline::store::TimelineBuilder;

const RED: Rgba8 = Rgba8::new(255, 0, 0, 255);

/// Points at lon 0..10 on the equator, one second apart, mapped to `x = 10 + 10 * lon`, `y = 50`.
fn timeline(segments: Vec<std::ops::Range<i64>>) -> Timeline {
    let raw = RawTrack {
        source: "line.gpx".to_owned(),
        segments: segments
            .into_iter()
            .map(|r| {
                r.map(|i| RawPoint::new(0.0, i as f64, Some(i * 1000)))
                    .collect()
            })
            .collect(),
        waypoints: Vec::new(),
    };
    let mut builder = TimelineBuilder::new(&BoundsOverride::default(), None);
    builder
        .add_track(&TrackConfiguration::new("line.gpx"), &raw)
        .unwrap();
    let mut tl = builder.build().unwrap();
    tl.translate(|p| Point::new(10.0 + p.x.to_degrees() * 10.0, 50.0 - p.y));
    tl
}

fn painter(tl: &Timeline, tail_ms: u64, fadeout: bool) -> Painter {
    let mut track = TrackConfiguration::new("line.gpx");
    track.color = RED;
    track.line_width = 4.0;
    let cfg = Configuration {
        tracks: vec![track],
        tail_duration_ms: tail_ms,
        tail_fadeout: fadeout,
        ..Configuration::default()
    };
    let text = TextRenderer::with_fontdb(Arc::new(usvg::fontdb::Database::new()), 12.0);
    Painter::new(&cfg, tl.max_time(), text)
}

fn alpha_at(s: &Surface, x: u32, y: u32) -> u8 {
    s.to_frame().pixel(x, y).map_or(0, |c| c.a)
}

#[test]
fn incremental_draw_extends_only_the_new_part() {
    let tl = timeline(vec![0..10]);
    let p = painter(&tl, 0, false);
    let mut base = Surface::new(120, 100).unwrap();

    p.draw_incremental(&mut base, &tl, 0, 3000);
    assert_eq!(base.to_frame().pixel(25, 50), Some(RED));
    assert_eq!(alpha_at(&base, 80, 50), 0);

    p.draw_incremental(&mut base, &tl, 3000, 9000);
    assert_eq!(base.to_frame().pixel(80, 50), Some(RED));
}

#[test]
fn incremental_draw_without_new_points_is_a_no_op() {
    let tl = timeline(vec![0..10]);
    let p = painter(&tl, 0, false);
    let mut base = Surface::new(120, 100).unwrap();
    p.draw_incremental(&mut base, &tl, 2000, 2999);
    assert!(base.to_frame().data.iter().all(|&b| b == 0));
}

#[test]
fn tail_blends_towards_tail_color_and_covers_only_the_window() {
    let tl = timeline(vec![0..10]);
    let p = painter(&tl, 2000, true);
    let mut scratch = Surface::new(120, 100).unwrap();
    p.draw_tail(&mut scratch, &tl, 9000);

    let f = scratch.to_frame();
    // Newest piece in full track color.
    assert_eq!(f.pixel(95, 50), Some(RED));
    // Half-way piece is darker but still opaque (alpha is the max of both colors).
    let mid = f.pixel(85, 50).unwrap();
    assert_eq!(mid.a, 255);
    assert!(mid.r < 200 && mid.r > 100, "{mid:?}");
    assert_eq!(alpha_at(&scratch, 30, 50), 0);
}

#[test]
fn tail_is_skipped_at_the_end_without_fadeout() {
    let tl = timeline(vec![0..10]);
    let p = painter(&tl, 2000, false);
    let mut scratch = Surface::new(120, 100).unwrap();
    p.draw_tail(&mut scratch, &tl, 9000);
    assert!(scratch.to_frame().data.iter().all(|&b| b == 0));

    p.draw_tail(&mut scratch, &tl, 5000);
    assert_eq!(scratch.to_frame().pixel(55, 50), Some(RED));
}

#[test]
fn marker_turns_white_when_the_track_runs_out() {
    let tl = timeline(vec![0..10]);
    let p = painter(&tl, 0, false);

    let m = p.markers(&tl, 4500);
    let marker = m[0].as_ref().unwrap();
    assert_eq!(marker.time, 4000);
    assert_eq!(marker.color, RED);
    assert!((marker.pos.x - 50.0).abs() < 1e-9);

    let end = p.markers(&tl, 20_000);
    assert_eq!(end[0].as_ref().unwrap().color, Rgba8::WHITE);

    assert_eq!(p.markers(&tl, -1), vec![None]);
}

#[test]
fn marker_prefers_the_last_inserted_segment() {
    let tl = timeline(vec![0..4, 6..10]);
    let p = painter(&tl, 0, false);

    let early = p.markers(&tl, 2000)[0].clone().unwrap();
    assert_eq!(early.time, 2000);
    // The first segment ended at 3000, the marker sits on its last point.
    let gap = p.markers(&tl, 5000)[0].clone().unwrap();
    assert_eq!((gap.time, gap.color), (3000, Rgba8::WHITE));
    let late = p.markers(&tl, 7000)[0].clone().unwrap();
    assert_eq!((late.time, late.color), (7000, RED));
}

#[test]
fn flashback_decays_linearly() {
    let mut fb = Flashback::new(Rgba8::WHITE, Some(250), 10.0);
    let mut s = Surface::new(2, 2).unwrap();
    fb.apply(&mut s);
    assert!(s.to_frame().data.iter().all(|&b| b == 0));

    fb.trigger();
    assert_eq!(fb.intensity(), 1.0);
    fb.apply(&mut s);
    assert_eq!(s.to_frame().pixel(0, 0), Some(Rgba8::WHITE));
    assert!((fb.intensity() - 0.6).abs() < 1e-9);
    fb.apply(&mut s);
    fb.apply(&mut s);
    assert_eq!(fb.intensity(), 0.0);
}

#[test]
fn flashback_without_duration_never_triggers() {
    let mut fb = Flashback::new(Rgba8::WHITE, None, 30.0);
    fb.trigger();
    assert_eq!(fb.intensity(), 0.0);
}
