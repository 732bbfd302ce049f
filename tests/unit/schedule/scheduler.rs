use super::*;

fn req(fps: u32) -> ScheduleRequest {
    ScheduleRequest {
        fps: Fps::new(fps, 1).unwrap(),
        speedup: 1.0,
        total_time_ms: None,
        keep_first_frame_ms: 0,
        keep_last_frame_ms: 0,
        tail_duration_ms: 0,
        extra_frames: 0,
    }
}

#[test]
fn speed_mode_counts_frames_including_tail() {
    let r = ScheduleRequest {
        tail_duration_ms: 2000,
        ..req(10)
    };
    let s = FrameSchedule::resolve(&r, 1_000_000, 1_009_000).unwrap();
    assert_eq!(s.frame_count, 110);
    assert_eq!(s.speedup, 1.0);
    for f in 1..=s.frame_count {
        assert_eq!(s.time_for_frame(FrameIndex(f)), 1_000_000 + 100 * f as i64);
    }
}

#[test]
fn speed_mode_applies_speedup() {
    let r = ScheduleRequest {
        speedup: 60.0,
        ..req(30)
    };
    // One hour at 60x and 30 fps is one minute of video.
    let s = FrameSchedule::resolve(&r, 0, 3_600_000).unwrap();
    assert_eq!(s.frame_count, 1800);
    assert_eq!(s.time_for_frame(FrameIndex(1)), 2000);
}

#[test]
fn duration_mode_hits_requested_length() {
    for (total, fps) in [(10_000u64, 30u32), (7_777, 25), (1_000, 24), (61_500, 60)] {
        let r = ScheduleRequest {
            total_time_ms: Some(total),
            tail_duration_ms: 1234,
            ..req(fps)
        };
        let s = FrameSchedule::resolve(&r, 500, 987_654).unwrap();
        let expected = (total as f64 * fps as f64 / 1000.0).round() as i64;
        assert!((s.frame_count as i64 - expected).abs() <= 1);

        // The chosen speedup maps the last frame to the end of the tail.
        let end = s.time_for_frame(FrameIndex(s.frame_count));
        assert!((end - (987_654 + 1234)).abs() <= 1, "{end}");
    }
}

#[test]
fn duration_mode_reserves_held_and_extra_frames() {
    let r = ScheduleRequest {
        total_time_ms: Some(10_000),
        keep_first_frame_ms: 1000,
        keep_last_frame_ms: 2000,
        extra_frames: 30,
        ..req(30)
    };
    let s = FrameSchedule::resolve(&r, 0, 60_000).unwrap();
    assert_eq!(s.frame_count, 180);
    assert_eq!(s.keep_first_frames, 30);
    assert_eq!(s.keep_last_frames, 60);
    assert_eq!(s.total_output_frames() + 30, 300);
    assert!((s.speedup - 60_000.0 * 30.0 / (180.0 * 1000.0)).abs() < 1e-9);
}

#[test]
fn too_short_total_time_is_an_insufficient_duration() {
    let r = ScheduleRequest {
        total_time_ms: Some(10),
        ..req(30)
    };
    match FrameSchedule::resolve(&r, 0, 60_000).unwrap_err() {
        AnimatorError::InsufficientDuration { required_ms } => assert_eq!(required_ms, 24),
        other => panic!("unexpected error {other}"),
    }

    let r = ScheduleRequest {
        total_time_ms: Some(1000),
        keep_last_frame_ms: 5000,
        ..req(30)
    };
    match FrameSchedule::resolve(&r, 0, 60_000).unwrap_err() {
        AnimatorError::InsufficientDuration { required_ms } => assert_eq!(required_ms, 4034),
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn total_time_below_one_frame_interval_is_rejected() {
    // 20 ms would round up to one frame at 30 fps, but one frame lasts 33.3 ms.
    let r = ScheduleRequest {
        total_time_ms: Some(20),
        ..req(30)
    };
    match FrameSchedule::resolve(&r, 0, 60_000).unwrap_err() {
        AnimatorError::InsufficientDuration { required_ms } => assert_eq!(required_ms, 14),
        other => panic!("unexpected error {other}"),
    }

    let ok = ScheduleRequest {
        total_time_ms: Some(20 + 14),
        ..req(30)
    };
    assert_eq!(FrameSchedule::resolve(&ok, 0, 60_000).unwrap().frame_count, 1);
}

#[test]
fn overlay_frames_need_their_own_intervals() {
    let r = ScheduleRequest {
        total_time_ms: Some(100),
        extra_frames: 3,
        ..req(30)
    };
    // Four intervals of 33.3 ms.
    match FrameSchedule::resolve(&r, 0, 60_000).unwrap_err() {
        AnimatorError::InsufficientDuration { required_ms } => assert_eq!(required_ms, 34),
        other => panic!("unexpected error {other}"),
    }
}
