use super::*;

const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <wpt lat="46.5" lon="7.5">
    <time>2023-05-01T10:00:30Z</time>
    <name>Summit</name>
  </wpt>
  <trk>
    <name>Ride</name>
    <trkseg>
      <trkpt lat="46.0" lon="7.0"><time>2023-05-01T10:00:00Z</time></trkpt>
      <trkpt lat="46.1" lon="7.1"><time>2023-05-01T10:00:01Z</time></trkpt>
    </trkseg>
    <trkseg>
      <trkpt lat="46.2" lon="7.2"></trkpt>
    </trkseg>
  </trk>
</gpx>
"#;

#[test]
fn parses_segments_times_and_waypoints() {
    let track = parse_gpx(SAMPLE.as_bytes(), "sample.gpx").unwrap();
    assert_eq!(track.source, "sample.gpx");
    assert_eq!(track.segments.len(), 2);
    assert_eq!(track.segments[0].len(), 2);

    let first = &track.segments[0][0];
    assert!((first.lat - 46.0).abs() < 1e-12);
    assert!((first.lon - 7.0).abs() < 1e-12);
    assert_eq!(first.time_ms, Some(1_682_935_200_000));
    assert_eq!(track.segments[0][1].time_ms, Some(1_682_935_201_000));

    assert_eq!(track.segments[1][0].time_ms, None);

    assert_eq!(track.waypoints.len(), 1);
    assert_eq!(track.waypoints[0].name, "Summit");
    assert_eq!(track.waypoints[0].time_ms, Some(1_682_935_230_000));
}

#[test]
fn malformed_input_is_an_input_error() {
    let err = parse_gpx("<gpx".as_bytes(), "broken.gpx").unwrap_err();
    assert!(matches!(err, AnimatorError::Input(_)));
    assert!(err.to_string().contains("broken.gpx"));
}

#[test]
fn missing_file_is_reported() {
    let err = read_gpx_file(Path::new("/definitely/not/here.gpx")).unwrap_err();
    assert!(err.to_string().contains("here.gpx"));
}
