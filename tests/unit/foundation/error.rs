use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        AnimatorError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(AnimatorError::input("x").to_string().contains("input error:"));
    assert!(
        AnimatorError::encode("x")
            .to_string()
            .contains("encode error:")
    );
}

#[test]
fn diagnostics_are_carried_in_messages() {
    let err = AnimatorError::MissingTime {
        input: "ride.gpx".to_owned(),
    };
    assert!(err.to_string().contains("ride.gpx"));

    let err = AnimatorError::InsufficientDuration { required_ms: 1234 };
    assert!(err.to_string().contains("1234 ms"));

    let err = AnimatorError::CanvasTooLarge {
        width: 70000,
        height: 20,
        zoom: Some(18),
    };
    let msg = err.to_string();
    assert!(msg.contains("70000x20"));
    assert!(msg.contains("18"));

    let err = AnimatorError::tile_fetch("https://tiles.example/1/2/3.png", "timeout");
    let msg = err.to_string();
    assert!(msg.contains("https://tiles.example/1/2/3.png"));
    assert!(msg.contains("timeout"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = AnimatorError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
