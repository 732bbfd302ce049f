use super::*;

fn smoother(inertia: u32) -> ViewportSmoother {
    ViewportSmoother::new(
        ViewportConfiguration {
            width: 100,
            height: 50,
            inertia,
        },
        1000,
        500,
    )
}

#[test]
fn first_position_centers_the_window() {
    let mut s = smoother(10);
    let rect = s.push(Some(Point::new(400.0, 300.0))).unwrap();
    assert_eq!(rect, Rect::new(350.0, 275.0, 450.0, 325.0));
}

#[test]
fn center_is_the_mean_of_the_last_positions() {
    let mut s = smoother(1);
    s.push(Some(Point::new(400.0, 200.0)));
    // FIFO holds two copies of the first point; the new one evicts one of them.
    let rect = s.push(Some(Point::new(500.0, 200.0))).unwrap();
    assert_eq!(rect.center(), Point::new(450.0, 200.0));
    let rect = s.push(Some(Point::new(500.0, 200.0))).unwrap();
    assert_eq!(rect.center(), Point::new(500.0, 200.0));
}

#[test]
fn window_is_clamped_inside_the_canvas() {
    let mut s = smoother(0);
    assert_eq!(
        s.push(Some(Point::new(5.0, 5.0))),
        Some(Rect::new(0.0, 0.0, 100.0, 50.0))
    );
    assert_eq!(
        s.push(Some(Point::new(999.0, 499.0))),
        Some(Rect::new(900.0, 450.0, 1000.0, 500.0))
    );
}

#[test]
fn missing_marker_bypasses_and_falls_back_to_last_center() {
    let mut s = smoother(0);
    assert_eq!(s.push(None), None);
    assert_eq!(s.fallback(), Some(Rect::new(450.0, 225.0, 550.0, 275.0)));

    s.push(Some(Point::new(200.0, 100.0)));
    assert_eq!(s.push(None), None);
    assert_eq!(s.fallback(), Some(Rect::new(150.0, 75.0, 250.0, 125.0)));
}

#[test]
fn viewport_larger_than_canvas_is_a_bypass() {
    let mut s = ViewportSmoother::new(
        ViewportConfiguration {
            width: 2000,
            height: 2000,
            inertia: 5,
        },
        640,
        480,
    );
    assert_eq!(s.output_size(), (640, 480));
    assert_eq!(s.push(Some(Point::new(10.0, 10.0))), None);
    assert_eq!(s.fallback(), None);
}
