use super::*;

#[test]
fn clear_and_fill_compose_straight_colors() {
    let mut s = Surface::new(4, 4).unwrap();
    s.clear(Rgba8::WHITE);
    assert_eq!(s.to_frame().pixel(0, 0), Some(Rgba8::WHITE));

    s.fill(Rgba8::new(0, 0, 0, 255));
    assert_eq!(s.to_frame().pixel(3, 3), Some(Rgba8::BLACK));

    // Fully transparent fills are no-ops.
    s.fill(Rgba8::new(255, 0, 0, 0));
    assert_eq!(s.to_frame().pixel(1, 2), Some(Rgba8::BLACK));
}

#[test]
fn stroke_covers_pixels_on_the_line_only() {
    let mut s = Surface::new(20, 20).unwrap();
    s.stroke_line(
        Point::new(2.0, 10.0),
        Point::new(18.0, 10.0),
        Rgba8::new(255, 0, 0, 255),
        4.0,
    );
    let f = s.to_frame();
    assert_eq!(f.pixel(10, 10), Some(Rgba8::new(255, 0, 0, 255)));
    assert_eq!(f.pixel(10, 2).map(|c| c.a), Some(0));
}

#[test]
fn circle_is_filled_around_center() {
    let mut s = Surface::new(20, 20).unwrap();
    s.fill_circle(Point::new(10.0, 10.0), 5.0, Rgba8::new(0, 0, 255, 255));
    let f = s.to_frame();
    assert_eq!(f.pixel(10, 10), Some(Rgba8::new(0, 0, 255, 255)));
    assert_eq!(f.pixel(0, 0).map(|c| c.a), Some(0));
}

#[test]
fn crop_and_draw_image_keep_pixels_in_place() {
    let mut s = Surface::new(10, 10).unwrap();
    let mut img = image::RgbaImage::new(2, 2);
    for px in img.pixels_mut() {
        *px = image::Rgba([0, 255, 0, 255]);
    }
    s.draw_image(6, 6, &img).unwrap();

    let c = s.crop(Rect::new(5.0, 5.0, 9.0, 9.0)).unwrap();
    assert_eq!((c.width(), c.height()), (4, 4));
    let f = c.to_frame();
    assert_eq!(f.pixel(1, 1), Some(Rgba8::new(0, 255, 0, 255)));
    assert_eq!(f.pixel(0, 0).map(|c| c.a), Some(0));
}

#[test]
fn clones_are_independent() {
    let mut base = Surface::new(4, 4).unwrap();
    base.clear(Rgba8::WHITE);
    let mut scratch = base.clone();
    scratch.fill(Rgba8::BLACK);
    assert_eq!(base.to_frame().pixel(0, 0), Some(Rgba8::WHITE));
    assert_ne!(base, scratch);
}

#[test]
fn zero_sized_surface_is_rejected() {
    assert!(matches!(
        Surface::new(0, 10),
        Err(AnimatorError::CanvasTooLarge { .. })
    ));
}
