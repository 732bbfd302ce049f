use std::cell::RefCell;
use std::f64::consts::PI;
use std::rc::Rc;

use super::*;
use crate::foundation::core::Fps;

#[derive(Clone, Default)]
struct Recording {
    urls: Rc<RefCell<Vec<String>>>,
}

impl TileFetcher for Recording {
    fn fetch(&self, url: &str) -> AnimatorResult<Vec<u8>> {
        self.urls.borrow_mut().push(url.to_owned());
        // Tile x/y encoded in the red/green channels.
        let parts: Vec<u8> = url
            .rsplit('/')
            .take(2)
            .map(|p| p.trim_end_matches(".png").parse().unwrap())
            .collect();
        let (y, x) = (parts[0], parts[1]);
        let img = image::RgbaImage::from_pixel(256, 256, image::Rgba([x * 100, y * 100, 7, 255]));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        Ok(out.into_inner())
    }
}

fn metadata() -> Metadata {
    let scale = 256.0 / PI;
    let e = PI - 0.1;
    Metadata {
        zoom: Some(1),
        min_x: -e,
        max_x: e,
        min_y: -e,
        max_y: e,
        min_time: 0,
        max_time: 1,
        speedup: 1.0,
        frame_count: 1,
        fps: Fps::default(),
        width: (2.0 * e * scale).round() as u32,
        height: (2.0 * e * scale).round() as u32,
        scale,
    }
}

fn overlay(fetcher: Recording, visibility: f64) -> MapOverlay<Recording> {
    MapOverlay::new(
        TileCache::new(fetcher, None, None),
        TileUrlTemplate::new("https://tiles.test/{zoom}/{x}/{y}.png"),
        visibility,
        Rgba8::WHITE,
    )
}

#[test]
fn tiles_cover_the_canvas_row_by_row() {
    let fetcher = Recording::default();
    let mut map = overlay(fetcher.clone(), 1.0);
    let md = metadata();
    map.on_metadata(&md).unwrap();
    let mut canvas = Surface::new(md.width, md.height).unwrap();
    map.render_background(&mut canvas).unwrap();

    assert_eq!(
        *fetcher.urls.borrow(),
        vec![
            "https://tiles.test/1/0/0.png",
            "https://tiles.test/1/1/0.png",
            "https://tiles.test/1/0/1.png",
            "https://tiles.test/1/1/1.png",
        ]
    );
    let f = canvas.to_frame();
    assert_eq!(f.pixel(10, 10), Some(Rgba8::new(0, 0, 7, 255)));
    assert_eq!(f.pixel(300, 10), Some(Rgba8::new(100, 0, 7, 255)));
    assert_eq!(f.pixel(300, 300), Some(Rgba8::new(100, 100, 7, 255)));
}

#[test]
fn zero_visibility_hides_the_map() {
    let mut map = overlay(Recording::default(), 0.0);
    let md = metadata();
    map.on_metadata(&md).unwrap();
    let mut canvas = Surface::new(md.width, md.height).unwrap();
    map.render_background(&mut canvas).unwrap();
    assert_eq!(canvas.to_frame().pixel(300, 300), Some(Rgba8::WHITE));
}

#[test]
fn map_without_zoom_is_rejected() {
    let mut map = overlay(Recording::default(), 1.0);
    map.on_metadata(&Metadata {
        zoom: None,
        ..metadata()
    })
    .unwrap();
    let mut canvas = Surface::new(4, 4).unwrap();
    assert!(map.render_background(&mut canvas).is_err());
}
