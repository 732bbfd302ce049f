use std::collections::VecDeque;

use crate::config::ViewportConfiguration;
use crate::foundation::core::{Point, Rect};

/// Sliding-window camera that follows the marker.
///
/// Keeps the last `inertia + 1` marker positions and centers the viewport on their mean. The
/// window never leaves the canvas.
#[derive(Clone, Debug)]
pub struct ViewportSmoother {
    width: f64,
    height: f64,
    canvas_width: f64,
    canvas_height: f64,
    capacity: usize,
    positions: VecDeque<Point>,
    sum_x: f64,
    sum_y: f64,
    last_center: Option<Point>,
}

impl ViewportSmoother {
    pub fn new(viewport: ViewportConfiguration, canvas_width: u32, canvas_height: u32) -> Self {
        let capacity = viewport.inertia as usize + 1;
        Self {
            width: f64::from(viewport.width.min(canvas_width)),
            height: f64::from(viewport.height.min(canvas_height)),
            canvas_width: f64::from(canvas_width),
            canvas_height: f64::from(canvas_height),
            capacity,
            positions: VecDeque::with_capacity(capacity),
            sum_x: 0.0,
            sum_y: 0.0,
            last_center: None,
        }
    }

    /// Size of every emitted frame: the viewport, shrunk to the canvas where it is larger.
    pub fn output_size(&self) -> (u32, u32) {
        (self.width as u32, self.height as u32)
    }

    /// Viewport covers the whole canvas, cropping is never needed.
    pub fn is_full_canvas(&self) -> bool {
        self.width >= self.canvas_width && self.height >= self.canvas_height
    }

    /// Record the marker position of the current frame and return the camera window.
    ///
    /// `None` means bypass: there is no marker, or the viewport already shows the whole canvas.
    pub fn push(&mut self, marker: Option<Point>) -> Option<Rect> {
        let marker = marker?;
        if self.is_full_canvas() {
            return None;
        }

        if self.positions.is_empty() {
            for _ in 0..self.capacity {
                self.positions.push_back(marker);
            }
            self.sum_x = marker.x * self.capacity as f64;
            self.sum_y = marker.y * self.capacity as f64;
        } else {
            self.positions.push_back(marker);
            self.sum_x += marker.x;
            self.sum_y += marker.y;
        }
        while self.positions.len() > self.capacity {
            if let Some(old) = self.positions.pop_front() {
                self.sum_x -= old.x;
                self.sum_y -= old.y;
            }
        }

        let n = self.positions.len() as f64;
        let center = Point::new(self.sum_x / n, self.sum_y / n);
        self.last_center = Some(center);
        Some(self.window_around(center))
    }

    /// Window used for frames where [`Self::push`] bypasses.
    ///
    /// Frames without a marker are not passed through at canvas size: they are cropped around
    /// the last camera center (the canvas center before any marker was seen), so a sink always
    /// receives [`Self::output_size`] frames. `None` when the viewport is the full canvas.
    pub fn fallback(&self) -> Option<Rect> {
        if self.is_full_canvas() {
            return None;
        }
        let center = self
            .last_center
            .unwrap_or_else(|| Point::new(self.canvas_width / 2.0, self.canvas_height / 2.0));
        Some(self.window_around(center))
    }

    fn window_around(&self, center: Point) -> Rect {
        let x0 = (center.x - self.width / 2.0).clamp(0.0, self.canvas_width - self.width);
        let y0 = (center.y - self.height / 2.0).clamp(0.0, self.canvas_height - self.height);
        Rect::new(x0, y0, x0 + self.width, y0 + self.height)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/viewport.rs"]
mod tests;
