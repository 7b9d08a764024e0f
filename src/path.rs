//! Polyline path primitive used to describe where a stroke travels.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn distance(&self, other: &Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Single-contour path. `move_to` starts the contour over, `line_to` extends it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StrokePath {
    points: Vec<Point>,
}

impl StrokePath {
    pub fn new() -> Self {
        Self::default()
    }

    /// One-point path, as used by taps and pointer-down segments.
    pub fn point(x: f32, y: f32) -> Self {
        let mut p = Self::new();
        p.move_to(x, y);
        p
    }

    pub fn line(from: Point, to: Point) -> Self {
        let mut p = Self::new();
        p.move_to(from.x, from.y);
        p.line_to(to.x, to.y);
        p
    }

    pub fn reset(&mut self) {
        self.points.clear();
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.reset();
        self.points.push(Point::new(x, y));
    }

    /// Without a preceding `move_to` the line starts at the origin.
    pub fn line_to(&mut self, x: f32, y: f32) {
        if self.points.is_empty() {
            self.points.push(Point::default());
        }
        self.points.push(Point::new(x, y));
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn start(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn end(&self) -> Option<Point> {
        self.points.last().copied()
    }

    pub fn length(&self) -> f32 {
        self.points.windows(2).map(|w| w[0].distance(&w[1])).sum()
    }

    /// Position after travelling `fraction` (clamped to 0..=1) of the path's length.
    pub fn point_at(&self, fraction: f32) -> Option<Point> {
        let first = self.start()?;
        let total = self.length();
        if total <= f32::EPSILON {
            return Some(first);
        }
        let mut remaining = fraction.clamp(0.0, 1.0) * total;
        for w in self.points.windows(2) {
            let seg = w[0].distance(&w[1]);
            if remaining <= seg {
                let t = if seg > 0.0 { remaining / seg } else { 0.0 };
                return Some(Point::new(
                    w[0].x + (w[1].x - w[0].x) * t,
                    w[0].y + (w[1].y - w[0].y) * t,
                ));
            }
            remaining -= seg;
        }
        self.end()
    }
}
