//! Geometric helpers for axis-aligned bounding boxes.
//!
//! Coordinates follow the page convention used throughout the crate:
//! `(x0, y0)` is the bottom-left corner and `(x1, y1)` the top-right one,
//! with y growing upwards.

/// A rectangle defined by (x0, y0, x1, y1).
pub type Rect = (f64, f64, f64, f64);

/// Anything with an axis-aligned bounding box.
pub trait HasBBox {
    fn x0(&self) -> f64;
    fn y0(&self) -> f64;
    fn x1(&self) -> f64;
    fn y1(&self) -> f64;

    fn bbox(&self) -> Rect {
        (self.x0(), self.y0(), self.x1(), self.y1())
    }

    fn width(&self) -> f64 {
        self.x1() - self.x0()
    }

    fn height(&self) -> f64 {
        self.y1() - self.y0()
    }

    /// Center of the bottom edge.
    fn bottom_center(&self) -> (f64, f64) {
        ((self.x0() + self.x1()) / 2.0, self.y0())
    }
}

impl HasBBox for Rect {
    fn x0(&self) -> f64 {
        self.0
    }

    fn y0(&self) -> f64 {
        self.1
    }

    fn x1(&self) -> f64 {
        self.2
    }

    fn y1(&self) -> f64 {
        self.3
    }
}

/// Calculate area of a bounding box
pub fn bbox_area(bbox: Rect) -> f64 {
    let w = bbox.2 - bbox.0;
    let h = bbox.3 - bbox.1;
    w * h
}

/// Calculate union of two bounding boxes
pub const fn bbox_union(a: Rect, b: Rect) -> Rect {
    (a.0.min(b.0), a.1.min(b.1), a.2.max(b.2), a.3.max(b.3))
}

/// Intersection of two bounding boxes, or `None` when they do not overlap.
pub fn bbox_intersection(a: Rect, b: Rect) -> Option<Rect> {
    let x0 = a.0.max(b.0);
    let y0 = a.1.max(b.1);
    let x1 = a.2.min(b.2);
    let y1 = a.3.min(b.3);
    if x0 < x1 && y0 < y1 {
        Some((x0, y0, x1, y1))
    } else {
        None
    }
}

/// Fraction of `inner`'s area covered by `outer`.
///
/// Degenerate `inner` boxes report zero coverage.
pub fn coverage_fraction(inner: Rect, outer: Rect) -> f64 {
    let area = bbox_area(inner);
    if area <= 0.0 {
        return 0.0;
    }
    bbox_intersection(inner, outer).map_or(0.0, |r| bbox_area(r) / area)
}

/// Whether the point lies inside the rectangle (edges inclusive).
pub fn bbox_contains_point(r: Rect, (x, y): (f64, f64)) -> bool {
    r.0 <= x && x <= r.2 && r.1 <= y && y <= r.3
}
