//! Point and rectangle value types.
//!
//! Coordinates are signed so components can sit partially (or entirely)
//! outside the visible surface; sizes are clamped at zero. One unit equals
//! one terminal cell.

use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use ratatui::layout::Rect as CellRect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn clamp(self, min: Point, max: Point) -> Point {
        Point {
            x: self.x.clamp(min.x, max.x.max(min.x)),
            y: self.y.clamp(min.y, max.y.max(min.y)),
        }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x.saturating_add(rhs.x), self.y.saturating_add(rhs.y))
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        *self = *self + rhs;
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x.saturating_sub(rhs.x), self.y.saturating_sub(rhs.y))
    }
}

impl SubAssign for Point {
    fn sub_assign(&mut self, rhs: Point) {
        *self = *self - rhs;
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(self.x.saturating_neg(), self.y.saturating_neg())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0,
        height: 0,
    };

    /// Negative extents are clamped to zero.
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width: width.max(0),
            height: height.max(0),
        }
    }

    pub fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// Axis-aligned rectangle with a signed origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub pos: Point,
    pub size: Size,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            pos: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn from_parts(pos: Point, size: Size) -> Self {
        Self {
            pos,
            size: Size::new(size.width, size.height),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size.is_empty()
    }

    pub fn left(&self) -> i32 {
        self.pos.x
    }

    pub fn top(&self) -> i32 {
        self.pos.y
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i32 {
        self.pos.x.saturating_add(self.size.width)
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i32 {
        self.pos.y.saturating_add(self.size.height)
    }

    pub fn top_left(&self) -> Point {
        self.pos
    }

    /// Corners are inclusive cells; an empty rect collapses onto its origin.
    pub fn top_right(&self) -> Point {
        Point::new((self.right() - 1).max(self.left()), self.top())
    }

    pub fn bottom_left(&self) -> Point {
        Point::new(self.left(), (self.bottom() - 1).max(self.top()))
    }

    pub fn bottom_right(&self) -> Point {
        Point::new(
            (self.right() - 1).max(self.left()),
            (self.bottom() - 1).max(self.top()),
        )
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left()
            && point.x < self.right()
            && point.y >= self.top()
            && point.y < self.bottom()
    }

    /// Overlap of two rectangles; empty (at `self`'s origin) when disjoint.
    pub fn intersect(&self, other: Rect) -> Rect {
        let x0 = self.left().max(other.left());
        let y0 = self.top().max(other.top());
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= x0 || y1 <= y0 {
            return Rect::from_parts(self.pos, Size::ZERO);
        }
        Rect::new(x0, y0, x1 - x0, y1 - y0)
    }

    pub fn intersects(&self, other: Rect) -> bool {
        !self.intersect(other).is_empty()
    }

    /// Nearest point inside the rectangle.
    pub fn clamp_point(&self, point: Point) -> Point {
        point.clamp(self.top_left(), self.bottom_right())
    }

    /// Shrink or move `inner` so it lies within `self` where possible.
    pub fn clamp_rect(&self, inner: Rect) -> Rect {
        let width = inner.size.width.min(self.size.width);
        let height = inner.size.height.min(self.size.height);
        let x = inner
            .left()
            .clamp(self.left(), (self.right() - width).max(self.left()));
        let y = inner
            .top()
            .clamp(self.top(), (self.bottom() - height).max(self.top()));
        Rect::new(x, y, width, height)
    }

    pub fn offset(&self, by: Point) -> Rect {
        Rect::from_parts(self.pos + by, self.size)
    }

    pub fn inset(&self, amount: i32) -> Rect {
        Rect::new(
            self.left().saturating_add(amount),
            self.top().saturating_add(amount),
            self.size.width.saturating_sub(amount.saturating_mul(2)),
            self.size.height.saturating_sub(amount.saturating_mul(2)),
        )
    }

    /// Portion of the rectangle that lands on the non-negative cell grid.
    pub fn to_cells(&self) -> CellRect {
        let clipped = self.intersect(Rect::new(0, 0, i32::from(u16::MAX), i32::from(u16::MAX)));
        if clipped.is_empty() {
            return CellRect::default();
        }
        CellRect {
            x: clipped.left() as u16,
            y: clipped.top() as u16,
            width: clipped.size.width as u16,
            height: clipped.size.height as u16,
        }
    }

    pub fn from_cells(rect: CellRect) -> Self {
        Rect::new(
            i32::from(rect.x),
            i32::from(rect.y),
            i32::from(rect.width),
            i32::from(rect.height),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_sizes_clamp_to_zero() {
        let r = Rect::new(3, 4, -5, 2);
        assert_eq!(r.size.width, 0);
        assert!(r.is_empty());
        assert!(!r.contains(Point::new(3, 4)));
    }

    #[test]
    fn intersect_overlapping_and_disjoint() {
        let a = Rect::new(0, 0, 5, 5);
        let b = Rect::new(3, 2, 5, 5);
        assert_eq!(a.intersect(b), Rect::new(3, 2, 2, 3));
        let c = Rect::new(10, 10, 1, 1);
        assert!(a.intersect(c).is_empty());
        assert!(!a.intersects(c));
    }

    #[test]
    fn corners_are_inclusive() {
        let r = Rect::new(2, 3, 4, 2);
        assert_eq!(r.top_left(), Point::new(2, 3));
        assert_eq!(r.top_right(), Point::new(5, 3));
        assert_eq!(r.bottom_left(), Point::new(2, 4));
        assert_eq!(r.bottom_right(), Point::new(5, 4));
        let empty = Rect::new(7, 7, 0, 0);
        assert_eq!(empty.bottom_right(), Point::new(7, 7));
    }

    #[test]
    fn clamp_point_and_rect() {
        let r = Rect::new(0, 0, 10, 5);
        assert_eq!(r.clamp_point(Point::new(-3, 9)), Point::new(0, 4));
        let moved = r.clamp_rect(Rect::new(8, -2, 4, 3));
        assert_eq!(moved, Rect::new(6, 0, 4, 3));
        let shrunk = r.clamp_rect(Rect::new(0, 0, 20, 20));
        assert_eq!(shrunk, r);
    }

    #[test]
    fn to_cells_clips_negative_origin() {
        let r = Rect::new(-2, 1, 5, 3);
        let cells = r.to_cells();
        assert_eq!(cells.x, 0);
        assert_eq!(cells.y, 1);
        assert_eq!(cells.width, 3);
        assert_eq!(cells.height, 3);
        assert_eq!(Rect::new(-9, -9, 2, 2).to_cells(), CellRect::default());
    }
}
