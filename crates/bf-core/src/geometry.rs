//! Positions, extents, limits, and center-to-center distance.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// One of the two battlefield axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Horizontal, growing to the right.
    X,
    /// Vertical, growing downwards.
    Y,
}

impl Axis {
    /// Both axes, in integration order.
    pub const BOTH: [Axis; 2] = [Axis::X, Axis::Y];
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => write!(f, "x"),
            Self::Y => write!(f, "y"),
        }
    }
}

/// A point (or a per-axis vector) on the battlefield.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal component.
    pub x: f64,
    /// Vertical component.
    pub y: f64,
}

impl Point {
    /// Create a point from its components.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Read the component for an axis.
    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    /// Mutable access to the component for an axis.
    pub fn get_mut(&mut self, axis: Axis) -> &mut f64 {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
        }
    }

    /// Euclidean length when used as a vector.
    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.0}, {:.0})", self.x, self.y)
    }
}

/// Top-left anchored rectangle: a position plus an extent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width, never negative.
    #[serde(default)]
    pub width: f64,
    /// Height, never negative.
    #[serde(default)]
    pub height: f64,
}

impl Rect {
    /// Create a rectangle. Validate it with [`Rect::validate`] before use.
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A zero-extent rectangle at a point.
    pub const fn at(point: Point) -> Self {
        Self::new(point.x, point.y, 0.0, 0.0)
    }

    /// Top-left corner.
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Geometric center.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Move the top-left corner, keeping the extent.
    pub fn moved_to(self, position: Point) -> Self {
        Self {
            x: position.x,
            y: position.y,
            ..self
        }
    }

    /// Reject negative or non-finite extents.
    pub fn validate(&self) -> CoreResult<()> {
        let finite = [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite());
        if !finite || self.width < 0.0 || self.height < 0.0 {
            return Err(CoreError::InvalidExtent {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

/// An inclusive `[min, max]` range on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Limits {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

impl Limits {
    /// Create a range; see [`Limits::validate`].
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Clamp a value into the range.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Whether the value lies inside the range (bounds included).
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Reject inverted or non-finite ranges.
    pub fn validate(&self, axis: Axis) -> CoreResult<()> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min > self.max {
            return Err(CoreError::InvalidLimits {
                axis,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Per-axis position limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisLimits {
    /// Horizontal range.
    pub x: Limits,
    /// Vertical range.
    pub y: Limits,
}

impl AxisLimits {
    /// Create limits from two `[min, max]` pairs.
    pub const fn new(x: (f64, f64), y: (f64, f64)) -> Self {
        Self {
            x: Limits::new(x.0, x.1),
            y: Limits::new(y.0, y.1),
        }
    }

    /// Limits for one axis.
    pub fn get(&self, axis: Axis) -> Limits {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    /// Validate both axes.
    pub fn validate(&self) -> CoreResult<()> {
        self.x.validate(Axis::X)?;
        self.y.validate(Axis::Y)
    }
}

/// Anything that occupies a rectangle on the battlefield.
pub trait Placed {
    /// Current position and extent.
    fn rect(&self) -> Rect;

    /// Center-to-center distance to another placed object.
    fn distance_to(&self, other: &dyn Placed) -> f64 {
        distance(&self.rect(), &other.rect())
    }
}

impl Placed for Rect {
    fn rect(&self) -> Rect {
        *self
    }
}

/// Center-to-center Euclidean distance between two rectangles.
pub fn distance(a: &Rect, b: &Rect) -> f64 {
    let ca = a.center();
    let cb = b.center();
    (ca.x - cb.x).hypot(ca.y - cb.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_of_rect() {
        let r = Rect::new(10.0, 20.0, 40.0, 60.0);
        assert_eq!(r.center(), Point::new(30.0, 50.0));
    }

    #[test]
    fn distance_between_centers() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(30.0, 40.0, 10.0, 10.0);
        assert!((distance(&a, &b) - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn distance_accounts_for_extent() {
        // Same top-left, different sizes: centers differ.
        let a = Rect::new(0.0, 0.0, 0.0, 0.0);
        let b = Rect::new(0.0, 0.0, 60.0, 80.0);
        assert!((a.distance_to(&b) - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn negative_extent_rejected() {
        assert!(Rect::new(0.0, 0.0, -1.0, 5.0).validate().is_err());
        assert!(Rect::new(0.0, 0.0, 0.0, 0.0).validate().is_ok());
    }

    #[test]
    fn inverted_limits_rejected() {
        assert!(Limits::new(10.0, 0.0).validate(Axis::X).is_err());
        assert!(Limits::new(0.0, 0.0).validate(Axis::Y).is_ok());
        assert!(AxisLimits::new((0.0, 1.0), (f64::NAN, 2.0)).validate().is_err());
    }

    #[test]
    fn point_axis_access() {
        let mut p = Point::new(1.0, 2.0);
        *p.get_mut(Axis::Y) += 3.0;
        assert_eq!(p.get(Axis::X), 1.0);
        assert_eq!(p.get(Axis::Y), 5.0);
    }

    #[test]
    fn moved_to_keeps_extent() {
        let r = Rect::new(0.0, 0.0, 20.0, 30.0).moved_to(Point::new(5.0, 6.0));
        assert_eq!(r, Rect::new(5.0, 6.0, 20.0, 30.0));
    }
}
