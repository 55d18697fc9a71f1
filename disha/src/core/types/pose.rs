//! Pose and point types in the local tangent frame.

use serde::{Deserialize, Serialize};

/// A planar point in meters (x = easting, y = northing).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    /// Easting in meters
    pub x: f64,
    /// Northing in meters
    pub y: f64,
}

impl Point2D {
    /// Create a new point.
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared distance to another point (avoids sqrt).
    #[inline]
    pub fn distance_squared(&self, other: &Point2D) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Vehicle pose in the local tangent frame.
///
/// Position (x, y) is easting/northing in meters relative to the
/// configured origin; theta is heading in radians. Theta is stored as
/// integrated and is not wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose2D {
    /// Easting in meters
    pub x: f64,
    /// Northing in meters
    pub y: f64,
    /// Heading in radians
    pub theta: f64,
}

impl Pose2D {
    /// Create a new pose.
    #[inline]
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        Self { x, y, theta }
    }

    /// Pose at the origin with zero heading.
    #[inline]
    pub fn identity() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            theta: 0.0,
        }
    }

    /// Position part of the pose.
    #[inline]
    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }
}

impl Default for Pose2D {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_point2d_distance_squared() {
        let a = Point2D::new(0.0, 0.0);
        let b = Point2D::new(3.0, 4.0);
        assert_relative_eq!(a.distance_squared(&b), 25.0);
        assert_relative_eq!(b.distance_squared(&a), 25.0);
    }

    #[test]
    fn test_theta_not_wrapped() {
        let p = Pose2D::new(0.0, 0.0, 4.0 * std::f64::consts::PI);
        assert_eq!(p.theta, 4.0 * std::f64::consts::PI);
    }

    #[test]
    fn test_position() {
        let p = Pose2D::new(1.5, -2.0, 0.3);
        assert_eq!(p.position(), Point2D::new(1.5, -2.0));
    }
}
