//! Local tangent-frame projection.
//!
//! Linearizes longitude/latitude around a fixed origin using two scale
//! factors calibrated for the deployment's latitude band:
//!
//! ```text
//! easting  = (lon - origin.lon) * lon_to_m
//! northing = (lat - origin.lat) * lat_to_m
//! ```
//!
//! No spherical correction is applied, so accuracy degrades with distance
//! from the origin.

use serde::{Deserialize, Serialize};

use crate::core::types::Point2D;

/// Geographic reference point of the local frame (degrees).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoOrigin {
    #[serde(default = "default_origin_longitude")]
    pub longitude: f64,
    #[serde(default = "default_origin_latitude")]
    pub latitude: f64,
}

impl Default for GeoOrigin {
    fn default() -> Self {
        Self {
            longitude: default_origin_longitude(),
            latitude: default_origin_latitude(),
        }
    }
}

/// Degrees-to-meters scale factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionScale {
    /// Meters per degree of longitude at the origin latitude
    #[serde(default = "default_lon_to_m")]
    pub lon_to_m: f64,
    /// Meters per degree of latitude
    #[serde(default = "default_lat_to_m")]
    pub lat_to_m: f64,
}

impl Default for ProjectionScale {
    fn default() -> Self {
        Self {
            lon_to_m: default_lon_to_m(),
            lat_to_m: default_lat_to_m(),
        }
    }
}

fn default_origin_longitude() -> f64 {
    -71.43945
}
fn default_origin_latitude() -> f64 {
    42.44345
}
fn default_lon_to_m() -> f64 {
    82000.0
}
fn default_lat_to_m() -> f64 {
    111200.0
}

/// Converts geographic coordinates into the local easting/northing frame.
#[derive(Debug, Clone, Copy)]
pub struct Projector {
    origin: GeoOrigin,
    scale: ProjectionScale,
}

impl Projector {
    pub fn new(origin: GeoOrigin, scale: ProjectionScale) -> Self {
        Self { origin, scale }
    }

    /// Project (longitude, latitude) to (easting, northing) in meters.
    #[inline]
    pub fn project(&self, longitude: f64, latitude: f64) -> Point2D {
        Point2D::new(
            (longitude - self.origin.longitude) * self.scale.lon_to_m,
            (latitude - self.origin.latitude) * self.scale.lat_to_m,
        )
    }

    /// Inverse of [`project`](Self::project): local point back to (longitude, latitude).
    #[inline]
    pub fn unproject(&self, point: &Point2D) -> (f64, f64) {
        (
            point.x / self.scale.lon_to_m + self.origin.longitude,
            point.y / self.scale.lat_to_m + self.origin.latitude,
        )
    }
}

impl Default for Projector {
    fn default() -> Self {
        Self::new(GeoOrigin::default(), ProjectionScale::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_origin_projects_to_zero() {
        let projector = Projector::default();
        let p = projector.project(-71.43945, 42.44345);
        assert_eq!(p, Point2D::new(0.0, 0.0));
    }

    #[test]
    fn test_custom_origin_projects_to_zero() {
        let projector = Projector::new(
            GeoOrigin {
                longitude: 10.123456,
                latitude: -33.5,
            },
            ProjectionScale {
                lon_to_m: 93000.0,
                lat_to_m: 110900.0,
            },
        );
        assert_eq!(projector.project(10.123456, -33.5), Point2D::new(0.0, 0.0));
    }

    #[test]
    fn test_small_longitude_step() {
        let projector = Projector::default();
        let p = projector.project(-71.43940, 42.44345);
        assert_relative_eq!(p.x, 4.1, epsilon = 1e-6);
        assert_eq!(p.y, 0.0);
    }

    #[test]
    fn test_latitude_step() {
        let projector = Projector::default();
        let p = projector.project(-71.43945, 42.44346);
        assert_eq!(p.x, 0.0);
        assert_relative_eq!(p.y, 1.112, epsilon = 1e-6);
    }

    #[test]
    fn test_west_and_south_are_negative() {
        let projector = Projector::default();
        let p = projector.project(-71.44, 42.44);
        assert!(p.x < 0.0);
        assert!(p.y < 0.0);
    }

    #[test]
    fn test_unproject_inverts_project() {
        let projector = Projector::default();
        let (lon, lat) = projector.unproject(&projector.project(-71.4391, 42.4437));
        assert_relative_eq!(lon, -71.4391, epsilon = 1e-10);
        assert_relative_eq!(lat, 42.4437, epsilon = 1e-10);
    }
}
