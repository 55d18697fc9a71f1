//! Core data types for the locator.
//!
//! - [`Point2D`]: planar point in the local tangent frame (meters)
//! - [`Pose2D`]: planar pose (easting, northing, heading)
//! - [`Timestamped<T>`]: generic timestamp wrapper
//! - [`GpsFix`], [`ImuSample`], [`SensorMessage`]: sensor inputs

mod measurement;
mod pose;
mod timestamped;

pub use measurement::{GpsFix, ImuSample, SensorMessage};
pub use pose::{Point2D, Pose2D};
pub use timestamped::Timestamped;
