//! Sensor processing layer.
//!
//! - [`time_tracker`]: timestamp deltas shared by both sensor streams
//! - [`projection`]: longitude/latitude to local easting/northing
//! - [`dead_reckoning`]: IMU velocity/yaw-rate integration

pub mod dead_reckoning;
pub mod projection;
pub mod time_tracker;

pub use dead_reckoning::{DeadReckoning, Prediction};
pub use projection::{GeoOrigin, ProjectionScale, Projector};
pub use time_tracker::TimeTracker;
