//! Disha - GPS + IMU pose locator
//!
//! Estimates a vehicle's planar pose (easting, northing, heading) by
//! blending low-rate GPS fixes with high-rate IMU dead reckoning.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    locator                          │  ← Serialized dispatch
//! │        (Locator, LocatorThread, SharedLocator)      │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                      io/                            │  ← Sinks, log replay
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                    fusion/                          │  ← Trust, jump detection
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                   sensors/                          │  ← Time, projection,
//! │                                                     │    dead reckoning
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                     core/                           │  ← Types
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use disha::{GpsFix, Locator, LocatorConfig, Pose2D, Timestamped};
//!
//! let mut locator = Locator::new(&LocatorConfig::default(), Vec::<Timestamped<Pose2D>>::new()).unwrap();
//! let fix = Timestamped::new(GpsFix::new(-71.43945, 42.44345), 0);
//! let outcome = locator.on_gps_fix(&fix).unwrap();
//! assert_eq!(outcome.pose.data, Pose2D::new(0.0, 0.0, 0.0));
//! assert_eq!(locator.sink().len(), 1);
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod fusion;
pub mod io;
pub mod locator;
pub mod sensors;

pub use config::{FusionConfig, ImuConfig, LocatorConfig};
pub use crate::core::types::{GpsFix, ImuSample, Point2D, Pose2D, SensorMessage, Timestamped};
pub use error::{DishaError, Result};
pub use fusion::{
    FusionEstimator, FusionMode, FusionOutcome, LocatorStats, TrustPair, TrustTable,
};
pub use io::{ChannelSink, JsonLinesSink, PoseSink, read_messages};
pub use locator::{Locator, LocatorThread, SharedLocator};
pub use sensors::{DeadReckoning, GeoOrigin, Prediction, ProjectionScale, Projector, TimeTracker};
