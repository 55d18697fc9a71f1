//! GPS/IMU fusion layer.
//!
//! - [`trust`]: validated trust weights and the per-mode trust table
//! - [`estimator`]: the fusion estimator and its two message entry points

pub mod estimator;
pub mod trust;

pub use estimator::{FusionEstimator, FusionOutcome, LocatorStats};
pub use trust::{FusionMode, TrustConfig, TrustPair, TrustTable, TrustWeights};
