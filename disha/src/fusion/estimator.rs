//! GPS/IMU fusion estimator.
//!
//! Owns all mutable locator state and exposes two entry points, one per
//! sensor stream. Callers must serialize calls (see [`crate::locator`]);
//! each call runs to completion and never blocks.
//!
//! # GPS update
//!
//! ```text
//! dt        = elapsed since last message (GPS or IMU)
//! (e, n)    = project(lon, lat)
//!
//! first fix:   fused = (e, n, 0), trust = initial
//! otherwise:   pred  = dead_reckoning.predict(dt, fused.θ)
//!              err²  = |pred - (e, n)|²
//!              mode  = Jumping if err² > threshold else Normal
//!
//! fused.x = e * gps + dr.x * imu
//! fused.y = n * gps + dr.y * imu
//! fused.θ = atan2(last_gps.y - n, last_gps.x - e) * gps   (Normal)
//!         = dr.θ                                          (Jumping)
//!
//! dead_reckoning.pose = fused
//! last_gps            = (e, n, fused.θ)
//! ```
//!
//! The normal-mode heading deliberately uses only the GPS bearing scaled
//! by the GPS weight, with no dead-reckoning term. Pending review by the
//! vehicle team; do not "complete" the blend here.

use serde::Serialize;

use super::trust::{FusionMode, TrustPair, TrustTable};
use crate::config::LocatorConfig;
use crate::core::types::{GpsFix, ImuSample, Point2D, Pose2D, Timestamped};
use crate::error::Result;
use crate::sensors::{DeadReckoning, Prediction, Projector, TimeTracker};

/// Result of one GPS update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FusionOutcome {
    /// Fused pose, stamped with the fix time
    pub pose: Timestamped<Pose2D>,
    /// Branch taken for this fix
    pub mode: FusionMode,
    /// Weights used for the blend
    pub trust: TrustPair,
    /// Squared prediction error (None on the first fix)
    pub squared_error: Option<f64>,
    /// Dead-reckoning prediction at the fix time (None on the first fix)
    pub prediction: Option<Prediction>,
}

/// Message counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LocatorStats {
    pub gps_fixes: u64,
    pub imu_samples: u64,
    pub jumps: u64,
    pub rejected: u64,
}

/// Fuses GPS fixes with IMU dead reckoning into a planar pose.
#[derive(Debug, Clone)]
pub struct FusionEstimator {
    projector: Projector,
    trust_table: TrustTable,
    jump_threshold_sq: f64,

    time: TimeTracker,
    dead_reckoning: DeadReckoning,
    fused_pose: Pose2D,
    last_gps_pose: Pose2D,
    initialized: bool,
    jumping: bool,

    stats: LocatorStats,
}

impl FusionEstimator {
    /// Create an estimator from a validated configuration.
    pub fn new(config: &LocatorConfig) -> Result<Self> {
        config.validate()?;
        let trust_table = TrustTable::from_config(&config.fusion.trust)?;
        Ok(Self::from_parts(
            Projector::new(config.origin, config.projection),
            trust_table,
            config.fusion.jump_threshold_sq,
            config.imu.noise_floor,
        ))
    }

    fn from_parts(
        projector: Projector,
        trust_table: TrustTable,
        jump_threshold_sq: f64,
        noise_floor: f64,
    ) -> Self {
        Self {
            projector,
            trust_table,
            jump_threshold_sq,
            time: TimeTracker::new(),
            dead_reckoning: DeadReckoning::new(noise_floor),
            fused_pose: Pose2D::identity(),
            last_gps_pose: Pose2D::identity(),
            initialized: false,
            jumping: false,
            stats: LocatorStats::default(),
        }
    }

    /// Process one GPS fix and return the fused pose.
    ///
    /// Non-finite coordinates are rejected before any state changes.
    pub fn on_gps_fix(&mut self, fix: &Timestamped<GpsFix>) -> Result<FusionOutcome> {
        if let Err(e) = fix.data.validate() {
            self.stats.rejected += 1;
            return Err(e);
        }

        let dt = self.time.elapsed(fix.timestamp_us);
        let observed = self.projector.project(fix.data.longitude, fix.data.latitude);

        let (mode, prediction, squared_error) = if self.initialized {
            let prediction = self.dead_reckoning.predict(dt, self.fused_pose.theta);
            let squared_error =
                Point2D::new(prediction.x, prediction.y).distance_squared(&observed);
            self.jumping = squared_error > self.jump_threshold_sq;

            let mode = if self.jumping {
                FusionMode::Jumping
            } else {
                FusionMode::Normal
            };
            (mode, Some(prediction), Some(squared_error))
        } else {
            self.initialized = true;
            self.jumping = false;
            self.last_gps_pose = Pose2D::new(observed.x, observed.y, 0.0);
            tracing::info!(
                "Initialization fix at ({:.3}, {:.3}) from lon={:.7} lat={:.7}",
                observed.x,
                observed.y,
                fix.data.longitude,
                fix.data.latitude
            );
            (FusionMode::Initializing, None, None)
        };

        let trust = self.trust_table.select(mode);
        let dr = self.dead_reckoning.pose();

        let fused = match mode {
            FusionMode::Initializing => Pose2D::new(observed.x, observed.y, 0.0),
            FusionMode::Normal => Pose2D::new(
                observed.x * trust.gps() + dr.x * trust.imu(),
                observed.y * trust.gps() + dr.y * trust.imu(),
                (self.last_gps_pose.y - observed.y).atan2(self.last_gps_pose.x - observed.x)
                    * trust.gps(),
            ),
            FusionMode::Jumping => Pose2D::new(
                observed.x * trust.gps() + dr.x * trust.imu(),
                observed.y * trust.gps() + dr.y * trust.imu(),
                dr.theta,
            ),
        };

        if mode == FusionMode::Jumping {
            self.stats.jumps += 1;
            tracing::warn!(
                "GPS jump: fix ({:.3}, {:.3}) is {:.2}m from prediction, trusting dead reckoning",
                observed.x,
                observed.y,
                squared_error.unwrap_or_default().sqrt()
            );
        }

        self.fused_pose = fused;
        self.dead_reckoning.reset_to(fused);
        self.last_gps_pose = Pose2D::new(observed.x, observed.y, fused.theta);
        self.stats.gps_fixes += 1;

        tracing::debug!(
            "Fused pose ({:.3}, {:.3}, {:.3}) mode={} trust=({}, {}) prediction={:?}",
            fused.x,
            fused.y,
            fused.theta,
            mode,
            trust.gps(),
            trust.imu(),
            prediction
        );

        Ok(FusionOutcome {
            pose: Timestamped::new(fused, fix.timestamp_us),
            mode,
            trust,
            squared_error,
            prediction,
        })
    }

    /// Process one IMU sample, advancing dead reckoning.
    ///
    /// Non-finite readings are rejected before any state changes.
    pub fn on_imu_sample(&mut self, sample: &Timestamped<ImuSample>) -> Result<()> {
        if let Err(e) = sample.data.validate() {
            self.stats.rejected += 1;
            return Err(e);
        }

        let dt = self.time.elapsed(sample.timestamp_us);
        self.dead_reckoning.integrate(&sample.data, dt);
        self.stats.imu_samples += 1;
        Ok(())
    }

    /// Latest published pose.
    pub fn fused_pose(&self) -> Pose2D {
        self.fused_pose
    }

    /// Dead-reckoned pose since the last fix.
    pub fn dead_reckoned_pose(&self) -> Pose2D {
        self.dead_reckoning.pose()
    }

    /// Projected position of the last fix with the heading assigned to it.
    pub fn last_gps_pose(&self) -> Pose2D {
        self.last_gps_pose
    }

    pub fn velocity(&self) -> f64 {
        self.dead_reckoning.velocity()
    }

    pub fn angular_rate(&self) -> f64 {
        self.dead_reckoning.angular_rate()
    }

    /// True once the first GPS fix has been processed.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// True if the most recent fix was flagged as a jump.
    pub fn is_jumping(&self) -> bool {
        self.jumping
    }

    /// Current state: `Initializing` until the first fix, then `Normal` or `Jumping`.
    pub fn mode(&self) -> FusionMode {
        match (self.initialized, self.jumping) {
            (false, _) => FusionMode::Initializing,
            (true, true) => FusionMode::Jumping,
            (true, false) => FusionMode::Normal,
        }
    }

    /// Timestamp of the most recently processed message.
    pub fn last_update_us(&self) -> Option<u64> {
        self.time.last_update_us()
    }

    pub fn stats(&self) -> LocatorStats {
        self.stats
    }
}

impl Default for FusionEstimator {
    fn default() -> Self {
        let config = LocatorConfig::default();
        Self::from_parts(
            Projector::new(config.origin, config.projection),
            TrustTable::default(),
            config.fusion.jump_threshold_sq,
            config.imu.noise_floor,
        )
    }
}
