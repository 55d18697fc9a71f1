//! IMU dead reckoning.
//!
//! Integrates forward acceleration into a scalar speed and takes the yaw
//! rate directly from the gyro, then advances the pose with a forward
//! Euler step using the heading from before the step:
//!
//! ```text
//! v  += ax * dt                  (only if |ax| > noise_floor)
//! ω   = wz                       (0 if |wz| <= noise_floor)
//! x  += v * dt * cos(θ)
//! y  += v * dt * sin(θ)
//! θ  += ω * dt
//! ```
//!
//! Speed is held, not decayed, when acceleration is below the noise floor,
//! while the yaw rate is zeroed. The pose is reset to the fused estimate
//! after every GPS fix, so it tracks drift since the last fix.

use serde::Serialize;

use crate::core::types::{ImuSample, Pose2D};

/// Expected pose one step ahead of the dead-reckoning state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
}

/// Scalar-speed dead-reckoning integrator.
#[derive(Debug, Clone)]
pub struct DeadReckoning {
    noise_floor: f64,
    velocity: f64,
    angular_rate: f64,
    pose: Pose2D,
}

impl DeadReckoning {
    /// Create an integrator at rest at the local origin.
    pub fn new(noise_floor: f64) -> Self {
        Self {
            noise_floor,
            velocity: 0.0,
            angular_rate: 0.0,
            pose: Pose2D::identity(),
        }
    }

    /// Current dead-reckoned pose.
    pub fn pose(&self) -> Pose2D {
        self.pose
    }

    /// Current speed estimate in m/s.
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Current yaw rate estimate in rad/s.
    pub fn angular_rate(&self) -> f64 {
        self.angular_rate
    }

    /// Overwrite the pose, keeping speed and yaw rate.
    pub fn reset_to(&mut self, pose: Pose2D) {
        self.pose = pose;
    }

    /// Apply one IMU sample spanning `dt` seconds.
    pub fn integrate(&mut self, sample: &ImuSample, dt: f64) {
        let ax = sample.linear_acceleration_x;
        let wz = sample.angular_velocity_z;

        if ax.abs() > self.noise_floor {
            self.velocity += ax * dt;
        }
        self.angular_rate = if wz.abs() > self.noise_floor { wz } else { 0.0 };

        let (sin_t, cos_t) = self.pose.theta.sin_cos();
        self.pose.x += self.velocity * dt * cos_t;
        self.pose.y += self.velocity * dt * sin_t;
        self.pose.theta += self.angular_rate * dt;

        tracing::trace!(
            "IMU step dt={:.4}s v={:.3} w={:.3} -> ({:.3}, {:.3}, {:.3})",
            dt,
            self.velocity,
            self.angular_rate,
            self.pose.x,
            self.pose.y,
            self.pose.theta
        );
    }

    /// Predict the pose `dt` seconds ahead, translating along `heading`.
    pub fn predict(&self, dt: f64, heading: f64) -> Prediction {
        let (sin_h, cos_h) = heading.sin_cos();
        Prediction {
            x: cos_h * (self.velocity * dt) + self.pose.x,
            y: sin_h * (self.velocity * dt) + self.pose.y,
            theta: self.angular_rate * dt + self.pose.theta,
        }
    }
}
