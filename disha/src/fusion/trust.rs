//! Trust weights for blending GPS and dead reckoning.
//!
//! A [`TrustPair`] can only be built through [`TrustPair::new`], which
//! requires both weights in `[0, 1]` summing to exactly 1. The
//! [`TrustTable`] holds one validated pair per [`FusionMode`], so picking
//! weights during fusion cannot fail.

use serde::{Deserialize, Serialize};

use crate::error::{DishaError, Result};

/// Which branch of the fusion step produced a pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FusionMode {
    /// First GPS fix: position taken from GPS alone
    Initializing,
    /// GPS agrees with dead reckoning
    Normal,
    /// GPS jumped away from dead reckoning
    Jumping,
}

impl std::fmt::Display for FusionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FusionMode::Initializing => write!(f, "initializing"),
            FusionMode::Normal => write!(f, "normal"),
            FusionMode::Jumping => write!(f, "jumping"),
        }
    }
}

/// Complementary GPS/IMU weights. `gps + imu == 1` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrustPair {
    gps: f64,
    imu: f64,
}

impl TrustPair {
    /// Build a pair, rejecting weights outside `[0, 1]` or not summing to exactly 1.
    pub fn new(gps: f64, imu: f64) -> Result<Self> {
        let in_range = |w: f64| w.is_finite() && (0.0..=1.0).contains(&w);
        if !in_range(gps) || !in_range(imu) || gps + imu != 1.0 {
            return Err(DishaError::InvalidTrust { gps, imu });
        }
        Ok(Self { gps, imu })
    }

    /// Weight applied to the projected GPS fix.
    #[inline]
    pub fn gps(&self) -> f64 {
        self.gps
    }

    /// Weight applied to the dead-reckoned pose.
    #[inline]
    pub fn imu(&self) -> f64 {
        self.imu
    }
}

/// Unvalidated weights as they appear in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrustWeights {
    pub gps: f64,
    pub imu: f64,
}

/// `[fusion.trust]` configuration section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrustConfig {
    #[serde(default = "default_initial")]
    pub initial: TrustWeights,
    #[serde(default = "default_normal")]
    pub normal: TrustWeights,
    #[serde(default = "default_jumping")]
    pub jumping: TrustWeights,
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            initial: default_initial(),
            normal: default_normal(),
            jumping: default_jumping(),
        }
    }
}

fn default_initial() -> TrustWeights {
    TrustWeights { gps: 1.0, imu: 0.0 }
}
fn default_normal() -> TrustWeights {
    TrustWeights { gps: 0.9, imu: 0.1 }
}
fn default_jumping() -> TrustWeights {
    TrustWeights { gps: 0.2, imu: 0.8 }
}

/// Validated trust pair per fusion mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrustTable {
    initial: TrustPair,
    normal: TrustPair,
    jumping: TrustPair,
}

impl TrustTable {
    pub fn new(initial: TrustPair, normal: TrustPair, jumping: TrustPair) -> Self {
        Self {
            initial,
            normal,
            jumping,
        }
    }

    /// Validate every configured pair.
    pub fn from_config(config: &TrustConfig) -> Result<Self> {
        let pair = |w: TrustWeights| TrustPair::new(w.gps, w.imu);
        Ok(Self::new(
            pair(config.initial)?,
            pair(config.normal)?,
            pair(config.jumping)?,
        ))
    }

    /// Weights for a fusion branch.
    #[inline]
    pub fn select(&self, mode: FusionMode) -> TrustPair {
        match mode {
            FusionMode::Initializing => self.initial,
            FusionMode::Normal => self.normal,
            FusionMode::Jumping => self.jumping,
        }
    }
}

impl Default for TrustTable {
    fn default() -> Self {
        // The default weights are exact binary sums to 1.
        Self {
            initial: TrustPair { gps: 1.0, imu: 0.0 },
            normal: TrustPair { gps: 0.9, imu: 0.1 },
            jumping: TrustPair { gps: 0.2, imu: 0.8 },
        }
    }
}
