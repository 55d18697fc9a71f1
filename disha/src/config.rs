//! Configuration loading for Disha
//!
//! All values are fixed at construction; the estimator copies what it
//! needs and never re-reads the configuration.

use crate::error::{DishaError, Result};
use crate::fusion::{TrustConfig, TrustTable};
use crate::sensors::{GeoOrigin, ProjectionScale};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct LocatorConfig {
    #[serde(default)]
    pub origin: GeoOrigin,
    #[serde(default)]
    pub projection: ProjectionScale,
    #[serde(default)]
    pub imu: ImuConfig,
    #[serde(default)]
    pub fusion: FusionConfig,
}

/// IMU processing parameters
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ImuConfig {
    /// Readings with magnitude at or below this are treated as noise (default: 0.1)
    #[serde(default = "default_noise_floor")]
    pub noise_floor: f64,
}

impl Default for ImuConfig {
    fn default() -> Self {
        Self {
            noise_floor: default_noise_floor(),
        }
    }
}

/// GPS/dead-reckoning blending parameters
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct FusionConfig {
    /// Squared distance (m²) between prediction and fix that flags a jump (default: 9.0)
    #[serde(default = "default_jump_threshold_sq")]
    pub jump_threshold_sq: f64,

    #[serde(default)]
    pub trust: TrustConfig,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            jump_threshold_sq: default_jump_threshold_sq(),
            trust: TrustConfig::default(),
        }
    }
}

fn default_noise_floor() -> f64 {
    0.1
}
fn default_jump_threshold_sq() -> f64 {
    9.0
}

impl LocatorConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DishaError::Config(format!("Failed to read config file: {}", e)))?;
        let config: LocatorConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<()> {
        let GeoOrigin {
            longitude,
            latitude,
        } = self.origin;
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(DishaError::Config(format!(
                "origin.longitude out of range: {}",
                longitude
            )));
        }
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(DishaError::Config(format!(
                "origin.latitude out of range: {}",
                latitude
            )));
        }

        for (name, scale) in [
            ("projection.lon_to_m", self.projection.lon_to_m),
            ("projection.lat_to_m", self.projection.lat_to_m),
        ] {
            if !scale.is_finite() || scale <= 0.0 {
                return Err(DishaError::Config(format!(
                    "{} must be positive, got {}",
                    name, scale
                )));
            }
        }

        if !self.imu.noise_floor.is_finite() || self.imu.noise_floor < 0.0 {
            return Err(DishaError::Config(format!(
                "imu.noise_floor must be non-negative, got {}",
                self.imu.noise_floor
            )));
        }

        if !self.fusion.jump_threshold_sq.is_finite() || self.fusion.jump_threshold_sq <= 0.0 {
            return Err(DishaError::Config(format!(
                "fusion.jump_threshold_sq must be positive, got {}",
                self.fusion.jump_threshold_sq
            )));
        }

        TrustTable::from_config(&self.fusion.trust)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = LocatorConfig::default();
        assert_eq!(config.origin.longitude, -71.43945);
        assert_eq!(config.origin.latitude, 42.44345);
        assert_eq!(config.projection.lon_to_m, 82000.0);
        assert_eq!(config.projection.lat_to_m, 111200.0);
        assert_eq!(config.imu.noise_floor, 0.1);
        assert_eq!(config.fusion.jump_threshold_sq, 9.0);
        assert_eq!(config.fusion.trust.normal.gps, 0.9);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config: LocatorConfig = toml::from_str("").unwrap();
        assert_eq!(config, LocatorConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config: LocatorConfig = toml::from_str(
            r#"
            [origin]
            longitude = 2.35

            [fusion]
            jump_threshold_sq = 16.0

            [fusion.trust.normal]
            gps = 0.75
            imu = 0.25
            "#,
        )
        .unwrap();

        assert_eq!(config.origin.longitude, 2.35);
        assert_eq!(config.origin.latitude, 42.44345);
        assert_eq!(config.fusion.jump_threshold_sq, 16.0);
        assert_eq!(config.fusion.trust.normal.gps, 0.75);
        assert_eq!(config.fusion.trust.jumping.gps, 0.2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = LocatorConfig::default();
        config.projection.lat_to_m = 0.0;
        assert!(matches!(config.validate(), Err(DishaError::Config(_))));

        let mut config = LocatorConfig::default();
        config.imu.noise_floor = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = LocatorConfig::default();
        config.fusion.jump_threshold_sq = -1.0;
        assert!(config.validate().is_err());

        let mut config = LocatorConfig::default();
        config.origin.latitude = 95.0;
        assert!(config.validate().is_err());

        let mut config = LocatorConfig::default();
        config.fusion.trust.initial.imu = 0.5;
        assert!(matches!(
            config.validate(),
            Err(DishaError::InvalidTrust { .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[imu]\nnoise_floor = 0.2").unwrap();

        let config = LocatorConfig::load(file.path()).unwrap();
        assert_eq!(config.imu.noise_floor, 0.2);
    }

    #[test]
    fn test_load_missing_file() {
        let err = LocatorConfig::load(Path::new("/nonexistent/disha.toml")).unwrap_err();
        assert!(matches!(err, DishaError::Config(_)));
    }

    #[test]
    fn test_load_rejects_invalid_trust() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[fusion.trust.jumping]\ngps = 0.5\nimu = 0.6").unwrap();
        assert!(LocatorConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_sample_config_parses() {
        let sample = include_str!("../disha.toml");
        let config: LocatorConfig = toml::from_str(sample).unwrap();
        assert_eq!(config, LocatorConfig::default());
    }
}
