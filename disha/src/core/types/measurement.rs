//! Sensor message types delivered by the transport.

use serde::{Deserialize, Serialize};

use super::Timestamped;
use crate::error::{DishaError, Result};

/// Absolute position fix from the GPS receiver (degrees).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsFix {
    pub longitude: f64,
    pub latitude: f64,
}

impl GpsFix {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Reject fixes that would poison the fusion math.
    pub fn validate(&self) -> Result<()> {
        finite("longitude", self.longitude)?;
        finite("latitude", self.latitude)
    }
}

/// Inertial sample: forward linear acceleration (m/s²) and yaw rate (rad/s).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImuSample {
    pub linear_acceleration_x: f64,
    pub angular_velocity_z: f64,
}

impl ImuSample {
    pub fn new(linear_acceleration_x: f64, angular_velocity_z: f64) -> Self {
        Self {
            linear_acceleration_x,
            angular_velocity_z,
        }
    }

    /// Reject samples that would poison the integration.
    pub fn validate(&self) -> Result<()> {
        finite("linear_acceleration_x", self.linear_acceleration_x)?;
        finite("angular_velocity_z", self.angular_velocity_z)
    }
}

fn finite(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(DishaError::MalformedMeasurement { field, value })
    }
}

/// One message from either sensor stream.
///
/// Serialized as JSON with a `type` tag, e.g.
/// `{"type":"gps","data":{"longitude":-71.4,"latitude":42.4},"timestamp_us":0}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SensorMessage {
    Gps(Timestamped<GpsFix>),
    Imu(Timestamped<ImuSample>),
}

impl SensorMessage {
    /// Timestamp of the wrapped message in microseconds.
    pub fn timestamp_us(&self) -> u64 {
        match self {
            SensorMessage::Gps(fix) => fix.timestamp_us,
            SensorMessage::Imu(sample) => sample.timestamp_us,
        }
    }
}

impl From<Timestamped<GpsFix>> for SensorMessage {
    fn from(fix: Timestamped<GpsFix>) -> Self {
        SensorMessage::Gps(fix)
    }
}

impl From<Timestamped<ImuSample>> for SensorMessage {
    fn from(sample: Timestamped<ImuSample>) -> Self {
        SensorMessage::Imu(sample)
    }
}
