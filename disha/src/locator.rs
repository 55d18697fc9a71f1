//! Serialized message handling.
//!
//! GPS and IMU messages mutate the same estimator state, so handlers must
//! never interleave. Two ways to get that:
//!
//! - [`LocatorThread`]: a single consumer draining one channel in order
//!   (preferred; transports only need a `Sender`)
//! - [`SharedLocator`]: one mutex around the whole locator for transports
//!   that call in from their own threads
//!
//! Either way each message runs to completion before the next starts.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use parking_lot::Mutex;

use crate::config::LocatorConfig;
use crate::core::types::{GpsFix, ImuSample, Pose2D, SensorMessage, Timestamped};
use crate::error::Result;
use crate::fusion::{FusionEstimator, FusionOutcome, LocatorStats};
use crate::io::PoseSink;

/// Fusion estimator wired to a pose sink.
///
/// Every fused pose is published to the sink as part of the GPS update.
pub struct Locator<S: PoseSink> {
    estimator: FusionEstimator,
    sink: S,
}

impl<S: PoseSink> Locator<S> {
    pub fn new(config: &LocatorConfig, sink: S) -> Result<Self> {
        Ok(Self::with_estimator(FusionEstimator::new(config)?, sink))
    }

    pub fn with_estimator(estimator: FusionEstimator, sink: S) -> Self {
        Self { estimator, sink }
    }

    /// Fuse a GPS fix and publish the result.
    pub fn on_gps_fix(&mut self, fix: &Timestamped<GpsFix>) -> Result<FusionOutcome> {
        let outcome = self.estimator.on_gps_fix(fix)?;
        self.sink.publish(&outcome.pose);
        Ok(outcome)
    }

    pub fn on_imu_sample(&mut self, sample: &Timestamped<ImuSample>) -> Result<()> {
        self.estimator.on_imu_sample(sample)
    }

    /// Dispatch one message. Returns the outcome for GPS fixes.
    pub fn handle(&mut self, message: &SensorMessage) -> Result<Option<FusionOutcome>> {
        match message {
            SensorMessage::Gps(fix) => self.on_gps_fix(fix).map(Some),
            SensorMessage::Imu(sample) => self.on_imu_sample(sample).map(|()| None),
        }
    }

    pub fn estimator(&self) -> &FusionEstimator {
        &self.estimator
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

/// Cloneable handle holding the locator behind one mutex.
pub struct SharedLocator<S: PoseSink> {
    inner: Arc<Mutex<Locator<S>>>,
}

impl<S: PoseSink> Clone for SharedLocator<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: PoseSink> SharedLocator<S> {
    pub fn new(locator: Locator<S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(locator)),
        }
    }

    pub fn on_gps_fix(&self, fix: &Timestamped<GpsFix>) -> Result<FusionOutcome> {
        self.inner.lock().on_gps_fix(fix)
    }

    pub fn on_imu_sample(&self, sample: &Timestamped<ImuSample>) -> Result<()> {
        self.inner.lock().on_imu_sample(sample)
    }

    pub fn handle(&self, message: &SensorMessage) -> Result<Option<FusionOutcome>> {
        self.inner.lock().handle(message)
    }

    pub fn fused_pose(&self) -> Pose2D {
        self.inner.lock().estimator().fused_pose()
    }

    pub fn stats(&self) -> LocatorStats {
        self.inner.lock().estimator().stats()
    }

    /// Run `f` with the locator locked.
    pub fn with<R>(&self, f: impl FnOnce(&mut Locator<S>) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

/// Single-consumer loop over a sensor message channel.
pub struct LocatorThread<S: PoseSink> {
    locator: Locator<S>,
    rx: Receiver<SensorMessage>,
    running: Arc<AtomicBool>,
}

impl<S: PoseSink> LocatorThread<S> {
    /// How long to wait for a message before re-checking `running`.
    const POLL_INTERVAL: Duration = Duration::from_millis(100);

    pub fn new(locator: Locator<S>, rx: Receiver<SensorMessage>, running: Arc<AtomicBool>) -> Self {
        Self {
            locator,
            rx,
            running,
        }
    }

    /// Process messages in arrival order until the channel disconnects or
    /// `running` clears. Returns the locator so callers can inspect it.
    pub fn run(mut self) -> Locator<S> {
        tracing::info!("Locator thread started");

        while self.running.load(Ordering::Relaxed) {
            match self.rx.recv_timeout(Self::POLL_INTERVAL) {
                Ok(message) => self.process(&message),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    tracing::info!("Sensor channel closed");
                    break;
                }
            }
        }

        let stats = self.locator.estimator().stats();
        tracing::info!(
            "Locator thread stopped: {} GPS fixes ({} jumps), {} IMU samples, {} rejected",
            stats.gps_fixes,
            stats.jumps,
            stats.imu_samples,
            stats.rejected
        );
        self.locator
    }

    fn process(&mut self, message: &SensorMessage) {
        if let Err(e) = self.locator.handle(message) {
            tracing::warn!(
                "Dropping message at {}us: {}",
                message.timestamp_us(),
                e
            );
        }
    }
}

impl<S: PoseSink + Send + 'static> LocatorThread<S> {
    /// Run on a named thread.
    pub fn spawn(self) -> Result<JoinHandle<Locator<S>>> {
        let handle = thread::Builder::new()
            .name("locator".into())
            .spawn(move || self.run())?;
        Ok(handle)
    }
}
