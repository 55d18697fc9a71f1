//! Pose sinks.
//!
//! Publishing is fire-and-forget from the estimator's point of view: a
//! sink never blocks the locator and never reports failure back to it.
//! Problems are logged and the pose is dropped.

use std::io::Write;

use crossbeam_channel::{Sender, TrySendError};

use crate::core::types::{Pose2D, Timestamped};

/// Consumer of fused poses.
pub trait PoseSink {
    fn publish(&mut self, pose: &Timestamped<Pose2D>);
}

impl PoseSink for Vec<Timestamped<Pose2D>> {
    fn publish(&mut self, pose: &Timestamped<Pose2D>) {
        self.push(*pose);
    }
}

impl<S: PoseSink + ?Sized> PoseSink for Box<S> {
    fn publish(&mut self, pose: &Timestamped<Pose2D>) {
        (**self).publish(pose);
    }
}

/// Forwards poses over a crossbeam channel without blocking.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: Sender<Timestamped<Pose2D>>,
    dropped: u64,
}

impl ChannelSink {
    pub fn new(tx: Sender<Timestamped<Pose2D>>) -> Self {
        Self { tx, dropped: 0 }
    }

    /// Poses dropped because the channel was full or closed.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl PoseSink for ChannelSink {
    fn publish(&mut self, pose: &Timestamped<Pose2D>) {
        match self.tx.try_send(*pose) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.dropped += 1;
                tracing::warn!("Pose channel full, dropping pose at {}us", pose.timestamp_us);
            }
            Err(TrySendError::Disconnected(_)) => {
                self.dropped += 1;
                tracing::warn!("Pose channel closed, dropping pose at {}us", pose.timestamp_us);
            }
        }
    }
}

/// Writes one JSON object per pose.
///
/// ```text
/// {"data":{"x":0.82,"y":0.0,"theta":0.0},"timestamp_us":1000000}
/// ```
pub struct JsonLinesSink<W: Write> {
    writer: W,
    written: u64,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Number of poses written successfully.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> PoseSink for JsonLinesSink<W> {
    fn publish(&mut self, pose: &Timestamped<Pose2D>) {
        let result = serde_json::to_writer(&mut self.writer, pose)
            .map_err(std::io::Error::from)
            .and_then(|()| self.writer.write_all(b"\n"))
            .and_then(|()| self.writer.flush());

        match result {
            Ok(()) => self.written += 1,
            Err(e) => tracing::error!("Failed to write pose: {}", e),
        }
    }
}
