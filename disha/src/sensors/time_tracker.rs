//! Elapsed-time bookkeeping across both sensor streams.
//!
//! GPS and IMU messages share one cursor: the delta for a message is
//! measured from whichever message was processed last, regardless of
//! its source.

/// Converts successive timestamps into elapsed seconds.
#[derive(Debug, Clone, Default)]
pub struct TimeTracker {
    last_update_us: Option<u64>,
}

impl TimeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the last processed timestamp, then advance the cursor.
    ///
    /// The first call seeds the cursor and returns 0. A timestamp older
    /// than the cursor returns 0 and leaves the cursor at the newer time,
    /// so the skipped span is not integrated twice.
    pub fn elapsed(&mut self, timestamp_us: u64) -> f64 {
        match self.last_update_us {
            None => {
                self.last_update_us = Some(timestamp_us);
                0.0
            }
            Some(last) if timestamp_us < last => {
                tracing::warn!(
                    "Timestamp moved backward by {}us ({} -> {}), clamping elapsed to 0",
                    last - timestamp_us,
                    last,
                    timestamp_us
                );
                0.0
            }
            Some(last) => {
                self.last_update_us = Some(timestamp_us);
                (timestamp_us - last) as f64 / 1_000_000.0
            }
        }
    }

    /// Timestamp of the most recently processed message.
    pub fn last_update_us(&self) -> Option<u64> {
        self.last_update_us
    }
}
