//! JSON-lines sensor log reader.
//!
//! One [`SensorMessage`] per line, in processing order:
//!
//! ```text
//! # comment lines and blank lines are skipped
//! {"type":"gps","data":{"longitude":-71.43945,"latitude":42.44345},"timestamp_us":0}
//! {"type":"imu","data":{"linear_acceleration_x":0.5,"angular_velocity_z":0.0},"timestamp_us":10000}
//! ```

use std::io::BufRead;

use crate::core::types::SensorMessage;
use crate::error::{DishaError, Result};

/// Iterate over the messages in a JSON-lines log.
///
/// Errors carry the 1-based line number and do not end iteration, so a
/// caller can skip a bad line and keep going.
pub fn read_messages<R: BufRead>(reader: R) -> impl Iterator<Item = Result<SensorMessage>> {
    reader
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let line_no = index + 1;
            let line = match line {
                Ok(line) => line,
                Err(e) => return Some(Err(DishaError::Io(e))),
            };

            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                return None;
            }

            Some(
                serde_json::from_str::<SensorMessage>(trimmed).map_err(|e| DishaError::Replay {
                    line: line_no,
                    message: e.to_string(),
                }),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{GpsFix, ImuSample, Timestamped};
    use std::io::Cursor;

    #[test]
    fn test_reads_both_message_types() {
        let log = r#"
# drive log
{"type":"gps","data":{"longitude":-71.43945,"latitude":42.44345},"timestamp_us":0}

{"type":"imu","data":{"linear_acceleration_x":0.5,"angular_velocity_z":-0.2},"timestamp_us":10000}
"#;
        let messages: Vec<SensorMessage> = read_messages(Cursor::new(log))
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(
            messages,
            vec![
                SensorMessage::Gps(Timestamped::new(GpsFix::new(-71.43945, 42.44345), 0)),
                SensorMessage::Imu(Timestamped::new(ImuSample::new(0.5, -0.2), 10_000)),
            ]
        );
    }

    #[test]
    fn test_bad_line_reports_line_number() {
        let log = "{\"type\":\"imu\",\"data\":{\"linear_acceleration_x\":0.0,\"angular_velocity_z\":0.0},\"timestamp_us\":0}\n\
                   {\"type\":\"wheel\"}\n\
                   {\"type\":\"imu\",\"data\":{\"linear_acceleration_x\":0.0,\"angular_velocity_z\":0.0},\"timestamp_us\":1}\n";
        let results: Vec<Result<SensorMessage>> = read_messages(Cursor::new(log)).collect();

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        match &results[1] {
            Err(DishaError::Replay { line, .. }) => assert_eq!(*line, 2),
            other => panic!("expected replay error, got {:?}", other),
        }
        assert!(results[2].is_ok());
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(read_messages(Cursor::new("")).count(), 0);
    }
}
