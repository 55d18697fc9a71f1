//! Replay Pipeline Tests
//!
//! End-to-end: JSON-lines sensor log on disk -> reader -> channel ->
//! locator thread -> JSON-lines pose file.
//!
//! Run with: `cargo test --test replay`

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use approx::assert_relative_eq;
use crossbeam_channel::bounded;
use disha::{
    ChannelSink, DishaError, JsonLinesSink, Locator, LocatorConfig, LocatorThread, Pose2D,
    SensorMessage, SharedLocator, Timestamped, read_messages,
};

const LOG: &str = r#"# origin fix, a little IMU, then a 4.1 m jump east
{"type":"gps","data":{"longitude":-71.43945,"latitude":42.44345},"timestamp_us":0}
{"type":"imu","data":{"linear_acceleration_x":0.05,"angular_velocity_z":0.0},"timestamp_us":10000}
{"type":"imu","data":{"linear_acceleration_x":0.05,"angular_velocity_z":0.0},"timestamp_us":20000}
this line is garbage
{"type":"gps","data":{"longitude":-71.4394,"latitude":42.44345},"timestamp_us":1000000}
"#;

fn write_log() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(LOG.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_log_parsing_skips_bad_lines() {
    let file = write_log();
    let reader = BufReader::new(File::open(file.path()).unwrap());
    let results: Vec<_> = read_messages(reader).collect();

    assert_eq!(results.len(), 5);
    assert!(matches!(results[3], Err(DishaError::Replay { line: 5, .. })));
    let good: Vec<SensorMessage> = results.into_iter().filter_map(|r| r.ok()).collect();
    assert_eq!(good.len(), 4);
    assert_eq!(good[3].timestamp_us(), 1_000_000);
}

#[test]
fn test_replay_through_locator_thread() {
    let log = write_log();
    let out_dir = tempfile::tempdir().unwrap();
    let out_path = out_dir.path().join("poses.jsonl");

    let sink = JsonLinesSink::new(File::create(&out_path).unwrap());
    let locator = Locator::new(&LocatorConfig::default(), sink).unwrap();

    let (tx, rx) = bounded(2);
    let running = Arc::new(AtomicBool::new(true));
    let handle = LocatorThread::new(locator, rx, running).spawn().unwrap();

    let reader = BufReader::new(File::open(log.path()).unwrap());
    for message in read_messages(reader).filter_map(|r| r.ok()) {
        tx.send(message).unwrap();
    }
    drop(tx);

    let locator = handle.join().unwrap();
    assert_eq!(locator.sink().written(), 2);
    let stats = locator.estimator().stats();
    assert_eq!(stats.gps_fixes, 2);
    assert_eq!(stats.imu_samples, 2);
    assert_eq!(stats.jumps, 1);
    drop(locator);

    let poses: Vec<Timestamped<Pose2D>> = BufReader::new(File::open(&out_path).unwrap())
        .lines()
        .map(|l| serde_json::from_str(&l.unwrap()).unwrap())
        .collect();
    assert_eq!(poses.len(), 2);
    assert_eq!(poses[0].data, Pose2D::new(0.0, 0.0, 0.0));
    assert_eq!(poses[1].timestamp_us, 1_000_000);
    assert_relative_eq!(poses[1].data.x, 0.82, epsilon = 1e-6);
}

#[test]
fn test_channel_sink_downstream_consumer() {
    let (pose_tx, pose_rx) = bounded(16);
    let mut locator = Locator::new(&LocatorConfig::default(), ChannelSink::new(pose_tx)).unwrap();

    let reader = BufReader::new(LOG.as_bytes());
    for message in read_messages(reader).filter_map(|r| r.ok()) {
        locator.handle(&message).unwrap();
    }

    let received: Vec<Timestamped<Pose2D>> = pose_rx.try_iter().collect();
    assert_eq!(received.len(), 2);
    assert_eq!(received[1].timestamp_us, 1_000_000);
    assert_eq!(locator.sink().dropped(), 0);
}

#[test]
fn test_shutdown_with_idle_producer() {
    // The producer keeps its sender open but never sends again, like a
    // reader blocked on an idle stdin. Clearing `running` must still stop
    // the locator and hand back everything fused so far.
    let (tx, rx) = bounded::<SensorMessage>(4);
    let (pose_tx, pose_rx) = bounded(4);
    let running = Arc::new(AtomicBool::new(true));
    let locator = Locator::new(&LocatorConfig::default(), ChannelSink::new(pose_tx)).unwrap();
    let handle = LocatorThread::new(locator, rx, Arc::clone(&running))
        .spawn()
        .unwrap();

    let first = read_messages(BufReader::new(LOG.as_bytes()))
        .next()
        .unwrap()
        .unwrap();
    tx.send(first).unwrap();
    let pose = pose_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(pose.timestamp_us, 0);

    running.store(false, Ordering::Relaxed);
    let locator = handle.join().unwrap();
    assert_eq!(locator.estimator().stats().gps_fixes, 1);
    assert!(locator.estimator().is_initialized());
    drop(tx);
}

#[test]
fn test_shared_locator_matches_thread() {
    let shared = SharedLocator::new(
        Locator::new(
            &LocatorConfig::default(),
            Vec::<Timestamped<Pose2D>>::new(),
        )
        .unwrap(),
    );

    let reader = BufReader::new(LOG.as_bytes());
    for message in read_messages(reader).filter_map(|r| r.ok()) {
        shared.handle(&message).unwrap();
    }

    assert_relative_eq!(shared.fused_pose().x, 0.82, epsilon = 1e-6);
    assert_eq!(shared.with(|l| l.sink().len()), 2);
}
