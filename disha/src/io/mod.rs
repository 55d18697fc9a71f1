//! I/O infrastructure.
//!
//! - [`sink`]: where fused poses go
//! - [`replay`]: JSON-lines sensor logs as a message source

pub mod replay;
pub mod sink;

pub use replay::read_messages;
pub use sink::{ChannelSink, JsonLinesSink, PoseSink};
