//! 运行统计

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::Session;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub total_bytes: u64,
    pub segments: u64,
    pub rounds_accepted: u64,
    pub rounds_rejected: u64,
    pub last_ack: u8,
    /// 实际使用的窗口（段数），对端通告 0 时为 1
    pub window: u8,
    pub elapsed_secs: f64,
    pub throughput_mbps: f64,
}

impl RunStats {
    pub fn from_session(session: &Session, elapsed: Duration) -> Self {
        let elapsed_secs = elapsed.as_secs_f64();
        let throughput_mbps = if elapsed_secs > 0.0 {
            (session.total_bytes() as f64 * 8.0) / elapsed_secs / 1e6
        } else {
            0.0
        };
        Self {
            total_bytes: session.total_bytes(),
            segments: session.segments(),
            rounds_accepted: session.rounds_accepted(),
            rounds_rejected: session.rounds_rejected(),
            last_ack: session.last_ack(),
            window: u8::try_from(session.window()).unwrap_or(u8::MAX),
            elapsed_secs,
            throughput_mbps,
        }
    }
}
