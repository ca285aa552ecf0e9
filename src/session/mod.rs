//! 会话层
//!
//! 握手与窗口接收引擎，以及它用到的会话记录、配置、重试策略与统计。

// 子模块声明
mod config;
mod engine;
mod record;
mod retry;
mod state;
mod stats;

// 重新导出公共接口
pub use config::{ClientConfig, DEFAULT_THRESHOLD_BYTES};
pub use engine::{Client, RoundOutcome};
pub use record::Session;
pub use retry::{
    Negotiated, Phase, Reference, RetryMode, RetryPolicy, RoundAction, ticks_to_duration,
};
pub use state::ConnState;
pub use stats::RunStats;
