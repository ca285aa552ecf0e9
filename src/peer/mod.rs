//! 数据源对端
//!
//! 回应 SYN、按窗口持续发送数据段，用于本地联调与端到端测试。

mod serve;
mod stream;

pub use serve::serve;
pub use stream::{Outgoing, PeerConfig, PeerState, PeerStats, StreamPeer};
