//! 客户端连接状态
//!
//! ```text
//! Idle ──SYN──▶ SynSent ──SYN+ACK / ACK──▶ Established ──▶ Streaming ──阈值──▶ Closed
//! ```
//!
//! 校验失败或序号不符不会进入单独的错误状态，由引擎就地决定重试或放弃。

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnState {
    #[default]
    Idle,
    SynSent,
    Established,
    Streaming,
    Closed,
}

impl fmt::Display for ConnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
