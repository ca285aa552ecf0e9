//! 错误类型
//!
//! 头部校验、序号校验与底层 I/O 错误统一收敛到 [`RssiError`]。

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RssiError>;

#[derive(Debug, Error)]
pub enum RssiError {
    /// 重新计算的校验和与头部最后一个字不一致：该数据报整体丢弃
    #[error("checksum mismatch: computed {computed:#06x}, carried {carried:#06x}")]
    ChecksumMismatch { computed: u16, carried: u16 },

    /// 窗口内某个段的序号不是期望的下一个值
    #[error("sequence mismatch: expected {expected}, got {got}")]
    SequenceMismatch { expected: u8, got: u8 },

    /// 收到的字数不足以容纳 SYN 位所暗示的头部长度
    #[error("truncated header: need {needed} words, got {got}")]
    Truncated { needed: usize, got: usize },

    /// 握手应答未携带 SYN
    #[error("handshake response is not a SYN segment")]
    NotSyn,

    /// 接收超时（仅在启用定时器的重试策略下出现）
    #[error("receive timed out")]
    Timeout,

    #[error("gave up after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    #[error("config: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RssiError {
    /// 该错误是否只影响单个数据报（丢弃后可继续），而非整个会话
    pub fn is_segment_local(&self) -> bool {
        matches!(
            self,
            RssiError::ChecksumMismatch { .. }
                | RssiError::SequenceMismatch { .. }
                | RssiError::Truncated { .. }
        )
    }
}
