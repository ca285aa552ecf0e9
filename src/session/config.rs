//! 客户端配置
//!
//! 所有字段都有默认值，JSON 文件里只需写要覆盖的部分。

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::retry::RetryMode;
use crate::error::{Result, RssiError};
use crate::net::{DEFAULT_PORT, DEFAULT_RECV_BUFFER_BYTES};
use crate::proto::SynParams;

/// 参考运行中的接收阈值（字节）
pub const DEFAULT_THRESHOLD_BYTES: u64 = 10_000_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// 对端端口
    pub port: u16,
    /// 累计接收字节数超过该值后结束会话
    pub threshold_bytes: u64,
    /// 单个数据报的接收缓冲
    pub recv_buffer_bytes: usize,
    /// 本端 SYN 的序号，后续段依次递增
    pub initial_seq: u8,
    /// 本端 SYN 通告的参数
    pub syn: SynParams,
    pub retry: RetryMode,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            threshold_bytes: DEFAULT_THRESHOLD_BYTES,
            recv_buffer_bytes: DEFAULT_RECV_BUFFER_BYTES,
            initial_seq: 0,
            syn: SynParams::default(),
            retry: RetryMode::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| RssiError::Config(e.to_string()))
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| RssiError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&raw)
    }
}
