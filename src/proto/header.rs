//! RSSI 头部编解码
//!
//! 头部以 16 位字为单位布局（主机字节序；字节序转换由 `net::Transport` 负责）：
//!
//! | 字 | 普通头部 | SYN 头部 |
//! |---|---|---|
//! | 0 | 标志位 \| 长度=8 | 标志位 \| 长度=24 |
//! | 1 | seq(高字节) \| ack(低字节) | 同左 |
//! | 2 | 保留 = 0 | 版本(4b) \| 标记位(1b) \| chk(1b) \| 最大未确认段数(8b) |
//! | 3 | 校验和 | 最大段长 |
//! | 4–6 | — | 重传超时 / 累计 ACK 超时 / 空闲超时 |
//! | 7 | — | 最大重传次数(高) \| 最大累计 ACK 数(低) |
//! | 8 | — | 超时单位 |
//! | 9–10 | — | 连接 ID（高字、低字） |
//! | 11 | — | 校验和 |
//!
//! 校验和总是头部最后一个字，只覆盖它之前的字。

use std::fmt;

use serde::{Deserialize, Serialize};

use super::checksum::compsum;
use crate::error::{Result, RssiError};

pub const FLAG_SYN: u16 = 1 << 15;
pub const FLAG_ACK: u16 = 1 << 14;
pub const FLAG_RST: u16 = 1 << 12;
pub const FLAG_NUL: u16 = 1 << 11;
pub const FLAG_BUSY: u16 = 1 << 8;

/// 普通头部：4 个字（8 字节）
pub const PLAIN_HEADER_WORDS: usize = 4;
/// SYN 头部：12 个字（24 字节）
pub const SYN_HEADER_WORDS: usize = 12;

/// SYN 字 2 中恒为 1 的标记位
const SYN_MARKER: u16 = 1 << 11;
const SYN_CHK: u16 = 1 << 10;
const VERSION_SHIFT: u16 = 12;
const VERSION_MASK: u8 = 0x0F;

/// 非 SYN 标志位（SYN 由 [`Header::syn`] 是否存在决定）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    pub ack: bool,
    pub rst: bool,
    pub nul: bool,
    pub busy: bool,
}

impl Flags {
    fn pack(self) -> u16 {
        let mut w = 0;
        if self.ack {
            w |= FLAG_ACK;
        }
        if self.rst {
            w |= FLAG_RST;
        }
        if self.nul {
            w |= FLAG_NUL;
        }
        if self.busy {
            w |= FLAG_BUSY;
        }
        w
    }

    fn unpack(w: u16) -> Self {
        Self {
            ack: w & FLAG_ACK != 0,
            rst: w & FLAG_RST != 0,
            nul: w & FLAG_NUL != 0,
            busy: w & FLAG_BUSY != 0,
        }
    }
}

/// SYN 段携带的连接参数（握手时协商，此后只读）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynParams {
    /// 协议版本，线上只占 4 位，编码时截断
    pub version: u8,
    pub checksum_enabled: bool,
    /// 窗口大小：一轮内最多接收的段数
    pub max_outstanding_segments: u8,
    /// 最大段长（字节，含头部）
    pub max_segment_size: u16,
    /// 以下三个超时以 `timeout_unit` 为刻度
    pub retransmission_timeout: u16,
    pub cumulative_ack_timeout: u16,
    pub null_timeout: u16,
    pub max_num_retransmissions: u8,
    pub max_cumulative_acks: u8,
    /// 超时刻度：一个刻度为 10^-unit 秒（3 即毫秒）
    pub timeout_unit: u16,
    pub connection_id: u32,
}

impl Default for SynParams {
    fn default() -> Self {
        Self {
            version: 1,
            checksum_enabled: true,
            max_outstanding_segments: 8,
            max_segment_size: 1024,
            retransmission_timeout: 10,
            cumulative_ack_timeout: 100,
            null_timeout: 100,
            max_num_retransmissions: 16,
            max_cumulative_acks: 1,
            timeout_unit: 3,
            connection_id: 0,
        }
    }
}

/// 一个协议头部。每次发送新建、每次接收重建，之后不再修改。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub flags: Flags,
    pub seq: u8,
    pub ack: u8,
    /// `Some` 即 SYN 段
    pub syn: Option<SynParams>,
}

impl Header {
    /// 握手 SYN 段
    pub fn syn(seq: u8, params: SynParams) -> Self {
        Self {
            flags: Flags::default(),
            seq,
            ack: 0,
            syn: Some(params),
        }
    }

    /// 对端的 SYN+ACK 应答
    pub fn syn_ack(seq: u8, ack: u8, params: SynParams) -> Self {
        Self {
            flags: Flags {
                ack: true,
                ..Flags::default()
            },
            seq,
            ack,
            syn: Some(params),
        }
    }

    /// 客户端的 ACK/NUL 段（握手第三步与每轮的累计确认）
    pub fn ack_nul(seq: u8, ack: u8) -> Self {
        Self {
            flags: Flags {
                ack: true,
                nul: true,
                ..Flags::default()
            },
            seq,
            ack,
            syn: None,
        }
    }

    /// 数据段头部（载荷紧随其后）
    pub fn data(seq: u8, ack: u8) -> Self {
        Self {
            flags: Flags {
                ack: true,
                ..Flags::default()
            },
            seq,
            ack,
            syn: None,
        }
    }

    pub fn is_syn(&self) -> bool {
        self.syn.is_some()
    }

    /// 头部长度（字），完全由 SYN 位决定
    pub fn len_words(&self) -> usize {
        if self.is_syn() {
            SYN_HEADER_WORDS
        } else {
            PLAIN_HEADER_WORDS
        }
    }

    pub fn len_bytes(&self) -> usize {
        self.len_words() * 2
    }

    /// 编码为 4 或 12 个字，最后一个字为校验和。
    pub fn encode(&self) -> Vec<u16> {
        let mut words = vec![0u16; self.len_words()];
        words[0] = self.flags.pack() | self.len_bytes() as u16;
        words[1] = (u16::from(self.seq) << 8) | u16::from(self.ack);

        if let Some(p) = &self.syn {
            let chk = if p.checksum_enabled { SYN_CHK } else { 0 };
            words[0] |= FLAG_SYN;
            words[2] = (u16::from(p.version & VERSION_MASK) << VERSION_SHIFT)
                | SYN_MARKER
                | chk
                | u16::from(p.max_outstanding_segments);
            words[3] = p.max_segment_size;
            words[4] = p.retransmission_timeout;
            words[5] = p.cumulative_ack_timeout;
            words[6] = p.null_timeout;
            words[7] =
                (u16::from(p.max_num_retransmissions) << 8) | u16::from(p.max_cumulative_acks);
            words[8] = p.timeout_unit;
            words[9] = (p.connection_id >> 16) as u16;
            words[10] = p.connection_id as u16;
        }

        let last = words.len() - 1;
        words[last] = compsum(&words, words.len());
        words
    }

    /// 从主机字节序的字序列解析头部。
    ///
    /// 先看字 0 的 SYN 位确定头部长度，再校验该长度内的校验和；校验失败时不解析其余字段。
    /// 多余的字（载荷）被忽略。
    pub fn decode(words: &[u16]) -> Result<Self> {
        let Some(&w0) = words.first() else {
            return Err(RssiError::Truncated {
                needed: PLAIN_HEADER_WORDS,
                got: 0,
            });
        };
        let is_syn = w0 & FLAG_SYN != 0;
        let len = if is_syn { SYN_HEADER_WORDS } else { PLAIN_HEADER_WORDS };
        if words.len() < len {
            return Err(RssiError::Truncated {
                needed: len,
                got: words.len(),
            });
        }

        let computed = compsum(words, len);
        let carried = words[len - 1];
        if computed != carried {
            return Err(RssiError::ChecksumMismatch { computed, carried });
        }

        let syn = is_syn.then(|| SynParams {
            version: (words[2] >> VERSION_SHIFT) as u8,
            checksum_enabled: words[2] & SYN_CHK != 0,
            max_outstanding_segments: words[2] as u8,
            max_segment_size: words[3],
            retransmission_timeout: words[4],
            cumulative_ack_timeout: words[5],
            null_timeout: words[6],
            // 高字节右移回 8 位宽度
            max_num_retransmissions: (words[7] >> 8) as u8,
            max_cumulative_acks: words[7] as u8,
            timeout_unit: words[8],
            connection_id: (u32::from(words[9]) << 16) | u32::from(words[10]),
        });

        Ok(Self {
            flags: Flags::unpack(w0),
            seq: (words[1] >> 8) as u8,
            ack: words[1] as u8,
            syn,
        })
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ ")?;
        if self.is_syn() {
            write!(f, "SYN ")?;
        }
        if self.flags.ack {
            write!(f, "ACK ")?;
        }
        if self.flags.rst {
            write!(f, "RST ")?;
        }
        if self.flags.nul {
            write!(f, "NUL ")?;
        }
        if self.flags.busy {
            write!(f, "BUSY ")?;
        }
        write!(f, "| {} | {} ]", self.seq, self.ack)?;

        if let Some(p) = &self.syn {
            write!(
                f,
                "\nVSN: {} \t CHK: {}\nMax outstanding segs: {}\nMax seg size: {}\n\
                 Retransmission timeout: {}\nCumulative ACK timeout: {}\nNull timeout: {}\n\
                 Max Number of Retransmissions: {}\nMax number of cumulative ACKs: {}\n\
                 Timeout unit: {}\nConnection ID: {}",
                p.version,
                u8::from(p.checksum_enabled),
                p.max_outstanding_segments,
                p.max_segment_size,
                p.retransmission_timeout,
                p.cumulative_ack_timeout,
                p.null_timeout,
                p.max_num_retransmissions,
                p.max_cumulative_acks,
                p.timeout_unit,
                p.connection_id,
            )?;
        }
        Ok(())
    }
}

/// 逐字二进制转储：`i: hhhhhhhh | llllllll`
pub fn dump_words(words: &[u16]) -> String {
    words
        .iter()
        .enumerate()
        .map(|(i, w)| format!("{i}: {:08b} | {:08b}", w >> 8, w & 0xFF))
        .collect::<Vec<_>>()
        .join("\n")
}
