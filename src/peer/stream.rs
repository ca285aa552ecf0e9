//! 数据源对端状态机（不做 I/O）
//!
//! 输入一个收到的头部，输出需要发送的段；由 [`super::serve`] 或测试中的内存信道驱动。

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::net::DEFAULT_RECV_BUFFER_BYTES;
use crate::proto::{Header, PLAIN_HEADER_WORDS, SynParams};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeerConfig {
    /// 本端在 SYN+ACK 中通告的参数；窗口取双方较小值
    pub syn: SynParams,
    /// SYN+ACK 的序号，数据段从其后开始编号
    pub initial_seq: u8,
    /// 多久收不到任何数据报就结束（毫秒）
    pub idle_timeout_ms: u64,
    /// 发送字节数上限；`None` 表示只要收到 ACK 就继续发
    pub max_bytes: Option<u64>,
    pub recv_buffer_bytes: usize,
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            syn: SynParams::default(),
            initial_seq: 0,
            idle_timeout_ms: 2_000,
            max_bytes: None,
            recv_buffer_bytes: DEFAULT_RECV_BUFFER_BYTES,
        }
    }
}

/// 一个待发送的段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outgoing {
    pub header: Header,
    pub payload: Vec<u8>,
}

impl Outgoing {
    pub fn len_bytes(&self) -> usize {
        self.header.len_bytes() + self.payload.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerState {
    Listen,
    SynReceived,
    Established,
    /// 已达到 `max_bytes`
    Drained,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeerStats {
    pub bytes_sent: u64,
    pub segments_sent: u64,
    pub windows_sent: u64,
    pub window: u8,
}

#[derive(Debug)]
pub struct StreamPeer {
    cfg: PeerConfig,
    state: PeerState,
    window: u8,
    payload_len: usize,
    /// 最近一次看到的客户端序号，填进数据段的 ack 字段
    client_seq: u8,
    stats: PeerStats,
}

impl StreamPeer {
    pub fn new(cfg: PeerConfig) -> Self {
        Self {
            cfg,
            state: PeerState::Listen,
            window: 0,
            payload_len: 0,
            client_seq: 0,
            stats: PeerStats::default(),
        }
    }

    pub fn state(&self) -> PeerState {
        self.state
    }

    pub fn stats(&self) -> &PeerStats {
        &self.stats
    }

    /// 处理一个主机字节序的数据报；无效数据报直接丢弃
    pub fn on_words(&mut self, words: &[u16]) -> Vec<Outgoing> {
        match Header::decode(words) {
            Ok(hdr) => self.on_header(&hdr),
            Err(err) => {
                warn!(%err, "对端丢弃无效数据报");
                Vec::new()
            }
        }
    }

    pub fn on_header(&mut self, hdr: &Header) -> Vec<Outgoing> {
        if let Some(req) = &hdr.syn {
            return vec![self.accept_syn(hdr.seq, req)];
        }
        if !hdr.flags.ack {
            return Vec::new();
        }
        self.client_seq = hdr.seq;

        match self.state {
            PeerState::Listen | PeerState::Drained => Vec::new(),
            PeerState::SynReceived => {
                if hdr.ack != self.cfg.initial_seq {
                    debug!(ack = hdr.ack, "握手 ACK 的确认号不符，忽略");
                    return Vec::new();
                }
                self.state = PeerState::Established;
                self.window_after(self.cfg.initial_seq)
            }
            // 累计 ACK 落后时从其后整窗重发（go-back-N）
            PeerState::Established => self.window_after(hdr.ack),
        }
    }

    /// 收到 SYN（含重发的 SYN）：回 SYN+ACK 并重置数据流位置
    fn accept_syn(&mut self, client_seq: u8, req: &SynParams) -> Outgoing {
        self.window = req
            .max_outstanding_segments
            .min(self.cfg.syn.max_outstanding_segments)
            .max(1);
        self.payload_len =
            usize::from(self.cfg.syn.max_segment_size).saturating_sub(PLAIN_HEADER_WORDS * 2);
        self.client_seq = client_seq;
        self.state = PeerState::SynReceived;

        let params = SynParams {
            max_outstanding_segments: self.window,
            ..self.cfg.syn
        };
        self.stats.window = self.window;
        debug!(window = self.window, payload = self.payload_len, "回复 SYN+ACK");
        Outgoing {
            header: Header::syn_ack(self.cfg.initial_seq, client_seq, params),
            payload: Vec::new(),
        }
    }

    fn window_after(&mut self, acked: u8) -> Vec<Outgoing> {
        let mut out = Vec::with_capacity(usize::from(self.window));
        for i in 0..self.window {
            if self.cfg.max_bytes.is_some_and(|max| self.stats.bytes_sent >= max) {
                self.state = PeerState::Drained;
                break;
            }
            let seq = acked.wrapping_add(1).wrapping_add(i);
            let payload = (0..self.payload_len)
                .map(|j| (j as u8).wrapping_add(seq))
                .collect();
            let seg = Outgoing {
                header: Header::data(seq, self.client_seq),
                payload,
            };
            self.stats.bytes_sent += seg.len_bytes() as u64;
            self.stats.segments_sent += 1;
            out.push(seg);
        }
        if !out.is_empty() {
            self.stats.windows_sent += 1;
        }
        out
    }
}
