//! 会话记录
//!
//! 握手成功后创建，由引擎以 `&mut` 独占地逐步推进；不跨线程共享。

use crate::proto::{SeqCounter, SynParams, expected_seq};

#[derive(Debug, Clone)]
pub struct Session {
    /// 对端 SYN 中的参数，握手后只读
    negotiated: SynParams,
    local_seq: SeqCounter,
    /// 最后一次确认的对端序号
    last_ack: u8,
    total_bytes: u64,
    segments: u64,
    rounds_accepted: u64,
    rounds_rejected: u64,
    /// 连续被拒绝的轮数（一轮被接受即清零）
    consecutive_rejects: u32,
}

impl Session {
    pub fn new(negotiated: SynParams, local_seq: SeqCounter, last_ack: u8) -> Self {
        Self {
            negotiated,
            local_seq,
            last_ack,
            total_bytes: 0,
            segments: 0,
            rounds_accepted: 0,
            rounds_rejected: 0,
            consecutive_rejects: 0,
        }
    }

    pub fn negotiated(&self) -> &SynParams {
        &self.negotiated
    }

    /// 每轮最多接收的段数。对端通告 0 时按 1 处理，否则接收循环永远不会前进。
    pub fn window(&self) -> usize {
        usize::from(self.negotiated.max_outstanding_segments.max(1))
    }

    pub fn last_ack(&self) -> u8 {
        self.last_ack
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn segments(&self) -> u64 {
        self.segments
    }

    pub fn rounds_accepted(&self) -> u64 {
        self.rounds_accepted
    }

    pub fn rounds_rejected(&self) -> u64 {
        self.rounds_rejected
    }

    pub fn consecutive_rejects(&self) -> u32 {
        self.consecutive_rejects
    }

    /// 本轮第 `i` 个段的期望序号
    pub fn expected_seq(&self, i: usize) -> u8 {
        expected_seq(self.last_ack, i)
    }

    /// 分配下一个本端序号
    pub fn next_local_seq(&mut self) -> u8 {
        self.local_seq.next()
    }

    pub(crate) fn accept_round(&mut self, last_seq: u8, bytes: u64, segments: usize) {
        self.last_ack = last_seq;
        self.total_bytes = self.total_bytes.saturating_add(bytes);
        self.segments = self.segments.saturating_add(segments as u64);
        self.rounds_accepted += 1;
        self.consecutive_rejects = 0;
    }

    pub(crate) fn reject_round(&mut self) {
        self.rounds_rejected += 1;
        self.consecutive_rejects = self.consecutive_rejects.saturating_add(1);
    }
}
