//! 8 位序号空间（模 256 回绕）

/// 一轮内第 `i` 个段（从 0 计）的期望序号：`(last_ack + 1 + i) mod 256`
pub fn expected_seq(last_ack: u8, i: usize) -> u8 {
    last_ack.wrapping_add(1).wrapping_add(i as u8)
}

/// 本端发送序号计数器：取当前值后自增（回绕）。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeqCounter(u8);

impl SeqCounter {
    pub fn starting_at(seq: u8) -> Self {
        Self(seq)
    }

    /// 下一个将被分配的序号
    pub fn peek(&self) -> u8 {
        self.0
    }

    pub fn next(&mut self) -> u8 {
        let s = self.0;
        self.0 = s.wrapping_add(1);
        s
    }
}
