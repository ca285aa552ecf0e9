//! 头部校验和
//!
//! 16 位反码累加：对前 `count - 1` 个字求和，**只折叠一次**进位，再取反。
//! 第二次相加产生的进位被直接丢弃（与对端线上格式保持一致，不要"修正"为完整的
//! RFC 1071 折叠循环）。

/// 计算 `words[..count - 1]` 的校验和；校验和槽位（第 `count - 1` 个字）本身不参与。
///
/// `count` 超过 `words.len()` 时只累加实际存在的字。
pub fn compsum(words: &[u16], count: usize) -> u16 {
    let n = count.saturating_sub(1).min(words.len());
    let sum: u32 = words[..n].iter().map(|&w| u32::from(w)).sum();
    let folded = (sum & 0xFFFF) + (sum >> 16);
    // 折叠后可能仍有第 17 位，截断即丢弃
    (folded as u16) ^ 0xFFFF
}
