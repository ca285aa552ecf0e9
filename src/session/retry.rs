//! 超时与重试策略
//!
//! 握手协商出的三个超时字段在参考行为中从不生效：接收无限阻塞，SYN 不重发，
//! 被拒绝的轮次也不补发 ACK。[`Reference`] 原样保留这种行为；[`Negotiated`]
//! 是可选的增强，按协商值设置接收超时并做有界重试。

use std::fmt;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RssiError};
use crate::proto::SynParams;

/// 当前所处的协议阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Handshake,
    Streaming,
}

/// 一轮被拒绝后的动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundAction {
    /// 什么也不发，直接开始下一轮
    Continue,
    /// 丢弃积压的数据报直到接收超时，再重发上一次的累计 ACK，促使对端从其后整窗重传
    ResendAck,
}

pub trait RetryPolicy: fmt::Debug {
    /// 单次接收的超时；`None` 表示无限期阻塞
    fn recv_timeout(&self, params: &SynParams, phase: Phase) -> Option<Duration>;

    /// 第 `attempt` 次（从 1 计）握手应答失败。返回 `Ok(())` 表示重发 SYN 再等；
    /// 返回 `Err` 则握手以该错误结束。
    fn on_handshake_failure(
        &mut self,
        params: &SynParams,
        attempt: u32,
        err: RssiError,
    ) -> Result<()>;

    /// 连续第 `consecutive` 轮被拒绝后的动作；`Err` 终止会话
    fn on_round_rejected(&mut self, params: &SynParams, consecutive: u32) -> Result<RoundAction>;
}

/// 参考行为：无超时、不重试、拒绝后无条件进入下一轮
#[derive(Debug, Default, Clone, Copy)]
pub struct Reference;

impl RetryPolicy for Reference {
    fn recv_timeout(&self, _params: &SynParams, _phase: Phase) -> Option<Duration> {
        None
    }

    fn on_handshake_failure(
        &mut self,
        _params: &SynParams,
        _attempt: u32,
        err: RssiError,
    ) -> Result<()> {
        Err(err)
    }

    fn on_round_rejected(&mut self, _params: &SynParams, _consecutive: u32) -> Result<RoundAction> {
        Ok(RoundAction::Continue)
    }
}

/// 按协商参数执行的定时器策略（增强行为）。
///
/// - 握手：等待 `retransmission_timeout`，最多重发 `max_num_retransmissions` 次 SYN
/// - 数据：等待 `cumulative_ack_timeout`；被拒绝后重发上次 ACK，
///   连续 `max_num_retransmissions` 轮失败后放弃
#[derive(Debug, Default, Clone, Copy)]
pub struct Negotiated;

impl RetryPolicy for Negotiated {
    fn recv_timeout(&self, params: &SynParams, phase: Phase) -> Option<Duration> {
        let ticks = match phase {
            Phase::Handshake => params.retransmission_timeout,
            Phase::Streaming => params.cumulative_ack_timeout,
        };
        ticks_to_duration(ticks, params.timeout_unit)
    }

    fn on_handshake_failure(
        &mut self,
        params: &SynParams,
        attempt: u32,
        err: RssiError,
    ) -> Result<()> {
        if attempt > u32::from(params.max_num_retransmissions) {
            return Err(RssiError::RetriesExhausted { attempts: attempt });
        }
        tracing::warn!(attempt, %err, "握手失败，重发 SYN");
        Ok(())
    }

    fn on_round_rejected(&mut self, params: &SynParams, consecutive: u32) -> Result<RoundAction> {
        if consecutive > u32::from(params.max_num_retransmissions) {
            return Err(RssiError::RetriesExhausted {
                attempts: consecutive,
            });
        }
        Ok(RoundAction::ResendAck)
    }
}

/// `ticks` 个 10^-`unit` 秒；0 个刻度表示不设超时。`unit` 超过 9 按纳秒计。
pub fn ticks_to_duration(ticks: u16, unit: u16) -> Option<Duration> {
    if ticks == 0 {
        return None;
    }
    let tick_ns = 10u64.pow(9 - u32::from(unit.min(9)));
    Some(Duration::from_nanos(u64::from(ticks) * tick_ns))
}

/// 配置/命令行中选择的策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum RetryMode {
    #[default]
    Reference,
    Negotiated,
}

impl RetryMode {
    pub fn policy(self) -> Box<dyn RetryPolicy> {
        match self {
            RetryMode::Reference => Box::new(Reference),
            RetryMode::Negotiated => Box::new(Negotiated),
        }
    }
}
