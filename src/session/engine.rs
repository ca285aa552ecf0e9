//! 握手与窗口接收引擎
//!
//! 单线程、阻塞式：每一步都是一次阻塞收发，[`Session`] 在两次 I/O 之间被就地修改。
//!
//! 流程：
//! 1. 发送 SYN（本端参数），进入 `SynSent`
//! 2. 收到带 SYN 且校验通过的应答：记录对端参数，回 ACK/NUL，进入 `Established`
//! 3. 按轮接收：一轮最多 `max_outstanding_segments` 个段，序号须依次为
//!    `last_ack + 1 + i (mod 256)`；全部符合才累计字节、推进 `last_ack` 并回一个累计 ACK
//! 4. 累计字节超过阈值后进入 `Closed`

use std::time::Instant;

use tracing::{debug, info, warn};

use super::retry::{Phase, RetryPolicy, RoundAction};
use super::{ClientConfig, ConnState, RunStats, Session};
use crate::error::{Result, RssiError};
use crate::net::{Datagram, Transport};
use crate::proto::{Header, SeqCounter};

/// 一轮的结果
#[derive(Debug)]
pub enum RoundOutcome {
    /// 整轮序号连续：已回累计 ACK
    Accepted { ack: u8, bytes: u64, segments: usize },
    /// 某个段无效或序号不符：不推进状态
    Rejected { reason: RssiError, action: RoundAction },
}

/// RSSI 客户端
pub struct Client<D> {
    transport: Transport<D>,
    cfg: ClientConfig,
    policy: Box<dyn RetryPolicy>,
    state: ConnState,
}

impl<D: Datagram> Client<D> {
    /// 按 `cfg.retry` 选择重试策略
    pub fn new(datagram: D, cfg: ClientConfig) -> Self {
        let policy = cfg.retry.policy();
        Self::with_policy(datagram, cfg, policy)
    }

    pub fn with_policy(datagram: D, cfg: ClientConfig, policy: Box<dyn RetryPolicy>) -> Self {
        let transport = Transport::new(datagram, cfg.recv_buffer_bytes);
        Self {
            transport,
            cfg,
            policy,
            state: ConnState::Idle,
        }
    }

    pub fn state(&self) -> ConnState {
        self.state
    }

    pub fn transport(&self) -> &Transport<D> {
        &self.transport
    }

    pub fn into_inner(self) -> D {
        self.transport.into_inner()
    }

    fn set_state(&mut self, next: ConnState) {
        debug!(from = %self.state, to = %next, "状态迁移");
        self.state = next;
    }

    /// 三次握手：`Idle → SynSent → Established`
    #[tracing::instrument(skip(self))]
    pub fn connect(&mut self) -> Result<Session> {
        let mut local_seq = SeqCounter::starting_at(self.cfg.initial_seq);
        let syn = Header::syn(local_seq.next(), self.cfg.syn);

        info!("发送 SYN\n{syn}");
        self.transport
            .set_recv_timeout(self.policy.recv_timeout(&self.cfg.syn, Phase::Handshake))?;
        self.transport.send_header(&syn)?;
        self.set_state(ConnState::SynSent);

        let mut attempt = 0;
        let (peer_seq, negotiated) = loop {
            attempt += 1;
            let err = match self.transport.recv_header() {
                Ok((hdr, _)) => match hdr.syn {
                    Some(params) => {
                        info!("收到 SYN 应答\n{hdr}");
                        break (hdr.seq, params);
                    }
                    None => RssiError::NotSyn,
                },
                Err(err @ RssiError::Io(_)) => return Err(err),
                Err(err) => err,
            };
            self.policy.on_handshake_failure(&self.cfg.syn, attempt, err)?;
            self.transport.send_header(&syn)?;
        };

        let ack = Header::ack_nul(local_seq.next(), peer_seq);
        self.transport.send_header(&ack)?;
        self.set_state(ConnState::Established);
        info!(
            peer_seq,
            window = negotiated.max_outstanding_segments,
            max_seg = negotiated.max_segment_size,
            "✅ 连接已建立"
        );

        Ok(Session::new(negotiated, local_seq, peer_seq))
    }

    /// 接收一轮并在整轮有效时回累计 ACK。
    ///
    /// 段级错误（校验和、截断、序号不符、超时）只让本轮被拒绝；I/O 错误直接返回。
    pub fn run_round(&mut self, session: &mut Session) -> Result<RoundOutcome> {
        self.transport
            .set_recv_timeout(self.policy.recv_timeout(session.negotiated(), Phase::Streaming))?;

        let mut bytes = 0u64;
        let mut last_seq = session.last_ack();
        let mut rejected = None;
        let window = session.window();

        for i in 0..window {
            let expected = session.expected_seq(i);
            match self.transport.recv_header() {
                Ok((hdr, n)) if hdr.seq == expected => {
                    bytes += n as u64;
                    last_seq = hdr.seq;
                }
                Ok((hdr, _)) => {
                    rejected = Some(RssiError::SequenceMismatch {
                        expected,
                        got: hdr.seq,
                    });
                    break;
                }
                Err(err) if err.is_segment_local() || matches!(err, RssiError::Timeout) => {
                    rejected = Some(err);
                    break;
                }
                Err(err) => return Err(err),
            }
        }

        if let Some(reason) = rejected {
            session.reject_round();
            warn!(%reason, last_ack = session.last_ack(), "本轮被拒绝");
            let action = self
                .policy
                .on_round_rejected(session.negotiated(), session.consecutive_rejects())?;
            if action == RoundAction::ResendAck {
                let stale = self.drain_stale()?;
                let ack = Header::ack_nul(session.next_local_seq(), session.last_ack());
                debug!(stale, ack = ack.ack, "重发累计 ACK");
                self.transport.send_header(&ack)?;
            }
            return Ok(RoundOutcome::Rejected { reason, action });
        }

        session.accept_round(last_seq, bytes, window);
        let ack = Header::ack_nul(session.next_local_seq(), last_seq);
        self.transport.send_header(&ack)?;
        Ok(RoundOutcome::Accepted {
            ack: last_seq,
            bytes,
            segments: window,
        })
    }

    /// 读掉已到达但不再有用的数据报，直到接收超时。未设超时时不读，避免永久阻塞。
    fn drain_stale(&mut self) -> Result<usize> {
        if self.transport.recv_timeout().is_none() {
            return Ok(0);
        }
        let mut stale = 0;
        loop {
            match self.transport.recv_header() {
                Ok(_) => stale += 1,
                Err(RssiError::Timeout) => return Ok(stale),
                Err(err @ RssiError::Io(_)) => return Err(err),
                Err(_) => stale += 1,
            }
        }
    }

    /// `Established → Streaming → Closed`：持续收轮直到累计字节超过阈值
    #[tracing::instrument(skip(self, session))]
    pub fn stream(&mut self, session: &mut Session) -> Result<RunStats> {
        self.set_state(ConnState::Streaming);
        let start = Instant::now();

        while session.total_bytes() <= self.cfg.threshold_bytes {
            self.run_round(session)?;
        }

        let stats = RunStats::from_session(session, start.elapsed());
        self.set_state(ConnState::Closed);
        info!(
            total_bytes = stats.total_bytes,
            rounds = stats.rounds_accepted,
            rejected = stats.rounds_rejected,
            elapsed_secs = stats.elapsed_secs,
            "✅ 会话结束"
        );
        Ok(stats)
    }

    /// 握手并接收到阈值
    pub fn run(&mut self) -> Result<RunStats> {
        let mut session = self.connect()?;
        self.stream(&mut session)
    }
}
