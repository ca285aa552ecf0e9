//! 在 UDP 上驱动 [`StreamPeer`]

use std::io;
use std::net::UdpSocket;
use std::time::Duration;

use tracing::info;

use super::{PeerConfig, PeerStats, StreamPeer};
use crate::error::{Result, RssiError};
use crate::net::{Transport, UdpDatagram};

/// 服务一个客户端：锁定第一个发来数据报的地址，空闲超时或对端关闭后返回。
pub fn serve(sock: UdpSocket, cfg: PeerConfig) -> Result<PeerStats> {
    let idle = Duration::from_millis(cfg.idle_timeout_ms.max(1));
    sock.set_read_timeout(Some(idle))?;

    let mut probe = vec![0u8; cfg.recv_buffer_bytes.max(2)];
    let client = match sock.peek_from(&mut probe) {
        Ok((_, addr)) => addr,
        Err(e) if is_timeout(&e) => {
            info!("空闲超时，未收到任何客户端");
            return Ok(PeerStats::default());
        }
        Err(e) => return Err(e.into()),
    };
    sock.connect(client)?;
    info!(%client, "客户端已锁定");

    let mut transport = Transport::new(UdpDatagram::from_connected(sock), cfg.recv_buffer_bytes);
    transport.set_recv_timeout(Some(idle))?;
    let max_words = transport.max_words();
    let mut peer = StreamPeer::new(cfg);

    'serve: loop {
        let words = match transport.recv_words(max_words) {
            Ok((words, _)) => words,
            Err(RssiError::Timeout) => break,
            Err(RssiError::Io(e)) if e.kind() == io::ErrorKind::ConnectionRefused => break,
            Err(e) => return Err(e),
        };
        for seg in peer.on_words(&words) {
            match transport.send_segment(&seg.header, &seg.payload) {
                Ok(()) => {}
                // 客户端端口已关闭
                Err(RssiError::Io(e)) if e.kind() == io::ErrorKind::ConnectionRefused => {
                    break 'serve;
                }
                Err(e) => return Err(e),
            }
        }
    }

    let stats = peer.stats().clone();
    info!(
        bytes_sent = stats.bytes_sent,
        segments_sent = stats.segments_sent,
        "✅ 对端结束"
    );
    Ok(stats)
}

fn is_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}
