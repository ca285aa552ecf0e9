//! UDP 数据报信道

use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
use std::time::Duration;

use tracing::debug;

use super::Datagram;

/// 参考部署中对端监听的端口
pub const DEFAULT_PORT: u16 = 8198;

/// 绑定临时端口并 `connect` 到对端的 UDP socket
#[derive(Debug)]
pub struct UdpDatagram {
    sock: UdpSocket,
}

impl UdpDatagram {
    pub fn connect(peer: SocketAddr) -> io::Result<Self> {
        let local: SocketAddr = if peer.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let sock = UdpSocket::bind(local)?;
        sock.connect(peer)?;
        debug!(local = %sock.local_addr()?, %peer, "UDP 已连接");
        Ok(Self { sock })
    }

    /// 包装一个已经 `connect` 过的 socket
    pub fn from_connected(sock: UdpSocket) -> Self {
        Self { sock }
    }
}

impl Datagram for UdpDatagram {
    fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.sock.send(bytes)?;
        Ok(())
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.sock.recv(buf)
    }

    fn set_recv_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        // 零时长会被标准库拒绝
        let timeout = timeout.map(|t| t.max(Duration::from_millis(1)));
        self.sock.set_read_timeout(timeout)
    }
}
