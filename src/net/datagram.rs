//! 数据报信道抽象

use std::fmt;
use std::io;
use std::time::Duration;

/// 一条已"连接"的数据报信道：发往/收自固定的对端。
///
/// 真实实现是 UDP（[`super::UdpDatagram`]），测试中可替换为内存信道。
pub trait Datagram: fmt::Debug {
    /// 发送一个完整数据报
    fn send(&mut self, bytes: &[u8]) -> io::Result<()>;
    /// 阻塞接收一个数据报，返回写入 `buf` 的字节数（超出部分被截断）
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize>;
    /// `None` 表示无限期阻塞。超时以 `WouldBlock`/`TimedOut` 错误返回。
    fn set_recv_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()>;
}

impl<D: Datagram + ?Sized> Datagram for Box<D> {
    fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        (**self).send(bytes)
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).recv(buf)
    }

    fn set_recv_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        (**self).set_recv_timeout(timeout)
    }
}
