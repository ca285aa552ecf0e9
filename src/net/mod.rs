//! 传输适配层
//!
//! 数据报信道抽象、UDP 实现，以及负责字节序转换的 [`Transport`]。

// 子模块声明
mod datagram;
mod transport;
mod udp;

// 重新导出公共接口
pub use datagram::Datagram;
pub use transport::{DEFAULT_RECV_BUFFER_BYTES, Transport};
pub use udp::{DEFAULT_PORT, UdpDatagram};
