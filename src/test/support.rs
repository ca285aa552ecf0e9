//! 测试用内存信道

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use crate::net::Datagram;
use crate::peer::{PeerConfig, StreamPeer};
use crate::proto::Header;

pub fn to_bytes(words: &[u16]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_be_bytes()).collect()
}

pub fn from_bytes(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|b| u16::from_be_bytes([b[0], b[1]]))
        .collect()
}

/// 头部 + `payload_len` 字节零载荷
pub fn segment(hdr: &Header, payload_len: usize) -> Vec<u8> {
    let mut bytes = to_bytes(&hdr.encode());
    bytes.resize(bytes.len() + payload_len, 0);
    bytes
}

fn pop_into(
    inbound: &mut VecDeque<Vec<u8>>,
    timeout: Option<Duration>,
    buf: &mut [u8],
) -> io::Result<usize> {
    match inbound.pop_front() {
        Some(dgram) => {
            let n = dgram.len().min(buf.len());
            buf[..n].copy_from_slice(&dgram[..n]);
            Ok(n)
        }
        None if timeout.is_some() => Err(io::Error::new(io::ErrorKind::TimedOut, "no datagram")),
        // 无超时时真实 socket 会永久阻塞；测试里以 EOF 结束
        None => Err(io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted")),
    }
}

/// 预先排好入站数据报的信道
#[derive(Debug, Default)]
pub struct ScriptedLink {
    pub inbound: VecDeque<Vec<u8>>,
    pub sent: Vec<Vec<u8>>,
    pub timeout: Option<Duration>,
}

impl ScriptedLink {
    pub fn push(&mut self, hdr: &Header, payload_len: usize) {
        self.inbound.push_back(segment(hdr, payload_len));
    }

    pub fn push_raw(&mut self, bytes: Vec<u8>) {
        self.inbound.push_back(bytes);
    }

    pub fn sent_headers(&self) -> Vec<Header> {
        self.sent
            .iter()
            .map(|b| Header::decode(&from_bytes(b)).expect("client sent an invalid header"))
            .collect()
    }
}

impl Datagram for ScriptedLink {
    fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.sent.push(bytes.to_vec());
        Ok(())
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        pop_into(&mut self.inbound, self.timeout, buf)
    }

    fn set_recv_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        self.timeout = timeout;
        Ok(())
    }
}

/// 直接接到 [`StreamPeer`] 的信道；可让某个数据段丢失一次
#[derive(Debug)]
pub struct PeerLink {
    pub peer: StreamPeer,
    pub inbound: VecDeque<Vec<u8>>,
    pub sent: Vec<Header>,
    pub timeout: Option<Duration>,
    drop_seq_once: Option<u8>,
}

impl PeerLink {
    pub fn new(cfg: PeerConfig) -> Self {
        Self {
            peer: StreamPeer::new(cfg),
            inbound: VecDeque::new(),
            sent: Vec::new(),
            timeout: None,
            drop_seq_once: None,
        }
    }

    pub fn drop_data_seq_once(mut self, seq: u8) -> Self {
        self.drop_seq_once = Some(seq);
        self
    }
}

impl Datagram for PeerLink {
    fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        let words = from_bytes(bytes);
        if let Ok(hdr) = Header::decode(&words) {
            self.sent.push(hdr);
        }
        for seg in self.peer.on_words(&words) {
            if !seg.header.is_syn() && self.drop_seq_once == Some(seg.header.seq) {
                self.drop_seq_once = None;
                continue;
            }
            let mut dgram = to_bytes(&seg.header.encode());
            dgram.extend_from_slice(&seg.payload);
            self.inbound.push_back(dgram);
        }
        Ok(())
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        pop_into(&mut self.inbound, self.timeout, buf)
    }

    fn set_recv_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        self.timeout = timeout;
        Ok(())
    }
}
