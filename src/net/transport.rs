//! Transport adapter: host/network byte order and datagram I/O.
//!
//! Words are serialised most-significant byte first (network order). Nothing
//! here interprets header semantics beyond handing words to `Header::decode`.

use std::io;
use std::time::Duration;

use tracing::{debug, trace, warn};

use super::Datagram;
use crate::error::{Result, RssiError};
use crate::proto::{Header, dump_words};

/// Default receive buffer (bytes) for a single datagram.
pub const DEFAULT_RECV_BUFFER_BYTES: usize = 4000;

#[derive(Debug)]
pub struct Transport<D> {
    inner: D,
    buf: Vec<u8>,
    max_words: usize,
    timeout: Option<Duration>,
}

impl<D: Datagram> Transport<D> {
    pub fn new(inner: D, recv_buffer_bytes: usize) -> Self {
        let max_words = (recv_buffer_bytes / 2).max(crate::proto::SYN_HEADER_WORDS);
        Self {
            inner,
            buf: vec![0; max_words * 2],
            max_words,
            timeout: None,
        }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut D {
        &mut self.inner
    }

    pub fn into_inner(self) -> D {
        self.inner
    }

    /// Largest datagram, in words, that `recv_header` will convert.
    pub fn max_words(&self) -> usize {
        self.max_words
    }

    pub fn recv_timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Set the receive timeout, touching the channel only when it changes.
    pub fn set_recv_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        if self.timeout != timeout {
            self.inner.set_recv_timeout(timeout)?;
            self.timeout = timeout;
        }
        Ok(())
    }

    /// Send host-order words as one datagram.
    pub fn send_words(&mut self, words: &[u16]) -> Result<()> {
        self.send_with_payload(words, &[])
    }

    /// Encode and send a header.
    pub fn send_header(&mut self, hdr: &Header) -> Result<()> {
        self.send_segment(hdr, &[])
    }

    /// Encode a header and append raw payload bytes after it.
    pub fn send_segment(&mut self, hdr: &Header, payload: &[u8]) -> Result<()> {
        let words = hdr.encode();
        debug!(seq = hdr.seq, ack = hdr.ack, payload = payload.len(), "send {hdr}");
        trace!("\n{}", dump_words(&words));
        self.send_with_payload(&words, payload)
    }

    fn send_with_payload(&mut self, words: &[u16], payload: &[u8]) -> Result<()> {
        let mut bytes = Vec::with_capacity(words.len() * 2 + payload.len());
        for w in words {
            bytes.extend_from_slice(&w.to_be_bytes());
        }
        bytes.extend_from_slice(payload);
        self.inner.send(&bytes)?;
        Ok(())
    }

    /// Receive one datagram and convert up to `max_words` words to host order.
    ///
    /// Returns the words and the datagram's byte count. A trailing odd byte is
    /// counted but not converted.
    pub fn recv_words(&mut self, max_words: usize) -> Result<(Vec<u16>, usize)> {
        let limit = (max_words * 2).min(self.buf.len());
        let n = self.inner.recv(&mut self.buf[..limit]).map_err(map_timeout)?;
        let words = self.buf[..n]
            .chunks_exact(2)
            .map(|b| u16::from_be_bytes([b[0], b[1]]))
            .collect();
        Ok((words, n))
    }

    /// Receive and decode one header. The byte count covers the whole datagram.
    pub fn recv_header(&mut self) -> Result<(Header, usize)> {
        let (words, n) = self.recv_words(self.max_words)?;
        match Header::decode(&words) {
            Ok(hdr) => {
                debug!(seq = hdr.seq, ack = hdr.ack, bytes = n, "recv {hdr}");
                Ok((hdr, n))
            }
            Err(err) => {
                let shown = words.len().min(crate::proto::SYN_HEADER_WORDS);
                warn!(%err, bytes = n, "discarding datagram\n{}", dump_words(&words[..shown]));
                Err(err)
            }
        }
    }
}

fn map_timeout(err: io::Error) -> RssiError {
    match err.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => RssiError::Timeout,
        _ => RssiError::Io(err),
    }
}
