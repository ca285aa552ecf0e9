//! RSSI 协议层
//!
//! 头部线上格式、校验和与 8 位序号运算；不做任何 I/O。

mod checksum;
mod header;
mod seq;

pub use checksum::compsum;
pub use header::{
    FLAG_ACK, FLAG_BUSY, FLAG_NUL, FLAG_RST, FLAG_SYN, Flags, Header, PLAIN_HEADER_WORDS,
    SYN_HEADER_WORDS, SynParams, dump_words,
};
pub use seq::{SeqCounter, expected_seq};
