// 测试辅助
mod support;

mod config;
mod handshake;
