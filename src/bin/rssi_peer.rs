//! RSSI 数据源对端
//!
//! 监听 UDP，回应一个客户端的 SYN，然后每收到一个累计 ACK 就发送下一窗数据段。

use clap::Parser;
use rssi_rs::peer::{PeerConfig, serve};
use std::fs;
use std::net::UdpSocket;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "rssi-peer", about = "RSSI 对端：握手后持续按窗口发送数据段")]
struct Args {
    /// 本地监听地址
    #[arg(long, default_value = "0.0.0.0:8198")]
    bind: String,

    /// JSON 配置文件（`PeerConfig`），命令行参数优先
    #[arg(long)]
    config: Option<PathBuf>,

    /// 通告的窗口（段数）
    #[arg(long)]
    window: Option<u8>,

    /// 最大段长（字节，含 8 字节头部）
    #[arg(long)]
    segment_size: Option<u16>,

    /// 空闲多久后退出（毫秒）
    #[arg(long)]
    idle_timeout_ms: Option<u64>,

    /// 最多发送多少字节
    #[arg(long)]
    max_bytes: Option<u64>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "对端失败");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut cfg: PeerConfig = match &args.config {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => PeerConfig::default(),
    };
    if let Some(window) = args.window {
        cfg.syn.max_outstanding_segments = window;
    }
    if let Some(size) = args.segment_size {
        cfg.syn.max_segment_size = size;
    }
    if let Some(idle) = args.idle_timeout_ms {
        cfg.idle_timeout_ms = idle;
    }
    if args.max_bytes.is_some() {
        cfg.max_bytes = args.max_bytes;
    }

    let sock = UdpSocket::bind(&args.bind)?;
    eprintln!("listening on {}", sock.local_addr()?);
    let stats = serve(sock, cfg)?;

    println!(
        "peer: bytes_sent={}, segments_sent={}, windows_sent={}, window={}",
        stats.bytes_sent, stats.segments_sent, stats.windows_sent, stats.window
    );
    Ok(())
}
