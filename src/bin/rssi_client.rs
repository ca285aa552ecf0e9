//! RSSI 客户端
//!
//! 与对端完成 SYN 握手后按窗口接收数据段并累计确认，直到收到的字节数超过阈值。

use clap::Parser;
use rssi_rs::net::UdpDatagram;
use rssi_rs::session::{Client, ClientConfig, RetryMode};
use std::fs;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "rssi-client", about = "RSSI 客户端：握手后按窗口接收并累计确认")]
struct Args {
    /// 对端地址（IP 或主机名）
    address: String,

    /// 对端端口（默认 8198）
    #[arg(long)]
    port: Option<u16>,

    /// 累计接收超过多少字节后结束（默认 10_000_000）
    #[arg(long)]
    threshold_bytes: Option<u64>,

    /// JSON 配置文件（`ClientConfig`），命令行参数优先
    #[arg(long)]
    config: Option<PathBuf>,

    /// 超时/重试策略
    #[arg(long, value_enum)]
    retry: Option<RetryMode>,

    /// 把运行统计写成 JSON
    #[arg(long)]
    stats_json: Option<PathBuf>,
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
            tracing::error!(%err, "客户端失败");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut cfg = match &args.config {
        Some(path) => ClientConfig::from_json_file(path)?,
        None => ClientConfig::default(),
    };
    if let Some(port) = args.port {
        cfg.port = port;
    }
    if let Some(threshold) = args.threshold_bytes {
        cfg.threshold_bytes = threshold;
    }
    if let Some(retry) = args.retry {
        cfg.retry = retry;
    }

    let peer: SocketAddr = (args.address.as_str(), cfg.port)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| format!("cannot resolve {}", args.address))?;

    let sock = UdpDatagram::connect(peer)?;
    let mut client = Client::new(sock, cfg);
    let stats = client.run()?;

    println!(
        "Sent {} bytes in {:.4} seconds",
        stats.total_bytes, stats.elapsed_secs
    );

    if let Some(path) = args.stats_json {
        let json = serde_json::to_string_pretty(&stats)?;
        fs::write(&path, json)?;
        eprintln!("wrote stats to {}", path.display());
    }
    Ok(())
}
