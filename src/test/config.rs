use std::time::Duration;

use crate::error::RssiError;
use crate::peer::PeerConfig;
use crate::proto::{SeqCounter, SynParams};
use crate::session::{ClientConfig, RetryMode, RunStats, Session};

#[test]
fn defaults_match_reference_client() {
    let cfg = ClientConfig::default();
    assert_eq!(cfg.port, 8198);
    assert_eq!(cfg.threshold_bytes, 10_000_000);
    assert_eq!(cfg.recv_buffer_bytes, 4000);
    assert_eq!(cfg.initial_seq, 0);
    assert_eq!(cfg.syn, SynParams::default());
    assert_eq!(cfg.retry, RetryMode::Reference);
}

#[test]
fn partial_json_overrides_only_named_fields() {
    let cfg = ClientConfig::from_json_str(
        r#"{
            "threshold_bytes": 5000,
            "retry": "negotiated",
            "syn": { "max_outstanding_segments": 4, "timeout_unit": 6 }
        }"#,
    )
    .unwrap();

    assert_eq!(cfg.threshold_bytes, 5000);
    assert_eq!(cfg.retry, RetryMode::Negotiated);
    assert_eq!(cfg.syn.max_outstanding_segments, 4);
    assert_eq!(cfg.syn.timeout_unit, 6);
    assert_eq!(cfg.syn.max_segment_size, 1024);
    assert_eq!(cfg.port, 8198);
}

#[test]
fn malformed_json_is_config_error() {
    assert!(matches!(
        ClientConfig::from_json_str("{ threshold_bytes: }"),
        Err(RssiError::Config(_))
    ));
    assert!(matches!(
        ClientConfig::from_json_str(r#"{ "retry": "sometimes" }"#),
        Err(RssiError::Config(_))
    ));
}

#[test]
fn missing_file_is_config_error() {
    let path = std::env::temp_dir().join("rssi_rs_no_such_config.json");
    let err = ClientConfig::from_json_file(&path).unwrap_err();
    match err {
        RssiError::Config(msg) => assert!(msg.contains("rssi_rs_no_such_config.json")),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn config_survives_json() {
    let cfg = ClientConfig {
        initial_seq: 9,
        retry: RetryMode::Negotiated,
        ..ClientConfig::default()
    };
    let json = serde_json::to_string(&cfg).unwrap();
    assert_eq!(ClientConfig::from_json_str(&json).unwrap(), cfg);

    let peer: PeerConfig = serde_json::from_str(r#"{ "max_bytes": 4096 }"#).unwrap();
    assert_eq!(peer.max_bytes, Some(4096));
    assert_eq!(peer.idle_timeout_ms, 2000);
}

#[test]
fn stats_serialize_with_throughput() {
    let mut session = Session::new(SynParams::default(), SeqCounter::starting_at(2), 0);
    assert_eq!(session.next_local_seq(), 2);
    let stats = RunStats::from_session(&session, Duration::from_secs(2));
    assert_eq!(stats.throughput_mbps, 0.0);
    assert_eq!(stats.window, 8);

    let zero = RunStats::from_session(&session, Duration::ZERO);
    assert_eq!(zero.elapsed_secs, 0.0);

    let json: serde_json::Value = serde_json::to_value(&stats).unwrap();
    assert_eq!(json["total_bytes"], 0);
    assert_eq!(json["window"], 8);
    assert_eq!(json["elapsed_secs"], 2.0);
}

#[test]
fn stats_report_window_actually_used() {
    let params = SynParams {
        max_outstanding_segments: 0,
        ..SynParams::default()
    };
    let session = Session::new(params, SeqCounter::starting_at(2), 0);
    let stats = RunStats::from_session(&session, Duration::from_secs(1));
    assert_eq!(stats.window, 1);
}
