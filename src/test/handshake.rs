use crate::error::RssiError;
use crate::peer::PeerConfig;
use crate::proto::{Header, SynParams};
use crate::session::{Client, ClientConfig, ConnState, RetryMode};
use crate::test::support::{PeerLink, ScriptedLink, to_bytes};

fn corrupted(hdr: &Header) -> Vec<u8> {
    let mut words = hdr.encode();
    words[3] ^= 1;
    to_bytes(&words)
}

#[test]
fn connect_against_peer_reaches_established() {
    let peer_cfg = PeerConfig {
        initial_seq: 77,
        ..PeerConfig::default()
    };
    let mut client = Client::new(PeerLink::new(peer_cfg), ClientConfig::default());
    assert_eq!(client.state(), ConnState::Idle);

    let session = client.connect().expect("handshake");
    assert_eq!(client.state(), ConnState::Established);
    assert_eq!(session.last_ack(), 77);
    assert_eq!(session.window(), 8);
    assert_eq!(session.negotiated().max_segment_size, 1024);

    let sent = &client.transport().inner().sent;
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0], Header::syn(0, SynParams::default()));
    assert_eq!(sent[1], Header::ack_nul(1, 77));
}

#[test]
fn negotiated_window_comes_from_peer_reply() {
    let cfg = ClientConfig {
        syn: SynParams {
            max_outstanding_segments: 3,
            ..SynParams::default()
        },
        ..ClientConfig::default()
    };
    let mut client = Client::new(PeerLink::new(PeerConfig::default()), cfg);
    let session = client.connect().unwrap();
    assert_eq!(session.negotiated().max_outstanding_segments, 3);
    assert_eq!(session.window(), 3);
}

#[test]
fn initial_seq_numbers_syn_and_ack() {
    let cfg = ClientConfig {
        initial_seq: 255,
        ..ClientConfig::default()
    };
    let mut client = Client::new(PeerLink::new(PeerConfig::default()), cfg);
    client.connect().unwrap();
    let sent = &client.transport().inner().sent;
    assert_eq!(sent[0].seq, 255);
    assert_eq!(sent[1].seq, 0);
}

#[test]
fn corrupted_syn_reply_stops_handshake_by_default() {
    let mut link = ScriptedLink::default();
    link.push_raw(corrupted(&Header::syn_ack(5, 0, SynParams::default())));
    let mut client = Client::new(link, ClientConfig::default());

    let err = client.connect().unwrap_err();
    assert!(matches!(err, RssiError::ChecksumMismatch { .. }), "{err:?}");
    assert_eq!(client.state(), ConnState::SynSent);
    assert_eq!(client.transport().inner().sent_headers().len(), 1);
}

#[test]
fn non_syn_reply_is_rejected() {
    let mut link = ScriptedLink::default();
    link.push(&Header::ack_nul(5, 0), 0);
    let mut client = Client::new(link, ClientConfig::default());
    assert!(matches!(client.connect(), Err(RssiError::NotSyn)));
}

#[test]
fn transport_failure_during_handshake_is_fatal() {
    let mut client = Client::new(ScriptedLink::default(), ClientConfig::default());
    assert!(matches!(client.connect(), Err(RssiError::Io(_))));
}

#[test]
fn negotiated_retry_resends_syn_after_bad_reply() {
    let mut link = ScriptedLink::default();
    link.push_raw(corrupted(&Header::syn_ack(5, 0, SynParams::default())));
    link.push(&Header::syn_ack(5, 0, SynParams::default()), 0);
    let cfg = ClientConfig {
        retry: RetryMode::Negotiated,
        ..ClientConfig::default()
    };
    let mut client = Client::new(link, cfg);

    let session = client.connect().expect("second reply is valid");
    assert_eq!(session.last_ack(), 5);

    let sent = client.transport().inner().sent_headers();
    assert_eq!(sent.len(), 3);
    assert!(sent[0].is_syn() && sent[1].is_syn());
    assert_eq!(sent[0], sent[1]);
    assert_eq!(sent[2], Header::ack_nul(1, 5));
}

#[test]
fn negotiated_retry_gives_up_on_silent_peer() {
    let cfg = ClientConfig {
        retry: RetryMode::Negotiated,
        syn: SynParams {
            retransmission_timeout: 1,
            max_num_retransmissions: 2,
            ..SynParams::default()
        },
        ..ClientConfig::default()
    };
    let mut client = Client::new(ScriptedLink::default(), cfg);

    let err = client.connect().unwrap_err();
    assert!(matches!(err, RssiError::RetriesExhausted { attempts: 3 }), "{err:?}");
    // 初次 + 两次重发
    assert_eq!(client.transport().inner().sent.len(), 3);
}
