//! End-to-end tests against an in-process mock TWS.
//!
//! The mock speaks just enough of the server side: it answers the preamble
//! with a configurable version, replies to START_API with NEXT_VALID_ID and
//! MANAGED_ACCTS, answers REQ_CURRENT_TIME, and records every frame it
//! receives as a list of fields.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use bytes::BytesMut;
use rust_decimal::Decimal;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use ibwire::{
    Action, ChannelWrapper, ClientConfig, ConnState, Contract, IBApiError, IBClient, IBEvent,
    Order, OrderType, SecType, Wrapper,
};

const WAIT: Duration = Duration::from_secs(5);

// ============================================================================
// Mock server
// ============================================================================

#[derive(Clone, Copy)]
struct MockOptions {
    server_version: i32,
    warmup: bool,
    /// Close the socket right after the warmup.
    hang_up: bool,
    /// Stop reading right after the warmup but keep the socket open.
    stall: bool,
}

impl Default for MockOptions {
    fn default() -> Self {
        Self {
            server_version: 157,
            warmup: true,
            hang_up: false,
            stall: false,
        }
    }
}

struct MockTws {
    port: u16,
    /// Every frame the client sent after the preamble, as fields.
    received: mpsc::UnboundedReceiver<Vec<String>>,
}

fn framed(fields: &[&str]) -> Vec<u8> {
    let mut body = Vec::new();
    for f in fields {
        body.extend_from_slice(f.as_bytes());
        body.push(0);
    }
    let mut frame = (body.len() as u32).to_be_bytes().to_vec();
    frame.extend(body);
    frame
}

fn split_fields(payload: &[u8]) -> Vec<String> {
    let mut fields: Vec<String> = payload
        .split(|&b| b == 0)
        .map(|f| String::from_utf8_lossy(f).into_owned())
        .collect();
    // trailing NUL leaves one empty tail
    fields.pop();
    fields
}

async fn read_frame(stream: &mut TcpStream) -> Option<Vec<u8>> {
    let mut header = [0u8; 4];
    stream.read_exact(&mut header).await.ok()?;
    let mut body = vec![0u8; u32::from_be_bytes(header) as usize];
    stream.read_exact(&mut body).await.ok()?;
    Some(body)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_test_writer()
        .try_init();
}

async fn start_mock(opts: MockOptions) -> MockTws {
    init_tracing();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (tx, received) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();

        let mut sign = [0u8; 4];
        stream.read_exact(&mut sign).await.unwrap();
        assert_eq!(&sign, b"API\0");
        let versions = read_frame(&mut stream).await.unwrap();
        assert_eq!(versions, b"v100..157");

        let sv = opts.server_version.to_string();
        stream
            .write_all(&framed(&[&sv, "20240101 09:30:00 EST"]))
            .await
            .unwrap();

        while let Some(payload) = read_frame(&mut stream).await {
            let fields = split_fields(&payload);
            let kind = fields.first().cloned().unwrap_or_default();
            let _ = tx.send(fields);

            match kind.as_str() {
                "71" if opts.warmup => {
                    stream.write_all(&framed(&["9", "1", "1"])).await.unwrap();
                    stream.write_all(&framed(&["15", "1", "DU111,DU222"])).await.unwrap();
                    if opts.hang_up {
                        return;
                    }
                    if opts.stall {
                        std::future::pending::<()>().await;
                    }
                }
                "49" => {
                    stream
                        .write_all(&framed(&["49", "1", "1700000000"]))
                        .await
                        .unwrap();
                }
                _ => {}
            }
        }
    });

    MockTws { port, received }
}

async fn connect(
    mock: &MockTws,
    client_id: i32,
) -> (IBClient, mpsc::UnboundedReceiver<IBEvent>) {
    let (wrapper, events) = ChannelWrapper::new();
    let client = IBClient::connect(
        ClientConfig::new("127.0.0.1", mock.port, client_id),
        Arc::new(wrapper),
    )
    .await
    .expect("connect failed");
    (client, events)
}

async fn next_frame(mock: &mut MockTws) -> Vec<String> {
    tokio::time::timeout(WAIT, mock.received.recv())
        .await
        .expect("timed out waiting for a frame")
        .expect("mock closed")
}

async fn next_event(events: &mut mpsc::UnboundedReceiver<IBEvent>) -> IBEvent {
    tokio::time::timeout(WAIT, events.recv())
        .await
        .expect("timed out waiting for an event")
        .expect("event channel closed")
}

// ============================================================================
// Handshake
// ============================================================================

#[tokio::test]
async fn handshake_sends_start_api_and_reports_warmup() {
    let mut mock = start_mock(MockOptions {
        server_version: 76,
        ..Default::default()
    })
    .await;
    let (client, mut events) = connect(&mock, 7).await;

    assert_eq!(client.server_version(), 76);
    assert_eq!(client.connection_time(), "20240101 09:30:00 EST");
    assert_eq!(client.state(), ConnState::Connected);
    assert_eq!(next_frame(&mut mock).await, ["71", "2", "7", ""]);

    assert_eq!(next_event(&mut events).await, IBEvent::NextValidId { order_id: 1 });
    assert_eq!(
        next_event(&mut events).await,
        IBEvent::ManagedAccounts {
            accounts: vec!["DU111".into(), "DU222".into()]
        }
    );
    assert_eq!(next_event(&mut events).await, IBEvent::ConnectAck);

    assert_eq!(client.next_req_id(), 1);
    assert_eq!(client.next_req_id(), 2);

    client.disconnect().await;
}

#[tokio::test]
async fn warmup_timeout_fails_with_already_connected() {
    let mock = start_mock(MockOptions {
        warmup: false,
        ..Default::default()
    })
    .await;
    let (wrapper, _events) = ChannelWrapper::new();
    let mut config = ClientConfig::new("127.0.0.1", mock.port, 0);
    config.handshake_timeout_ms = 200;

    let err = IBClient::connect(config, Arc::new(wrapper)).await.unwrap_err();
    assert_eq!(err.code(), Some(501));
}

#[tokio::test]
async fn unsupported_server_version_is_rejected() {
    let mock = start_mock(MockOptions {
        server_version: 999,
        ..Default::default()
    })
    .await;
    let (wrapper, _events) = ChannelWrapper::new();
    let err = IBClient::connect(
        ClientConfig::new("127.0.0.1", mock.port, 0),
        Arc::new(wrapper),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), Some(506));
}

// ============================================================================
// Requests
// ============================================================================

#[tokio::test]
async fn current_time_round_trip() {
    let mut mock = start_mock(MockOptions::default()).await;
    let (client, mut events) = connect(&mock, 0).await;
    next_frame(&mut mock).await; // START_API
    for _ in 0..3 {
        next_event(&mut events).await; // warmup + ack
    }

    client.req_current_time().await.unwrap();
    assert_eq!(next_frame(&mut mock).await, ["49", "1"]);
    assert_eq!(
        next_event(&mut events).await,
        IBEvent::CurrentTime { time: 1700000000 }
    );

    let stats = client.io_stats();
    assert_eq!(stats.frames_written, 2);
    assert!(stats.frames_read >= 4);

    client.disconnect().await;
}

#[tokio::test]
async fn unsupported_feature_is_reported_and_not_sent() {
    let mut mock = start_mock(MockOptions {
        server_version: 120,
        ..Default::default()
    })
    .await;
    let (client, mut events) = connect(&mock, 0).await;
    next_frame(&mut mock).await;
    for _ in 0..3 {
        next_event(&mut events).await;
    }

    let contract = Contract {
        symbol: "AAPL".into(),
        sec_type: Some(SecType::Stock),
        exchange: "SMART".into(),
        currency: "USD".into(),
        ..Default::default()
    };
    let err = client
        .req_tick_by_tick_data(5, &contract, "Last", 0, false)
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(503));

    match next_event(&mut events).await {
        IBEvent::Error { req_id, code, message } => {
            assert_eq!(req_id, -1);
            assert_eq!(code, 503);
            assert!(message.contains("tick-by-tick"), "{message}");
        }
        other => panic!("expected Error, got {other:?}"),
    }

    // the next frame on the wire is the follow-up request, not tick-by-tick
    client.req_current_time().await.unwrap();
    assert_eq!(next_frame(&mut mock).await[0], "49");

    client.disconnect().await;
}

#[tokio::test]
async fn unset_limit_price_encodes_empty() {
    let mut mock = start_mock(MockOptions::default()).await;
    let (client, _events) = connect(&mock, 0).await;
    next_frame(&mut mock).await;

    let contract = Contract {
        symbol: "SPY".into(),
        sec_type: Some(SecType::Stock),
        exchange: "SMART".into(),
        currency: "USD".into(),
        ..Default::default()
    };
    let order = Order {
        action: Some(Action::Buy),
        total_quantity: Decimal::from(100),
        order_type: Some(OrderType::Market),
        lmt_price: None,
        aux_price: None,
        ..Default::default()
    };
    client.place_order(42, &contract, &order).await.unwrap();

    let fields = next_frame(&mut mock).await;
    assert_eq!(fields[0], "3");
    assert_eq!(fields[1], "42");
    let mkt = fields.iter().position(|f| f == "MKT").expect("order type field");
    assert_eq!(fields[mkt - 2], "BUY");
    assert_eq!(fields[mkt - 1], "100");
    assert_eq!(fields[mkt + 1], "", "limit price");
    assert_eq!(fields[mkt + 2], "", "aux price");

    client.disconnect().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_producers_keep_per_producer_order() {
    const PRODUCERS: i32 = 4;
    const PER_PRODUCER: i32 = 50;

    let mut mock = start_mock(MockOptions::default()).await;
    let (client, _events) = connect(&mock, 0).await;
    next_frame(&mut mock).await;

    let mut handles = Vec::new();
    for p in 0..PRODUCERS {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..PER_PRODUCER {
                client.cancel_mkt_data(p * 1000 + i).await.unwrap();
            }
        }));
    }
    for h in handles {
        h.await.unwrap();
    }

    let mut last_seen = vec![-1; PRODUCERS as usize];
    for _ in 0..PRODUCERS * PER_PRODUCER {
        let fields = next_frame(&mut mock).await;
        assert_eq!(fields[0], "2");
        let id: i32 = fields.last().unwrap().parse().unwrap();
        let (p, i) = ((id / 1000) as usize, id % 1000);
        assert!(i > last_seen[p], "producer {p} reordered");
        last_seen[p] = i;
    }
    assert!(last_seen.iter().all(|&i| i == PER_PRODUCER - 1));

    client.disconnect().await;
}

/// Answers CURRENT_TIME from inside the callback with two more requests.
struct Reentrant {
    client: OnceLock<IBClient>,
    inner: ChannelWrapper,
}

impl Wrapper for Reentrant {
    fn on_event(&self, event: &IBEvent) {
        if let (IBEvent::CurrentTime { .. }, Some(client)) = (event, self.client.get()) {
            client.try_request(-1, |e| e.req_ids(1)).unwrap();
            client.try_request(-1, |e| e.req_managed_accts()).unwrap();
        }
        self.inner.on_event(event);
    }
}

#[tokio::test]
async fn callback_requests_keep_their_order() {
    let mut mock = start_mock(MockOptions::default()).await;
    let (channel, _events) = ChannelWrapper::new();
    let wrapper = Arc::new(Reentrant {
        client: OnceLock::new(),
        inner: channel,
    });
    let client = IBClient::connect(
        ClientConfig::new("127.0.0.1", mock.port, 0),
        wrapper.clone(),
    )
    .await
    .unwrap();
    let _ = wrapper.client.set(client.clone());
    next_frame(&mut mock).await; // START_API

    client.req_current_time().await.unwrap();
    assert_eq!(next_frame(&mut mock).await[0], "49");
    assert_eq!(next_frame(&mut mock).await, ["8", "1", "1"]);
    assert_eq!(next_frame(&mut mock).await, ["17", "1"]);

    client.disconnect().await;
}

#[tokio::test]
async fn try_request_fails_fast_on_full_queue() {
    let mock = start_mock(MockOptions {
        stall: true,
        ..Default::default()
    })
    .await;
    let (client, _events) = connect(&mock, 0).await;

    let mut full = false;
    for _ in 0..32 {
        match client.try_request(-1, |_| Ok(BytesMut::zeroed(4 << 20))) {
            Ok(()) => tokio::task::yield_now().await,
            Err(IBApiError::QueueFull) => {
                full = true;
                break;
            }
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert!(full, "queue never filled");

    tokio::time::timeout(WAIT, client.disconnect())
        .await
        .expect("disconnect blocked behind a stalled write");
}

// ============================================================================
// Shutdown
// ============================================================================

#[tokio::test]
async fn disconnect_closes_socket_and_rejects_requests() {
    let mut mock = start_mock(MockOptions::default()).await;
    let (client, mut events) = connect(&mock, 0).await;
    next_frame(&mut mock).await;
    for _ in 0..3 {
        next_event(&mut events).await;
    }

    client.disconnect().await;
    assert!(!client.is_connected());

    // the mock sees EOF and drops its recorder
    let closed = tokio::time::timeout(WAIT, mock.received.recv()).await.unwrap();
    assert!(closed.is_none());

    let err = client.req_current_time().await.unwrap_err();
    assert!(matches!(err, IBApiError::Client { code: 504, .. }));
    assert!(matches!(
        next_event(&mut events).await,
        IBEvent::Error { code: 504, .. }
    ));

    // second disconnect is a no-op
    client.disconnect().await;
}

#[tokio::test]
async fn disconnect_returns_while_peer_stops_reading() {
    let mock = start_mock(MockOptions {
        stall: true,
        ..Default::default()
    })
    .await;
    let (client, _events) = connect(&mock, 0).await;

    // far more than the socket buffers hold, so the writer blocks mid-frame
    for _ in 0..8 {
        client
            .send_raw(BytesMut::zeroed(4 << 20))
            .await
            .unwrap();
    }

    tokio::time::timeout(WAIT, client.disconnect())
        .await
        .expect("disconnect blocked behind a stalled write");
    assert_eq!(client.state(), ConnState::Disconnected);
}

#[tokio::test]
async fn server_hang_up_reports_connection_closed() {
    let mock = start_mock(MockOptions {
        hang_up: true,
        ..Default::default()
    })
    .await;
    let (client, mut events) = connect(&mock, 0).await;
    for _ in 0..3 {
        next_event(&mut events).await;
    }

    assert_eq!(next_event(&mut events).await, IBEvent::ConnectionClosed);
    assert_eq!(client.state(), ConnState::Disconnected);
    client.disconnect().await;
}
