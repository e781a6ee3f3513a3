//! Integration tests against a live TWS/Gateway.
//!
//! These tests require a running IB TWS/Gateway instance (Paper Trading recommended).
//! They are ignored by default and can be run with:
//!
//! ```bash
//! cargo test --test integration_test -- --ignored
//! ```
//!
//! Configuration via environment variables:
//!   IB_HOST    (default: 127.0.0.1)
//!   IB_PORT    (default: 4002)
//!   IB_CLIENT  (default: 100)

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;

use ibwire::{
    Action, ChannelWrapper, ClientConfig, Contract, HistoricalDataRequest, IBClient, IBEvent,
    Order, OrderType, SecType,
};

fn ib_host() -> String {
    std::env::var("IB_HOST").unwrap_or_else(|_| "127.0.0.1".into())
}

fn ib_port() -> u16 {
    std::env::var("IB_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(4002)
}

fn ib_client_id() -> i32 {
    std::env::var("IB_CLIENT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(100)
}

fn spy_contract() -> Contract {
    Contract {
        symbol: "SPY".into(),
        sec_type: Some(SecType::Stock),
        exchange: "SMART".into(),
        currency: "USD".into(),
        ..Contract::default()
    }
}

async fn connect(offset: i32) -> (IBClient, UnboundedReceiver<IBEvent>) {
    let (wrapper, rx) = ChannelWrapper::new();
    let config = ClientConfig::new(ib_host(), ib_port(), ib_client_id() + offset);
    let client = IBClient::connect(config, Arc::new(wrapper))
        .await
        .expect("Failed to connect to IB");
    (client, rx)
}

/// Collect events until `done` returns true or `secs` elapse.
async fn collect_until(
    rx: &mut UnboundedReceiver<IBEvent>,
    secs: u64,
    mut done: impl FnMut(&IBEvent) -> bool,
) -> Vec<IBEvent> {
    let mut seen = Vec::new();
    let timeout = tokio::time::sleep(Duration::from_secs(secs));
    tokio::pin!(timeout);

    loop {
        tokio::select! {
            event = rx.recv() => {
                let Some(event) = event else { break };
                let stop = done(&event);
                seen.push(event);
                if stop {
                    break;
                }
            }
            _ = &mut timeout => break,
        }
    }
    seen
}

// ============================================================================
// Connection Tests
// ============================================================================

#[tokio::test]
#[ignore]
async fn test_connect_and_disconnect() {
    let (client, mut rx) = connect(0).await;

    assert!(client.is_connected());
    assert!(client.server_version() >= 100);

    let events = collect_until(&mut rx, 5, |e| matches!(e, IBEvent::ConnectAck)).await;
    assert!(events.iter().any(|e| matches!(e, IBEvent::NextValidId { order_id } if *order_id > 0)));
    assert!(events
        .iter()
        .any(|e| matches!(e, IBEvent::ManagedAccounts { accounts } if !accounts.is_empty())));

    client.disconnect().await;
    assert!(!client.is_connected());
}

#[tokio::test]
#[ignore]
async fn test_connect_wrong_port() {
    let (wrapper, _rx) = ChannelWrapper::new();
    let config = ClientConfig::new(ib_host(), 19999, ib_client_id());
    let result = IBClient::connect(config, Arc::new(wrapper)).await;
    assert_eq!(result.unwrap_err().code(), Some(502));
}

// ============================================================================
// Market Data Tests
// ============================================================================

#[tokio::test]
#[ignore]
async fn test_request_market_data() {
    let (client, mut rx) = connect(1).await;
    let req_id = 9001;

    client
        .req_mkt_data(req_id, &spy_contract(), "", false, false, &[])
        .await
        .expect("req_mkt_data failed");

    let mut tick_count = 0;
    collect_until(&mut rx, 5, |event| {
        match event {
            IBEvent::TickPrice { req_id: rid, .. }
            | IBEvent::TickSize { req_id: rid, .. }
            | IBEvent::TickString { req_id: rid, .. }
            | IBEvent::TickGeneric { req_id: rid, .. }
                if *rid == req_id =>
            {
                tick_count += 1;
            }
            IBEvent::Error { req_id: rid, code, message } if *rid == req_id => {
                println!("Market data error: code={code}, msg={message}");
                return true;
            }
            _ => {}
        }
        tick_count >= 5
    })
    .await;

    let _ = client.cancel_mkt_data(req_id).await;

    println!("Received {tick_count} tick events");
    assert!(tick_count > 0, "Should have received at least one tick event");

    client.disconnect().await;
}

// ============================================================================
// Historical Data Tests
// ============================================================================

#[tokio::test]
#[ignore]
async fn test_request_historical_data() {
    let (client, mut rx) = connect(2).await;
    let req_id = 9002;

    let params = HistoricalDataRequest {
        duration: "1 D".into(),
        bar_size: "1 hour".into(),
        what_to_show: "TRADES".into(),
        use_rth: true,
        format_date: 1,
        ..Default::default()
    };
    client
        .req_historical_data(req_id, &spy_contract(), &params)
        .await
        .expect("req_historical_data failed");

    let events = collect_until(&mut rx, 30, |e| {
        matches!(e, IBEvent::HistoricalDataEnd { req_id: rid, .. } if *rid == req_id)
    })
    .await;

    let bars: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            IBEvent::HistoricalData { req_id: rid, bar } if *rid == req_id => Some(bar),
            _ => None,
        })
        .collect();

    assert!(
        events
            .iter()
            .any(|e| matches!(e, IBEvent::HistoricalDataEnd { .. })),
        "Should have received HistoricalDataEnd"
    );
    assert!(!bars.is_empty(), "Should have received historical bars");

    for bar in &bars {
        println!(
            "  {} O={:.2} H={:.2} L={:.2} C={:.2} V={}",
            bar.time, bar.open, bar.high, bar.low, bar.close, bar.volume
        );
    }

    client.disconnect().await;
}

// ============================================================================
// Account Tests
// ============================================================================

#[tokio::test]
#[ignore]
async fn test_request_account_summary() {
    let (client, mut rx) = connect(3).await;
    let req_id = 9003;

    client
        .req_account_summary(req_id, "All", "NetLiquidation,TotalCashValue,BuyingPower")
        .await
        .expect("req_account_summary failed");

    let events = collect_until(&mut rx, 10, |e| {
        matches!(e, IBEvent::AccountSummaryEnd { req_id: rid } if *rid == req_id)
    })
    .await;

    let _ = client.cancel_account_summary(req_id).await;

    let entries = events
        .iter()
        .filter(|e| matches!(e, IBEvent::AccountSummary { req_id: rid, .. } if *rid == req_id))
        .count();
    assert!(
        events.iter().any(|e| matches!(e, IBEvent::AccountSummaryEnd { .. })),
        "Should have received AccountSummaryEnd"
    );
    assert!(entries > 0, "Should have received account summary entries");

    client.disconnect().await;
}

#[tokio::test]
#[ignore]
async fn test_request_positions() {
    let (client, mut rx) = connect(4).await;

    client.req_positions().await.expect("req_positions failed");

    let events = collect_until(&mut rx, 10, |e| matches!(e, IBEvent::PositionEnd)).await;
    let _ = client.cancel_positions().await;

    // positions may be empty on a fresh paper account
    for e in &events {
        if let IBEvent::Position { account, contract, position, avg_cost } = e {
            println!("  {account}: {} pos={position} avg_cost={avg_cost:.2}", contract.symbol);
        }
    }
    assert!(
        events.iter().any(|e| matches!(e, IBEvent::PositionEnd)),
        "Should have received PositionEnd"
    );

    client.disconnect().await;
}

// ============================================================================
// Order Tests (Paper Trading only!)
// ============================================================================

#[tokio::test]
#[ignore]
async fn test_place_and_cancel_limit_order() {
    let (client, mut rx) = connect(5).await;
    let order_id = client.next_req_id();
    assert!(order_id > 0, "Should have valid order ID");

    // far from the market so it never fills
    let order = Order {
        action: Some(Action::Buy),
        total_quantity: rust_decimal::Decimal::ONE,
        order_type: Some(OrderType::Limit),
        lmt_price: Some(1.00),
        ..Order::default()
    };

    client
        .place_order(order_id, &spy_contract(), &order)
        .await
        .expect("place_order failed");

    let events = collect_until(&mut rx, 10, |e| {
        matches!(e, IBEvent::OrderStatus { order_id: oid, .. } if *oid == order_id)
    })
    .await;
    assert!(
        events
            .iter()
            .any(|e| matches!(e, IBEvent::OrderStatus { order_id: oid, .. } if *oid == order_id)),
        "Should have received OrderStatus"
    );

    client.cancel_order(order_id).await.expect("cancel_order failed");

    collect_until(&mut rx, 5, |e| {
        matches!(e, IBEvent::OrderStatus { order_id: oid, status, .. }
            if *oid == order_id && status.contains("Cancel"))
    })
    .await;

    client.disconnect().await;
}
