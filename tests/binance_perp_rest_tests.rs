mod common;

use common::{
    init_tracing, kline_json, setup_mock_server, test_client, test_config, API_KEY, SECRET_KEY,
};
use fapi_binding::core::kernel::{FixedClock, RequestDescriptor, ResponseMeta, ResponseObserver};
use fapi_binding::exchanges::binance_perp::{
    rest_builder, BinancePerpRestClient, CandlestickDataOptions, NewOrderOptions,
};
use fapi_binding::{ExchangeError, KlineInterval, OrderSide, TimeInForce};
use hmac::{Hmac, Mac};
use rust_decimal::Decimal;
use serde_json::json;
use sha2::Sha256;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_test::assert_ok;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

fn btc_limit_order() -> NewOrderOptions {
    NewOrderOptions::limit("BTCUSDT", OrderSide::Buy, "1", "50000", TimeInForce::GTC)
        .reduce_only(false)
}

#[tokio::test]
async fn test_new_order_is_signed_without_api_key_header() {
    init_tracing();
    let server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path("/fapi/v1/order"))
        .and(query_param("symbol", "BTCUSDT"))
        .and(query_param("side", "BUY"))
        .and(query_param("type", "LIMIT"))
        .and(query_param("timeInForce", "GTC"))
        .and(query_param("quantity", "1"))
        .and(query_param("price", "50000"))
        .and(query_param("reduceOnly", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "orderId": 22542179,
            "symbol": "BTCUSDT",
            "status": "NEW"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let response = assert_ok!(client.new_order(&btc_limit_order()).await);
    assert!(response.status.is_success());
    assert!(response.body_text().contains("22542179"));

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    let request = &received[0];

    assert_eq!(request.method.as_str(), "POST");
    assert_eq!(request.url.path(), "/fapi/v1/order");
    assert!(request.headers.get("X-MBX-APIKEY").is_none());

    let query = request.url.query().unwrap();
    let (signed_part, signature) = query.rsplit_once("&signature=").unwrap();
    assert_eq!(signature.len(), 64);
    assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
    assert!(signed_part.contains("&timestamp="));

    let mut mac = Hmac::<Sha256>::new_from_slice(SECRET_KEY.as_bytes()).unwrap();
    mac.update(signed_part.as_bytes());
    assert_eq!(hex::encode(mac.finalize().into_bytes()), signature);
}

#[tokio::test]
async fn test_new_order_with_fixed_clock_is_reproducible() {
    let server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path("/fapi/v1/order"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(2)
        .mount(&server)
        .await;

    let rest = rest_builder(&test_config(&server))
        .with_clock(Arc::new(FixedClock(1_700_000_000_000)))
        .build()
        .unwrap();
    let client = BinancePerpRestClient::new(rest);

    assert_ok!(client.new_order(&btc_limit_order()).await);
    assert_ok!(client.new_order(&btc_limit_order()).await);

    let received = server.received_requests().await.unwrap();
    let first = received[0].url.query().unwrap();
    let second = received[1].url.query().unwrap();

    assert_eq!(first, second);
    assert_eq!(
        first.split("&signature=").next().unwrap(),
        "price=50000&quantity=1&reduceOnly=false&side=BUY&symbol=BTCUSDT\
         &timeInForce=GTC&timestamp=1700000000000&type=LIMIT"
    );
}

#[tokio::test]
async fn test_new_order_error_status_is_returned_not_raised() {
    let server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path("/fapi/v1/order"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": -1121,
            "msg": "Invalid symbol."
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let response = assert_ok!(client.new_order(&btc_limit_order()).await);

    assert_eq!(response.status.as_u16(), 400);
    assert!(response.body_text().contains("-1121"));
}

#[tokio::test]
async fn test_start_user_data_stream() {
    let server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path("/fapi/v1/listenKey"))
        .and(header("x-mbx-apikey", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "listenKey": "abc123"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let stream = assert_ok!(client.start_user_data_stream().await);

    assert_eq!(stream.value.listen_key, "abc123");
    assert!(stream.response.status.is_success());

    let received = server.received_requests().await.unwrap();
    assert_eq!(received[0].url.query(), None);
}

#[tokio::test]
async fn test_keep_alive_and_close_user_data_stream() {
    let server = setup_mock_server().await;
    Mock::given(method("PUT"))
        .and(path("/fapi/v1/listenKey"))
        .and(header("x-mbx-apikey", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/fapi/v1/listenKey"))
        .and(header("x-mbx-apikey", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let kept = assert_ok!(client.keep_alive_user_data_stream().await);
    let closed = assert_ok!(client.close_user_data_stream().await);

    assert!(kept.status.is_success());
    assert!(closed.status.is_success());
    assert_eq!(closed.body_text(), "{}");
}

#[tokio::test]
async fn test_candlestick_data_decodes_klines() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/fapi/v1/klines"))
        .and(query_param("symbol", "BTCUSDT"))
        .and(query_param("interval", "1h"))
        .and(query_param("limit", "3"))
        .and(header("x-mbx-apikey", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            kline_json(1_700_000_000_000, "50100.00"),
            kline_json(1_700_003_600_000, "50200.00"),
            kline_json(1_700_007_200_000, "50300.00"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let options = CandlestickDataOptions::new("BTCUSDT", KlineInterval::Hours1).limit(3);
    let klines = assert_ok!(client.candlestick_data(&options).await);

    assert_eq!(klines.value.len(), 3);
    let first = &klines.value[0];
    assert_eq!(first.open_time, 1_700_000_000_000);
    assert_eq!(first.close_time, 1_700_003_599_999);
    assert_eq!(first.open, Decimal::from_str("50000.10").unwrap());
    assert_eq!(first.high, Decimal::from_str("50500").unwrap());
    assert_eq!(first.low, Decimal::from_str("49800.5").unwrap());
    assert_eq!(first.close, Decimal::from_str("50100").unwrap());
    assert_eq!(first.volume, Decimal::from_str("1234.567").unwrap());
    assert_eq!(first.number_of_trades, Some(4200));
    assert_eq!(klines.value[2].close, Decimal::from_str("50300").unwrap());

    let received = server.received_requests().await.unwrap();
    let query = received[0].url.query().unwrap();
    assert!(!query.contains("startTime"));
    assert!(!query.contains("endTime"));
    assert!(!query.contains("signature"));
}

#[tokio::test]
async fn test_candlestick_data_sends_time_range() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/fapi/v1/klines"))
        .and(query_param("startTime", "1700000000000"))
        .and(query_param("endTime", "1700003600000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let options = CandlestickDataOptions::new("ETHUSDT", KlineInterval::Minutes5)
        .start_time(1_700_000_000_000)
        .end_time(1_700_003_600_000);
    let klines = assert_ok!(client.candlestick_data(&options).await);

    assert!(klines.value.is_empty());
}

#[tokio::test]
async fn test_decode_failure_keeps_response_and_releases_connection() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/fapi/v1/klines"))
        .and(query_param("symbol", "BROKEN"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fapi/v1/klines"))
        .and(query_param("symbol", "BTCUSDT"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([kline_json(0, "1.0")])),
        )
        .mount(&server)
        .await;

    let client = test_client(&server);
    let broken = CandlestickDataOptions::new("BROKEN", KlineInterval::Minutes1);
    let healthy = CandlestickDataOptions::new("BTCUSDT", KlineInterval::Minutes1);

    // Repeated failures on one client must not exhaust its connection pool
    for _ in 0..20 {
        let err = client.candlestick_data(&broken).await.unwrap_err();
        match &err {
            ExchangeError::Decode { response, .. } => {
                assert_eq!(response.body_text(), "<html>maintenance</html>");
            }
            other => panic!("expected decode error, got {other:?}"),
        }
        assert!(err.response().is_some());
    }

    let klines = assert_ok!(client.candlestick_data(&healthy).await);
    assert_eq!(klines.value.len(), 1);
}

#[tokio::test]
async fn test_error_status_with_unexpected_body_is_decode_error() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/fapi/v1/klines"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": -1120,
            "msg": "Invalid interval."
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let options = CandlestickDataOptions::new("BTCUSDT", KlineInterval::Minutes1);
    let err = client.candlestick_data(&options).await.unwrap_err();

    let response = err.response().expect("decode error carries the response");
    assert_eq!(response.status.as_u16(), 400);
    assert!(response.body_text().contains("Invalid interval."));
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let config = fapi_binding::core::config::ExchangeConfig::new(
        API_KEY.to_string(),
        SECRET_KEY.to_string(),
    )
    .base_url(format!("http://{}", address));
    let client = fapi_binding::exchanges::binance_perp::build_connector(&config).unwrap();

    let err = client.keep_alive_user_data_stream().await.unwrap_err();
    assert!(matches!(
        err,
        ExchangeError::Transport { response: None, .. }
    ));
}

/// Serves one response that promises a 100 byte body, sends `body`, then closes.
async fn spawn_truncating_server(body: &'static [u8]) -> std::net::SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                return;
            }
            request.extend_from_slice(&buf[..n]);
        }

        socket
            .write_all(
                b"HTTP/1.1 200 OK\r\n\
                  Content-Type: application/json\r\n\
                  Content-Length: 100\r\n\r\n",
            )
            .await
            .unwrap();
        socket.write_all(body).await.unwrap();
        socket.flush().await.unwrap();
        socket.shutdown().await.unwrap();
    });

    address
}

#[tokio::test]
async fn test_truncated_body_is_transport_error_with_partial_response() {
    let address = spawn_truncating_server(br#"[[1,"1""#).await;

    let observer = Arc::new(RecordingObserver::default());
    let config = fapi_binding::core::config::ExchangeConfig::new(
        API_KEY.to_string(),
        SECRET_KEY.to_string(),
    )
    .base_url(format!("http://{}", address));
    let rest = rest_builder(&config)
        .with_observer(observer.clone())
        .build()
        .unwrap();
    let client = BinancePerpRestClient::new(rest);

    let options = CandlestickDataOptions::new("BTCUSDT", KlineInterval::Hours1);
    let err = client.candlestick_data(&options).await.unwrap_err();

    match err {
        ExchangeError::Transport {
            response: Some(response),
            ..
        } => {
            assert_eq!(response.status.as_u16(), 200);
            assert_eq!(response.body_text(), r#"[[1,"1""#);
        }
        other => panic!("expected transport error with partial response, got {other:?}"),
    }

    let seen = observer.seen.lock().unwrap();
    assert_eq!(
        *seen,
        vec![("/fapi/v1/klines".to_string(), r#"[[1,"1""#.to_string())]
    );
}

#[derive(Default)]
struct RecordingObserver {
    seen: Mutex<Vec<(String, String)>>,
}

impl ResponseObserver for RecordingObserver {
    fn on_response(&self, request: &RequestDescriptor, response: &ResponseMeta) {
        self.seen.lock().unwrap().push((
            request.url.path().to_string(),
            response.body_text().into_owned(),
        ));
    }
}

#[tokio::test]
async fn test_observer_sees_raw_bodies() {
    let server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path("/fapi/v1/listenKey"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"listenKey":"xyz"}"#))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/fapi/v1/listenKey"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;

    let observer = Arc::new(RecordingObserver::default());
    let rest = rest_builder(&test_config(&server))
        .with_observer(observer.clone())
        .build()
        .unwrap();
    let client = BinancePerpRestClient::new(rest);

    assert_ok!(client.start_user_data_stream().await);
    assert_ok!(client.close_user_data_stream().await);

    let seen = observer.seen.lock().unwrap();
    assert_eq!(
        *seen,
        vec![
            (
                "/fapi/v1/listenKey".to_string(),
                r#"{"listenKey":"xyz"}"#.to_string()
            ),
            ("/fapi/v1/listenKey".to_string(), "{}".to_string()),
        ]
    );
}
