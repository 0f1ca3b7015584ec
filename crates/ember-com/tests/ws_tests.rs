use ember_com::{
    Channel, ChannelConfig, ComError, Connector, WireMessage, WsChannel, WsConnector, WsServer,
};
use tokio::time::{Duration, timeout};

async fn bind() -> WsServer {
    WsServer::bind("127.0.0.1:0", ChannelConfig::default())
        .await
        .expect("bind failed")
}

#[tokio::test]
async fn test_text_roundtrip_over_loopback() {
    let mut server = bind().await;
    let url = server.url("/api/v1/ws/direct-process");

    let mut client = WsChannel::connect(&url, &ChannelConfig::default())
        .await
        .expect("connect failed");
    let mut peer = timeout(Duration::from_secs(5), server.accept())
        .await
        .expect("accept timed out")
        .expect("accept failed");
    assert_eq!(peer.path(), "/api/v1/ws/direct-process");

    client
        .send(WireMessage::Text(r#"{"token":null}"#.into()))
        .await
        .unwrap();
    let received = timeout(Duration::from_secs(5), peer.recv())
        .await
        .expect("recv timed out")
        .expect("recv failed");
    assert_eq!(received.as_text(), Some(r#"{"token":null}"#));

    peer.send(WireMessage::Text(r#"{"status":"ready"}"#.into()))
        .await
        .unwrap();
    let reply = timeout(Duration::from_secs(5), client.recv())
        .await
        .expect("recv timed out")
        .expect("recv failed");
    assert_eq!(reply.as_text(), Some(r#"{"status":"ready"}"#));
}

#[tokio::test]
async fn test_binary_payload_arrives_intact() {
    let mut server = bind().await;
    let url = server.url("/api/v1/ws/direct-process");

    let mut client = WsChannel::connect(&url, &ChannelConfig::default())
        .await
        .unwrap();
    let mut peer = server.accept().await.unwrap();

    let payload: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
    client
        .send(WireMessage::Binary(payload.clone()))
        .await
        .unwrap();

    let received = timeout(Duration::from_secs(5), peer.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(received, WireMessage::Binary(payload));
}

#[tokio::test]
async fn test_peer_close_surfaces_connection_closed() {
    let mut server = bind().await;
    let connector = WsConnector::new(server.url("/api/v1/ws/fire"), ChannelConfig::default());

    let mut client = connector.connect().await.unwrap();
    let mut peer = server.accept().await.unwrap();
    assert_eq!(peer.path(), "/api/v1/ws/fire");

    peer.close().await.unwrap();

    let result = timeout(Duration::from_secs(5), client.recv())
        .await
        .expect("recv timed out");
    assert!(matches!(result, Err(ComError::ConnectionClosed)));
}

#[tokio::test]
async fn test_oversized_message_rejected() {
    let mut server = WsServer::bind(
        "127.0.0.1:0",
        ChannelConfig::default().with_max_message_size(16),
    )
    .await
    .unwrap();
    let url = server.url("/");

    let mut client = WsChannel::connect(&url, &ChannelConfig::default())
        .await
        .unwrap();
    let mut peer = server.accept().await.unwrap();

    client
        .send(WireMessage::Binary(vec![0u8; 64]))
        .await
        .unwrap();
    let result = timeout(Duration::from_secs(5), peer.recv()).await.unwrap();
    assert!(matches!(result, Err(ComError::MessageTooLarge(64))));
}

#[tokio::test]
async fn test_invalid_url_rejected() {
    let result = WsChannel::connect("not a url", &ChannelConfig::default()).await;
    assert!(matches!(result, Err(ComError::InvalidUri(_))));
}

#[tokio::test]
async fn test_wss_attempts_tls_handshake() {
    // Plain TCP listener that hangs up: the TLS handshake has to fail on I/O,
    // not because no connector is available.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        if let Ok((stream, _)) = listener.accept().await {
            drop(stream);
        }
    });

    let url = format!("wss://localhost:{}/api/v1/ws/fire", addr.port());
    let result = timeout(Duration::from_secs(5), WsChannel::connect(&url, &ChannelConfig::default()))
        .await
        .expect("connect timed out");
    match result {
        Err(e) => assert!(
            !e.to_string().contains("no tls connector"),
            "tls support missing: {e}"
        ),
        Ok(_) => panic!("handshake against a plain socket must fail"),
    }
}
