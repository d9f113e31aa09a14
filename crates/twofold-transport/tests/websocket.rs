//! Integration tests driving the WebSocket transport with a real client.

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;
use twofold_transport::{Connection, Incoming, Transport, WebSocketTransport};

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

async fn pair() -> (twofold_transport::WebSocketConnection, ClientWs) {
    let mut transport = WebSocketTransport::bind("127.0.0.1:0").await.unwrap();
    let addr = transport.local_addr().unwrap();

    let client = tokio::spawn(async move {
        let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
            .await
            .unwrap();
        ws
    });

    let server_conn = transport.accept().await.unwrap();
    (server_conn, client.await.unwrap())
}

#[tokio::test]
async fn test_text_and_binary_frames_arrive_as_data() {
    let (conn, mut client) = pair().await;

    client
        .send(Message::Text("hello".into()))
        .await
        .unwrap();
    assert_eq!(
        conn.recv().await.unwrap(),
        Some(Incoming::Data(b"hello".to_vec()))
    );

    client
        .send(Message::Binary(vec![1, 2, 3].into()))
        .await
        .unwrap();
    assert_eq!(
        conn.recv().await.unwrap(),
        Some(Incoming::Data(vec![1, 2, 3]))
    );
}

#[tokio::test]
async fn test_sends_preserve_order() {
    let (conn, mut client) = pair().await;

    for i in 0..10u8 {
        conn.send(&[i]).await.unwrap();
    }
    for i in 0..10u8 {
        let msg = client.next().await.unwrap().unwrap();
        assert_eq!(msg.into_data().as_ref(), &[i]);
    }
}

#[tokio::test]
async fn test_client_pong_surfaces_as_liveness() {
    let (conn, mut client) = pair().await;

    conn.ping().await.unwrap();

    // The client echoes the ping as a pong; reading it back on the
    // server side must yield a liveness item, not data or close.
    let _ = client.next().await; // client sees the ping (auto-pong queued)
    client.send(Message::Pong(Vec::new().into())).await.unwrap();

    assert_eq!(conn.recv().await.unwrap(), Some(Incoming::Pong));
}

#[tokio::test]
async fn test_clean_close_yields_none() {
    let (conn, mut client) = pair().await;
    client.close(None).await.unwrap();
    assert_eq!(conn.recv().await.unwrap(), None);
}
