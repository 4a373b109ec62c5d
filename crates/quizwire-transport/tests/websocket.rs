//! Integration tests for the WebSocket transport.
//!
//! These spin up a real listener on an OS-assigned port and talk to it
//! both with a raw `tokio-tungstenite` client and with our own
//! [`WebSocketConnection::connect`].

#[cfg(feature = "websocket")]
mod websocket {
    use futures_util::{SinkExt, StreamExt};
    use std::time::Duration;

    use quizwire_transport::{
        Connection, HANDSHAKE_TIMEOUT, Transport, TransportError, WebSocketConnection,
        WebSocketTransport,
    };
    use tokio_tungstenite::tungstenite::Message;

    type RawClient = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    async fn bind() -> (WebSocketTransport, String) {
        let transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("local addr").to_string();
        (transport, addr)
    }

    async fn connect_raw(addr: &str) -> RawClient {
        let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/math"))
            .await
            .expect("client should connect");
        ws
    }

    #[tokio::test]
    async fn test_websocket_accept_and_send_receive() {
        let (mut transport, addr) = bind().await;
        let server_handle =
            tokio::spawn(async move { transport.accept().await.expect("should accept") });

        let mut client_ws = connect_raw(&addr).await;
        let server_conn = server_handle.await.expect("task should complete");
        assert!(server_conn.id().into_inner() > 0);

        // Server sends, client receives.
        server_conn
            .send(&[0x01, 0x08, 0x0e, 0x10, 0x0a])
            .await
            .expect("send should succeed");
        let msg = client_ws.next().await.unwrap().unwrap();
        assert!(msg.is_binary());
        assert_eq!(msg.into_data().as_ref(), &[0x01, 0x08, 0x0e, 0x10, 0x0a]);

        // Client sends, server receives.
        client_ws
            .send(Message::Binary(vec![0x02, 0x08, 0x18].into()))
            .await
            .unwrap();
        let received = server_conn
            .recv()
            .await
            .expect("recv should succeed")
            .expect("should have data");
        assert_eq!(received, vec![0x02, 0x08, 0x18]);

        server_conn.close().await.expect("close should succeed");
    }

    #[tokio::test]
    async fn test_websocket_recv_returns_none_on_client_close() {
        let (mut transport, addr) = bind().await;
        let server_handle =
            tokio::spawn(async move { transport.accept().await.expect("should accept") });

        let mut client_ws = connect_raw(&addr).await;
        let server_conn = server_handle.await.unwrap();

        client_ws.send(Message::Close(None)).await.unwrap();

        let result = server_conn.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on client close");
    }

    #[tokio::test]
    async fn test_websocket_skips_ping_frames() {
        let (mut transport, addr) = bind().await;
        let server_handle =
            tokio::spawn(async move { transport.accept().await.expect("should accept") });

        let mut client_ws = connect_raw(&addr).await;
        let server_conn = server_handle.await.unwrap();

        client_ws.send(Message::Ping(vec![9].into())).await.unwrap();
        client_ws
            .send(Message::Binary(vec![7, 7].into()))
            .await
            .unwrap();

        let received = server_conn.recv().await.unwrap().unwrap();
        assert_eq!(received, vec![7, 7]);
    }

    #[tokio::test]
    async fn test_websocket_connection_connect_round_trip() {
        let (mut transport, addr) = bind().await;
        let server_handle =
            tokio::spawn(async move { transport.accept().await.expect("should accept") });

        let client = WebSocketConnection::connect(&format!("ws://{addr}/math"))
            .await
            .expect("should connect");
        let server_conn = server_handle.await.unwrap();

        client.send(b"ping").await.unwrap();
        assert_eq!(server_conn.recv().await.unwrap().unwrap(), b"ping");

        server_conn.send(b"pong").await.unwrap();
        assert_eq!(client.recv().await.unwrap().unwrap(), b"pong");

        // Closing the server side is observed as a clean close.
        server_conn.close().await.unwrap();
        assert!(client.recv().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_websocket_connect_to_closed_port_fails() {
        let (transport, addr) = bind().await;
        drop(transport);

        let result = WebSocketConnection::connect(&format!("ws://{addr}/math")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_websocket_accept_after_shutdown_fails() {
        let (mut transport, _addr) = bind().await;
        transport.shutdown().await.unwrap();

        let err = transport.accept().await.err().expect("accept should fail");
        assert!(err.is_closed());
    }

    #[tokio::test]
    async fn test_handshake_stalled_client_times_out() {
        let (transport, addr) = bind().await;

        // Plain TCP, no upgrade request ever sent.
        let _stalled = tokio::net::TcpStream::connect(&addr).await.unwrap();
        let (stream, _) = transport.accept_tcp().await.unwrap();

        let err = WebSocketConnection::handshake(stream, Duration::from_millis(100))
            .await
            .err()
            .expect("handshake should time out");
        match err {
            TransportError::AcceptFailed(io) => {
                assert_eq!(io.kind(), std::io::ErrorKind::TimedOut)
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_accept_tcp_does_not_wait_for_handshake() {
        let (transport, addr) = bind().await;

        let _stalled = tokio::net::TcpStream::connect(&addr).await.unwrap();
        let (_idle, _) = transport.accept_tcp().await.unwrap();

        // A second client is still reachable while the first never upgrades.
        let client = tokio::spawn(connect_raw_owned(addr.clone()));
        let (stream, _) = tokio::time::timeout(Duration::from_secs(2), transport.accept_tcp())
            .await
            .expect("listener should not be blocked")
            .unwrap();
        let server_conn = WebSocketConnection::handshake(stream, HANDSHAKE_TIMEOUT)
            .await
            .unwrap();

        let mut client_ws = client.await.unwrap();
        server_conn.send(&[0x03]).await.unwrap();
        let msg = client_ws.next().await.unwrap().unwrap();
        assert_eq!(msg.into_data().as_ref(), &[0x03]);
    }

    async fn connect_raw_owned(addr: String) -> RawClient {
        connect_raw(&addr).await
    }
}
