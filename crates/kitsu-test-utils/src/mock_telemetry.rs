// SPDX-FileCopyrightText: 2026 Kitsu Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scriptable WebSocket server standing in for the job telemetry endpoint.
//!
//! Each accepted connection is handed to the test as a [`MockConnection`],
//! which can push frames, close the socket from the server side, or wait for
//! the client to go away.

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};

/// How long helpers wait for a connection or close before failing the test.
const WAIT: Duration = Duration::from_secs(5);

enum ServerFrame {
    Message(Message),
    Close,
}

/// One accepted client connection. Dropping the handle closes the socket.
pub struct MockConnection {
    /// Request target of the handshake, including the query string.
    pub target: String,
    outgoing: mpsc::UnboundedSender<ServerFrame>,
    client_gone: Option<oneshot::Receiver<()>>,
}

impl MockConnection {
    /// Push a text frame to the client.
    pub fn send_text(&self, text: impl Into<String>) {
        let text: String = text.into();
        let _ = self.outgoing.send(ServerFrame::Message(Message::text(text)));
    }

    /// Push a binary frame to the client.
    pub fn send_binary(&self, bytes: Vec<u8>) {
        let _ = self
            .outgoing
            .send(ServerFrame::Message(Message::binary(bytes)));
    }

    /// Close the connection from the server side.
    pub fn close(&self) {
        let _ = self.outgoing.send(ServerFrame::Close);
    }

    /// Wait until the client closes or drops the connection.
    ///
    /// Returns `false` if the client is still connected after the wait window.
    pub async fn wait_client_gone(&mut self) -> bool {
        match self.client_gone.take() {
            Some(rx) => tokio::time::timeout(WAIT, rx).await.is_ok(),
            None => true,
        }
    }
}

/// In-process WebSocket server bound to an ephemeral localhost port.
pub struct MockTelemetryServer {
    addr: SocketAddr,
    connections: mpsc::UnboundedReceiver<MockConnection>,
    accept_task: JoinHandle<()>,
}

impl MockTelemetryServer {
    /// Bind and start accepting connections.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock telemetry server");
        let addr = listener.local_addr().expect("mock server address");
        let (tx, connections) = mpsc::unbounded_channel();

        let accept_task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let tx = tx.clone();
                tokio::spawn(async move {
                    if let Some(conn) = serve(stream).await {
                        let _ = tx.send(conn);
                    }
                });
            }
        });

        Self {
            addr,
            connections,
            accept_task,
        }
    }

    /// Realtime base URL clients should be configured with.
    pub fn ws_base_url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Wait for the next accepted connection, panicking after the wait window.
    pub async fn next_connection(&mut self) -> MockConnection {
        tokio::time::timeout(WAIT, self.connections.recv())
            .await
            .expect("timed out waiting for a telemetry connection")
            .expect("mock telemetry server stopped")
    }

    /// Wait up to `window` for a connection; `None` if none arrived.
    pub async fn try_next_connection(&mut self, window: Duration) -> Option<MockConnection> {
        tokio::time::timeout(window, self.connections.recv())
            .await
            .ok()
            .flatten()
    }
}

impl Drop for MockTelemetryServer {
    fn drop(&mut self) {
        self.accept_task.abort();
    }
}

/// Complete the handshake and spawn the frame pump for one connection.
async fn serve(stream: TcpStream) -> Option<MockConnection> {
    let mut target = String::new();
    let callback = |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
        target = req.uri().to_string();
        Ok(resp)
    };

    let ws = match tokio_tungstenite::accept_hdr_async(stream, callback).await {
        Ok(ws) => ws,
        Err(e) => {
            tracing::debug!(error = %e, "mock telemetry handshake failed");
            return None;
        }
    };

    let (mut sink, mut source) = ws.split();
    let (outgoing, mut frames) = mpsc::unbounded_channel::<ServerFrame>();
    let (gone_tx, gone_rx) = oneshot::channel();

    tokio::spawn(async move {
        loop {
            tokio::select! {
                frame = frames.recv() => match frame {
                    Some(ServerFrame::Message(msg)) => {
                        if sink.send(msg).await.is_err() {
                            break;
                        }
                    }
                    Some(ServerFrame::Close) | None => {
                        let _ = sink.send(Message::Close(None)).await;
                        let _ = sink.close().await;
                        break;
                    }
                },
                inbound = source.next() => match inbound {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                },
            }
        }
        let _ = gone_tx.send(());
    });

    Some(MockConnection {
        target,
        outgoing,
        client_gone: Some(gone_rx),
    })
}
