use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use pivot_protocol::{ClientMessage, ServerFrame, parse_server_frame};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Low-level WebSocket connection to a Showdown server
pub struct Connection {
    ws: WsStream,
}

impl Connection {
    /// Connect to a WebSocket URL
    pub async fn connect(url: &str) -> Result<Self> {
        let (ws, _response) = connect_async(url)
            .await
            .with_context(|| format!("Failed to connect to {}", url))?;

        tracing::info!(url, "Connected");
        Ok(Self { ws })
    }

    /// Receive the next frame from the server. `Ok(None)` once the socket closes.
    pub async fn next_frame(&mut self) -> Result<Option<ServerFrame>> {
        while let Some(message) = self.ws.next().await {
            let message = message.context("WebSocket error")?;

            match message {
                Message::Text(text) => return Ok(Some(parse_server_frame(&text))),
                Message::Close(_) => return Ok(None),
                Message::Ping(data) => self
                    .ws
                    .send(Message::Pong(data))
                    .await
                    .context("Failed to send pong")?,
                _ => {}
            }
        }

        Ok(None)
    }

    /// Send a client message
    pub async fn send(&mut self, message: ClientMessage) -> Result<()> {
        self.send_raw(&message.to_wire_format()).await
    }

    /// Send a raw line such as `battle-gen9ou-1|/choose move 1`
    pub async fn send_raw(&mut self, text: &str) -> Result<()> {
        tracing::debug!(line = text, "Sending");
        self.ws
            .send(Message::Text(text.into()))
            .await
            .context("Failed to send message")
    }

    pub async fn close(&mut self) -> Result<()> {
        self.ws.close(None).await.context("Failed to close WebSocket")
    }
}
