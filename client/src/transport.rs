use tokio::sync::mpsc;

use crate::error::TransportError;

/// A source and sink of protocol lines for one battle room.
///
/// Implementations hand out one protocol line per `receive_line` call, with
/// any `>ROOMID` frame header already stripped.
pub trait Transport: Send {
    /// Wait for the next line. `Ok(None)` means the stream ended cleanly.
    async fn receive_line(&mut self) -> Result<Option<String>, TransportError>;

    /// Send one complete outgoing line, e.g. `battle-gen9ou-1|/choose move 1`
    async fn send_line(&mut self, line: String) -> Result<(), TransportError>;

    fn is_connected(&self) -> bool;
}

/// Transport over in-process channels.
///
/// The [`RoomRouter`](crate::RoomRouter) hands one of these to each battle
/// room; tests build them directly to script a server.
#[derive(Debug)]
pub struct ChannelTransport {
    incoming: mpsc::UnboundedReceiver<String>,
    outgoing: mpsc::UnboundedSender<String>,
    connected: bool,
}

impl ChannelTransport {
    pub fn new(
        incoming: mpsc::UnboundedReceiver<String>,
        outgoing: mpsc::UnboundedSender<String>,
    ) -> Self {
        Self {
            incoming,
            outgoing,
            connected: true,
        }
    }

    /// A transport plus the far ends of its channels: push server lines into
    /// the sender, read what the transport sent from the receiver
    pub fn pair() -> (
        Self,
        mpsc::UnboundedSender<String>,
        mpsc::UnboundedReceiver<String>,
    ) {
        let (incoming_tx, incoming_rx) = mpsc::unbounded_channel();
        let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();
        (Self::new(incoming_rx, outgoing_tx), incoming_tx, outgoing_rx)
    }
}

impl Transport for ChannelTransport {
    async fn receive_line(&mut self) -> Result<Option<String>, TransportError> {
        match self.incoming.recv().await {
            Some(line) => Ok(Some(line)),
            None => {
                self.connected = false;
                Ok(None)
            }
        }
    }

    async fn send_line(&mut self, line: String) -> Result<(), TransportError> {
        if !self.connected {
            return Err(TransportError::Closed);
        }

        self.outgoing.send(line).map_err(|e| {
            self.connected = false;
            TransportError::Send(format!("receiver dropped, lost line {:?}", e.0))
        })
    }

    fn is_connected(&self) -> bool {
        self.connected && !self.outgoing.is_closed()
    }
}
