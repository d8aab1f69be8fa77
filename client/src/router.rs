//! Fan one server connection out to per-room transports

use std::collections::HashMap;

use pivot_protocol::ServerFrame;
use tokio::sync::mpsc;

use crate::transport::ChannelTransport;

/// Owns one context per open battle room.
///
/// Frames from the shared connection go to the room they name; lines sent
/// by any room's transport are collected in [`OutgoingLines`] for the
/// connection to write out.
#[derive(Debug)]
pub struct RoomRouter {
    rooms: HashMap<String, RoomContext>,
    outgoing: mpsc::UnboundedSender<String>,
}

#[derive(Debug)]
struct RoomContext {
    incoming: mpsc::UnboundedSender<String>,
    lines_routed: usize,
}

/// Lines that room transports want sent to the server
#[derive(Debug)]
pub struct OutgoingLines {
    rx: mpsc::UnboundedReceiver<String>,
}

impl OutgoingLines {
    /// Wait for the next outgoing line; None once the router and every room
    /// transport are gone
    pub async fn next(&mut self) -> Option<String> {
        self.rx.recv().await
    }
}

impl RoomRouter {
    pub fn new() -> (Self, OutgoingLines) {
        let (outgoing, rx) = mpsc::unbounded_channel();
        let router = Self {
            rooms: HashMap::new(),
            outgoing,
        };
        (router, OutgoingLines { rx })
    }

    /// Start routing a room, returning the transport its battle reads from.
    ///
    /// Opening a room that is already open replaces it; the old transport
    /// sees its stream end.
    pub fn open_room(&mut self, room: &str) -> ChannelTransport {
        let (incoming, rx) = mpsc::unbounded_channel();
        let previous = self.rooms.insert(
            room.to_string(),
            RoomContext {
                incoming,
                lines_routed: 0,
            },
        );
        if previous.is_some() {
            tracing::warn!(room, "Room reopened, previous transport closed");
        } else {
            tracing::debug!(room, "Room opened");
        }

        ChannelTransport::new(rx, self.outgoing.clone())
    }

    /// Stop routing a room. Its transport sees end of stream once it has
    /// drained what was already delivered.
    pub fn close_room(&mut self, room: &str) -> bool {
        match self.rooms.remove(room) {
            Some(context) => {
                tracing::debug!(room, lines = context.lines_routed, "Room closed");
                true
            }
            None => false,
        }
    }

    pub fn has_room(&self, room: &str) -> bool {
        self.rooms.contains_key(room)
    }

    pub fn rooms(&self) -> impl Iterator<Item = &str> {
        self.rooms.keys().map(String::as_str)
    }

    /// Deliver a frame to its room.
    ///
    /// Returns the frame back when no open room claims it (global messages,
    /// or the first frame of a room not opened yet). A room whose transport
    /// has been dropped is closed here. `|deinit|` closes the room after the
    /// frame is delivered.
    pub fn route(&mut self, frame: ServerFrame) -> Option<ServerFrame> {
        let Some(room) = frame.room_id.as_deref() else {
            return Some(frame);
        };
        let Some(context) = self.rooms.get_mut(room) else {
            return Some(frame);
        };

        let mut deinit = false;
        for line in &frame.lines {
            deinit |= line.starts_with("|deinit");
            if context.incoming.send(line.clone()).is_err() {
                tracing::debug!(room, "Room transport dropped");
                deinit = true;
                break;
            }
            context.lines_routed += 1;
        }

        if deinit {
            self.close_room(room);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::Transport;
    use pivot_protocol::parse_server_frame;

    #[tokio::test]
    async fn test_routes_frames_to_their_room() {
        let (mut router, _outgoing) = RoomRouter::new();
        let mut first = router.open_room("battle-gen9ou-1");
        let mut second = router.open_room("battle-gen9ou-2");

        assert!(router.route(parse_server_frame(">battle-gen9ou-2\n|turn|4")).is_none());
        assert!(router.route(parse_server_frame(">battle-gen9ou-1\n|turn|1\n|upkeep")).is_none());

        assert_eq!(first.receive_line().await.unwrap().as_deref(), Some("|turn|1"));
        assert_eq!(first.receive_line().await.unwrap().as_deref(), Some("|upkeep"));
        assert_eq!(second.receive_line().await.unwrap().as_deref(), Some("|turn|4"));
    }

    #[tokio::test]
    async fn test_unclaimed_frames_come_back() {
        let (mut router, _outgoing) = RoomRouter::new();

        let global = parse_server_frame("|challstr|4|abc");
        assert_eq!(router.route(global.clone()), Some(global));

        let unopened = parse_server_frame(">battle-gen9ou-9\n|init|battle");
        assert_eq!(router.route(unopened.clone()), Some(unopened));
    }

    #[tokio::test]
    async fn test_outgoing_lines_are_collected() {
        let (mut router, mut outgoing) = RoomRouter::new();
        let mut transport = router.open_room("battle-gen9ou-1");

        transport
            .send_line("battle-gen9ou-1|/choose move 1".to_string())
            .await
            .unwrap();
        assert_eq!(
            outgoing.next().await.as_deref(),
            Some("battle-gen9ou-1|/choose move 1")
        );
    }

    #[tokio::test]
    async fn test_close_room_ends_stream() {
        let (mut router, _outgoing) = RoomRouter::new();
        let mut transport = router.open_room("battle-gen9ou-1");

        router.route(parse_server_frame(">battle-gen9ou-1\n|win|Alice"));
        assert!(router.close_room("battle-gen9ou-1"));
        assert!(!router.close_room("battle-gen9ou-1"));

        assert_eq!(transport.receive_line().await.unwrap().as_deref(), Some("|win|Alice"));
        assert_eq!(transport.receive_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_deinit_and_dropped_transport_close_room() {
        let (mut router, _outgoing) = RoomRouter::new();

        let _kept = router.open_room("battle-gen9ou-1");
        router.route(parse_server_frame(">battle-gen9ou-1\n|deinit"));
        assert!(!router.has_room("battle-gen9ou-1"));

        let dropped = router.open_room("battle-gen9ou-2");
        drop(dropped);
        router.route(parse_server_frame(">battle-gen9ou-2\n|turn|2"));
        assert!(!router.has_room("battle-gen9ou-2"));
        assert_eq!(router.rooms().count(), 0);
    }
}
