//! Host bridge speaking newline-delimited JSON.
//!
//! The host engine feeds [`GameEvent`](crate::router::GameEvent)s on stdin
//! and reads one [`Outbound`] object per line from stdout.

use crate::menus::MenuView;
use crate::messages::Messenger;
use crate::router::Engine;
use herowars_shared::{ActorRequest, SessionKey};
use log::error;
use serde::Serialize;
use std::io::Write;

/// Messages written back to the host
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outbound<'a> {
    Tell { to: &'a SessionKey, text: &'a str },
    Broadcast { text: &'a str },
    Request { action: ActorRequest },
    Menu { to: &'a SessionKey, view: MenuView },
}

/// Writes every outbound message as a single JSON line
pub struct JsonLines<W: Write> {
    writer: W,
}

impl<W: Write> JsonLines<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn send(&mut self, message: &Outbound<'_>) {
        if let Err(e) = self.write_line(message) {
            error!("Failed to write {:?} to host: {}", message, e);
        }
    }

    fn write_line(&mut self, message: &Outbound<'_>) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.writer, message)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}

impl<W: Write> Engine for JsonLines<W> {
    fn apply(&mut self, request: ActorRequest) {
        self.send(&Outbound::Request { action: request });
    }

    fn open_menu(&mut self, to: &SessionKey, view: MenuView) {
        self.send(&Outbound::Menu { to, view });
    }
}

impl<W: Write> Messenger for JsonLines<W> {
    fn tell(&mut self, to: &SessionKey, text: &str) {
        self.send(&Outbound::Tell { to, text });
    }

    fn broadcast(&mut self, text: &str) {
        self.send(&Outbound::Broadcast { text });
    }
}
