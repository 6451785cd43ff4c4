//! Session management
//!
//! Owns one server connection and the consumption loop around it: a reader
//! thread decodes socket bytes into output events and queues them; the UI
//! thread drains the queue in arrival order into the document. Outbound,
//! the session forwards submitted input (echoing it into the document) and
//! dispatches activated links.

use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::net::{MudConnection, NetError, Result};
use super::protocol::AnsiDecoder;
use crate::output::link::decode_action;
use crate::output::{Applied, Document, OutputEvent, Palette, RgbColor, SendTo, StyledRun};

/// Colors for locally echoed input, kept visually distinct from server
/// text. Already resolved; echo never goes through the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EchoStyle {
    pub foreground: Option<RgbColor>,
    pub background: Option<RgbColor>,
}

impl Default for EchoStyle {
    fn default() -> Self {
        Self {
            foreground: Some(RgbColor::new(255, 255, 0)),
            background: None,
        }
    }
}

/// What a drain pass observed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Drained {
    /// Document content changed; the screen needs a repaint.
    pub changed: bool,
    /// The server rang the bell.
    pub bell: bool,
    /// The stream ended and everything queued has been applied.
    pub closed: bool,
}

/// A client session
pub struct Session {
    /// The styled document built from server output.
    pub document: Document,
    palette: Palette,
    echo: EchoStyle,
    connection: Option<MudConnection>,
    /// Running flag shared with the reader thread
    running: Arc<AtomicBool>,
    reader_thread: Option<JoinHandle<()>>,
    /// Channel carrying decoded events off the reader thread
    output_rx: Option<Receiver<OutputEvent>>,
}

impl Session {
    pub fn new(palette: Palette, echo: EchoStyle) -> Self {
        Self {
            document: Document::new(),
            palette,
            echo,
            connection: None,
            running: Arc::new(AtomicBool::new(false)),
            reader_thread: None,
            output_rx: None,
        }
    }

    /// Connect to the server and start the reader thread.
    ///
    /// On failure nothing is spawned and the error carries a short
    /// human-readable message for the status line.
    pub fn connect(&mut self, host: &str, port: u16) -> Result<()> {
        let connection = MudConnection::connect(host, port)?;
        let mut reader = connection.reader()?;

        let (tx, rx) = mpsc::channel::<OutputEvent>();
        self.running.store(true, Ordering::SeqCst);
        let running = self.running.clone();

        let reader_thread = thread::spawn(move || {
            let mut decoder = AnsiDecoder::new();
            let mut buffer = vec![0u8; 4096];
            let mut events = Vec::new();

            while running.load(Ordering::SeqCst) {
                match reader.read(&mut buffer) {
                    Ok(0) => {
                        // Server closed the stream: a graceful end
                        tracing::info!("server closed the connection");
                        break;
                    }
                    Ok(n) => {
                        decoder.feed(&buffer[..n], &mut events);
                        for event in events.drain(..) {
                            if tx.send(event).is_err() {
                                return;
                            }
                        }
                    }
                    Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                    Err(error) => {
                        // A shutdown from disconnect() also lands here
                        if running.load(Ordering::SeqCst) {
                            tracing::error!("read error: {}", error);
                        }
                        break;
                    }
                }
            }
            running.store(false, Ordering::SeqCst);
        });

        self.connection = Some(connection);
        self.reader_thread = Some(reader_thread);
        self.output_rx = Some(rx);
        Ok(())
    }

    /// Whether the consumption loop is still live.
    pub fn is_connected(&self) -> bool {
        self.connection.is_some() && self.running.load(Ordering::SeqCst)
    }

    /// Drain queued events into the document, in arrival order.
    ///
    /// Runs on the UI thread; together with [`Session::send_input`] this is
    /// the only place the document is mutated, so the two stay serialized
    /// without a lock.
    pub fn process_output(&mut self) -> Drained {
        let mut drained = Drained::default();
        let mut closed = false;

        if let Some(rx) = &self.output_rx {
            loop {
                match rx.try_recv() {
                    Ok(event) => match self.document.apply(event, &self.palette) {
                        Applied::Changed => drained.changed = true,
                        Applied::Bell => drained.bell = true,
                        Applied::Unchanged => {}
                    },
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        closed = true;
                        break;
                    }
                }
            }
        }

        if closed {
            // Report the end of the stream exactly once
            self.output_rx = None;
            drained.closed = true;
        }
        drained
    }

    /// Apply events directly, bypassing the network. Used by offline mode.
    pub fn feed_events(&mut self, events: impl IntoIterator<Item = OutputEvent>) -> Drained {
        let mut drained = Drained::default();
        for event in events {
            match self.document.apply(event, &self.palette) {
                Applied::Changed => drained.changed = true,
                Applied::Bell => drained.bell = true,
                Applied::Unchanged => {}
            }
        }
        drained
    }

    /// Send one line of input to the server and echo it into the document.
    ///
    /// A failure here leaves the consumption loop running; the caller shows
    /// the error next to the input area.
    pub fn send_input(&mut self, text: &str) -> Result<()> {
        let connection = self.connection.as_ref().ok_or(NetError::NotConnected)?;
        connection.send(format!("{text}\r\n").as_bytes())?;
        self.document.echo(StyledRun::plain(
            text,
            self.echo.foreground,
            self.echo.background,
        ));
        Ok(())
    }

    /// Dispatch an activated link payload.
    ///
    /// Returns text destined for the input line, if any. Payloads that do
    /// not decode as internal links are external references and ignored.
    pub fn handle_link_activation(&mut self, payload: &str) -> Result<Option<String>> {
        match decode_action(payload) {
            Some((SendTo::Input, text)) => Ok(Some(text)),
            Some((SendTo::World, text)) => {
                self.send_input(&text)?;
                Ok(None)
            }
            _ => {
                tracing::debug!("ignoring external link: {}", payload);
                Ok(None)
            }
        }
    }

    /// Stop the consumption loop and close the connection. Idempotent;
    /// events still queued but not yet drained are discarded.
    pub fn disconnect(&mut self) {
        self.running.store(false, Ordering::SeqCst);

        if let Some(connection) = self.connection.take() {
            // Unblocks the reader thread's pending read
            connection.shutdown();
        }
        if let Some(reader_thread) = self.reader_thread.take() {
            let _ = reader_thread.join();
        }
        self.output_rx = None;
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.disconnect();
    }
}
