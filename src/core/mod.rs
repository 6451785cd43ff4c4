//! Core client components.
//!
//! This module contains the connection and decoding logic:
//!
//! - **net**: TCP connection handle to the MUD server
//! - **protocol**: raw bytes → output events (ANSI SGR + telnet skipping)
//! - **session**: high-level session combining the connection, the reader
//!   thread, and the styled document
//!
//! # Architecture
//!
//! ```text
//! Session
//! ├── MudConnection (socket connect/send/shutdown)
//! ├── reader thread: socket → AnsiDecoder → mpsc<OutputEvent>
//! └── Document (drained from the channel on the UI thread)
//! ```

pub mod net;
pub mod protocol;
pub mod session;
