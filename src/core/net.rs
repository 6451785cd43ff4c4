//! Server connection handle
//!
//! A thin wrapper around the TCP socket to the MUD server: connect, send,
//! shutdown. Reading happens on a cloned handle owned by the session's
//! reader thread.

use std::io::{self, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use thiserror::Error;

/// Connect timeout; MUD servers either answer quickly or not at all.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum NetError {
    #[error("Could not resolve {0}")]
    Resolve(String),

    #[error("Could not connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("Could not send to the server: {0}")]
    Send(#[source] io::Error),

    #[error("Connection handle unusable: {0}")]
    Handle(#[source] io::Error),

    #[error("Not connected")]
    NotConnected,
}

pub type Result<T> = std::result::Result<T, NetError>;

/// An open connection to a MUD server.
pub struct MudConnection {
    stream: TcpStream,
}

impl MudConnection {
    /// Connect to `host:port`.
    pub fn connect(host: &str, port: u16) -> Result<Self> {
        let address = format!("{host}:{port}");
        let mut addrs = address
            .to_socket_addrs()
            .map_err(|_| NetError::Resolve(address.clone()))?;
        let addr = addrs.next().ok_or_else(|| NetError::Resolve(address.clone()))?;

        let stream = TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT)
            .map_err(|source| NetError::Connect { address, source })?;
        stream.set_nodelay(true).ok();

        tracing::info!("connected to {}:{}", host, port);
        Ok(Self { stream })
    }

    /// Clone the socket for the reader thread.
    pub fn reader(&self) -> Result<TcpStream> {
        self.stream.try_clone().map_err(NetError::Handle)
    }

    /// Send raw bytes to the server.
    pub fn send(&self, bytes: &[u8]) -> Result<()> {
        (&self.stream).write_all(bytes).map_err(NetError::Send)
    }

    /// Close both directions; unblocks a reader blocked in `read`.
    /// Safe to call more than once.
    pub fn shutdown(&self) {
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}
