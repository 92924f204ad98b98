//! Byte Channel
//!
//! The blocking byte pipe a session talks through. `receive_exact` loops
//! until every requested byte has arrived, since a single read on a socket
//! may return any non-zero prefix of what the peer sent.

use std::io::{BufReader, ErrorKind, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::config::Config;
use crate::error::{QapError, Result};

/// Blocking, ordered byte transport
pub trait Channel {
    /// Write every byte of `bytes`; returns the number written
    fn send_all(&mut self, bytes: &[u8]) -> Result<usize>;

    /// Read exactly `n` bytes, blocking until they arrive
    fn receive_exact(&mut self, n: usize) -> Result<Vec<u8>>;

    /// Total bytes written so far
    fn bytes_sent(&self) -> u64;

    /// Total bytes read so far
    fn bytes_received(&self) -> u64;

    /// Release the underlying stream. Calling it again is a no-op.
    fn close(&mut self) -> Result<()>;
}

/// Channel over any `Read + Write` stream
pub struct StreamChannel<S: Read + Write> {
    /// Buffered stream; `None` once closed
    stream: Option<BufReader<S>>,

    /// Peer description for logging
    peer: String,

    sent: u64,
    received: u64,
}

/// Channel over a TCP socket
pub type TcpChannel = StreamChannel<TcpStream>;

impl<S: Read + Write> StreamChannel<S> {
    /// Wrap an already connected stream
    pub fn new(stream: S, peer: impl Into<String>) -> Self {
        Self {
            stream: Some(BufReader::new(stream)),
            peer: peer.into(),
            sent: 0,
            received: 0,
        }
    }

    /// Peer description (the socket address for TCP)
    pub fn peer(&self) -> &str {
        &self.peer
    }

    pub fn is_closed(&self) -> bool {
        self.stream.is_none()
    }

    fn stream_mut(&mut self) -> Result<&mut BufReader<S>> {
        self.stream
            .as_mut()
            .ok_or_else(|| QapError::Connection("channel closed".to_string()))
    }
}

impl StreamChannel<TcpStream> {
    /// Resolve `config.address()` and open a TCP connection.
    ///
    /// Tries each resolved address in turn and applies the configured
    /// timeouts to the first socket that connects.
    pub fn connect(config: &Config) -> Result<Self> {
        let address = config.address();
        let candidates = address
            .to_socket_addrs()
            .map_err(|e| QapError::Connection(format!("cannot resolve {}: {}", address, e)))?;

        let mut last_error = None;
        for candidate in candidates {
            let attempt = match config.connect_timeout() {
                Some(timeout) => TcpStream::connect_timeout(&candidate, timeout),
                None => TcpStream::connect(candidate),
            };
            match attempt {
                Ok(stream) => {
                    configure_socket(
                        &stream,
                        &address,
                        config.read_timeout(),
                        config.write_timeout(),
                    )?;

                    let peer = stream
                        .peer_addr()
                        .map(|a| a.to_string())
                        .unwrap_or_else(|_| address.clone());
                    tracing::debug!("Connected to {}", peer);
                    return Ok(Self::new(stream, peer));
                }
                Err(e) => {
                    tracing::debug!("Connect to {} failed: {}", candidate, e);
                    last_error = Some(e);
                }
            }
        }

        Err(QapError::Connection(match last_error {
            Some(e) => format!("cannot connect to {}: {}", address, e),
            None => format!("{} resolved to no addresses", address),
        }))
    }
}

/// Disable Nagle and apply timeouts; requests are small and strictly
/// request/response
fn configure_socket(
    stream: &TcpStream,
    address: &str,
    read_timeout: Option<Duration>,
    write_timeout: Option<Duration>,
) -> Result<()> {
    stream
        .set_nodelay(true)
        .and_then(|_| stream.set_read_timeout(read_timeout))
        .and_then(|_| stream.set_write_timeout(write_timeout))
        .map_err(|e| {
            QapError::Connection(format!("cannot configure socket to {}: {}", address, e))
        })
}

impl<S: Read + Write> Channel for StreamChannel<S> {
    fn send_all(&mut self, bytes: &[u8]) -> Result<usize> {
        let peer = self.peer.clone();
        let stream = self.stream_mut()?.get_mut();

        stream
            .write_all(bytes)
            .and_then(|_| stream.flush())
            .map_err(|e| QapError::Connection(format!("write to {} failed: {}", peer, e)))?;

        self.sent += bytes.len() as u64;
        Ok(bytes.len())
    }

    fn receive_exact(&mut self, n: usize) -> Result<Vec<u8>> {
        let peer = self.peer.clone();
        let stream = self.stream_mut()?;

        let mut buf = vec![0u8; n];
        let mut filled = 0;
        while filled < n {
            match stream.read(&mut buf[filled..]) {
                Ok(0) => {
                    return Err(QapError::Connection(format!(
                        "stream from {} closed after {} of {} bytes",
                        peer, filled, n
                    )))
                }
                Ok(read) => filled += read,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    return Err(QapError::Connection(format!(
                        "read from {} timed out after {} of {} bytes",
                        peer, filled, n
                    )))
                }
                Err(e) => {
                    return Err(QapError::Connection(format!(
                        "read from {} failed: {}",
                        peer, e
                    )))
                }
            }
        }

        self.received += n as u64;
        Ok(buf)
    }

    fn bytes_sent(&self) -> u64 {
        self.sent
    }

    fn bytes_received(&self) -> u64 {
        self.received
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut stream) = self.stream.take() {
            // Dropping the stream releases the descriptor even if the flush fails
            let flushed = stream.get_mut().flush();
            tracing::debug!("Closed channel to {}", self.peer);
            flushed.map_err(|e| {
                QapError::Connection(format!("flush to {} failed: {}", self.peer, e))
            })?;
        }
        Ok(())
    }
}

impl<S: Read + Write> Drop for StreamChannel<S> {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
