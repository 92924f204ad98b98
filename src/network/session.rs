//! Session
//!
//! One authenticated conversation with a server over a [`Channel`].
//!
//! ## Lifecycle
//! ```text
//!   connect() ──► Connected ──login()──► Ready ──close()──► Closed
//!                    │                                 ▲
//!                    └── (no login required) ──► Ready ┘
//! ```
//!
//! Requests are strictly sequential: every method sends one request and reads
//! its response to the end before returning, because responses are matched
//! to requests by position only. All methods take `&mut self`; sharing a
//! session between threads needs an external lock and still serializes every
//! request.

use std::io::{ErrorKind, Read};

use crate::auth::{self, PasswordHasher};
use crate::config::Config;
use crate::error::{QapError, Result};
use crate::protocol::{
    read_response, write_request, CommandType, Greeting, Parameter, RequestPacket,
    ResponseStatus, GREETING_SIZE,
};
use crate::sexp::{self, Expression};

use super::channel::{Channel, TcpChannel};

/// Server versions above this prefix `eval` results with a DT header
const TYPED_EVAL_VERSION: u32 = 100;

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Greeting accepted, login still required
    Connected,
    /// Commands may be issued
    Ready,
    /// Channel released
    Closed,
}

/// Client session
pub struct Session<C: Channel = TcpChannel> {
    /// `None` once closed
    channel: Option<C>,

    greeting: Greeting,

    state: SessionState,

    /// Payload bytes per packet in `write_file_from`
    file_chunk_size: usize,

    hasher: Option<Box<dyn PasswordHasher>>,
}

impl Session<TcpChannel> {
    /// Open a TCP connection and perform the handshake
    pub fn connect(config: &Config) -> Result<Self> {
        config.validate()?;
        let channel = TcpChannel::connect(config)?;
        Session::from_channel(channel, config)
    }
}

impl<C: Channel> Session<C> {
    /// Run the handshake over an already open channel.
    ///
    /// The channel is closed if the greeting is rejected.
    pub fn from_channel(mut channel: C, config: &Config) -> Result<Self> {
        config.validate()?;

        let greeting = match channel
            .receive_exact(GREETING_SIZE)
            .and_then(|bytes| Greeting::parse(&bytes))
        {
            Ok(greeting) => greeting,
            Err(e) => {
                let _ = channel.close();
                return Err(match e {
                    QapError::Connection(reason) => {
                        QapError::Handshake(format!("Handshake failed: {}", reason))
                    }
                    other => other,
                });
            }
        };

        tracing::debug!(
            "Server greeting: version {}, auth {:?}",
            greeting.version,
            greeting.auth
        );

        let state = if greeting.auth_required() {
            SessionState::Connected
        } else {
            SessionState::Ready
        };

        Ok(Self {
            channel: Some(channel),
            greeting,
            state,
            file_chunk_size: config.file_chunk_size,
            hasher: None,
        })
    }

    /// Install the password hasher used for crypt logins
    pub fn with_hasher(mut self, hasher: impl PasswordHasher + 'static) -> Self {
        self.set_password_hasher(hasher);
        self
    }

    pub fn set_password_hasher(&mut self, hasher: impl PasswordHasher + 'static) {
        self.hasher = Some(Box::new(hasher));
    }

    // =========================================================================
    // Session info
    // =========================================================================

    /// Protocol version from the greeting, e.g. 102
    pub fn server_version(&self) -> u32 {
        self.greeting.version
    }

    /// Whether the server asked for a login
    pub fn needs_login(&self) -> bool {
        self.greeting.auth_required()
    }

    pub fn greeting(&self) -> &Greeting {
        &self.greeting
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == SessionState::Closed
    }

    /// Bytes written to the channel, 0 once closed
    pub fn bytes_sent(&self) -> u64 {
        self.channel.as_ref().map_or(0, Channel::bytes_sent)
    }

    /// Bytes read from the channel including the greeting, 0 once closed
    pub fn bytes_received(&self) -> u64 {
        self.channel.as_ref().map_or(0, Channel::bytes_received)
    }

    pub fn file_chunk_size(&self) -> usize {
        self.file_chunk_size
    }

    /// Change the chunk size used by [`Session::write_file_from`]
    pub fn set_file_chunk_size(&mut self, size: usize) -> Result<()> {
        if size == 0 {
            return Err(QapError::Config(
                "file_chunk_size must be greater than zero".to_string(),
            ));
        }
        self.file_chunk_size = size;
        Ok(())
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Log in with the mechanism the greeting advertised.
    ///
    /// A no-op when the server does not require a login.
    pub fn login(&mut self, user: &str, password: &str) -> Result<()> {
        let Some(method) = self.greeting.auth.clone() else {
            tracing::debug!("Server does not require login, skipping");
            return Ok(());
        };

        let message = auth::login_message(user, password, &method, self.hasher.as_deref())?;
        self.request(RequestPacket::new(CommandType::Login).param(Parameter::string(&message)?))?;

        tracing::debug!("Logged in as {}", user);
        self.state = SessionState::Ready;
        Ok(())
    }

    // =========================================================================
    // Evaluation
    // =========================================================================

    /// Evaluate `command` on the server and decode the result
    pub fn eval(&mut self, command: &str) -> Result<Expression> {
        let content =
            self.request(RequestPacket::new(CommandType::Eval).param(Parameter::string(command)?))?;

        if content.is_empty() {
            return Err(QapError::UnexpectedResponse(
                "eval returned no content".to_string(),
            ));
        }

        if self.greeting.version > TYPED_EVAL_VERSION {
            sexp::decode_parameter(&content)
        } else {
            let (expression, _) = sexp::decode(&content, 0)?;
            Ok(expression)
        }
    }

    /// Evaluate `command` and discard the result
    pub fn void_eval(&mut self, command: &str) -> Result<()> {
        self.request(
            RequestPacket::new(CommandType::VoidEval).param(Parameter::string(command)?),
        )?;
        Ok(())
    }

    /// Bind `value` to `symbol` in the server's workspace
    pub fn assign(&mut self, symbol: &str, value: &Expression) -> Result<()> {
        let request = RequestPacket::new(CommandType::AssignSexp)
            .param(Parameter::string(symbol)?)
            .param(Parameter::sexp(value)?);
        self.request(request)?;
        Ok(())
    }

    // =========================================================================
    // Server control
    // =========================================================================

    /// Ask the server process to shut down
    pub fn shutdown(&mut self) -> Result<()> {
        self.request(RequestPacket::new(CommandType::Shutdown))?;
        Ok(())
    }

    /// Ask the server to accept incoming packets of up to `size` bytes
    pub fn set_buffer_size(&mut self, size: i32) -> Result<()> {
        self.request(RequestPacket::new(CommandType::SetBufferSize).param(Parameter::int(size)))?;
        Ok(())
    }

    // =========================================================================
    // File commands
    // =========================================================================

    /// Open a server-side file for reading
    pub fn open_file(&mut self, name: &str) -> Result<()> {
        self.file_command(CommandType::OpenFile, name)
    }

    /// Create (or truncate) a server-side file for writing
    pub fn create_file(&mut self, name: &str) -> Result<()> {
        self.file_command(CommandType::CreateFile, name)
    }

    pub fn close_file(&mut self) -> Result<()> {
        self.request(RequestPacket::new(CommandType::CloseFile))?;
        Ok(())
    }

    pub fn remove_file(&mut self, name: &str) -> Result<()> {
        self.file_command(CommandType::RemoveFile, name)
    }

    /// Read up to `size` bytes from the open file; empty at end of file
    pub fn read_file(&mut self, size: i32) -> Result<Vec<u8>> {
        let content =
            self.request(RequestPacket::new(CommandType::ReadFile).param(Parameter::int(size)))?;
        Ok(content.to_vec())
    }

    /// Append `data` to the open file in a single packet
    pub fn write_file(&mut self, data: &[u8]) -> Result<()> {
        self.request(RequestPacket::new(CommandType::WriteFile).param(Parameter::bytes(data)?))?;
        Ok(())
    }

    /// Stream `reader` into the open file, one packet per chunk.
    ///
    /// Returns the number of bytes uploaded.
    pub fn write_file_from<R: Read>(&mut self, mut reader: R) -> Result<u64> {
        let mut chunk = vec![0u8; self.file_chunk_size];
        let mut total = 0u64;

        loop {
            let filled = fill_chunk(&mut reader, &mut chunk)?;
            if filled == 0 {
                break;
            }
            self.write_file(&chunk[..filled])?;
            total += filled as u64;
        }

        tracing::debug!(
            "Uploaded {} bytes in chunks of {}",
            total,
            self.file_chunk_size
        );
        Ok(total)
    }

    fn file_command(&mut self, command: CommandType, name: &str) -> Result<()> {
        self.request(RequestPacket::new(command).param(Parameter::string(name)?))?;
        Ok(())
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Release the channel. Safe to call more than once.
    pub fn close(&mut self) -> Result<()> {
        self.state = SessionState::Closed;
        match self.channel.take() {
            Some(mut channel) => {
                tracing::debug!("Closing session");
                channel.close()
            }
            None => Ok(()),
        }
    }

    /// Send one request and return the content of its OK response
    fn request(&mut self, request: RequestPacket) -> Result<bytes::Bytes> {
        let channel = self
            .channel
            .as_mut()
            .ok_or_else(|| QapError::Connection("session closed".to_string()))?;

        let exchange = write_request(channel, &request).and_then(|_| read_response(channel));
        let response = match exchange {
            Ok(response) => response,
            Err(e) => {
                // The stream may be mid-frame; later responses would be misaligned
                if matches!(e, QapError::Connection(_) | QapError::Io(_)) {
                    tracing::warn!("{:?} aborted: {}, closing session", request.command(), e);
                    let _ = self.close();
                }
                return Err(e);
            }
        };

        if let ResponseStatus::Error(code) = response.status() {
            tracing::warn!(
                "{:?} failed with server error {}: {}",
                request.command(),
                code.code(),
                code.message()
            );
        }

        response.into_content()
    }
}

impl<C: Channel> Drop for Session<C> {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

/// Fill `chunk` from `reader` as far as possible; short only at end of input
fn fill_chunk<R: Read>(reader: &mut R, chunk: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < chunk.len() {
        match reader.read(&mut chunk[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}
