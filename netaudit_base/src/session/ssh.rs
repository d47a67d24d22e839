//! SSH transport built on libssh2
//!
//! Opens an interactive shell with a PTY and hands the channel to
//! `ShellSession`. Reads are non-blocking so a silent device produces
//! `SessionError::Timeout` instead of hanging; writes block briefly.

use super::credentials::DeviceCredentials;
use super::errors::SessionError;
use super::shell::{ShellSession, ShellStream};
use super::{DeviceSession, SessionConnector, SessionSettings};
use crate::log_debug;
use ssh2::{Channel, Session};
use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};

const PTY_DIMENSIONS: (u32, u32, u32, u32) = (511, 24, 0, 0);

/// Opens `SshDeviceSession`s
#[derive(Debug, Clone, Default)]
pub struct SshConnector {
    settings: SessionSettings,
}

impl SshConnector {
    pub fn new(settings: SessionSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }
}

impl SessionConnector for SshConnector {
    fn connect(
        &self,
        credentials: &DeviceCredentials,
    ) -> Result<Box<dyn DeviceSession>, SessionError> {
        let session = SshDeviceSession::open(credentials, &self.settings)?;
        Ok(Box::new(session))
    }

    fn connector_id(&self) -> &str {
        "ssh"
    }
}

/// Interactive shell on one device over SSH
pub type SshDeviceSession = ShellSession<SshStream>;

/// PTY shell channel together with the session that owns it
pub struct SshStream {
    session: Session,
    channel: Channel,
}

impl Read for SshStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.channel.read(buf)
    }
}

impl Write for SshStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.channel.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.channel.flush()
    }
}

impl ShellStream for SshStream {
    fn at_eof(&self) -> bool {
        self.channel.eof()
    }

    fn send_line(&mut self, line: &str) -> io::Result<()> {
        self.session.set_blocking(true);
        let written = self
            .channel
            .write_all(format!("{}\n", line).as_bytes())
            .and_then(|_| self.channel.flush());
        self.session.set_blocking(false);
        written
    }

    fn close(&mut self, exit_command: &str) -> Result<(), SessionError> {
        self.session.set_blocking(true);
        let channel_result = close_channel(&mut self.channel, exit_command);
        let session_result = self
            .session
            .disconnect(None, "audit complete", None)
            .map_err(SessionError::from);

        channel_result.and(session_result)
    }
}

impl ShellSession<SshStream> {
    /// Connect, authenticate and open the shell
    pub fn open(
        credentials: &DeviceCredentials,
        settings: &SessionSettings,
    ) -> Result<Self, SessionError> {
        let address = credentials.address();
        let connect_failed = |reason: String| SessionError::ConnectFailed {
            address: address.clone(),
            reason,
        };

        let socket_addr = address
            .to_socket_addrs()
            .map_err(|e| connect_failed(e.to_string()))?
            .next()
            .ok_or_else(|| connect_failed("address did not resolve".to_string()))?;

        let tcp = TcpStream::connect_timeout(&socket_addr, settings.connect_timeout())
            .map_err(|e| connect_failed(e.to_string()))?;

        let mut session = Session::new()?;
        session.set_tcp_stream(tcp);
        session.set_timeout(u32::try_from(settings.read_timeout_ms).unwrap_or(u32::MAX));
        session
            .handshake()
            .map_err(|e| SessionError::HandshakeFailed {
                address: address.clone(),
                reason: e.to_string(),
            })?;

        let auth_failed = || SessionError::AuthenticationFailed {
            username: credentials.username.clone(),
        };
        session
            .userauth_password(&credentials.username, &credentials.password)
            .map_err(|_| auth_failed())?;
        if !session.authenticated() {
            return Err(auth_failed());
        }

        let mut channel = session.channel_session()?;
        channel.request_pty("vt100", None, Some(PTY_DIMENSIONS))?;
        channel.shell()?;
        session.set_blocking(false);

        let shell = ShellSession::start(
            SshStream { session, channel },
            credentials,
            settings.read_timeout(),
        )?;

        log_debug!("Shell opened",
            "address" => address,
            "prompt_host" => shell.prompt().hostname()
        );
        Ok(shell)
    }
}

fn close_channel(channel: &mut Channel, exit_command: &str) -> Result<(), SessionError> {
    channel.write_all(format!("{}\n", exit_command).as_bytes())?;
    channel.send_eof()?;
    channel.close()?;
    channel.wait_close()?;
    Ok(())
}
