//! Interactive CLI shell over a byte stream
//!
//! `ShellSession` drives a device CLI by writing one line at a time and reading
//! until the device prompt returns. The transport only has to provide a
//! non-blocking `Read + Write` stream; `ssh.rs` supplies one over libssh2.
//!
//! Output left on the stream from an earlier exchange (a second prompt after
//! login, a late banner line) is drained before every write so each reply
//! belongs to the line that produced it.

use super::credentials::DeviceCredentials;
use super::errors::SessionError;
use super::platform::PlatformProfile;
use super::prompt::{PromptKind, PromptMatcher};
use super::DeviceSession;
use crate::config::compile_time::session::{MAX_COMMAND_OUTPUT_BYTES, READ_CHUNK_SIZE};
use crate::{log_debug, log_warning};
use std::io::{self, ErrorKind, Read, Write};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Silence that ends a drain
const DRAIN_QUIET_PERIOD: Duration = Duration::from_millis(60);

/// Trailing bytes inspected for a prompt after each chunk
const PROMPT_WINDOW_BYTES: usize = 512;

/// Device replies that mean a configuration line was rejected
const CLI_ERROR_MARKERS: &[&str] = &[
    "% Invalid input",
    "% Incomplete command",
    "% Ambiguous command",
    "% Unknown command",
    "% Invalid command",
];

/// Non-blocking byte stream attached to a device shell
///
/// Reads return `ErrorKind::WouldBlock` when no output is pending.
pub trait ShellStream: Read + Write {
    /// The device closed its side of the stream
    fn at_eof(&self) -> bool;

    /// Write one CLI line
    fn send_line(&mut self, line: &str) -> io::Result<()> {
        self.write_all(format!("{}\n", line).as_bytes())?;
        self.flush()
    }

    /// Leave the shell with `exit_command` and release the transport
    fn close(&mut self, exit_command: &str) -> Result<(), SessionError>;
}

/// CLI session on one device over a `ShellStream`
pub struct ShellSession<S: ShellStream> {
    host: String,
    secret: String,
    profile: PlatformProfile,
    stream: Option<S>,
    prompt: PromptMatcher,
    mode: PromptKind,
    paging_disabled: bool,
    read_timeout: Duration,
}

impl<S: ShellStream> ShellSession<S> {
    /// Wake the shell and learn the device prompt
    pub fn start(
        mut stream: S,
        credentials: &DeviceCredentials,
        read_timeout: Duration,
    ) -> Result<Self, SessionError> {
        stream.send_line("")?;
        let banner = read_until(&mut stream, read_timeout, "initial prompt", |tail| {
            PromptMatcher::learn(tail).is_some()
        })?;
        let (prompt, mode) = PromptMatcher::learn(&banner).ok_or_else(|| SessionError::Timeout {
            timeout_ms: duration_ms(read_timeout),
            waiting_for: "initial prompt".to_string(),
        })?;

        Ok(Self {
            host: credentials.host.clone(),
            secret: credentials.secret.clone(),
            profile: PlatformProfile::for_device(credentials.device_type),
            stream: Some(stream),
            prompt,
            mode,
            paging_disabled: false,
            read_timeout,
        })
    }

    pub fn prompt(&self) -> &PromptMatcher {
        &self.prompt
    }

    pub fn mode(&self) -> PromptKind {
        self.mode
    }

    /// Write one line and read until the device prompt returns
    fn exchange(&mut self, line: &str) -> Result<String, SessionError> {
        let stream = self.stream.as_mut().ok_or(SessionError::Closed)?;
        drain(stream, self.read_timeout)?;
        stream.send_line(line)?;

        let prompt = &self.prompt;
        let raw = read_until(stream, self.read_timeout, line, |tail| {
            prompt.match_tail(tail).is_some()
        })?;
        if let Some(kind) = self.prompt.match_tail(&raw) {
            self.mode = kind;
        }
        Ok(raw)
    }

    fn disable_paging(&mut self) -> Result<(), SessionError> {
        if self.paging_disabled {
            return Ok(());
        }
        if let Some(command) = self.profile.paging_command {
            self.exchange(command)?;
        }
        self.paging_disabled = true;
        Ok(())
    }

    /// Send every line; a rejected line is logged and the push continues
    fn push_lines(&mut self, commands: &[String]) -> Result<String, SessionError> {
        let mut output = String::new();
        for command in commands {
            let raw = self.exchange(command)?;
            let cleaned = self.prompt.clean_output(&raw, command);
            if let Some(marker) = detect_cli_error(&cleaned) {
                log_warning!("Device rejected configuration line",
                    "host" => self.host,
                    "command" => command,
                    "reply" => marker
                );
            }
            output.push_str(&cleaned);
            output.push('\n');
        }
        Ok(output)
    }
}

impl<S: ShellStream> DeviceSession for ShellSession<S> {
    fn host(&self) -> &str {
        &self.host
    }

    fn enable(&mut self) -> Result<(), SessionError> {
        if self.mode == PromptKind::Privileged || !self.profile.requires_enable {
            return self.disable_paging();
        }

        let password_prompt = self.profile.password_prompt;
        let stream = self.stream.as_mut().ok_or(SessionError::Closed)?;
        drain(stream, self.read_timeout)?;
        stream.send_line(self.profile.enable_command)?;

        let prompt = &self.prompt;
        let waiting = |tail: &str| {
            tail.trim_end().ends_with(password_prompt) || prompt.match_tail(tail).is_some()
        };
        let mut reply = read_until(stream, self.read_timeout, "enable prompt", &waiting)?;

        if reply.trim_end().ends_with(password_prompt) {
            stream.send_line(&self.secret)?;
            reply = read_until(stream, self.read_timeout, "privileged prompt", &waiting)?;
            if reply.trim_end().ends_with(password_prompt) {
                return Err(SessionError::EnableFailed {
                    reason: "enable secret rejected".to_string(),
                });
            }
        }

        match self.prompt.match_tail(&reply) {
            Some(PromptKind::Privileged) => {
                self.mode = PromptKind::Privileged;
                self.disable_paging()
            }
            _ => Err(SessionError::EnableFailed {
                reason: "device did not reach privileged mode".to_string(),
            }),
        }
    }

    fn send_command(&mut self, command: &str) -> Result<String, SessionError> {
        let raw = self.exchange(command)?;
        Ok(self.prompt.clean_output(&raw, command))
    }

    fn send_config_set(&mut self, commands: &[String]) -> Result<String, SessionError> {
        let enter = self.profile.config_enter_command;
        let exit = self.profile.config_exit_command;

        self.exchange(enter)?;
        if self.mode != PromptKind::Configuration {
            return Err(SessionError::command_failed(
                enter,
                "device did not enter configuration mode",
            ));
        }

        let pushed = self.push_lines(commands);

        // Leave configuration mode even when the push broke off
        let left = self.exchange(exit);
        let output = pushed?;
        left?;

        if self.mode == PromptKind::Configuration {
            return Err(SessionError::command_failed(
                exit,
                "device stayed in configuration mode",
            ));
        }
        Ok(output)
    }

    fn disconnect(&mut self) -> Result<(), SessionError> {
        match self.stream.take() {
            Some(mut stream) => stream.close(self.profile.exit_command),
            None => Ok(()),
        }
    }
}

impl<S: ShellStream> Drop for ShellSession<S> {
    fn drop(&mut self) {
        if self.stream.is_some() {
            let _ = self.disconnect();
        }
    }
}

/// Discard pending output until the stream stays quiet
fn drain<S: ShellStream>(stream: &mut S, limit: Duration) -> Result<(), SessionError> {
    let started = Instant::now();
    let mut quiet_since = started;
    let mut discarded = 0usize;
    let mut chunk = vec![0u8; READ_CHUNK_SIZE];

    loop {
        match stream.read(&mut chunk) {
            Ok(0) if stream.at_eof() => return Err(SessionError::Closed),
            Ok(0) => {}
            Ok(n) => {
                discarded += n;
                quiet_since = Instant::now();
                continue;
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => {}
            Err(e) => return Err(e.into()),
        }

        let now = Instant::now();
        if now.duration_since(quiet_since) >= DRAIN_QUIET_PERIOD
            || now.duration_since(started) >= limit
        {
            break;
        }
        thread::sleep(POLL_INTERVAL);
    }

    if discarded > 0 {
        log_debug!("Discarded stale shell output", "bytes" => discarded);
    }
    Ok(())
}

/// Accumulate output until `done` accepts its tail or the deadline passes
///
/// `done` sees only the last `PROMPT_WINDOW_BYTES`; the full buffer is decoded
/// once when it returns.
fn read_until<S, F>(
    stream: &mut S,
    timeout: Duration,
    waiting_for: &str,
    done: F,
) -> Result<String, SessionError>
where
    S: ShellStream,
    F: Fn(&str) -> bool,
{
    let deadline = Instant::now() + timeout;
    let mut buffer: Vec<u8> = Vec::new();
    let mut chunk = vec![0u8; READ_CHUNK_SIZE];

    loop {
        match stream.read(&mut chunk) {
            Ok(0) if stream.at_eof() => return Err(SessionError::Closed),
            Ok(0) => {}
            Ok(n) => {
                buffer.extend_from_slice(&chunk[..n]);
                if buffer.len() > MAX_COMMAND_OUTPUT_BYTES {
                    return Err(SessionError::OutputTooLarge {
                        command: waiting_for.to_string(),
                        limit: MAX_COMMAND_OUTPUT_BYTES,
                    });
                }
                let window = &buffer[buffer.len().saturating_sub(PROMPT_WINDOW_BYTES)..];
                if done(String::from_utf8_lossy(window).as_ref()) {
                    return Ok(String::from_utf8_lossy(&buffer).into_owned());
                }
                continue;
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => {}
            Err(e) => return Err(e.into()),
        }

        if Instant::now() >= deadline {
            return Err(SessionError::Timeout {
                timeout_ms: duration_ms(timeout),
                waiting_for: waiting_for.to_string(),
            });
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// First CLI error marker found in a command reply
fn detect_cli_error(output: &str) -> Option<&'static str> {
    CLI_ERROR_MARKERS
        .iter()
        .copied()
        .find(|marker| output.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::DeviceType;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    const TIMEOUT: Duration = Duration::from_secs(2);

    /// Replays canned device output; each written line releases the next reply
    #[derive(Default)]
    struct ScriptedStream {
        readable: VecDeque<Vec<u8>>,
        replies: VecDeque<Vec<&'static str>>,
        partial: Vec<u8>,
        written: Rc<RefCell<Vec<String>>>,
        eof: bool,
    }

    impl ScriptedStream {
        fn greeting(text: &str) -> Self {
            let mut stream = Self::default();
            stream.readable.push_back(text.as_bytes().to_vec());
            stream
        }

        fn then(mut self, reply: &[&'static str]) -> Self {
            self.replies.push_back(reply.to_vec());
            self
        }

        fn written(&self) -> Rc<RefCell<Vec<String>>> {
            Rc::clone(&self.written)
        }
    }

    impl Read for ScriptedStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let Some(mut chunk) = self.readable.pop_front() else {
                if self.eof {
                    return Ok(0);
                }
                return Err(io::Error::from(ErrorKind::WouldBlock));
            };
            let n = chunk.len().min(buf.len());
            buf[..n].copy_from_slice(&chunk[..n]);
            if n < chunk.len() {
                self.readable.push_front(chunk.split_off(n));
            }
            Ok(n)
        }
    }

    impl Write for ScriptedStream {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            for &byte in buf {
                if byte != b'\n' {
                    self.partial.push(byte);
                    continue;
                }
                let line = String::from_utf8_lossy(&self.partial).into_owned();
                self.partial.clear();
                self.written.borrow_mut().push(line);
                if let Some(reply) = self.replies.pop_front() {
                    self.readable
                        .extend(reply.into_iter().map(|chunk| chunk.as_bytes().to_vec()));
                }
            }
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl ShellStream for ScriptedStream {
        fn at_eof(&self) -> bool {
            self.eof
        }

        fn close(&mut self, exit_command: &str) -> Result<(), SessionError> {
            self.written.borrow_mut().push(exit_command.to_string());
            Ok(())
        }
    }

    fn credentials() -> DeviceCredentials {
        DeviceCredentials::new("r1.lab", "prne", "pw", "s3cret")
    }

    fn start(stream: ScriptedStream) -> ShellSession<ScriptedStream> {
        ShellSession::start(stream, &credentials(), TIMEOUT).unwrap()
    }

    #[test]
    fn test_second_login_prompt_does_not_shift_replies() {
        let stream = ScriptedStream::greeting("\r\nUser Access Verification\r\nR1>")
            .then(&["\r\nR1>"])
            .then(&["enable\r\nPassword: "])
            .then(&["\r\nR1#"])
            .then(&["terminal length 0\r\nR1#"])
            .then(&["show clock\r\n*12:00:00.000 UTC Mon Mar 1 2021\r\nR1#"]);
        let written = stream.written();
        let mut session = start(stream);
        assert_eq!(session.mode(), PromptKind::UserExec);

        session.enable().unwrap();
        let clock = session.send_command("show clock").unwrap();

        assert_eq!(session.mode(), PromptKind::Privileged);
        assert_eq!(clock, "*12:00:00.000 UTC Mon Mar 1 2021");
        assert_eq!(
            *written.borrow(),
            vec!["", "enable", "s3cret", "terminal length 0", "show clock"]
        );
    }

    #[test]
    fn test_rejected_enable_secret() {
        let stream = ScriptedStream::greeting("R1>")
            .then(&[])
            .then(&["enable\r\nPassword: "])
            .then(&["\r\n% Access denied\r\n\r\nPassword: "]);
        let mut session = start(stream);

        let result = session.enable();
        assert!(matches!(result, Err(SessionError::EnableFailed { .. })));
    }

    #[test]
    fn test_privileged_login_skips_enable() {
        let stream = ScriptedStream::greeting("R1#")
            .then(&["\r\nR1#"])
            .then(&["terminal length 0\r\nR1#"]);
        let written = stream.written();
        let mut session = start(stream);

        session.enable().unwrap();
        session.enable().unwrap();

        assert_eq!(*written.borrow(), vec!["", "terminal length 0"]);
    }

    #[test]
    fn test_config_set_round_trip_sends_every_line() {
        let stream = ScriptedStream::greeting("R1#")
            .then(&[])
            .then(&["configure terminal\r\nEnter configuration commands, one per line.  End with CNTL/Z.\r\nR1(config)#"])
            .then(&["logging 192.168.1.100\r\nR1(config)#"])
            .then(&["logging source-interface Vlan1\r\n                               ^\r\n% Invalid input detected at '^' marker.\r\n\r\nR1(config)#"])
            .then(&["logging on\r\nR1(config)#"])
            .then(&["end\r\nR1#"]);
        let written = stream.written();
        let mut session = start(stream);
        let commands: Vec<String> = ["logging 192.168.1.100", "logging source-interface Vlan1", "logging on"]
            .iter()
            .map(|c| c.to_string())
            .collect();

        let output = session.send_config_set(&commands).unwrap();

        assert!(output.contains("% Invalid input"));
        assert_eq!(session.mode(), PromptKind::Privileged);
        assert_eq!(
            *written.borrow(),
            vec![
                "",
                "configure terminal",
                "logging 192.168.1.100",
                "logging source-interface Vlan1",
                "logging on",
                "end",
            ]
        );
    }

    #[test]
    fn test_config_mode_refused() {
        let stream = ScriptedStream::greeting("R1#")
            .then(&[])
            .then(&["configure terminal\r\n% Authorization failed.\r\nR1#"]);
        let written = stream.written();
        let mut session = start(stream);

        let result = session.send_config_set(&["logging on".to_string()]);

        assert!(matches!(result, Err(SessionError::CommandFailed { .. })));
        assert!(!written.borrow().contains(&"logging on".to_string()));
    }

    #[test]
    fn test_reply_split_across_chunks() {
        let stream = ScriptedStream::greeting("R1#").then(&[]).then(&[
            "show running-config\r\nBuilding configuration...\r\n",
            "hostname R1\r\nend\r\nR",
            "1#",
        ]);
        let mut session = start(stream);

        let output = session.send_command("show running-config").unwrap();
        assert_eq!(output, "Building configuration...\nhostname R1\nend");
    }

    #[test]
    fn test_silent_device_times_out() {
        let mut stream = ScriptedStream::default();
        let result = read_until(&mut stream, Duration::from_millis(100), "prompt", |_| false);

        assert!(matches!(
            result,
            Err(SessionError::Timeout { timeout_ms: 100, .. })
        ));
    }

    #[test]
    fn test_closed_stream_while_reading() {
        let mut stream = ScriptedStream {
            eof: true,
            ..Default::default()
        };
        let result = read_until(&mut stream, TIMEOUT, "prompt", |_| false);
        assert!(matches!(result, Err(SessionError::Closed)));
    }

    #[test]
    fn test_disconnect_is_idempotent() {
        let stream = ScriptedStream::greeting("R1#").then(&[]);
        let written = stream.written();
        let mut session = start(stream);

        session.disconnect().unwrap();
        session.disconnect().unwrap();

        assert!(matches!(
            session.send_command("show version"),
            Err(SessionError::Closed)
        ));
        assert_eq!(written.borrow().last().map(String::as_str), Some("exit"));
        assert_eq!(written.borrow().iter().filter(|l| *l == "exit").count(), 1);
    }

    #[test]
    fn test_nxos_profile_from_credentials() {
        let credentials = credentials().with_device_type(DeviceType::CiscoNxos);
        let stream = ScriptedStream::greeting("n9k#")
            .then(&[])
            .then(&["terminal length 0\r\nn9k#"]);
        let mut session = ShellSession::start(stream, &credentials, TIMEOUT).unwrap();

        session.enable().unwrap();
        assert_eq!(session.prompt().hostname(), "n9k");
    }

    #[test]
    fn test_detect_cli_error() {
        assert_eq!(
            detect_cli_error("logging trap bogus\n% Invalid input detected at '^' marker."),
            Some("% Invalid input")
        );
        assert_eq!(detect_cli_error("logging 10.1.1.1"), None);
    }
}
