//! Chat session: read → frame → classify → render → play, one line at a time.
//!
//! ```text
//! Connecting ──join()──▶ Joined ──run()──▶ Listening ──cancel / EOF / fault──▶ Closed
//!                                             │  ▲
//!                                             └──┘ PING → PONG, PRIVMSG → audio
//! ```
//!
//! Playback blocks the session: no further bytes are read while a message is
//! sounding, so a burst of chat is played strictly in arrival order.

use crate::audio::player::Player;
use crate::defaults;
use crate::error::{ChatMorseError, Result};
use crate::irc::connection::Credentials;
use crate::irc::framer::LineFramer;
use crate::irc::message::{ChatMessage, Inbound, Outbound, parse_line};
use crate::output::{self, CloseReason, SessionEvent};
use crate::pipeline::MorsePipeline;
use std::future::Future;
use std::pin::Pin;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Lifecycle of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Joined,
    Listening,
    Closed,
}

/// Counters returned when a session ends cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub close_reason: CloseReason,
    pub messages_played: usize,
    pub pings_answered: usize,
    pub lines_dropped: usize,
    pub malformed_messages: usize,
}

/// One chat connection and everything needed to turn its messages into sound.
///
/// The session owns the stream; it is shut down when [`run`](Session::run)
/// returns, whatever the outcome, and dropped with the session.
pub struct Session<S, P> {
    stream: S,
    framer: LineFramer,
    pipeline: MorsePipeline,
    player: P,
    state: SessionState,
    quiet: bool,
    verbosity: u8,
    messages_played: usize,
    pings_answered: usize,
    lines_dropped: usize,
    malformed_messages: usize,
}

impl<S, P> Session<S, P>
where
    S: AsyncRead + AsyncWrite + Unpin,
    P: Player,
{
    pub fn new(stream: S, pipeline: MorsePipeline, player: P) -> Self {
        Self {
            stream,
            framer: LineFramer::new(),
            pipeline,
            player,
            state: SessionState::Connecting,
            quiet: false,
            verbosity: 0,
            messages_played: 0,
            pings_answered: 0,
            lines_dropped: 0,
            malformed_messages: 0,
        }
    }

    /// Set terminal output level (see [`crate::output`]).
    pub fn with_output(mut self, quiet: bool, verbosity: u8) -> Self {
        self.quiet = quiet;
        self.verbosity = verbosity;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    /// Send the login and join frames.
    ///
    /// # Errors
    /// `ChatMorseError::Connection` if the frames cannot be written, or
    /// `ChatMorseError::Other` if the session is past `Connecting`.
    pub async fn join(&mut self, credentials: &Credentials) -> Result<()> {
        if self.state != SessionState::Connecting {
            return Err(ChatMorseError::Other(format!(
                "Cannot join from state {:?}",
                self.state
            )));
        }

        self.send(Outbound::Pass(&credentials.token)).await?;
        self.send(Outbound::Nick(&credentials.nickname)).await?;
        self.send(Outbound::Join(&credentials.channel)).await?;

        self.state = SessionState::Joined;
        self.emit(&SessionEvent::Joined {
            channel: credentials.channel.clone(),
        });
        Ok(())
    }

    /// Listen until `cancel` resolves, the server hangs up, or the
    /// connection fails.
    ///
    /// `cancel` is checked before every read and before every line, so it
    /// takes effect as soon as the current playback finishes.
    ///
    /// # Errors
    /// `ChatMorseError::Connection` on socket failure and
    /// `ChatMorseError::AuthenticationFailed` when the server rejects the
    /// login. Per-line and per-message problems are reported and skipped.
    /// `ChatMorseError::Other` if the session has not joined yet or is
    /// already closed; the stream is left untouched in that case.
    pub async fn run<C>(&mut self, cancel: C) -> Result<SessionReport>
    where
        C: Future<Output = ()>,
    {
        if self.state != SessionState::Joined {
            return Err(ChatMorseError::Other(format!(
                "Cannot run from state {:?}",
                self.state
            )));
        }
        self.state = SessionState::Listening;

        let mut cancel = std::pin::pin!(cancel);
        let outcome = self.listen(cancel.as_mut()).await;
        self.close().await;

        let close_reason = outcome?;
        self.emit(&SessionEvent::Closed {
            reason: close_reason,
        });
        Ok(SessionReport {
            close_reason,
            messages_played: self.messages_played,
            pings_answered: self.pings_answered,
            lines_dropped: self.lines_dropped,
            malformed_messages: self.malformed_messages,
        })
    }

    async fn listen<C>(&mut self, mut cancel: Pin<&mut C>) -> Result<CloseReason>
    where
        C: Future<Output = ()>,
    {
        let mut buf = vec![0u8; defaults::READ_CHUNK_BYTES];
        loop {
            let read = tokio::select! {
                biased;
                _ = cancel.as_mut() => return Ok(CloseReason::Cancelled),
                read = self.stream.read(&mut buf) => read,
            };

            let n = read.map_err(|e| ChatMorseError::Connection {
                message: format!("Failed to read from server: {}", e),
            })?;
            if n == 0 {
                return Ok(CloseReason::RemoteClosed);
            }

            self.framer.feed(&buf[..n]);
            while let Some(line) = self.framer.next_line() {
                if is_resolved(cancel.as_mut()).await {
                    return Ok(CloseReason::Cancelled);
                }
                self.handle_line(line).await?;
            }
        }
    }

    /// Handle one framed line. Only errors that end the session are
    /// returned; undecodable and malformed lines are counted and skipped.
    async fn handle_line(&mut self, line: Result<String>) -> Result<()> {
        match self.dispatch(line).await {
            Err(e) if !e.is_fatal_to_session() => {
                self.skip(e);
                Ok(())
            }
            outcome => outcome,
        }
    }

    async fn dispatch(&mut self, line: Result<String>) -> Result<()> {
        let line = line?;
        match parse_line(&line)? {
            Inbound::Ping { payload } => {
                self.send(Outbound::Pong(payload)).await?;
                self.pings_answered += 1;
                self.emit(&SessionEvent::PingAnswered {
                    payload: payload.to_string(),
                });
            }
            Inbound::Chat(message) => self.play_message(&message),
            Inbound::AuthFailed { reason } => {
                return Err(ChatMorseError::AuthenticationFailed {
                    message: reason.to_string(),
                });
            }
            Inbound::Other => {}
        }
        Ok(())
    }

    fn skip(&mut self, error: ChatMorseError) {
        match error {
            ChatMorseError::UnrecognizedMessageShape { line } => {
                self.malformed_messages += 1;
                self.emit(&SessionEvent::MalformedMessage { line });
            }
            other => {
                self.lines_dropped += 1;
                self.emit(&SessionEvent::LineDropped {
                    reason: other.to_string(),
                });
            }
        }
    }

    /// Render and play a chat message. Failures are reported, never returned.
    fn play_message(&mut self, message: &ChatMessage<'_>) {
        let rendered = match self.pipeline.render(message.text) {
            Ok(rendered) => rendered,
            Err(e) => {
                self.emit(&SessionEvent::RenderFailed {
                    reason: e.to_string(),
                });
                return;
            }
        };

        self.emit(&SessionEvent::Message {
            sender: message.sender.to_string(),
            channel: message.channel.to_string(),
            text: message.text.to_string(),
            notation: rendered.encoded.to_string(),
            duration: rendered.waveform.duration(),
        });

        if rendered.waveform.is_empty() {
            return;
        }
        match self.player.play(&rendered.waveform) {
            Ok(()) => self.messages_played += 1,
            Err(e) => self.emit(&SessionEvent::PlaybackFailed {
                reason: e.to_string(),
            }),
        }
    }

    async fn send(&mut self, frame: Outbound<'_>) -> Result<()> {
        let wire = frame.to_wire();
        self.stream
            .write_all(wire.as_bytes())
            .await
            .map_err(|e| ChatMorseError::Connection {
                message: format!("Failed to send {}: {}", wire.trim_end(), e),
            })?;
        self.stream
            .flush()
            .await
            .map_err(|e| ChatMorseError::Connection {
                message: format!("Failed to flush writer: {}", e),
            })
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.shutdown().await
            && self.verbosity >= 2
        {
            eprintln!("chatmorse: shutdown after close failed: {}", e);
        }
        self.state = SessionState::Closed;
    }

    fn emit(&self, event: &SessionEvent) {
        output::render_event(event, self.quiet, self.verbosity);
    }
}

/// Poll `future` once without waiting.
async fn is_resolved<F>(future: Pin<&mut F>) -> bool
where
    F: Future<Output = ()>,
{
    tokio::select! {
        biased;
        _ = future => true,
        _ = std::future::ready(()) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::player::CollectorPlayer;
    use crate::audio::synth::ToneParams;
    use std::collections::VecDeque;
    use std::io;
    use std::task::{Context, Poll};
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream, ReadBuf, duplex};
    use tokio::sync::oneshot;

    const LOGIN: &str = "PASS oauth:t\r\nNICK bot\r\nJOIN #c\r\n";

    fn fast_pipeline() -> MorsePipeline {
        MorsePipeline::new(ToneParams {
            frequency_hz: 600.0,
            dot_duration: Duration::from_millis(1),
            sample_rate: 8000,
            volume: 0.5,
        })
    }

    fn session(stream: DuplexStream) -> Session<DuplexStream, CollectorPlayer> {
        Session::new(stream, fast_pipeline(), CollectorPlayer::new()).with_output(true, 0)
    }

    fn credentials() -> Credentials {
        Credentials {
            token: "oauth:t".to_string(),
            nickname: "bot".to_string(),
            channel: "c".to_string(),
        }
    }

    async fn joined<S, P>(mut session: Session<S, P>) -> Session<S, P>
    where
        S: AsyncRead + AsyncWrite + Unpin,
        P: Player,
    {
        session.join(&credentials()).await.unwrap();
        session
    }

    /// Strip the login frames from everything the client wrote.
    fn after_login(written: &str) -> &str {
        written
            .strip_prefix(LOGIN)
            .unwrap_or_else(|| panic!("Expected login frames first, got {:?}", written))
    }

    /// In-memory stream that replays scripted reads, including failures,
    /// and records writes.
    struct ScriptedStream {
        reads: VecDeque<io::Result<Vec<u8>>>,
        written: Vec<u8>,
        shut_down: bool,
    }

    impl ScriptedStream {
        fn new(reads: Vec<io::Result<Vec<u8>>>) -> Self {
            Self {
                reads: reads.into(),
                written: Vec::new(),
                shut_down: false,
            }
        }

        fn written(&self) -> &str {
            std::str::from_utf8(&self.written).unwrap()
        }
    }

    impl AsyncRead for ScriptedStream {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            match self.reads.pop_front() {
                Some(Ok(bytes)) => {
                    buf.put_slice(&bytes);
                    Poll::Ready(Ok(()))
                }
                Some(Err(e)) => Poll::Ready(Err(e)),
                None => Poll::Ready(Ok(())),
            }
        }
    }

    impl AsyncWrite for ScriptedStream {
        fn poll_write(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            self.written.extend_from_slice(buf);
            Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<io::Result<()>> {
            self.shut_down = true;
            Poll::Ready(Ok(()))
        }
    }

    /// Fires `trigger` the first time it plays anything.
    struct CancellingPlayer {
        trigger: Option<oneshot::Sender<()>>,
        played: usize,
    }

    impl Player for CancellingPlayer {
        fn play(&mut self, _waveform: &crate::audio::synth::Waveform) -> Result<()> {
            if let Some(trigger) = self.trigger.take() {
                trigger.send(()).unwrap();
            }
            self.played += 1;
            Ok(())
        }

        fn name(&self) -> &'static str {
            "cancelling"
        }
    }

    /// Feed `input` from the server side, hang up, and collect what the
    /// client wrote back.
    async fn run_with_input(
        input: &[u8],
    ) -> (Result<SessionReport>, Session<DuplexStream, CollectorPlayer>, String) {
        let (client, mut server) = duplex(64 * 1024);
        let mut session = joined(session(client)).await;

        server.write_all(input).await.unwrap();
        server.shutdown().await.unwrap();

        let result = session.run(std::future::pending()).await;

        let mut written = String::new();
        server.read_to_string(&mut written).await.unwrap();
        (result, session, after_login(&written).to_string())
    }

    #[tokio::test]
    async fn test_join_sends_login_frames() {
        let (client, mut server) = duplex(4096);
        let mut session = session(client);
        let credentials = Credentials {
            token: "oauth:secret".to_string(),
            nickname: "morsebot".to_string(),
            channel: "somechannel".to_string(),
        };

        session.join(&credentials).await.unwrap();
        assert_eq!(session.state(), SessionState::Joined);
        drop(session);

        let mut written = String::new();
        server.read_to_string(&mut written).await.unwrap();
        assert_eq!(
            written,
            "PASS oauth:secret\r\nNICK morsebot\r\nJOIN #somechannel\r\n"
        );
    }

    #[tokio::test]
    async fn test_join_twice_is_rejected() {
        let (client, _server) = duplex(4096);
        let mut session = session(client);
        let credentials = Credentials {
            token: "t".to_string(),
            nickname: "n".to_string(),
            channel: "c".to_string(),
        };
        session.join(&credentials).await.unwrap();
        assert!(session.join(&credentials).await.is_err());
    }

    #[tokio::test]
    async fn test_ping_gets_pong() {
        let (result, session, written) = run_with_input(b"PING :tmi.twitch.tv\r\n").await;

        let report = result.unwrap();
        assert_eq!(written, "PONG :tmi.twitch.tv\r\n");
        assert_eq!(report.pings_answered, 1);
        assert_eq!(report.close_reason, CloseReason::RemoteClosed);
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[tokio::test]
    async fn test_chat_message_is_played() {
        let input = b":alice!alice@alice.tmi.twitch.tv PRIVMSG #chan :sos\r\n";
        let (result, session, _) = run_with_input(input).await;

        let report = result.unwrap();
        assert_eq!(report.messages_played, 1);

        let expected = fast_pipeline().render("sos").unwrap().waveform;
        assert_eq!(session.player().played(), &[expected]);
    }

    #[tokio::test]
    async fn test_messages_play_in_arrival_order() {
        let input = b":a!a@a.tmi.twitch.tv PRIVMSG #c :e\r\n\
:b!b@b.tmi.twitch.tv PRIVMSG #c :t\r\n";
        let (result, session, _) = run_with_input(input).await;

        assert_eq!(result.unwrap().messages_played, 2);
        let played = session.player().played();
        // E (8 units) before T (10 units)
        assert!(played[0].len() < played[1].len());
    }

    #[tokio::test]
    async fn test_malformed_lines_do_not_stop_the_loop() {
        let input = b":broken PRIVMSG chan hi\r\n\
\xff\xfe\r\n\
PING :one\r\n\
:a!a@a.tmi.twitch.tv PRIVMSG nochannel :x\r\n\
PING :two\r\n\
:a!a@a.tmi.twitch.tv PRIVMSG #c :e\r\n";
        let (result, _, written) = run_with_input(input).await;

        let report = result.unwrap();
        assert_eq!(written, "PONG :one\r\nPONG :two\r\n");
        assert_eq!(report.pings_answered, 2);
        assert_eq!(report.malformed_messages, 2);
        assert_eq!(report.lines_dropped, 1);
        assert_eq!(report.messages_played, 1);
    }

    #[tokio::test]
    async fn test_playback_failure_is_contained() {
        let (client, mut server) = duplex(4096);
        let mut session = joined(
            Session::new(
                client,
                fast_pipeline(),
                CollectorPlayer::new().with_failure("no device"),
            )
            .with_output(true, 0),
        )
        .await;

        server
            .write_all(b":a!a@a.tmi.twitch.tv PRIVMSG #c :hi\r\nPING :x\r\n")
            .await
            .unwrap();
        server.shutdown().await.unwrap();

        let report = session.run(std::future::pending()).await.unwrap();
        assert_eq!(report.messages_played, 0);
        assert_eq!(report.pings_answered, 1);
    }

    #[tokio::test]
    async fn test_invalid_tone_params_are_contained() {
        let (client, mut server) = duplex(4096);
        let pipeline = MorsePipeline::new(ToneParams {
            frequency_hz: 0.0,
            ..ToneParams::default()
        });
        let mut session =
            joined(Session::new(client, pipeline, CollectorPlayer::new()).with_output(true, 0))
                .await;

        server
            .write_all(b":a!a@a.tmi.twitch.tv PRIVMSG #c :hi\r\nPING :still-alive\r\n")
            .await
            .unwrap();
        server.shutdown().await.unwrap();

        let report = session.run(std::future::pending()).await.unwrap();
        assert_eq!(report.messages_played, 0);
        assert_eq!(report.pings_answered, 1);
        assert!(session.player().played().is_empty());
    }

    #[tokio::test]
    async fn test_unplayable_text_is_skipped() {
        let input = b":a!a@a.tmi.twitch.tv PRIVMSG #c :?!?\r\n";
        let (result, session, _) = run_with_input(input).await;
        assert_eq!(result.unwrap().messages_played, 0);
        assert!(session.player().played().is_empty());
    }

    #[tokio::test]
    async fn test_line_split_across_reads() {
        let (client, mut server) = duplex(4096);
        let mut session = joined(session(client)).await;

        let writer = tokio::spawn(async move {
            let parts: [&[u8]; 4] = [b"PI", b"NG :sp", b"lit\r", b"\n"];
            for part in parts {
                server.write_all(part).await.unwrap();
                server.flush().await.unwrap();
                tokio::task::yield_now().await;
            }
            server.shutdown().await.unwrap();
            let mut written = String::new();
            server.read_to_string(&mut written).await.unwrap();
            written
        });

        let report = session.run(std::future::pending()).await.unwrap();
        assert_eq!(report.pings_answered, 1);
        assert_eq!(after_login(&writer.await.unwrap()), "PONG :split\r\n");
    }

    #[tokio::test]
    async fn test_cancellation_closes_session() {
        let (client, _server) = duplex(4096);
        let mut session = joined(session(client)).await;
        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();

        cancel_tx.send(()).unwrap();
        let report = session
            .run(async {
                cancel_rx.await.ok();
            })
            .await
            .unwrap();

        assert_eq!(report.close_reason, CloseReason::Cancelled);
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[tokio::test]
    async fn test_cancellation_while_waiting_for_input() {
        let (client, _server) = duplex(4096);
        let mut session = joined(session(client)).await;

        let report = session
            .run(tokio::time::sleep(Duration::from_millis(20)))
            .await
            .unwrap();
        assert_eq!(report.close_reason, CloseReason::Cancelled);
    }

    #[tokio::test]
    async fn test_auth_failure_is_fatal() {
        let input = b":tmi.twitch.tv NOTICE * :Login authentication failed\r\nPING :late\r\n";
        let (result, session, written) = run_with_input(input).await;

        assert!(matches!(
            result,
            Err(ChatMorseError::AuthenticationFailed { .. })
        ));
        assert_eq!(written, "", "nothing is processed after an auth failure");
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[tokio::test]
    async fn test_closed_session_cannot_run_again() {
        let (result, mut session, _) = run_with_input(b"").await;
        assert_eq!(result.unwrap().close_reason, CloseReason::RemoteClosed);
        assert!(session.run(std::future::pending()).await.is_err());
    }

    #[tokio::test]
    async fn test_run_before_join_is_rejected() {
        let (client, mut server) = duplex(4096);
        let mut session = session(client);
        server.write_all(b"PING :early\r\n").await.unwrap();

        let result = session.run(std::future::pending()).await;
        assert!(
            matches!(result, Err(ChatMorseError::Other(ref m)) if m.contains("Connecting")),
            "result: {:?}",
            result.map(|r| r.close_reason)
        );
        assert_eq!(session.state(), SessionState::Connecting);

        // Still usable: join and run normally afterwards
        let mut session = joined(session).await;
        server.shutdown().await.unwrap();
        let report = session.run(std::future::pending()).await.unwrap();
        assert_eq!(report.pings_answered, 1);
    }

    #[tokio::test]
    async fn test_read_error_closes_session_with_connection_error() {
        let stream = ScriptedStream::new(vec![
            Ok(b"PING :before\r\n".to_vec()),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer")),
            Ok(b"PING :after\r\n".to_vec()),
        ]);
        let mut session = joined(
            Session::new(stream, fast_pipeline(), CollectorPlayer::new()).with_output(true, 0),
        )
        .await;

        let result = session.run(std::future::pending()).await;
        match result {
            Err(ChatMorseError::Connection { message }) => {
                assert!(message.contains("reset by peer"), "message: {}", message);
            }
            other => panic!(
                "Expected connection error, got {:?}",
                other.map(|r| r.close_reason)
            ),
        }
        assert_eq!(session.state(), SessionState::Closed);
        assert!(session.stream.shut_down, "stream shut down after a read error");
        assert_eq!(after_login(session.stream.written()), "PONG :before\r\n");
        assert_eq!(session.stream.reads.len(), 1, "no reads after the failure");
    }

    #[tokio::test]
    async fn test_cancellation_between_lines_of_one_read() {
        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
        let batch = b":a!a@a.tmi.twitch.tv PRIVMSG #c :e\r\n\
:b!b@b.tmi.twitch.tv PRIVMSG #c :t\r\n\
PING :late\r\n";
        let stream = ScriptedStream::new(vec![Ok(batch.to_vec())]);
        let player = CancellingPlayer {
            trigger: Some(cancel_tx),
            played: 0,
        };
        let mut session =
            joined(Session::new(stream, fast_pipeline(), player).with_output(true, 0)).await;

        let report = session
            .run(async {
                cancel_rx.await.ok();
            })
            .await
            .unwrap();

        assert_eq!(report.close_reason, CloseReason::Cancelled);
        assert_eq!(report.messages_played, 1);
        assert_eq!(report.pings_answered, 0);
        assert_eq!(session.player().played, 1);
        assert_eq!(after_login(session.stream.written()), "");
        assert!(session.stream.shut_down);
    }
}
