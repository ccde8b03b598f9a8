//! Producer side of a plot.
//!
//! A `Session` owns the write end of the byte channel to a viewer process
//! and the handle needed to reap it. Every drawing call encodes one command
//! and writes it immediately; once the channel breaks the session goes
//! quiet and further calls do nothing.

mod config;
mod consumer;
mod error;

use std::io::{self, Write};
use std::process::{Child, ChildStdin, Stdio};
use std::time::{Duration, Instant};

use crate::wire::Header;

pub use config::SessionConfig;
pub use consumer::Consumer;
pub use error::SessionError;

/// File name of the viewer executable.
pub const VIEWER_BIN: &str = "vanity-plot-viewer";

/// Environment variable naming the viewer executable.
pub const VIEWER_ENV: &str = "VANITY_PLOT_VIEWER";

const REAP_INTERVAL: Duration = Duration::from_millis(10);

/// Handle on a running plot.
pub struct Session<W: Write = ChildStdin, C: Consumer = Child> {
    alive: bool,
    channel: Option<W>,
    consumer: Option<C>,
    shutdown_timeout: Duration,
}

impl Session {
    /// Opens a `width` x `height` plot window in a new viewer process.
    pub fn open(width: u32, height: u32) -> Result<Self, SessionError> {
        Self::open_with(&SessionConfig::default(), width, height)
    }

    pub fn open_with(
        config: &SessionConfig,
        width: u32,
        height: u32,
    ) -> Result<Self, SessionError> {
        let viewer = config.resolve_viewer()?;
        log::debug!("starting viewer {}", viewer.display());

        let mut command = std::process::Command::new(viewer);
        command.arg("--title").arg(&config.title);
        if let Some(filter) = &config.log_filter {
            command.arg("--log").arg(filter);
        }

        let mut session = Self::spawn(command, width, height)?;
        session.shutdown_timeout = config.shutdown_timeout;
        Ok(session)
    }

    /// Spawns `command` as the consumer, passing the window size and
    /// piping its stdin.
    pub fn spawn(
        mut command: std::process::Command,
        width: u32,
        height: u32,
    ) -> Result<Self, SessionError> {
        command
            .arg("--width")
            .arg(width.to_string())
            .arg("--height")
            .arg(height.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::null());

        let mut child = command.spawn().map_err(|source| SessionError::Spawn {
            program: command.get_program().to_owned(),
            source,
        })?;

        let Some(stdin) = child.stdin.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(SessionError::NoChannel);
        };

        log::info!("plot viewer started (pid {})", child.id());
        Ok(Session::from_parts(stdin, child))
    }
}

impl<W: Write, C: Consumer> Session<W, C> {
    /// Wraps an already connected channel and consumer.
    pub fn from_parts(channel: W, consumer: C) -> Self {
        Self {
            alive: true,
            channel: Some(channel),
            consumer: Some(consumer),
            shutdown_timeout: SessionConfig::default().shutdown_timeout,
        }
    }

    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// True while the channel is open and the consumer has not exited.
    ///
    /// Reaps an exited consumer as a side effect.
    pub fn is_alive(&mut self) -> bool {
        if !self.alive {
            return false;
        }

        let Some(consumer) = self.consumer.as_mut() else {
            self.alive = false;
            return false;
        };
        match consumer.try_reap() {
            Ok(false) => {}
            Ok(true) => {
                log::debug!("viewer has exited");
                self.consumer = None;
                self.mark_closed();
            }
            Err(e) => {
                log::warn!("failed to poll viewer status: {e}");
                self.mark_closed();
            }
        }
        self.alive
    }

    // ── drawing ───────────────────────────────────────────────────────────

    /// Color for every following primitive.
    pub fn set_color(&mut self, r: f32, g: f32, b: f32) {
        self.send(Header::Color { r, g, b }, &[], &[]);
    }

    pub fn point(&mut self, x: f32, y: f32) {
        self.send(Header::Point { x, y }, &[], &[]);
    }

    /// Draws `min(xs.len(), ys.len())` points.
    pub fn points(&mut self, xs: &[f32], ys: &[f32]) {
        let (xs, ys) = paired("points", xs, ys);
        self.send(
            Header::PointArray {
                count: xs.len() as u32,
            },
            xs,
            ys,
        );
    }

    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.send(Header::Line { x1, y1, x2, y2 }, &[], &[]);
    }

    /// Connects consecutive points with line segments.
    pub fn polyline(&mut self, xs: &[f32], ys: &[f32]) {
        let (xs, ys) = paired("polyline", xs, ys);
        self.send(
            Header::PolyLine {
                count: xs.len() as u32,
            },
            xs,
            ys,
        );
    }

    // ── accumulation ──────────────────────────────────────────────────────

    /// Forgets everything drawn so far.
    pub fn clear(&mut self) {
        self.send(Header::Clear, &[], &[]);
    }

    /// Starts a batched frame; the viewer shows nothing new until
    /// `end_frame`, and then only what was sent in between.
    pub fn begin_frame(&mut self) {
        self.send(Header::BeginFrame, &[], &[]);
    }

    pub fn end_frame(&mut self) {
        self.send(Header::EndFrame, &[], &[]);
    }

    /// Back to continuous accumulation.
    pub fn set_continuous(&mut self) {
        self.send(Header::ContinuousMode, &[], &[]);
    }

    // ── teardown ──────────────────────────────────────────────────────────

    /// Closes the channel and waits for the consumer to exit, killing it if
    /// it outlives the shutdown timeout.
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.alive = false;
        drop(self.channel.take());

        let Some(mut consumer) = self.consumer.take() else {
            return;
        };

        let deadline = Instant::now() + self.shutdown_timeout;
        loop {
            match consumer.try_reap() {
                Ok(true) => return,
                Ok(false) if Instant::now() < deadline => std::thread::sleep(REAP_INTERVAL),
                Ok(false) => break,
                Err(e) => {
                    log::warn!("failed to poll viewer status: {e}");
                    break;
                }
            }
        }

        log::warn!(
            "viewer did not exit within {:?}; killing it",
            self.shutdown_timeout
        );
        if let Err(e) = consumer.kill() {
            log::warn!("failed to kill viewer: {e}");
        }
        if let Err(e) = consumer.wait() {
            log::warn!("failed to reap viewer: {e}");
        }
    }

    // ── transport ─────────────────────────────────────────────────────────

    fn send(&mut self, header: Header, xs: &[f32], ys: &[f32]) {
        if !self.alive {
            return;
        }
        let Some(channel) = self.channel.as_mut() else {
            return;
        };

        let written = write_retrying(channel, &header.encode())
            .and_then(|()| write_retrying(channel, bytemuck::cast_slice(xs)))
            .and_then(|()| write_retrying(channel, bytemuck::cast_slice(ys)))
            .and_then(|()| channel.flush());

        if let Err(e) = written {
            if e.kind() == io::ErrorKind::BrokenPipe {
                log::debug!("viewer closed the channel");
            } else {
                log::warn!("plot channel write failed: {e}");
            }
            self.mark_closed();
        }
    }

    fn mark_closed(&mut self) {
        self.alive = false;
        drop(self.channel.take());
    }
}

impl<W: Write, C: Consumer> Drop for Session<W, C> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Writes all of `buf`, retrying interrupted and would-block writes.
fn write_retrying<W: Write>(w: &mut W, mut buf: &[u8]) -> io::Result<()> {
    while !buf.is_empty() {
        match w.write(buf) {
            Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
            Ok(n) => buf = &buf[n..],
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted) => {
                std::hint::spin_loop();
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

fn paired<'a>(what: &str, xs: &'a [f32], ys: &'a [f32]) -> (&'a [f32], &'a [f32]) {
    let mut n = xs.len().min(ys.len());
    if xs.len() != ys.len() {
        log::warn!(
            "{what}: {} xs but {} ys; drawing {n}",
            xs.len(),
            ys.len()
        );
    }
    if n > i32::MAX as usize {
        log::warn!("{what}: {n} elements exceed the wire limit; truncating");
        n = i32::MAX as usize;
    }
    (&xs[..n], &ys[..n])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{Command, HEADER_SIZE};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Consumer that exits after `polls_left` polls, or never.
    #[derive(Default, Clone)]
    struct FakeConsumer {
        state: Rc<RefCell<FakeState>>,
    }

    #[derive(Default)]
    struct FakeState {
        polls_left: Option<u32>,
        killed: bool,
        waited: bool,
    }

    impl Consumer for FakeConsumer {
        fn try_reap(&mut self) -> io::Result<bool> {
            let mut s = self.state.borrow_mut();
            if s.killed {
                return Ok(true);
            }
            match s.polls_left.as_mut() {
                Some(0) => Ok(true),
                Some(n) => {
                    *n -= 1;
                    Ok(false)
                }
                None => Ok(false),
            }
        }

        fn kill(&mut self) -> io::Result<()> {
            self.state.borrow_mut().killed = true;
            Ok(())
        }

        fn wait(&mut self) -> io::Result<()> {
            self.state.borrow_mut().waited = true;
            Ok(())
        }
    }

    /// Writer sharing its buffer with the test.
    #[derive(Clone, Default)]
    struct SharedBuf(Rc<RefCell<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Accepts a few bytes per call and interrupts every other call.
    struct Choppy {
        out: Vec<u8>,
        calls: usize,
    }

    impl Write for Choppy {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.calls += 1;
            match self.calls % 3 {
                0 => Err(io::ErrorKind::Interrupted.into()),
                1 => Err(io::ErrorKind::WouldBlock.into()),
                _ => {
                    let n = buf.len().min(5);
                    self.out.extend_from_slice(&buf[..n]);
                    Ok(n)
                }
            }
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn session() -> (Session<SharedBuf, FakeConsumer>, SharedBuf) {
        let buf = SharedBuf::default();
        let s = Session::from_parts(buf.clone(), FakeConsumer::default())
            .with_shutdown_timeout(Duration::ZERO);
        (s, buf)
    }

    #[test]
    fn commands_are_written_in_order() {
        let (mut s, buf) = session();
        s.line(0.0, 1.0, 0.0, 25.0);
        s.set_color(1.0, 0.0, 0.0);
        s.polyline(&[1.0, 2.0], &[1.0, 4.0]);

        let mut expected = Command::Line {
            x1: 0.0,
            y1: 1.0,
            x2: 0.0,
            y2: 25.0,
        }
        .encode();
        expected.extend(Command::Color { r: 1.0, g: 0.0, b: 0.0 }.encode());
        expected.extend(
            Command::PolyLine {
                xs: vec![1.0, 2.0],
                ys: vec![1.0, 4.0],
            }
            .encode(),
        );
        assert_eq!(*buf.0.borrow(), expected);
    }

    #[test]
    fn empty_arrays_send_header_only() {
        let (mut s, buf) = session();
        s.points(&[], &[]);
        assert_eq!(buf.0.borrow().len(), HEADER_SIZE);
    }

    #[test]
    fn mismatched_lengths_use_the_shorter() {
        let (mut s, buf) = session();
        s.points(&[1.0, 2.0, 3.0], &[4.0]);
        assert_eq!(
            *buf.0.borrow(),
            Command::PointArray {
                xs: vec![1.0],
                ys: vec![4.0],
            }
            .encode()
        );
    }

    #[test]
    fn partial_and_interrupted_writes_are_retried() {
        let choppy = Choppy {
            out: Vec::new(),
            calls: 0,
        };
        let mut s = Session::from_parts(choppy, FakeConsumer::default())
            .with_shutdown_timeout(Duration::ZERO);
        s.polyline(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]);
        assert!(s.is_alive());

        let out = s.channel.as_ref().map(|c| c.out.clone()).unwrap();
        assert_eq!(
            out,
            Command::PolyLine {
                xs: vec![1.0, 2.0, 3.0],
                ys: vec![4.0, 5.0, 6.0],
            }
            .encode()
        );
    }

    #[test]
    fn broken_pipe_silences_the_session() {
        let mut s = Session::from_parts(Broken, FakeConsumer::default())
            .with_shutdown_timeout(Duration::ZERO);
        assert!(s.is_alive());
        s.point(1.0, 2.0);
        assert!(!s.is_alive());

        // no-ops from here on
        s.point(3.0, 4.0);
        s.points(&[1.0], &[1.0]);
        s.end_frame();
        assert!(!s.is_alive());
    }

    #[test]
    fn exited_consumer_is_reaped() {
        let consumer = FakeConsumer::default();
        consumer.state.borrow_mut().polls_left = Some(1);
        let mut s = Session::from_parts(SharedBuf::default(), consumer)
            .with_shutdown_timeout(Duration::ZERO);

        assert!(s.is_alive());
        assert!(!s.is_alive());
        s.line(0.0, 0.0, 1.0, 1.0);
        assert!(!s.is_alive());
    }

    #[test]
    fn close_kills_a_lingering_consumer() {
        let consumer = FakeConsumer::default();
        let state = Rc::clone(&consumer.state);
        let s = Session::from_parts(SharedBuf::default(), consumer)
            .with_shutdown_timeout(Duration::ZERO);
        s.close();

        let state = state.borrow();
        assert!(state.killed);
        assert!(state.waited);
    }

    #[test]
    fn close_waits_for_a_cooperative_consumer() {
        let consumer = FakeConsumer::default();
        consumer.state.borrow_mut().polls_left = Some(3);
        let state = Rc::clone(&consumer.state);
        let s = Session::from_parts(SharedBuf::default(), consumer)
            .with_shutdown_timeout(Duration::from_secs(5));
        s.close();

        assert!(!state.borrow().killed);
    }

    #[test]
    fn drop_closes_the_channel() {
        let consumer = FakeConsumer::default();
        let state = Rc::clone(&consumer.state);
        {
            let _s = Session::from_parts(SharedBuf::default(), consumer)
                .with_shutdown_timeout(Duration::ZERO);
        }
        assert!(state.borrow().killed);
    }
}
