//! The viewer process: a window that renders whatever arrives on a command
//! stream until the stream ends or the window is closed.

use std::io::Read;

use anyhow::{Context, Result};
use winit::dpi::LogicalSize;

use vanity_engine::core::{App, AppControl, FrameCtx, Pacing};
use vanity_engine::device::GpuInit;
use vanity_engine::draw::{DrawList, UploadRing};
use vanity_engine::paint::Color;
use vanity_engine::render::{TriangleRecorder, TriangleRenderer, WgpuDevice};
use vanity_engine::window::{Runtime, RuntimeConfig};

use crate::consumer::{spawn_reader, Accumulator, Drain, Inbox, DEFAULT_QUEUE_CHUNKS};
use crate::tessellate::tessellate;

/// Background of every frame.
pub const BACKGROUND: Color = Color::WHITE;

/// Builder for the viewer window.
///
/// ```rust,ignore
/// Viewer::new()
///     .title("my plot")
///     .size(800.0, 600.0)
///     .run(std::io::stdin())?;
/// ```
pub struct Viewer {
    title: String,
    width: f64,
    height: f64,
    queue_chunks: usize,
    gpu: GpuInit,
}

impl Viewer {
    pub fn new() -> Self {
        Self {
            title: "vanity plot".to_string(),
            width: 800.0,
            height: 600.0,
            queue_chunks: DEFAULT_QUEUE_CHUNKS,
            gpu: GpuInit::default(),
        }
    }

    pub fn title(mut self, t: impl Into<String>) -> Self {
        self.title = t.into();
        self
    }

    /// Initial window size in logical pixels.
    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Chunks the reader may queue ahead of the render loop.
    pub fn queue_chunks(mut self, n: usize) -> Self {
        self.queue_chunks = n.max(1);
        self
    }

    pub fn gpu(mut self, init: GpuInit) -> Self {
        self.gpu = init;
        self
    }

    /// Reads commands from `source` and renders them until end-of-stream,
    /// a corrupt command, or the window closing.
    ///
    /// Window, device and buffer failures are returned.
    pub fn run<R>(self, source: R) -> Result<()>
    where
        R: Read + Send + 'static,
    {
        let config = RuntimeConfig {
            title: self.title,
            initial_size: LogicalSize::new(self.width, self.height),
        };
        let queue_chunks = self.queue_chunks;

        Runtime::run(config, self.gpu, move |waker| {
            // Detached: it blocks on `source` until the producer goes away.
            let (inbox, _reader) = spawn_reader(source, queue_chunks, move || {
                waker.wake();
            })
            .context("failed to start the command reader")?;
            Ok(PlotApp::new(inbox))
        })
    }
}

impl Default for Viewer {
    fn default() -> Self {
        Self::new()
    }
}

// ── PlotApp ───────────────────────────────────────────────────────────────

struct PlotApp {
    inbox: Inbox,
    accumulator: Accumulator,

    draw: DrawList,
    ring: UploadRing<wgpu::Buffer>,
    recorder: TriangleRecorder,
    renderer: TriangleRenderer,
}

impl PlotApp {
    fn new(inbox: Inbox) -> Self {
        Self {
            inbox,
            accumulator: Accumulator::new(),
            draw: DrawList::new(),
            ring: UploadRing::new(),
            recorder: TriangleRecorder::new(),
            renderer: TriangleRenderer::new(),
        }
    }
}

impl App for PlotApp {
    /// Drains whatever arrived, whether or not the last frame was drawn.
    fn on_idle(&mut self) -> Pacing {
        match self.accumulator.drain(&mut self.inbox) {
            Ok(Drain::Closed) => {
                log::info!("command stream closed");
                Pacing::Exit
            }
            Ok(Drain::Yield | Drain::Pending | Drain::FrameReady) => {
                let changed = self.accumulator.take_changed();
                match (changed, self.inbox.has_buffered()) {
                    (true, true) => Pacing::Busy,
                    (true, false) => Pacing::Redraw,
                    (false, true) => Pacing::Poll,
                    (false, false) => Pacing::Wait,
                }
            }
            Err(e) => {
                log::error!("corrupt command stream: {e}");
                Pacing::Exit
            }
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let visible = self.accumulator.visible();
        let draw = &mut self.draw;
        let ring = &mut self.ring;
        let recorder = &mut self.recorder;
        let renderer = &mut self.renderer;

        ctx.render(BACKGROUND, |rctx, target, parity| {
            draw.reset();
            draw.clear_color(BACKGROUND);
            tessellate(visible, rctx.viewport, draw);

            recorder.clear();
            let mut device = WgpuDevice::new(rctx.device, rctx.queue);
            draw.submit(ring, &mut device, recorder, parity)
                .context("failed to upload the frame")?;

            renderer.render(rctx, target, recorder);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consumer::DECODE_LIMIT;
    use crate::wire::{Command, Header};
    use crossbeam_channel::Sender;

    fn send(tx: &Sender<Vec<u8>>, commands: &[Command]) {
        for c in commands {
            tx.send(c.encode()).unwrap();
        }
    }

    fn app() -> (Sender<Vec<u8>>, PlotApp) {
        let (tx, inbox) = Inbox::bounded(DEFAULT_QUEUE_CHUNKS);
        (tx, PlotApp::new(inbox))
    }

    fn frame(x: f32) -> [Command; 3] {
        [Command::BeginFrame, Command::Point { x, y: x }, Command::EndFrame]
    }

    #[test]
    fn undrawn_frames_do_not_stop_draining() {
        let (tx, mut app) = app();
        send(&tx, &frame(1.0));
        send(&tx, &frame(2.0));
        drop(tx);

        // No on_frame in between: each idle pass still reads on.
        assert_eq!(app.on_idle(), Pacing::Busy);
        assert_eq!(app.on_idle(), Pacing::Redraw);
        assert_eq!(
            app.accumulator.visible().as_slice(),
            &[Command::Point { x: 2.0, y: 2.0 }]
        );
        assert_eq!(app.on_idle(), Pacing::Exit);
    }

    #[test]
    fn queued_frames_keep_the_loop_busy() {
        let (tx, mut app) = app();
        send(&tx, &frame(1.0));
        send(&tx, &[Command::BeginFrame, Command::Point { x: 2.0, y: 2.0 }]);

        assert_eq!(app.on_idle(), Pacing::Busy);
        assert_eq!(app.on_idle(), Pacing::Wait);
        assert_eq!(
            app.accumulator.visible().as_slice(),
            &[Command::Point { x: 1.0, y: 1.0 }]
        );
    }

    #[test]
    fn decode_limit_without_changes_polls_again() {
        let (tx, mut app) = app();
        let mode = Header::ContinuousMode.encode();
        let bytes: Vec<u8> = std::iter::repeat_n(mode, DECODE_LIMIT + 1)
            .flatten()
            .collect();
        tx.send(bytes).unwrap();

        assert_eq!(app.on_idle(), Pacing::Poll);
        assert_eq!(app.on_idle(), Pacing::Wait);
    }

    #[test]
    fn corrupt_stream_exits() {
        let (tx, mut app) = app();
        tx.send(vec![0xff; 36]).unwrap();
        assert_eq!(app.on_idle(), Pacing::Exit);
    }
}
