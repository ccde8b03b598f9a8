use anyhow::{anyhow, Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy};
use winit::window::{Window, WindowId};

use crate::core::{App as CoreApp, AppControl, FrameCtx, Pacing, WindowCtx};
use crate::device::{Gpu, GpuInit};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "vanity".to_string(),
            initial_size: LogicalSize::new(800.0, 600.0),
        }
    }
}

/// User event delivered by [`Waker::wake`].
#[derive(Debug, Copy, Clone)]
pub struct WakeUp;

/// Wakes the event loop from another thread so `App::on_idle` runs again.
#[derive(Clone)]
pub struct Waker {
    proxy: EventLoopProxy<WakeUp>,
}

impl Waker {
    /// Returns false once the event loop is gone.
    pub fn wake(&self) -> bool {
        self.proxy.send_event(WakeUp).is_ok()
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens one window and drives the app built by `build` until it exits
    /// or the window is closed.
    ///
    /// `build` runs before any window exists and may fail. Window or GPU
    /// creation failures are returned after the loop ends.
    pub fn run<A, F>(config: RuntimeConfig, gpu_init: GpuInit, build: F) -> Result<()>
    where
        A: CoreApp + 'static,
        F: FnOnce(Waker) -> Result<A>,
    {
        let event_loop = EventLoop::<WakeUp>::with_user_event()
            .build()
            .context("failed to create winit EventLoop")?;
        event_loop.set_control_flow(ControlFlow::Wait);

        let waker = Waker {
            proxy: event_loop.create_proxy(),
        };
        let mut state = AppState::new(config, gpu_init, build(waker)?);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<A>
where
    A: CoreApp + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    window: Option<WindowEntry>,
    exit_requested: bool,
    failure: Option<anyhow::Error>,
}

impl<A> AppState<A>
where
    A: CoreApp + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            app,
            window: None,
            exit_requested: false,
            failure: None,
        }
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        let entry = WindowEntryTryBuilder {
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed")?;

        entry.with_window(|w| w.request_redraw());
        self.window = Some(entry);
        Ok(())
    }

    /// Waits for the device to drain, then destroys the window and leaves
    /// the loop.
    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        if let Some(mut entry) = self.window.take() {
            entry.with_gpu_mut(|gpu| gpu.wait_idle());
            drop(entry);
            log::debug!("window destroyed");
        }
        event_loop.exit();
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.failure = Some(err);
        self.shutdown(event_loop);
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId) {
        let app = &mut self.app;
        let Some(entry) = self.window.as_mut() else {
            return;
        };

        let mut control = AppControl::Continue;
        entry.with_mut(|fields| {
            let mut ctx = FrameCtx {
                window: WindowCtx {
                    id: window_id,
                    window: fields.window,
                },
                gpu: fields.gpu,
            };
            control = app.on_frame(&mut ctx);
        });

        if control == AppControl::Exit {
            self.shutdown(event_loop);
        }
    }
}

impl<A> ApplicationHandler<WakeUp> for AppState<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.exit_requested {
            return;
        }

        if let Err(e) = self.create_window_entry(event_loop) {
            self.fail(event_loop, e);
        }
    }

    // The wake-up itself carries nothing; `about_to_wait` polls the app.
    fn user_event(&mut self, _event_loop: &ActiveEventLoop, _event: WakeUp) {}

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let (redraw, flow) = match self.app.on_idle() {
            Pacing::Redraw => (true, ControlFlow::Wait),
            Pacing::Busy => (true, ControlFlow::Poll),
            Pacing::Poll => (false, ControlFlow::Poll),
            Pacing::Wait => (false, ControlFlow::Wait),
            Pacing::Exit => {
                self.shutdown(event_loop);
                return;
            }
        };

        if redraw {
            if let Some(entry) = self.window.as_ref() {
                entry.with_window(|w| w.request_redraw());
            }
        }
        event_loop.set_control_flow(flow);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        if self.app.on_window_event(&event) == AppControl::Exit {
            self.shutdown(event_loop);
            return;
        }

        match &event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),

            WindowEvent::Resized(new_size) => {
                if let Some(entry) = self.window.as_mut() {
                    entry.with_gpu_mut(|gpu| gpu.resize(*new_size));
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(entry) = self.window.as_mut() {
                    let new_size = entry.with_window(|w| w.inner_size());
                    entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop, window_id),

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(mut entry) = self.window.take() {
            entry.with_gpu_mut(|gpu| gpu.wait_idle());
        }
        if self.failure.is_none() && !self.exit_requested {
            self.failure = Some(anyhow!("event loop exited unexpectedly"));
        }
    }
}
