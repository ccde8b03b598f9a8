use winit::event::WindowEvent;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// What the runtime should do after `App::on_idle`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Pacing {
    /// Something changed; schedule a redraw.
    Redraw,
    /// Like `Redraw`, but more input is already queued: come back without
    /// sleeping.
    Busy,
    /// Nothing to draw, but more input is queued.
    Poll,
    /// Sleep until a window event or a wake-up arrives.
    Wait,
    Exit,
}

/// Application contract implemented by higher layers.
pub trait App {
    /// Called for window events.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called whenever the event loop runs out of events, including after a
    /// `Waker::wake`.
    fn on_idle(&mut self) -> Pacing {
        Pacing::Wait
    }

    /// Called once per rendered frame.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
