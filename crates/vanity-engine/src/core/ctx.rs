use anyhow::Result;
use winit::window::{Window, WindowId};

use crate::device::{Gpu, SurfaceErrorAction};
use crate::draw::Parity;
use crate::paint::Color;
use crate::render::{RenderCtx, RenderTarget};

use super::app::AppControl;

/// Window handle and immutable window metadata.
pub struct WindowCtx<'a> {
    pub id: WindowId,
    pub window: &'a Window,
}

/// Per-frame context passed to `core::App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gpu: &'a mut Gpu<'w>,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    /// Clears the surface with `clear`, calls `draw` with a ready [`RenderCtx`],
    /// [`RenderTarget`] and the frame's upload parity, then presents.
    ///
    /// Zero-size windows are skipped. An error from `draw` is logged and
    /// ends the application; the frame is not presented.
    pub fn render<F>(&mut self, clear: Color, draw: F) -> AppControl
    where
        F: FnOnce(&RenderCtx<'_>, &mut RenderTarget<'_>, Parity) -> Result<()>,
    {
        if self.gpu.is_zero_sized() {
            return AppControl::Continue;
        }

        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                let action = self.gpu.handle_surface_error(err);
                if action == SurfaceErrorAction::Fatal {
                    return AppControl::Exit;
                }
                return AppControl::Continue;
            }
        };

        let rctx = RenderCtx::from_gpu(self.gpu);

        // RenderTarget borrows frame.encoder; dropped before submit() takes frame.
        let drawn = {
            let mut target = RenderTarget::new(&mut frame.encoder, &frame.view);
            drop(target.begin_pass("vanity clear", Some(clear)));
            draw(&rctx, &mut target, frame.parity)
        };

        if let Err(e) = drawn {
            log::error!("frame rendering failed: {e:#}");
            return AppControl::Exit;
        }

        self.window.window.pre_present_notify();
        self.gpu.submit(frame);

        AppControl::Continue
    }
}
