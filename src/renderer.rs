use log::{debug, error, info, warn};

use crate::buffer::FrameBuffer;
use crate::config::RendererConfig;
use crate::error::{RenderError, Result};
use crate::present::Presenter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererState {
    Uninitialized,
    Ready,
    ShutDown,
}

impl RendererState {
    fn describe(self) -> &'static str {
        match self {
            RendererState::Uninitialized => "uninitialized",
            RendererState::Ready => "ready",
            RendererState::ShutDown => "shut down",
        }
    }
}

/// Owns the frame buffer and the presenter and drives them through
/// init, per-frame clear and present, and shutdown.
pub struct Renderer<P: Presenter> {
    presenter: P,
    buffer: FrameBuffer,
    state: RendererState,
}

impl<P: Presenter> Renderer<P> {
    pub fn new(presenter: P) -> Self {
        Self::with_config(&RendererConfig::default(), presenter)
    }

    /// Takes the background from `config`; sizes are given to [`Renderer::init`].
    pub fn with_config(config: &RendererConfig, presenter: P) -> Self {
        Self {
            presenter,
            buffer: FrameBuffer::new(config.background),
            state: RendererState::Uninitialized,
        }
    }

    pub fn state(&self) -> RendererState {
        self.state
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Read-only; buffer size and lifetime belong to [`Renderer::init`] and
    /// [`Renderer::shutdown`].
    ///
    /// ```compile_fail
    /// # use softrender::{Renderer, ResourceLedger, TrackingPresenter};
    /// let mut renderer = Renderer::new(TrackingPresenter::new(ResourceLedger::new()));
    /// renderer.frame_buffer().release();
    /// ```
    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.buffer
    }

    /// Pixel plane for a drawing stage between [`Renderer::clear`] and
    /// [`Renderer::present`]. `None` unless ready.
    pub fn pixels_mut(&mut self) -> Option<&mut [u32]> {
        self.buffer.pixels_mut()
    }

    /// Depth plane, same rules as [`Renderer::pixels_mut`].
    pub fn depth_mut(&mut self) -> Option<&mut [f32]> {
        self.buffer.depth_mut()
    }

    pub fn set_background(&mut self, color: u32) {
        self.buffer.set_background(color);
    }

    /// Allocates cleared buffers and binds the presenter to `window`.
    /// On failure everything acquired so far is released again.
    pub fn init(&mut self, width: u32, height: u32, window: &P::Window) -> Result<()> {
        self.expect_state("initialize", RendererState::Uninitialized)?;

        // Freshly allocated planes are already cleared.
        self.buffer.allocate(width, height)?;
        if let Err(err) = self.presenter.bind(window, width, height) {
            self.buffer.release();
            return Err(err);
        }

        self.state = RendererState::Ready;
        info!("renderer ready at {width}x{height}");
        Ok(())
    }

    /// One frame: clear both planes, then present.
    pub fn update(&mut self, window: &P::Window) -> Result<()> {
        self.clear()?;
        self.present(window)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.expect_state("clear", RendererState::Ready)?;
        self.buffer.clear()
    }

    /// Presents the pixel plane as it is. A failed present leaves the buffers
    /// untouched for the next attempt.
    pub fn present(&mut self, window: &P::Window) -> Result<()> {
        self.expect_state("present", RendererState::Ready)?;
        let frame = self
            .buffer
            .view()
            .ok_or_else(|| RenderError::invalid_state("present", "unallocated"))?;
        self.presenter.present(window, frame).inspect_err(|err| {
            if err.is_recoverable() {
                warn!("frame dropped: {err}");
            }
        })
    }

    /// Unbinds the presenter and releases the buffers. Idempotent.
    pub fn shutdown(&mut self) {
        if self.state == RendererState::ShutDown {
            return;
        }
        self.presenter.unbind();
        self.buffer.release();
        if self.state == RendererState::Ready {
            info!("renderer shut down");
        } else {
            debug!("renderer shut down before init");
        }
        self.state = RendererState::ShutDown;
    }

    fn expect_state(&self, operation: &'static str, expected: RendererState) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(RenderError::invalid_state(operation, self.state.describe()))
        }
    }
}

impl<P: Presenter> Drop for Renderer<P> {
    fn drop(&mut self) {
        if self.state == RendererState::Ready {
            debug!("renderer dropped while ready; shutting down");
            self.shutdown();
            if self.presenter.is_bound() {
                error!("presenter still bound after shutdown");
            }
        }
    }
}
