//! Presentation of the pixel plane onto a host window.
//!
//! A [`Presenter`] owns whatever native resources are needed to get a
//! [`FrameView`] onto the screen. Those resources are acquired together in
//! [`Presenter::bind`] and released together, in reverse order, in
//! [`Presenter::unbind`]. The pixel plane itself is only ever borrowed for the
//! duration of a single [`Presenter::present`] call.

pub mod native;
pub mod tracking;

pub use native::WgpuPresenter;
pub use tracking::{
    LedgerEvent, PresentedFrame, ResourceKind, ResourceLedger, TrackingPresenter, TrackingWindow,
};

use crate::buffer::FrameView;
use crate::error::Result;

pub trait Presenter {
    /// Host window type frames are presented onto.
    type Window: ?Sized;

    /// Acquires an off-screen drawable for `width` x `height` frames that is
    /// compatible with `window`. On failure nothing stays acquired.
    fn bind(&mut self, window: &Self::Window, width: u32, height: u32) -> Result<()>;

    /// Copies the whole frame onto the window's visible surface.
    fn present(&mut self, window: &Self::Window, frame: FrameView<'_>) -> Result<()>;

    /// Releases everything acquired by `bind`. No-op when not bound.
    fn unbind(&mut self);

    fn is_bound(&self) -> bool;
}
