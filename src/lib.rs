//! Foundation layer for a software rasterizer.
//!
//! The crate provides homogeneous vector/matrix math and a frame buffer whose
//! lifecycle (allocate, clear, present, release) is driven by a [`Renderer`].
//! Presentation goes through the [`Presenter`] trait so the same renderer can
//! target a real window ([`WgpuPresenter`]) or an in-memory double
//! ([`TrackingPresenter`]). No rasterization happens here; a drawing stage
//! writes into the frame buffer between [`Renderer::clear`] and
//! [`Renderer::present`].

pub mod buffer;
pub mod color;
pub mod config;
pub mod error;
pub mod math;
pub mod present;
pub mod renderer;
pub mod vertex;

pub use buffer::{FrameBuffer, FrameView, CLEAR_DEPTH};
pub use color::{pack_rgb, pack_unit_rgb, parse_hex_color, unpack_rgb, DEFAULT_BACKGROUND};
pub use config::RendererConfig;
pub use error::{RenderError, Result};
pub use math::{cross, dot, mul, normalize, transform, Matrix, Vector4};
pub use present::{
    LedgerEvent, PresentedFrame, Presenter, ResourceKind, ResourceLedger, TrackingPresenter,
    TrackingWindow, WgpuPresenter,
};
pub use renderer::{Renderer, RendererState};
pub use vertex::{Vertex, CUBE_VERTICES};
