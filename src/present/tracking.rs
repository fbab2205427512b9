//! In-memory presenter that records every native resource it pretends to
//! acquire. Used for headless runs and to verify that nothing leaks.

use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;

use super::Presenter;
use crate::buffer::FrameView;
use crate::error::{RenderError, Result};

/// The resources a native binding is made of, in acquisition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Memory device context compatible with the window.
    DeviceContext,
    /// Off-screen drawable backed by frame-sized pixel storage.
    Drawable,
    /// The drawable being selected into the device context.
    Selection,
}

impl ResourceKind {
    pub const ACQUISITION_ORDER: [ResourceKind; 3] = [
        ResourceKind::DeviceContext,
        ResourceKind::Drawable,
        ResourceKind::Selection,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
    Acquired(ResourceKind),
    Released(ResourceKind),
}

/// Where and at what size the most recent frame was presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresentedFrame {
    pub window: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Default)]
struct LedgerState {
    events: Vec<LedgerEvent>,
    frames_presented: usize,
    last_presented: Option<PresentedFrame>,
    last_frame: Vec<u32>,
}

/// Shared record of acquisitions, releases and presented frames. Clones share
/// the same record, so a test can keep one while the presenter owns another.
/// Frames are counted, not logged; only the latest one is kept.
#[derive(Debug, Clone, Default)]
pub struct ResourceLedger {
    state: Arc<Mutex<LedgerState>>,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LedgerEvent> {
        self.state.lock().events.clone()
    }

    /// Resources acquired and not yet released, oldest first.
    pub fn outstanding(&self) -> Vec<ResourceKind> {
        let state = self.state.lock();
        let mut live = Vec::new();
        for event in &state.events {
            match event {
                LedgerEvent::Acquired(kind) => live.push(*kind),
                LedgerEvent::Released(kind) => {
                    if let Some(pos) = live.iter().rposition(|k| k == kind) {
                        live.remove(pos);
                    }
                }
            }
        }
        live
    }

    pub fn acquired_count(&self) -> usize {
        self.count(|e| matches!(e, LedgerEvent::Acquired(_)))
    }

    pub fn released_count(&self) -> usize {
        self.count(|e| matches!(e, LedgerEvent::Released(_)))
    }

    pub fn frames_presented(&self) -> usize {
        self.state.lock().frames_presented
    }

    pub fn last_presented(&self) -> Option<PresentedFrame> {
        self.state.lock().last_presented
    }

    /// Pixels of the most recent presented frame.
    pub fn last_frame(&self) -> Vec<u32> {
        self.state.lock().last_frame.clone()
    }

    fn count(&self, predicate: impl Fn(&LedgerEvent) -> bool) -> usize {
        self.state.lock().events.iter().filter(|&e| predicate(e)).count()
    }

    fn record(&self, event: LedgerEvent) {
        self.state.lock().events.push(event);
    }

    fn acquire(&self, kind: ResourceKind) -> Handle {
        debug!("acquired {kind:?}");
        self.record(LedgerEvent::Acquired(kind));
        Handle {
            kind,
            ledger: self.clone(),
        }
    }

    fn store_frame(&self, window: u32, frame: FrameView<'_>) {
        let mut state = self.state.lock();
        state.frames_presented += 1;
        state.last_presented = Some(PresentedFrame {
            window,
            width: frame.width,
            height: frame.height,
        });
        state.last_frame.clear();
        state.last_frame.extend_from_slice(frame.pixels);
    }
}

/// A single tracked resource; releases itself when dropped.
#[derive(Debug)]
struct Handle {
    kind: ResourceKind,
    ledger: ResourceLedger,
}

impl Drop for Handle {
    fn drop(&mut self) {
        debug!("released {:?}", self.kind);
        self.ledger.record(LedgerEvent::Released(self.kind));
    }
}

/// All resources of one binding. Fields drop top to bottom, which is the
/// reverse of acquisition: the selection is undone before the drawable is
/// deleted, and the drawable before the device context.
#[derive(Debug)]
struct Binding {
    _selection: Handle,
    _drawable: Handle,
    _context: Handle,
    window: u32,
    width: u32,
    height: u32,
}

/// Stand-in for a host window. A closed window rejects binds and presents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackingWindow {
    pub id: u32,
    pub open: bool,
}

impl TrackingWindow {
    pub fn new(id: u32) -> Self {
        Self { id, open: true }
    }

    pub fn closed(id: u32) -> Self {
        Self { id, open: false }
    }
}

#[derive(Debug)]
pub struct TrackingPresenter {
    ledger: ResourceLedger,
    fail_at: Option<ResourceKind>,
    binding: Option<Binding>,
}

impl TrackingPresenter {
    pub fn new(ledger: ResourceLedger) -> Self {
        Self {
            ledger,
            fail_at: None,
            binding: None,
        }
    }

    /// A presenter whose bind fails when it reaches `kind`.
    pub fn failing_at(ledger: ResourceLedger, kind: ResourceKind) -> Self {
        Self {
            fail_at: Some(kind),
            ..Self::new(ledger)
        }
    }

    pub fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    fn acquire(&self, kind: ResourceKind) -> Result<Handle> {
        if self.fail_at == Some(kind) {
            return Err(RenderError::Surface(format!("could not create {kind:?}")));
        }
        Ok(self.ledger.acquire(kind))
    }
}

impl Presenter for TrackingPresenter {
    type Window = TrackingWindow;

    fn bind(&mut self, window: &TrackingWindow, width: u32, height: u32) -> Result<()> {
        if self.binding.is_some() {
            return Err(RenderError::invalid_state("bind a surface", "already bound"));
        }
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidGeometry { width, height });
        }
        if !window.open {
            return Err(RenderError::Surface(format!(
                "window {} is not open",
                window.id
            )));
        }

        let context = self.acquire(ResourceKind::DeviceContext)?;
        let drawable = self.acquire(ResourceKind::Drawable)?;
        let selection = self.acquire(ResourceKind::Selection)?;
        self.binding = Some(Binding {
            _selection: selection,
            _drawable: drawable,
            _context: context,
            window: window.id,
            width,
            height,
        });
        Ok(())
    }

    fn present(&mut self, window: &TrackingWindow, frame: FrameView<'_>) -> Result<()> {
        let binding = self
            .binding
            .as_ref()
            .ok_or_else(|| RenderError::invalid_state("present", "unbound"))?;
        if frame.size() != (binding.width, binding.height) {
            return Err(RenderError::FrameSizeMismatch {
                expected: (binding.width, binding.height),
                actual: frame.size(),
            });
        }
        if !window.open {
            return Err(RenderError::Present(format!(
                "window {} is not open",
                window.id
            )));
        }
        if window.id != binding.window {
            return Err(RenderError::Present(format!(
                "surface is bound to window {}, not {}",
                binding.window, window.id
            )));
        }
        self.ledger.store_frame(window.id, frame);
        Ok(())
    }

    fn unbind(&mut self) {
        self.binding = None;
    }

    fn is_bound(&self) -> bool {
        self.binding.is_some()
    }
}
