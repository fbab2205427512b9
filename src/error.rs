use thiserror::Error;

/// Failures reported by the buffer, presenter and renderer layers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("invalid frame size {width}x{height}; both dimensions must be positive")]
    InvalidGeometry { width: u32, height: u32 },

    #[error("frame is {actual:?} but the surface was bound for {expected:?}")]
    FrameSizeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("cannot allocate {width}x{height} frame buffer: {reason}")]
    Allocation {
        width: u32,
        height: u32,
        reason: String,
    },

    #[error("failed to acquire presentation surface: {0}")]
    Surface(String),

    #[error("failed to present frame: {0}")]
    Present(String),

    #[error("cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },
}

impl RenderError {
    pub(crate) fn invalid_state(operation: &'static str, state: &'static str) -> Self {
        Self::InvalidState { operation, state }
    }

    /// True for errors that only affect the current frame.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Present(_))
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;
