//! Crate error taxonomy
//!
//! Most boundary violations in this crate are contractually silent (see the
//! bounds-clamping policy in `drawing` and the malformed-payload policy in
//! `wire`); errors exist only where a caller can meaningfully observe a
//! single failed operation.

use thiserror::Error;

use crate::geometry::Size;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A frame was larger than the surface it was delivered to
    #[error("frame size {frame_width}x{frame_height} exceeds renderer size {renderer_width}x{renderer_height}")]
    SizeViolation {
        frame_width: u32,
        frame_height: u32,
        renderer_width: u32,
        renderer_height: u32,
    },

    /// The frame pipeline has shut down and no longer accepts frames
    #[error("frame pipeline is closed")]
    PipelineClosed,

    /// A renderer implementation failed to deliver a frame
    #[error("renderer delivery failed: {0}")]
    Delivery(String),

    /// An event handler reported a failure; dispatch continues regardless
    #[error("event handler failed: {0}")]
    Handler(String),

    /// An outbound host message failed to serialize
    #[error("host message encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

impl EngineError {
    pub(crate) fn size_violation(frame: Size, renderer: Size) -> Self {
        Self::SizeViolation {
            frame_width: frame.width,
            frame_height: frame.height,
            renderer_width: renderer.width,
            renderer_height: renderer.height,
        }
    }
}
