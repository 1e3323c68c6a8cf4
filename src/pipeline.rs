//! Frame pipeline: bounded producer/consumer queue with paced delivery
//!
//! Decouples "a frame was produced" from "a frame reaches the renderer".
//! Producers block when the queue is full (backpressure, never drops); the
//! delivery loop hands at most one frame to the renderer per cadence
//! window, and each delivery restarts the window. A failed delivery is
//! logged and forgotten — the pipeline is best-effort for the current
//! frame only.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TryRecvError};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::EngineError;
use crate::geometry::{Coordinate, Frame, Size};

/// Default pacing window (~60 deliveries per second)
pub const DEFAULT_CADENCE: Duration = Duration::from_millis(16);
/// Default bounded queue depth
pub const DEFAULT_CAPACITY: usize = 100;

/// Renderer capability consumed by the pipeline and implemented by the
/// worker/canvas transport outside this crate.
pub trait Renderer: Send {
    /// Current size of the render surface
    fn size(&self) -> Size;

    /// Full-surface repaint
    fn draw_frame(&mut self, frame: &Frame) -> Result<(), EngineError>;

    /// Partial update applied at `origin`. Implementations must fail when
    /// the patch does not fit the surface.
    fn draw_frame_partly(&mut self, frame: &Frame, origin: Coordinate) -> Result<(), EngineError>;
}

/// Cloneable producer handle. `send` blocks while the queue is full;
/// producers that cannot tolerate blocking must send from their own thread.
#[derive(Clone)]
pub struct FrameSender {
    tx: SyncSender<Frame>,
}

impl FrameSender {
    pub fn send(&self, frame: Frame) -> Result<(), EngineError> {
        self.tx.send(frame).map_err(|_| EngineError::PipelineClosed)
    }
}

/// Owner handle for the delivery loop. Dropping it stops the loop;
/// `shutdown` stops it and joins the thread.
pub struct PipelineHandle {
    stop_tx: mpsc::Sender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl PipelineHandle {
    pub fn shutdown(mut self) {
        let _ = self.stop_tx.send(());
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

pub struct FramePipeline;

impl FramePipeline {
    /// Spawn the delivery loop against `renderer` and return the producer
    /// handle plus the loop owner handle.
    pub fn start(
        renderer: Box<dyn Renderer>,
        cadence: Duration,
        capacity: usize,
    ) -> (FrameSender, PipelineHandle) {
        let (frame_tx, frame_rx) = mpsc::sync_channel(capacity);
        let (stop_tx, stop_rx) = mpsc::channel();

        let join = thread::spawn(move || {
            delivery_loop(renderer, &frame_rx, &stop_rx, cadence);
        });

        (
            FrameSender { tx: frame_tx },
            PipelineHandle {
                stop_tx,
                join: Some(join),
            },
        )
    }
}

fn delivery_loop(
    mut renderer: Box<dyn Renderer>,
    frames: &Receiver<Frame>,
    stop: &Receiver<()>,
    cadence: Duration,
) {
    debug!("frame pipeline started, cadence {:?}", cadence);

    loop {
        // Pacing window; shutdown signal (or a dropped handle) ends the loop
        match stop.recv_timeout(cadence) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }

        match frames.try_recv() {
            Ok(frame) => {
                if let Err(e) = deliver(renderer.as_mut(), &frame) {
                    warn!("frame delivery failed: {e}");
                }
            }
            // Idle tick: nothing queued this window
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => break,
        }
    }

    debug!("frame pipeline stopped");
}

/// Hand one frame to the renderer, validating that it fits the surface.
/// Patches go through `draw_frame_partly`, full frames through `draw_frame`.
pub(crate) fn deliver(renderer: &mut dyn Renderer, frame: &Frame) -> Result<(), EngineError> {
    let surface = renderer.size();
    if !surface.equal_or_greater(frame.size()) {
        return Err(EngineError::size_violation(frame.size(), surface));
    }

    match frame.origin() {
        Some(origin) => renderer.draw_frame_partly(frame, origin),
        None => renderer.draw_frame(frame),
    }
}
