//! Drawing engine: pointer gestures to rasterized board patches
//!
//! Translates drag/click input into pixel changes on the shared board and
//! emits minimal partial frames. A line draw touches only its bounding box;
//! a point draw is the degenerate 1x1 case. The stroke loop is the single
//! dedicated consumer that owns blocking work, with a coalescing idle timer
//! that flushes the last dragged coordinate as a standalone point so a
//! touch that never moves still becomes visible.

use std::sync::mpsc::{self, RecvTimeoutError, SyncSender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::board::PixelBoard;
use crate::error::EngineError;
use crate::geometry::{Coordinate, Frame, Pixel, Size};
use crate::pipeline::FrameSender;

/// Idle window after which a pending drag coordinate is committed as a point
pub const DEFAULT_IDLE_FLUSH: Duration = Duration::from_millis(20);
/// Default bounded stroke queue depth
pub const DEFAULT_STROKE_CAPACITY: usize = 100;

/// Callback receiving the in-bounds coordinates a gesture actually drew,
/// in draw order. The Life demo feeds these to `Population::resurrect_many`.
pub type DrawnSink = Box<dyn Fn(&[Coordinate]) + Send>;

enum StrokeMessage {
    Drag(Coordinate),
    Click(Coordinate),
    End,
}

pub struct DrawingEngine {
    board: Arc<Mutex<PixelBoard>>,
    frames: FrameSender,
    ink: Pixel,
}

impl DrawingEngine {
    pub fn new(board: Arc<Mutex<PixelBoard>>, frames: FrameSender, ink: Pixel) -> Self {
        Self { board, frames, ink }
    }

    /// Rasterize a line from `start` to `end` (inclusive) with integer
    /// Bresenham. Every in-bounds point is written to the shared board and
    /// to a patch sized to the line's bounding box, which is enqueued for
    /// delivery. Out-of-bounds points are skipped silently.
    ///
    /// Returns the ordered in-bounds coordinates actually drawn.
    pub fn draw_line(&self, start: Coordinate, end: Coordinate) -> Vec<Coordinate> {
        let diff_x = (start.x - end.x).abs();
        let diff_y = (start.y - end.y).abs();
        let min = Coordinate::new(start.x.min(end.x), start.y.min(end.y));
        let patch_size = Size::new(diff_x as u32 + 1, diff_y as u32 + 1);

        let mut drawn = Vec::with_capacity(diff_x.max(diff_y) as usize + 1);

        let mut board = self.board.lock().unwrap();
        // Seed the patch from current board content so untouched pixels of
        // the bounding box repaint what is already there
        let mut patch = board.sub_frame(min, patch_size);

        let step_x = if start.x > end.x { -1 } else { 1 };
        let step_y = if start.y > end.y { -1 } else { 1 };
        let mut err = diff_x - diff_y;
        let (mut x, mut y) = (start.x, start.y);

        loop {
            patch.set((x - min.x) as u32, (y - min.y) as u32, self.ink);

            let c = Coordinate::new(x, y);
            if board.contains(c) {
                board.set(c, self.ink);
                drawn.push(c);
            }

            if x == end.x && y == end.y {
                break;
            }

            let err2 = 2 * err;
            if err2 > -diff_y {
                err -= diff_y;
                x += step_x;
            }
            if err2 < diff_x {
                err += diff_x;
                y += step_y;
            }
        }
        drop(board);

        if let Err(e) = self.frames.send(patch.with_origin(min)) {
            warn!("line patch dropped: {e}");
        }

        drawn
    }

    /// Draw a single cell and enqueue a 1x1 patch. Out-of-bounds points
    /// are ignored without error.
    pub fn draw_point(&self, c: Coordinate) {
        {
            let mut board = self.board.lock().unwrap();
            if !board.contains(c) {
                return;
            }
            board.set(c, self.ink);
        }

        let patch = Frame::filled(Size::new(1, 1), self.ink).with_origin(c);
        if let Err(e) = self.frames.send(patch) {
            warn!("point patch dropped: {e}");
        }
    }

    /// Spawn the stroke consumer loop. `on_drawn` receives the coordinates
    /// each committed gesture drew. The loop ends when every `StrokeInput`
    /// clone has been dropped.
    pub fn start(
        self,
        idle_flush: Duration,
        capacity: usize,
        on_drawn: DrawnSink,
    ) -> (StrokeInput, StrokeHandle) {
        let (tx, rx) = mpsc::sync_channel(capacity);

        let join = thread::spawn(move || {
            debug!("stroke loop started");
            let mut prev: Option<Coordinate> = None;

            loop {
                match rx.recv_timeout(idle_flush) {
                    Ok(StrokeMessage::Drag(c)) => {
                        if let Some(p) = prev {
                            let drawn = self.draw_line(p, c);
                            on_drawn(&drawn);
                        }
                        prev = Some(c);
                    }
                    Ok(StrokeMessage::Click(c)) => {
                        self.draw_point(c);
                        on_drawn(&[c]);
                    }
                    Ok(StrokeMessage::End) => {
                        prev = None;
                    }
                    Err(RecvTimeoutError::Timeout) => {
                        // Idle: commit the stroke's last coordinate as a point
                        if let Some(p) = prev.take() {
                            self.draw_point(p);
                            on_drawn(&[p]);
                        }
                    }
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            debug!("stroke loop stopped");
        });

        (StrokeInput { tx }, StrokeHandle { join })
    }
}

/// Cloneable producer side of the stroke queue. Sends block under
/// backpressure rather than dropping gestures.
#[derive(Clone)]
pub struct StrokeInput {
    tx: SyncSender<StrokeMessage>,
}

impl StrokeInput {
    pub fn drag(&self, c: Coordinate) -> Result<(), EngineError> {
        self.tx
            .send(StrokeMessage::Drag(c))
            .map_err(|_| EngineError::PipelineClosed)
    }

    pub fn click(&self, c: Coordinate) -> Result<(), EngineError> {
        self.tx
            .send(StrokeMessage::Click(c))
            .map_err(|_| EngineError::PipelineClosed)
    }

    /// Mark the end of a drag gesture so the next drag starts a new line
    pub fn end_stroke(&self) -> Result<(), EngineError> {
        self.tx
            .send(StrokeMessage::End)
            .map_err(|_| EngineError::PipelineClosed)
    }
}

pub struct StrokeHandle {
    join: thread::JoinHandle<()>,
}

impl StrokeHandle {
    /// Wait for the loop to exit; call after dropping all `StrokeInput`s
    pub fn join(self) {
        let _ = self.join.join();
    }
}
