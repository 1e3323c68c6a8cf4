//! Conway population simulation
//!
//! A sparse alive-set evaluated on a fixed cadence. The rule step is a pure
//! function over the current set; each tick wholesale-replaces the set (the
//! current generation stays consistent while the next one is computed) and
//! repaints the full board, since a generation can change non-locally.
//! Dragging pauses the loop through a condvar so a paused simulation burns
//! no CPU; drag-end resumes it with a broadcast.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::board::PixelBoard;
use crate::drawing::{DrawingEngine, StrokeHandle};
use crate::events::EventHub;
use crate::geometry::{Coordinate, Pixel, Size};
use crate::pipeline::FrameSender;

/// Default simulation cadence
pub const DEFAULT_TICK: Duration = Duration::from_millis(100);
/// Default universe boundary: cells live in `[0, 6000)` on both axes
pub const DEFAULT_BOUNDARY: Size = Size::new(6000, 6000);

/// Compute the next generation for `alive` under Conway's rule with an
/// 8-neighborhood, bounded by `[0, boundary)` on both axes.
///
/// Survivors are alive cells with 2 or 3 alive neighbors. Births are dead
/// neighbor cells seen by exactly 3 alive cells. The result is a fresh set;
/// the input is never mutated.
pub fn next_generation(alive: &HashSet<Coordinate>, boundary: Size) -> HashSet<Coordinate> {
    let mut candidates: HashMap<Coordinate, u32> = HashMap::new();
    let mut next = HashSet::new();

    for &cell in alive {
        let mut alive_neighbors = 0;
        for neighbor in neighbor_coordinates(cell, boundary) {
            if alive.contains(&neighbor) {
                alive_neighbors += 1;
            } else {
                *candidates.entry(neighbor).or_insert(0) += 1;
            }
        }

        if alive_neighbors == 2 || alive_neighbors == 3 {
            next.insert(cell);
        }
    }

    for (candidate, alive_neighbors) in candidates {
        if alive_neighbors == 3 {
            next.insert(candidate);
        }
    }

    next
}

fn neighbor_coordinates(c: Coordinate, boundary: Size) -> impl Iterator<Item = Coordinate> {
    (-1..=1)
        .flat_map(move |dy| (-1..=1).map(move |dx| c.offset(dx, dy)))
        .filter(move |&n| n != c && boundary.contains(n))
}

// ============================================================================
// Population
// ============================================================================

struct LoopState {
    paused: bool,
    shutdown: bool,
}

pub struct Population {
    alive: Mutex<HashSet<Coordinate>>,
    boundary: Size,
    board: Arc<Mutex<PixelBoard>>,
    frames: FrameSender,
    state: Mutex<LoopState>,
    wake: Condvar,
    generations: AtomicU64,
    alive_pixel: Pixel,
    dead_pixel: Pixel,
}

impl Population {
    pub fn new(
        board: Arc<Mutex<PixelBoard>>,
        frames: FrameSender,
        boundary: Size,
        alive_pixel: Pixel,
        dead_pixel: Pixel,
    ) -> Arc<Self> {
        Arc::new(Self {
            alive: Mutex::new(HashSet::new()),
            boundary,
            board,
            frames,
            state: Mutex::new(LoopState {
                paused: false,
                shutdown: false,
            }),
            wake: Condvar::new(),
            generations: AtomicU64::new(0),
            alive_pixel,
            dead_pixel,
        })
    }

    /// Insert a cell into the alive-set; outside the boundary it is
    /// silently ignored
    pub fn resurrect(&self, c: Coordinate) {
        if self.boundary.contains(c) {
            self.alive.lock().unwrap().insert(c);
        }
    }

    /// Bulk insertion, used by freehand drawing so a stroke seeds life
    /// without waiting for a tick
    pub fn resurrect_many(&self, coordinates: &[Coordinate]) {
        let mut alive = self.alive.lock().unwrap();
        for &c in coordinates {
            if self.boundary.contains(c) {
                alive.insert(c);
            }
        }
    }

    pub fn pause(&self) {
        self.state.lock().unwrap().paused = true;
    }

    pub fn resume(&self) {
        let mut state = self.state.lock().unwrap();
        state.paused = false;
        self.wake.notify_all();
    }

    pub fn is_paused(&self) -> bool {
        self.state.lock().unwrap().paused
    }

    /// Number of completed simulation ticks
    pub fn generations(&self) -> u64 {
        self.generations.load(Ordering::SeqCst)
    }

    /// Current alive cells (copy)
    pub fn alive_cells(&self) -> HashSet<Coordinate> {
        self.alive.lock().unwrap().clone()
    }

    /// Advance one generation, repaint the board, and submit a full frame
    pub fn step(&self) {
        let mut alive = self.alive.lock().unwrap();
        let next = next_generation(&alive, self.boundary);
        *alive = next;

        let frame = {
            let mut board = self.board.lock().unwrap();
            board.fill_with(|c| {
                if alive.contains(&c) {
                    self.alive_pixel
                } else {
                    self.dead_pixel
                }
            });
            board.full_frame()
        };
        drop(alive);

        self.generations.fetch_add(1, Ordering::SeqCst);
        if let Err(e) = self.frames.send(frame) {
            warn!("population frame dropped: {e}");
        }
    }

    /// Submit the current board as a full frame without stepping
    pub fn publish_board(&self) {
        let frame = self.board.lock().unwrap().full_frame();
        if let Err(e) = self.frames.send(frame) {
            warn!("population frame dropped: {e}");
        }
    }

    /// Rebuild the board wholesale for a new surface size. No-op resizes
    /// are ignored.
    pub fn resize_board(&self, size: Size) {
        let mut board = self.board.lock().unwrap();
        if board.size() == size {
            return;
        }
        board.reset(size);
    }

    /// Spawn the tick loop
    pub fn start(self: &Arc<Self>, cadence: Duration) -> LifeHandle {
        let population = Arc::clone(self);
        let join = thread::spawn(move || population.run(cadence));
        LifeHandle {
            population: Arc::clone(self),
            join: Some(join),
        }
    }

    fn run(&self, cadence: Duration) {
        debug!("population loop started, tick {:?}", cadence);
        let mut state = self.state.lock().unwrap();

        loop {
            // Block while paused; no polling
            while state.paused && !state.shutdown {
                state = self.wake.wait(state).unwrap();
            }
            if state.shutdown {
                break;
            }

            // Cadence wait. Spurious or resume wakeups restart the window
            // without evaluating a tick.
            let (guard, timeout) = self.wake.wait_timeout(state, cadence).unwrap();
            state = guard;
            if state.shutdown {
                break;
            }
            if state.paused || !timeout.timed_out() {
                continue;
            }

            drop(state);
            self.step();
            state = self.state.lock().unwrap();
        }

        debug!("population loop stopped");
    }
}

/// Owner handle for the population loop
pub struct LifeHandle {
    population: Arc<Population>,
    join: Option<thread::JoinHandle<()>>,
}

impl LifeHandle {
    pub fn shutdown(mut self) {
        {
            let mut state = self.population.state.lock().unwrap();
            state.shutdown = true;
            self.population.wake.notify_all();
        }
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

// ============================================================================
// Demo wiring
// ============================================================================

/// Construction parameters for the Life demo
pub struct LifeConfig {
    pub board_size: Size,
    pub boundary: Size,
    pub tick: Duration,
    pub idle_flush: Duration,
    pub stroke_capacity: usize,
    pub alive_pixel: Pixel,
    pub dead_pixel: Pixel,
    pub background: Pixel,
}

impl Default for LifeConfig {
    fn default() -> Self {
        Self {
            board_size: Size::new(800, 600),
            boundary: DEFAULT_BOUNDARY,
            tick: DEFAULT_TICK,
            idle_flush: crate::drawing::DEFAULT_IDLE_FLUSH,
            stroke_capacity: crate::drawing::DEFAULT_STROKE_CAPACITY,
            alive_pixel: Pixel::WHITE,
            dead_pixel: Pixel::BLACK,
            background: Pixel::BLACK,
        }
    }
}

/// The Game of Life demo: population loop + drawing loop wired to the hub.
///
/// Drag pauses the simulation and feeds line segments to the rasterizer;
/// the drawn coordinates resurrect cells directly. Drag-end resumes the
/// simulation. Click commits a single point. Resize rebuilds the board.
pub struct LifeGame {
    population: Arc<Population>,
    life_handle: LifeHandle,
    stroke_handle: StrokeHandle,
}

impl LifeGame {
    pub fn start(frames: FrameSender, hub: &EventHub, config: LifeConfig) -> Self {
        let board = Arc::new(Mutex::new(PixelBoard::new(
            config.board_size,
            config.background,
        )));

        let population = Population::new(
            Arc::clone(&board),
            frames.clone(),
            config.boundary,
            config.alive_pixel,
            config.dead_pixel,
        );
        population.publish_board();

        let engine = DrawingEngine::new(board, frames, config.alive_pixel);
        let seed_target = Arc::clone(&population);
        let (stroke, stroke_handle) = engine.start(
            config.idle_flush,
            config.stroke_capacity,
            Box::new(move |drawn| seed_target.resurrect_many(drawn)),
        );

        let on_resize = Arc::clone(&population);
        hub.on_resize(move |size| {
            on_resize.resize_board(size);
            Ok(())
        });

        let on_drag = Arc::clone(&population);
        let drag_stroke = stroke.clone();
        hub.on_mouse_drag(move |c| {
            on_drag.pause();
            drag_stroke.drag(c)
        });

        let on_drag_end = Arc::clone(&population);
        let end_stroke = stroke.clone();
        hub.on_mouse_drag_end(move |_| {
            end_stroke.end_stroke()?;
            on_drag_end.resume();
            Ok(())
        });

        let click_stroke = stroke;
        hub.on_mouse_click(move |c| click_stroke.click(c));

        let life_handle = population.start(config.tick);

        Self {
            population,
            life_handle,
            stroke_handle,
        }
    }

    pub fn population(&self) -> &Arc<Population> {
        &self.population
    }

    /// Stop the population loop. The stroke loop is owned by the hub's
    /// handler closures and ends when the hub is dropped.
    pub fn shutdown(self) {
        self.life_handle.shutdown();
        drop(self.stroke_handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::geometry::Frame;
    use crate::pipeline::{FramePipeline, Renderer, DEFAULT_CADENCE};

    fn cells(coords: &[(i32, i32)]) -> HashSet<Coordinate> {
        coords.iter().map(|&(x, y)| Coordinate::new(x, y)).collect()
    }

    #[test]
    fn test_blinker_oscillates_with_period_two() {
        let boundary = Size::new(5, 5);
        let horizontal = cells(&[(1, 2), (2, 2), (3, 2)]);
        let vertical = next_generation(&horizontal, boundary);
        assert_eq!(vertical, cells(&[(2, 1), (2, 2), (2, 3)]));
        assert_eq!(next_generation(&vertical, boundary), horizontal);
    }

    #[test]
    fn test_underpopulation_dies() {
        let boundary = Size::new(10, 10);
        // Lone cell: zero neighbors
        assert!(next_generation(&cells(&[(4, 4)]), boundary).is_empty());
        // Pair: one neighbor each
        assert!(next_generation(&cells(&[(4, 4), (5, 4)]), boundary).is_empty());
    }

    #[test]
    fn test_overpopulation_dies() {
        let boundary = Size::new(10, 10);
        // Center cell with 4 neighbors dies; use a plus shape
        let plus = cells(&[(4, 4), (3, 4), (5, 4), (4, 3), (4, 5)]);
        let next = next_generation(&plus, boundary);
        assert!(!next.contains(&Coordinate::new(4, 4)));
    }

    #[test]
    fn test_survival_with_two_or_three_neighbors() {
        let boundary = Size::new(10, 10);
        // Block is a still life: every cell has exactly 3 neighbors
        let block = cells(&[(2, 2), (3, 2), (2, 3), (3, 3)]);
        assert_eq!(next_generation(&block, boundary), block);
    }

    #[test]
    fn test_birth_requires_exactly_three_neighbors() {
        let boundary = Size::new(10, 10);
        let l_shape = cells(&[(2, 2), (3, 2), (2, 3)]);
        let next = next_generation(&l_shape, boundary);
        // (3,3) sees all three cells and is born; it completes a block
        assert!(next.contains(&Coordinate::new(3, 3)));
        assert_eq!(next, cells(&[(2, 2), (3, 2), (2, 3), (3, 3)]));
    }

    #[test]
    fn test_boundary_clips_neighbors() {
        // A blinker pressed against x = 0 cannot oscillate out of bounds
        let boundary = Size::new(3, 3);
        let column = cells(&[(0, 0), (0, 1), (0, 2)]);
        let next = next_generation(&column, boundary);
        assert!(next.iter().all(|c| boundary.contains(*c)));
    }

    struct NullRenderer(Size);

    impl Renderer for NullRenderer {
        fn size(&self) -> Size {
            self.0
        }
        fn draw_frame(&mut self, _frame: &Frame) -> Result<(), EngineError> {
            Ok(())
        }
        fn draw_frame_partly(
            &mut self,
            _frame: &Frame,
            _origin: Coordinate,
        ) -> Result<(), EngineError> {
            Ok(())
        }
    }

    fn population(
        board_size: Size,
        boundary: Size,
    ) -> (Arc<Population>, Arc<Mutex<PixelBoard>>, crate::pipeline::PipelineHandle) {
        let board = Arc::new(Mutex::new(PixelBoard::new(board_size, Pixel::BLACK)));
        let (frames, handle) =
            FramePipeline::start(Box::new(NullRenderer(board_size)), DEFAULT_CADENCE, 64);
        let population = Population::new(
            Arc::clone(&board),
            frames,
            boundary,
            Pixel::WHITE,
            Pixel::BLACK,
        );
        (population, board, handle)
    }

    #[test]
    fn test_resurrect_respects_boundary() {
        let (population, _board, _pipeline) = population(Size::new(8, 8), Size::new(8, 8));
        population.resurrect(Coordinate::new(3, 3));
        population.resurrect(Coordinate::new(8, 0)); // outside, ignored
        population.resurrect(Coordinate::new(-1, 2)); // outside, ignored
        population.resurrect_many(&[Coordinate::new(1, 1), Coordinate::new(9, 9)]);
        assert_eq!(
            population.alive_cells(),
            cells(&[(3, 3), (1, 1)])
        );
    }

    #[test]
    fn test_step_repaints_board_from_alive_set() {
        let (population, board, _pipeline) = population(Size::new(5, 5), Size::new(5, 5));
        population.resurrect_many(&[
            Coordinate::new(1, 2),
            Coordinate::new(2, 2),
            Coordinate::new(3, 2),
        ]);
        population.step();

        let board = board.lock().unwrap();
        // Blinker flipped to vertical; board shows the new generation
        assert_eq!(board.get(Coordinate::new(2, 1)), Some(Pixel::WHITE));
        assert_eq!(board.get(Coordinate::new(2, 2)), Some(Pixel::WHITE));
        assert_eq!(board.get(Coordinate::new(2, 3)), Some(Pixel::WHITE));
        assert_eq!(board.get(Coordinate::new(1, 2)), Some(Pixel::BLACK));
    }

    #[test]
    fn test_pause_blocks_ticks_and_resume_continues() {
        let (population, _board, _pipeline) = population(Size::new(5, 5), Size::new(5, 5));
        population.resurrect_many(&[
            Coordinate::new(1, 2),
            Coordinate::new(2, 2),
            Coordinate::new(3, 2),
        ]);

        let handle = population.start(Duration::from_millis(10));
        thread::sleep(Duration::from_millis(100));
        assert!(population.generations() > 0);

        population.pause();
        // Allow any in-flight tick to finish before sampling
        thread::sleep(Duration::from_millis(30));
        let frozen = population.generations();
        thread::sleep(Duration::from_millis(100));
        assert_eq!(population.generations(), frozen, "ticks observed while paused");

        population.resume();
        thread::sleep(Duration::from_millis(100));
        assert!(population.generations() > frozen, "no ticks after resume");

        handle.shutdown();
    }

    #[test]
    fn test_resize_board_ignores_noop() {
        let (population, board, _pipeline) = population(Size::new(5, 5), Size::new(8, 8));
        {
            board.lock().unwrap().set(Coordinate::new(1, 1), Pixel::WHITE);
        }
        // Same size: content preserved
        population.resize_board(Size::new(5, 5));
        assert_eq!(
            board.lock().unwrap().get(Coordinate::new(1, 1)),
            Some(Pixel::WHITE)
        );
        // New size: rebuilt
        population.resize_board(Size::new(6, 6));
        assert_eq!(board.lock().unwrap().size(), Size::new(6, 6));
        assert_eq!(
            board.lock().unwrap().get(Coordinate::new(1, 1)),
            Some(Pixel::BLACK)
        );
    }
}
