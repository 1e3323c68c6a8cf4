//! Snake state machine
//!
//! A 17x17 cell board with a one-cell wall border, advanced on a cadence
//! that shortens as food is eaten. The body moves follow-the-leader: the
//! head advances one cell per tick and every trailing segment takes its
//! predecessor's place. Growth is delayed: eating records the post-move
//! tail position, and the next tick appends it back as a new segment.
//! Collisions are judged against the board as it stood before the move,
//! so the cell a growing tail refuses to vacate still kills.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::events::{EventHub, Key, SwipeDirection};
use crate::geometry::{Coordinate, Frame, Pixel, Size};
use crate::pipeline::FrameSender;
use crate::util::Rng;

/// Board edge length in cells, wall border included
pub const BOARD_CELLS: u32 = 17;
/// Cadence after a spawn or reset
pub const INITIAL_INTERVAL: Duration = Duration::from_millis(200);
/// Fastest allowed cadence
pub const MINIMUM_INTERVAL: Duration = Duration::from_millis(100);
/// Cadence reduction per food eaten
pub const SPEEDUP_STEP: Duration = Duration::from_millis(5);

const SPAWN: Coordinate = Coordinate::new(1, 1);

pub const EMPTY_PIXEL: Pixel = Pixel::BLACK;
pub const WALL_PIXEL: Pixel = Pixel::rgba(128, 128, 128, 255);
pub const HEAD_PIXEL: Pixel = Pixel::rgba(0, 240, 120, 255);
pub const TAIL_PIXEL: Pixel = Pixel::rgba(0, 180, 80, 255);
pub const FOOD_PIXEL: Pixel = Pixel::rgba(220, 40, 40, 255);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heading {
    Up,
    Down,
    Left,
    Right,
}

impl Heading {
    fn delta(self) -> (i32, i32) {
        match self {
            Heading::Up => (0, -1),
            Heading::Down => (0, 1),
            Heading::Left => (-1, 0),
            Heading::Right => (1, 0),
        }
    }

    fn is_opposite(self, other: Heading) -> bool {
        matches!(
            (self, other),
            (Heading::Up, Heading::Down)
                | (Heading::Down, Heading::Up)
                | (Heading::Left, Heading::Right)
                | (Heading::Right, Heading::Left)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    Empty,
    Wall,
    SnakeHead,
    SnakeTail,
    Food,
}

impl Cell {
    fn pixel(self) -> Pixel {
        match self {
            Cell::Empty => EMPTY_PIXEL,
            Cell::Wall => WALL_PIXEL,
            Cell::SnakeHead => HEAD_PIXEL,
            Cell::SnakeTail => TAIL_PIXEL,
            Cell::Food => FOOD_PIXEL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Alive,
    /// Collision happened; the next processed tick performs the full reset
    DeadResetting,
}

struct SnakeState {
    /// Cell grid rebuilt from the segments after every move; between moves
    /// it serves as the previous-snapshot collision reference
    board: Vec<Cell>,
    segments: VecDeque<Coordinate>, // head at the front
    heading: Heading,
    delayed_tail: Option<Coordinate>,
    food: Option<Coordinate>,
    interval: Duration,
    score: u32,
    run_state: RunState,
    rng: Rng,
}

impl SnakeState {
    fn new(seed: u64) -> Self {
        let mut state = Self {
            board: Vec::new(),
            segments: VecDeque::new(),
            heading: Heading::Down,
            delayed_tail: None,
            food: None,
            interval: INITIAL_INTERVAL,
            score: 0,
            run_state: RunState::Alive,
            rng: Rng::new(seed),
        };
        state.reset();
        state
    }

    fn reset(&mut self) {
        self.segments = VecDeque::from([SPAWN]);
        self.heading = Heading::Down;
        self.delayed_tail = None;
        self.food = None;
        self.interval = INITIAL_INTERVAL;
        self.score = 0;
        self.run_state = RunState::Alive;
        self.drop_food();
        self.rebuild_board();
    }

    fn cell(&self, c: Coordinate) -> Cell {
        self.board[(c.y * BOARD_CELLS as i32 + c.x) as usize]
    }

    fn set_cell(&mut self, c: Coordinate, cell: Cell) {
        self.board[(c.y * BOARD_CELLS as i32 + c.x) as usize] = cell;
    }

    /// Place food at a random cell that is neither wall nor snake
    fn drop_food(&mut self) {
        let n = BOARD_CELLS as i32;
        let free: Vec<Coordinate> = (1..n - 1)
            .flat_map(|y| (1..n - 1).map(move |x| Coordinate::new(x, y)))
            .filter(|c| !self.segments.contains(c))
            .collect();
        if free.is_empty() {
            self.food = None;
            return;
        }
        self.food = Some(free[self.rng.index(free.len())]);
    }

    /// Repaint the grid wholesale from walls, food, and segments
    fn rebuild_board(&mut self) {
        let n = BOARD_CELLS as i32;
        self.board = (0..n * n)
            .map(|i| {
                let (x, y) = (i % n, i / n);
                if x == 0 || y == 0 || x == n - 1 || y == n - 1 {
                    Cell::Wall
                } else {
                    Cell::Empty
                }
            })
            .collect();

        if let Some(food) = self.food {
            self.set_cell(food, Cell::Food);
        }
        for i in 0..self.segments.len() {
            let c = self.segments[i];
            self.set_cell(c, if i == 0 { Cell::SnakeHead } else { Cell::SnakeTail });
        }
    }

    /// Advance one tick. A dead snake resets instead of moving.
    fn advance(&mut self) {
        if self.run_state == RunState::DeadResetting {
            self.reset();
            return;
        }

        // Follow-the-leader move: the head advances, everything else takes
        // its predecessor's place (push front / pop back keeps the length)
        let head = *self.segments.front().unwrap();
        let (dx, dy) = self.heading.delta();
        let new_head = head.offset(dx, dy);
        self.segments.push_front(new_head);
        self.segments.pop_back();

        // Growth recorded at the last food lands now: the stored position
        // is exactly the cell this move just vacated
        if let Some(tail) = self.delayed_tail.take() {
            self.segments.push_back(tail);
        }

        // Collision against the board as it stood before this move
        match self.cell(new_head) {
            Cell::Wall | Cell::SnakeTail => {
                self.run_state = RunState::DeadResetting;
                return;
            }
            Cell::Food => {
                self.score += 1;
                self.interval = next_interval(self.interval);
                self.delayed_tail = Some(*self.segments.back().unwrap());
                self.drop_food();
            }
            _ => {}
        }

        self.rebuild_board();
    }

    /// Nearest-neighbor upscale of the cell board to a pixel frame
    fn to_frame(&self, size: Size) -> Frame {
        let mut frame = Frame::filled(size, EMPTY_PIXEL);
        for y in 0..size.height {
            let board_y = (u64::from(y) * u64::from(BOARD_CELLS) / u64::from(size.height)) as i32;
            for x in 0..size.width {
                let board_x =
                    (u64::from(x) * u64::from(BOARD_CELLS) / u64::from(size.width)) as i32;
                frame.set(x, y, self.cell(Coordinate::new(board_x, board_y)).pixel());
            }
        }
        frame
    }
}

/// Shorten the tick interval by one step, floored at the minimum
fn next_interval(current: Duration) -> Duration {
    if current <= MINIMUM_INTERVAL + SPEEDUP_STEP {
        MINIMUM_INTERVAL
    } else {
        current - SPEEDUP_STEP
    }
}

// ============================================================================
// SnakeGame
// ============================================================================

pub struct SnakeGame {
    state: Mutex<SnakeState>,
    frames: FrameSender,
    frame_size: Size,
    stop: Mutex<bool>,
    stop_wake: Condvar,
}

impl SnakeGame {
    pub fn new(frames: FrameSender, frame_size: Size, seed: u64) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(SnakeState::new(seed)),
            frames,
            frame_size,
            stop: Mutex::new(false),
            stop_wake: Condvar::new(),
        })
    }

    /// Request a heading change. A reversal of the current heading is
    /// rejected; the snake cannot fold back onto its own neck.
    pub fn set_heading(&self, heading: Heading) {
        let mut state = self.state.lock().unwrap();
        if !heading.is_opposite(state.heading) {
            state.heading = heading;
        }
    }

    pub fn score(&self) -> u32 {
        self.state.lock().unwrap().score
    }

    pub fn interval(&self) -> Duration {
        self.state.lock().unwrap().interval
    }

    pub fn length(&self) -> usize {
        self.state.lock().unwrap().segments.len()
    }

    /// Advance one tick and publish the resulting board as a full frame
    pub fn tick(&self) {
        let frame = {
            let mut state = self.state.lock().unwrap();
            state.advance();
            state.to_frame(self.frame_size)
        };
        if let Err(e) = self.frames.send(frame) {
            warn!("snake frame dropped: {e}");
        }
    }

    /// Publish the current board without advancing
    pub fn publish_board(&self) {
        let frame = self.state.lock().unwrap().to_frame(self.frame_size);
        if let Err(e) = self.frames.send(frame) {
            warn!("snake frame dropped: {e}");
        }
    }

    /// Map keyboard and swipe input onto heading changes
    pub fn register_input(self: &Arc<Self>, hub: &EventHub) {
        let on_key = Arc::clone(self);
        hub.on_key_down(move |key| {
            let heading = match key {
                Key::W => Heading::Up,
                Key::A => Heading::Left,
                Key::S => Heading::Down,
                Key::D => Heading::Right,
                Key::P | Key::R => return Ok(()),
            };
            on_key.set_heading(heading);
            Ok(())
        });

        let on_swipe = Arc::clone(self);
        hub.on_swipe(move |direction| {
            let heading = match direction {
                SwipeDirection::Up => Heading::Up,
                SwipeDirection::Left => Heading::Left,
                SwipeDirection::Down => Heading::Down,
                SwipeDirection::Right => Heading::Right,
            };
            on_swipe.set_heading(heading);
            Ok(())
        });
    }

    /// Spawn the tick loop. The interval is re-read every iteration, so a
    /// speed-up applies from the following tick.
    pub fn start(self: &Arc<Self>) -> SnakeHandle {
        self.publish_board();
        let game = Arc::clone(self);
        let join = thread::spawn(move || game.run());
        SnakeHandle {
            game: Arc::clone(self),
            join: Some(join),
        }
    }

    fn run(&self) {
        debug!("snake loop started");
        let mut stop = self.stop.lock().unwrap();
        loop {
            let interval = self.state.lock().unwrap().interval;
            let (guard, timeout) = self.stop_wake.wait_timeout(stop, interval).unwrap();
            stop = guard;
            if *stop {
                break;
            }
            if !timeout.timed_out() {
                continue;
            }
            drop(stop);
            self.tick();
            stop = self.stop.lock().unwrap();
        }
        debug!("snake loop stopped");
    }

    #[cfg(test)]
    fn place_food(&self, c: Coordinate) {
        let mut state = self.state.lock().unwrap();
        state.food = Some(c);
        state.rebuild_board();
    }
}

/// Owner handle for the snake tick loop
pub struct SnakeHandle {
    game: Arc<SnakeGame>,
    join: Option<thread::JoinHandle<()>>,
}

impl SnakeHandle {
    pub fn shutdown(mut self) {
        {
            let mut stop = self.game.stop.lock().unwrap();
            *stop = true;
            self.game.stop_wake.notify_all();
        }
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}
