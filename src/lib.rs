//! gridcast: a concurrent simulation and rendering core for worker-hosted
//! pixel demos.
//!
//! The crate sits between game logic and a host canvas it never touches
//! directly. Demos raster into a shared [`board::PixelBoard`], submit
//! [`geometry::Frame`]s (full repaints or origin-tagged patches) through
//! the bounded, cadence-paced [`pipeline::FramePipeline`], and receive
//! input through the [`events::EventHub`]. The host side implements
//! [`pipeline::Renderer`] over whatever transport it has; [`wire`] carries
//! the JSON envelope for a worker/canvas host.
//!
//! Two demos ship with the core: [`life::LifeGame`], a pausable Conway
//! board seeded by freehand drawing, and [`snake::SnakeGame`].

pub mod board;
pub mod drawing;
pub mod error;
pub mod events;
pub mod geometry;
pub mod life;
pub mod pipeline;
pub mod snake;
pub mod util;
pub mod wire;

pub use board::PixelBoard;
pub use error::EngineError;
pub use events::{Event, EventHub, EventSource, Key, SwipeDirection};
pub use geometry::{Coordinate, Frame, Pixel, Size};
pub use pipeline::{FramePipeline, FrameSender, PipelineHandle, Renderer};
