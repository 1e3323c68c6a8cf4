//! Event hub: registration and multicast of input/window events
//!
//! The hub is the fan-out point between the transport (which decodes raw
//! host messages) and the demos (which register handlers). Registration
//! never fails and never deduplicates; dispatch invokes handlers in
//! registration order, and a handler error is logged without stopping
//! dispatch to the handlers after it.

use std::sync::Mutex;

use tracing::warn;

use crate::error::EngineError;
use crate::geometry::{Coordinate, Size};

/// Keyboard keys the demos care about. Anything else is dropped at the
/// transport boundary before it reaches the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    W,
    A,
    S,
    D,
    P,
    R,
}

impl Key {
    /// Case-insensitive parse; `None` for keys outside the closed set
    pub fn parse(s: &str) -> Option<Key> {
        match s.to_ascii_lowercase().as_str() {
            "w" => Some(Key::W),
            "a" => Some(Key::A),
            "s" => Some(Key::S),
            "d" => Some(Key::D),
            "p" => Some(Key::P),
            "r" => Some(Key::R),
            _ => None,
        }
    }
}

/// Swipe directions, a closed enumeration matching the four legal
/// snake headings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Left,
    Right,
    Up,
    Down,
}

impl SwipeDirection {
    /// Case-insensitive parse; `None` for unknown directions
    pub fn parse(s: &str) -> Option<SwipeDirection> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Some(SwipeDirection::Left),
            "right" => Some(SwipeDirection::Right),
            "up" => Some(SwipeDirection::Up),
            "down" => Some(SwipeDirection::Down),
            _ => None,
        }
    }
}

/// A decoded input or window event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Resize(Size),
    MouseClick(Coordinate),
    MouseDrag(Coordinate),
    MouseDragEnd(Coordinate),
    KeyDown(Key),
    Swipe(SwipeDirection),
}

pub type ResizeHandler = Box<dyn Fn(Size) -> Result<(), EngineError> + Send>;
pub type MouseHandler = Box<dyn Fn(Coordinate) -> Result<(), EngineError> + Send>;
pub type KeyDownHandler = Box<dyn Fn(Key) -> Result<(), EngineError> + Send>;
pub type SwipeHandler = Box<dyn Fn(SwipeDirection) -> Result<(), EngineError> + Send>;

/// Event-source capability: the six registration methods, mirrored by
/// both the hub and any transport-side event source.
pub trait EventSource {
    fn register_resize(&self, handler: ResizeHandler) -> Result<(), EngineError>;
    fn register_mouse_click(&self, handler: MouseHandler) -> Result<(), EngineError>;
    fn register_mouse_drag(&self, handler: MouseHandler) -> Result<(), EngineError>;
    fn register_mouse_drag_end(&self, handler: MouseHandler) -> Result<(), EngineError>;
    fn register_key_down(&self, handler: KeyDownHandler) -> Result<(), EngineError>;
    fn register_swipe(&self, handler: SwipeHandler) -> Result<(), EngineError>;
}

// ============================================================================
// EventHub
// ============================================================================

/// Registers and multicasts events to zero or more subscribers.
///
/// Handlers must not register new handlers from inside a handler; the
/// per-kind list is locked for the duration of a dispatch.
#[derive(Default)]
pub struct EventHub {
    resize: Mutex<Vec<ResizeHandler>>,
    mouse_click: Mutex<Vec<MouseHandler>>,
    mouse_drag: Mutex<Vec<MouseHandler>>,
    mouse_drag_end: Mutex<Vec<MouseHandler>>,
    key_down: Mutex<Vec<KeyDownHandler>>,
    swipe: Mutex<Vec<SwipeHandler>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatch an event to every handler registered for its kind, in
    /// registration order. Handler failures are logged and skipped.
    pub fn dispatch(&self, event: Event) {
        match event {
            Event::Resize(size) => {
                for handler in self.resize.lock().unwrap().iter() {
                    log_handler_result(handler(size));
                }
            }
            Event::MouseClick(c) => {
                for handler in self.mouse_click.lock().unwrap().iter() {
                    log_handler_result(handler(c));
                }
            }
            Event::MouseDrag(c) => {
                for handler in self.mouse_drag.lock().unwrap().iter() {
                    log_handler_result(handler(c));
                }
            }
            Event::MouseDragEnd(c) => {
                for handler in self.mouse_drag_end.lock().unwrap().iter() {
                    log_handler_result(handler(c));
                }
            }
            Event::KeyDown(key) => {
                for handler in self.key_down.lock().unwrap().iter() {
                    log_handler_result(handler(key));
                }
            }
            Event::Swipe(direction) => {
                for handler in self.swipe.lock().unwrap().iter() {
                    log_handler_result(handler(direction));
                }
            }
        }
    }

    // Convenience registration without manual boxing

    pub fn on_resize(&self, f: impl Fn(Size) -> Result<(), EngineError> + Send + 'static) {
        self.resize.lock().unwrap().push(Box::new(f));
    }

    pub fn on_mouse_click(
        &self,
        f: impl Fn(Coordinate) -> Result<(), EngineError> + Send + 'static,
    ) {
        self.mouse_click.lock().unwrap().push(Box::new(f));
    }

    pub fn on_mouse_drag(
        &self,
        f: impl Fn(Coordinate) -> Result<(), EngineError> + Send + 'static,
    ) {
        self.mouse_drag.lock().unwrap().push(Box::new(f));
    }

    pub fn on_mouse_drag_end(
        &self,
        f: impl Fn(Coordinate) -> Result<(), EngineError> + Send + 'static,
    ) {
        self.mouse_drag_end.lock().unwrap().push(Box::new(f));
    }

    pub fn on_key_down(&self, f: impl Fn(Key) -> Result<(), EngineError> + Send + 'static) {
        self.key_down.lock().unwrap().push(Box::new(f));
    }

    pub fn on_swipe(
        &self,
        f: impl Fn(SwipeDirection) -> Result<(), EngineError> + Send + 'static,
    ) {
        self.swipe.lock().unwrap().push(Box::new(f));
    }
}

impl EventSource for EventHub {
    fn register_resize(&self, handler: ResizeHandler) -> Result<(), EngineError> {
        self.resize.lock().unwrap().push(handler);
        Ok(())
    }

    fn register_mouse_click(&self, handler: MouseHandler) -> Result<(), EngineError> {
        self.mouse_click.lock().unwrap().push(handler);
        Ok(())
    }

    fn register_mouse_drag(&self, handler: MouseHandler) -> Result<(), EngineError> {
        self.mouse_drag.lock().unwrap().push(handler);
        Ok(())
    }

    fn register_mouse_drag_end(&self, handler: MouseHandler) -> Result<(), EngineError> {
        self.mouse_drag_end.lock().unwrap().push(handler);
        Ok(())
    }

    fn register_key_down(&self, handler: KeyDownHandler) -> Result<(), EngineError> {
        self.key_down.lock().unwrap().push(handler);
        Ok(())
    }

    fn register_swipe(&self, handler: SwipeHandler) -> Result<(), EngineError> {
        self.swipe.lock().unwrap().push(handler);
        Ok(())
    }
}

fn log_handler_result(result: Result<(), EngineError>) {
    if let Err(e) = result {
        warn!("event handler failed: {e}");
    }
}
