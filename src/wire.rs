//! Host message envelope
//!
//! JSON messages exchanged with the host canvas over the worker channel.
//! Outbound render commands are internally tagged on `type`, with pixel
//! payloads flattened to row-major RGBA bytes and colors as `#rrggbbaa`
//! hex. Inbound events decode through `decode_event`; anything malformed
//! or unrecognized decodes to `None` and is dropped without comment, so a
//! misbehaving host cannot wedge the event loop.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::events::{Event, Key, SwipeDirection};
use crate::geometry::{Coordinate, Frame, Pixel, Size};

/// Outbound render command for the host canvas
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum HostMessage {
    #[serde(rename = "renderFrame")]
    RenderFrame {
        pixels: Vec<u8>,
        width: u32,
        height: u32,
        x: i32,
        y: i32,
    },
    #[serde(rename = "renderRect")]
    RenderRect {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        color: String,
    },
    #[serde(rename = "renderCircle")]
    RenderCircle {
        x: i32,
        y: i32,
        radius: u32,
        #[serde(rename = "startAngle")]
        start_angle: f64,
        #[serde(rename = "endAngle")]
        end_angle: f64,
        color: String,
    },
    #[serde(rename = "renderLine")]
    RenderLine {
        #[serde(rename = "startX")]
        start_x: i32,
        #[serde(rename = "startY")]
        start_y: i32,
        #[serde(rename = "endX")]
        end_x: i32,
        #[serde(rename = "endY")]
        end_y: i32,
        width: u32,
        color: String,
    },
    #[serde(rename = "renderPixel")]
    RenderPixel { x: i32, y: i32, color: String },
}

impl HostMessage {
    /// Wrap a frame for the canvas. A patch carries its origin; a full
    /// frame renders at (0, 0).
    pub fn render_frame(frame: &Frame) -> HostMessage {
        let origin = frame.origin().unwrap_or(Coordinate::new(0, 0));
        HostMessage::RenderFrame {
            pixels: frame.to_rgba_bytes(),
            width: frame.size().width,
            height: frame.size().height,
            x: origin.x,
            y: origin.y,
        }
    }

    pub fn render_rect(origin: Coordinate, size: Size, color: Pixel) -> HostMessage {
        HostMessage::RenderRect {
            x: origin.x,
            y: origin.y,
            width: size.width,
            height: size.height,
            color: color.to_hex(),
        }
    }

    pub fn render_circle(
        center: Coordinate,
        radius: u32,
        start_angle: f64,
        end_angle: f64,
        color: Pixel,
    ) -> HostMessage {
        HostMessage::RenderCircle {
            x: center.x,
            y: center.y,
            radius,
            start_angle,
            end_angle,
            color: color.to_hex(),
        }
    }

    pub fn render_line(start: Coordinate, end: Coordinate, width: u32, color: Pixel) -> HostMessage {
        HostMessage::RenderLine {
            start_x: start.x,
            start_y: start.y,
            end_x: end.x,
            end_y: end.y,
            width,
            color: color.to_hex(),
        }
    }

    pub fn render_pixel(at: Coordinate, color: Pixel) -> HostMessage {
        HostMessage::RenderPixel {
            x: at.x,
            y: at.y,
            color: color.to_hex(),
        }
    }

    pub fn encode(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum InboundMessage {
    #[serde(rename = "resize")]
    Resize { width: u32, height: u32 },
    #[serde(rename = "mouseClick")]
    MouseClick { x: i32, y: i32 },
    #[serde(rename = "mouseDrag")]
    MouseDrag { x: i32, y: i32 },
    #[serde(rename = "mouseDragEnd")]
    MouseDragEnd { x: i32, y: i32 },
    #[serde(rename = "keyDown")]
    KeyDown { key: String },
    #[serde(rename = "swipe")]
    Swipe { direction: String },
}

/// Decode one inbound host message. Malformed JSON, unknown tags, wrong
/// field types, unknown keys, and unknown swipe directions all yield
/// `None`.
pub fn decode_event(raw: &str) -> Option<Event> {
    match serde_json::from_str::<InboundMessage>(raw).ok()? {
        InboundMessage::Resize { width, height } => Some(Event::Resize(Size::new(width, height))),
        InboundMessage::MouseClick { x, y } => Some(Event::MouseClick(Coordinate::new(x, y))),
        InboundMessage::MouseDrag { x, y } => Some(Event::MouseDrag(Coordinate::new(x, y))),
        InboundMessage::MouseDragEnd { x, y } => {
            Some(Event::MouseDragEnd(Coordinate::new(x, y)))
        }
        InboundMessage::KeyDown { key } => Key::parse(&key).map(Event::KeyDown),
        InboundMessage::Swipe { direction } => SwipeDirection::parse(&direction).map(Event::Swipe),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_render_frame_payload_is_row_major_rgba() {
        let mut frame = Frame::filled(Size::new(2, 1), Pixel::BLACK);
        frame.set(1, 0, Pixel::rgba(10, 20, 30, 40));
        let message = HostMessage::render_frame(&frame);

        let HostMessage::RenderFrame {
            pixels,
            width,
            height,
            x,
            y,
        } = &message
        else {
            panic!("wrong variant");
        };
        assert_eq!(pixels.len(), 4 * 2 * 1);
        assert_eq!(&pixels[4..8], &[10, 20, 30, 40]);
        assert_eq!((*width, *height), (2, 1));
        assert_eq!((*x, *y), (0, 0));
    }

    #[test]
    fn test_render_frame_carries_patch_origin() {
        let frame =
            Frame::filled(Size::new(1, 1), Pixel::WHITE).with_origin(Coordinate::new(3, 7));
        let encoded = HostMessage::render_frame(&frame).encode().unwrap();
        let value: Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(value["type"], "renderFrame");
        assert_eq!(value["x"], 3);
        assert_eq!(value["y"], 7);
    }

    #[test]
    fn test_render_pixel_envelope_shape() {
        let encoded = HostMessage::render_pixel(Coordinate::new(4, 5), Pixel::rgba(255, 0, 0, 255))
            .encode()
            .unwrap();
        let value: Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(value["type"], "renderPixel");
        assert_eq!(value["x"], 4);
        assert_eq!(value["y"], 5);
        assert_eq!(value["color"], "#ff0000ff");
    }

    #[test]
    fn test_render_line_field_names() {
        let encoded = HostMessage::render_line(
            Coordinate::new(0, 1),
            Coordinate::new(2, 3),
            1,
            Pixel::WHITE,
        )
        .encode()
        .unwrap();
        let value: Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(value["type"], "renderLine");
        assert_eq!(value["startX"], 0);
        assert_eq!(value["startY"], 1);
        assert_eq!(value["endX"], 2);
        assert_eq!(value["endY"], 3);
    }

    #[test]
    fn test_decode_events() {
        assert_eq!(
            decode_event(r#"{"type":"resize","width":800,"height":600}"#),
            Some(Event::Resize(Size::new(800, 600)))
        );
        assert_eq!(
            decode_event(r#"{"type":"mouseDrag","x":10,"y":-2}"#),
            Some(Event::MouseDrag(Coordinate::new(10, -2)))
        );
        assert_eq!(
            decode_event(r#"{"type":"keyDown","key":"W"}"#),
            Some(Event::KeyDown(Key::W))
        );
        assert_eq!(
            decode_event(r#"{"type":"swipe","direction":"LEFT"}"#),
            Some(Event::Swipe(SwipeDirection::Left))
        );
    }

    #[test]
    fn test_malformed_payloads_decode_to_none() {
        assert_eq!(decode_event("not json"), None);
        assert_eq!(decode_event(r#"{"type":"teleport","x":1}"#), None);
        assert_eq!(decode_event(r#"{"type":"resize","width":"wide"}"#), None);
        assert_eq!(decode_event(r#"{"type":"mouseClick","x":3}"#), None);
        assert_eq!(decode_event(r#"{"type":"keyDown","key":"q"}"#), None);
        assert_eq!(
            decode_event(r#"{"type":"swipe","direction":"diagonal"}"#),
            None
        );
    }
}
