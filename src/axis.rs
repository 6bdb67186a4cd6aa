//! User-marked reference axis.
//!
//! Two clicks define a line. The first click stores a pending point, the
//! second completes the line and returns the marker to its idle phase, so a
//! third click starts a new line. The last completed line stays available for
//! drawing until the next one completes.

use serde::{Deserialize, Serialize};

use crate::buffer::PixelBuffer;

/// Canvas-local click position. Not validated against the canvas size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisPoint {
    pub x: i64,
    pub y: i64,
}

impl AxisPoint {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisLine {
    pub start: AxisPoint,
    pub end: AxisPoint,
}

/// Observable marker phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisPhase {
    #[default]
    Unset,
    FirstSet,
}

/// What a click did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisEvent {
    /// First endpoint stored, waiting for the second.
    FirstPoint(AxisPoint),
    /// Line completed; the owner should redraw.
    Completed(AxisLine),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisMarker {
    phase: AxisPhase,
    pending: Option<AxisPoint>,
    line: Option<AxisLine>,
}

impl AxisMarker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> AxisPhase {
        self.phase
    }

    /// Last completed line, if any.
    pub fn line(&self) -> Option<AxisLine> {
        self.line
    }

    pub fn click(&mut self, point: AxisPoint) -> AxisEvent {
        match (self.phase, self.pending) {
            (AxisPhase::FirstSet, Some(start)) => {
                let line = AxisLine { start, end: point };
                self.line = Some(line);
                self.pending = None;
                self.phase = AxisPhase::Unset;
                AxisEvent::Completed(line)
            }
            _ => {
                self.pending = Some(point);
                self.phase = AxisPhase::FirstSet;
                AxisEvent::FirstPoint(point)
            }
        }
    }

    /// Forget the pending point and the completed line.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Draw a one-pixel line with Bresenham's algorithm.
///
/// Endpoints may lie outside the buffer; only pixels inside it are written.
pub fn draw_line(buffer: &mut PixelBuffer, line: &AxisLine, rgba: [u8; 4]) {
    let (width, height) = (buffer.width() as i64, buffer.height() as i64);
    let (mut x, mut y) = (line.start.x, line.start.y);
    let (x1, y1) = (line.end.x, line.end.y);

    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if (0..width).contains(&x) && (0..height).contains(&y) {
            buffer.set_pixel(x as usize, y as usize, rgba);
        }
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}
