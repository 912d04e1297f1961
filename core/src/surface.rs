use serde::{Deserialize, Serialize};

use crate::graph::Point;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 1.0);

    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }
}

impl std::fmt::Display for Rgba {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearGradient {
    pub from: Point,
    pub to: Point,
    pub start: Rgba,
    pub end: Rgba,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Glow {
    pub color: Rgba,
    pub blur: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// One drawing primitive, in pixel space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Clear,
    Line {
        from: Point,
        to: Point,
        color: Rgba,
        width: f64,
    },
    Polyline {
        points: Vec<Point>,
        color: Rgba,
        width: f64,
    },
    FillPolygon {
        points: Vec<Point>,
        gradient: LinearGradient,
        alpha: f64,
    },
    Circle {
        center: Point,
        radius: f64,
        color: Rgba,
        glow: Option<Glow>,
    },
    Text {
        at: Point,
        text: String,
        font: String,
        align: TextAlign,
        color: Rgba,
    },
}

/// A complete redraw of the surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub width: f64,
    pub height: f64,
    pub commands: Vec<DrawCommand>,
}

impl Frame {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            commands: vec![DrawCommand::Clear],
        }
    }

    pub fn push(&mut self, cmd: DrawCommand) {
        self.commands.push(cmd);
    }

    pub fn texts(&self) -> impl Iterator<Item = (&Point, &str)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { at, text, .. } => Some((at, text.as_str())),
            _ => None,
        })
    }

    pub fn circles(&self) -> impl Iterator<Item = (&Point, f64, Option<&Glow>)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Circle {
                center,
                radius,
                glow,
                ..
            } => Some((center, *radius, glow.as_ref())),
            _ => None,
        })
    }
}

/// Something a frame can be drawn onto
pub trait Surface {
    /// Pixel size, or None when the surface is not mounted or was disposed
    fn size(&self) -> Option<(f64, f64)>;

    /// Match the container's new pixel size
    fn resize(&mut self, width: f64, height: f64);

    fn present(&mut self, frame: &Frame);
}

/// Surface that keeps the last presented frame
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    size: Option<(f64, f64)>,
    last: Option<Frame>,
    presented: usize,
}

impl DisplayList {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: Some((width, height)),
            ..Self::default()
        }
    }

    /// A surface with no backing store yet
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn dispose(&mut self) {
        self.size = None;
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.last.as_ref()
    }

    pub fn frames_presented(&self) -> usize {
        self.presented
    }
}

impl Surface for DisplayList {
    fn size(&self) -> Option<(f64, f64)> {
        self.size
    }

    fn resize(&mut self, width: f64, height: f64) {
        self.size = Some((width, height));
    }

    fn present(&mut self, frame: &Frame) {
        self.last = Some(frame.clone());
        self.presented += 1;
    }
}
