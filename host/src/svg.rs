use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crash_core::surface::{LinearGradient, TextAlign};
use crash_core::{DrawCommand, Frame, Point, Rgba, Surface};

const BACKGROUND: Rgba = Rgba::new(15, 25, 35, 1.0);

/// Surface that turns each presented frame into an SVG document
#[derive(Debug, Clone, Default)]
pub struct SvgSurface {
    size: Option<(f64, f64)>,
    document: Option<String>,
}

impl SvgSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: Some((width, height)),
            document: None,
        }
    }

    pub fn dispose(&mut self) {
        self.size = None;
    }

    /// SVG of the last presented frame
    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }

    pub fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let doc = self.document.as_ref().ok_or("No frame has been drawn yet")?;
        fs::write(path, doc)
            .map_err(|e| format!("Error writing SVG '{}': {}", path.display(), e))?;
        Ok(())
    }
}

impl Surface for SvgSurface {
    fn size(&self) -> Option<(f64, f64)> {
        self.size
    }

    fn resize(&mut self, width: f64, height: f64) {
        self.size = Some((width, height));
    }

    fn present(&mut self, frame: &Frame) {
        self.document = Some(to_svg(frame));
    }
}

/// Serialize a frame as a standalone SVG document
pub fn to_svg(frame: &Frame) -> String {
    let mut out = String::with_capacity(16 * 1024);
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = frame.width,
        h = frame.height
    );

    let mut gradients = 0usize;
    for cmd in &frame.commands {
        match cmd {
            DrawCommand::Clear => {
                let _ = writeln!(
                    out,
                    r#"<rect x="0" y="0" width="{}" height="{}" fill="{}"/>"#,
                    frame.width, frame.height, BACKGROUND
                );
            }
            DrawCommand::Line {
                from,
                to,
                color,
                width,
            } => {
                let _ = writeln!(
                    out,
                    r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="{}"/>"#,
                    from.x, from.y, to.x, to.y, color, width
                );
            }
            DrawCommand::Polyline {
                points,
                color,
                width,
            } => {
                let _ = writeln!(
                    out,
                    r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="{}" stroke-linejoin="round"/>"#,
                    point_list(points),
                    color,
                    width
                );
            }
            DrawCommand::FillPolygon {
                points,
                gradient,
                alpha,
            } => {
                let id = format!("area{}", gradients);
                gradients += 1;
                write_gradient(&mut out, &id, gradient);
                let _ = writeln!(
                    out,
                    r#"<polygon points="{}" fill="url(#{})" opacity="{}"/>"#,
                    point_list(points),
                    id,
                    alpha
                );
            }
            DrawCommand::Circle {
                center,
                radius,
                color,
                glow,
            } => {
                if let Some(glow) = glow {
                    // Soft halo approximating a canvas shadow blur
                    let _ = writeln!(
                        out,
                        r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}" opacity="0.35"/>"#,
                        center.x,
                        center.y,
                        radius + glow.blur / 2.0,
                        glow.color
                    );
                }
                let _ = writeln!(
                    out,
                    r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}"/>"#,
                    center.x, center.y, radius, color
                );
            }
            DrawCommand::Text {
                at,
                text,
                font,
                align,
                color,
            } => {
                let anchor = match align {
                    TextAlign::Left => "start",
                    TextAlign::Center => "middle",
                    TextAlign::Right => "end",
                };
                let _ = writeln!(
                    out,
                    r#"<text x="{:.2}" y="{:.2}" fill="{}" text-anchor="{}" style="font: {}">{}</text>"#,
                    at.x,
                    at.y,
                    color,
                    anchor,
                    escape(font),
                    escape(text)
                );
            }
        }
    }

    out.push_str("</svg>\n");
    out
}

fn write_gradient(out: &mut String, id: &str, g: &LinearGradient) {
    let _ = writeln!(
        out,
        r#"<defs><linearGradient id="{}" gradientUnits="userSpaceOnUse" x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}"><stop offset="0" stop-color="{}"/><stop offset="1" stop-color="{}"/></linearGradient></defs>"#,
        id, g.from.x, g.from.y, g.to.x, g.to.y, g.start, g.end
    );
}

fn point_list(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{:.2},{:.2}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
