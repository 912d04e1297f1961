use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::graph::{curve_points, display_max, grid_marks, Point};
use crate::surface::{DrawCommand, Frame, Glow, LinearGradient, Rgba, Surface, TextAlign};
use crate::types::GraphView;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Padding {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Default for Padding {
    fn default() -> Self {
        Self {
            left: PADDING_LEFT,
            right: PADDING_RIGHT,
            top: PADDING_TOP,
            bottom: PADDING_BOTTOM,
        }
    }
}

/// Colors, fonts and spacing of the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphStyle {
    pub padding: Padding,
    pub grid_color: Rgba,
    pub axis_color: Rgba,
    pub tick_label_color: Rgba,
    pub tick_font: String,
    pub label_font: String,
    /// Teal while the round runs
    pub running_color: Rgba,
    /// Red once it crashed
    pub crashed_color: Rgba,
    pub curve_width: f64,
    pub area_alpha: f64,
    pub marker_radius: f64,
    pub glow_radius: f64,
    pub glow_blur: f64,
}

impl Default for GraphStyle {
    fn default() -> Self {
        Self {
            padding: Padding::default(),
            grid_color: Rgba::new(255, 255, 255, 0.05),
            axis_color: Rgba::new(255, 255, 255, 0.2),
            tick_label_color: Rgba::new(255, 255, 255, 0.5),
            tick_font: "12px Arial".into(),
            label_font: "bold 14px Arial".into(),
            running_color: Rgba::new(0, 215, 187, 1.0),
            crashed_color: Rgba::new(255, 71, 87, 1.0),
            curve_width: 4.0,
            area_alpha: 0.1,
            marker_radius: 8.0,
            glow_radius: 5.0,
            glow_blur: 15.0,
        }
    }
}

/// Maps data space onto the padded plot area of a surface
#[derive(Debug, Clone, Copy)]
struct Plot {
    width: f64,
    height: f64,
    padding: Padding,
    x_scale: f64,
    y_scale: f64,
}

impl Plot {
    fn new(width: f64, height: f64, padding: Padding, range: f64) -> Self {
        let graph_width = width - padding.left - padding.right;
        let graph_height = height - padding.top - padding.bottom;
        Self {
            width,
            height,
            padding,
            x_scale: graph_width / range,
            y_scale: graph_height / range,
        }
    }

    fn bottom(&self) -> f64 {
        self.height - self.padding.bottom
    }

    fn right(&self) -> f64 {
        self.width - self.padding.right
    }

    fn to_px(&self, p: Point) -> Point {
        Point::new(
            self.padding.left + p.x * self.x_scale,
            self.bottom() - p.y * self.y_scale,
        )
    }
}

/// Draws the multiplier curve, grid and label.
///
/// `frame` is a pure function of the view and surface size; `render` adds the
/// surface checks and presents the result.
#[derive(Debug, Clone, Default)]
pub struct GraphRenderer {
    style: GraphStyle,
}

impl GraphRenderer {
    pub fn new(style: GraphStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &GraphStyle {
        &self.style
    }

    /// Draw onto `surface`. Returns false (and draws nothing) when the surface
    /// is missing, disposed or has no area.
    pub fn render(&self, view: &GraphView, surface: &mut dyn Surface) -> bool {
        let Some((width, height)) = surface.size() else {
            return false;
        };
        if !(width > 0.0 && height > 0.0) {
            return false;
        }
        let frame = self.frame(view, width, height);
        surface.present(&frame);
        true
    }

    pub fn frame(&self, view: &GraphView, width: f64, height: f64) -> Frame {
        let style = &self.style;
        let range = display_max(view.max_multiplier, view.multiplier);
        let plot = Plot::new(width, height, style.padding, range);
        let mut frame = Frame::new(width, height);

        self.draw_grid(&mut frame, &plot, range);
        self.draw_axes(&mut frame, &plot);

        let color = if view.crashed {
            style.crashed_color
        } else {
            style.running_color
        };

        let points: Vec<Point> = curve_points(view.multiplier)
            .into_iter()
            .map(|p| plot.to_px(p))
            .collect();
        let origin = plot.to_px(Point::ORIGIN);
        let tip = *points.last().unwrap_or(&origin);

        let gradient = LinearGradient {
            from: origin,
            to: plot.to_px(Point::new(view.multiplier, view.multiplier)),
            start: if view.crashed { color.with_alpha(0.8) } else { color.with_alpha(0.4) },
            end: color.with_alpha(0.8),
        };

        frame.push(DrawCommand::Polyline {
            points: points.clone(),
            color,
            width: style.curve_width,
        });

        // Area under the curve, closed back down to the x-axis
        let mut area = points;
        area.push(plot.to_px(Point::new(view.multiplier, 0.0)));
        frame.push(DrawCommand::FillPolygon {
            points: area,
            gradient,
            alpha: style.area_alpha,
        });

        frame.push(DrawCommand::Circle {
            center: tip,
            radius: style.marker_radius,
            color,
            glow: None,
        });
        frame.push(DrawCommand::Circle {
            center: tip,
            radius: style.glow_radius,
            color,
            glow: Some(Glow {
                color: color.with_alpha(0.8),
                blur: style.glow_blur,
            }),
        });

        let text_x = tip.x + LABEL_OFFSET_X;
        let offset = if width - text_x < LABEL_FLIP_WIDTH {
            -LABEL_FLIP_WIDTH
        } else {
            LABEL_OFFSET_X
        };
        frame.push(DrawCommand::Text {
            at: Point::new(tip.x + offset, tip.y - LABEL_OFFSET_Y),
            text: format!("{:.2}x", view.multiplier),
            font: style.label_font.clone(),
            align: TextAlign::Left,
            color: Rgba::WHITE,
        });

        frame
    }

    fn draw_grid(&self, frame: &mut Frame, plot: &Plot, range: f64) {
        let style = &self.style;
        let top = style.padding.top;
        let left = style.padding.left;

        for i in grid_marks(range) {
            let x = plot.to_px(Point::new(i as f64, 0.0)).x;
            frame.push(DrawCommand::Line {
                from: Point::new(x, top),
                to: Point::new(x, plot.bottom()),
                color: style.grid_color,
                width: 1.0,
            });
            frame.push(DrawCommand::Text {
                at: Point::new(x, plot.bottom() + 20.0),
                text: format!("{}x", i),
                font: style.tick_font.clone(),
                align: TextAlign::Center,
                color: style.tick_label_color,
            });
        }

        for i in grid_marks(range) {
            let y = plot.to_px(Point::new(0.0, i as f64)).y;
            frame.push(DrawCommand::Line {
                from: Point::new(left, y),
                to: Point::new(plot.right(), y),
                color: style.grid_color,
                width: 1.0,
            });
            frame.push(DrawCommand::Text {
                at: Point::new(left - 10.0, y + 5.0),
                text: format!("{}x", i),
                font: style.tick_font.clone(),
                align: TextAlign::Right,
                color: style.tick_label_color,
            });
        }
    }

    fn draw_axes(&self, frame: &mut Frame, plot: &Plot) {
        let style = &self.style;
        let origin = plot.to_px(Point::ORIGIN);
        frame.push(DrawCommand::Line {
            from: origin,
            to: Point::new(plot.right(), origin.y),
            color: style.axis_color,
            width: 2.0,
        });
        frame.push(DrawCommand::Line {
            from: origin,
            to: Point::new(origin.x, style.padding.top),
            color: style.axis_color,
            width: 2.0,
        });
    }
}
