// Data-space geometry for the crash curve. No pixels here.

use serde::{Deserialize, Serialize};

use crate::constants::{AXIS_HEADROOM, CURVE_EXPONENT, CURVE_STEPS, MAX_GRID_MARKS};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Visible axis range: the published max, grown to keep 20% headroom above
/// the multiplier
pub fn display_max(max_multiplier: f64, multiplier: f64) -> f64 {
    max_multiplier.max((multiplier * AXIS_HEADROOM).ceil())
}

/// Grid spacing for an axis range
pub fn grid_step(display_max: f64) -> u32 {
    if display_max <= 10.0 {
        1
    } else if display_max <= 20.0 {
        2
    } else if display_max <= 50.0 {
        5
    } else {
        10
    }
}

/// Grid positions from 0 up to and including `display_max`, at most
/// `MAX_GRID_MARKS` of them
pub fn grid_marks(display_max: f64) -> impl Iterator<Item = u64> {
    let top = if display_max.is_finite() && display_max > 0.0 {
        display_max.floor() as u64
    } else {
        0
    };
    (0..=top)
        .step_by(grid_step(display_max) as usize)
        .take(MAX_GRID_MARKS)
}

/// Sample the curve from the origin to (multiplier, multiplier).
///
/// `x = p * m`, `y = p^1.5 * m` for p in [0, 1]; the last sample has p = 1.
pub fn curve_points(multiplier: f64) -> Vec<Point> {
    (0..=CURVE_STEPS)
        .map(|i| {
            let progress = i as f64 / CURVE_STEPS as f64;
            Point {
                x: progress * multiplier,
                y: progress.powf(CURVE_EXPONENT) * multiplier,
            }
        })
        .collect()
}
