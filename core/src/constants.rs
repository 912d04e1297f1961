// Default game and graph constants.
// EngineConfig / GraphStyle defaults are built from these; config files override them.

/// Delay between entering Waiting and the multiplier starting to grow (ms)
pub const PRE_ROUND_DELAY_MS: u64 = 3000;

/// Delay between a crash and the next Waiting phase (ms)
pub const POST_CRASH_DELAY_MS: u64 = 3000;

/// Growth tick interval while a round is running (ms)
pub const TICK_INTERVAL_MS: u64 = 50;

/// Growth rate at multiplier 1.0 (multiplier units per second)
pub const BASE_RATE: f64 = 0.5;

/// Exponent applied to the current multiplier when computing the growth rate
pub const GROWTH_EXPONENT: f64 = 0.7;

/// Number of past crash values kept in history
pub const HISTORY_LIMIT: usize = 50;

/// Largest history length a config may ask for
pub const MAX_HISTORY_LIMIT: usize = 10_000;

/// History entries drawn from the provider before the first round
pub const WARMUP_ROUNDS: usize = 5;

/// Placeholder crash point used when no provider is configured
pub const FIXED_CRASH_POINT: f64 = 9.99;

/// Upper bound on grid lines drawn per axis
pub const MAX_GRID_MARKS: usize = 1_000;

/// Lower bound of the vertical axis range published by the engine
pub const MIN_AXIS_MAX: f64 = 10.0;

/// Headroom factor applied to the multiplier when auto-scaling the axes
pub const AXIS_HEADROOM: f64 = 1.2;

/// Frame interval of the redraw loop (ms), roughly 60 fps
pub const FRAME_INTERVAL_MS: u64 = 16;

/// Number of segments the curve is sampled with (101 points including origin)
pub const CURVE_STEPS: usize = 100;

/// Curve steepness: y = progress^CURVE_EXPONENT * multiplier
pub const CURVE_EXPONENT: f64 = 1.5;

/// Graph padding in pixels
pub const PADDING_LEFT: f64 = 60.0;
pub const PADDING_RIGHT: f64 = 40.0;
pub const PADDING_TOP: f64 = 40.0;
pub const PADDING_BOTTOM: f64 = 60.0;

/// Label placement around the curve tip (pixels)
pub const LABEL_OFFSET_X: f64 = 15.0;
pub const LABEL_OFFSET_Y: f64 = 10.0;
pub const LABEL_FLIP_WIDTH: f64 = 80.0;

/// Highest multiplier the hashed sampler can produce
pub const MAX_SAMPLED_CRASH: f64 = 100.0;

/// House edge used by the hashed sampler (basis points)
pub const HOUSE_EDGE_BPS: u16 = 100;
