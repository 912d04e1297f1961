//! Crash game round engine and graph renderer.
//!
//! The engine runs rounds (waiting, running, crashed) on a scheduler owned by
//! [`GameController`] and publishes a [`Snapshot`] after every change. The
//! renderer turns a [`GraphView`] into a [`Frame`] of draw commands for any
//! [`Surface`].

pub mod animation;
pub mod clock;
pub mod constants;
pub mod controller;
pub mod engine;
pub mod graph;
pub mod provider;
pub mod render;
pub mod scheduler;
pub mod surface;
pub mod types;

pub use animation::FrameLoop;
pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{EngineTimer, GameController};
pub use engine::{EngineConfig, EngineError, GameEngine, Subscription, TickOutcome};
pub use graph::{curve_points, display_max, grid_step, Point};
pub use provider::{sample_crash_point, CrashPointProvider, FixedCrashPoint, HashedCrashPoints};
pub use render::{GraphRenderer, GraphStyle, Padding};
pub use surface::{DisplayList, DrawCommand, Frame, Rgba, Surface};
pub use types::{axis_max, Bet, BetId, BetStatus, GraphView, Phase, Snapshot};
