use serde::{Deserialize, Serialize};

use crate::constants::{AXIS_HEADROOM, MIN_AXIS_MAX};

/// Round lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Between rounds; bets are accepted
    Waiting,
    /// Multiplier is growing
    Running,
    /// Round ended at its crash point
    Crashed,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Waiting => write!(f, "waiting"),
            Phase::Running => write!(f, "running"),
            Phase::Crashed => write!(f, "crashed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetStatus {
    Active,
    Won,
    Lost,
}

pub type BetId = u64;

/// A single player's stake in the current round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bet {
    pub id: BetId,
    pub player: String,
    pub amount: f64,
    /// Multiplier the bet settled at (cash-out value or crash value)
    pub multiplier: Option<f64>,
    /// Net result once settled
    pub profit: Option<f64>,
    pub status: BetStatus,
}

impl Bet {
    pub fn new(id: BetId, player: &str, amount: f64) -> Self {
        Self {
            id,
            player: player.into(),
            amount,
            multiplier: None,
            profit: None,
            status: BetStatus::Active,
        }
    }

    pub(crate) fn win(&mut self, multiplier: f64) {
        self.multiplier = Some(multiplier);
        self.profit = Some(self.amount * multiplier - self.amount);
        self.status = BetStatus::Won;
    }

    pub(crate) fn lose(&mut self, crash_value: f64) {
        self.multiplier = Some(crash_value);
        self.profit = Some(-self.amount);
        self.status = BetStatus::Lost;
    }
}

/// Read-only view of the engine published after every state change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub round_id: u64,
    pub phase: Phase,
    pub multiplier: f64,
    pub max_multiplier: f64,
    pub crashed: bool,
    pub history: Vec<f64>,
    pub bets: Vec<Bet>,
}

impl Snapshot {
    /// The subset of the snapshot the graph needs
    pub fn view(&self) -> GraphView {
        GraphView {
            multiplier: self.multiplier,
            max_multiplier: self.max_multiplier,
            crashed: self.crashed,
        }
    }
}

/// Renderer input: everything a frame depends on besides the surface size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraphView {
    pub multiplier: f64,
    pub max_multiplier: f64,
    pub crashed: bool,
}

impl GraphView {
    /// View for a bare multiplier, with the axis range the engine would publish
    pub fn at(multiplier: f64, crashed: bool) -> Self {
        Self {
            multiplier,
            max_multiplier: axis_max(multiplier),
            crashed,
        }
    }
}

/// Axis range published alongside a multiplier: max(10, ceil(m * 1.2))
pub fn axis_max(multiplier: f64) -> f64 {
    MIN_AXIS_MAX.max((multiplier * AXIS_HEADROOM).ceil())
}
