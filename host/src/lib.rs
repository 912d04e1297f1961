mod config;
mod session;
mod svg;

use std::time::Duration;

use crash_core::{
    BetStatus, CrashPointProvider, FixedCrashPoint, HashedCrashPoints, Phase, Snapshot,
};
use serde::{Deserialize, Serialize};

pub use config::{load_config, AppConfig, DEFAULT_HEIGHT, DEFAULT_WIDTH, MAX_CONFIG_SIZE};
pub use session::{Session, StepReport};
pub use svg::{to_svg, SvgSurface};

/// Where crash points come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "value")]
pub enum ProviderSpec {
    /// Same value every round
    Fixed(f64),
    /// Hex-encoded 32-byte seed for the hashed exponential sampler
    Hashed(String),
}

impl Default for ProviderSpec {
    fn default() -> Self {
        ProviderSpec::Fixed(FixedCrashPoint::default().0)
    }
}

impl ProviderSpec {
    pub fn build(&self) -> Result<Box<dyn CrashPointProvider>, Box<dyn std::error::Error>> {
        match self {
            ProviderSpec::Fixed(v) => {
                if !(v.is_finite() && *v >= 1.0) {
                    return Err(format!("Crash point must be >= 1.0, got {}", v).into());
                }
                Ok(Box::new(FixedCrashPoint(*v)))
            }
            ProviderSpec::Hashed(seed_hex) => {
                let seed = parse_seed(seed_hex)?;
                Ok(Box::new(HashedCrashPoints::new(seed)))
            }
        }
    }
}

impl std::fmt::Display for ProviderSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderSpec::Fixed(v) => write!(f, "fixed {:.2}x", v),
            ProviderSpec::Hashed(seed) => write!(f, "hashed (seed {})", seed),
        }
    }
}

/// Decode a hex-encoded 32-byte seed
pub fn parse_seed(seed_hex: &str) -> Result<[u8; 32], String> {
    let bytes = hex::decode(seed_hex.trim_start_matches("0x"))
        .map_err(|e| format!("Error decoding seed hex: {}", e))?;
    if bytes.len() != 32 {
        return Err(format!(
            "Invalid seed length: expected 32 bytes, got {}",
            bytes.len()
        ));
    }
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&bytes);
    Ok(seed)
}

/// Outcome of one completed round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round_id: u64,
    pub crash_point: f64,
    /// Time from growth start to crash
    pub running_ms: u64,
    pub bets_won: usize,
    pub bets_lost: usize,
    /// Net profit across the round's bets
    pub net_profit: f64,
}

/// A phase transition seen by [`RoundLog::observe`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseChange {
    pub round_id: u64,
    pub from: Option<Phase>,
    pub to: Phase,
}

/// Watches snapshots and turns phase transitions into round records
#[derive(Debug, Clone, Default)]
pub struct RoundLog {
    last: Option<(u64, Phase)>,
    running_since: Option<Duration>,
    records: Vec<RoundRecord>,
}

impl RoundLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[RoundRecord] {
        &self.records
    }

    pub fn completed(&self) -> usize {
        self.records.len()
    }

    pub fn observe(&mut self, snap: &Snapshot, now: Duration) -> Option<PhaseChange> {
        let current = (snap.round_id, snap.phase);
        if self.last == Some(current) {
            return None;
        }
        let from = self.last.map(|(_, p)| p);
        self.last = Some(current);

        match snap.phase {
            Phase::Running => self.running_since = Some(now),
            Phase::Crashed => {
                let started = self.running_since.take().unwrap_or(now);
                let settled = snap.bets.iter().filter_map(|b| b.profit.map(|p| (b.status, p)));
                let (mut won, mut lost, mut net) = (0usize, 0usize, 0.0f64);
                for (status, profit) in settled {
                    match status {
                        BetStatus::Won => won += 1,
                        BetStatus::Lost => lost += 1,
                        BetStatus::Active => {}
                    }
                    net += profit;
                }
                self.records.push(RoundRecord {
                    round_id: snap.round_id,
                    crash_point: snap.multiplier,
                    running_ms: now.saturating_sub(started).as_millis() as u64,
                    bets_won: won,
                    bets_lost: lost,
                    net_profit: net,
                });
            }
            Phase::Waiting => {}
        }

        Some(PhaseChange {
            round_id: snap.round_id,
            from,
            to: snap.phase,
        })
    }
}

/// JSON document written at the end of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub provider: ProviderSpec,
    pub rounds: Vec<RoundRecord>,
    pub history: Vec<f64>,
    pub frames_drawn: u64,
    pub finished_at: String,
}

pub fn save_summary(summary: &RunSummary, path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn load_summary(path: &str) -> Result<RunSummary, Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(path)?;
    let summary: RunSummary = serde_json::from_str(&json)?;
    Ok(summary)
}
