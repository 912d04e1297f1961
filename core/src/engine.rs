use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::provider::CrashPointProvider;
use crate::types::{axis_max, Bet, BetId, BetStatus, Phase, Snapshot};

/// Tunable timing and growth parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub pre_round_delay_ms: u64,
    pub post_crash_delay_ms: u64,
    pub tick_interval_ms: u64,
    pub base_rate: f64,
    pub growth_exponent: f64,
    pub history_limit: usize,
    pub warmup_rounds: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pre_round_delay_ms: PRE_ROUND_DELAY_MS,
            post_crash_delay_ms: POST_CRASH_DELAY_MS,
            tick_interval_ms: TICK_INTERVAL_MS,
            base_rate: BASE_RATE,
            growth_exponent: GROWTH_EXPONENT,
            history_limit: HISTORY_LIMIT,
            warmup_rounds: WARMUP_ROUNDS,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.tick_interval_ms == 0 {
            return Err(EngineError::InvalidConfig("tick_interval_ms must be > 0".into()));
        }
        if !(self.base_rate.is_finite() && self.base_rate > 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "base_rate must be finite and > 0, got {}",
                self.base_rate
            )));
        }
        if !self.growth_exponent.is_finite() {
            return Err(EngineError::InvalidConfig(format!(
                "growth_exponent must be finite, got {}",
                self.growth_exponent
            )));
        }
        if self.history_limit == 0 || self.history_limit > MAX_HISTORY_LIMIT {
            return Err(EngineError::InvalidConfig(format!(
                "history_limit must be in 1..={}, got {}",
                MAX_HISTORY_LIMIT, self.history_limit
            )));
        }
        Ok(())
    }

    pub fn pre_round_delay(&self) -> Duration {
        Duration::from_millis(self.pre_round_delay_ms)
    }

    pub fn post_crash_delay(&self) -> Duration {
        Duration::from_millis(self.post_crash_delay_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    InvalidConfig(String),
    NotAcceptingBets(Phase),
    InvalidAmount(f64),
    UnknownBet(BetId),
    BetNotActive(BetId),
    NotRunning(Phase),
    TornDown,
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::InvalidConfig(msg) => write!(f, "Invalid engine config: {}", msg),
            EngineError::NotAcceptingBets(phase) => {
                write!(f, "Bets are only accepted while waiting (phase: {})", phase)
            }
            EngineError::InvalidAmount(amount) => {
                write!(f, "Invalid bet amount: {} (must be finite and > 0)", amount)
            }
            EngineError::UnknownBet(id) => write!(f, "Unknown bet id: {}", id),
            EngineError::BetNotActive(id) => write!(f, "Bet {} is already settled", id),
            EngineError::NotRunning(phase) => {
                write!(f, "Cash-out requires a running round (phase: {})", phase)
            }
            EngineError::TornDown => write!(f, "Engine has been torn down"),
        }
    }
}

impl std::error::Error for EngineError {}

/// Result of a growth tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    Grew(f64),
    Crashed(f64),
    /// Tick arrived outside the Running phase
    Ignored,
}

/// Receiving end of the engine's snapshot feed
#[derive(Debug)]
pub struct Subscription {
    rx: Receiver<Snapshot>,
    last: Option<Snapshot>,
}

impl Subscription {
    /// Newest published snapshot, or the last one seen if nothing new arrived
    pub fn latest(&mut self) -> Option<&Snapshot> {
        if let Some(s) = self.rx.try_iter().last() {
            self.last = Some(s);
        }
        self.last.as_ref()
    }

    /// Every snapshot published since the previous call, oldest first
    pub fn drain(&mut self) -> Vec<Snapshot> {
        let all: Vec<Snapshot> = self.rx.try_iter().collect();
        if let Some(s) = all.last() {
            self.last = Some(s.clone());
        }
        all
    }
}

/// Round state and multiplier growth. Time is supplied by the caller; the
/// controller owns the timers that drive these transitions.
pub struct GameEngine {
    config: EngineConfig,
    provider: Box<dyn CrashPointProvider>,
    phase: Phase,
    round_id: u64,
    multiplier: f64,
    crash_point: f64,
    last_update: Duration,
    history: VecDeque<f64>,
    bets: Vec<Bet>,
    next_bet_id: BetId,
    subscribers: Vec<Sender<Snapshot>>,
    torn_down: bool,
}

impl GameEngine {
    pub fn new(config: EngineConfig, provider: Box<dyn CrashPointProvider>) -> Self {
        Self {
            history: VecDeque::new(),
            config,
            provider,
            phase: Phase::Waiting,
            round_id: 0,
            multiplier: 1.0,
            crash_point: 1.0,
            last_update: Duration::ZERO,
            bets: Vec::new(),
            next_bet_id: 1,
            subscribers: Vec::new(),
            torn_down: false,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn round_id(&self) -> u64 {
        self.round_id
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn crash_point(&self) -> f64 {
        self.crash_point
    }

    pub fn history(&self) -> impl Iterator<Item = f64> + '_ {
        self.history.iter().copied()
    }

    pub fn bets(&self) -> &[Bet] {
        &self.bets
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            round_id: self.round_id,
            phase: self.phase,
            multiplier: self.multiplier,
            max_multiplier: axis_max(self.multiplier),
            crashed: self.phase == Phase::Crashed,
            history: self.history.iter().copied().collect(),
            bets: self.bets.clone(),
        }
    }

    /// Register a new observer; it immediately receives the current state
    pub fn subscribe(&mut self) -> Subscription {
        let (tx, rx) = mpsc::channel();
        let _ = tx.send(self.snapshot());
        if !self.torn_down {
            self.subscribers.push(tx);
        }
        Subscription { rx, last: None }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    fn publish(&mut self) {
        if self.subscribers.is_empty() {
            return;
        }
        let snap = self.snapshot();
        self.subscribers.retain(|tx| tx.send(snap.clone()).is_ok());
    }

    fn record(&mut self, crash_value: f64) {
        while self.history.len() >= self.config.history_limit {
            self.history.pop_front();
        }
        self.history.push_back(crash_value);
    }

    fn draw_crash_point(&mut self) -> f64 {
        let raw = self.provider.next_crash_point();
        if raw.is_finite() && raw >= 1.0 {
            return raw;
        }
        tracing::warn!("Crash point provider returned {}; clamping to 1.0", raw);
        1.0
    }

    /// Fill history with provider values so the first frame has context
    pub fn warm_up(&mut self) {
        if self.torn_down {
            return;
        }
        for _ in 0..self.config.warmup_rounds {
            let v = self.draw_crash_point();
            self.record(v);
        }
        tracing::debug!("Warmed history with {} rounds", self.config.warmup_rounds);
        self.publish();
    }

    /// Enter Waiting for a fresh round: reset the multiplier, clear last
    /// round's bets and fix the crash point before any growth happens
    pub fn begin_waiting(&mut self) {
        if self.torn_down {
            return;
        }
        self.round_id += 1;
        self.phase = Phase::Waiting;
        self.multiplier = 1.0;
        self.bets.clear();
        self.crash_point = self.draw_crash_point();
        tracing::info!("Round {} waiting", self.round_id);
        tracing::debug!("Round {} crash point fixed", self.round_id);
        self.publish();
    }

    pub fn begin_running(&mut self, now: Duration) {
        if self.torn_down || self.phase != Phase::Waiting {
            return;
        }
        self.phase = Phase::Running;
        self.last_update = now;
        tracing::info!(
            "Round {} running with {} active bets",
            self.round_id,
            self.bets.len()
        );
        self.publish();
    }

    /// Advance the multiplier by the elapsed time since the previous tick and
    /// crash the round once it reaches the crash point
    pub fn tick(&mut self, now: Duration) -> TickOutcome {
        if self.torn_down || self.phase != Phase::Running {
            return TickOutcome::Ignored;
        }

        let delta = now.saturating_sub(self.last_update).as_secs_f64();
        self.last_update = now;

        let rate = self.config.base_rate * self.multiplier.powf(self.config.growth_exponent);
        let next = self.multiplier + rate * delta;

        if next >= self.crash_point {
            self.crash();
            return TickOutcome::Crashed(self.multiplier);
        }

        self.multiplier = next;
        self.publish();
        TickOutcome::Grew(next)
    }

    fn crash(&mut self) {
        let crash_value = self.crash_point;
        self.multiplier = crash_value;
        self.phase = Phase::Crashed;
        self.record(crash_value);

        let mut lost = 0usize;
        for bet in self.bets.iter_mut().filter(|b| b.status == BetStatus::Active) {
            bet.lose(crash_value);
            lost += 1;
        }

        tracing::info!(
            "Round {} crashed at {:.2}x ({} bets lost)",
            self.round_id,
            crash_value,
            lost
        );
        self.publish();
    }

    pub fn place_bet(&mut self, player: &str, amount: f64) -> Result<BetId, EngineError> {
        if self.torn_down {
            return Err(EngineError::TornDown);
        }
        if self.phase != Phase::Waiting {
            return Err(EngineError::NotAcceptingBets(self.phase));
        }
        if !(amount.is_finite() && amount > 0.0) {
            return Err(EngineError::InvalidAmount(amount));
        }

        let id = self.next_bet_id;
        self.next_bet_id += 1;
        self.bets.push(Bet::new(id, player, amount));
        tracing::debug!("Bet {} placed by {} for {}", id, player, amount);
        self.publish();
        Ok(id)
    }

    /// Settle an active bet at the current multiplier. Returns the payout.
    pub fn cash_out(&mut self, id: BetId) -> Result<f64, EngineError> {
        if self.torn_down {
            return Err(EngineError::TornDown);
        }
        let phase = self.phase;
        let multiplier = self.multiplier;
        let bet = self
            .bets
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(EngineError::UnknownBet(id))?;
        if bet.status != BetStatus::Active {
            return Err(EngineError::BetNotActive(id));
        }
        if phase != Phase::Running {
            return Err(EngineError::NotRunning(phase));
        }

        bet.win(multiplier);
        let payout = bet.amount * multiplier;
        tracing::debug!("Bet {} cashed out at {:.2}x", id, multiplier);
        self.publish();
        Ok(payout)
    }

    /// Stop publishing and refuse further transitions
    pub fn tear_down(&mut self) {
        self.torn_down = true;
        self.subscribers.clear();
    }
}
