use std::time::Duration;

use crate::clock::{Clock, ManualClock};
use crate::engine::{EngineConfig, EngineError, GameEngine, Subscription, TickOutcome};
use crate::provider::CrashPointProvider;
use crate::scheduler::Scheduler;
use crate::types::{BetId, Phase, Snapshot};

/// Timers that drive the round chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineTimer {
    /// Pre-round delay elapsed; growth begins
    RoundStart,
    GrowthTick,
    /// Post-crash delay elapsed; the next round enters Waiting
    NextRound,
}

/// Owns the engine, its timers and its clock.
///
/// Nothing runs on its own: the caller polls with [`run_pending`](Self::run_pending)
/// (real time) or [`advance_by`](Self::advance_by) (manual time).
pub struct GameController<C: Clock> {
    engine: GameEngine,
    timers: Scheduler<EngineTimer>,
    clock: C,
    started: bool,
}

impl<C: Clock> GameController<C> {
    pub fn new(
        config: EngineConfig,
        provider: Box<dyn CrashPointProvider>,
        clock: C,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            engine: GameEngine::new(config, provider),
            timers: Scheduler::new(),
            clock,
            started: false,
        })
    }

    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn phase(&self) -> Phase {
        self.engine.phase()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.engine.snapshot()
    }

    pub fn subscribe(&mut self) -> Subscription {
        self.engine.subscribe()
    }

    pub fn place_bet(&mut self, player: &str, amount: f64) -> Result<BetId, EngineError> {
        self.engine.place_bet(player, amount)
    }

    pub fn cash_out(&mut self, id: BetId) -> Result<f64, EngineError> {
        self.engine.cash_out(id)
    }

    pub fn is_running(&self) -> bool {
        self.started && !self.engine.is_torn_down()
    }

    /// Warm the history and schedule the first round. Later calls are no-ops.
    pub fn start(&mut self) {
        if self.started || self.engine.is_torn_down() {
            return;
        }
        self.started = true;
        self.engine.warm_up();
        let now = self.clock.now();
        self.start_round(now);
    }

    fn start_round(&mut self, now: Duration) {
        self.engine.begin_waiting();
        let delay = self.engine.config().pre_round_delay();
        self.timers.schedule(now + delay, EngineTimer::RoundStart);
    }

    fn fire(&mut self, timer: EngineTimer, now: Duration) {
        match timer {
            EngineTimer::RoundStart => {
                self.engine.begin_running(now);
                let tick = self.engine.config().tick_interval();
                self.timers.schedule(now + tick, EngineTimer::GrowthTick);
            }
            EngineTimer::GrowthTick => match self.engine.tick(now) {
                TickOutcome::Grew(_) => {
                    let tick = self.engine.config().tick_interval();
                    self.timers.schedule(now + tick, EngineTimer::GrowthTick);
                }
                TickOutcome::Crashed(_) => {
                    let delay = self.engine.config().post_crash_delay();
                    self.timers.schedule(now + delay, EngineTimer::NextRound);
                }
                TickOutcome::Ignored => {}
            },
            EngineTimer::NextRound => self.start_round(now),
        }
    }

    /// Fire every timer due at the clock's current time. Returns how many fired.
    pub fn run_pending(&mut self) -> usize {
        if self.engine.is_torn_down() {
            return 0;
        }
        let now = self.clock.now();
        let mut fired = 0;
        while let Some((_, timer)) = self.timers.pop_due(now) {
            self.fire(timer, now);
            fired += 1;
        }
        fired
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    /// Cancel the whole timer chain and tear the engine down
    pub fn shutdown(&mut self) {
        if self.engine.is_torn_down() {
            return;
        }
        self.timers.cancel_all();
        self.engine.tear_down();
        tracing::info!("Game controller shut down after round {}", self.engine.round_id());
    }
}

impl GameController<ManualClock> {
    /// Move manual time forward by `by`, firing each due timer with the clock
    /// set to that timer's deadline
    pub fn advance_by(&mut self, by: Duration) {
        let target = self.clock.now() + by;
        while let Some(at) = self.timers.next_deadline() {
            if at > target {
                break;
            }
            self.clock.set(at);
            self.run_pending();
        }
        self.clock.set(target);
    }
}
