use std::time::Duration;

use crash_core::{
    BetId, Clock, CrashPointProvider, EngineError, FrameLoop, GameController, GraphRenderer,
    ManualClock, Snapshot, Subscription, Surface,
};

use crate::config::AppConfig;

/// What a single [`Session::step`] did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    pub timers_fired: usize,
    pub frame_drawn: bool,
}

/// Presentation shell: one controller, one renderer, one surface.
///
/// The renderer only sees the engine through its snapshot subscription.
pub struct Session<C: Clock, S: Surface> {
    controller: GameController<C>,
    renderer: GraphRenderer,
    feed: Subscription,
    surface: S,
    frames: FrameLoop,
    drawn: u64,
    mounted: bool,
}

impl<C: Clock, S: Surface> Session<C, S> {
    /// Build the controller, start the first round and draw the first frame
    pub fn mount(
        config: &AppConfig,
        provider: Box<dyn CrashPointProvider>,
        clock: C,
        surface: S,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let mut controller = GameController::new(config.engine.clone(), provider, clock)
            .map_err(|e| format!("Failed to create game controller: {}", e))?;
        let feed = controller.subscribe();
        controller.start();

        let mut frames = FrameLoop::new(Duration::from_millis(config.frame_interval_ms.max(1)));
        frames.start(controller.clock().now());

        let mut session = Self {
            controller,
            renderer: GraphRenderer::new(config.graph.clone()),
            feed,
            surface,
            frames,
            drawn: 0,
            mounted: true,
        };
        session.step();
        tracing::info!("Session mounted");
        Ok(session)
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn controller(&self) -> &GameController<C> {
        &self.controller
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn snapshot(&self) -> Snapshot {
        self.controller.snapshot()
    }

    /// Frames that reached the surface
    pub fn frames_drawn(&self) -> u64 {
        self.drawn
    }

    /// Frame callbacks that came due, drawn or not
    pub fn frames_scheduled(&self) -> u64 {
        self.frames.frames()
    }

    pub fn now(&self) -> Duration {
        self.controller.clock().now()
    }

    pub fn place_bet(&mut self, player: &str, amount: f64) -> Result<BetId, EngineError> {
        self.controller.place_bet(player, amount)
    }

    pub fn cash_out(&mut self, id: BetId) -> Result<f64, EngineError> {
        self.controller.cash_out(id)
    }

    /// Container resized; the next frame uses the new size
    pub fn resize(&mut self, width: f64, height: f64) {
        self.surface.resize(width, height);
        tracing::debug!("Surface resized to {}x{}", width, height);
    }

    /// Fire due engine timers, then redraw if a frame is due
    pub fn step(&mut self) -> StepReport {
        if !self.mounted {
            return StepReport::default();
        }
        let timers_fired = self.controller.run_pending();

        let mut frame_drawn = false;
        if self.frames.take_due(self.now()) {
            if let Some(view) = self.feed.latest().map(|s| s.view()) {
                frame_drawn = self.renderer.render(&view, &mut self.surface);
            }
            if frame_drawn {
                self.drawn += 1;
            }
        }
        StepReport {
            timers_fired,
            frame_drawn,
        }
    }

    /// Earliest instant at which `step` has work to do
    pub fn next_wakeup(&self) -> Option<Duration> {
        if !self.mounted {
            return None;
        }
        match (self.controller.next_deadline(), self.frames.next_frame()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Engine timers plus the pending frame callback
    pub fn pending_callbacks(&self) -> usize {
        self.controller.pending_timers() + usize::from(self.frames.is_active())
    }

    /// Step until `done` returns true or nothing is left to wait for.
    /// `wait` is handed the time until the next wakeup.
    pub fn run_until<D, W>(&mut self, mut done: D, mut wait: W)
    where
        D: FnMut(&mut Self) -> bool,
        W: FnMut(Duration),
    {
        loop {
            self.step();
            if done(self) {
                break;
            }
            let Some(next) = self.next_wakeup() else {
                break;
            };
            let now = self.now();
            if next > now {
                wait(next - now);
            }
        }
    }

    /// Stop the engine's timer chain, then the frame loop
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.controller.shutdown();
        self.frames.cancel();
        self.mounted = false;
        tracing::info!(
            "Session unmounted after {} frames ({} drawn)",
            self.frames.frames(),
            self.drawn
        );
    }
}

impl<S: Surface> Session<ManualClock, S> {
    /// Move manual time forward, running every timer and frame on the way
    pub fn advance_by(&mut self, by: Duration) {
        let clock = self.controller.clock().clone();
        let target = clock.now() + by;
        while let Some(at) = self.next_wakeup() {
            if at > target {
                break;
            }
            clock.set(at);
            self.step();
        }
        clock.set(target);
    }
}

impl<C: Clock, S: Surface> Drop for Session<C, S> {
    fn drop(&mut self) {
        self.unmount();
    }
}
