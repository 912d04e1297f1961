use std::time::Duration;

use crate::constants::FRAME_INTERVAL_MS;

/// Per-frame redraw callback schedule, standing in for the display's refresh
/// callback. At most one frame is pending at a time.
#[derive(Debug, Clone)]
pub struct FrameLoop {
    interval: Duration,
    next_frame: Option<Duration>,
    frames: u64,
}

impl FrameLoop {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_frame: None,
            frames: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Request the first frame at `now`
    pub fn start(&mut self, now: Duration) {
        if self.next_frame.is_none() {
            self.next_frame = Some(now);
        }
    }

    pub fn is_active(&self) -> bool {
        self.next_frame.is_some()
    }

    pub fn next_frame(&self) -> Option<Duration> {
        self.next_frame
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Consume the pending frame if it is due and request the following one.
    /// Missed frames are dropped, not replayed.
    pub fn take_due(&mut self, now: Duration) -> bool {
        match self.next_frame {
            Some(at) if at <= now => {
                let mut next = at + self.interval;
                if next <= now {
                    next = now + self.interval;
                }
                self.next_frame = Some(next);
                self.frames += 1;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.next_frame = None;
    }
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new(Duration::from_millis(FRAME_INTERVAL_MS))
    }
}
