use sha2::{Digest, Sha256};

use crate::constants::{FIXED_CRASH_POINT, HOUSE_EDGE_BPS, MAX_SAMPLED_CRASH};

/// Source of crash points, asked once per round before growth begins.
///
/// Implementations must return a finite value >= 1.0.
pub trait CrashPointProvider {
    fn next_crash_point(&mut self) -> f64;
}

impl<F> CrashPointProvider for F
where
    F: FnMut() -> f64,
{
    fn next_crash_point(&mut self) -> f64 {
        self()
    }
}

/// Same crash point every round
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedCrashPoint(pub f64);

impl Default for FixedCrashPoint {
    fn default() -> Self {
        FixedCrashPoint(FIXED_CRASH_POINT)
    }
}

impl CrashPointProvider for FixedCrashPoint {
    fn next_crash_point(&mut self) -> f64 {
        self.0
    }
}

/// Exponential-distribution sampler driven by a SHA-256 stream.
///
/// Round `n` draws from SHA256(seed || n as u64 LE). The first four bytes give
/// `u` in [0, 1], mapped to `(1 - edge) / (1 - 0.99 * u)`, floored to cents and
/// clamped to [1.00, 100.00]. Deterministic for a given seed.
#[derive(Debug, Clone)]
pub struct HashedCrashPoints {
    seed: [u8; 32],
    round: u64,
    house_edge_bps: u16,
}

impl HashedCrashPoints {
    pub fn new(seed: [u8; 32]) -> Self {
        Self::with_house_edge(seed, HOUSE_EDGE_BPS)
    }

    pub fn with_house_edge(seed: [u8; 32], house_edge_bps: u16) -> Self {
        Self {
            seed,
            round: 0,
            house_edge_bps: house_edge_bps.min(9_999),
        }
    }

    /// Number of values drawn so far
    pub fn rounds_drawn(&self) -> u64 {
        self.round
    }

    fn draw(&self, round: u64) -> u32 {
        let mut h = Sha256::new();

        // seed (32 bytes) || round (8 bytes LE)
        h.update(self.seed);
        h.update(round.to_le_bytes());

        let out = h.finalize();
        let mut word = [0u8; 4];
        word.copy_from_slice(&out[..4]);
        u32::from_le_bytes(word)
    }
}

impl CrashPointProvider for HashedCrashPoints {
    fn next_crash_point(&mut self) -> f64 {
        let raw = self.draw(self.round);
        self.round += 1;
        sample_crash_point(raw, self.house_edge_bps)
    }
}

/// Map a uniform 32-bit draw onto the crash distribution
pub fn sample_crash_point(raw: u32, house_edge_bps: u16) -> f64 {
    let u = raw as f64 / u32::MAX as f64;
    let edge_factor = 1.0 - house_edge_bps as f64 / 10_000.0;
    let value = edge_factor / (1.0 - 0.99 * u);
    let cents = (value * 100.0).floor() / 100.0;
    cents.clamp(1.0, MAX_SAMPLED_CRASH)
}
