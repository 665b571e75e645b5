//! Seeded uniform generator.
//!
//! Seeded streams use the Park-Miller minimal standard recurrence:
//! `state = state * 16807 mod (2^31 - 1)`, output `state / (2^31 - 1)`.
//! Unseeded streams delegate to the thread-local OS-seeded source from `rand`.

use crate::error::{Error, Result};

/// Modulus of the recurrence (2^31 - 1).
pub const MODULUS: u64 = 2_147_483_647;

/// Multiplier of the recurrence (7^5).
pub const MULTIPLIER: u64 = 16_807;

/// A serial stream of uniform draws.
///
/// One instance per sampling session. The state is a serial stream, so an
/// instance must not be shared between concurrent callers.
#[derive(Clone, Debug)]
pub struct SeededRng {
    seed: Option<u64>,
    /// Seed reduced modulo [`MODULUS`], so `current * MULTIPLIER` fits in a `u64`.
    initial: u64,
    current: u64,
}

impl SeededRng {
    /// Create a deterministic stream.
    ///
    /// Seeds congruent to 0 modulo 2^31 - 1 are fixed points of the recurrence
    /// and are rejected. Any other seed yields the same stream as its residue.
    pub fn seeded(seed: u64) -> Result<Self> {
        let initial = seed % MODULUS;
        if initial == 0 {
            return Err(Error::ZeroSeed(seed));
        }
        Ok(SeededRng {
            seed: Some(seed),
            initial,
            current: initial,
        })
    }

    /// Create a stream backed by the non-deterministic source.
    pub fn unseeded() -> Self {
        SeededRng {
            seed: None,
            initial: 0,
            current: 0,
        }
    }

    /// Seeded when `seed` is present, unseeded otherwise.
    pub fn from_seed(seed: Option<u64>) -> Result<Self> {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Ok(Self::unseeded()),
        }
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn is_seeded(&self) -> bool {
        self.seed.is_some()
    }

    /// Next uniform draw.
    ///
    /// Seeded draws lie in (0, 1); unseeded draws lie in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        if self.seed.is_none() {
            return rand::random::<f64>();
        }
        self.current = (self.current * MULTIPLIER) % MODULUS;
        self.current as f64 / MODULUS as f64
    }

    /// Rewind to the initial seed for repeatable replay. No-op when unseeded.
    pub fn reset(&mut self) {
        if self.seed.is_some() {
            self.current = self.initial;
        }
    }

    /// Standard normal draw scaled to `mean`/`std_dev` (Box-Muller, cosine branch).
    ///
    /// Consumes exactly two draws from the stream unless one of them is 0,
    /// in which case that draw is repeated.
    pub fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        let mut u = 0.0;
        while u == 0.0 {
            u = self.next_f64();
        }
        let mut v = 0.0;
        while v == 0.0 {
            v = self.next_f64();
        }
        let z = (-2.0 * u.ln()).sqrt() * (2.0 * std::f64::consts::PI * v).cos();
        z * std_dev + mean
    }
}
