use rand::rngs::OsRng;
use rand::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use sha2::{Digest, Sha256};

use crate::error_handling::LotteryError;

pub const MIN_SEED_BYTES: usize = 16;
pub const DEFAULT_SEED_BYTES: usize = 32;

#[derive(Debug, Clone)]
enum State {
    Pending,
    Ready(Xoshiro256PlusPlus),
}

/// Deterministic stream of uniform samples in [0, 1) expanded from a seed string.
///
/// Construction only stores the seed. The SHA-256 expansion runs in
/// [`SeededRandom::ready`], which works under any executor; sampling before
/// that returns `InvalidSeed`.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    seed: String,
    state: State,
}

impl SeededRandom {
    pub fn new(seed: &str) -> Result<Self, LotteryError> {
        if seed.is_empty() {
            return Err(LotteryError::InvalidSeed("seed must not be empty".into()));
        }
        Ok(Self { seed: seed.to_string(), state: State::Pending })
    }

    /// Constructs and hashes in one step, for callers without a runtime.
    pub fn derive(seed: &str) -> Result<Self, LotteryError> {
        let mut rng = Self::new(seed)?;
        rng.state = State::Ready(Xoshiro256PlusPlus::from_seed(derive_state(seed)));
        Ok(rng)
    }

    pub async fn ready(&mut self) -> Result<(), LotteryError> {
        if self.is_ready() {
            return Ok(());
        }
        // One SHA-256 over a short seed; no executor-specific work here.
        self.state = State::Ready(Xoshiro256PlusPlus::from_seed(derive_state(&self.seed)));
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, State::Ready(_))
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn try_next(&mut self) -> Result<f64, LotteryError> {
        match &mut self.state {
            State::Ready(rng) => Ok(unit_f64(rng.next_u64())),
            State::Pending => Err(LotteryError::InvalidSeed(
                "sample requested before the seed was initialized".into(),
            )),
        }
    }
}

// Top 53 bits scaled by 2^-53.
fn unit_f64(x: u64) -> f64 {
    (x >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
}

/// SHA-256 of the UTF-8 seed, used as the 256-bit generator state.
pub fn derive_state(seed: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(seed.as_bytes());
    let mut state = [0u8; 32];
    state.copy_from_slice(&hasher.finalize());
    state
}

/// Fresh hex seed from the OS CSPRNG.
pub fn generate_seed(bytes: usize) -> Result<String, LotteryError> {
    if bytes < MIN_SEED_BYTES {
        return Err(LotteryError::InvalidSeed(format!(
            "{} bytes of entropy requested, at least {} required",
            bytes, MIN_SEED_BYTES
        )));
    }
    let mut buf = vec![0u8; bytes];
    OsRng.fill_bytes(&mut buf);
    Ok(hex::encode(buf))
}

pub fn shorten_seed(seed: &str) -> String {
    let chars: Vec<char> = seed.chars().collect();
    if chars.len() <= 16 {
        return seed.to_string();
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 8..].iter().collect();
    format!("{}...{}", head, tail)
}
