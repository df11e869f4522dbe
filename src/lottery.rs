use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error_handling::LotteryError;
use crate::metrics::DrawMetrics;
use crate::prng::{generate_seed, SeededRandom, DEFAULT_SEED_BYTES};
use crate::types::{DrawingResult, LotteryInput, LotteryResult, Packet};

/// One draw request: `new` -> `initialize().await` -> `draw()`.
pub struct Lottery {
    input: LotteryInput,
    replay_seed: Option<String>,
    seed_bytes: usize,
    rng: Option<SeededRandom>,
    metrics: Option<Arc<DrawMetrics>>,
}

impl Lottery {
    pub fn new(input: LotteryInput) -> Self {
        Self {
            input,
            replay_seed: None,
            seed_bytes: DEFAULT_SEED_BYTES,
            rng: None,
            metrics: None,
        }
    }

    /// Replays a draw with a previously disclosed seed.
    pub fn with_seed(input: LotteryInput, seed: impl Into<String>) -> Self {
        let mut lottery = Self::new(input);
        lottery.replay_seed = Some(seed.into());
        lottery
    }

    pub fn with_seed_bytes(mut self, bytes: usize) -> Self {
        self.seed_bytes = bytes;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<DrawMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn seed(&self) -> Option<&str> {
        self.rng.as_ref().map(|r| r.seed())
    }

    pub async fn initialize(&mut self) -> Result<(), LotteryError> {
        let result = self.try_initialize().await;
        if let (Err(e), Some(m)) = (&result, &self.metrics) {
            m.record_error(e.kind());
        }
        result
    }

    async fn try_initialize(&mut self) -> Result<(), LotteryError> {
        if self.rng.is_some() {
            return Err(LotteryError::OrderingViolation(
                "initialize() called more than once".into(),
            ));
        }
        let seed = match &self.replay_seed {
            Some(seed) => seed.clone(),
            None => generate_seed(self.seed_bytes)?,
        };
        let mut rng = SeededRandom::new(&seed)?;
        rng.ready().await?;
        self.rng = Some(rng);
        Ok(())
    }

    /// Draws one winner per packet, in input order. Fails without a partial
    /// result if any packet cannot be drawn.
    pub fn draw(self) -> Result<LotteryResult, LotteryError> {
        let started = Instant::now();
        let metrics = self.metrics.clone();
        let result = self.run_draw();
        if let Some(m) = metrics {
            match &result {
                Ok(r) => m.record_draw(started.elapsed().as_secs_f64() * 1000.0, r.drawings.len()),
                Err(e) => m.record_failure(e.kind()),
            }
        }
        result
    }

    fn run_draw(self) -> Result<LotteryResult, LotteryError> {
        let Lottery { input, rng, .. } = self;
        let mut rng = rng.ok_or_else(|| {
            LotteryError::OrderingViolation("draw() called before initialize()".into())
        })?;

        let drawing_timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let timestamp = match input.timestamp {
            Some(ts) => {
                DateTime::parse_from_rfc3339(&ts)
                    .map_err(|_| LotteryError::InvalidTimestamp(ts.clone()))?;
                ts
            }
            None => drawing_timestamp.clone(),
        };

        // Validate everything before the first sample is consumed.
        let partitions = input
            .packets
            .iter()
            .enumerate()
            .map(|(index, packet)| CumulativeWeights::new(index, packet))
            .collect::<Result<Vec<_>, _>>()?;

        let mut drawings = Vec::with_capacity(input.packets.len());
        for (packet, weights) in input.packets.into_iter().zip(&partitions) {
            let u = rng.try_next()?;
            let winner = packet.participants[weights.select(u)].name.clone();
            drawings.push(DrawingResult {
                text: packet.title,
                participants: packet.participants,
                winner,
            });
        }

        Ok(LotteryResult {
            title: input.title,
            timestamp,
            drawing_timestamp,
            rng_seed: rng.seed().to_string(),
            drawings,
        })
    }
}

/// Prefix sums of ticket counts; participant `i` owns `[ends[i-1], ends[i])`.
#[derive(Debug, Clone)]
pub struct CumulativeWeights {
    ends: Vec<u64>,
}

impl CumulativeWeights {
    pub fn new(index: usize, packet: &Packet) -> Result<Self, LotteryError> {
        if packet.participants.is_empty() {
            return Err(LotteryError::EmptyPacket { index, title: packet.title.clone() });
        }
        let ends: Vec<u64> = packet
            .participants
            .iter()
            .scan(0u64, |acc, p| {
                *acc += p.tickets as u64;
                Some(*acc)
            })
            .collect();
        if ends.last().copied().unwrap_or(0) == 0 {
            return Err(LotteryError::ZeroWeight { index, title: packet.title.clone() });
        }
        Ok(Self { ends })
    }

    pub fn total(&self) -> u64 {
        self.ends.last().copied().unwrap_or(0)
    }

    /// Index of the participant whose interval contains `u * total`.
    pub fn select(&self, u: f64) -> usize {
        let total = self.total();
        let ticket = ((u * total as f64) as u64).min(total - 1);
        self.ends.partition_point(|&end| end <= ticket)
    }
}

/// Outcome of replaying a disclosed result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub seed: String,
    pub drawings: usize,
    pub mismatches: Vec<Mismatch>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub index: usize,
    pub title: String,
    pub claimed: String,
    pub recomputed: String,
}

impl Verification {
    pub fn is_valid(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Re-runs the draw behind `result` with its disclosed seed.
pub async fn verify(result: &LotteryResult) -> Result<Verification, LotteryError> {
    let mut lottery = Lottery::with_seed(result.to_input(), result.rng_seed.clone());
    lottery.initialize().await?;
    let replayed = lottery.draw()?;

    let mismatches = result
        .drawings
        .iter()
        .zip(&replayed.drawings)
        .enumerate()
        .filter(|(_, (claimed, recomputed))| claimed.winner != recomputed.winner)
        .map(|(index, (claimed, recomputed))| Mismatch {
            index,
            title: claimed.text.clone(),
            claimed: claimed.winner.clone(),
            recomputed: recomputed.winner.clone(),
        })
        .collect();

    Ok(Verification {
        seed: result.rng_seed.clone(),
        drawings: result.drawings.len(),
        mismatches,
    })
}
