use serde::Serialize;

use crate::error_handling::LotteryError;
use crate::prng::SeededRandom;

/// Critical chi-square value for 9 degrees of freedom at the 0.05 level.
pub const CHI_SQUARE_CRITICAL_9DF: f64 = 16.92;

#[derive(Debug, Clone, Serialize)]
pub struct BucketReport {
    pub seed: String,
    pub samples: usize,
    pub buckets: Vec<u64>,
    pub expected_per_bucket: f64,
    pub max_deviation: f64,
    pub max_deviation_bucket: usize,
    pub chi_square: f64,
}

impl BucketReport {
    pub fn is_uniform(&self) -> bool {
        self.chi_square < CHI_SQUARE_CRITICAL_9DF
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("Bucket | Count    | Expected | Difference | % of Expected\n");
        out.push_str("-------|----------|----------|------------|--------------\n");
        for (i, &count) in self.buckets.iter().enumerate() {
            let diff = count as f64 - self.expected_per_bucket;
            out.push_str(&format!(
                "{:>5} | {:>8} | {:>8.0} | {:>10.0} | {:>12.2}%\n",
                i,
                count,
                self.expected_per_bucket,
                diff,
                count as f64 / self.expected_per_bucket * 100.0
            ));
        }
        out.push_str(&format!(
            "\nMaximum deviation: {:.0} ({:.2}%) in bucket {}\n",
            self.max_deviation,
            self.max_deviation / self.expected_per_bucket * 100.0,
            self.max_deviation_bucket
        ));
        out.push_str(&format!("Chi-square statistic: {:.2}\n", self.chi_square));
        out.push_str(&format!(
            "Chi-square critical value (0.05 significance): {:.2}\n",
            CHI_SQUARE_CRITICAL_9DF
        ));
        out.push_str(&format!(
            "Distribution is {} at 0.05 significance level\n",
            if self.is_uniform() { "uniform" } else { "not uniform" }
        ));
        out
    }
}

/// Pearson's statistic for observed counts against expected counts.
pub fn chi_square(observed: &[u64], expected: &[f64]) -> f64 {
    observed
        .iter()
        .zip(expected)
        .map(|(&o, &e)| {
            let d = o as f64 - e;
            d * d / e
        })
        .sum()
}

/// Buckets `samples` draws from `rng` into `buckets` equal-width bins.
pub fn bucket_samples(
    rng: &mut SeededRandom,
    samples: usize,
    buckets: usize,
) -> Result<BucketReport, LotteryError> {
    let buckets = buckets.max(1);
    let mut counts = vec![0u64; buckets];
    for _ in 0..samples {
        let u = rng.try_next()?;
        let idx = ((u * buckets as f64) as usize).min(buckets - 1);
        counts[idx] += 1;
    }

    let expected_per_bucket = samples as f64 / buckets as f64;
    let (max_deviation_bucket, max_deviation) = counts
        .iter()
        .map(|&c| (c as f64 - expected_per_bucket).abs())
        .enumerate()
        .fold((0, 0.0), |best, (i, d)| if d > best.1 { (i, d) } else { best });
    let chi = chi_square(&counts, &vec![expected_per_bucket; buckets]);

    Ok(BucketReport {
        seed: rng.seed().to_string(),
        samples,
        buckets: counts,
        expected_per_bucket,
        max_deviation,
        max_deviation_bucket,
        chi_square: chi,
    })
}
