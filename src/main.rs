use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tombola::config::Config;
use tombola::metrics::DrawMetrics;
use tombola::prng::shorten_seed;
use tombola::uniformity::bucket_samples;
use tombola::{verify, Lottery, LotteryInput, LotteryResult, Packet, Participant, SeededRandom};

const USAGE: &str = "Usage: tombola <json_file>
       tombola --create-example
       tombola --verify <results_json>
       tombola --prng-check [seed]";

const DEFAULT_CHECK_SEED: &str = "test_seed_123";
const CHECK_SAMPLES: usize = 1_000_000;

/// Leveled stderr output, filtered by `LOG_LEVEL`.
struct Log {
    debug: bool,
    quiet: bool,
}

impl Log {
    fn new(config: &Config) -> Self {
        Self {
            debug: config.debug_enabled(),
            quiet: matches!(config.log_level.as_str(), "warn" | "error"),
        }
    }
    fn debug(&self, msg: &str) {
        if self.debug { eprintln!("[DEBUG] {}", msg); }
    }
    fn info(&self, msg: &str) {
        if !self.quiet { eprintln!("[INFO] {}", msg); }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    config.validate()?;
    let log = Log::new(&config);
    log.debug(&format!("config: {:?}", config));

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    match args.as_slice() {
        ["--help"] => {
            println!("{}", USAGE);
            Ok(())
        }
        ["--create-example"] => create_example(),
        ["--verify", path] => verify_file(Path::new(path), &log).await,
        ["--prng-check"] => prng_check(DEFAULT_CHECK_SEED),
        ["--prng-check", seed] => prng_check(seed),
        [path] if !path.starts_with("--") => draw_file(Path::new(path), &config, &log).await,
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(1);
        }
    }
}

async fn draw_file(path: &Path, config: &Config, log: &Log) -> Result<()> {
    let input: LotteryInput = read_json(path)?;
    log.info(&format!("loaded {} packet(s) from {}", input.packets.len(), path.display()));

    let metrics = Arc::new(DrawMetrics::new());
    let mut lottery = Lottery::new(input)
        .with_seed_bytes(config.seed_bytes)
        .with_metrics(metrics.clone());
    lottery.initialize().await?;
    let result = lottery.draw();

    if config.metrics_enabled {
        eprint!("{}", metrics.export()?);
    }
    let result = result?;

    println!("{}", result.title);
    match result.epoch_seconds() {
        Some(epoch) => println!("Zeitpunkt: {} ({})", result.timestamp, epoch),
        None => println!("Zeitpunkt: {}", result.timestamp),
    }
    println!("Gezogen: {}", result.drawing_timestamp);
    println!("Seed: {}", shorten_seed(&result.rng_seed));
    println!();
    for drawing in &result.drawings {
        let participants: Vec<String> = drawing
            .participants
            .iter()
            .map(|p| format!("{} ({})", p.name, p.tickets))
            .collect();
        println!("{}: {} → {}", drawing.text, participants.join(", "), drawing.winner);
    }
    println!();
    println!("Fingerprint: {}", result.fingerprint());

    let json = serde_json::to_string_pretty(&result)?;
    if config.debug_result {
        eprintln!("[DEBUG] result: {}", json);
    }
    let out = results_path(path, config.output_dir.as_deref());
    std::fs::write(&out, json).with_context(|| format!("writing {}", out.display()))?;
    println!("\nErgebnisse wurden in {} gespeichert.", out.display());
    Ok(())
}

async fn verify_file(path: &Path, log: &Log) -> Result<()> {
    let result: LotteryResult = read_json(path)?;
    log.info(&format!("replaying {} drawing(s) with seed {}", result.drawings.len(), shorten_seed(&result.rng_seed)));

    let check = verify(&result).await?;
    for m in &check.mismatches {
        eprintln!(
            "[ERROR] Paket #{} {}: claimed {}, recomputed {}",
            m.index + 1, m.title, m.claimed, m.recomputed
        );
    }
    if !check.is_valid() {
        bail!("{} of {} drawing(s) do not match seed {}", check.mismatches.len(), check.drawings, check.seed);
    }
    println!("OK: all {} drawing(s) match seed {}", check.drawings, check.seed);
    println!("Fingerprint: {}", result.fingerprint());
    Ok(())
}

fn prng_check(seed: &str) -> Result<()> {
    println!("Seed: {}", seed);
    println!("Generating {} random numbers...\n", CHECK_SAMPLES);
    let mut rng = SeededRandom::derive(seed)?;
    let report = bucket_samples(&mut rng, CHECK_SAMPLES, 10)?;
    print!("{}", report.render());
    Ok(())
}

fn create_example() -> Result<()> {
    let names = ["@obsd_guru", "@tuti", "@Cobalt60", "@gnupublic"];
    let example = LotteryInput {
        title: "Classic Computing Tombola 2024".into(),
        timestamp: Some("2024-03-20T15:00:00+01:00".into()),
        packets: vec![
            Packet {
                title: "Paket #1 SS2".into(),
                participants: names
                    .iter()
                    .map(|&n| Participant::new(n, if n == "@tuti" { 2 } else { 1 }))
                    .collect(),
            },
            Packet {
                title: "Paket #2 SS10".into(),
                participants: names.iter().map(|&n| Participant::new(n, 1)).collect(),
            },
        ],
    };
    let path = "example_lottery.json";
    std::fs::write(path, serde_json::to_string_pretty(&example)?)
        .with_context(|| format!("writing {}", path))?;
    println!("Created {}", path);
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("{} contains invalid JSON", path.display()))
}

fn results_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let stem = input.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_else(|| "lottery".into());
    let dir = output_dir
        .map(Path::to_path_buf)
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    dir.join(format!("{}-results.json", stem))
}
