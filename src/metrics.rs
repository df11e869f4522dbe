use prometheus_client::{
    encoding::text::encode,
    metrics::{counter::Counter, histogram::Histogram},
    registry::Registry,
};

use crate::error_handling::ErrorKind;

/// Draw counters, exported in Prometheus text format.
///
/// Counters are registered without the `_total` suffix; the encoder adds it.
pub struct DrawMetrics {
    registry: Registry,

    draws: Counter,
    failed_draws: Counter,
    packets_drawn: Counter,
    seed_errors: Counter,
    packet_errors: Counter,
    ordering_errors: Counter,
    input_errors: Counter,

    draw_duration_ms: Histogram,
}

impl DrawMetrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let draws = Counter::default();
        let failed_draws = Counter::default();
        let packets_drawn = Counter::default();
        let seed_errors = Counter::default();
        let packet_errors = Counter::default();
        let ordering_errors = Counter::default();
        let input_errors = Counter::default();

        let draw_duration_ms = Histogram::new(
            [0.1, 0.5, 1.0, 5.0, 10.0, 50.0, 100.0, 500.0].into_iter()
        );

        registry.register("tombola_draws", "Total number of draw attempts", draws.clone());
        registry.register(
            "tombola_draws_failed",
            "Draw attempts aborted with an error",
            failed_draws.clone(),
        );
        registry.register(
            "tombola_packets_drawn",
            "Packets for which a winner was selected",
            packets_drawn.clone(),
        );
        registry.register("tombola_seed_errors", "Seed errors", seed_errors.clone());
        registry.register(
            "tombola_packet_errors",
            "Empty or zero-weight packets",
            packet_errors.clone(),
        );
        registry.register(
            "tombola_ordering_errors",
            "Lifecycle calls made out of order",
            ordering_errors.clone(),
        );
        registry.register("tombola_input_errors", "Malformed input fields", input_errors.clone());
        registry.register(
            "tombola_draw_duration_ms",
            "Duration of draws in milliseconds",
            draw_duration_ms.clone(),
        );

        Self {
            registry,
            draws,
            failed_draws,
            packets_drawn,
            seed_errors,
            packet_errors,
            ordering_errors,
            input_errors,
            draw_duration_ms,
        }
    }

    pub fn record_draw(&self, duration_ms: f64, packets: usize) {
        self.draws.inc();
        self.packets_drawn.inc_by(packets as u64);
        self.draw_duration_ms.observe(duration_ms);
    }

    pub fn record_failure(&self, kind: ErrorKind) {
        self.draws.inc();
        self.failed_draws.inc();
        self.record_error(kind);
    }

    pub fn record_error(&self, kind: ErrorKind) {
        match kind {
            ErrorKind::Seed => self.seed_errors.inc(),
            ErrorKind::Packet => self.packet_errors.inc(),
            ErrorKind::Ordering => self.ordering_errors.inc(),
            ErrorKind::Input => self.input_errors.inc(),
        };
    }

    pub fn draws(&self) -> u64 {
        self.draws.get()
    }

    pub fn failed_draws(&self) -> u64 {
        self.failed_draws.get()
    }

    pub fn packets_drawn(&self) -> u64 {
        self.packets_drawn.get()
    }

    pub fn export(&self) -> Result<String, std::fmt::Error> {
        let mut buffer = String::new();
        encode(&mut buffer, &self.registry)?;
        Ok(buffer)
    }
}

impl Default for DrawMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_successes_and_failures() {
        let m = DrawMetrics::new();
        m.record_draw(1.5, 3);
        m.record_failure(ErrorKind::Packet);
        assert_eq!(m.draws(), 2);
        assert_eq!(m.failed_draws(), 1);
        assert_eq!(m.packets_drawn(), 3);
    }

    #[test]
    fn export_uses_total_suffix() {
        let m = DrawMetrics::new();
        m.record_draw(0.2, 1);
        let text = m.export().unwrap();
        assert!(text.contains("tombola_draws_total 1"));
        assert!(text.contains("tombola_draw_duration_ms_count 1"));
    }
}
