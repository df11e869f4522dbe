use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,
    pub tickets: u32,
}

impl Participant {
    pub fn new(name: impl Into<String>, tickets: u32) -> Self {
        Self { name: name.into(), tickets }
    }
}

/// One prize and the people holding tickets for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Packet {
    pub title: String,
    pub participants: Vec<Participant>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotteryInput {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub packets: Vec<Packet>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawingResult {
    pub text: String,
    pub participants: Vec<Participant>,
    pub winner: String,
}

// Field order is part of the disclosed format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotteryResult {
    pub title: String,
    pub timestamp: String,
    /// When the draw actually ran, independent of the announced `timestamp`.
    #[serde(rename = "drawingTimestamp")]
    pub drawing_timestamp: String,
    #[serde(rename = "rngSeed")]
    pub rng_seed: String,
    pub drawings: Vec<DrawingResult>,
}

impl LotteryResult {
    /// BLAKE3 over the compact JSON of `drawings`, hex encoded.
    pub fn fingerprint(&self) -> String {
        // Vec of plain structs cannot fail to serialize.
        let json = serde_json::to_vec(&self.drawings).unwrap_or_default();
        blake3::hash(&json).to_hex().to_string()
    }

    /// Unix seconds of the announced `timestamp`, if it parses.
    pub fn epoch_seconds(&self) -> Option<i64> {
        chrono::DateTime::parse_from_rfc3339(&self.timestamp).ok().map(|dt| dt.timestamp())
    }

    /// Rebuilds the input this result was drawn from.
    pub fn to_input(&self) -> LotteryInput {
        LotteryInput {
            title: self.title.clone(),
            timestamp: Some(self.timestamp.clone()),
            packets: self
                .drawings
                .iter()
                .map(|d| Packet { title: d.text.clone(), participants: d.participants.clone() })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> LotteryResult {
        LotteryResult {
            title: "Tombola".into(),
            timestamp: "2024-03-20T15:00:00+01:00".into(),
            drawing_timestamp: "2024-03-20T15:02:11.417Z".into(),
            rng_seed: "00ff".into(),
            drawings: vec![DrawingResult {
                text: "Paket #1 SS2".into(),
                participants: vec![Participant::new("@tuti", 2), Participant::new("@Cobalt60", 1)],
                winner: "@tuti".into(),
            }],
        }
    }

    #[test]
    fn result_serializes_with_stable_field_order() {
        let json = serde_json::to_string(&sample_result()).unwrap();
        assert_eq!(
            json,
            r#"{"title":"Tombola","timestamp":"2024-03-20T15:00:00+01:00","drawingTimestamp":"2024-03-20T15:02:11.417Z","rngSeed":"00ff","drawings":[{"text":"Paket #1 SS2","participants":[{"name":"@tuti","tickets":2},{"name":"@Cobalt60","tickets":1}],"winner":"@tuti"}]}"#
        );
    }

    #[test]
    fn input_timestamp_is_optional() {
        let input: LotteryInput = serde_json::from_str(
            r#"{"title":"T","packets":[{"title":"P1","participants":[{"name":"a","tickets":1}]}]}"#,
        )
        .unwrap();
        assert_eq!(input.timestamp, None);
        assert_eq!(input.packets[0].participants, vec![Participant::new("a", 1)]);
    }

    #[test]
    fn fingerprint_tracks_drawings_only() {
        let a = sample_result();
        let mut b = a.clone();
        b.timestamp = "2025-01-01T00:00:00Z".into();
        b.drawing_timestamp = "2025-01-01T00:00:05.000Z".into();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);

        b.drawings[0].winner = "@Cobalt60".into();
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn epoch_seconds_follow_the_offset() {
        let mut r = sample_result();
        // 15:00 at +01:00 is 14:00 UTC
        assert_eq!(r.epoch_seconds(), Some(1_710_943_200));
        r.timestamp = "2024-03-20T14:00:00Z".into();
        assert_eq!(r.epoch_seconds(), Some(1_710_943_200));
        r.timestamp = "gestern".into();
        assert_eq!(r.epoch_seconds(), None);
    }

    #[test]
    fn to_input_restores_packets() {
        let input = sample_result().to_input();
        assert_eq!(input.packets.len(), 1);
        assert_eq!(input.packets[0].title, "Paket #1 SS2");
        assert_eq!(input.packets[0].participants.len(), 2);
        assert_eq!(input.timestamp.as_deref(), Some("2024-03-20T15:00:00+01:00"));
    }
}
