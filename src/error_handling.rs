use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LotteryError {
    #[error("Invalid seed: {0}")]
    InvalidSeed(String),
    #[error("Packet #{} ({title:?}) has no participants", .index + 1)]
    EmptyPacket { index: usize, title: String },
    #[error("Packet #{} ({title:?}) has a total ticket weight of zero", .index + 1)]
    ZeroWeight { index: usize, title: String },
    #[error("Ordering violation: {0}")]
    OrderingViolation(String),
    #[error("Invalid timestamp {0:?}: expected ISO-8601 with a UTC offset")]
    InvalidTimestamp(String),
}

impl LotteryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LotteryError::InvalidSeed(_) => ErrorKind::Seed,
            LotteryError::EmptyPacket { .. } | LotteryError::ZeroWeight { .. } => ErrorKind::Packet,
            LotteryError::OrderingViolation(_) => ErrorKind::Ordering,
            LotteryError::InvalidTimestamp(_) => ErrorKind::Input,
        }
    }
}

/// Coarse error classes, used as metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Seed,
    Packet,
    Ordering,
    Input,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Seed => write!(f, "seed"),
            ErrorKind::Packet => write!(f, "packet"),
            ErrorKind::Ordering => write!(f, "ordering"),
            ErrorKind::Input => write!(f, "input"),
        }
    }
}
