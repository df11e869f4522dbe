pub mod types;
pub mod prng;
pub mod lottery;
pub mod uniformity;
pub mod config;
pub mod metrics;
pub mod error_handling;

pub use error_handling::LotteryError;
pub use lottery::{verify, Lottery, Verification};
pub use prng::SeededRandom;
pub use types::{DrawingResult, LotteryInput, LotteryResult, Packet, Participant};
