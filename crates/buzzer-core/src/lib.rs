pub mod config;
pub mod error;
pub mod gate;
pub mod player;
pub mod pwm;
pub mod queue;
pub mod tone;

#[cfg(test)]
mod testing;

pub use config::BuzzerConfig;
pub use error::PlayerError;
pub use player::{ToneBuzzer, WorkerState};
pub use pwm::{ChannelConfig, PwmDriver};
pub use tone::{Melody, Note, ToneRequest};
