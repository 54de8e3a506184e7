//! Board wiring for the buzzer
//!
//! Keep these in sync with `SystemPeripherals::take`.

use buzzer_core::{BuzzerConfig, ChannelConfig};

pub const BUZZER_GPIO: i32 = 9;
pub const BUZZER_LEDC_CHANNEL: u8 = 0;
pub const BUZZER_LEDC_TIMER: u8 = 0;

/// Resonant frequency of the fitted piezo
pub const BUZZER_RESONANT_FREQUENCY: u32 = 2700;

/// FreeRTOS priority of the playback worker
pub const BUZZER_TASK_PRIORITY: u8 = 10;

pub fn buzzer_config() -> BuzzerConfig {
    BuzzerConfig::new(
        ChannelConfig::new(BUZZER_GPIO, BUZZER_LEDC_CHANNEL, BUZZER_LEDC_TIMER),
        BUZZER_RESONANT_FREQUENCY,
    )
}
