//! Player configuration
//!
//! Everything here is consumed as-is: pin numbers and frequencies come from
//! the board, the player never probes or validates them.

use std::time::Duration;

use crate::pwm::ChannelConfig;

/// Default buzzer GPIO
pub const DEFAULT_GPIO: i32 = 9;

/// Typical resonant frequency of a small piezo disc
pub const DEFAULT_RESONANT_FREQUENCY: u32 = 2700;

/// Request queue capacity
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Bounded wait for the lifecycle lock and for a free queue slot
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);

pub const DEFAULT_WORKER_NAME: &str = "buzzer_task";
pub const DEFAULT_WORKER_STACK_SIZE: usize = 4096;

#[derive(Clone, Debug)]
pub struct BuzzerConfig {
    pub channel: ChannelConfig,
    /// Tone used by the beep operations, in Hz
    pub resonant_frequency: u32,
    pub queue_capacity: usize,
    /// How long `start`/`stop` wait for the lifecycle lock
    pub lock_timeout: Duration,
    /// How long producers wait for room in a full queue
    pub send_timeout: Duration,
    pub worker_name: &'static str,
    pub worker_stack_size: usize,
}

impl BuzzerConfig {
    pub const fn new(channel: ChannelConfig, resonant_frequency: u32) -> Self {
        Self {
            channel,
            resonant_frequency,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            lock_timeout: DEFAULT_TIMEOUT,
            send_timeout: DEFAULT_TIMEOUT,
            worker_name: DEFAULT_WORKER_NAME,
            worker_stack_size: DEFAULT_WORKER_STACK_SIZE,
        }
    }

    pub fn with_resonant_frequency(mut self, frequency: u32) -> Self {
        self.resonant_frequency = frequency;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    pub fn with_worker_stack_size(mut self, stack_size: usize) -> Self {
        self.worker_stack_size = stack_size;
        self
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }
}

impl Default for BuzzerConfig {
    fn default() -> Self {
        Self::new(
            ChannelConfig::new(DEFAULT_GPIO, 0, 0),
            DEFAULT_RESONANT_FREQUENCY,
        )
    }
}
