//! Platform-agnostic PWM driver seam
//!
//! The tone player never talks to hardware directly. Each platform provides a
//! `PwmDriver` (LEDC on the ESP32, a sound card on desktop) and the player's
//! worker task becomes its only regular user.

use core::fmt::Debug;

/// Duty resolution used for every tone, in bits
pub const DUTY_RESOLUTION_BITS: u8 = 13;

/// Duty value for a ~50% square wave at `DUTY_RESOLUTION_BITS`
pub const HALF_DUTY: u32 = 1 << (DUTY_RESOLUTION_BITS - 1);

/// Static PWM channel configuration, fixed when the player is built
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelConfig {
    /// GPIO the buzzer is wired to
    pub gpio: i32,
    /// PWM channel index
    pub channel: u8,
    /// PWM timer index driving the channel
    pub timer: u8,
    pub duty_resolution_bits: u8,
    pub duty: u32,
    pub hpoint: u32,
}

impl ChannelConfig {
    pub const fn new(gpio: i32, channel: u8, timer: u8) -> Self {
        Self {
            gpio,
            channel,
            timer,
            duty_resolution_bits: DUTY_RESOLUTION_BITS,
            duty: HALF_DUTY,
            hpoint: 0,
        }
    }

    /// Highest duty value the configured resolution can express
    pub fn max_duty(&self) -> u32 {
        (1u32 << self.duty_resolution_bits) - 1
    }
}

/// Capability set the tone player needs from a PWM peripheral
pub trait PwmDriver: Send + 'static {
    type Error: Debug;

    /// Program the timer for `frequency_hz` at `resolution_bits` duty resolution
    fn configure_timer(&mut self, frequency_hz: u32, resolution_bits: u8)
        -> Result<(), Self::Error>;

    /// Bind the channel to its pin and timer and start driving `channel.duty`
    fn configure_channel(&mut self, channel: &ChannelConfig) -> Result<(), Self::Error>;

    /// Stop the channel output
    fn stop(&mut self, channel: &ChannelConfig) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_duty_is_half_of_resolution() {
        let channel = ChannelConfig::new(9, 0, 0);
        assert_eq!(channel.duty, 4096);
        assert_eq!(channel.max_duty(), 8191);
        assert_eq!(channel.duty_resolution_bits, 13);
        assert_eq!(channel.hpoint, 0);
    }
}
