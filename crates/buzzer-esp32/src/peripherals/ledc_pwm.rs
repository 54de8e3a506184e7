//! LEDC PWM driver for the buzzer
//!
//! Owns one LEDC timer and one channel. The tone player's worker retunes the
//! timer for every note, so nothing else may share this timer (unlike a
//! backlight, a buzzer changes frequency constantly).

use esp_idf_hal::gpio::OutputPin;
use esp_idf_hal::ledc::{
    config::TimerConfig, LedcChannel, LedcDriver, LedcTimer, LedcTimerDriver, Resolution,
};
use esp_idf_hal::peripheral::Peripheral;
use esp_idf_hal::units::Hertz;
use esp_idf_svc::sys::{EspError, ESP_ERR_INVALID_ARG};

use buzzer_core::pwm::{ChannelConfig, PwmDriver};

/// LEDC peripherals handed to the buzzer
pub struct LedcPeripherals<T, C, P> {
    pub timer: T,
    pub channel: C,
    pub pin: P,
}

pub struct LedcPwm<T>
where
    T: LedcTimer + 'static,
{
    timer: LedcTimerDriver<'static, T>,
    channel: LedcDriver<'static>,
    resolution_bits: u8,
}

impl<T> LedcPwm<T>
where
    T: LedcTimer + 'static,
{
    /// Bring up the timer at `initial_frequency` and bind the channel, silent
    pub fn new<C, P>(
        peripherals: LedcPeripherals<T, C, P>,
        channel_config: &ChannelConfig,
        initial_frequency: u32,
    ) -> Result<Self, EspError>
    where
        T: Peripheral<P = T>,
        C: LedcChannel<SpeedMode = T::SpeedMode> + Peripheral<P = C> + 'static,
        P: OutputPin + 'static,
    {
        let resolution = resolution_for(channel_config.duty_resolution_bits)?;

        let timer = LedcTimerDriver::new(
            peripherals.timer,
            &TimerConfig::new()
                .frequency(Hertz(initial_frequency))
                .resolution(resolution),
        )?;

        let mut channel = LedcDriver::new(peripherals.channel, &timer, peripherals.pin)?;
        channel.set_duty(0)?;

        log::info!(
            "Buzzer LEDC ready on GPIO{} (channel {}, timer {}, {}-bit, max duty {})",
            channel_config.gpio,
            channel_config.channel,
            channel_config.timer,
            channel_config.duty_resolution_bits,
            channel.get_max_duty()
        );

        Ok(Self {
            timer,
            channel,
            resolution_bits: channel_config.duty_resolution_bits,
        })
    }
}

impl<T> PwmDriver for LedcPwm<T>
where
    T: LedcTimer + Send + 'static,
{
    type Error = EspError;

    fn configure_timer(&mut self, frequency_hz: u32, resolution_bits: u8) -> Result<(), EspError> {
        // The resolution is fixed when the timer is brought up
        if resolution_bits != self.resolution_bits {
            return Err(EspError::from_infallible::<ESP_ERR_INVALID_ARG>());
        }
        self.timer.set_frequency(Hertz(frequency_hz))
    }

    fn configure_channel(&mut self, channel: &ChannelConfig) -> Result<(), EspError> {
        self.channel.set_duty(channel.duty)?;
        self.channel.enable()
    }

    fn stop(&mut self, _channel: &ChannelConfig) -> Result<(), EspError> {
        self.channel.disable()
    }
}

fn resolution_for(bits: u8) -> Result<Resolution, EspError> {
    let resolution = match bits {
        8 => Resolution::Bits8,
        10 => Resolution::Bits10,
        12 => Resolution::Bits12,
        13 => Resolution::Bits13,
        14 => Resolution::Bits14,
        _ => return Err(EspError::from_infallible::<ESP_ERR_INVALID_ARG>()),
    };
    Ok(resolution)
}
