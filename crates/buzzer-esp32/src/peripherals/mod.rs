pub mod ledc_pwm;

pub use ledc_pwm::{LedcPeripherals, LedcPwm};

use esp_idf_hal::gpio::AnyInputPin;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::sys::EspError;

pub struct SystemPeripherals {
    pub buzzer: LedcPeripherals<
        esp_idf_hal::ledc::TIMER0,
        esp_idf_hal::ledc::CHANNEL0,
        esp_idf_hal::gpio::Gpio9,
    >,
    /// BOOT button (GPIO0), active low
    pub btn_boot: AnyInputPin,
}

impl SystemPeripherals {
    pub fn take() -> Result<Self, EspError> {
        let peripherals = Peripherals::take()?;

        Ok(SystemPeripherals {
            buzzer: LedcPeripherals {
                timer: peripherals.ledc.timer0,
                channel: peripherals.ledc.channel0,
                pin: peripherals.pins.gpio9,
            },
            btn_boot: peripherals.pins.gpio0.into(),
        })
    }
}
