use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::PinDriver;
use esp_idf_hal::task::thread::ThreadSpawnConfiguration;
use esp_idf_svc::sys::EspError;

use buzzer_core::{Melody, Note, ToneBuzzer, ToneRequest};

mod board;
mod peripherals;

use peripherals::{LedcPwm, SystemPeripherals};

const BOOT_MELODY: [Note; 4] = [
    Note::new(1319, 16),
    Note::new(1568, 16),
    Note::new(0, 16),
    Note::new(2093, 8),
];

const POLL_MS: u32 = 20;

fn main() -> Result<(), EspError> {
    // It is necessary to call this function once. Otherwise, some patches to the runtime
    // implemented by esp-idf-sys might not link properly. See https://github.com/esp-rs/esp-idf-template/issues/71
    esp_idf_svc::sys::link_patches();

    // Bind the log crate to the ESP Logging facilities
    esp_idf_svc::log::EspLogger::initialize_default();

    log::info!("Buzzer firmware starting...");

    let peripherals = SystemPeripherals::take()?;
    let config = board::buzzer_config();

    let pwm = LedcPwm::new(peripherals.buzzer, &config.channel, config.resonant_frequency)?;
    let buzzer = ToneBuzzer::new(config, pwm);

    // std threads spawned from here on become FreeRTOS tasks at this priority
    ThreadSpawnConfiguration {
        priority: board::BUZZER_TASK_PRIORITY,
        ..Default::default()
    }
    .set()?;
    let started = buzzer.start();
    ThreadSpawnConfiguration::default().set()?;

    // The buzzer is not critical, keep running without it
    if let Err(e) = started {
        log::error!("Buzzer unavailable: {}", e);
    }

    let total_ms = buzzer.play_melody(&Melody::new(&BOOT_MELODY, 120));
    log::info!("Boot melody queued ({} ms)", total_ms);

    // GPIO0 is pulled high on the board, a press pulls it low
    let boot_button = PinDriver::input(peripherals.btn_boot)?;

    // BOOT press: beep while held, short chirp on release
    let mut pressed = false;
    loop {
        let is_low = boot_button.is_low();

        if is_low && !pressed {
            log::info!("BOOT pressed");
            buzzer.beep_start();
            pressed = true;
        } else if !is_low && pressed {
            log::info!("BOOT released");
            buzzer.beep_stop();
            buzzer.play_tone(ToneRequest::new(0, 40));
            buzzer.beep(40);
            pressed = false;
        }

        FreeRtos::delay_ms(POLL_MS);
    }
}
