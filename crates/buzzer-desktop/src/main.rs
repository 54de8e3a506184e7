use std::thread;
use std::time::Duration;

use buzzer_core::config::DEFAULT_RESONANT_FREQUENCY;
use buzzer_core::{BuzzerConfig, Melody, Note, ToneBuzzer, ToneRequest};

mod buzzer;
mod log_capture;

use buzzer::RodioPwm;

// Audio calls run on the worker, so it gets a roomier stack than on the device
const DESKTOP_WORKER_STACK: usize = 64 * 1024;

const STARTUP_JINGLE: [Note; 5] = [
    Note::new(523, 8),
    Note::new(659, 8),
    Note::new(784, 8),
    Note::new(0, 16),
    Note::new(1047, 4),
];

fn main() -> anyhow::Result<()> {
    log_capture::init(log_capture::level_from_env());

    let resonant_frequency = std::env::var("BUZZER_RESONANT_HZ")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_RESONANT_FREQUENCY);

    let config = BuzzerConfig::default()
        .with_resonant_frequency(resonant_frequency)
        .with_worker_stack_size(DESKTOP_WORKER_STACK);
    let buzzer = ToneBuzzer::new(config, RodioPwm::new()?);
    buzzer.start()?;

    buzzer.beep(120);
    buzzer.play_tone(ToneRequest::new(0, 200));
    let total_ms = buzzer.play_melody(&Melody::new(&STARTUP_JINGLE, 132));
    log::info!("Jingle queued ({} ms)", total_ms);
    thread::sleep(Duration::from_millis(total_ms + 500));

    // Held tone, cut by the stop call rather than a duration
    buzzer.beep_start();
    thread::sleep(Duration::from_millis(300));
    buzzer.beep_stop();

    // A long tone interrupted by an urgent one
    buzzer.play_tone(ToneRequest::new(440, 5_000));
    thread::sleep(Duration::from_millis(400));
    buzzer.play_tone_now(ToneRequest::new(1760, 150));
    thread::sleep(Duration::from_millis(400));

    buzzer.stop();
    Ok(())
}
