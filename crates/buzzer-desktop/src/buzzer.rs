use std::sync::mpsc::{channel, sync_channel, Receiver, Sender, SyncSender};
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context};
use buzzer_core::pwm::{ChannelConfig, PwmDriver};
use rodio::{OutputStream, OutputStreamHandle, Sink, Source};

const SAMPLE_RATE: u32 = 48000;
const AMPLITUDE: f32 = 0.15;

// Endless square wave, the sound card's stand-in for the PWM pin
struct SquareWave {
    frequency: f32,
    /// Fraction of each cycle spent high
    duty: f32,
    sample_rate: u32,
    current_sample: u64,
}

impl SquareWave {
    fn new(frequency: f32, duty: f32, sample_rate: u32) -> Self {
        Self {
            frequency,
            duty,
            sample_rate,
            current_sample: 0,
        }
    }
}

impl Iterator for SquareWave {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        let sample_position = self.current_sample as f32 / self.sample_rate as f32;
        let cycle_position = (sample_position * self.frequency) % 1.0;

        self.current_sample += 1;

        if cycle_position < self.duty {
            Some(AMPLITUDE)
        } else {
            Some(-AMPLITUDE)
        }
    }
}

impl Source for SquareWave {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}

enum AudioCommand {
    Start { frequency_hz: u32, duty: f32 },
    Stop,
}

/// PWM driver that plays the buzzer output through the host sound card
///
/// `rodio`'s output stream can't leave the thread that opened it, so a
/// dedicated audio thread owns it and the driver just sends it commands.
pub struct RodioPwm {
    command_tx: Sender<AudioCommand>,
    frequency_hz: u32,
}

impl RodioPwm {
    pub fn new() -> anyhow::Result<Self> {
        let (command_tx, command_rx) = channel::<AudioCommand>();
        let (ready_tx, ready_rx) = sync_channel::<Result<(), String>>(1);

        thread::Builder::new()
            .name("buzzer_audio".to_string())
            .spawn(move || audio_thread(command_rx, ready_tx))
            .context("failed to spawn audio thread")?;

        ready_rx
            .recv()
            .context("audio thread exited during startup")?
            .map_err(|e| anyhow!("failed to open audio output: {}", e))?;

        Ok(Self {
            command_tx,
            frequency_hz: 0,
        })
    }

    fn send(&self, command: AudioCommand) -> anyhow::Result<()> {
        self.command_tx
            .send(command)
            .map_err(|_| anyhow!("audio thread is gone"))
    }
}

impl PwmDriver for RodioPwm {
    type Error = anyhow::Error;

    fn configure_timer(&mut self, frequency_hz: u32, _resolution_bits: u8) -> anyhow::Result<()> {
        if frequency_hz == 0 || frequency_hz > SAMPLE_RATE / 2 {
            return Err(anyhow!("{}Hz can't be rendered at {}Hz", frequency_hz, SAMPLE_RATE));
        }
        self.frequency_hz = frequency_hz;
        Ok(())
    }

    fn configure_channel(&mut self, channel: &ChannelConfig) -> anyhow::Result<()> {
        let duty = channel.duty as f32 / (channel.max_duty() as f32 + 1.0);
        self.send(AudioCommand::Start {
            frequency_hz: self.frequency_hz,
            duty,
        })
    }

    fn stop(&mut self, _channel: &ChannelConfig) -> anyhow::Result<()> {
        self.send(AudioCommand::Stop)
    }
}

fn audio_thread(rx: Receiver<AudioCommand>, ready: SyncSender<Result<(), String>>) {
    // Open the output once for the thread
    let (_stream, stream_handle) = match OutputStream::try_default() {
        Ok(output) => output,
        Err(e) => {
            let _ = ready.send(Err(e.to_string()));
            return;
        }
    };
    let _ = ready.send(Ok(()));

    let mut sink: Option<Sink> = None;
    while let Ok(command) = rx.recv() {
        match command {
            AudioCommand::Start { frequency_hz, duty } => {
                if let Some(old) = sink.take() {
                    old.stop();
                }
                sink = start_tone(&stream_handle, frequency_hz, duty);
            }
            AudioCommand::Stop => {
                if let Some(old) = sink.take() {
                    old.stop();
                }
            }
        }
    }
    log::debug!("Audio thread exiting");
}

fn start_tone(stream_handle: &OutputStreamHandle, frequency_hz: u32, duty: f32) -> Option<Sink> {
    let sink = match Sink::try_new(stream_handle) {
        Ok(sink) => sink,
        Err(e) => {
            log::error!("Failed to play {}Hz: {}", frequency_hz, e);
            return None;
        }
    };
    sink.append(SquareWave::new(frequency_hz as f32, duty, SAMPLE_RATE));
    Some(sink)
}
