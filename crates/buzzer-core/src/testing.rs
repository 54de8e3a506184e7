//! Recording PWM driver for tests

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crate::pwm::{ChannelConfig, PwmDriver};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PwmCall {
    ConfigureTimer { frequency_hz: u32, resolution_bits: u8 },
    ConfigureChannel { gpio: i32, duty: u32 },
    Stop,
}

#[derive(Debug)]
pub struct MockPwmError;

/// Records every call with the instant it happened. Clones share the log.
#[derive(Clone, Default)]
pub struct RecordingPwm {
    calls: Arc<Mutex<Vec<(Instant, PwmCall)>>>,
    fail_timer: Arc<AtomicBool>,
}

impl RecordingPwm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `configure_timer` fail
    pub fn set_fail_timer(&self, fail: bool) {
        self.fail_timer.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<PwmCall> {
        self.timed_calls().into_iter().map(|(_, call)| call).collect()
    }

    pub fn timed_calls(&self) -> Vec<(Instant, PwmCall)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn stop_count(&self) -> usize {
        self.calls().iter().filter(|call| **call == PwmCall::Stop).count()
    }

    /// Frequencies the timer was programmed with, in order
    pub fn frequencies(&self) -> Vec<u32> {
        self.calls()
            .iter()
            .filter_map(|call| match call {
                PwmCall::ConfigureTimer { frequency_hz, .. } => Some(*frequency_hz),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: PwmCall) {
        self.calls.lock().unwrap().push((Instant::now(), call));
    }
}

impl PwmDriver for RecordingPwm {
    type Error = MockPwmError;

    fn configure_timer(&mut self, frequency_hz: u32, resolution_bits: u8) -> Result<(), MockPwmError> {
        if self.fail_timer.load(Ordering::SeqCst) {
            return Err(MockPwmError);
        }
        self.record(PwmCall::ConfigureTimer { frequency_hz, resolution_bits });
        Ok(())
    }

    fn configure_channel(&mut self, channel: &ChannelConfig) -> Result<(), MockPwmError> {
        self.record(PwmCall::ConfigureChannel {
            gpio: channel.gpio,
            duty: channel.duty,
        });
        Ok(())
    }

    fn stop(&mut self, _channel: &ChannelConfig) -> Result<(), MockPwmError> {
        self.record(PwmCall::Stop);
        Ok(())
    }
}

/// Poll `condition` every millisecond until it holds or `timeout` passes
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    condition()
}
