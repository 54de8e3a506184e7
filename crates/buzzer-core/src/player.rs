//! Tone player - queue-fed buzzer playback
//!
//! Callers on any task enqueue `ToneRequest`s. A single worker thread owns the
//! PWM driver, takes requests in FIFO order, programs the output and waits out
//! each tone's duration on a `Gate`, which lets `clear_buffer` cut a tone short
//! without the worker polling.
//!
//! Enqueueing is fire-and-forget. When the player isn't running, or the queue
//! stays full past the send timeout, the request is dropped without an error:
//! the buzzer is a non-critical peripheral and callers must never stall on it.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::config::BuzzerConfig;
use crate::error::PlayerError;
use crate::gate::Gate;
use crate::pwm::{ChannelConfig, PwmDriver};
use crate::queue::ToneQueue;
use crate::tone::{Melody, Note, ToneRequest};

/// What the worker is doing right now
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum WorkerState {
    /// Blocked on the request queue (or not running)
    Idle = 0,
    /// Configuring the PWM for a request
    Programming = 1,
    /// Output active or a timed request being waited out
    Sounding = 2,
}

impl WorkerState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => WorkerState::Programming,
            2 => WorkerState::Sounding,
            _ => WorkerState::Idle,
        }
    }
}

/// State shared between the API side and the worker thread
struct Shared<P> {
    channel: ChannelConfig,
    pwm: Mutex<P>,
    /// Present iff a worker is running
    queue: Mutex<Option<Arc<ToneQueue>>>,
    /// Created by the worker on its first run, dropped on teardown
    duration_gate: Mutex<Option<Arc<Gate>>>,
    /// Written by the worker only
    sounding: AtomicBool,
    state: AtomicU8,
}

impl<P: PwmDriver> Shared<P> {
    fn pwm(&self) -> MutexGuard<'_, P> {
        lock(&self.pwm)
    }

    fn queue(&self) -> Option<Arc<ToneQueue>> {
        lock(&self.queue).clone()
    }

    fn duration_gate(&self) -> Option<Arc<Gate>> {
        lock(&self.duration_gate).clone()
    }

    fn is_sounding(&self) -> bool {
        self.sounding.load(Ordering::Acquire)
    }

    fn set_state(&self, state: WorkerState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Program the output for `frequency` and enable the channel
    fn sound(&self, frequency: u32) {
        let mut pwm = self.pwm();
        let result = pwm
            .configure_timer(frequency, self.channel.duty_resolution_bits)
            .and_then(|()| pwm.configure_channel(&self.channel));

        if let Err(e) = &result {
            log::error!("Failed to sound {}Hz on GPIO{}: {:?}", frequency, self.channel.gpio, e);
        }
        self.sounding.store(result.is_ok(), Ordering::Release);
    }

    /// Disable the channel. A failed stop leaves the output marked as sounding.
    fn silence(&self) {
        let result = self.pwm().stop(&self.channel);
        if let Err(e) = &result {
            log::error!("Failed to stop buzzer channel {}: {:?}", self.channel.channel, e);
        }
        self.sounding.store(result.is_err(), Ordering::Release);
    }
}

/// Worker loop - sole regular owner of the PWM driver
///
/// Exits once the queue is closed, leaving the output silent.
fn run_worker<P: PwmDriver>(shared: Arc<Shared<P>>, queue: Arc<ToneQueue>) {
    let gate = lock(&shared.duration_gate)
        .get_or_insert_with(|| Arc::new(Gate::new_available()))
        .clone();

    log::debug!("Buzzer worker running");

    loop {
        shared.set_state(WorkerState::Idle);
        let Some(request) = queue.recv() else {
            break;
        };
        log::trace!("Buzzer: {}Hz for {}ms", request.frequency, request.duration);

        shared.set_state(WorkerState::Programming);
        if request.frequency > 0 {
            shared.sound(request.frequency);
        } else if shared.is_sounding() {
            shared.silence();
        }

        if shared.is_sounding() || request.duration > 0 {
            shared.set_state(WorkerState::Sounding);
        }

        if request.duration > 0 {
            // Drop any stale signal so only a give during this wait ends it early
            gate.try_take();
            if queue.is_closed() {
                break;
            }
            gate.take(Duration::from_millis(request.duration as u64));
            gate.give();

            if shared.is_sounding() {
                shared.silence();
            }
        }
    }

    if shared.is_sounding() {
        shared.silence();
    }
    shared.set_state(WorkerState::Idle);
    log::debug!("Buzzer worker exiting");
}

/// A buzzer driven by a dedicated playback worker
///
/// Every method takes `&self`; share the player by reference or in an `Arc`.
pub struct ToneBuzzer<P: PwmDriver> {
    config: BuzzerConfig,
    shared: Arc<Shared<P>>,
    /// Guards creation and teardown of the worker and its queue
    lifecycle: Gate,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl<P: PwmDriver> ToneBuzzer<P> {
    pub fn new(config: BuzzerConfig, driver: P) -> Self {
        let shared = Arc::new(Shared {
            channel: config.channel,
            pwm: Mutex::new(driver),
            queue: Mutex::new(None),
            duration_gate: Mutex::new(None),
            sounding: AtomicBool::new(false),
            state: AtomicU8::new(WorkerState::Idle as u8),
        });

        Self {
            config,
            shared,
            lifecycle: Gate::new_available(),
            worker: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &BuzzerConfig {
        &self.config
    }

    /// Spawn the playback worker. Starting a running player is a no-op.
    pub fn start(&self) -> Result<(), PlayerError> {
        if !self.lifecycle.take(self.config.lock_timeout) {
            log::error!("Buzzer start: lifecycle lock timed out");
            return Err(PlayerError::LockTimeout);
        }
        let result = self.start_locked();
        self.lifecycle.give();
        result
    }

    fn start_locked(&self) -> Result<(), PlayerError> {
        let mut worker = lock(&self.worker);
        if worker.is_some() {
            return Ok(());
        }

        let queue = match self.shared.queue() {
            Some(queue) => queue,
            None => match ToneQueue::with_capacity(self.config.queue_capacity) {
                Ok(queue) => Arc::new(queue),
                Err(e) => {
                    log::error!("Failed to create buzzer queue: {}", e);
                    return Err(e.into());
                }
            },
        };

        let spawned = {
            let shared = self.shared.clone();
            let queue = queue.clone();
            thread::Builder::new()
                .name(self.config.worker_name.to_string())
                .stack_size(self.config.worker_stack_size)
                .spawn(move || run_worker(shared, queue))
        };

        match spawned {
            Ok(handle) => {
                *lock(&self.shared.queue) = Some(queue);
                *worker = Some(handle);
                log::info!(
                    "Buzzer started on GPIO{} (queue capacity {})",
                    self.config.channel.gpio,
                    self.config.queue_capacity
                );
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to spawn {}: {}", self.config.worker_name, e);
                *lock(&self.shared.queue) = None;
                Err(e.into())
            }
        }
    }

    /// Tear down the worker, dropping anything still queued
    ///
    /// A tone in progress is cut short. Stopping a stopped player is a no-op.
    pub fn stop(&self) {
        if !self.lifecycle.take(self.config.lock_timeout) {
            log::error!("Buzzer stop: lifecycle lock timed out");
            return;
        }
        self.stop_locked();
        self.lifecycle.give();
    }

    fn stop_locked(&self) {
        let Some(handle) = lock(&self.worker).take() else {
            return;
        };

        // Close before waking the gate so the worker can't sleep again
        if let Some(queue) = lock(&self.shared.queue).take() {
            queue.close();
        }
        if let Some(gate) = self.shared.duration_gate() {
            gate.give();
        }

        if handle.join().is_err() {
            log::error!("Buzzer worker panicked");
        }
        *lock(&self.shared.duration_gate) = None;
        log::info!("Buzzer stopped");
    }

    pub fn is_running(&self) -> bool {
        lock(&self.worker).is_some()
    }

    /// Whether the PWM output is currently active
    pub fn is_sounding(&self) -> bool {
        self.shared.is_sounding()
    }

    pub fn worker_state(&self) -> WorkerState {
        WorkerState::from_u8(self.shared.state.load(Ordering::Acquire))
    }

    /// Number of requests waiting for the worker
    pub fn pending(&self) -> usize {
        self.shared.queue().map_or(0, |queue| queue.len())
    }

    /// Enqueue every note of `melody` in order
    ///
    /// Returns the total duration in milliseconds, summed in `u64` so long
    /// melodies can't overflow. Pacing is left to the worker, no gaps are
    /// inserted between notes.
    pub fn play_melody(&self, melody: &Melody<'_>) -> u64 {
        melody
            .notes
            .iter()
            .map(|note| u64::from(self.play_note(melody.tempo, *note)))
            .sum()
    }

    /// Enqueue a single note at `tempo` BPM and return its duration in ms
    pub fn play_note(&self, tempo: u16, note: Note) -> u32 {
        let request = note.to_request(tempo);
        self.play_tone(request);
        request.duration
    }

    /// Enqueue a tone behind whatever is already queued
    pub fn play_tone(&self, request: ToneRequest) {
        let Some(queue) = self.shared.queue() else {
            log::debug!("Buzzer not running, dropping {:?}", request);
            return;
        };
        if let Err(e) = queue.send_timeout(request, self.config.send_timeout) {
            log::warn!("Dropping {:?}: {:?}", request, e);
        }
    }

    /// Discard everything queued or sounding, then play `request`
    pub fn play_tone_now(&self, request: ToneRequest) {
        self.clear_buffer();
        self.play_tone(request);
    }

    /// Sound the resonant frequency for `duration_ms`
    pub fn beep(&self, duration_ms: u32) {
        self.play_tone(ToneRequest::new(self.config.resonant_frequency, duration_ms));
    }

    /// Sound the resonant frequency until silenced
    pub fn beep_start(&self) {
        self.beep(0);
    }

    pub fn beep_stop(&self) {
        self.play_tone_now(ToneRequest::silence());
    }

    /// Drop every pending request and cut the current tone short
    ///
    /// This is the one place outside the worker that touches the PWM: the
    /// channel is stopped directly so silence is immediate.
    pub fn clear_buffer(&self) {
        let Some(queue) = self.shared.queue() else {
            return;
        };
        queue.reset();

        if self.shared.is_sounding() {
            if let Some(gate) = self.shared.duration_gate() {
                gate.give();
            }
            if let Err(e) = self.shared.pwm().stop(&self.shared.channel) {
                log::warn!("Failed to silence buzzer: {:?}", e);
            }
        }
    }
}

impl<P: PwmDriver> Drop for ToneBuzzer<P> {
    fn drop(&mut self) {
        self.stop();
    }
}

// Nothing guarded here can be left half-updated by a panic
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
