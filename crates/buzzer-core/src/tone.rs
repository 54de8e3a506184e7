//! Tone data model - requests, notes and melodies
//!
//! A `ToneRequest` is what travels through the request queue to the worker.
//! `Note` and `Melody` are caller-owned inputs that get turned into requests
//! using standard beat arithmetic.

/// Milliseconds in a whole note at 1 BPM (4 beats per whole note).
const WHOLE_NOTE_MS_AT_1_BPM: u32 = 60_000 * 4;

/// A single tone for the worker to play
///
/// `frequency == 0` silences the output, `duration == 0` means "don't wait".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ToneRequest {
    /// Tone frequency in Hz
    pub frequency: u32,
    /// How long to hold the tone in milliseconds
    pub duration: u32,
}

impl ToneRequest {
    pub const fn new(frequency: u32, duration: u32) -> Self {
        Self { frequency, duration }
    }

    /// The `{0, 0}` request: stop sounding, don't wait.
    pub const fn silence() -> Self {
        Self::new(0, 0)
    }

    pub fn is_silence(&self) -> bool {
        self.frequency == 0
    }
}

/// A note of a melody
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Note {
    /// Pitch in Hz (0 is a rest)
    pub pitch: u16,
    /// 1 = whole, 2 = half, 4 = quarter, ...
    pub duration_divisor: u8,
}

impl Note {
    pub const fn new(pitch: u16, duration_divisor: u8) -> Self {
        Self { pitch, duration_divisor }
    }

    /// Build the request this note turns into at the given tempo
    pub fn to_request(&self, tempo: u16) -> ToneRequest {
        ToneRequest::new(
            self.pitch as u32,
            note_duration_ms(tempo, self.duration_divisor),
        )
    }
}

/// An ordered sequence of notes played at a fixed tempo (BPM)
#[derive(Clone, Copy, Debug)]
pub struct Melody<'a> {
    pub notes: &'a [Note],
    pub tempo: u16,
}

impl<'a> Melody<'a> {
    pub const fn new(notes: &'a [Note], tempo: u16) -> Self {
        Self { notes, tempo }
    }

    /// Total playing time, the sum of every note duration
    pub fn duration_ms(&self) -> u64 {
        self.notes
            .iter()
            .map(|note| u64::from(note_duration_ms(self.tempo, note.duration_divisor)))
            .sum()
    }
}

/// Duration of a note in milliseconds: `(240000 / tempo) / divisor`
///
/// Integer division at both steps. A zero tempo or divisor gives 0.
pub fn note_duration_ms(tempo: u16, duration_divisor: u8) -> u32 {
    if tempo == 0 || duration_divisor == 0 {
        return 0;
    }
    (WHOLE_NOTE_MS_AT_1_BPM / tempo as u32) / duration_divisor as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_duration_matches_beat_arithmetic() {
        assert_eq!(note_duration_ms(120, 1), 2000);
        assert_eq!(note_duration_ms(120, 4), 500);
        assert_eq!(note_duration_ms(120, 8), 250);
        // 240000 / 7 = 34285, / 3 = 11428
        assert_eq!(note_duration_ms(7, 3), 11428);
        // truncation happens before the divisor is applied
        assert_eq!(note_duration_ms(144, 16), (240_000 / 144) / 16);
    }

    #[test]
    fn test_note_duration_over_ranges() {
        for tempo in [1u16, 3, 60, 99, 100, 180, 333, u16::MAX] {
            for divisor in [1u8, 2, 3, 4, 8, 16, 32, u8::MAX] {
                assert_eq!(
                    note_duration_ms(tempo, divisor),
                    (240_000 / tempo as u32) / divisor as u32
                );
            }
        }
    }

    #[test]
    fn test_zero_tempo_or_divisor_is_zero_duration() {
        assert_eq!(note_duration_ms(0, 4), 0);
        assert_eq!(note_duration_ms(120, 0), 0);
    }

    #[test]
    fn test_melody_duration_sums_notes() {
        let notes = [Note::new(440, 4), Note::new(0, 8), Note::new(523, 2)];
        let melody = Melody::new(&notes, 100);
        assert_eq!(melody.duration_ms(), 600 + 300 + 1200);
    }

    #[test]
    fn test_melody_duration_past_u32() {
        let notes = [Note::new(440, 1); 18_000];
        let melody = Melody::new(&notes, 1);
        assert_eq!(melody.duration_ms(), 18_000 * 240_000);
    }

    #[test]
    fn test_silence() {
        assert!(ToneRequest::silence().is_silence());
        assert!(!ToneRequest::new(440, 0).is_silence());
        assert_eq!(Note::new(440, 4).to_request(120), ToneRequest::new(440, 500));
    }
}
