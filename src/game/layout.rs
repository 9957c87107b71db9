//! Horizontal placement of MIDI keys on screen and their default key bindings.

use rustc_hash::FxHashMap;

use crate::core::input::{KeyBinding, Modifiers, QWERTY_KEYS};

pub const NOTES_PER_OCTAVE: usize = 12;
pub const WHITE_KEYS_PER_OCTAVE: usize = 7;
pub const PIANO_FIRST_MIDI_KEY: u8 = 21;
pub const NUM_PIANO_KEYS: u8 = 88;
pub const NUM_WHITE_KEYS: usize = 52;
pub const BLACK_WIDTH_MULTIPLIER: f64 = 0.6;
pub const NUM_MIDI_KEYS: usize = 128;

// Offsets are relative to A, the lowest piano key.
const OCTAVE_BLACK_KEYS: [bool; NOTES_PER_OCTAVE] = [
    false, true, false, false, true, false, true, false, false, true, false, true,
];
const OCTAVE_WHITE_INDEX: [usize; NOTES_PER_OCTAVE] = [0, 0, 1, 2, 2, 3, 3, 4, 5, 5, 6, 6];

/// 88-key piano spanning the full screen width.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PianoLayout {
    white_width: f64,
}

impl PianoLayout {
    pub fn new(screen_width: f64) -> Self {
        Self {
            white_width: screen_width / NUM_WHITE_KEYS as f64,
        }
    }

    #[inline(always)]
    pub const fn contains(key: u8) -> bool {
        key >= PIANO_FIRST_MIDI_KEY && key < PIANO_FIRST_MIDI_KEY + NUM_PIANO_KEYS
    }

    pub fn keys() -> impl Iterator<Item = u8> {
        PIANO_FIRST_MIDI_KEY..PIANO_FIRST_MIDI_KEY + NUM_PIANO_KEYS
    }

    fn offset(key: u8) -> usize {
        assert!(Self::contains(key), "MIDI key {key} is not on an 88-key piano");
        usize::from(key - PIANO_FIRST_MIDI_KEY)
    }

    pub fn is_black_key(key: u8) -> bool {
        OCTAVE_BLACK_KEYS[Self::offset(key) % NOTES_PER_OCTAVE]
    }

    /// Index of the white key at or immediately left of `key`.
    pub fn white_key_index(key: u8) -> usize {
        let offset = Self::offset(key);
        let index = offset / NOTES_PER_OCTAVE * WHITE_KEYS_PER_OCTAVE
            + OCTAVE_WHITE_INDEX[offset % NOTES_PER_OCTAVE];
        assert!(index < NUM_WHITE_KEYS, "white key index {index} out of range");
        index
    }

    #[inline(always)]
    pub const fn white_width(&self) -> f64 {
        self.white_width
    }

    #[inline(always)]
    pub fn black_width(&self) -> f64 {
        self.white_width * BLACK_WIDTH_MULTIPLIER
    }

    pub fn key_width(&self, key: u8) -> f64 {
        if Self::is_black_key(key) {
            self.black_width()
        } else {
            self.white_width
        }
    }

    /// A black key starts half a white key plus half its own width to the
    /// right of the preceding white key's left edge.
    pub fn x_position(&self, key: u8) -> f64 {
        let x = Self::white_key_index(key) as f64 * self.white_width;
        if Self::is_black_key(key) {
            x + self.white_width / 2.0 + self.black_width() / 2.0
        } else {
            x
        }
    }

    /// White keys map onto the physical keys in order; black keys share
    /// their white key's physical key with Shift held.
    pub fn key_binding(key: u8) -> KeyBinding {
        assert!(
            QWERTY_KEYS.len() >= NUM_WHITE_KEYS,
            "need {NUM_WHITE_KEYS} physical keys for the piano, have {}",
            QWERTY_KEYS.len()
        );
        let modifiers = if Self::is_black_key(key) {
            Modifiers::SHIFT
        } else {
            Modifiers::empty()
        };
        KeyBinding {
            key: QWERTY_KEYS[Self::white_key_index(key)],
            modifiers,
        }
    }
}

/// One equal-width lane per distinct drum key, in first-appearance order.
#[derive(Clone, Debug, PartialEq)]
pub struct DrumLayout {
    lanes: Vec<u8>,
    lane_of: FxHashMap<u8, usize>,
    lane_width: f64,
}

impl DrumLayout {
    pub fn new(screen_width: f64, keys: &[u8]) -> Self {
        let mut lanes = Vec::with_capacity(keys.len());
        let mut lane_of = FxHashMap::default();
        for &key in keys {
            lane_of.entry(key).or_insert_with(|| {
                lanes.push(key);
                lanes.len() - 1
            });
        }
        assert!(
            QWERTY_KEYS.len() >= lanes.len(),
            "{} drum lanes but only {} physical keys",
            lanes.len(),
            QWERTY_KEYS.len()
        );
        let lane_width = screen_width / lanes.len().max(1) as f64;
        Self {
            lanes,
            lane_of,
            lane_width,
        }
    }

    pub fn lanes(&self) -> &[u8] {
        &self.lanes
    }

    #[inline(always)]
    pub const fn lane_width(&self) -> f64 {
        self.lane_width
    }

    pub fn contains(&self, key: u8) -> bool {
        self.lane_of.contains_key(&key)
    }

    pub fn lane_index(&self, key: u8) -> usize {
        match self.lane_of.get(&key) {
            Some(&lane) => lane,
            None => panic!("MIDI key {key} has no drum lane"),
        }
    }

    pub fn x_position(&self, key: u8) -> f64 {
        self.lane_index(key) as f64 * self.lane_width
    }

    pub fn key_binding(&self, key: u8) -> KeyBinding {
        KeyBinding::plain(QWERTY_KEYS[self.lane_index(key)])
    }
}

/// Every MIDI key gets its own lane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DefaultLayout {
    lane_width: f64,
}

impl DefaultLayout {
    pub fn new(screen_width: f64) -> Self {
        Self {
            lane_width: screen_width / NUM_MIDI_KEYS as f64,
        }
    }

    #[inline(always)]
    pub const fn contains(key: u8) -> bool {
        (key as usize) < NUM_MIDI_KEYS
    }

    #[inline(always)]
    pub const fn lane_width(&self) -> f64 {
        self.lane_width
    }

    pub fn x_position(&self, key: u8) -> f64 {
        assert!(Self::contains(key), "MIDI key {key} out of range");
        f64::from(key) * self.lane_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piano_key_classes() {
        // A0, A#0, B0, C1, C#1
        assert!(!PianoLayout::is_black_key(21));
        assert!(PianoLayout::is_black_key(22));
        assert!(!PianoLayout::is_black_key(23));
        assert!(!PianoLayout::is_black_key(24));
        assert!(PianoLayout::is_black_key(25));
        assert_eq!(PianoLayout::white_key_index(21), 0);
        assert_eq!(PianoLayout::white_key_index(22), 0);
        assert_eq!(PianoLayout::white_key_index(24), 2);
        assert_eq!(PianoLayout::white_key_index(108), NUM_WHITE_KEYS - 1);
    }

    #[test]
    fn black_keys_follow_their_white_key_across_the_range() {
        for key in PianoLayout::keys().filter(|&k| PianoLayout::is_black_key(k)) {
            let natural = key - 1;
            assert!(!PianoLayout::is_black_key(natural), "{key} follows a black key");
            assert_eq!(
                PianoLayout::white_key_index(key),
                PianoLayout::white_key_index(natural),
                "key {key}"
            );
            let black = PianoLayout::key_binding(key);
            let white = PianoLayout::key_binding(natural);
            assert_eq!(black.key, white.key, "key {key}");
            assert_eq!(black.modifiers, Modifiers::SHIFT);
            assert_eq!(white.modifiers, Modifiers::empty());
        }
        let octave = NOTES_PER_OCTAVE as u8;
        for key in PianoLayout::keys().filter(|&k| PianoLayout::contains(k + octave)) {
            assert_eq!(
                PianoLayout::is_black_key(key),
                PianoLayout::is_black_key(key + octave),
                "key {key}"
            );
        }
    }

    #[test]
    fn piano_has_52_whites_and_36_blacks() {
        let blacks = PianoLayout::keys().filter(|&k| PianoLayout::is_black_key(k)).count();
        assert_eq!(blacks, 36);
        assert_eq!(PianoLayout::keys().count() - blacks, NUM_WHITE_KEYS);
    }

    #[test]
    fn white_indices_increase_without_gaps() {
        let mut expected = 0;
        for key in PianoLayout::keys().filter(|&k| !PianoLayout::is_black_key(k)) {
            assert_eq!(PianoLayout::white_key_index(key), expected);
            expected += 1;
        }
    }

    #[test]
    fn piano_positions_fill_the_screen() {
        let layout = PianoLayout::new(1040.0);
        assert_eq!(layout.white_width(), 20.0);
        assert_eq!(layout.black_width(), 12.0);
        assert_eq!(layout.x_position(21), 0.0);
        assert_eq!(layout.x_position(22), 0.0 + 10.0 + 6.0);
        let last = layout.x_position(108) + layout.key_width(108);
        assert!((last - 1040.0).abs() < 1e-9);
    }

    #[test]
    fn piano_bindings_share_keys_across_shift() {
        let white = PianoLayout::key_binding(21);
        let black = PianoLayout::key_binding(22);
        assert_eq!(white.key, QWERTY_KEYS[0]);
        assert_eq!(white.modifiers, Modifiers::empty());
        assert_eq!(black.key, white.key);
        assert_eq!(black.modifiers, Modifiers::SHIFT);
    }

    #[test]
    #[should_panic(expected = "not on an 88-key piano")]
    fn piano_rejects_keys_below_a0() {
        PianoLayout::white_key_index(20);
    }

    #[test]
    fn drum_lanes_dedup_in_first_appearance_order() {
        let layout = DrumLayout::new(300.0, &[38, 36, 38, 42, 36]);
        assert_eq!(layout.lanes(), &[38, 36, 42]);
        assert_eq!(layout.lane_width(), 100.0);
        assert_eq!(layout.x_position(36), 100.0);
        assert_eq!(layout.key_binding(42).key, QWERTY_KEYS[2]);
        assert_eq!(layout.key_binding(42).modifiers, Modifiers::empty());
        assert!(!layout.contains(49));
    }

    #[test]
    fn empty_drum_kit_has_no_lanes() {
        let layout = DrumLayout::new(300.0, &[]);
        assert!(layout.lanes().is_empty());
        assert_eq!(layout.lane_width(), 300.0);
    }

    #[test]
    #[should_panic(expected = "physical keys")]
    fn drum_kit_larger_than_the_keyboard_is_fatal() {
        let keys: Vec<u8> = (0..=QWERTY_KEYS.len() as u8).collect();
        DrumLayout::new(300.0, &keys);
    }

    #[test]
    fn default_layout_has_128_lanes() {
        let layout = DefaultLayout::new(1280.0);
        assert_eq!(layout.lane_width(), 10.0);
        assert_eq!(layout.x_position(127), 1270.0);
        assert!(!DefaultLayout::contains(128));
    }
}
